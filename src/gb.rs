//! Top-level Game Boy driver.
//!
//! [`GameBoy`] owns the CPU and BUS and pumps the fixed CPU -> BUS -> IO ->
//! APU -> PPU pipeline one step at a time. DMG only: no CGB/SGB mode, no
//! cheat codes, no save states; the RGB888 conversion via
//! `Ppu::render_frame_rgb` is the only frame buffer format kept.
//!
//! # Example
//!
//! ```rust
//! use dmg_core::gb::GameBoy;
//!
//! let mut game_boy = GameBoy::new();
//! game_boy.skip_boot();
//! let cycles = game_boy.step();
//! println!("ran {cycles} cycles");
//! ```

use dmg_core_common::util::read_file;

use crate::{
    consts::{STAT_INT, VBLANK_INT},
    cpu::Cpu,
    devices::SerialDevice,
    error::Error,
    io::JoypadButton,
    mmu::Mmu,
    rom::Cartridge,
};

/// Per-component enable switches, useful for isolating one subsystem
/// while debugging or benchmarking.
pub struct GameBoyConfig {
    pub ppu_enabled: bool,
    pub apu_enabled: bool,
    pub dma_enabled: bool,
    pub io_enabled: bool,
}

impl Default for GameBoyConfig {
    fn default() -> Self {
        Self {
            ppu_enabled: true,
            apu_enabled: true,
            dma_enabled: true,
            io_enabled: true,
        }
    }
}

/// Debug/introspection snapshot of the CPU and PPU registers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Registers {
    pub pc: u16,
    pub sp: u16,
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub scy: u8,
    pub scx: u8,
    pub wy: u8,
    pub wx: u8,
    pub ly: u8,
    pub lyc: u8,
}

pub struct GameBoy {
    cpu: Cpu,
    config: GameBoyConfig,
}

impl GameBoy {
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(Mmu::default()),
            config: GameBoyConfig::default(),
        }
    }

    pub fn config(&self) -> &GameBoyConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut GameBoyConfig {
        &mut self.config
    }

    // -- loading ----------------------------------------------------------

    /// Installs a ROM image, replacing any cartridge currently loaded.
    pub fn load_rom(&mut self, data: &[u8]) -> Result<(), Error> {
        let cartridge = Cartridge::from_data(data.to_vec())?;
        self.cpu.mmu().set_rom(cartridge);
        Ok(())
    }

    pub fn load_rom_file(&mut self, path: &str) -> Result<(), Error> {
        let data = read_file(path)?;
        self.load_rom(&data)
    }

    /// Returns whether `data` parses as a valid cartridge image, without
    /// keeping it loaded.
    pub fn verify_rom(data: &[u8]) -> bool {
        Cartridge::from_data(data.to_vec()).is_ok()
    }

    /// Installs a 256-byte DMG boot ROM image and enables the boot overlay
    /// at `0x0000-0x00FF`.
    pub fn load_boot_rom(&mut self, data: &[u8]) -> Result<(), Error> {
        if data.len() != 0x100 {
            return Err(Error::BootRomSize {
                expected: 0x100,
                actual: data.len(),
            });
        }
        self.cpu.mmu().write_boot(0x0000, data);
        self.cpu.mmu().set_boot_active(true);
        Ok(())
    }

    pub fn load_boot_rom_file(&mut self, path: &str) -> Result<(), Error> {
        let data = read_file(path)?;
        self.load_boot_rom(&data)
    }

    /// Skips the boot sequence, jumping directly to the post-boot register
    /// and memory state at `0x0100`.
    pub fn skip_boot(&mut self) {
        self.cpu.boot();
    }

    pub fn set_serial_device(&mut self, device: Box<dyn SerialDevice>) {
        self.cpu.mmu().set_serial_device(device);
    }

    /// Loads a battery save (plus trailing RTC blob, if the cartridge has
    /// one) into the currently installed cartridge.
    pub fn load_save_data(&mut self, data: &[u8]) -> Result<(), Error> {
        self.cpu.mmu().rom().load_save_data(data)
    }

    pub fn save_data(&mut self) -> Vec<u8> {
        self.cpu.mmu().rom().save_data()
    }

    /// Resets CPU, BUS and every subsystem to power-on state, keeping the
    /// currently installed cartridge.
    pub fn reset(&mut self) {
        let rom = self.cpu.mmu().rom_i().clone();
        self.cpu = Cpu::new(Mmu::new(rom));
    }

    // -- stepping -----------------------------------------------------------

    /// Runs one CPU-visible step — an instruction, an interrupt dispatch,
    /// or a halted/stopped idle tick — and advances every other component
    /// by the resulting T-cycle count, in BUS -> IO -> APU -> PPU order.
    /// Returns the number of T-cycles the step took.
    pub fn step(&mut self) -> u16 {
        let cycles = self.cpu.clock() as u16;

        if self.config.dma_enabled {
            self.cpu.mmu().tick_dma(cycles);
        }
        if self.config.io_enabled {
            self.cpu.mmu().io().tick(cycles as i32);
        }
        let div_ticks = self.cpu.mmu().io().consume_apu_div_ticks();
        if self.config.apu_enabled {
            self.cpu.mmu().apu().tick(cycles, div_ticks);
        }
        if self.config.ppu_enabled {
            self.cpu.mmu().ppu().tick(cycles);
            self.propagate_ppu_interrupts();
        }

        cycles
    }

    fn propagate_ppu_interrupts(&mut self) {
        let mmu = self.cpu.mmu();
        let vblank = mmu.ppu().take_vblank_irq();
        let stat = mmu.ppu().take_stat_irq();
        if vblank {
            mmu.io().request_interrupt(VBLANK_INT);
        }
        if stat {
            mmu.io().request_interrupt(STAT_INT);
        }
    }

    /// Equivalent to repeatedly calling `step()`, returning the total
    /// T-cycles run.
    pub fn steps(&mut self, count: usize) -> u64 {
        let mut cycles = 0u64;
        for _ in 0..count {
            cycles += self.step() as u64;
        }
        cycles
    }

    /// Steps until a new frame becomes ready (a V-Blank transition), then
    /// returns the T-cycles spent producing it.
    pub fn run_until_frame(&mut self, max_cycles: u64) -> u64 {
        let mut cycles = 0u64;
        while cycles < max_cycles {
            cycles += self.step() as u64;
            if self.cpu.mmu().ppu_i().frame_ready {
                break;
            }
        }
        cycles
    }

    /// Steps until the PC reaches `addr`, returning the T-cycles taken.
    pub fn step_to(&mut self, addr: u16) -> u64 {
        let mut cycles = 0u64;
        while self.cpu.pc() != addr {
            cycles += self.step() as u64;
        }
        cycles
    }

    // -- input ----------------------------------------------------------

    pub fn set_button(&mut self, button: JoypadButton, pressed: bool) {
        self.cpu.mmu().io().set_button(button, pressed);
    }

    // -- output -----------------------------------------------------------

    /// Takes and clears the "a new frame is ready" flag.
    pub fn take_frame_ready(&mut self) -> bool {
        self.cpu.mmu().ppu().take_frame_ready()
    }

    pub fn framebuffer(&self) -> &[u8] {
        self.cpu.mmu_i().ppu_i().framebuffer()
    }

    pub fn frame_buffer_rgb(&mut self) -> &[u8] {
        self.cpu.mmu().ppu().render_frame_rgb()
    }

    pub fn audio_buffer(&self) -> &std::collections::VecDeque<(i16, i16)> {
        self.cpu.mmu_i().apu_i().audio_buffer()
    }

    pub fn clear_audio_buffer(&mut self) {
        self.cpu.mmu().apu().clear_audio_buffer();
    }

    // -- introspection ------------------------------------------------------

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn cartridge(&self) -> &Cartridge {
        self.cpu.mmu_i().rom_i()
    }

    pub fn registers(&mut self) -> Registers {
        use crate::consts::{LYC_ADDR, LY_ADDR, SCX_ADDR, SCY_ADDR, WX_ADDR, WY_ADDR};
        let pc = self.cpu.pc;
        let sp = self.cpu.sp;
        let a = self.cpu.a;
        let b = self.cpu.b;
        let c = self.cpu.c;
        let d = self.cpu.d;
        let e = self.cpu.e;
        let h = self.cpu.h;
        let l = self.cpu.l;
        let ppu = self.cpu.mmu().ppu();
        Registers {
            pc,
            sp,
            a,
            b,
            c,
            d,
            e,
            h,
            l,
            scy: ppu.read_reg(SCY_ADDR),
            scx: ppu.read_reg(SCX_ADDR),
            wy: ppu.read_reg(WY_ADDR),
            wx: ppu.read_reg(WX_ADDR),
            ly: ppu.read_reg(LY_ADDR),
            lyc: ppu.read_reg(LYC_ADDR),
        }
    }
}

impl Default for GameBoy {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_runs_a_nop() {
        let mut gb = GameBoy::new();
        gb.skip_boot();
        gb.cpu.set_pc(0xc000);
        gb.cpu.mmu().write(0xc000, 0x00);
        let cycles = gb.step();
        assert_eq!(cycles, 4);
        assert_eq!(gb.cpu.pc(), 0xc001);
    }

    #[test]
    fn test_step_to_stops_at_target() {
        let mut gb = GameBoy::new();
        gb.skip_boot();
        gb.cpu.set_pc(0xc000);
        gb.cpu.mmu().write(0xc000, 0x00);
        gb.cpu.mmu().write(0xc001, 0x00);
        gb.step_to(0xc002);
        assert_eq!(gb.cpu.pc(), 0xc002);
    }

    #[test]
    fn test_verify_rom_rejects_short_data() {
        assert!(!GameBoy::verify_rom(&[0u8; 4]));
    }
}
