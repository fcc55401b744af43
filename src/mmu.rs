//! BUS: address decoding, OAM DMA application and the sub-instruction
//! access-offset clock.
//!
//! Narrowed to the DMG memory map (no WRAM/VRAM banking, no HDMA, no
//! CGB-only registers) and built around the `cpu_offset` mechanism: every
//! `read`/`write` call made during one instruction is timestamped against
//! an internal counter reset at fetch, which downstream components
//! (`Io`, `Ppu`, `Apu`) use to resolve mid-instruction timing races.

use crate::apu::Apu;
use crate::devices::{NullDevice, SerialDevice};
use crate::dma::Dma;
use crate::io::Io;
use crate::ppu::Ppu;
use crate::rom::Cartridge;

const WRAM_SIZE: usize = 0x2000;
const HRAM_SIZE: usize = 0x7f;

pub struct Mmu {
    ppu: Ppu,
    apu: Apu,
    dma: Dma,
    io: Io,
    rom: Cartridge,

    wram: [u8; WRAM_SIZE],
    hram: [u8; HRAM_SIZE],

    boot: [u8; 0x100],
    boot_active: bool,

    /// T-cycles elapsed since the start of the instruction currently
    /// executing, as observed at the moment of the in-progress access.
    instr_offset: i32,

    /// How far the DMA engine has actually been advanced within the
    /// current instruction, in the same T-cycle frame as `instr_offset`.
    dma_synced_offset: i32,
}

impl Mmu {
    pub fn new(rom: Cartridge) -> Self {
        Self {
            ppu: Ppu::new(),
            apu: Apu::default(),
            dma: Dma::new(),
            io: Io::new(Box::new(NullDevice)),
            rom,
            wram: [0; WRAM_SIZE],
            hram: [0; HRAM_SIZE],
            boot: [0; 0x100],
            boot_active: false,
            instr_offset: 0,
            dma_synced_offset: 0,
        }
    }

    pub fn reset(&mut self) {
        self.ppu.reset();
        self.apu.reset();
        self.dma.reset();
        self.io.reset();
        self.wram = [0; WRAM_SIZE];
        self.hram = [0; HRAM_SIZE];
        self.boot_active = false;
        self.instr_offset = 0;
        self.dma_synced_offset = 0;
    }

    /// Zeroes work and high RAM. Used by tests that build an `Mmu`
    /// standalone without going through `Mmu::new`.
    pub fn allocate_default(&mut self) {
        self.wram = [0; WRAM_SIZE];
        self.hram = [0; HRAM_SIZE];
    }

    /// Resets the CPU-visible sub-instruction clock. Called once per
    /// `Cpu::clock` at the start of interrupt dispatch / instruction fetch.
    pub fn begin_instruction(&mut self) {
        self.instr_offset = 0;
        self.dma_synced_offset = 0;
    }

    pub fn write_boot(&mut self, addr: u16, data: &[u8]) {
        let start = addr as usize;
        let end = (start + data.len()).min(self.boot.len());
        self.boot[start..end].copy_from_slice(&data[..end - start]);
    }

    pub fn set_boot_active(&mut self, value: bool) {
        self.boot_active = value;
    }

    pub fn boot_active(&self) -> bool {
        self.boot_active
    }

    pub fn pending_interrupts(&self) -> u8 {
        self.io.pending_interrupts()
    }

    pub fn ack_interrupt(&mut self, mask: u8) {
        self.io.ack_interrupt(mask);
    }

    /// Catches the DMA engine up to the end of the instruction that just
    /// ran, for whatever T-cycles weren't already covered by a `read`/
    /// `write` call made during it.
    pub fn tick_dma(&mut self, cycles: u16) {
        self.sync_dma_to(cycles as i32);
    }

    /// Advances the DMA engine to exactly `offset` T-cycles since
    /// `begin_instruction`, applying any bytes it completes along the way
    /// directly to OAM (bypassing the CPU-visible access gating —
    /// `Ppu::write_oam` rather than the normal `write` path). Called
    /// before every `read`/`write` reaches its own address decode, so
    /// that a register write to `DMA_ADDR` mid-instruction schedules its
    /// transfer at the exact T-cycle it occurred, and a read/write racing
    /// the setup delay or a byte boundary sees DMA state as of that exact
    /// moment rather than as of the end of the instruction.
    fn sync_dma_to(&mut self, offset: i32) {
        if offset <= self.dma_synced_offset {
            return;
        }
        let delta = (offset - self.dma_synced_offset) as u16;
        self.dma_synced_offset = offset;
        let copies = self.dma.advance(delta);
        for (src, idx) in copies {
            let value = self.read_for_dma(src);
            self.dma.set_latch(value);
            self.ppu.write_oam(0xfe00 + idx as u16, value);
        }
    }

    fn read_for_dma(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x7fff => self.rom.read(addr),
            0x8000..=0x9fff => self.ppu.read_vram(addr),
            0xa000..=0xbfff => self.rom.read(addr),
            0xc000..=0xdfff => self.wram[(addr - 0xc000) as usize],
            _ => 0xff,
        }
    }

    pub fn read(&mut self, addr: u16) -> u8 {
        let offset = self.instr_offset;
        self.instr_offset = self.instr_offset.wrapping_add(4);
        self.sync_dma_to(offset);

        if self.dma.active() && !self.dma.in_setup() && !is_dma_exempt(addr) {
            return self.dma.latch();
        }

        match addr {
            0x0000..=0x00ff if self.boot_active => self.boot[addr as usize],
            0x0000..=0x7fff => self.rom.read(addr),
            0x8000..=0x9fff => {
                if self.ppu.peek_vram_accessible(offset.max(0) as u16) {
                    self.ppu.read_vram(addr)
                } else {
                    0xff
                }
            }
            0xa000..=0xbfff => self.rom.read(addr),
            0xc000..=0xdfff => self.wram[(addr - 0xc000) as usize],
            0xe000..=0xfdff => self.wram[(addr - 0xe000) as usize],
            0xfe00..=0xfe9f => {
                if self.ppu.peek_oam_accessible(offset.max(0) as u16) {
                    self.ppu.read_oam(addr)
                } else {
                    0xff
                }
            }
            0xfea0..=0xfeff => 0xff,
            0xff00..=0xff0f => self.io.read(addr, offset),
            0xff10..=0xff2f => self.apu.read(addr),
            0xff30..=0xff3f => self.apu.read_wave_ram(addr, offset.max(0) as u16),
            crate::consts::STAT_ADDR => self.ppu.peek_stat(offset.max(0) as u16),
            crate::consts::LY_ADDR => self.ppu.peek_ly(offset.max(0) as u16),
            0xff40..=0xff45 | 0xff47..=0xff4b => self.ppu.read_reg(addr),
            crate::consts::DMA_ADDR => self.dma.read(addr),
            0xff80..=0xfffe => self.hram[(addr - 0xff80) as usize],
            0xffff => self.io.read(addr, offset),
            _ => 0xff,
        }
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        let offset = self.instr_offset;
        self.instr_offset = self.instr_offset.wrapping_add(4);
        self.sync_dma_to(offset);

        if self.dma.active() && !self.dma.in_setup() && !is_dma_exempt(addr) {
            return;
        }

        match addr {
            0x0000..=0x7fff => self.rom.write(addr, value),
            0x8000..=0x9fff => {
                if self.ppu.vram_writable(offset.max(0) as u16) {
                    self.ppu.write_vram(addr, value);
                }
            }
            0xa000..=0xbfff => self.rom.write(addr, value),
            0xc000..=0xdfff => self.wram[(addr - 0xc000) as usize] = value,
            0xe000..=0xfdff => self.wram[(addr - 0xe000) as usize] = value,
            0xfe00..=0xfe9f => {
                if self.ppu.oam_writable(offset.max(0) as u16) {
                    self.ppu.write_oam(addr, value);
                }
            }
            0xfea0..=0xfeff => (),
            0xff00..=0xff0f => self.io.write(addr, value, offset),
            0xff10..=0xff2f => self.apu.write(addr, value),
            0xff30..=0xff3f => self.apu.write_wave_ram(addr, value, offset.max(0) as u16),
            0xff40..=0xff45 | 0xff47..=0xff4b => self.ppu.write_reg(addr, value),
            crate::consts::DMA_ADDR => self.dma.write(addr, value),
            0xff50 => self.boot_active = self.boot_active && value == 0,
            0xff80..=0xfffe => self.hram[(addr - 0xff80) as usize] = value,
            0xffff => self.io.write(addr, value, offset),
            _ => (),
        }
    }

    #[inline(always)]
    pub fn ppu(&mut self) -> &mut Ppu {
        &mut self.ppu
    }

    #[inline(always)]
    pub fn ppu_i(&self) -> &Ppu {
        &self.ppu
    }

    #[inline(always)]
    pub fn apu(&mut self) -> &mut Apu {
        &mut self.apu
    }

    #[inline(always)]
    pub fn apu_i(&self) -> &Apu {
        &self.apu
    }

    #[inline(always)]
    pub fn dma(&mut self) -> &mut Dma {
        &mut self.dma
    }

    #[inline(always)]
    pub fn dma_i(&self) -> &Dma {
        &self.dma
    }

    #[inline(always)]
    pub fn io(&mut self) -> &mut Io {
        &mut self.io
    }

    #[inline(always)]
    pub fn io_i(&self) -> &Io {
        &self.io
    }

    #[inline(always)]
    pub fn rom(&mut self) -> &mut Cartridge {
        &mut self.rom
    }

    #[inline(always)]
    pub fn rom_i(&self) -> &Cartridge {
        &self.rom
    }

    pub fn set_rom(&mut self, rom: Cartridge) {
        self.rom = rom;
    }

    pub fn set_serial_device(&mut self, device: Box<dyn SerialDevice>) {
        self.io = Io::new(device);
    }
}

/// HRAM, and the DMA register itself, stay readable/writable by the CPU
/// even while a transfer is in flight.
fn is_dma_exempt(addr: u16) -> bool {
    (0xff80..=0xfffe).contains(&addr) || addr == crate::consts::DMA_ADDR
}

impl Default for Mmu {
    fn default() -> Self {
        Self::new(Cartridge::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wram_echo_mirrors() {
        let mut mmu = Mmu::default();
        mmu.write(0xc010, 0x42);
        assert_eq!(mmu.read(0xe010), 0x42);
    }

    #[test]
    fn test_hram_untouched_by_dma() {
        let mut mmu = Mmu::default();
        mmu.write(0xff80, 0x7);
        mmu.dma.write(0xff46, 0xc0);
        assert_eq!(mmu.read(0xff80), 0x7);
    }

    #[test]
    fn test_dma_latches_non_hram_reads() {
        let mut mmu = Mmu::default();
        mmu.write(0xc000, 0xab);
        mmu.dma.write(0xff46, 0xc0);
        mmu.tick_dma(8 + 4);
        assert_eq!(mmu.read(0xc100), 0xab);
    }

    #[test]
    fn test_boot_overlay_then_disable() {
        let mut mmu = Mmu::default();
        mmu.write_boot(0x0000, &[0x11, 0x22]);
        mmu.set_boot_active(true);
        assert_eq!(mmu.read(0x0000), 0x11);
        mmu.write(0xff50, 0x01);
        assert!(!mmu.boot_active());
    }
}
