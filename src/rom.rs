//! Cartridge (ROM) storage and memory-bank-controller emulation.
//!
//! Covers the RAM-banking mode and multicart wiring of MBC1, the 4-bit
//! embedded RAM of MBC2, and the MBC3 real-time clock with its latch/sync
//! semantics, behind a function-pointer `Mbc` vtable.

use std::{
    fmt::{self, Display, Formatter},
    time::{SystemTime, UNIX_EPOCH},
};

use dmg_core_common::data::{read_u32, read_u64, write_u32, write_u64};
use std::io::Cursor;

use crate::{debugln, error::Error, warnln};

pub const ROM_BANK_SIZE: usize = 0x4000;
pub const RAM_BANK_SIZE: usize = 0x2000;
pub const HEADER_SIZE: usize = 0x150;

pub const TITLE_START: usize = 0x0134;
pub const TITLE_END: usize = 0x0143;
pub const CGB_FLAG: usize = 0x0143;
pub const CART_TYPE: usize = 0x0147;
pub const ROM_SIZE: usize = 0x0148;
pub const RAM_SIZE: usize = 0x0149;
pub const HEADER_CHECKSUM: usize = 0x014d;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MbcKind {
    NoMbc,
    Mbc1,
    Mbc2,
    Mbc3,
    Mbc5,
}

/// Decodes the cartridge-type byte at `0x0147` into a mapper kind, a
/// human-readable description, whether RAM is present, and whether the
/// cartridge carries a battery (and, for MBC3, an RTC).
pub struct RomType {
    pub kind: MbcKind,
    pub description: &'static str,
    pub has_ram: bool,
    pub has_battery: bool,
    pub has_rtc: bool,
    pub has_rumble: bool,
}

pub fn decode_cart_type(byte: u8) -> Result<RomType, Error> {
    let rt = |kind, description, has_ram, has_battery, has_rtc, has_rumble| RomType {
        kind,
        description,
        has_ram,
        has_battery,
        has_rtc,
        has_rumble,
    };
    Ok(match byte {
        0x00 => rt(MbcKind::NoMbc, "ROM ONLY", false, false, false, false),
        0x01 => rt(MbcKind::Mbc1, "MBC1", false, false, false, false),
        0x02 => rt(MbcKind::Mbc1, "MBC1+RAM", true, false, false, false),
        0x03 => rt(MbcKind::Mbc1, "MBC1+RAM+BATTERY", true, true, false, false),
        0x05 => rt(MbcKind::Mbc2, "MBC2", true, false, false, false),
        0x06 => rt(MbcKind::Mbc2, "MBC2+BATTERY", true, true, false, false),
        0x08 => rt(MbcKind::NoMbc, "ROM+RAM", true, false, false, false),
        0x09 => rt(MbcKind::NoMbc, "ROM+RAM+BATTERY", true, true, false, false),
        0x0f => rt(MbcKind::Mbc3, "MBC3+TIMER+BATTERY", false, true, true, false),
        0x10 => rt(MbcKind::Mbc3, "MBC3+TIMER+RAM+BATTERY", true, true, true, false),
        0x11 => rt(MbcKind::Mbc3, "MBC3", false, false, false, false),
        0x12 => rt(MbcKind::Mbc3, "MBC3+RAM", true, false, false, false),
        0x13 => rt(MbcKind::Mbc3, "MBC3+RAM+BATTERY", true, true, false, false),
        0x19 => rt(MbcKind::Mbc5, "MBC5", false, false, false, false),
        0x1a => rt(MbcKind::Mbc5, "MBC5+RAM", true, false, false, false),
        0x1b => rt(MbcKind::Mbc5, "MBC5+RAM+BATTERY", true, true, false, false),
        0x1c => rt(MbcKind::Mbc5, "MBC5+RUMBLE", false, false, false, true),
        0x1d => rt(MbcKind::Mbc5, "MBC5+RUMBLE+RAM", true, false, false, true),
        0x1e => rt(
            MbcKind::Mbc5,
            "MBC5+RUMBLE+RAM+BATTERY",
            true,
            true,
            false,
            true,
        ),
        other => return Err(Error::UnsupportedMapper(other)),
    })
}

pub fn rom_banks(code: u8) -> u16 {
    match code {
        0x00..=0x08 => 2u16 << code,
        _ => 2,
    }
}

pub fn ram_banks_and_size(code: u8) -> (u16, usize) {
    match code {
        0x00 => (0, 0),
        0x01 => (1, 2 * 1024),
        0x02 => (1, 8 * 1024),
        0x03 => (4, 32 * 1024),
        0x04 => (16, 128 * 1024),
        0x05 => (8, 64 * 1024),
        _ => (0, 0),
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Mbc1Mode {
    #[default]
    Rom,
    Ram,
}

/// Real-time clock owned by MBC3+TIMER cartridges.
///
/// The live registers advance with wall-clock time (unless halted); reads
/// observe the last latched shadow copy, matching real hardware.
#[derive(Debug, Clone)]
pub struct Rtc {
    seconds: u8,
    minutes: u8,
    hours: u8,
    day_low: u8,
    day_high: u8, // bit0: day bit 8, bit6: halt, bit7: day counter carry
    latched: [u8; 5],
    last_latch_write: u8,
    last_sync: SystemTime,
}

impl Rtc {
    pub fn new() -> Self {
        Self {
            seconds: 0,
            minutes: 0,
            hours: 0,
            day_low: 0,
            day_high: 0,
            latched: [0; 5],
            last_latch_write: 0xff,
            last_sync: SystemTime::now(),
        }
    }

    fn halted(&self) -> bool {
        self.day_high & 0x40 != 0
    }

    /// Advances the live registers by the wall-clock time elapsed since the
    /// last sync, unless the clock is halted.
    fn sync(&mut self) {
        let now = SystemTime::now();
        let elapsed = now
            .duration_since(self.last_sync)
            .unwrap_or_default()
            .as_secs();
        self.last_sync = now;
        if self.halted() || elapsed == 0 {
            return;
        }

        let day = (((self.day_high & 0x01) as u32) << 8) | self.day_low as u32;
        let mut total = day as u64 * 86_400
            + self.hours as u64 * 3600
            + self.minutes as u64 * 60
            + self.seconds as u64
            + elapsed;

        self.seconds = (total % 60) as u8;
        total /= 60;
        self.minutes = (total % 60) as u8;
        total /= 60;
        self.hours = (total % 24) as u8;
        total /= 24;

        if total > 0x1ff {
            self.day_high |= 0x80; // carry
            total &= 0x1ff;
        }
        self.day_low = (total & 0xff) as u8;
        self.day_high = (self.day_high & 0xfe) | (((total >> 8) & 0x01) as u8);
    }

    pub fn latch(&mut self, value: u8) {
        if self.last_latch_write == 0x00 && value == 0x01 {
            self.sync();
            self.latched = [
                self.seconds,
                self.minutes,
                self.hours,
                self.day_low,
                self.day_high,
            ];
        }
        self.last_latch_write = value;
    }

    pub fn read_reg(&self, reg: u8) -> u8 {
        match reg {
            0x08 => self.latched[0] & 0x3f,
            0x09 => self.latched[1] & 0x3f,
            0x0a => self.latched[2] & 0x1f,
            0x0b => self.latched[3],
            0x0c => self.latched[4] & 0xc1,
            _ => 0xff,
        }
    }

    pub fn write_reg(&mut self, reg: u8, value: u8) {
        self.sync();
        match reg {
            0x08 => self.seconds = value & 0x3f,
            0x09 => self.minutes = value & 0x3f,
            0x0a => self.hours = value & 0x1f,
            0x0b => self.day_low = value,
            0x0c => self.day_high = value & 0xc1,
            _ => {}
        }
    }

    /// Serializes into a 48-byte little-endian blob: five live u32 fields,
    /// five latched u32 fields, then a u64 unix timestamp of the last sync.
    pub fn to_bytes(&self) -> [u8; 48] {
        let mut cursor = Cursor::new(Vec::with_capacity(48));
        let fields = [
            self.seconds as u32,
            self.minutes as u32,
            self.hours as u32,
            self.day_low as u32,
            self.day_high as u32,
        ];
        for field in fields {
            write_u32(&mut cursor, field).unwrap();
        }
        for field in self.latched {
            write_u32(&mut cursor, field as u32).unwrap();
        }
        let ts = self
            .last_sync
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        write_u64(&mut cursor, ts).unwrap();
        cursor.into_inner().try_into().unwrap()
    }

    pub fn from_bytes(bytes: &[u8; 48]) -> Self {
        let mut cursor = Cursor::new(bytes.as_slice());
        let live: Vec<u32> = (0..5).map(|_| read_u32(&mut cursor).unwrap()).collect();
        let latched: Vec<u32> = (0..5).map(|_| read_u32(&mut cursor).unwrap()).collect();
        let ts = read_u64(&mut cursor).unwrap();
        Self {
            seconds: live[0] as u8,
            minutes: live[1] as u8,
            hours: live[2] as u8,
            day_low: live[3] as u8,
            day_high: live[4] as u8,
            latched: [
                latched[0] as u8,
                latched[1] as u8,
                latched[2] as u8,
                latched[3] as u8,
                latched[4] as u8,
            ],
            last_latch_write: 0xff,
            last_sync: UNIX_EPOCH + std::time::Duration::from_secs(ts),
        }
    }
}

impl Default for Rtc {
    fn default() -> Self {
        Self::new()
    }
}

/// A loaded Game Boy cartridge: ROM/RAM storage plus whatever mapper state
/// the header's cartridge-type byte requires.
#[derive(Clone)]
pub struct Cartridge {
    rom: Vec<u8>,
    ram: Vec<u8>,
    kind: MbcKind,
    description: &'static str,
    rom_bank_count: u16,
    ram_bank_count: u16,
    has_battery: bool,
    has_rumble: bool,

    ram_enabled: bool,

    // MBC1
    mbc1_low: u8,
    mbc1_high: u8,
    mbc1_mode: Mbc1Mode,
    mbc1_multicart: bool,

    // MBC2 / MBC3 / MBC5 shared "current rom bank" style register
    rom_bank: u16,

    // MBC3
    mbc3_ram_rtc_select: u8,
    rtc: Option<Rtc>,

    // MBC5
    rumble_active: bool,
}

impl Cartridge {
    pub fn empty() -> Self {
        Self {
            rom: vec![0xff; HEADER_SIZE],
            ram: vec![],
            kind: MbcKind::NoMbc,
            description: "ROM ONLY",
            rom_bank_count: 0,
            ram_bank_count: 0,
            has_battery: false,
            has_rumble: false,
            ram_enabled: false,
            mbc1_low: 1,
            mbc1_high: 0,
            mbc1_mode: Mbc1Mode::Rom,
            mbc1_multicart: false,
            rom_bank: 1,
            mbc3_ram_rtc_select: 0,
            rtc: None,
            rumble_active: false,
        }
    }

    pub fn from_data(rom: Vec<u8>) -> Result<Self, Error> {
        if rom.len() < HEADER_SIZE {
            return Err(Error::RomSize(rom.len()));
        }

        let cgb_flag = rom[CGB_FLAG];
        if cgb_flag == 0xc0 {
            return Err(Error::CgbOnly(cgb_flag));
        }

        let rom_type = decode_cart_type(rom[CART_TYPE])?;
        let rom_bank_count = rom_banks(rom[ROM_SIZE]);
        let (ram_bank_count, ram_size) = if rom_type.has_ram {
            ram_banks_and_size(rom[RAM_SIZE])
        } else {
            (0, 0)
        };

        let mbc1_multicart =
            rom_type.kind == MbcKind::Mbc1 && rom_bank_count >= 64 && has_multicart_logo(&rom);

        let rtc = rom_type.has_rtc.then(Rtc::new);

        debugln!(
            "loaded cartridge: {} ({} rom banks, {} ram banks)",
            rom_type.description,
            rom_bank_count,
            ram_bank_count
        );

        Ok(Self {
            rom,
            ram: vec![0u8; ram_size],
            kind: rom_type.kind,
            description: rom_type.description,
            rom_bank_count,
            ram_bank_count,
            has_battery: rom_type.has_battery,
            has_rumble: rom_type.has_rumble,
            ram_enabled: false,
            mbc1_low: 1,
            mbc1_high: 0,
            mbc1_mode: Mbc1Mode::Rom,
            mbc1_multicart,
            rom_bank: 1,
            mbc3_ram_rtc_select: 0,
            rtc,
            rumble_active: false,
        })
    }

    pub fn from_file(path: &str) -> Result<Self, Error> {
        let data = dmg_core_common::util::read_file(path)?;
        Self::from_data(data)
    }

    // -- header accessors --------------------------------------------------

    pub fn title(&self) -> String {
        let end = TITLE_END.min(self.rom.len());
        let bytes = &self.rom[TITLE_START.min(end)..end];
        let end_pos = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        String::from_utf8_lossy(&bytes[..end_pos]).to_string()
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn rom_bank_count(&self) -> u16 {
        self.rom_bank_count.max(2)
    }

    pub fn has_battery(&self) -> bool {
        self.has_battery
    }

    pub fn has_rtc(&self) -> bool {
        self.rtc.is_some()
    }

    pub fn checksum_valid(&self) -> bool {
        let mut sum: u8 = 0;
        for &byte in &self.rom[0x0134..=0x014c] {
            sum = sum.wrapping_sub(byte).wrapping_sub(1);
        }
        sum == self.rom[HEADER_CHECKSUM]
    }

    // -- bank resolution -----------------------------------------------------

    fn effective_rom_bank_low(&self) -> u32 {
        match self.kind {
            MbcKind::Mbc1 => {
                if self.mbc1_mode == Mbc1Mode::Ram {
                    if self.mbc1_multicart {
                        ((self.mbc1_high as u32) & 0x3) << 4
                    } else {
                        ((self.mbc1_high as u32) & 0x3) << 5
                    }
                } else {
                    0
                }
            }
            _ => 0,
        }
    }

    fn effective_rom_bank_high(&self) -> u32 {
        match self.kind {
            MbcKind::NoMbc => 1,
            MbcKind::Mbc1 => {
                if self.mbc1_multicart {
                    let low4 = (self.mbc1_low as u32) & 0x0f;
                    let low4 = if low4 == 0 { 1 } else { low4 };
                    (((self.mbc1_high as u32) & 0x3) << 4) | low4
                } else {
                    let low5 = (self.mbc1_low as u32) & 0x1f;
                    let low5 = if low5 == 0 { 1 } else { low5 };
                    if self.mbc1_mode == Mbc1Mode::Rom {
                        (((self.mbc1_high as u32) & 0x3) << 5) | low5
                    } else {
                        low5
                    }
                }
            }
            MbcKind::Mbc2 | MbcKind::Mbc3 | MbcKind::Mbc5 => self.rom_bank as u32,
        }
    }

    fn rom_bank_count_nonzero(&self) -> u32 {
        self.rom_bank_count.max(2) as u32
    }

    pub fn read(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x3fff => {
                let bank = self.effective_rom_bank_low() % self.rom_bank_count_nonzero();
                let offset = bank as usize * ROM_BANK_SIZE + addr as usize;
                self.rom.get(offset).copied().unwrap_or(0xff)
            }
            0x4000..=0x7fff => {
                let bank = self.effective_rom_bank_high() % self.rom_bank_count_nonzero();
                let offset = bank as usize * ROM_BANK_SIZE + (addr as usize - 0x4000);
                self.rom.get(offset).copied().unwrap_or(0xff)
            }
            0xa000..=0xbfff => self.read_ram(addr),
            _ => 0xff,
        }
    }

    fn read_ram(&self, addr: u16) -> u8 {
        match self.kind {
            MbcKind::Mbc2 => {
                if !self.ram_enabled {
                    return 0xff;
                }
                let index = (addr as usize - 0xa000) & 0x1ff;
                self.ram.get(index).copied().unwrap_or(0x0f) | 0xf0
            }
            MbcKind::Mbc3 if self.mbc3_ram_rtc_select >= 0x08 => self
                .rtc
                .as_ref()
                .map(|rtc| rtc.read_reg(self.mbc3_ram_rtc_select))
                .unwrap_or(0xff),
            _ => {
                if !self.ram_enabled || self.ram.is_empty() {
                    return 0xff;
                }
                let bank = self.ram_bank_index();
                let offset = bank as usize * RAM_BANK_SIZE + (addr as usize - 0xa000);
                self.ram.get(offset % self.ram.len().max(1)).copied().unwrap_or(0xff)
            }
        }
    }

    fn ram_bank_index(&self) -> u16 {
        match self.kind {
            MbcKind::Mbc1 => {
                if self.mbc1_mode == Mbc1Mode::Ram && !self.mbc1_multicart {
                    (self.mbc1_high as u16) & 0x3
                } else {
                    0
                }
            }
            MbcKind::Mbc3 => self.mbc3_ram_rtc_select as u16 & 0x3,
            MbcKind::Mbc5 => self.mbc3_ram_rtc_select as u16 & 0xf,
            _ => 0,
        }
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        match self.kind {
            MbcKind::NoMbc => {
                if (0xa000..=0xbfff).contains(&addr) && !self.ram.is_empty() {
                    let offset = (addr as usize - 0xa000) % self.ram.len();
                    self.ram[offset] = value;
                }
            }
            MbcKind::Mbc1 => self.write_mbc1(addr, value),
            MbcKind::Mbc2 => self.write_mbc2(addr, value),
            MbcKind::Mbc3 => self.write_mbc3(addr, value),
            MbcKind::Mbc5 => self.write_mbc5(addr, value),
        }
    }

    fn write_mbc1(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1fff => self.ram_enabled = value & 0x0f == 0x0a,
            0x2000..=0x3fff => self.mbc1_low = value & 0x1f,
            0x4000..=0x5fff => self.mbc1_high = value & 0x3,
            0x6000..=0x7fff => {
                self.mbc1_mode = if value & 0x01 == 0x01 {
                    Mbc1Mode::Ram
                } else {
                    Mbc1Mode::Rom
                }
            }
            0xa000..=0xbfff => self.write_ram_linear(addr, value),
            _ => warnln!("write to unmapped cartridge address 0x{:04x}", addr),
        }
    }

    fn write_mbc2(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x3fff => {
                if addr & 0x0100 == 0 {
                    self.ram_enabled = value & 0x0f == 0x0a;
                } else {
                    let bank = value & 0x0f;
                    self.rom_bank = if bank == 0 { 1 } else { bank as u16 };
                }
            }
            0xa000..=0xbfff => {
                if self.ram_enabled {
                    let index = (addr as usize - 0xa000) & 0x1ff;
                    if index < self.ram.len() {
                        self.ram[index] = value & 0x0f;
                    }
                }
            }
            _ => {}
        }
    }

    fn write_mbc3(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1fff => self.ram_enabled = value & 0x0f == 0x0a,
            0x2000..=0x3fff => {
                let bank = value & 0x7f;
                self.rom_bank = if bank == 0 { 1 } else { bank as u16 };
            }
            0x4000..=0x5fff => self.mbc3_ram_rtc_select = value,
            0x6000..=0x7fff => {
                if let Some(rtc) = self.rtc.as_mut() {
                    rtc.latch(value);
                }
            }
            0xa000..=0xbfff => {
                if !self.ram_enabled {
                    return;
                }
                if self.mbc3_ram_rtc_select >= 0x08 {
                    if let Some(rtc) = self.rtc.as_mut() {
                        rtc.write_reg(self.mbc3_ram_rtc_select, value);
                    }
                } else {
                    self.write_ram_linear(addr, value);
                }
            }
            _ => {}
        }
    }

    fn write_mbc5(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1fff => self.ram_enabled = value & 0x0f == 0x0a,
            0x2000..=0x2fff => self.rom_bank = (self.rom_bank & 0x100) | value as u16,
            0x3000..=0x3fff => self.rom_bank = (self.rom_bank & 0xff) | (((value & 0x01) as u16) << 8),
            0x4000..=0x5fff => {
                self.mbc3_ram_rtc_select = value & 0x0f;
                if self.has_rumble {
                    self.rumble_active = value & 0x08 != 0;
                }
            }
            0xa000..=0xbfff => self.write_ram_linear(addr, value),
            _ => {}
        }
    }

    fn write_ram_linear(&mut self, addr: u16, value: u8) {
        if !self.ram_enabled || self.ram.is_empty() {
            return;
        }
        let bank = self.ram_bank_index();
        let offset = bank as usize * RAM_BANK_SIZE + (addr as usize - 0xa000);
        let len = self.ram.len();
        self.ram[offset % len] = value;
    }

    // -- battery save ---------------------------------------------------------

    pub fn ram_data(&self) -> &[u8] {
        &self.ram
    }

    /// Loads a battery save previously produced by [`Self::save_data`].
    ///
    /// For MBC3+RTC cartridges the trailing 48-byte RTC blob (if present)
    /// is consumed; otherwise only the raw RAM bytes are restored.
    pub fn load_save_data(&mut self, data: &[u8]) -> Result<(), Error> {
        let ram_len = self.ram.len();
        if data.len() < ram_len {
            return Err(Error::SaveSize {
                expected: ram_len,
                actual: data.len(),
            });
        }
        self.ram[..ram_len].copy_from_slice(&data[..ram_len]);

        if self.rtc.is_some() && data.len() >= ram_len + 48 {
            let mut bytes = [0u8; 48];
            bytes.copy_from_slice(&data[ram_len..ram_len + 48]);
            self.rtc = Some(Rtc::from_bytes(&bytes));
        }
        Ok(())
    }

    pub fn save_data(&self) -> Vec<u8> {
        let mut out = self.ram.clone();
        if let Some(rtc) = &self.rtc {
            out.extend_from_slice(&rtc.to_bytes());
        }
        out
    }

    pub fn rumble_active(&self) -> bool {
        self.rumble_active
    }
}

impl Display for Cartridge {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title(), self.description)
    }
}

/// Nintendo logo bytes at `0x0104..0x0134`, used to detect MBC1 multicart
/// ROMs: a secondary copy of the logo at bank `0x10` (offset
/// `0x10 * 0x4000 + 0x0104`) identifies a multi-game compilation cart.
fn has_multicart_logo(rom: &[u8]) -> bool {
    let bank10_logo = 0x10 * ROM_BANK_SIZE + 0x0104;
    if bank10_logo + 0x30 > rom.len() || 0x0134 > rom.len() {
        return false;
    }
    rom[0x0104..0x0134] == rom[bank10_logo..bank10_logo + 0x30]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_rom(cart_type: u8, rom_size_code: u8, ram_size_code: u8) -> Vec<u8> {
        let banks = rom_banks(rom_size_code).max(2) as usize;
        let mut rom = vec![0u8; banks * ROM_BANK_SIZE];
        rom[CART_TYPE] = cart_type;
        rom[ROM_SIZE] = rom_size_code;
        rom[RAM_SIZE] = ram_size_code;
        rom[CGB_FLAG] = 0x00;
        rom
    }

    #[test]
    fn test_rom_only_reads_bank_zero_and_one() {
        let mut rom = make_rom(0x00, 0x00, 0x00);
        rom[0x4000] = 0xab;
        let cart = Cartridge::from_data(rom).unwrap();
        assert_eq!(cart.read(0x0000), 0x00);
        assert_eq!(cart.read(0x4000), 0xab);
    }

    #[test]
    fn test_mbc1_bank_zero_quirk() {
        let mut rom = make_rom(0x01, 0x03, 0x00); // MBC1, 256K (16 banks)
        rom[5 * ROM_BANK_SIZE] = 0x5;
        rom[1 * ROM_BANK_SIZE] = 0x1;
        let mut cart = Cartridge::from_data(rom).unwrap();
        cart.write(0x2000, 0x00); // raw 0 -> bank 1
        assert_eq!(cart.read(0x4000), 0x1);
        cart.write(0x2000, 0x05);
        assert_eq!(cart.read(0x4000), 0x5);
    }

    #[test]
    fn test_mbc1_ram_enable_and_write() {
        let rom = make_rom(0x03, 0x00, 0x02); // MBC1+RAM+BATTERY, 8KB RAM
        let mut cart = Cartridge::from_data(rom).unwrap();
        assert_eq!(cart.read(0xa000), 0xff);
        cart.write(0x0000, 0x0a);
        cart.write(0xa000, 0x42);
        assert_eq!(cart.read(0xa000), 0x42);
        cart.write(0x0000, 0x00);
        assert_eq!(cart.read(0xa000), 0xff);
    }

    #[test]
    fn test_mbc2_embedded_ram_masks_upper_nibble() {
        let rom = make_rom(0x06, 0x00, 0x00);
        let mut cart = Cartridge::from_data(rom).unwrap();
        cart.write(0x0000, 0x0a); // A8=0 -> ram enable
        cart.write(0xa000, 0x0f);
        assert_eq!(cart.read(0xa000), 0xff);
        cart.write(0x0100, 0x03); // A8=1 -> rom bank select
        assert_eq!(cart.effective_rom_bank_high(), 3);
    }

    #[test]
    fn test_mbc3_rtc_latch_and_read() {
        let rom = make_rom(0x0f, 0x00, 0x00);
        let mut cart = Cartridge::from_data(rom).unwrap();
        assert!(cart.has_rtc());
        cart.write(0x4000, 0x08); // select seconds register
        cart.write(0x6000, 0x00);
        cart.write(0x6000, 0x01); // latch
        assert_eq!(cart.read(0xa000), 0x00);
    }

    #[test]
    fn test_mbc5_two_byte_bank_select() {
        let rom = make_rom(0x19, 0x06, 0x00); // MBC5, 2MB (128 banks)
        let mut cart = Cartridge::from_data(rom).unwrap();
        cart.write(0x2000, 0xaa);
        cart.write(0x3000, 0x01);
        assert_eq!(cart.effective_rom_bank_high(), 0x1aa);
    }

    #[test]
    fn test_checksum_validation() {
        let mut rom = make_rom(0x00, 0x00, 0x00);
        let mut sum: u8 = 0;
        for &byte in &rom[0x0134..=0x014c] {
            sum = sum.wrapping_sub(byte).wrapping_sub(1);
        }
        rom[HEADER_CHECKSUM] = sum;
        let cart = Cartridge::from_data(rom).unwrap();
        assert!(cart.checksum_valid());
    }

    #[test]
    fn test_rejects_cgb_only() {
        let mut rom = make_rom(0x00, 0x00, 0x00);
        rom[CGB_FLAG] = 0xc0;
        assert!(matches!(Cartridge::from_data(rom), Err(Error::CgbOnly(_))));
    }
}
