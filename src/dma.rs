//! OAM DMA engine.
//!
//! DMG OAM DMA only; CGB general-purpose/HBlank VRAM DMA (HDMA1-5) has no
//! counterpart here.

use std::fmt::{self, Display, Formatter};

use crate::consts::DMA_ADDR;

const SETUP_DELAY: i32 = 8;
const TRANSFER_LEN: u16 = 160;
const CYCLES_PER_BYTE: i32 = 4;

pub struct Dma {
    /// High byte of the OAM DMA source address, as written to 0xFF46.
    value_dma: u8,
    /// Countdown of the initial setup delay; `-1` when no setup is pending.
    setup_remaining: i32,
    /// Source address currently being copied from, once setup completes.
    source: u16,
    /// Bytes already copied in the active transfer.
    progress: u16,
    /// Fractional progress (T-cycles) within the current byte's 4-cycle cost.
    byte_cycles: i32,
    /// Last byte placed on the CPU's data bus by the DMA engine; reads from
    /// anywhere but HRAM return this value while a transfer is active.
    latch: u8,
    active: bool,
}

impl Dma {
    pub fn new() -> Self {
        Self {
            value_dma: 0x0,
            setup_remaining: -1,
            source: 0x0,
            progress: 0,
            byte_cycles: 0,
            latch: 0xff,
            active: false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn read(&self, addr: u16) -> u8 {
        match addr {
            DMA_ADDR => self.value_dma,
            _ => 0xff,
        }
    }

    /// Writing `0xFF46` schedules a transfer from `value << 8`. If one is
    /// already mid-setup or mid-transfer, it ends immediately and the new
    /// one starts its own 8-cycle setup delay from here.
    pub fn write(&mut self, _addr: u16, value: u8) {
        self.value_dma = value;
        self.setup_remaining = SETUP_DELAY;
        self.active = true;
        self.progress = 0;
        self.byte_cycles = 0;
    }

    /// Advances the DMA state machine by `cycles` T-cycles. Returns the
    /// list of `(source_addr, oam_index)` byte copies that became due this
    /// step, so the BUS can perform them with direct (gating-bypassing)
    /// OAM writes.
    pub fn advance(&mut self, cycles: u16) -> Vec<(u16, u8)> {
        let mut copies = Vec::new();
        if !self.active {
            return copies;
        }

        let mut remaining = cycles as i32;

        if self.setup_remaining >= 0 {
            if remaining < self.setup_remaining {
                self.setup_remaining -= remaining;
                return copies;
            }
            remaining -= self.setup_remaining;
            self.setup_remaining = -1;
            self.source = remap_source((self.value_dma as u16) << 8);
        }

        self.byte_cycles += remaining;
        while self.byte_cycles >= CYCLES_PER_BYTE && self.progress < TRANSFER_LEN {
            self.byte_cycles -= CYCLES_PER_BYTE;
            let src = self.source.wrapping_add(self.progress);
            copies.push((src, self.progress as u8));
            self.progress += 1;
        }

        if self.progress >= TRANSFER_LEN {
            self.active = false;
        }

        copies
    }

    /// The byte to return for any non-HRAM read while a transfer is active.
    pub fn latch(&self) -> u8 {
        self.latch
    }

    pub fn set_latch(&mut self, value: u8) {
        self.latch = value;
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn in_setup(&self) -> bool {
        self.active && self.setup_remaining >= 0
    }

    pub fn value_dma(&self) -> u8 {
        self.value_dma
    }

    pub fn description(&self) -> String {
        format!(
            "active: {}, source: 0x{:04x}, progress: {}/{}",
            self.active, self.source, self.progress, TRANSFER_LEN
        )
    }
}

/// `0xE000-0xFFFF` sources are remapped down to the `0xC000-0xDFFF` WRAM
/// echo, matching real OAM DMA address-bus wiring.
fn remap_source(addr: u16) -> u16 {
    if (0xe000..=0xffff).contains(&addr) {
        addr - 0x2000
    } else {
        addr
    }
}

impl Default for Dma {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Dma {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dma_default_inactive() {
        let dma = Dma::default();
        assert!(!dma.active());
    }

    #[test]
    fn test_dma_setup_delay_then_transfer() {
        let mut dma = Dma::new();
        dma.write(0xff46, 0xc0);
        assert!(dma.in_setup());

        let copies = dma.advance(8);
        assert!(copies.is_empty());
        assert!(!dma.in_setup());

        let copies = dma.advance(4);
        assert_eq!(copies.len(), 1);
        assert_eq!(copies[0], (0xc000, 0));
    }

    #[test]
    fn test_dma_completes_after_640_cycles() {
        let mut dma = Dma::new();
        dma.write(0xff46, 0xc0);
        dma.advance(8 + 640);
        assert!(!dma.active());
    }

    #[test]
    fn test_dma_remaps_echo_source() {
        let mut dma = Dma::new();
        dma.write(0xff46, 0xe0);
        dma.advance(8 + 4);
        assert_eq!(dma.source, 0xc000);
    }

    #[test]
    fn test_rescheduling_ends_old_transfer() {
        let mut dma = Dma::new();
        dma.write(0xff46, 0xc0);
        dma.advance(8 + 40);
        dma.write(0xff46, 0xd0);
        assert!(dma.in_setup());
        assert_eq!(dma.progress, 0);
    }
}
