//! Domain error type for load-time failures.
//!
//! Loading a ROM, a boot ROM, or a battery save are the only operations
//! that can fail. Once a [`crate::gb::GameBoy`] exists, `step()` is
//! infallible.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("ROM image too small: expected at least 0x150 bytes, got {0}")]
    RomSize(usize),

    #[error("ROM declares CGB-only compatibility (0x{0:02x} at 0x0143), which is unsupported")]
    CgbOnly(u8),

    #[error("unsupported cartridge mapper type 0x{0:02x}")]
    UnsupportedMapper(u8),

    #[error("boot ROM has unexpected size: expected {expected}, got {actual}")]
    BootRomSize { expected: usize, actual: usize },

    #[error("invalid battery save size for this cartridge: expected {expected}, got {actual}")]
    SaveSize { expected: usize, actual: usize },

    #[error(transparent)]
    Io(#[from] dmg_core_common::error::Error),

    #[error("{0}")]
    Custom(String),
}
