//! Shared error type for filesystem and buffer utilities.

use std::io;

use thiserror::Error;

/// Low-level error used by [`crate::util`] and [`crate::data`] helpers.
///
/// Domain-specific emulator errors (invalid ROM, unsupported mapper, ...)
/// live in the root crate's `error` module and wrap this type where I/O is
/// involved.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to open file: {0}")]
    Open(String),
    #[error("failed to read file: {0}")]
    Read(String),
    #[error("failed to write file: {0}")]
    Write(String),
    #[error("unexpected end of buffer while decoding")]
    Eof(#[from] io::Error),
}
