use std::fmt::{self, Display, Formatter};

use super::SerialDevice;

/// Captures every byte shifted out over serial, for assertions in test ROM
/// harnesses that report pass/fail status as printable characters.
pub struct BufferDevice {
    buffer: Vec<u8>,
}

impl BufferDevice {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.buffer).into_owned()
    }
}

impl SerialDevice for BufferDevice {
    fn exchange(&mut self, out: u8) -> u8 {
        self.buffer.push(out);
        0xff
    }

    fn description(&self) -> String {
        String::from("Buffer")
    }
}

impl Default for BufferDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for BufferDevice {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Buffer")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captures_bytes() {
        let mut device = BufferDevice::new();
        device.exchange(b'O');
        device.exchange(b'K');
        assert_eq!(device.text(), "OK");
    }
}
