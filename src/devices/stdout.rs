use std::io::{stdout, Write};

use super::SerialDevice;

pub struct StdoutDevice {
    flush: bool,
}

impl StdoutDevice {
    pub fn new(flush: bool) -> Self {
        Self { flush }
    }
}

impl SerialDevice for StdoutDevice {
    fn exchange(&mut self, out: u8) -> u8 {
        print!("{}", out as char);
        if self.flush {
            let _ = stdout().flush();
        }
        0xff
    }

    fn description(&self) -> String {
        String::from("Stdout")
    }
}

impl Default for StdoutDevice {
    fn default() -> Self {
        Self::new(true)
    }
}
