//! The UART console every log record is written to.

use core::{
    ffi::{c_char, c_int, c_uint},
    fmt,
};

unsafe extern "C" {
    /// Writes one character to the platform UART.
    fn uart_putc(ch: c_char) -> c_int;
}

/// Writes one byte to the UART.
fn put_byte(byte: u8) {
    // SAFETY:
    // `uart_putc()` accepts any byte once `initialise_devices()` has run, which happens before
    // the first record is logged.
    unsafe { uart_putc(byte as c_char) };
}

/// The platform UART as a [`fmt::Write`] sink.
#[derive(Debug)]
pub struct Console;

impl fmt::Write for Console {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            if byte == b'\n' {
                put_byte(b'\r');
            }
            put_byte(byte);
        }

        Ok(())
    }
}

/// Character output used by the C side of the loader.
#[unsafe(no_mangle)]
pub extern "C" fn plat_console_putchar(c: c_uint) -> c_int {
    put_byte(c as u8);
    0
}
