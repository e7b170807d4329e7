//! Character-at-a-time console device.

use crate::error::ShellError;
use std::io::{self, Read, Write};

pub const CARRIAGE_RETURN: u8 = b'\r';
pub const DELETE: u8 = 127;
pub const BACKSPACE: u8 = 8;
pub const BELL: u8 = 7;

/// A blocking character device: the shell reads keystrokes from it and echoes
/// them back to it.
pub trait Console {
    /// Block until the next input byte is available.
    fn get_char(&mut self) -> Result<u8, ShellError>;

    /// Write one byte to the display.
    fn put_char(&mut self, byte: u8) -> Result<(), ShellError>;
}

/// Console backed by the process standard input and output.
///
/// Input is read one byte at a time without polling. A line feed coming from a
/// cooked terminal or a pipe is delivered as a carriage return, which is the
/// line terminator the editor expects. End of input is reported as
/// [`ShellError::ConsoleClosed`].
pub struct StdConsole<R, W> {
    input: R,
    output: W,
    echo: bool,
}

impl<R: Read, W: Write> StdConsole<R, W> {
    /// `echo` controls whether typed characters are written back; a terminal in
    /// cooked mode already shows them.
    pub fn new(input: R, output: W, echo: bool) -> Self {
        Self {
            input,
            output,
            echo,
        }
    }
}

impl<R: Read, W: Write> Console for StdConsole<R, W> {
    fn get_char(&mut self) -> Result<u8, ShellError> {
        let mut byte = [0u8; 1];
        loop {
            match self.input.read(&mut byte) {
                Ok(0) => return Err(ShellError::ConsoleClosed),
                Ok(_) if byte[0] == b'\n' => return Ok(CARRIAGE_RETURN),
                Ok(_) => return Ok(byte[0]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ShellError::ConsoleRead(e)),
            }
        }
    }

    fn put_char(&mut self, byte: u8) -> Result<(), ShellError> {
        if !self.echo {
            return Ok(());
        }
        self.output
            .write_all(&[byte])
            .and_then(|_| self.output.flush())
            .map_err(ShellError::ConsoleWrite)
    }
}
