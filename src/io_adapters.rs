use crate::console::Console;
use crate::error::ShellError;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{Result as IoResult, Write};
use std::rc::Rc;

/// Memory-backed console for driving the shell from a script.
///
/// Input bytes are handed out one at a time; once they run out the console
/// reports [`ShellError::ConsoleClosed`]. Echoed bytes go to a [`MemWriter`].
pub struct MemConsole {
    input: VecDeque<u8>,
    output: MemWriter,
}

impl MemConsole {
    /// Create a console that will deliver `input` and record echo in a fresh buffer.
    pub fn new(input: impl Into<Vec<u8>>) -> Self {
        Self::with_output(input, MemWriter::new())
    }

    /// Create a console whose echo is recorded in `output`.
    ///
    /// Sharing one writer between the console and the command output yields the
    /// full transcript a user would see.
    pub fn with_output(input: impl Into<Vec<u8>>, output: MemWriter) -> Self {
        Self {
            input: input.into().into(),
            output,
        }
    }

    /// Bytes not consumed yet.
    pub fn remaining(&self) -> usize {
        self.input.len()
    }

    /// Everything echoed so far, lossily decoded.
    pub fn echoed(&self) -> String {
        self.output.contents()
    }
}

impl Console for MemConsole {
    fn get_char(&mut self) -> Result<u8, ShellError> {
        self.input.pop_front().ok_or(ShellError::ConsoleClosed)
    }

    fn put_char(&mut self, byte: u8) -> Result<(), ShellError> {
        self.output
            .write_all(&[byte])
            .map_err(ShellError::ConsoleWrite)
    }
}

/// Memory-backed writer; clones share the same buffer.
#[derive(Clone, Default)]
pub struct MemWriter {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl MemWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collected bytes, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.borrow()).into_owned()
    }
}

impl Write for MemWriter {
    fn write(&mut self, data: &[u8]) -> IoResult<usize> {
        self.buf.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mem_console_hands_out_bytes_then_closes() {
        let mut console = MemConsole::new("ab");
        assert_eq!(console.get_char().unwrap(), b'a');
        assert_eq!(console.remaining(), 1);
        assert_eq!(console.get_char().unwrap(), b'b');
        assert!(matches!(console.get_char(), Err(ShellError::ConsoleClosed)));
    }

    #[test]
    fn test_shared_writer_collects_echo_and_output() {
        let transcript = MemWriter::new();
        let mut console = MemConsole::with_output("", transcript.clone());
        console.put_char(b'x').unwrap();

        let mut out = transcript.clone();
        write!(out, "yz").unwrap();

        assert_eq!(transcript.contents(), "xyz");
        assert_eq!(console.echoed(), "xyz");
    }
}
