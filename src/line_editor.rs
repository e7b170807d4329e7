//! Incremental line editor fed by single-character reads.

use crate::buffer::GrowBuffer;
use crate::console::{BACKSPACE, BELL, CARRIAGE_RETURN, Console, DELETE};
use crate::error::ShellError;

/// Initial line capacity in bytes.
pub const DEFAULT_LINE_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Collecting,
    Done,
}

/// Assembles a line from console keystrokes, echoing as it goes.
///
/// The delete key erases the last character on screen and in the buffer; on an
/// empty line it rings the bell instead. A carriage return finishes the line.
pub struct LineEditor {
    line: GrowBuffer<u8>,
    state: EditorState,
}

impl LineEditor {
    pub fn new() -> Result<Self, ShellError> {
        Self::with_capacity(DEFAULT_LINE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Result<Self, ShellError> {
        Ok(Self {
            line: GrowBuffer::with_capacity(capacity)?,
            state: EditorState::Collecting,
        })
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    /// Bytes collected so far.
    pub fn pending(&self) -> &[u8] {
        self.line.as_slice()
    }

    pub fn capacity(&self) -> usize {
        self.line.capacity()
    }

    /// Block on the console until a full line has been entered.
    ///
    /// Returns an empty string for a bare carriage return. Read failures are not
    /// retried.
    pub fn read_line(&mut self, console: &mut dyn Console) -> Result<String, ShellError> {
        self.reset();
        loop {
            let byte = console.get_char()?;
            if let Some(line) = self.feed(byte, console)? {
                return Ok(line);
            }
        }
    }

    /// Process one input byte. Returns the finished line once a carriage return
    /// arrives.
    pub fn feed(
        &mut self,
        byte: u8,
        console: &mut dyn Console,
    ) -> Result<Option<String>, ShellError> {
        if self.state == EditorState::Done {
            self.reset();
        }
        match byte {
            CARRIAGE_RETURN => {
                if self.line.is_empty() {
                    return Ok(Some(String::new()));
                }
                self.state = EditorState::Done;
                Ok(Some(String::from_utf8_lossy(self.line.as_slice()).into_owned()))
            }
            DELETE => {
                if self.erase_char() {
                    console.put_char(BACKSPACE)?;
                    console.put_char(b' ')?;
                    console.put_char(BACKSPACE)?;
                } else {
                    console.put_char(BELL)?;
                }
                Ok(None)
            }
            other => {
                console.put_char(other)?;
                self.line.push(other)?;
                Ok(None)
            }
        }
    }

    /// Drop the last character, every byte of it for a multi-byte UTF-8
    /// sequence. Returns false on an empty line.
    fn erase_char(&mut self) -> bool {
        let mut erased = false;
        while let Some(byte) = self.line.pop() {
            erased = true;
            if byte & 0xC0 != 0x80 {
                break;
            }
        }
        erased
    }

    fn reset(&mut self) {
        self.line.clear();
        self.state = EditorState::Collecting;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io_adapters::MemConsole;

    fn read(input: &[u8], capacity: usize) -> (String, String) {
        let mut console = MemConsole::new(input.to_vec());
        let mut editor = LineEditor::with_capacity(capacity).unwrap();
        let line = editor.read_line(&mut console).unwrap();
        (line, console.echoed())
    }

    #[test]
    fn test_delete_erases_last_char() {
        let (line, echo) = read(b"ab\x7fc\r", DEFAULT_LINE_CAPACITY);
        assert_eq!(line, "ac");
        assert_eq!(echo, "ab\x08 \x08c");
    }

    #[test]
    fn test_delete_erases_whole_multibyte_char() {
        let (line, echo) = read("aé€\x7f\x7fb\r".as_bytes(), 2);
        assert_eq!(line, "ab");
        assert_eq!(echo, "aé€\x08 \x08\x08 \x08b");
    }

    #[test]
    fn test_delete_on_empty_rings_bell() {
        let mut console = MemConsole::new(b"\x7f\x7fx\r".to_vec());
        let mut editor = LineEditor::new().unwrap();

        assert_eq!(editor.feed(DELETE, &mut console).unwrap(), None);
        assert!(editor.pending().is_empty());
        assert_eq!(editor.state(), EditorState::Collecting);

        let line = editor.read_line(&mut console).unwrap();
        assert_eq!(line, "x");
        assert_eq!(console.echoed(), "\x07\x07\x07x");
    }

    #[test]
    fn test_bare_return_is_empty_line() {
        let (line, echo) = read(b"\r", DEFAULT_LINE_CAPACITY);
        assert_eq!(line, "");
        assert_eq!(echo, "");
    }

    #[test]
    fn test_line_erased_back_to_empty_is_empty() {
        let (line, _) = read(b"ab\x7f\x7f\r", DEFAULT_LINE_CAPACITY);
        assert_eq!(line, "");
    }

    #[test]
    fn test_growth_preserves_content() {
        let text = "the quick brown fox jumps over the lazy dog";
        let mut input = text.as_bytes().to_vec();
        input.push(b'\r');

        let (small, _) = read(&input, 2);
        let (large, _) = read(&input, 256);
        assert_eq!(small, text);
        assert_eq!(small, large);
    }

    #[test]
    fn test_capacity_doubles_at_boundary() {
        let mut console = MemConsole::new(Vec::new());
        let mut editor = LineEditor::with_capacity(4).unwrap();
        for &b in b"abcd" {
            editor.feed(b, &mut console).unwrap();
        }
        assert_eq!(editor.capacity(), 4);
        editor.feed(b'e', &mut console).unwrap();
        assert_eq!(editor.capacity(), 8);
        assert_eq!(editor.pending(), b"abcde");
    }

    #[test]
    fn test_closed_console_is_fatal() {
        let mut console = MemConsole::new(b"abc".to_vec());
        let mut editor = LineEditor::new().unwrap();
        assert!(matches!(
            editor.read_line(&mut console),
            Err(ShellError::ConsoleClosed)
        ));
    }

    #[test]
    fn test_consecutive_lines_start_fresh() {
        let mut console = MemConsole::new(b"one\rtwo\r".to_vec());
        let mut editor = LineEditor::new().unwrap();
        assert_eq!(editor.read_line(&mut console).unwrap(), "one");
        assert_eq!(editor.state(), EditorState::Done);
        assert_eq!(editor.read_line(&mut console).unwrap(), "two");
    }
}
