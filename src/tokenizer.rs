//! Splitting a finished line into an argument vector.
//!
//! Only spaces and tabs separate arguments. There is no quoting, escaping or
//! substitution: every maximal run of other characters is one argument.

use crate::buffer::{GrowBuffer, GrowError};

/// Initial number of argument slots.
pub const DEFAULT_ARG_CAPACITY: usize = 5;

fn is_separator(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Owned arguments of one command line; `argv[0]` is the command name.
#[derive(Debug, Clone)]
pub struct ArgumentVector {
    args: GrowBuffer<String>,
}

impl ArgumentVector {
    pub fn with_capacity(capacity: usize) -> Result<Self, GrowError> {
        Ok(Self {
            args: GrowBuffer::with_capacity(capacity)?,
        })
    }

    pub fn push(&mut self, arg: impl Into<String>) -> Result<(), GrowError> {
        self.args.push(arg.into())
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Allocated argument slots.
    pub fn capacity(&self) -> usize {
        self.args.capacity()
    }

    pub fn as_slice(&self) -> &[String] {
        self.args.as_slice()
    }

    /// The command name, if there is one.
    pub fn command(&self) -> Option<&str> {
        self.args.as_slice().first().map(String::as_str)
    }

    /// Everything after the command name.
    pub fn operands(&self) -> &[String] {
        self.args.as_slice().get(1..).unwrap_or(&[])
    }
}

impl PartialEq<[&str]> for ArgumentVector {
    fn eq(&self, other: &[&str]) -> bool {
        self.as_slice().len() == other.len()
            && self.as_slice().iter().zip(other).all(|(a, b)| a == b)
    }
}

/// Split `line` with the default argument capacity.
pub fn tokenize(line: &str) -> Result<ArgumentVector, GrowError> {
    tokenize_with_capacity(line, DEFAULT_ARG_CAPACITY)
}

/// Split `line` into arguments, starting with room for `capacity` of them.
pub fn tokenize_with_capacity(line: &str, capacity: usize) -> Result<ArgumentVector, GrowError> {
    let mut argv = ArgumentVector::with_capacity(capacity)?;
    let mut rest = line.trim_start_matches(is_separator);
    while !rest.is_empty() {
        let end = rest.find(is_separator).unwrap_or(rest.len());
        argv.push(&rest[..end])?;
        rest = rest[end..].trim_start_matches(is_separator);
    }
    Ok(argv)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_separator_runs() {
        let argv = tokenize("  echo   hi  there ").unwrap();
        assert_eq!(argv, *["echo", "hi", "there"].as_slice());
        assert_eq!(argv.command(), Some("echo"));
        assert_eq!(argv.operands(), ["hi".to_string(), "there".to_string()]);
    }

    #[test]
    fn test_tabs_separate_too() {
        let argv = tokenize("grep\tab\t \tfile.txt").unwrap();
        assert_eq!(argv, *["grep", "ab", "file.txt"].as_slice());
    }

    #[test]
    fn test_only_separators_yield_nothing() {
        let argv = tokenize(" \t  \t").unwrap();
        assert!(argv.is_empty());
        assert_eq!(argv.command(), None);
        assert!(argv.operands().is_empty());

        assert!(tokenize("").unwrap().is_empty());
    }

    #[test]
    fn test_other_whitespace_is_not_a_separator() {
        let argv = tokenize("a\u{a0}b c").unwrap();
        assert_eq!(argv, *["a\u{a0}b", "c"].as_slice());
    }

    #[test]
    fn test_slots_double_past_capacity() {
        let argv = tokenize_with_capacity("a b c d e f g", 5).unwrap();
        assert_eq!(argv.len(), 7);
        assert_eq!(argv.capacity(), 10);
        assert_eq!(argv, *["a", "b", "c", "d", "e", "f", "g"].as_slice());
    }
}
