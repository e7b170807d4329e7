use crate::buffer::GrowError;
use std::io;
use thiserror::Error;

/// Conditions that terminate the shell loop.
///
/// Everything recoverable (unknown commands, bad arguments, missing files) is
/// reported by the command that hit it and never becomes a `ShellError`.
#[derive(Debug, Error)]
pub enum ShellError {
    /// The console reached end of input.
    #[error("console closed")]
    ConsoleClosed,

    #[error("console read failed: {0}")]
    ConsoleRead(#[source] io::Error),

    #[error("console write failed: {0}")]
    ConsoleWrite(#[source] io::Error),

    #[error("out of memory: {0}")]
    OutOfMemory(#[from] GrowError),

    #[error("output failed: {0}")]
    Output(#[from] io::Error),

    /// A command failed in a way it could not report itself.
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}
