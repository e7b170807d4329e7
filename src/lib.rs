//! An interactive, line-oriented command shell.
//!
//! The shell reads keystrokes one at a time from a [`console::Console`],
//! assembles them into a line with [`line_editor::LineEditor`], splits the line
//! into arguments with [`tokenizer::tokenize`] and runs the matching builtin
//! through the [`Interpreter`]'s command table. `grep` uses the small pattern
//! matcher in [`matcher`].
//!
//! Filesystem, process and LED access go through the collaborators held by
//! [`env::Environment`], so the whole shell can be driven from memory in tests.

pub mod buffer;
mod builtin;
pub mod command;
pub mod config;
pub mod console;
pub mod env;
pub mod error;
pub mod fs;
mod interpreter;
pub mod io_adapters;
pub mod led;
pub mod line_editor;
pub mod logging;
pub mod matcher;
pub mod process;
pub mod tokenizer;

/// Just a convenient re-export of the command shell.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::Interpreter;
