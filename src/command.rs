use crate::env::Environment;
use anyhow::Result;
use std::io::Write;

/// Conventional exit code of a command.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
pub type ExitCode = i32;

/// Name and one-line description of a command in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandInfo {
    pub name: &'static str,
    pub summary: &'static str,
}

/// Object-safe trait for any command that can be executed by the shell.
pub trait ExecutableCommand {
    /// Executes the command, writing everything user-visible to `stdout`.
    ///
    /// An `Err` means `stdout` itself failed; ordinary failures are reported on
    /// `stdout` and turned into a non-zero exit code.
    fn execute(self: Box<Self>, stdout: &mut dyn Write, env: &mut Environment)
    -> Result<ExitCode>;
}

/// One entry of the command table.
///
/// `try_create` returns `None` when `name` is not this entry's command.
pub trait CommandFactory {
    fn info(&self) -> CommandInfo;

    /// Attempt to create a command instance for the provided name and arguments.
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>>;
}
