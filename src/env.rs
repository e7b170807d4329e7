use crate::buffer::{GrowBuffer, GrowError};
use crate::command::CommandInfo;
use crate::fs::RootFs;
use crate::led::{Led, SimulatedLed};
use crate::process::{HostProcesses, ProcessService};
use std::collections::HashMap;
use std::env as stdenv;

/// Initial working directory capacity in bytes.
pub const DEFAULT_WD_CAPACITY: usize = 20;

/// The shell's current working directory.
///
/// Always absolute, always ending with `/`, components separated by `/`. It
/// starts at the root and is only changed by `cd`.
#[derive(Debug, Clone)]
pub struct WorkingDir {
    path: GrowBuffer<u8>,
}

impl WorkingDir {
    pub fn new() -> Result<Self, GrowError> {
        Self::with_capacity(DEFAULT_WD_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Result<Self, GrowError> {
        let mut path = GrowBuffer::with_capacity(capacity)?;
        path.push(b'/')?;
        Ok(Self { path })
    }

    pub fn path(&self) -> String {
        String::from_utf8_lossy(self.path.as_slice()).into_owned()
    }

    pub fn capacity(&self) -> usize {
        self.path.capacity()
    }

    /// Turn `target` into a normalized absolute shell path.
    ///
    /// Absolute targets start over from `/`, relative ones continue from the
    /// working directory. `.` is dropped and `..` removes the previous
    /// component; `..` at the root stays at the root.
    pub fn resolve(&self, target: &str) -> String {
        let current = self.path();
        let mut components: Vec<&str> = Vec::new();
        if !target.starts_with('/') {
            components.extend(current.split('/').filter(|c| !c.is_empty()));
        }
        for component in target.split('/') {
            match component {
                "" | "." => {}
                ".." => {
                    components.pop();
                }
                name => components.push(name),
            }
        }
        format!("/{}", components.join("/"))
    }

    /// Move to `target`, which the caller has already checked.
    pub fn change_to(&mut self, target: &str) -> Result<(), GrowError> {
        let resolved = self.resolve(target);
        let needed = resolved.len() + usize::from(!resolved.ends_with('/'));
        self.path.ensure_capacity(needed)?;
        self.path.clear();
        self.path.extend_from_slice(resolved.as_bytes())?;
        if !resolved.ends_with('/') {
            self.path.push(b'/')?;
        }
        Ok(())
    }
}

/// Everything a command can reach: the working directory, the filesystem and
/// the external collaborators (processes, LED).
///
/// Note: fields are public so commands can borrow them independently.
pub struct Environment {
    /// Variables from the host process; `PATH` is used to locate programs.
    pub vars: HashMap<String, String>,
    pub cwd: WorkingDir,
    pub fs: RootFs,
    pub processes: Box<dyn ProcessService>,
    pub led: Box<dyn Led>,
    /// Names and summaries of the command table, for `help`.
    pub commands: Vec<CommandInfo>,
}

impl Environment {
    /// Environment rooted at `fs`, with host processes and a simulated LED.
    pub fn new(fs: RootFs, wd_capacity: usize) -> Result<Self, GrowError> {
        let vars: HashMap<String, String> = stdenv::vars().collect();
        let processes = HostProcesses::new(vars.get("PATH").cloned());
        Ok(Self {
            vars,
            cwd: WorkingDir::with_capacity(wd_capacity)?,
            fs,
            processes: Box::new(processes),
            led: Box::new(SimulatedLed::default()),
            commands: Vec::new(),
        })
    }

    /// Environment with explicit collaborators.
    pub fn with_services(
        fs: RootFs,
        processes: Box<dyn ProcessService>,
        led: Box<dyn Led>,
        wd_capacity: usize,
    ) -> Result<Self, GrowError> {
        Ok(Self {
            vars: HashMap::new(),
            cwd: WorkingDir::with_capacity(wd_capacity)?,
            fs,
            processes,
            led,
            commands: Vec::new(),
        })
    }

    /// Get the value of a variable, falling back to the host environment.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .cloned()
            .or_else(|| stdenv::var(key).ok())
    }

    /// Absolute shell path of `target` relative to the working directory.
    pub fn resolve(&self, target: &str) -> String {
        self.cwd.resolve(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_root() {
        let wd = WorkingDir::new().unwrap();
        assert_eq!(wd.path(), "/");
        assert_eq!(wd.capacity(), DEFAULT_WD_CAPACITY);
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let mut wd = WorkingDir::new().unwrap();
        wd.change_to("docs").unwrap();
        assert_eq!(wd.path(), "/docs/");

        assert_eq!(wd.resolve("a.txt"), "/docs/a.txt");
        assert_eq!(wd.resolve("/etc/x"), "/etc/x");
        assert_eq!(wd.resolve("./a//b/"), "/docs/a/b");
        assert_eq!(wd.resolve(".."), "/");
        assert_eq!(wd.resolve("../../.."), "/");
    }

    #[test]
    fn test_change_to_grows_capacity() {
        let mut wd = WorkingDir::with_capacity(4).unwrap();
        wd.change_to("alpha/beta/gamma").unwrap();
        assert_eq!(wd.path(), "/alpha/beta/gamma/");
        assert_eq!(wd.capacity(), 32);

        wd.change_to("..").unwrap();
        assert_eq!(wd.path(), "/alpha/beta/");
        wd.change_to("/").unwrap();
        assert_eq!(wd.path(), "/");
    }

    #[test]
    fn test_change_to_exact_fit_does_not_grow() {
        let mut wd = WorkingDir::with_capacity(8).unwrap();
        wd.change_to("abcdef").unwrap();
        assert_eq!(wd.path(), "/abcdef/");
        assert_eq!(wd.capacity(), 8);

        wd.change_to("abcdefg").unwrap();
        assert_eq!(wd.path(), "/abcdef/abcdefg/");
        assert_eq!(wd.capacity(), 16);
    }

    #[test]
    fn test_env_reads_from_process_env() {
        let env = Environment::new(RootFs::new("."), DEFAULT_WD_CAPACITY).unwrap();
        assert!(env.get_var("PATH").is_some());
        assert_eq!(env.cwd.path(), "/");
    }
}
