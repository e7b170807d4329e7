//! Process collaborator: spawn programs by name and list what is running.

use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use std::borrow::Cow;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

pub type Pid = u32;

/// Name the shell lists itself under.
pub const SHELL_PROCESS_NAME: &str = "bash";

pub trait ProcessService {
    /// Start the program called `name` and return its id.
    fn spawn(&mut self, name: &str) -> Result<Pid>;

    /// Ids of every known live process, the shell first.
    fn pids(&mut self) -> Vec<Pid>;

    fn name_of(&self, pid: Pid) -> Option<String>;

    /// Collect children that have exited.
    fn reap(&mut self) {}
}

struct Spawned {
    name: String,
    child: Child,
}

/// Host processes launched with `std::process`, located through `PATH`.
///
/// Children get a null stdin so they never compete with the console for input.
pub struct HostProcesses {
    search_paths: Option<String>,
    children: Vec<Spawned>,
}

impl HostProcesses {
    pub fn new(search_paths: Option<String>) -> Self {
        Self {
            search_paths,
            children: Vec::new(),
        }
    }
}

impl ProcessService for HostProcesses {
    fn spawn(&mut self, name: &str) -> Result<Pid> {
        let search_paths = self.search_paths.as_deref().unwrap_or("");
        let executable = find_command_path(OsStr::new(search_paths), Path::new(name))
            .ok_or_else(|| anyhow!("{}: program not found", name))?
            .into_owned();
        let child = Command::new(&executable)
            .stdin(Stdio::null())
            .spawn()
            .with_context(|| format!("{}: failed to spawn {}", name, executable.display()))?;
        let pid = child.id();
        info!("spawned {} as process {}", name, pid);
        self.children.push(Spawned {
            name: name.to_string(),
            child,
        });
        Ok(pid)
    }

    fn pids(&mut self) -> Vec<Pid> {
        self.reap();
        std::iter::once(std::process::id())
            .chain(self.children.iter().map(|s| s.child.id()))
            .collect()
    }

    /// Wait on exited children and forget them.
    fn reap(&mut self) {
        self.children.retain_mut(|spawned| match spawned.child.try_wait() {
            Ok(Some(status)) => {
                debug!("process {} ({}) exited: {}", spawned.child.id(), spawned.name, status);
                false
            }
            Ok(None) => true,
            Err(_) => false,
        });
    }

    fn name_of(&self, pid: Pid) -> Option<String> {
        if pid == std::process::id() {
            return Some(SHELL_PROCESS_NAME.to_string());
        }
        self.children
            .iter()
            .find(|s| s.child.id() == pid)
            .map(|s| s.name.clone())
    }
}

/// Resolve a program path the way a typical shell would.
///
/// - Absolute path: returned if it exists.
/// - `./foo` on Unix: returned if it exists.
/// - Single component: each directory of `search_paths` is tried in order.
/// - Several components: returned if it exists relative to the current directory.
/// - Empty path: `None`.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    let search_in_current_dir = cfg!(not(unix)) || path.starts_with("./");
    if search_in_current_dir && path.exists() {
        return Some(Cow::Borrowed(path));
    }

    let mut components = path.components();
    match (components.next(), components.next()) {
        (None, _) => None,
        (Some(single), None) => find_in_path(search_paths, single.as_os_str()).map(Cow::Owned),
        _ => find_by_path(path).map(Cow::Borrowed),
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(search_paths)
        .map(|dir| dir.join(cmd))
        .find(|candidate| candidate.is_file())
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.exists() { Some(path) } else { None }
}

/// Process table for tests: the shell is pid 0, spawns count up from 1.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct FakeProcesses {
    pub spawned: Vec<String>,
    pub reaped: std::rc::Rc<std::cell::Cell<usize>>,
}

#[cfg(test)]
impl ProcessService for FakeProcesses {
    fn spawn(&mut self, name: &str) -> Result<Pid> {
        if name.is_empty() {
            return Err(anyhow!("empty program name"));
        }
        self.spawned.push(name.to_string());
        Ok(self.spawned.len() as Pid)
    }

    fn pids(&mut self) -> Vec<Pid> {
        (0..=self.spawned.len() as Pid).collect()
    }

    fn name_of(&self, pid: Pid) -> Option<String> {
        match pid {
            0 => Some(SHELL_PROCESS_NAME.to_string()),
            n => self.spawned.get(n as usize - 1).cloned(),
        }
    }

    fn reap(&mut self) {
        self.reaped.set(self.reaped.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn test_absolute_existing() {
        let path = Path::new("/bin/sh");
        let found = find_command_path(OsStr::new("/bin"), path).expect("/bin/sh should exist");
        assert_eq!(found.as_ref(), path);
    }

    #[test]
    #[cfg(unix)]
    fn test_single_component_found_in_path() {
        let found = find_command_path(OsStr::new("/nonexistent:/bin"), Path::new("sh"))
            .expect("sh should be found in /bin");
        assert!(found.as_ref().starts_with("/bin"));
        assert!(found.as_ref().ends_with("sh"));
    }

    #[test]
    fn test_missing_and_empty() {
        assert!(find_command_path(OsStr::new("/bin"), Path::new("no_such_program_xyz")).is_none());
        assert!(find_command_path(OsStr::new("/bin"), Path::new("")).is_none());
    }

    #[test]
    fn test_shell_is_listed_first() {
        let mut processes = HostProcesses::new(None);
        let pids = processes.pids();
        assert_eq!(pids, vec![std::process::id()]);
        assert_eq!(
            processes.name_of(std::process::id()).as_deref(),
            Some(SHELL_PROCESS_NAME)
        );
    }

    #[test]
    fn test_spawn_unknown_program_fails() {
        let mut processes = HostProcesses::new(Some("/nonexistent".to_string()));
        let err = processes.spawn("hello").unwrap_err();
        assert!(err.to_string().contains("program not found"));
    }

    #[test]
    #[cfg(unix)]
    fn test_exited_program_is_reaped() {
        let mut processes = HostProcesses::new(Some("/bin:/usr/bin".to_string()));
        processes.spawn("true").unwrap();
        processes.children[0].child.wait().unwrap();

        processes.reap();
        assert!(processes.children.is_empty());
    }

    #[test]
    #[cfg(unix)]
    fn test_spawned_program_is_tracked() {
        let mut processes = HostProcesses::new(Some("/bin:/usr/bin".to_string()));
        let pid = processes.spawn("sleep").unwrap();
        assert_eq!(processes.name_of(pid).as_deref(), Some("sleep"));
        for spawned in &mut processes.children {
            let _ = spawned.child.kill();
            let _ = spawned.child.wait();
        }
    }
}
