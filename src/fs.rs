//! Filesystem seen by the shell: a host directory mounted as `/`.
//!
//! Shell paths are always absolute and normalized (see
//! [`WorkingDir::resolve`](crate::env::WorkingDir::resolve)) before they get
//! here, so mapping one onto the host is a plain join under the root.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// How a file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    /// Create or truncate, then write.
    Write,
    /// Create if missing, write at the end.
    Append,
}

#[derive(Debug, Clone)]
pub struct RootFs {
    root: PathBuf,
}

impl RootFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Host location of the shell path `path`.
    pub fn host_path(&self, path: &str) -> PathBuf {
        let mut host = self.root.clone();
        for component in path
            .split('/')
            .filter(|c| !matches!(*c, "" | "." | ".."))
        {
            host.push(component);
        }
        host
    }

    pub fn open(&self, path: &str, mode: OpenMode) -> io::Result<File> {
        let host = self.host_path(path);
        match mode {
            OpenMode::Read => File::open(host),
            OpenMode::Write => File::create(host),
            OpenMode::Append => OpenOptions::new().create(true).append(true).open(host),
        }
    }

    pub fn make_dir(&self, path: &str) -> io::Result<()> {
        fs::create_dir(self.host_path(path))
    }

    pub fn open_dir(&self, path: &str) -> io::Result<DirHandle> {
        Ok(DirHandle {
            entries: fs::read_dir(self.host_path(path))?,
        })
    }

    pub fn is_dir(&self, path: &str) -> bool {
        self.host_path(path).is_dir()
    }
}

/// An open directory; entries are read one by one.
pub struct DirHandle {
    entries: fs::ReadDir,
}

impl DirHandle {
    /// Name of the next entry, or `None` at the end of the directory.
    pub fn read_entry(&mut self) -> io::Result<Option<String>> {
        match self.entries.next() {
            Some(entry) => Ok(Some(entry?.file_name().to_string_lossy().into_owned())),
            None => Ok(None),
        }
    }
}
