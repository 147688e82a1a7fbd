//! Durable storage behind the user table.
//!
//! The table only ever needs two things from its file: read everything once
//! at startup, and append one record per insert.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Append-only byte store holding serialized records.
pub trait RecordBacking: Send + Sync {
    /// Full contents, or `None` when nothing has been written yet.
    fn read_all(&self) -> io::Result<Option<Vec<u8>>>;

    /// Append `bytes` as one write. Must be durable when it returns `Ok`.
    fn append(&self, bytes: &[u8]) -> io::Result<()>;

    /// Human-readable location, used in logs and errors.
    fn location(&self) -> PathBuf;
}

/// Flat file on the local filesystem (0600 on unix).
#[derive(Debug, Clone)]
pub struct FileBacking {
    path: PathBuf,
}

impl FileBacking {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordBacking for FileBacking {
    fn read_all(&self) -> io::Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn append(&self, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path)?;
        file.write_all(bytes)?;
        file.sync_data()
    }

    fn location(&self) -> PathBuf {
        self.path.clone()
    }
}
