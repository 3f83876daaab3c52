//! Durable storage for document records: one JSON file per name.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::io::naming::{file_name, name_from_file};

/// Where document records live.
///
/// Every write fully replaces the record for that name.
pub trait Backend: Send + Sync {
    /// Names of every record currently stored (unordered).
    fn scan(&self) -> StoreResult<Vec<String>>;

    /// Parsed record for `name`.
    fn read(&self, name: &str) -> StoreResult<Value>;

    /// Replace the record for `name`.
    fn write(&self, name: &str, record: &Value) -> StoreResult<()>;

    /// Delete the record for `name`. An absent record is not an error.
    fn delete(&self, name: &str) -> StoreResult<()>;
}

/// Filesystem backend rooted at a data directory.
#[derive(Debug, Clone)]
pub struct FsBackend {
    dir: PathBuf,
}

impl FsBackend {
    /// Open (and create if needed) the data directory.
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|err| StoreError::persistence(&dir, err))?;
        debug!(dir = %dir.display(), "opened data directory");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record file for `name`.
    pub fn path_for(&self, name: &str) -> StoreResult<PathBuf> {
        Ok(self.dir.join(file_name(name)?))
    }
}

impl Backend for FsBackend {
    fn scan(&self) -> StoreResult<Vec<String>> {
        let entries =
            fs::read_dir(&self.dir).map_err(|err| StoreError::persistence(&self.dir, err))?;
        let mut names = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(file) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            match name_from_file(file) {
                Some(name) => names.push(name),
                None => debug!(file, "ignoring foreign file in data directory"),
            }
        }
        Ok(names)
    }

    fn read(&self, name: &str) -> StoreResult<Value> {
        let path = self.path_for(name)?;
        debug!(path = %path.display(), "reading record");
        let contents =
            fs::read_to_string(&path).map_err(|err| StoreError::persistence(&path, err))?;
        serde_json::from_str(&contents).map_err(|err| {
            StoreError::persistence(&path, std::io::Error::new(ErrorKind::InvalidData, err))
        })
    }

    fn write(&self, name: &str, record: &Value) -> StoreResult<()> {
        let path = self.path_for(name)?;
        debug!(path = %path.display(), "writing record");
        let mut buf = serde_json::to_string_pretty(record).map_err(|err| {
            StoreError::persistence(&path, std::io::Error::new(ErrorKind::InvalidData, err))
        })?;
        buf.push('\n');
        write_atomic(&path, &buf)
    }

    fn delete(&self, name: &str) -> StoreResult<()> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "deleted record");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!(path = %path.display(), "record already absent");
                Ok(())
            }
            Err(err) => Err(StoreError::persistence(&path, err)),
        }
    }
}

/// Write to a temp sibling, then rename over `path`.
fn write_atomic(path: &Path, contents: &str) -> StoreResult<()> {
    let tmp_path = path.with_extension("hpg.tmp");
    fs::write(&tmp_path, contents).map_err(|err| StoreError::persistence(&tmp_path, err))?;
    fs::rename(&tmp_path, path).map_err(|err| {
        let _ = fs::remove_file(&tmp_path);
        StoreError::persistence(path, err)
    })
}
