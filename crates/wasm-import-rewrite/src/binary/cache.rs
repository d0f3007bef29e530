use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::SystemTime;

use super::DependencyReader;
use crate::{Error, Result};

/// File identity used to decide whether a cached answer is still current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stamp {
    modified: Option<SystemTime>,
    len: u64,
}

impl Stamp {
    fn of(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

/// Memoizes another reader's answers per resolved path.
///
/// An entry is reused only while the file's modification time and length
/// are unchanged; any difference re-reads the binary through the inner
/// reader. Errors are never cached.
#[derive(Debug, Default)]
pub struct CachedReader<R> {
    inner: R,
    entries: Mutex<HashMap<PathBuf, (Stamp, Vec<String>)>>,
}

impl<R: DependencyReader> CachedReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<R: DependencyReader> DependencyReader for CachedReader<R> {
    fn read_dependencies(&self, path: &Path) -> Result<Vec<String>> {
        let stamp = Stamp::of(path)?;

        {
            let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some((cached, deps)) = entries.get(path)
                && *cached == stamp
            {
                tracing::trace!(path = %path.display(), "WASM imports served from cache");
                return Ok(deps.clone());
            }
        }

        // Read outside the lock so slow disks don't serialize unrelated paths.
        let deps = self.inner.read_dependencies(path)?;
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_path_buf(), (stamp, deps.clone()));
        Ok(deps)
    }
}
