use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::testimonial::Testimonial;

/// The testimonials JSON file plus its lock and temp siblings.
pub struct TestimonialStore {
    path: PathBuf,
}

impl TestimonialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(suffix);
        self.path.with_file_name(name)
    }

    fn lock_path(&self) -> PathBuf {
        self.sibling(".lock")
    }

    fn temp_path(&self) -> PathBuf {
        self.sibling(".tmp")
    }

    /// Load the stored collection. A missing file is an empty collection;
    /// a file that is not a JSON array of testimonials is an error.
    pub fn load(&self) -> Result<Vec<Testimonial>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no testimonials file yet");
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)?;
        serde_json::from_str(&content).map_err(|e| Error::StoreParse {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Replace the stored collection. Writes a temp file next to the target,
    /// syncs it, then renames it into place.
    pub fn save(&self, testimonials: &[Testimonial]) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Store(format!("failed to create data dir: {e}")))?;
        }

        let content = serde_json::to_string_pretty(testimonials)
            .map_err(|e| Error::Store(format!("failed to serialize testimonials: {e}")))?;

        // Any failure after the temp file exists removes it again.
        let tmp = self.temp_path();
        let replaced = write_synced(&tmp, content.as_bytes())
            .map_err(|e| format!("failed to write {}: {e}", tmp.display()))
            .and_then(|()| {
                fs::rename(&tmp, &self.path)
                    .map_err(|e| format!("failed to replace {}: {e}", self.path.display()))
            });
        if let Err(message) = replaced {
            let _ = fs::remove_file(&tmp);
            return Err(Error::Store(message));
        }

        debug!(path = %self.path.display(), count = testimonials.len(), "testimonials saved");
        Ok(())
    }

    /// Take the single-writer lock for this store. Fails if another run
    /// holds it. The lock is released when the guard is dropped.
    pub fn lock(&self) -> Result<StoreLock> {
        StoreLock::acquire(self.lock_path())
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    pid: u32,
    created_at: String,
}

/// Advisory lock file created with `create_new`, removed on drop.
#[derive(Debug)]
pub struct StoreLock {
    path: PathBuf,
}

impl StoreLock {
    fn acquire(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                if let Ok(content) = fs::read_to_string(&path)
                    && let Ok(info) = serde_json::from_str::<LockInfo>(&content)
                {
                    warn!(
                        pid = info.pid,
                        since = %info.created_at,
                        "testimonials store is locked; remove {} if that run is gone",
                        path.display()
                    );
                }
                return Err(Error::StoreLocked(path));
            }
            Err(e) => return Err(e.into()),
        };

        let info = LockInfo {
            pid: std::process::id(),
            created_at: Utc::now().to_rfc3339(),
        };
        let body = serde_json::to_string(&info)
            .map_err(|e| Error::Store(format!("failed to serialize lock info: {e}")))?;
        file.write_all(body.as_bytes())?;

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!("failed to remove lock {}: {e}", self.path.display());
        }
    }
}
