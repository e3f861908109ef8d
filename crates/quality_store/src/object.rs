//! Object storage backends.
//!
//! Suites and results are plain objects addressed by bucket and key. A write
//! only counts once the backend acknowledges it with status 200; callers
//! check the [`WriteAck`] rather than assuming success.

use quality_core::{QualityError, Result};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Status code of an acknowledged write.
pub const STATUS_OK: u16 = 200;

/// Backend acknowledgement of a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteAck {
    /// HTTP-style status code
    pub status: u16,
}

impl WriteAck {
    /// A successful acknowledgement.
    pub fn ok() -> Self {
        Self { status: STATUS_OK }
    }

    /// Returns true only for status 200.
    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// Minimal object storage client.
pub trait ObjectStore {
    /// Writes an object, overwriting any previous content.
    fn put(&self, bucket: &str, key: &str, bytes: &[u8]) -> Result<WriteAck>;

    /// Reads an object, `None` if it does not exist.
    fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>>;

    /// Human-readable reference to an object.
    fn uri(&self, bucket: &str, key: &str) -> String;
}

impl<T: ObjectStore + ?Sized> ObjectStore for &T {
    fn put(&self, bucket: &str, key: &str, bytes: &[u8]) -> Result<WriteAck> {
        (**self).put(bucket, key, bytes)
    }

    fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(bucket, key)
    }

    fn uri(&self, bucket: &str, key: &str) -> String {
        (**self).uri(bucket, key)
    }
}

/// Stores objects as files under `root/bucket/key`.
///
/// ```text
/// root/
/// └── dq-expectations/
///     └── develop/validations/
///         ├── expectations_store/orders_suite.json
///         └── validations_store/orders_suite_checkpoint/...
/// ```
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    /// Creates a store rooted at `root`. The directory is created on first write.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        let relative = Path::new(bucket).join(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if bucket.is_empty() || key.is_empty() || escapes {
            return Err(QualityError::storage(format!(
                "invalid object address '{bucket}/{key}'"
            )));
        }
        Ok(self.root.join(relative))
    }
}

impl ObjectStore for LocalObjectStore {
    fn put(&self, bucket: &str, key: &str, bytes: &[u8]) -> Result<WriteAck> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                QualityError::storage(format!("failed to create {}: {e}", parent.display()))
            })?;
        }
        std::fs::write(&path, bytes)
            .map_err(|e| QualityError::storage(format!("failed to write {}: {e}", path.display())))?;

        debug!(path = %path.display(), bytes = bytes.len(), "Wrote object");
        Ok(WriteAck::ok())
    }

    fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.object_path(bucket, key)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(QualityError::storage(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    fn uri(&self, bucket: &str, key: &str) -> String {
        format!("file://{}", self.root.join(bucket).join(key).display())
    }
}

/// Keeps objects in memory. Writes can be made to fail with a chosen status.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: Mutex<BTreeMap<(String, String), Vec<u8>>>,
    write_status: Mutex<Option<u16>>,
}

impl InMemoryObjectStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later write return `status` without storing anything.
    pub fn reject_writes_with(&self, status: u16) {
        *self.write_status.lock().unwrap_or_else(PoisonError::into_inner) = Some(status);
    }

    /// Keys stored in a bucket, sorted.
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, key)| key.clone())
            .collect()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn put(&self, bucket: &str, key: &str, bytes: &[u8]) -> Result<WriteAck> {
        if let Some(status) = *self.write_status.lock().unwrap_or_else(PoisonError::into_inner) {
            return Ok(WriteAck { status });
        }
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((bucket.to_string(), key.to_string()), bytes.to_vec());
        Ok(WriteAck::ok())
    }

    fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self
            .objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(bucket.to_string(), key.to_string()))
            .cloned())
    }

    fn uri(&self, bucket: &str, key: &str) -> String {
        format!("memory://{bucket}/{key}")
    }
}
