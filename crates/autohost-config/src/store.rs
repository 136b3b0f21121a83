//! Opaque key-value storage for persisted records.
//!
//! Values are JSON text, mirroring a browser `localStorage`. The file-backed
//! store keeps every record in one JSON object and protects each
//! read-modify-write cycle with a blocking `flock` (operations are tiny, so
//! blocking is fine).

use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, Write};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Get/set capability over string keys and JSON-text values.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;

    /// Drop every record.
    fn clear(&mut self) -> Result<()>;

    /// Write several records. Backends that can do so apply them in one step.
    fn set_many(&mut self, entries: &[(&str, String)]) -> Result<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

/// Process-local store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }
}

type Records = BTreeMap<String, String>;

/// JSON-file store shared by every `autohost` process of the same user.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location (`{state_dir}/storage.json`).
    pub fn open_default() -> Self {
        Self::new(crate::paths::storage_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_only(&self) -> Result<Records> {
        if !self.path.exists() {
            return Ok(Records::new());
        }
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open storage file: {}", self.path.display()))?;
        acquire_blocking_flock(&file, libc::LOCK_SH)?;
        let records = read_records(&file, &self.path);
        release_flock(&file);
        records
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_only()?.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        with_storage_lock(&self.path, |records| {
            records.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        with_storage_lock(&self.path, |records| {
            records.remove(key);
        })
    }

    fn clear(&mut self) -> Result<()> {
        with_storage_lock(&self.path, Records::clear)
    }

    fn set_many(&mut self, entries: &[(&str, String)]) -> Result<()> {
        with_storage_lock(&self.path, |records| {
            for (key, value) in entries {
                records.insert((*key).to_string(), value.clone());
            }
        })
    }
}

/// Execute `f` while holding a blocking exclusive flock on `path`.
///
/// Reads the existing records (or empty), passes them mutably to `f`, and
/// writes the result back.
fn with_storage_lock<F>(path: &Path, f: F) -> Result<()>
where
    F: FnOnce(&mut Records),
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create storage directory: {}", parent.display())
        })?;
    }

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .with_context(|| format!("Failed to open storage file: {}", path.display()))?;

    acquire_blocking_flock(&file, libc::LOCK_EX)?;

    let mut records = read_records(&file, path)?;
    f(&mut records);
    let result = write_records(&file, &records);

    release_flock(&file);
    result
}

fn acquire_blocking_flock(file: &File, operation: libc::c_int) -> Result<()> {
    let fd = file.as_raw_fd();
    // SAFETY: fd is a valid file descriptor from an open File.
    let ret = unsafe { libc::flock(fd, operation) };
    if ret != 0 {
        anyhow::bail!(
            "Failed to acquire storage lock: {}",
            std::io::Error::last_os_error()
        );
    }
    Ok(())
}

fn release_flock(file: &File) {
    let fd = file.as_raw_fd();
    // SAFETY: fd is valid; LOCK_UN releases the advisory lock.
    unsafe {
        libc::flock(fd, libc::LOCK_UN);
    }
}

/// A corrupt file reads as empty so that the next write repairs it.
fn read_records(file: &File, path: &Path) -> Result<Records> {
    let mut contents = String::new();
    let mut reader = std::io::BufReader::new(file);
    reader
        .read_to_string(&mut contents)
        .with_context(|| format!("Failed to read storage file: {}", path.display()))?;
    if contents.trim().is_empty() {
        return Ok(Records::new());
    }
    match serde_json::from_str(&contents) {
        Ok(records) => Ok(records),
        Err(e) => {
            warn!(path = %path.display(), "Corrupt storage file, starting empty: {e}");
            Ok(Records::new())
        }
    }
}

fn write_records(file: &File, records: &Records) -> Result<()> {
    let content = serde_json::to_string_pretty(records)?;
    let mut writer = std::io::BufWriter::new(file);
    writer
        .get_ref()
        .set_len(0)
        .context("Failed to truncate storage file")?;
    writer.seek(std::io::SeekFrom::Start(0))?;
    writer
        .write_all(content.as_bytes())
        .context("Failed to write storage file")?;
    writer.flush()?;
    debug!(records = records.len(), "Storage written");
    Ok(())
}
