use super::backend::PaddingBackend;
use super::{TempFile, is_temp_name};
use crate::error::{PadError, Result};
use crate::model::{GIB, PaddingFile};
use chrono::{DateTime, Utc};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Clone)]
struct MemEntry {
    size_bytes: u64,
    mtime: DateTime<Utc>,
}

type DirMap = BTreeMap<String, MemEntry>;

/// In-memory padding backend for testing.
///
/// Uses `RefCell` for interior mutability since a run is single-threaded.
/// Directories must be registered with [`MemBackend::add_dir`] before use;
/// anything else behaves like a missing directory.
pub struct MemBackend {
    unit_bytes: u64,
    dirs: RefCell<HashMap<PathBuf, DirMap>>,
    capacity_bytes: Cell<Option<u64>>,
    simulate_write_error: Cell<bool>,
    simulate_remove_error: Cell<bool>,
    list_calls: Cell<usize>,
    create_calls: Cell<usize>,
    remove_calls: Cell<usize>,
}

impl Default for MemBackend {
    fn default() -> Self {
        Self {
            unit_bytes: GIB,
            dirs: RefCell::new(HashMap::new()),
            capacity_bytes: Cell::new(None),
            simulate_write_error: Cell::new(false),
            simulate_remove_error: Cell::new(false),
            list_calls: Cell::new(0),
            create_calls: Cell::new(0),
            remove_calls: Cell::new(0),
        }
    }
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_dir(&self, dir: impl Into<PathBuf>) {
        self.dirs.borrow_mut().entry(dir.into()).or_default();
    }

    /// Place an arbitrary file, bypassing the write protocol.
    pub fn put_file(&self, dir: &Path, name: &str, size_bytes: u64) {
        self.put_file_at(dir, name, size_bytes, Utc::now());
    }

    pub fn put_file_at(&self, dir: &Path, name: &str, size_bytes: u64, mtime: DateTime<Utc>) {
        self.dirs
            .borrow_mut()
            .entry(dir.to_path_buf())
            .or_default()
            .insert(name.to_string(), MemEntry { size_bytes, mtime });
    }

    /// Place full-size padding files for every index in `indexes`.
    pub fn put_padding(&self, dir: &Path, indexes: impl IntoIterator<Item = u64>) {
        for index in indexes {
            self.put_file(dir, &PaddingFile::file_name(index), self.unit_bytes);
        }
    }

    pub fn file_names(&self, dir: &Path) -> Vec<String> {
        self.dirs
            .borrow()
            .get(dir)
            .map(|files| files.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn padding_indexes(&self, dir: &Path) -> Vec<u64> {
        let mut indexes: Vec<u64> = self
            .file_names(dir)
            .iter()
            .filter_map(|name| PaddingFile::parse_index(name))
            .collect();
        indexes.sort_unstable();
        indexes
    }

    /// Limit the total bytes all directories may hold. Creates beyond the
    /// limit fail like a full disk.
    pub fn set_capacity_bytes(&self, capacity: Option<u64>) {
        self.capacity_bytes.set(capacity);
    }

    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    pub fn set_simulate_remove_error(&self, simulate: bool) {
        self.simulate_remove_error.set(simulate);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.get()
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.get()
    }

    pub fn remove_calls(&self) -> usize {
        self.remove_calls.get()
    }

    fn used_bytes(&self) -> u64 {
        self.dirs
            .borrow()
            .values()
            .flat_map(|files| files.values())
            .map(|e| e.size_bytes)
            .sum()
    }

    fn missing(dir: &Path) -> io::Error {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} does not exist", dir.display()),
        )
    }
}

impl PaddingBackend for MemBackend {
    fn unit_bytes(&self) -> u64 {
        self.unit_bytes
    }

    fn list_padding_files(&self, dir: &Path) -> Result<Vec<PaddingFile>> {
        self.list_calls.set(self.list_calls.get() + 1);
        let dirs = self.dirs.borrow();
        let files = dirs
            .get(dir)
            .ok_or_else(|| PadError::probe(dir, Self::missing(dir)))?;
        Ok(files
            .iter()
            .filter_map(|(name, entry)| {
                PaddingFile::parse_index(name).map(|index| PaddingFile {
                    index,
                    size_bytes: entry.size_bytes,
                })
            })
            .collect())
    }

    fn create_padding_file(&self, dir: &Path, index: u64) -> Result<bool> {
        self.create_calls.set(self.create_calls.get() + 1);
        let target = dir.join(PaddingFile::file_name(index));
        if self.simulate_write_error.get() {
            return Err(PadError::mutation(
                target,
                io::Error::new(io::ErrorKind::PermissionDenied, "simulated write error"),
            ));
        }
        if let Some(capacity) = self.capacity_bytes.get() {
            if self.used_bytes() + self.unit_bytes > capacity {
                return Err(PadError::mutation(
                    target,
                    io::Error::other("no space left on device"),
                ));
            }
        }

        let mut dirs = self.dirs.borrow_mut();
        let files = dirs
            .get_mut(dir)
            .ok_or_else(|| PadError::mutation(dir, Self::missing(dir)))?;
        let name = PaddingFile::file_name(index);
        if files.contains_key(&name) {
            return Ok(false);
        }
        files.insert(
            name,
            MemEntry {
                size_bytes: self.unit_bytes,
                mtime: Utc::now(),
            },
        );
        Ok(true)
    }

    fn remove_padding_file(&self, dir: &Path, index: u64) -> Result<bool> {
        self.remove_calls.set(self.remove_calls.get() + 1);
        let target = dir.join(PaddingFile::file_name(index));
        if self.simulate_remove_error.get() {
            return Err(PadError::mutation(
                target,
                io::Error::new(io::ErrorKind::PermissionDenied, "simulated remove error"),
            ));
        }
        let mut dirs = self.dirs.borrow_mut();
        let files = dirs
            .get_mut(dir)
            .ok_or_else(|| PadError::mutation(dir, Self::missing(dir)))?;
        Ok(files.remove(&PaddingFile::file_name(index)).is_some())
    }

    fn list_temp_files(&self, dir: &Path) -> Result<Vec<TempFile>> {
        let dirs = self.dirs.borrow();
        let files = dirs
            .get(dir)
            .ok_or_else(|| PadError::probe(dir, Self::missing(dir)))?;
        Ok(files
            .iter()
            .filter(|(name, _)| is_temp_name(name))
            .map(|(name, entry)| TempFile {
                name: name.clone(),
                size_bytes: entry.size_bytes,
                modified: entry.mtime,
            })
            .collect())
    }

    fn remove_temp_file(&self, dir: &Path, name: &str) -> Result<()> {
        if !is_temp_name(name) {
            return Err(PadError::InvalidInput(format!(
                "{name:?} is not an efspad temp file"
            )));
        }
        if let Some(files) = self.dirs.borrow_mut().get_mut(dir) {
            files.remove(name);
        }
        Ok(())
    }
}
