use super::backend::PaddingBackend;
use super::{TEMP_PREFIX, TEMP_SUFFIX, TempFile, is_temp_name};
use crate::error::{PadError, Result};
use crate::model::{GIB, PaddingFile};
use chrono::{DateTime, Utc};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};
use uuid::Uuid;

const WRITE_CHUNK: usize = 32 * 1024 * 1024;

pub struct FsBackend {
    unit_bytes: u64,
}

impl Default for FsBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FsBackend {
    pub fn new() -> Self {
        Self { unit_bytes: GIB }
    }

    /// Override the padding file size. Production always uses 1 GiB; tests
    /// use small units to keep the disk footprint tiny.
    pub fn with_unit_bytes(mut self, unit_bytes: u64) -> Self {
        self.unit_bytes = unit_bytes.max(1);
        self
    }

    fn temp_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}{}{}", TEMP_PREFIX, Uuid::new_v4(), TEMP_SUFFIX))
    }

    fn write_zeros(&self, path: &Path) -> io::Result<()> {
        let mut file = File::create_new(path)?;
        let chunk = vec![0u8; WRITE_CHUNK.min(self.unit_bytes as usize)];
        let mut remaining = self.unit_bytes;
        while remaining > 0 {
            let n = remaining.min(chunk.len() as u64) as usize;
            file.write_all(&chunk[..n])?;
            remaining -= n as u64;
        }
        file.sync_all()
    }
}

impl PaddingBackend for FsBackend {
    fn unit_bytes(&self) -> u64 {
        self.unit_bytes
    }

    fn list_padding_files(&self, dir: &Path) -> Result<Vec<PaddingFile>> {
        let entries = fs::read_dir(dir).map_err(|e| PadError::probe(dir, e))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PadError::probe(dir, e))?;
            let Some(index) = entry.file_name().to_str().and_then(PaddingFile::parse_index)
            else {
                continue;
            };
            let meta = match entry.metadata() {
                Ok(meta) => meta,
                // Removed by a concurrent shrinker between readdir and stat.
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(PadError::probe(entry.path(), e)),
            };
            if meta.is_file() {
                files.push(PaddingFile {
                    index,
                    size_bytes: meta.len(),
                });
            }
        }
        Ok(files)
    }

    fn create_padding_file(&self, dir: &Path, index: u64) -> Result<bool> {
        let target = dir.join(PaddingFile::file_name(index));
        if target.exists() {
            return Ok(false);
        }

        let tmp = self.temp_path(dir);
        if let Err(e) = self.write_zeros(&tmp) {
            let _ = fs::remove_file(&tmp);
            return Err(PadError::mutation(&target, e));
        }

        let linked = fs::hard_link(&tmp, &target);
        if let Err(e) = fs::remove_file(&tmp) {
            warn!(path = %tmp.display(), error = %e, "could not remove temp file");
        }
        match linked {
            Ok(()) => {
                debug!(path = %target.display(), "created padding file");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(PadError::mutation(&target, e)),
        }
    }

    fn remove_padding_file(&self, dir: &Path, index: u64) -> Result<bool> {
        let target = dir.join(PaddingFile::file_name(index));
        match fs::remove_file(&target) {
            Ok(()) => {
                debug!(path = %target.display(), "removed padding file");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(PadError::mutation(&target, e)),
        }
    }

    fn list_temp_files(&self, dir: &Path) -> Result<Vec<TempFile>> {
        let entries = fs::read_dir(dir).map_err(|e| PadError::probe(dir, e))?;

        let mut temps = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PadError::probe(dir, e))?;
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if !is_temp_name(&name) {
                continue;
            }
            let meta = match entry.metadata() {
                Ok(meta) => meta,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(PadError::probe(entry.path(), e)),
            };
            if !meta.is_file() {
                continue;
            }
            // Unknown mtime counts as fresh: doctor leaves it alone.
            let modified: DateTime<Utc> = meta.modified().unwrap_or(SystemTime::now()).into();
            temps.push(TempFile {
                name,
                size_bytes: meta.len(),
                modified,
            });
        }
        temps.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(temps)
    }

    fn remove_temp_file(&self, dir: &Path, name: &str) -> Result<()> {
        if !is_temp_name(name) || name.contains('/') {
            return Err(PadError::InvalidInput(format!(
                "{name:?} is not an efspad temp file"
            )));
        }
        let path = dir.join(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PadError::mutation(&path, e)),
        }
    }
}
