use crate::error::Result;
use crate::model::PaddingFile;
use crate::store::TempFile;
use std::path::Path;

/// Abstract interface for raw padding-directory I/O.
/// This trait handles the "how" (filesystem vs memory); probe and mutator
/// handle the "what" (how many files, which ones).
pub trait PaddingBackend {
    /// Size in bytes of one padding file.
    fn unit_bytes(&self) -> u64;

    /// List every padding file directly inside `dir`.
    /// Foreign files and subdirectories are skipped.
    /// Returns a `Probe` error if the directory is missing or unreadable.
    fn list_padding_files(&self, dir: &Path) -> Result<Vec<PaddingFile>>;

    /// Create the padding file `index`, filled with `unit_bytes` zeros.
    /// Returns Ok(false) without writing if `index` is already taken.
    /// Returns a `Mutation` error on I/O failure (e.g. out of space).
    fn create_padding_file(&self, dir: &Path, index: u64) -> Result<bool>;

    /// Remove the padding file `index`.
    /// Returns Ok(false) if it was already gone.
    fn remove_padding_file(&self, dir: &Path, index: u64) -> Result<bool>;

    /// List temp files left behind by interrupted writes.
    fn list_temp_files(&self, dir: &Path) -> Result<Vec<TempFile>>;

    /// Remove one temp file by name. Names that are not temp names are refused.
    fn remove_temp_file(&self, dir: &Path, name: &str) -> Result<()>;
}
