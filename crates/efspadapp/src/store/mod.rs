//! # Storage Layer
//!
//! Raw I/O against a padding directory lives behind the [`backend::PaddingBackend`]
//! trait. Backends only list, create and remove files; deciding *how many* files
//! to touch is the job of [`crate::probe`] and [`crate::mutator`].
//!
//! ## Files are Truth
//!
//! Nothing is cached between calls. Every probe re-reads the directory, so a
//! run that was killed halfway leaves state that the next run simply picks up.
//! There is no lock either: two runs against the same directory only ever see
//! each other through the files they create and remove.
//!
//! ## Write Protocol
//!
//! A padding file is written under a hidden temp name and then linked into its
//! numeric name:
//!
//! ```text
//! .efspad-{uuid}.tmp   --(fill with zeros, fsync)-->   hard link as "{index}"
//! ```
//!
//! Linking fails if the index already exists, so a concurrent run that claimed
//! the same index is never overwritten. A write cut short by a timeout leaves
//! only a temp file behind, which the probe ignores and `doctor` removes.
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`]: production backend over `std::fs`.
//! - [`mem_backend::MemBackend`]: in-memory backend with failure simulation,
//!   for tests.

use chrono::{DateTime, Utc};
use serde::Serialize;

pub mod backend;
pub mod fs_backend;
pub mod mem_backend;

pub const TEMP_PREFIX: &str = ".efspad-";
pub const TEMP_SUFFIX: &str = ".tmp";

pub fn is_temp_name(name: &str) -> bool {
    name.starts_with(TEMP_PREFIX) && name.ends_with(TEMP_SUFFIX)
}

/// A leftover temp file from an interrupted write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TempFile {
    pub name: String,
    pub size_bytes: u64,
    pub modified: DateTime<Utc>,
}
