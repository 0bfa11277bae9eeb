//! # Domain Model: Padding Files and Runs
//!
//! A padding directory holds filler files named by a bare decimal index:
//!
//! ```text
//! /mnt/efs/
//! ├── 1          # 1 GiB of zero bytes
//! ├── 2
//! ├── 3
//! ├── README     # foreign file, never counted or removed
//! └── .efspad-…  # in-flight write, not yet a padding file
//! ```
//!
//! Only entries whose whole name is ASCII digits with no leading zero (`"0"`
//! itself is allowed) are padding files. That keeps a one-to-one mapping
//! between names and indexes: `"7"` and `"007"` never both count.
//!
//! The directory contents are the only persistent state. Every run starts
//! from a fresh [`UsageMeasurement`] and records what it did in a [`RunReport`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{PadError, Result};

/// One gibibyte, the nominal size of a padding file.
pub const GIB: u64 = 1 << 30;

/// Maximum number of files a single Grow pass creates.
pub const BATCH_LIMIT: usize = 20;

/// Where to pad and how much, already validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaddingTarget {
    pub mount_point: PathBuf,
    pub desired_gib: u64,
}

impl PaddingTarget {
    pub fn new(mount_point: impl Into<PathBuf>, desired_gib: u64) -> Result<Self> {
        let mount_point = mount_point.into();
        if !mount_point.is_absolute() {
            return Err(PadError::InvalidInput(format!(
                "mount point must be an absolute path, got {}",
                mount_point.display()
            )));
        }
        Ok(Self {
            mount_point,
            desired_gib,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PaddingFile {
    pub index: u64,
    pub size_bytes: u64,
}

impl PaddingFile {
    /// Returns the index encoded in `name`, or `None` for anything that is
    /// not a padding file.
    pub fn parse_index(name: &str) -> Option<u64> {
        if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if name.len() > 1 && name.starts_with('0') {
            return None;
        }
        name.parse().ok()
    }

    pub fn file_name(index: u64) -> String {
        index.to_string()
    }
}

/// Snapshot of the padding files found in a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageMeasurement {
    /// Sorted by ascending index.
    pub files: Vec<PaddingFile>,
    pub total_bytes: u64,
    pub unit_bytes: u64,
}

impl UsageMeasurement {
    pub fn new(mut files: Vec<PaddingFile>, unit_bytes: u64) -> Self {
        files.sort();
        let total_bytes = files.iter().map(|f| f.size_bytes).sum();
        Self {
            files,
            total_bytes,
            unit_bytes,
        }
    }

    /// Whole units (GiB in production), rounded down.
    pub fn gib(&self) -> u64 {
        self.total_bytes / self.unit_bytes
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn highest_index(&self) -> Option<u64> {
        self.files.last().map(|f| f.index)
    }

    pub fn next_index(&self) -> u64 {
        self.highest_index().map_or(1, |i| i.saturating_add(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConvergenceDecision {
    Grow,
    Shrink,
    Stop,
}

impl ConvergenceDecision {
    pub fn decide(usage_gib: u64, desired_gib: u64) -> Self {
        use std::cmp::Ordering;
        match usage_gib.cmp(&desired_gib) {
            Ordering::Equal => Self::Stop,
            Ordering::Less => Self::Grow,
            Ordering::Greater => Self::Shrink,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Measuring,
    Growing,
    Shrinking,
    Succeeded,
    Failed,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Succeeded | RunState::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Succeeded,
    Failed,
}

/// Outcome of one convergence run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub status: RunStatus,
    pub mount_point: PathBuf,
    pub desired_gib: u64,
    pub initial_gib: Option<u64>,
    /// Last value the probe saw. After a shrink this is the pre-shrink value,
    /// since the run ends without re-measuring.
    pub last_measured_gib: Option<u64>,
    pub grow_passes: u32,
    pub shrink_passes: u32,
    pub files_created: Vec<u64>,
    pub files_removed: Vec<u64>,
    pub states: Vec<RunState>,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn started(target: &PaddingTarget) -> Self {
        let now = Utc::now();
        Self {
            status: RunStatus::Failed,
            mount_point: target.mount_point.clone(),
            desired_gib: target.desired_gib,
            initial_gib: None,
            last_measured_gib: None,
            grow_passes: 0,
            shrink_passes: 0,
            files_created: Vec::new(),
            files_removed: Vec::new(),
            states: Vec::new(),
            error: None,
            started_at: now,
            finished_at: now,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status == RunStatus::Succeeded
    }

    pub fn file_operations(&self) -> usize {
        self.files_created.len() + self.files_removed.len()
    }
}
