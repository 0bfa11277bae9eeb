//! Padding mutator: one Grow or Shrink pass against a directory.
//!
//! Both passes take a fresh [`UsageMeasurement`] rather than trusting anything
//! remembered from earlier, so a pass that follows a crash or a concurrent run
//! works from what is actually on disk.
//!
//! - **Grow** creates at most [`BATCH_LIMIT`] files, starting right after the
//!   highest existing index, and stops as soon as the target is reached. It
//!   never removes anything.
//! - **Shrink** removes files highest index first until the measured size is
//!   at or below the target. There is no batch cap.
//!
//! Files touched before an error are kept in the [`Mutation`] record so the
//! caller can report them; nothing is undone.

use std::io;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::budget::Deadline;
use crate::error::{PadError, Result};
use crate::model::{BATCH_LIMIT, UsageMeasurement};
use crate::store::backend::PaddingBackend;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Mutation {
    pub created: Vec<u64>,
    pub removed: Vec<u64>,
}

pub fn grow<B: PaddingBackend>(
    backend: &B,
    usage: &UsageMeasurement,
    desired_gib: u64,
    dir: &Path,
    deadline: &Deadline,
    mutation: &mut Mutation,
) -> Result<()> {
    let missing = desired_gib.saturating_sub(usage.gib());
    let wanted = missing.min(BATCH_LIMIT as u64) as usize;
    info!(
        dir = %dir.display(),
        current = usage.gib(),
        desired = desired_gib,
        wanted,
        "growing padding"
    );

    let mut index = usage.next_index();
    let mut created = 0;
    while created < wanted {
        deadline.check()?;
        if backend.create_padding_file(dir, index)? {
            mutation.created.push(index);
            created += 1;
        } else {
            debug!(index, "index already taken, skipping");
        }
        if created == wanted {
            break;
        }
        index = index.checked_add(1).ok_or_else(|| {
            PadError::mutation(
                dir,
                io::Error::other("no padding index left above the highest one"),
            )
        })?;
    }
    Ok(())
}

pub fn shrink<B: PaddingBackend>(
    backend: &B,
    usage: &UsageMeasurement,
    desired_gib: u64,
    dir: &Path,
    deadline: &Deadline,
    mutation: &mut Mutation,
) -> Result<()> {
    info!(
        dir = %dir.display(),
        current = usage.gib(),
        desired = desired_gib,
        "shrinking padding"
    );

    let unit = usage.unit_bytes;
    let mut remaining = usage.total_bytes;
    for file in usage.files.iter().rev() {
        if remaining / unit <= desired_gib {
            break;
        }
        deadline.check()?;
        if backend.remove_padding_file(dir, file.index)? {
            mutation.removed.push(file.index);
        } else {
            debug!(index = file.index, "already removed by another run");
        }
        remaining = remaining.saturating_sub(file.size_bytes);
    }
    Ok(())
}
