//! Disk usage probe: how much padding a directory currently holds.

use std::path::Path;

use tracing::debug;

use crate::budget::Deadline;
use crate::error::Result;
use crate::model::UsageMeasurement;
use crate::store::backend::PaddingBackend;

/// Measure the padding files directly inside `dir`.
///
/// Read-only. An empty directory measures 0; a missing or unreadable one is a
/// `Probe` error. Listing a huge directory can outlast the budget, in which
/// case the measurement is discarded with a `Timeout`.
pub fn probe<B: PaddingBackend>(
    backend: &B,
    dir: &Path,
    deadline: &Deadline,
) -> Result<UsageMeasurement> {
    let files = backend.list_padding_files(dir)?;
    deadline.check()?;

    let usage = UsageMeasurement::new(files, backend.unit_bytes());
    debug!(
        dir = %dir.display(),
        files = usage.file_count(),
        gib = usage.gib(),
        "measured padding"
    );
    Ok(usage)
}
