//! Cleanup of temp files left by abandoned runs.
//!
//! A run killed mid-write leaves a `.efspad-*.tmp` file that never became a
//! padding file. Those still occupy space, so `doctor` removes the ones older
//! than a threshold. Younger temp files may belong to a run still in
//! progress and are left alone. Padding files and foreign files are never
//! touched.

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::backend::PaddingBackend;

#[derive(Debug, Default, Clone, Serialize)]
pub struct DoctorReport {
    pub removed: Vec<String>,
    pub kept_recent: usize,
    pub reclaimed_bytes: u64,
}

pub fn run<B: PaddingBackend>(backend: &B, dir: &Path, max_age: Duration) -> Result<CmdResult> {
    let now = Utc::now();
    let max_age = chrono::Duration::from_std(max_age).unwrap_or(chrono::Duration::MAX);

    let mut report = DoctorReport::default();
    for temp in backend.list_temp_files(dir)? {
        if now.signed_duration_since(temp.modified) < max_age {
            report.kept_recent += 1;
            continue;
        }
        backend.remove_temp_file(dir, &temp.name)?;
        info!(name = %temp.name, bytes = temp.size_bytes, "removed stale temp file");
        report.reclaimed_bytes += temp.size_bytes;
        report.removed.push(temp.name);
    }

    let mut result = CmdResult::default();
    if report.removed.is_empty() {
        result.add_message(CmdMessage::success("No abandoned temp files found."));
    } else {
        result.add_message(CmdMessage::success(format!(
            "Removed {} abandoned temp file(s), reclaiming {} bytes.",
            report.removed.len(),
            report.reclaimed_bytes
        )));
    }
    if report.kept_recent > 0 {
        result.add_message(CmdMessage::warning(format!(
            "Kept {} recent temp file(s) that may belong to a running job.",
            report.kept_recent
        )));
    }
    Ok(result.with_doctor(report))
}
