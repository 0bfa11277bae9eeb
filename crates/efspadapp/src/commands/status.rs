use std::path::Path;

use crate::budget::Budget;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::probe::probe;
use crate::store::backend::PaddingBackend;

pub fn run<B: PaddingBackend>(backend: &B, dir: &Path, budget: &Budget) -> Result<CmdResult> {
    let usage = probe(backend, dir, &budget.probe_deadline())?;

    let mut result = CmdResult::default();
    let summary = match usage.highest_index() {
        Some(highest) => format!(
            "{} GiB of padding in {} file(s) under {} (highest index {}).",
            usage.gib(),
            usage.file_count(),
            dir.display(),
            highest
        ),
        None => format!("No padding files under {}.", dir.display()),
    };
    result.add_message(CmdMessage::info(summary));
    Ok(result.with_usage(usage))
}
