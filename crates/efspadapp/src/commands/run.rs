use crate::budget::Budget;
use crate::commands::{CmdMessage, CmdResult};
use crate::convergence::ConvergenceLoop;
use crate::error::Result;
use crate::model::{PaddingTarget, RunReport};
use crate::store::backend::PaddingBackend;

pub fn run<B: PaddingBackend>(
    backend: &B,
    target: &PaddingTarget,
    budget: &Budget,
) -> Result<CmdResult> {
    let report = ConvergenceLoop::new(backend, *budget).run(target);

    let mut result = CmdResult::default();
    for message in summarize(&report) {
        result.add_message(message);
    }
    Ok(result.with_report(report))
}

pub(crate) fn summarize(report: &RunReport) -> Vec<CmdMessage> {
    let mut messages = Vec::new();
    if !report.files_created.is_empty() {
        messages.push(CmdMessage::info(format!(
            "Created {} padding file(s) in {} pass(es).",
            report.files_created.len(),
            report.grow_passes
        )));
    }
    if !report.files_removed.is_empty() {
        messages.push(CmdMessage::info(format!(
            "Removed {} padding file(s).",
            report.files_removed.len()
        )));
    }

    match (&report.error, report.succeeded()) {
        (_, true) if report.file_operations() == 0 => messages.push(CmdMessage::success(format!(
            "Already at {} GiB, nothing to do.",
            report.desired_gib
        ))),
        (_, true) => messages.push(CmdMessage::success(format!(
            "Padding converged toward {} GiB.",
            report.desired_gib
        ))),
        (Some(detail), false) => messages.push(CmdMessage::error(format!(
            "Padding run failed: {detail}"
        ))),
        (None, false) => messages.push(CmdMessage::error("Padding run failed.")),
    }
    messages
}
