//! # Convergence Loop
//!
//! Drives a padding directory toward a target size:
//!
//! ```text
//!            ┌──────────────────────────────┐
//!            ▼                              │
//!       Measuring ──(usage < desired)──► Growing
//!        │      │
//!        │      └──(usage > desired)──► Shrinking ──► Succeeded
//!        │
//!        └──(usage == desired)──────────────────────► Succeeded
//!
//!   any error in any phase ─────────────────────────► Failed
//! ```
//!
//! ## Asymmetric termination
//!
//! Growing loops back to Measuring. Shrinking does not: after one shrink pass
//! the run ends as Succeeded without measuring again. Two runs with different
//! targets share the directory without a lock, and if both looped after every
//! pass the grower and the shrinker would undo each other forever. Ending
//! after the shrink pass means a run never guarantees an exact final size
//! under a conflicting concurrent run, only that it stops.
//!
//! Growth can loop safely because each pass adds at most [`crate::model::BATCH_LIMIT`]
//! files and never overshoots the target.
//!
//! ## Failure
//!
//! The first error ends the run as Failed. There is no retry inside the loop;
//! whoever invoked the run decides whether to start a fresh one, which then
//! resumes from whatever is on disk.

use tracing::{error, info, info_span};

use crate::budget::Budget;
use crate::error::Result;
use crate::model::{
    ConvergenceDecision, PaddingTarget, RunReport, RunState, RunStatus, UsageMeasurement,
};
use crate::mutator::{self, Mutation};
use crate::probe::probe;
use crate::store::backend::PaddingBackend;

pub struct ConvergenceLoop<'a, B: PaddingBackend> {
    backend: &'a B,
    budget: Budget,
}

impl<'a, B: PaddingBackend> ConvergenceLoop<'a, B> {
    pub fn new(backend: &'a B, budget: Budget) -> Self {
        Self { backend, budget }
    }

    pub fn run(&self, target: &PaddingTarget) -> RunReport {
        let span = info_span!(
            "converge",
            dir = %target.mount_point.display(),
            desired = target.desired_gib
        );
        let _guard = span.enter();

        let mut report = RunReport::started(target);
        let mut usage: Option<UsageMeasurement> = None;
        let mut state = RunState::Measuring;

        while !state.is_terminal() {
            report.states.push(state);
            state = match self.step(state, target, &mut usage, &mut report) {
                Ok(next) => next,
                Err(e) => {
                    error!(error = %e, ?state, "padding run failed");
                    report.error = Some(e.to_string());
                    RunState::Failed
                }
            };
        }
        report.states.push(state);

        report.status = match state {
            RunState::Succeeded => RunStatus::Succeeded,
            _ => RunStatus::Failed,
        };
        report.finished_at = chrono::Utc::now();
        info!(
            status = ?report.status,
            created = report.files_created.len(),
            removed = report.files_removed.len(),
            "padding run finished"
        );
        report
    }

    fn step(
        &self,
        state: RunState,
        target: &PaddingTarget,
        usage: &mut Option<UsageMeasurement>,
        report: &mut RunReport,
    ) -> Result<RunState> {
        let dir = target.mount_point.as_path();
        let desired = target.desired_gib;

        match state {
            RunState::Measuring => {
                let measured = probe(self.backend, dir, &self.budget.probe_deadline())?;
                let gib = measured.gib();
                report.initial_gib.get_or_insert(gib);
                report.last_measured_gib = Some(gib);
                *usage = Some(measured);

                Ok(match ConvergenceDecision::decide(gib, desired) {
                    ConvergenceDecision::Stop => RunState::Succeeded,
                    ConvergenceDecision::Grow => RunState::Growing,
                    ConvergenceDecision::Shrink => RunState::Shrinking,
                })
            }
            RunState::Growing => {
                let Some(current) = usage.take() else {
                    return Ok(RunState::Measuring);
                };
                report.grow_passes += 1;
                let mut mutation = Mutation::default();
                let result = mutator::grow(
                    self.backend,
                    &current,
                    desired,
                    dir,
                    &self.budget.mutation_deadline(),
                    &mut mutation,
                );
                report.files_created.extend(mutation.created);
                result?;
                Ok(RunState::Measuring)
            }
            RunState::Shrinking => {
                let Some(current) = usage.take() else {
                    return Ok(RunState::Measuring);
                };
                report.shrink_passes += 1;
                let mut mutation = Mutation::default();
                let result = mutator::shrink(
                    self.backend,
                    &current,
                    desired,
                    dir,
                    &self.budget.mutation_deadline(),
                    &mut mutation,
                );
                report.files_removed.extend(mutation.removed);
                result?;
                // One shrink pass, then stop. See the module docs.
                Ok(RunState::Succeeded)
            }
            RunState::Succeeded | RunState::Failed => Ok(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BATCH_LIMIT, GIB};
    use crate::store::mem_backend::MemBackend;
    use std::path::Path;
    use std::time::Duration;

    const DIR: &str = "/mnt/efs";

    fn setup() -> MemBackend {
        let backend = MemBackend::new();
        backend.add_dir(DIR);
        backend
    }

    fn run(backend: &MemBackend, desired: u64) -> RunReport {
        let target = PaddingTarget::new(DIR, desired).unwrap();
        ConvergenceLoop::new(backend, Budget::default()).run(&target)
    }

    #[test]
    fn empty_dir_grows_to_target() {
        let backend = setup();
        let report = run(&backend, 5);

        assert!(report.succeeded());
        assert_eq!(report.files_created, vec![1, 2, 3, 4, 5]);
        assert_eq!(report.grow_passes, 1);
        assert_eq!(report.last_measured_gib, Some(5));
        assert_eq!(
            report.states,
            vec![
                RunState::Measuring,
                RunState::Growing,
                RunState::Measuring,
                RunState::Succeeded
            ]
        );
    }

    #[test]
    fn shrink_terminates_without_remeasuring() {
        let backend = setup();
        backend.put_padding(Path::new(DIR), 1..=30);

        let report = run(&backend, 10);

        assert!(report.succeeded());
        assert_eq!(backend.list_calls(), 1);
        assert_eq!(report.shrink_passes, 1);
        assert_eq!(report.files_removed.len(), 20);
        assert_eq!(report.last_measured_gib, Some(30));
        assert_eq!(
            report.states,
            vec![
                RunState::Measuring,
                RunState::Shrinking,
                RunState::Succeeded
            ]
        );
        assert_eq!(backend.padding_indexes(Path::new(DIR)).len(), 10);
    }

    #[test]
    fn large_grow_takes_several_capped_passes() {
        let backend = setup();
        backend.put_padding(Path::new(DIR), 1..=5);

        let report = run(&backend, 30);

        assert!(report.succeeded());
        assert_eq!(report.grow_passes, 2);
        assert_eq!(report.files_created.len(), 25);
        assert_eq!(report.files_created[BATCH_LIMIT - 1], 25);
        assert_eq!(report.files_created.last(), Some(&30));
        assert_eq!(
            backend.padding_indexes(Path::new(DIR)),
            (1..=30).collect::<Vec<_>>()
        );
    }

    #[test]
    fn at_target_is_a_no_op() {
        let backend = setup();
        backend.put_padding(Path::new(DIR), 1..=5);

        let report = run(&backend, 5);

        assert!(report.succeeded());
        assert_eq!(report.file_operations(), 0);
        assert_eq!(backend.create_calls(), 0);
        assert_eq!(backend.remove_calls(), 0);
        assert_eq!(report.states, vec![RunState::Measuring, RunState::Succeeded]);
    }

    #[test]
    fn conflicting_targets_both_terminate() {
        let backend = setup();
        backend.put_padding(Path::new(DIR), 1..=5);

        // Run B targets the current size: nothing to shrink, it stops at once.
        let b = run(&backend, 5);
        assert!(b.succeeded());
        assert_eq!(b.file_operations(), 0);

        // Run A is unaffected and grows all the way.
        let a = run(&backend, 50);
        assert!(a.succeeded());
        assert_eq!(a.grow_passes, 3);
        assert_eq!(a.last_measured_gib, Some(50));

        // A later shrinker ends after a single pass.
        let c = run(&backend, 12);
        assert!(c.succeeded());
        assert_eq!(c.shrink_passes, 1);
        assert_eq!(backend.padding_indexes(Path::new(DIR)).len(), 12);
    }

    #[test]
    fn foreign_files_survive_a_full_cycle() {
        let backend = setup();
        let dir = Path::new(DIR);
        backend.put_file(dir, "notes.txt", 3 * GIB);
        backend.put_file(dir, "007", GIB);

        assert!(run(&backend, 4).succeeded());
        assert!(run(&backend, 0).succeeded());

        assert_eq!(
            backend.file_names(dir),
            vec!["007".to_string(), "notes.txt".to_string()]
        );
    }

    #[test]
    fn missing_dir_fails_in_measuring() {
        let backend = MemBackend::new();
        let report = run(&backend, 5);

        assert_eq!(report.status, RunStatus::Failed);
        assert_eq!(report.states, vec![RunState::Measuring, RunState::Failed]);
        assert!(report.error.unwrap().contains("Cannot measure"));
        assert_eq!(report.initial_gib, None);
    }

    #[test]
    fn write_failure_fails_without_retry() {
        let backend = setup();
        backend.set_capacity_bytes(Some(3 * GIB));

        let report = run(&backend, 10);

        assert_eq!(report.status, RunStatus::Failed);
        assert_eq!(report.files_created, vec![1, 2, 3]);
        assert_eq!(report.grow_passes, 1);
        assert_eq!(backend.list_calls(), 1);
        assert_eq!(
            report.states,
            vec![RunState::Measuring, RunState::Growing, RunState::Failed]
        );
    }

    #[test]
    fn failed_run_resumes_on_next_run() {
        let backend = setup();
        backend.set_capacity_bytes(Some(3 * GIB));
        assert!(!run(&backend, 6).succeeded());

        backend.set_capacity_bytes(None);
        let report = run(&backend, 6);
        assert!(report.succeeded());
        assert_eq!(report.initial_gib, Some(3));
        assert_eq!(report.files_created, vec![4, 5, 6]);
    }

    #[test]
    fn expired_mutation_budget_fails_the_run() {
        let backend = setup();
        let target = PaddingTarget::new(DIR, 5).unwrap();
        let budget = Budget {
            probe_timeout: Duration::from_secs(60),
            mutation_timeout: Duration::ZERO,
        };
        let report = ConvergenceLoop::new(&backend, budget).run(&target);

        assert_eq!(report.status, RunStatus::Failed);
        assert_eq!(
            report.states,
            vec![RunState::Measuring, RunState::Growing, RunState::Failed]
        );
        assert_eq!(
            report.error.as_deref(),
            Some("mutate phase exceeded its 0s budget")
        );
        assert!(report.files_created.is_empty());
        assert_eq!(backend.create_calls(), 0);
    }

    #[test]
    fn denied_write_fails_the_run() {
        let backend = setup();
        backend.put_padding(Path::new(DIR), 1..=2);
        backend.set_simulate_write_error(true);

        let report = run(&backend, 4);

        assert_eq!(report.status, RunStatus::Failed);
        assert_eq!(
            report.states,
            vec![RunState::Measuring, RunState::Growing, RunState::Failed]
        );
        let error = report.error.unwrap();
        assert!(error.starts_with("Cannot modify /mnt/efs/3"), "{error}");
        assert!(report.files_created.is_empty());
        assert_eq!(backend.padding_indexes(Path::new(DIR)), vec![1, 2]);
    }

    #[test]
    fn max_index_fails_the_run_without_spinning() {
        let backend = setup();
        backend.put_file(Path::new(DIR), &u64::MAX.to_string(), GIB);

        let report = run(&backend, 3);

        assert_eq!(report.status, RunStatus::Failed);
        assert!(report.error.unwrap().starts_with("Cannot modify"));
        assert_eq!(backend.create_calls(), 1);
    }
}
