//! # Invoker Boundary
//!
//! The provisioning layer triggers one padding run per resource lifecycle
//! event and only cares whether that run succeeded. The request is a small
//! JSON document:
//!
//! ```json
//! { "desiredPadding": 40, "mountPoint": "/mnt/efs" }
//! ```
//!
//! `desiredPadding` may also be a size string such as `"40GiB"`. Input is
//! validated before the loop starts; a bad request fails without touching
//! the directory.
//!
//! | Event  | Action                         |
//! |--------|--------------------------------|
//! | create | run the convergence loop once  |
//! | update | run the convergence loop once  |
//! | delete | acknowledged, nothing happens  |
//!
//! Padding is left in place on delete: it belongs to the filesystem, which
//! outlives the resource that asked for it.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::budget::Budget;
use crate::convergence::ConvergenceLoop;
use crate::error::{PadError, Result};
use crate::model::{PaddingTarget, RunReport};
use crate::size::gib_from_json;
use crate::store::backend::PaddingBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleEvent {
    Create,
    Update,
    Delete,
}

impl std::str::FromStr for LifecycleEvent {
    type Err = PadError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            other => Err(PadError::InvalidInput(format!(
                "unknown lifecycle event {other:?} (expected create, update or delete)"
            ))),
        }
    }
}

/// Raw request as received. Kept loose so that validation errors are
/// reported as `InvalidInput` instead of a generic parse failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationRequest {
    pub desired_padding: Value,
    pub mount_point: PathBuf,
}

impl InvocationRequest {
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn validate(&self) -> Result<PaddingTarget> {
        let desired = gib_from_json(&self.desired_padding)?;
        PaddingTarget::new(&self.mount_point, desired)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvocationStatus {
    Succeeded,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    pub event: LifecycleEvent,
    pub status: InvocationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<RunReport>,
}

impl InvocationResponse {
    fn failed(event: LifecycleEvent, err: PadError) -> Self {
        Self {
            event,
            status: InvocationStatus::Failed,
            error: Some(err.to_string()),
            report: None,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status != InvocationStatus::Failed
    }
}

pub struct Invoker<'a, B: PaddingBackend> {
    backend: &'a B,
    budget: Budget,
}

impl<'a, B: PaddingBackend> Invoker<'a, B> {
    pub fn new(backend: &'a B, budget: Budget) -> Self {
        Self { backend, budget }
    }

    pub fn handle(&self, event: LifecycleEvent, request: &InvocationRequest) -> InvocationResponse {
        let target = match request.validate() {
            Ok(target) => target,
            Err(e) => return InvocationResponse::failed(event, e),
        };

        if event == LifecycleEvent::Delete {
            info!(dir = %target.mount_point.display(), "delete event, leaving padding in place");
            return InvocationResponse {
                event,
                status: InvocationStatus::Skipped,
                error: None,
                report: None,
            };
        }

        let report = ConvergenceLoop::new(self.backend, self.budget).run(&target);
        let status = if report.succeeded() {
            InvocationStatus::Succeeded
        } else {
            InvocationStatus::Failed
        };
        InvocationResponse {
            event,
            status,
            error: report.error.clone(),
            report: Some(report),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;
    use serde_json::json;
    use std::path::Path;

    fn request(desired: Value, mount: &str) -> InvocationRequest {
        InvocationRequest {
            desired_padding: desired,
            mount_point: PathBuf::from(mount),
        }
    }

    #[test]
    fn parses_camel_case_payload() {
        let req =
            InvocationRequest::from_json(r#"{"desiredPadding": "40GiB", "mountPoint": "/mnt/efs"}"#)
                .unwrap();
        let target = req.validate().unwrap();
        assert_eq!(target.desired_gib, 40);
        assert_eq!(target.mount_point, PathBuf::from("/mnt/efs"));
    }

    #[test]
    fn event_names_parse() {
        assert_eq!(
            "Create".parse::<LifecycleEvent>().unwrap(),
            LifecycleEvent::Create
        );
        assert!("destroy".parse::<LifecycleEvent>().is_err());
    }

    #[test]
    fn create_runs_the_loop() {
        let backend = MemBackend::new();
        backend.add_dir("/mnt/efs");
        let invoker = Invoker::new(&backend, Budget::default());

        let response = invoker.handle(LifecycleEvent::Create, &request(json!(3), "/mnt/efs"));

        assert_eq!(response.status, InvocationStatus::Succeeded);
        assert_eq!(backend.padding_indexes(Path::new("/mnt/efs")), vec![1, 2, 3]);
        assert!(response.report.is_some());
    }

    #[test]
    fn invalid_input_rejected_before_any_io() {
        let backend = MemBackend::new();
        backend.add_dir("/mnt/efs");
        let invoker = Invoker::new(&backend, Budget::default());

        for req in [
            request(json!(-2), "/mnt/efs"),
            request(json!(1.5), "/mnt/efs"),
            request(json!("1536MiB"), "/mnt/efs"),
            request(json!(4), "relative/path"),
        ] {
            let response = invoker.handle(LifecycleEvent::Update, &req);
            assert_eq!(response.status, InvocationStatus::Failed);
            assert!(response.error.unwrap().starts_with("Invalid input"));
            assert!(response.report.is_none());
        }
        assert_eq!(backend.list_calls(), 0);
    }

    #[test]
    fn delete_leaves_padding() {
        let backend = MemBackend::new();
        let dir = Path::new("/mnt/efs");
        backend.add_dir(dir);
        backend.put_padding(dir, 1..=4);
        let invoker = Invoker::new(&backend, Budget::default());

        let response = invoker.handle(LifecycleEvent::Delete, &request(json!(0), "/mnt/efs"));

        assert_eq!(response.status, InvocationStatus::Skipped);
        assert!(response.succeeded());
        assert_eq!(backend.padding_indexes(dir).len(), 4);
        assert_eq!(backend.list_calls(), 0);
    }

    #[test]
    fn failed_run_surfaces_error_detail() {
        let backend = MemBackend::new();
        let invoker = Invoker::new(&backend, Budget::default());

        let response = invoker.handle(LifecycleEvent::Create, &request(json!(1), "/mnt/efs"));

        assert_eq!(response.status, InvocationStatus::Failed);
        assert!(response.error.unwrap().contains("/mnt/efs"));
    }

    #[test]
    fn response_serializes_without_empty_fields() {
        let backend = MemBackend::new();
        backend.add_dir("/mnt/efs");
        let invoker = Invoker::new(&backend, Budget::default());
        let response = invoker.handle(LifecycleEvent::Delete, &request(json!(0), "/mnt/efs"));

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, json!({"event": "delete", "status": "Skipped"}));
    }
}
