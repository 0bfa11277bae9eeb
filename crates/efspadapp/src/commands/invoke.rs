use crate::budget::Budget;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::invoker::{InvocationRequest, InvocationStatus, Invoker, LifecycleEvent};
use crate::store::backend::PaddingBackend;

pub fn run<B: PaddingBackend>(
    backend: &B,
    event: LifecycleEvent,
    request: &InvocationRequest,
    budget: &Budget,
) -> Result<CmdResult> {
    let response = Invoker::new(backend, *budget).handle(event, request);

    let mut result = CmdResult::default();
    match (&response.status, &response.report) {
        (InvocationStatus::Skipped, _) => result.add_message(CmdMessage::info(format!(
            "{event:?} event: padding left in place."
        ))),
        (_, Some(report)) => {
            for message in super::run::summarize(report) {
                result.add_message(message);
            }
        }
        (_, None) => result.add_message(CmdMessage::error(format!(
            "Invocation rejected: {}",
            response.error.as_deref().unwrap_or("unknown error")
        ))),
    }
    Ok(result.with_invocation(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;
    use serde_json::json;
    use std::path::PathBuf;

    #[test]
    fn rejected_request_fails_result() {
        let backend = MemBackend::new();
        let request = InvocationRequest {
            desired_padding: json!("huge"),
            mount_point: PathBuf::from("/mnt/efs"),
        };
        let result = run(&backend, LifecycleEvent::Create, &request, &Budget::default()).unwrap();

        assert!(result.failed());
        assert!(result.messages[0].content.starts_with("Invocation rejected"));
    }

    #[test]
    fn update_event_runs() {
        let backend = MemBackend::new();
        backend.add_dir("/mnt/efs");
        let request = InvocationRequest {
            desired_padding: json!(2),
            mount_point: PathBuf::from("/mnt/efs"),
        };
        let result = run(&backend, LifecycleEvent::Update, &request, &Budget::default()).unwrap();

        assert!(!result.failed());
        assert_eq!(
            result.invocation.unwrap().status,
            InvocationStatus::Succeeded
        );
    }
}
