//! # Command Layer
//!
//! Each submodule implements one user-facing operation on top of a
//! [`PaddingBackend`](crate::store::backend::PaddingBackend) and returns a
//! [`CmdResult`]: structured data for machine output plus leveled messages for
//! humans. Nothing here prints.

use serde::Serialize;

use crate::invoker::InvocationResponse;
use crate::model::{RunReport, UsageMeasurement};

pub mod doctor;
pub mod invoke;
pub mod run;
pub mod status;

pub use doctor::DoctorReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct CmdResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageMeasurement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<RunReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invocation: Option<InvocationResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor: Option<DoctorReport>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_usage(mut self, usage: UsageMeasurement) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn with_report(mut self, report: RunReport) -> Self {
        self.report = Some(report);
        self
    }

    pub fn with_invocation(mut self, invocation: InvocationResponse) -> Self {
        self.invocation = Some(invocation);
        self
    }

    pub fn with_doctor(mut self, doctor: DoctorReport) -> Self {
        self.doctor = Some(doctor);
        self
    }

    /// True when the operation ended in a terminal failure the caller should
    /// turn into a non-zero exit.
    pub fn failed(&self) -> bool {
        self.report.as_ref().is_some_and(|r| !r.succeeded())
            || self.invocation.as_ref().is_some_and(|i| !i.succeeded())
    }
}
