//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the single
//! entry point for UI clients.
//!
//! The facade:
//! - **Dispatches** to the matching `commands::*::run`
//! - **Normalizes inputs** (size strings → GiB, paths → [`PaddingTarget`])
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It does no printing and holds no logic of its own.
//!
//! ## Generic Over PaddingBackend
//!
//! `EfsPadApi<B: PaddingBackend>` is generic over the storage backend:
//! - Production: `EfsPadApi<FsBackend>`
//! - Testing: `EfsPadApi<MemBackend>`

use std::path::Path;
use std::time::Duration;

use crate::budget::Budget;
use crate::commands::{self, CmdResult};
use crate::error::Result;
use crate::invoker::{InvocationRequest, LifecycleEvent};
use crate::model::PaddingTarget;
use crate::size::parse_gib;
use crate::store::backend::PaddingBackend;

pub struct EfsPadApi<B: PaddingBackend> {
    backend: B,
    budget: Budget,
}

impl<B: PaddingBackend> EfsPadApi<B> {
    pub fn new(backend: B, budget: Budget) -> Self {
        Self { backend, budget }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn status(&self, mount_point: &Path) -> Result<CmdResult> {
        commands::status::run(&self.backend, mount_point, &self.budget)
    }

    /// Run the convergence loop once. `desired` is a size string such as
    /// `"40"` or `"40GiB"`.
    pub fn run(&self, mount_point: &Path, desired: &str) -> Result<CmdResult> {
        let target = PaddingTarget::new(mount_point, parse_gib(desired)?)?;
        self.run_target(&target)
    }

    pub fn run_target(&self, target: &PaddingTarget) -> Result<CmdResult> {
        commands::run::run(&self.backend, target, &self.budget)
    }

    pub fn invoke(&self, event: LifecycleEvent, request: &InvocationRequest) -> Result<CmdResult> {
        commands::invoke::run(&self.backend, event, request, &self.budget)
    }

    pub fn doctor(&self, mount_point: &Path, max_age: Duration) -> Result<CmdResult> {
        commands::doctor::run(&self.backend, mount_point, max_age)
    }
}
