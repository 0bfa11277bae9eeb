//! # efspad Architecture
//!
//! efspad keeps a shared filesystem padded with filler files so that its
//! metered size, and with it the baseline throughput the storage service
//! grants, stays at a chosen level. The library is **UI-agnostic**: the CLI in
//! the `efspad` crate is one client, a provisioning hook is another.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Clients (efspad CLI, provisioning hooks)                   │
//! │  - Parse arguments / payloads, print, pick exit codes       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs) + Invoker (invoker.rs)                  │
//! │  - Validate input into a PaddingTarget                      │
//! │  - Dispatch to commands, return CmdResult                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core (convergence.rs, probe.rs, mutator.rs)                │
//! │  - Measure → decide → grow/shrink, with asymmetric stop     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - PaddingBackend trait                                     │
//! │  - FsBackend (production), MemBackend (testing)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code never writes to stdout/stderr and never exits
//! the process. Diagnostics go through `tracing`; results come back as values.
//!
//! ## No Locks
//!
//! Several runs may target the same directory at once. Nothing is locked.
//! Safety comes from two rules instead: every pass re-derives state from the
//! files on disk, and a run that shrinks stops after one pass (see
//! [`convergence`]).
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`commands`]: status, run, invoke and doctor operations
//! - [`convergence`]: The measure/grow/shrink state machine
//! - [`probe`]: Disk usage measurement
//! - [`mutator`]: Grow and shrink passes
//! - [`invoker`]: Lifecycle-event entry point and JSON payloads
//! - [`store`]: Storage abstraction and implementations
//! - [`model`]: Core data types
//! - [`size`]: Size string parsing
//! - [`budget`]: Per-phase time budgets
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod budget;
pub mod commands;
pub mod config;
pub mod convergence;
pub mod error;
pub mod invoker;
pub mod model;
pub mod mutator;
pub mod probe;
pub mod size;
pub mod store;
