//! # CLI Layer
//!
//! The CLI layer is the **only** place that:
//! - Knows about terminal I/O (stdout, stderr)
//! - Picks exit codes
//! - Handles argument parsing
//! - Formats output for human consumption
//!
//! ## Module Structure
//!
//! - `setup`: Argument parsing via clap
//! - `handlers`: Context setup and per-command dispatch
//! - `render`: Styled and JSON output
//! - `logging`: tracing subscriber setup

mod handlers;
mod logging;
mod render;
pub mod setup;

pub use handlers::run;
