//! # efspad CLI
//!
//! The binary is intentionally thin: everything lives in `src/cli/`, and this
//! file only invokes `cli::run()` and turns its outcome into an exit code.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/efspad/src/cli/)                         │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - config + logging wiring, dispatch (handlers.rs)          │
//! │  - terminal / JSON output (render.rs)                       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  efspadapp (API facade, convergence core, storage)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Exit codes: `0` on success, `1` when a run ends Failed or the command
//! could not be carried out.

use std::process::ExitCode;

mod cli;

fn main() -> ExitCode {
    match cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
