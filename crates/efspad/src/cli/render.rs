//! # Rendering
//!
//! Human output is a short block of styled lines: the command's messages, and
//! for runs a one-line summary of the state trace. `--json` prints the whole
//! [`CmdResult`] instead, which is what provisioning hooks consume.

use console::style;
use efspadapp::commands::{CmdMessage, CmdResult, MessageLevel};
use efspadapp::model::{RunReport, RunState};

pub fn print_result(result: &CmdResult, json: bool) -> anyhow::Result<()> {
    if json {
        // The invoke command answers with the bare response document.
        match &result.invocation {
            Some(invocation) => println!("{}", serde_json::to_string_pretty(invocation)?),
            None => println!("{}", serde_json::to_string_pretty(result)?),
        }
        return Ok(());
    }

    if let Some(report) = result
        .report
        .as_ref()
        .or_else(|| result.invocation.as_ref().and_then(|i| i.report.as_ref()))
    {
        println!("{}", style(format_trace(report)).dim());
    }
    print_messages(&result.messages);
    Ok(())
}

pub fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        let line = match message.level {
            MessageLevel::Info => style(&message.content).dim(),
            MessageLevel::Success => style(&message.content).green(),
            MessageLevel::Warning => style(&message.content).yellow(),
            MessageLevel::Error => style(&message.content).red(),
        };
        // Errors go to stderr so stdout stays clean for pipelines.
        if message.level == MessageLevel::Error {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

pub fn format_trace(report: &RunReport) -> String {
    let states: Vec<&str> = report.states.iter().map(|s| state_label(*s)).collect();
    format!(
        "{} → {} GiB: {}",
        report.mount_point.display(),
        report.desired_gib,
        states.join(" → ")
    )
}

fn state_label(state: RunState) -> &'static str {
    match state {
        RunState::Measuring => "measure",
        RunState::Growing => "grow",
        RunState::Shrinking => "shrink",
        RunState::Succeeded => "succeeded",
        RunState::Failed => "failed",
    }
}
