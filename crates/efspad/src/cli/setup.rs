use clap::{Parser, Subcommand, ValueEnum};
use efspadapp::invoker::LifecycleEvent;
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format for releases: "v0.3.0"
/// Format for dev builds: "v0.3.0\ndev: abc1234 2024-01-15 14:30"
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            format!("v{}", VERSION)
        } else {
            format!("v{}\ndev: {} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(
    name = "efspad",
    bin_name = "efspad",
    version = get_version(),
    disable_help_subcommand = true
)]
#[command(
    about = "Grow or shrink filesystem padding toward a target size",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to efspad.toml in the user config directory)
    #[arg(long, global = true, value_name = "FILE", help_heading = "Options")]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true, help_heading = "Options")]
    pub json: bool,

    /// Verbose logging (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count, help_heading = "Options")]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Converge the padding directory toward a target size
    #[command(display_order = 1)]
    Run {
        /// Target size: whole GiB, e.g. 40, 40GiB, 2TiB
        #[arg(short, long, value_name = "SIZE")]
        desired: Option<String>,

        /// Directory holding the padding files
        #[arg(short, long, value_name = "DIR")]
        mount_point: Option<PathBuf>,
    },

    /// Show how much padding the directory holds
    #[command(display_order = 2)]
    Status {
        /// Directory holding the padding files
        #[arg(short, long, value_name = "DIR")]
        mount_point: Option<PathBuf>,
    },

    /// Handle a provisioning lifecycle event with a JSON request
    #[command(display_order = 3)]
    Invoke {
        /// Lifecycle event that triggered this invocation
        #[arg(short, long, value_enum)]
        event: EventArg,

        /// Request file ({"desiredPadding": 40, "mountPoint": "/mnt/efs"}); "-" reads stdin
        #[arg(short, long, value_name = "FILE", default_value = "-")]
        request: String,
    },

    /// Remove temp files abandoned by interrupted runs
    #[command(display_order = 4)]
    Doctor {
        /// Directory holding the padding files
        #[arg(short, long, value_name = "DIR")]
        mount_point: Option<PathBuf>,

        /// Only remove temp files older than this many minutes
        #[arg(long, value_name = "MINUTES")]
        max_age_mins: Option<u64>,
    },

    /// Show the effective configuration
    #[command(display_order = 5)]
    Config,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum EventArg {
    Create,
    Update,
    Delete,
}

impl From<EventArg> for LifecycleEvent {
    fn from(event: EventArg) -> Self {
        match event {
            EventArg::Create => LifecycleEvent::Create,
            EventArg::Update => LifecycleEvent::Update,
            EventArg::Delete => LifecycleEvent::Delete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_run_with_flags() {
        let cli = Cli::try_parse_from([
            "efspad", "-vv", "run", "--desired", "40GiB", "-m", "/mnt/efs",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Run {
                desired,
                mount_point,
            } => {
                assert_eq!(desired.as_deref(), Some("40GiB"));
                assert_eq!(mount_point, Some(PathBuf::from("/mnt/efs")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn invoke_defaults_to_stdin() {
        let cli = Cli::try_parse_from(["efspad", "invoke", "--event", "update", "--json"]).unwrap();
        match cli.command {
            Commands::Invoke { event, request } => {
                assert_eq!(event, EventArg::Update);
                assert_eq!(request, "-");
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(cli.json);
    }

    #[test]
    fn unknown_event_rejected() {
        assert!(Cli::try_parse_from(["efspad", "invoke", "--event", "destroy"]).is_err());
    }
}
