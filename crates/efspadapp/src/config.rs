//! # Configuration
//!
//! efspad configuration is managed by [`confique`], which handles layered
//! loading from environment variables and TOML files.
//!
//! ## Storage Hierarchy
//!
//! Configuration is resolved in priority order:
//! 1. **Command-line flags**: applied by the CLI on top of the loaded config.
//! 2. **Environment variables**: `EFSPAD_MOUNT_POINT`, `EFSPAD_DESIRED_PADDING`, etc.
//! 3. **Explicit file**: the path given with `--config`.
//! 4. **User Config**: `efspad.toml` in the OS config directory (via `directories`).
//! 5. **Compiled Defaults**: Built-in fallbacks via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Env | Default | Description |
//! |-----|-----|---------|-------------|
//! | `mount_point` | `EFSPAD_MOUNT_POINT` | `/mnt/efs` | Directory holding the padding files |
//! | `desired_padding` | `EFSPAD_DESIRED_PADDING` | unset | Target size, e.g. `40` or `40GiB` |
//! | `probe_timeout_secs` | `EFSPAD_PROBE_TIMEOUT_SECS` | `300` | Budget for one measurement |
//! | `mutation_timeout_secs` | `EFSPAD_MUTATION_TIMEOUT_SECS` | `900` | Budget for one grow/shrink pass |
//! | `temp_max_age_mins` | `EFSPAD_TEMP_MAX_AGE_MINS` | `60` | Age after which `doctor` removes temp files |

use std::path::{Path, PathBuf};
use std::time::Duration;

use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::budget::Budget;
use crate::error::{PadError, Result};
use crate::size::parse_gib;

pub const CONFIG_FILE_NAME: &str = "efspad.toml";

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EfsPadConfig {
    /// Directory where the shared filesystem is mounted.
    #[config(env = "EFSPAD_MOUNT_POINT", default = "/mnt/efs")]
    pub mount_point: PathBuf,

    /// Target padding size. Bare numbers are GiB.
    #[config(env = "EFSPAD_DESIRED_PADDING")]
    pub desired_padding: Option<String>,

    /// Seconds allowed for measuring the directory.
    #[config(env = "EFSPAD_PROBE_TIMEOUT_SECS", default = 300)]
    pub probe_timeout_secs: u64,

    /// Seconds allowed for one grow or shrink pass.
    #[config(env = "EFSPAD_MUTATION_TIMEOUT_SECS", default = 900)]
    pub mutation_timeout_secs: u64,

    /// Minutes after which a leftover temp file is considered abandoned.
    #[config(env = "EFSPAD_TEMP_MAX_AGE_MINS", default = 60)]
    pub temp_max_age_mins: u64,
}

impl Default for EfsPadConfig {
    fn default() -> Self {
        Self {
            mount_point: PathBuf::from("/mnt/efs"),
            desired_padding: None,
            probe_timeout_secs: 300,
            mutation_timeout_secs: 900,
            temp_max_age_mins: 60,
        }
    }
}

impl EfsPadConfig {
    /// Load env vars, then `explicit` (which must exist), then the user
    /// config file if present.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(PadError::Config(format!(
                    "config file {} not found",
                    path.display()
                )));
            }
            builder = builder.file(path);
        }
        if let Some(path) = user_config_path() {
            builder = builder.file(path);
        }
        builder.load().map_err(|e| PadError::Config(e.to_string()))
    }

    pub fn budget(&self) -> Budget {
        Budget {
            probe_timeout: Duration::from_secs(self.probe_timeout_secs),
            mutation_timeout: Duration::from_secs(self.mutation_timeout_secs),
        }
    }

    pub fn temp_max_age(&self) -> Duration {
        Duration::from_secs(self.temp_max_age_mins.saturating_mul(60))
    }

    /// The configured target in GiB, if one is set.
    pub fn desired_gib(&self) -> Result<Option<u64>> {
        self.desired_padding.as_deref().map(parse_gib).transpose()
    }
}

pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "efspad", "efspad").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EfsPadConfig::default();
        assert_eq!(config.mount_point, PathBuf::from("/mnt/efs"));
        assert_eq!(config.budget(), Budget::default());
        assert_eq!(config.temp_max_age(), Duration::from_secs(3600));
        assert_eq!(config.desired_gib().unwrap(), None);
    }

    #[test]
    fn test_desired_padding_parsed() {
        let config = EfsPadConfig {
            desired_padding: Some("2TiB".to_string()),
            ..Default::default()
        };
        assert_eq!(config.desired_gib().unwrap(), Some(2048));
    }

    #[test]
    fn test_desired_padding_invalid() {
        let config = EfsPadConfig {
            desired_padding: Some("lots".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            config.desired_gib(),
            Err(PadError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let err = EfsPadConfig::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, PadError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "mount_point = \"/srv/pad\"\ndesired_padding = \"40GiB\"\nmutation_timeout_secs = 60\n",
        )
        .unwrap();

        let config = EfsPadConfig::load(Some(&path)).unwrap();
        assert_eq!(config.mount_point, PathBuf::from("/srv/pad"));
        assert_eq!(config.desired_gib().unwrap(), Some(40));
        assert_eq!(config.budget().mutation_timeout, Duration::from_secs(60));
        assert_eq!(config.probe_timeout_secs, 300);
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = EfsPadConfig::default();
        let text = toml::to_string(&config).unwrap();
        let back: EfsPadConfig = toml::from_str(&text).unwrap();
        assert_eq!(config, back);
    }
}
