//! Configuration management for togglsync.
//!
//! The whole configuration is one JSON document, `config.json`, stored in the
//! platform application data directory. Each service has its own optional
//! section so a user only configures what they use:
//!
//! - **toggl**: workspace selection (the API token lives in the secret store)
//! - **shotgun**: site, login and the cached refresh token
//! - **jira**: URL, login, project key, JQL and the cached session cookie
//! - **sync**: tracker choice, default export window, zero-duration policy
//!   and secret backend
//!
//! Passwords and API tokens are never written here; see
//! [`crate::libs::secret`]. Session tokens are, because they are cheap to
//! revoke and the original scripts kept them next to the login.
//!
//! ## File Location
//!
//! - **Windows**: `%LOCALAPPDATA%\togglsync\config.json`
//! - **macOS**: `~/Library/Application Support/togglsync/config.json`
//! - **Linux**: `~/.local/share/togglsync/config.json`
//!
//! ## Usage Examples
//!
//! ```rust,no_run
//! use togglsync::libs::config::Config;
//!
//! let mut config = Config::read()?;
//! if let Some(jira) = config.jira.as_mut() {
//!     jira.session_token = None;
//! }
//! config.save()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::aggregate::ZeroDurationPolicy;
use super::data_storage::DataStorage;
use super::error::SyncError;
use super::messages::Message;
use super::secret::SecretBackend;
use crate::api::jira::JiraConfig;
use crate::api::shotgun::ShotgunConfig;
use crate::api::toggl::TogglConfig;
use crate::msg_print;
use anyhow::Result;
use clap::ValueEnum;
use dialoguer::{theme::ColorfulTheme, Input, MultiSelect, Select};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};

/// Configuration file name inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Version written by this build. Files without a version are treated as
/// version 1.
pub const CONFIG_VERSION: u32 = 1;

/// Default export window when `--start` is omitted.
pub const DEFAULT_DAYS_BACK: i64 = 7;

/// A configurable section shown by the setup wizard.
#[derive(Debug, Clone)]
pub struct ConfigModule {
    /// Identifier used to route the wizard
    pub key: String,
    /// Display name
    pub name: String,
}

/// Issue tracker the tickets and work logs live in.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TrackerKind {
    Shotgun,
    Jira,
}

impl TrackerKind {
    pub fn name(&self) -> &'static str {
        match self {
            TrackerKind::Shotgun => "Shotgun",
            TrackerKind::Jira => "JIRA",
        }
    }
}

/// Behaviour shared by the import and export directions.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SyncConfig {
    /// Tracker used when `--tracker` is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracker: Option<TrackerKind>,

    /// How many days back `export` starts when `--start` is omitted.
    #[serde(default = "default_days_back")]
    pub days_back: i64,

    /// Handling of groups that sum to less than a minute.
    #[serde(default)]
    pub zero_duration: ZeroDurationPolicy,

    /// Where passwords and API tokens are kept.
    #[serde(default)]
    pub secret_backend: SecretBackend,
}

fn default_days_back() -> i64 {
    DEFAULT_DAYS_BACK
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            tracker: None,
            days_back: DEFAULT_DAYS_BACK,
            zero_duration: ZeroDurationPolicy::default(),
            secret_backend: SecretBackend::default(),
        }
    }
}

/// Root configuration record.
///
/// Every section is optional and omitted from the JSON when unset, so the
/// file only grows as services get configured.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toggl: Option<TogglConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shotgun: Option<ShotgunConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira: Option<JiraConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            version: CONFIG_VERSION,
            toggl: None,
            shotgun: None,
            jira: None,
            sync: None,
        }
    }
}

impl Config {
    /// Reads the configuration, or returns the default when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if it was
    /// written by a newer version of the tool.
    pub fn read() -> Result<Config> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;

        if !config_file_path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(config_file_path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        if config.version > CONFIG_VERSION {
            return Err(SyncError::domain(Message::UnsupportedConfigVersion(config.version)).into());
        }
        Ok(config)
    }

    /// Writes the configuration as pretty-printed JSON.
    pub fn save(&self) -> Result<()> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;

        let config_file = File::create(config_file_path)?;
        let saved = Config {
            version: CONFIG_VERSION,
            ..self.clone()
        };
        serde_json::to_writer_pretty(&config_file, &saved)?;
        Ok(())
    }

    /// Re-reads the file, applies `change` and saves the result.
    ///
    /// Used by the API clients to persist fresh session tokens without
    /// clobbering sections they do not own.
    pub fn update(change: impl FnOnce(&mut Config)) -> Result<()> {
        let mut config = Self::read()?;
        change(&mut config);
        config.save()
    }

    /// Removes the configuration file if there is one.
    pub fn delete() -> Result<()> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        if config_file_path.exists() {
            fs::remove_file(config_file_path)?;
        }
        Ok(())
    }

    pub fn sync(&self) -> SyncConfig {
        self.sync.clone().unwrap_or_default()
    }

    /// Picks the tracker: `--tracker`, then `sync.tracker`, then whichever
    /// tracker section is configured (JIRA first).
    pub fn tracker_kind(&self, requested: Option<TrackerKind>) -> Result<TrackerKind> {
        requested
            .or_else(|| self.sync.as_ref().and_then(|sync| sync.tracker))
            .or_else(|| self.jira.as_ref().map(|_| TrackerKind::Jira))
            .or_else(|| self.shotgun.as_ref().map(|_| TrackerKind::Shotgun))
            .ok_or_else(|| SyncError::domain(Message::NoTrackerConfigured).into())
    }

    /// Runs the interactive setup wizard over the selected sections.
    pub fn init() -> Result<Self> {
        let mut config = Self::read().unwrap_or_default();

        let modules = vec![
            TogglConfig::module(),
            ShotgunConfig::module(),
            JiraConfig::module(),
            SyncConfig::module(),
        ];

        let selected = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptSelectModules.to_string())
            .items(&modules.iter().map(|module| &module.name).collect::<Vec<_>>())
            .interact()?;

        for &selection in &selected {
            match modules[selection].key.as_str() {
                "toggl" => config.toggl = Some(TogglConfig::init(&config.toggl)?),
                "shotgun" => config.shotgun = Some(ShotgunConfig::init(&config.shotgun)?),
                "jira" => config.jira = Some(JiraConfig::init(&config.jira)?),
                "sync" => config.sync = Some(SyncConfig::init(&config.sync)?),
                _ => {}
            }
        }

        Ok(config)
    }
}

impl SyncConfig {
    pub fn module() -> ConfigModule {
        ConfigModule {
            key: "sync".to_string(),
            name: "Sync".to_string(),
        }
    }

    pub fn init(config: &Option<Self>) -> Result<Self> {
        let default = config.clone().unwrap_or_default();
        let theme = ColorfulTheme::default();
        msg_print!(Message::ConfigModuleSync);

        let trackers = [TrackerKind::Jira, TrackerKind::Shotgun];
        let tracker = Select::with_theme(&theme)
            .with_prompt(Message::PromptTracker.to_string())
            .items(&trackers.iter().map(TrackerKind::name).collect::<Vec<_>>())
            .default(trackers.iter().position(|t| Some(*t) == default.tracker).unwrap_or(0))
            .interact()?;

        let policies = [ZeroDurationPolicy::Skip, ZeroDurationPolicy::Minimum];
        let zero_duration = Select::with_theme(&theme)
            .with_prompt(Message::PromptZeroDuration.to_string())
            .items(&["skip them", "log one minute"])
            .default(policies.iter().position(|p| *p == default.zero_duration).unwrap_or(0))
            .interact()?;

        let backends = [SecretBackend::Keyring, SecretBackend::File];
        let secret_backend = Select::with_theme(&theme)
            .with_prompt(Message::PromptSecretBackend.to_string())
            .items(&["system keyring", "encrypted file"])
            .default(backends.iter().position(|b| *b == default.secret_backend).unwrap_or(0))
            .interact()?;

        Ok(Self {
            tracker: Some(trackers[tracker]),
            days_back: Input::with_theme(&theme)
                .with_prompt(Message::PromptDaysBack.to_string())
                .default(default.days_back)
                .interact_text()?,
            zero_duration: policies[zero_duration],
            secret_backend: backends[secret_backend],
        })
    }
}
