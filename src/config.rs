//! Settings for feature fetching and version resolution.
//!
//! Settings come from three places, later ones winning:
//! - built-in defaults
//! - `<config dir>/liberty-features/config.json`
//! - `LIBERTY_FEATURES_*` environment variables
//!
//! An editor host can also push its own settings payload, see [`Settings::from_host`].

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::build_files::{DEFAULT_MAVEN_COMMAND, DEFAULT_VERSION_GOAL};
use crate::sources::{DEFAULT_ARTIFACT, DEFAULT_REGISTRY_URL};

const APP_NAME: &str = "liberty-features";
const CONFIG_FILE: &str = "config.json";
const ENV_PREFIX: &str = "LIBERTY_FEATURES_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Minimum seconds between two remote feature fetches.
    pub request_delay: u64,
    /// Fetch immediately, ignoring the request delay.
    pub force_immediate: bool,
    pub registry_url: String,
    pub feature_artifact: String,
    pub maven_command: String,
    pub version_goal: String,
    /// Seconds before a Maven invocation is abandoned.
    pub tool_timeout: u64,
    /// Seconds before a registry request is abandoned.
    pub http_timeout: u64,
    /// Optional bound, in seconds, on a whole facade query.
    pub query_timeout: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            request_delay: 10,
            force_immediate: false,
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            feature_artifact: DEFAULT_ARTIFACT.to_string(),
            maven_command: DEFAULT_MAVEN_COMMAND.to_string(),
            version_goal: DEFAULT_VERSION_GOAL.to_string(),
            tool_timeout: 120,
            http_timeout: 30,
            query_timeout: None,
        }
    }
}

/// How a single query may use the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    pub request_delay_secs: u64,
    pub force_immediate: bool,
    /// Answer with the default feature set if the query takes longer.
    pub deadline: Option<Duration>,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Settings::default().fetch_policy()
    }
}

impl Settings {
    /// Load the config file (if any), then apply environment overrides.
    /// A missing or unreadable file falls back to defaults.
    pub fn load() -> Self {
        let settings = match Self::try_load() {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        settings.apply_overrides(|key| std::env::var(key).ok())
    }

    fn try_load() -> Result<Self> {
        let Some(path) = config_path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse settings")
    }

    /// Settings from an editor host payload of the form `{"liberty": {...}}`.
    /// Missing keys keep their defaults; a malformed payload yields defaults.
    pub fn from_host(payload: &Value) -> Self {
        let Some(liberty) = payload.get("liberty") else {
            return Self::default();
        };
        match serde_json::from_value(liberty.clone()) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Ignoring malformed liberty settings: {}", e);
                Self::default()
            }
        }
    }

    /// Apply `LIBERTY_FEATURES_*` overrides read through `var`.
    pub fn apply_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| var(&format!("{}{}", ENV_PREFIX, name));

        if let Some(delay) = get("REQUEST_DELAY").and_then(|s| s.trim().parse().ok()) {
            self.request_delay = delay;
        }
        if let Some(force) = get("FORCE_IMMEDIATE").and_then(|s| parse_flag(&s)) {
            self.force_immediate = force;
        }
        if let Some(url) = get("REGISTRY_URL") {
            self.registry_url = url;
        }
        if let Some(artifact) = get("FEATURE_ARTIFACT") {
            self.feature_artifact = artifact;
        }
        if let Some(command) = get("MAVEN_COMMAND") {
            self.maven_command = command;
        }
        if let Some(goal) = get("VERSION_GOAL") {
            self.version_goal = goal;
        }
        if let Some(timeout) = get("TOOL_TIMEOUT").and_then(|s| s.trim().parse().ok()) {
            self.tool_timeout = timeout;
        }
        if let Some(timeout) = get("HTTP_TIMEOUT").and_then(|s| s.trim().parse().ok()) {
            self.http_timeout = timeout;
        }
        if let Some(timeout) = get("QUERY_TIMEOUT").and_then(|s| s.trim().parse().ok()) {
            self.query_timeout = Some(timeout);
        }
        self
    }

    pub fn fetch_policy(&self) -> FetchPolicy {
        FetchPolicy {
            request_delay_secs: self.request_delay,
            force_immediate: self.force_immediate,
            deadline: self.query_timeout.map(Duration::from_secs),
        }
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// `<config dir>/liberty-features/config.json`
pub fn config_path() -> Option<PathBuf> {
    let mut path = config_dir()?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Some(path)
}
