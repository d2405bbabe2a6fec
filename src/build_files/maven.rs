//! Asks the Liberty Maven Plugin which release a `pom.xml` targets.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

/// Line marker printed by the plugin's `version` goal.
pub const VERSION_MARKER: &str = "Liberty version:";

/// Maven's complaint when the plugin predates the `version` goal.
pub const GOAL_UNSUPPORTED_MARKER: &str = "Could not find goal 'version'";

pub const DEFAULT_MAVEN_COMMAND: &str = "mvn";
pub const DEFAULT_VERSION_GOAL: &str = "io.openliberty.tools:liberty-maven-plugin:version";

/// Version resolution errors.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Build file does not exist: {0}")]
    MissingBuildFile(PathBuf),

    #[error("Unable to execute {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} did not finish within {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("{command} exited with {code:?}")]
    ExitStatus { command: String, code: Option<i32> },
}

/// Resolves the Liberty release a build descriptor targets.
#[async_trait]
pub trait VersionResolver: Send + Sync {
    /// `Ok(None)` means the tool ran but reported no version.
    async fn resolve(&self, build_file: &Path) -> Result<Option<String>, ResolveError>;
}

/// What the `version` goal printed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionOutput {
    pub version: Option<String>,
    pub goal_unsupported: bool,
}

/// Scan tool output for the version marker and the unsupported-goal marker.
///
/// The version is the text after the first `:` of the marker line, trimmed.
/// When several marker lines are printed the last one wins.
pub fn parse_version_output(stdout: &str) -> VersionOutput {
    let mut output = VersionOutput::default();
    for line in stdout.lines() {
        if line.contains(VERSION_MARKER) {
            output.version = line
                .split_once(':')
                .map(|(_, rest)| rest.trim().to_string())
                .filter(|v| !v.is_empty());
        }
        if line.contains(GOAL_UNSUPPORTED_MARKER) {
            output.goal_unsupported = true;
        }
    }
    output
}

/// Runs `<command> <goal> -f <pom>` as a subprocess.
#[derive(Debug, Clone)]
pub struct MavenVersionResolver {
    command: String,
    goal: String,
    timeout: Duration,
}

impl MavenVersionResolver {
    pub fn new(command: impl Into<String>, goal: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            goal: goal.into(),
            timeout,
        }
    }
}

impl Default for MavenVersionResolver {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAVEN_COMMAND,
            DEFAULT_VERSION_GOAL,
            Duration::from_secs(120),
        )
    }
}

#[async_trait]
impl VersionResolver for MavenVersionResolver {
    async fn resolve(&self, build_file: &Path) -> Result<Option<String>, ResolveError> {
        if !build_file.is_file() {
            return Err(ResolveError::MissingBuildFile(build_file.to_path_buf()));
        }

        let mut command = Command::new(&self.command);
        command
            .arg(&self.goal)
            .arg("-f")
            .arg(build_file)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        if let Some(dir) = build_file.parent() {
            command.current_dir(dir);
        }

        tracing::debug!("Running {} {} -f {}", self.command, self.goal, build_file.display());
        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => {
                return Err(ResolveError::Spawn {
                    command: self.command.clone(),
                    source,
                })
            }
            Err(_) => {
                return Err(ResolveError::Timeout {
                    command: self.command.clone(),
                    timeout: self.timeout,
                })
            }
        };

        let parsed = parse_version_output(&String::from_utf8_lossy(&output.stdout));
        if parsed.goal_unsupported {
            tracing::warn!(
                "The Liberty Maven Plugin used by {} does not contain the 'version' goal. \
                 Please update the Liberty Maven Plugin to 3.3-M5 or higher.",
                build_file.display()
            );
        }

        if !output.status.success() {
            return Err(ResolveError::ExitStatus {
                command: self.command.clone(),
                code: output.status.code(),
            });
        }

        Ok(parsed.version)
    }
}
