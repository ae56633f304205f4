//! Runner configuration
//!
//! Defines the Hop server connection, the local project to resolve and the
//! polling behaviour of an execution.

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use hop_client::{ConnectionDescriptor, DEFAULT_LOG_LEVEL, DEFAULT_PORT};
use hop_project::ProjectSettings;

use crate::scheduler::PollerConfig;

/// Default delay between two status polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Runner configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Hop server host name or base URL
    pub host: String,

    /// Hop server port
    pub port: u16,

    pub username: String,

    pub password: String,

    /// Directory containing `hop-config.json`
    pub config_path: PathBuf,

    /// Project to resolve in `hop-config.json`
    pub project: String,

    /// Overrides the project home declared in `hop-config.json`
    pub project_path: Option<PathBuf>,

    /// Lifecycle environment whose variables are added to executions
    pub environment: Option<String>,

    /// Directory holding the environment configuration files
    pub environment_path: Option<PathBuf>,

    /// Hop log level sent with every execution
    pub log_level: String,

    /// How often to poll the execution status
    pub poll_interval: Duration,

    /// Maximum time an execution may run before it is stopped
    pub deadline: Option<Duration>,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(
        host: impl Into<String>,
        config_path: impl Into<PathBuf>,
        project: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            username: String::new(),
            password: String::new(),
            config_path: config_path.into(),
            project: project.into(),
            project_path: None,
            environment: None,
            environment_path: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            deadline: None,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// A key present in `overrides` (typically a command-line flag) wins over
    /// the environment variable of the same name. Numeric values that do not
    /// parse are errors, never silently replaced by defaults.
    ///
    /// Expected environment variables:
    /// - HOP_HOST (required)
    /// - HOP_CONFIG_PATH (required)
    /// - HOP_PROJECT (required)
    /// - HOP_PORT (optional, default: 8080)
    /// - HOP_USER / HOP_PASSWORD (optional)
    /// - HOP_PROJECT_PATH (optional)
    /// - HOP_ENVIRONMENT / HOP_ENVIRONMENT_PATH (optional)
    /// - HOP_LOG_LEVEL (optional, default: Basic)
    /// - HOP_POLL_INTERVAL (optional, seconds, default: 5)
    /// - HOP_DEADLINE (optional, seconds)
    pub fn from_env(overrides: &HashMap<&str, String>) -> anyhow::Result<Self> {
        Self::from_lookup(|key| overrides.get(key).cloned().or_else(|| std::env::var(key).ok()))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| anyhow::anyhow!("{} environment variable not set", key))
        };

        let mut config = Self::new(
            required("HOP_HOST")?,
            required("HOP_CONFIG_PATH")?,
            required("HOP_PROJECT")?,
        );

        if let Some(port) = parse_var(&lookup, "HOP_PORT")? {
            config.port = port;
        }
        config.username = lookup("HOP_USER").unwrap_or_default();
        config.password = lookup("HOP_PASSWORD").unwrap_or_default();
        config.project_path = lookup("HOP_PROJECT_PATH").map(PathBuf::from);
        config.environment = lookup("HOP_ENVIRONMENT");
        config.environment_path = lookup("HOP_ENVIRONMENT_PATH").map(PathBuf::from);
        if let Some(level) = lookup("HOP_LOG_LEVEL") {
            config.log_level = level;
        }
        if let Some(seconds) = parse_var(&lookup, "HOP_POLL_INTERVAL")? {
            config.poll_interval = Duration::from_secs(seconds);
        }
        config.deadline = parse_var(&lookup, "HOP_DEADLINE")?.map(Duration::from_secs);

        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.host.is_empty() {
            anyhow::bail!("host cannot be empty");
        }

        if self.project.is_empty() {
            anyhow::bail!("project cannot be empty");
        }

        if self.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.environment_path.is_some() && self.environment.is_none() {
            anyhow::bail!("environment_path requires an environment name");
        }

        Ok(())
    }

    /// Project settings handed to the payload builder
    pub fn project_settings(&self) -> ProjectSettings {
        let mut settings = ProjectSettings::new(self.config_path.clone(), self.project.clone());
        if let Some(path) = &self.project_path {
            settings = settings.with_project_path(path.clone());
        }
        if let Some(environment) = &self.environment {
            settings =
                settings.with_environment(environment.clone(), self.environment_path.clone());
        }
        settings
    }

    pub fn connection(&self) -> ConnectionDescriptor {
        ConnectionDescriptor::new(
            self.host.clone(),
            self.port,
            self.username.clone(),
            self.password.clone(),
            self.project_settings(),
        )
        .with_log_level(self.log_level.clone())
    }

    pub fn poller(&self) -> PollerConfig {
        PollerConfig {
            poll_interval: self.poll_interval,
            deadline: self.deadline,
        }
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> anyhow::Result<Option<T>> {
    lookup(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("{} has an invalid value: {}", key, value))
        })
        .transpose()
}
