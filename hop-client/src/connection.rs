//! Connection descriptor

use std::fmt;

use hop_project::ProjectSettings;

/// Default Hop server port
pub const DEFAULT_PORT: u16 = 8080;

/// Default Hop log level for executions
pub const DEFAULT_LOG_LEVEL: &str = "Basic";

/// Everything needed to reach a Hop server and describe the local project
///
/// The descriptor is an immutable value: the client clones it once at
/// construction and reuses it for every call.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub log_level: String,
    pub project: ProjectSettings,
}

impl ConnectionDescriptor {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
        project: ProjectSettings,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password: password.into(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            project,
        }
    }

    pub fn with_log_level(mut self, log_level: impl Into<String>) -> Self {
        self.log_level = log_level.into();
        self
    }

    /// Base URL of the server (e.g., "http://localhost:8080")
    pub fn base_url(&self) -> String {
        let host = self.host.trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            format!("{}:{}", host, self.port)
        } else {
            format!("http://{}:{}", host, self.port)
        }
    }
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("log_level", &self.log_level)
            .field("project", &self.project)
            .finish()
    }
}
