//! Hop Server HTTP Client
//!
//! A typed client for the control-plane servlets of an Apache Hop server.
//!
//! Every call authenticates with HTTP basic auth, asks for XML output
//! (`xml=Y`) and decodes the answer into a record from `hop_core::dto`.
//! Failure responses become [`ClientError::Server`] carrying the envelope's
//! `result` and `message`.
//!
//! # Example
//!
//! ```no_run
//! use hop_client::{ConnectionDescriptor, HopServerClient};
//! use hop_project::ProjectSettings;
//!
//! # async fn example() -> hop_client::Result<()> {
//! let connection = ConnectionDescriptor::new(
//!     "localhost",
//!     8080,
//!     "cluster",
//!     "cluster",
//!     ProjectSettings::new("/opt/hop/config", "default"),
//! );
//! let client = HopServerClient::new(connection);
//!
//! let registered = client
//!     .register_pipeline("pipelines/people.hpl", Some("local"), &[])
//!     .await?;
//! client
//!     .prepare_pipeline_exec("pipelines/people.hpl", &registered.id)
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod connection;
pub mod error;
mod pipelines;
mod server;
mod workflows;

pub use connection::{ConnectionDescriptor, DEFAULT_LOG_LEVEL, DEFAULT_PORT};
pub use error::{ClientError, Result};

use hop_core::domain::job::JobKind;
use hop_core::dto::{RegisterResult, StatusSnapshot, WebResult};
use hop_core::xml::Element;
use hop_project::PayloadBuilder;
use reqwest::{Client, RequestBuilder};
use tracing::debug;

/// HTTP client for one Hop server
///
/// Endpoints are grouped by job kind:
/// - Pipelines: register, prepare, start, stop, status, remove
/// - Workflows: register, start, stop, status, remove
/// - Server: status
#[derive(Debug, Clone)]
pub struct HopServerClient {
    connection: ConnectionDescriptor,
    base_url: String,
    client: Client,
}

impl HopServerClient {
    /// Create a new client for the server described by `connection`
    pub fn new(connection: ConnectionDescriptor) -> Self {
        Self::with_client(connection, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(connection: ConnectionDescriptor, client: Client) -> Self {
        let base_url = connection.base_url();
        Self {
            connection,
            base_url,
            client,
        }
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn connection(&self) -> &ConnectionDescriptor {
        &self.connection
    }

    /// Resolves the local project into a payload builder
    ///
    /// The project is re-read on every call so that edits to definitions and
    /// configuration files are picked up by the next registration.
    pub fn payload_builder(&self) -> Result<PayloadBuilder> {
        Ok(PayloadBuilder::load(&self.connection.project)?
            .with_log_level(self.connection.log_level.clone()))
    }

    // =============================================================================
    // Shared request flows
    // =============================================================================

    async fn register(&self, endpoint: &str, body: Vec<u8>) -> Result<RegisterResult> {
        let request = self
            .client
            .post(self.url(endpoint))
            .query(&[("xml", "Y")])
            .header(reqwest::header::CONTENT_TYPE, "text/xml; charset=utf-8")
            .body(body);
        let web = web_result(self.send(request).await?)?;

        RegisterResult::try_from(web).map_err(|e| ClientError::ParseError(e.to_string()))
    }

    async fn control(&self, endpoint: &str, name: &str, id: &str) -> Result<WebResult> {
        let element = self.get(endpoint, name, id).await?;
        web_result(element)
    }

    async fn status(
        &self,
        kind: JobKind,
        endpoint: &str,
        name: &str,
        id: &str,
    ) -> Result<StatusSnapshot> {
        let element = self.get(endpoint, name, id).await?;
        if element.name == "webresult" {
            // Hop answers unknown executions with an error envelope and HTTP 200
            let web = web_result(element)?;
            return Err(ClientError::ParseError(format!(
                "expected {} but got webresult: {}",
                kind.status_root(),
                web.message
            )));
        }

        StatusSnapshot::from_element(kind, &element)
            .map_err(|e| ClientError::ParseError(e.to_string()))
    }

    async fn get(&self, endpoint: &str, name: &str, id: &str) -> Result<Element> {
        let request = self
            .client
            .get(self.url(endpoint))
            .query(&[("name", name), ("id", id), ("xml", "Y")]);
        self.send(request).await
    }

    async fn send(&self, request: RequestBuilder) -> Result<Element> {
        let request = request
            .basic_auth(&self.connection.username, Some(&self.connection.password))
            .build()?;
        debug!("{} {}", request.method(), request.url());

        let response = self.client.execute(request).await?;
        self.handle_response(response).await
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and parse the XML body
    ///
    /// This method checks the status code and returns a `Server` error if the
    /// request failed, or parses the response body if successful.
    async fn handle_response(&self, response: reqwest::Response) -> Result<Element> {
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(ClientError::from_failure(status.as_u16(), &body));
        }

        Element::parse(&body)
            .map_err(|e| ClientError::ParseError(format!("Failed to parse XML response: {}", e)))
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}

/// Decodes a `<webresult>` and turns an `ERROR` result into a server error
fn web_result(element: Element) -> Result<WebResult> {
    let web = WebResult::try_from(&element).map_err(|e| ClientError::ParseError(e.to_string()))?;
    if !web.is_ok() {
        return Err(ClientError::Server {
            status: 200,
            result: web.result,
            message: web.message,
        });
    }
    Ok(web)
}

#[cfg(test)]
pub(crate) mod test_support {
    use hop_project::ProjectSettings;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;
    use wiremock::MockServer;

    use crate::{ConnectionDescriptor, HopServerClient};

    pub const USER: &str = "cluster";
    pub const PASSWORD: &str = "cluster-secret";

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// A minimal Hop project with one pipeline and one workflow
    pub fn project() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            root,
            "hop-config.json",
            r#"{ "variables": [],
  "projectsConfig": { "projectConfigurations": [ { "projectName": "default", "projectHome": "project" } ] } }"#,
        );
        write(root, "project/project-config.json", r#"{ "config": { "variables": [] } }"#);
        write(
            root,
            "project/metadata/pipeline-run-configuration/local.json",
            r#"{ "name": "local", "configurationVariables": [ { "name": "RUN", "value": "local" } ] }"#,
        );
        write(root, "project/people.hpl", "<pipeline><info><name>people</name></info></pipeline>");
        write(root, "project/main.hwf", "<workflow><name>main</name></workflow>");
        dir
    }

    pub fn client(server: &MockServer, project: &TempDir) -> HopServerClient {
        let address = server.address();
        let connection = ConnectionDescriptor::new(
            address.ip().to_string(),
            address.port(),
            USER,
            PASSWORD,
            ProjectSettings::new(project.path(), "default"),
        );
        HopServerClient::new(connection)
    }

    pub fn webresult(result: &str, message: &str, id: Option<&str>) -> String {
        let id = id.map(|id| format!("<id>{}</id>", id)).unwrap_or_default();
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<webresult><result>{}</result><message>{}</message>{}</webresult>",
            result, message, id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use hop_project::ProjectSettings;

    fn connection(host: &str) -> ConnectionDescriptor {
        ConnectionDescriptor::new(
            host,
            8080,
            USER,
            PASSWORD,
            ProjectSettings::new("/tmp", "default"),
        )
    }

    #[test]
    fn test_client_creation() {
        let client = HopServerClient::new(connection("localhost"));
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_with_custom_client() {
        let client = HopServerClient::with_client(connection("hop.internal"), Client::new());
        assert_eq!(client.base_url(), "http://hop.internal:8080");
        assert_eq!(client.connection().username, USER);
    }

    #[test]
    fn test_web_result_error_is_server_error() {
        let element = Element::parse(webresult("ERROR", "boom", None).as_bytes()).unwrap();
        let err = web_result(element).unwrap_err();
        assert!(matches!(err, ClientError::Server { status: 200, .. }));
        assert_eq!(err.to_string(), "ERROR: boom");
    }

    #[test]
    fn test_payload_builder_uses_log_level() {
        let project = project();
        let connection = ConnectionDescriptor::new(
            "localhost",
            8080,
            USER,
            PASSWORD,
            ProjectSettings::new(project.path(), "default"),
        )
        .with_log_level("Detailed");
        let client = HopServerClient::new(connection);

        let bytes = client
            .payload_builder()
            .unwrap()
            .build_workflow_request("main.hwf", &[])
            .unwrap();
        let root = Element::parse(&bytes).unwrap();
        let level = root
            .child("workflow_execution_configuration")
            .and_then(|e| e.child_text("log_level"));
        assert_eq!(level.as_deref(), Some("Detailed"));
    }
}
