//! Execution API
//!
//! Maps the job-kind specific servlet calls of the client onto one
//! lifecycle: register, prepare, start, status and stop.

use async_trait::async_trait;
use hop_client::{HopServerClient, Result};
use hop_core::domain::job::{ExecutionHandle, JobKind, JobSpec};
use hop_core::dto::StatusSnapshot;

/// Lifecycle calls for one execution on a Hop server
#[async_trait]
pub trait ExecutionApi: Send + Sync {
    /// Registers the job and returns the handle assigned by the server
    ///
    /// The execution is registered under the job path as given.
    async fn register(&self, spec: &JobSpec) -> Result<ExecutionHandle>;

    /// Prepares a registered execution. Only pipelines have this step.
    async fn prepare(&self, handle: &ExecutionHandle) -> Result<()>;

    async fn start(&self, handle: &ExecutionHandle) -> Result<()>;

    async fn status(&self, handle: &ExecutionHandle) -> Result<StatusSnapshot>;

    async fn stop(&self, handle: &ExecutionHandle) -> Result<()>;
}

#[async_trait]
impl ExecutionApi for HopServerClient {
    async fn register(&self, spec: &JobSpec) -> Result<ExecutionHandle> {
        let registered = match spec.kind {
            JobKind::Pipeline => {
                self.register_pipeline(&spec.path, spec.run_configuration.as_deref(), &spec.params)
                    .await?
            }
            JobKind::Workflow => self.register_workflow(&spec.path, &spec.params).await?,
        };
        Ok(ExecutionHandle::new(spec.kind, spec.path.clone(), registered.id))
    }

    async fn prepare(&self, handle: &ExecutionHandle) -> Result<()> {
        if handle.kind == JobKind::Pipeline {
            self.prepare_pipeline_exec(&handle.name, &handle.id).await?;
        }
        Ok(())
    }

    async fn start(&self, handle: &ExecutionHandle) -> Result<()> {
        match handle.kind {
            JobKind::Pipeline => self.start_pipeline_execution(&handle.name, &handle.id).await?,
            JobKind::Workflow => self.start_workflow(&handle.name, &handle.id).await?,
        };
        Ok(())
    }

    async fn status(&self, handle: &ExecutionHandle) -> Result<StatusSnapshot> {
        match handle.kind {
            JobKind::Pipeline => self.pipeline_status(&handle.name, &handle.id).await,
            JobKind::Workflow => self.workflow_status(&handle.name, &handle.id).await,
        }
    }

    async fn stop(&self, handle: &ExecutionHandle) -> Result<()> {
        match handle.kind {
            JobKind::Pipeline => self.stop_pipeline_execution(&handle.name, &handle.id).await?,
            JobKind::Workflow => self.stop_workflow(&handle.name, &handle.id).await?,
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hop_client::ConnectionDescriptor;
    use hop_core::domain::status::ExecutionStatus;
    use hop_project::ProjectSettings;
    use std::fs;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("project")).unwrap();
        fs::write(
            dir.path().join("hop-config.json"),
            r#"{ "projectsConfig": { "projectConfigurations": [ { "projectName": "default", "projectHome": "project" } ] } }"#,
        )
        .unwrap();
        fs::write(dir.path().join("project/project-config.json"), "{}").unwrap();
        fs::write(
            dir.path().join("project/main.hwf"),
            "<workflow><name>main</name></workflow>",
        )
        .unwrap();
        dir
    }

    fn ok(id: Option<&str>) -> ResponseTemplate {
        let id = id.map(|id| format!("<id>{}</id>", id)).unwrap_or_default();
        ResponseTemplate::new(200).set_body_string(format!(
            "<webresult><result>OK</result><message/>{}</webresult>",
            id
        ))
    }

    #[tokio::test]
    async fn test_workflow_lifecycle_through_trait() {
        let server = MockServer::start().await;
        let project = project();

        Mock::given(method("POST"))
            .and(path("/hop/registerWorkflow/"))
            .respond_with(ok(Some("wf-7")))
            .expect(1)
            .mount(&server)
            .await;
        for endpoint in ["/hop/startWorkflow/", "/hop/stopWorkflow/"] {
            Mock::given(method("GET"))
                .and(path(endpoint))
                .and(query_param("name", "main.hwf"))
                .and(query_param("id", "wf-7"))
                .respond_with(ok(None))
                .expect(1)
                .mount(&server)
                .await;
        }
        Mock::given(method("GET"))
            .and(path("/hop/workflowStatus/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<workflow-status><status_desc>Running</status_desc><logging_string/></workflow-status>",
            ))
            .mount(&server)
            .await;

        let address = server.address();
        let client = HopServerClient::new(ConnectionDescriptor::new(
            address.ip().to_string(),
            address.port(),
            "cluster",
            "cluster",
            ProjectSettings::new(project.path(), "default"),
        ));
        let api: &dyn ExecutionApi = &client;

        let handle = api.register(&JobSpec::workflow("main.hwf")).await.unwrap();
        assert_eq!(handle, ExecutionHandle::new(JobKind::Workflow, "main.hwf", "wf-7"));

        // workflows have no prepare step, so no request is expected
        api.prepare(&handle).await.unwrap();
        api.start(&handle).await.unwrap();
        assert_eq!(api.status(&handle).await.unwrap().status, ExecutionStatus::Running);
        api.stop(&handle).await.unwrap();
    }
}
