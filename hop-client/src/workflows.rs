//! Workflow servlet endpoints
//!
//! Workflows have no prepare step: a registered workflow is started directly.

use hop_core::domain::job::JobKind;
use hop_core::domain::variable::Variable;
use hop_core::dto::{RegisterResult, StatusSnapshot, WebResult};
use tracing::info;

use crate::HopServerClient;
use crate::error::Result;

const REGISTER_WORKFLOW: &str = "/hop/registerWorkflow/";
const START_WORKFLOW: &str = "/hop/startWorkflow/";
const STOP_WORKFLOW: &str = "/hop/stopWorkflow/";
const WORKFLOW_STATUS: &str = "/hop/workflowStatus/";
const REMOVE_WORKFLOW: &str = "/hop/removeWorkflow/";

impl HopServerClient {
    /// Register a workflow from the local project
    ///
    /// # Returns
    /// The server message and the execution id assigned by the server
    pub async fn register_workflow(
        &self,
        workflow_path: &str,
        task_params: &[Variable],
    ) -> Result<RegisterResult> {
        let body = self
            .payload_builder()?
            .build_workflow_request(workflow_path, task_params)?;
        let registered = self.register(REGISTER_WORKFLOW, body).await?;

        info!("{}: {}", workflow_path, registered.message);
        Ok(registered)
    }

    pub async fn start_workflow(&self, name: &str, id: &str) -> Result<WebResult> {
        self.control(START_WORKFLOW, name, id).await
    }

    pub async fn stop_workflow(&self, name: &str, id: &str) -> Result<WebResult> {
        self.control(STOP_WORKFLOW, name, id).await
    }

    /// Get the current status and log of a workflow execution
    pub async fn workflow_status(&self, name: &str, id: &str) -> Result<StatusSnapshot> {
        self.status(JobKind::Workflow, WORKFLOW_STATUS, name, id).await
    }

    pub async fn remove_workflow(&self, name: &str, id: &str) -> Result<WebResult> {
        self.control(REMOVE_WORKFLOW, name, id).await
    }
}
