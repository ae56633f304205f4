//! Pipeline servlet endpoints

use hop_core::domain::job::JobKind;
use hop_core::domain::variable::Variable;
use hop_core::dto::{RegisterResult, StatusSnapshot, WebResult};
use tracing::info;

use crate::HopServerClient;
use crate::error::Result;

const REGISTER_PIPELINE: &str = "/hop/registerPipeline/";
const PREPARE_PIPELINE_EXEC: &str = "/hop/prepareExec/";
const START_PIPELINE_EXEC: &str = "/hop/startExec/";
const STOP_PIPELINE_EXEC: &str = "/hop/stopExec/";
const PIPELINE_STATUS: &str = "/hop/pipelineStatus/";
const REMOVE_PIPELINE: &str = "/hop/removePipeline/";

impl HopServerClient {
    // =============================================================================
    // Pipeline Lifecycle
    // =============================================================================

    /// Register a pipeline from the local project
    ///
    /// # Arguments
    /// * `pipeline_path` - Definition file, relative to the project home
    /// * `pipeline_config` - Optional pipeline run configuration whose
    ///   variables are merged into the execution configuration
    /// * `task_params` - Task parameters, sent first in the variable list
    ///
    /// # Returns
    /// The server message and the execution id assigned by the server
    pub async fn register_pipeline(
        &self,
        pipeline_path: &str,
        pipeline_config: Option<&str>,
        task_params: &[Variable],
    ) -> Result<RegisterResult> {
        let body = self
            .payload_builder()?
            .build_pipeline_request(pipeline_path, pipeline_config, task_params)?;
        let registered = self.register(REGISTER_PIPELINE, body).await?;

        info!("{}: {}", pipeline_path, registered.message);
        Ok(registered)
    }

    /// Prepare a registered pipeline for execution
    pub async fn prepare_pipeline_exec(&self, name: &str, id: &str) -> Result<WebResult> {
        self.control(PREPARE_PIPELINE_EXEC, name, id).await
    }

    /// Start a prepared pipeline
    pub async fn start_pipeline_execution(&self, name: &str, id: &str) -> Result<WebResult> {
        self.control(START_PIPELINE_EXEC, name, id).await
    }

    /// Stop a running pipeline
    pub async fn stop_pipeline_execution(&self, name: &str, id: &str) -> Result<WebResult> {
        self.control(STOP_PIPELINE_EXEC, name, id).await
    }

    /// Get the current status and log of a pipeline execution
    pub async fn pipeline_status(&self, name: &str, id: &str) -> Result<StatusSnapshot> {
        self.status(JobKind::Pipeline, PIPELINE_STATUS, name, id).await
    }

    /// Remove a finished pipeline from the server
    pub async fn remove_pipeline(&self, name: &str, id: &str) -> Result<WebResult> {
        self.control(REMOVE_PIPELINE, name, id).await
    }
}
