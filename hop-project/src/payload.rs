//! Registration payload builder
//!
//! The Hop server registers a pipeline or workflow from a single document
//! that carries the definition itself, an execution configuration (declared
//! parameters, variables, run configuration) and a snapshot of the project
//! metastore:
//!
//! ```xml
//! <pipeline_configuration>
//!   <pipeline>...</pipeline>
//!   <pipeline_execution_configuration>
//!     <parameters>...</parameters>
//!     <variables>...</variables>
//!     <run_configuration>local</run_configuration>
//!     <log_level>Basic</log_level>
//!   </pipeline_execution_configuration>
//!   <metastore_json>...</metastore_json>
//! </pipeline_configuration>
//! ```
//!
//! Workflows use the same layout with `workflow_*` element names.

use hop_core::domain::job::{JobKind, JobSpec};
use hop_core::domain::variable::Variable;
use hop_core::xml::Element;
use tracing::debug;

use crate::config::{ProjectConfig, ProjectSettings};
use crate::definition::Definition;
use crate::error::{ProjectError, Result};

/// Run configuration sent with every execution
const RUN_CONFIGURATION: &str = "local";
const DEFAULT_LOG_LEVEL: &str = "Basic";

const PROJECT_HOME: &str = "PROJECT_HOME";
const JDK_DEBUG: &str = "jdk.debug";
const JDK_DEBUG_VALUE: &str = "release";

/// Builds registration documents for one resolved project
#[derive(Debug, Clone)]
pub struct PayloadBuilder {
    config: ProjectConfig,
    log_level: String,
}

impl PayloadBuilder {
    pub fn new(config: ProjectConfig) -> Self {
        Self {
            config,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }

    /// Resolves the project described by `settings` and wraps it in a builder
    pub fn load(settings: &ProjectSettings) -> Result<Self> {
        Ok(Self::new(ProjectConfig::load(settings)?))
    }

    /// Sets the Hop log level requested for executions (`Basic`, `Detailed`, ...)
    pub fn with_log_level(mut self, log_level: impl Into<String>) -> Self {
        self.log_level = log_level.into();
        self
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Builds the payload for any job spec
    pub fn build_request(&self, spec: &JobSpec) -> Result<Vec<u8>> {
        match spec.kind {
            JobKind::Pipeline => self.build_pipeline_request(
                &spec.path,
                spec.run_configuration.as_deref(),
                &spec.params,
            ),
            JobKind::Workflow => self.build_workflow_request(&spec.path, &spec.params),
        }
    }

    /// Builds the `<workflow_configuration>` document for a workflow file
    ///
    /// # Errors
    /// Returns `ProjectError::NotFound` if the workflow file does not exist.
    pub fn build_workflow_request(
        &self,
        workflow_path: &str,
        task_params: &[Variable],
    ) -> Result<Vec<u8>> {
        let definition = self.load_definition(JobKind::Workflow, workflow_path)?;
        let variables = self.variables(task_params, None)?;
        self.render(definition, variables)
    }

    /// Builds the `<pipeline_configuration>` document for a pipeline file
    ///
    /// When `pipeline_config` names a pipeline run configuration, its
    /// variables are merged after the global variables.
    ///
    /// # Errors
    /// Returns `ProjectError::NotFound` if the pipeline file does not exist and
    /// `ProjectError::RunConfigNotFound` if the run configuration is unknown.
    pub fn build_pipeline_request(
        &self,
        pipeline_path: &str,
        pipeline_config: Option<&str>,
        task_params: &[Variable],
    ) -> Result<Vec<u8>> {
        let definition = self.load_definition(JobKind::Pipeline, pipeline_path)?;
        let variables = self.variables(task_params, pipeline_config)?;
        self.render(definition, variables)
    }

    /// Merged variable list in submission order
    ///
    /// Task parameters, global variables, run configuration variables,
    /// project variables, environment variables, then `PROJECT_HOME` and
    /// `jdk.debug`. Duplicates are kept; the server resolves them.
    pub fn variables(
        &self,
        task_params: &[Variable],
        pipeline_config: Option<&str>,
    ) -> Result<Vec<Variable>> {
        let run_config_variables = match pipeline_config {
            Some(name) => self.config.metastore.run_configuration_variables(name)?,
            None => Vec::new(),
        };

        let mut variables = Vec::with_capacity(
            task_params.len()
                + self.config.global_variables.len()
                + run_config_variables.len()
                + self.config.project_variables.len()
                + self.config.environment_variables.len()
                + 2,
        );
        variables.extend_from_slice(task_params);
        variables.extend_from_slice(&self.config.global_variables);
        variables.extend(run_config_variables);
        variables.extend_from_slice(&self.config.project_variables);
        variables.extend_from_slice(&self.config.environment_variables);
        variables.push(Variable::new(
            PROJECT_HOME,
            self.config.project_home.to_string_lossy(),
        ));
        variables.push(Variable::new(JDK_DEBUG, JDK_DEBUG_VALUE));
        Ok(variables)
    }

    fn load_definition(&self, kind: JobKind, relative_path: &str) -> Result<Definition> {
        Definition::load(kind, &self.config.project_home.join(relative_path))
    }

    fn render(&self, definition: Definition, variables: Vec<Variable>) -> Result<Vec<u8>> {
        let kind = definition.kind.as_str();

        let mut parameters = Element::new("parameters");
        for parameter in definition.parameters() {
            parameters.push(name_value("parameter", parameter));
        }

        let mut variables_element = Element::new("variables");
        for variable in variables {
            variables_element.push(name_value("variable", variable));
        }

        let execution_config = Element::new(format!("{}_execution_configuration", kind))
            .with_child(parameters)
            .with_child(variables_element)
            .with_child(Element::with_text("run_configuration", RUN_CONFIGURATION))
            .with_child(Element::with_text("log_level", self.log_level.as_str()));

        let document = Element::new(format!("{}_configuration", kind))
            .with_child(definition.root)
            .with_child(execution_config)
            .with_child(Element::with_text("metastore_json", self.config.metastore.encode()?));

        let bytes = document
            .to_document()
            .map_err(|e| ProjectError::Payload(e.to_string()))?;

        debug!(
            "Built {} payload for {} ({} bytes)",
            kind,
            definition.path.display(),
            bytes.len()
        );
        Ok(bytes)
    }
}

fn name_value(tag: &str, variable: Variable) -> Element {
    Element::new(tag)
        .with_child(Element::with_text("name", variable.name))
        .with_child(Element::with_text("value", variable.value))
}
