//! Job domain types

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::variable::Variable;

/// The two kinds of definitions a Hop server can execute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Pipeline,
    Workflow,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Pipeline => "pipeline",
            JobKind::Workflow => "workflow",
        }
    }

    /// Root element of the status document returned for this kind
    pub fn status_root(&self) -> &'static str {
        match self {
            JobKind::Pipeline => "pipeline-status",
            JobKind::Workflow => "workflow-status",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to run one pipeline or workflow definition
///
/// `path` is relative to the project home. `run_configuration` names a
/// pipeline run configuration from the project metadata and is ignored for
/// workflows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    pub kind: JobKind,
    pub path: String,
    pub run_configuration: Option<String>,
    pub params: Vec<Variable>,
}

impl JobSpec {
    pub fn pipeline(path: impl Into<String>, run_configuration: Option<String>) -> Self {
        Self {
            kind: JobKind::Pipeline,
            path: path.into(),
            run_configuration,
            params: Vec::new(),
        }
    }

    pub fn workflow(path: impl Into<String>) -> Self {
        Self {
            kind: JobKind::Workflow,
            path: path.into(),
            run_configuration: None,
            params: Vec::new(),
        }
    }

    /// Adds a task parameter, keeping insertion order
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push(Variable::new(name, value));
        self
    }

    pub fn with_params(mut self, params: impl IntoIterator<Item = Variable>) -> Self {
        self.params.extend(params);
        self
    }
}

/// Identifies a registered execution on the server
///
/// The server assigns `id` at registration; `name` is the job name the
/// execution was registered under. Both are sent with every later call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionHandle {
    pub kind: JobKind,
    pub name: String,
    pub id: String,
}

impl ExecutionHandle {
    pub fn new(kind: JobKind, name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for ExecutionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.kind, self.name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_spec_builders() {
        let spec = JobSpec::pipeline("pipelines/people.hpl", Some("local".to_string()))
            .with_param("DATE", "25-08-2022")
            .with_param("COUNT", "10");

        assert_eq!(spec.kind, JobKind::Pipeline);
        assert_eq!(spec.run_configuration.as_deref(), Some("local"));
        assert_eq!(spec.params[0].name, "DATE");
        assert_eq!(spec.params[1].name, "COUNT");

        let spec = JobSpec::workflow("main.hwf");
        assert_eq!(spec.kind, JobKind::Workflow);
        assert!(spec.run_configuration.is_none());
    }

    #[test]
    fn test_status_roots() {
        assert_eq!(JobKind::Pipeline.status_root(), "pipeline-status");
        assert_eq!(JobKind::Workflow.status_root(), "workflow-status");
    }
}
