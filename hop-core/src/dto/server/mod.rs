//! `<serverstatus>` document

use serde::{Deserialize, Serialize};

use crate::domain::job::JobKind;
use crate::error::{CoreError, Result};
use crate::xml::Element;

const ROOT: &str = "serverstatus";

/// Summary of the server returned by `/hop/status/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub status_desc: String,
    pub memory_free: Option<u64>,
    pub memory_total: Option<u64>,
    pub cpu_cores: Option<u32>,
    pub uptime_ms: Option<u64>,
    pub executions: Vec<ExecutionSummary>,
}

/// An execution known to the server, as listed in the server status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub kind: JobKind,
    pub name: String,
    pub id: String,
    pub status_desc: String,
}

impl ServerStatus {
    pub fn parse(body: &[u8]) -> Result<Self> {
        Self::try_from(&Element::parse(body)?)
    }
}

impl TryFrom<&Element> for ServerStatus {
    type Error = CoreError;

    fn try_from(element: &Element) -> Result<Self> {
        if element.name != ROOT {
            return Err(CoreError::UnexpectedRoot {
                expected: ROOT.to_string(),
                found: element.name.clone(),
            });
        }

        let mut executions = Vec::new();
        for (kind, list, name_field) in [
            (JobKind::Pipeline, "pipeline_status_list", "pipeline_name"),
            (JobKind::Workflow, "workflow_status_list", "workflow_name"),
        ] {
            let Some(list) = element.child(list) else {
                continue;
            };
            for entry in list.elements() {
                executions.push(ExecutionSummary {
                    kind,
                    name: entry.child_text(name_field).unwrap_or_default(),
                    id: entry.child_text("id").unwrap_or_default(),
                    status_desc: entry.child_text("status_desc").unwrap_or_default(),
                });
            }
        }

        Ok(Self {
            status_desc: element.require_child_text("statusdesc")?,
            memory_free: number(element, "memory_free"),
            memory_total: number(element, "memory_total"),
            cpu_cores: number(element, "cpu_cores"),
            uptime_ms: number(element, "uptime"),
            executions,
        })
    }
}

fn number<T: std::str::FromStr>(element: &Element, field: &str) -> Option<T> {
    element.child_text(field)?.trim().parse().ok()
}
