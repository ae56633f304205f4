//! `<pipeline-status>` / `<workflow-status>` documents

use serde::{Deserialize, Serialize};

use crate::domain::job::JobKind;
use crate::domain::status::ExecutionStatus;
use crate::error::{CoreError, Result};
use crate::xml::Element;

/// One status poll of a running execution
///
/// Each poll replaces the previous snapshot entirely. `logging_string` is the
/// raw gzip+base64 log text, still undecoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub kind: JobKind,
    pub name: Option<String>,
    pub id: Option<String>,
    pub status: ExecutionStatus,
    pub status_desc: String,
    pub logging_string: String,
    pub error_desc: Option<String>,
}

impl StatusSnapshot {
    pub fn parse(kind: JobKind, body: &[u8]) -> Result<Self> {
        Self::from_element(kind, &Element::parse(body)?)
    }

    pub fn from_element(kind: JobKind, element: &Element) -> Result<Self> {
        let expected = kind.status_root();
        if element.name != expected {
            return Err(CoreError::UnexpectedRoot {
                expected: expected.to_string(),
                found: element.name.clone(),
            });
        }

        let name_field = match kind {
            JobKind::Pipeline => "pipeline_name",
            JobKind::Workflow => "workflow_name",
        };
        let status_desc = element.require_child_text("status_desc")?;

        Ok(Self {
            kind,
            name: non_empty(element.child_text(name_field)),
            id: non_empty(element.child_text("id")),
            status: ExecutionStatus::parse(&status_desc),
            status_desc,
            logging_string: element.child_text("logging_string").unwrap_or_default(),
            error_desc: non_empty(element.child_text("error_desc")),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pipeline_status() {
        let body = br#"<?xml version="1.0" encoding="UTF-8"?>
<pipeline-status>
  <pipeline_name>people</pipeline_name>
  <id>0f1b</id>
  <status_desc>Running</status_desc>
  <error_desc/>
  <paused>N</paused>
  <transform_status_list>
    <transform_status><transformName>gen</transformName></transform_status>
  </transform_status_list>
  <logging_string><![CDATA[H4sIAAAAAAAA]]></logging_string>
</pipeline-status>"#;

        let snapshot = StatusSnapshot::parse(JobKind::Pipeline, body).unwrap();
        assert_eq!(snapshot.name.as_deref(), Some("people"));
        assert_eq!(snapshot.id.as_deref(), Some("0f1b"));
        assert_eq!(snapshot.status, ExecutionStatus::Running);
        assert_eq!(snapshot.logging_string, "H4sIAAAAAAAA");
        assert_eq!(snapshot.error_desc, None);
    }

    #[test]
    fn test_parse_workflow_status_with_error() {
        let body = b"<workflow-status><workflow_name>main</workflow_name><id>7</id>\
<status_desc>Finished (with errors)</status_desc><error_desc>Action failed</error_desc>\
<logging_string></logging_string></workflow-status>";

        let snapshot = StatusSnapshot::parse(JobKind::Workflow, body).unwrap();
        assert_eq!(snapshot.status, ExecutionStatus::FinishedWithErrors);
        assert_eq!(snapshot.status_desc, "Finished (with errors)");
        assert_eq!(snapshot.error_desc.as_deref(), Some("Action failed"));
        assert_eq!(snapshot.logging_string, "");
    }

    #[test]
    fn test_status_desc_is_required() {
        let body = b"<pipeline-status><id>1</id></pipeline-status>";
        let err = StatusSnapshot::parse(JobKind::Pipeline, body).unwrap_err();
        assert!(err.to_string().contains("status_desc"));
    }

    #[test]
    fn test_kind_must_match_root() {
        let err = StatusSnapshot::parse(
            JobKind::Workflow,
            b"<pipeline-status><status_desc>Running</status_desc></pipeline-status>",
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::UnexpectedRoot { .. }));
    }
}
