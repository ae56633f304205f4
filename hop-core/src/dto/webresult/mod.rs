//! `<webresult>` envelope

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::xml::Element;

const ROOT: &str = "webresult";

/// Generic result envelope returned by control servlets and by failures
///
/// ```xml
/// <webresult>
///   <result>OK</result>
///   <message>...</message>
///   <id>...</id>
/// </webresult>
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebResult {
    pub result: String,
    pub message: String,
    pub id: Option<String>,
}

impl WebResult {
    pub const OK: &'static str = "OK";

    pub fn is_ok(&self) -> bool {
        self.result == Self::OK
    }

    pub fn parse(body: &[u8]) -> Result<Self> {
        Self::try_from(&Element::parse(body)?)
    }
}

impl TryFrom<&Element> for WebResult {
    type Error = CoreError;

    fn try_from(element: &Element) -> Result<Self> {
        if element.name != ROOT {
            return Err(CoreError::UnexpectedRoot {
                expected: ROOT.to_string(),
                found: element.name.clone(),
            });
        }

        Ok(Self {
            result: element.require_child_text("result")?,
            message: element.child_text("message").unwrap_or_default(),
            id: element.child_text("id").filter(|id| !id.is_empty()),
        })
    }
}

/// Outcome of a pipeline or workflow registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResult {
    pub message: String,
    pub id: String,
}

impl TryFrom<WebResult> for RegisterResult {
    type Error = CoreError;

    fn try_from(result: WebResult) -> Result<Self> {
        let id = result
            .id
            .ok_or_else(|| CoreError::missing_field(ROOT, "id"))?;
        Ok(Self {
            message: result.message,
            id,
        })
    }
}
