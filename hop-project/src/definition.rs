//! Pipeline and workflow definitions
//!
//! Definitions are the `.hpl` / `.hwf` XML documents authored in Hop. The
//! payload builder embeds them unchanged and extracts their declared
//! parameters.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use hop_core::domain::job::JobKind;
use hop_core::domain::variable::Variable;
use hop_core::xml::Element;

use crate::error::{ProjectError, Result};

/// A parsed definition file
#[derive(Debug, Clone)]
pub struct Definition {
    pub kind: JobKind,
    pub path: PathBuf,
    pub root: Element,
}

impl Definition {
    /// Reads and parses a definition file
    ///
    /// # Errors
    /// Returns `ProjectError::NotFound` if the file does not exist and
    /// `ProjectError::Xml` if it is not well-formed.
    pub fn load(kind: JobKind, path: &Path) -> Result<Self> {
        let content = fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ProjectError::NotFound {
                kind,
                path: path.to_path_buf(),
            },
            _ => ProjectError::io(path, e),
        })?;

        let root = Element::parse(&content).map_err(|source| ProjectError::Xml {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            kind,
            path: path.to_path_buf(),
            root,
        })
    }

    /// Parameters declared by the definition, in declaration order
    ///
    /// Pipelines declare them under `<info><parameters>`, workflows directly
    /// under the root. Each `<parameter>` contributes its `name` and
    /// `default_value`. A definition without a parameters section has none.
    pub fn parameters(&self) -> Vec<Variable> {
        let section = match self.kind {
            JobKind::Pipeline => self
                .root
                .child("info")
                .or_else(|| self.root.elements().next())
                .and_then(|info| info.child("parameters")),
            JobKind::Workflow => self.root.child("parameters"),
        };

        section
            .map(|parameters| {
                parameters
                    .children_named("parameter")
                    .map(|parameter| {
                        Variable::new(
                            parameter.child_text("name").unwrap_or_default(),
                            parameter.child_text("default_value").unwrap_or_default(),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
