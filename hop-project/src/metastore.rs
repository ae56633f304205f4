//! Project metastore
//!
//! Hop keeps metadata objects (run configurations, database connections, ...)
//! as JSON files under `<project>/metadata/<category>/<object>.json`. The
//! server cannot see the local project, so a snapshot of these objects is
//! shipped with every registration as gzip-compressed, base64-encoded JSON.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::write::GzEncoder;
use hop_core::domain::variable::Variable;
use serde_json::Value;
use tracing::debug;

use crate::config::read_json;
use crate::error::{ProjectError, Result};

/// Category holding pipeline run configurations
pub const PIPELINE_RUN_CONFIGURATION: &str = "pipeline-run-configuration";

/// Metadata objects grouped by category
///
/// Categories are ordered by name and objects by file name, so encoding the
/// same tree twice yields the same bytes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metastore {
    categories: BTreeMap<String, Vec<Value>>,
}

impl Metastore {
    /// Scans a metadata directory
    ///
    /// Each subdirectory is a category; each `.json` file inside it is one
    /// object. A missing directory yields an empty metastore.
    pub fn load(metadata_dir: &Path) -> Result<Self> {
        let mut categories = BTreeMap::new();
        if !metadata_dir.is_dir() {
            debug!("No metadata folder at {}", metadata_dir.display());
            return Ok(Self { categories });
        }

        for category_dir in sorted_entries(metadata_dir)? {
            if !category_dir.is_dir() {
                continue;
            }
            let Some(category) = category_dir.file_name().map(|n| n.to_string_lossy().into_owned())
            else {
                continue;
            };

            let mut objects = Vec::new();
            for file in sorted_entries(&category_dir)? {
                let is_json = file.extension().is_some_and(|ext| ext == "json");
                if file.is_file() && is_json {
                    objects.push(read_json::<Value>(&file)?);
                }
            }
            categories.insert(category, objects);
        }

        debug!(
            "Loaded metastore from {} ({} categories)",
            metadata_dir.display(),
            categories.len()
        );
        Ok(Self { categories })
    }

    /// Objects of a category, empty if the category does not exist
    pub fn category(&self, name: &str) -> &[Value] {
        self.categories.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Inserts an object, creating the category if needed
    pub fn insert(&mut self, category: impl Into<String>, object: Value) {
        self.categories.entry(category.into()).or_default().push(object);
    }

    /// Variables declared by the named pipeline run configuration
    ///
    /// # Errors
    /// Returns `ProjectError::RunConfigNotFound` when no run configuration has
    /// that name.
    pub fn run_configuration_variables(&self, name: &str) -> Result<Vec<Variable>> {
        let run_config = self
            .category(PIPELINE_RUN_CONFIGURATION)
            .iter()
            .find(|object| object.get("name").and_then(Value::as_str) == Some(name))
            .ok_or_else(|| ProjectError::RunConfigNotFound(name.to_string()))?;

        match run_config.get("configurationVariables") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(vars) => serde_json::from_value(vars.clone()).map_err(|e| {
                ProjectError::config(format!(
                    "invalid configurationVariables in run configuration {}: {}",
                    name, e
                ))
            }),
        }
    }

    /// Serializes the metastore as JSON, gzips it and base64-encodes the result
    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_vec(&self.categories)
            .map_err(|e| ProjectError::Payload(format!("metastore serialization: {}", e)))?;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(&json)
            .map_err(|e| ProjectError::Payload(format!("metastore compression: {}", e)))?;
        let compressed = encoder
            .finish()
            .map_err(|e| ProjectError::Payload(format!("metastore compression: {}", e)))?;

        Ok(STANDARD.encode(compressed))
    }
}

fn sorted_entries(dir: &Path) -> Result<Vec<std::path::PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| ProjectError::io(dir, e))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| ProjectError::io(dir, e))?;
    entries.sort();
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::fixtures::hop_layout;
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[test]
    fn test_load_categories_in_order() {
        let layout = hop_layout();
        let metastore = Metastore::load(&layout.project_home().join("metadata")).unwrap();

        let run_configs = metastore.category(PIPELINE_RUN_CONFIGURATION);
        assert_eq!(run_configs.len(), 2);
        assert_eq!(run_configs[0]["name"], "local");
        assert_eq!(run_configs[1]["name"], "remote hop server");
        assert_eq!(metastore.category("rdbms")[0]["name"], "warehouse");
        assert!(metastore.category("missing").is_empty());
    }

    #[test]
    fn test_skips_non_json_files() {
        let layout = hop_layout();
        layout.write("config/projects/default/metadata/rdbms/README.txt", "notes");
        layout.write("config/projects/default/metadata/stray.json", "{}");

        let metastore = Metastore::load(&layout.project_home().join("metadata")).unwrap();
        assert_eq!(metastore.category("rdbms").len(), 1);
    }

    #[test]
    fn test_invalid_object_is_json_error() {
        let layout = hop_layout();
        layout.write("config/projects/default/metadata/rdbms/broken.json", "{ not json");

        let err = Metastore::load(&layout.project_home().join("metadata")).unwrap_err();
        assert!(matches!(err, ProjectError::Json { .. }));
    }

    #[test]
    fn test_run_configuration_variables() {
        let layout = hop_layout();
        let metastore = Metastore::load(&layout.project_home().join("metadata")).unwrap();

        let vars = metastore.run_configuration_variables("remote hop server").unwrap();
        assert_eq!(vars, vec![hop_core::domain::variable::Variable {
            name: "REMOTE_VAR".to_string(),
            value: "remote".to_string(),
            description: Some(String::new()),
        }]);

        assert!(metastore.run_configuration_variables("local").unwrap().is_empty());

        let err = metastore.run_configuration_variables("missing-config").unwrap_err();
        assert!(matches!(err, ProjectError::RunConfigNotFound(_)));
        assert!(err.to_string().contains("missing-config"));
    }

    #[test]
    fn test_encode_is_gzipped_json() {
        let mut metastore = Metastore::default();
        metastore.insert("rdbms", serde_json::json!({ "name": "warehouse" }));

        let encoded = metastore.encode().unwrap();
        let compressed = STANDARD.decode(encoded).unwrap();
        let mut json = String::new();
        GzDecoder::new(compressed.as_slice())
            .read_to_string(&mut json)
            .unwrap();

        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value, serde_json::json!({ "rdbms": [ { "name": "warehouse" } ] }));
    }
}
