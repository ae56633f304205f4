//! Hop configuration resolution
//!
//! Reads the three JSON documents that define the variables of a job
//! invocation and the project metadata tree:
//!
//! - `<config_path>/hop-config.json`: global variables, declared projects and
//!   lifecycle environments
//! - `<project home>/project-config.json` (or the project's `configFilename`):
//!   project variables
//! - the environment's configuration files: environment variables

use std::fs;
use std::path::{Path, PathBuf};

use hop_core::domain::variable::Variable;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ProjectError, Result};
use crate::metastore::Metastore;

const HOP_CONFIG_FILE: &str = "hop-config.json";
const DEFAULT_PROJECT_CONFIG_FILE: &str = "project-config.json";
const METADATA_FOLDER: &str = "metadata";
const PROJECT_HOME_VAR: &str = "${PROJECT_HOME}";

/// Where to find a project's configuration on disk
///
/// `project_path` overrides the `projectHome` declared in `hop-config.json`.
/// When `environment_path` is set, each environment configuration file is
/// looked up by its base name inside that directory instead of at the path
/// recorded in `hop-config.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSettings {
    pub config_path: PathBuf,
    pub project_name: String,
    pub project_path: Option<PathBuf>,
    pub environment_name: Option<String>,
    pub environment_path: Option<PathBuf>,
}

impl ProjectSettings {
    pub fn new(config_path: impl Into<PathBuf>, project_name: impl Into<String>) -> Self {
        Self {
            config_path: config_path.into(),
            project_name: project_name.into(),
            project_path: None,
            environment_name: None,
            environment_path: None,
        }
    }

    pub fn with_project_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_path = Some(path.into());
        self
    }

    pub fn with_environment(mut self, name: impl Into<String>, path: Option<PathBuf>) -> Self {
        self.environment_name = Some(name.into());
        self.environment_path = path;
        self
    }
}

// =============================================================================
// On-disk documents
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HopConfigFile {
    #[serde(default)]
    variables: Vec<Variable>,
    #[serde(default)]
    projects_config: ProjectsSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectsSection {
    #[serde(default)]
    project_configurations: Vec<ProjectEntry>,
    #[serde(default)]
    lifecycle_environments: Vec<EnvironmentEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectEntry {
    project_name: String,
    project_home: Option<String>,
    config_filename: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnvironmentEntry {
    name: String,
    #[serde(default)]
    configuration_files: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectConfigFile {
    metadata_base_folder: Option<String>,
    #[serde(default)]
    config: ProjectVariables,
}

#[derive(Debug, Default, Deserialize)]
struct ProjectVariables {
    #[serde(default)]
    variables: Vec<Variable>,
}

#[derive(Debug, Deserialize)]
struct EnvironmentFile {
    #[serde(default)]
    variables: Vec<Variable>,
}

// =============================================================================
// Resolved configuration
// =============================================================================

/// Variables and metadata resolved for one project (and optional environment)
///
/// Every variable list keeps the order of its source document.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub project_name: String,
    pub project_home: PathBuf,
    pub global_variables: Vec<Variable>,
    pub project_variables: Vec<Variable>,
    pub environment_variables: Vec<Variable>,
    pub metastore: Metastore,
}

impl ProjectConfig {
    /// Loads the configuration described by `settings`
    ///
    /// # Errors
    /// Returns `ProjectError::Config` if the project or environment is not
    /// declared in `hop-config.json`, and I/O or JSON errors for unreadable
    /// documents.
    pub fn load(settings: &ProjectSettings) -> Result<Self> {
        let hop_config: HopConfigFile =
            read_json(&settings.config_path.join(HOP_CONFIG_FILE))?;

        let project = hop_config
            .projects_config
            .project_configurations
            .iter()
            .find(|entry| entry.project_name == settings.project_name)
            .ok_or_else(|| {
                ProjectError::config(format!(
                    "project {} not found in {}",
                    settings.project_name, HOP_CONFIG_FILE
                ))
            })?;

        let project_home = match (&settings.project_path, &project.project_home) {
            (Some(path), _) => path.clone(),
            (None, Some(home)) => resolve(&settings.config_path, home),
            (None, None) => {
                return Err(ProjectError::config(format!(
                    "project {} has no projectHome and no project path was given",
                    settings.project_name
                )));
            }
        };

        let config_filename = project
            .config_filename
            .as_deref()
            .unwrap_or(DEFAULT_PROJECT_CONFIG_FILE);
        let project_file: ProjectConfigFile = read_json(&project_home.join(config_filename))?;

        let metadata_dir = match &project_file.metadata_base_folder {
            Some(folder) => resolve(&project_home, &expand_project_home(folder, &project_home)),
            None => project_home.join(METADATA_FOLDER),
        };
        let metastore = Metastore::load(&metadata_dir)?;

        let environment_variables = match &settings.environment_name {
            Some(name) => load_environment(
                &hop_config.projects_config.lifecycle_environments,
                name,
                settings,
                &project_home,
            )?,
            None => Vec::new(),
        };

        debug!(
            "Resolved project {} at {}: {} global, {} project, {} environment variable(s)",
            settings.project_name,
            project_home.display(),
            hop_config.variables.len(),
            project_file.config.variables.len(),
            environment_variables.len()
        );

        Ok(Self {
            project_name: settings.project_name.clone(),
            project_home,
            global_variables: hop_config.variables,
            project_variables: project_file.config.variables,
            environment_variables,
            metastore,
        })
    }
}

fn load_environment(
    environments: &[EnvironmentEntry],
    name: &str,
    settings: &ProjectSettings,
    project_home: &Path,
) -> Result<Vec<Variable>> {
    let environment = environments
        .iter()
        .find(|entry| entry.name == name)
        .ok_or_else(|| {
            ProjectError::config(format!("environment {} not found in {}", name, HOP_CONFIG_FILE))
        })?;

    let mut variables = Vec::new();
    for file in &environment.configuration_files {
        let path = match &settings.environment_path {
            Some(dir) => {
                let base_name = Path::new(file).file_name().ok_or_else(|| {
                    ProjectError::config(format!("invalid environment file entry {}", file))
                })?;
                dir.join(base_name)
            }
            None => resolve(&settings.config_path, &expand_project_home(file, project_home)),
        };
        let env_file: EnvironmentFile = read_json(&path)?;
        variables.extend(env_file.variables);
    }
    Ok(variables)
}

fn expand_project_home(value: &str, project_home: &Path) -> String {
    value.replace(PROJECT_HOME_VAR, &project_home.to_string_lossy())
}

fn resolve(base: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read(path).map_err(|e| ProjectError::io(path, e))?;
    serde_json::from_slice(&content).map_err(|source| ProjectError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Builds a small Hop installation in a temporary directory

    use std::fs;
    use std::path::{Path, PathBuf};

    use tempfile::TempDir;

    pub const PROJECT: &str = "default";
    pub const ENVIRONMENT: &str = "Dev";

    pub struct HopLayout {
        pub dir: TempDir,
    }

    impl HopLayout {
        pub fn config_path(&self) -> PathBuf {
            self.dir.path().join("config")
        }

        pub fn project_home(&self) -> PathBuf {
            self.config_path().join("projects").join(PROJECT)
        }

        pub fn environment_path(&self) -> PathBuf {
            self.dir.path().join("environments")
        }

        pub fn write(&self, relative: impl AsRef<Path>, content: &str) {
            let path = self.dir.path().join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
    }

    pub fn hop_layout() -> HopLayout {
        let layout = HopLayout {
            dir: tempfile::tempdir().unwrap(),
        };

        layout.write(
            "config/hop-config.json",
            r#"{
  "variables": [
    { "name": "HOP_MAX_LOG_SIZE_IN_LINES", "value": "0", "description": "Max log lines" },
    { "name": "HOP_LOG_TAB_REFRESH_DELAY", "value": "1000", "description": "Refresh delay" }
  ],
  "projectsConfig": {
    "enabled": true,
    "projectConfigurations": [
      { "projectName": "default", "projectHome": "projects/default", "configFilename": "project-config.json" }
    ],
    "lifecycleEnvironments": [
      { "name": "Dev", "purpose": "Development", "projectName": "default",
        "configurationFiles": ["/opt/hop/environments/dev-config.json"] }
    ]
  }
}"#,
        );
        layout.write(
            "config/projects/default/project-config.json",
            r#"{
  "metadataBaseFolder": "${PROJECT_HOME}/metadata",
  "config": {
    "variables": [ { "name": "TESTING_VARIABLE", "value": "42", "description": "This is a simple Test" } ]
  }
}"#,
        );
        layout.write(
            "environments/dev-config.json",
            r#"{ "variables": [ { "name": "VARTEST", "value": "420", "description": "Whatever" } ] }"#,
        );
        layout.write(
            "config/projects/default/metadata/pipeline-run-configuration/local.json",
            r#"{ "name": "local", "configurationVariables": [] }"#,
        );
        layout.write(
            "config/projects/default/metadata/pipeline-run-configuration/remote.json",
            r#"{ "name": "remote hop server",
  "configurationVariables": [ { "name": "REMOTE_VAR", "value": "remote", "description": "" } ] }"#,
        );
        layout.write(
            "config/projects/default/metadata/rdbms/warehouse.json",
            r#"{ "name": "warehouse", "rdbms": { "POSTGRESQL": { "hostname": "db" } } }"#,
        );
        layout
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    fn names(vars: &[Variable]) -> Vec<&str> {
        vars.iter().map(|v| v.name.as_str()).collect()
    }

    #[test]
    fn test_load_project_with_environment() {
        let layout = hop_layout();
        let settings = ProjectSettings::new(layout.config_path(), PROJECT)
            .with_environment(ENVIRONMENT, Some(layout.environment_path()));

        let config = ProjectConfig::load(&settings).unwrap();

        assert_eq!(config.project_home, layout.project_home());
        assert_eq!(
            names(&config.global_variables),
            vec!["HOP_MAX_LOG_SIZE_IN_LINES", "HOP_LOG_TAB_REFRESH_DELAY"]
        );
        assert_eq!(config.global_variables[1].value, "1000");
        assert_eq!(names(&config.project_variables), vec!["TESTING_VARIABLE"]);
        assert_eq!(config.project_variables[0].value, "42");
        assert_eq!(names(&config.environment_variables), vec!["VARTEST"]);
        assert_eq!(config.environment_variables[0].value, "420");
        assert_eq!(config.metastore.category("pipeline-run-configuration").len(), 2);
    }

    #[test]
    fn test_load_without_environment() {
        let layout = hop_layout();
        let settings = ProjectSettings::new(layout.config_path(), PROJECT);

        let config = ProjectConfig::load(&settings).unwrap();
        assert!(config.environment_variables.is_empty());
    }

    #[test]
    fn test_explicit_project_path_wins() {
        let layout = hop_layout();
        layout.write(
            "elsewhere/project-config.json",
            r#"{ "config": { "variables": [ { "name": "OTHER", "value": "1" } ] } }"#,
        );
        let settings = ProjectSettings::new(layout.config_path(), PROJECT)
            .with_project_path(layout.dir.path().join("elsewhere"));

        let config = ProjectConfig::load(&settings).unwrap();
        assert_eq!(names(&config.project_variables), vec!["OTHER"]);
        assert!(config.metastore.is_empty());
    }

    #[test]
    fn test_environment_files_resolved_against_project_home() {
        let layout = hop_layout();
        layout.write(
            "config/hop-config.json",
            r#"{
  "variables": [],
  "projectsConfig": {
    "projectConfigurations": [ { "projectName": "default", "projectHome": "projects/default" } ],
    "lifecycleEnvironments": [
      { "name": "Dev", "configurationFiles": ["${PROJECT_HOME}/env/a.json", "${PROJECT_HOME}/env/b.json"] }
    ]
  }
}"#,
        );
        layout.write(
            "config/projects/default/env/a.json",
            r#"{ "variables": [ { "name": "A", "value": "1" } ] }"#,
        );
        layout.write(
            "config/projects/default/env/b.json",
            r#"{ "variables": [ { "name": "B", "value": "2" } ] }"#,
        );
        let settings =
            ProjectSettings::new(layout.config_path(), PROJECT).with_environment(ENVIRONMENT, None);

        let config = ProjectConfig::load(&settings).unwrap();
        assert_eq!(names(&config.environment_variables), vec!["A", "B"]);
    }

    #[test]
    fn test_unknown_project_is_config_error() {
        let layout = hop_layout();
        let settings = ProjectSettings::new(layout.config_path(), "missing-project");

        let err = ProjectConfig::load(&settings).unwrap_err();
        assert!(matches!(err, ProjectError::Config(_)));
        assert!(err.to_string().contains("missing-project"));
    }

    #[test]
    fn test_unknown_environment_is_config_error() {
        let layout = hop_layout();
        let settings = ProjectSettings::new(layout.config_path(), PROJECT)
            .with_environment("Prod", Some(layout.environment_path()));

        let err = ProjectConfig::load(&settings).unwrap_err();
        assert!(matches!(err, ProjectError::Config(_)));
        assert!(err.to_string().contains("Prod"));
    }

    #[test]
    fn test_missing_hop_config_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ProjectSettings::new(dir.path(), PROJECT);

        let err = ProjectConfig::load(&settings).unwrap_err();
        assert!(matches!(err, ProjectError::Io { .. }));
        assert!(err.to_string().contains("hop-config.json"));
    }
}
