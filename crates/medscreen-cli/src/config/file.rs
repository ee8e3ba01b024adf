use crate::error::{CliError, Result};
use medscreen::core::chem::complexity::ComplexityMethod;
use medscreen::core::chem::constraints::PropertyConstraints;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileInputConfig {
    pub smiles_column: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileAlertsConfig {
    #[serde(default)]
    pub common: bool,
    #[serde(default)]
    pub nibr: bool,
    #[serde(default)]
    pub lilly: bool,
    #[serde(default)]
    pub pains: bool,
    /// Alternative alert catalog in the embedded catalog's TOML layout.
    pub catalog: Option<PathBuf>,
    pub search_step_budget: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileComplexityConfig {
    pub method: Option<ComplexityMethod>,
    pub max: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConcurrencyConfig {
    pub jobs: Option<i64>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileOutputConfig {
    pub summary: Option<bool>,
    pub filter: Option<bool>,
}

/// The optional `--config` TOML file. Every key may be omitted.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub input: Option<FileInputConfig>,
    pub rules: Option<Vec<String>>,
    pub alerts: Option<FileAlertsConfig>,
    pub complexity: Option<FileComplexityConfig>,
    pub constraints: Option<PropertyConstraints>,
    pub groups: Option<Vec<String>>,
    pub concurrency: Option<FileConcurrencyConfig>,
    pub output: Option<FileOutputConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn full_file_is_parsed() {
        let config = FileConfig::from_toml_str(
            r#"
            rules = ["rule_of_five", "rule_of_veber"]
            groups = ["alcohol"]

            [input]
            smiles-column = "SMILES"

            [alerts]
            pains = true
            lilly = true
            search-step-budget = 5000

            [complexity]
            method = "whitlock"
            max = 20.0

            [constraints]
            mw-range = [200.0, 500.0]
            hbd-max = 5

            [concurrency]
            jobs = 4

            [output]
            summary = false
            filter = true
            "#,
        )
        .unwrap();

        assert_eq!(config.rules.as_ref().map(Vec::len), Some(2));
        let alerts = config.alerts.unwrap();
        assert!(alerts.pains && alerts.lilly && !alerts.common);
        assert_eq!(alerts.search_step_budget, Some(5000));
        assert_eq!(
            config.complexity.unwrap().method,
            Some(ComplexityMethod::Whitlock)
        );
        let constraints = config.constraints.unwrap();
        assert_eq!(constraints.mw_range, Some((200.0, 500.0)));
        assert_eq!(constraints.hbd_max, Some(5));
        assert_eq!(config.concurrency.unwrap().jobs, Some(4));
        assert_eq!(config.output.unwrap().filter, Some(true));
    }

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(FileConfig::from_toml_str("").unwrap(), FileConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(FileConfig::from_toml_str("[output]\nsumary = true\n").is_err());
        assert!(FileConfig::from_toml_str("verbose = true\n").is_err());
    }

    #[test]
    fn parse_failures_name_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "rules = 3").unwrap();
        match FileConfig::from_file(&path) {
            Err(CliError::FileParsing { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
