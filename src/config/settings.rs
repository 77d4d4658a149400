use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::validation::ReportShape;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SalvageConfig {
    #[serde(default)]
    pub recovery: RecoveryTuning,
    /// Expected report shape checked after recovery
    #[serde(default)]
    pub validation: ReportShape,
}

/// Heuristic thresholds for the truncation stages.
///
/// These are tuning parameters, not correctness guarantees.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecoveryTuning {
    /// Smart truncation only accepts a structural boundary at or past this fraction of the text
    pub smart_boundary_min_fraction: f64,
    /// Trailing fraction of the text searched for a fallback comma
    pub comma_window_fraction: f64,
    /// Aggressive truncation stops at this fraction of the original length
    pub aggressive_floor_fraction: f64,
    /// Maximum `{`/`}` imbalance for an aggressive cut candidate
    pub aggressive_brace_tolerance: usize,
    /// Characters of head/tail quoted in the failure diagnostic
    pub excerpt_chars: usize,
}

impl Default for RecoveryTuning {
    fn default() -> Self {
        Self {
            smart_boundary_min_fraction: 0.5,
            comma_window_fraction: 0.2,
            aggressive_floor_fraction: 0.3,
            aggressive_brace_tolerance: 3,
            excerpt_chars: 100,
        }
    }
}

impl SalvageConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: SalvageConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults if file doesn't exist
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) if p.exists() => Self::from_file(p),
            _ => Ok(Self::default()),
        }
    }

    /// Per-user config location: `<config_dir>/report-salvage/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("report-salvage").join("config.yaml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{FieldKind, ShapeCheck};
    use std::io::Write;

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        let config = SalvageConfig::load_or_default(Some(&path)).unwrap();
        assert_eq!(config, SalvageConfig::default());
        assert_eq!(SalvageConfig::load_or_default(None).unwrap(), SalvageConfig::default());
    }

    #[test]
    fn test_partial_tuning_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "recovery:\n  aggressive_brace_tolerance: 5").unwrap();

        let config = SalvageConfig::from_file(file.path()).unwrap();
        assert_eq!(config.recovery.aggressive_brace_tolerance, 5);
        assert_eq!(config.recovery.aggressive_floor_fraction, 0.3);
        assert_eq!(config.validation, ReportShape::default());
    }

    #[test]
    fn test_custom_shape_from_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"validation:
  checks:
    - check: required
      field: points
      kind: array
    - check: min_items
      field: points
      min: 3
    - check: any_of
      fields: [traderVibe, lifeVibe]
"#
        )
        .unwrap();

        let config = SalvageConfig::from_file(file.path()).unwrap();
        assert_eq!(
            config.validation.checks,
            vec![
                ShapeCheck::Required {
                    field: "points".to_string(),
                    kind: FieldKind::Array,
                },
                ShapeCheck::MinItems {
                    field: "points".to_string(),
                    min: 3,
                },
                ShapeCheck::AnyOf {
                    fields: vec!["traderVibe".to_string(), "lifeVibe".to_string()],
                },
            ]
        );
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "recovery: [not, a, map]").unwrap();
        assert!(SalvageConfig::from_file(file.path()).is_err());
    }
}
