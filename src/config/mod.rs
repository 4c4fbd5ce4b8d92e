mod schema;

pub use schema::{Config, ForecastConfig, SegmentationConfig, TargetsConfig, DEFAULT_SEED};

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::scoring::validate_scoring_config;

/// Get the config directory path (~/.config/leadscope/)
pub fn get_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("leadscope")
}

/// Get the default config file path (~/.config/leadscope/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Load configuration from a YAML file.
///
/// An explicit path must exist; the default path is optional and falls back
/// to built-in defaults when absent. The scoring section is validated so a
/// broken config fails here rather than mid-scoring.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let (config_path, explicit) = match path {
        Some(path) => (path, true),
        None => (get_config_path(), false),
    };

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content).with_context(|| {
        format!(
            "Failed to parse config: invalid YAML in {}",
            config_path.display()
        )
    })?;

    if let Some(ref scoring) = config.scoring {
        validate_scoring_config(scoring)
            .with_context(|| format!("in {}", config_path.display()))?;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let err = load_config(Some(PathBuf::from("/nonexistent/config.yaml"))).unwrap_err();
        assert!(format!("{err}").contains("not found"));
    }

    #[test]
    fn test_full_config_parses() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "dataset: data/leads.csv\n\
             seed: 7\n\
             segmentation:\n  clusters: 4\n\
             forecast:\n  horizon: 6\n\
             targets:\n  conversion_rate: 30.0\n  win_rate: 55.0\n\
             scoring:\n  base_score: 40.0"
        )
        .unwrap();
        let config = load_config(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.seed(), 7);
        assert_eq!(config.clusters(), 4);
        assert_eq!(config.horizon(), 6);
        assert_eq!(config.targets().conversion_rate, 30.0);
        assert_eq!(config.targets().churn_rate, 10.0);
        assert_eq!(config.scoring().base_score, Some(40.0));
    }

    #[test]
    fn test_invalid_scoring_section_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "scoring:\n  base_score: 500.0").unwrap();
        let err = load_config(Some(file.path().to_path_buf())).unwrap_err();
        assert!(format!("{err:#}").contains("base_score"));
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "datset: typo.csv").unwrap();
        assert!(load_config(Some(file.path().to_path_buf())).is_err());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.seed(), DEFAULT_SEED);
        assert_eq!(config.clusters(), 3);
        assert_eq!(config.horizon(), 3);
        assert_eq!(config.targets().win_rate, 60.0);
    }
}
