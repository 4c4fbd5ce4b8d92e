use anyhow::{bail, Result};

use super::config::ScoringConfig;
use super::factors::{Effect, RangeOp};

/// Validate a scoring config, collecting every problem instead of stopping
/// at the first one so a user can fix their config file in one pass.
pub fn validate_scoring_config(config: &ScoringConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    if let Some(base) = config.base_score {
        if !(0.0..=100.0).contains(&base) {
            errors.push(format!("base_score {base} is outside 0-100"));
        }
    }

    if let Some(ref bands) = config.revenue_bands {
        for (i, band) in bands.iter().enumerate() {
            if let Err(err) = RangeOp::parse(&band.range) {
                errors.push(format!("revenue_bands[{i}].range '{}': {err}", band.range));
            }
            if let Err(err) = Effect::parse(&band.effect) {
                errors.push(format!("revenue_bands[{i}].effect '{}': {err}", band.effect));
            }
        }
    }

    if let Some(ref stages) = config.stages {
        for (i, stage) in stages.iter().enumerate() {
            let known = ["New", "Contacted", "Qualified", "Converted", "Lost"]
                .iter()
                .any(|s| s.eq_ignore_ascii_case(&stage.stage));
            if !known {
                errors.push(format!(
                    "stages[{i}].stage '{}' is not a pipeline stage",
                    stage.stage
                ));
            }
            if let Err(err) = Effect::parse(&stage.effect) {
                errors.push(format!("stages[{i}].effect '{}': {err}", stage.effect));
            }
        }
    }

    if let Some(ref sources) = config.sources {
        for (i, source) in sources.iter().enumerate() {
            if source.name.trim().is_empty() {
                errors.push(format!("sources[{i}].name is empty"));
            }
            if let Err(err) = Effect::parse(&source.effect) {
                errors.push(format!("sources[{i}].effect '{}': {err}", source.effect));
            }
        }
    }

    if let Some(ref industries) = config.industries {
        if industries.names.is_empty() {
            errors.push("industries.names is empty".to_string());
        }
        if let Err(err) = Effect::parse(&industries.effect) {
            errors.push(format!("industries.effect '{}': {err}", industries.effect));
        }
    }

    if let Some(rows) = config.min_training_rows {
        if rows < 2 {
            errors.push(format!(
                "min_training_rows {rows} is too small to fit anything"
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        bail!("invalid scoring config:\n  - {}", errors.join("\n  - "));
    }
}
