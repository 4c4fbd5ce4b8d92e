use serde::{Deserialize, Serialize};

/// Lead scoring configuration.
///
/// Defines how rule-based lead scores are built up from a base score. Each
/// factor is optional and uses `+N` or `xN` effect strings; revenue bands
/// use range expressions with first-match-wins semantics.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   base_score: 50
///   revenue_bands:
///     - { range: ">60000", effect: "+25" }
///     - { range: ">45000", effect: "+15" }
///   stages:
///     - { stage: "Qualified", effect: "+20" }
///   sources:
///     - { name: "Referral", effect: "+10" }
///   industries:
///     names: ["IT", "Finance", "Healthcare"]
///     effect: "+5"
/// ```
///
/// A lead in stage `Converted` always scores exactly 100; that rule is part
/// of the engine, not the config.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Base score before factors are applied (default: 50.0)
    #[serde(default)]
    pub base_score: Option<f64>,

    /// Revenue-potential bands, checked in order; first match wins.
    #[serde(default)]
    pub revenue_bands: Option<Vec<RevenueBand>>,

    /// Per-stage effects (stage names outside the pipeline enum are ignored).
    #[serde(default)]
    pub stages: Option<Vec<StageEffect>>,

    /// Per-acquisition-source effects, matched case-insensitively.
    #[serde(default)]
    pub sources: Option<Vec<SourceEffect>>,

    /// High-value industry list with a single shared effect.
    #[serde(default)]
    pub industries: Option<IndustryConfig>,

    /// Minimum labeled rows before the supervised model is trained
    /// (default: 10). Below this the rule engine is the only path.
    #[serde(default)]
    pub min_training_rows: Option<usize>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_score: Some(50.0),
            revenue_bands: Some(vec![
                RevenueBand {
                    range: ">60000".to_string(),
                    effect: "+25".to_string(),
                },
                RevenueBand {
                    range: ">45000".to_string(),
                    effect: "+15".to_string(),
                },
                RevenueBand {
                    range: ">30000".to_string(),
                    effect: "+10".to_string(),
                },
            ]),
            stages: Some(vec![
                StageEffect {
                    stage: "Qualified".to_string(),
                    effect: "+20".to_string(),
                },
                StageEffect {
                    stage: "Contacted".to_string(),
                    effect: "+10".to_string(),
                },
            ]),
            sources: Some(vec![
                SourceEffect {
                    name: "Referral".to_string(),
                    effect: "+10".to_string(),
                },
                SourceEffect {
                    name: "LinkedIn".to_string(),
                    effect: "+5".to_string(),
                },
            ]),
            industries: Some(IndustryConfig {
                names: vec![
                    "IT".to_string(),
                    "Finance".to_string(),
                    "Healthcare".to_string(),
                ],
                effect: "+5".to_string(),
            }),
            min_training_rows: Some(10),
        }
    }
}

impl ScoringConfig {
    pub fn min_training_rows(&self) -> usize {
        self.min_training_rows.unwrap_or(10)
    }
}

/// Revenue band mapping a range expression to a score effect.
/// Range format: "<N", "<=N", ">N", ">=N", "N-M" (inclusive range)
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RevenueBand {
    /// Range expression (e.g., ">60000", "30000-45000")
    pub range: String,

    /// Effect on score (e.g., "+25", "x1.2")
    pub effect: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StageEffect {
    pub stage: String,
    pub effect: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SourceEffect {
    pub name: String,
    pub effect: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct IndustryConfig {
    pub names: Vec<String>,
    pub effect: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scoring_config() {
        let config = ScoringConfig::default();

        assert_eq!(config.base_score, Some(50.0));
        assert_eq!(config.revenue_bands.as_ref().unwrap().len(), 3);
        assert_eq!(config.stages.as_ref().unwrap().len(), 2);
        assert_eq!(config.min_training_rows(), 10);
    }

    #[test]
    fn test_partial_scoring_config_parse() {
        let yaml = r#"
base_score: 40
sources:
  - name: "Referral"
    effect: "+20"
"#;
        let config: ScoringConfig = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.base_score, Some(40.0));
        assert_eq!(config.sources.unwrap().len(), 1);
        assert!(config.revenue_bands.is_none());
        assert!(config.industries.is_none());
    }

    #[test]
    fn test_full_scoring_config_parse() {
        let yaml = r#"
base_score: 50
revenue_bands:
  - range: ">60000"
    effect: "+25"
  - range: "30000-60000"
    effect: "+10"
stages:
  - stage: "Qualified"
    effect: "+20"
sources:
  - name: "Referral"
    effect: "+10"
industries:
  names: ["IT", "Finance"]
  effect: "+5"
min_training_rows: 5
"#;
        let config: ScoringConfig = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.revenue_bands.as_ref().unwrap().len(), 2);
        assert_eq!(config.industries.as_ref().unwrap().names.len(), 2);
        assert_eq!(config.min_training_rows(), 5);
    }

    #[test]
    fn test_empty_scoring_config_parse() {
        let yaml = "{}";
        let config: ScoringConfig = serde_saphyr::from_str(yaml).unwrap();
        assert!(config.base_score.is_none());
        assert!(config.stages.is_none());
    }
}
