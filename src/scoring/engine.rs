use serde::Serialize;

use super::config::ScoringConfig;
use super::factors::{Effect, RangeOp};
use crate::dataset::{Lead, Stage};

#[derive(Debug, Clone, Serialize)]
pub struct FactorContribution {
    pub label: String,       // e.g. "Revenue", "Stage", "Source"
    pub description: String, // e.g. "matched '>60000' -> +25"
    pub before: f64,         // Score before this factor
    pub after: f64,          // Score after this factor
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreBreakdown {
    pub base_score: f64,
    pub factors: Vec<FactorContribution>,
}

/// Deterministic rule-based lead score. This is the fallback path used
/// whenever no supervised model is available, and the only path whose exact
/// arithmetic is part of the contract: base 50, revenue-band bonus, stage
/// bonus, source bonus, industry bonus, clamped to [0,100]. A lead in stage
/// `Converted` always scores exactly 100.
pub fn rule_based_score(lead: &Lead, config: &ScoringConfig) -> (f64, ScoreBreakdown) {
    let base_score = config.base_score.unwrap_or(50.0);
    let mut score = base_score;
    let mut factors = Vec::new();

    // Revenue-potential bands, first match wins
    if let Some(ref bands) = config.revenue_bands {
        let revenue = lead.revenue_potential();
        for band in bands {
            let (Ok(range), Ok(effect)) = (RangeOp::parse(&band.range), Effect::parse(&band.effect))
            else {
                continue;
            };
            if range.matches(revenue) {
                let before = score;
                score = effect.apply(score);
                factors.push(FactorContribution {
                    label: "Revenue".to_string(),
                    description: format!("{} matched '{}' -> {}", revenue, band.range, band.effect),
                    before,
                    after: score,
                });
                break;
            }
        }
    }

    // Pipeline stage bonus
    if let Some(ref stages) = config.stages {
        for stage_effect in stages {
            if stage_effect.stage.eq_ignore_ascii_case(lead.stage.as_str()) {
                if let Ok(effect) = Effect::parse(&stage_effect.effect) {
                    let before = score;
                    score = effect.apply(score);
                    factors.push(FactorContribution {
                        label: "Stage".to_string(),
                        description: format!("{} -> {}", lead.stage, stage_effect.effect),
                        before,
                        after: score,
                    });
                }
                break;
            }
        }
    }

    // Acquisition source bonus
    if let Some(ref sources) = config.sources {
        for source_effect in sources {
            if source_effect.name.eq_ignore_ascii_case(&lead.source) {
                if let Ok(effect) = Effect::parse(&source_effect.effect) {
                    let before = score;
                    score = effect.apply(score);
                    factors.push(FactorContribution {
                        label: "Source".to_string(),
                        description: format!(
                            "matched '{}' -> {}",
                            source_effect.name, source_effect.effect
                        ),
                        before,
                        after: score,
                    });
                }
                break;
            }
        }
    }

    // High-value industry bonus
    if let Some(ref industries) = config.industries {
        let matched = industries
            .names
            .iter()
            .any(|name| name.eq_ignore_ascii_case(&lead.industry));
        if matched {
            if let Ok(effect) = Effect::parse(&industries.effect) {
                let before = score;
                score = effect.apply(score);
                factors.push(FactorContribution {
                    label: "Industry".to_string(),
                    description: format!("'{}' -> {}", lead.industry, industries.effect),
                    before,
                    after: score,
                });
            }
        }
    }

    // Converted is terminal: max score regardless of everything above
    if lead.stage == Stage::Converted {
        let before = score;
        score = 100.0;
        factors.push(FactorContribution {
            label: "Converted".to_string(),
            description: "terminal stage -> score forced to 100".to_string(),
            before,
            after: score,
        });
    }

    (
        score.clamp(0.0, 100.0),
        ScoreBreakdown {
            base_score,
            factors,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_lead(revenue: f64, stage: Stage, source: &str, industry: &str) -> Lead {
        Lead {
            lead_id: 1,
            name: "Test Lead".to_string(),
            email: "lead@example.com".to_string(),
            phone: String::new(),
            industry: industry.to_string(),
            source: source.to_string(),
            region: "West".to_string(),
            stage,
            revenue_potential: Some(revenue),
            days_to_convert: None,
            converted: stage == Stage::Converted,
            tenure_months: None,
            avg_monthly_spend: None,
            satisfaction_score: None,
            num_support_tickets: None,
            churned: None,
            deal_amount: None,
            close_date: None,
            sales_rep: None,
        }
    }

    #[test]
    fn test_base_score_only() {
        let lead = sample_lead(10000.0, Stage::New, "Website", "Retail");
        let (score, breakdown) = rule_based_score(&lead, &ScoringConfig::default());
        assert_eq!(score, 50.0);
        assert!(breakdown.factors.is_empty());
    }

    #[test]
    fn test_converted_always_scores_100() {
        let lead = sample_lead(0.0, Stage::Converted, "Website", "Retail");
        let (score, _) = rule_based_score(&lead, &ScoringConfig::default());
        assert_eq!(score, 100.0);
    }

    #[test]
    fn test_high_value_lead_clamps_at_100() {
        // 50 + 25 (revenue > 60000) + 20 (Qualified) + 10 (Referral) + 5 (IT)
        // = 110, clamped to 100
        let lead = sample_lead(70000.0, Stage::Qualified, "Referral", "IT");
        let (score, breakdown) = rule_based_score(&lead, &ScoringConfig::default());
        assert_eq!(score, 100.0);
        assert_eq!(breakdown.factors.len(), 4);
        assert_eq!(breakdown.factors.last().unwrap().after, 110.0);
    }

    #[test]
    fn test_revenue_band_first_match_wins() {
        // 70000 matches ">60000" (+25), not the later ">45000" band
        let lead = sample_lead(70000.0, Stage::New, "Website", "Retail");
        let (score, breakdown) = rule_based_score(&lead, &ScoringConfig::default());
        assert_eq!(score, 75.0);
        assert_eq!(breakdown.factors.len(), 1);
        assert!(breakdown.factors[0].description.contains(">60000"));
    }

    #[test]
    fn test_middle_revenue_band() {
        let lead = sample_lead(50000.0, Stage::New, "Website", "Retail");
        let (score, _) = rule_based_score(&lead, &ScoringConfig::default());
        assert_eq!(score, 65.0); // 50 + 15
    }

    #[test]
    fn test_contacted_stage_bonus() {
        let lead = sample_lead(10000.0, Stage::Contacted, "Website", "Retail");
        let (score, _) = rule_based_score(&lead, &ScoringConfig::default());
        assert_eq!(score, 60.0); // 50 + 10
    }

    #[test]
    fn test_source_match_is_case_insensitive() {
        let lead = sample_lead(10000.0, Stage::New, "referral", "Retail");
        let (score, _) = rule_based_score(&lead, &ScoringConfig::default());
        assert_eq!(score, 60.0); // 50 + 10
    }

    #[test]
    fn test_industry_bonus() {
        let lead = sample_lead(10000.0, Stage::New, "Website", "Finance");
        let (score, _) = rule_based_score(&lead, &ScoringConfig::default());
        assert_eq!(score, 55.0); // 50 + 5
    }

    #[test]
    fn test_score_floors_at_zero() {
        let config = ScoringConfig {
            base_score: Some(10.0),
            revenue_bands: Some(vec![super::super::config::RevenueBand {
                range: "<30000".to_string(),
                effect: "+-50".to_string(),
            }]),
            stages: None,
            sources: None,
            industries: None,
            min_training_rows: None,
        };
        let lead = sample_lead(10000.0, Stage::New, "Website", "Retail");
        let (score, _) = rule_based_score(&lead, &config);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_multiplicative_effect() {
        let config = ScoringConfig {
            base_score: Some(50.0),
            revenue_bands: Some(vec![super::super::config::RevenueBand {
                range: ">=0".to_string(),
                effect: "x1.5".to_string(),
            }]),
            stages: None,
            sources: None,
            industries: None,
            min_training_rows: None,
        };
        let lead = sample_lead(10000.0, Stage::New, "Website", "Retail");
        let (score, _) = rule_based_score(&lead, &config);
        assert_eq!(score, 75.0);
    }
}
