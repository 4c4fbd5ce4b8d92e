use linfa::prelude::*;
use linfa::Dataset;
use linfa_logistic::{FittedLogisticRegression, LogisticRegression};
use ndarray::Axis;
use serde::Serialize;

use super::config::ScoringConfig;
use super::engine::{rule_based_score, ScoreBreakdown};
use super::tier::Tier;
use crate::dataset::{Lead, Stage};
use crate::features::{feature_matrix, lead_features, LeadEncoders, StandardScaler};

const MAX_ITERATIONS: u64 = 150;

/// Which path produced a score: the fitted conversion model or the
/// deterministic rule engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreOrigin {
    Model,
    Rules,
}

impl ScoreOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreOrigin::Model => "model",
            ScoreOrigin::Rules => "rules",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredLead {
    pub lead_id: u64,
    pub name: String,
    pub stage: Stage,
    pub score: f64,
    pub tier: Tier,
    pub origin: ScoreOrigin,
    /// Present only for rule-based scores; the model path has no
    /// per-factor decomposition.
    pub breakdown: Option<ScoreBreakdown>,
}

struct FittedModel {
    model: FittedLogisticRegression<f64, usize>,
    scaler: StandardScaler,
}

/// Lead scorer with a trained-model fast path and a rule-based fallback.
///
/// Fitting trains a logistic regression on conversion outcomes when the
/// dataset is large enough and contains both converted and non-converted
/// leads. Otherwise every score comes from the rule engine. Fitting never
/// fails: any training problem downgrades to the rules path.
pub struct LeadScorer {
    fitted: Option<FittedModel>,
    encoders: LeadEncoders,
    config: ScoringConfig,
}

impl LeadScorer {
    pub fn fit(leads: &[Lead], config: &ScoringConfig, verbose: bool) -> LeadScorer {
        let encoders = LeadEncoders::fit(leads);
        let fitted = Self::train(leads, config, &encoders, verbose);
        LeadScorer {
            fitted,
            encoders,
            config: config.clone(),
        }
    }

    fn train(
        leads: &[Lead],
        config: &ScoringConfig,
        encoders: &LeadEncoders,
        verbose: bool,
    ) -> Option<FittedModel> {
        if leads.len() < config.min_training_rows() {
            if verbose {
                eprintln!(
                    "scoring: {} leads is below the {}-row training floor, using rules",
                    leads.len(),
                    config.min_training_rows()
                );
            }
            return None;
        }
        let positives = leads.iter().filter(|l| l.converted).count();
        if positives == 0 || positives == leads.len() {
            if verbose {
                eprintln!("scoring: conversion outcomes are single-class, using rules");
            }
            return None;
        }

        let rows: Vec<_> = leads
            .iter()
            .map(|lead| lead_features(lead, encoders))
            .collect();
        let matrix = feature_matrix(&rows);
        let scaler = StandardScaler::fit(&matrix);
        let records = scaler.transform(&matrix);
        let targets: ndarray::Array1<usize> = leads
            .iter()
            .map(|lead| usize::from(lead.converted))
            .collect();
        let dataset = Dataset::new(records, targets);

        match LogisticRegression::default()
            .max_iterations(MAX_ITERATIONS)
            .fit(&dataset)
        {
            Ok(model) => Some(FittedModel { model, scaler }),
            Err(err) => {
                if verbose {
                    eprintln!("scoring: model training failed ({err}), using rules");
                }
                None
            }
        }
    }

    pub fn origin(&self) -> ScoreOrigin {
        if self.fitted.is_some() {
            ScoreOrigin::Model
        } else {
            ScoreOrigin::Rules
        }
    }

    pub fn score(&self, lead: &Lead) -> ScoredLead {
        let (score, origin, breakdown) = match self.fitted {
            Some(ref fitted) => {
                let row = fitted
                    .scaler
                    .transform_row(&lead_features(lead, &self.encoders));
                let records = row.insert_axis(Axis(0));
                let probability = fitted.model.predict_probabilities(&records)[0];
                ((probability * 100.0).clamp(0.0, 100.0), ScoreOrigin::Model, None)
            }
            None => {
                let (score, breakdown) = rule_based_score(lead, &self.config);
                (score, ScoreOrigin::Rules, Some(breakdown))
            }
        };
        // Converted leads max out on both paths
        let score = if lead.stage == Stage::Converted {
            100.0
        } else {
            score
        };
        ScoredLead {
            lead_id: lead.lead_id,
            name: lead.name.clone(),
            stage: lead.stage,
            score,
            tier: Tier::from_score(score),
            origin,
            breakdown,
        }
    }

    pub fn score_all(&self, leads: &[Lead]) -> Vec<ScoredLead> {
        leads.iter().map(|lead| self.score(lead)).collect()
    }
}
