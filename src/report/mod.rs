//! Full-pipeline KPI report: funnel counts, conversion and win rates, tier
//! and segment distributions, churn, forecast and team rollups, plus
//! pass/fail verdicts against configured targets.

use anyhow::Result;
use serde::Serialize;

use crate::churn::{self, ChurnSummary};
use crate::dataset::{Customer, Deal, Lead, Stage};
use crate::forecast::{forecast_revenue, Forecast};
use crate::scoring::{LeadScorer, ScoringConfig, Tier};
use crate::segment::{segment_customers, SegmentProfile};
use crate::team::{team_summary, TeamSummary};

/// KPI thresholds the report grades against. Conversion and win rates must
/// reach their targets; churn must stay under its ceiling.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct KpiTargets {
    pub conversion_rate: f64,
    pub churn_rate: f64,
    pub win_rate: f64,
}

impl Default for KpiTargets {
    fn default() -> KpiTargets {
        KpiTargets {
            conversion_rate: 25.0,
            churn_rate: 10.0,
            win_rate: 60.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetVerdict {
    pub kpi: String,
    pub actual: f64,
    pub target: f64,
    pub met: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct StageCount {
    pub stage: Stage,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TierCount {
    pub tier: Tier,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub leads: usize,
    /// Leads not in the `Lost` stage.
    pub active_leads: usize,
    pub customers: usize,
    pub funnel: Vec<StageCount>,
    /// Converted leads over all leads, in percent.
    pub conversion_rate: f64,
    /// Won deals over all closed deals, in percent.
    pub win_rate: f64,
    pub tiers: Vec<TierCount>,
    pub segments: Vec<SegmentProfile>,
    pub churn: ChurnSummary,
    pub forecast: Forecast,
    pub team: TeamSummary,
    pub verdicts: Vec<TargetVerdict>,
}

pub struct ReportOptions {
    pub scoring: ScoringConfig,
    pub targets: KpiTargets,
    pub clusters: usize,
    pub seed: u64,
    pub horizon: usize,
    pub verbose: bool,
}

pub fn build_report(leads: &[Lead], options: &ReportOptions) -> Result<Report> {
    let customers = Customer::customers(leads);
    let deals = Deal::deals(leads);

    let funnel = Stage::ALL
        .into_iter()
        .map(|stage| StageCount {
            stage,
            count: leads.iter().filter(|l| l.stage == stage).count(),
        })
        .collect();
    let active_leads = leads.iter().filter(|l| l.stage.is_active()).count();

    let converted = leads.iter().filter(|l| l.converted).count();
    let conversion_rate = if leads.is_empty() {
        0.0
    } else {
        converted as f64 / leads.len() as f64 * 100.0
    };

    let scorer = LeadScorer::fit(leads, &options.scoring, options.verbose);
    let scored = scorer.score_all(leads);
    let tiers = [Tier::Hot, Tier::Warm, Tier::Cold]
        .into_iter()
        .map(|tier| TierCount {
            tier,
            count: scored.iter().filter(|s| s.tier == tier).count(),
        })
        .collect();

    let segmentation = segment_customers(&customers, options.clusters, options.seed)?;

    let estimator = churn::ChurnEstimator::fit(&customers, options.verbose);
    let churn = churn::summarize(&estimator.assess_all(&customers));

    let forecast = forecast_revenue(&deals, options.horizon);
    let team = team_summary(&deals);

    let verdicts = vec![
        TargetVerdict {
            kpi: "Conversion rate".to_string(),
            actual: conversion_rate,
            target: options.targets.conversion_rate,
            met: conversion_rate >= options.targets.conversion_rate,
        },
        TargetVerdict {
            kpi: "Churn rate".to_string(),
            actual: churn.churn_rate,
            target: options.targets.churn_rate,
            met: churn.churn_rate <= options.targets.churn_rate,
        },
        TargetVerdict {
            kpi: "Win rate".to_string(),
            actual: team.team_win_rate,
            target: options.targets.win_rate,
            met: team.team_win_rate >= options.targets.win_rate,
        },
    ];

    Ok(Report {
        leads: leads.len(),
        active_leads,
        customers: customers.len(),
        funnel,
        conversion_rate,
        win_rate: team.team_win_rate,
        tiers,
        segments: segmentation.profiles,
        churn,
        forecast,
        team,
        verdicts,
    })
}
