//! Per-rep and team-level performance over closed deals.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::dataset::Deal;

/// Deal-count spread below this fraction of the mean counts as balanced.
const BALANCE_RATIO: f64 = 0.2;

const UNASSIGNED: &str = "Unassigned";

#[derive(Debug, Clone, Serialize)]
pub struct RepPerformance {
    pub rep: String,
    pub deals_won: usize,
    pub deals_lost: usize,
    pub revenue: f64,
    pub avg_deal_size: f64,
    /// Won deals over all closed deals for this rep, in percent.
    pub win_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamSummary {
    pub reps: Vec<RepPerformance>,
    pub total_revenue: f64,
    pub total_deals: usize,
    pub team_win_rate: f64,
    pub top_performer: Option<String>,
    pub balanced_workload: bool,
}

/// Aggregate closed deals by rep. Deals with no rep attached land in an
/// "Unassigned" bucket rather than disappearing from the totals. Reps are
/// ordered by revenue, highest first.
pub fn team_summary(deals: &[Deal]) -> TeamSummary {
    let mut buckets: BTreeMap<String, (usize, usize, f64)> = BTreeMap::new();
    for deal in deals {
        let rep = deal
            .sales_rep
            .clone()
            .unwrap_or_else(|| UNASSIGNED.to_string());
        let entry = buckets.entry(rep).or_insert((0, 0, 0.0));
        if deal.won {
            entry.0 += 1;
            entry.2 += deal.value;
        } else {
            entry.1 += 1;
        }
    }

    let mut reps: Vec<RepPerformance> = buckets
        .into_iter()
        .map(|(rep, (won, lost, revenue))| RepPerformance {
            rep,
            deals_won: won,
            deals_lost: lost,
            revenue,
            avg_deal_size: if won == 0 { 0.0 } else { revenue / won as f64 },
            win_rate: if won + lost == 0 {
                0.0
            } else {
                won as f64 / (won + lost) as f64 * 100.0
            },
        })
        .collect();
    reps.sort_by(|a, b| {
        b.revenue
            .partial_cmp(&a.revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let total_revenue = reps.iter().map(|r| r.revenue).sum();
    let won: usize = reps.iter().map(|r| r.deals_won).sum();
    let total_deals = reps.iter().map(|r| r.deals_won + r.deals_lost).sum();
    let team_win_rate = if total_deals == 0 {
        0.0
    } else {
        won as f64 / total_deals as f64 * 100.0
    };
    let top_performer = reps.first().filter(|r| r.revenue > 0.0).map(|r| r.rep.clone());
    let balanced_workload = workload_balanced(&reps);

    TeamSummary {
        reps,
        total_revenue,
        total_deals,
        team_win_rate,
        top_performer,
        balanced_workload,
    }
}

/// Balanced when the standard deviation of per-rep closed-deal counts stays
/// under 20% of the mean. A single rep is trivially balanced.
fn workload_balanced(reps: &[RepPerformance]) -> bool {
    if reps.len() < 2 {
        return true;
    }
    let counts: Vec<f64> = reps
        .iter()
        .map(|r| (r.deals_won + r.deals_lost) as f64)
        .collect();
    let mean = counts.iter().sum::<f64>() / counts.len() as f64;
    if mean == 0.0 {
        return true;
    }
    let variance =
        counts.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / counts.len() as f64;
    variance.sqrt() < BALANCE_RATIO * mean
}
