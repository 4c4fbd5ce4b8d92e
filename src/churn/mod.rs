//! Churn risk estimation over the customer base. Mirrors the lead scorer's
//! shape: a logistic model on churn outcomes when there is enough labeled
//! data, and a deterministic rule fallback otherwise.

use linfa::prelude::*;
use linfa::Dataset;
use linfa_logistic::{FittedLogisticRegression, LogisticRegression};
use ndarray::{Array1, Axis};
use serde::Serialize;

use crate::dataset::Customer;
use crate::features::{customer_features, feature_matrix, StandardScaler};
use crate::scoring::ScoreOrigin;

const MAX_ITERATIONS: u64 = 150;
const MIN_TRAINING_ROWS: usize = 10;

pub const MEDIUM_THRESHOLD: f64 = 30.0;
pub const HIGH_THRESHOLD: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_risk(risk: f64) -> RiskLevel {
        if risk >= HIGH_THRESHOLD {
            RiskLevel::High
        } else if risk >= MEDIUM_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChurnAssessment {
    pub lead_id: u64,
    pub name: String,
    pub risk: f64,
    pub level: RiskLevel,
    pub churned: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChurnSummary {
    pub customers: usize,
    /// Share of customers already churned, in percent.
    pub churn_rate: f64,
    /// Customers at High risk who have not churned yet.
    pub at_risk: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

struct FittedModel {
    model: FittedLogisticRegression<f64, usize>,
    scaler: StandardScaler,
}

pub struct ChurnEstimator {
    fitted: Option<FittedModel>,
}

impl ChurnEstimator {
    pub fn fit(customers: &[Customer], verbose: bool) -> ChurnEstimator {
        ChurnEstimator {
            fitted: Self::train(customers, verbose),
        }
    }

    fn train(customers: &[Customer], verbose: bool) -> Option<FittedModel> {
        if customers.len() < MIN_TRAINING_ROWS {
            if verbose {
                eprintln!(
                    "churn: {} customers is below the {MIN_TRAINING_ROWS}-row training floor, using rules",
                    customers.len()
                );
            }
            return None;
        }
        let churned = customers.iter().filter(|c| c.churned).count();
        if churned == 0 || churned == customers.len() {
            if verbose {
                eprintln!("churn: outcomes are single-class, using rules");
            }
            return None;
        }

        let rows: Vec<_> = customers.iter().map(customer_features).collect();
        let matrix = feature_matrix(&rows);
        let scaler = StandardScaler::fit(&matrix);
        let records = scaler.transform(&matrix);
        let targets: Array1<usize> = customers.iter().map(|c| usize::from(c.churned)).collect();
        let dataset = Dataset::new(records, targets);

        match LogisticRegression::default()
            .max_iterations(MAX_ITERATIONS)
            .fit(&dataset)
        {
            Ok(model) => Some(FittedModel { model, scaler }),
            Err(err) => {
                if verbose {
                    eprintln!("churn: model training failed ({err}), using rules");
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

    pub fn assess(&self, customer: &Customer) -> ChurnAssessment {
        let risk = if customer.churned {
            100.0
        } else {
            match self.fitted {
                Some(ref fitted) => {
                    let row = fitted.scaler.transform_row(&customer_features(customer));
                    let records = row.insert_axis(Axis(0));
                    (fitted.model.predict_probabilities(&records)[0] * 100.0).clamp(0.0, 100.0)
                }
                None => rule_based_risk(customer),
            }
        };
        ChurnAssessment {
            lead_id: customer.lead_id,
            name: customer.name.clone(),
            risk,
            level: RiskLevel::from_risk(risk),
            churned: customer.churned,
        }
    }

    pub fn assess_all(&self, customers: &[Customer]) -> Vec<ChurnAssessment> {
        customers.iter().map(|c| self.assess(c)).collect()
    }
}

/// Deterministic churn risk: low satisfaction, heavy support load and short
/// tenure each add a fixed penalty. Already-churned customers are pinned
/// at 100 before this is consulted.
pub fn rule_based_risk(customer: &Customer) -> f64 {
    let mut risk: f64 = 0.0;
    if customer.satisfaction < 6.0 {
        risk += 40.0;
    } else if customer.satisfaction < 8.0 {
        risk += 20.0;
    }
    if customer.support_tickets > 3 {
        risk += 30.0;
    } else if customer.support_tickets > 1 {
        risk += 15.0;
    }
    if customer.tenure_months < 6.0 {
        risk += 20.0;
    }
    risk.clamp(0.0, 100.0)
}

/// Portfolio-level churn summary over a full assessment pass.
pub fn summarize(assessments: &[ChurnAssessment]) -> ChurnSummary {
    let customers = assessments.len();
    let churned = assessments.iter().filter(|a| a.churned).count();
    let churn_rate = if customers == 0 {
        0.0
    } else {
        churned as f64 / customers as f64 * 100.0
    };
    // At risk means savable: flagged High but not yet churned.
    let at_risk = assessments
        .iter()
        .filter(|a| a.level == RiskLevel::High && !a.churned)
        .count();
    ChurnSummary {
        customers,
        churn_rate,
        at_risk,
        low: assessments
            .iter()
            .filter(|a| a.level == RiskLevel::Low)
            .count(),
        medium: assessments
            .iter()
            .filter(|a| a.level == RiskLevel::Medium)
            .count(),
        high: assessments
            .iter()
            .filter(|a| a.level == RiskLevel::High)
            .count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(
        tenure: f64,
        satisfaction: f64,
        tickets: u32,
        churned: bool,
    ) -> Customer {
        Customer {
            lead_id: 1,
            name: "Acme".to_string(),
            industry: "IT".to_string(),
            tenure_months: tenure,
            monthly_spend: 500.0,
            satisfaction,
            support_tickets: tickets,
            churned,
            revenue_potential: 40000.0,
        }
    }

    #[test]
    fn test_happy_customer_is_low_risk() {
        let risk = rule_based_risk(&customer(24.0, 9.0, 0, false));
        assert_eq!(risk, 0.0);
        assert_eq!(RiskLevel::from_risk(risk), RiskLevel::Low);
    }

    #[test]
    fn test_worst_case_hits_90() {
        // 40 (satisfaction < 6) + 30 (tickets > 3) + 20 (tenure < 6)
        let risk = rule_based_risk(&customer(2.0, 3.0, 7, false));
        assert_eq!(risk, 90.0);
        assert_eq!(RiskLevel::from_risk(risk), RiskLevel::High);
    }

    #[test]
    fn test_middling_satisfaction_and_tickets() {
        // 20 (satisfaction < 8) + 15 (tickets > 1)
        let risk = rule_based_risk(&customer(12.0, 7.0, 2, false));
        assert_eq!(risk, 35.0);
        assert_eq!(RiskLevel::from_risk(risk), RiskLevel::Medium);
    }

    #[test]
    fn test_churned_customer_is_pinned_at_100() {
        let estimator = ChurnEstimator::fit(&[], false);
        let assessment = estimator.assess(&customer(24.0, 9.0, 0, true));
        assert_eq!(assessment.risk, 100.0);
        assert_eq!(assessment.level, RiskLevel::High);
    }

    #[test]
    fn test_risk_level_boundaries() {
        assert_eq!(RiskLevel::from_risk(29.9), RiskLevel::Low);
        assert_eq!(RiskLevel::from_risk(30.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_risk(59.9), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_risk(60.0), RiskLevel::High);
    }

    #[test]
    fn test_summary_counts() {
        let customers = vec![
            customer(24.0, 9.0, 0, false), // low
            customer(12.0, 7.0, 2, false), // medium
            customer(2.0, 3.0, 7, false),  // high, not churned
            customer(24.0, 9.0, 0, true),  // churned -> high
        ];
        let estimator = ChurnEstimator::fit(&[], false);
        let summary = summarize(&estimator.assess_all(&customers));
        assert_eq!(summary.customers, 4);
        assert_eq!(summary.churn_rate, 25.0);
        assert_eq!(summary.at_risk, 1);
        assert_eq!(summary.low, 1);
        assert_eq!(summary.medium, 1);
        assert_eq!(summary.high, 2);
    }

    #[test]
    fn test_small_base_falls_back_to_rules() {
        let customers = vec![customer(24.0, 9.0, 0, false)];
        let estimator = ChurnEstimator::fit(&customers, false);
        assert_eq!(estimator.origin(), crate::scoring::ScoreOrigin::Rules);
    }
}
