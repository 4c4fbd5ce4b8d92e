//! Sales forecasting from won-deal history. Monthly revenue totals feed a
//! linear regression when at least three months of history exist; thinner
//! history falls back to projecting the historical average, and no history
//! at all projects zero.

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use linfa::prelude::*;
use linfa::Dataset;
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2};
use serde::Serialize;

use crate::dataset::Deal;

pub const DEFAULT_HORIZON: usize = 3;
const MIN_REGRESSION_MONTHS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ForecastMethod {
    Regression,
    Average,
    NoHistory,
}

impl ForecastMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastMethod::Regression => "linear regression",
            ForecastMethod::Average => "historical average",
            ForecastMethod::NoHistory => "no history",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyRevenue {
    /// First day of the month.
    pub month: NaiveDate,
    pub revenue: f64,
    pub deals: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastPoint {
    pub month: NaiveDate,
    pub projected: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Forecast {
    pub history: Vec<MonthlyRevenue>,
    pub projections: Vec<ForecastPoint>,
    pub method: ForecastMethod,
}

/// Roll won deals up into per-month revenue totals, ordered by month.
/// Deals without a close date cannot be placed on the timeline and are
/// skipped.
pub fn monthly_history(deals: &[Deal]) -> Vec<MonthlyRevenue> {
    let mut months: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for deal in deals.iter().filter(|d| d.won) {
        let Some(close_date) = deal.close_date else {
            continue;
        };
        let month = close_date.with_day(1).unwrap_or(close_date);
        let entry = months.entry(month).or_insert((0.0, 0));
        entry.0 += deal.value;
        entry.1 += 1;
    }
    months
        .into_iter()
        .map(|(month, (revenue, deals))| MonthlyRevenue {
            month,
            revenue,
            deals,
        })
        .collect()
}

/// Project revenue `horizon` months past the end of history.
pub fn forecast_revenue(deals: &[Deal], horizon: usize) -> Forecast {
    let history = monthly_history(deals);

    if history.is_empty() {
        let projections = future_months(None, horizon)
            .map(|month| ForecastPoint {
                month,
                projected: 0.0,
            })
            .collect();
        return Forecast {
            history,
            projections,
            method: ForecastMethod::NoHistory,
        };
    }

    let first = history[0].month;
    let last = history[history.len() - 1].month;

    if history.len() < MIN_REGRESSION_MONTHS {
        let average =
            history.iter().map(|m| m.revenue).sum::<f64>() / history.len() as f64;
        let projections = future_months(Some(last), horizon)
            .map(|month| ForecastPoint {
                month,
                projected: average,
            })
            .collect();
        return Forecast {
            history,
            projections,
            method: ForecastMethod::Average,
        };
    }

    // Regress revenue on (months-since-first, deal count) so gaps in the
    // history keep their width on the time axis. Future months assume the
    // mean historical deal count.
    let rows: Vec<[f64; 2]> = history
        .iter()
        .map(|m| [month_index(first, m.month) as f64, m.deals as f64])
        .collect();
    let records = Array2::from_shape_fn((rows.len(), 2), |(i, j)| rows[i][j]);
    let targets: Array1<f64> = history.iter().map(|m| m.revenue).collect();
    let dataset = Dataset::new(records, targets);

    let mean_deals =
        history.iter().map(|m| m.deals as f64).sum::<f64>() / history.len() as f64;

    match LinearRegression::new().fit(&dataset) {
        Ok(model) => {
            let last_index = month_index(first, last);
            let future: Vec<NaiveDate> = future_months(Some(last), horizon).collect();
            let future_xs = Array2::from_shape_fn((future.len(), 2), |(i, j)| {
                if j == 0 {
                    (last_index + 1 + i as i64) as f64
                } else {
                    mean_deals
                }
            });
            let predicted = model.predict(&future_xs);
            let projections = future
                .into_iter()
                .zip(predicted.iter())
                .map(|(month, &value)| ForecastPoint {
                    month,
                    projected: value.max(0.0),
                })
                .collect();
            Forecast {
                history,
                projections,
                method: ForecastMethod::Regression,
            }
        }
        Err(_) => {
            // Degenerate fit, e.g. a singular system. Fall back the same way
            // thin history does.
            let average =
                history.iter().map(|m| m.revenue).sum::<f64>() / history.len() as f64;
            let projections = future_months(Some(last), horizon)
                .map(|month| ForecastPoint {
                    month,
                    projected: average,
                })
                .collect();
            Forecast {
                history,
                projections,
                method: ForecastMethod::Average,
            }
        }
    }
}

/// Whole months between two first-of-month dates.
fn month_index(first: NaiveDate, month: NaiveDate) -> i64 {
    (month.year() as i64 - first.year() as i64) * 12
        + (month.month() as i64 - first.month() as i64)
}

fn future_months(last: Option<NaiveDate>, horizon: usize) -> impl Iterator<Item = NaiveDate> {
    // With no history, project from the epoch-less placeholder of month one.
    let base = last.unwrap_or_else(|| {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
    });
    (1..=horizon as u32).filter_map(move |offset| base.checked_add_months(Months::new(offset)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn won(value: f64, year: i32, month: u32, day: u32) -> Deal {
        Deal {
            lead_id: 1,
            company: "Acme".to_string(),
            value,
            close_date: NaiveDate::from_ymd_opt(year, month, day),
            sales_rep: Some("Jordan".to_string()),
            won: true,
        }
    }

    #[test]
    fn test_no_history_projects_zero() {
        let forecast = forecast_revenue(&[], DEFAULT_HORIZON);
        assert_eq!(forecast.method, ForecastMethod::NoHistory);
        assert_eq!(forecast.projections.len(), DEFAULT_HORIZON);
        assert!(forecast.projections.iter().all(|p| p.projected == 0.0));
    }

    #[test]
    fn test_lost_deals_are_excluded() {
        let mut deal = won(5000.0, 2024, 3, 15);
        deal.won = false;
        let forecast = forecast_revenue(&[deal], DEFAULT_HORIZON);
        assert_eq!(forecast.method, ForecastMethod::NoHistory);
    }

    #[test]
    fn test_thin_history_uses_average() {
        let deals = vec![won(4000.0, 2024, 1, 10), won(6000.0, 2024, 2, 20)];
        let forecast = forecast_revenue(&deals, 2);
        assert_eq!(forecast.method, ForecastMethod::Average);
        assert!(forecast.projections.iter().all(|p| p.projected == 5000.0));
        assert_eq!(
            forecast.projections[0].month,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_single_month_repeats_that_month() {
        let deals = vec![won(7500.0, 2024, 4, 12)];
        let forecast = forecast_revenue(&deals, 3);
        assert_eq!(forecast.method, ForecastMethod::Average);
        assert!(forecast.projections.iter().all(|p| p.projected == 7500.0));
    }

    #[test]
    fn test_linear_trend_is_extrapolated() {
        // Revenue grows by 1000/month; deal counts alternate so the design
        // matrix has full rank.
        let deals = vec![
            won(1000.0, 2024, 1, 5),
            won(1500.0, 2024, 2, 5),
            won(500.0, 2024, 2, 20),
            won(3000.0, 2024, 3, 5),
            won(2000.0, 2024, 4, 5),
            won(2000.0, 2024, 4, 20),
        ];
        let forecast = forecast_revenue(&deals, 2);
        assert_eq!(forecast.method, ForecastMethod::Regression);
        assert!((forecast.projections[0].projected - 5000.0).abs() < 1.0);
        assert!((forecast.projections[1].projected - 6000.0).abs() < 1.0);
    }

    #[test]
    fn test_declining_trend_floors_at_zero() {
        let deals = vec![
            won(3000.0, 2024, 1, 5),
            won(1000.0, 2024, 2, 5),
            won(1000.0, 2024, 2, 20),
            won(1000.0, 2024, 3, 5),
        ];
        let forecast = forecast_revenue(&deals, 4);
        assert_eq!(forecast.method, ForecastMethod::Regression);
        assert!(forecast.projections.iter().all(|p| p.projected >= 0.0));
        assert_eq!(forecast.projections.last().unwrap().projected, 0.0);
    }

    #[test]
    fn test_history_aggregates_within_a_month() {
        let deals = vec![
            won(1000.0, 2024, 1, 5),
            won(2500.0, 2024, 1, 28),
            won(500.0, 2024, 2, 14),
        ];
        let history = monthly_history(&deals);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].revenue, 3500.0);
        assert_eq!(history[0].deals, 2);
        assert_eq!(history[1].revenue, 500.0);
    }

    #[test]
    fn test_gap_months_keep_their_distance() {
        // Jan, Feb, May with flat monthly revenue: regression over indices
        // 0, 1, 4 still projects roughly flat.
        let deals = vec![
            won(2000.0, 2024, 1, 5),
            won(1200.0, 2024, 2, 5),
            won(800.0, 2024, 2, 20),
            won(2000.0, 2024, 5, 5),
        ];
        let forecast = forecast_revenue(&deals, 1);
        assert_eq!(forecast.method, ForecastMethod::Regression);
        assert!((forecast.projections[0].projected - 2000.0).abs() < 1.0);
        assert_eq!(
            forecast.projections[0].month,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
    }
}
