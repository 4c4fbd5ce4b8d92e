use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::{Lead, Stage};

const SOURCES: [&str; 5] = ["Referral", "LinkedIn", "Website", "Cold Call", "Event"];
const INDUSTRIES: [&str; 6] = ["IT", "Finance", "Healthcare", "Retail", "Manufacturing", "Education"];
const REGIONS: [&str; 4] = ["North", "South", "East", "West"];
const REPS: [&str; 5] = [
    "Alice Johnson",
    "Bob Wilson",
    "Carol Davis",
    "David Brown",
    "Eva Martinez",
];

/// Generate a deterministic synthetic lead table. The same seed always yields
/// the same rows, so fallback behavior is reproducible in tests and demos.
///
/// Roughly a third of the rows convert and carry customer-side fields; close
/// dates are spread over six months so forecasting has enough history.
pub fn generate_leads(count: usize, seed: u64) -> Vec<Lead> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut leads = Vec::with_capacity(count);

    for i in 0..count {
        let id = i as u64 + 1;
        let converted = rng.gen_ratio(1, 3);
        let stage = if converted {
            Stage::Converted
        } else {
            *[Stage::New, Stage::Contacted, Stage::Qualified, Stage::Lost]
                .choose(&mut rng)
                .unwrap_or(&Stage::New)
        };

        let revenue_potential = rng.gen_range(10_000.0..90_000.0_f64).round();
        let rep = *REPS.choose(&mut rng).unwrap_or(&REPS[0]);

        let (tenure, spend, satisfaction, tickets, churned, deal, close_date) = if converted {
            let month = rng.gen_range(1..=6);
            let day = rng.gen_range(1..=28);
            (
                Some(rng.gen_range(1.0..36.0_f64).round()),
                Some(rng.gen_range(1_000.0..9_000.0_f64).round()),
                Some(rng.gen_range(3.0..10.0_f64).round()),
                Some(rng.gen_range(0..6)),
                Some(rng.gen_ratio(1, 5)),
                Some(rng.gen_range(5_000.0..120_000.0_f64).round()),
                NaiveDate::from_ymd_opt(2024, month, day),
            )
        } else {
            (None, None, None, None, None, None, None)
        };

        leads.push(Lead {
            lead_id: id,
            name: format!("Lead {}", id),
            email: format!("lead{}@example.com", id),
            phone: format!("555-{:04}", id),
            industry: INDUSTRIES[i % INDUSTRIES.len()].to_string(),
            source: SOURCES[i % SOURCES.len()].to_string(),
            region: REGIONS[i % REGIONS.len()].to_string(),
            stage,
            revenue_potential: Some(revenue_potential),
            days_to_convert: Some(rng.gen_range(5.0..90.0_f64).round()),
            converted,
            tenure_months: tenure,
            avg_monthly_spend: spend,
            satisfaction_score: satisfaction,
            num_support_tickets: tickets,
            churned,
            deal_amount: deal,
            close_date,
            sales_rep: Some(rep.to_string()),
        });
    }

    leads
}
