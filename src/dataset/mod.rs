mod export;
mod loader;
mod synthetic;

pub use export::{export_csv, export_json};
pub use loader::{load_leads, load_or_generate};
pub use synthetic::generate_leads;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Pipeline stage of a lead. Transitions are externally driven; no ordering
/// is enforced. `Converted` and `Lost` are terminal for scoring purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    New,
    Contacted,
    Qualified,
    Converted,
    Lost,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::New,
        Stage::Contacted,
        Stage::Qualified,
        Stage::Converted,
        Stage::Lost,
    ];

    /// Parse a stage name. Unknown strings map to `New` rather than failing
    /// the row; the scorer treats an unrecognized stage as no bonus anyway.
    pub fn parse(s: &str) -> Stage {
        match s.trim() {
            "Contacted" => Stage::Contacted,
            "Qualified" => Stage::Qualified,
            "Converted" => Stage::Converted,
            "Lost" => Stage::Lost,
            _ => Stage::New,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::New => "New",
            Stage::Contacted => "Contacted",
            Stage::Qualified => "Qualified",
            Stage::Converted => "Converted",
            Stage::Lost => "Lost",
        }
    }

    /// Lost leads are excluded from active-pipeline aggregates.
    pub fn is_active(&self) -> bool {
        !matches!(self, Stage::Lost)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the lead dataset. Customer-side columns are only populated for
/// converted leads; everything optional carries a defined default applied at
/// feature-preparation time, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub lead_id: u64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub industry: String,
    pub source: String,
    pub region: String,
    #[serde(with = "stage_str")]
    pub stage: Stage,
    #[serde(default)]
    pub revenue_potential: Option<f64>,
    #[serde(default)]
    pub days_to_convert: Option<f64>,
    #[serde(with = "int_bool")]
    pub converted: bool,
    #[serde(default)]
    pub tenure_months: Option<f64>,
    #[serde(default)]
    pub avg_monthly_spend: Option<f64>,
    #[serde(default)]
    pub satisfaction_score: Option<f64>,
    #[serde(default)]
    pub num_support_tickets: Option<u32>,
    #[serde(default, with = "opt_int_bool")]
    pub churned: Option<bool>,
    #[serde(default)]
    pub deal_amount: Option<f64>,
    #[serde(default)]
    pub close_date: Option<NaiveDate>,
    #[serde(default)]
    pub sales_rep: Option<String>,
}

impl Lead {
    pub fn revenue_potential(&self) -> f64 {
        self.revenue_potential.unwrap_or(0.0)
    }
}

/// Customer view over a converted lead, with the documented defaults
/// substituted for missing values (satisfaction 7, everything else 0).
#[derive(Debug, Clone, Serialize)]
pub struct Customer {
    pub lead_id: u64,
    pub name: String,
    pub industry: String,
    pub tenure_months: f64,
    pub monthly_spend: f64,
    pub satisfaction: f64,
    pub support_tickets: u32,
    pub churned: bool,
    pub revenue_potential: f64,
}

impl Customer {
    /// Returns None for leads that never converted.
    pub fn from_lead(lead: &Lead) -> Option<Customer> {
        if !lead.converted {
            return None;
        }
        Some(Customer {
            lead_id: lead.lead_id,
            name: lead.name.clone(),
            industry: lead.industry.clone(),
            tenure_months: lead.tenure_months.unwrap_or(0.0),
            monthly_spend: lead.avg_monthly_spend.unwrap_or(0.0),
            satisfaction: lead.satisfaction_score.unwrap_or(7.0),
            support_tickets: lead.num_support_tickets.unwrap_or(0),
            churned: lead.churned.unwrap_or(false),
            revenue_potential: lead.revenue_potential.unwrap_or(0.0),
        })
    }

    pub fn customers(leads: &[Lead]) -> Vec<Customer> {
        leads.iter().filter_map(Customer::from_lead).collect()
    }
}

/// A closed deal derived from a terminal-stage lead. Converted leads become
/// won deals with their deal amount; Lost-stage leads become lost deals.
#[derive(Debug, Clone, Serialize)]
pub struct Deal {
    pub lead_id: u64,
    pub company: String,
    pub value: f64,
    pub close_date: Option<NaiveDate>,
    pub sales_rep: Option<String>,
    pub won: bool,
}

impl Deal {
    pub fn from_lead(lead: &Lead) -> Option<Deal> {
        let won = match lead.stage {
            Stage::Converted => true,
            Stage::Lost => false,
            _ => return None,
        };
        Some(Deal {
            lead_id: lead.lead_id,
            company: lead.name.clone(),
            value: if won {
                lead.deal_amount.unwrap_or(0.0)
            } else {
                0.0
            },
            close_date: lead.close_date,
            sales_rep: lead.sales_rep.clone(),
            won,
        })
    }

    pub fn deals(leads: &[Lead]) -> Vec<Deal> {
        leads.iter().filter_map(Deal::from_lead).collect()
    }
}

/// Serialize/deserialize `Stage` as its display name so CSV columns read as
/// "Qualified" rather than an enum index.
mod stage_str {
    use super::Stage;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(stage: &Stage, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(stage.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Stage, D::Error> {
        let s = String::deserialize(de)?;
        Ok(Stage::parse(&s))
    }
}

/// The dataset encodes booleans as 0/1 columns.
mod int_bool {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
        let v = u8::deserialize(de)?;
        Ok(v != 0)
    }
}

mod opt_int_bool {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<bool>, ser: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => ser.serialize_u8(u8::from(*v)),
            None => ser.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<bool>, D::Error> {
        let v: Option<u8> = Option::deserialize(de)?;
        Ok(v.map(|v| v != 0))
    }
}
