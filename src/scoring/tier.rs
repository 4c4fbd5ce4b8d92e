use serde::{Deserialize, Serialize};

/// Named bucket for a lead score, derived from fixed closed-open thresholds:
/// [70,100] Hot, [40,70) Warm, [0,40) Cold. Exactly 70 is Hot and exactly 40
/// is Warm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Hot,
    Warm,
    Cold,
}

impl Tier {
    pub const HOT_THRESHOLD: f64 = 70.0;
    pub const WARM_THRESHOLD: f64 = 40.0;

    pub fn from_score(score: f64) -> Tier {
        if score >= Self::HOT_THRESHOLD {
            Tier::Hot
        } else if score >= Self::WARM_THRESHOLD {
            Tier::Warm
        } else {
            Tier::Cold
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Hot => "Hot",
            Tier::Warm => "Warm",
            Tier::Cold => "Cold",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
