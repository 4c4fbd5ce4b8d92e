pub mod config;
pub mod engine;
pub mod factors;
pub mod model;
pub mod tier;
pub mod validation;

pub use config::ScoringConfig;
pub use engine::{rule_based_score, FactorContribution, ScoreBreakdown};
pub use model::{LeadScorer, ScoreOrigin, ScoredLead};
pub use tier::Tier;
pub use validation::validate_scoring_config;
