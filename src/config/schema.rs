use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::forecast::DEFAULT_HORIZON;
use crate::report::KpiTargets;
use crate::scoring::ScoringConfig;
use crate::segment::DEFAULT_CLUSTERS;

pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Default dataset path used when --input is not given.
    pub dataset: Option<PathBuf>,
    /// RNG seed for synthetic data and clustering.
    pub seed: Option<u64>,
    pub scoring: Option<ScoringConfig>,
    pub segmentation: Option<SegmentationConfig>,
    pub forecast: Option<ForecastConfig>,
    pub targets: Option<TargetsConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SegmentationConfig {
    pub clusters: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ForecastConfig {
    /// Months to project past the end of history.
    pub horizon: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TargetsConfig {
    pub conversion_rate: Option<f64>,
    pub churn_rate: Option<f64>,
    pub win_rate: Option<f64>,
}

impl Config {
    pub fn seed(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_SEED)
    }

    pub fn scoring(&self) -> ScoringConfig {
        self.scoring.clone().unwrap_or_default()
    }

    pub fn clusters(&self) -> usize {
        self.segmentation
            .as_ref()
            .and_then(|s| s.clusters)
            .unwrap_or(DEFAULT_CLUSTERS)
    }

    pub fn horizon(&self) -> usize {
        self.forecast
            .as_ref()
            .and_then(|f| f.horizon)
            .unwrap_or(DEFAULT_HORIZON)
    }

    pub fn targets(&self) -> KpiTargets {
        let defaults = KpiTargets::default();
        let configured = self.targets.clone().unwrap_or_default();
        KpiTargets {
            conversion_rate: configured
                .conversion_rate
                .unwrap_or(defaults.conversion_rate),
            churn_rate: configured.churn_rate.unwrap_or(defaults.churn_rate),
            win_rate: configured.win_rate.unwrap_or(defaults.win_rate),
        }
    }
}
