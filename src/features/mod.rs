//! Feature preparation: label encoding, fixed-order feature vectors, and
//! per-column standard scaling for the clustering features.

use ndarray::{Array1, Array2};
use std::collections::HashMap;

use crate::dataset::{Customer, Lead};

/// Number of features in a lead vector (see [`lead_features`]).
pub const LEAD_FEATURES: usize = 6;
/// Number of features in a customer churn vector (see [`customer_features`]).
pub const CUSTOMER_FEATURES: usize = 4;
/// Number of features in a segmentation vector (see [`segment_features`]).
pub const SEGMENT_FEATURES: usize = 3;

/// Maps category strings to integer codes, fit once over the training set.
/// Categories unseen at inference time encode to 0 rather than failing.
#[derive(Debug, Clone, Default)]
pub struct LabelEncoder {
    codes: HashMap<String, usize>,
}

impl LabelEncoder {
    /// Fit over the training values. Codes are assigned in first-seen order.
    pub fn fit<'a, I: IntoIterator<Item = &'a str>>(values: I) -> LabelEncoder {
        let mut codes = HashMap::new();
        for value in values {
            let next = codes.len();
            codes.entry(value.to_string()).or_insert(next);
        }
        LabelEncoder { codes }
    }

    /// Encode one value; unseen categories fall back to code 0.
    pub fn encode(&self, value: &str) -> usize {
        self.codes.get(value).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Categorical encoders for the lead feature space, fit once over a training
/// set and reused for every subsequent lead.
#[derive(Debug, Clone)]
pub struct LeadEncoders {
    pub source: LabelEncoder,
    pub industry: LabelEncoder,
    pub region: LabelEncoder,
    pub stage: LabelEncoder,
}

impl LeadEncoders {
    pub fn fit(leads: &[Lead]) -> LeadEncoders {
        LeadEncoders {
            source: LabelEncoder::fit(leads.iter().map(|l| l.source.as_str())),
            industry: LabelEncoder::fit(leads.iter().map(|l| l.industry.as_str())),
            region: LabelEncoder::fit(leads.iter().map(|l| l.region.as_str())),
            stage: LabelEncoder::fit(leads.iter().map(|l| l.stage.as_str())),
        }
    }
}

/// Fixed-order lead feature vector:
/// revenue potential, days to convert, source, industry, region, stage.
/// Missing days-to-convert defaults to 30, missing revenue to 0.
pub fn lead_features(lead: &Lead, encoders: &LeadEncoders) -> [f64; LEAD_FEATURES] {
    [
        lead.revenue_potential.unwrap_or(0.0),
        lead.days_to_convert.unwrap_or(30.0),
        encoders.source.encode(&lead.source) as f64,
        encoders.industry.encode(&lead.industry) as f64,
        encoders.region.encode(&lead.region) as f64,
        encoders.stage.encode(lead.stage.as_str()) as f64,
    ]
}

/// Fixed-order customer vector for churn estimation:
/// tenure months, monthly spend, satisfaction, support tickets.
/// Defaults were applied when the `Customer` view was built.
pub fn customer_features(customer: &Customer) -> [f64; CUSTOMER_FEATURES] {
    [
        customer.tenure_months,
        customer.monthly_spend,
        customer.satisfaction,
        customer.support_tickets as f64,
    ]
}

/// Fixed-order segmentation vector: monthly spend, revenue potential, tenure.
pub fn segment_features(customer: &Customer) -> [f64; SEGMENT_FEATURES] {
    [
        customer.monthly_spend,
        customer.revenue_potential,
        customer.tenure_months,
    ]
}

/// Stack per-entity vectors into an (n, width) matrix.
pub fn feature_matrix<const W: usize>(rows: &[[f64; W]]) -> Array2<f64> {
    let mut data = Vec::with_capacity(rows.len() * W);
    for row in rows {
        data.extend_from_slice(row);
    }
    // Shape is (rows.len(), W) by construction, so this cannot fail.
    Array2::from_shape_vec((rows.len(), W), data).unwrap_or_else(|_| Array2::zeros((0, W)))
}

/// Per-column standardization fit on the training matrix and reused to scale
/// new points at assignment time. Zero-variance columns scale to 0.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    means: Array1<f64>,
    stds: Array1<f64>,
}

impl StandardScaler {
    pub fn fit(matrix: &Array2<f64>) -> StandardScaler {
        let n = matrix.nrows().max(1) as f64;
        let cols = matrix.ncols();
        let mut means = Array1::zeros(cols);
        let mut stds = Array1::zeros(cols);

        for c in 0..cols {
            let col = matrix.column(c);
            let mean = col.sum() / n;
            let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            means[c] = mean;
            stds[c] = var.sqrt();
        }

        StandardScaler { means, stds }
    }

    pub fn transform(&self, matrix: &Array2<f64>) -> Array2<f64> {
        let mut scaled = matrix.clone();
        for mut row in scaled.rows_mut() {
            for c in 0..row.len() {
                row[c] = self.scale_value(row[c], c);
            }
        }
        scaled
    }

    pub fn transform_row(&self, row: &[f64]) -> Array1<f64> {
        row.iter()
            .enumerate()
            .map(|(c, &v)| self.scale_value(v, c))
            .collect()
    }

    fn scale_value(&self, value: f64, col: usize) -> f64 {
        let std = self.stds[col];
        if std > 0.0 {
            (value - self.means[col]) / std
        } else {
            0.0
        }
    }
}
