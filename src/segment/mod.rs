//! Customer segmentation via k-means over spend, revenue potential and
//! tenure. Clusters are named by ranked average spend so the output reads
//! as business tiers rather than anonymous cluster indices.
//!
//! [`SegmentModel`] owns the fitted clustering and scaler so customers can
//! be assigned after training, matching the fit/score lifecycle of the lead
//! scorer and churn estimator. [`segment_customers`] is the batch
//! convenience on top of it.

use anyhow::Result;
use linfa::prelude::*;
use linfa::Dataset;
use linfa_clustering::KMeans;
use linfa_nn::distance::L2Dist;
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::dataset::Customer;
use crate::features::{feature_matrix, segment_features, StandardScaler};

pub const DEFAULT_CLUSTERS: usize = 3;
const MAX_ITERATIONS: u64 = 200;
const TOLERANCE: f64 = 1e-4;

/// Tier names assigned to clusters in descending average-spend order.
/// Clusters past the named tiers fall back to a numbered label.
const TIER_NAMES: [&str; 3] = ["Premium", "Growth", "Standard"];

#[derive(Debug, Clone, Serialize)]
pub struct SegmentedCustomer {
    pub lead_id: u64,
    pub name: String,
    pub monthly_spend: f64,
    pub segment: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SegmentProfile {
    pub segment: String,
    pub size: usize,
    pub avg_monthly_spend: f64,
    pub avg_revenue_potential: f64,
    pub avg_tenure_months: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Segmentation {
    pub assignments: Vec<SegmentedCustomer>,
    pub profiles: Vec<SegmentProfile>,
}

impl Segmentation {
    pub fn empty() -> Segmentation {
        Segmentation {
            assignments: Vec::new(),
            profiles: Vec::new(),
        }
    }
}

/// A fitted segmentation: the k-means centroids, the scaler they were
/// trained under, and the tier name for each cluster. Frozen after fit;
/// any customer, including one unseen at training time, can be assigned.
pub struct SegmentModel {
    kmeans: KMeans<f64, L2Dist>,
    scaler: StandardScaler,
    /// Tier name per cluster index.
    names: Vec<String>,
    /// Training-set profiles, ordered by descending average spend.
    profiles: Vec<SegmentProfile>,
}

impl SegmentModel {
    /// Fit over a non-empty customer base. The effective cluster count is
    /// capped at the number of customers.
    pub fn fit(customers: &[Customer], k: usize, seed: u64) -> Result<SegmentModel> {
        if customers.is_empty() {
            anyhow::bail!("cannot fit a segmentation over zero customers");
        }
        let k = k.clamp(1, customers.len());

        let rows: Vec<_> = customers.iter().map(segment_features).collect();
        let matrix = feature_matrix(&rows);
        let scaler = StandardScaler::fit(&matrix);
        let records = scaler.transform(&matrix);

        let targets: Array1<usize> = Array1::zeros(customers.len());
        let dataset = Dataset::new(records, targets);
        let rng = StdRng::seed_from_u64(seed);
        let kmeans = KMeans::params_with(k, rng, L2Dist)
            .max_n_iterations(MAX_ITERATIONS)
            .tolerance(TOLERANCE)
            .fit(&dataset)?;
        let labels = kmeans.predict(&dataset);

        // Rank clusters by average spend, highest first, and hand out tier
        // names in that order.
        let mut spend_sums = vec![0.0; k];
        let mut sizes = vec![0usize; k];
        for (customer, &label) in customers.iter().zip(labels.iter()) {
            spend_sums[label] += customer.monthly_spend;
            sizes[label] += 1;
        }
        let mut order: Vec<usize> = (0..k).collect();
        order.sort_by(|&a, &b| {
            let avg = |i: usize| {
                if sizes[i] == 0 {
                    0.0
                } else {
                    spend_sums[i] / sizes[i] as f64
                }
            };
            avg(b).partial_cmp(&avg(a)).unwrap_or(std::cmp::Ordering::Equal)
        });
        let mut names = vec![String::new(); k];
        for (rank, &cluster) in order.iter().enumerate() {
            names[cluster] = TIER_NAMES
                .get(rank)
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("Segment {}", rank + 1));
        }

        let mut profiles = Vec::with_capacity(k);
        for &cluster in &order {
            if sizes[cluster] == 0 {
                continue;
            }
            let members: Vec<&Customer> = customers
                .iter()
                .zip(labels.iter())
                .filter(|(_, &label)| label == cluster)
                .map(|(c, _)| c)
                .collect();
            let n = members.len() as f64;
            profiles.push(SegmentProfile {
                segment: names[cluster].clone(),
                size: members.len(),
                avg_monthly_spend: members.iter().map(|c| c.monthly_spend).sum::<f64>() / n,
                avg_revenue_potential: members.iter().map(|c| c.revenue_potential).sum::<f64>() / n,
                avg_tenure_months: members.iter().map(|c| c.tenure_months).sum::<f64>() / n,
            });
        }

        Ok(SegmentModel {
            kmeans,
            scaler,
            names,
            profiles,
        })
    }

    /// Nearest centroid in scaled feature space for one customer.
    pub fn assign_cluster(&self, customer: &Customer) -> usize {
        let scaled = self.scaler.transform_row(&segment_features(customer));
        let mut min_distance = f64::INFINITY;
        let mut closest = 0;
        for (cluster, centroid) in self.kmeans.centroids().outer_iter().enumerate() {
            let distance: f64 = scaled
                .iter()
                .zip(centroid.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum();
            if distance < min_distance {
                min_distance = distance;
                closest = cluster;
            }
        }
        closest
    }

    /// Assign one customer to its segment.
    pub fn assign(&self, customer: &Customer) -> SegmentedCustomer {
        let cluster = self.assign_cluster(customer);
        SegmentedCustomer {
            lead_id: customer.lead_id,
            name: customer.name.clone(),
            monthly_spend: customer.monthly_spend,
            segment: self.segment_name(cluster).to_string(),
        }
    }

    pub fn segment_name(&self, cluster: usize) -> &str {
        &self.names[cluster]
    }

    pub fn profiles(&self) -> &[SegmentProfile] {
        &self.profiles
    }
}

/// Batch path: fit over the customer base, then assign every customer. An
/// empty base yields an empty segmentation rather than an error.
pub fn segment_customers(customers: &[Customer], k: usize, seed: u64) -> Result<Segmentation> {
    if customers.is_empty() {
        return Ok(Segmentation::empty());
    }
    let model = SegmentModel::fit(customers, k, seed)?;
    let assignments = customers.iter().map(|c| model.assign(c)).collect();
    Ok(Segmentation {
        assignments,
        profiles: model.profiles().to_vec(),
    })
}
