//! leadscope: CRM lead scoring and pipeline analytics.
//!
//! Loads a tabular lead dataset (or generates a synthetic one), scores leads
//! with a conversion model or deterministic rules, segments customers,
//! estimates churn risk, projects revenue, and rolls everything up into a
//! KPI report.

pub mod churn;
pub mod config;
pub mod dataset;
pub mod features;
pub mod forecast;
pub mod output;
pub mod report;
pub mod scoring;
pub mod segment;
pub mod team;
