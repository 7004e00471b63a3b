//! Data models for the EV slideshow.
//!
//! This module contains the raw records decoded from the public datasets
//! and the derived structures the slides are drawn from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Exact label the registration dataset uses for plug-in hybrids.
pub const PHEV_LABEL: &str = "Plug-in Hybrid Electric Vehicle (PHEV)";

/// Exact label the registration dataset uses for battery electrics.
pub const BEV_LABEL: &str = "Battery Electric Vehicle (BEV)";

/// Electric vehicle type of a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvType {
    /// Plug-in Hybrid Electric Vehicle
    Phev,
    /// Battery Electric Vehicle
    Bev,
    /// Anything the dataset labels differently
    Other,
}

impl fmt::Display for EvType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvType::Phev => write!(f, "PHEV"),
            EvType::Bev => write!(f, "BEV"),
            EvType::Other => write!(f, "Other"),
        }
    }
}

impl From<&str> for EvType {
    fn from(s: &str) -> Self {
        match s {
            PHEV_LABEL => EvType::Phev,
            BEV_LABEL => EvType::Bev,
            _ => EvType::Other,
        }
    }
}

/// One row of the population dataset.
///
/// `pop_2023` is kept as raw JSON: the API serves it as a string, but
/// numbers are accepted too.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PopulationRecord {
    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub pop_2023: Value,
}

impl PopulationRecord {
    /// Population of this row, with anything unusable coerced to 0.
    pub fn population(&self) -> f64 {
        let parsed = match &self.pop_2023 {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };

        match parsed {
            Some(p) if p.is_finite() && p > 0.0 => p,
            _ => 0.0,
        }
    }
}

/// Registration dataset container. Only the positional rows are used;
/// the `meta` block is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationDataset {
    #[serde(default)]
    pub data: Vec<Vec<Value>>,
}

/// A registration row decoded into named fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRecord {
    pub model_year: String,
    pub ev_type: EvType,
    pub county: Option<String>,
}

/// PHEV / BEV counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCounts {
    pub phev: u64,
    pub bev: u64,
}

/// One entry of the yearly series drawn on the first two slides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyRegistrations {
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "PHEV")]
    pub phev: u64,
    #[serde(rename = "BEV")]
    pub bev: u64,
}

impl YearlyRegistrations {
    pub fn total(&self) -> u64 {
        self.phev + self.bev
    }

    /// Count for a single vehicle type (`Other` is never tracked).
    pub fn count(&self, ev_type: EvType) -> u64 {
        match ev_type {
            EvType::Phev => self.phev,
            EvType::Bev => self.bev,
            EvType::Other => 0,
        }
    }
}

pub type PopulationByCounty = BTreeMap<String, f64>;
pub type RegistrationsByYearAndType = BTreeMap<String, TypeCounts>;
pub type RegistrationsByCounty = BTreeMap<String, TypeCounts>;
pub type BevPercentageByCounty = BTreeMap<String, f64>;

/// Everything one successful load produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SlideDatasets {
    pub population_by_county: PopulationByCounty,
    pub registrations_by_year: RegistrationsByYearAndType,
    pub registrations_by_county: RegistrationsByCounty,
    pub yearly: Vec<YearlyRegistrations>,
    pub bev_percentage_by_county: BevPercentageByCounty,
}

impl SlideDatasets {
    /// Number of rows that landed in a PHEV or BEV counter.
    pub fn recognized_registrations(&self) -> u64 {
        self.yearly.iter().map(YearlyRegistrations::total).sum()
    }
}

/// Metadata about a report run.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub population_url: String,
    pub registrations_url: String,
    pub population_records: usize,
    pub registration_rows: usize,
    pub duration_seconds: f64,
}

/// A county's BEV share as listed in reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountyShare {
    pub county: String,
    pub bev: u64,
    pub population: f64,
    pub percentage: f64,
}

/// The aggregated data written out instead of slides.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub yearly: Vec<YearlyRegistrations>,
    pub peak_year: Option<YearlyRegistrations>,
    pub total_registrations: u64,
    pub top_counties: Vec<CountyShare>,
    pub bev_percentage_by_county: BevPercentageByCounty,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ev_type_from_label() {
        assert_eq!(EvType::from(PHEV_LABEL), EvType::Phev);
        assert_eq!(EvType::from(BEV_LABEL), EvType::Bev);
        assert_eq!(EvType::from("BEV"), EvType::Other);
        assert_eq!(EvType::from(""), EvType::Other);
    }

    #[test]
    fn test_population_coercion() {
        let record = |value: Value| PopulationRecord {
            county: Some("King".to_string()),
            pop_2023: value,
        };

        assert_eq!(record(json!("100")).population(), 100.0);
        assert_eq!(record(json!(" 42 ")).population(), 42.0);
        assert_eq!(record(json!(250)).population(), 250.0);
        assert_eq!(record(json!("0.5")).population(), 0.5);
        assert_eq!(record(json!(12.25)).population(), 12.25);
        assert_eq!(record(json!("n/a")).population(), 0.0);
        assert_eq!(record(json!(null)).population(), 0.0);
        assert_eq!(record(json!("-5")).population(), 0.0);
        assert_eq!(record(json!("inf")).population(), 0.0);
    }

    #[test]
    fn test_population_record_ignores_extra_fields() {
        let record: PopulationRecord = serde_json::from_value(json!({
            "county": "Adams",
            "jurisdiction": "Othello",
            "pop_2023": "8765"
        }))
        .unwrap();
        assert_eq!(record.county.as_deref(), Some("Adams"));
        assert_eq!(record.population(), 8765.0);
    }

    #[test]
    fn test_yearly_serializes_with_chart_field_names() {
        let entry = YearlyRegistrations {
            year: "2020".to_string(),
            phev: 0,
            bev: 1,
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value, json!({"Year": "2020", "PHEV": 0, "BEV": 1}));
    }

    #[test]
    fn test_recognized_registrations_sum_yearly_totals() {
        let datasets = SlideDatasets {
            yearly: vec![
                YearlyRegistrations {
                    year: "2020".to_string(),
                    phev: 2,
                    bev: 1,
                },
                YearlyRegistrations {
                    year: "2021".to_string(),
                    phev: 0,
                    bev: 4,
                },
            ],
            ..SlideDatasets::default()
        };
        assert_eq!(datasets.recognized_registrations(), 7);
        assert_eq!(SlideDatasets::default().recognized_registrations(), 0);
    }
}
