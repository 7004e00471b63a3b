//! Registration aggregation.
//!
//! Turns the raw population records and the positional registration rows
//! into the three datasets the slides are drawn from.

use crate::error::{PipelineError, PipelineResult};
use crate::models::{
    BevPercentageByCounty, EvType, PopulationByCounty, PopulationRecord, RegistrationDataset,
    RegistrationRecord, RegistrationsByCounty, RegistrationsByYearAndType, SlideDatasets,
    YearlyRegistrations,
};
use serde_json::Value;
use tracing::debug;

/// Column offsets of the fields we read from a registration row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLayout {
    pub county: usize,
    pub model_year: usize,
    pub ev_type: usize,
}

impl Default for RowLayout {
    fn default() -> Self {
        Self {
            county: 9,
            model_year: 13,
            ev_type: 16,
        }
    }
}

impl From<&crate::config::LayoutConfig> for RowLayout {
    fn from(config: &crate::config::LayoutConfig) -> Self {
        Self {
            county: config.county_column,
            model_year: config.model_year_column,
            ev_type: config.ev_type_column,
        }
    }
}

impl RowLayout {
    /// Smallest row length that holds every configured column.
    pub fn min_row_len(&self) -> usize {
        self.county.max(self.model_year).max(self.ev_type) + 1
    }
}

/// Decode one positional row into a named record.
///
/// This is the only place that knows where fields live in a row.
pub fn decode_row(
    index: usize,
    row: &[Value],
    layout: &RowLayout,
) -> PipelineResult<RegistrationRecord> {
    let expected = layout.min_row_len();
    if row.len() < expected {
        return Err(PipelineError::SchemaMismatch {
            row: index,
            expected,
            found: row.len(),
        });
    }

    let model_year = match &row[layout.model_year] {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    };

    let ev_type = row[layout.ev_type]
        .as_str()
        .map(EvType::from)
        .unwrap_or(EvType::Other);

    let county = row[layout.county].as_str().map(String::from);

    Ok(RegistrationRecord {
        model_year,
        ev_type,
        county,
    })
}

/// Sum population per county as floating point, keeping fractional
/// values. Order of the records does not matter.
pub fn population_by_county(records: &[PopulationRecord]) -> PopulationByCounty {
    let mut totals = PopulationByCounty::new();

    for record in records {
        let Some(ref county) = record.county else {
            continue;
        };
        *totals.entry(county.clone()).or_insert(0.0) += record.population();
    }

    totals
}

/// Count registrations per model year and type.
///
/// Every observed year gets a bucket, even when none of its rows has a
/// recognized type.
pub fn registrations_by_year(records: &[RegistrationRecord]) -> RegistrationsByYearAndType {
    let mut by_year = RegistrationsByYearAndType::new();

    for record in records {
        let counts = by_year.entry(record.model_year.clone()).or_default();
        match record.ev_type {
            EvType::Phev => counts.phev += 1,
            EvType::Bev => counts.bev += 1,
            EvType::Other => {}
        }
    }

    by_year
}

/// Count BEV registrations per county.
///
/// The PHEV counter exists on every bucket but is never incremented.
pub fn registrations_by_county(records: &[RegistrationRecord]) -> RegistrationsByCounty {
    let mut by_county = RegistrationsByCounty::new();

    for record in records {
        let Some(ref county) = record.county else {
            continue;
        };
        let counts = by_county.entry(county.clone()).or_default();
        if record.ev_type == EvType::Bev {
            counts.bev += 1;
        }
    }

    by_county
}

/// Flatten the per-year counters into a series sorted by year string.
pub fn format_yearly(by_year: &RegistrationsByYearAndType) -> Vec<YearlyRegistrations> {
    // BTreeMap<String, _> iterates in lexicographic key order.
    by_year
        .iter()
        .map(|(year, counts)| YearlyRegistrations {
            year: year.clone(),
            phev: counts.phev,
            bev: counts.bev,
        })
        .collect()
}

/// BEV registrations as a percentage of county population.
///
/// Counties without a known, positive and finite population get 0.
pub fn bev_percentage_by_county(
    by_county: &RegistrationsByCounty,
    population: &PopulationByCounty,
) -> BevPercentageByCounty {
    by_county
        .iter()
        .map(|(county, counts)| {
            let percentage = match population.get(county) {
                Some(&pop) if pop > 0.0 && pop.is_finite() => counts.bev as f64 * 100.0 / pop,
                _ => 0.0,
            };
            (county.clone(), percentage)
        })
        .collect()
}

/// Run the whole pipeline over one load's worth of raw data.
pub fn aggregate(
    population: &[PopulationRecord],
    registrations: &RegistrationDataset,
    layout: &RowLayout,
) -> PipelineResult<SlideDatasets> {
    let population_by_county = population_by_county(population);

    let records = registrations
        .data
        .iter()
        .enumerate()
        .map(|(i, row)| decode_row(i, row, layout))
        .collect::<PipelineResult<Vec<_>>>()?;

    let registrations_by_year = registrations_by_year(&records);
    let registrations_by_county = registrations_by_county(&records);
    let yearly = format_yearly(&registrations_by_year);
    let bev_percentage_by_county =
        bev_percentage_by_county(&registrations_by_county, &population_by_county);

    debug!(
        "Aggregated {} rows into {} years and {} counties",
        records.len(),
        yearly.len(),
        bev_percentage_by_county.len()
    );

    Ok(SlideDatasets {
        population_by_county,
        registrations_by_year,
        registrations_by_county,
        yearly,
        bev_percentage_by_county,
    })
}

/// Year with the most registrations. The earliest year wins a tie.
pub fn peak_year(yearly: &[YearlyRegistrations]) -> Option<&YearlyRegistrations> {
    yearly
        .iter()
        .fold(None, |best: Option<&YearlyRegistrations>, entry| match best {
            Some(b) if entry.total() <= b.total() => Some(b),
            _ => Some(entry),
        })
}

/// Counties ranked by BEV percentage, highest first.
pub fn top_counties(percentages: &BevPercentageByCounty, n: usize) -> Vec<(&str, f64)> {
    let mut ranked: Vec<(&str, f64)> = percentages
        .iter()
        .map(|(county, pct)| (county.as_str(), *pct))
        .collect();

    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BEV_LABEL, PHEV_LABEL};
    use serde_json::json;

    fn pop(county: &str, value: Value) -> PopulationRecord {
        PopulationRecord {
            county: Some(county.to_string()),
            pop_2023: value,
        }
    }

    /// A 17-field row with the fields of interest at the default offsets.
    fn row(county: Option<&str>, year: &str, ev_type: &str) -> Vec<Value> {
        let mut fields = vec![Value::Null; 17];
        fields[9] = county.map(|c| json!(c)).unwrap_or(Value::Null);
        fields[13] = json!(year);
        fields[16] = json!(ev_type);
        fields
    }

    fn dataset(rows: Vec<Vec<Value>>) -> RegistrationDataset {
        RegistrationDataset { data: rows }
    }

    #[test]
    fn test_scenario_two_rows_one_county() {
        let population = vec![pop("King", json!("100"))];
        let registrations = dataset(vec![
            row(Some("King"), "2020", BEV_LABEL),
            row(Some("King"), "2021", PHEV_LABEL),
        ]);

        let result = aggregate(&population, &registrations, &RowLayout::default()).unwrap();

        assert_eq!(
            result.yearly,
            vec![
                YearlyRegistrations {
                    year: "2020".to_string(),
                    phev: 0,
                    bev: 1
                },
                YearlyRegistrations {
                    year: "2021".to_string(),
                    phev: 1,
                    bev: 0
                },
            ]
        );
        assert_eq!(result.bev_percentage_by_county.get("King"), Some(&1.0));
    }

    #[test]
    fn test_huge_populations_sum_without_overflow() {
        let records = vec![pop("King", json!("1e19")), pop("King", json!("1e19"))];

        let totals = population_by_county(&records);
        assert_eq!(totals.get("King"), Some(&2e19));
    }

    #[test]
    fn test_fractional_population_keeps_percentage() {
        let population = vec![pop("King", json!("0.5"))];
        let registrations = dataset(vec![row(Some("King"), "2020", BEV_LABEL)]);

        let result = aggregate(&population, &registrations, &RowLayout::default()).unwrap();

        assert_eq!(result.population_by_county.get("King"), Some(&0.5));
        assert_eq!(result.bev_percentage_by_county.get("King"), Some(&200.0));
    }

    #[test]
    fn test_population_summed_per_county() {
        let records = vec![
            pop("King", json!("100")),
            pop("Pierce", json!("50")),
            pop("King", json!(25)),
            pop("King", json!("not a number")),
        ];

        let totals = population_by_county(&records);
        assert_eq!(totals.get("King"), Some(&125.0));
        assert_eq!(totals.get("Pierce"), Some(&50.0));

        let mut reversed = records.clone();
        reversed.reverse();
        assert_eq!(population_by_county(&reversed), totals);
    }

    #[test]
    fn test_county_without_population_is_zero() {
        let registrations = dataset(vec![row(Some("Ferry"), "2022", BEV_LABEL)]);
        let result = aggregate(&[], &registrations, &RowLayout::default()).unwrap();
        assert_eq!(result.bev_percentage_by_county.get("Ferry"), Some(&0.0));
    }

    #[test]
    fn test_zero_population_is_zero_not_nan() {
        let population = vec![pop("Garfield", json!("0"))];
        let registrations = dataset(vec![row(Some("Garfield"), "2022", BEV_LABEL)]);
        let result = aggregate(&population, &registrations, &RowLayout::default()).unwrap();
        let pct = result.bev_percentage_by_county["Garfield"];
        assert_eq!(pct, 0.0);
        assert!(pct.is_finite());
    }

    #[test]
    fn test_phev_only_county_is_zero() {
        let population = vec![pop("Clark", json!("1000"))];
        let registrations = dataset(vec![row(Some("Clark"), "2019", PHEV_LABEL)]);
        let result = aggregate(&population, &registrations, &RowLayout::default()).unwrap();
        assert_eq!(result.bev_percentage_by_county["Clark"], 0.0);
        assert_eq!(result.registrations_by_county["Clark"].phev, 0);
    }

    #[test]
    fn test_unrecognized_type_counts_nowhere() {
        let registrations = dataset(vec![
            row(Some("King"), "2020", "Fuel Cell Electric Vehicle"),
            row(Some("King"), "2020", BEV_LABEL),
        ]);
        let result = aggregate(&[], &registrations, &RowLayout::default()).unwrap();

        assert_eq!(result.yearly.len(), 1);
        assert_eq!(result.yearly[0].total(), 1);
        assert_eq!(result.registrations_by_county["King"].bev, 1);
        assert_eq!(result.recognized_registrations(), 1);
    }

    #[test]
    fn test_year_with_only_unrecognized_rows_still_appears() {
        let registrations = dataset(vec![row(Some("King"), "1999", "Unknown")]);
        let result = aggregate(&[], &registrations, &RowLayout::default()).unwrap();
        assert_eq!(result.yearly.len(), 1);
        assert_eq!(result.yearly[0].year, "1999");
        assert_eq!(result.yearly[0].total(), 0);
    }

    #[test]
    fn test_yearly_sorted_without_duplicates() {
        let registrations = dataset(vec![
            row(Some("King"), "2021", BEV_LABEL),
            row(Some("King"), "2012", BEV_LABEL),
            row(Some("King"), "2021", PHEV_LABEL),
            row(Some("King"), "2018", PHEV_LABEL),
        ]);
        let result = aggregate(&[], &registrations, &RowLayout::default()).unwrap();
        let years: Vec<&str> = result.yearly.iter().map(|y| y.year.as_str()).collect();
        assert_eq!(years, vec!["2012", "2018", "2021"]);
        assert_eq!(result.recognized_registrations(), 4);
    }

    #[test]
    fn test_numeric_model_year_is_accepted() {
        let mut fields = row(Some("King"), "", BEV_LABEL);
        fields[13] = json!(2023);
        let record = decode_row(0, &fields, &RowLayout::default()).unwrap();
        assert_eq!(record.model_year, "2023");
        assert_eq!(record.ev_type, EvType::Bev);
    }

    #[test]
    fn test_row_without_county_only_counts_by_year() {
        let registrations = dataset(vec![row(None, "2020", BEV_LABEL)]);
        let result = aggregate(&[], &registrations, &RowLayout::default()).unwrap();
        assert_eq!(result.yearly[0].bev, 1);
        assert!(result.registrations_by_county.is_empty());
    }

    #[test]
    fn test_short_row_is_schema_mismatch() {
        let registrations = dataset(vec![
            row(Some("King"), "2020", BEV_LABEL),
            vec![json!("too"), json!("short")],
        ]);
        let err = aggregate(&[], &registrations, &RowLayout::default()).unwrap_err();
        match err {
            PipelineError::SchemaMismatch {
                row,
                expected,
                found,
            } => {
                assert_eq!(row, 1);
                assert_eq!(expected, 17);
                assert_eq!(found, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_custom_layout() {
        let layout = RowLayout {
            county: 0,
            model_year: 1,
            ev_type: 2,
        };
        let fields = vec![json!("Spokane"), json!("2017"), json!(BEV_LABEL)];
        let record = decode_row(0, &fields, &layout).unwrap();
        assert_eq!(record.county.as_deref(), Some("Spokane"));
        assert_eq!(layout.min_row_len(), 3);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let population = vec![pop("King", json!("2000")), pop("Kitsap", json!("500"))];
        let registrations = dataset(vec![
            row(Some("King"), "2020", BEV_LABEL),
            row(Some("Kitsap"), "2021", BEV_LABEL),
            row(Some("King"), "2021", PHEV_LABEL),
        ]);

        let first = aggregate(&population, &registrations, &RowLayout::default()).unwrap();
        let second = aggregate(&population, &registrations, &RowLayout::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_peak_year_first_wins_ties() {
        let yearly = vec![
            YearlyRegistrations {
                year: "2020".to_string(),
                phev: 2,
                bev: 1,
            },
            YearlyRegistrations {
                year: "2021".to_string(),
                phev: 0,
                bev: 3,
            },
        ];
        assert_eq!(peak_year(&yearly).map(|y| y.year.as_str()), Some("2020"));
        assert!(peak_year(&[]).is_none());
    }

    #[test]
    fn test_top_counties() {
        let percentages: BevPercentageByCounty = [
            ("King".to_string(), 2.5),
            ("Adams".to_string(), 0.1),
            ("San Juan".to_string(), 3.0),
        ]
        .into_iter()
        .collect();

        let top = top_counties(&percentages, 2);
        assert_eq!(top, vec![("San Juan", 3.0), ("King", 2.5)]);
    }
}
