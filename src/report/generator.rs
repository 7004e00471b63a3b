//! Markdown and JSON data reports.
//!
//! A report carries the same aggregated data the slides are drawn from,
//! laid out as tables instead of charts.

use crate::analysis::{peak_year, top_counties};
use crate::models::{CountyShare, Report, ReportMetadata, SlideDatasets, YearlyRegistrations};
use anyhow::Result;

/// Number of counties listed in the ranking table.
pub const TOP_COUNTY_COUNT: usize = 10;

/// Assemble a report from one load's aggregated datasets.
pub fn build_report(datasets: &SlideDatasets, metadata: ReportMetadata) -> Report {
    let top = top_counties(&datasets.bev_percentage_by_county, TOP_COUNTY_COUNT)
        .into_iter()
        .map(|(county, percentage)| CountyShare {
            county: county.to_string(),
            bev: datasets
                .registrations_by_county
                .get(county)
                .map(|c| c.bev)
                .unwrap_or(0),
            population: datasets
                .population_by_county
                .get(county)
                .copied()
                .unwrap_or(0.0),
            percentage,
        })
        .collect();

    Report {
        metadata,
        yearly: datasets.yearly.clone(),
        peak_year: peak_year(&datasets.yearly).cloned(),
        total_registrations: datasets.recognized_registrations(),
        top_counties: top,
        bev_percentage_by_county: datasets.bev_percentage_by_county.clone(),
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("# Washington EV Registrations\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_section(report));
    output.push_str(&generate_yearly_section(&report.yearly));
    output.push_str(&generate_county_section(&report.top_counties));
    output.push_str(&generate_footer());

    output
}

fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Population Source:** {}\n", metadata.population_url));
    section.push_str(&format!(
        "- **Registration Source:** {}\n",
        metadata.registrations_url
    ));
    section.push_str(&format!(
        "- **Population Records:** {}\n",
        metadata.population_records
    ));
    section.push_str(&format!(
        "- **Registration Rows:** {}\n",
        metadata.registration_rows
    ));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

fn generate_summary_section(report: &Report) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str(&format!(
        "- **PHEV and BEV Registrations:** {}\n",
        report.total_registrations
    ));
    section.push_str(&format!("- **Model Years:** {}\n", report.yearly.len()));
    match report.peak_year {
        Some(ref peak) => section.push_str(&format!(
            "- **Peak Year:** {} ({} registrations)\n",
            peak.year,
            peak.total()
        )),
        None => section.push_str("- **Peak Year:** none\n"),
    }
    section.push('\n');

    section
}

fn generate_yearly_section(yearly: &[YearlyRegistrations]) -> String {
    let mut section = String::new();

    section.push_str("## Registrations by Model Year\n\n");
    if yearly.is_empty() {
        section.push_str("No registrations.\n\n");
        return section;
    }

    section.push_str("| Year | PHEV | BEV | Total |\n");
    section.push_str("|------|------|-----|-------|\n");
    for entry in yearly {
        let year = if entry.year.is_empty() {
            "(unknown)"
        } else {
            entry.year.as_str()
        };
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            year,
            entry.phev,
            entry.bev,
            entry.total()
        ));
    }
    section.push('\n');

    section
}

fn generate_county_section(counties: &[CountyShare]) -> String {
    let mut section = String::new();

    section.push_str("## BEV Share by County\n\n");
    if counties.is_empty() {
        section.push_str("No county data.\n\n");
        return section;
    }

    section.push_str("| County | BEV | Population | BEV % |\n");
    section.push_str("|--------|-----|------------|-------|\n");
    for share in counties {
        section.push_str(&format!(
            "| {} | {} | {} | {:.2}% |\n",
            share.county, share.bev, share.population, share.percentage
        ));
    }
    section.push('\n');

    section
}

fn generate_footer() -> String {
    format!(
        "---\n\n*Report generated by evslides v{}*\n",
        env!("CARGO_PKG_VERSION")
    )
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
