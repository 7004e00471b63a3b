//! Slide 0: total registrations per model year, with a brush filter.

use super::axis::{bottom_axis, left_axis};
use super::model::{Anchor, Canvas, ChartModel, Element, Layer, TextStyle, Tooltip};
use super::scale::{BandScale, LinearScale};
use crate::models::YearlyRegistrations;
use tracing::debug;

pub const BAR_FILL: &str = "steelblue";

/// Year range selected by brushing the bar chart.
///
/// Brushing narrows the currently visible years; reset shows everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrushFilter {
    range: Option<(String, String)>,
}

impl BrushFilter {
    pub fn range(&self) -> Option<(&str, &str)> {
        self.range
            .as_ref()
            .map(|(from, to)| (from.as_str(), to.as_str()))
    }

    /// Entries whose year falls in the selected range (string comparison).
    pub fn apply(&self, data: &[YearlyRegistrations]) -> Vec<YearlyRegistrations> {
        match self.range {
            Some((ref from, ref to)) => data
                .iter()
                .filter(|d| d.year.as_str() >= from.as_str() && d.year.as_str() <= to.as_str())
                .cloned()
                .collect(),
            None => data.to_vec(),
        }
    }

    /// Apply a brush gesture over the plot. An empty selection changes nothing.
    pub fn brush(
        &mut self,
        data: &[YearlyRegistrations],
        plot_width: f64,
        selection: Option<(f64, f64)>,
    ) {
        let Some(selection) = selection else {
            return;
        };

        let domain: Vec<String> = self.apply(data).into_iter().map(|d| d.year).collect();
        if let Some(range) = selection_to_years(&domain, plot_width, selection) {
            debug!("Brushed years {} to {}", range.0, range.1);
            self.range = Some(range);
        }
    }

    pub fn reset(&mut self) {
        self.range = None;
    }
}

/// Map a pixel selection onto the years under it.
///
/// Each year owns an equal slice `plot_width / n` of the plot; positions
/// past the last slice clamp to the last year.
pub fn selection_to_years(
    domain: &[String],
    plot_width: f64,
    (x0, x1): (f64, f64),
) -> Option<(String, String)> {
    if domain.is_empty() || plot_width <= 0.0 {
        return None;
    }

    let slice = plot_width / domain.len() as f64;
    let index = |px: f64| ((px.max(0.0) / slice).floor() as usize).min(domain.len() - 1);

    let (lo, hi) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
    Some((domain[index(lo)].clone(), domain[index(hi)].clone()))
}

/// Build the bar chart for the years the filter lets through.
pub fn bar_chart(data: &[YearlyRegistrations], canvas: &Canvas, filter: &BrushFilter) -> ChartModel {
    let visible = filter.apply(data);
    let width = canvas.inner_width();
    let height = canvas.inner_height();

    let x = BandScale::new(
        visible.iter().map(|d| d.year.clone()).collect(),
        0.0,
        width,
        0.1,
    );
    let max_total = visible.iter().map(|d| d.total()).max().unwrap_or(0);
    let y = LinearScale::new((0.0, max_total as f64), (height, 0.0));

    let mut chart = ChartModel::new(canvas);
    chart.layers.push(bottom_axis(&x, canvas));
    chart.layers.push(left_axis(&y, canvas, "Registrations"));

    let mut bars = Layer::new("bars");
    for d in &visible {
        let Some(bx) = x.position(&d.year) else {
            continue;
        };
        let top = y.scale(d.total() as f64);
        bars.push(Element::Rect {
            x: canvas.margin.left + bx,
            y: canvas.margin.top + top,
            width: x.bandwidth(),
            height: height - top,
            fill: BAR_FILL.to_string(),
            tooltip: Some(Tooltip::new([
                format!("Year: {}", d.year),
                format!("Total: {}", d.total()),
            ])),
        });
    }
    chart.layers.push(bars);

    chart.layers.push(reset_control(canvas, filter));
    chart
}

fn reset_control(canvas: &Canvas, filter: &BrushFilter) -> Layer {
    let mut layer = Layer::new("reset");
    let x = canvas.inner_width() - 50.0;
    let y = canvas.margin.top + 10.0;

    layer.push(Element::Rect {
        x,
        y,
        width: 100.0,
        height: 20.0,
        fill: "lightgray".to_string(),
        tooltip: None,
    });
    layer.push(Element::text(
        x + 50.0,
        y + 14.0,
        "Reset Filter",
        TextStyle {
            anchor: Anchor::Middle,
            ..TextStyle::default()
        },
    ));

    if let Some((from, to)) = filter.range() {
        layer.push(Element::text(
            x + 50.0,
            y + 34.0,
            format!("Showing {} to {}", from, to),
            TextStyle {
                anchor: Anchor::Middle,
                fill: "dimgray".to_string(),
                ..TextStyle::default()
            },
        ));
    }

    layer
}
