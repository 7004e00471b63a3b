//! Slide 1: registrations per model year, stacked by vehicle type.

use super::axis::{bottom_axis, left_axis};
use super::model::{Anchor, Canvas, ChartModel, Element, Layer, TextStyle, Tooltip};
use super::scale::{BandScale, LinearScale};
use crate::analysis::peak_year;
use crate::models::{EvType, YearlyRegistrations};

/// Stack order, bottom to top.
pub const STACK_ORDER: [EvType; 2] = [EvType::Phev, EvType::Bev];

/// Fill colour of a vehicle type's layer.
pub fn layer_color(ev_type: EvType) -> &'static str {
    match ev_type {
        EvType::Phev => "#ff8c00",
        EvType::Bev => "#6b486b",
        EvType::Other => "gray",
    }
}

/// Show/hide state of the two type toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeVisibility {
    pub phev: bool,
    pub bev: bool,
}

impl Default for TypeVisibility {
    fn default() -> Self {
        Self {
            phev: true,
            bev: true,
        }
    }
}

impl TypeVisibility {
    pub fn is_visible(&self, ev_type: EvType) -> bool {
        match ev_type {
            EvType::Phev => self.phev,
            EvType::Bev => self.bev,
            EvType::Other => false,
        }
    }

    pub fn toggle(&mut self, ev_type: EvType) {
        match ev_type {
            EvType::Phev => self.phev = !self.phev,
            EvType::Bev => self.bev = !self.bev,
            EvType::Other => {}
        }
    }

    /// Visible types in stack order.
    pub fn keys(&self) -> Vec<EvType> {
        STACK_ORDER
            .iter()
            .copied()
            .filter(|t| self.is_visible(*t))
            .collect()
    }
}

/// One year's slice of a stack layer: `[lower, upper)` in registrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSegment {
    pub year: String,
    pub lower: u64,
    pub upper: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackLayer {
    pub key: EvType,
    pub segments: Vec<StackSegment>,
}

/// Stack the given keys on top of each other for every year.
pub fn stack(data: &[YearlyRegistrations], keys: &[EvType]) -> Vec<StackLayer> {
    let mut baseline = vec![0u64; data.len()];

    keys.iter()
        .map(|&key| {
            let segments = data
                .iter()
                .zip(baseline.iter_mut())
                .map(|(d, base)| {
                    let lower = *base;
                    *base += d.count(key);
                    StackSegment {
                        year: d.year.clone(),
                        lower,
                        upper: *base,
                    }
                })
                .collect();
            StackLayer { key, segments }
        })
        .collect()
}

/// Build the stacked chart for the visible types.
pub fn stacked_chart(
    data: &[YearlyRegistrations],
    canvas: &Canvas,
    visibility: &TypeVisibility,
) -> ChartModel {
    let keys = visibility.keys();
    let width = canvas.inner_width();
    let height = canvas.inner_height();

    let x = BandScale::new(data.iter().map(|d| d.year.clone()).collect(), 0.0, width, 0.1);
    let visible_total = |d: &YearlyRegistrations| keys.iter().map(|k| d.count(*k)).sum::<u64>();
    let max_total = data.iter().map(visible_total).max().unwrap_or(0);
    let y = LinearScale::new((0.0, max_total as f64), (height, 0.0));

    let mut chart = ChartModel::new(canvas);
    chart.layers.push(bottom_axis(&x, canvas));
    chart.layers.push(left_axis(&y, canvas, "Registrations"));

    for stacked in stack(data, &keys) {
        let mut layer = Layer::new(format!("layer-{}", stacked.key));
        for (segment, d) in stacked.segments.iter().zip(data) {
            let Some(bx) = x.position(&segment.year) else {
                continue;
            };
            let top = y.scale(segment.upper as f64);
            let bottom = y.scale(segment.lower as f64);
            layer.push(Element::Rect {
                x: canvas.margin.left + bx,
                y: canvas.margin.top + top,
                width: x.bandwidth(),
                height: bottom - top,
                fill: layer_color(stacked.key).to_string(),
                tooltip: Some(Tooltip::new([
                    format!("Year: {}", d.year),
                    format!("PHEV: {}", d.phev),
                    format!("BEV: {}", d.bev),
                    format!("Total: {}", d.total()),
                ])),
            });
        }
        chart.layers.push(layer);
    }

    if let Some(peak) = peak_year(data) {
        chart
            .layers
            .push(peak_annotation(peak, &x, &y, canvas, visible_total(peak)));
    }
    chart.layers.push(legend(canvas, visibility));

    chart
}

/// Red label beside the year with the most registrations.
fn peak_annotation(
    peak: &YearlyRegistrations,
    x: &BandScale,
    y: &LinearScale,
    canvas: &Canvas,
    visible_total: u64,
) -> Layer {
    let mut layer = Layer::new("annotation");
    let Some(bx) = x.position(&peak.year) else {
        return layer;
    };

    let ax = canvas.margin.left + bx + x.bandwidth() + 25.0;
    let ay = canvas.margin.top + y.scale(visible_total as f64) + 30.0;
    let style = TextStyle {
        anchor: Anchor::Middle,
        fill: "red".to_string(),
        size: 12.0,
        ..TextStyle::default()
    };

    layer.push(Element::text(
        ax,
        ay - 6.0,
        format!("Year: {}", peak.year),
        TextStyle {
            bold: true,
            ..style.clone()
        },
    ));
    layer.push(Element::text(ax, ay + 12.0, format!("BEV: {}", peak.bev), style));
    layer
}

/// Colour key with the toggle state of each type.
fn legend(canvas: &Canvas, visibility: &TypeVisibility) -> Layer {
    let mut layer = Layer::new("legend");
    let lx = canvas.width - 110.0;

    for (row, ev_type) in STACK_ORDER.iter().enumerate() {
        let ly = canvas.margin.top + row as f64 * 20.0;
        let color = layer_color(*ev_type);
        let mark = if visibility.is_visible(*ev_type) {
            "[x]"
        } else {
            "[ ]"
        };

        layer.push(Element::Rect {
            x: lx,
            y: ly,
            width: 10.0,
            height: 10.0,
            fill: color.to_string(),
            tooltip: None,
        });
        layer.push(Element::text(
            lx + 16.0,
            ly + 9.0,
            format!("{} {}", mark, ev_type),
            TextStyle {
                fill: color.to_string(),
                size: 12.0,
                ..TextStyle::default()
            },
        ));
    }

    layer
}
