//! Axis construction for the bar charts.

use super::model::{Anchor, Canvas, Element, Layer, TextStyle};
use super::scale::{BandScale, LinearScale};

const TICK_SIZE: f64 = 6.0;

/// Category axis along the bottom of the plot area.
pub fn bottom_axis(x: &BandScale, canvas: &Canvas) -> Layer {
    let mut layer = Layer::new("axis-x");
    let left = canvas.margin.left;
    let baseline = canvas.margin.top + canvas.inner_height();

    layer.push(Element::line(left, baseline, left + canvas.inner_width(), baseline));

    for label in x.domain() {
        let Some(pos) = x.position(label) else {
            continue;
        };
        let cx = left + pos + x.bandwidth() / 2.0;
        layer.push(Element::line(cx, baseline, cx, baseline + TICK_SIZE));
        layer.push(Element::text(
            cx,
            baseline + TICK_SIZE + 12.0,
            label.clone(),
            TextStyle {
                anchor: Anchor::Middle,
                ..TextStyle::default()
            },
        ));
    }

    layer
}

/// Value axis along the left of the plot area, with a rotated title.
pub fn left_axis(y: &LinearScale, canvas: &Canvas, title: &str) -> Layer {
    let mut layer = Layer::new("axis-y");
    let left = canvas.margin.left;
    let top = canvas.margin.top;

    layer.push(Element::line(left, top, left, top + canvas.inner_height()));

    for tick in y.ticks(10) {
        let ty = top + y.scale(tick);
        layer.push(Element::line(left - TICK_SIZE, ty, left, ty));
        layer.push(Element::text(
            left - TICK_SIZE - 3.0,
            ty + 3.0,
            format_tick(tick),
            TextStyle {
                anchor: Anchor::End,
                ..TextStyle::default()
            },
        ));
    }

    layer.push(Element::text(
        left + 6.0,
        top + 9.0,
        title,
        TextStyle {
            anchor: Anchor::End,
            rotate: -90.0,
            ..TextStyle::default()
        },
    ));

    layer
}

/// Tick label with thousands separators, e.g. `12,000`.
pub fn format_tick(value: f64) -> String {
    if value.fract() != 0.0 {
        return format!("{}", value);
    }

    let digits = (value.abs() as u64).to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if value < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
