//! SVG document output.
//!
//! Chart models are turned into an `svg` document tree: one group per
//! layer, tooltips as `<title>` children of their marks.

use super::model::{ChartModel, Element, TextStyle, Tooltip};
use svg::node::element::{Circle, Group, Line, Path, Rectangle, Text, Title};
use svg::Document;

/// Height of the title/description band above the chart.
pub const HEADER_HEIGHT: f64 = 60.0;

/// Render a slide: header text, then the chart if there is one.
///
/// Without a chart only the header is drawn, which is what a slide shows
/// before its data has loaded.
pub fn slide_document(
    title: &str,
    description: &str,
    chart: Option<&ChartModel>,
    width: f64,
    height: f64,
) -> String {
    let total_height = HEADER_HEIGHT + height;

    let mut document = Document::new()
        .set("width", width)
        .set("height", total_height)
        .set("viewBox", format!("0 0 {} {}", width, total_height))
        .set("font-family", "sans-serif")
        .add(Title::new(title))
        .add(
            Text::new(title)
                .set("x", 10)
                .set("y", 24)
                .set("font-size", 20)
                .set("font-weight", "bold"),
        )
        .add(
            Text::new(description)
                .set("x", 10)
                .set("y", 46)
                .set("font-size", 12)
                .set("fill", "dimgray"),
        );

    if let Some(chart) = chart {
        document = document.add(
            chart_group(chart)
                .set("class", "chart")
                .set("transform", format!("translate(0,{})", HEADER_HEIGHT)),
        );
    }

    document.to_string()
}

/// The chart's layers as nested SVG groups.
pub fn chart_group(chart: &ChartModel) -> Group {
    chart.layers.iter().fold(Group::new(), |group, layer| {
        let layer_group = layer
            .elements
            .iter()
            .fold(Group::new().set("class", layer.name.as_str()), add_element);
        group.add(layer_group)
    })
}

fn add_element(group: Group, element: &Element) -> Group {
    match element {
        Element::Rect {
            x,
            y,
            width,
            height,
            fill,
            tooltip,
        } => {
            let rect = Rectangle::new()
                .set("x", *x)
                .set("y", *y)
                .set("width", width.max(0.0))
                .set("height", height.max(0.0))
                .set("fill", fill.as_str());
            group.add(match tooltip {
                Some(tooltip) => rect.add(tooltip_title(tooltip)),
                None => rect,
            })
        }
        Element::Path {
            d,
            fill,
            stroke,
            tooltip,
        } => {
            let path = Path::new()
                .set("d", d.as_str())
                .set("fill", fill.as_str())
                .set("stroke", stroke.as_str());
            group.add(match tooltip {
                Some(tooltip) => path.add(tooltip_title(tooltip)),
                None => path,
            })
        }
        Element::Circle { cx, cy, r, fill } => group.add(
            Circle::new()
                .set("cx", *cx)
                .set("cy", *cy)
                .set("r", *r)
                .set("fill", fill.as_str()),
        ),
        Element::Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
        } => group.add(
            Line::new()
                .set("x1", *x1)
                .set("y1", *y1)
                .set("x2", *x2)
                .set("y2", *y2)
                .set("stroke", stroke.as_str()),
        ),
        Element::Text { x, y, text, style } => group.add(styled_text(*x, *y, text, style)),
    }
}

fn tooltip_title(tooltip: &Tooltip) -> Title {
    Title::new(tooltip.lines.join("\n"))
}

fn styled_text(x: f64, y: f64, text: &str, style: &TextStyle) -> Text {
    let mut node = Text::new(text)
        .set("x", x)
        .set("y", y)
        .set("text-anchor", style.anchor.as_str())
        .set("fill", style.fill.as_str())
        .set("font-size", style.size);
    if style.bold {
        node = node.set("font-weight", "bold");
    }
    if style.rotate != 0.0 {
        node = node.set(
            "transform",
            format!("rotate({} {} {})", style.rotate, x, y),
        );
    }
    node
}
