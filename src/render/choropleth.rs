//! Slide 2: county map shaded by BEV share of population.

use super::model::{Canvas, ChartModel, Element, Layer, TextStyle, Tooltip};
use super::projection::AlbersProjection;
use super::scale::SequentialScale;
use crate::models::BevPercentageByCounty;
use geojson::{FeatureCollection, Value as GeoValue};
use serde_json::Value;
use tracing::debug;

/// Seattle city centre, for the map annotation.
pub const SEATTLE: (f64, f64) = (-122.3321, 47.6062);

/// A county outline: outer and inner rings as longitude/latitude pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct CountyShape {
    pub name: String,
    pub rings: Vec<Vec<(f64, f64)>>,
}

/// Keep the features of one state and flatten their polygons into rings.
///
/// Features without a name or a polygonal geometry are skipped.
pub fn county_shapes(collection: &FeatureCollection, state_fips: &str) -> Vec<CountyShape> {
    let shapes: Vec<CountyShape> = collection
        .features
        .iter()
        .filter(|f| f.property("STATE").map(property_text).as_deref() == Some(state_fips))
        .filter_map(|f| {
            let name = f.property("NAME").map(property_text)?;
            let geometry = f.geometry.as_ref()?;
            let polygons = match &geometry.value {
                GeoValue::Polygon(rings) => vec![rings.clone()],
                GeoValue::MultiPolygon(polygons) => polygons.clone(),
                _ => return None,
            };
            let rings = polygons
                .into_iter()
                .flatten()
                .map(|ring| {
                    ring.into_iter()
                        .filter(|pos| pos.len() >= 2)
                        .map(|pos| (pos[0], pos[1]))
                        .collect()
                })
                .collect();
            Some(CountyShape { name, rings })
        })
        .collect();

    debug!("{} county shapes for state {}", shapes.len(), state_fips);
    shapes
}

fn property_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// SVG path data for a shape's rings under a projection.
pub fn shape_path(shape: &CountyShape, projection: &AlbersProjection) -> String {
    let mut d = String::new();
    for ring in &shape.rings {
        for (i, (lon, lat)) in ring.iter().enumerate() {
            let (x, y) = projection.project(*lon, *lat);
            d.push(if i == 0 { 'M' } else { 'L' });
            d.push_str(&format!("{:.2},{:.2}", x, y));
        }
        if !ring.is_empty() {
            d.push('Z');
        }
    }
    d
}

/// Colour scale spanning `[0, max percentage]`.
pub fn color_scale(data: &BevPercentageByCounty) -> SequentialScale {
    let max = data.values().copied().fold(0.0, f64::max);
    SequentialScale::new(max)
}

/// Build the choropleth. Counties missing from `data` are shaded as 0.
pub fn county_map(
    data: &BevPercentageByCounty,
    shapes: &[CountyShape],
    canvas: &Canvas,
) -> ChartModel {
    let projection = AlbersProjection::washington(canvas.width, canvas.height);
    let color = color_scale(data);

    let mut chart = ChartModel::new(canvas);

    let mut counties = Layer::new("counties");
    for shape in shapes {
        let percentage = data.get(&shape.name).copied().unwrap_or(0.0);
        counties.push(Element::Path {
            d: shape_path(shape, &projection),
            fill: color.color(percentage),
            stroke: "white".to_string(),
            tooltip: Some(Tooltip::new([
                format!("County: {}", shape.name),
                format!("BEV Percentage: {:.2}%", percentage),
            ])),
        });
    }
    chart.layers.push(counties);

    let mut annotation = Layer::new("annotation");
    let (sx, sy) = projection.project(SEATTLE.0, SEATTLE.1);
    annotation.push(Element::Circle {
        cx: sx,
        cy: sy,
        r: 5.0,
        fill: "red".to_string(),
    });
    annotation.push(Element::text(
        sx + 10.0,
        sy + 5.0,
        "Seattle",
        TextStyle {
            size: 12.0,
            bold: true,
            ..TextStyle::default()
        },
    ));
    chart.layers.push(annotation);

    chart
}
