//! Chart render models and writers.
//!
//! Every chart is a pure function from a dataset and its view state
//! (brush range, visible types) to a [`ChartModel`]. Interactive controls
//! only ever update that view state.

pub mod axis;
pub mod bar;
pub mod choropleth;
pub mod model;
pub mod projection;
pub mod scale;
pub mod stacked;
pub mod svg;

pub use bar::{bar_chart, BrushFilter};
pub use choropleth::{county_map, county_shapes, CountyShape};
pub use model::{Canvas, ChartModel};
pub use stacked::{stacked_chart, TypeVisibility};
