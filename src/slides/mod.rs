//! Slide deck state and navigation.
//!
//! The deck starts with three placeholder slides (title and description,
//! no data). A successful load fills every slide at once; a failed one
//! leaves the placeholders in place. Navigation cycles through the slides
//! and re-renders the current one on every step.

use crate::models::{BevPercentageByCounty, SlideDatasets, YearlyRegistrations};
use crate::render::svg::slide_document;
use crate::render::{
    bar_chart, county_map, stacked_chart, BrushFilter, Canvas, ChartModel, CountyShape,
    TypeVisibility,
};
use serde::Serialize;
use tracing::debug;

pub const SLIDE_COUNT: usize = 3;

/// Data attached to a slide once loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SlideData {
    Yearly(Vec<YearlyRegistrations>),
    CountyShare(BevPercentageByCounty),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slide {
    pub title: &'static str,
    pub description: &'static str,
    pub data: Option<SlideData>,
}

fn placeholder_slides() -> [Slide; SLIDE_COUNT] {
    [
        Slide {
            title: "Electric Car Registrations Over Time",
            description: "This chart shows the trends in electric car registrations over time.",
            data: None,
        },
        Slide {
            title: "Electric Car Registrations by Type",
            description: "This chart shows the trends in electric car registrations by type. \
                Types include Plug-in Hybrid Electric Vehicle (PHEV) and Battery Electric Vehicle (BEV).",
            data: None,
        },
        Slide {
            title: "Battery Electric Vehicle Dominance by County",
            description: "This map shows the proportion of battery powered electric vehicle \
                registrations per county population.",
            data: None,
        },
    ]
}

/// Interactive state of the charts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub brush: BrushFilter,
    pub visibility: TypeVisibility,
}

/// A slide drawn for display.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSlide {
    pub index: usize,
    pub title: &'static str,
    pub description: &'static str,
    pub chart: Option<ChartModel>,
    canvas: Canvas,
}

impl RenderedSlide {
    pub fn to_svg(&self) -> String {
        slide_document(
            self.title,
            self.description,
            self.chart.as_ref(),
            self.canvas.width,
            self.canvas.height,
        )
    }
}

/// The slideshow: slides, current position and chart view state.
#[derive(Debug, Clone)]
pub struct SlideDeck {
    slides: [Slide; SLIDE_COUNT],
    index: usize,
    canvas: Canvas,
    view: ViewState,
    shapes: Vec<CountyShape>,
}

impl SlideDeck {
    /// A deck of placeholder slides positioned on the first one.
    pub fn new(canvas: Canvas) -> Self {
        Self {
            slides: placeholder_slides(),
            index: 0,
            canvas,
            view: ViewState::default(),
            shapes: Vec::new(),
        }
    }

    /// Attach the datasets of a successful load to every slide.
    pub fn load(&mut self, datasets: &SlideDatasets) {
        self.slides[0].data = Some(SlideData::Yearly(datasets.yearly.clone()));
        self.slides[1].data = Some(SlideData::Yearly(datasets.yearly.clone()));
        self.slides[2].data = Some(SlideData::CountyShare(
            datasets.bev_percentage_by_county.clone(),
        ));
        self.view = ViewState::default();
        debug!("Slide deck loaded with {} years", datasets.yearly.len());
    }

    #[cfg(test)]
    pub fn is_loaded(&self) -> bool {
        self.slides.iter().all(|s| s.data.is_some())
    }

    /// County outlines for the map slide.
    pub fn set_boundaries(&mut self, shapes: Vec<CountyShape>) {
        self.shapes = shapes;
    }

    #[cfg(test)]
    pub fn index(&self) -> usize {
        self.index
    }

    #[cfg(test)]
    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    /// Jump to a slide; out-of-range indices wrap around.
    pub fn go_to(&mut self, index: usize) -> RenderedSlide {
        self.index = index % SLIDE_COUNT;
        self.render_current()
    }

    pub fn next(&mut self) -> RenderedSlide {
        self.index = (self.index + 1) % SLIDE_COUNT;
        self.render_current()
    }

    pub fn prev(&mut self) -> RenderedSlide {
        self.index = (self.index + SLIDE_COUNT - 1) % SLIDE_COUNT;
        self.render_current()
    }

    /// Apply a brush gesture to the bar chart.
    pub fn brush(&mut self, selection: Option<(f64, f64)>) {
        if let Some(SlideData::Yearly(ref data)) = self.slides[0].data {
            self.view
                .brush
                .brush(data, self.canvas.inner_width(), selection);
        }
    }

    /// Clear the bar chart's brush so every year shows again.
    pub fn reset_brush(&mut self) {
        self.view.brush.reset();
    }

    pub fn render_current(&self) -> RenderedSlide {
        self.render(self.index)
    }

    /// Draw one slide from scratch.
    pub fn render(&self, index: usize) -> RenderedSlide {
        let index = index % SLIDE_COUNT;
        let slide = &self.slides[index];
        let chart = slide.data.as_ref().map(|data| match data {
            SlideData::Yearly(yearly) if index == 0 => {
                bar_chart(yearly, &self.canvas, &self.view.brush)
            }
            SlideData::Yearly(yearly) => {
                stacked_chart(yearly, &self.canvas, &self.view.visibility)
            }
            SlideData::CountyShare(share) => county_map(share, &self.shapes, &self.canvas),
        });

        debug!(
            "Rendered slide {} ({})",
            index,
            if chart.is_some() { "chart" } else { "placeholder" }
        );

        RenderedSlide {
            index,
            title: slide.title,
            description: slide.description,
            chart,
            canvas: self.canvas,
        }
    }

    /// Draw every slide in order.
    pub fn render_all(&self) -> Vec<RenderedSlide> {
        (0..SLIDE_COUNT).map(|i| self.render(i)).collect()
    }
}
