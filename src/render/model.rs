//! Surface-independent description of a drawn chart.
//!
//! Chart builders produce a [`ChartModel`]; writers turn it into a
//! concrete document format.

use serde::Serialize;

/// Plot margins inside the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 20.0,
            bottom: 30.0,
            left: 40.0,
        }
    }
}

/// Canvas size and the plot area derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f64,
            height: height as f64,
            margin: Margin::default(),
        }
    }

    /// Width of the plot area.
    pub fn inner_width(&self) -> f64 {
        self.width - self.margin.left - self.margin.right
    }

    /// Height of the plot area.
    pub fn inner_height(&self) -> f64 {
        self.height - self.margin.top - self.margin.bottom
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(800, 450)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

/// Text styling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextStyle {
    pub anchor: Anchor,
    pub fill: String,
    pub size: f64,
    pub bold: bool,
    /// Rotation in degrees around the text origin.
    pub rotate: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            anchor: Anchor::Start,
            fill: "black".to_string(),
            size: 10.0,
            bold: false,
            rotate: 0.0,
        }
    }
}

/// A drawable primitive in absolute canvas coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Element {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        tooltip: Option<Tooltip>,
    },
    Path {
        d: String,
        fill: String,
        stroke: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        tooltip: Option<Tooltip>,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        fill: String,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke: String,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        style: TextStyle,
    },
}

impl Element {
    pub fn text(x: f64, y: f64, text: impl Into<String>, style: TextStyle) -> Self {
        Element::Text {
            x,
            y,
            text: text.into(),
            style,
        }
    }

    pub fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Element::Line {
            x1,
            y1,
            x2,
            y2,
            stroke: "currentColor".to_string(),
        }
    }

    #[cfg(test)]
    pub fn tooltip(&self) -> Option<&Tooltip> {
        match self {
            Element::Rect { tooltip, .. } | Element::Path { tooltip, .. } => tooltip.as_ref(),
            _ => None,
        }
    }
}

/// Hover text attached to a mark, one entry per line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tooltip {
    pub lines: Vec<String>,
}

impl Tooltip {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

/// A named group of elements (axis, bars, one stack layer, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    pub name: String,
    pub elements: Vec<Element>,
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: Vec::new(),
        }
    }

    pub fn push(&mut self, element: Element) {
        self.elements.push(element);
    }
}

/// Everything needed to draw one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartModel {
    pub width: f64,
    pub height: f64,
    pub layers: Vec<Layer>,
}

impl ChartModel {
    pub fn new(canvas: &Canvas) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            layers: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }
}
