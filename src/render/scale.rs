//! Scales mapping data values to canvas positions and colours.
//!
//! The arithmetic follows the conventions of common web charting
//! libraries (rounded band ranges, nice linear ticks, B-spline colour
//! ramps) so the charts line up with what the browser slideshow drew.

/// Ordinal band scale over a list of labels, with a rounded range.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    domain: Vec<String>,
    start: f64,
    step: f64,
    bandwidth: f64,
}

impl BandScale {
    /// Build a band scale spanning `[range_start, range_stop]` with equal
    /// inner and outer padding, centred in the range.
    pub fn new(domain: Vec<String>, range_start: f64, range_stop: f64, padding: f64) -> Self {
        let n = domain.len() as f64;
        let span = range_stop - range_start;

        let step = (span / (n - padding + 2.0 * padding).max(1.0)).floor();
        let start = (range_start + (span - step * (n - padding)) * 0.5).round();
        let bandwidth = (step * (1.0 - padding)).round();

        Self {
            domain,
            start,
            step,
            bandwidth,
        }
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Left edge of the band for `label`, if it is in the domain.
    pub fn position(&self, label: &str) -> Option<f64> {
        self.domain
            .iter()
            .position(|d| d == label)
            .map(|i| self.start + self.step * i as f64)
    }
}

/// Linear scale with a rounded output range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Map a value; a degenerate domain maps everything to the middle of the range.
    pub fn scale(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let t = if d1 == d0 {
            0.5
        } else {
            (value - d0) / (d1 - d0)
        };
        (r0 + t * (r1 - r0)).round()
    }

    /// Roughly `count` evenly spaced round values covering the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (start, stop) = self.domain;
        if start == stop {
            return vec![start];
        }
        let (lo, hi) = if start < stop {
            (start, stop)
        } else {
            (stop, start)
        };

        let step = tick_step(lo, hi, count.max(1));
        if !(step > 0.0) || !step.is_finite() {
            return Vec::new();
        }

        let first = (lo / step).ceil() as i64;
        let last = (hi / step).floor() as i64;
        (first..=last).map(|i| i as f64 * step).collect()
    }
}

fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    let raw = (stop - start) / count as f64;
    let power = raw.log10().floor();
    let base = 10f64.powf(power);
    let error = raw / base;

    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };

    factor * base
}

/// Nine-step Oranges scheme, light to dark.
const ORANGES: [&str; 9] = [
    "#fff5eb", "#fee6ce", "#fdd0a2", "#fdae6b", "#fd8d3c", "#f16913", "#d94801", "#a63603",
    "#7f2704",
];

/// Sequential colour scale over `[0, max]` using the Oranges ramp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequentialScale {
    max: f64,
}

impl SequentialScale {
    pub fn new(max: f64) -> Self {
        Self { max }
    }

    /// Colour for `value` as `#rrggbb`.
    pub fn color(&self, value: f64) -> String {
        let t = if self.max == 0.0 || !self.max.is_finite() {
            0.5
        } else {
            value / self.max
        };
        interpolate_oranges(t)
    }
}

/// Uniform B-spline through the Oranges stops, `t` clamped to `[0, 1]`.
pub fn interpolate_oranges(t: f64) -> String {
    let stops: Vec<[f64; 3]> = ORANGES.iter().map(|hex| parse_hex(hex)).collect();
    let n = stops.len() - 1;

    let (t, i) = if t.is_nan() || t <= 0.0 {
        (0.0, 0)
    } else if t >= 1.0 {
        (1.0, n - 1)
    } else {
        (t, (t * n as f64).floor() as usize)
    };

    let local = (t - i as f64 / n as f64) * n as f64;
    let mut rgb = [0u8; 3];

    for (c, out) in rgb.iter_mut().enumerate() {
        let v1 = stops[i][c];
        let v2 = stops[i + 1][c];
        let v0 = if i > 0 { stops[i - 1][c] } else { 2.0 * v1 - v2 };
        let v3 = if i < n - 1 {
            stops[i + 2][c]
        } else {
            2.0 * v2 - v1
        };
        *out = basis(local, v0, v1, v2, v3).round().clamp(0.0, 255.0) as u8;
    }

    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

fn basis(t: f64, v0: f64, v1: f64, v2: f64, v3: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    ((1.0 - 3.0 * t + 3.0 * t2 - t3) * v0
        + (4.0 - 6.0 * t2 + 3.0 * t3) * v1
        + (1.0 + 3.0 * t + 3.0 * t2 - 3.0 * t3) * v2
        + t3 * v3)
        / 6.0
}

fn parse_hex(hex: &str) -> [f64; 3] {
    let channel = |at: usize| {
        hex.get(at..at + 2)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .unwrap_or(0) as f64
    };
    [channel(1), channel(3), channel(5)]
}
