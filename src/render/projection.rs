//! Conic equal-area (Albers) map projection.

use std::f64::consts::PI;

/// Albers projection parameterised the way web mapping libraries do it:
/// a centre in rotated coordinates, a longitude rotation, two standard
/// parallels, a scale factor and a pixel translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlbersProjection {
    n: f64,
    c: f64,
    r0: f64,
    scale: f64,
    translate: (f64, f64),
    rotate_lambda: f64,
    center: (f64, f64),
}

impl AlbersProjection {
    /// All angles in degrees.
    pub fn new(
        center: (f64, f64),
        rotate: f64,
        parallels: (f64, f64),
        scale: f64,
        translate: (f64, f64),
    ) -> Self {
        let sy0 = parallels.0.to_radians().sin();
        let n = (sy0 + parallels.1.to_radians().sin()) / 2.0;
        let c = 1.0 + sy0 * (2.0 * n - sy0);
        let r0 = c.sqrt() / n;

        let mut projection = Self {
            n,
            c,
            r0,
            scale,
            translate,
            rotate_lambda: rotate.to_radians(),
            center: (0.0, 0.0),
        };
        projection.center = projection.raw(center.0.to_radians(), center.1.to_radians());
        projection
    }

    /// Projection used for the Washington county map.
    pub fn washington(width: f64, height: f64) -> Self {
        Self::new(
            (0.0, 47.0),
            120.0,
            (45.0, 55.0),
            8000.0,
            (width / 2.0, height / 2.0),
        )
    }

    /// Project a longitude/latitude pair (degrees) to canvas pixels.
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let lambda = self.rotate(lon.to_radians());
        let (px, py) = self.raw(lambda, lat.to_radians());
        (
            self.translate.0 + self.scale * (px - self.center.0),
            self.translate.1 - self.scale * (py - self.center.1),
        )
    }

    /// Shift a longitude by the rotation, wrapped into `[-PI, PI]`.
    fn rotate(&self, lambda: f64) -> f64 {
        let lambda = lambda + self.rotate_lambda;
        if lambda > PI {
            lambda - 2.0 * PI
        } else if lambda < -PI {
            lambda + 2.0 * PI
        } else {
            lambda
        }
    }

    fn raw(&self, lambda: f64, phi: f64) -> (f64, f64) {
        let r = (self.c - 2.0 * self.n * phi.sin()).max(0.0).sqrt() / self.n;
        let angle = lambda * self.n;
        (r * angle.sin(), self.r0 - r * angle.cos())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_rotated_center_maps_to_translation() {
        let projection = AlbersProjection::washington(800.0, 450.0);
        let (x, y) = projection.project(-120.0, 47.0);
        assert!(close(x, 400.0), "x = {x}");
        assert!(close(y, 225.0), "y = {y}");
    }

    #[test]
    fn test_orientation() {
        let projection = AlbersProjection::washington(800.0, 450.0);
        let (seattle_x, seattle_y) = projection.project(-122.3321, 47.6062);
        let (spokane_x, spokane_y) = projection.project(-117.4260, 47.6588);

        // West is left, north is up.
        assert!(seattle_x < 400.0);
        assert!(spokane_x > 400.0);
        assert!(seattle_y < 225.0);
        assert!(spokane_y < 225.0);
        assert!(seattle_x > 0.0 && spokane_x < 800.0);
    }
}
