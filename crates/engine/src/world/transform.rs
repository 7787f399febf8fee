use serde::{Deserialize, Serialize};

use super::grid::{round_to, GridPoint, PixelPoint};

/// Substituted for a zero determinant so the inverse stays computable. The
/// resulting grid coordinates are huge but finite.
pub const DEGENERATE_DET_EPSILON: f64 = 1e-4;
pub const ZOOM_IN_FACTOR: f64 = 1.1;
pub const ZOOM_OUT_FACTOR: f64 = 0.9;

/// Unscaled linear part of the grid-to-pixel transform.
///
/// With the default basis grid `+x` runs right-down and grid `+y` runs
/// right-up on screen, so rows with larger `y` are farther from the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Basis {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl Default for Basis {
    fn default() -> Self {
        Self {
            a: 20.0,
            b: 20.0,
            c: 10.0,
            d: -10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PanGesture {
    origin_e: f64,
    origin_f: f64,
    reference_px: PixelPoint,
}

/// Affine map between grid space and pixel space.
///
/// `px = a·s·x + b·s·y + e`, `py = c·s·x + d·s·y + f` where `s` is `scale`.
/// The pixel offsets `(e, f)` are never scaled.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    base: Basis,
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
    scale: f64,
    pan: Option<PanGesture>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Basis::default(), 0.0, 0.0, 1.0)
    }
}

impl Transform {
    /// `base` is also the basis restored by [`Transform::reset_and_fit_to_window`].
    pub fn new(base: Basis, e: f64, f: f64, scale: f64) -> Self {
        Self {
            base,
            a: base.a,
            b: base.b,
            c: base.c,
            d: base.d,
            e,
            f,
            scale,
            pan: None,
        }
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    pub fn c(&self) -> f64 {
        self.c
    }

    pub fn d(&self) -> f64 {
        self.d
    }

    pub fn e(&self) -> f64 {
        self.e
    }

    pub fn f(&self) -> f64 {
        self.f
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn base(&self) -> Basis {
        self.base
    }

    pub fn set_basis(&mut self, basis: Basis) {
        self.a = basis.a;
        self.b = basis.b;
        self.c = basis.c;
        self.d = basis.d;
    }

    pub fn set_offset(&mut self, e: f64, f: f64) {
        self.e = e;
        self.f = f;
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    /// Scaled linear part `(A, B, C, D)`.
    pub fn linear(&self) -> (f64, f64, f64, f64) {
        (
            self.a * self.scale,
            self.b * self.scale,
            self.c * self.scale,
            self.d * self.scale,
        )
    }

    /// Determinant of the scaled linear part, with zero replaced by
    /// [`DEGENERATE_DET_EPSILON`].
    pub fn determinant(&self) -> f64 {
        let (a, b, c, d) = self.linear();
        let det = a * d - b * c;
        if det == 0.0 {
            DEGENERATE_DET_EPSILON
        } else {
            det
        }
    }

    pub fn to_pixel(&self, point: GridPoint) -> PixelPoint {
        let (a, b, c, d) = self.linear();
        PixelPoint::new(
            a * point.x + b * point.y + self.e,
            c * point.x + d * point.y + self.f,
        )
    }

    /// Inverse of [`Transform::to_pixel`], rounded to `precision` decimal
    /// places (0 yields whole tiles).
    pub fn to_grid(&self, pixel: PixelPoint, precision: u32) -> GridPoint {
        let (a, b, c, d) = self.linear();
        let det = self.determinant();
        let dx = pixel.x - self.e;
        let dy = pixel.y - self.f;
        let gx = (d * dx - b * dy) / det;
        let gy = (-c * dx + a * dy) / det;
        GridPoint::new(round_to(gx, precision), round_to(gy, precision))
    }

    pub fn zoom_in(&mut self) {
        self.scale *= ZOOM_IN_FACTOR;
    }

    pub fn zoom_out(&mut self) {
        self.scale *= ZOOM_OUT_FACTOR;
    }

    /// Positive steps zoom in, negative steps zoom out.
    pub fn apply_zoom_steps(&mut self, steps: i32) {
        for _ in 0..steps.unsigned_abs() {
            if steps > 0 {
                self.zoom_in();
            } else {
                self.zoom_out();
            }
        }
    }

    pub fn is_panning(&self) -> bool {
        self.pan.is_some()
    }

    pub fn start_pan(&mut self, pointer_px: PixelPoint) {
        self.pan = Some(PanGesture {
            origin_e: self.e,
            origin_f: self.f,
            reference_px: pointer_px,
        });
    }

    /// Drags the offset with the pointer. No-op unless a pan is in progress.
    pub fn pan(&mut self, pointer_px: PixelPoint) {
        let Some(gesture) = self.pan else {
            return;
        };
        self.e = gesture.origin_e + (pointer_px.x - gesture.reference_px.x);
        self.f = gesture.origin_f + (pointer_px.y - gesture.reference_px.y);
    }

    /// Ends the gesture; the current `(e, f)` becomes the origin of the next.
    pub fn stop_pan(&mut self) {
        self.pan = None;
    }

    /// Restores the base basis, centres the origin in the window and picks the
    /// largest scale that keeps a `grid_extent`-sided grid plus `margin_px`
    /// inside the window.
    ///
    /// The extent on each axis is the bounding box of all four transformed
    /// grid corners, not the image of the far corner `(N, N)` alone. With the
    /// default basis `(N, N)` lands at pixel `y = 0`, so the single corner
    /// would report no vertical extent at all.
    pub fn reset_and_fit_to_window(
        &mut self,
        window_size: (u32, u32),
        grid_extent: f64,
        margin_px: f64,
    ) {
        self.set_basis(self.base);
        self.pan = None;
        let (width, height) = (window_size.0 as f64, window_size.1 as f64);
        self.e = width / 2.0;
        self.f = height / 2.0;

        let (size_x, size_y) = self.unscaled_extent(grid_extent);
        let fit_x = fit_ratio(width, size_x + margin_px);
        let fit_y = fit_ratio(height, size_y + margin_px);
        let scale = fit_x.min(fit_y);
        if scale.is_finite() {
            self.scale = scale;
        }
    }

    /// Bounding box of the unscaled linear map applied to the corners of the
    /// `extent × extent` grid square.
    fn unscaled_extent(&self, extent: f64) -> (f64, f64) {
        let corners = [(0.0, 0.0), (extent, 0.0), (0.0, extent), (extent, extent)];
        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for (x, y) in corners {
            let px = self.a * x + self.b * y;
            let py = self.c * x + self.d * y;
            min_x = min_x.min(px);
            max_x = max_x.max(px);
            min_y = min_y.min(py);
            max_y = max_y.max(py);
        }
        (max_x - min_x, max_y - min_y)
    }
}

fn fit_ratio(available: f64, needed: f64) -> f64 {
    if needed > 0.0 {
        available / needed
    } else {
        f64::INFINITY
    }
}
