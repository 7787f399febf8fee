use crate::world::PixelPoint;

pub type Rgba = [u8; 4];

/// Minimal raster surface the world painter draws through.
pub trait Canvas {
    fn size(&self) -> (u32, u32);
    fn clear(&mut self, color: Rgba);
    fn fill_polygon(&mut self, points: &[PixelPoint], color: Rgba);
    fn draw_line(&mut self, from: PixelPoint, to: PixelPoint, color: Rgba);

    /// Closed outline through `points`.
    fn stroke_polygon(&mut self, points: &[PixelPoint], color: Rgba) {
        if points.len() < 2 {
            return;
        }
        for (index, from) in points.iter().enumerate() {
            let to = points[(index + 1) % points.len()];
            self.draw_line(*from, to, color);
        }
    }
}

/// RGBA8 frame buffer, row-major, as handed out by `pixels`.
pub struct FrameCanvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> FrameCanvas<'a> {
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    fn put(&mut self, x: i32, y: i32, color: Rgba) {
        if x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        write_pixel_rgba_clipped(self.frame, self.width as usize, x, y, color);
    }
}

impl Canvas for FrameCanvas<'_> {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Rgba) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
    }

    /// Even-odd scanline fill sampled at pixel centres.
    fn fill_polygon(&mut self, points: &[PixelPoint], color: Rgba) {
        if points.len() < 3 || self.width == 0 || self.height == 0 {
            return;
        }
        if points
            .iter()
            .any(|point| !point.x.is_finite() || !point.y.is_finite())
        {
            return;
        }

        let (min_y, max_y) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |acc, p| {
            (acc.0.min(p.y), acc.1.max(p.y))
        });
        let row_start = ((min_y - 0.5).ceil().max(0.0)) as i32;
        let row_end = ((max_y - 0.5).ceil().min(self.height as f64)) as i32;

        let mut crossings: Vec<f64> = Vec::with_capacity(points.len());
        for row in row_start..row_end {
            let sample_y = row as f64 + 0.5;
            crossings.clear();
            for (index, a) in points.iter().enumerate() {
                let b = points[(index + 1) % points.len()];
                if (a.y <= sample_y) != (b.y <= sample_y) {
                    crossings.push(a.x + (sample_y - a.y) * (b.x - a.x) / (b.y - a.y));
                }
            }
            crossings.sort_by(f64::total_cmp);
            for span in crossings.chunks_exact(2) {
                let start = (span[0] - 0.5).ceil().max(0.0) as i32;
                let end = (span[1] - 0.5).ceil().min(self.width as f64) as i32;
                for column in start..end {
                    self.put(column, row, color);
                }
            }
        }
    }

    fn draw_line(&mut self, from: PixelPoint, to: PixelPoint, color: Rgba) {
        let Some((from, to)) = clip_segment(from, to, self.width, self.height) else {
            return;
        };
        let (mut x0, mut y0) = (from.x.round() as i32, from.y.round() as i32);
        let (x1, y1) = (to.x.round() as i32, to.y.round() as i32);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let step_x = if x0 < x1 { 1 } else { -1 };
        let step_y = if y0 < y1 { 1 } else { -1 };
        let mut error = dx + dy;
        loop {
            self.put(x0, y0, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let doubled = 2 * error;
            if doubled >= dy {
                error += dy;
                x0 += step_x;
            }
            if doubled <= dx {
                error += dx;
                y0 += step_y;
            }
        }
    }
}

/// Liang-Barsky clip against the frame grown by one pixel, so rasterizing
/// the result stays bounded however far off screen the input reaches.
fn clip_segment(
    from: PixelPoint,
    to: PixelPoint,
    width: u32,
    height: u32,
) -> Option<(PixelPoint, PixelPoint)> {
    if width == 0 || height == 0 {
        return None;
    }
    if ![from.x, from.y, to.x, to.y].iter().all(|v| v.is_finite()) {
        return None;
    }
    let (x_min, y_min) = (-1.0, -1.0);
    let (x_max, y_max) = (width as f64, height as f64);
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;
    for (p, q) in [
        (-dx, from.x - x_min),
        (dx, x_max - from.x),
        (-dy, from.y - y_min),
        (dy, y_max - from.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((
        PixelPoint::new(from.x + t0 * dx, from.y + t0 * dy),
        PixelPoint::new(from.x + t1 * dx, from.y + t1 * dy),
    ))
}

pub(crate) fn write_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: Rgba) {
    if x < 0 || y < 0 {
        return;
    }
    let x = x as usize;
    let y = y as usize;
    let Some(pixel_offset) = y.checked_mul(width).and_then(|row| row.checked_add(x)) else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    frame[byte_offset..end].copy_from_slice(&color);
}
