//! Fixed-size RGB raster surface
//!
//! Stroke pixels are stored as `Option<Rgb>` so the background color can be
//! changed after drawing and still show through untouched areas. The turtle
//! engine is the only writer; hosts read composed frames out of the engine.

/// A 24-bit color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a color from raw channel values, clamping each to [0, 255].
    pub fn clamped(r: f64, g: f64, b: f64) -> Self {
        let clamp = |v: f64| v.clamp(0.0, 255.0).round() as u8;
        Self::new(clamp(r), clamp(g), clamp(b))
    }
}

/// Pixel buffer with centered-origin drawing done by the turtle engine in
/// pixel coordinates (0,0 = top-left).
pub struct Canvas {
    width: u32,
    height: u32,
    cells: Vec<Option<Rgb>>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![None; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Erase every stroke.
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Set a pixel, ignoring out-of-bounds coordinates.
    pub fn set(&mut self, x: i32, y: i32, color: Rgb) {
        if x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height {
            let idx = (y as u32) * self.width + (x as u32);
            self.cells[idx as usize] = Some(color);
        }
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Rgb> {
        if x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height {
            let idx = (y as u32) * self.width + (x as u32);
            self.cells[idx as usize]
        } else {
            None
        }
    }

    /// Number of painted pixels.
    pub fn painted(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn cells(&self) -> &[Option<Rgb>] {
        &self.cells
    }

    /// Draw a line using Bresenham's algorithm. Endpoints may lie far off
    /// the surface; the segment is clipped to the canvas first so the
    /// stepping arithmetic stays within `i32`.
    pub fn line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: Rgb) {
        let (x1, y1, x2, y2) = match self.clip_segment(x1, y1, x2, y2) {
            Some(clipped) => clipped,
            None => return,
        };
        let dx = (x2 - x1).abs();
        let dy = -(y2 - y1).abs();
        let sx = if x1 < x2 { 1 } else { -1 };
        let sy = if y1 < y2 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut x = x1;
        let mut y = y1;

        loop {
            self.set(x, y, color);

            if x == x2 && y == y2 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                if x == x2 {
                    break;
                }
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                if y == y2 {
                    break;
                }
                err += dx;
                y += sy;
            }
        }
    }

    /// Liang-Barsky clipping against the canvas rectangle. Returns None for
    /// segments entirely off the surface.
    fn clip_segment(&self, x1: i32, y1: i32, x2: i32, y2: i32) -> Option<(i32, i32, i32, i32)> {
        let (fx1, fy1) = (f64::from(x1), f64::from(y1));
        let dx = f64::from(x2) - fx1;
        let dy = f64::from(y2) - fy1;
        let x_max = f64::from(self.width.saturating_sub(1));
        let y_max = f64::from(self.height.saturating_sub(1));

        let mut t0 = 0.0f64;
        let mut t1 = 1.0f64;
        for (p, q) in [
            (-dx, fx1),
            (dx, x_max - fx1),
            (-dy, fy1),
            (dy, y_max - fy1),
        ] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
            } else {
                let r = q / p;
                if p < 0.0 {
                    if r > t1 {
                        return None;
                    }
                    if r > t0 {
                        t0 = r;
                    }
                } else {
                    if r < t0 {
                        return None;
                    }
                    if r < t1 {
                        t1 = r;
                    }
                }
            }
        }

        Some((
            (fx1 + t0 * dx).round() as i32,
            (fy1 + t0 * dy).round() as i32,
            (fx1 + t1 * dx).round() as i32,
            (fy1 + t1 * dy).round() as i32,
        ))
    }

    /// Fill an axis-aligned rectangle.
    pub fn fill_rect(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: Rgb) {
        let (x_min, x_max) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let (y_min, y_max) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };

        for y in y_min..=y_max {
            for x in x_min..=x_max {
                self.set(x, y, color);
            }
        }
    }

    /// Fill an ellipse centered at (cx, cy) with radii (rx, ry), rotated by
    /// `angle_deg` clockwise. Used for the turtle icon's body parts.
    pub fn fill_ellipse(&mut self, cx: i32, cy: i32, rx: f64, ry: f64, angle_deg: f64, color: Rgb) {
        let reach = rx.max(ry).ceil() as i32 + 1;
        let rad = angle_deg.to_radians();
        let (sin, cos) = rad.sin_cos();

        for dy in -reach..=reach {
            for dx in -reach..=reach {
                // Rotate the sample point back into the ellipse's own frame.
                let ux = dx as f64 * cos + dy as f64 * sin;
                let uy = -(dx as f64) * sin + dy as f64 * cos;
                let d = (ux / rx).powi(2) + (uy / ry).powi(2);
                if d <= 1.0 {
                    self.set(cx.saturating_add(dx), cy.saturating_add(dy), color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = Rgb::new(255, 0, 0);

    #[test]
    fn clamped_channels() {
        assert_eq!(Rgb::clamped(999.0, -3.0, 128.0), Rgb::new(255, 0, 128));
    }

    #[test]
    fn line_hits_both_endpoints() {
        let mut c = Canvas::new(20, 20);
        c.line(2, 2, 10, 7, RED);
        assert_eq!(c.get(2, 2), Some(RED));
        assert_eq!(c.get(10, 7), Some(RED));
    }

    #[test]
    fn line_with_extreme_endpoints_does_not_overflow() {
        let mut c = Canvas::new(10, 10);
        c.line(i32::MIN, 5, i32::MAX, 5, RED);
        assert_eq!(c.get(0, 5), Some(RED));
        assert_eq!(c.get(9, 5), Some(RED));

        // Fully off-canvas segments draw nothing.
        let mut c = Canvas::new(10, 10);
        c.line(i32::MIN, i32::MIN, i32::MIN + 5, i32::MIN + 5, RED);
        assert_eq!(c.painted(), 0);
    }

    #[test]
    fn line_crossing_the_canvas_is_clipped_to_it() {
        let mut c = Canvas::new(10, 10);
        c.line(-100, 4, 100, 4, RED);
        for x in 0..10 {
            assert_eq!(c.get(x, 4), Some(RED), "x = {}", x);
        }
        assert_eq!(c.painted(), 10);
    }

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut c = Canvas::new(10, 10);
        c.set(-1, 5, RED);
        c.set(5, 100, RED);
        assert_eq!(c.painted(), 0);
    }

    #[test]
    fn fill_rect_covers_area() {
        let mut c = Canvas::new(10, 10);
        c.fill_rect(4, 4, 1, 1, RED);
        assert_eq!(c.painted(), 16);
        assert_eq!(c.get(1, 1), Some(RED));
        assert_eq!(c.get(4, 4), Some(RED));
    }

    #[test]
    fn clear_erases_strokes() {
        let mut c = Canvas::new(10, 10);
        c.line(0, 0, 9, 9, RED);
        assert!(c.painted() > 0);
        c.clear();
        assert_eq!(c.painted(), 0);
    }

    #[test]
    fn fill_ellipse_is_bounded() {
        let mut c = Canvas::new(30, 30);
        c.fill_ellipse(15, 15, 4.0, 6.0, 0.0, RED);
        assert_eq!(c.get(15, 15), Some(RED));
        assert_eq!(c.get(15, 9), None); // outside the vertical radius
        assert_eq!(c.get(20, 15), None); // outside the horizontal radius
    }
}
