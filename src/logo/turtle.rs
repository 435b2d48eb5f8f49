//! Turtle engine: pose, pen, background, and frame-based motion
//!
//! Each motion primitive builds a `Motion` state machine (start pose, end
//! pose, frame counter) that the caller advances one animation frame at a
//! time with `tick`. Translations draw incremental stroke segments while the
//! pen is down; turns never draw. On the final frame the pose snaps to the
//! exact target so floating-point drift cannot accumulate across primitives.
//!
//! Coordinates are Logo-style: origin at the canvas center, y up, heading 0
//! pointing up and increasing clockwise. The canvas works in pixel
//! coordinates (y down); `to_px` converts between the two.

use crate::logo::canvas::{Canvas, Rgb};
use crate::logo::style::{self, TurtleStyle};

/// Milliseconds represented by one animation frame.
pub const FRAME_MS: u32 = 16;

/// Position, heading, and pen state at an instant. Heading is degrees in
/// [0, 360), 0 = up, clockwise.
#[derive(Clone, Copy, Debug)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub pen_down: bool,
    pub pen_color: Rgb,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionKind {
    Translate,
    Turn,
}

#[derive(Clone, Copy, Debug)]
struct Waypoint {
    x: f64,
    y: f64,
    heading: f64,
}

/// An in-flight primitive: interpolates from `from` to `to` over `frames`
/// animation frames.
#[derive(Clone, Copy, Debug)]
pub struct Motion {
    kind: MotionKind,
    from: Waypoint,
    to: Waypoint,
    frame: u32,
    frames: u32,
    /// Last plotted point, for incremental stroke segments.
    prev: (f64, f64),
}

/// The animated cursor and its drawing surface.
pub struct Turtle {
    pose: Pose,
    background: Rgb,
    visible: bool,
    style: &'static TurtleStyle,
    duration_ms: u32,
    canvas: Canvas,
}

impl Turtle {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pose: Pose {
                x: 0.0,
                y: 0.0,
                heading: 0.0,
                pen_down: true,
                pen_color: Rgb::new(0, 0, 0),
            },
            background: Rgb::new(255, 255, 255),
            visible: true,
            style: style::default_style(),
            duration_ms: 0,
            canvas: Canvas::new(width, height),
        }
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn style(&self) -> &'static TurtleStyle {
        self.style
    }

    pub fn set_style(&mut self, style: &'static TurtleStyle) {
        self.style = style;
    }

    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    /// Milliseconds per primitive; 0 means instant.
    pub fn set_duration_ms(&mut self, ms: u32) {
        self.duration_ms = ms;
    }

    pub fn pen_up(&mut self) {
        self.pose.pen_down = false;
    }

    pub fn pen_down(&mut self) {
        self.pose.pen_down = true;
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Applies instantly; channels are clamped to [0, 255].
    pub fn set_pen_color(&mut self, r: f64, g: f64, b: f64) {
        self.pose.pen_color = Rgb::clamped(r, g, b);
    }

    /// Applies instantly; channels are clamped to [0, 255].
    pub fn set_background(&mut self, r: f64, g: f64, b: f64) {
        self.background = Rgb::clamped(r, g, b);
    }

    /// Erase all strokes, then home instantly: center, heading 0, pen down.
    pub fn clear_screen(&mut self) {
        self.canvas.clear();
        self.pose.x = 0.0;
        self.pose.y = 0.0;
        self.pose.heading = 0.0;
        self.pose.pen_down = true;
    }

    pub fn forward(&mut self, distance: f64) -> Motion {
        let rad = self.pose.heading.to_radians();
        self.translate_to(
            self.pose.x + distance * rad.sin(),
            self.pose.y + distance * rad.cos(),
            self.pose.heading,
        )
    }

    pub fn backward(&mut self, distance: f64) -> Motion {
        self.forward(-distance)
    }

    pub fn right(&mut self, degrees: f64) -> Motion {
        self.turn_to(self.pose.heading + degrees)
    }

    pub fn left(&mut self, degrees: f64) -> Motion {
        self.turn_to(self.pose.heading - degrees)
    }

    pub fn set_heading(&mut self, heading: f64) -> Motion {
        self.turn_to(heading)
    }

    pub fn set_x(&mut self, x: f64) -> Motion {
        self.translate_to(x, self.pose.y, self.pose.heading)
    }

    pub fn set_y(&mut self, y: f64) -> Motion {
        self.translate_to(self.pose.x, y, self.pose.heading)
    }

    pub fn set_pos(&mut self, x: f64, y: f64) -> Motion {
        self.translate_to(x, y, self.pose.heading)
    }

    /// Animated return to the center with heading 0. Draws while the pen is
    /// down, like any other translation.
    pub fn home(&mut self) -> Motion {
        self.translate_to(0.0, 0.0, 0.0)
    }

    fn here(&self) -> Waypoint {
        Waypoint {
            x: self.pose.x,
            y: self.pose.y,
            heading: self.pose.heading,
        }
    }

    fn frames(&self) -> u32 {
        (self.duration_ms / FRAME_MS).max(1)
    }

    fn translate_to(&self, x: f64, y: f64, heading: f64) -> Motion {
        Motion {
            kind: MotionKind::Translate,
            from: self.here(),
            to: Waypoint { x, y, heading },
            frame: 0,
            frames: self.frames(),
            prev: (self.pose.x, self.pose.y),
        }
    }

    fn turn_to(&self, heading: f64) -> Motion {
        Motion {
            kind: MotionKind::Turn,
            from: self.here(),
            to: Waypoint {
                x: self.pose.x,
                y: self.pose.y,
                heading,
            },
            frame: 0,
            frames: self.frames(),
            prev: (self.pose.x, self.pose.y),
        }
    }

    /// Advance a motion by one frame. Returns true once the motion is
    /// complete and the pose has snapped to the exact target.
    pub fn tick(&mut self, motion: &mut Motion) -> bool {
        motion.frame += 1;
        let done = motion.frame >= motion.frames;
        let t = if done {
            1.0
        } else {
            motion.frame as f64 / motion.frames as f64
        };

        let x = motion.from.x + (motion.to.x - motion.from.x) * t;
        let y = motion.from.y + (motion.to.y - motion.from.y) * t;
        let heading = motion.from.heading + (motion.to.heading - motion.from.heading) * t;

        if motion.kind == MotionKind::Translate && self.pose.pen_down {
            let (px1, py1) = self.to_px(motion.prev.0, motion.prev.1);
            let (px2, py2) = self.to_px(x, y);
            self.canvas.line(px1, py1, px2, py2, self.pose.pen_color);
        }
        motion.prev = (x, y);

        if done {
            self.pose.x = motion.to.x;
            self.pose.y = motion.to.y;
            self.pose.heading = motion.to.heading.rem_euclid(360.0);
        } else {
            self.pose.x = x;
            self.pose.y = y;
            self.pose.heading = heading.rem_euclid(360.0);
        }
        done
    }

    /// Logo coordinates -> pixel coordinates.
    fn to_px(&self, x: f64, y: f64) -> (i32, i32) {
        let px = (self.canvas.width() as f64 / 2.0 + x).round() as i32;
        let py = (self.canvas.height() as f64 / 2.0 - y).round() as i32;
        (px, py)
    }

    /// Compose the full scene: background, accumulated strokes, then the
    /// turtle icon on top when visible. Visibility never hides strokes.
    pub fn frame(&self) -> Vec<Rgb> {
        let size = (self.canvas.width() * self.canvas.height()) as usize;
        let mut out = vec![self.background; size];
        for (cell, pixel) in self.canvas.cells().iter().zip(out.iter_mut()) {
            if let Some(color) = cell {
                *pixel = *color;
            }
        }
        if self.visible {
            let mut icon = Canvas::new(self.canvas.width(), self.canvas.height());
            self.paint_icon(&mut icon);
            for (cell, pixel) in icon.cells().iter().zip(out.iter_mut()) {
                if let Some(color) = cell {
                    *pixel = *color;
                }
            }
        }
        out
    }

    /// Oval body, round head, four limbs, and a tail, rotated to face the
    /// heading. Body and head colors switch when the pen is lifted.
    fn paint_icon(&self, icon: &mut Canvas) {
        let (body, head) = if self.pose.pen_down {
            (self.style.body, self.style.head)
        } else {
            (self.style.pen_up_body, self.style.pen_up_head)
        };
        let outline = self.style.outline;
        let angle = self.pose.heading;

        // Offsets in turtle-local coordinates: x to the right, y toward the
        // heading. Rotated clockwise into world space.
        let rad = angle.to_radians();
        let (sin, cos) = rad.sin_cos();
        let place = |ox: f64, oy: f64| {
            let rx = ox * cos + oy * sin;
            let ry = -ox * sin + oy * cos;
            self.to_px(self.pose.x + rx, self.pose.y + ry)
        };

        // Limbs and tail first so the body overlaps them.
        for (ox, oy) in [(-6.0, 5.0), (6.0, 5.0), (-6.0, -5.0), (6.0, -5.0)] {
            let (cx, cy) = place(ox, oy);
            icon.fill_ellipse(cx, cy, 3.5, 3.5, 0.0, outline);
            icon.fill_ellipse(cx, cy, 2.5, 2.5, 0.0, body);
        }
        let (tx, ty) = place(0.0, -10.0);
        icon.fill_ellipse(tx, ty, 2.5, 2.5, 0.0, outline);
        icon.fill_ellipse(tx, ty, 1.5, 1.5, 0.0, body);

        let (bx, by) = place(0.0, 0.0);
        icon.fill_ellipse(bx, by, 8.0, 10.0, angle, outline);
        icon.fill_ellipse(bx, by, 7.0, 9.0, angle, body);

        let (hx, hy) = place(0.0, 11.0);
        icon.fill_ellipse(hx, hy, 4.5, 4.5, 0.0, outline);
        icon.fill_ellipse(hx, hy, 3.5, 3.5, 0.0, head);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(turtle: &mut Turtle, mut motion: Motion) {
        while !turtle.tick(&mut motion) {}
    }

    #[test]
    fn forward_moves_along_heading_zero() {
        let mut t = Turtle::new(100, 100);
        let m = t.forward(10.0);
        run(&mut t, m);
        assert!(t.pose().x.abs() < 1e-9);
        assert!((t.pose().y - 10.0).abs() < 1e-9);
        assert_eq!(t.pose().heading, 0.0);
    }

    #[test]
    fn heading_stays_normalized() {
        let mut t = Turtle::new(100, 100);
        let m = t.right(370.0);
        run(&mut t, m);
        assert!((t.pose().heading - 10.0).abs() < 1e-9);

        let m = t.left(20.0);
        run(&mut t, m);
        assert!((t.pose().heading - 350.0).abs() < 1e-9);
    }

    #[test]
    fn turns_never_draw() {
        let mut t = Turtle::new(100, 100);
        let m = t.right(90.0);
        run(&mut t, m);
        assert_eq!(t.canvas().painted(), 0);
    }

    #[test]
    fn pen_up_suppresses_strokes() {
        let mut t = Turtle::new(100, 100);
        t.pen_up();
        let m = t.forward(20.0);
        run(&mut t, m);
        assert_eq!(t.canvas().painted(), 0);

        t.pen_down();
        let m = t.forward(20.0);
        run(&mut t, m);
        assert!(t.canvas().painted() > 0);
    }

    #[test]
    fn multi_frame_motion_snaps_to_target() {
        let mut t = Turtle::new(100, 100);
        t.set_duration_ms(160); // 10 frames
        let mut m = t.forward(33.0);
        let mut frames = 0;
        while !t.tick(&mut m) {
            frames += 1;
        }
        assert_eq!(frames, 9);
        assert!((t.pose().y - 33.0).abs() < 1e-12);
    }

    #[test]
    fn clear_screen_homes_instantly() {
        let mut t = Turtle::new(100, 100);
        let m = t.forward(20.0);
        run(&mut t, m);
        let m = t.right(45.0);
        run(&mut t, m);
        t.pen_up();
        assert!(t.canvas().painted() > 0);

        t.clear_screen();
        assert_eq!(t.canvas().painted(), 0);
        assert_eq!(t.pose().x, 0.0);
        assert_eq!(t.pose().y, 0.0);
        assert_eq!(t.pose().heading, 0.0);
        assert!(t.pose().pen_down);
    }

    #[test]
    fn color_channels_are_clamped() {
        let mut t = Turtle::new(100, 100);
        t.set_pen_color(999.0, -4.0, 128.0);
        assert_eq!(t.pose().pen_color, Rgb::new(255, 0, 128));
        t.set_background(300.0, 300.0, 300.0);
        assert_eq!(t.background(), Rgb::new(255, 255, 255));
    }

    #[test]
    fn visibility_gates_the_icon_only() {
        let mut t = Turtle::new(60, 60);
        let m = t.forward(10.0);
        run(&mut t, m);

        let shown = t.frame();
        t.hide();
        let hidden = t.frame();
        assert_ne!(shown, hidden);

        // Strokes survive hiding: the hidden frame still differs from an
        // empty background.
        assert!(hidden.iter().any(|p| *p != t.background()));
    }

    #[test]
    fn square_returns_home() {
        let mut t = Turtle::new(300, 300);
        for _ in 0..4 {
            let m = t.forward(100.0);
            run(&mut t, m);
            let m = t.right(90.0);
            run(&mut t, m);
        }
        assert!(t.pose().x.abs() < 1e-6);
        assert!(t.pose().y.abs() < 1e-6);
        assert!(t.pose().heading.abs() < 1e-6 || (t.pose().heading - 360.0).abs() < 1e-6);
    }
}
