//! Static registry of named turtle styles
//!
//! One style is active at a time; styles are immutable and swappable
//! between runs.

use crate::logo::canvas::Rgb;

/// Color set and animation hint for drawing the turtle icon.
#[derive(Clone, Copy, Debug)]
pub struct TurtleStyle {
    pub name: &'static str,
    pub body: Rgb,
    pub head: Rgb,
    pub outline: Rgb,
    pub pen_up_body: Rgb,
    pub pen_up_head: Rgb,
    /// Suggested default milliseconds per primitive.
    pub speed_hint_ms: u32,
}

pub const STYLES: &[TurtleStyle] = &[
    TurtleStyle {
        name: "classic",
        body: Rgb::new(34, 139, 34),
        head: Rgb::new(60, 179, 113),
        outline: Rgb::new(0, 70, 0),
        pen_up_body: Rgb::new(148, 186, 148),
        pen_up_head: Rgb::new(178, 211, 186),
        speed_hint_ms: 300,
    },
    TurtleStyle {
        name: "crimson",
        body: Rgb::new(178, 34, 52),
        head: Rgb::new(220, 90, 90),
        outline: Rgb::new(90, 10, 20),
        pen_up_body: Rgb::new(216, 168, 172),
        pen_up_head: Rgb::new(232, 196, 196),
        speed_hint_ms: 300,
    },
    TurtleStyle {
        name: "midnight",
        body: Rgb::new(46, 52, 94),
        head: Rgb::new(90, 104, 160),
        outline: Rgb::new(16, 18, 40),
        pen_up_body: Rgb::new(160, 164, 190),
        pen_up_head: Rgb::new(190, 196, 220),
        speed_hint_ms: 450,
    },
    TurtleStyle {
        name: "sunny",
        body: Rgb::new(240, 180, 30),
        head: Rgb::new(250, 210, 90),
        outline: Rgb::new(150, 100, 0),
        pen_up_body: Rgb::new(244, 222, 170),
        pen_up_head: Rgb::new(250, 236, 200),
        speed_hint_ms: 150,
    },
];

/// Look up a style by name, case-insensitively.
pub fn find(name: &str) -> Option<&'static TurtleStyle> {
    STYLES.iter().find(|s| s.name.eq_ignore_ascii_case(name))
}

pub fn default_style() -> &'static TurtleStyle {
    &STYLES[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_is_case_insensitive() {
        assert_eq!(find("CLASSIC").map(|s| s.name), Some("classic"));
        assert_eq!(find("Midnight").map(|s| s.name), Some("midnight"));
        assert!(find("plaid").is_none());
    }

    #[test]
    fn default_is_registered() {
        assert!(STYLES
            .iter()
            .any(|s| s.name == default_style().name));
    }
}
