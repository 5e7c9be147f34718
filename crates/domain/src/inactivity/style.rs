//! Countdown presentation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Create a colour from its channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn lerp(self, other: Self, t: f64) -> Self {
        let mix = |a: u8, b: u8| (f64::from(b) - f64::from(a)).mul_add(t, f64::from(a)).round() as u8;
        Self::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Gradient stops from a full countdown (1.0) down to zero.
const STOPS: [(f64, Rgb); 4] = [
    (1.0, Rgb::new(46, 204, 113)),
    (2.0 / 3.0, Rgb::new(241, 196, 15)),
    (1.0 / 3.0, Rgb::new(230, 126, 34)),
    (0.0, Rgb::new(231, 76, 60)),
];

/// How the countdown should look for a given remaining time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownStyle {
    /// Colour of the countdown text.
    pub color: Rgb,
    /// Whether the urgent pulse animation is on.
    pub pulsing: bool,
}

impl CountdownStyle {
    /// Style for `remaining` seconds out of `total`, pulsing during the last
    /// `pulse_secs` seconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn for_remaining(remaining: u64, total: u64, pulse_secs: u64) -> Self {
        let fraction = if total == 0 {
            0.0
        } else {
            (remaining.min(total) as f64) / (total as f64)
        };

        Self {
            color: gradient(fraction),
            pulsing: remaining <= pulse_secs,
        }
    }
}

fn gradient(fraction: f64) -> Rgb {
    for pair in STOPS.windows(2) {
        let (hi_at, hi) = pair[0];
        let (lo_at, lo) = pair[1];
        if fraction >= lo_at {
            let t = (hi_at - fraction) / (hi_at - lo_at);
            return hi.lerp(lo, t);
        }
    }
    STOPS[STOPS.len() - 1].1
}

/// Format seconds as `m:ss`.
#[must_use]
pub fn format_remaining(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
