use crate::mood::HslColor;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub color: HslColor,
    /// Distance from the top of the doubled sequence, in offset units.
    pub position: f64,
}

/// One rendered state of the looping gradient.
///
/// `stops` hold the colour sequence twice, plus the first colour again at
/// the very end, so a window of up to one period starting anywhere in
/// `0..period` is always covered.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientFrame {
    pub stops: Vec<GradientStop>,
    pub offset: f64,
    pub period: f64,
}

impl GradientFrame {
    pub fn new(colors: &[HslColor], offset: f64, stop_height: f64) -> Self {
        let count = colors.len();
        let stops = colors
            .iter()
            .cycle()
            .take(count * 2 + 1)
            .enumerate()
            .map(|(i, color)| GradientStop {
                color: *color,
                position: i as f64 * stop_height,
            })
            .collect();
        Self {
            stops,
            offset,
            period: count as f64 * stop_height,
        }
    }

    /// Colour at `position` units below the top of the viewport.
    pub fn sample(&self, position: f64) -> (u8, u8, u8) {
        let (first, rest) = match self.stops.split_first() {
            Some(split) => split,
            None => return (0, 0, 0),
        };
        if rest.is_empty() || !(self.period > 0.0) {
            return first.color.to_rgb();
        }

        let absolute = (self.offset + position).rem_euclid(self.period);
        let index = self
            .stops
            .windows(2)
            .position(|pair| absolute < pair[1].position)
            .unwrap_or(self.stops.len() - 2);

        let (from, to) = (self.stops[index], self.stops[index + 1]);
        let span = to.position - from.position;
        let t = if span > 0.0 {
            ((absolute - from.position) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        lerp_rgb(from.color.to_rgb(), to.color.to_rgb(), t)
    }

    /// CSS declarations drawing this frame as a scrolled background.
    pub fn to_css(&self) -> String {
        let mut css = String::from("background-image: linear-gradient(to bottom");
        for stop in &self.stops {
            let _ = write!(css, ", {} {:.2}px", stop.color, stop.position);
        }
        let height = self.stops.last().map(|s| s.position).unwrap_or(0.0);
        let _ = write!(
            css,
            "); background-size: 100% {:.2}px; background-position: 0 {:.2}px;",
            height, -self.offset
        );
        css
    }
}

fn lerp_rgb(from: (u8, u8, u8), to: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let channel = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    (
        channel(from.0, to.0),
        channel(from.1, to.1),
        channel(from.2, to.2),
    )
}
