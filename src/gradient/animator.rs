use super::frame::GradientFrame;
use crate::mood::{HslColor, NEUTRAL_COLOR};
use tracing::trace;

/// Tuning of the scroll motion. Distances are in offset units; one colour
/// stop is `stop_height` units tall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimatorConfig {
    /// Target speed at the very top/bottom edge is `±sensitivity / 2` per tick.
    pub sensitivity: f64,
    /// Fraction of the remaining velocity gap closed on every tick.
    pub easing: f64,
    /// Target speed while no pointer is over the surface.
    pub idle_velocity: f64,
    pub stop_height: f64,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            sensitivity: 8.0,
            easing: 0.08,
            idle_velocity: 0.6,
            stop_height: 12.0,
        }
    }
}

/// Pointer input over the rendered surface. Touch move/end map onto
/// `Move`/`Leave`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Pointer at vertical position `y` over a surface spanning
    /// `top..top + height`, all in the same units.
    Move { y: f64, top: f64, height: f64 },
    Leave,
}

/// Input consumed by the animation loop between ticks.
#[derive(Debug, Clone, PartialEq)]
pub enum AnimatorMessage {
    Pointer(PointerEvent),
    SetColors(Vec<HslColor>),
}

/// Gradient colours substituted for an empty playlist.
pub fn placeholder_colors() -> Vec<HslColor> {
    vec![NEUTRAL_COLOR, NEUTRAL_COLOR]
}

/// Scroll state of the looping gradient.
///
/// The offset always stays in `0..wrap_period()`. Replacing the colours
/// keeps the current offset and velocity, so the motion carries on across
/// playlist changes.
#[derive(Debug, Clone)]
pub struct GradientAnimator {
    config: AnimatorConfig,
    colors: Vec<HslColor>,
    offset: f64,
    velocity: f64,
    target_velocity: f64,
}

impl GradientAnimator {
    pub fn new(config: AnimatorConfig) -> Self {
        Self {
            config,
            colors: placeholder_colors(),
            offset: 0.0,
            velocity: 0.0,
            target_velocity: config.idle_velocity,
        }
    }

    pub fn with_colors(config: AnimatorConfig, colors: Vec<HslColor>) -> Self {
        let mut animator = Self::new(config);
        animator.set_colors(colors);
        animator
    }

    pub fn config(&self) -> &AnimatorConfig {
        &self.config
    }

    pub fn colors(&self) -> &[HslColor] {
        &self.colors
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn target_velocity(&self) -> f64 {
        self.target_velocity
    }

    /// Scroll distance after which the pattern repeats.
    pub fn wrap_period(&self) -> f64 {
        self.colors.len() as f64 * self.config.stop_height
    }

    pub fn set_colors(&mut self, colors: Vec<HslColor>) {
        self.colors = if colors.is_empty() {
            placeholder_colors()
        } else {
            colors
        };
        self.offset = self.wrap(self.offset);
    }

    /// Moves with non-finite coordinates, or that would yield a non-finite
    /// target, are ignored.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        let target = match event {
            PointerEvent::Move { y, top, height }
                if y.is_finite() && top.is_finite() && height.is_finite() && height > 0.0 =>
            {
                let normalized = ((y - top) / height).clamp(0.0, 1.0);
                (normalized - 0.5) * self.config.sensitivity
            }
            PointerEvent::Move { .. } => return,
            PointerEvent::Leave => self.config.idle_velocity,
        };
        if !target.is_finite() {
            return;
        }
        self.target_velocity = target;
        trace!("Target velocity now {:.3}", self.target_velocity);
    }

    pub fn apply(&mut self, message: AnimatorMessage) {
        match message {
            AnimatorMessage::Pointer(event) => self.handle_pointer(event),
            AnimatorMessage::SetColors(colors) => self.set_colors(colors),
        }
    }

    /// Advance by one frame: ease the velocity toward the target, then move.
    pub fn tick(&mut self) {
        self.velocity += (self.target_velocity - self.velocity) * self.config.easing;
        if !self.velocity.is_finite() {
            self.velocity = self.target_velocity;
        }
        self.offset = self.wrap(self.offset + self.velocity);
    }

    fn wrap(&self, offset: f64) -> f64 {
        let period = self.wrap_period();
        if !(period > 0.0) || !offset.is_finite() {
            return 0.0;
        }
        let wrapped = offset.rem_euclid(period);
        // rem_euclid may round up to `period` for tiny negative inputs
        if wrapped >= period {
            0.0
        } else {
            wrapped
        }
    }

    pub fn frame(&self) -> GradientFrame {
        GradientFrame::new(&self.colors, self.offset, self.config.stop_height)
    }
}
