//! The pointer-reactive, endlessly scrolling colour gradient.

mod animation_loop;
mod animator;
mod frame;

pub use animation_loop::{AnimationHandle, AnimationLoop};
pub use animator::{
    placeholder_colors, AnimatorConfig, AnimatorMessage, GradientAnimator, PointerEvent,
};
pub use frame::{GradientFrame, GradientStop};
