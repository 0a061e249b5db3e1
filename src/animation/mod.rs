//! Frame stepping of one render pass.
//!
//! The host drives frames; [`Animation::advance`] is called once per frame
//! and yields the linear and eased progress to draw.

use serde::{Deserialize, Serialize};

use crate::core::Easing;

/// Identifies one render pass of a chart. Starting a new pass bumps the
/// chart's counter, superseding every older pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct RenderGeneration(pub u64);

impl RenderGeneration {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Animation tuning resolved from chart configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    pub enabled: bool,
    pub steps: u32,
    pub easing: Easing,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            steps: 60,
            easing: Easing::default(),
        }
    }
}

impl AnimationConfig {
    /// Linear progress added per frame; a single frame when disabled.
    #[must_use]
    pub fn frame_increment(self) -> f64 {
        if self.enabled && self.steps > 0 {
            1.0 / f64::from(self.steps)
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AnimationState {
    Idle,
    Running { frame: u32 },
    Complete,
}

/// Progress of one drawn frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Linear progress in `(0, 1]`.
    pub fraction: f64,
    /// `fraction` mapped through the easing curve.
    pub eased: f64,
}

impl Frame {
    #[must_use]
    pub fn is_final(self) -> bool {
        self.fraction >= 1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    config: AnimationConfig,
    state: AnimationState,
}

impl Animation {
    #[must_use]
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            config,
            state: AnimationState::Idle,
        }
    }

    #[must_use]
    pub fn config(self) -> AnimationConfig {
        self.config
    }

    #[must_use]
    pub fn state(self) -> AnimationState {
        self.state
    }

    #[must_use]
    pub fn is_complete(self) -> bool {
        self.state == AnimationState::Complete
    }

    /// Total number of frames this animation draws.
    #[must_use]
    pub fn frame_count(self) -> u32 {
        if self.config.enabled {
            self.config.steps.max(1)
        } else {
            1
        }
    }

    /// Steps to the next frame.
    ///
    /// Returns `None` once complete. The last frame always has
    /// `fraction == 1.0` so the final geometry is drawn exactly.
    pub fn advance(&mut self) -> Option<Frame> {
        let frame = match self.state {
            AnimationState::Idle => 1,
            AnimationState::Running { frame } => frame + 1,
            AnimationState::Complete => return None,
        };
        let total = self.frame_count();
        let fraction = if frame >= total {
            self.state = AnimationState::Complete;
            1.0
        } else {
            self.state = AnimationState::Running { frame };
            f64::from(frame) * self.config.frame_increment()
        };
        let eased = if self.config.enabled {
            self.config.easing.apply(fraction)
        } else {
            1.0
        };
        Some(Frame { fraction, eased })
    }

    /// Jumps straight to completion, returning the final frame.
    pub fn finish(&mut self) -> Option<Frame> {
        if self.is_complete() {
            return None;
        }
        self.state = AnimationState::Complete;
        Some(Frame {
            fraction: 1.0,
            eased: 1.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{Animation, AnimationConfig, AnimationState, RenderGeneration};
    use crate::core::Easing;

    #[test]
    fn runs_the_configured_number_of_frames() {
        let mut animation = Animation::new(AnimationConfig {
            enabled: true,
            steps: 4,
            easing: Easing::Linear,
        });
        let frames: Vec<_> = std::iter::from_fn(|| animation.advance()).collect();
        assert_eq!(frames.len(), 4);
        assert_relative_eq!(frames[0].fraction, 0.25);
        assert_relative_eq!(frames[1].eased, 0.5);
        assert!(frames[3].is_final());
        assert_eq!(animation.state(), AnimationState::Complete);
        assert!(animation.advance().is_none());
    }

    #[test]
    fn disabled_animation_draws_one_final_frame() {
        let config = AnimationConfig {
            enabled: false,
            ..AnimationConfig::default()
        };
        assert_relative_eq!(config.frame_increment(), 1.0);
        let mut animation = Animation::new(config);
        let frame = animation.advance().expect("frame");
        assert!(frame.is_final());
        assert_relative_eq!(frame.eased, 1.0);
        assert!(animation.is_complete());
    }

    #[test]
    fn finish_skips_remaining_frames() {
        let mut animation = Animation::new(AnimationConfig::default());
        animation.advance();
        assert!(matches!(animation.state(), AnimationState::Running { frame: 1 }));
        assert!(animation.finish().expect("final").is_final());
        assert!(animation.finish().is_none());
    }

    #[test]
    fn generations_increase() {
        let first = RenderGeneration::default();
        assert!(first.next() > first);
    }
}
