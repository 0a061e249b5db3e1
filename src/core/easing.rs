use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Fixed easing catalog. Every function maps `[0, 1]` onto a progress value
/// with `f(0) == 0` and `f(1) == 1`; elastic and back overshoot in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    Linear,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInQuart,
    #[default]
    EaseOutQuart,
    EaseInOutQuart,
    EaseInQuint,
    EaseOutQuint,
    EaseInOutQuint,
    EaseInSine,
    EaseOutSine,
    EaseInOutSine,
    EaseInExpo,
    EaseOutExpo,
    EaseInOutExpo,
    EaseInCirc,
    EaseOutCirc,
    EaseInOutCirc,
    EaseInElastic,
    EaseOutElastic,
    EaseInOutElastic,
    EaseInBack,
    EaseOutBack,
    EaseInOutBack,
    EaseInBounce,
    EaseOutBounce,
    EaseInOutBounce,
}

const BACK_OVERSHOOT: f64 = 1.70158;

impl Easing {
    pub const ALL: [Easing; 31] = [
        Easing::Linear,
        Easing::EaseInQuad,
        Easing::EaseOutQuad,
        Easing::EaseInOutQuad,
        Easing::EaseInCubic,
        Easing::EaseOutCubic,
        Easing::EaseInOutCubic,
        Easing::EaseInQuart,
        Easing::EaseOutQuart,
        Easing::EaseInOutQuart,
        Easing::EaseInQuint,
        Easing::EaseOutQuint,
        Easing::EaseInOutQuint,
        Easing::EaseInSine,
        Easing::EaseOutSine,
        Easing::EaseInOutSine,
        Easing::EaseInExpo,
        Easing::EaseOutExpo,
        Easing::EaseInOutExpo,
        Easing::EaseInCirc,
        Easing::EaseOutCirc,
        Easing::EaseInOutCirc,
        Easing::EaseInElastic,
        Easing::EaseOutElastic,
        Easing::EaseInOutElastic,
        Easing::EaseInBack,
        Easing::EaseOutBack,
        Easing::EaseInOutBack,
        Easing::EaseInBounce,
        Easing::EaseOutBounce,
        Easing::EaseInOutBounce,
    ];

    /// Evaluates the easing at `t`, clamped into `[0, 1]`.
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Easing::Linear => t,
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => -t * (t - 2.0),
            Easing::EaseInOutQuad => in_out(t, |u| u * u),
            Easing::EaseInCubic => t.powi(3),
            Easing::EaseOutCubic => (t - 1.0).powi(3) + 1.0,
            Easing::EaseInOutCubic => in_out(t, |u| u.powi(3)),
            Easing::EaseInQuart => t.powi(4),
            Easing::EaseOutQuart => 1.0 - (t - 1.0).powi(4),
            Easing::EaseInOutQuart => in_out(t, |u| u.powi(4)),
            Easing::EaseInQuint => t.powi(5),
            Easing::EaseOutQuint => (t - 1.0).powi(5) + 1.0,
            Easing::EaseInOutQuint => in_out(t, |u| u.powi(5)),
            Easing::EaseInSine => 1.0 - (t * PI / 2.0).cos(),
            Easing::EaseOutSine => (t * PI / 2.0).sin(),
            Easing::EaseInOutSine => -0.5 * ((PI * t).cos() - 1.0),
            Easing::EaseInExpo => expo_in(t),
            Easing::EaseOutExpo => 1.0 - expo_in(1.0 - t),
            Easing::EaseInOutExpo => in_out(t, expo_in),
            Easing::EaseInCirc => 1.0 - (1.0 - t * t).max(0.0).sqrt(),
            Easing::EaseOutCirc => (1.0 - (t - 1.0).powi(2)).max(0.0).sqrt(),
            Easing::EaseInOutCirc => in_out(t, |u| 1.0 - (1.0 - u * u).max(0.0).sqrt()),
            Easing::EaseInElastic => elastic_in(t),
            Easing::EaseOutElastic => 1.0 - elastic_in(1.0 - t),
            Easing::EaseInOutElastic => in_out(t, elastic_in),
            Easing::EaseInBack => back_in(t),
            Easing::EaseOutBack => 1.0 - back_in(1.0 - t),
            Easing::EaseInOutBack => in_out(t, back_in),
            Easing::EaseInBounce => 1.0 - bounce_out(1.0 - t),
            Easing::EaseOutBounce => bounce_out(t),
            Easing::EaseInOutBounce => in_out(t, |u| 1.0 - bounce_out(1.0 - u)),
        }
    }
}

/// Mirrors an ease-in curve into an ease-in-out curve.
fn in_out(t: f64, ease_in: impl Fn(f64) -> f64) -> f64 {
    if t < 0.5 {
        ease_in(t * 2.0) / 2.0
    } else {
        1.0 - ease_in((1.0 - t) * 2.0) / 2.0
    }
}

fn expo_in(t: f64) -> f64 {
    if t <= 0.0 {
        0.0
    } else {
        2f64.powf(10.0 * (t - 1.0))
    }
}

fn elastic_in(t: f64) -> f64 {
    if t <= 0.0 || t >= 1.0 {
        return t;
    }
    let period = 0.3;
    let shift = period / 4.0;
    -(2f64.powf(10.0 * (t - 1.0)) * ((t - 1.0 - shift) * (2.0 * PI) / period).sin())
}

fn back_in(t: f64) -> f64 {
    t * t * ((BACK_OVERSHOOT + 1.0) * t - BACK_OVERSHOOT)
}

fn bounce_out(t: f64) -> f64 {
    const N: f64 = 7.5625;
    if t < 1.0 / 2.75 {
        N * t * t
    } else if t < 2.0 / 2.75 {
        let u = t - 1.5 / 2.75;
        N * u * u + 0.75
    } else if t < 2.5 / 2.75 {
        let u = t - 2.25 / 2.75;
        N * u * u + 0.9375
    } else {
        let u = t - 2.625 / 2.75;
        N * u * u + 0.984375
    }
}
