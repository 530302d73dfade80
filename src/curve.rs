//! Transfer curves over normalized trail position.
//!
//! Every curve maps `t` in `[0, 1]` (0 = head of the trail, 1 = tail) to a
//! multiplier in `[0, 1]`. Curves drive opacity attenuation, point size and
//! diffusion along a trail.

use serde::{Deserialize, Serialize};

/// A normalized transfer function.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub enum Curve {
    /// Same value along the whole trail.
    Constant(f32),
    /// `1 - t`.
    #[default]
    Linear,
    /// `(1 - t)^exponent`. Exponents above 1 fade faster near the head.
    Ease(f32),
    /// Smoothstep falloff from 1 at the head to 0 at the tail.
    Smooth,
    /// Arbitrary function. Cannot be serialized.
    #[serde(skip)]
    Custom(fn(f32) -> f32),
}

impl Curve {
    /// Evaluate the curve at `t`. `t` and the result are clamped to
    /// `[0, 1]`; a NaN `t` reads as 0.
    pub fn eval(&self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let value = match *self {
            Curve::Constant(v) => v,
            Curve::Linear => 1.0 - t,
            Curve::Ease(exponent) => (1.0 - t).powf(exponent),
            Curve::Smooth => {
                let s = 1.0 - t;
                s * s * (3.0 - 2.0 * s)
            }
            Curve::Custom(f) => f(t),
        };
        if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, 1.0)
        }
    }
}
