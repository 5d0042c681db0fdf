use std::f32::consts::PI;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_EASE_CURVE;
use crate::error::ConfigError;

/// Timing curve applied to a running transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Easing {
    Linear,
    /// Half cosine wave, the classic `swing` curve of tween libraries
    Swing,
    CubicBezier { x1: f32, y1: f32, x2: f32, y2: f32 },
}

impl Default for Easing {
    fn default() -> Self {
        let [x1, y1, x2, y2] = DEFAULT_EASE_CURVE;
        Easing::CubicBezier { x1, y1, x2, y2 }
    }
}

impl Easing {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Easing::CubicBezier { x1, y1, x2, y2 } => {
                let xs_ok = (0.0..=1.0).contains(&x1) && (0.0..=1.0).contains(&x2);
                if xs_ok && y1.is_finite() && y2.is_finite() {
                    Ok(())
                } else {
                    Err(ConfigError::InvalidEasing)
                }
            }
            _ => Ok(()),
        }
    }
}

/// An [`Easing`] with its bezier sample table built once.
pub struct EasingCurve {
    easing: Easing,
    bezier: Option<Box<dyn Fn(f32) -> f32>>,
}

impl EasingCurve {
    pub fn new(easing: Easing) -> Self {
        let bezier = match easing {
            Easing::CubicBezier { x1, y1, x2, y2 } => match bezier_easing::bezier_easing(x1, y1, x2, y2) {
                Ok(curve) => Some(Box::new(curve) as Box<dyn Fn(f32) -> f32>),
                Err(_) => {
                    warn!("Invalid bezier curve ({x1}, {y1}, {x2}, {y2}), using linear timing");
                    None
                }
            },
            _ => None,
        };
        Self { easing, bezier }
    }

    /// Maps linear progress `t` to eased progress. `t` is clamped to [0, 1].
    pub fn sample(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self.easing {
            Easing::Linear => t,
            Easing::Swing => 0.5 - (t * PI).cos() / 2.0,
            Easing::CubicBezier { .. } => {
                // Endpoints are exact for every curve
                if t <= 0.0 || t >= 1.0 {
                    return t;
                }
                self.bezier.as_ref().map_or(t, |curve| curve(t))
            }
        }
    }
}
