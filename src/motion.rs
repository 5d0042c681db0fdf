use std::ops::RangeInclusive;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::MotionError;

/// Where a slide sits inside the container, per axis: 0 pins the image to the
/// top/left edge, 1 to the bottom/right edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerFlags {
    pub x: f32,
    pub y: f32,
}

impl CornerFlags {
    pub const TOP_LEFT: CornerFlags = CornerFlags { x: 0.0, y: 0.0 };
    pub const TOP_RIGHT: CornerFlags = CornerFlags { x: 1.0, y: 0.0 };
    pub const BOTTOM_LEFT: CornerFlags = CornerFlags { x: 0.0, y: 1.0 };
    pub const BOTTOM_RIGHT: CornerFlags = CornerFlags { x: 1.0, y: 1.0 };

    const ALL: [CornerFlags; 4] = [
        CornerFlags::TOP_LEFT,
        CornerFlags::TOP_RIGHT,
        CornerFlags::BOTTOM_LEFT,
        CornerFlags::BOTTOM_RIGHT,
    ];

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Pan/zoom path of one slide. Fixed once the slide exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionDescriptor {
    pub start: CornerFlags,
    pub end: CornerFlags,
    pub start_scale: f32,
    pub end_scale: f32,
    pub duration_ms: u64,
}

impl MotionDescriptor {
    /// Draws a random corner pair and zoom direction.
    ///
    /// The end corner always differs from the start corner on at least one
    /// axis, so every slide visibly travels. Scales are picked inside
    /// `scales`; whether the slide zooms in or out is a coin flip.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, scales: RangeInclusive<f32>, duration_ms: u64) -> Self {
        let start_index = rng.random_range(0..CornerFlags::ALL.len());
        let end_index = (start_index + rng.random_range(1..CornerFlags::ALL.len())) % CornerFlags::ALL.len();

        let (min, max) = (*scales.start(), *scales.end());
        let near = if max > min { rng.random_range(min..=max) } else { min };
        let far = if max > min { rng.random_range(near..=max) } else { max };
        let (start_scale, end_scale) = if rng.random_bool(0.5) { (near, far) } else { (far, near) };

        Self {
            start: CornerFlags::ALL[start_index],
            end: CornerFlags::ALL[end_index],
            start_scale,
            end_scale,
            duration_ms,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn validate(&self) -> Result<(), MotionError> {
        for scale in [self.start_scale, self.end_scale] {
            if !scale.is_finite() || scale <= 0.0 {
                return Err(MotionError::InvalidScale(scale));
            }
        }
        for flag in [self.start.x, self.start.y, self.end.x, self.end.y] {
            if !(0.0..=1.0).contains(&flag) {
                return Err(MotionError::FlagOutOfRange(flag));
            }
        }
        if self.duration_ms == 0 {
            return Err(MotionError::ZeroDuration);
        }
        if self.start == self.end {
            return Err(MotionError::NoMovement);
        }
        Ok(())
    }
}
