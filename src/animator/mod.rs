use std::time::Duration;

use crate::config::PlaybackConfig;
use crate::geometry::{Corners, Size, Transform};
use crate::surface::SlideSurface;

pub mod compat;
pub mod transform;

pub use compat::CompatAnimator;
pub use transform::TransformAnimator;

/// Which animation backend the host can run. Probed once, outside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Transform,
    Compatibility,
    Unavailable,
}

/// Everything an animator needs to move one slide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveRequest {
    pub corners: Corners,
    pub image: Size,
    pub start_scale: f32,
    pub end_scale: f32,
    pub duration: Duration,
    pub z_order: u32,
}

impl MoveRequest {
    pub fn start(&self) -> Transform {
        Transform::new(self.start_scale, self.corners.start_x, self.corners.start_y)
    }

    pub fn end(&self) -> Transform {
        Transform::new(self.end_scale, self.corners.end_x, self.corners.end_y)
    }
}

pub trait Animator<S: SlideSurface> {
    fn name(&self) -> &'static str;

    /// Whether the backend can be used right now.
    fn is_ready(&self) -> bool {
        true
    }

    /// Observes the external "utility ready" signal.
    fn mark_ready(&mut self) {}

    /// Places the slide at its start position and scale, brings it to the
    /// front, then starts the pan/zoom towards the end position while it
    /// fades in.
    fn animate(&self, surface: &mut S, request: &MoveRequest);

    /// Takes an outgoing slide off the stage.
    fn retire(&self, surface: &mut S);

    /// Resets an outgoing slide's opacity once it is behind the new one.
    fn clear(&self, surface: &mut S) {
        surface.set_opacity(0.0);
    }
}

/// Picks the backend for the whole session.
pub fn select<S: SlideSurface>(capability: Capability, config: &PlaybackConfig) -> Option<Box<dyn Animator<S>>> {
    match capability {
        Capability::Transform => Some(Box::new(TransformAnimator::new(config.fade(), config.easing()))),
        Capability::Compatibility => Some(Box::new(CompatAnimator::new(config.fade()))),
        Capability::Unavailable => None,
    }
}
