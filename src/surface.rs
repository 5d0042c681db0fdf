use std::time::Duration;

use crate::easing::Easing;
use crate::geometry::{Bounds, Transform};

/// Presentation handle of one slide, injected by the front-end.
///
/// The engine never draws. It only tells each slide's surface where to be,
/// how opaque to be and which animation to run; the front-end steps the
/// animations and renders.
pub trait SlideSurface {
    /// Stacks the slide above everything with a lower `z_order`.
    fn bring_to_front(&mut self, z_order: u32);
    /// Stacks the slide below every slide currently on stage.
    fn send_to_back(&mut self);

    fn set_opacity(&mut self, opacity: f32);
    fn fade_to(&mut self, opacity: f32, duration: Duration);

    // Transform path
    fn set_transform(&mut self, transform: Transform);
    fn transition_transform(&mut self, to: Transform, duration: Duration, easing: Easing);

    // Box path
    fn set_bounds(&mut self, bounds: Bounds);
    fn animate_bounds(&mut self, to: Bounds, duration: Duration, easing: Easing);

    /// Freezes every running animation where it is.
    fn stop_animations(&mut self);
}
