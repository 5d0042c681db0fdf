use std::time::Duration;

use crate::animator::{Animator, MoveRequest};
use crate::easing::Easing;
use crate::surface::SlideSurface;

/// Hardware path: the slide is moved with a single scale + translate
/// transform that the renderer interpolates.
pub struct TransformAnimator {
    fade: Duration,
    easing: Easing,
}

impl TransformAnimator {
    pub fn new(fade: Duration, easing: Easing) -> Self {
        Self { fade, easing }
    }
}

impl<S: SlideSurface> Animator<S> for TransformAnimator {
    fn name(&self) -> &'static str {
        "transform"
    }

    fn animate(&self, surface: &mut S, request: &MoveRequest) {
        surface.set_transform(request.start());
        surface.bring_to_front(request.z_order);

        // Keep moving while the next slide fades in on top
        surface.transition_transform(request.end(), request.duration + self.fade, self.easing);
        surface.fade_to(1.0, self.fade);
    }

    fn retire(&self, surface: &mut S) {
        surface.send_to_back();
    }
}
