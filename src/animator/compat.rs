use std::time::Duration;

use crate::animator::{Animator, MoveRequest};
use crate::easing::Easing;
use crate::surface::SlideSurface;

/// Fallback path for hosts without transform support: the slide's box
/// (left, top, width, height) is tweened directly.
///
/// The tweens are stepped by an external utility, so the animator refuses to
/// run until that utility reports ready.
pub struct CompatAnimator {
    fade: Duration,
    ready: bool,
}

impl CompatAnimator {
    pub fn new(fade: Duration) -> Self {
        Self { fade, ready: false }
    }
}

impl<S: SlideSurface> Animator<S> for CompatAnimator {
    fn name(&self) -> &'static str {
        "compat"
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn mark_ready(&mut self) {
        self.ready = true;
    }

    fn animate(&self, surface: &mut S, request: &MoveRequest) {
        surface.set_bounds(request.start().to_bounds(request.image));
        surface.bring_to_front(request.z_order);

        surface.animate_bounds(request.end().to_bounds(request.image), request.duration, Easing::Swing);
        surface.fade_to(1.0, self.fade);
    }

    fn retire(&self, surface: &mut S) {
        surface.send_to_back();
        surface.stop_animations();
    }
}
