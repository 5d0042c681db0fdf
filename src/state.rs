#[derive(Debug, PartialEq, Clone, Copy)]
pub enum PlaybackState {
    Idle,          // Nothing in flight, waiting for a slide (or the animator) to become ready
    Transitioning, // A slide is moving, the re-arm timer is pending
    Paused,        // Suspended from outside, no re-arm timer
}
