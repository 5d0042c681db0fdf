use std::time::Duration;

use raylib::prelude::*;

use crate::easing::{Easing, EasingCurve};
use crate::geometry::{Bounds, Lerp, Size, Transform};
use crate::surface::SlideSurface;

/// One running interpolation between two values.
struct Track<T: Lerp> {
    from: T,
    to: T,
    elapsed: Duration,
    duration: Duration,
    curve: EasingCurve,
}

impl<T: Lerp> Track<T> {
    fn at(value: T) -> Self {
        Self {
            from: value,
            to: value,
            elapsed: Duration::ZERO,
            duration: Duration::ZERO,
            curve: EasingCurve::new(Easing::Linear),
        }
    }

    fn value(&self) -> T {
        if self.elapsed >= self.duration {
            return self.to;
        }
        let t = self.elapsed.as_secs_f32() / self.duration.as_secs_f32();
        self.from.lerp(self.to, self.curve.sample(t))
    }

    fn start(&mut self, to: T, duration: Duration, easing: Easing) {
        self.from = self.value();
        self.to = to;
        self.elapsed = Duration::ZERO;
        self.duration = duration;
        self.curve = EasingCurve::new(easing);
    }

    fn update(&mut self, dt: Duration) {
        self.elapsed = (self.elapsed + dt).min(self.duration);
    }

    fn stop(&mut self) {
        *self = Self::at(self.value());
    }
}

enum Placement {
    Transform(Track<Transform>),
    Bounds(Track<Bounds>),
}

/// Presentation state of one loaded slide, drawn into the render target.
pub struct SlideView {
    texture: Texture2D,
    z_order: u32,
    on_stage: bool,
    opacity: Track<f32>,
    placement: Placement,
}

impl SlideView {
    pub fn new(texture: Texture2D) -> Self {
        Self {
            texture,
            z_order: 0,
            on_stage: false,
            opacity: Track::at(0.0),
            placement: Placement::Transform(Track::at(Transform::new(1.0, 0.0, 0.0))),
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.texture.width() as f32, self.texture.height() as f32)
    }

    /// Stacking key: slides on stage above retired ones, then by move order.
    pub fn stacking(&self) -> (bool, u32) {
        (self.on_stage, self.z_order)
    }

    pub fn update(&mut self, dt: Duration) {
        self.opacity.update(dt);
        match &mut self.placement {
            Placement::Transform(track) => track.update(dt),
            Placement::Bounds(track) => track.update(dt),
        }
    }

    fn bounds(&self) -> Bounds {
        match &self.placement {
            Placement::Transform(track) => track.value().to_bounds(self.size()),
            Placement::Bounds(track) => track.value(),
        }
    }

    pub fn draw(&self, d: &mut RaylibDrawHandle) {
        let opacity = self.opacity.value();
        if opacity <= 0.0 {
            return;
        }
        let size = self.size();
        let b = self.bounds();

        d.draw_texture_pro(
            &self.texture,
            Rectangle::new(0.0, 0.0, size.width, size.height),
            Rectangle::new(b.x, b.y, b.width, b.height),
            Vector2::new(0.0, 0.0),
            0.0,
            Color::new(255, 255, 255, (opacity.min(1.0) * 255.0) as u8),
        );
    }
}

impl SlideSurface for SlideView {
    fn bring_to_front(&mut self, z_order: u32) {
        self.z_order = z_order;
        self.on_stage = true;
    }

    fn send_to_back(&mut self) {
        self.on_stage = false;
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.opacity = Track::at(opacity);
    }

    fn fade_to(&mut self, opacity: f32, duration: Duration) {
        self.opacity.start(opacity, duration, Easing::Linear);
    }

    fn set_transform(&mut self, transform: Transform) {
        self.placement = Placement::Transform(Track::at(transform));
    }

    fn transition_transform(&mut self, to: Transform, duration: Duration, easing: Easing) {
        match &mut self.placement {
            Placement::Transform(track) => track.start(to, duration, easing),
            Placement::Bounds(_) => {
                let mut track = Track::at(Transform::from_bounds(self.bounds(), self.size()));
                track.start(to, duration, easing);
                self.placement = Placement::Transform(track);
            }
        }
    }

    fn set_bounds(&mut self, bounds: Bounds) {
        self.placement = Placement::Bounds(Track::at(bounds));
    }

    fn animate_bounds(&mut self, to: Bounds, duration: Duration, easing: Easing) {
        let from = self.bounds();
        let mut track = match std::mem::replace(&mut self.placement, Placement::Bounds(Track::at(from))) {
            Placement::Bounds(track) => track,
            Placement::Transform(_) => Track::at(from),
        };
        track.start(to, duration, easing);
        self.placement = Placement::Bounds(track);
    }

    fn stop_animations(&mut self) {
        self.opacity.stop();
        match &mut self.placement {
            Placement::Transform(track) => track.stop(),
            Placement::Bounds(track) => track.stop(),
        }
    }
}
