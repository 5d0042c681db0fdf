use crate::motion::MotionDescriptor;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Translate offsets for one transition, in the unscaled coordinate space of a
/// top-left anchored `scale(s) translate(x, y)` transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corners {
    pub start_x: f32,
    pub start_y: f32,
    pub end_x: f32,
    pub end_y: f32,
}

/// Computes where the slide starts and ends.
///
/// A flag of 0 pins the image to the top/left edge, 1 lines its scaled box up
/// with the bottom/right edge of the container.
pub fn compute_corners(container: Size, image: Size, motion: &MotionDescriptor) -> Corners {
    let offset = |flag: f32, extent: f32, scale: f32, image_extent: f32| flag * (extent / scale - image_extent);

    Corners {
        start_x: offset(motion.start.x, container.width, motion.start_scale, image.width),
        start_y: offset(motion.start.y, container.height, motion.start_scale, image.height),
        end_x: offset(motion.end.x, container.width, motion.end_scale, image.width),
        end_y: offset(motion.end.y, container.height, motion.end_scale, image.height),
    }
}

pub trait Lerp: Copy {
    fn lerp(self, to: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(self, to: Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

/// `scale(s) translate(x, y)` with the origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f32,
    pub x: f32,
    pub y: f32,
}

impl Transform {
    pub fn new(scale: f32, x: f32, y: f32) -> Self {
        Self { scale, x, y }
    }

    /// Screen-space box covered by an image of size `image` under this transform.
    pub fn to_bounds(self, image: Size) -> Bounds {
        Bounds {
            x: self.x * self.scale,
            y: self.y * self.scale,
            width: image.width * self.scale,
            height: image.height * self.scale,
        }
    }

    /// Inverse of [`Transform::to_bounds`]. A degenerate box maps to the identity.
    pub fn from_bounds(bounds: Bounds, image: Size) -> Self {
        if image.width <= 0.0 || bounds.width <= 0.0 {
            return Transform::new(1.0, 0.0, 0.0);
        }
        let scale = bounds.width / image.width;
        Transform::new(scale, bounds.x / scale, bounds.y / scale)
    }
}

impl Lerp for Transform {
    fn lerp(self, to: Self, t: f32) -> Self {
        Transform {
            scale: self.scale.lerp(to.scale, t),
            x: self.x.lerp(to.x, t),
            y: self.y.lerp(to.y, t),
        }
    }
}

/// Explicit screen-space box (left, top, width, height).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Lerp for Bounds {
    fn lerp(self, to: Self, t: f32) -> Self {
        Bounds {
            x: self.x.lerp(to.x, t),
            y: self.y.lerp(to.y, t),
            width: self.width.lerp(to.width, t),
            height: self.height.lerp(to.height, t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::CornerFlags;

    fn motion(start: CornerFlags, end: CornerFlags, start_scale: f32, end_scale: f32) -> MotionDescriptor {
        MotionDescriptor { start, end, start_scale, end_scale, duration_ms: 1000 }
    }

    #[test]
    fn identical_inputs_give_identical_corners() {
        let m = motion(CornerFlags::TOP_RIGHT, CornerFlags::BOTTOM_LEFT, 1.1, 1.3);
        let container = Size::new(800.0, 450.0);
        let image = Size::new(1024.0, 768.0);
        assert_eq!(compute_corners(container, image, &m), compute_corners(container, image, &m));
    }

    #[test]
    fn matches_formula() {
        let m = motion(CornerFlags::new(1.0, 0.5), CornerFlags::new(0.0, 1.0), 2.0, 1.25);
        let c = compute_corners(Size::new(1000.0, 600.0), Size::new(400.0, 200.0), &m);
        assert_eq!(c.start_x, 1.0 * (1000.0 / 2.0 - 400.0));
        assert_eq!(c.start_y, 0.5 * (600.0 / 2.0 - 200.0));
        assert_eq!(c.end_x, 0.0);
        assert_eq!(c.end_y, 600.0 / 1.25 - 200.0);
    }

    #[test]
    fn top_left_flag_pins_to_origin() {
        let m = motion(CornerFlags::TOP_LEFT, CornerFlags::BOTTOM_RIGHT, 1.2, 1.0);
        let c = compute_corners(Size::new(1920.0, 1080.0), Size::new(2400.0, 1600.0), &m);
        assert_eq!((c.start_x, c.start_y), (0.0, 0.0));
    }

    #[test]
    fn far_flag_aligns_scaled_box_with_container_edge() {
        let container = Size::new(1920.0, 1080.0);
        let image = Size::new(2400.0, 1600.0);
        let m = motion(CornerFlags::TOP_LEFT, CornerFlags::BOTTOM_RIGHT, 1.0, 1.2);
        let c = compute_corners(container, image, &m);

        let end = Transform::new(m.end_scale, c.end_x, c.end_y).to_bounds(image);
        assert!((end.x + end.width - container.width).abs() < 1e-3);
        assert!((end.y + end.height - container.height).abs() < 1e-3);
    }

    #[test]
    fn transform_lerp_hits_endpoints() {
        let a = Transform::new(1.0, 0.0, 0.0);
        let b = Transform::new(2.0, -100.0, 50.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Transform::new(1.5, -50.0, 25.0));
    }

    #[test]
    fn bounds_convert_back_to_the_same_transform() {
        let image = Size::new(2400.0, 1600.0);
        let t = Transform::new(1.25, -120.0, -40.0);
        let back = Transform::from_bounds(t.to_bounds(image), image);
        assert!((back.scale - t.scale).abs() < 1e-5);
        assert!((back.x - t.x).abs() < 1e-3);
        assert!((back.y - t.y).abs() < 1e-3);

        let empty = Bounds { x: 5.0, y: 5.0, width: 0.0, height: 0.0 };
        assert_eq!(Transform::from_bounds(empty, image), Transform::new(1.0, 0.0, 0.0));
    }
}
