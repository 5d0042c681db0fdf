use std::fmt;

use crate::geometry::Size;
use crate::motion::MotionDescriptor;

/// Position of a slide in the configured list. Stays stable while failed
/// slides are pruned from the rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlideId(pub usize);

impl fmt::Display for SlideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Pending,
    Loaded,
    Failed,
}

/// One rotation item. `S` is the presentation handle the front-end hands over
/// once the image is loaded.
pub struct Slide<S> {
    id: SlideId,
    source: String,
    motion: MotionDescriptor,

    resource: Option<S>,
    dimensions: Option<Size>,
    load_state: LoadState,
}

impl<S> Slide<S> {
    pub fn new(id: SlideId, source: impl Into<String>, motion: MotionDescriptor) -> Self {
        Self {
            id,
            source: source.into(),
            motion,
            resource: None,
            dimensions: None,
            load_state: LoadState::Pending,
        }
    }

    pub fn id(&self) -> SlideId {
        self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn motion(&self) -> &MotionDescriptor {
        &self.motion
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn is_loaded(&self) -> bool {
        self.load_state == LoadState::Loaded
    }

    pub fn dimensions(&self) -> Option<Size> {
        self.dimensions
    }

    pub fn resource(&self) -> Option<&S> {
        self.resource.as_ref()
    }

    pub fn resource_mut(&mut self) -> Option<&mut S> {
        self.resource.as_mut()
    }

    /// Stores the loaded resource. Only a pending slide accepts one; the
    /// resource is handed back otherwise.
    pub fn attach(&mut self, resource: S, dimensions: Size) -> Result<(), S> {
        if self.load_state != LoadState::Pending {
            return Err(resource);
        }
        self.resource = Some(resource);
        self.dimensions = Some(dimensions);
        self.load_state = LoadState::Loaded;
        Ok(())
    }

    /// Marks a pending slide as failed. Loaded slides are left alone.
    pub fn mark_failed(&mut self) -> bool {
        if self.load_state != LoadState::Pending {
            return false;
        }
        self.load_state = LoadState::Failed;
        true
    }
}
