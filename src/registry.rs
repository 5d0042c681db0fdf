use crate::geometry::Size;
use crate::slide::{Slide, SlideId};

/// Ordered rotation sequence plus the playback cursor.
///
/// The sequence only ever shrinks. The cursor lives here so that pruning a
/// slide and repairing the cursor happen in one step.
pub struct SlideRegistry<S> {
    slides: Vec<Slide<S>>,
    cursor: usize,
    pending: usize,
}

impl<S> SlideRegistry<S> {
    pub fn new(slides: Vec<Slide<S>>) -> Self {
        let pending = slides.iter().filter(|s| !s.is_loaded()).count();
        Self { slides, cursor: 0, pending }
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Slides whose load has not settled yet.
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn ids(&self) -> Vec<SlideId> {
        self.slides.iter().map(|s| s.id()).collect()
    }

    pub fn current(&self) -> Option<&Slide<S>> {
        self.slides.get(self.cursor)
    }

    pub fn current_mut(&mut self) -> Option<&mut Slide<S>> {
        self.slides.get_mut(self.cursor)
    }

    pub fn position(&self, id: SlideId) -> Option<usize> {
        self.slides.iter().position(|s| s.id() == id)
    }

    pub fn get(&self, id: SlideId) -> Option<&Slide<S>> {
        self.slides.iter().find(|s| s.id() == id)
    }

    pub fn get_mut(&mut self, id: SlideId) -> Option<&mut Slide<S>> {
        self.slides.iter_mut().find(|s| s.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slide<S>> {
        self.slides.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Slide<S>> {
        self.slides.iter_mut()
    }

    /// Moves the cursor to the next slide, wrapping around.
    pub fn advance(&mut self) -> usize {
        if !self.slides.is_empty() {
            self.cursor = (self.cursor + 1) % self.slides.len();
        }
        self.cursor
    }

    /// Attaches a loaded resource. Hands the resource back if the slide is
    /// unknown or already settled.
    pub fn mark_loaded(&mut self, id: SlideId, resource: S, dimensions: Size) -> Result<(), S> {
        let Some(slide) = self.get_mut(id) else {
            return Err(resource);
        };
        slide.attach(resource, dimensions)?;
        self.pending = self.pending.saturating_sub(1);
        Ok(())
    }

    /// Marks a pending slide failed and drops it from the rotation.
    ///
    /// Removing at or before the cursor pulls the cursor back by one
    /// (stopping at 0); removing after it leaves the cursor alone. Returns the
    /// removed slide and the index it occupied.
    pub fn remove_failed(&mut self, id: SlideId) -> Option<(usize, Slide<S>)> {
        let index = self.position(id)?;
        if !self.slides[index].mark_failed() {
            return None;
        }
        let slide = self.slides.remove(index);
        self.pending = self.pending.saturating_sub(1);

        if index <= self.cursor {
            self.cursor = self.cursor.saturating_sub(1);
        }
        if self.cursor >= self.slides.len() {
            self.cursor = 0;
        }
        Some((index, slide))
    }
}
