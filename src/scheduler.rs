//! Playback scheduler.
//!
//! Owns the rotation, the cursor and every timer. All entry points
//! (`advance`, load results, suspend/resume, the utility signal) run on the
//! same thread and each one finishes its state change before returning.

use std::time::Duration;

use log::{debug, info, warn};

use crate::animator::{self, Animator, Capability, MoveRequest};
use crate::config::{PlaybackConfig, SlideConfig};
use crate::constants::RETIRE_FADE_DELAY;
use crate::error::SlideshowError;
use crate::geometry::{compute_corners, Size};
use crate::registry::SlideRegistry;
use crate::slide::{Slide, SlideId};
use crate::state::PlaybackState;
use crate::surface::SlideSurface;
use crate::timer::{TimerHandle, TimerQueue};

/// Notifications for whoever drives the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    TransitionStarted { slide: SlideId },
    /// A slide finished its motion and hold time.
    TransitionComplete,
    /// Playback stalled on a slide that is not ready yet.
    Waiting,
    /// Every slide has either loaded or failed.
    LoadingComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerEvent {
    Rearm,
    Retire(SlideId),
    Clear(SlideId),
}

pub struct Scheduler<S: SlideSurface> {
    registry: SlideRegistry<S>,
    animator: Option<Box<dyn Animator<S>>>,
    config: PlaybackConfig,
    container: Size,

    state: PlaybackState,
    timers: TimerQueue<TimerEvent>,
    rearm: Option<TimerHandle>,

    previous: Option<SlideId>,
    moves: u32,
    waiting: bool,
    loading_complete: bool,
    events: Vec<PlaybackEvent>,
}

impl<S: SlideSurface> Scheduler<S> {
    pub fn new(slides: Vec<SlideConfig>, capability: Capability, config: PlaybackConfig, container: Size) -> Self {
        let slides = slides
            .into_iter()
            .enumerate()
            .map(|(i, slide)| Slide::new(SlideId(i), slide.source.display().to_string(), slide.motion))
            .collect();

        let animator = animator::select(capability, &config);
        match &animator {
            Some(a) => info!("Using {} animation backend", a.name()),
            None => warn!("Playback disabled: {}", SlideshowError::CapabilityUnavailable),
        }

        Self {
            registry: SlideRegistry::new(slides),
            animator,
            config,
            container,
            state: PlaybackState::Idle,
            timers: TimerQueue::new(),
            rearm: None,
            previous: None,
            moves: 0,
            waiting: false,
            loading_complete: false,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn cursor(&self) -> usize {
        self.registry.cursor()
    }

    /// Ids of the slides still in rotation, in order.
    pub fn sequence(&self) -> Vec<SlideId> {
        self.registry.ids()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// True while playback is stalled on a slide (or the animator) that is
    /// not ready.
    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    /// Slides that still need to be fetched, with their sources.
    pub fn pending_sources(&self) -> Vec<(SlideId, String)> {
        self.registry
            .iter()
            .filter(|s| !s.is_loaded())
            .map(|s| (s.id(), s.source().to_string()))
            .collect()
    }

    pub fn surfaces(&self) -> impl Iterator<Item = &S> {
        self.registry.iter().filter_map(|s| s.resource())
    }

    pub fn surfaces_mut(&mut self) -> impl Iterator<Item = &mut S> {
        self.registry.iter_mut().filter_map(|s| s.resource_mut())
    }

    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.events)
    }

    /// Container geometry is read again on every transition.
    pub fn set_container_size(&mut self, container: Size) {
        self.container = container;
    }

    // --- Signals ---

    pub fn slide_loaded(&mut self, id: SlideId, resource: S, dimensions: Size) {
        match self.registry.mark_loaded(id, resource, dimensions) {
            Ok(()) => debug!("Slide {} loaded ({}x{})", id, dimensions.width, dimensions.height),
            Err(_) => {
                warn!("Ignoring load result for slide {}, it is no longer pending", id);
                return;
            }
        }
        self.check_loading_complete();
        self.try_to_play();
    }

    pub fn slide_failed(&mut self, id: SlideId, error: &SlideshowError) {
        let Some((index, slide)) = self.registry.remove_failed(id) else {
            warn!("Ignoring failure for slide {}, it is no longer pending: {}", id, error);
            return;
        };
        warn!("Dropping slide {} ({}) at position {}: {}", id, slide.source(), index, error);

        if self.registry.is_empty() {
            warn!("Every slide failed to load, nothing left to play");
        }
        self.check_loading_complete();
        self.try_to_play();
    }

    /// The external utility the compatibility backend depends on is available.
    pub fn utility_ready(&mut self) {
        if let Some(animator) = self.animator.as_mut() {
            if !animator.is_ready() {
                animator.mark_ready();
                info!("{} animation backend ready", animator.name());
            }
        }
        self.try_to_play();
    }

    pub fn suspend(&mut self) {
        if self.state == PlaybackState::Paused {
            return;
        }
        if let Some(handle) = self.rearm.take() {
            self.timers.cancel(handle);
        }
        debug!("Playback suspended at cursor {}", self.registry.cursor());
        self.state = PlaybackState::Paused;
    }

    pub fn resume(&mut self) {
        if self.state != PlaybackState::Paused {
            return;
        }
        debug!("Playback resumed");
        self.state = PlaybackState::Idle;
        self.try_to_play();
    }

    /// Moves the clock forward, firing every timer that falls due on the way.
    pub fn advance(&mut self, dt: Duration) {
        let until = self.timers.now() + dt;
        while let Some(event) = self.timers.pop_due(until) {
            self.handle_timer(event);
        }
        self.timers.settle(until);
    }

    // --- State machine ---

    fn handle_timer(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::Rearm => {
                self.rearm = None;
                self.events.push(PlaybackEvent::TransitionComplete);
                if self.state == PlaybackState::Transitioning {
                    self.state = PlaybackState::Idle;
                }
                self.try_to_play();
            }
            TimerEvent::Retire(id) => {
                // Back on stage since the timer was armed
                if self.previous == Some(id) {
                    return;
                }
                if let (Some(animator), Some(surface)) = (
                    self.animator.as_deref(),
                    self.registry.get_mut(id).and_then(|s| s.resource_mut()),
                ) {
                    animator.retire(surface);
                    self.timers.schedule(RETIRE_FADE_DELAY, TimerEvent::Clear(id));
                }
            }
            TimerEvent::Clear(id) => {
                if self.previous == Some(id) {
                    return;
                }
                if let (Some(animator), Some(surface)) = (
                    self.animator.as_deref(),
                    self.registry.get_mut(id).and_then(|s| s.resource_mut()),
                ) {
                    animator.clear(surface);
                }
            }
        }
    }

    /// A single slide still gets shown once; cycling needs two.
    fn can_cycle(&self) -> bool {
        match self.registry.len() {
            0 => false,
            1 => self.moves == 0,
            _ => true,
        }
    }

    fn try_to_play(&mut self) {
        if self.state != PlaybackState::Idle || !self.can_cycle() {
            return;
        }
        // Cursor repair after a removal can land on the slide still on stage
        if self.registry.len() >= 2 && self.registry.current().map(|s| s.id()) == self.previous {
            let cursor = self.registry.advance();
            debug!("Skipping the slide on stage, cursor now {}", cursor);
        }
        let Some(animator) = self.animator.as_deref() else {
            return;
        };
        let current_ready = self.registry.current().is_some_and(|s| s.is_loaded());

        if animator.is_ready() && current_ready {
            self.make_move();
        } else {
            self.wait();
        }
    }

    fn wait(&mut self) {
        if !self.waiting {
            debug!("Waiting for slide at cursor {}", self.registry.cursor());
            self.waiting = true;
            self.events.push(PlaybackEvent::Waiting);
        }
    }

    fn make_move(&mut self) {
        let Some(animator) = self.animator.as_deref() else {
            return;
        };
        let container = self.container;
        let z_order = self.moves + 1;

        let Some(slide) = self.registry.current_mut() else {
            return;
        };
        let Some(image) = slide.dimensions() else {
            return;
        };
        let id = slide.id();
        let motion = slide.motion().clone();
        let corners = compute_corners(container, image, &motion);
        let request = MoveRequest {
            corners,
            image,
            start_scale: motion.start_scale,
            end_scale: motion.end_scale,
            duration: motion.duration(),
            z_order,
        };
        let Some(surface) = slide.resource_mut() else {
            return;
        };
        animator.animate(surface, &request);

        // Cross-fade: the outgoing slide leaves once the new one is opaque
        if let Some(previous) = self.previous.filter(|p| *p != id) {
            self.timers.schedule(self.config.fade(), TimerEvent::Retire(previous));
        }

        self.moves = z_order;
        self.previous = Some(id);
        self.registry.advance();
        self.rearm = Some(self.timers.schedule(motion.duration() + self.config.pause(), TimerEvent::Rearm));

        self.state = PlaybackState::Transitioning;
        self.waiting = false;
        self.events.push(PlaybackEvent::TransitionStarted { slide: id });
        debug!("Slide {} on stage, next cursor {}", id, self.registry.cursor());
    }

    fn check_loading_complete(&mut self) {
        if !self.loading_complete && self.registry.pending() == 0 {
            self.loading_complete = true;
            info!("All slides settled, {} in rotation", self.registry.len());
            self.events.push(PlaybackEvent::LoadingComplete);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::{CornerFlags, MotionDescriptor};
    use crate::surface::testing::{RecordingSurface, SurfaceCall};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn slides(n: usize, duration_ms: u64) -> Vec<SlideConfig> {
        (0..n)
            .map(|i| SlideConfig {
                source: format!("{i}.jpg").into(),
                motion: MotionDescriptor {
                    start: CornerFlags::TOP_LEFT,
                    end: CornerFlags::BOTTOM_RIGHT,
                    start_scale: 1.0,
                    end_scale: 1.2,
                    duration_ms,
                },
            })
            .collect()
    }

    fn scheduler(n: usize, capability: Capability) -> Scheduler<RecordingSurface> {
        let config = PlaybackConfig::new(100, 200, crate::easing::Easing::Linear).unwrap();
        Scheduler::new(slides(n, 1000), capability, config, Size::new(1920.0, 1080.0))
    }

    fn load(s: &mut Scheduler<RecordingSurface>, id: usize) {
        s.slide_loaded(SlideId(id), RecordingSurface::default(), Size::new(2400.0, 1600.0));
    }

    fn fail(s: &mut Scheduler<RecordingSurface>, id: usize) {
        s.slide_failed(SlideId(id), &SlideshowError::load(format!("{id}.jpg"), "not found"));
    }

    fn started(events: &[PlaybackEvent]) -> Vec<usize> {
        events
            .iter()
            .filter_map(|e| match e {
                PlaybackEvent::TransitionStarted { slide } => Some(slide.0),
                _ => None,
            })
            .collect()
    }

    /// Advances in 10 ms steps and records when each transition starts.
    fn run(s: &mut Scheduler<RecordingSurface>, total_ms: u64) -> Vec<(u64, usize)> {
        let mut log = Vec::new();
        for e in started(&s.drain_events()) {
            log.push((s.now().as_millis() as u64, e));
        }
        for _ in 0..total_ms / 10 {
            s.advance(ms(10));
            for e in started(&s.drain_events()) {
                log.push((s.now().as_millis() as u64, e));
            }
        }
        log
    }

    fn surface(s: &mut Scheduler<RecordingSurface>, id: usize) -> &mut RecordingSurface {
        s.registry.get_mut(SlideId(id)).and_then(|s| s.resource_mut()).unwrap()
    }

    #[test]
    fn starts_idle() {
        let s = scheduler(3, Capability::Transform);
        assert_eq!(s.state(), PlaybackState::Idle);
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn three_slides_cycle_on_schedule() {
        let config = PlaybackConfig::new(500, 200, crate::easing::Easing::Linear).unwrap();
        let mut s = Scheduler::new(slides(3, 1000), Capability::Transform, config, Size::new(800.0, 600.0));
        for id in 0..3 {
            load(&mut s, id);
        }
        let log = run(&mut s, 3700);
        assert_eq!(log, vec![(0, 0), (1200, 1), (2400, 2), (3600, 0)]);
    }

    #[test]
    fn cursor_visits_every_slide_in_order() {
        let mut s = scheduler(4, Capability::Transform);
        for id in [3, 1, 0, 2] {
            load(&mut s, id);
        }
        let order: Vec<usize> = run(&mut s, 11_000).into_iter().map(|(_, id)| id).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 0, 1, 2, 3, 0, 1]);
    }

    #[test]
    fn waits_for_the_current_slide() {
        let mut s = scheduler(3, Capability::Transform);
        load(&mut s, 1);
        assert_eq!(s.state(), PlaybackState::Idle);
        assert!(s.is_waiting());
        assert_eq!(s.drain_events(), vec![PlaybackEvent::Waiting]);

        load(&mut s, 0);
        assert_eq!(s.state(), PlaybackState::Transitioning);
        assert!(!s.is_waiting());
        assert_eq!(started(&s.drain_events()), vec![0]);
    }

    #[test]
    fn stalls_on_unloaded_next_slide_and_resumes_on_load() {
        let mut s = scheduler(3, Capability::Transform);
        load(&mut s, 0);
        load(&mut s, 1);
        s.drain_events();

        // 0 at t=0, 1 at t=1200, slide 2 is still missing at t=2400
        s.advance(ms(2400));
        let events = s.drain_events();
        assert_eq!(started(&events), vec![1]);
        assert!(events.contains(&PlaybackEvent::Waiting));
        assert_eq!(s.state(), PlaybackState::Idle);

        load(&mut s, 2);
        assert_eq!(s.state(), PlaybackState::Transitioning);
        assert_eq!(started(&s.drain_events()), vec![2]);
    }

    #[test]
    fn transition_complete_fires_once_per_hand_off() {
        let mut s = scheduler(2, Capability::Transform);
        load(&mut s, 0);
        load(&mut s, 1);
        s.drain_events();
        s.advance(ms(3600));
        let completes = s
            .drain_events()
            .into_iter()
            .filter(|e| *e == PlaybackEvent::TransitionComplete)
            .count();
        assert_eq!(completes, 3);
    }

    #[test]
    fn loading_complete_is_emitted_once() {
        let mut s = scheduler(3, Capability::Transform);
        load(&mut s, 0);
        fail(&mut s, 1);
        assert!(!s.drain_events().contains(&PlaybackEvent::LoadingComplete));
        load(&mut s, 2);
        let events = s.drain_events();
        assert_eq!(events.iter().filter(|e| **e == PlaybackEvent::LoadingComplete).count(), 1);
    }

    #[test]
    fn failure_after_first_slide_keeps_rotating_survivors() {
        let mut s = scheduler(3, Capability::Transform);
        load(&mut s, 0);
        assert_eq!(s.cursor(), 1);

        fail(&mut s, 1);
        assert_eq!(s.sequence(), vec![SlideId(0), SlideId(2)]);
        assert!(s.cursor() < s.sequence().len());
        load(&mut s, 2);

        let order: Vec<usize> = run(&mut s, 8000).into_iter().map(|(_, id)| id).collect();
        assert!(!order.contains(&1));
        assert!(order.contains(&0) && order.contains(&2));
        assert_eq!(&order[..4], &[0, 2, 0, 2]);
        assert!(order.windows(2).all(|w| w[0] != w[1]), "{order:?}");
    }

    #[test]
    fn slide_on_stage_is_not_restarted_after_cursor_repair() {
        // Fade outlasts the pause, so slide 0 is still moving at the re-arm
        let config = PlaybackConfig::new(500, 200, crate::easing::Easing::Linear).unwrap();
        let mut s = Scheduler::new(slides(3, 1000), Capability::Transform, config, Size::new(800.0, 600.0));
        load(&mut s, 0);
        fail(&mut s, 1);
        load(&mut s, 2);
        surface(&mut s, 0).take();

        let log = run(&mut s, 1300);
        assert_eq!(log, vec![(0, 0), (1200, 2)]);
        assert!(surface(&mut s, 0).calls.is_empty());
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn all_slides_failing_leaves_engine_idle() {
        let mut s = scheduler(3, Capability::Transform);
        for id in 0..3 {
            fail(&mut s, id);
        }
        s.advance(ms(10_000));
        assert_eq!(s.state(), PlaybackState::Idle);
        assert!(s.is_empty());
        assert!(s.sequence().is_empty());
        let events = s.drain_events();
        assert!(started(&events).is_empty());
        assert!(!events.contains(&PlaybackEvent::TransitionComplete));
    }

    #[test]
    fn single_slide_is_shown_once() {
        let mut s = scheduler(1, Capability::Transform);
        load(&mut s, 0);
        let log = run(&mut s, 5000);
        assert_eq!(log, vec![(0, 0)]);
        assert_eq!(s.state(), PlaybackState::Idle);
        assert!(!s.is_waiting());
    }

    #[test]
    fn shrinking_to_one_slide_stops_cycling() {
        let mut s = scheduler(2, Capability::Transform);
        load(&mut s, 0);
        fail(&mut s, 1);
        let log = run(&mut s, 5000);
        assert_eq!(log, vec![(0, 0)]);
        assert_eq!(s.state(), PlaybackState::Idle);
    }

    #[test]
    fn pause_cancels_rearm_and_resume_fires_once() {
        let mut s = scheduler(3, Capability::Transform);
        for id in 0..3 {
            load(&mut s, id);
        }
        s.drain_events();
        s.advance(ms(500));
        s.suspend();
        assert_eq!(s.state(), PlaybackState::Paused);
        assert_eq!(s.cursor(), 1);

        s.advance(ms(5000));
        assert!(started(&s.drain_events()).is_empty());

        s.resume();
        assert_eq!(s.state(), PlaybackState::Transitioning);
        assert_eq!(started(&s.drain_events()), vec![1]);

        // Only the new re-arm remains: next slide exactly duration + pause later
        let log = run(&mut s, 1200);
        assert_eq!(log.iter().map(|(_, id)| *id).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn suspend_and_resume_are_idempotent() {
        let mut s = scheduler(2, Capability::Transform);
        load(&mut s, 0);
        load(&mut s, 1);
        s.drain_events();
        s.suspend();
        s.suspend();
        s.resume();
        s.resume();
        assert_eq!(started(&s.drain_events()), vec![1]);
    }

    #[test]
    fn loads_while_paused_do_not_start_playback() {
        let mut s = scheduler(2, Capability::Transform);
        s.suspend();
        load(&mut s, 0);
        load(&mut s, 1);
        assert_eq!(s.state(), PlaybackState::Paused);
        assert!(started(&s.drain_events()).is_empty());
        s.resume();
        assert_eq!(started(&s.drain_events()), vec![0]);
    }

    #[test]
    fn compat_backend_waits_for_utility() {
        let mut s = scheduler(2, Capability::Compatibility);
        load(&mut s, 0);
        load(&mut s, 1);
        assert_eq!(s.state(), PlaybackState::Idle);
        assert!(s.is_waiting());
        assert!(started(&s.drain_events()).is_empty());

        s.utility_ready();
        assert_eq!(s.state(), PlaybackState::Transitioning);
        assert_eq!(started(&s.drain_events()), vec![0]);
        assert!(matches!(surface(&mut s, 0).calls[0], SurfaceCall::SetBounds(_)));
    }

    #[test]
    fn unavailable_capability_stays_idle() {
        let mut s = scheduler(2, Capability::Unavailable);
        load(&mut s, 0);
        load(&mut s, 1);
        s.utility_ready();
        s.advance(ms(10_000));
        assert_eq!(s.state(), PlaybackState::Idle);
        assert!(started(&s.drain_events()).is_empty());
    }

    #[test]
    fn previous_slide_is_retired_after_fade() {
        let mut s = scheduler(2, Capability::Transform);
        load(&mut s, 0);
        load(&mut s, 1);
        s.advance(ms(1200)); // slide 1 goes on stage
        surface(&mut s, 0).take();

        s.advance(ms(99));
        assert!(surface(&mut s, 0).calls.is_empty());
        s.advance(ms(1));
        assert_eq!(surface(&mut s, 0).take(), vec![SurfaceCall::SendToBack]);
        s.advance(ms(20));
        assert_eq!(surface(&mut s, 0).take(), vec![SurfaceCall::SetOpacity(0.0)]);
    }

    #[test]
    fn move_uses_computed_corners_and_rising_z_order() {
        let mut s = scheduler(2, Capability::Transform);
        load(&mut s, 0);
        load(&mut s, 1);
        s.advance(ms(1200));

        let expected_end = {
            let configs = slides(1, 1000);
            let motion = &configs[0].motion;
            let c = compute_corners(Size::new(1920.0, 1080.0), Size::new(2400.0, 1600.0), motion);
            crate::geometry::Transform::new(motion.end_scale, c.end_x, c.end_y)
        };
        let calls = surface(&mut s, 1).take();
        assert_eq!(calls[1], SurfaceCall::BringToFront(2));
        assert_eq!(
            calls[2],
            SurfaceCall::TransitionTransform(expected_end, ms(1100), crate::easing::Easing::Linear)
        );
    }

    #[test]
    fn late_results_for_removed_slides_are_ignored() {
        let mut s = scheduler(3, Capability::Transform);
        fail(&mut s, 1);
        load(&mut s, 1);
        fail(&mut s, 1);
        assert_eq!(s.sequence(), vec![SlideId(0), SlideId(2)]);
    }

    #[test]
    fn pending_sources_lists_unloaded_slides() {
        let mut s = scheduler(3, Capability::Transform);
        load(&mut s, 1);
        let pending: Vec<SlideId> = s.pending_sources().into_iter().map(|(id, _)| id).collect();
        assert_eq!(pending, vec![SlideId(0), SlideId(2)]);
    }
}
