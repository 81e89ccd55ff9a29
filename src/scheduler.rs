//! Frame loop lifecycle
//!
//! `Idle → Running → Stopped`. A running scheduler always holds exactly one
//! pending frame request; each callback finishes its frame before asking for
//! the next, so frames never overlap. `stop()` cancels that request and
//! removes the resize listener, and nothing renders after it returns.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::FieldError;
use crate::consts::STATS_LOG_INTERVAL;
use crate::field::ParticleField;
use crate::platform::Host;
use crate::settings::FieldSettings;
use crate::sim::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Not started, or the surface was unavailable
    Idle,
    Running,
    /// Torn down; terminal
    Stopped,
}

impl SchedulerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulerState::Idle => "idle",
            SchedulerState::Running => "running",
            SchedulerState::Stopped => "stopped",
        }
    }
}

/// Rolling frame timing
#[derive(Debug, Clone)]
pub struct FrameStats {
    frame_times: [f64; 60],
    frame_index: usize,
    frames: u64,
    fps: u32,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self {
            frame_times: [0.0; 60],
            frame_index: 0,
            frames: 0,
            fps: 0,
        }
    }
}

impl FrameStats {
    /// Record a frame at `time` (ms)
    pub fn record(&mut self, time: f64) {
        self.frames += 1;
        self.frame_times[self.frame_index] = time;
        self.frame_index = (self.frame_index + 1) % self.frame_times.len();

        // Slot we'll overwrite next holds the oldest sample
        let oldest = self.frame_times[self.frame_index];
        if oldest > 0.0 {
            let elapsed = time - oldest;
            if elapsed > 0.0 {
                let span = (self.frame_times.len() - 1) as f64;
                self.fps = (span * 1000.0 / elapsed).round() as u32;
            }
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}

/// The host plus out-of-band requests
///
/// Lives outside the `RefCell` so callbacks can reach it even while a frame
/// (or a caller) holds the field state.
struct Driver<H: Host> {
    host: H,
    pending_frame: RefCell<Option<H::FrameHandle>>,
    stop: Cell<bool>,
    resize: Cell<Option<Viewport>>,
}

impl<H: Host> Driver<H> {
    fn cancel_pending(&self) {
        if let Some(handle) = self.pending_frame.take() {
            self.host.cancel_frame(handle);
        }
    }
}

struct Shared<H: Host> {
    settings: FieldSettings,
    seed: u64,
    state: SchedulerState,
    mount_attempted: bool,
    field: Option<ParticleField<H::Surface>>,
    resize_listener: Option<H::ListenerHandle>,
    stats: FrameStats,
}

impl<H: Host> Shared<H> {
    /// Release everything; safe to call repeatedly
    fn teardown(&mut self, driver: &Driver<H>) {
        let was = self.state;
        self.state = SchedulerState::Stopped;
        driver.cancel_pending();
        if let Some(listener) = self.resize_listener.take() {
            driver.host.unlisten_resize(listener);
        }
        self.field = None;
        if was == SchedulerState::Running {
            log::info!("Particle field stopped after {} frames", self.stats.frames());
        }
    }

    fn apply_resize(&mut self, viewport: Viewport) {
        if self.state != SchedulerState::Running {
            return;
        }
        if let Some(field) = self.field.as_mut() {
            field.resize(viewport);
        }
    }
}

/// Drives one particle field from mount to unmount
pub struct FrameScheduler<H: Host + 'static> {
    shared: Rc<RefCell<Shared<H>>>,
    driver: Rc<Driver<H>>,
}

impl<H: Host + 'static> FrameScheduler<H> {
    pub fn new(host: H, settings: FieldSettings, seed: u64) -> Self {
        Self {
            shared: Rc::new(RefCell::new(Shared {
                settings,
                seed,
                state: SchedulerState::Idle,
                mount_attempted: false,
                field: None,
                resize_listener: None,
                stats: FrameStats::default(),
            })),
            driver: Rc::new(Driver {
                host,
                pending_frame: RefCell::new(None),
                stop: Cell::new(false),
                resize: Cell::new(None),
            }),
        }
    }

    /// Mount: acquire the surface, spawn, and start the frame loop
    ///
    /// Only the first call does anything. If the surface is unavailable the
    /// scheduler stays `Idle` for good.
    pub fn start(&self) -> SchedulerState {
        let mut s = self.shared.borrow_mut();
        if s.mount_attempted || s.state != SchedulerState::Idle {
            return s.state;
        }
        s.mount_attempted = true;

        let (surface, viewport) = match self.driver.host.acquire_surface() {
            Ok(acquired) => acquired,
            Err(e) => {
                log::warn!("{}; particle field stays idle", e);
                return s.state;
            }
        };

        let field = ParticleField::new(s.settings.clone(), surface, viewport, s.seed);
        log::info!(
            "Particle field ({}) running: {} particles in {}x{}",
            s.settings.variant.as_str(),
            field.particles().len(),
            viewport.width,
            viewport.height
        );
        s.field = Some(field);
        s.state = SchedulerState::Running;

        let on_resize = resize_callback(Rc::downgrade(&self.driver), Rc::downgrade(&self.shared));
        match self.driver.host.listen_resize(on_resize) {
            Ok(listener) => s.resize_listener = Some(listener),
            Err(e) => log::warn!("{}; particle field will not follow resizes", e),
        }

        if let Err(e) = schedule_next(&self.driver, Rc::downgrade(&self.shared)) {
            log::error!("{}; stopping particle field", e);
            s.teardown(&self.driver);
        }
        s.state
    }

    /// Unmount: cancel the pending frame and drop the listener
    ///
    /// Idempotent. If a frame is mid-flight the teardown happens before that
    /// frame draws or reschedules.
    pub fn stop(&self) {
        self.driver.stop.set(true);
        match self.shared.try_borrow_mut() {
            Ok(mut s) => s.teardown(&self.driver),
            Err(_) => log::debug!("Stop requested mid-frame; deferring teardown"),
        }
    }

    /// `Stopped` as soon as a stop is requested, even if teardown is deferred
    pub fn state(&self) -> SchedulerState {
        if self.driver.stop.get() {
            return SchedulerState::Stopped;
        }
        self.shared.borrow().state
    }

    /// Frames rendered so far
    pub fn frames(&self) -> u64 {
        self.shared.borrow().stats.frames()
    }

    pub fn fps(&self) -> u32 {
        self.shared.borrow().stats.fps()
    }

    /// Inspect the live field, if running
    pub fn with_field<R>(&self, f: impl FnOnce(&ParticleField<H::Surface>) -> R) -> Option<R> {
        self.shared.borrow().field.as_ref().map(f)
    }
}

impl<H: Host + 'static> Drop for FrameScheduler<H> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn schedule_next<H: Host + 'static>(driver: &Rc<Driver<H>>, shared: Weak<RefCell<Shared<H>>>) -> Result<(), FieldError> {
    let weak_driver = Rc::downgrade(driver);
    let callback = Box::new(move |time: f64| on_frame(&weak_driver, &shared, time));
    let handle = driver.host.request_frame(callback)?;
    *driver.pending_frame.borrow_mut() = Some(handle);
    Ok(())
}

fn on_frame<H: Host + 'static>(driver: &Weak<Driver<H>>, shared: &Weak<RefCell<Shared<H>>>, time: f64) {
    let (Some(driver), Some(shared_rc)) = (driver.upgrade(), shared.upgrade()) else {
        return;
    };
    // This frame's handle is spent
    driver.pending_frame.take();

    let Ok(mut s) = shared_rc.try_borrow_mut() else {
        // Skip drawing but keep the loop (and any deferred stop) alive
        log::warn!("Frame fired while field state was busy; retrying next frame");
        if let Err(e) = schedule_next(&driver, shared.clone()) {
            log::error!("{}; stopping particle field", e);
            driver.stop.set(true);
        }
        return;
    };

    if driver.stop.get() {
        s.teardown(&driver);
        return;
    }
    if s.state != SchedulerState::Running {
        return;
    }
    if let Some(viewport) = driver.resize.take() {
        s.apply_resize(viewport);
    }

    s.stats.record(time);
    if let Some(field) = s.field.as_mut() {
        field.frame();
    }
    if s.stats.frames() % STATS_LOG_INTERVAL == 0 {
        let particles = s.field.as_ref().map_or(0, |f| f.particles().len());
        log::debug!("Particle field: {} fps, {} particles", s.stats.fps(), particles);
    }

    if driver.stop.get() {
        s.teardown(&driver);
        return;
    }
    if let Err(e) = schedule_next(&driver, shared.clone()) {
        log::error!("{}; stopping particle field", e);
        s.teardown(&driver);
    }
}

fn resize_callback<H: Host + 'static>(
    driver: Weak<Driver<H>>,
    shared: Weak<RefCell<Shared<H>>>,
) -> Box<dyn FnMut(Viewport)> {
    Box::new(move |viewport: Viewport| {
        let (Some(driver), Some(shared_rc)) = (driver.upgrade(), shared.upgrade()) else {
            return;
        };
        match shared_rc.try_borrow_mut() {
            Ok(mut s) => s.apply_resize(viewport),
            // Picked up at the start of the next frame
            Err(_) => driver.resize.set(Some(viewport)),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::ManualHost;
    use crate::settings::Variant;

    const FRAME_MS: f64 = 1000.0 / 60.0;

    fn running(viewport: Viewport) -> (FrameScheduler<ManualHost>, ManualHost) {
        let host = ManualHost::new(viewport);
        let scheduler = FrameScheduler::new(host.clone(), FieldSettings::default(), 7);
        assert_eq!(scheduler.start(), SchedulerState::Running);
        (scheduler, host)
    }

    #[test]
    fn test_start_schedules_one_frame_and_listens() {
        let (scheduler, host) = running(Viewport::new(1000.0, 800.0));
        assert_eq!(host.pending_frames(), 1);
        assert_eq!(host.listener_count(), 1);
        assert_eq!(scheduler.with_field(|f| f.particles().len()), Some(100));
    }

    #[test]
    fn test_each_frame_requests_exactly_one_more() {
        let (scheduler, host) = running(Viewport::new(800.0, 600.0));
        let surface = host.surface().unwrap();
        for i in 1..=5 {
            assert_eq!(host.advance(i as f64 * FRAME_MS), 1);
            assert_eq!(host.pending_frames(), 1);
        }
        assert_eq!(scheduler.frames(), 5);
        assert_eq!(surface.frames(), 5);
    }

    #[test]
    fn test_unmount_before_first_frame() {
        let (scheduler, host) = running(Viewport::new(800.0, 600.0));
        let surface = host.surface().unwrap();

        scheduler.stop();
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
        assert_eq!(host.pending_frames(), 0);
        assert_eq!(host.listener_count(), 0);

        assert_eq!(host.advance(FRAME_MS), 0);
        assert_eq!(surface.frames(), 0);
        assert!(scheduler.with_field(|_| ()).is_none());
    }

    #[test]
    fn test_stop_is_idempotent_and_terminal() {
        let (scheduler, host) = running(Viewport::new(800.0, 600.0));
        host.advance(FRAME_MS);
        scheduler.stop();
        scheduler.stop();
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
        assert_eq!(scheduler.start(), SchedulerState::Stopped);
        assert_eq!(host.pending_frames(), 0);
    }

    #[test]
    fn test_stop_mid_frame_is_deferred_but_honored() {
        let (scheduler, host) = running(Viewport::new(800.0, 600.0));
        let surface = host.surface().unwrap();
        {
            // Simulate a frame holding the state when stop arrives
            let _busy = scheduler.shared.borrow();
            scheduler.stop();
        }
        assert_eq!(host.advance(FRAME_MS), 1);
        assert_eq!(surface.frames(), 0);
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
        assert_eq!(host.pending_frames(), 0);
        assert_eq!(host.listener_count(), 0);
    }

    #[test]
    fn test_frame_while_busy_is_skipped_not_lost() {
        let (scheduler, host) = running(Viewport::new(800.0, 600.0));
        let surface = host.surface().unwrap();

        // Fires while the field is borrowed for inspection
        let fired = scheduler.with_field(|_| host.advance(FRAME_MS));
        assert_eq!(fired, Some(1));
        assert_eq!(surface.frames(), 0);
        assert_eq!(host.pending_frames(), 1);
        assert_eq!(scheduler.state(), SchedulerState::Running);

        assert_eq!(host.advance(2.0 * FRAME_MS), 1);
        assert_eq!(surface.frames(), 1);
        assert_eq!(host.pending_frames(), 1);
    }

    #[test]
    fn test_deferred_stop_survives_busy_frame() {
        let (scheduler, host) = running(Viewport::new(800.0, 600.0));
        let surface = host.surface().unwrap();
        {
            let _busy = scheduler.shared.borrow();
            scheduler.stop();
            assert_eq!(scheduler.state(), SchedulerState::Stopped);
            host.advance(FRAME_MS);
        }
        assert_eq!(host.listener_count(), 1);

        // The retried frame performs the teardown
        assert_eq!(host.advance(2.0 * FRAME_MS), 1);
        assert_eq!(surface.frames(), 0);
        assert_eq!(host.pending_frames(), 0);
        assert_eq!(host.listener_count(), 0);
    }

    #[test]
    fn test_resize_respawns_without_leaving_running() {
        let (scheduler, host) = running(Viewport::new(1600.0, 900.0));
        host.advance(FRAME_MS);
        assert_eq!(scheduler.with_field(|f| f.particles().len()), Some(150));

        host.resize(Viewport::new(500.0, 400.0));
        assert_eq!(scheduler.state(), SchedulerState::Running);
        assert_eq!(scheduler.with_field(|f| f.particles().len()), Some(50));
        assert_eq!(host.surface().unwrap().viewport(), Viewport::new(500.0, 400.0));
        assert_eq!(host.pending_frames(), 1);
    }

    #[test]
    fn test_resize_mid_frame_lands_next_frame() {
        let (scheduler, host) = running(Viewport::new(1600.0, 900.0));
        {
            let _busy = scheduler.shared.borrow();
            host.resize(Viewport::new(300.0, 300.0));
        }
        assert_eq!(scheduler.with_field(|f| f.particles().len()), Some(150));
        host.advance(FRAME_MS);
        assert_eq!(scheduler.with_field(|f| f.particles().len()), Some(30));
    }

    #[test]
    fn test_missing_surface_stays_idle() {
        let host = ManualHost::without_surface();
        let scheduler = FrameScheduler::new(host.clone(), FieldSettings::default(), 1);
        assert_eq!(scheduler.start(), SchedulerState::Idle);
        assert_eq!(scheduler.start(), SchedulerState::Idle);
        assert_eq!(host.pending_frames(), 0);
        assert_eq!(host.listener_count(), 0);

        scheduler.stop();
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
    }

    #[test]
    fn test_drop_tears_down() {
        let host = ManualHost::new(Viewport::new(400.0, 300.0));
        {
            let scheduler = FrameScheduler::new(host.clone(), FieldSettings::for_variant(Variant::Overlay), 3);
            scheduler.start();
            host.advance(FRAME_MS);
            assert_eq!(host.pending_frames(), 1);
        }
        assert_eq!(host.pending_frames(), 0);
        assert_eq!(host.listener_count(), 0);
    }

    #[test]
    fn test_frame_stats_fps() {
        let mut stats = FrameStats::default();
        for i in 1..=120 {
            stats.record(i as f64 * FRAME_MS);
        }
        assert_eq!(stats.frames(), 120);
        assert_eq!(stats.fps(), 60);
    }
}
