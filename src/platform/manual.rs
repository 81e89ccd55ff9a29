//! Manually driven host for headless runs and tests
//!
//! Frames fire only when `advance` is called and resizes only when `resize`
//! is called, so lifecycle behavior is fully deterministic. Clones share
//! state: keep one handle, give the other to the scheduler.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::{FrameCallback, Host, ResizeCallback};
use crate::FieldError;
use crate::renderer::RecordingSurface;
use crate::sim::Viewport;

struct ManualState {
    surface: Option<RecordingSurface>,
    viewport: Cell<Viewport>,
    next_id: Cell<u32>,
    frames: RefCell<Vec<(u32, FrameCallback)>>,
    listeners: RefCell<Vec<(u32, ResizeCallback)>>,
    /// Set while `resize` is calling listeners
    delivering: Cell<bool>,
    /// Listeners removed during that delivery
    removed: RefCell<Vec<u32>>,
}

#[derive(Clone)]
pub struct ManualHost {
    state: Rc<ManualState>,
}

impl ManualHost {
    /// Host with a recording surface of the given size
    pub fn new(viewport: Viewport) -> Self {
        Self::build(Some(RecordingSurface::new(viewport)), viewport)
    }

    /// Host whose surface can never be acquired
    pub fn without_surface() -> Self {
        Self::build(None, Viewport::default())
    }

    fn build(surface: Option<RecordingSurface>, viewport: Viewport) -> Self {
        Self {
            state: Rc::new(ManualState {
                surface,
                viewport: Cell::new(viewport),
                next_id: Cell::new(1),
                frames: RefCell::new(Vec::new()),
                listeners: RefCell::new(Vec::new()),
                delivering: Cell::new(false),
                removed: RefCell::new(Vec::new()),
            }),
        }
    }

    fn next_id(&self) -> u32 {
        let id = self.state.next_id.get();
        self.state.next_id.set(id + 1);
        id
    }

    /// Shared view of the surface the field draws on
    pub fn surface(&self) -> Option<RecordingSurface> {
        self.state.surface.clone()
    }

    pub fn pending_frames(&self) -> usize {
        self.state.frames.borrow().len()
    }

    pub fn listener_count(&self) -> usize {
        self.state.listeners.borrow().len()
    }

    /// Fire every frame requested so far; returns how many ran
    ///
    /// Frames requested by those callbacks wait for the next `advance`.
    pub fn advance(&self, time: f64) -> usize {
        let due = std::mem::take(&mut *self.state.frames.borrow_mut());
        let fired = due.len();
        for (_, callback) in due {
            callback(time);
        }
        fired
    }

    /// Deliver a resize to every registered listener
    pub fn resize(&self, viewport: Viewport) {
        self.state.viewport.set(viewport);
        let mut listeners = std::mem::take(&mut *self.state.listeners.borrow_mut());
        self.state.delivering.set(true);
        for (_, callback) in listeners.iter_mut() {
            callback(viewport);
        }
        self.state.delivering.set(false);
        // Keep anything registered during delivery, drop anything removed
        let removed = std::mem::take(&mut *self.state.removed.borrow_mut());
        listeners.retain(|(id, _)| !removed.contains(id));
        let mut current = self.state.listeners.borrow_mut();
        listeners.append(&mut current);
        *current = listeners;
    }
}

impl Host for ManualHost {
    type Surface = RecordingSurface;
    type FrameHandle = u32;
    type ListenerHandle = u32;

    fn acquire_surface(&self) -> Result<(RecordingSurface, Viewport), FieldError> {
        let surface = self
            .state
            .surface
            .clone()
            .ok_or_else(|| FieldError::SurfaceUnavailable("manual host has no surface".into()))?;
        Ok((surface, self.state.viewport.get()))
    }

    fn request_frame(&self, callback: FrameCallback) -> Result<u32, FieldError> {
        let id = self.next_id();
        self.state.frames.borrow_mut().push((id, callback));
        Ok(id)
    }

    fn cancel_frame(&self, handle: u32) {
        self.state.frames.borrow_mut().retain(|(id, _)| *id != handle);
    }

    fn listen_resize(&self, callback: ResizeCallback) -> Result<u32, FieldError> {
        let id = self.next_id();
        self.state.listeners.borrow_mut().push((id, callback));
        Ok(id)
    }

    fn unlisten_resize(&self, listener: u32) {
        self.state.listeners.borrow_mut().retain(|(id, _)| *id != listener);
        // Mid-delivery the listener is held by `resize`, not the list
        if self.state.delivering.get() {
            self.state.removed.borrow_mut().push(listener);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_fire_once_and_can_be_cancelled() {
        let host = ManualHost::new(Viewport::new(100.0, 100.0));
        let hits = Rc::new(Cell::new(0));

        let h = hits.clone();
        host.request_frame(Box::new(move |_| h.set(h.get() + 1))).unwrap();
        let h = hits.clone();
        let cancelled = host.request_frame(Box::new(move |_| h.set(h.get() + 100))).unwrap();
        host.cancel_frame(cancelled);

        assert_eq!(host.advance(16.0), 1);
        assert_eq!(hits.get(), 1);
        assert_eq!(host.advance(32.0), 0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_resize_reaches_listeners_until_removed() {
        let host = ManualHost::new(Viewport::new(100.0, 100.0));
        let seen = Rc::new(Cell::new(Viewport::default()));

        let s = seen.clone();
        let id = host.listen_resize(Box::new(move |vp| s.set(vp))).unwrap();
        host.resize(Viewport::new(640.0, 480.0));
        assert_eq!(seen.get(), Viewport::new(640.0, 480.0));
        assert_eq!(host.listener_count(), 1);

        host.unlisten_resize(id);
        host.resize(Viewport::new(1.0, 1.0));
        assert_eq!(seen.get(), Viewport::new(640.0, 480.0));
        assert_eq!(host.listener_count(), 0);
    }

    #[test]
    fn test_listener_removed_during_resize_stays_removed() {
        let host = ManualHost::new(Viewport::new(100.0, 100.0));
        let hits = Rc::new(Cell::new(0));
        let own_id = Rc::new(Cell::new(0));

        let (h, this, id_cell) = (hits.clone(), host.clone(), own_id.clone());
        let id = host
            .listen_resize(Box::new(move |_| {
                h.set(h.get() + 1);
                this.unlisten_resize(id_cell.get());
            }))
            .unwrap();
        own_id.set(id);

        host.resize(Viewport::new(200.0, 200.0));
        host.resize(Viewport::new(300.0, 300.0));
        assert_eq!(hits.get(), 1);
        assert_eq!(host.listener_count(), 0);
        assert!(host.state.removed.borrow().is_empty());
    }

    #[test]
    fn test_unlisten_outside_resize_keeps_no_record() {
        let host = ManualHost::new(Viewport::new(100.0, 100.0));
        for _ in 0..10 {
            let id = host.listen_resize(Box::new(|_| {})).unwrap();
            host.unlisten_resize(id);
        }
        assert_eq!(host.listener_count(), 0);
        assert!(host.state.removed.borrow().is_empty());
    }

    #[test]
    fn test_without_surface() {
        let host = ManualHost::without_surface();
        assert!(matches!(host.acquire_surface(), Err(FieldError::SurfaceUnavailable(_))));
    }
}
