//! Platform abstraction layer
//!
//! A `Host` hands the scheduler everything it needs from the outside world:
//! - The drawing surface (and its current size)
//! - Repaint-paced frame callbacks, with cancellation
//! - Viewport resize notifications

pub mod manual;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use manual::ManualHost;
#[cfg(target_arch = "wasm32")]
pub use web::{BrowserHost, FieldHandle};

use crate::FieldError;
use crate::renderer::DrawSurface;
use crate::sim::Viewport;

/// Invoked once at the next repaint with a timestamp in milliseconds
pub type FrameCallback = Box<dyn FnOnce(f64)>;
/// Invoked with the new viewport each time it changes
pub type ResizeCallback = Box<dyn FnMut(Viewport)>;

pub trait Host {
    type Surface: DrawSurface;
    /// Token for a pending frame request
    type FrameHandle;
    /// Owns a registered resize listener
    type ListenerHandle;

    /// Acquire the drawing surface, sized to the current viewport
    fn acquire_surface(&self) -> Result<(Self::Surface, Viewport), FieldError>;

    /// Schedule `callback` for the next repaint
    fn request_frame(&self, callback: FrameCallback) -> Result<Self::FrameHandle, FieldError>;

    /// Cancel a pending frame; its callback must never run afterwards
    fn cancel_frame(&self, handle: Self::FrameHandle);

    fn listen_resize(&self, callback: ResizeCallback) -> Result<Self::ListenerHandle, FieldError>;

    fn unlisten_resize(&self, listener: Self::ListenerHandle);
}
