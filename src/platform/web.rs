//! Browser host: `<canvas>` + `requestAnimationFrame` + window resize
//!
//! Also exports `FieldHandle`, the mount/unmount hooks the page calls.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

use super::{FrameCallback, Host, ResizeCallback};
use crate::FieldError;
use crate::renderer::{CanvasSurface, DrawSurface};
use crate::scheduler::FrameScheduler;
use crate::settings::{FieldSettings, Sizing, Variant};
use crate::sim::Viewport;

/// Canvas attribute holding a JSON settings patch
pub const CONFIG_ATTRIBUTE: &str = "data-particle-config";

fn js_error(context: &str, err: JsValue) -> FieldError {
    FieldError::Host(format!("{}: {:?}", context, err))
}

/// Measure the viewport the way `sizing` asks
fn measure(window: &Window, canvas: &HtmlCanvasElement, sizing: Sizing) -> Viewport {
    match sizing {
        Sizing::Window => {
            let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
            Viewport::new(dim(window.inner_width()), dim(window.inner_height()))
        }
        Sizing::Element => Viewport::new(canvas.offset_width() as f32, canvas.offset_height() as f32),
    }
}

/// Keeps a registered resize closure alive until it is removed
pub struct ResizeListener {
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

pub struct BrowserHost {
    window: Option<Window>,
    canvas: Option<HtmlCanvasElement>,
    sizing: Sizing,
}

impl BrowserHost {
    pub fn new(canvas: Option<HtmlCanvasElement>, sizing: Sizing) -> Self {
        Self {
            window: web_sys::window(),
            canvas,
            sizing,
        }
    }

    fn window(&self) -> Result<&Window, FieldError> {
        self.window
            .as_ref()
            .ok_or_else(|| FieldError::Host("no window".into()))
    }
}

impl Host for BrowserHost {
    type Surface = CanvasSurface;
    type FrameHandle = i32;
    type ListenerHandle = ResizeListener;

    fn acquire_surface(&self) -> Result<(CanvasSurface, Viewport), FieldError> {
        let window = self
            .window
            .as_ref()
            .ok_or_else(|| FieldError::SurfaceUnavailable("no window".into()))?;
        let canvas = self
            .canvas
            .clone()
            .ok_or_else(|| FieldError::SurfaceUnavailable("canvas not found".into()))?;
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or_else(|| FieldError::SurfaceUnavailable("2d context unavailable".into()))?;

        let viewport = measure(window, &canvas, self.sizing);
        let mut surface = CanvasSurface::new(canvas, ctx);
        surface.resize(viewport);
        Ok((surface, viewport))
    }

    fn request_frame(&self, callback: FrameCallback) -> Result<i32, FieldError> {
        // Frees itself after running; a cancelled one is never invoked
        let closure = Closure::once_into_js(move |time: f64| callback(time));
        self.window()?
            .request_animation_frame(closure.unchecked_ref())
            .map_err(|e| js_error("requestAnimationFrame", e))
    }

    fn cancel_frame(&self, handle: i32) {
        if let Some(window) = &self.window {
            let _ = window.cancel_animation_frame(handle);
        }
    }

    fn listen_resize(&self, mut callback: ResizeCallback) -> Result<ResizeListener, FieldError> {
        let window = self.window()?.clone();
        let canvas = self
            .canvas
            .clone()
            .ok_or_else(|| FieldError::Host("canvas not found".into()))?;
        let sizing = self.sizing;

        let target = window.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            callback(measure(&window, &canvas, sizing));
        });
        target
            .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())
            .map_err(|e| js_error("addEventListener(resize)", e))?;
        Ok(ResizeListener { closure })
    }

    fn unlisten_resize(&self, listener: ResizeListener) {
        if let Some(window) = &self.window {
            let _ = window
                .remove_event_listener_with_callback("resize", listener.closure.as_ref().unchecked_ref());
        }
    }
}

/// A mounted particle field, as seen from JavaScript
#[wasm_bindgen]
pub struct FieldHandle {
    scheduler: FrameScheduler<BrowserHost>,
}

#[wasm_bindgen]
impl FieldHandle {
    /// Mount a field on the canvas with id `canvas_id`
    ///
    /// Never throws: an unknown variant falls back to `background`, and a
    /// missing canvas or 2D context leaves the handle idle.
    #[wasm_bindgen(constructor)]
    pub fn mount(canvas_id: &str, variant: &str) -> FieldHandle {
        let canvas = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(canvas_id))
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok());
        Self::mount_canvas(canvas, variant)
    }

    /// Unmount: stop the loop and release listeners. Safe to call twice.
    pub fn unmount(&self) {
        self.scheduler.stop();
    }

    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        self.scheduler.state().as_str().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn fps(&self) -> u32 {
        self.scheduler.fps()
    }
}

impl FieldHandle {
    pub fn mount_canvas(canvas: Option<HtmlCanvasElement>, variant: &str) -> FieldHandle {
        let variant = Variant::from_name(variant).unwrap_or_else(|| {
            log::warn!("Unknown particle field variant '{}', using background", variant);
            Variant::Background
        });
        let preset = FieldSettings::for_variant(variant);
        let settings = match canvas.as_ref().and_then(|c| c.get_attribute(CONFIG_ATTRIBUTE)) {
            Some(json) => preset.with_overrides(&json).unwrap_or_else(|e| {
                log::warn!("Ignoring {}: {}", CONFIG_ATTRIBUTE, e);
                preset.clone()
            }),
            None => preset,
        };

        let host = BrowserHost::new(canvas, settings.sizing);
        let seed = js_sys::Date::now() as u64;
        let scheduler = FrameScheduler::new(host, settings, seed);
        scheduler.start();
        FieldHandle { scheduler }
    }
}
