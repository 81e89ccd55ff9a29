//! Particle Field entry point
//!
//! On the web, mounts a field on every `canvas[data-particle-field]` and
//! unmounts them all on `pagehide`. Natively, runs a headless simulation and
//! prints a JSON summary.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_page {
    use std::cell::RefCell;

    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    use particle_field::platform::FieldHandle;

    /// Attribute marking a canvas for auto-mount; its value names the variant
    const FIELD_ATTRIBUTE: &str = "data-particle-field";

    thread_local! {
        static MOUNTED: RefCell<Vec<FieldHandle>> = const { RefCell::new(Vec::new()) };
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Particle field logger already initialized".into());
        }

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        let Ok(nodes) = document.query_selector_all(&format!("canvas[{}]", FIELD_ATTRIBUTE)) else {
            return;
        };
        for i in 0..nodes.length() {
            let Some(canvas) = nodes
                .item(i)
                .and_then(|node| node.dyn_into::<HtmlCanvasElement>().ok())
            else {
                continue;
            };
            let variant = canvas.get_attribute(FIELD_ATTRIBUTE).unwrap_or_default();
            let handle = FieldHandle::mount_canvas(Some(canvas), &variant);
            MOUNTED.with(|m| m.borrow_mut().push(handle));
        }
        log::info!("Mounted {} particle field(s)", MOUNTED.with(|m| m.borrow().len()));

        // Tear everything down when the page goes away
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            MOUNTED.with(|m| {
                for handle in m.borrow_mut().drain(..) {
                    handle.unmount();
                }
            });
        });
        let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_page::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Particle Field (native) starting headless run...");

    let summary = headless::run(std::env::args().nth(1).as_deref());
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to encode summary: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use serde::Serialize;

    use particle_field::platform::ManualHost;
    use particle_field::sim::Viewport;
    use particle_field::{FieldSettings, FrameScheduler, Variant};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const FRAMES: u32 = 600;

    #[derive(Debug, Serialize)]
    pub struct Summary {
        variant: &'static str,
        state: &'static str,
        frames: u64,
        fps: u32,
        particles: usize,
        sprites_last_frame: usize,
        links_last_frame: usize,
        resizes: u32,
    }

    /// Simulate ten seconds at 60 Hz with a resize halfway through
    pub fn run(variant: Option<&str>) -> Summary {
        let variant = variant.and_then(Variant::from_name).unwrap_or_default();
        let host = ManualHost::new(Viewport::new(1280.0, 720.0));
        let scheduler = FrameScheduler::new(host.clone(), FieldSettings::for_variant(variant), 0x5EED);
        scheduler.start();

        for frame in 1..=FRAMES {
            if frame == FRAMES / 2 {
                host.resize(Viewport::new(1024.0, 768.0));
            }
            host.advance(frame as f64 * FRAME_MS);
        }

        let particles = scheduler.with_field(|f| f.particles().len()).unwrap_or(0);
        let surface = host.surface();
        let summary = Summary {
            variant: variant.as_str(),
            state: scheduler.state().as_str(),
            frames: scheduler.frames(),
            fps: scheduler.fps(),
            particles,
            sprites_last_frame: surface.as_ref().map_or(0, |s| s.fill_count()),
            links_last_frame: surface.as_ref().map_or(0, |s| s.stroke_count()),
            resizes: surface.as_ref().map_or(0, |s| s.resizes()),
        };
        scheduler.stop();
        summary
    }
}
