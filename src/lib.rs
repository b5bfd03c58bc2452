// Re-export all public modules so they can be used from main.rs
pub mod config;
pub mod error;
pub mod logging;
pub mod scenes;

// MVC Architecture
pub mod controller;
pub mod model;
pub mod view;

pub use config::DemoConfig;
pub use error::DemoError;
pub use scenes::SceneKind;

#[cfg(target_arch = "wasm32")]
use std::{cell::RefCell, rc::Rc};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{closure::Closure, prelude::wasm_bindgen, JsCast, JsValue};
#[cfg(target_arch = "wasm32")]
use web_sys::{Document, Event, HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent, Window};

#[cfg(target_arch = "wasm32")]
use controller::{InputEvent, InputProcessor, InputState};
#[cfg(target_arch = "wasm32")]
use view::{GpuContext, SceneRenderer};

/// Drawing-buffer size for a CSS-pixel viewport, with the device pixel
/// ratio capped at `max_pixel_ratio`
pub fn physical_size(css_width: f64, css_height: f64, device_pixel_ratio: f64, max_pixel_ratio: f64) -> (u32, u32) {
    let ratio = device_pixel_ratio.min(max_pixel_ratio).max(0.0);
    let w = (css_width * ratio).round().max(1.0) as u32;
    let h = (css_height * ratio).round().max(1.0) as u32;
    (w, h)
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    logging::init();

    let (window, document, canvas) = init_canvas()?;
    let kind = scene_from_location(&window);
    setup_app(window, document, canvas, DemoConfig::default(), kind)
        .await
        .map_err(|e| {
            tracing::error!("setup failed: {e}");
            JsValue::from(e)
        })
}

/// `#blend` or `#world` in the URL picks a scene, anything else the default
#[cfg(target_arch = "wasm32")]
fn scene_from_location(window: &Window) -> SceneKind {
    let hash = window.location().hash().unwrap_or_default();
    if hash.is_empty() || hash == "#" {
        return SceneKind::default();
    }
    hash.parse().unwrap_or_else(|e| {
        tracing::warn!("{e}, using the default scene");
        SceneKind::default()
    })
}

/// Main application setup for WASM
#[cfg(target_arch = "wasm32")]
async fn setup_app(
    window: Window,
    document: Document,
    canvas: HtmlCanvasElement,
    config: DemoConfig,
    kind: SceneKind,
) -> Result<(), DemoError> {
    let max_pixel_ratio = config.max_pixel_ratio;
    let (css_w, css_h) = css_size(&window);
    let (width, height) = physical_size(css_w, css_h, window.device_pixel_ratio(), max_pixel_ratio);
    apply_canvas_size(&canvas, css_w, css_h, width, height)?;

    let gpu = GpuContext::new(&canvas, width, height).await?;
    let mut renderer = SceneRenderer::new(gpu.device.as_ref(), &gpu.config);
    let mut frame_ctx = kind.build(config, width, height);

    setup_input_listeners(
        &document,
        &window,
        &canvas,
        frame_ctx.input.clone(),
        frame_ctx.input_processor.clone(),
    )?;

    let mut last_time = window.performance().map(|p| p.now()).unwrap_or(0.0);

    // Continuous redraw using requestAnimationFrame
    let f = RcCellCallback::new(window.clone(), {
        let window_for_loop = window.clone();

        move || {
            let now = window_for_loop.performance().map(|p| p.now()).unwrap_or(last_time);
            let dt = ((now - last_time) / 1000.0).clamp(0.0, 0.1) as f32;
            last_time = now;

            // The page has no resize callback into the loop, so poll
            let (css_w, css_h) = css_size(&window_for_loop);
            let (w, h) = physical_size(css_w, css_h, window_for_loop.device_pixel_ratio(), max_pixel_ratio);
            if (w, h) != frame_ctx.viewport {
                if let Err(e) = apply_canvas_size(&canvas, css_w, css_h, w, h) {
                    tracing::warn!("canvas resize failed: {e}");
                }
                renderer.resize(gpu.device.as_ref(), &gpu.surface, w, h);
                frame_ctx.resize(w, h);
            }

            frame_ctx.tick(dt);

            match renderer.draw_frame(
                gpu.device.as_ref(),
                gpu.queue.as_ref(),
                &gpu.surface,
                &frame_ctx.scene,
                &frame_ctx.camera,
            ) {
                Ok(()) => true,
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    tracing::error!("out of GPU memory, stopping the frame loop");
                    false
                }
                Err(e) => {
                    tracing::warn!("frame skipped: {e}");
                    true
                }
            }
        }
    });
    f.start()?;

    Ok(())
}

/// Forward DOM events into the shared input state
#[cfg(target_arch = "wasm32")]
fn setup_input_listeners(
    document: &Document,
    window: &Window,
    canvas: &HtmlCanvasElement,
    input_state: Rc<RefCell<InputState>>,
    input_processor: InputProcessor,
) -> Result<(), JsValue> {
    // Keyboard down
    {
        let input_state = input_state.clone();
        let input_processor = input_processor.clone();
        let keydown = Closure::wrap(Box::new(move |e: KeyboardEvent| {
            // Keep space from scrolling the page
            if input_processor.is_bound(&e.key()) {
                e.prevent_default();
            }
            let event = controller::input::wasm::keyboard_event_to_input(&e, true);
            input_state.borrow_mut().process_event(&input_processor, &event);
        }) as Box<dyn FnMut(KeyboardEvent)>);
        window.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
        keydown.forget();
    }

    // Keyboard up
    {
        let input_state = input_state.clone();
        let input_processor = input_processor.clone();
        let keyup = Closure::wrap(Box::new(move |e: KeyboardEvent| {
            let event = controller::input::wasm::keyboard_event_to_input(&e, false);
            input_state.borrow_mut().process_event(&input_processor, &event);
        }) as Box<dyn FnMut(KeyboardEvent)>);
        window.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
        keyup.forget();
    }

    // Focus loss - clear all keys
    {
        let input_state = input_state.clone();
        let input_processor = input_processor.clone();
        let blur = Closure::wrap(Box::new(move |_e: Event| {
            input_state.borrow_mut().process_event(&input_processor, &InputEvent::FocusLost);
        }) as Box<dyn FnMut(Event)>);
        window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
        blur.forget();
    }

    // Visibility change - clear all keys
    {
        let input_state = input_state.clone();
        let input_processor = input_processor.clone();
        let doc = document.clone();
        let visibility = Closure::wrap(Box::new(move |_e: Event| {
            let event = InputEvent::VisibilityChanged { visible: !doc.hidden() };
            input_state.borrow_mut().process_event(&input_processor, &event);
        }) as Box<dyn FnMut(Event)>);
        document.add_event_listener_with_callback("visibilitychange", visibility.as_ref().unchecked_ref())?;
        visibility.forget();
    }

    // Drag with the primary button orbits the camera
    {
        let input_state = input_state.clone();
        let input_processor = input_processor.clone();
        let pointermove = Closure::wrap(Box::new(move |e: MouseEvent| {
            if e.buttons() & 1 != 0 {
                let event = InputEvent::PointerDrag {
                    dx: e.movement_x() as f32,
                    dy: e.movement_y() as f32,
                };
                input_state.borrow_mut().process_event(&input_processor, &event);
            }
        }) as Box<dyn FnMut(MouseEvent)>);
        canvas.add_event_listener_with_callback("pointermove", pointermove.as_ref().unchecked_ref())?;
        pointermove.forget();
    }

    // Mouse wheel
    {
        let wheel = Closure::wrap(Box::new(move |e: WheelEvent| {
            e.prevent_default();
            let event = controller::input::wasm::wheel_to_input(&e);
            input_state.borrow_mut().process_event(&input_processor, &event);
        }) as Box<dyn FnMut(WheelEvent)>);
        canvas.add_event_listener_with_callback("wheel", wheel.as_ref().unchecked_ref())?;
        wheel.forget();
    }

    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn css_size(window: &Window) -> (f64, f64) {
    let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0);
    let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0);
    (w, h)
}

#[cfg(target_arch = "wasm32")]
fn apply_canvas_size(
    canvas: &HtmlCanvasElement,
    css_width: f64,
    css_height: f64,
    width: u32,
    height: u32,
) -> Result<(), JsValue> {
    canvas.set_width(width);
    canvas.set_height(height);
    canvas.set_attribute(
        "style",
        &format!("display:block;width:{css_width}px;height:{css_height}px;touch-action:none"),
    )
}

#[cfg(target_arch = "wasm32")]
fn init_canvas() -> Result<(Window, Document, HtmlCanvasElement), JsValue> {
    let window = web_sys::window().ok_or(js_error("no global `window`"))?;
    let document = window.document().ok_or(js_error("no document on window"))?;
    let body = document.body().ok_or(js_error("no body on document"))?;
    let canvas_el = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| js_error("failed to create canvas"))?;
    canvas_el.set_class_name("webgl");
    body.append_child(&canvas_el)?;
    Ok((window, document, canvas_el))
}

#[cfg(target_arch = "wasm32")]
fn js_error<E: Into<String>>(msg: E) -> JsValue {
    JsValue::from_str(&msg.into())
}

/// A per-frame closure that re-arms itself with `requestAnimationFrame`
/// until it returns false
#[cfg(target_arch = "wasm32")]
struct RcCellCallback {
    inner: Rc<RefCell<Box<dyn FnMut() -> bool>>>,
    window: Window,
}

#[cfg(target_arch = "wasm32")]
impl RcCellCallback {
    fn new(window: Window, f: impl FnMut() -> bool + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Box::new(f))),
            window,
        }
    }

    fn start(self) -> Result<(), JsValue> {
        let inner = self.inner.clone();
        let window = self.window.clone();

        let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut()>>));
        let callback_clone = callback.clone();

        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            if !inner.borrow_mut().as_mut()() {
                return;
            }

            // Recursively schedule next frame
            let cb_ref = callback_clone.borrow();
            if let Some(cb) = cb_ref.as_ref() {
                if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    tracing::error!("requestAnimationFrame failed: {e:?}");
                }
            }
        }) as Box<dyn FnMut()>));

        if let Some(cb) = callback.borrow().as_ref() {
            self.window.request_animation_frame(cb.as_ref().unchecked_ref())?;
        }

        // Leak the closure to keep it alive
        std::mem::forget(callback);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_ratio_is_capped() {
        assert_eq!(physical_size(800.0, 600.0, 3.0, 2.0), (1600, 1200));
        assert_eq!(physical_size(800.0, 600.0, 1.0, 2.0), (800, 600));
    }

    #[test]
    fn zero_viewport_still_has_one_pixel() {
        assert_eq!(physical_size(0.0, 0.0, 1.0, 2.0), (1, 1));
    }
}
