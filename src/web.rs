use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::{Float32Array, Uint16Array};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, KeyboardEvent, WebGl2RenderingContext as Gl, Window};

use crate::config::ViewerConfig;
use crate::error::RenderError;
use crate::logging::{LoggingConfig, init_logging};
use crate::mesh::Mesh;
use crate::render_loop::{FrameOutcome, RenderLoop, Surface};
use crate::shader::ShaderSources;
use crate::webgl::WebGl2Device;

pub(crate) struct CanvasSurface {
    canvas: HtmlCanvasElement,
}

impl Surface for CanvasSurface {
    fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }
}

type SharedLoop = Rc<RefCell<RenderLoop<WebGl2Device, CanvasSurface>>>;
type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// A lit mesh drawn into a full-window canvas, steered with the arrow keys.
#[wasm_bindgen]
pub struct Viewer {
    window: Window,
    render_loop: SharedLoop,
    frame_callback: FrameCallback,
    pending_frame: Rc<Cell<Option<i32>>>,
    on_key: Option<Closure<dyn FnMut(KeyboardEvent)>>,
    on_resize: Option<Closure<dyn FnMut()>>,
}

#[wasm_bindgen]
impl Viewer {
    /// `config_json` may override any subset of the scene constants.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas_id: &str,
        vertex_source: &str,
        fragment_source: &str,
        vertices: &Float32Array,
        indices: &Uint16Array,
        config_json: Option<String>,
    ) -> Result<Viewer, JsValue> {
        init_logging(LoggingConfig::default());
        let (config, mesh) = parse_inputs(vertices, indices, config_json)?;
        let sources = ShaderSources {
            vertex: vertex_source,
            fragment: fragment_source,
        };
        Ok(Viewer::build(canvas_id, &mesh, sources, config)?)
    }

    /// Same as the constructor but with the built-in Lambert shaders.
    #[wasm_bindgen(js_name = withBuiltinShaders)]
    pub fn with_builtin_shaders(
        canvas_id: &str,
        vertices: &Float32Array,
        indices: &Uint16Array,
        config_json: Option<String>,
    ) -> Result<Viewer, JsValue> {
        init_logging(LoggingConfig::default());
        let (config, mesh) = parse_inputs(vertices, indices, config_json)?;
        Ok(Viewer::build(canvas_id, &mesh, ShaderSources::default(), config)?)
    }

    /// Enters the running state, starts listening for arrow keys and requests
    /// the first animation frame.
    pub fn start(&mut self) -> Result<(), JsValue> {
        self.render_loop.borrow_mut().start()?;
        self.install_key_listener()?;

        let render_loop = self.render_loop.clone();
        let callback_slot = self.frame_callback.clone();
        let pending = self.pending_frame.clone();
        let window = self.window.clone();
        let callback = Closure::<dyn FnMut()>::new(move || {
            pending.set(None);
            let outcome = match render_loop.try_borrow_mut() {
                Ok(mut render_loop) => render_loop.frame(),
                Err(_) => FrameOutcome::Continue,
            };
            if outcome == FrameOutcome::Halt {
                log::info!("frame scheduling halted");
                return;
            }
            if let Some(callback) = callback_slot.borrow().as_ref() {
                match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
                    Ok(id) => pending.set(Some(id)),
                    Err(err) => log::error!("failed to schedule frame: {err:?}"),
                }
            }
        });

        let id = self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())?;
        self.pending_frame.set(Some(id));
        *self.frame_callback.borrow_mut() = Some(callback);
        Ok(())
    }

    /// Cancels the pending frame, detaches listeners and releases every GPU
    /// object.
    pub fn stop(&mut self) {
        self.teardown();
    }

    /// Forwards a `KeyboardEvent.key` value; returns whether it moved the
    /// light.
    #[wasm_bindgen(js_name = handleKey)]
    pub fn handle_key(&self, key: &str) -> bool {
        self.render_loop.borrow_mut().handle_key(key)
    }

    pub fn state(&self) -> String {
        format!("{:?}", self.render_loop.borrow().state())
    }

    pub fn azimuth(&self) -> i32 {
        self.render_loop.borrow().scene().light().azimuth
    }

    pub fn elevation(&self) -> i32 {
        self.render_loop.borrow().scene().light().elevation
    }

    #[wasm_bindgen(js_name = lightDirection)]
    pub fn light_direction(&self) -> Float32Array {
        let direction = self.render_loop.borrow().scene().current_light_direction();
        Float32Array::from(direction.as_slice())
    }

    #[wasm_bindgen(js_name = framesDrawn)]
    pub fn frames_drawn(&self) -> f64 {
        self.render_loop.borrow().frames_drawn() as f64
    }
}

impl Viewer {
    fn build(
        canvas_id: &str,
        mesh: &Mesh,
        sources: ShaderSources<'_>,
        config: ViewerConfig,
    ) -> Result<Self, RenderError> {
        let (window, canvas, gl) = acquire_canvas(canvas_id).inspect_err(|err| {
            log::error!("initialization failed: {err}");
        })?;

        let surface = CanvasSurface {
            canvas: canvas.clone(),
        };
        let mut render_loop = RenderLoop::new(WebGl2Device::new(gl), surface, config);
        render_loop.initialize(mesh, sources)?;

        let mut viewer = Viewer {
            window,
            render_loop: Rc::new(RefCell::new(render_loop)),
            frame_callback: Rc::new(RefCell::new(None)),
            pending_frame: Rc::new(Cell::new(None)),
            on_key: None,
            on_resize: None,
        };
        viewer.install_resize_listener(canvas)?;
        Ok(viewer)
    }

    fn install_resize_listener(&mut self, canvas: HtmlCanvasElement) -> Result<(), RenderError> {
        let window = self.window.clone();
        let on_resize = Closure::<dyn FnMut()>::new(move || expand_to_window(&window, &canvas));
        self.window
            .add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
            .map_err(|_| RenderError::SurfaceUnavailable("cannot observe window resizes".into()))?;
        self.on_resize = Some(on_resize);
        Ok(())
    }

    fn install_key_listener(&mut self) -> Result<(), JsValue> {
        if self.on_key.is_some() {
            return Ok(());
        }
        let render_loop = self.render_loop.clone();
        let on_key = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
            if let Ok(mut render_loop) = render_loop.try_borrow_mut() {
                if render_loop.handle_key(&event.key()) {
                    event.prevent_default();
                }
            }
        });
        self.window
            .add_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref())?;
        self.on_key = Some(on_key);
        Ok(())
    }

    fn teardown(&mut self) {
        if let Some(id) = self.pending_frame.take() {
            let _ = self.window.cancel_animation_frame(id);
        }
        // Breaks the callback's reference to itself.
        self.frame_callback.borrow_mut().take();

        if let Some(on_key) = self.on_key.take() {
            let _ = self
                .window
                .remove_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref());
        }
        if let Some(on_resize) = self.on_resize.take() {
            let _ = self
                .window
                .remove_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref());
        }
        if let Ok(mut render_loop) = self.render_loop.try_borrow_mut() {
            render_loop.stop();
        }
    }
}

impl Drop for Viewer {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Starts the unit-square scene with the built-in shaders.
#[wasm_bindgen(js_name = startDemo)]
pub fn start_demo(canvas_id: &str) -> Result<Viewer, JsValue> {
    init_logging(LoggingConfig::default());
    let mut viewer = Viewer::build(
        canvas_id,
        &Mesh::unit_square(),
        ShaderSources::default(),
        ViewerConfig::default(),
    )?;
    viewer.start()?;
    Ok(viewer)
}

fn parse_inputs(
    vertices: &Float32Array,
    indices: &Uint16Array,
    config_json: Option<String>,
) -> Result<(ViewerConfig, Mesh), RenderError> {
    prepare_scene(vertices.to_vec(), indices.to_vec(), config_json.as_deref())
}

/// Config and mesh validation shared by the constructors. Failures are
/// logged before they reach the host.
fn prepare_scene(
    vertices: Vec<f32>,
    indices: Vec<u16>,
    config_json: Option<&str>,
) -> Result<(ViewerConfig, Mesh), RenderError> {
    let config = match config_json {
        Some(json) => ViewerConfig::from_json(json),
        None => Ok(ViewerConfig::default()),
    };
    config
        .and_then(|config| Ok((config, Mesh::new(vertices, indices)?)))
        .inspect_err(|err| log::error!("initialization failed: {err}"))
}

fn acquire_canvas(canvas_id: &str) -> Result<(Window, HtmlCanvasElement, Gl), RenderError> {
    let window =
        web_sys::window().ok_or_else(|| RenderError::SurfaceUnavailable("missing window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| RenderError::SurfaceUnavailable("missing document".into()))?;
    let canvas = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| RenderError::SurfaceUnavailable(format!("canvas `{canvas_id}` not found")))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| RenderError::SurfaceUnavailable(format!("`{canvas_id}` is not a canvas")))?;
    expand_to_window(&window, &canvas);

    let gl: Gl = canvas
        .get_context("webgl2")
        .map_err(|_| RenderError::DeviceUnavailable("webgl2 context request failed".into()))?
        .ok_or_else(|| RenderError::DeviceUnavailable("WebGL2 is not available".into()))?
        .dyn_into()
        .map_err(|_| RenderError::DeviceUnavailable("failed to cast WebGL2 context".into()))?;
    Ok((window, canvas, gl))
}

fn expand_to_window(window: &Window, canvas: &HtmlCanvasElement) {
    let dimension = |value: Result<JsValue, JsValue>| {
        value
            .ok()
            .and_then(|v| v.as_f64())
            .map_or(1, |v| v.max(1.0) as u32)
    };
    canvas.set_width(dimension(window.inner_width()));
    canvas.set_height(dimension(window.inner_height()));
}
