#![cfg(target_arch = "wasm32")]
use sphere_core::config::TextureKind;
use sphere_core::schedule::LoopHandle;
use sphere_core::{project, Scene, SceneConfig};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, spawn_local};
use web_sys as web;

mod audio;
mod constants;
mod dom;
mod events;
mod frame;
mod input;
mod loader;
mod overlay;
mod render;

use audio::WebAudioBackend;
use render::{GpuRenderer, TextureSource};

pub(crate) type WebScene = Scene<GpuRenderer, WebAudioBackend>;
pub(crate) type SharedScene = Rc<RefCell<WebScene>>;

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Serialize whatever the page passed (string, object, null) to JSON text.
fn json_text(value: &JsValue) -> Result<String, JsValue> {
    if let Some(s) = value.as_string() {
        return Ok(s);
    }
    if value.is_undefined() {
        return Ok("null".into());
    }
    Ok(js_sys::JSON::stringify(value)?.into())
}

fn seed() -> u64 {
    let mut buf = [0u8; 8];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => u64::from_le_bytes(buf),
        Err(e) => {
            log::warn!("[init] no entropy ({}); using clock seed", e);
            instant::now() as u64
        }
    }
}

/// Live page wiring, present between `initializeScene` and `dispose`.
struct Runtime {
    canvas: web::HtmlCanvasElement,
    loop_handle: LoopHandle,
    _listeners: Vec<events::Listener>,
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("sphere-web starting");
    Ok(())
}

/// The page-facing scene object.
#[wasm_bindgen]
pub struct LivingSphere {
    scene: SharedScene,
    runtime: Rc<RefCell<Option<Runtime>>>,
}

#[wasm_bindgen]
impl LivingSphere {
    /// `config` is an optional JSON string or object overriding the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> LivingSphere {
        let cfg = if config.is_null() || config.is_undefined() {
            SceneConfig::default()
        } else {
            match json_text(&config).and_then(|t| SceneConfig::from_json(&t).map_err(to_js)) {
                Ok(cfg) => cfg,
                Err(e) => {
                    log::warn!("[init] config rejected ({:?}); using defaults", e);
                    SceneConfig::default()
                }
            }
        };
        let scene = Scene::new(cfg, WebAudioBackend::new(), seed());
        Self {
            scene: Rc::new(RefCell::new(scene)),
            runtime: Rc::new(RefCell::new(None)),
        }
    }

    /// Acquire the GPU, wire input and start the frame loop. Without an
    /// argument the canvas is looked up by its default id.
    #[wasm_bindgen(js_name = initializeScene)]
    pub fn initialize_scene(&self, canvas: Option<web::HtmlCanvasElement>) -> js_sys::Promise {
        let scene = self.scene.clone();
        let runtime = self.runtime.clone();
        future_to_promise(async move {
            let result = initialize(scene, runtime, canvas).await;
            if let Err(e) = &result {
                log::error!("[init] {:?}", e);
            }
            result
        })
    }

    #[wasm_bindgen(js_name = handleResize)]
    pub fn handle_resize(&self) {
        let runtime = self.runtime.borrow();
        let Some(rt) = runtime.as_ref() else {
            log::debug!("[init] resize before initialization ignored");
            return;
        };
        let (w, h) = dom::sync_canvas_backing_size(&rt.canvas);
        if let Err(e) = self.scene.borrow_mut().handle_resize(w, h) {
            log::debug!("[init] resize: {}", e);
        }
    }

    /// Start loading every texture after the first.
    #[wasm_bindgen(js_name = loadTextures)]
    pub fn load_textures(&self) {
        let indices = self.scene.borrow().lazy_texture_indices();
        for i in indices {
            spawn_texture_load(self.scene.clone(), i);
        }
    }

    /// Use an image the page already decoded as texture 0.
    #[wasm_bindgen(js_name = setInitialTexture)]
    pub fn set_initial_texture(&self, image: web::HtmlImageElement) {
        let pixels = match loader::image_element_pixels(&image) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("[texture] initial image unreadable: {:#}", e);
                return;
            }
        };
        if let Err(e) = self.scene.borrow_mut().set_initial_texture(pixels) {
            log::warn!("[texture] initial image: {}", e);
        }
    }

    /// Replace the markers. Each list is an array of project objects (or a
    /// JSON string of one); `null` means no projects in that category.
    #[wasm_bindgen(js_name = updateProjectField)]
    pub fn update_project_field(&self, music: JsValue, programming: JsValue) {
        // each list stands alone; a rejected one shows no markers of its own
        let parse = |v: &JsValue, category: &str| {
            match json_text(v).and_then(|t| project::parse_list(&t).map_err(to_js)) {
                Ok(list) => list,
                Err(e) => {
                    log::warn!("[field] {} list rejected: {:?}", category, e);
                    Vec::new()
                }
            }
        };
        let music = parse(&music, "music");
        let programming = parse(&programming, "programming");
        let ticket = self
            .scene
            .borrow_mut()
            .update_project_field(music, programming);
        frame::spawn_field_build(self.scene.clone(), ticket);
    }

    #[wasm_bindgen(js_name = focusProject)]
    pub fn focus_project(&self, id: &str) {
        if let Err(e) = self.scene.borrow_mut().focus_project(id, instant::now()) {
            log::debug!("[focus] {}: {}", id, e);
        }
    }

    /// Start audio from a user gesture. Returns true when this call brought
    /// it up.
    #[wasm_bindgen(js_name = initAudio)]
    pub fn init_audio(&self) -> bool {
        let started = match self.scene.borrow_mut().init_audio() {
            Ok(started) => started,
            Err(e) => {
                log::warn!("[audio] {}", e);
                return false;
            }
        };
        if started {
            if let Some(document) = dom::window_document() {
                overlay::retire_audio_notice(&document);
            }
        }
        started
    }

    #[wasm_bindgen(js_name = setAudioParameter)]
    pub fn set_audio_parameter(&self, name: &str, value: f32) -> bool {
        self.scene
            .borrow_mut()
            .set_audio_parameter(name, value)
            .is_ok()
    }

    /// Stop the frame loop and detach every listener.
    pub fn dispose(&self) {
        if let Some(rt) = self.runtime.borrow_mut().take() {
            rt.loop_handle.cancel();
            log::info!("[init] scene disposed");
        }
    }
}

/// Acquire the GPU, wire input and start the frame loop.
async fn initialize(
    scene: SharedScene,
    runtime: Rc<RefCell<Option<Runtime>>>,
    canvas: Option<web::HtmlCanvasElement>,
) -> Result<JsValue, JsValue> {
    if runtime.borrow().is_some() {
        log::warn!("[init] scene already initialized");
        return Ok(JsValue::UNDEFINED);
    }
    let document = dom::window_document().ok_or_else(|| to_js("no document"))?;
    let canvas = match canvas {
        Some(c) => c,
        None => document
            .get_element_by_id(constants::CANVAS_ID)
            .ok_or_else(|| to_js(format!("missing #{}", constants::CANVAS_ID)))?
            .dyn_into::<web::HtmlCanvasElement>()
            .map_err(|_| to_js("element is not a canvas"))?,
    };

    let (width, height) = dom::sync_canvas_backing_size(&canvas);
    let renderer = GpuRenderer::new(&canvas)
        .await
        .map_err(|e| to_js(format!("{:#}", e)))?;
    {
        let mut s = scene.borrow_mut();
        s.attach_renderer(renderer);
        s.handle_resize(width, height).map_err(to_js)?;
        s.set_scroll(dom::scroll_offset());
    }
    _ = canvas.style().set_property("cursor", "grab");

    let listeners = events::wire_all(&scene, &canvas, &document);
    if !scene.borrow().has_texture(0) {
        spawn_texture_load(scene.clone(), 0);
    }
    let loop_handle = frame::start_loop(scene.clone());
    *runtime.borrow_mut() = Some(Runtime {
        canvas,
        loop_handle,
        _listeners: listeners,
    });
    log::info!("[init] scene ready ({}x{})", width, height);
    Ok(JsValue::UNDEFINED)
}

fn spawn_texture_load(scene: SharedScene, index: usize) {
    let (url, kind) = {
        let s = scene.borrow();
        let cfg = s.config();
        match (cfg.texture_url(index), cfg.textures.get(index)) {
            (Some(url), Some(entry)) => (url, entry.kind),
            _ => {
                log::warn!("[texture] no texture configured at {}", index);
                return;
            }
        }
    };
    spawn_local(async move {
        let loaded = match kind {
            TextureKind::Image => loader::fetch_image(&url).await,
            TextureKind::Video => loader::open_video(&url).await.map(TextureSource::Video),
        };
        let mut s = scene.borrow_mut();
        match loaded {
            Ok(source) => {
                let duration = match &source {
                    TextureSource::Video(v) => Some(v.duration()),
                    TextureSource::Pixels { .. } => None,
                };
                if let Err(e) = s.texture_loaded(index, source) {
                    log::warn!("[texture] {} not installed: {}", url, e);
                    return;
                }
                if let Some(secs) = duration.filter(|d| d.is_finite()) {
                    if let Err(e) = s.set_video_duration(index, secs) {
                        log::debug!("[texture] video duration: {}", e);
                    }
                }
            }
            Err(e) => s.texture_failed(index, &format!("{:#}", e)),
        }
    });
}
