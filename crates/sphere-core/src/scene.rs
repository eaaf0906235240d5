//! The scene context: one owned value holding every piece of mutable state,
//! driven by page calls, pointer input and one `tick` per display frame.

use crate::audio::{AnalysisSignal, AudioBackend, AudioEngine, SoundEffect};
use crate::camera::Camera;
use crate::config::SceneConfig;
use crate::constants::SHADER_TIME_SCALE;
use crate::error::{Result, SceneError};
use crate::interaction::{Effects, InteractionController, InteractionEffect};
use crate::morph::{MorphEngine, MorphStart};
use crate::points::{BuildStep, BuildTicket, PointField};
use crate::project::ProjectDescriptor;
use crate::rotation::RotationState;
use crate::texture::TextureSet;
use crate::uniforms::{mat4_cols, FrameState, ParticleInstance, ParticleUniforms, SphereUniforms};
use glam::{Mat4, Vec2, Vec3};

/// GPU side of the scene. The web build implements it with wgpu; tests use a
/// recording stub.
pub trait SceneRenderer {
    /// Cheap shared handle to an uploaded texture.
    type Texture: Clone;
    /// Decoded image or video source, as the platform delivers it.
    type Image;

    /// Texture bound to every slot until its real image arrives.
    fn placeholder(&self) -> Self::Texture;
    fn upload(&mut self, image: &Self::Image) -> Result<Self::Texture>;
    /// Bind the morph pair: `first` fades out as `second` fades in.
    fn bind_morph_textures(&mut self, first: &Self::Texture, second: &Self::Texture);
    fn resize(&mut self, width: u32, height: u32);
    fn render(&mut self, frame: &FrameState<'_>) -> Result<()>;
}

enum Lifecycle<R: SceneRenderer> {
    /// Images that arrive before the renderer are kept and uploaded on attach.
    Uninitialized { pending: Vec<(usize, R::Image)> },
    Ready {
        renderer: R,
        textures: TextureSet<R::Texture>,
    },
}

pub struct Scene<R: SceneRenderer, B: AudioBackend> {
    cfg: SceneConfig,
    lifecycle: Lifecycle<R>,
    camera: Camera,
    viewport: (u32, u32),
    rotation: RotationState,
    morph: MorphEngine,
    field: PointField,
    controller: InteractionController,
    audio: AudioEngine<B>,
    signal: AnalysisSignal,
    instances: Vec<ParticleInstance>,
}

impl<R: SceneRenderer, B: AudioBackend> Scene<R, B> {
    pub fn new(cfg: SceneConfig, audio_backend: B, seed: u64) -> Self {
        Self {
            camera: Camera::new(&cfg.camera, 1.0),
            viewport: (1, 1),
            rotation: RotationState::new(cfg.motion.clone()),
            morph: MorphEngine::new(cfg.morph.clone(), cfg.textures.len()),
            field: PointField::new(cfg.field.clone(), seed),
            controller: InteractionController::new(cfg.interaction.clone(), seed ^ 0x9e37_79b9),
            audio: AudioEngine::new(audio_backend, cfg.audio.clone(), seed.rotate_left(17)),
            signal: AnalysisSignal::default(),
            instances: Vec::new(),
            lifecycle: Lifecycle::Uninitialized {
                pending: Vec::new(),
            },
            cfg,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.cfg
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Ready { .. })
    }

    /// Hand over the renderer and move to `Ready`. Buffered images are
    /// uploaded now and the first morph pair is bound.
    pub fn attach_renderer(&mut self, mut renderer: R) {
        let kinds = self.cfg.textures.iter().map(|t| t.kind).collect();
        let mut textures = TextureSet::new(renderer.placeholder(), kinds);
        let pending = match std::mem::replace(
            &mut self.lifecycle,
            Lifecycle::Uninitialized {
                pending: Vec::new(),
            },
        ) {
            Lifecycle::Uninitialized { pending } => pending,
            Lifecycle::Ready { .. } => {
                log::warn!("[scene] renderer replaced; texture slots reset");
                Vec::new()
            }
        };
        for (index, image) in pending {
            match renderer.upload(&image).and_then(|t| textures.install(index, t)) {
                Ok(()) => {}
                Err(e) => log::warn!("[scene] buffered texture {} dropped: {}", index, e),
            }
        }
        renderer.resize(self.viewport.0, self.viewport.1);
        let (a, b) = self.morph.slots();
        renderer.bind_morph_textures(&textures.handle(a), &textures.handle(b));
        self.lifecycle = Lifecycle::Ready { renderer, textures };
        log::info!("[scene] ready");
    }

    pub fn renderer(&self) -> Option<&R> {
        match &self.lifecycle {
            Lifecycle::Ready { renderer, .. } => Some(renderer),
            Lifecycle::Uninitialized { .. } => None,
        }
    }

    pub fn handle_resize(&mut self, width: u32, height: u32) -> Result<()> {
        let (w, h) = (width.max(1), height.max(1));
        self.viewport = (w, h);
        self.camera.set_viewport(w, h);
        match &mut self.lifecycle {
            Lifecycle::Ready { renderer, .. } => {
                renderer.resize(w, h);
                Ok(())
            }
            Lifecycle::Uninitialized { .. } => Err(SceneError::NotReady),
        }
    }

    // ---------------- Textures ----------------

    /// Texture 0 supplied by the page from an already decoded image.
    pub fn set_initial_texture(&mut self, image: R::Image) -> Result<()> {
        self.texture_loaded(0, image)
    }

    /// A texture finished loading. Slots currently bound pick it up at once.
    pub fn texture_loaded(&mut self, index: usize, image: R::Image) -> Result<()> {
        if index >= self.cfg.textures.len() {
            return Err(SceneError::TextureIndex(index));
        }
        match &mut self.lifecycle {
            Lifecycle::Uninitialized { pending } => {
                pending.retain(|(i, _)| *i != index);
                pending.push((index, image));
                Ok(())
            }
            Lifecycle::Ready { renderer, textures } => {
                let handle = match renderer.upload(&image) {
                    Ok(h) => h,
                    Err(e) => {
                        _ = textures.mark_failed(index);
                        log::warn!("[texture] upload of {} failed: {}", index, e);
                        return Err(SceneError::TextureLoad {
                            index,
                            reason: e.to_string(),
                        });
                    }
                };
                textures.install(index, handle)?;
                let (a, b) = self.morph.slots();
                if a == index || b == index {
                    renderer.bind_morph_textures(&textures.handle(a), &textures.handle(b));
                }
                log::debug!("[texture] {} installed", index);
                Ok(())
            }
        }
    }

    /// A load failed; the placeholder stays in place and nothing retries.
    pub fn texture_failed(&mut self, index: usize, reason: &str) {
        log::warn!("[texture] {} failed to load: {}", index, reason);
        if let Lifecycle::Ready { textures, .. } = &mut self.lifecycle {
            _ = textures.mark_failed(index);
        }
    }

    pub fn set_video_duration(&mut self, index: usize, seconds: f64) -> Result<()> {
        match &mut self.lifecycle {
            Lifecycle::Ready { textures, .. } => textures.set_video_duration(index, seconds),
            Lifecycle::Uninitialized { .. } => Err(SceneError::NotReady),
        }
    }

    pub fn has_texture(&self, index: usize) -> bool {
        match &self.lifecycle {
            Lifecycle::Ready { textures, .. } => textures.is_loaded(index),
            Lifecycle::Uninitialized { pending } => pending.iter().any(|(i, _)| *i == index),
        }
    }

    /// Slots the page fetches in the background; texture 0 is loaded eagerly.
    pub fn lazy_texture_indices(&self) -> std::ops::Range<usize> {
        match &self.lifecycle {
            Lifecycle::Ready { textures, .. } => textures.lazy_indices(),
            Lifecycle::Uninitialized { .. } => {
                let n = self.cfg.textures.len();
                1usize.min(n)..n
            }
        }
    }

    fn bind_started(&mut self, start: MorphStart) {
        if let Lifecycle::Ready { renderer, textures } = &mut self.lifecycle {
            renderer.bind_morph_textures(&textures.handle(start.slot1), &textures.handle(start.slot2));
        }
    }

    // ---------------- Project field ----------------

    /// Replace the marker field. Batches from earlier calls become stale.
    pub fn update_project_field(
        &mut self,
        music: Vec<ProjectDescriptor>,
        programming: Vec<ProjectDescriptor>,
    ) -> BuildTicket {
        self.controller.reset_hover();
        self.field.rebuild(music, programming)
    }

    pub fn advance_project_field(&mut self, ticket: BuildTicket) -> BuildStep {
        self.field.build_batch(ticket)
    }

    /// Programmatic select: hover the marker, swing it toward the camera and
    /// start a morph unless one began less than the cooldown ago.
    pub fn focus_project(&mut self, id: &str, now_ms: f64) -> Result<()> {
        if !self.is_ready() {
            return Err(SceneError::NotReady);
        }
        let Some(index) = self.field.find(id) else {
            log::warn!("[focus] no marker with id '{}'", id);
            return Err(SceneError::UnknownProject(id.to_string()));
        };
        for (i, marker) in self.field.markers_mut().iter_mut().enumerate() {
            if i != index {
                marker.set_hovered(false);
            }
        }
        let marker = &mut self.field.markers_mut()[index];
        marker.set_hovered(true);
        let hovered = marker.is_hovered.then_some(index);
        let target = marker.original_position;
        self.controller.sync_hover(hovered);

        if let Some(start) = self.morph.focus_start(now_ms) {
            self.bind_started(start);
        }
        self.rotation.focus_on(target, now_ms);
        log::info!("[focus] {}", id);
        Ok(())
    }

    // ---------------- Pointer input ----------------

    pub fn pointer_down(&mut self, client: Vec2, now_ms: f64) -> Effects {
        if !self.is_ready() {
            return Effects::new();
        }
        let fx = self
            .controller
            .press(client, now_ms, self.audio.is_ready());
        self.apply(fx)
    }

    /// `ndc` is the pointer in normalized device coordinates of the canvas.
    pub fn pointer_move(&mut self, client: Vec2, ndc: Vec2, now_ms: f64) -> Effects {
        if !self.is_ready() {
            return Effects::new();
        }
        let ray = self.camera.ndc_ray(ndc);
        let fx = self
            .controller
            .moved(client, &ray, now_ms, &mut self.field, &mut self.rotation);
        self.apply(fx)
    }

    pub fn pointer_up(&mut self, ndc: Option<Vec2>, now_ms: f64) -> Effects {
        if !self.is_ready() {
            return Effects::new();
        }
        let ray = ndc.map(|p| self.camera.ndc_ray(p));
        let fx = self
            .controller
            .release(ray.as_ref(), now_ms, &mut self.field, &self.rotation);
        self.apply(fx)
    }

    /// Consume audio effects here; hand the rest back to the page.
    fn apply(&mut self, fx: Effects) -> Effects {
        let mut out = Effects::new();
        for effect in fx {
            match effect {
                InteractionEffect::InitAudio => {
                    if let Ok(true) = self.init_audio() {
                        out.push(InteractionEffect::AudioStarted);
                    }
                }
                InteractionEffect::Sound(sound) => self.audio.play(sound),
                other => out.push(other),
            }
        }
        out
    }

    // ---------------- Audio ----------------

    /// Start audio. `Ok(true)` only on the call that actually started it.
    pub fn init_audio(&mut self) -> Result<bool> {
        if self.audio.is_ready() {
            return Ok(false);
        }
        self.audio.initialize()?;
        Ok(true)
    }

    pub fn set_audio_parameter(&mut self, name: &str, value: f32) -> Result<()> {
        self.audio.set_parameter(name, value)
    }

    pub fn set_scroll(&mut self, scroll_px: f32) {
        self.morph.set_scroll(scroll_px);
    }

    // ---------------- Frame ----------------

    /// One display frame. Never fails: audio and render errors are logged
    /// and the next frame proceeds as usual.
    pub fn tick(&mut self, now_ms: f64) {
        let time = (now_ms * SHADER_TIME_SCALE) as f32;

        if self.audio.is_ready() {
            match self.audio.analysis() {
                Ok(target) => self.signal.smooth_toward(target, self.cfg.audio.smoothing),
                Err(e) => log::debug!("[audio] analysis skipped: {}", e),
            }
        }

        let video_ms = match &self.lifecycle {
            Lifecycle::Ready { textures, .. } => {
                textures.video_duration_ms(self.morph.current_index())
            }
            Lifecycle::Uninitialized { .. } => None,
        };
        if let Some(start) = self.morph.tick(now_ms, video_ms) {
            self.bind_started(start);
            if let Some(factor) = start.sound {
                self.audio.play(SoundEffect::Morph(factor));
            }
        }

        if !self.controller.suspends_damping() {
            self.rotation.damp();
        }
        let group = Mat4::from_mat3(self.rotation.combined(now_ms).matrix());

        self.field.animate(now_ms);
        self.instances.clear();
        for marker in self.field.markers() {
            for p in &marker.particles {
                self.instances.push(ParticleInstance {
                    center: marker.position.to_array(),
                    size: p.size,
                    offset: p.offset.to_array(),
                    hover: marker.hover_factor,
                    color: p.color,
                    destruction: marker.destruction_factor,
                });
            }
        }

        let Lifecycle::Ready { renderer, .. } = &mut self.lifecycle else {
            return;
        };
        let view_proj = mat4_cols(self.camera.view_projection());
        let scale = Mat4::from_scale(Vec3::splat(self.cfg.motion.sphere_scale));
        let frame = FrameState {
            sphere: SphereUniforms {
                view_proj,
                model: mat4_cols(group * scale),
                time,
                morph_factor: self.morph.factor(),
                audio_low: self.signal.low,
                audio_mid: self.signal.mid,
                audio_high: self.signal.high,
                _pad: [0.0; 3],
            },
            particles: ParticleUniforms {
                view_proj,
                model: mat4_cols(group),
                viewport: [self.viewport.0 as f32, self.viewport.1 as f32],
                time,
                _pad: 0.0,
            },
            instances: &self.instances,
        };
        if let Err(e) = renderer.render(&frame) {
            log::debug!("[render] frame dropped: {}", e);
        }
    }

    // ---------------- Read access ----------------

    pub fn rotation(&self) -> &RotationState {
        &self.rotation
    }

    pub fn morph(&self) -> &MorphEngine {
        &self.morph
    }

    pub fn field(&self) -> &PointField {
        &self.field
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn audio(&self) -> &AudioEngine<B> {
        &self.audio
    }

    pub fn audio_signal(&self) -> AnalysisSignal {
        self.signal
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }
}
