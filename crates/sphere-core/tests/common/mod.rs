#![allow(dead_code)]

use sphere_core::audio::params::ParameterInfo;
use sphere_core::audio::{AudioBackend, Patch};
use sphere_core::config::AudioConfig;
use sphere_core::project::ProjectDescriptor;
use sphere_core::uniforms::{FrameState, SphereUniforms};
use sphere_core::{Result, Scene, SceneConfig, SceneError, SceneRenderer};

/// Renderer stub: textures are names, images are names too.
#[derive(Default)]
pub struct StubRenderer {
    pub bound: Vec<(String, String)>,
    pub frames: Vec<SphereUniforms>,
    pub instance_counts: Vec<usize>,
    pub size: (u32, u32),
    pub fail_render: bool,
    pub fail_upload: bool,
}

impl SceneRenderer for StubRenderer {
    type Texture = String;
    type Image = String;

    fn placeholder(&self) -> String {
        "placeholder".into()
    }

    fn upload(&mut self, image: &String) -> Result<String> {
        if self.fail_upload {
            return Err(SceneError::Render("upload refused".into()));
        }
        Ok(format!("tex:{image}"))
    }

    fn bind_morph_textures(&mut self, first: &String, second: &String) {
        self.bound.push((first.clone(), second.clone()));
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn render(&mut self, frame: &FrameState<'_>) -> Result<()> {
        if self.fail_render {
            return Err(SceneError::Render("device lost".into()));
        }
        self.frames.push(frame.sphere);
        self.instance_counts.push(frame.instances.len());
        Ok(())
    }
}

/// Audio stub recording every call.
#[derive(Default)]
pub struct StubAudio {
    pub fail_open: bool,
    pub fail_effects: bool,
    pub fail_spectrum: bool,
    pub opened: usize,
    pub routed_direct: bool,
    pub played: Vec<&'static str>,
    pub params: Vec<(usize, f32)>,
    pub spectrum: Vec<f32>,
}

pub fn registry() -> Vec<ParameterInfo> {
    vec![
        ParameterInfo::new("window", "fx/window", 0.0, 400.0),
        ParameterInfo::new("chorus", "fx/chorus", 0.0, 100.0),
        ParameterInfo::new("delay", "fx/delay", 0.0, 2000.0),
        ParameterInfo::new("feedback[1]", "fx/feedback", 0.0, 100.0),
    ]
}

impl AudioBackend for StubAudio {
    fn open(&mut self, _cfg: &AudioConfig) -> Result<()> {
        if self.fail_open {
            return Err(SceneError::AudioUnavailable("no context".into()));
        }
        self.opened += 1;
        Ok(())
    }

    fn attach_effects(&mut self) -> Result<Vec<ParameterInfo>> {
        if self.fail_effects {
            return Err(SceneError::EffectsUnavailable("device failed".into()));
        }
        Ok(registry())
    }

    fn route_direct(&mut self) -> Result<()> {
        self.routed_direct = true;
        Ok(())
    }

    fn set_parameter(&mut self, index: usize, value: f32) -> Result<()> {
        self.params.push((index, value));
        Ok(())
    }

    fn play(&mut self, patch: &Patch) -> Result<()> {
        self.played.push(patch.label);
        Ok(())
    }

    fn spectrum(&mut self, out: &mut Vec<f32>) -> Result<()> {
        if self.fail_spectrum {
            return Err(SceneError::Analysis("analyser detached".into()));
        }
        out.clone_from(&self.spectrum);
        Ok(())
    }
}

pub type TestScene = Scene<StubRenderer, StubAudio>;

pub fn projects(prefix: &str, n: usize) -> Vec<ProjectDescriptor> {
    (0..n)
        .map(|i| ProjectDescriptor::titled(format!("{prefix} {i}")))
        .collect()
}

pub fn ready_scene(audio: StubAudio) -> TestScene {
    let mut scene = Scene::new(SceneConfig::default(), audio, 42);
    scene.attach_renderer(StubRenderer::default());
    _ = scene.handle_resize(800, 600);
    scene
}

/// Build the field to completion, returning the number of batches it took.
pub fn build_field(scene: &mut TestScene, music: usize, programming: usize) -> usize {
    let ticket = scene.update_project_field(projects("m", music), projects("p", programming));
    let mut ticks = 0;
    loop {
        ticks += 1;
        match scene.advance_project_field(ticket) {
            sphere_core::points::BuildStep::Pending { .. } => continue,
            _ => return ticks,
        }
    }
}
