//! Audio engine state machine over a platform backend.

use super::analysis::{band_split, AnalysisSignal};
use super::params::{resolve, ParameterInfo, ParameterSet, Resolution};
use super::sfx::{Patch, SoundEffect};
use crate::config::AudioConfig;
use crate::constants::{LOW_BAND_END, MID_BAND_END};
use crate::error::{Result, SceneError};
use rand::prelude::*;

/// Platform side of the audio engine. The web build implements it with
/// WebAudio; tests use a recording stub.
pub trait AudioBackend {
    /// Create the context, master gain and analyser.
    fn open(&mut self, cfg: &AudioConfig) -> Result<()>;
    /// Insert the effects device between master gain and analyser and report
    /// its parameter registry.
    fn attach_effects(&mut self) -> Result<Vec<ParameterInfo>>;
    /// Fallback routing: master gain straight into the analyser.
    fn route_direct(&mut self) -> Result<()>;
    /// Write a value to registry entry `index`.
    fn set_parameter(&mut self, index: usize, value: f32) -> Result<()>;
    /// Instantiate and start a fire-and-forget patch on the master bus.
    fn play(&mut self, patch: &Patch) -> Result<()>;
    /// Current spectrum, each bin normalized to [0, 1].
    fn spectrum(&mut self, out: &mut Vec<f32>) -> Result<()>;
}

#[derive(Debug)]
enum AudioState {
    Uninitialized,
    Ready { registry: Vec<ParameterInfo> },
}

pub struct AudioEngine<B: AudioBackend> {
    backend: B,
    cfg: AudioConfig,
    state: AudioState,
    params: ParameterSet,
    rng: StdRng,
    spectrum: Vec<f32>,
    registry_logged: bool,
}

impl<B: AudioBackend> AudioEngine<B> {
    pub fn new(backend: B, cfg: AudioConfig, seed: u64) -> Self {
        let params = ParameterSet::from_pairs(&cfg.params);
        Self {
            backend,
            cfg,
            state: AudioState::Uninitialized,
            params,
            rng: StdRng::seed_from_u64(seed),
            spectrum: Vec::new(),
            registry_logged: false,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, AudioState::Ready { .. })
    }

    /// True when the effects device is in the chain.
    pub fn has_effects(&self) -> bool {
        matches!(&self.state, AudioState::Ready { registry } if !registry.is_empty())
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Bring the graph up. Safe to call repeatedly; only the first successful
    /// call has any effect. On failure the engine stays uninitialized.
    pub fn initialize(&mut self) -> Result<()> {
        if self.is_ready() {
            return Ok(());
        }
        if let Err(e) = self.backend.open(&self.cfg) {
            log::warn!("[audio] initialization failed: {}", e);
            return Err(e);
        }
        let registry = match self.backend.attach_effects() {
            Ok(registry) => registry,
            Err(e) => {
                log::warn!("[audio] {}; routing master straight to output", e);
                if let Err(e) = self.backend.route_direct() {
                    log::warn!("[audio] fallback routing failed: {}", e);
                    return Err(SceneError::AudioUnavailable(e.to_string()));
                }
                Vec::new()
            }
        };
        self.state = AudioState::Ready { registry };
        log::info!(
            "[audio] initialized (effects: {})",
            if self.has_effects() { "on" } else { "bypassed" }
        );

        let initial: Vec<(String, f32)> = self
            .params
            .iter()
            .map(|(n, v)| (n.to_string(), v))
            .collect();
        if self.has_effects() {
            for (name, value) in initial {
                if let Err(e) = self.set_parameter(&name, value) {
                    log::debug!("[audio] initial parameter skipped: {}", e);
                }
            }
        }
        self.play(SoundEffect::Welcome);
        Ok(())
    }

    /// Write an effect parameter by name or id. Before initialization the
    /// value is kept and applied once the device is up.
    pub fn set_parameter(&mut self, name: &str, value: f32) -> Result<()> {
        let registry = match &self.state {
            AudioState::Uninitialized => {
                self.params.set(name, value);
                log::debug!("[audio] '{}' stored until audio starts", name);
                return Ok(());
            }
            AudioState::Ready { registry } if registry.is_empty() => {
                log::warn!("[audio] effects device not available; '{}' ignored", name);
                return Err(SceneError::EffectsUnavailable(name.to_string()));
            }
            AudioState::Ready { registry } => registry,
        };
        if !self.registry_logged {
            let names: Vec<String> = registry
                .iter()
                .map(|p| format!("{} ({})", p.name, p.id))
                .collect();
            log::info!("[audio] available parameters: {}", names.join(", "));
            self.registry_logged = true;
        }
        let (index, info) = match resolve(registry, name) {
            Some(r) => {
                if let Resolution::Partial(i) = r {
                    log::info!(
                        "[audio] partial match for '{}': {} ({})",
                        name,
                        registry[i].name,
                        registry[i].id
                    );
                }
                (r.index(), &registry[r.index()])
            }
            None => {
                log::warn!("[audio] parameter '{}' not found", name);
                return Err(SceneError::UnknownParameter(name.to_string()));
            }
        };
        let clamped = info.clamp(value);
        self.backend.set_parameter(index, clamped)?;
        self.params.set(name, clamped);
        Ok(())
    }

    /// Fire a sound effect. Silently skipped until initialized; backend
    /// failures are logged and swallowed.
    pub fn play(&mut self, effect: SoundEffect) {
        if !self.is_ready() {
            return;
        }
        let patch = effect.patch(&mut self.rng);
        if let Err(e) = self.backend.play(&patch) {
            log::debug!("[audio] {} sound failed: {}", patch.label, e);
        }
    }

    /// Band energies of the live spectrum.
    pub fn analysis(&mut self) -> Result<AnalysisSignal> {
        if !self.is_ready() {
            return Err(SceneError::NotReady);
        }
        self.backend.spectrum(&mut self.spectrum)?;
        Ok(band_split(
            &self.spectrum,
            self.cfg.noise_gate,
            LOW_BAND_END,
            MID_BAND_END,
        ))
    }
}
