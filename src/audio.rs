use sphere_core::audio::analysis::normalize_bytes;
use sphere_core::audio::sfx::{Automation, FilterKind, NodeSpec, Port, Ramp, Waveform};
use sphere_core::audio::{AudioBackend, ParameterInfo, Patch};
use sphere_core::config::AudioConfig;
use sphere_core::{Result, SceneError};
use smallvec::SmallVec;
use wasm_bindgen::JsValue;
use web_sys as web;

// Effects chain ranges; registry order is the index `set_parameter` receives.
const WINDOW_BASE_HZ: f32 = 300.0;
const WINDOW_HZ_PER_UNIT: f32 = 45.0;
const CHORUS_BASE_DELAY_S: f32 = 0.02;
const CHORUS_LFO_HZ: f32 = 0.8;
const CHORUS_LFO_DEPTH_S: f32 = 0.004;
const ECHO_MAX_DELAY_S: f64 = 2.5;
const ECHO_WET: f32 = 0.4;
const FEEDBACK_CEILING: f32 = 0.9;

fn unavailable(what: &str, e: JsValue) -> SceneError {
    SceneError::AudioUnavailable(format!("{}: {:?}", what, e))
}

fn create_gain(ctx: &web::AudioContext, value: f32, label: &str) -> Result<web::GainNode> {
    match web::GainNode::new(ctx) {
        Ok(g) => {
            g.gain().set_value(value);
            Ok(g)
        }
        Err(e) => {
            log::error!("[audio] {} GainNode error: {:?}", label, e);
            Err(unavailable(label, e))
        }
    }
}

fn registry() -> Vec<ParameterInfo> {
    vec![
        ParameterInfo::new("window", "fx/window", 0.0, 400.0),
        ParameterInfo::new("chorus", "fx/chorus", 0.0, 100.0),
        ParameterInfo::new("delay", "fx/delay", 0.0, 2000.0),
        ParameterInfo::new("feedback", "fx/feedback", 0.0, 100.0),
    ]
}

struct Graph {
    ctx: web::AudioContext,
    master: web::GainNode,
    analyser: web::AnalyserNode,
}

struct FxChain {
    window: web::BiquadFilterNode,
    chorus_wet: web::GainNode,
    echo: web::DelayNode,
    feedback: web::GainNode,
    // held so the modulator is not collected while the chain lives
    _chorus_lfo: web::OscillatorNode,
}

/// WebAudio implementation of the scene's audio backend.
///
/// master gain -> [window lowpass -> dry + chorus + echo] -> analyser -> destination
#[derive(Default)]
pub struct WebAudioBackend {
    graph: Option<Graph>,
    fx: Option<FxChain>,
    bytes: Vec<u8>,
}

impl WebAudioBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn graph(&self) -> Result<&Graph> {
        self.graph.as_ref().ok_or(SceneError::NotReady)
    }

    fn build_fx(&self, g: &Graph) -> Result<FxChain> {
        let ctx = &g.ctx;
        let window = web::BiquadFilterNode::new(ctx).map_err(|e| unavailable("window", e))?;
        window.set_type(web::BiquadFilterType::Lowpass);

        let bus = create_gain(ctx, 1.0, "fx bus")?;
        let dry = create_gain(ctx, 1.0, "fx dry")?;

        let chorus = ctx
            .create_delay_with_max_delay_time(0.1)
            .map_err(|e| unavailable("chorus", e))?;
        chorus.delay_time().set_value(CHORUS_BASE_DELAY_S);
        let lfo = web::OscillatorNode::new(ctx).map_err(|e| unavailable("chorus lfo", e))?;
        lfo.frequency().set_value(CHORUS_LFO_HZ);
        let depth = create_gain(ctx, CHORUS_LFO_DEPTH_S, "chorus depth")?;
        let chorus_wet = create_gain(ctx, 0.0, "chorus wet")?;

        let echo = ctx
            .create_delay_with_max_delay_time(ECHO_MAX_DELAY_S)
            .map_err(|e| unavailable("echo", e))?;
        let feedback = create_gain(ctx, 0.0, "echo feedback")?;
        let echo_wet = create_gain(ctx, ECHO_WET, "echo wet")?;

        let wire = |r: std::result::Result<web::AudioNode, JsValue>| r.map(|_| ());
        let routed = (|| -> std::result::Result<(), JsValue> {
            wire(g.master.connect_with_audio_node(&window))?;
            wire(window.connect_with_audio_node(&dry))?;
            wire(dry.connect_with_audio_node(&bus))?;

            wire(window.connect_with_audio_node(&chorus))?;
            wire(lfo.connect_with_audio_node(&depth))?;
            depth.connect_with_audio_param(&chorus.delay_time())?;
            wire(chorus.connect_with_audio_node(&chorus_wet))?;
            wire(chorus_wet.connect_with_audio_node(&bus))?;

            wire(window.connect_with_audio_node(&echo))?;
            wire(echo.connect_with_audio_node(&feedback))?;
            wire(feedback.connect_with_audio_node(&echo))?;
            wire(echo.connect_with_audio_node(&echo_wet))?;
            wire(echo_wet.connect_with_audio_node(&bus))?;

            wire(bus.connect_with_audio_node(&g.analyser))?;
            lfo.start()?;
            Ok(())
        })();
        if let Err(e) = routed {
            // leave nothing half-connected behind the master gain
            _ = g.master.disconnect();
            return Err(SceneError::EffectsUnavailable(format!("{:?}", e)));
        }

        Ok(FxChain {
            window,
            chorus_wet,
            echo,
            feedback,
            _chorus_lfo: lfo,
        })
    }
}

impl AudioBackend for WebAudioBackend {
    fn open(&mut self, cfg: &AudioConfig) -> Result<()> {
        let ctx = web::AudioContext::new().map_err(|e| unavailable("AudioContext", e))?;
        _ = ctx.resume();
        let master = create_gain(&ctx, cfg.master_volume, "master")?;
        let analyser = ctx.create_analyser().map_err(|e| unavailable("analyser", e))?;
        analyser.set_fft_size(cfg.fft_size);
        analyser.set_smoothing_time_constant(cfg.analyser_smoothing as f64);
        analyser
            .connect_with_audio_node(&ctx.destination())
            .map_err(|e| unavailable("destination", e))?;
        self.bytes = vec![0; analyser.frequency_bin_count() as usize];
        self.graph = Some(Graph {
            ctx,
            master,
            analyser,
        });
        Ok(())
    }

    fn attach_effects(&mut self) -> Result<Vec<ParameterInfo>> {
        let fx = self.build_fx(self.graph()?)?;
        self.fx = Some(fx);
        Ok(registry())
    }

    fn route_direct(&mut self) -> Result<()> {
        let g = self.graph()?;
        g.master
            .connect_with_audio_node(&g.analyser)
            .map(|_| ())
            .map_err(|e| unavailable("direct route", e))
    }

    fn set_parameter(&mut self, index: usize, value: f32) -> Result<()> {
        let fx = self
            .fx
            .as_ref()
            .ok_or_else(|| SceneError::EffectsUnavailable("chain not attached".into()))?;
        match index {
            0 => fx
                .window
                .frequency()
                .set_value(WINDOW_BASE_HZ + value * WINDOW_HZ_PER_UNIT),
            1 => fx.chorus_wet.gain().set_value(value / 100.0),
            2 => fx.echo.delay_time().set_value(value / 1000.0),
            3 => fx
                .feedback
                .gain()
                .set_value((value / 100.0) * FEEDBACK_CEILING),
            _ => return Err(SceneError::UnknownParameter(index.to_string())),
        }
        Ok(())
    }

    fn play(&mut self, patch: &Patch) -> Result<()> {
        let g = self.graph()?;
        instantiate(g, patch).map_err(|e| SceneError::AudioUnavailable(format!("{:?}", e)))
    }

    fn spectrum(&mut self, out: &mut Vec<f32>) -> Result<()> {
        let g = self.graph()?;
        let bins = g.analyser.frequency_bin_count() as usize;
        if bins == 0 {
            return Err(SceneError::Analysis("analyser has no bins".into()));
        }
        self.bytes.resize(bins, 0);
        g.analyser.get_byte_frequency_data(&mut self.bytes);
        normalize_bytes(&self.bytes, out);
        Ok(())
    }
}

enum LiveNode {
    Osc(web::OscillatorNode),
    Filter(web::BiquadFilterNode),
    Gain(web::GainNode),
}

impl LiveNode {
    fn node(&self) -> &web::AudioNode {
        match self {
            LiveNode::Osc(n) => n.as_ref(),
            LiveNode::Filter(n) => n.as_ref(),
            LiveNode::Gain(n) => n.as_ref(),
        }
    }

    fn frequency(&self) -> Option<web::AudioParam> {
        match self {
            LiveNode::Osc(n) => Some(n.frequency()),
            LiveNode::Filter(n) => Some(n.frequency()),
            LiveNode::Gain(_) => None,
        }
    }

    fn gain(&self) -> Option<web::AudioParam> {
        match self {
            LiveNode::Gain(n) => Some(n.gain()),
            _ => None,
        }
    }
}

fn automate(
    param: &web::AudioParam,
    a: &Automation,
    t0: f64,
) -> std::result::Result<(), JsValue> {
    param.set_value_at_time(a.start, t0)?;
    for step in &a.steps {
        let at = t0 + step.at;
        match step.ramp {
            Ramp::Linear => param.linear_ramp_to_value_at_time(step.value, at)?,
            Ramp::Exponential => param.exponential_ramp_to_value_at_time(step.value, at)?,
        };
    }
    Ok(())
}

/// Build the patch's nodes against the live context, start every oscillator
/// now and stop them after `stop_after`.
fn instantiate(g: &Graph, patch: &Patch) -> std::result::Result<(), JsValue> {
    let ctx = &g.ctx;
    let t0 = ctx.current_time();
    let mut live: SmallVec<[LiveNode; 8]> = SmallVec::with_capacity(patch.nodes.len());
    for spec in &patch.nodes {
        let node = match spec {
            NodeSpec::Oscillator { wave, frequency } => {
                let osc = web::OscillatorNode::new(ctx)?;
                osc.set_type(match wave {
                    Waveform::Sine => web::OscillatorType::Sine,
                    Waveform::Triangle => web::OscillatorType::Triangle,
                    Waveform::Sawtooth => web::OscillatorType::Sawtooth,
                });
                automate(&osc.frequency(), frequency, t0)?;
                LiveNode::Osc(osc)
            }
            NodeSpec::Filter { kind, frequency, q } => {
                let filter = web::BiquadFilterNode::new(ctx)?;
                filter.set_type(match kind {
                    FilterKind::Bandpass => web::BiquadFilterType::Bandpass,
                    FilterKind::Highpass => web::BiquadFilterType::Highpass,
                    FilterKind::Lowpass => web::BiquadFilterType::Lowpass,
                });
                filter.q().set_value(*q);
                automate(&filter.frequency(), frequency, t0)?;
                LiveNode::Filter(filter)
            }
            NodeSpec::Gain { gain } => {
                let node = web::GainNode::new(ctx)?;
                automate(&node.gain(), gain, t0)?;
                LiveNode::Gain(node)
            }
        };
        live.push(node);
    }

    let bad = |i: usize| JsValue::from_str(&format!("{}: bad edge to node {}", patch.label, i));
    let node_at = |i: usize| live.get(i).ok_or_else(|| bad(i));
    for &(from, to) in &patch.edges {
        let src = node_at(from)?.node();
        match to {
            Port::Input(i) => {
                src.connect_with_audio_node(node_at(i)?.node())?;
            }
            Port::Frequency(i) => {
                let p = node_at(i)?.frequency().ok_or_else(|| bad(i))?;
                src.connect_with_audio_param(&p)?;
            }
            Port::Gain(i) => {
                let p = node_at(i)?.gain().ok_or_else(|| bad(i))?;
                src.connect_with_audio_param(&p)?;
            }
            Port::Master => {
                src.connect_with_audio_node(&g.master)?;
            }
        }
    }

    for node in &live {
        if let LiveNode::Osc(osc) = node {
            osc.start_with_when(t0)?;
            osc.stop_with_when(t0 + patch.stop_after)?;
        }
    }
    Ok(())
}
