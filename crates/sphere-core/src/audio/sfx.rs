//! Procedural sound effects as small oscillator graphs.
//!
//! A [`Patch`] is a declarative description: nodes with parameter automation
//! and the edges between them. The backend instantiates it against a live
//! audio context, starts every oscillator and stops them after `stop_after`.
//! Every time offset is in seconds relative to the moment the patch plays.

use rand::Rng;
use smallvec::SmallVec;
use std::f32::consts::PI;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Sawtooth,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
    Bandpass,
    Highpass,
    Lowpass,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ramp {
    Linear,
    Exponential,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RampStep {
    pub ramp: Ramp,
    pub value: f32,
    pub at: f64,
}

/// A start value followed by ramps, in time order.
#[derive(Clone, Debug, PartialEq)]
pub struct Automation {
    pub start: f32,
    pub steps: SmallVec<[RampStep; 2]>,
}

impl Automation {
    pub fn constant(start: f32) -> Self {
        Self {
            start,
            steps: SmallVec::new(),
        }
    }

    pub fn exp(mut self, value: f32, at: f64) -> Self {
        self.steps.push(RampStep {
            ramp: Ramp::Exponential,
            value,
            at,
        });
        self
    }

    pub fn linear(mut self, value: f32, at: f64) -> Self {
        self.steps.push(RampStep {
            ramp: Ramp::Linear,
            value,
            at,
        });
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeSpec {
    Oscillator {
        wave: Waveform,
        frequency: Automation,
    },
    Filter {
        kind: FilterKind,
        frequency: Automation,
        q: f32,
    },
    Gain {
        gain: Automation,
    },
}

/// Where an edge lands: a node's signal input, one of its audio-rate
/// parameters, or the shared master bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Port {
    Input(usize),
    Frequency(usize),
    Gain(usize),
    Master,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Patch {
    pub label: &'static str,
    pub nodes: SmallVec<[NodeSpec; 8]>,
    pub edges: SmallVec<[(usize, Port); 8]>,
    pub stop_after: f64,
}

impl Patch {
    fn new(label: &'static str, stop_after: f64) -> Self {
        Self {
            label,
            nodes: SmallVec::new(),
            edges: SmallVec::new(),
            stop_after,
        }
    }

    fn add(&mut self, node: NodeSpec) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn osc(&mut self, wave: Waveform, frequency: Automation) -> usize {
        self.add(NodeSpec::Oscillator { wave, frequency })
    }

    fn filter(&mut self, kind: FilterKind, frequency: Automation, q: f32) -> usize {
        self.add(NodeSpec::Filter { kind, frequency, q })
    }

    fn gain(&mut self, gain: Automation) -> usize {
        self.add(NodeSpec::Gain { gain })
    }

    fn connect(&mut self, from: usize, to: Port) {
        self.edges.push((from, to));
    }

    pub fn oscillator_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, NodeSpec::Oscillator { .. }))
            .count()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SoundEffect {
    Welcome,
    Drag,
    Click,
    Hover,
    /// Carries the morph factor shown when the cycle began.
    Morph(f32),
}

impl SoundEffect {
    pub fn patch<R: Rng + ?Sized>(&self, rng: &mut R) -> Patch {
        match *self {
            SoundEffect::Welcome => welcome(),
            SoundEffect::Drag => drag(rng.gen_range(70.0..100.0)),
            SoundEffect::Click => click(rng.gen_range(400.0..700.0)),
            SoundEffect::Hover => hover(rng.gen_range(1000.0..2000.0)),
            SoundEffect::Morph(f) => morph(f),
        }
    }
}

fn welcome() -> Patch {
    let mut p = Patch::new("welcome", 1.0);
    let osc = p.osc(Waveform::Sine, Automation::constant(880.0));
    let env = p.gain(Automation::constant(0.5).exp(0.001, 1.0));
    p.connect(osc, Port::Input(env));
    p.connect(env, Port::Master);
    p
}

/// Two detuned grains through a sweeping bandpass plus a sub saw, high-passed.
fn drag(base: f32) -> Patch {
    let mut p = Patch::new("drag", 0.5);
    let g1 = p.osc(Waveform::Sine, Automation::constant(base).exp(base * 1.3, 0.4));
    let g2 = p.osc(
        Waveform::Triangle,
        Automation::constant(base * 1.618).exp(base * 2.1, 0.4),
    );
    let sub = p.osc(Waveform::Sawtooth, Automation::constant(base * 0.5));
    let band = p.filter(
        FilterKind::Bandpass,
        Automation::constant(180.0).exp(350.0, 0.4),
        6.0,
    );
    let high = p.filter(FilterKind::Highpass, Automation::constant(100.0), 1.5);
    let env = p.gain(Automation::constant(0.25).exp(0.01, 0.5));
    p.connect(g1, Port::Input(band));
    p.connect(g2, Port::Input(band));
    p.connect(sub, Port::Input(high));
    p.connect(band, Port::Input(high));
    p.connect(high, Port::Input(env));
    p.connect(env, Port::Master);
    p
}

/// FM bubble: two modulators on the carrier frequency, then band and high pass.
fn click(carrier_hz: f32) -> Patch {
    let mut p = Patch::new("click", 2.5);
    let carrier = p.osc(Waveform::Sine, Automation::constant(carrier_hz));
    let m1 = p.osc(Waveform::Sine, Automation::constant(carrier_hz * 2.718));
    let m2 = p.osc(Waveform::Triangle, Automation::constant(carrier_hz * 0.707));
    let depth1 = p.gain(Automation::constant(80.0).exp(10.0, 0.2));
    let depth2 = p.gain(Automation::constant(30.0).linear(5.0, 0.4));
    let band = p.filter(FilterKind::Bandpass, Automation::constant(carrier_hz), 8.0);
    let high = p.filter(FilterKind::Highpass, Automation::constant(200.0), 2.0);
    let env = p.gain(Automation::constant(0.135).exp(0.001, 2.5));
    p.connect(m1, Port::Input(depth1));
    p.connect(m2, Port::Input(depth2));
    p.connect(depth1, Port::Frequency(carrier));
    p.connect(depth2, Port::Frequency(carrier));
    p.connect(carrier, Port::Input(band));
    p.connect(band, Port::Input(high));
    p.connect(high, Port::Input(env));
    p.connect(env, Port::Master);
    p
}

/// Pitch-bent sine with a 7 Hz tremolo on its envelope.
fn hover(freq: f32) -> Patch {
    let mut p = Patch::new("hover", 1.8);
    let tone = p.osc(
        Waveform::Sine,
        Automation::constant(freq)
            .exp(freq * 1.5, 0.15)
            .exp(freq * 0.8, 0.8),
    );
    let lfo = p.osc(Waveform::Sine, Automation::constant(7.0));
    let depth = p.gain(Automation::constant(0.4));
    let env = p.gain(Automation::constant(0.012).exp(0.001, 1.8));
    p.connect(lfo, Port::Input(depth));
    p.connect(depth, Port::Gain(env));
    p.connect(tone, Port::Input(env));
    p.connect(env, Port::Master);
    p
}

/// Three partials tied to the morph factor through a factor-tracking bandpass.
fn morph(factor: f32) -> Patch {
    let f = if factor.is_finite() {
        factor.clamp(0.05, 1.0)
    } else {
        1.0
    };
    let base = 250.0;
    let mut p = Patch::new("morph", 0.5);
    let o1 = p.osc(Waveform::Sine, Automation::constant(base / f));
    let o2 = p.osc(Waveform::Triangle, Automation::constant(base * 1.43 * f));
    let o3 = p.osc(Waveform::Sawtooth, Automation::constant(base * 1.52 * f));
    let band = p.filter(
        FilterKind::Bandpass,
        Automation::constant(200.0 + f * 800.0),
        4.0 + f * 8.0,
    );
    let env = p.gain(Automation::constant((f * PI).sin() * 0.42).linear(1.83, 1.5));
    for o in [o1, o2, o3] {
        p.connect(o, Port::Input(band));
    }
    p.connect(band, Port::Input(env));
    p.connect(env, Port::Master);
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn all(rng: &mut StdRng) -> Vec<Patch> {
        [
            SoundEffect::Welcome,
            SoundEffect::Drag,
            SoundEffect::Click,
            SoundEffect::Hover,
            SoundEffect::Morph(0.6),
        ]
        .iter()
        .map(|e| e.patch(rng))
        .collect()
    }

    #[test]
    fn every_patch_reaches_master_and_has_valid_edges() {
        let mut rng = StdRng::seed_from_u64(7);
        for p in all(&mut rng) {
            assert!(p.edges.iter().any(|(_, to)| *to == Port::Master), "{}", p.label);
            for (from, to) in &p.edges {
                assert!(*from < p.nodes.len());
                match *to {
                    Port::Input(i) | Port::Frequency(i) | Port::Gain(i) => {
                        assert!(i < p.nodes.len())
                    }
                    Port::Master => {}
                }
            }
            assert!(p.stop_after > 0.0);
        }
    }

    #[test]
    fn exponential_ramps_never_target_zero() {
        let mut rng = StdRng::seed_from_u64(11);
        for p in all(&mut rng) {
            for node in &p.nodes {
                let auto = match node {
                    NodeSpec::Oscillator { frequency, .. } => frequency,
                    NodeSpec::Filter { frequency, .. } => frequency,
                    NodeSpec::Gain { gain } => gain,
                };
                for step in &auto.steps {
                    if step.ramp == Ramp::Exponential {
                        assert!(step.value > 0.0 && auto.start > 0.0);
                    }
                }
            }
        }
    }

    #[test]
    fn drag_pitch_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let p = SoundEffect::Drag.patch(&mut rng);
            let NodeSpec::Oscillator { frequency, .. } = &p.nodes[0] else {
                panic!("first drag node is the grain oscillator");
            };
            assert!((70.0..100.0).contains(&frequency.start));
            assert_eq!(p.oscillator_count(), 3);
        }
    }

    #[test]
    fn morph_of_zero_factor_stays_finite() {
        let p = morph(0.0);
        let NodeSpec::Oscillator { frequency, .. } = &p.nodes[0] else {
            panic!("first morph node is an oscillator");
        };
        assert!(frequency.start.is_finite());
        assert!((frequency.start - 5000.0).abs() < 0.01);
    }
}
