//! Spectrum to `{low, mid, high}` reduction.

/// Band energies, each in [0, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AnalysisSignal {
    pub low: f32,
    pub mid: f32,
    pub high: f32,
}

impl AnalysisSignal {
    /// Exponential approach toward `target` by `factor` of the gap.
    pub fn smooth_toward(&mut self, target: AnalysisSignal, factor: f32) {
        self.low += (target.low - self.low) * factor;
        self.mid += (target.mid - self.mid) * factor;
        self.high += (target.high - self.high) * factor;
    }
}

/// Map analyser bytes (0..=255) to [0, 1].
pub fn normalize_bytes(bytes: &[u8], out: &mut Vec<f32>) {
    out.clear();
    out.extend(bytes.iter().map(|&b| b as f32 / 255.0));
}

/// Average three bands of a normalized spectrum. Bins `[0, low_end·n)` are
/// low, `[low_end·n, mid_end·n)` mid and the rest high; samples under `gate`
/// count as silence. An empty band reads as zero.
pub fn band_split(spectrum: &[f32], gate: f32, low_end: f32, mid_end: f32) -> AnalysisSignal {
    let n = spectrum.len();
    let low_bound = ((n as f32 * low_end).floor() as usize).min(n);
    let mid_bound = ((n as f32 * mid_end).floor() as usize).clamp(low_bound, n);

    let gated = |v: f32| if v < gate { 0.0 } else { v.min(1.0) };
    let average = |band: &[f32]| {
        if band.is_empty() {
            0.0
        } else {
            band.iter().copied().map(gated).sum::<f32>() / band.len() as f32
        }
    };

    AnalysisSignal {
        low: average(&spectrum[..low_bound]),
        mid: average(&spectrum[low_bound..mid_bound]),
        high: average(&spectrum[mid_bound..]),
    }
}
