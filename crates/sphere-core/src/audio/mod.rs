//! Audio: effect recipes, parameter registry, spectrum analysis and the engine
//! that drives an [`AudioBackend`].

pub mod analysis;
pub mod engine;
pub mod params;
pub mod sfx;

pub use analysis::{band_split, AnalysisSignal};
pub use engine::{AudioBackend, AudioEngine};
pub use params::{ParameterInfo, ParameterSet};
pub use sfx::{Patch, SoundEffect};
