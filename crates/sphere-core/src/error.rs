use thiserror::Error;

/// Every failure the scene can report. None of them is fatal: callers log
/// and continue in a reduced state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("scene is not initialized yet")]
    NotReady,
    #[error("no project marker with id '{0}'")]
    UnknownProject(String),
    #[error("audio parameter '{0}' not found")]
    UnknownParameter(String),
    #[error("audio unavailable: {0}")]
    AudioUnavailable(String),
    #[error("effects device unavailable: {0}")]
    EffectsUnavailable(String),
    #[error("texture {index} failed to load: {reason}")]
    TextureLoad { index: usize, reason: String },
    #[error("texture index {0} is outside the texture set")]
    TextureIndex(usize),
    #[error("audio analysis failed: {0}")]
    Analysis(String),
    #[error("render failed: {0}")]
    Render(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SceneError>;
