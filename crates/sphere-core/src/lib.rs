pub mod audio;
pub mod camera;
pub mod config;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod morph;
pub mod points;
pub mod project;
pub mod rotation;
pub mod scene;
pub mod schedule;
pub mod texture;
pub mod uniforms;

pub static SPHERE_WGSL: &str = include_str!("../shaders/sphere.wgsl");
pub static PARTICLES_WGSL: &str = include_str!("../shaders/particles.wgsl");

pub use config::SceneConfig;
pub use error::{Result, SceneError};
pub use scene::{Scene, SceneRenderer};
