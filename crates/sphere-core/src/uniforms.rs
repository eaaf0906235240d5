//! GPU-facing layouts shared with the WGSL shaders.
//!
//! Field order and padding must match `shaders/sphere.wgsl` and
//! `shaders/particles.wgsl`.

use glam::Mat4;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SphereUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub time: f32,
    pub morph_factor: f32,
    pub audio_low: f32,
    pub audio_mid: f32,
    pub audio_high: f32,
    pub _pad: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    /// Drawing-buffer size in pixels.
    pub viewport: [f32; 2],
    pub time: f32,
    pub _pad: f32,
}

/// One particle quad. `center` is the marker position inside the field group,
/// `offset` the particle's rest offset from it.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleInstance {
    pub center: [f32; 3],
    pub size: f32,
    pub offset: [f32; 3],
    pub hover: f32,
    pub color: [f32; 3],
    pub destruction: f32,
}

/// Everything the renderer needs to draw one frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameState<'a> {
    pub sphere: SphereUniforms,
    pub particles: ParticleUniforms,
    pub instances: &'a [ParticleInstance],
}

#[inline]
pub fn mat4_cols(m: Mat4) -> [[f32; 4]; 4] {
    m.to_cols_array_2d()
}
