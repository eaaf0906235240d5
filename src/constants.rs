// Page-side constants for the web front-end. Scene tuning lives in
// `sphere_core::constants`; these only concern the DOM and the GPU surface.

pub const CANVAS_ID: &str = "sphere-canvas";
pub const AUDIO_NOTICE_SELECTOR: &str = ".audio-notice";
pub const NOTICE_FADE_MS: i32 = 300;
pub const NOTICE_FADE_TRANSFORM: &str = "translateY(-20px) translateX(-50%)";

// Project card pulse after a marker click
pub const HIGHLIGHT_SCALE: &str = "scale(1.02)";
pub const HIGHLIGHT_TRANSITION: &str = "transform 0.5s ease";
pub const HIGHLIGHT_MS: i32 = 1000;

// GPU surface
pub const CLEAR_RGBA: [f64; 4] = [0.0, 0.0, 0.0, 0.0];
pub const PLACEHOLDER_RGBA: [u8; 4] = [0, 0, 0, 0];
pub const MAX_TEXTURE_EDGE: u32 = 4096;
