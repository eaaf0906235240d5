// Shared tuning constants. `SceneConfig::default()` is assembled from these,
// so the page only has to override what it wants to change.

// Drag and rotation
pub const ROTATION_SPEED: f32 = 0.002; // radians per dragged pixel
pub const ROTATION_DAMPING: f32 = 0.03; // fraction of the remaining gap closed per frame
pub const FOCUS_KICK: f32 = 0.02; // immediate nudge toward a focus target
pub const AUTO_ROTATION_RATE: f64 = 0.00019; // radians per millisecond, applied to both axes
pub const DRAG_THRESHOLD_PX: f32 = 1.0;
pub const DRAG_HOLD_MS: f64 = 100.0; // a press held longer than this is never a click
pub const DRAG_SOUND_PROBABILITY: f32 = 0.58;
pub const HOVER_SOUND_PROBABILITY: f32 = 0.30;

// Scene layout
pub const SPHERE_SCALE: f32 = 1.3;
pub const SPHERE_SEGMENTS: u32 = 200;
pub const MARKER_RADIUS: f32 = 1.6;
pub const HIT_SPHERE_RADIUS: f32 = 0.09;
pub const PARTICLES_PER_MARKER: usize = 5;

// Camera
pub const CAMERA_FOV_DEG: f32 = 75.0;
pub const CAMERA_NEAR: f32 = 0.2;
pub const CAMERA_FAR: f32 = 5.0;
pub const CAMERA_Z: f32 = 2.2;

// Morph scheduling
pub const MORPH_DELAY_MS: f64 = 4000.0;
pub const BASE_MORPH_SPEED: f32 = 0.00001;
pub const MORPH_PROGRESS_SCALE: f32 = 100.0; // progress per tick = speed * scale
pub const SCROLL_SPEED_CAP: f32 = 5.0;
pub const SCROLL_SPEED_DISTANCE_PX: f32 = 1000.0; // every 1000px of scroll adds 2x
pub const FOCUS_MORPH_COOLDOWN_MS: f64 = 1000.0;
pub const VIDEO_MORPH_LEAD_MS: f64 = 1000.0;
pub const INITIAL_MORPH_FACTOR: f32 = 0.2;
pub const INITIAL_LAST_MORPH_MS: f64 = 20.0;

// Marker animation
pub const HOVER_STEP: f32 = 0.1;
pub const DESTRUCTION_STEP: f32 = 0.1;
pub const DESTRUCTION_MAX: f32 = 3.0;
pub const BREATHING_AMPLITUDE: f32 = 0.05;
pub const BREATHING_RATE: f64 = 0.0005; // radians per millisecond
pub const SHADER_TIME_SCALE: f64 = 0.00001; // ms -> shader time units
pub const FIELD_BATCH_SIZE: usize = 2;

// Audio
pub const AUDIO_SMOOTHING: f32 = 0.1;
pub const NOISE_GATE: f32 = 0.1;
pub const LOW_BAND_END: f32 = 0.1; // fraction of the spectrum
pub const MID_BAND_END: f32 = 0.5;
pub const MASTER_VOLUME: f32 = 0.6;
pub const ANALYSER_FFT_SIZE: u32 = 256;
pub const ANALYSER_SMOOTHING: f32 = 0.9;
pub const DEFAULT_AUDIO_PARAMS: [(&str, f32); 4] = [
    ("window", 100.0),
    ("chorus", 20.0),
    ("delay", 200.0),
    ("feedback", 30.0),
];

// Photos cycled on the sphere; index 0 is loaded eagerly
pub const DEFAULT_TEXTURE_URLS: [&str; 7] = [
    "my-photo.webp",
    "my-photo2.webp",
    "photo3.webp",
    "photo4.webp",
    "photo5.webp",
    "photo6.webp",
    "photo8.webp",
];
