// Host-side tests for page constants.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}

use constants::*;

#[test]
fn surface_clears_to_transparent() {
    // the sphere floats over page content
    assert_eq!(CLEAR_RGBA[3], 0.0);
    assert_eq!(PLACEHOLDER_RGBA[3], 0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn highlight_outlasts_its_transition() {
    let secs: f64 = HIGHLIGHT_TRANSITION
        .split_whitespace()
        .find_map(|t| t.strip_suffix('s').and_then(|n| n.parse().ok()))
        .unwrap();
    assert!(HIGHLIGHT_MS as f64 >= secs * 1000.0);
    assert!(NOTICE_FADE_MS > 0);
}

#[test]
fn selectors_are_well_formed() {
    assert!(AUDIO_NOTICE_SELECTOR.starts_with('.'));
    assert!(!CANVAS_ID.starts_with('#'));
    assert!(MAX_TEXTURE_EDGE.is_power_of_two());
}
