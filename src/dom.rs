use crate::constants::{HIGHLIGHT_MS, HIGHLIGHT_SCALE, HIGHLIGHT_TRANSITION};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) -> (u32, u32) {
    let Some(w) = web::window() else {
        return (canvas.width(), canvas.height());
    };
    let dpr = w.device_pixel_ratio();
    let rect = canvas.get_bounding_client_rect();
    let w_px = ((rect.width() * dpr) as u32).max(1);
    let h_px = ((rect.height() * dpr) as u32).max(1);
    canvas.set_width(w_px);
    canvas.set_height(h_px);
    (w_px, h_px)
}

pub fn set_body_cursor(css: &str) {
    if let Some(body) = window_document().and_then(|d| d.body()) {
        _ = body.style().set_property("cursor", css);
    }
}

pub fn scroll_offset() -> f32 {
    web::window()
        .and_then(|w| w.scroll_y().ok())
        .unwrap_or(0.0) as f32
}

/// Run `f` once after `ms` milliseconds.
pub fn set_timeout(ms: i32, f: impl FnOnce() + 'static) {
    let Some(window) = web::window() else {
        return;
    };
    let closure = Closure::once_into_js(f);
    _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        closure.unchecked_ref(),
        ms,
    );
}

/// Smooth-scroll the project card with `id` into the middle of the viewport
/// and pulse it once.
pub fn scroll_to_project(id: &str) {
    let Some(el) = window_document().and_then(|d| d.get_element_by_id(id)) else {
        log::warn!("[dom] project element not found: {}", id);
        return;
    };
    let opts = web::ScrollIntoViewOptions::new();
    opts.set_behavior(web::ScrollBehavior::Smooth);
    opts.set_block(web::ScrollLogicalPosition::Center);
    el.scroll_into_view_with_scroll_into_view_options(&opts);

    let Ok(card) = el.dyn_into::<web::HtmlElement>() else {
        return;
    };
    let style = card.style();
    _ = style.set_property("transform", HIGHLIGHT_SCALE);
    _ = style.set_property("transition", HIGHLIGHT_TRANSITION);
    set_timeout(HIGHLIGHT_MS, move || {
        _ = card.style().set_property("transform", "scale(1)");
    });
}
