use crate::constants::{AUDIO_NOTICE_SELECTOR, NOTICE_FADE_MS, NOTICE_FADE_TRANSFORM};
use crate::dom;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Fade the "click to enable sound" notice out and drop it from the page.
pub fn retire_audio_notice(document: &web::Document) {
    let Ok(Some(el)) = document.query_selector(AUDIO_NOTICE_SELECTOR) else {
        return;
    };
    if let Some(html) = el.dyn_ref::<web::HtmlElement>() {
        let style = html.style();
        _ = style.set_property("opacity", "0");
        _ = style.set_property("transform", NOTICE_FADE_TRANSFORM);
    }
    dom::set_timeout(NOTICE_FADE_MS, move || el.remove());
}
