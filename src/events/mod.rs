//! DOM event wiring. Handlers translate browser events into scene calls and
//! apply whatever page-side effects the scene hands back.

mod pointer;
mod touch;

use crate::{dom, overlay, SharedScene};
use glam::Vec2;
use sphere_core::interaction::{Effects, InteractionEffect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// A registered DOM listener; dropping it unregisters the callback.
pub struct Listener {
    target: web::EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(web::Event)>,
}

impl Listener {
    pub fn new(
        target: &web::EventTarget,
        kind: &'static str,
        passive: bool,
        handler: impl FnMut(web::Event) + 'static,
    ) -> Self {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::Event)>);
        let opts = web::AddEventListenerOptions::new();
        opts.set_passive(passive);
        if let Err(e) = target.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            closure.as_ref().unchecked_ref(),
            &opts,
        ) {
            log::warn!("[events] could not listen for {}: {:?}", kind, e);
        }
        Self {
            target: target.clone(),
            kind,
            closure,
        }
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
    }
}

/// Canvas-relative NDC of a client position.
pub(crate) fn canvas_ndc(canvas: &web::HtmlCanvasElement, client: Vec2) -> Vec2 {
    let rect = canvas.get_bounding_client_rect();
    crate::input::client_ndc(
        client,
        Vec2::new(rect.left() as f32, rect.top() as f32),
        Vec2::new(rect.width() as f32, rect.height() as f32),
    )
}

/// Page side of the interaction effects: cursor, scroll-to-card and the
/// audio notice. Sounds were already played inside the scene.
pub(crate) fn apply_effects(fx: Effects) {
    for effect in fx {
        match effect {
            InteractionEffect::Cursor(style) => dom::set_body_cursor(style.as_css()),
            InteractionEffect::ScrollTo(id) => dom::scroll_to_project(&id),
            InteractionEffect::AudioStarted => {
                if let Some(doc) = dom::window_document() {
                    overlay::retire_audio_notice(&doc);
                }
            }
            InteractionEffect::InitAudio | InteractionEffect::Sound(_) => {}
        }
    }
}

/// Wire every listener the scene needs. The returned listeners live as long
/// as the scene instance; dropping them detaches the page.
pub fn wire_all(
    scene: &SharedScene,
    canvas: &web::HtmlCanvasElement,
    document: &web::Document,
) -> Vec<Listener> {
    let mut listeners = pointer::wire(scene, canvas, document);
    listeners.extend(touch::wire(scene, canvas));

    let Some(window) = web::window() else {
        return listeners;
    };

    let s = scene.clone();
    let c = canvas.clone();
    listeners.push(Listener::new(&window, "resize", true, move |_| {
        let (w, h) = dom::sync_canvas_backing_size(&c);
        if let Err(e) = s.borrow_mut().handle_resize(w, h) {
            log::debug!("[events] resize: {}", e);
        }
    }));

    let s = scene.clone();
    listeners.push(Listener::new(&window, "scroll", true, move |_| {
        s.borrow_mut().set_scroll(dom::scroll_offset());
    }));

    listeners
}
