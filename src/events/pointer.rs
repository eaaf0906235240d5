use super::{apply_effects, canvas_ndc, Listener};
use crate::SharedScene;
use glam::Vec2;
use sphere_core::interaction::PointerPhase;
use wasm_bindgen::JsCast;
use web_sys as web;

fn client_pos(ev: &web::MouseEvent) -> Vec2 {
    Vec2::new(ev.client_x() as f32, ev.client_y() as f32)
}

/// mousedown on the canvas; move and up on the document so a drag keeps
/// tracking after the pointer leaves the canvas.
pub(super) fn wire(
    scene: &SharedScene,
    canvas: &web::HtmlCanvasElement,
    document: &web::Document,
) -> Vec<Listener> {
    let mut out = Vec::with_capacity(3);

    let s = scene.clone();
    out.push(Listener::new(canvas, "mousedown", false, move |ev| {
        let Some(ev) = ev.dyn_ref::<web::MouseEvent>() else {
            return;
        };
        ev.prevent_default();
        ev.stop_propagation();
        let fx = s.borrow_mut().pointer_down(client_pos(ev), instant::now());
        apply_effects(fx);
    }));

    let s = scene.clone();
    let c = canvas.clone();
    out.push(Listener::new(document, "mousemove", false, move |ev| {
        let Some(ev) = ev.dyn_ref::<web::MouseEvent>() else {
            return;
        };
        let client = client_pos(ev);
        let ndc = canvas_ndc(&c, client);
        let fx = {
            let mut scene = s.borrow_mut();
            let pressed = !matches!(scene.controller().phase(), PointerPhase::Idle);
            if pressed {
                ev.prevent_default();
                ev.stop_propagation();
            }
            scene.pointer_move(client, ndc, instant::now())
        };
        apply_effects(fx);
    }));

    let s = scene.clone();
    let c = canvas.clone();
    out.push(Listener::new(document, "mouseup", false, move |ev| {
        let Some(ev) = ev.dyn_ref::<web::MouseEvent>() else {
            return;
        };
        let ndc = canvas_ndc(&c, client_pos(ev));
        let fx = s.borrow_mut().pointer_up(Some(ndc), instant::now());
        apply_effects(fx);
    }));

    out
}
