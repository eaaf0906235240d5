use super::{apply_effects, canvas_ndc, Listener};
use crate::input::TouchGesture;
use crate::SharedScene;
use glam::Vec2;
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

fn first_touch(ev: &web::TouchEvent) -> Option<Vec2> {
    let t = ev.touches().get(0)?;
    Some(Vec2::new(t.client_x() as f32, t.client_y() as f32))
}

pub(super) fn wire(scene: &SharedScene, canvas: &web::HtmlCanvasElement) -> Vec<Listener> {
    let gesture = Rc::new(Cell::new(TouchGesture::default()));
    let mut out = Vec::with_capacity(3);

    // No preventDefault on start: a vertical swipe must still scroll the page.
    let s = scene.clone();
    let g = gesture.clone();
    out.push(Listener::new(canvas, "touchstart", false, move |ev| {
        let Some(at) = ev.dyn_ref::<web::TouchEvent>().and_then(first_touch) else {
            return;
        };
        let mut state = g.get();
        state.begin(at);
        g.set(state);
        let fx = s.borrow_mut().pointer_down(at, instant::now());
        apply_effects(fx);
    }));

    let s = scene.clone();
    let g = gesture.clone();
    let c = canvas.clone();
    out.push(Listener::new(canvas, "touchmove", false, move |ev| {
        let Some(tev) = ev.dyn_ref::<web::TouchEvent>() else {
            return;
        };
        let Some(at) = first_touch(tev) else {
            return;
        };
        let mut state = g.get();
        if state.update(at) && tev.cancelable() {
            tev.prevent_default();
        }
        g.set(state);
        let ndc = canvas_ndc(&c, at);
        let fx = s.borrow_mut().pointer_move(at, ndc, instant::now());
        apply_effects(fx);
    }));

    let s = scene.clone();
    let g = gesture;
    let c = canvas.clone();
    out.push(Listener::new(canvas, "touchend", false, move |_| {
        let mut state = g.get();
        let last = state.end();
        g.set(state);
        let ndc = last.map(|p| canvas_ndc(&c, p));
        let fx = s.borrow_mut().pointer_up(ndc, instant::now());
        apply_effects(fx);
    }));

    out
}
