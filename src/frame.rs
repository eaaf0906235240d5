use crate::SharedScene;
use sphere_core::points::{BuildStep, BuildTicket};
use sphere_core::schedule::LoopHandle;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

fn request_frame(cb: &Closure<dyn FnMut()>) {
    if let Some(w) = web::window() {
        _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}

/// Drive `Scene::tick` from requestAnimationFrame until the handle is cancelled.
pub fn start_loop(scene: SharedScene) -> LoopHandle {
    let handle = LoopHandle::new();
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    let task_handle = handle.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        if task_handle.is_cancelled() {
            log::info!("[frame] loop stopped");
            return;
        }
        match scene.try_borrow_mut() {
            Ok(mut s) => s.tick(instant::now()),
            Err(_) => log::debug!("[frame] scene busy; frame skipped"),
        }
        if let Some(cb) = tick_clone.borrow().as_ref() {
            request_frame(cb);
        }
    }) as Box<dyn FnMut()>));
    if let Some(cb) = tick.borrow().as_ref() {
        request_frame(cb);
    }
    handle
}

async fn next_animation_frame() {
    let Some(window) = web::window() else {
        return;
    };
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        _ = window.request_animation_frame(&resolve);
    });
    _ = JsFuture::from(promise).await;
}

/// Build the marker field one batch per animation frame. A newer
/// `update_project_field` call turns this ticket stale and the task ends.
pub fn spawn_field_build(scene: SharedScene, ticket: BuildTicket) {
    wasm_bindgen_futures::spawn_local(async move {
        loop {
            let step = scene.borrow_mut().advance_project_field(ticket);
            match step {
                BuildStep::Pending { .. } => next_animation_frame().await,
                BuildStep::Complete { .. } | BuildStep::Stale => break,
            }
        }
    });
}
