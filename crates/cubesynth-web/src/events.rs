use crate::dom;
use crate::App;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

fn listen<E: JsCast + 'static>(
    target: &web::EventTarget,
    name: &str,
    passive: bool,
    mut handler: impl FnMut(E) + 'static,
) -> anyhow::Result<()> {
    let closure = Closure::wrap(Box::new(move |ev: web::Event| {
        if let Ok(ev) = ev.dyn_into::<E>() {
            handler(ev);
        }
    }) as Box<dyn FnMut(web::Event)>);
    let opts = web::AddEventListenerOptions::new();
    opts.set_passive(passive);
    target
        .add_event_listener_with_callback_and_add_event_listener_options(
            name,
            closure.as_ref().unchecked_ref(),
            &opts,
        )
        .map_err(|e| anyhow::anyhow!("{name} listener: {e:?}"))?;
    closure.forget();
    Ok(())
}

/// Pointer (mouse, pen, touch) input on the canvas. Only the primary pointer
/// drives a gesture, so a second finger never steals the drag.
pub fn wire_pointer(app: &Rc<RefCell<App>>, canvas: &web::HtmlCanvasElement) -> anyhow::Result<()> {
    let target: &web::EventTarget = canvas.as_ref();

    {
        let app = app.clone();
        let canvas = canvas.clone();
        listen(target, "pointerdown", false, move |ev: web::PointerEvent| {
            if !ev.is_primary() {
                return;
            }
            ev.prevent_default();
            let mut app = app.borrow_mut();
            // the first press is the user gesture that unlocks audio
            if !app.session.audio().is_running() {
                if let Err(e) = app.session.resume_audio() {
                    log::warn!("[audio] resume failed: {e}");
                }
            }
            let p = dom::client_to_canvas_css(&canvas, ev.client_x() as f32, ev.client_y() as f32);
            if app.session.pointer_down(p.x, p.y).is_some() {
                let _ = canvas.set_pointer_capture(ev.pointer_id());
            }
        })?;
    }
    {
        let app = app.clone();
        let canvas = canvas.clone();
        listen(target, "pointermove", true, move |ev: web::PointerEvent| {
            if !ev.is_primary() {
                return;
            }
            let p = dom::client_to_canvas_css(&canvas, ev.client_x() as f32, ev.client_y() as f32);
            app.borrow_mut().session.pointer_move(p.x, p.y);
        })?;
    }
    for name in ["pointerup", "pointercancel"] {
        let app = app.clone();
        let canvas = canvas.clone();
        listen(target, name, true, move |ev: web::PointerEvent| {
            if !ev.is_primary() {
                return;
            }
            if canvas.has_pointer_capture(ev.pointer_id()) {
                let _ = canvas.release_pointer_capture(ev.pointer_id());
            }
            app.borrow_mut().session.pointer_up();
        })?;
    }
    listen(target, "contextmenu", false, |ev: web::Event| {
        ev.prevent_default();
    })?;
    Ok(())
}

/// Tilt input. Enabled on the first reading that carries angles.
pub fn wire_orientation(app: &Rc<RefCell<App>>, window: &web::Window) -> anyhow::Result<()> {
    let app = app.clone();
    listen(
        window.as_ref(),
        "deviceorientation",
        true,
        move |ev: web::DeviceOrientationEvent| {
            let (Some(beta), Some(gamma)) = (ev.beta(), ev.gamma()) else {
                return;
            };
            let mut app = app.borrow_mut();
            app.session.set_orientation_enabled(true);
            app.session.orientation(beta as f32, gamma as f32);
        },
    )
}

pub fn wire_resize(app: &Rc<RefCell<App>>, window: &web::Window) -> anyhow::Result<()> {
    let app = app.clone();
    listen(window.as_ref(), "resize", true, move |_: web::Event| {
        app.borrow_mut().sync_size();
    })
}
