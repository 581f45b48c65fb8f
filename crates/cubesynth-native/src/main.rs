mod audio;
mod gpu;
mod synth;

use std::time::Instant;
use winit::{
    event::*,
    event_loop::EventLoop,
    window::{Window, WindowBuilder},
};

use audio::CpalEngine;
use cubesynth_core::{physical_to_logical, RapierWorld, Session, SessionConfig};
use glam::Vec2;
use gpu::GpuState;

type NativeSession = Session<RapierWorld, CpalEngine>;

/// Mouse and first-finger tracking in logical pixels; only one pointer drives a gesture.
#[derive(Default)]
struct PointerState {
    cursor: (f32, f32),
    mouse_down: bool,
    touch_id: Option<u64>,
}

fn held_visual(session: &NativeSession) -> Option<cubesynth_core::VisualHandle> {
    session
        .bridge()
        .held()
        .and_then(|b| session.visuals().visual(b))
}

/// winit reports physical pixels; the session works in logical ones.
fn logical(window: &Window, x: f64, y: f64) -> (f32, f32) {
    let p = physical_to_logical(Vec2::new(x as f32, y as f32), window.scale_factor() as f32);
    (p.x, p.y)
}

fn handle_window_event(
    event: &WindowEvent,
    session: &mut NativeSession,
    gpu: &mut GpuState<'_>,
    pointer: &mut PointerState,
) {
    match event {
        WindowEvent::Resized(size) => {
            gpu.resize(*size);
            let (w, h) = logical(gpu.window, size.width as f64, size.height as f64);
            session.resize(w, h);
            gpu.set_viewport(session.viewport());
        }
        WindowEvent::CursorMoved { position, .. } => {
            pointer.cursor = logical(gpu.window, position.x, position.y);
            if pointer.mouse_down {
                session.pointer_move(pointer.cursor.0, pointer.cursor.1);
            }
        }
        WindowEvent::MouseInput {
            state,
            button: MouseButton::Left,
            ..
        } => match state {
            ElementState::Pressed => {
                pointer.mouse_down = true;
                session.pointer_down(pointer.cursor.0, pointer.cursor.1);
            }
            ElementState::Released => {
                pointer.mouse_down = false;
                session.pointer_up();
            }
        },
        WindowEvent::Touch(touch) => {
            let (x, y) = logical(gpu.window, touch.location.x, touch.location.y);
            match touch.phase {
                TouchPhase::Started if pointer.touch_id.is_none() => {
                    pointer.touch_id = Some(touch.id);
                    session.pointer_down(x, y);
                }
                TouchPhase::Moved if pointer.touch_id == Some(touch.id) => {
                    session.pointer_move(x, y);
                }
                TouchPhase::Ended | TouchPhase::Cancelled
                    if pointer.touch_id == Some(touch.id) =>
                {
                    pointer.touch_id = None;
                    session.pointer_up();
                }
                _ => {}
            }
        }
        _ => {}
    }
}

fn run(event_loop: EventLoop<()>, window: &Window) -> anyhow::Result<()> {
    let size = window.inner_size();
    let (w, h) = logical(window, size.width as f64, size.height as f64);
    let mut session = Session::new(
        RapierWorld::new(),
        CpalEngine::new(),
        SessionConfig::default(),
        w,
        h,
    );
    // no autoplay restriction on desktop
    if let Err(e) = session.resume_audio() {
        log::warn!("[audio] running without sound: {e}");
    }

    let mut gpu = pollster::block_on(GpuState::new(
        window,
        session.visuals().descs(),
        session.viewport().clone(),
    ))?;
    let mut pointer = PointerState::default();
    let mut last_frame = Instant::now();

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent {
            event: WindowEvent::CloseRequested,
            ..
        } => {
            session.shutdown();
            elwt.exit();
        }
        Event::WindowEvent { event, .. } => {
            handle_window_event(&event, &mut session, &mut gpu, &mut pointer)
        }
        Event::AboutToWait => {
            let now = Instant::now();
            let elapsed = now - last_frame;
            last_frame = now;
            gpu.set_held(held_visual(&session));
            session.frame(elapsed, &mut gpu);
            if gpu.fatal {
                session.shutdown();
                elwt.exit();
            } else {
                gpu.window.request_redraw();
            }
        }
        _ => {}
    })?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("cubesynth")
        .build(&event_loop)?;
    run(event_loop, &window)
}
