#![cfg(target_arch = "wasm32")]
mod audio;
mod dom;
mod events;
mod frame;
mod render;

use audio::WebAudioEngine;
use cubesynth_core::{RapierWorld, Session, SessionConfig, Viewport};
use instant::Instant;
use render::CanvasScene;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys as web;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("cubesynth-web starting");

    if let Err(e) = init() {
        log::error!("init error: {:?}", e);
    }
    Ok(())
}

pub(crate) struct App {
    pub(crate) session: Session<RapierWorld, WebAudioEngine>,
    scene: CanvasScene,
    canvas: web::HtmlCanvasElement,
    last_frame: Instant,
}

impl App {
    pub(crate) fn sync_size(&mut self) {
        let size = dom::sync_canvas_backing_size(&self.canvas);
        self.scene.set_pixel_ratio(size.pixel_ratio);
        let vp = self.session.viewport();
        if vp.width != size.css_width || vp.height != size.css_height {
            self.session.resize(size.css_width, size.css_height);
            self.scene.set_viewport(self.session.viewport());
        }
    }

    pub(crate) fn frame(&mut self) {
        let now = Instant::now();
        let elapsed = now - self.last_frame;
        self.last_frame = now;
        self.sync_size();
        let held = self
            .session
            .bridge()
            .held()
            .and_then(|b| self.session.visuals().visual(b));
        self.scene.set_held(held);
        self.session.frame(elapsed, &mut self.scene);
    }
}

fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let canvas = dom::find_or_create_canvas(&document)?;
    let size = dom::sync_canvas_backing_size(&canvas);

    let config = SessionConfig {
        seed: js_sys::Date::now() as u64,
        ..Default::default()
    };
    let session = Session::new(
        RapierWorld::new(),
        WebAudioEngine::new(),
        config,
        size.css_width,
        size.css_height,
    );
    let mut scene = CanvasScene::new(
        &canvas,
        session.visuals().descs(),
        Viewport::new(size.css_width, size.css_height),
    )?;
    scene.set_pixel_ratio(size.pixel_ratio);

    let app = Rc::new(RefCell::new(App {
        session,
        scene,
        canvas: canvas.clone(),
        last_frame: Instant::now(),
    }));
    events::wire_pointer(&app, &canvas)?;
    events::wire_orientation(&app, &window)?;
    events::wire_resize(&app, &window)?;
    frame::start_loop(app);
    Ok(())
}
