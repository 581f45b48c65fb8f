use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

/// The `#app-canvas` element, created and appended to `<body>` when missing.
pub fn find_or_create_canvas(document: &web::Document) -> anyhow::Result<web::HtmlCanvasElement> {
    let el = match document.get_element_by_id("app-canvas") {
        Some(el) => el,
        None => {
            let el = document
                .create_element("canvas")
                .map_err(|e| anyhow::anyhow!("{e:?}"))?;
            el.set_id("app-canvas");
            let body = document
                .body()
                .ok_or_else(|| anyhow::anyhow!("no body"))?;
            body.append_child(&el)
                .map_err(|e| anyhow::anyhow!("{e:?}"))?;
            el
        }
    };
    let canvas = el
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!("#app-canvas is not a canvas: {e:?}"))?;
    let style = canvas.style();
    for (k, v) in [
        ("width", "100vw"),
        ("height", "100vh"),
        ("display", "block"),
        ("touch-action", "none"),
    ] {
        style
            .set_property(k, v)
            .map_err(|e| anyhow::anyhow!("{e:?}"))?;
    }
    Ok(canvas)
}

/// CSS size of the canvas and the backing-store scale applied to it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasSize {
    pub css_width: f32,
    pub css_height: f32,
    pub pixel_ratio: f64,
}

/// Match the backing store to CSS size * devicePixelRatio.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) -> CanvasSize {
    let dpr = web::window()
        .map(|w| w.device_pixel_ratio())
        .filter(|r| r.is_finite() && *r > 0.0)
        .unwrap_or(1.0);
    let rect = canvas.get_bounding_client_rect();
    let css_w = rect.width().max(1.0);
    let css_h = rect.height().max(1.0);
    let w_px = ((css_w * dpr) as u32).max(1);
    let h_px = ((css_h * dpr) as u32).max(1);
    if canvas.width() != w_px || canvas.height() != h_px {
        canvas.set_width(w_px);
        canvas.set_height(h_px);
    }
    CanvasSize {
        css_width: css_w as f32,
        css_height: css_h as f32,
        pixel_ratio: dpr,
    }
}

/// Client coordinates to CSS pixels relative to the canvas' top-left corner.
#[inline]
pub fn client_to_canvas_css(canvas: &web::HtmlCanvasElement, client_x: f32, client_y: f32) -> Vec2 {
    let rect = canvas.get_bounding_client_rect();
    Vec2::new(client_x - rect.left() as f32, client_y - rect.top() as f32)
}
