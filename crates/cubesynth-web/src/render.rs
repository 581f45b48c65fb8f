use cubesynth_core::{BodyShape, SceneSink, Viewport, VisualDesc, VisualHandle, VisualKind};
use glam::{Quat, Vec2, Vec3};
use wasm_bindgen::JsCast;
use web_sys as web;

const BACKGROUND: &str = "#101014";
const FLOOR: &str = "#1c1c24";
const WALL: &str = "#3a3a48";
const BALL: &str = "#6f8fbf";
const DRAGGABLE: &str = "#e0604a";
const DRAGGABLE_HELD: &str = "#ffb070";
const SPIN_MARK: &str = "rgba(255,255,255,0.55)";

struct Item {
    kind: VisualKind,
    shape: BodyShape,
    position: Vec3,
    rotation: Quat,
}

/// Top-down Canvas 2D view of the enclosure. Drawing happens in CSS pixels;
/// the context transform maps them onto the device-pixel backing store.
pub struct CanvasScene {
    ctx: web::CanvasRenderingContext2d,
    viewport: Viewport,
    pixel_ratio: f64,
    items: Vec<Item>,
    draw_order: Vec<usize>,
    held: Option<VisualHandle>,
}

impl CanvasScene {
    pub fn new(
        canvas: &web::HtmlCanvasElement,
        descs: &[VisualDesc],
        viewport: Viewport,
    ) -> anyhow::Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| anyhow::anyhow!("{e:?}"))?
            .ok_or_else(|| anyhow::anyhow!("2d context unavailable"))?
            .dyn_into::<web::CanvasRenderingContext2d>()
            .map_err(|e| anyhow::anyhow!("{e:?}"))?;
        let mut items: Vec<Item> = Vec::with_capacity(descs.len());
        for d in descs {
            let idx = d.handle.0 as usize;
            if items.len() <= idx {
                items.resize_with(idx + 1, || Item {
                    kind: VisualKind::Ball,
                    shape: BodyShape::Sphere { radius: 0.0 },
                    position: Vec3::ZERO,
                    rotation: Quat::IDENTITY,
                });
            }
            items[idx].kind = d.kind;
            items[idx].shape = d.shape;
        }
        let draw_order = (0..items.len()).collect();
        Ok(Self {
            ctx,
            viewport,
            pixel_ratio: 1.0,
            items,
            draw_order,
            held: None,
        })
    }

    pub fn set_viewport(&mut self, viewport: &Viewport) {
        self.viewport = viewport.clone();
    }

    pub fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = ratio;
    }

    pub fn set_held(&mut self, held: Option<VisualHandle>) {
        self.held = held;
    }

    fn draw_box(&self, item: &Item, half: Vec3) {
        // top face only: the camera looks straight down
        let top = item.position.y + half.y;
        let corners = [
            Vec3::new(-half.x, 0.0, -half.z),
            Vec3::new(half.x, 0.0, -half.z),
            Vec3::new(half.x, 0.0, half.z),
            Vec3::new(-half.x, 0.0, half.z),
        ];
        let pts: Option<Vec<Vec2>> = corners
            .iter()
            .map(|c| {
                let p = item.position + item.rotation * *c;
                self.viewport.project(Vec3::new(p.x, top, p.z))
            })
            .collect();
        let Some(pts) = pts else {
            return;
        };
        let color = match item.kind {
            VisualKind::Floor => FLOOR,
            _ => WALL,
        };
        self.ctx.begin_path();
        self.ctx.move_to(pts[0].x as f64, pts[0].y as f64);
        for p in &pts[1..] {
            self.ctx.line_to(p.x as f64, p.y as f64);
        }
        self.ctx.close_path();
        self.ctx.set_fill_style_str(color);
        self.ctx.fill();
    }

    fn draw_sphere(&self, handle: VisualHandle, item: &Item, radius: f32) {
        let Some(center) = self.viewport.project(item.position) else {
            return;
        };
        // perspective: nearer (higher) spheres look larger
        let Some(edge) = self.viewport.project(item.position + Vec3::X * radius) else {
            return;
        };
        let r = center.distance(edge).max(1.0) as f64;
        let color = match (item.kind, self.held == Some(handle)) {
            (VisualKind::Draggable, true) => DRAGGABLE_HELD,
            (VisualKind::Draggable, false) => DRAGGABLE,
            _ => BALL,
        };
        self.ctx.begin_path();
        let _ = self
            .ctx
            .arc(center.x as f64, center.y as f64, r, 0.0, std::f64::consts::TAU);
        self.ctx.set_fill_style_str(color);
        self.ctx.fill();

        let mark = item.position + item.rotation * (Vec3::X * radius * 0.8);
        if let Some(m) = self.viewport.project(mark) {
            self.ctx.begin_path();
            self.ctx.move_to(center.x as f64, center.y as f64);
            self.ctx.line_to(m.x as f64, m.y as f64);
            self.ctx.set_stroke_style_str(SPIN_MARK);
            self.ctx.set_line_width(1.5);
            self.ctx.stroke();
        }
    }
}

impl SceneSink for CanvasScene {
    fn sync_transform(&mut self, visual: VisualHandle, position: Vec3, rotation: Quat) {
        if let Some(item) = self.items.get_mut(visual.0 as usize) {
            item.position = position;
            item.rotation = rotation;
        }
    }

    fn render(&mut self) {
        let r = self.pixel_ratio;
        if let Err(e) = self.ctx.set_transform(r, 0.0, 0.0, r, 0.0, 0.0) {
            log::warn!("[render] set_transform failed: {e:?}");
        }
        self.ctx.set_fill_style_str(BACKGROUND);
        self.ctx.fill_rect(
            0.0,
            0.0,
            self.viewport.width as f64,
            self.viewport.height as f64,
        );

        // painter's order: floor, then lowest to highest; ceiling is skipped
        let items = &self.items;
        self.draw_order.sort_by(|&a, &b| {
            let rank = |i: &Item| match i.kind {
                VisualKind::Floor => f32::MIN,
                _ => i.position.y,
            };
            rank(&items[a]).total_cmp(&rank(&items[b]))
        });
        for &idx in &self.draw_order {
            let item = &self.items[idx];
            match (item.kind, item.shape) {
                (VisualKind::Ceiling, _) => {}
                (_, BodyShape::Cuboid { half_extents }) => self.draw_box(item, half_extents),
                (_, BodyShape::Sphere { radius }) => {
                    self.draw_sphere(VisualHandle(idx as u32), item, radius)
                }
            }
        }
    }
}
