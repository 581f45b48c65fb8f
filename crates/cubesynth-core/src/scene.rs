//! Enclosure and body population, plus the body -> visual handle map.

use crate::constants::*;
use crate::physics::{BodyDesc, BodyHandle, BodyShape, PhysicsWorld};
use fnv::FnvHashMap;
use glam::Vec3;
use rand::prelude::*;

/// Renderer-side id of a visual paired with a body.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct VisualHandle(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisualKind {
    Draggable,
    Ball,
    Floor,
    Wall,
    Ceiling,
}

/// What a renderer needs to create the visual for one body.
#[derive(Clone, Copy, Debug)]
pub struct VisualDesc {
    pub handle: VisualHandle,
    pub kind: VisualKind,
    pub shape: BodyShape,
}

/// Stable pairing of bodies with their visuals.
#[derive(Clone, Debug, Default)]
pub struct VisualMap {
    by_body: FnvHashMap<BodyHandle, VisualHandle>,
    descs: Vec<VisualDesc>,
    order: Vec<BodyHandle>,
}

impl VisualMap {
    pub fn insert(&mut self, body: BodyHandle, kind: VisualKind, shape: BodyShape) -> VisualHandle {
        if let Some(&existing) = self.by_body.get(&body) {
            return existing;
        }
        let handle = VisualHandle(self.descs.len() as u32);
        self.by_body.insert(body, handle);
        self.descs.push(VisualDesc {
            handle,
            kind,
            shape,
        });
        self.order.push(body);
        handle
    }

    pub fn visual(&self, body: BodyHandle) -> Option<VisualHandle> {
        self.by_body.get(&body).copied()
    }

    pub fn descs(&self) -> &[VisualDesc] {
        &self.descs
    }

    /// Body/visual pairs in insertion order.
    pub fn pairs(&self) -> impl Iterator<Item = (BodyHandle, VisualHandle)> + '_ {
        self.order.iter().map(move |b| (*b, self.by_body[b]))
    }

    pub fn len(&self) -> usize {
        self.descs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descs.is_empty()
    }
}

/// Handles produced by [`build_enclosure`].
pub struct SceneLayout {
    pub draggable: BodyHandle,
    pub balls: Vec<BodyHandle>,
    pub visuals: VisualMap,
}

fn static_box(position: Vec3, half_extents: Vec3) -> BodyDesc {
    BodyDesc {
        shape: BodyShape::Cuboid { half_extents },
        position,
        mass: 0.0,
        linear_damping: 0.0,
        angular_damping: 0.0,
        friction: FRICTION,
        restitution: STATIC_RESTITUTION,
    }
}

fn sphere(position: Vec3, mass: f32) -> BodyDesc {
    BodyDesc {
        shape: BodyShape::Sphere {
            radius: SPHERE_RADIUS,
        },
        position,
        mass,
        linear_damping: BODY_DAMPING,
        angular_damping: BODY_DAMPING,
        friction: FRICTION,
        restitution: SPHERE_RESTITUTION,
    }
}

/// Floor, ceiling and four walls; all immovable.
pub fn enclosure_bodies() -> Vec<(VisualKind, BodyDesc)> {
    let half_len = ROOM_LENGTH / 2.0;
    let half_wid = ROOM_WIDTH / 2.0;
    let half_t = WALL_THICKNESS / 2.0;
    let ceiling_y = FLOOR_Y + WALL_HEIGHT;
    let wall_center_y = FLOOR_Y + WALL_HEIGHT / 2.0;
    let wall_half_h = WALL_HEIGHT / 2.0;
    vec![
        (
            VisualKind::Floor,
            static_box(
                Vec3::new(0.0, FLOOR_Y - half_t, 0.0),
                Vec3::new(half_len, half_t, half_wid),
            ),
        ),
        (
            VisualKind::Ceiling,
            static_box(
                Vec3::new(0.0, ceiling_y + half_t, 0.0),
                Vec3::new(half_len, half_t, half_wid),
            ),
        ),
        // north / south
        (
            VisualKind::Wall,
            static_box(
                Vec3::new(0.0, wall_center_y, -half_wid),
                Vec3::new(half_len, wall_half_h, half_t),
            ),
        ),
        (
            VisualKind::Wall,
            static_box(
                Vec3::new(0.0, wall_center_y, half_wid),
                Vec3::new(half_len, wall_half_h, half_t),
            ),
        ),
        // east / west
        (
            VisualKind::Wall,
            static_box(
                Vec3::new(half_len, wall_center_y, 0.0),
                Vec3::new(half_t, wall_half_h, half_wid),
            ),
        ),
        (
            VisualKind::Wall,
            static_box(
                Vec3::new(-half_len, wall_center_y, 0.0),
                Vec3::new(half_t, wall_half_h, half_wid),
            ),
        ),
    ]
}

/// Random polar placement around the center, deterministic for a seed.
///
/// The polar radius reaches past the short walls, so positions are clamped
/// to stay inside the room.
pub fn surrounding_positions(count: usize, seed: u64) -> Vec<Vec3> {
    let mut rng = StdRng::seed_from_u64(seed);
    let inset = SPHERE_RADIUS + WALL_THICKNESS / 2.0;
    let max_x = ROOM_LENGTH / 2.0 - inset;
    let max_z = ROOM_WIDTH / 2.0 - inset;
    (0..count)
        .map(|_| {
            let angle = rng.gen::<f32>() * std::f32::consts::TAU;
            let distance = rng.gen_range(SURROUNDING_MIN_RADIUS..SURROUNDING_MAX_RADIUS);
            let height = rng.gen_range(SURROUNDING_MIN_HEIGHT..SURROUNDING_MAX_HEIGHT);
            Vec3::new(
                (angle.cos() * distance).clamp(-max_x, max_x),
                height,
                (angle.sin() * distance).clamp(-max_z, max_z),
            )
        })
        .collect()
}

pub fn build_enclosure<W: PhysicsWorld>(world: &mut W, ball_count: usize, seed: u64) -> SceneLayout {
    let mut visuals = VisualMap::default();
    for (kind, desc) in enclosure_bodies() {
        let body = world.add_body(&desc);
        visuals.insert(body, kind, desc.shape);
    }

    let ceiling_y = FLOOR_Y + WALL_HEIGHT;
    let mut spawn = Vec3::from(DRAGGABLE_SPAWN);
    spawn.y = spawn.y.min(ceiling_y - SPHERE_RADIUS * 1.5);
    let desc = sphere(spawn, DRAGGABLE_MASS);
    let draggable = world.add_body(&desc);
    visuals.insert(draggable, VisualKind::Draggable, desc.shape);

    let mut balls = Vec::with_capacity(ball_count);
    for position in surrounding_positions(ball_count, seed) {
        let desc = sphere(position, SURROUNDING_MASS);
        let body = world.add_body(&desc);
        visuals.insert(body, VisualKind::Ball, desc.shape);
        balls.push(body);
    }
    log::info!(
        "[scene] enclosure {}x{}x{} with {} balls (seed {seed})",
        ROOM_LENGTH,
        WALL_HEIGHT,
        ROOM_WIDTH,
        balls.len()
    );
    SceneLayout {
        draggable,
        balls,
        visuals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_deterministic_and_in_range() {
        let a = surrounding_positions(40, 9);
        let b = surrounding_positions(40, 9);
        assert_eq!(a, b);
        for p in a {
            let r = (p.x * p.x + p.z * p.z).sqrt();
            assert!(r >= SURROUNDING_MIN_RADIUS - 1e-4 && r < SURROUNDING_MAX_RADIUS + 1e-4);
            assert!(p.z.abs() <= ROOM_WIDTH / 2.0 - SPHERE_RADIUS);
            assert!(p.y >= SURROUNDING_MIN_HEIGHT && p.y < SURROUNDING_MAX_HEIGHT);
        }
    }

    #[test]
    fn enclosure_is_immovable() {
        let bodies = enclosure_bodies();
        assert_eq!(bodies.len(), 6);
        assert!(bodies.iter().all(|(_, d)| d.is_static()));
    }

    #[test]
    fn every_body_gets_a_visual_and_only_the_room_is_static() {
        let mut world = crate::physics::RapierWorld::new();
        let layout = build_enclosure(&mut world, 4, 1);
        assert_eq!(layout.visuals.len(), 6 + 1 + 4);
        for (body, visual) in layout.visuals.pairs() {
            let kind = layout.visuals.descs()[visual.0 as usize].kind;
            let fixed = world.mass(body) == Ok(0.0);
            let room = matches!(kind, VisualKind::Floor | VisualKind::Wall | VisualKind::Ceiling);
            assert_eq!(fixed, room, "{body} is {kind:?}");
        }
        let dragged = layout.visuals.visual(layout.draggable);
        let kind = dragged.map(|v| layout.visuals.descs()[v.0 as usize].kind);
        assert_eq!(kind, Some(VisualKind::Draggable));
    }

    #[test]
    fn visual_map_is_stable_per_body() {
        let mut map = VisualMap::default();
        let shape = BodyShape::Sphere { radius: 1.0 };
        let v0 = map.insert(BodyHandle(10), VisualKind::Ball, shape);
        let v1 = map.insert(BodyHandle(3), VisualKind::Ball, shape);
        assert_eq!(map.insert(BodyHandle(10), VisualKind::Ball, shape), v0);
        assert_eq!(map.visual(BodyHandle(3)), Some(v1));
        let pairs: Vec<_> = map.pairs().collect();
        assert_eq!(pairs, vec![(BodyHandle(10), v0), (BodyHandle(3), v1)]);
    }
}
