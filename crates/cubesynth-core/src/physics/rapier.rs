use super::{BodyDesc, BodyHandle, BodyShape, ContactBegin, PhysicsError, PhysicsWorld};
use crate::constants::GRAVITY_Y;
use fnv::FnvHashMap;
use glam::{Quat, Vec3};
use rapier3d::crossbeam::channel::{unbounded, Receiver};
use rapier3d::prelude::*;

#[inline]
fn to_na(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

#[inline]
fn from_na(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

struct BodyEntry {
    rigid: RigidBodyHandle,
    mass: f32,
}

/// [`PhysicsWorld`] backed by a rapier3d pipeline.
///
/// Contact-begin events come from a channel event collector; each event is
/// paired with the velocities the bodies had before the step so the impact
/// speed describes the approach rather than the rebound.
pub struct RapierWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    event_collector: ChannelEventCollector,
    collision_recv: Receiver<CollisionEvent>,
    _contact_force_recv: Receiver<ContactForceEvent>,
    bodies: FnvHashMap<BodyHandle, BodyEntry>,
    by_collider: FnvHashMap<ColliderHandle, BodyHandle>,
    next_id: u32,
    pre_step_velocity: FnvHashMap<BodyHandle, Vec3>,
    forced: Vec<RigidBodyHandle>,
}

impl Default for RapierWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl RapierWorld {
    pub fn new() -> Self {
        let (collision_send, collision_recv) = unbounded();
        let (contact_force_send, contact_force_recv) = unbounded();
        Self {
            gravity: vector![0.0, GRAVITY_Y, 0.0],
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            event_collector: ChannelEventCollector::new(collision_send, contact_force_send),
            collision_recv,
            _contact_force_recv: contact_force_recv,
            bodies: FnvHashMap::default(),
            by_collider: FnvHashMap::default(),
            next_id: 0,
            pre_step_velocity: FnvHashMap::default(),
            forced: Vec::new(),
        }
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = to_na(gravity);
    }

    fn entry(&self, body: BodyHandle) -> Result<&BodyEntry, PhysicsError> {
        self.bodies.get(&body).ok_or(PhysicsError::UnknownBody(body))
    }

    fn rigid(&self, body: BodyHandle) -> Result<&RigidBody, PhysicsError> {
        let entry = self.entry(body)?;
        self.rigid_body_set
            .get(entry.rigid)
            .ok_or(PhysicsError::UnknownBody(body))
    }

    fn rigid_mut(&mut self, body: BodyHandle) -> Result<&mut RigidBody, PhysicsError> {
        let entry = self.bodies.get(&body).ok_or(PhysicsError::UnknownBody(body))?;
        if entry.mass <= 0.0 {
            return Err(PhysicsError::Immovable(body));
        }
        self.rigid_body_set
            .get_mut(entry.rigid)
            .ok_or(PhysicsError::UnknownBody(body))
    }

    fn contact_velocity(&self, body: BodyHandle) -> Vec3 {
        self.pre_step_velocity
            .get(&body)
            .copied()
            .or_else(|| self.velocity(body).ok())
            .unwrap_or(Vec3::ZERO)
    }
}

impl PhysicsWorld for RapierWorld {
    fn add_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        let builder = if desc.is_static() {
            RigidBodyBuilder::fixed()
        } else {
            RigidBodyBuilder::dynamic()
                .linear_damping(desc.linear_damping)
                .angular_damping(desc.angular_damping)
        };
        let rigid = self
            .rigid_body_set
            .insert(builder.translation(to_na(desc.position)).build());

        let collider = match desc.shape {
            BodyShape::Sphere { radius } => ColliderBuilder::ball(radius),
            BodyShape::Cuboid { half_extents } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
        }
        .friction(desc.friction)
        .restitution(desc.restitution)
        .active_events(ActiveEvents::COLLISION_EVENTS);
        // statics impose their (lower) restitution on whatever hits them
        let collider = if desc.is_static() {
            collider.restitution_combine_rule(CoefficientCombineRule::Min)
        } else {
            collider.mass(desc.mass)
        };
        let collider_handle =
            self.collider_set
                .insert_with_parent(collider.build(), rigid, &mut self.rigid_body_set);

        let handle = BodyHandle(self.next_id);
        self.next_id += 1;
        self.bodies.insert(
            handle,
            BodyEntry {
                rigid,
                mass: desc.mass.max(0.0),
            },
        );
        self.by_collider.insert(collider_handle, handle);
        handle
    }

    fn step(&mut self, dt: f32, contacts: &mut Vec<ContactBegin>) {
        self.pre_step_velocity.clear();
        for (handle, entry) in &self.bodies {
            if entry.mass > 0.0 {
                if let Some(rb) = self.rigid_body_set.get(entry.rigid) {
                    self.pre_step_velocity.insert(*handle, from_na(rb.linvel()));
                }
            }
        }

        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &self.event_collector,
        );

        // forces apply for one step only
        for rigid in self.forced.drain(..) {
            if let Some(rb) = self.rigid_body_set.get_mut(rigid) {
                rb.reset_forces(false);
            }
        }

        while let Ok(event) = self.collision_recv.try_recv() {
            if let CollisionEvent::Started(c1, c2, _) = event {
                let (Some(&a), Some(&b)) = (self.by_collider.get(&c1), self.by_collider.get(&c2))
                else {
                    continue;
                };
                contacts.push(ContactBegin {
                    body_a: a,
                    body_b: b,
                    velocity_a: self.contact_velocity(a),
                    velocity_b: self.contact_velocity(b),
                });
            }
        }
    }

    fn mass(&self, body: BodyHandle) -> Result<f32, PhysicsError> {
        Ok(self.entry(body)?.mass)
    }

    fn position(&self, body: BodyHandle) -> Result<Vec3, PhysicsError> {
        Ok(from_na(self.rigid(body)?.translation()))
    }

    fn rotation(&self, body: BodyHandle) -> Result<Quat, PhysicsError> {
        let q = self.rigid(body)?.rotation();
        Ok(Quat::from_xyzw(q.i, q.j, q.k, q.w))
    }

    fn velocity(&self, body: BodyHandle) -> Result<Vec3, PhysicsError> {
        Ok(from_na(self.rigid(body)?.linvel()))
    }

    fn angular_velocity(&self, body: BodyHandle) -> Result<Vec3, PhysicsError> {
        Ok(from_na(self.rigid(body)?.angvel()))
    }

    fn set_position(&mut self, body: BodyHandle, position: Vec3) -> Result<(), PhysicsError> {
        self.rigid_mut(body)?.set_translation(to_na(position), true);
        Ok(())
    }

    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec3) -> Result<(), PhysicsError> {
        self.rigid_mut(body)?.set_linvel(to_na(velocity), true);
        Ok(())
    }

    fn set_angular_velocity(
        &mut self,
        body: BodyHandle,
        angular_velocity: Vec3,
    ) -> Result<(), PhysicsError> {
        self.rigid_mut(body)?.set_angvel(to_na(angular_velocity), true);
        Ok(())
    }

    fn apply_force(&mut self, body: BodyHandle, force: Vec3) -> Result<(), PhysicsError> {
        let rigid = self.entry(body)?.rigid;
        self.rigid_mut(body)?.add_force(to_na(force), true);
        self.forced.push(rigid);
        Ok(())
    }
}
