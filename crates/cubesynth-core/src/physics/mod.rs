//! Physics collaborator boundary.
//!
//! The core never creates physics state of its own beyond scene setup; it
//! reads and writes position/velocity/mass through [`PhysicsWorld`] and
//! listens to the contact-begin events produced by each step.

mod rapier;

pub use rapier::RapierWorld;

use glam::{Quat, Vec3};
use std::fmt;
use thiserror::Error;

/// Stable, engine-independent id of a body.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub u32);

impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BodyHandle({})", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BodyShape {
    Sphere { radius: f32 },
    Cuboid { half_extents: Vec3 },
}

/// Everything needed to create a body. `mass == 0` makes it immovable.
#[derive(Clone, Debug)]
pub struct BodyDesc {
    pub shape: BodyShape,
    pub position: Vec3,
    pub mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub friction: f32,
    pub restitution: f32,
}

impl BodyDesc {
    pub fn is_static(&self) -> bool {
        self.mass <= 0.0
    }
}

/// Two bodies started touching during a step.
///
/// Velocities are sampled at the start of the step, before the solver
/// resolved the contact.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactBegin {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub velocity_a: Vec3,
    pub velocity_b: Vec3,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PhysicsError {
    #[error("unknown body {0}")]
    UnknownBody(BodyHandle),
    #[error("body {0} is immovable")]
    Immovable(BodyHandle),
}

pub trait PhysicsWorld {
    fn add_body(&mut self, desc: &BodyDesc) -> BodyHandle;
    /// Advance by `dt` seconds, appending contacts that began during the step.
    fn step(&mut self, dt: f32, contacts: &mut Vec<ContactBegin>);

    fn mass(&self, body: BodyHandle) -> Result<f32, PhysicsError>;
    fn position(&self, body: BodyHandle) -> Result<Vec3, PhysicsError>;
    fn rotation(&self, body: BodyHandle) -> Result<Quat, PhysicsError>;
    fn velocity(&self, body: BodyHandle) -> Result<Vec3, PhysicsError>;
    fn angular_velocity(&self, body: BodyHandle) -> Result<Vec3, PhysicsError>;

    fn set_position(&mut self, body: BodyHandle, position: Vec3) -> Result<(), PhysicsError>;
    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec3) -> Result<(), PhysicsError>;
    fn set_angular_velocity(
        &mut self,
        body: BodyHandle,
        angular_velocity: Vec3,
    ) -> Result<(), PhysicsError>;
    /// Accumulate a force through the center of mass for the next step.
    fn apply_force(&mut self, body: BodyHandle, force: Vec3) -> Result<(), PhysicsError>;
}
