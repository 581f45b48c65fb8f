//! Kinematic override of a held body on top of the dynamic simulation.
//!
//! While a body is held its horizontal position follows the pointer's
//! intersection with the drag plane and both velocities are zeroed, so the
//! integrator never fights the pointer. Height stays under physics control.
//! On release the body keeps its last overridden position with zero velocity
//! and resumes free integration.

use crate::physics::{BodyHandle, PhysicsError, PhysicsWorld};
use glam::{Vec2, Vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
struct Hold {
    body: BodyHandle,
    target_xz: Vec2,
}

#[derive(Clone, Debug, Default)]
pub struct PhysicsBridge {
    hold: Option<Hold>,
}

impl PhysicsBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn held(&self) -> Option<BodyHandle> {
        self.hold.map(|h| h.body)
    }

    pub fn target(&self) -> Option<Vec2> {
        self.hold.map(|h| h.target_xz)
    }

    /// Take hold of `body` (or retarget it) and snap it to the plane intersection.
    pub fn override_body<W: PhysicsWorld>(
        &mut self,
        world: &mut W,
        body: BodyHandle,
        plane_intersection: Vec2,
    ) -> Result<(), PhysicsError> {
        self.hold = Some(Hold {
            body,
            target_xz: plane_intersection,
        });
        Self::pin(world, body, plane_intersection)
    }

    /// Re-apply the current hold. Called before every physics step.
    pub fn apply<W: PhysicsWorld>(&self, world: &mut W) {
        let Some(hold) = self.hold else {
            return;
        };
        if let Err(e) = Self::pin(world, hold.body, hold.target_xz) {
            log::warn!("[bridge] override of {} failed: {e}", hold.body);
        }
    }

    /// Let go of the held body, leaving it at rest where it was pinned.
    pub fn release<W: PhysicsWorld>(&mut self, world: &mut W) -> Option<BodyHandle> {
        let hold = self.hold.take()?;
        if let Err(e) = Self::stop(world, hold.body) {
            log::warn!("[bridge] release of {} failed: {e}", hold.body);
        }
        Some(hold.body)
    }

    /// Zero linear and angular velocity.
    pub fn stop<W: PhysicsWorld>(world: &mut W, body: BodyHandle) -> Result<(), PhysicsError> {
        world.set_velocity(body, Vec3::ZERO)?;
        world.set_angular_velocity(body, Vec3::ZERO)
    }

    fn pin<W: PhysicsWorld>(
        world: &mut W,
        body: BodyHandle,
        target_xz: Vec2,
    ) -> Result<(), PhysicsError> {
        let current = world.position(body)?;
        world.set_position(body, Vec3::new(target_xz.x, current.y, target_xz.y))?;
        Self::stop(world, body)
    }
}
