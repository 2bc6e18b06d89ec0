use bevy::{
    ecs::component::Component,
    math::{Quat, Vec3},
    reflect::Reflect,
};
use serde::{Deserialize, Serialize};

use crate::config::Damping;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
pub enum BodyMode {
    #[default]
    Kinematic,
    Dynamic,
}

/// How a force vector turns into a velocity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
pub enum ForceMode {
    /// Instant change in momentum, scaled by inverse mass.
    #[default]
    Impulse,
    /// Instant change in velocity, ignoring mass.
    VelocityChange,
    /// Continuous force applied over one fixed step, scaled by inverse mass.
    Force,
    /// Continuous acceleration applied over one fixed step, ignoring mass.
    Acceleration,
}

impl ForceMode {
    pub fn velocity_change(self, force: Vec3, mass: f32, dt: f32) -> Vec3 {
        let inverse_mass = if mass > 0. { mass.recip() } else { 0. };
        match self {
            ForceMode::Impulse => force * inverse_mass,
            ForceMode::VelocityChange => force,
            ForceMode::Force => force * dt * inverse_mass,
            ForceMode::Acceleration => force * dt,
        }
    }
}

/// Controller-side view of one simulated rigid body of a ragdoll.
///
/// Pose and velocities are refreshed from the physics engine before the ragdoll systems
/// run. Velocities written here are marked dirty and pushed back to the physics engine
/// afterwards, so they survive until the solver consumes them.
///
/// `damping` is only pushed to the physics engine when set; `None` leaves whatever damping
/// the body was authored with.
#[derive(Component, Debug, Clone, Reflect)]
pub struct RagdollBody {
    pub mode: BodyMode,
    pub position: Vec3,
    pub rotation: Quat,
    pub damping: Option<Damping>,
    /// Refreshed from the physics engine together with the pose, when it reports one.
    pub mass: f32,
    pub(crate) linear_velocity: Vec3,
    pub(crate) angular_velocity: Vec3,
    pub(crate) velocity_dirty: bool,
}

impl Default for RagdollBody {
    fn default() -> Self {
        Self {
            mode: BodyMode::Kinematic,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            damping: None,
            mass: 1.,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            velocity_dirty: false,
        }
    }
}

impl RagdollBody {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Self::default()
        }
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn linear_velocity(&self) -> Vec3 {
        self.linear_velocity
    }

    pub fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    pub fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.linear_velocity = velocity;
        self.velocity_dirty = true;
    }

    pub fn set_angular_velocity(&mut self, velocity: Vec3) {
        self.angular_velocity = velocity;
        self.velocity_dirty = true;
    }

    /// Zeroes both velocities and marks them for write-back.
    pub fn stop(&mut self) {
        self.set_linear_velocity(Vec3::ZERO);
        self.set_angular_velocity(Vec3::ZERO);
    }

    pub fn is_dynamic(&self) -> bool {
        self.mode == BodyMode::Dynamic
    }

    pub fn apply_force(&mut self, force: Vec3, mode: ForceMode, dt: f32) {
        let delta = mode.velocity_change(force, self.mass, dt);
        self.set_linear_velocity(self.linear_velocity + delta);
    }

    /// Overwrites pose from the physics engine. Velocities are only overwritten if nothing
    /// wrote to them since the last [`RagdollBody::take_dirty_velocities`].
    pub fn sync_from_physics(
        &mut self,
        position: Vec3,
        rotation: Quat,
        linear_velocity: Vec3,
        angular_velocity: Vec3,
    ) {
        self.position = position;
        self.rotation = rotation;
        if !self.velocity_dirty {
            self.linear_velocity = linear_velocity;
            self.angular_velocity = angular_velocity;
        }
    }

    /// Returns `(linear, angular)` if they were written since the last call, and clears the
    /// dirty mark.
    pub fn take_dirty_velocities(&mut self) -> Option<(Vec3, Vec3)> {
        if !self.velocity_dirty {
            return None;
        }
        self.velocity_dirty = false;
        Some((self.linear_velocity, self.angular_velocity))
    }
}

/// Collision shape whose enablement is controlled by the ragdoll it belongs to.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct RagdollCollider {
    pub enabled: bool,
}

impl Default for RagdollCollider {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn force_modes_scale_by_mass_and_timestep() {
        let force = Vec3::new(4., 0., 0.);
        let mass = 2.;
        let dt = 0.5;

        assert_eq!(
            ForceMode::Impulse.velocity_change(force, mass, dt),
            Vec3::new(2., 0., 0.)
        );
        assert_eq!(
            ForceMode::VelocityChange.velocity_change(force, mass, dt),
            force
        );
        assert_eq!(
            ForceMode::Force.velocity_change(force, mass, dt),
            Vec3::new(1., 0., 0.)
        );
        assert_eq!(
            ForceMode::Acceleration.velocity_change(force, mass, dt),
            Vec3::new(2., 0., 0.)
        );
    }

    #[test]
    fn massless_body_ignores_impulses() {
        assert_eq!(
            ForceMode::Impulse.velocity_change(Vec3::X, 0., 1.),
            Vec3::ZERO
        );
    }

    #[test]
    fn written_velocities_survive_read_back() {
        let mut body = RagdollBody::default();
        body.apply_force(Vec3::Y, ForceMode::Impulse, 1. / 64.);

        body.sync_from_physics(Vec3::ONE, Quat::IDENTITY, Vec3::ZERO, Vec3::X);
        assert_eq!(body.position, Vec3::ONE);
        assert_eq!(body.linear_velocity(), Vec3::Y);
        assert_eq!(body.angular_velocity(), Vec3::ZERO);

        assert_eq!(body.take_dirty_velocities(), Some((Vec3::Y, Vec3::ZERO)));
        assert_eq!(body.take_dirty_velocities(), None);

        body.sync_from_physics(Vec3::ONE, Quat::IDENTITY, Vec3::Z, Vec3::X);
        assert_eq!(body.linear_velocity(), Vec3::Z);
        assert_eq!(body.angular_velocity(), Vec3::X);
    }

    #[test]
    fn stopped_body_writes_back_zero_velocities() {
        let mut body = RagdollBody::default();
        body.sync_from_physics(Vec3::ZERO, Quat::IDENTITY, Vec3::X, Vec3::Y);
        assert_eq!(body.take_dirty_velocities(), None);

        body.stop();
        body.sync_from_physics(Vec3::ZERO, Quat::IDENTITY, Vec3::X, Vec3::Y);

        assert_eq!(body.linear_velocity(), Vec3::ZERO);
        assert_eq!(body.take_dirty_velocities(), Some((Vec3::ZERO, Vec3::ZERO)));
    }
}
