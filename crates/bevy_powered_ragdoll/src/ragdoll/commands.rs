use bevy::{
    ecs::{entity::Entity, system::Commands, world::World},
    log::error,
    math::Vec3,
};

use super::control;
use crate::{body::ForceMode, errors::RagdollResult, joint};

fn report<T>(operation: &str, ragdoll: Entity, result: RagdollResult<T>) {
    if let Err(err) = result {
        error!("Ragdoll {:?}: {} failed: {}", ragdoll, operation, err);
    }
}

/// Deferred versions of the ragdoll operations in [`control`]. Failures are logged.
pub trait RagdollCommandsExt {
    fn initialize_ragdoll(&mut self, ragdoll: Entity) -> &mut Self;
    fn rebuild_ragdoll_mapping(&mut self, ragdoll: Entity) -> &mut Self;
    fn enable_ragdoll_dynamic(&mut self, ragdoll: Entity) -> &mut Self;
    fn enable_ragdoll_kinematic(&mut self, ragdoll: Entity) -> &mut Self;
    fn set_ragdoll_limp(&mut self, ragdoll: Entity, limp: bool) -> &mut Self;
    fn apply_ragdoll_force_at(
        &mut self,
        ragdoll: Entity,
        magnitude: f32,
        point: Option<Vec3>,
        mode: ForceMode,
    ) -> &mut Self;
    fn apply_ragdoll_force(&mut self, ragdoll: Entity, force: Vec3, mode: ForceMode)
    -> &mut Self;
    /// See [`joint::convert_joints`].
    fn convert_ragdoll_joints(&mut self, root: Entity, strength: f32) -> &mut Self;
}

impl RagdollCommandsExt for Commands<'_, '_> {
    fn initialize_ragdoll(&mut self, ragdoll: Entity) -> &mut Self {
        self.queue(move |world: &mut World| {
            report(
                "initialization",
                ragdoll,
                control::initialize_ragdoll(world, ragdoll),
            );
        });
        self
    }

    fn rebuild_ragdoll_mapping(&mut self, ragdoll: Entity) -> &mut Self {
        self.queue(move |world: &mut World| {
            report(
                "bone mapping",
                ragdoll,
                control::rebuild_mapping(world, ragdoll),
            );
        });
        self
    }

    fn enable_ragdoll_dynamic(&mut self, ragdoll: Entity) -> &mut Self {
        self.queue(move |world: &mut World| {
            report(
                "enable dynamic",
                ragdoll,
                control::enable_dynamic(world, ragdoll),
            );
        });
        self
    }

    fn enable_ragdoll_kinematic(&mut self, ragdoll: Entity) -> &mut Self {
        self.queue(move |world: &mut World| {
            report(
                "enable kinematic",
                ragdoll,
                control::enable_kinematic(world, ragdoll),
            );
        });
        self
    }

    fn set_ragdoll_limp(&mut self, ragdoll: Entity, limp: bool) -> &mut Self {
        self.queue(move |world: &mut World| {
            report(
                "set limp",
                ragdoll,
                control::set_limp(world, ragdoll, limp),
            );
        });
        self
    }

    fn apply_ragdoll_force_at(
        &mut self,
        ragdoll: Entity,
        magnitude: f32,
        point: Option<Vec3>,
        mode: ForceMode,
    ) -> &mut Self {
        self.queue(move |world: &mut World| {
            report(
                "apply force",
                ragdoll,
                control::apply_force_at(world, ragdoll, magnitude, point, mode),
            );
        });
        self
    }

    fn apply_ragdoll_force(
        &mut self,
        ragdoll: Entity,
        force: Vec3,
        mode: ForceMode,
    ) -> &mut Self {
        self.queue(move |world: &mut World| {
            report(
                "apply force",
                ragdoll,
                control::apply_force(world, ragdoll, force, mode),
            );
        });
        self
    }

    fn convert_ragdoll_joints(&mut self, root: Entity, strength: f32) -> &mut Self {
        self.queue(move |world: &mut World| {
            joint::convert_joints(world, root, strength);
        });
        self
    }
}
