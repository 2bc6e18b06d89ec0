//! Bridge between the [`RagdollBody`]/[`RagdollCollider`] mirrors and avian3d.

use avian3d::prelude::{
    AngularDamping, AngularVelocity, ColliderDisabled, ComputedMass, LinearDamping,
    LinearVelocity, Position, RigidBody, Rotation,
};
use bevy::ecs::{
    entity::Entity,
    query::Has,
    system::{Commands, Query},
};

use crate::body::{BodyMode, RagdollBody, RagdollCollider};

pub fn rigid_body_for(mode: BodyMode) -> RigidBody {
    match mode {
        BodyMode::Kinematic => RigidBody::Kinematic,
        BodyMode::Dynamic => RigidBody::Dynamic,
    }
}

/// Copies the solver's current body state into the mirrors.
#[allow(clippy::type_complexity)]
pub fn read_back_bodies_avian(
    mut bodies: Query<(
        &mut RagdollBody,
        &Position,
        &Rotation,
        Option<&LinearVelocity>,
        Option<&AngularVelocity>,
        Option<&ComputedMass>,
    )>,
) {
    for (mut body, position, rotation, linvel, angvel, mass) in &mut bodies {
        if let Some(mass) = mass {
            body.mass = mass.value();
        }
        body.sync_from_physics(
            position.0,
            rotation.0,
            linvel.map(|v| v.0).unwrap_or_default(),
            angvel.map(|v| v.0).unwrap_or_default(),
        );
    }
}

/// Pushes body modes, written velocities and damping overrides to the solver.
#[allow(clippy::type_complexity)]
pub fn write_back_bodies_avian(
    mut bodies: Query<(
        Entity,
        &mut RagdollBody,
        Option<&RigidBody>,
        Option<&mut LinearVelocity>,
        Option<&mut AngularVelocity>,
        Option<&LinearDamping>,
        Option<&AngularDamping>,
    )>,
    mut commands: Commands,
) {
    for (entity, mut body, rigid_body, linvel, angvel, linear_damping, angular_damping) in
        &mut bodies
    {
        let target_mode = rigid_body_for(body.mode);
        if rigid_body != Some(&target_mode) {
            commands.entity(entity).insert(target_mode);
        }

        if let Some((linear, angular)) = body.take_dirty_velocities() {
            match linvel {
                Some(mut linvel) => linvel.0 = linear,
                None => {
                    commands.entity(entity).insert(LinearVelocity(linear));
                }
            }
            match angvel {
                Some(mut angvel) => angvel.0 = angular,
                None => {
                    commands.entity(entity).insert(AngularVelocity(angular));
                }
            }
        }

        let Some(damping) = body.damping else {
            continue;
        };
        if linear_damping.map(|d| d.0) != Some(damping.linear) {
            commands
                .entity(entity)
                .insert(LinearDamping(damping.linear));
        }
        if angular_damping.map(|d| d.0) != Some(damping.angular) {
            commands
                .entity(entity)
                .insert(AngularDamping(damping.angular));
        }
    }
}

/// Disables the avian colliders of disabled [`RagdollCollider`]s and re-enables the others.
pub fn write_back_colliders_avian(
    colliders: Query<(Entity, &RagdollCollider, Has<ColliderDisabled>)>,
    mut commands: Commands,
) {
    for (entity, collider, disabled) in &colliders {
        if collider.enabled && disabled {
            commands.entity(entity).remove::<ColliderDisabled>();
        } else if !collider.enabled && !disabled {
            commands.entity(entity).insert(ColliderDisabled);
        }
    }
}
