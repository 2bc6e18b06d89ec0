//! Velocity-based pose matching: every fixed step, each dynamic body's velocities are pulled
//! toward the velocities that would carry it onto its animated target within that step.

use std::f32::consts::PI;

use bevy::{
    ecs::system::{Query, Res},
    math::{Quat, Vec3},
    time::Time,
    transform::components::GlobalTransform,
};

use crate::{body::RagdollBody, config::PoseStrategy, ragdoll::PoweredRagdoll};

/// Rotation errors this close to a half turn, in radians, have no preferred direction.
pub const HALF_TURN_EPSILON: f32 = 1e-3;

/// Rotation taking `from` onto `to` along the shortest arc, as `(axis, angle)` with the
/// angle in radians in `[0, PI)`.
///
/// Returns a zero axis and angle when there is no rotation to make, when the inputs do
/// not produce a well-defined axis, or when the two orientations are a half turn apart
/// (within [`HALF_TURN_EPSILON`]).
pub fn rotation_error_axis_angle(from: Quat, to: Quat) -> (Vec3, f32) {
    let mut delta = (to * from.inverse()).normalize();
    if delta.w < 0. {
        delta = -delta;
    }

    let (axis, angle) = delta.to_axis_angle();
    if !axis.is_finite()
        || !axis.is_normalized()
        || !angle.is_finite()
        || angle <= f32::EPSILON
        || PI - angle <= HALF_TURN_EPSILON
    {
        return (Vec3::ZERO, 0.);
    }

    (axis, angle)
}

/// Linear and angular velocity that would move a body from its current pose onto the
/// target pose in `dt` seconds.
pub fn target_velocities(
    position: Vec3,
    rotation: Quat,
    target_position: Vec3,
    target_rotation: Quat,
    dt: f32,
) -> (Vec3, Vec3) {
    let linear = (target_position - position) / dt;
    let (axis, angle) = rotation_error_axis_angle(rotation, target_rotation);
    let angular = axis * angle / dt;

    (linear, angular)
}

pub fn blend_factor(follow_strength: f32, dt: f32) -> f32 {
    (follow_strength * dt).min(1.)
}

/// One pose-matching step for a single body.
pub fn steer_body(
    body: &mut RagdollBody,
    target_position: Vec3,
    target_rotation: Quat,
    follow_strength: f32,
    dt: f32,
) {
    let (linear, angular) = target_velocities(
        body.position,
        body.rotation,
        target_position,
        target_rotation,
        dt,
    );
    let blend = blend_factor(follow_strength, dt);

    let linear_velocity = body.linear_velocity().lerp(linear, blend);
    let angular_velocity = body.angular_velocity().lerp(angular, blend);
    body.set_linear_velocity(linear_velocity);
    body.set_angular_velocity(angular_velocity);
}

/// Steers the bodies of every dynamic, non-limp pose-matching ragdoll toward their targets.
pub fn match_ragdoll_poses(
    ragdolls: Query<&PoweredRagdoll>,
    targets: Query<&GlobalTransform>,
    mut bodies: Query<&mut RagdollBody>,
    time: Res<Time>,
) {
    let dt = time.delta_secs();
    if dt <= 0. {
        return;
    }

    for ragdoll in &ragdolls {
        if ragdoll.config.strategy != PoseStrategy::ActivePoseMatch
            || !ragdoll.is_dynamic()
            || ragdoll.is_limp()
        {
            continue;
        }
        let Some(mapping) = ragdoll.mapping() else {
            continue;
        };

        for (body_entity, target_entity) in mapping.pairs() {
            let (Ok(mut body), Ok(target)) =
                (bodies.get_mut(body_entity), targets.get(target_entity))
            else {
                continue;
            };
            steer_body(
                &mut body,
                target.translation(),
                target.rotation(),
                ragdoll.config.follow_strength,
                dt,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::RagdollConfig,
        ragdoll::control::{enable_kinematic, initialize_ragdoll, set_limp},
    };
    use bevy::{
        ecs::{entity::Entity, hierarchy::ChildOf, system::RunSystemOnce, world::World},
        transform::components::Transform,
    };
    use std::time::Duration;

    const DT: f32 = 1. / 64.;

    #[test]
    fn velocity_error_shrinks_every_step() {
        let target_position = Vec3::new(1., 0.5, 0.);
        let target_rotation = Quat::from_rotation_y(PI / 2.);
        let mut body = RagdollBody::default();
        let (linear_target, angular_target) = target_velocities(
            body.position,
            body.rotation,
            target_position,
            target_rotation,
            DT,
        );

        let mut previous = f32::INFINITY;
        for _ in 0..20 {
            steer_body(&mut body, target_position, target_rotation, 10., DT);
            let error = (body.linear_velocity() - linear_target).length()
                + (body.angular_velocity() - angular_target).length();
            assert!(error < previous, "{error} >= {previous}");
            assert!(error > 0.);
            previous = error;
        }
    }

    #[test]
    fn blend_factor_is_clamped() {
        assert_eq!(blend_factor(10., DT), 10. * DT);
        assert_eq!(blend_factor(100., 0.1), 1.);
        assert_eq!(blend_factor(1000., DT), 1.);
    }

    #[test]
    fn full_blend_reaches_target_velocities() {
        let mut body = RagdollBody::default();
        body.set_linear_velocity(Vec3::new(-3., 0., 7.));
        let target_rotation = Quat::from_rotation_z(0.5);

        steer_body(&mut body, Vec3::X, target_rotation, 100., 0.1);

        assert!(body.linear_velocity().abs_diff_eq(Vec3::new(10., 0., 0.), 1e-4));
        assert!(body.angular_velocity().abs_diff_eq(Vec3::new(0., 0., 5.), 1e-4));
    }

    #[test]
    fn body_on_target_is_brought_to_rest() {
        let mut body = RagdollBody::new(Vec3::ONE, Quat::from_rotation_x(1.));
        body.set_linear_velocity(Vec3::Y);

        steer_body(&mut body, Vec3::ONE, Quat::from_rotation_x(1.), 100., 0.1);

        assert!(body.linear_velocity().abs_diff_eq(Vec3::ZERO, 1e-5));
        assert!(body.angular_velocity().abs_diff_eq(Vec3::ZERO, 1e-5));
    }

    #[test]
    fn opposite_sign_quaternions_need_no_rotation() {
        let q = Quat::from_rotation_y(0.7);
        assert_eq!(rotation_error_axis_angle(q, -q), (Vec3::ZERO, 0.));
        assert_eq!(rotation_error_axis_angle(q, q), (Vec3::ZERO, 0.));
    }

    #[test]
    fn degenerate_rotations_contribute_nothing() {
        let nan = Quat::from_xyzw(f32::NAN, 0., 0., 1.);
        assert_eq!(rotation_error_axis_angle(Quat::IDENTITY, nan), (Vec3::ZERO, 0.));

        let (_, angular) = target_velocities(Vec3::ZERO, nan, Vec3::ZERO, Quat::IDENTITY, DT);
        assert_eq!(angular, Vec3::ZERO);
    }

    #[test]
    fn half_turn_contributes_no_rotation() {
        let reversed = Quat::from_rotation_y(PI);
        assert_eq!(
            rotation_error_axis_angle(Quat::IDENTITY, reversed),
            (Vec3::ZERO, 0.)
        );
        assert_eq!(
            rotation_error_axis_angle(reversed, Quat::IDENTITY),
            (Vec3::ZERO, 0.)
        );

        let (linear, angular) =
            target_velocities(Vec3::ZERO, Quat::IDENTITY, Vec3::X, reversed, DT);
        assert_eq!(angular, Vec3::ZERO);
        assert!(linear.abs_diff_eq(Vec3::X / DT, 1e-3));
    }

    #[test]
    fn nearly_half_turn_is_still_corrected() {
        let (axis, angle) =
            rotation_error_axis_angle(Quat::IDENTITY, Quat::from_rotation_y(PI - 0.01));

        assert!((angle - (PI - 0.01)).abs() < 1e-3);
        assert!(axis.abs_diff_eq(Vec3::Y, 1e-3));
    }

    #[test]
    fn takes_the_short_way_round() {
        // 270 degrees one way is 90 degrees the other.
        let (axis, angle) =
            rotation_error_axis_angle(Quat::IDENTITY, Quat::from_rotation_y(1.5 * PI));

        assert!((angle - PI / 2.).abs() < 1e-4);
        assert!(axis.abs_diff_eq(Vec3::NEG_Y, 1e-4));
    }

    struct Scene {
        ragdoll: Entity,
        body: Entity,
    }

    fn spawn_scene(world: &mut World) -> Scene {
        let mut time = Time::<()>::default();
        time.advance_by(Duration::from_secs_f32(DT));
        world.insert_resource(time);

        let dynamic_root = world.spawn_empty().id();
        let body = world
            .spawn((ChildOf(dynamic_root), RagdollBody::default()))
            .id();
        let animated_root = world.spawn_empty().id();
        world.spawn((
            ChildOf(animated_root),
            GlobalTransform::from(Transform::from_xyz(0., 1., 0.)),
        ));

        let ragdoll = world
            .spawn(
                PoweredRagdoll::new(RagdollConfig::default())
                    .with_dynamic_root(dynamic_root)
                    .with_animated_root(animated_root),
            )
            .id();
        initialize_ragdoll(world, ragdoll).unwrap();

        Scene { ragdoll, body }
    }

    fn body_velocity(world: &World, body: Entity) -> Vec3 {
        world.get::<RagdollBody>(body).unwrap().linear_velocity()
    }

    #[test]
    fn system_steers_mapped_bodies() {
        let mut world = World::new();
        let scene = spawn_scene(&mut world);

        world.run_system_once(match_ragdoll_poses).unwrap();

        // Target velocity is 64 m/s upward, blended in at 10/64.
        let velocity = body_velocity(&world, scene.body);
        assert!(velocity.abs_diff_eq(Vec3::new(0., 10., 0.), 1e-3), "{velocity}");
    }

    #[test]
    fn limp_or_kinematic_ragdolls_are_not_steered() {
        let mut world = World::new();
        let scene = spawn_scene(&mut world);

        set_limp(&mut world, scene.ragdoll, true).unwrap();
        world.run_system_once(match_ragdoll_poses).unwrap();
        assert_eq!(body_velocity(&world, scene.body), Vec3::ZERO);

        set_limp(&mut world, scene.ragdoll, false).unwrap();
        enable_kinematic(&mut world, scene.ragdoll).unwrap();
        world.run_system_once(match_ragdoll_poses).unwrap();
        assert_eq!(body_velocity(&world, scene.body), Vec3::ZERO);
    }

    #[test]
    fn unmapped_ragdolls_are_skipped() {
        let mut world = World::new();
        let scene = spawn_scene(&mut world);
        world
            .get_mut::<PoweredRagdoll>(scene.ragdoll)
            .unwrap()
            .mapping = None;

        world.run_system_once(match_ragdoll_poses).unwrap();
        assert_eq!(body_velocity(&world, scene.body), Vec3::ZERO);
    }
}
