//! Setup and state-transition operations on a [`PoweredRagdoll`].
//!
//! These need exclusive world access. From regular systems, use
//! [`RagdollCommandsExt`](super::commands::RagdollCommandsExt).

use bevy::{
    ecs::{entity::Entity, world::{Mut, World}},
    log::{debug, error, info, warn},
    math::Vec3,
    time::{Fixed, Time},
    transform::components::GlobalTransform,
};

use super::{
    PoweredRagdoll, RagdollEnteredDynamic, RagdollEnteredKinematic, RagdollLimpEngaged,
    RagdollLimpReleased, RagdollSkeleton, RagdollState,
};
use crate::{
    body::{BodyMode, ForceMode, RagdollBody, RagdollCollider},
    bone_mapping::BoneMapping,
    config::PoseStrategy,
    errors::{RagdollError, RagdollResult},
};

fn ragdoll_ref(world: &World, ragdoll: Entity) -> RagdollResult<&PoweredRagdoll> {
    world
        .get::<PoweredRagdoll>(ragdoll)
        .ok_or(RagdollError::MissingRagdoll(ragdoll))
}

fn ragdoll_mut(world: &mut World, ragdoll: Entity) -> RagdollResult<Mut<'_, PoweredRagdoll>> {
    world
        .get_mut::<PoweredRagdoll>(ragdoll)
        .ok_or(RagdollError::MissingRagdoll(ragdoll))
}

/// Length of one fixed step, used to turn continuous forces into velocity changes.
pub fn fixed_timestep(world: &World) -> f32 {
    world
        .get_resource::<Time<Fixed>>()
        .map(|time| time.timestep())
        .unwrap_or_else(|| Time::<Fixed>::default().timestep())
        .as_secs_f32()
}

/// Discovers the ragdoll's bodies and colliders, builds the bone mapping for pose-matching
/// ragdolls, and puts the ragdoll in its configured starting state.
///
/// Runs automatically for newly added ragdolls, and before any other operation on a
/// ragdoll that was not initialized yet. Calling it again rediscovers the skeleton.
pub fn initialize_ragdoll(world: &mut World, ragdoll: Entity) -> RagdollResult<()> {
    let (config, skeleton_root) = {
        let state = ragdoll_ref(world, ragdoll)?;
        (state.config.clone(), state.skeleton_root(ragdoll))
    };
    if world.get_entity(skeleton_root).is_err() {
        return Err(RagdollError::MissingEntity(skeleton_root));
    }

    let skeleton = RagdollSkeleton::discover(world, ragdoll, skeleton_root);
    info!(
        "Initializing ragdoll {:?}: {} bodies, {} colliders",
        ragdoll,
        skeleton.bodies.len(),
        skeleton.colliders.len()
    );
    {
        let mut state = ragdoll_mut(world, ragdoll)?;
        state.skeleton = skeleton;
        state.mapping = None;
        state.initialized = true;
    }

    if config.strategy == PoseStrategy::ActivePoseMatch {
        // Failure leaves the ragdoll usable, just without pose matching.
        let _ = rebuild_mapping(world, ragdoll);
    }

    if config.starts_kinematic() {
        enable_kinematic(world, ragdoll)?;
    } else {
        enable_dynamic(world, ragdoll)?;
    }
    set_limp(world, ragdoll, config.initial_limp)
}

fn ensure_initialized(world: &mut World, ragdoll: Entity) -> RagdollResult<()> {
    if ragdoll_ref(world, ragdoll)?.initialized {
        return Ok(());
    }
    initialize_ragdoll(world, ragdoll)
}

/// Pairs the ragdoll's bodies with the animated skeleton. Returns how many bodies found
/// a target.
///
/// Without both roots, or if either no longer exists, the ragdoll ends up with no mapping
/// and pose matching stops for it.
pub fn rebuild_mapping(world: &mut World, ragdoll: Entity) -> RagdollResult<usize> {
    let roots = {
        let state = ragdoll_ref(world, ragdoll)?;
        match (state.dynamic_root, state.animated_root) {
            (None, _) => Err(RagdollError::MissingDynamicRoot(ragdoll)),
            (_, None) => Err(RagdollError::MissingAnimatedRoot(ragdoll)),
            (Some(dynamic_root), Some(animated_root)) => [dynamic_root, animated_root]
                .into_iter()
                .find(|root| world.get_entity(*root).is_err())
                .map_or(Ok((dynamic_root, animated_root)), |missing| {
                    Err(RagdollError::MissingEntity(missing))
                }),
        }
    };

    let (dynamic_root, animated_root) = match roots {
        Ok(roots) => roots,
        Err(err) => {
            warn!("Pose matching disabled for ragdoll {:?}: {}", ragdoll, err);
            ragdoll_mut(world, ragdoll)?.mapping = None;
            return Err(err);
        }
    };

    let mapping = BoneMapping::build(world, dynamic_root, animated_root);
    let matched = mapping.pairs().count();
    info!(
        "Mapped {} of {} bodies of ragdoll {:?} onto {:?}",
        matched,
        mapping.len(),
        ragdoll,
        animated_root
    );
    ragdoll_mut(world, ragdoll)?.mapping = Some(mapping);

    Ok(matched)
}

fn set_state(world: &mut World, ragdoll: Entity, state: RagdollState) -> RagdollResult<()> {
    ensure_initialized(world, ragdoll)?;
    let (skeleton, config) = {
        let ragdoll_state = ragdoll_ref(world, ragdoll)?;
        (ragdoll_state.skeleton.clone(), ragdoll_state.config.clone())
    };
    let dynamic = state == RagdollState::Dynamic;
    let mode = if dynamic {
        BodyMode::Dynamic
    } else {
        BodyMode::Kinematic
    };

    for body in &skeleton.bodies {
        if let Some(mut body) = world.get_mut::<RagdollBody>(*body) {
            body.mode = mode;
            if !dynamic {
                body.stop();
            }
        }
    }

    if config.control_colliders {
        for collider in &skeleton.colliders {
            if let Some(mut collider) = world.get_mut::<RagdollCollider>(*collider) {
                collider.enabled = dynamic;
            }
        }
    }

    if config.strategy == PoseStrategy::StaticKinematicToggle
        && let Some(root_collider) = skeleton.root_collider
        && let Some(mut collider) = world.get_mut::<RagdollCollider>(root_collider)
    {
        collider.enabled = !dynamic;
    }

    ragdoll_mut(world, ragdoll)?.state = state;
    debug!("Ragdoll {:?} is now {:?}", ragdoll, state);

    match state {
        RagdollState::Dynamic => world.trigger(RagdollEnteredDynamic(ragdoll)),
        RagdollState::Kinematic => world.trigger(RagdollEnteredKinematic(ragdoll)),
    }

    Ok(())
}

/// Hands every body over to the physics solver and enables the ragdoll's colliders.
pub fn enable_dynamic(world: &mut World, ragdoll: Entity) -> RagdollResult<()> {
    set_state(world, ragdoll, RagdollState::Dynamic)
}

/// Takes every body away from the physics solver and disables the ragdoll's colliders.
pub fn enable_kinematic(world: &mut World, ragdoll: Entity) -> RagdollResult<()> {
    set_state(world, ragdoll, RagdollState::Kinematic)
}

/// A limp ragdoll is not steered toward the animated pose. Pose-matching ragdolls also
/// switch body damping between the configured limp and follow values.
pub fn set_limp(world: &mut World, ragdoll: Entity, limp: bool) -> RagdollResult<()> {
    ensure_initialized(world, ragdoll)?;
    let (bodies, config) = {
        let state = ragdoll_ref(world, ragdoll)?;
        (state.skeleton.bodies.clone(), state.config.clone())
    };

    if config.strategy == PoseStrategy::ActivePoseMatch {
        let damping = config.damping(limp);
        for body in bodies {
            if let Some(mut body) = world.get_mut::<RagdollBody>(body) {
                body.damping = Some(damping);
            }
        }
    }

    ragdoll_mut(world, ragdoll)?.limp = limp;

    if limp {
        world.trigger(RagdollLimpEngaged(ragdoll));
    } else {
        world.trigger(RagdollLimpReleased(ragdoll));
    }

    Ok(())
}

fn push_bodies(
    world: &mut World,
    ragdoll: Entity,
    mode: ForceMode,
    force_for: impl Fn(&RagdollBody) -> Vec3,
) -> RagdollResult<()> {
    enable_dynamic(world, ragdoll)?;

    let (bodies, config) = {
        let state = ragdoll_ref(world, ragdoll)?;
        (state.skeleton.bodies.clone(), state.config.clone())
    };
    if config.strategy == PoseStrategy::ActivePoseMatch && config.limp_on_impact {
        set_limp(world, ragdoll, true)?;
    }

    let dt = fixed_timestep(world);
    for body in bodies {
        if let Some(mut body) = world.get_mut::<RagdollBody>(body) {
            let force = force_for(&body);
            body.apply_force(force, mode, dt);
        }
    }

    Ok(())
}

/// Pushes every body away from `point` with the given magnitude. Without a point, pushes
/// away from the ragdoll entity's own position.
///
/// The ragdoll becomes dynamic first.
pub fn apply_force_at(
    world: &mut World,
    ragdoll: Entity,
    magnitude: f32,
    point: Option<Vec3>,
    mode: ForceMode,
) -> RagdollResult<()> {
    let point = match point {
        Some(point) => point,
        None => world
            .get::<GlobalTransform>(ragdoll)
            .map(GlobalTransform::translation)
            .unwrap_or(Vec3::ZERO),
    };

    push_bodies(world, ragdoll, mode, |body| {
        (body.position - point).normalize_or_zero() * magnitude
    })
}

/// Applies the same force to every body. The ragdoll becomes dynamic first.
pub fn apply_force(
    world: &mut World,
    ragdoll: Entity,
    force: Vec3,
    mode: ForceMode,
) -> RagdollResult<()> {
    push_bodies(world, ragdoll, mode, |_| force)
}

/// Initializes ragdolls that were added since the last run.
pub fn initialize_new_ragdolls(world: &mut World) {
    let mut query = world.query::<(Entity, &PoweredRagdoll)>();
    let pending: Vec<Entity> = query
        .iter(world)
        .filter(|(_, ragdoll)| !ragdoll.initialized)
        .map(|(entity, _)| entity)
        .collect();

    for ragdoll in pending {
        if let Err(err) = initialize_ragdoll(world, ragdoll) {
            error!("Could not initialize ragdoll {:?}: {}", ragdoll, err);
            // Not retried every frame; an explicit initialize_ragdoll call can still fix it.
            if let Some(mut state) = world.get_mut::<PoweredRagdoll>(ragdoll) {
                state.initialized = true;
            }
        }
    }
}
