//! The per-instance ragdoll component and its state transitions.

pub mod commands;
pub mod control;

use bevy::{
    ecs::{component::Component, entity::Entity, event::EntityEvent, world::World},
    reflect::Reflect,
};

use crate::{
    body::{RagdollBody, RagdollCollider},
    bone_mapping::BoneMapping,
    config::RagdollConfig,
    hierarchy::SkeletonHierarchy,
};

#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RagdollState {
    /// Bodies are driven externally; the solver does not integrate them.
    #[default]
    Kinematic,
    /// Bodies integrate under the solver.
    Dynamic,
}

/// Bodies and colliders a ragdoll controls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RagdollSkeleton {
    /// Every [`RagdollBody`] below the skeleton root, depth-first pre-order.
    pub bodies: Vec<Entity>,
    /// Every [`RagdollCollider`] below the skeleton root, depth-first pre-order.
    pub colliders: Vec<Entity>,
    /// [`RagdollCollider`] on the ragdoll entity itself, if any.
    pub root_collider: Option<Entity>,
}

impl RagdollSkeleton {
    pub fn discover(world: &World, ragdoll: Entity, skeleton_root: Entity) -> Self {
        let mut skeleton = Self {
            root_collider: world
                .get::<RagdollCollider>(ragdoll)
                .is_some()
                .then_some(ragdoll),
            ..Self::default()
        };

        for node in world.descendants(skeleton_root) {
            if node == ragdoll {
                continue;
            }
            if world.get::<RagdollBody>(node).is_some() {
                skeleton.bodies.push(node);
            }
            if world.get::<RagdollCollider>(node).is_some() {
                skeleton.colliders.push(node);
            }
        }

        skeleton
    }
}

/// A skeleton of [`RagdollBody`] entities that can be switched between kinematic and
/// dynamic, pushed around, and steered toward an animated copy of itself.
///
/// The bodies live under `dynamic_root` (the ragdoll entity itself when unset). Pose
/// matching pairs them with the nodes under `animated_root`.
#[derive(Component, Debug, Clone, Default)]
pub struct PoweredRagdoll {
    pub config: RagdollConfig,
    pub dynamic_root: Option<Entity>,
    pub animated_root: Option<Entity>,
    pub(crate) state: RagdollState,
    pub(crate) limp: bool,
    pub(crate) skeleton: RagdollSkeleton,
    pub(crate) mapping: Option<BoneMapping>,
    pub(crate) initialized: bool,
}

impl PoweredRagdoll {
    pub fn new(config: RagdollConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn with_dynamic_root(mut self, root: Entity) -> Self {
        self.dynamic_root = Some(root);
        self
    }

    pub fn with_animated_root(mut self, root: Entity) -> Self {
        self.animated_root = Some(root);
        self
    }

    pub fn state(&self) -> RagdollState {
        self.state
    }

    pub fn is_dynamic(&self) -> bool {
        self.state == RagdollState::Dynamic
    }

    pub fn is_limp(&self) -> bool {
        self.limp
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn skeleton(&self) -> &RagdollSkeleton {
        &self.skeleton
    }

    /// `None` when pose matching has no mapping to work with.
    pub fn mapping(&self) -> Option<&BoneMapping> {
        self.mapping.as_ref()
    }

    pub(crate) fn skeleton_root(&self, ragdoll: Entity) -> Entity {
        self.dynamic_root.unwrap_or(ragdoll)
    }
}

#[derive(EntityEvent, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RagdollEnteredDynamic(pub Entity);

#[derive(EntityEvent, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RagdollEnteredKinematic(pub Entity);

#[derive(EntityEvent, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RagdollLimpEngaged(pub Entity);

#[derive(EntityEvent, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RagdollLimpReleased(pub Entity);
