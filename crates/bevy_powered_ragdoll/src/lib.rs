//! # Bevy Powered Ragdoll
//!
//! Ragdolls for [Bevy](https://bevyengine.org/) that can be fully physics-driven, or steered
//! body-by-body toward an animated copy of the same skeleton so they look animated but still
//! react to impacts.
//!
//! ## Overview
//!
//! - [`StructuralPath`](path::StructuralPath) addresses a skeleton node by the sibling
//!   indices leading to it from a chosen root (`0.2.1`), so two separately spawned copies
//!   of the same skeleton can be paired node by node, whatever their bones are called.
//! - [`RigDefinition`](rig::RigDefinition) stores one structural path per humanoid bone,
//!   relative to the pelvis. It is loaded from `*.rig.ron` files:
//!   ```ron
//!   (
//!       pelvis: "root",
//!       middle_spine: "0",
//!       head: "0.0",
//!       left_arm: "0.1",
//!       // ...
//!   )
//!   ```
//! - [`convert_joints`](joint::convert_joints) replaces every
//!   [`SwingTwistJoint`](joint::SwingTwistJoint) of a skeleton by a spring-driven
//!   [`SixDofJoint`](joint::SixDofJoint).
//! - [`PoweredRagdoll`](ragdoll::PoweredRagdoll) is the per-instance component. It switches
//!   its [`RagdollBody`](body::RagdollBody) entities between kinematic and dynamic, applies
//!   forces, and, with [`PoseStrategy::ActivePoseMatch`](config::PoseStrategy), blends body
//!   velocities toward the animated skeleton every fixed step.
//!
//! Operations are plain functions over `&mut World` in [`ragdoll::control`], or
//! [`RagdollCommandsExt`](ragdoll::commands::RagdollCommandsExt) methods on `Commands`.
//!
//! With the `physics_avian` feature (on by default), [`RagdollBody`](body::RagdollBody) and
//! [`RagdollCollider`](body::RagdollCollider) are kept in sync with avian3d.

pub mod body;
pub mod bone_mapping;
pub mod config;
pub mod errors;
pub mod hierarchy;
pub mod joint;
pub mod path;
#[cfg(feature = "physics_avian")]
pub mod physics_avian;
pub mod plugin;
pub mod pose_match;
pub mod ragdoll;
pub mod rig;

pub mod prelude {
    pub use crate::body::{BodyMode, ForceMode, RagdollBody, RagdollCollider};
    pub use crate::bone_mapping::BoneMapping;
    pub use crate::config::{Damping, PoseStrategy, RagdollConfig};
    pub use crate::errors::{AssetLoaderError, PathParseError, RagdollError, RagdollResult};
    pub use crate::hierarchy::{HierarchyQuery, SkeletonHierarchy};
    pub use crate::joint::{
        AngleLimit, AngularSpring, JointMotion, SixDofJoint, SwingTwistJoint, convert_joint,
        convert_joints,
    };
    pub use crate::path::StructuralPath;
    pub use crate::plugin::{PoweredRagdollPlugin, RagdollSet};
    pub use crate::ragdoll::{
        PoweredRagdoll, RagdollEnteredDynamic, RagdollEnteredKinematic, RagdollLimpEngaged,
        RagdollLimpReleased, RagdollSkeleton, RagdollState, commands::RagdollCommandsExt,
        control::{
            apply_force, apply_force_at, enable_dynamic, enable_kinematic, initialize_ragdoll,
            rebuild_mapping, set_limp,
        },
    };
    pub use crate::rig::{ResolvedRig, RigBones, RigDefinition, RigSlot, RigSlots};
}
