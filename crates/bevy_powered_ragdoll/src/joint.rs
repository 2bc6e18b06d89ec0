//! Joint descriptions and the conversion from swing/twist joints to powered 6-DOF joints.

use bevy::{
    ecs::{component::Component, entity::Entity, world::World},
    log::info,
    math::Vec3,
    reflect::Reflect,
};
use serde::{Deserialize, Serialize};

use crate::hierarchy::SkeletonHierarchy;

/// Twist limit of converted joints, in degrees either side of the rest pose.
pub const TWIST_LIMIT_DEGREES: f32 = 45.;
/// Limit of each swing axis of converted joints, in degrees either side of the rest pose.
pub const SWING_LIMIT_DEGREES: f32 = 30.;
/// Converted joint springs use `damping = SPRING_DAMPING_RATIO * stiffness`.
pub const SPRING_DAMPING_RATIO: f32 = 0.2;

/// Angular range in degrees.
#[derive(Reflect, Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct AngleLimit {
    pub min: f32,
    pub max: f32,
}

impl AngleLimit {
    pub fn symmetric(degrees: f32) -> Self {
        Self {
            min: -degrees,
            max: degrees,
        }
    }
}

#[derive(Reflect, Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum JointMotion {
    Locked,
    #[default]
    Limited,
    Free,
}

#[derive(Reflect, Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct AngularSpring {
    pub stiffness: f32,
    pub damping: f32,
}

/// Two-limit joint: a twist range around `twist_axis` and a swing cone around it.
///
/// Lives on the child body; `connected_body` is the body it hangs from.
#[derive(Component, Reflect, Debug, Clone, PartialEq)]
pub struct SwingTwistJoint {
    pub connected_body: Option<Entity>,
    pub local_anchor1: Vec3,
    pub local_anchor2: Vec3,
    pub twist_axis: Vec3,
    pub swing_axis: Vec3,
    pub twist_limit: AngleLimit,
    /// Half-angle of the swing cone, in degrees.
    pub swing_limit: f32,
}

impl Default for SwingTwistJoint {
    fn default() -> Self {
        Self {
            connected_body: None,
            local_anchor1: Vec3::ZERO,
            local_anchor2: Vec3::ZERO,
            twist_axis: Vec3::X,
            swing_axis: Vec3::Y,
            twist_limit: AngleLimit::symmetric(TWIST_LIMIT_DEGREES),
            swing_limit: SWING_LIMIT_DEGREES,
        }
    }
}

/// Joint with a motion mode per linear and angular axis, and angular springs that pull
/// the joint back to its target orientation.
///
/// Angular axis 0 is the twist (primary) axis; axes 1 and 2 are the swing axes.
#[derive(Component, Reflect, Debug, Clone, PartialEq)]
pub struct SixDofJoint {
    pub connected_body: Option<Entity>,
    pub local_anchor1: Vec3,
    pub local_anchor2: Vec3,
    pub primary_axis: Vec3,
    pub secondary_axis: Vec3,
    pub linear_motion: [JointMotion; 3],
    pub angular_motion: [JointMotion; 3],
    pub angular_limits: [AngleLimit; 3],
    pub twist_spring: AngularSpring,
    pub swing_spring: AngularSpring,
}

impl SixDofJoint {
    pub fn twist_limit(&self) -> AngleLimit {
        self.angular_limits[0]
    }

    pub fn swing_limits(&self) -> [AngleLimit; 2] {
        [self.angular_limits[1], self.angular_limits[2]]
    }
}

/// Builds the powered replacement of `joint`. Source limits are discarded in favour of
/// the fixed [`TWIST_LIMIT_DEGREES`] and [`SWING_LIMIT_DEGREES`] ranges.
pub fn convert_joint(joint: &SwingTwistJoint, strength: f32) -> SixDofJoint {
    let spring = AngularSpring {
        stiffness: strength,
        damping: SPRING_DAMPING_RATIO * strength,
    };

    SixDofJoint {
        connected_body: joint.connected_body,
        local_anchor1: joint.local_anchor1,
        local_anchor2: joint.local_anchor2,
        primary_axis: joint.twist_axis,
        secondary_axis: joint.swing_axis,
        linear_motion: [JointMotion::Locked; 3],
        angular_motion: [JointMotion::Limited; 3],
        angular_limits: [
            AngleLimit::symmetric(TWIST_LIMIT_DEGREES),
            AngleLimit::symmetric(SWING_LIMIT_DEGREES),
            AngleLimit::symmetric(SWING_LIMIT_DEGREES),
        ],
        twist_spring: spring,
        swing_spring: spring,
    }
}

/// Replaces every [`SwingTwistJoint`] on `root` and its descendants by its converted
/// [`SixDofJoint`]. Returns how many joints were converted.
pub fn convert_joints(world: &mut World, root: Entity, strength: f32) -> usize {
    let mut targets = vec![root];
    targets.extend(world.descendants(root));

    let mut converted = 0;
    for entity in targets {
        let Ok(mut entity_mut) = world.get_entity_mut(entity) else {
            continue;
        };
        let Some(joint) = entity_mut.take::<SwingTwistJoint>() else {
            continue;
        };
        entity_mut.insert(convert_joint(&joint, strength));
        converted += 1;
    }

    info!(
        "Converted {} joints below {:?} with strength {}",
        converted, root, strength
    );

    converted
}
