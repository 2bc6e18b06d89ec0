use bevy::{
    asset::Asset,
    ecs::{entity::Entity, world::World},
    log::warn,
    reflect::TypePath,
};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{AssetLoaderError, RagdollError, RagdollResult},
    hierarchy::SkeletonHierarchy,
    path::StructuralPath,
};

/// Anatomical role of a bone in a humanoid rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RigSlot {
    Pelvis,
    MiddleSpine,
    Head,
    LeftArm,
    LeftElbow,
    RightArm,
    RightElbow,
    LeftHips,
    LeftKnee,
    LeftFoot,
    RightHips,
    RightKnee,
    RightFoot,
}

impl RigSlot {
    pub const ALL: [RigSlot; 13] = [
        RigSlot::Pelvis,
        RigSlot::MiddleSpine,
        RigSlot::Head,
        RigSlot::LeftArm,
        RigSlot::LeftElbow,
        RigSlot::RightArm,
        RigSlot::RightElbow,
        RigSlot::LeftHips,
        RigSlot::LeftKnee,
        RigSlot::LeftFoot,
        RigSlot::RightHips,
        RigSlot::RightKnee,
        RigSlot::RightFoot,
    ];
}

/// One value per [`RigSlot`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RigSlots<T> {
    pub pelvis: T,
    pub middle_spine: T,
    pub head: T,
    pub left_arm: T,
    pub left_elbow: T,
    pub right_arm: T,
    pub right_elbow: T,
    pub left_hips: T,
    pub left_knee: T,
    pub left_foot: T,
    pub right_hips: T,
    pub right_knee: T,
    pub right_foot: T,
}

impl<T> RigSlots<T> {
    pub fn from_fn(mut f: impl FnMut(RigSlot) -> T) -> Self {
        Self {
            pelvis: f(RigSlot::Pelvis),
            middle_spine: f(RigSlot::MiddleSpine),
            head: f(RigSlot::Head),
            left_arm: f(RigSlot::LeftArm),
            left_elbow: f(RigSlot::LeftElbow),
            right_arm: f(RigSlot::RightArm),
            right_elbow: f(RigSlot::RightElbow),
            left_hips: f(RigSlot::LeftHips),
            left_knee: f(RigSlot::LeftKnee),
            left_foot: f(RigSlot::LeftFoot),
            right_hips: f(RigSlot::RightHips),
            right_knee: f(RigSlot::RightKnee),
            right_foot: f(RigSlot::RightFoot),
        }
    }

    pub fn get(&self, slot: RigSlot) -> &T {
        match slot {
            RigSlot::Pelvis => &self.pelvis,
            RigSlot::MiddleSpine => &self.middle_spine,
            RigSlot::Head => &self.head,
            RigSlot::LeftArm => &self.left_arm,
            RigSlot::LeftElbow => &self.left_elbow,
            RigSlot::RightArm => &self.right_arm,
            RigSlot::RightElbow => &self.right_elbow,
            RigSlot::LeftHips => &self.left_hips,
            RigSlot::LeftKnee => &self.left_knee,
            RigSlot::LeftFoot => &self.left_foot,
            RigSlot::RightHips => &self.right_hips,
            RigSlot::RightKnee => &self.right_knee,
            RigSlot::RightFoot => &self.right_foot,
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(RigSlot, &T) -> U) -> RigSlots<U> {
        RigSlots::from_fn(|slot| f(slot, self.get(slot)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (RigSlot, &T)> {
        RigSlot::ALL.into_iter().map(move |slot| (slot, self.get(slot)))
    }
}

/// Concrete bones of one skeleton instance, as picked by whoever authors the rig.
pub type RigBones = RigSlots<Entity>;

/// Result of resolving a [`RigDefinition`] against a skeleton instance. Slots whose path
/// does not exist in that instance are `None`.
pub type ResolvedRig = RigSlots<Option<Entity>>;

/// Reusable rig template: the structural path of every bone relative to the pelvis.
///
/// Since paths only contain sibling indices, a definition authored on one skeleton can be
/// resolved on any other skeleton with the same topology, regardless of bone names or pose.
#[derive(Asset, TypePath, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RigDefinition {
    paths: RigSlots<StructuralPath>,
}

impl RigDefinition {
    pub fn build(hierarchy: &impl SkeletonHierarchy, bones: &RigBones) -> Self {
        let pelvis = bones.pelvis;
        let paths = bones.map(|slot, bone| match slot {
            RigSlot::Pelvis => StructuralPath::Root,
            _ => StructuralPath::encode(hierarchy, *bone, pelvis),
        });

        for (slot, path) in paths.iter() {
            if path.is_unreachable() {
                warn!(
                    "Rig bone {:?} ({:?}) is not below the pelvis {:?}",
                    slot,
                    bones.get(slot),
                    pelvis
                );
            }
        }

        Self { paths }
    }

    /// Same as [`RigDefinition::build`], but first checks that every bone exists.
    pub fn from_world(world: &World, bones: &RigBones) -> RagdollResult<Self> {
        if let Some((_, missing)) = bones
            .iter()
            .find(|(_, bone)| world.get_entity(**bone).is_err())
        {
            return Err(RagdollError::MissingEntity(*missing));
        }

        Ok(Self::build(world, bones))
    }

    pub fn resolve(&self, hierarchy: &impl SkeletonHierarchy, pelvis: Entity) -> ResolvedRig {
        self.paths.map(|slot, path| match slot {
            RigSlot::Pelvis => Some(pelvis),
            _ => path.decode(hierarchy, pelvis),
        })
    }

    pub fn path(&self, slot: RigSlot) -> &StructuralPath {
        self.paths.get(slot)
    }

    pub fn paths(&self) -> &RigSlots<StructuralPath> {
        &self.paths
    }

    pub fn to_ron(&self) -> Result<String, AssetLoaderError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    pub fn from_ron(text: &str) -> Result<Self, AssetLoaderError> {
        Ok(ron::de::from_str(text)?)
    }
}
