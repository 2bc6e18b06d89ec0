use bevy::ecs::{entity::Entity, world::World};

use crate::{
    body::RagdollBody, hierarchy::SkeletonHierarchy, joint::SixDofJoint, path::StructuralPath,
};

/// Pairs every body of a physics skeleton with the node at the same structural position in
/// an animated copy of that skeleton.
///
/// The three vectors are index-aligned: `targets[i]` and `joints[i]` belong to `bodies[i]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoneMapping {
    pub bodies: Vec<Entity>,
    /// `None` where the body's path does not exist in the animated skeleton.
    pub targets: Vec<Option<Entity>>,
    /// `None` where the body has no [`SixDofJoint`].
    pub joints: Vec<Option<SixDofJoint>>,
}

impl BoneMapping {
    /// Maps every [`RagdollBody`] below `dynamic_root` (the root itself excluded, depth-first
    /// pre-order) onto the tree under `animated_root`.
    pub fn build(world: &World, dynamic_root: Entity, animated_root: Entity) -> Self {
        let mut mapping = Self::default();

        for body in world.descendants(dynamic_root) {
            if world.get::<RagdollBody>(body).is_none() {
                continue;
            }
            let path = StructuralPath::encode(world, body, dynamic_root);

            mapping.bodies.push(body);
            mapping.targets.push(path.decode(world, animated_root));
            mapping
                .joints
                .push(world.get::<SixDofJoint>(body).cloned());
        }

        mapping
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// `(body, target)` for every body that found a target.
    pub fn pairs(&self) -> impl Iterator<Item = (Entity, Entity)> + '_ {
        self.bodies
            .iter()
            .zip(&self.targets)
            .filter_map(|(body, target)| Some((*body, (*target)?)))
    }

    pub fn target_of(&self, body: Entity) -> Option<Entity> {
        let index = self.bodies.iter().position(|b| *b == body)?;
        self.targets[index]
    }
}
