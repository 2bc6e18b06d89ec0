//! Read-only access to the skeleton tree.
//!
//! Everything that walks a skeleton (path encoding, rig resolution, bone mapping, body
//! discovery) goes through [`SkeletonHierarchy`], so the same code works with exclusive
//! [`World`] access and from inside regular systems through [`HierarchyQuery`].

use bevy::ecs::{
    entity::Entity,
    hierarchy::{ChildOf, Children},
    system::{Query, SystemParam},
    world::World,
};

use crate::path::StructuralPath;

pub trait SkeletonHierarchy {
    fn parent_of(&self, node: Entity) -> Option<Entity>;

    /// Children of `node` in sibling order. Empty if the node has none (or does not exist).
    fn children_of(&self, node: Entity) -> &[Entity];

    /// Position of `node` among its parent's children.
    fn sibling_index(&self, node: Entity) -> Option<usize> {
        let parent = self.parent_of(node)?;
        self.children_of(parent)
            .iter()
            .position(|child| *child == node)
    }

    fn child_at(&self, node: Entity, index: usize) -> Option<Entity> {
        self.children_of(node).get(index).copied()
    }

    /// All descendants of `root` in depth-first pre-order. `root` itself is not included.
    fn descendants(&self, root: Entity) -> Vec<Entity> {
        let mut found = Vec::new();
        let mut stack: Vec<Entity> = self.children_of(root).iter().rev().copied().collect();

        while let Some(node) = stack.pop() {
            found.push(node);
            stack.extend(self.children_of(node).iter().rev().copied());
        }

        found
    }

    fn find_by_path(&self, root: Entity, path: &StructuralPath) -> Option<Entity>
    where
        Self: Sized,
    {
        path.decode(self, root)
    }
}

impl SkeletonHierarchy for World {
    fn parent_of(&self, node: Entity) -> Option<Entity> {
        self.get::<ChildOf>(node).map(ChildOf::parent)
    }

    fn children_of(&self, node: Entity) -> &[Entity] {
        self.get::<Children>(node)
            .map(|children| &**children)
            .unwrap_or(&[])
    }
}

/// System parameter exposing the skeleton tree to non-exclusive systems.
#[derive(SystemParam)]
pub struct HierarchyQuery<'w, 's> {
    parents: Query<'w, 's, &'static ChildOf>,
    children: Query<'w, 's, &'static Children>,
}

impl SkeletonHierarchy for HierarchyQuery<'_, '_> {
    fn parent_of(&self, node: Entity) -> Option<Entity> {
        self.parents.get(node).ok().map(ChildOf::parent)
    }

    fn children_of(&self, node: Entity) -> &[Entity] {
        self.children
            .get(node)
            .map(|children| &**children)
            .unwrap_or(&[])
    }
}
