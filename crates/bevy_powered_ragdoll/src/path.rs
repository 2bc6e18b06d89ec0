//! Structural paths: addressing a skeleton node by the sibling indices leading to it.
//!
//! Unlike [`Name`](bevy::ecs::name::Name)-based paths, a structural path does not care what
//! the nodes are called, so it can be used to pair nodes between two separately spawned
//! copies of the same skeleton.

use std::{fmt, str::FromStr};

use bevy::ecs::entity::Entity;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{errors::PathParseError, hierarchy::SkeletonHierarchy};

/// Text form of [`StructuralPath::Root`].
pub const ROOT_SENTINEL: &str = "root";
const SEPARATOR: char = '.';

/// Position of a node relative to some chosen root.
///
/// Text form: `root` for the root itself, the empty string for a node that cannot be reached
/// from the root, otherwise dot-separated sibling indices, outermost first (`0.2.1`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum StructuralPath {
    Root,
    #[default]
    Unreachable,
    Indices(Vec<usize>),
}

impl StructuralPath {
    /// Path of `node` relative to `relative_root`.
    pub fn encode(
        hierarchy: &impl SkeletonHierarchy,
        node: Entity,
        relative_root: Entity,
    ) -> Self {
        if node == relative_root {
            return Self::Root;
        }

        let mut indices = Vec::new();
        let mut current = node;
        loop {
            let (Some(parent), Some(index)) =
                (hierarchy.parent_of(current), hierarchy.sibling_index(current))
            else {
                return Self::Unreachable;
            };
            indices.push(index);
            if parent == relative_root {
                break;
            }
            current = parent;
        }

        indices.reverse();
        Self::Indices(indices)
    }

    /// Walks the path down from `root`. Returns `None` as soon as an index is out of range.
    ///
    /// [`StructuralPath::Unreachable`] decodes to `root`, same as [`StructuralPath::Root`].
    /// A `Some` result therefore does not prove the path addressed a real node.
    pub fn decode(&self, hierarchy: &impl SkeletonHierarchy, root: Entity) -> Option<Entity> {
        match self {
            Self::Root | Self::Unreachable => Some(root),
            Self::Indices(indices) => indices
                .iter()
                .try_fold(root, |node, index| hierarchy.child_at(node, *index)),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, Self::Root)
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable)
    }
}

impl fmt::Display for StructuralPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str(ROOT_SENTINEL),
            Self::Unreachable => Ok(()),
            Self::Indices(indices) => {
                for (i, index) in indices.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{SEPARATOR}")?;
                    }
                    write!(f, "{index}")?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for StructuralPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(Self::Unreachable),
            ROOT_SENTINEL => Ok(Self::Root),
            _ => s
                .split(SEPARATOR)
                .map(|segment| {
                    segment.parse::<usize>().map_err(|_| PathParseError {
                        path: s.to_string(),
                        segment: segment.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Indices),
        }
    }
}

impl Serialize for StructuralPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StructuralPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
