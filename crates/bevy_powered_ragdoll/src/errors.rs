use bevy::ecs::entity::Entity;
use thiserror::Error;

/// Errors produced while setting up or reconfiguring a ragdoll.
///
/// None of these are produced by the per-tick systems: those skip whatever they cannot
/// process and carry on.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RagdollError {
    #[error("entity {0:?} does not have a PoweredRagdoll component")]
    MissingRagdoll(Entity),
    #[error("entity {0:?} does not exist")]
    MissingEntity(Entity),
    #[error("ragdoll {0:?} has no dynamic root assigned")]
    MissingDynamicRoot(Entity),
    #[error("ragdoll {0:?} has no animated root assigned")]
    MissingAnimatedRoot(Entity),
    #[error("could not parse structural path: {0}")]
    InvalidPath(#[from] PathParseError),
}

pub type RagdollResult<T> = Result<T, RagdollError>;

/// A structural path text that is neither the root sentinel, the unreachable marker, nor a
/// dot-separated list of sibling indices.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid segment {segment:?} in structural path {path:?}")]
pub struct PathParseError {
    pub path: String,
    pub segment: String,
}

/// Possible errors that can be produced by the rig definition loader
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AssetLoaderError {
    #[error("could not read asset: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse RON: {0}")]
    RonSpannedError(#[from] ron::error::SpannedError),
    #[error("could not serialize RON: {0}")]
    RonError(#[from] ron::Error),
}
