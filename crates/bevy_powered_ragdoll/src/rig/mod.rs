pub mod definition;
pub mod loader;

pub use definition::{ResolvedRig, RigBones, RigDefinition, RigSlot, RigSlots};
pub use loader::RigDefinitionLoader;
