use bevy::reflect::Reflect;
use serde::{Deserialize, Serialize};

/// How a ragdoll behaves when it is not fully handed over to physics.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PoseStrategy {
    /// Plain kinematic/dynamic switching.
    None,
    /// Kinematic/dynamic switching where the root's own collider stands in for the body
    /// colliders while the ragdoll is kinematic.
    StaticKinematicToggle,
    /// Dynamic bodies are steered every fixed step toward an animated copy of the skeleton.
    #[default]
    ActivePoseMatch,
}

#[derive(Reflect, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Damping {
    pub linear: f32,
    pub angular: f32,
}

impl Damping {
    pub const fn new(linear: f32, angular: f32) -> Self {
        Self { linear, angular }
    }
}

/// Per-instance ragdoll settings.
#[derive(Reflect, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RagdollConfig {
    pub strategy: PoseStrategy,
    /// How fast pose matching pulls velocities toward their targets, per second.
    pub follow_strength: f32,
    /// Whether the ragdoll starts kinematic. When unset, only
    /// [`PoseStrategy::ActivePoseMatch`] ragdolls start dynamic.
    pub start_kinematic: Option<bool>,
    pub initial_limp: bool,
    /// Whether the ragdoll enables and disables its colliders when switching modes.
    pub control_colliders: bool,
    /// Body damping while limp. Only applied by [`PoseStrategy::ActivePoseMatch`].
    pub limp_damping: Damping,
    /// Body damping while following the animated pose. Only applied by
    /// [`PoseStrategy::ActivePoseMatch`].
    pub follow_damping: Damping,
    /// Whether applying a force to a pose-matching ragdoll makes it go limp.
    pub limp_on_impact: bool,
}

impl Default for RagdollConfig {
    fn default() -> Self {
        Self {
            strategy: PoseStrategy::default(),
            follow_strength: 10.,
            start_kinematic: None,
            initial_limp: false,
            control_colliders: true,
            limp_damping: Damping::new(1., 0.),
            follow_damping: Damping::new(20., 1.),
            limp_on_impact: true,
        }
    }
}

impl RagdollConfig {
    pub fn with_strategy(strategy: PoseStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    pub fn starts_kinematic(&self) -> bool {
        self.start_kinematic
            .unwrap_or(self.strategy != PoseStrategy::ActivePoseMatch)
    }

    pub fn damping(&self, limp: bool) -> Damping {
        if limp {
            self.limp_damping
        } else {
            self.follow_damping
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_mode_depends_on_strategy_unless_set() {
        assert!(!RagdollConfig::with_strategy(PoseStrategy::ActivePoseMatch).starts_kinematic());
        assert!(RagdollConfig::with_strategy(PoseStrategy::StaticKinematicToggle).starts_kinematic());
        assert!(RagdollConfig::with_strategy(PoseStrategy::None).starts_kinematic());

        let config = RagdollConfig {
            start_kinematic: Some(true),
            ..RagdollConfig::with_strategy(PoseStrategy::ActivePoseMatch)
        };
        assert!(config.starts_kinematic());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: RagdollConfig =
            ron::from_str("(strategy: StaticKinematicToggle, follow_strength: 4.0)").unwrap();

        assert_eq!(config.strategy, PoseStrategy::StaticKinematicToggle);
        assert_eq!(config.follow_strength, 4.);
        assert!(config.control_colliders);
        assert_eq!(config.damping(true), Damping::new(1., 0.));
        assert_eq!(config.damping(false), Damping::new(20., 1.));
    }
}
