use bevy::{
    app::{App, FixedPostUpdate, Plugin, PreUpdate},
    asset::AssetApp,
    ecs::{
        intern::Interned,
        schedule::{IntoScheduleConfigs, ScheduleLabel, SystemSet},
    },
};

#[cfg(feature = "physics_avian")]
use crate::physics_avian::{
    read_back_bodies_avian, write_back_bodies_avian, write_back_colliders_avian,
};
use crate::{
    body::{BodyMode, ForceMode, RagdollBody, RagdollCollider},
    config::{Damping, PoseStrategy, RagdollConfig},
    joint::{AngleLimit, AngularSpring, JointMotion, SixDofJoint, SwingTwistJoint},
    pose_match::match_ragdoll_poses,
    ragdoll::{RagdollState, control::initialize_new_ragdolls},
    rig::{RigDefinition, RigDefinitionLoader},
};

/// Adds powered ragdoll support to an app
pub struct PoweredRagdollPlugin {
    /// Schedule the physics engine steps in.
    pub physics_schedule: Interned<dyn ScheduleLabel>,
}

impl Default for PoweredRagdollPlugin {
    fn default() -> Self {
        Self {
            physics_schedule: FixedPostUpdate.intern(),
        }
    }
}

#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash, SystemSet)]
pub enum RagdollSet {
    /// Copies physics state into the ragdoll body mirrors
    ReadBack,
    /// Pose matching
    Control,
    /// Pushes the mirrors back to the physics engine, before it steps
    WriteBack,
}

impl Plugin for PoweredRagdollPlugin {
    fn build(&self, app: &mut App) {
        self.register_types(app);

        app.init_asset::<RigDefinition>()
            .init_asset_loader::<RigDefinitionLoader>();

        app.configure_sets(
            self.physics_schedule,
            (
                RagdollSet::ReadBack,
                RagdollSet::Control,
                RagdollSet::WriteBack,
            )
                .chain(),
        );

        #[cfg(feature = "physics_avian")]
        {
            use avian3d::prelude::PhysicsSystems;

            app.configure_sets(
                self.physics_schedule,
                RagdollSet::WriteBack.before(PhysicsSystems::First),
            );

            app.add_systems(
                self.physics_schedule,
                read_back_bodies_avian.in_set(RagdollSet::ReadBack),
            );

            app.add_systems(
                self.physics_schedule,
                (write_back_bodies_avian, write_back_colliders_avian)
                    .in_set(RagdollSet::WriteBack),
            );
        }

        app.add_systems(PreUpdate, initialize_new_ragdolls);

        app.add_systems(
            self.physics_schedule,
            match_ragdoll_poses.in_set(RagdollSet::Control),
        );
    }
}

impl PoweredRagdollPlugin {
    fn register_types(&self, app: &mut App) {
        app //
            .register_type::<RagdollBody>()
            .register_type::<RagdollCollider>()
            .register_type::<BodyMode>()
            .register_type::<ForceMode>()
            .register_type::<SwingTwistJoint>()
            .register_type::<SixDofJoint>()
            .register_type::<AngleLimit>()
            .register_type::<AngularSpring>()
            .register_type::<JointMotion>()
            .register_type::<RagdollConfig>()
            .register_type::<PoseStrategy>()
            .register_type::<Damping>()
            .register_type::<RagdollState>();
    }
}
