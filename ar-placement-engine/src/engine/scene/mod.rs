//! Rendered scene: camera, lights and the reticle ring.

use bevy::prelude::*;

use crate::engine::core::frame_loop::FrameLoopSet;

pub mod camera;
pub mod lighting;
pub mod reticle;

pub struct ArScenePlugin;

impl Plugin for ArScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Startup,
            (
                camera::spawn_ar_camera,
                lighting::spawn_lighting,
                reticle::spawn_reticle,
            ),
        )
        .add_systems(
            Update,
            (reticle::sync_reticle, camera::follow_viewer_pose).in_set(FrameLoopSet::Present),
        );
    }
}
