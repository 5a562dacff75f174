use bevy::prelude::*;

use crate::config::{ArConfig, CameraSettings};
use crate::engine::xr::backend::ViewerPose;

/// The camera driven by the device's viewer pose.
#[derive(Component)]
pub struct ArCamera;

pub fn perspective(settings: &CameraSettings) -> Projection {
    Projection::Perspective(PerspectiveProjection {
        fov: settings.fov_degrees.to_radians(),
        near: settings.near,
        far: settings.far,
        ..default()
    })
}

/// On the web the host composites the camera feed behind a transparent
/// canvas; the preview build looks down onto the ground plane instead.
pub fn spawn_ar_camera(mut commands: Commands, config: Res<ArConfig>) {
    #[cfg(target_arch = "wasm32")]
    commands.spawn((
        Camera3d::default(),
        Camera {
            clear_color: ClearColorConfig::Custom(Color::NONE),
            ..default()
        },
        perspective(&config.camera),
        Transform::IDENTITY,
        ArCamera,
    ));

    #[cfg(not(target_arch = "wasm32"))]
    commands.spawn((
        Camera3d::default(),
        perspective(&config.camera),
        Transform::from_translation(constants::render_settings::PREVIEW_CAMERA_POSITION)
            .looking_at(Vec3::new(0.0, 0.0, -1.0), Vec3::Y),
        ArCamera,
    ));
}

/// Place the camera at the viewer pose, in the same space as hit-test poses.
/// Without a reported pose the camera keeps its spawn transform.
pub fn follow_viewer_pose(
    viewer: Res<ViewerPose>,
    mut cameras: Query<&mut Transform, With<ArCamera>>,
) {
    if !viewer.is_changed() {
        return;
    }
    let Some(view) = viewer.0 else {
        return;
    };

    let pose = Transform::from_matrix(view);
    for mut transform in &mut cameras {
        *transform = pose;
    }
}
