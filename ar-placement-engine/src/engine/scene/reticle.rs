use bevy::prelude::*;
use std::f32::consts::FRAC_PI_2;

use constants::render_settings::RETICLE_COLOUR;

use crate::config::{ArConfig, ReticleSettings};
use crate::engine::xr::session::TrackingSession;

#[derive(Component)]
pub struct ReticleMarker;

/// Flat ring lying in the surface plane (local XZ).
pub fn reticle_mesh(settings: &ReticleSettings) -> Mesh {
    Mesh::from(
        Annulus::new(settings.inner_radius, settings.outer_radius)
            .mesh()
            .resolution(settings.segments),
    )
    .rotated_by(Quat::from_rotation_x(-FRAC_PI_2))
}

pub fn spawn_reticle(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Res<ArConfig>,
) {
    commands.spawn((
        Mesh3d(meshes.add(reticle_mesh(&config.reticle))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: RETICLE_COLOUR,
            unlit: true,
            cull_mode: None,
            ..default()
        })),
        Transform::IDENTITY,
        Visibility::Hidden,
        ReticleMarker,
        Name::new("Reticle"),
    ));
}

/// Copy the tracked reticle onto its visual.
pub fn sync_reticle(
    session: Res<TrackingSession>,
    mut query: Query<(&mut Transform, &mut Visibility), With<ReticleMarker>>,
) {
    for (mut transform, mut visibility) in &mut query {
        let target = if session.reticle.visible {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
        visibility.set_if_neq(target);

        if session.reticle.visible {
            *transform = Transform::from_matrix(session.reticle.matrix);
        }
    }
}
