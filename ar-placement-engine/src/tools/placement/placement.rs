use bevy::prelude::*;

use crate::config::{ArConfig, PlacementSettings};
use crate::engine::assets::model::{ModelPrototype, PlacementAsset};
use crate::engine::xr::session::TrackingSession;

use super::growth::GrowthAnimation;
use super::state::{PlacedObject, PlacedPrimitive, SelectEvent};

/// Pose for a new placement: the reticle's translation and rotation, a fixed
/// uniform scale, then the corrective rotation in local space.
pub fn placement_transform(reticle: &Mat4, settings: &PlacementSettings) -> Transform {
    let mut transform = Transform::from_matrix(*reticle);
    transform.scale = Vec3::splat(settings.placed_scale);
    transform.rotation *= settings.corrective_rotation();
    transform
}

/// Select handler. A tap without a visible reticle or a ready model does
/// nothing; otherwise the previous object is evicted and a new one placed.
pub fn place_on_select(
    mut commands: Commands,
    mut selects: EventReader<SelectEvent>,
    mut session: ResMut<TrackingSession>,
    asset: Res<PlacementAsset>,
    config: Res<ArConfig>,
) {
    for _ in selects.read() {
        if !session.reticle.visible {
            debug!("Select ignored: no surface under the reticle");
            continue;
        }
        let Some(prototype) = asset.prototype() else {
            debug!("Select ignored: placement model not ready");
            continue;
        };

        if let Some(previous) = session.take_placed() {
            if let Ok(mut entity) = commands.get_entity(previous) {
                entity.despawn();
            }
        }

        let transform = placement_transform(&session.reticle.matrix, &config.placement);
        let placed = spawn_placed_object(
            &mut commands,
            prototype,
            transform,
            GrowthAnimation::new(&config.growth),
            session.attempt(),
        );
        session.set_placed(placed);

        info!("Placed model at {:?}", transform.translation);
    }
}

fn spawn_placed_object(
    commands: &mut Commands,
    prototype: &ModelPrototype,
    transform: Transform,
    growth: GrowthAnimation,
    attempt: u32,
) -> Entity {
    let name = prototype.name.as_deref().unwrap_or("model");
    commands
        .spawn((
            PlacedObject { attempt },
            transform,
            Visibility::default(),
            growth,
            Name::new(format!("{}_placed", name)),
        ))
        .with_children(|parent| spawn_node_contents(parent, prototype))
        .id()
}

/// Mesh primitives of `node`, then its child nodes with their local
/// transforms, recursively.
fn spawn_node_contents(parent: &mut ChildSpawnerCommands, node: &ModelPrototype) {
    for primitive in &node.primitives {
        let mut child = parent.spawn((Mesh3d(primitive.mesh.clone()), PlacedPrimitive));
        if let Some(material) = &primitive.material {
            child.insert(MeshMaterial3d(material.clone()));
        }
    }

    for child in &node.children {
        let name = child.name.as_deref().unwrap_or("node");
        parent
            .spawn((child.transform, Visibility::default(), Name::new(name.to_string())))
            .with_children(|grandchild| spawn_node_contents(grandchild, child));
    }
}
