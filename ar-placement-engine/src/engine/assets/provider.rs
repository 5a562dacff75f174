use std::collections::HashSet;

use bevy::asset::LoadState;
use bevy::gltf::{Gltf, GltfMesh, GltfNode};
use bevy::prelude::*;

use crate::config::ArConfig;

use super::model::{ModelPrimitive, ModelPrototype, PlacementAsset};

/// Kick off the glTF load for a requested model.
pub fn start_model_load(
    asset_server: Res<AssetServer>,
    config: Res<ArConfig>,
    mut asset: ResMut<PlacementAsset>,
) {
    let PlacementAsset::Requested { model_id } = *asset else {
        return;
    };

    let path = config.model.path_for(model_id);
    info!("Loading placement model {} from {}", model_id, path);
    *asset = PlacementAsset::Loading {
        model_id,
        handle: asset_server.load(path),
    };
}

/// Settle the load into a prototype, or mark the asset unavailable.
pub fn resolve_model_load(
    asset_server: Res<AssetServer>,
    config: Res<ArConfig>,
    gltfs: Res<Assets<Gltf>>,
    nodes: Res<Assets<GltfNode>>,
    meshes: Res<Assets<GltfMesh>>,
    mut asset: ResMut<PlacementAsset>,
) {
    let PlacementAsset::Loading { model_id, handle } = &*asset else {
        return;
    };
    let model_id = *model_id;

    if let Some(LoadState::Failed(err)) = asset_server.get_load_state(handle.id()) {
        warn!("Placement model {} failed to load: {}", model_id, err);
        *asset = PlacementAsset::Unavailable;
        return;
    }

    let Some(gltf) = gltfs.get(handle) else {
        return;
    };

    *asset = match extract_prototype(gltf, &nodes, &meshes, config.model.primary_node.as_deref()) {
        Some(prototype) => {
            info!(
                "Placement model {} ready ({} primitives)",
                model_id,
                prototype.primitive_count()
            );
            PlacementAsset::Ready(prototype)
        }
        None => {
            warn!("Placement model {} has no usable mesh node", model_id);
            PlacementAsset::Unavailable
        }
    };
}

/// What the prototype walk reads from one glTF node.
#[derive(Debug, Clone, Default)]
pub struct NodeData {
    pub name: String,
    pub transform: Transform,
    pub primitives: Vec<ModelPrimitive>,
    pub children: Vec<Handle<GltfNode>>,
}

/// Primary sub-node: the named node if configured, else the first root node
/// of the file. Its whole subtree is kept.
pub fn extract_prototype(
    gltf: &Gltf,
    nodes: &Assets<GltfNode>,
    meshes: &Assets<GltfMesh>,
    primary: Option<&str>,
) -> Option<ModelPrototype> {
    let lookup = |handle: &Handle<GltfNode>| -> Option<NodeData> {
        let node = nodes.get(handle)?;
        let primitives: Vec<ModelPrimitive> = node
            .mesh
            .as_ref()
            .and_then(|mesh| meshes.get(mesh))
            .map(|mesh| {
                mesh.primitives
                    .iter()
                    .map(|primitive| ModelPrimitive {
                        mesh: primitive.mesh.clone(),
                        material: primitive.material.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Some(NodeData {
            name: node.name.clone(),
            transform: node.transform,
            primitives,
            children: node.children.clone(),
        })
    };

    let named = match primary {
        Some(name) => Some(gltf.named_nodes.get(name)?.clone()),
        None => None,
    };

    prototype_from_nodes(&gltf.nodes, named, &lookup)
}

/// Build the prototype from `root`, or from the first root in `order` when
/// none is given. A subtree without any mesh primitive is unusable.
pub fn prototype_from_nodes<F>(
    order: &[Handle<GltfNode>],
    root: Option<Handle<GltfNode>>,
    lookup: &F,
) -> Option<ModelPrototype>
where
    F: Fn(&Handle<GltfNode>) -> Option<NodeData>,
{
    let root = match root {
        Some(root) => root,
        None => first_root(order, lookup)?,
    };

    let prototype = build_prototype(&root, lookup)?;
    (prototype.primitive_count() > 0).then_some(prototype)
}

/// First node in file order that is not a child of another node.
fn first_root<F>(order: &[Handle<GltfNode>], lookup: &F) -> Option<Handle<GltfNode>>
where
    F: Fn(&Handle<GltfNode>) -> Option<NodeData>,
{
    let children: HashSet<AssetId<GltfNode>> = order
        .iter()
        .filter_map(lookup)
        .flat_map(|node| node.children)
        .map(|child| child.id())
        .collect();

    order
        .iter()
        .find(|handle| !children.contains(&handle.id()))
        .cloned()
}

fn build_prototype<F>(handle: &Handle<GltfNode>, lookup: &F) -> Option<ModelPrototype>
where
    F: Fn(&Handle<GltfNode>) -> Option<NodeData>,
{
    let node = lookup(handle)?;
    let children = node
        .children
        .iter()
        .filter_map(|child| build_prototype(child, lookup))
        .collect();

    Some(ModelPrototype {
        name: Some(node.name),
        transform: node.transform,
        primitives: node.primitives,
        children,
    })
}
