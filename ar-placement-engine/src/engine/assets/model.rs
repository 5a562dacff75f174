use bevy::gltf::Gltf;
use bevy::prelude::*;

/// One mesh primitive of the primary sub-node.
#[derive(Debug, Clone)]
pub struct ModelPrimitive {
    pub mesh: Handle<Mesh>,
    pub material: Option<Handle<StandardMaterial>>,
}

/// Decoded primary sub-node and its subtree, instantiated on every
/// placement.
///
/// Only mesh data and local transforms are kept, so lights and cameras
/// bundled in the file never reach the scene. The root's own transform is
/// replaced by the placement pose.
#[derive(Debug, Clone, Default)]
pub struct ModelPrototype {
    pub name: Option<String>,
    /// Local transform relative to the parent node.
    pub transform: Transform,
    pub primitives: Vec<ModelPrimitive>,
    pub children: Vec<ModelPrototype>,
}

impl ModelPrototype {
    /// Mesh primitives in the whole subtree.
    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
            + self
                .children
                .iter()
                .map(ModelPrototype::primitive_count)
                .sum::<usize>()
    }
}

#[derive(Resource, Debug, Default)]
pub enum PlacementAsset {
    #[default]
    NotRequested,
    Requested {
        model_id: u32,
    },
    Loading {
        model_id: u32,
        handle: Handle<Gltf>,
    },
    Ready(ModelPrototype),
    Unavailable,
}

impl PlacementAsset {
    /// Begin resolution. No identifier means there is nothing to load.
    /// Resolution starts once per page; later calls leave the state alone.
    pub fn request(&mut self, model_id: Option<u32>) {
        if !matches!(self, Self::NotRequested) {
            return;
        }
        *self = match model_id {
            Some(model_id) => {
                info!("Requesting placement model {}", model_id);
                Self::Requested { model_id }
            }
            None => {
                warn!("Navigation path names no model");
                Self::Unavailable
            }
        };
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }

    pub fn prototype(&self) -> Option<&ModelPrototype> {
        match self {
            Self::Ready(prototype) => Some(prototype),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_without_id_is_unavailable() {
        let mut asset = PlacementAsset::default();
        asset.request(None);
        assert!(asset.is_unavailable());
        assert!(asset.prototype().is_none());
    }

    #[test]
    fn request_with_id_waits_for_provider() {
        let mut asset = PlacementAsset::default();
        asset.request(Some(4));
        assert!(matches!(asset, PlacementAsset::Requested { model_id: 4 }));
        assert!(!asset.is_ready());
        assert!(!asset.is_unavailable());
    }

    #[test]
    fn request_does_not_restart_resolution() {
        let mut asset = PlacementAsset::Ready(ModelPrototype::default());
        asset.request(Some(2));
        assert!(asset.is_ready());

        let mut missing = PlacementAsset::Unavailable;
        missing.request(Some(2));
        assert!(missing.is_unavailable());
    }

    #[test]
    fn ready_asset_exposes_prototype() {
        let primitive = ModelPrimitive {
            mesh: Handle::default(),
            material: None,
        };
        let asset = PlacementAsset::Ready(ModelPrototype {
            name: Some("flower".into()),
            primitives: vec![primitive.clone()],
            children: vec![ModelPrototype {
                primitives: vec![primitive.clone(), primitive],
                ..default()
            }],
            ..default()
        });
        assert!(asset.is_ready());
        assert_eq!(asset.prototype().map(ModelPrototype::primitive_count), Some(3));
    }
}
