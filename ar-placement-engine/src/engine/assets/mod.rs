//! Placement asset resolution.
//!
//! The page path names a model; the provider loads it as glTF and reduces it
//! to the primary sub-node's mesh primitives, which is all placement needs.

/// `PlacementAsset` state and the decoded `ModelPrototype`.
pub mod model;

/// Model identifier from the navigation path.
pub mod navigation;

/// glTF loading systems feeding `PlacementAsset`.
pub mod provider;
