use bevy::prelude::*;

pub const RETICLE_INNER_RADIUS: f32 = 0.15;
pub const RETICLE_OUTER_RADIUS: f32 = 0.2;
pub const RETICLE_SEGMENTS: u32 = 32;
pub const RETICLE_COLOUR: Color = Color::WHITE;

/// Vertical field of view (degrees).
pub const CAMERA_FOV_DEGREES: f32 = 70.0;
pub const CAMERA_NEAR: f32 = 0.01;
pub const CAMERA_FAR: f32 = 20.0;

/// Desktop preview camera placement, looking down at the ground plane.
pub const PREVIEW_CAMERA_POSITION: Vec3 = Vec3::new(0.0, 1.6, 2.0);

pub const AMBIENT_BRIGHTNESS: f32 = 400.0;
