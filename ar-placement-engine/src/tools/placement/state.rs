use bevy::prelude::*;

/// One user tap. Carries nothing beyond "now".
#[derive(Event, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectEvent;

/// Marker for the single placed model instance.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedObject {
    /// Tracking attempt the object was placed in.
    pub attempt: u32,
}

/// Mesh child of a placed object.
#[derive(Component)]
pub struct PlacedPrimitive;
