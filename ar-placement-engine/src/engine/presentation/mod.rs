//! Fire-and-forget signals from the tracking core to whatever presents
//! guidance: DOM overlays on the web, a UI text line natively, and a JSON-RPC
//! notification to the host page on every target.

use bevy::prelude::*;

/// DOM overlay toggles on the host page (web only).
#[cfg(target_arch = "wasm32")]
pub mod dom;

/// Bevy UI guidance line (native only).
pub mod overlay;

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresentationSignal {
    TrackingUnavailable,
    AssetUnavailable,
    /// Host session started; show "searching" guidance.
    SessionStart,
    /// First surface of the session; switch to "tap to place" guidance.
    FirstSurfaceFound,
}

impl PresentationSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TrackingUnavailable => "tracking_unavailable",
            Self::AssetUnavailable => "asset_unavailable",
            Self::SessionStart => "session_start",
            Self::FirstSurfaceFound => "first_surface_found",
        }
    }

    pub fn guidance(&self) -> &'static str {
        match self {
            Self::TrackingUnavailable => "Immersive AR is not supported on this device",
            Self::AssetUnavailable => "This model is not available in AR",
            Self::SessionStart => "Move your device slowly to find a surface",
            Self::FirstSurfaceFound => "Tap to place the model",
        }
    }
}

/// Guidance surface for the current target.
pub struct PresentationPlugin;

impl Plugin for PresentationPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PresentationSignal>();

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Update, dom::apply_dom_overlay);

        #[cfg(not(target_arch = "wasm32"))]
        app.add_systems(Startup, overlay::spawn_guidance_overlay)
            .add_systems(Update, overlay::update_guidance_overlay);
    }
}
