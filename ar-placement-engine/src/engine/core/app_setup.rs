use bevy::asset::AssetMetaCheck;
use bevy::log::LogPlugin;
use bevy::prelude::*;

use crate::engine::assets::provider::{resolve_model_load, start_model_load};
use crate::engine::core::frame_loop::{ArCorePlugin, FrameLoopSet};
use crate::engine::core::window_config::create_window_config;
use crate::engine::presentation::PresentationPlugin;
use crate::engine::scene::ArScenePlugin;
use crate::engine::xr::backend::XrDevice;
use crate::engine::xr::lifecycle::drive_asset_readiness;
use crate::rpc::web_rpc::WebRpcPlugin;

#[cfg(target_arch = "wasm32")]
use crate::engine::xr::bridge::HostBridge;
#[cfg(not(target_arch = "wasm32"))]
use crate::engine::xr::desktop::{DesktopBackend, desktop_preview_input};

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins());
    insert_backend(&mut app);

    app.add_plugins(ArCorePlugin)
        .add_plugins(ArScenePlugin)
        .add_plugins(PresentationPlugin)
        .add_plugins(WebRpcPlugin)
        .add_systems(
            Update,
            (start_model_load, resolve_model_load)
                .chain()
                .in_set(FrameLoopSet::Session)
                .before(drive_asset_readiness),
        );

    app
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    let log_config = LogPlugin {
        filter: "wgpu=error,naga=warn,ar_placement_engine=info".into(),
        ..default()
    };

    DefaultPlugins
        .set(window_config)
        .set(asset_config)
        .set(log_config)
}

/// The web build talks to the host page; the native build previews against a
/// simulated ground plane and starts its session straight away.
#[cfg(target_arch = "wasm32")]
fn insert_backend(app: &mut App) {
    let bridge = HostBridge::new();
    app.insert_resource(XrDevice::new(bridge.clone()))
        .insert_resource(bridge);
}

#[cfg(not(target_arch = "wasm32"))]
fn insert_backend(app: &mut App) {
    let backend = DesktopBackend::new();
    backend.start_session();
    app.insert_resource(XrDevice::new(backend.clone()))
        .insert_resource(backend)
        .add_systems(Update, desktop_preview_input.before(FrameLoopSet::Device));
}
