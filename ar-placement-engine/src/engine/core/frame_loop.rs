use bevy::prelude::*;

use crate::config::ArConfig;
use crate::engine::assets::model::PlacementAsset;
use crate::engine::assets::navigation::ModelLocator;
use crate::engine::presentation::PresentationSignal;
use crate::engine::xr::backend::{ViewerPose, XrDevice};
use crate::engine::xr::lifecycle::{
    HostSessionEvent, drive_asset_readiness, drive_capability_gate, handle_host_session_events,
    pump_device_events,
};
use crate::engine::xr::session::TrackingSession;
use crate::tools::placement::{SelectEvent, advance_growth_animations, place_on_select};

/// Per-frame ordering. Everything here runs in `Update`, before rendering.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameLoopSet {
    /// Device events into the ECS.
    Device,
    /// Capability, asset readiness and host session boundaries.
    Session,
    /// Hit testing and reticle refresh.
    Tracking,
    /// Select handling.
    Placement,
    Animation,
    /// Copying state onto visuals.
    Present,
}

/// Hit-test step of the frame loop. Frames are drained every update so a
/// session that is not tracking yet never sees a stale one later. The viewer
/// pose is taken from every frame, tracking or not.
pub fn advance_hit_test(
    mut device: ResMut<XrDevice>,
    mut session: ResMut<TrackingSession>,
    mut viewer: ResMut<ViewerPose>,
    mut signals: EventWriter<PresentationSignal>,
) {
    let backend = device.backend_mut();
    let Some(frame) = backend.poll_frame() else {
        return;
    };
    if frame.view.is_some() {
        viewer.set_if_neq(ViewerPose(frame.view));
    }
    if !session.is_tracking() {
        return;
    }

    let report = session.advance_frame(backend, &frame);
    if report.first_surface {
        info!("First surface found at t={:.1}ms", frame.time);
        signals.write(PresentationSignal::FirstSurfaceFound);
    }
}

/// Tracking core: session state, hit testing, placement and growth.
///
/// Needs an [`XrDevice`] resource; [`ArConfig`] and [`ModelLocator`] are
/// filled in from the environment when the app did not insert them.
pub struct ArCorePlugin;

impl Plugin for ArCorePlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<ArConfig>() {
            app.insert_resource(ArConfig::load());
        }
        if !app.world().contains_resource::<ModelLocator>() {
            let default_id = app.world().resource::<ArConfig>().model.default_id;
            app.insert_resource(ModelLocator::from_current_page(default_id));
        }

        app.add_event::<SelectEvent>()
            .add_event::<HostSessionEvent>()
            .add_event::<PresentationSignal>()
            .init_resource::<TrackingSession>()
            .init_resource::<PlacementAsset>()
            .init_resource::<ViewerPose>()
            .configure_sets(
                Update,
                (
                    FrameLoopSet::Device,
                    FrameLoopSet::Session,
                    FrameLoopSet::Tracking,
                    FrameLoopSet::Placement,
                    FrameLoopSet::Animation,
                    FrameLoopSet::Present,
                )
                    .chain(),
            )
            .add_systems(Update, pump_device_events.in_set(FrameLoopSet::Device))
            .add_systems(
                Update,
                (
                    handle_host_session_events,
                    drive_capability_gate,
                    drive_asset_readiness,
                )
                    .chain()
                    .in_set(FrameLoopSet::Session),
            )
            .add_systems(Update, advance_hit_test.in_set(FrameLoopSet::Tracking))
            .add_systems(Update, place_on_select.in_set(FrameLoopSet::Placement))
            .add_systems(
                Update,
                advance_growth_animations.in_set(FrameLoopSet::Animation),
            );
    }
}
