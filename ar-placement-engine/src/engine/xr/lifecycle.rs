use bevy::prelude::*;

use crate::engine::assets::model::PlacementAsset;
use crate::engine::assets::navigation::ModelLocator;
use crate::engine::presentation::PresentationSignal;
use crate::tools::placement::state::SelectEvent;

use super::backend::{SessionMode, XrDevice, XrEvent};
use super::session::{SessionPhase, TrackingSession};

/// Host immersive session boundaries.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostSessionEvent {
    Started,
    Ended,
}

/// Forward device events into the ECS.
pub fn pump_device_events(
    mut device: ResMut<XrDevice>,
    mut session_events: EventWriter<HostSessionEvent>,
    mut select_events: EventWriter<SelectEvent>,
) {
    for event in device.backend_mut().drain_events() {
        match event {
            XrEvent::SessionStarted => {
                session_events.write(HostSessionEvent::Started);
            }
            XrEvent::SessionEnded => {
                session_events.write(HostSessionEvent::Ended);
            }
            XrEvent::Select => {
                select_events.write(SelectEvent);
            }
        }
    }
}

/// Ask the device for immersive AR support once, then route the answer.
pub fn drive_capability_gate(
    mut device: ResMut<XrDevice>,
    mut session: ResMut<TrackingSession>,
    mut asset: ResMut<PlacementAsset>,
    locator: Res<ModelLocator>,
    mut signals: EventWriter<PresentationSignal>,
) {
    match session.phase() {
        SessionPhase::Idle => {
            let request = device
                .backend_mut()
                .is_session_supported(SessionMode::ImmersiveAr);
            if let Err(err) = session.begin_capability_check(request) {
                warn!("{}", err);
            }
        }
        SessionPhase::CapabilityChecking => {
            let Some(result) = session.poll_capability() else {
                return;
            };

            let supported = match result {
                Ok(supported) => supported,
                Err(err) => {
                    warn!("Capability query failed: {}", err);
                    false
                }
            };

            if supported {
                if let Err(err) = session.transition(SessionPhase::AwaitingAsset) {
                    warn!("{}", err);
                    return;
                }
                asset.request(locator.model_id());
            } else {
                info!(
                    "{} not supported on this device",
                    SessionMode::ImmersiveAr.as_str()
                );
                if let Err(err) = session.transition(SessionPhase::Unsupported) {
                    warn!("{}", err);
                    return;
                }
                signals.write(PresentationSignal::TrackingUnavailable);
            }
        }
        _ => {}
    }
}

/// Leave `AwaitingAsset` once the provider settles.
pub fn drive_asset_readiness(
    mut session: ResMut<TrackingSession>,
    asset: Res<PlacementAsset>,
    mut signals: EventWriter<PresentationSignal>,
) {
    if session.phase() != SessionPhase::AwaitingAsset {
        return;
    }

    let next = if asset.is_ready() {
        SessionPhase::Tracking
    } else if asset.is_unavailable() {
        SessionPhase::AssetMissing
    } else {
        return;
    };

    if let Err(err) = session.transition(next) {
        warn!("{}", err);
        return;
    }

    if next == SessionPhase::AssetMissing {
        signals.write(PresentationSignal::AssetUnavailable);
    }
}

/// Start and end of the host session. A start after an ended attempt builds a
/// new [`TrackingSession`]; an end while tracking evicts the placed object.
pub fn handle_host_session_events(
    mut commands: Commands,
    mut events: EventReader<HostSessionEvent>,
    mut session: ResMut<TrackingSession>,
    mut signals: EventWriter<PresentationSignal>,
) {
    for event in events.read() {
        match event {
            HostSessionEvent::Started => {
                match session.phase() {
                    SessionPhase::Unsupported | SessionPhase::AssetMissing => {
                        debug!(
                            "Ignoring session start in terminal phase {}",
                            session.phase().as_str()
                        );
                        continue;
                    }
                    SessionPhase::Ended => match session.next_attempt() {
                        Ok(fresh) => *session = fresh,
                        Err(err) => {
                            warn!("{}", err);
                            continue;
                        }
                    },
                    _ => {}
                }

                session.host_started();
                signals.write(PresentationSignal::SessionStart);
            }
            HostSessionEvent::Ended => match session.host_ended() {
                Ok(Some(placed)) => {
                    if let Ok(mut entity) = commands.get_entity(placed) {
                        entity.despawn();
                    }
                }
                Ok(None) => {}
                Err(err) => warn!("{}", err),
            },
        }
    }
}
