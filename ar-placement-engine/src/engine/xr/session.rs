use bevy::prelude::*;
use thiserror::Error;

use super::backend::{XrBackend, XrFrame};
use super::hit_test::{HitTestSubsystem, Reticle};
use super::request::{XrRequest, XrResult};

/// Lifecycle of one AR attempt.
///
/// ```text
/// Idle -> CapabilityChecking -> Unsupported
///                            -> AwaitingAsset -> AssetMissing
///                                             -> Tracking -> Ended
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    #[default]
    Idle,
    CapabilityChecking,
    Unsupported,
    AwaitingAsset,
    AssetMissing,
    Tracking,
    Ended,
}

impl SessionPhase {
    pub fn can_transition_to(self, next: SessionPhase) -> bool {
        use SessionPhase::*;
        matches!(
            (self, next),
            (Idle, CapabilityChecking)
                | (CapabilityChecking, Unsupported)
                | (CapabilityChecking, AwaitingAsset)
                | (AwaitingAsset, AssetMissing)
                | (AwaitingAsset, Tracking)
                | (Tracking, Ended)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Unsupported | Self::AssetMissing | Self::Ended)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::CapabilityChecking => "capability-checking",
            Self::Unsupported => "unsupported",
            Self::AwaitingAsset => "awaiting-asset",
            Self::AssetMissing => "asset-missing",
            Self::Tracking => "tracking",
            Self::Ended => "ended",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("invalid session transition {from:?} -> {to:?}")]
    InvalidTransition { from: SessionPhase, to: SessionPhase },

    #[error("a new attempt needs an ended session, current phase is {0:?}")]
    NotEnded(SessionPhase),
}

/// What one tracked frame changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub surface_hit: bool,
    /// Set on the first hit of the session only.
    pub first_surface: bool,
}

/// All state of one AR attempt. Systems receive it as a resource; ending the
/// attempt and building a fresh one via [`TrackingSession::next_attempt`] is the
/// only reset path.
#[derive(Resource, Default)]
pub struct TrackingSession {
    phase: SessionPhase,
    attempt: u32,
    capability: Option<XrRequest<bool>>,
    host_active: bool,
    plane_found: bool,
    placed: Option<Entity>,
    pub hit_test: HitTestSubsystem,
    pub reticle: Reticle,
}

impl TrackingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh session for another attempt after the previous one ended.
    ///
    /// Capability and asset were settled by the first attempt, so the new
    /// session starts directly in `Tracking`.
    pub fn next_attempt(&self) -> Result<Self, SessionError> {
        if self.phase != SessionPhase::Ended {
            return Err(SessionError::NotEnded(self.phase));
        }
        Ok(Self {
            phase: SessionPhase::Tracking,
            attempt: self.attempt + 1,
            ..Self::default()
        })
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn transition(&mut self, next: SessionPhase) -> Result<(), SessionError> {
        if !self.phase.can_transition_to(next) {
            return Err(SessionError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        info!(
            "Session {}: {} -> {}",
            self.attempt,
            self.phase.as_str(),
            next.as_str()
        );
        self.phase = next;
        Ok(())
    }

    pub fn begin_capability_check(&mut self, request: XrRequest<bool>) -> Result<(), SessionError> {
        self.transition(SessionPhase::CapabilityChecking)?;
        self.capability = Some(request);
        Ok(())
    }

    /// Capability answer, handed out once.
    pub fn poll_capability(&mut self) -> Option<XrResult<bool>> {
        let result = self.capability.as_ref()?.poll()?;
        self.capability = None;
        Some(result)
    }

    /// Host session started: clear the plane-found flag.
    pub fn host_started(&mut self) {
        self.host_active = true;
        self.plane_found = false;
    }

    /// Host session ended. While tracking this ends the attempt: the hit-test
    /// source and gate are cleared and the placed object is handed back for
    /// eviction.
    pub fn host_ended(&mut self) -> Result<Option<Entity>, SessionError> {
        let was_active = std::mem::replace(&mut self.host_active, false);
        if self.phase != SessionPhase::Tracking || !was_active {
            return Ok(None);
        }
        self.transition(SessionPhase::Ended)?;
        self.hit_test.reset();
        self.reticle.visible = false;
        Ok(self.placed.take())
    }

    pub fn is_host_active(&self) -> bool {
        self.host_active
    }

    /// Frames are only processed while tracking inside a running host session.
    pub fn is_tracking(&self) -> bool {
        self.phase == SessionPhase::Tracking && self.host_active
    }

    pub fn plane_found(&self) -> bool {
        self.plane_found
    }

    /// Refresh the reticle from this frame's hit-test results.
    pub fn advance_frame(&mut self, backend: &mut dyn XrBackend, frame: &XrFrame) -> FrameReport {
        let Some(results) = self.hit_test.query(backend, frame) else {
            return FrameReport::default();
        };

        let surface_hit = self.reticle.apply(&results);
        let first_surface = surface_hit && !self.plane_found;
        if first_surface {
            self.plane_found = true;
        }

        FrameReport {
            surface_hit,
            first_surface,
        }
    }

    pub fn placed(&self) -> Option<Entity> {
        self.placed
    }

    pub fn take_placed(&mut self) -> Option<Entity> {
        self.placed.take()
    }

    pub fn set_placed(&mut self, entity: Entity) {
        self.placed = Some(entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::xr::scripted::ScriptedBackend;

    fn tracking_session() -> TrackingSession {
        let mut session = TrackingSession::new();
        session
            .begin_capability_check(XrRequest::resolved(Ok(true)))
            .unwrap();
        session.transition(SessionPhase::AwaitingAsset).unwrap();
        session.transition(SessionPhase::Tracking).unwrap();
        session
    }

    #[test]
    fn phase_edges_follow_lifecycle() {
        use SessionPhase::*;
        assert!(Idle.can_transition_to(CapabilityChecking));
        assert!(CapabilityChecking.can_transition_to(Unsupported));
        assert!(AwaitingAsset.can_transition_to(Tracking));
        assert!(Tracking.can_transition_to(Ended));

        assert!(!Idle.can_transition_to(Tracking));
        assert!(!Ended.can_transition_to(Tracking));
        assert!(!Unsupported.can_transition_to(AwaitingAsset));
        assert!(!AssetMissing.can_transition_to(Tracking));
    }

    #[test]
    fn ended_session_cannot_resume() {
        let mut session = tracking_session();
        session.host_started();
        session.host_ended().unwrap();

        assert_eq!(session.phase(), SessionPhase::Ended);
        assert_eq!(
            session.transition(SessionPhase::Tracking),
            Err(SessionError::InvalidTransition {
                from: SessionPhase::Ended,
                to: SessionPhase::Tracking,
            })
        );
    }

    #[test]
    fn capability_answer_is_taken_once() {
        let mut session = TrackingSession::new();
        let request = XrRequest::pending();
        session.begin_capability_check(request.clone()).unwrap();

        assert!(session.poll_capability().is_none());
        request.resolve(Ok(false));
        assert_eq!(session.poll_capability(), Some(Ok(false)));
        assert!(session.poll_capability().is_none());
    }

    #[test]
    fn first_surface_reported_once_per_session() {
        let mut backend = ScriptedBackend::immediate();
        backend.start_session();
        backend.set_results(vec![Mat4::from_translation(Vec3::new(0.0, -1.0, -2.0))]);
        let mut session = tracking_session();
        session.host_started();

        let frame = backend.poll_frame().unwrap();
        let first = session.advance_frame(&mut backend, &frame);
        assert!(first.surface_hit && first.first_surface);

        backend.set_results(vec![]);
        let lost = session.advance_frame(&mut backend, &frame);
        assert!(!lost.surface_hit);
        assert!(session.plane_found());

        backend.set_results(vec![Mat4::IDENTITY]);
        let again = session.advance_frame(&mut backend, &frame);
        assert!(again.surface_hit && !again.first_surface);
    }

    #[test]
    fn ending_clears_hit_test_state_and_returns_placed_object() {
        let mut backend = ScriptedBackend::immediate();
        backend.start_session();
        let mut session = tracking_session();
        session.host_started();
        let frame = backend.poll_frame().unwrap();
        session.advance_frame(&mut backend, &frame);
        session.set_placed(Entity::from_raw(42));

        let evicted = session.host_ended().unwrap();

        assert_eq!(evicted, Some(Entity::from_raw(42)));
        assert!(!session.hit_test.is_requested());
        assert!(session.hit_test.source().is_none());
        assert!(session.placed().is_none());
        assert!(!session.is_tracking());
    }

    #[test]
    fn next_attempt_starts_fresh() {
        let mut session = tracking_session();
        assert_eq!(
            session.next_attempt().err(),
            Some(SessionError::NotEnded(SessionPhase::Tracking))
        );

        session.host_started();
        session.reticle.visible = true;
        session.host_ended().unwrap();

        let fresh = session.next_attempt().unwrap();
        assert_eq!(fresh.phase(), SessionPhase::Tracking);
        assert_eq!(fresh.attempt(), 1);
        assert!(!fresh.hit_test.is_requested());
        assert!(!fresh.reticle.visible);
        assert!(!fresh.plane_found());
        assert!(!fresh.is_host_active());
    }

    #[test]
    fn host_end_outside_tracking_only_clears_activity() {
        let mut session = TrackingSession::new();
        session
            .begin_capability_check(XrRequest::pending())
            .unwrap();
        session.transition(SessionPhase::AwaitingAsset).unwrap();
        session.host_started();

        assert_eq!(session.host_ended(), Ok(None));
        assert_eq!(session.phase(), SessionPhase::AwaitingAsset);
        assert!(!session.is_host_active());
    }
}
