use bevy::prelude::*;

use super::backend::{HitTestResult, HitTestSourceId, ReferenceSpace, ReferenceSpaceKind, XrBackend, XrFrame};
use super::request::XrRequest;

/// Latest valid surface intersection.
///
/// `matrix` keeps its last value while `visible` is false, so a momentary
/// tracking loss hides the reticle without moving it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reticle {
    pub matrix: Mat4,
    pub visible: bool,
}

impl Default for Reticle {
    fn default() -> Self {
        Self {
            matrix: Mat4::IDENTITY,
            visible: false,
        }
    }
}

impl Reticle {
    /// Apply one frame of hit-test results. Only the first (nearest) result
    /// counts. Returns whether a surface was hit.
    pub fn apply(&mut self, results: &[HitTestResult]) -> bool {
        match results.first() {
            Some(hit) => {
                self.matrix = hit.pose;
                self.visible = true;
                true
            }
            None => {
                self.visible = false;
                false
            }
        }
    }
}

/// Two-step source acquisition: viewer space first, then a hit-test source
/// scoped to it.
#[derive(Default)]
enum Acquisition {
    #[default]
    NotRequested,
    AwaitingSpace(XrRequest<ReferenceSpace>),
    AwaitingSource(XrRequest<HitTestSourceId>),
    Ready(HitTestSourceId),
    /// A request was rejected. No retry within this session.
    Unavailable,
}

/// Lazily acquires the hit-test source and queries it every tracked frame.
#[derive(Default)]
pub struct HitTestSubsystem {
    acquisition: Acquisition,
}

impl HitTestSubsystem {
    /// Whether acquisition has been issued (the once-per-session gate).
    pub fn is_requested(&self) -> bool {
        !matches!(self.acquisition, Acquisition::NotRequested)
    }

    pub fn source(&self) -> Option<HitTestSourceId> {
        match self.acquisition {
            Acquisition::Ready(source) => Some(source),
            _ => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self.acquisition, Acquisition::Unavailable)
    }

    /// Drive acquisition and, once a source exists, fetch this frame's results.
    ///
    /// Returns `None` while no source is available; that is the normal state
    /// for the first frames of a session.
    pub fn query(
        &mut self,
        backend: &mut dyn XrBackend,
        frame: &XrFrame,
    ) -> Option<Vec<HitTestResult>> {
        if !self.is_requested() {
            debug!("Requesting viewer reference space for hit testing");
            self.acquisition = Acquisition::AwaitingSpace(
                backend.request_reference_space(ReferenceSpaceKind::Viewer),
            );
        }

        self.poll_acquisition(backend);

        let source = self.source()?;
        Some(backend.hit_test_results(frame, source))
    }

    fn poll_acquisition(&mut self, backend: &mut dyn XrBackend) {
        if let Acquisition::AwaitingSpace(request) = &self.acquisition {
            match request.poll() {
                None => return,
                Some(Ok(space)) => {
                    self.acquisition =
                        Acquisition::AwaitingSource(backend.request_hit_test_source(space));
                }
                Some(Err(err)) => {
                    warn!("Hit testing unavailable for this session: {}", err);
                    self.acquisition = Acquisition::Unavailable;
                    return;
                }
            }
        }

        if let Acquisition::AwaitingSource(request) = &self.acquisition {
            match request.poll() {
                None => {}
                Some(Ok(source)) => {
                    info!("Hit-test source {:?} acquired", source);
                    self.acquisition = Acquisition::Ready(source);
                }
                Some(Err(err)) => {
                    warn!("Hit testing unavailable for this session: {}", err);
                    self.acquisition = Acquisition::Unavailable;
                }
            }
        }
    }

    /// Forget the source and reopen the gate. Called when the session ends.
    pub fn reset(&mut self) {
        self.acquisition = Acquisition::NotRequested;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::xr::scripted::ScriptedBackend;

    fn pose_at(x: f32, y: f32, z: f32) -> Mat4 {
        Mat4::from_translation(Vec3::new(x, y, z))
    }

    #[test]
    fn empty_results_hide_reticle_and_keep_transform() {
        let mut reticle = Reticle::default();
        reticle.apply(&[HitTestResult::new(pose_at(1.0, 0.0, -2.0))]);

        assert!(!reticle.apply(&[]));
        assert!(!reticle.visible);
        assert_eq!(reticle.matrix, pose_at(1.0, 0.0, -2.0));
    }

    #[test]
    fn only_first_result_is_used() {
        let mut reticle = Reticle::default();
        let hit = reticle.apply(&[
            HitTestResult::new(pose_at(0.5, 0.0, -1.0)),
            HitTestResult::new(pose_at(9.0, 9.0, 9.0)),
        ]);

        assert!(hit);
        assert!(reticle.visible);
        assert_eq!(reticle.matrix, pose_at(0.5, 0.0, -1.0));
    }

    #[test]
    fn acquisition_is_requested_once_while_pending() {
        let mut backend = ScriptedBackend::new();
        backend.start_session();
        let mut subsystem = HitTestSubsystem::default();

        for _ in 0..10 {
            let frame = backend.poll_frame().unwrap();
            assert!(subsystem.query(&mut backend, &frame).is_none());
        }

        assert!(subsystem.is_requested());
        assert_eq!(backend.reference_space_requests(), 1);
        assert_eq!(backend.hit_test_source_requests(), 0);
    }

    #[test]
    fn source_is_used_once_both_steps_resolve() {
        let mut backend = ScriptedBackend::new();
        backend.start_session();
        backend.set_results(vec![pose_at(0.0, 0.0, -1.5)]);
        let mut subsystem = HitTestSubsystem::default();

        let frame = backend.poll_frame().unwrap();
        assert!(subsystem.query(&mut backend, &frame).is_none());

        backend.resolve_reference_space();
        let frame = backend.poll_frame().unwrap();
        assert!(subsystem.query(&mut backend, &frame).is_none());
        assert_eq!(backend.hit_test_source_requests(), 1);

        backend.resolve_hit_test_source();
        let frame = backend.poll_frame().unwrap();
        let results = subsystem.query(&mut backend, &frame).unwrap();

        assert_eq!(results.len(), 1);
        assert!(subsystem.source().is_some());
        assert_eq!(backend.reference_space_requests(), 1);
        assert_eq!(backend.hit_test_source_requests(), 1);
    }

    #[test]
    fn rejected_source_disables_hit_testing_without_retry() {
        let mut backend = ScriptedBackend::new();
        backend.start_session();
        let mut subsystem = HitTestSubsystem::default();

        let frame = backend.poll_frame().unwrap();
        subsystem.query(&mut backend, &frame);
        backend.resolve_reference_space();
        subsystem.query(&mut backend, &frame);
        backend.reject_hit_test_source("hit-test feature not granted");

        for _ in 0..5 {
            assert!(subsystem.query(&mut backend, &frame).is_none());
        }
        assert!(subsystem.is_unavailable());
        assert_eq!(backend.hit_test_source_requests(), 1);
    }

    #[test]
    fn reset_reopens_the_gate() {
        let mut backend = ScriptedBackend::immediate();
        backend.start_session();
        let mut subsystem = HitTestSubsystem::default();

        let frame = backend.poll_frame().unwrap();
        assert!(subsystem.query(&mut backend, &frame).is_some());

        subsystem.reset();
        assert!(!subsystem.is_requested());
        assert!(subsystem.source().is_none());

        assert!(subsystem.query(&mut backend, &frame).is_some());
        assert_eq!(backend.reference_space_requests(), 2);
        assert_eq!(backend.hit_test_source_requests(), 2);
    }
}
