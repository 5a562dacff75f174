//! Deterministic in-memory backend.
//!
//! Every request is recorded and stays pending until the script resolves or
//! rejects it, unless the backend was built with [`ScriptedBackend::immediate`].
//! Clones share state, so a test can keep one handle while the engine owns
//! another inside [`XrDevice`](super::backend::XrDevice).

use std::sync::{Arc, Mutex, MutexGuard};

use bevy::prelude::*;

use super::backend::{
    HitTestResult, HitTestSourceId, ReferenceSpace, ReferenceSpaceKind, SessionMode, XrBackend,
    XrEvent, XrFrame,
};
use super::error::XrError;
use super::request::XrRequest;

#[derive(Default)]
struct ScriptState {
    supported: Option<bool>,
    immediate: bool,
    support_requests: Vec<XrRequest<bool>>,
    space_requests: Vec<(ReferenceSpaceKind, XrRequest<ReferenceSpace>)>,
    source_requests: Vec<XrRequest<HitTestSourceId>>,
    support_count: usize,
    space_count: usize,
    source_count: usize,
    session_running: bool,
    frame_count: u64,
    results: Vec<HitTestResult>,
    view: Option<Mat4>,
    events: Vec<XrEvent>,
    next_id: u32,
}

impl ScriptState {
    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Clone, Default)]
pub struct ScriptedBackend {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedBackend {
    /// Backend whose requests all wait for the script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend reporting support and granting every request on the spot.
    pub fn immediate() -> Self {
        let backend = Self::default();
        {
            let mut state = backend.lock();
            state.supported = Some(true);
            state.immediate = true;
        }
        backend
    }

    fn lock(&self) -> MutexGuard<'_, ScriptState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Answer outstanding and future capability queries.
    pub fn set_supported(&self, supported: bool) {
        let mut state = self.lock();
        state.supported = Some(supported);
        for request in state.support_requests.drain(..) {
            request.resolve(Ok(supported));
        }
    }

    pub fn resolve_reference_space(&self) {
        let mut state = self.lock();
        let pending: Vec<_> = state.space_requests.drain(..).collect();
        for (kind, request) in pending {
            let id = state.next_id();
            request.resolve(Ok(ReferenceSpace { id, kind }));
        }
    }

    pub fn reject_reference_space(&self, reason: &str) {
        let mut state = self.lock();
        for (_, request) in state.space_requests.drain(..) {
            request.resolve(Err(XrError::rejected("reference space", reason)));
        }
    }

    pub fn resolve_hit_test_source(&self) {
        let mut state = self.lock();
        let pending: Vec<_> = state.source_requests.drain(..).collect();
        for request in pending {
            let id = state.next_id();
            request.resolve(Ok(HitTestSourceId(id)));
        }
    }

    pub fn reject_hit_test_source(&self, reason: &str) {
        let mut state = self.lock();
        for request in state.source_requests.drain(..) {
            request.resolve(Err(XrError::rejected("hit-test source", reason)));
        }
    }

    /// Begin producing frames and queue a session-start event.
    pub fn start_session(&self) {
        let mut state = self.lock();
        state.session_running = true;
        state.events.push(XrEvent::SessionStarted);
    }

    /// Stop producing frames and queue a session-end event.
    pub fn end_session(&self) {
        let mut state = self.lock();
        state.session_running = false;
        state.events.push(XrEvent::SessionEnded);
    }

    pub fn select(&self) {
        self.lock().events.push(XrEvent::Select);
    }

    /// Intersections reported for every subsequent frame, nearest first.
    pub fn set_results(&self, poses: Vec<Mat4>) {
        self.lock().results = poses.into_iter().map(HitTestResult::new).collect();
    }

    /// Viewer pose carried by every subsequent frame.
    pub fn set_view(&self, view: Option<Mat4>) {
        self.lock().view = view;
    }

    pub fn support_requests(&self) -> usize {
        self.lock().support_count
    }

    pub fn reference_space_requests(&self) -> usize {
        self.lock().space_count
    }

    pub fn hit_test_source_requests(&self) -> usize {
        self.lock().source_count
    }
}

impl XrBackend for ScriptedBackend {
    fn is_session_supported(&mut self, _mode: SessionMode) -> XrRequest<bool> {
        let mut state = self.lock();
        state.support_count += 1;
        match state.supported {
            Some(supported) => XrRequest::resolved(Ok(supported)),
            None => {
                let request = XrRequest::pending();
                state.support_requests.push(request.clone());
                request
            }
        }
    }

    fn request_reference_space(&mut self, kind: ReferenceSpaceKind) -> XrRequest<ReferenceSpace> {
        let mut state = self.lock();
        state.space_count += 1;
        if state.immediate {
            let id = state.next_id();
            return XrRequest::resolved(Ok(ReferenceSpace { id, kind }));
        }
        let request = XrRequest::pending();
        state.space_requests.push((kind, request.clone()));
        request
    }

    fn request_hit_test_source(&mut self, _space: ReferenceSpace) -> XrRequest<HitTestSourceId> {
        let mut state = self.lock();
        state.source_count += 1;
        if state.immediate {
            let id = state.next_id();
            return XrRequest::resolved(Ok(HitTestSourceId(id)));
        }
        let request = XrRequest::pending();
        state.source_requests.push(request.clone());
        request
    }

    fn poll_frame(&mut self) -> Option<XrFrame> {
        let mut state = self.lock();
        if !state.session_running {
            return None;
        }
        state.frame_count += 1;
        Some(XrFrame {
            time: state.frame_count as f64 * 16.0,
            reference_space: ReferenceSpace {
                id: 0,
                kind: ReferenceSpaceKind::Local,
            },
            view: state.view,
        })
    }

    fn hit_test_results(
        &mut self,
        _frame: &XrFrame,
        _source: HitTestSourceId,
    ) -> Vec<HitTestResult> {
        self.lock().results.clone()
    }

    fn drain_events(&mut self) -> Vec<XrEvent> {
        std::mem::take(&mut self.lock().events)
    }
}
