//! Backend for a host page that owns the WebXR session.
//!
//! Requests go out as JSON-RPC notifications carrying a numeric `request` id;
//! the host answers with notifications naming the same id. Frames arrive as
//! `xr_frame` messages holding the already-evaluated hit-test results for the
//! source they name.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use bevy::prelude::*;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

use super::backend::{
    HitTestResult, HitTestSourceId, ReferenceSpace, ReferenceSpaceKind, SessionMode, XrBackend,
    XrEvent, XrFrame,
};
use super::error::XrError;
use super::request::XrRequest;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("invalid params for {method}: {source}")]
    InvalidParams {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{method} names unknown request {request}")]
    UnknownRequest { method: String, request: u64 },
}

/// Message queued for the host page.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeCommand {
    pub method: &'static str,
    pub params: Value,
}

struct PendingFrame {
    frame: XrFrame,
    source: Option<HitTestSourceId>,
    results: Vec<HitTestResult>,
}

#[derive(Default)]
struct BridgeState {
    next_request: u64,
    support: HashMap<u64, XrRequest<bool>>,
    spaces: HashMap<u64, (ReferenceSpaceKind, XrRequest<ReferenceSpace>)>,
    sources: HashMap<u64, XrRequest<HitTestSourceId>>,
    outbox: Vec<BridgeCommand>,
    latest_frame: Option<PendingFrame>,
    current_results: Option<(Option<HitTestSourceId>, Vec<HitTestResult>)>,
    events: Vec<XrEvent>,
}

impl BridgeState {
    fn issue(&mut self, method: &'static str, mut params: Value) -> u64 {
        self.next_request += 1;
        let id = self.next_request;
        params["request"] = json!(id);
        self.outbox.push(BridgeCommand { method, params });
        id
    }
}

#[derive(Deserialize)]
struct SupportParams {
    request: u64,
    #[serde(default)]
    supported: bool,
    error: Option<String>,
}

#[derive(Deserialize)]
struct SpaceParams {
    request: u64,
    space: Option<u32>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct SourceParams {
    request: u64,
    source: Option<u32>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct FrameParams {
    time: f64,
    reference_space: u32,
    source: Option<u32>,
    #[serde(default)]
    results: Vec<[f32; 16]>,
    /// Column-major viewer pose.
    view: Option<[f32; 16]>,
}

/// Shared handle: one clone lives in [`XrDevice`](super::backend::XrDevice),
/// another as a resource for the RPC layer.
#[derive(Resource, Clone, Default)]
pub struct HostBridge {
    state: Arc<Mutex<BridgeState>>,
}

impl HostBridge {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BridgeState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Commands waiting to be posted to the host, in issue order.
    pub fn take_outbox(&self) -> Vec<BridgeCommand> {
        std::mem::take(&mut self.lock().outbox)
    }

    /// Route one host message. Returns `Ok(false)` for methods the bridge
    /// does not own.
    pub fn deliver(&self, method: &str, params: &Value) -> Result<bool, BridgeError> {
        let mut state = self.lock();
        match method {
            "xr_support_result" => {
                let p: SupportParams = parse(method, params)?;
                let request = state
                    .support
                    .remove(&p.request)
                    .ok_or_else(|| unknown(method, p.request))?;
                request.resolve(match p.error {
                    Some(reason) => Err(XrError::rejected("capability", reason)),
                    None => Ok(p.supported),
                });
            }
            "xr_reference_space" => {
                let p: SpaceParams = parse(method, params)?;
                let (kind, request) = state
                    .spaces
                    .remove(&p.request)
                    .ok_or_else(|| unknown(method, p.request))?;
                request.resolve(match (p.space, p.error) {
                    (Some(id), None) => Ok(ReferenceSpace { id, kind }),
                    (_, error) => Err(XrError::rejected(
                        "reference space",
                        error.unwrap_or_else(|| "no space granted".to_string()),
                    )),
                });
            }
            "xr_hit_test_source" => {
                let p: SourceParams = parse(method, params)?;
                let request = state
                    .sources
                    .remove(&p.request)
                    .ok_or_else(|| unknown(method, p.request))?;
                request.resolve(match (p.source, p.error) {
                    (Some(id), None) => Ok(HitTestSourceId(id)),
                    (_, error) => Err(XrError::rejected(
                        "hit-test source",
                        error.unwrap_or_else(|| "no source granted".to_string()),
                    )),
                });
            }
            "xr_frame" => {
                let p: FrameParams = parse(method, params)?;
                state.latest_frame = Some(PendingFrame {
                    frame: XrFrame {
                        time: p.time,
                        reference_space: ReferenceSpace {
                            id: p.reference_space,
                            kind: ReferenceSpaceKind::Local,
                        },
                        view: p.view.as_ref().map(Mat4::from_cols_array),
                    },
                    source: p.source.map(HitTestSourceId),
                    results: p.results.iter().map(HitTestResult::from_cols_array).collect(),
                });
            }
            "xr_session_start" => state.events.push(XrEvent::SessionStarted),
            "xr_session_end" => {
                // The host's session is gone; nothing outstanding can resolve.
                for (_, (_, request)) in state.spaces.drain() {
                    request.resolve(Err(XrError::BridgeClosed("reference space")));
                }
                for (_, request) in state.sources.drain() {
                    request.resolve(Err(XrError::BridgeClosed("hit-test source")));
                }
                state.latest_frame = None;
                state.current_results = None;
                state.events.push(XrEvent::SessionEnded);
            }
            "xr_select" => state.events.push(XrEvent::Select),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

fn parse<T: for<'de> Deserialize<'de>>(method: &str, params: &Value) -> Result<T, BridgeError> {
    serde_json::from_value(params.clone()).map_err(|source| BridgeError::InvalidParams {
        method: method.to_string(),
        source,
    })
}

fn unknown(method: &str, request: u64) -> BridgeError {
    BridgeError::UnknownRequest {
        method: method.to_string(),
        request,
    }
}

impl XrBackend for HostBridge {
    fn is_session_supported(&mut self, mode: SessionMode) -> XrRequest<bool> {
        let mut state = self.lock();
        let request = XrRequest::pending();
        let id = state.issue("xr_query_support", json!({ "mode": mode.as_str() }));
        state.support.insert(id, request.clone());
        request
    }

    fn request_reference_space(&mut self, kind: ReferenceSpaceKind) -> XrRequest<ReferenceSpace> {
        let mut state = self.lock();
        let request = XrRequest::pending();
        let id = state.issue("xr_request_reference_space", json!({ "kind": kind }));
        state.spaces.insert(id, (kind, request.clone()));
        request
    }

    fn request_hit_test_source(&mut self, space: ReferenceSpace) -> XrRequest<HitTestSourceId> {
        let mut state = self.lock();
        let request = XrRequest::pending();
        let id = state.issue("xr_request_hit_test_source", json!({ "space": space.id }));
        state.sources.insert(id, request.clone());
        request
    }

    fn poll_frame(&mut self) -> Option<XrFrame> {
        let mut state = self.lock();
        let pending = state.latest_frame.take()?;
        state.current_results = Some((pending.source, pending.results));
        Some(pending.frame)
    }

    fn hit_test_results(
        &mut self,
        _frame: &XrFrame,
        source: HitTestSourceId,
    ) -> Vec<HitTestResult> {
        match &self.lock().current_results {
            Some((Some(frame_source), results)) if *frame_source == source => results.clone(),
            _ => Vec::new(),
        }
    }

    fn drain_events(&mut self) -> Vec<XrEvent> {
        std::mem::take(&mut self.lock().events)
    }
}
