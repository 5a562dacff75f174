use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use constants::session::IMMERSIVE_AR_MODE;

use super::request::XrRequest;

/// Immersive session mode the engine needs from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionMode {
    ImmersiveAr,
}

impl SessionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ImmersiveAr => IMMERSIVE_AR_MODE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceSpaceKind {
    /// Tracks the device itself; hit-test rays originate here.
    Viewer,
    /// Session-stable space poses are reported in.
    Local,
}

/// Handle to a coordinate frame granted by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReferenceSpace {
    pub id: u32,
    pub kind: ReferenceSpaceKind,
}

/// Standing device subscription for ray/surface intersections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HitTestSourceId(pub u32);

/// One ray/surface intersection, expressed in the frame's reference space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitTestResult {
    pub pose: Mat4,
}

impl HitTestResult {
    pub fn new(pose: Mat4) -> Self {
        Self { pose }
    }

    /// Build from a column-major 4x4 matrix as delivered by the host.
    pub fn from_cols_array(matrix: &[f32; 16]) -> Self {
        Self {
            pose: Mat4::from_cols_array(matrix),
        }
    }
}

/// Per-refresh tracking context.
#[derive(Debug, Clone, PartialEq)]
pub struct XrFrame {
    /// Host timestamp in milliseconds.
    pub time: f64,
    /// Space the session reports poses in.
    pub reference_space: ReferenceSpace,
    /// Viewer pose in `reference_space`, when the device reports one.
    pub view: Option<Mat4>,
}

/// Latest viewer pose reported by the device. The AR camera follows it.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewerPose(pub Option<Mat4>);

/// Discrete device-side events, drained once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XrEvent {
    SessionStarted,
    SessionEnded,
    Select,
}

/// Device capabilities the tracking loop depends on.
///
/// Every `request_*` call returns immediately; the returned slot is settled
/// later by the host. Implementations never block.
pub trait XrBackend: Send + Sync + 'static {
    fn is_session_supported(&mut self, mode: SessionMode) -> XrRequest<bool>;

    fn request_reference_space(&mut self, kind: ReferenceSpaceKind) -> XrRequest<ReferenceSpace>;

    fn request_hit_test_source(&mut self, space: ReferenceSpace) -> XrRequest<HitTestSourceId>;

    /// Tracking frame for the current refresh, if the host produced one.
    fn poll_frame(&mut self) -> Option<XrFrame>;

    /// Intersections for `source` in ray order (nearest first).
    fn hit_test_results(&mut self, frame: &XrFrame, source: HitTestSourceId)
    -> Vec<HitTestResult>;

    fn drain_events(&mut self) -> Vec<XrEvent>;
}

/// Resource owning the active backend.
#[derive(Resource)]
pub struct XrDevice(Box<dyn XrBackend>);

impl XrDevice {
    pub fn new(backend: impl XrBackend) -> Self {
        Self(Box::new(backend))
    }

    pub fn backend_mut(&mut self) -> &mut dyn XrBackend {
        self.0.as_mut()
    }
}
