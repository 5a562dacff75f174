//! Native preview backend: the cursor ray against the ground plane stands in
//! for device hit testing, so the placement loop runs without AR hardware.

use std::sync::{Arc, Mutex, MutexGuard};

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use super::backend::{
    HitTestResult, HitTestSourceId, ReferenceSpace, ReferenceSpaceKind, SessionMode, XrBackend,
    XrEvent, XrFrame,
};
use super::request::XrRequest;

const GROUND_HEIGHT: f32 = 0.0;

#[derive(Default)]
struct DesktopState {
    running: bool,
    ground_hit: Option<Vec3>,
    events: Vec<XrEvent>,
    next_id: u32,
    frame_count: u64,
}

impl DesktopState {
    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Resource, Clone, Default)]
pub struct DesktopBackend {
    state: Arc<Mutex<DesktopState>>,
}

impl DesktopBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, DesktopState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn start_session(&self) {
        let mut state = self.lock();
        if !state.running {
            state.running = true;
            state.events.push(XrEvent::SessionStarted);
        }
    }

    pub fn end_session(&self) {
        let mut state = self.lock();
        if state.running {
            state.running = false;
            state.ground_hit = None;
            state.events.push(XrEvent::SessionEnded);
        }
    }

    pub fn select(&self) {
        let mut state = self.lock();
        if state.running {
            state.events.push(XrEvent::Select);
        }
    }

    pub fn set_ground_hit(&self, hit: Option<Vec3>) {
        self.lock().ground_hit = hit;
    }

    pub fn is_running(&self) -> bool {
        self.lock().running
    }
}

impl XrBackend for DesktopBackend {
    fn is_session_supported(&mut self, _mode: SessionMode) -> XrRequest<bool> {
        XrRequest::resolved(Ok(true))
    }

    fn request_reference_space(&mut self, kind: ReferenceSpaceKind) -> XrRequest<ReferenceSpace> {
        let id = self.lock().next_id();
        XrRequest::resolved(Ok(ReferenceSpace { id, kind }))
    }

    fn request_hit_test_source(&mut self, _space: ReferenceSpace) -> XrRequest<HitTestSourceId> {
        let id = self.lock().next_id();
        XrRequest::resolved(Ok(HitTestSourceId(id)))
    }

    fn poll_frame(&mut self) -> Option<XrFrame> {
        let mut state = self.lock();
        if !state.running {
            return None;
        }
        state.frame_count += 1;
        Some(XrFrame {
            time: state.frame_count as f64,
            reference_space: ReferenceSpace {
                id: 0,
                kind: ReferenceSpaceKind::Local,
            },
            view: None,
        })
    }

    fn hit_test_results(
        &mut self,
        _frame: &XrFrame,
        _source: HitTestSourceId,
    ) -> Vec<HitTestResult> {
        self.lock()
            .ground_hit
            .map(|point| HitTestResult::new(Mat4::from_translation(point)))
            .into_iter()
            .collect()
    }

    fn drain_events(&mut self) -> Vec<XrEvent> {
        std::mem::take(&mut self.lock().events)
    }
}

/// Ray/plane intersection with the horizontal plane at `plane_y`.
pub fn ground_plane_intersection(ray: Ray3d, plane_y: f32) -> Option<Vec3> {
    if ray.direction.y.abs() < 0.001 {
        return None;
    }
    let t = (plane_y - ray.origin.y) / ray.direction.y;
    if t > 0.0 {
        Some(ray.origin + ray.direction * t)
    } else {
        None
    }
}

/// Mouse and keyboard stand-ins for the device: cursor position feeds hit
/// testing, left click selects, Escape ends and Enter restarts the session.
pub fn desktop_preview_input(
    backend: Res<DesktopBackend>,
    buttons: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&GlobalTransform, &Camera), With<Camera3d>>,
) {
    if keys.just_pressed(KeyCode::Escape) {
        backend.end_session();
    }
    if keys.just_pressed(KeyCode::Enter) {
        backend.start_session();
    }

    let hit = (|| {
        let window = windows.single().ok()?;
        let cursor = window.cursor_position()?;
        let (camera_transform, camera) = cameras.single().ok()?;
        let ray = camera.viewport_to_world(camera_transform, cursor).ok()?;
        ground_plane_intersection(ray, GROUND_HEIGHT)
    })();
    backend.set_ground_hit(hit);

    if buttons.just_pressed(MouseButton::Left) {
        backend.select();
    }
}
