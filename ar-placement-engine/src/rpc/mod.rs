//! JSON-RPC 2.0 channel to the host page.
//!
//! The engine runs inside an iframe; the parent page owns the WebXR session
//! and talks to the engine over `postMessage`.
//!
//! ## Message Flow
//!
//! ```text
//! Host page (parent)                    Engine (iframe)
//!        │                                     │
//!        ├─ xr_* notification ───────────────> │ HostBridge::deliver
//!        │ <──────────── xr_* request notify ──┤ HostBridge outbox
//!        │ <───────── presentation_signal ─────┤ PresentationSignal
//!        ├─ get_session_state (with id) ─────> │
//!        │ <──────────────── Response (id) ────┤
//! ```
//!
//! ## Host to engine
//!
//! - `xr_support_result { request, supported | error }`
//! - `xr_reference_space { request, space | error }`
//! - `xr_hit_test_source { request, source | error }`
//! - `xr_frame { time, reference_space, source, results: [[f32; 16]], view? }`
//! - `xr_session_start`, `xr_session_end`, `xr_select`
//! - `get_session_state` (request): phase, reticle visibility, plane found,
//!   whether an object is placed
//!
//! ## Engine to host
//!
//! - `xr_query_support { request, mode }`
//! - `xr_request_reference_space { request, kind }`
//! - `xr_request_hit_test_source { request, space }`
//! - `presentation_signal { signal, message }`
//!
//! Malformed messages and unknown notifications are logged at debug and
//! dropped. Unknown requests get a `-32601` error response.

pub mod web_rpc;
