//! Device-facing tracking core.
//!
//! The host device is reached only through [`backend::XrBackend`]; every
//! asynchronous request comes back as an [`request::XrRequest`] slot that
//! systems poll once per frame, so the frame loop never waits on the device.

/// Backend trait, frame and pose types, and the `XrDevice` resource.
pub mod backend;

/// JSON-RPC bridge backend for a host page that owns the WebXR session.
pub mod bridge;

/// Cursor-on-ground-plane backend for native preview runs.
pub mod desktop;

pub mod error;

/// Lazy hit-test source acquisition and reticle updates.
pub mod hit_test;

/// Systems driving capability, asset readiness and host session boundaries.
pub mod lifecycle;

pub mod request;

/// Deterministic backend for tests and headless runs.
pub mod scripted;

/// Tracking session state machine.
pub mod session;
