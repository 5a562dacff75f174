//! Tap-to-place AR engine.
//!
//! A host device reports surfaces under the viewer's gaze; the engine shows a
//! reticle on the nearest one and, on select, places a model there with a
//! short growth animation. Only one placed object exists at a time.

pub mod config;
pub mod engine;
pub mod rpc;
pub mod tools;

pub use config::ArConfig;
pub use engine::core::app_setup::create_app;
pub use engine::core::frame_loop::{ArCorePlugin, FrameLoopSet};
pub use engine::xr::backend::{XrBackend, XrDevice};
pub use engine::xr::session::{SessionPhase, TrackingSession};
