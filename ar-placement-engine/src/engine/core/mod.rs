//! Application assembly and the per-frame schedule.

/// Builds the full Bevy app for the web or native preview target.
pub mod app_setup;

/// `FrameLoopSet` ordering, the hit-test step and `ArCorePlugin`.
pub mod frame_loop;

/// Platform-specific window configuration for native and WASM builds.
pub mod window_config;
