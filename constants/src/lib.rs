//! Shared tuning constants for the AR placement engine.

pub mod placement;
pub mod render_settings;
pub mod session;
