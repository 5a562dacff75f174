//! Placement of the loaded model at the reticle.
//!
//! ## Flow
//!
//! ```text
//! SelectEvent
//!   └─> place_on_select()
//!         ├─ reticle hidden or model not ready -> ignored
//!         ├─ previous PlacedObject despawned (takes its GrowthAnimation with it)
//!         └─ new PlacedObject at the reticle pose + GrowthAnimation
//!
//! advance_growth_animations()
//!   └─> scale *= factor per elapsed tick, component removed at the deadline
//! ```
//!
//! The growth effect lives on the placed entity itself, so despawning the
//! entity is the cancellation of both its tick and its deadline.

/// Growth animation component and its system.
pub mod growth;

/// Placement transform and the selection handler.
pub mod placement;

/// Components and events shared by placement systems.
pub mod state;

pub use growth::{GrowthAnimation, advance_growth_animations};
pub use placement::{place_on_select, placement_transform};
pub use state::{PlacedObject, SelectEvent};
