/// Tap-to-place controller and the pop-in growth effect.
pub mod placement;
