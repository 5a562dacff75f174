/// Scale multiplier applied on every growth tick.
pub const GROWTH_FACTOR: f32 = 1.01;

/// Period between growth ticks (milliseconds).
pub const GROWTH_TICK_MS: u64 = 16;

/// Total lifetime of the growth effect (milliseconds).
/// Ticks that would land after this deadline never fire.
pub const GROWTH_DURATION_MS: u64 = 500;

/// Uniform scale forced onto a freshly placed object.
pub const PLACED_SCALE: f32 = 1.0;

/// Corrective rotation (degrees, local XYZ order) aligning the asset's authored
/// up axis with the detected surface normal.
/// Default: +90° X, for Z-up authored models.
pub const CORRECTIVE_ROTATION_DEGREES: [f32; 3] = [90.0, 0.0, 0.0];

/// Asset path template; `{id}` is replaced by the numeric model identifier.
pub const MODEL_PATH_TEMPLATE: &str = "models/{id}.glb";

/// Model identifier used when the navigation path carries none.
pub const DEFAULT_MODEL_ID: u32 = 1;
