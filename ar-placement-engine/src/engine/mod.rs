pub mod assets;
pub mod core;
pub mod presentation;
pub mod scene;
pub mod xr;
