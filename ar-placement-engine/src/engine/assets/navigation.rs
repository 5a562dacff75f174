use bevy::prelude::*;

/// Model identifier resolved from the page the engine was opened on.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelLocator {
    model_id: Option<u32>,
}

impl ModelLocator {
    pub fn new(model_id: Option<u32>) -> Self {
        Self { model_id }
    }

    /// Identifier from `path`, falling back to `default_id`.
    pub fn from_path(path: Option<&str>, default_id: Option<u32>) -> Self {
        Self {
            model_id: path.and_then(model_id_from_path).or(default_id),
        }
    }

    /// Resolve against the current page (or its native stand-in).
    pub fn from_current_page(default_id: Option<u32>) -> Self {
        let path = current_path();
        let locator = Self::from_path(path.as_deref(), default_id);
        info!(
            "Navigation path {:?} resolved to model {:?}",
            path, locator.model_id
        );
        locator
    }

    pub fn model_id(&self) -> Option<u32> {
        self.model_id
    }
}

/// Last numeric segment of a navigation path.
pub fn model_id_from_path(path: &str) -> Option<u32> {
    path.split('/')
        .filter_map(|segment| segment.parse::<u32>().ok())
        .last()
}

#[cfg(target_arch = "wasm32")]
fn current_path() -> Option<String> {
    web_sys::window()?.location().pathname().ok()
}

#[cfg(not(target_arch = "wasm32"))]
fn current_path() -> Option<String> {
    std::env::var(constants::session::NAVIGATION_PATH_ENV).ok()
}
