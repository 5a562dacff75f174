/// WebXR session mode requested from the host.
pub const IMMERSIVE_AR_MODE: &str = "immersive-ar";

/// JSON-RPC protocol version tag.
pub const JSONRPC_VERSION: &str = "2.0";

/// Environment variable overriding the config file path (native only).
pub const CONFIG_PATH_ENV: &str = "AR_PLACEMENT_CONFIG";

/// Environment variable standing in for the page path (native only).
pub const NAVIGATION_PATH_ENV: &str = "AR_PLACEMENT_PATH";

/// DOM overlay element ids driven by presentation signals.
pub const DOM_NOT_SUPPORTED_ID: &str = "ar-not-supported";
pub const DOM_TRACKING_PROMPT_ID: &str = "tracking-prompt";
pub const DOM_INSTRUCTIONS_ID: &str = "instructions";
pub const DOM_MESSAGE_ID: &str = "message";
