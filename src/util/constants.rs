// ChiloDisco - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "ChiloDisco";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "ChiloDisco";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Server endpoint
// =============================================================================

/// Default base URL of the server exposing the log snapshot endpoint.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

/// Path of the log snapshot endpoint, relative to the base URL.
pub const LOGS_ENDPOINT_PATH: &str = "/api/logs";

/// Name of the cache-busting query parameter appended to every fetch.
pub const CACHE_BUSTER_PARAM: &str = "t";

/// Per-request timeout for a snapshot fetch (ms).
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;

/// Minimum user-configurable request timeout (ms).
pub const MIN_REQUEST_TIMEOUT_MS: u64 = 100;

/// Maximum user-configurable request timeout (ms).
pub const MAX_REQUEST_TIMEOUT_MS: u64 = 120_000;

// =============================================================================
// Polling
// =============================================================================

/// Default delay between snapshot fetches (ms).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Minimum user-configurable poll interval (ms).
pub const MIN_POLL_INTERVAL_MS: u64 = 50;

/// Maximum user-configurable poll interval (ms).
pub const MAX_POLL_INTERVAL_MS: u64 = 60_000;

/// Default number of lines retained per panel (tail-truncated).
pub const DEFAULT_MAX_LINES: usize = 500;

/// Minimum user-configurable line cap. Zero would render nothing at all.
pub const MIN_MAX_LINES: usize = 1;

/// Maximum user-configurable line cap.
pub const MAX_MAX_LINES: usize = 10_000;

/// Maximum number of poll messages drained by the UI per frame.
/// Remaining messages are handled on the next frame.
pub const MAX_POLL_MESSAGES_PER_FRAME: usize = 16;

// =============================================================================
// Recency colouring
// =============================================================================

/// Age used for lines and files whose timestamp cannot be determined.
/// Lands in the last ("≥90s") bucket.
pub const UNKNOWN_AGE_SECS: f64 = 999_999.0;

/// Hue given to a freshly created placeholder panel before its first poll.
pub const PLACEHOLDER_HUE: u16 = 120;

/// Saturation (%) used for every line and accent colour.
pub const COLOUR_SATURATION: u8 = 100;

/// Lightness (%) of line text and accent colours.
pub const COLOUR_LIGHTNESS: u8 = 55;

/// Lightness (%) of the glow (text-shadow) colour.
pub const GLOW_LIGHTNESS: u8 = 60;

/// Outer glow alpha as a fraction of the inner glow alpha.
pub const GLOW_OUTER_ALPHA_FACTOR: f32 = 0.6;

/// CSS colour of the "(empty)" placeholder.
pub const EMPTY_PLACEHOLDER_COLOUR: &str = "#7a8aa3";

/// Placeholder shown for sizes and times that are unavailable.
pub const NOT_AVAILABLE: &str = "\u{2014}";

// =============================================================================
// Scroll retention
// =============================================================================

/// Distance (px) from the bottom within which a viewport counts as
/// "at the bottom".
pub const AT_BOTTOM_TOLERANCE_PX: f32 = 8.0;

// =============================================================================
// Session store
// =============================================================================

/// Key prefix of the per-panel stick (auto-follow) preference.
pub const STICK_KEY_PREFIX: &str = "cd_stick_";

/// Key prefix of the per-panel first-seen timestamp cache.
pub const FIRST_SEEN_KEY_PREFIX: &str = "cd_fs_";

/// Session persistence file name (stored in the platform data directory).
pub const SESSION_FILE_NAME: &str = "session.json";

// =============================================================================
// UI defaults
// =============================================================================

/// Default UI body font size in points.
pub const DEFAULT_FONT_SIZE: f32 = 14.0;

/// Minimum user-configurable UI font size (points).
pub const MIN_FONT_SIZE: f32 = 10.0;

/// Maximum user-configurable UI font size (points).
pub const MAX_FONT_SIZE: f32 = 24.0;

/// Default number of panel columns in the dashboard grid.
pub const DEFAULT_COLUMNS: usize = 2;

/// Maximum number of panel columns.
pub const MAX_COLUMNS: usize = 6;

/// Default height of a panel's log viewport (points).
pub const DEFAULT_PANEL_HEIGHT: f32 = 320.0;

/// Minimum panel viewport height (points).
pub const MIN_PANEL_HEIGHT: f32 = 120.0;

/// Maximum panel viewport height (points).
pub const MAX_PANEL_HEIGHT: f32 = 2_000.0;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
