// ChiloDisco - platform/config.rs
//
// Platform-specific configuration, data directory resolution, and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for ChiloDisco configuration and session data.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/chilodisco/ or %APPDATA%\ChiloDisco\config\)
    pub config_dir: PathBuf,

    /// Data directory for the persisted session store.
    pub data_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let data_dir = proj_dirs.data_dir().to_path_buf();

            tracing::debug!(
                config = %config_dir.display(),
                data = %data_dir.display(),
                "Platform paths resolved"
            );

            Self {
                config_dir,
                data_dir,
            }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            let fallback = PathBuf::from(".");
            Self {
                config_dir: fallback.clone(),
                data_dir: fallback,
            }
        }
    }

    /// Path of `config.toml`.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }

    /// Path of the file-backed session store.
    pub fn session_file(&self) -> PathBuf {
        self.data_dir.join(constants::SESSION_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility -- a newer
/// config file can be used with an older binary without crashing.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[server]` section.
    pub server: ServerSection,
    /// `[polling]` section.
    pub polling: PollingSection,
    /// `[ui]` section.
    pub ui: UiSection,
    /// `[session]` section.
    pub session: SessionSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[server]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Base URL of the log server, without the `/api/logs` path.
    pub base_url: Option<String>,
    /// Per-request timeout in ms.
    pub request_timeout_ms: Option<u64>,
}

/// `[polling]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct PollingSection {
    /// Milliseconds between polls.
    pub interval_ms: Option<u64>,
    /// Lines kept per panel.
    pub max_lines: Option<usize>,
}

/// `[ui]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct UiSection {
    /// Theme: "dark" or "light".
    pub theme: Option<String>,
    /// Log body font size in points.
    pub font_size: Option<f32>,
    /// Panels per row.
    pub columns: Option<usize>,
    /// Height of each panel's scroll area in points.
    pub panel_height: Option<f32>,
    /// Label set: "english" or "chinese".
    pub labels: Option<String>,
}

/// `[session]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// Keep stick preferences and first-seen caches across restarts.
    pub persist: Option<bool>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// All values are validated against named constants at load time.
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    // -- Server --
    pub base_url: String,
    pub request_timeout_ms: u64,

    // -- Polling --
    pub interval_ms: u64,
    pub max_lines: usize,

    // -- UI --
    /// Dark mode (true) or light mode (false).
    pub dark_mode: bool,
    pub font_size: f32,
    pub columns: usize,
    pub panel_height: f32,
    /// Normalised label set name: "english" or "chinese".
    pub labels: String,

    // -- Session --
    pub persist_session: bool,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: constants::DEFAULT_SERVER_URL.to_string(),
            request_timeout_ms: constants::DEFAULT_REQUEST_TIMEOUT_MS,
            interval_ms: constants::DEFAULT_POLL_INTERVAL_MS,
            max_lines: constants::DEFAULT_MAX_LINES,
            dark_mode: true,
            font_size: constants::DEFAULT_FONT_SIZE,
            columns: constants::DEFAULT_COLUMNS,
            panel_height: constants::DEFAULT_PANEL_HEIGHT,
            labels: "english".to_string(),
            persist_session: false,
            log_level: None,
        }
    }
}

/// Load and validate `config.toml` at `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first-run).
/// If the file is unreadable or unparseable, returns defaults with a warning;
/// the application still starts but the user is informed.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), Vec::new());
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(e) => {
            let msg = format!(
                "Could not read config file '{}': {e}. Using defaults.",
                config_path.display()
            );
            tracing::warn!("{}", msg);
            return (AppConfig::default(), vec![msg]);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            let msg = format!(
                "Failed to parse config file '{}': {e}. Using defaults.",
                config_path.display()
            );
            tracing::warn!("{}", msg);
            return (AppConfig::default(), vec![msg]);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    let (config, warnings) = validate(raw);
    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }
    (config, warnings)
}

/// Check `value` against an inclusive range, recording a warning otherwise.
fn in_range<T>(
    section_field: &str,
    value: Option<T>,
    min: T,
    max: T,
    default: T,
    warnings: &mut Vec<String>,
) -> Option<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    let v = value?;
    if v >= min && v <= max {
        Some(v)
    } else {
        warnings.push(format!(
            "{section_field} = {v} is out of range ({min}-{max}). Using default ({default})."
        ));
        None
    }
}

/// Validate each field against named constants, accumulating all warnings.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let mut config = AppConfig::default();

    // -- Server: base_url --
    if let Some(url) = raw.server.base_url {
        let trimmed = url.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            config.base_url = trimmed.to_string();
        } else {
            warnings.push(format!(
                "[server] base_url = \"{url}\" must start with http:// or https://. Using default ({}).",
                constants::DEFAULT_SERVER_URL,
            ));
        }
    }

    // -- Server: request_timeout_ms --
    if let Some(ms) = in_range(
        "[server] request_timeout_ms",
        raw.server.request_timeout_ms,
        constants::MIN_REQUEST_TIMEOUT_MS,
        constants::MAX_REQUEST_TIMEOUT_MS,
        constants::DEFAULT_REQUEST_TIMEOUT_MS,
        &mut warnings,
    ) {
        config.request_timeout_ms = ms;
    }

    // -- Polling: interval_ms --
    if let Some(ms) = in_range(
        "[polling] interval_ms",
        raw.polling.interval_ms,
        constants::MIN_POLL_INTERVAL_MS,
        constants::MAX_POLL_INTERVAL_MS,
        constants::DEFAULT_POLL_INTERVAL_MS,
        &mut warnings,
    ) {
        config.interval_ms = ms;
    }

    // -- Polling: max_lines --
    if let Some(n) = in_range(
        "[polling] max_lines",
        raw.polling.max_lines,
        constants::MIN_MAX_LINES,
        constants::MAX_MAX_LINES,
        constants::DEFAULT_MAX_LINES,
        &mut warnings,
    ) {
        config.max_lines = n;
    }

    // -- UI: theme --
    if let Some(ref theme) = raw.ui.theme {
        match theme.to_lowercase().as_str() {
            "dark" => config.dark_mode = true,
            "light" => config.dark_mode = false,
            other => {
                warnings.push(format!(
                    "[ui] theme = \"{other}\" is not recognised. Expected \"dark\" or \"light\". Using default (dark).",
                ));
            }
        }
    }

    // -- UI: font_size --
    if let Some(size) = in_range(
        "[ui] font_size",
        raw.ui.font_size,
        constants::MIN_FONT_SIZE,
        constants::MAX_FONT_SIZE,
        constants::DEFAULT_FONT_SIZE,
        &mut warnings,
    ) {
        config.font_size = size;
    }

    // -- UI: columns --
    if let Some(cols) = in_range(
        "[ui] columns",
        raw.ui.columns,
        1,
        constants::MAX_COLUMNS,
        constants::DEFAULT_COLUMNS,
        &mut warnings,
    ) {
        config.columns = cols;
    }

    // -- UI: panel_height --
    if let Some(h) = in_range(
        "[ui] panel_height",
        raw.ui.panel_height,
        constants::MIN_PANEL_HEIGHT,
        constants::MAX_PANEL_HEIGHT,
        constants::DEFAULT_PANEL_HEIGHT,
        &mut warnings,
    ) {
        config.panel_height = h;
    }

    // -- UI: labels --
    if let Some(ref labels) = raw.ui.labels {
        match labels.to_lowercase().as_str() {
            "english" | "en" => config.labels = "english".to_string(),
            "chinese" | "zh" => config.labels = "chinese".to_string(),
            other => {
                warnings.push(format!(
                    "[ui] labels = \"{other}\" is not recognised. Expected \"english\" or \"chinese\". Using default (english).",
                ));
            }
        }
    }

    // -- Session: persist --
    if let Some(persist) = raw.session.persist {
        config.persist_session = persist;
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    (config, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(toml_text: &str) -> (AppConfig, Vec<String>) {
        validate(toml::from_str(toml_text).expect("valid TOML"))
    }

    #[test]
    fn test_missing_file_yields_defaults_without_warnings() {
        let dir = TempDir::new().unwrap();
        let (config, warnings) = load_config(&dir.path().join("config.toml"));
        assert_eq!(config, AppConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_full_config_is_applied() {
        let (config, warnings) = parse(
            r#"
            [server]
            base_url = "http://fuzz-box:8080"
            request_timeout_ms = 2000

            [polling]
            interval_ms = 1000
            max_lines = 200

            [ui]
            theme = "light"
            font_size = 12.0
            columns = 3
            panel_height = 400.0
            labels = "zh"

            [session]
            persist = true

            [logging]
            level = "DEBUG"
            "#,
        );
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.base_url, "http://fuzz-box:8080");
        assert_eq!(config.request_timeout_ms, 2000);
        assert_eq!(config.interval_ms, 1000);
        assert_eq!(config.max_lines, 200);
        assert!(!config.dark_mode);
        assert_eq!(config.font_size, 12.0);
        assert_eq!(config.columns, 3);
        assert_eq!(config.panel_height, 400.0);
        assert_eq!(config.labels, "chinese");
        assert!(config.persist_session);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_out_of_range_values_fall_back_with_warnings() {
        let (config, warnings) = parse(
            r#"
            [polling]
            interval_ms = 10
            max_lines = 0

            [ui]
            columns = 9
            theme = "neon"
            "#,
        );
        assert_eq!(warnings.len(), 4);
        assert_eq!(config.interval_ms, constants::DEFAULT_POLL_INTERVAL_MS);
        assert_eq!(config.max_lines, constants::DEFAULT_MAX_LINES);
        assert_eq!(config.columns, constants::DEFAULT_COLUMNS);
        assert!(config.dark_mode);
        assert!(warnings[0].contains("[polling] interval_ms = 10"));
    }

    #[test]
    fn test_bad_url_is_rejected() {
        let (config, warnings) = parse("[server]\nbase_url = \"fuzz-box:8080\"\n");
        assert_eq!(config.base_url, constants::DEFAULT_SERVER_URL);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let (config, warnings) = parse("[future]\nflag = true\n[polling]\nshiny = 1\n");
        assert!(warnings.is_empty());
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_unparseable_file_yields_defaults_with_warning() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[polling\ninterval_ms = ").unwrap();
        let (config, warnings) = load_config(&path);
        assert_eq!(config, AppConfig::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Failed to parse"));
    }
}
