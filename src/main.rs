// ChiloDisco - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading and logging initialisation (debug mode support)
// 3. Session store selection (memory or file-backed)
// 4. Headless one-shot render (--once) or eframe GUI launch

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod gui;

// Re-export modules from the library crate so that `gui.rs` and other
// binary-side code can still use `crate::app::...`, `crate::core::...` etc.
pub use chilodisco::app;

pub use chilodisco::core;
pub use chilodisco::platform;
pub use chilodisco::ui;
pub use chilodisco::util;

use app::client::{HttpSnapshotSource, SnapshotSource};
use app::state::{validate_interval_ms, validate_max_lines, DashboardState, PollSettings};
use app::store::{FileStore, KeyValueStore, MemoryStore};
use clap::Parser;
use core::labels::LabelSet;
use platform::config::{AppConfig, PlatformPaths};
use std::time::Duration;

/// Exit code when the one-shot fetch fails.
const EXIT_FETCH_FAILED: i32 = 1;
/// Exit code for unusable startup configuration.
const EXIT_BAD_CONFIG: i32 = 2;

/// Configure fonts for the egui context.
///
/// The Chinese label set needs CJK glyphs, which the egui built-in fonts do
/// not have. The first CJK system font found is appended as a fallback to
/// both families; the built-in fonts stay first so Latin text and the
/// monospace log column alignment are unchanged.
fn configure_fonts(ctx: &egui::Context, labels: LabelSet) {
    if labels != LabelSet::Chinese {
        return;
    }

    let candidates: &[(&str, &str)] = &[
        ("Microsoft YaHei", r"C:\Windows\Fonts\msyh.ttc"),
        ("PingFang", "/System/Library/Fonts/PingFang.ttc"),
        (
            "Noto Sans CJK",
            "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
        ),
        (
            "WenQuanYi Micro Hei",
            "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
        ),
    ];

    for (name, path) in candidates {
        match std::fs::read(path) {
            Ok(data) => {
                let mut fonts = egui::FontDefinitions::default();
                fonts
                    .font_data
                    .insert((*name).to_owned(), egui::FontData::from_owned(data).into());
                for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
                    if let Some(list) = fonts.families.get_mut(&family) {
                        list.push((*name).to_owned());
                    }
                }
                ctx.set_fonts(fonts);
                tracing::info!(font = name, "CJK fallback font configured");
                return;
            }
            Err(e) => {
                tracing::debug!(font = name, error = %e, "CJK font candidate not available");
            }
        }
    }

    tracing::warn!("No CJK system font found; Chinese labels may render as squares");
}

/// ChiloDisco - live log dashboard.
///
/// Polls a log server's /api/logs endpoint and shows one panel per log file,
/// colouring every line by how recently it was written.
#[derive(Parser, Debug)]
#[command(name = "ChiloDisco", version, about)]
struct Cli {
    /// Base URL of the log server (overrides [server] base_url).
    #[arg(short = 'u', long = "url")]
    url: Option<String>,

    /// Milliseconds between polls (overrides [polling] interval_ms).
    #[arg(short = 'i', long = "interval")]
    interval: Option<u64>,

    /// Lines kept per panel (overrides [polling] max_lines).
    #[arg(short = 'n', long = "max-lines")]
    max_lines: Option<usize>,

    /// Keep stick preferences and first-seen times across restarts.
    #[arg(long = "persist-session")]
    persist_session: bool,

    /// Fetch and render once, print every panel to stdout, and exit.
    #[arg(long = "once")]
    once: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

/// Merge CLI overrides into the validated config. An invalid override is
/// reported and the config value kept.
fn resolve_settings(cli: &Cli, config: &AppConfig) -> PollSettings {
    let mut settings = PollSettings {
        interval_ms: config.interval_ms,
        max_lines: config.max_lines,
    };

    if let Some(ms) = cli.interval {
        match validate_interval_ms(ms) {
            Ok(ms) => settings.interval_ms = ms,
            Err(e) => tracing::warn!(error = %e, "Ignoring --interval"),
        }
    }
    if let Some(n) = cli.max_lines {
        match validate_max_lines(n) {
            Ok(n) => settings.max_lines = n,
            Err(e) => tracing::warn!(error = %e, "Ignoring --max-lines"),
        }
    }
    settings
}

fn open_store(persist: bool, paths: &PlatformPaths) -> Box<dyn KeyValueStore> {
    if persist {
        let path = paths.session_file();
        tracing::info!(path = %path.display(), "Using file-backed session store");
        Box::new(FileStore::open(path))
    } else {
        Box::new(MemoryStore::new())
    }
}

/// One fetch, one render, as plain text.
fn render_once(
    mut state: DashboardState,
    mut source: HttpSnapshotSource,
) -> util::error::Result<String> {
    let snapshot = source.fetch()?;
    state.apply_snapshot(&snapshot);
    Ok(state.report())
}

fn main() {
    let cli = Cli::parse();

    // Config first: it may carry the log level.
    let platform_paths = PlatformPaths::resolve();
    let (config, config_warnings) = platform::config::load_config(&platform_paths.config_file());

    util::logging::init(cli.debug, config.log_level.as_deref());

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "ChiloDisco starting"
    );
    for warning in &config_warnings {
        tracing::warn!("{}", warning);
    }

    let settings = resolve_settings(&cli, &config);
    let labels = LabelSet::from_name(&config.labels).unwrap_or_default();
    let store = open_store(cli.persist_session || config.persist_session, &platform_paths);
    let state = DashboardState::new(settings, labels, store);

    let base_url = cli.url.clone().unwrap_or_else(|| config.base_url.clone());
    let timeout = Duration::from_millis(config.request_timeout_ms);
    let source = match HttpSnapshotSource::new(&base_url, timeout) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Cannot create snapshot source");
            eprintln!("Error: {e}");
            std::process::exit(EXIT_BAD_CONFIG);
        }
    };

    if cli.once {
        match render_once(state, source) {
            Ok(report) => {
                print!("{report}");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "One-shot fetch failed");
                eprintln!("Error: {e}");
                std::process::exit(EXIT_FETCH_FAILED);
            }
        }
    }

    tracing::info!(
        url = %source.endpoint(),
        interval_ms = settings.interval_ms,
        max_lines = settings.max_lines,
        "Ready to launch GUI"
    );

    let options = gui::DashboardOptions {
        dark_mode: config.dark_mode,
        font_size: config.font_size,
        columns: config.columns,
        panel_height: config.panel_height,
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!(
                "{} v{}",
                util::constants::APP_NAME,
                util::constants::APP_VERSION
            ))
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([640.0, 400.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        util::constants::APP_NAME,
        native_options,
        Box::new(move |cc| {
            configure_fonts(&cc.egui_ctx, labels);
            Ok(Box::new(gui::DashboardApp::new(
                &cc.egui_ctx,
                state,
                Box::new(source),
                options,
            )))
        }),
    );

    if let Err(e) = result {
        tracing::error!(error = %e, "Failed to launch GUI");
        eprintln!("Error: Failed to launch ChiloDisco GUI: {e}");
        std::process::exit(1);
    }
}
