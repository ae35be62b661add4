//! Configuration types for feedtest.
//!
//! [`Config::load`] reads `~/.config/feedtest/config.toml`, creating it with
//! hardcoded defaults if it does not yet exist. [`Config::defaults`] returns
//! the same defaults without touching the filesystem (useful in tests).

use serde::Deserialize;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[service]
base_url = "http://ci.kbase.us/services/feeds/"

[ui]
show_timestamps        = true
timestamp_format       = "%Y-%m-%d %H:%M"
global_pane_height_pct = 35

[keybindings]
toggle_focus   = "Tab"
refresh        = "r"
toggle_seen    = " "
include_seen   = "e"
reverse_sort   = "o"
cycle_level    = "L"
cycle_source   = "S"
post           = "n"
post_global    = "N"
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level application configuration, loaded from `~/.config/feedtest/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
}

/// `[service]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Token used when none is given on the command line or in `FEEDS_TOKEN`.
    #[serde(default)]
    pub token: Option<String>,
}

fn default_base_url() -> String { "http://ci.kbase.us/services/feeds/".to_string() }

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { base_url: default_base_url(), token: None }
    }
}

/// `[ui]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_show_timestamps")]
    pub show_timestamps: bool,
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
    #[serde(default = "default_global_pane_height_pct")]
    pub global_pane_height_pct: u16,
}

fn default_show_timestamps() -> bool { true }
fn default_timestamp_format() -> String { "%Y-%m-%d %H:%M".to_string() }
fn default_global_pane_height_pct() -> u16 { 35 }

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_timestamps: default_show_timestamps(),
            timestamp_format: default_timestamp_format(),
            global_pane_height_pct: default_global_pane_height_pct(),
        }
    }
}

/// `[keybindings]` section of `config.toml`.
///
/// Each binding is a single key: a printable character, or `Tab`.
#[derive(Debug, Clone, Deserialize)]
pub struct KeybindingsConfig {
    #[serde(default = "default_toggle_focus")]
    pub toggle_focus: String,
    #[serde(default = "default_refresh")]
    pub refresh: String,
    #[serde(default = "default_toggle_seen")]
    pub toggle_seen: String,
    #[serde(default = "default_include_seen")]
    pub include_seen: String,
    #[serde(default = "default_reverse_sort")]
    pub reverse_sort: String,
    #[serde(default = "default_cycle_level")]
    pub cycle_level: String,
    #[serde(default = "default_cycle_source")]
    pub cycle_source: String,
    #[serde(default = "default_post")]
    pub post: String,
    #[serde(default = "default_post_global")]
    pub post_global: String,
}

fn default_toggle_focus() -> String { "Tab".to_string() }
fn default_refresh() -> String { "r".to_string() }
fn default_toggle_seen() -> String { " ".to_string() }
fn default_include_seen() -> String { "e".to_string() }
fn default_reverse_sort() -> String { "o".to_string() }
fn default_cycle_level() -> String { "L".to_string() }
fn default_cycle_source() -> String { "S".to_string() }
fn default_post() -> String { "n".to_string() }
fn default_post_global() -> String { "N".to_string() }

impl Default for KeybindingsConfig {
    fn default() -> Self {
        Self {
            toggle_focus: default_toggle_focus(),
            refresh: default_refresh(),
            toggle_seen: default_toggle_seen(),
            include_seen: default_include_seen(),
            reverse_sort: default_reverse_sort(),
            cycle_level: default_cycle_level(),
            cycle_source: default_cycle_source(),
            post: default_post(),
            post_global: default_post_global(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/feedtest/config.toml`, layered on top of the
    /// built-in defaults. Creates the file with defaults if it does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start())?;
        }

        Self::load_from(&path)
    }

    /// Load from an explicit path, layered on top of the built-in defaults.
    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path).required(false))
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("feedtest")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
