//! Configuration for Glyph Console
//!
//! This module provides the configuration system with:
//! - Config file under the platform config directory
//! - CLI argument overrides
//! - Environment variable support
//! - Config precedence: CLI > env > file > defaults
//! - Validation with field-level error messages

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use console_core::{ConsoleConfig, FontSet, StyleTable, MAX_INPUT_LENGTH};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// CLI arguments for Glyph Console
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "glyph-console")]
#[command(version)]
#[command(about = "A single-line text console drawn from a glyph atlas", long_about = None)]
pub struct CliArgs {
    /// Path to custom config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// TrueType/OpenType font file for regular text
    #[arg(long, value_name = "FILE")]
    pub font: Option<PathBuf>,

    /// Font size in pixels
    #[arg(long, value_name = "SIZE")]
    pub font_size: Option<f32>,

    /// Prompt drawn before the input line
    #[arg(long, value_name = "TEXT")]
    pub prompt: Option<String>,

    /// Initial window width in pixels
    #[arg(long, value_name = "PX")]
    pub width: Option<u32>,

    /// Initial window height in pixels
    #[arg(long, value_name = "PX")]
    pub height: Option<u32>,

    /// Theme name (light, dark)
    #[arg(short, long, value_name = "THEME")]
    pub theme: Option<String>,

    /// Read commands from stdin and print a JSON snapshot instead of opening
    /// a window
    #[arg(long)]
    pub headless: bool,
}

/// Available theme names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeName {
    /// Black text on white
    #[default]
    Light,
    /// White text on black
    Dark,
}

impl ThemeName {
    /// Parse theme name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "light" => Some(ThemeName::Light),
            "dark" => Some(ThemeName::Dark),
            _ => None,
        }
    }

    /// Window clear color as 0RGB
    pub fn background(self) -> u32 {
        match self {
            ThemeName::Light => 0x00ff_ffff,
            ThemeName::Dark => 0x0000_0000,
        }
    }

    /// Style table for this theme
    pub fn styles(self, fonts: FontSet) -> StyleTable {
        match self {
            ThemeName::Light => StyleTable::new(fonts),
            ThemeName::Dark => StyleTable::dark(fonts),
        }
    }
}

/// Font configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontConfig {
    /// Regular face (None = search the system font directories)
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Bold face (None = use the regular face)
    #[serde(default)]
    pub bold: Option<PathBuf>,
    #[serde(default)]
    pub italic: Option<PathBuf>,
    #[serde(default)]
    pub bold_italic: Option<PathBuf>,
    /// Font size in pixels
    #[serde(default = "default_font_size")]
    pub size: f32,
}

fn default_font_size() -> f32 {
    13.0
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            path: None,
            bold: None,
            italic: None,
            bold_italic: None,
            size: default_font_size(),
        }
    }
}

/// Window configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

fn default_width() -> u32 {
    600
}
fn default_height() -> u32 {
    400
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

/// Console host configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub font: FontConfig,

    #[serde(default)]
    pub window: WindowConfig,

    /// Prompt drawn before the input line
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// Text printed to the scrollback at startup
    #[serde(default = "default_banner")]
    pub banner: String,

    #[serde(default)]
    pub theme: ThemeName,

    /// Maximum number of remembered commands
    #[serde(default = "default_history_size")]
    pub history_size: usize,
}

fn default_prompt() -> String {
    ConsoleConfig::default().prompt
}
fn default_banner() -> String {
    "Glyph console\nType 'help' for a list of commands.\n \n".to_string()
}
fn default_history_size() -> usize {
    100
}

impl Default for Config {
    fn default() -> Self {
        Self {
            font: FontConfig::default(),
            window: WindowConfig::default(),
            prompt: default_prompt(),
            banner: default_banner(),
            theme: ThemeName::default(),
            history_size: default_history_size(),
        }
    }
}

/// Smallest accepted window side in pixels
const MIN_WINDOW_SIZE: u32 = 64;
/// Largest accepted window side in pixels
const MAX_WINDOW_SIZE: u32 = 16_384;

/// Configuration error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config error in '{field}': {message}")]
    Invalid { field: &'static str, message: String },
}

impl ConfigError {
    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            message: message.into(),
        }
    }
}

impl Config {
    /// Load configuration with full precedence:
    /// CLI args > environment variables > config file > defaults
    pub fn load_with_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        let config_path = args.config.clone().or_else(Self::default_config_path);
        if let Some(path) = &config_path {
            if path.exists() {
                match Self::load_from_file(path) {
                    Ok(file_config) => config = file_config,
                    Err(e) => {
                        // An explicitly requested file must load
                        if args.config.is_some() {
                            return Err(e);
                        }
                        log::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            } else if args.config.is_some() {
                log::warn!("Config file {:?} does not exist, using defaults", path);
            }
        }

        config.apply_env_vars();
        config.apply_cli_args(args);
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Apply environment variables to config
    fn apply_env_vars(&mut self) {
        self.apply_vars(|name| env::var(name).ok());
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("GLYPH_CONSOLE_FONT") {
            self.font.path = Some(PathBuf::from(val));
        }
        if let Some(val) = var("GLYPH_CONSOLE_FONT_SIZE") {
            match val.parse() {
                Ok(size) => self.font.size = size,
                Err(_) => log::warn!("Ignoring GLYPH_CONSOLE_FONT_SIZE={:?}", val),
            }
        }
        if let Some(val) = var("GLYPH_CONSOLE_PROMPT") {
            self.prompt = val;
        }
        if let Some(val) = var("GLYPH_CONSOLE_THEME") {
            match ThemeName::from_name(&val) {
                Some(theme) => self.theme = theme,
                None => log::warn!("Ignoring unknown theme {:?}", val),
            }
        }
    }

    /// Apply CLI arguments to config
    fn apply_cli_args(&mut self, args: &CliArgs) {
        if let Some(font) = &args.font {
            self.font.path = Some(font.clone());
        }
        if let Some(size) = args.font_size {
            self.font.size = size;
        }
        if let Some(prompt) = &args.prompt {
            self.prompt = prompt.clone();
        }
        if let Some(width) = args.width {
            self.window.width = width;
        }
        if let Some(height) = args.height {
            self.window.height = height;
        }
        if let Some(theme_str) = &args.theme {
            match ThemeName::from_name(theme_str) {
                Some(theme) => self.theme = theme,
                None => log::warn!("Ignoring unknown theme {:?}", theme_str),
            }
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), ConfigError> {
        if !(4.0..=200.0).contains(&self.font.size) {
            return Err(ConfigError::invalid(
                "font.size",
                "Font size must be between 4.0 and 200.0",
            ));
        }

        let window_range = MIN_WINDOW_SIZE..=MAX_WINDOW_SIZE;
        if !window_range.contains(&self.window.width) || !window_range.contains(&self.window.height) {
            return Err(ConfigError::invalid(
                "window",
                format!(
                    "Window sides must be between {} and {} pixels",
                    MIN_WINDOW_SIZE, MAX_WINDOW_SIZE
                ),
            ));
        }

        if self.prompt.len() >= MAX_INPUT_LENGTH {
            return Err(ConfigError::invalid(
                "prompt",
                format!("Prompt must be shorter than {} characters", MAX_INPUT_LENGTH),
            ));
        }
        if !self.prompt.is_ascii() {
            return Err(ConfigError::invalid("prompt", "Prompt must be ASCII"));
        }

        if self.history_size == 0 {
            return Err(ConfigError::invalid(
                "history_size",
                "History size must be at least 1",
            ));
        }

        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("glyph-console").join("config.toml"))
    }

    /// Settings for the console core
    pub fn console_config(&self) -> ConsoleConfig {
        ConsoleConfig {
            prompt: self.prompt.clone(),
            ..ConsoleConfig::default()
        }
    }
}
