use crate::error::{FolioError, FolioResult};
use crate::palette::Palette;
use crate::render::{ColorMode, RenderMode};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// User configuration loaded from config file.
/// All fields are optional. CLI flags override config, config overrides defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default render mode
    pub render: Option<RenderModeConfig>,
    /// Default color mode
    pub color: Option<ColorModeConfig>,
    /// Target FPS (1-120)
    pub fps: Option<u32>,
    /// Hide status bar
    pub clean: Option<bool>,
    /// Portfolio content file (.toml or .json)
    pub content: Option<PathBuf>,
    /// Reload the content file when it changes
    pub watch: Option<bool>,
    /// Delay between typed intro characters, in milliseconds
    pub typing_interval_ms: Option<f64>,
    /// Four `#RRGGBB` card fill colors
    pub palette: Option<Vec<String>>,
    /// Color quantization step (0 = off, 4/8/16 = coarser colors for less output)
    pub color_quant: Option<u8>,
    /// Write logs to this file
    pub log_file: Option<PathBuf>,
}

/// Render mode names for config file (kebab-case friendly)
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderModeConfig {
    Braille,
    HalfBlock,
    Ascii,
}

impl From<RenderModeConfig> for RenderMode {
    fn from(c: RenderModeConfig) -> Self {
        match c {
            RenderModeConfig::Braille => RenderMode::Braille,
            RenderModeConfig::HalfBlock => RenderMode::HalfBlock,
            RenderModeConfig::Ascii => RenderMode::Ascii,
        }
    }
}

/// Color mode names for config file (kebab-case friendly)
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorModeConfig {
    Mono,
    Ansi16,
    Ansi256,
    TrueColor,
}

impl From<ColorModeConfig> for ColorMode {
    fn from(c: ColorModeConfig) -> Self {
        match c {
            ColorModeConfig::Mono => ColorMode::Mono,
            ColorModeConfig::Ansi16 => ColorMode::Ansi16,
            ColorModeConfig::Ansi256 => ColorMode::Ansi256,
            ColorModeConfig::TrueColor => ColorMode::TrueColor,
        }
    }
}

impl Config {
    /// Content file with a leading `~` resolved to the home directory.
    pub fn content_path(&self) -> Option<PathBuf> {
        self.content.as_deref().map(expand_home)
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_file.as_deref().map(expand_home)
    }

    /// Card palette from config, or the built-in one.
    pub fn palette(&self) -> FolioResult<Palette> {
        match &self.palette {
            Some(colors) => Palette::from_hex(colors),
            None => Ok(Palette::default()),
        }
    }
}

/// Resolve a leading `~` component against the home directory. Paths like
/// `~user/x` and paths with no home directory available are left as is.
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// Get the config file path: ~/.config/termfolio/config.toml
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("termfolio").join("config.toml"))
}

/// Load config from the default location. A missing file is not an error.
pub fn load_config() -> FolioResult<Config> {
    match config_path() {
        Some(path) if path.exists() => load_config_from(&path),
        _ => Ok(Config::default()),
    }
}

pub fn load_config_from(path: &Path) -> FolioResult<Config> {
    let contents = std::fs::read_to_string(path)?;
    toml::from_str(&contents).map_err(|source| FolioError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the commented default config, refusing to clobber an existing one.
pub fn init_config() -> FolioResult<PathBuf> {
    let path = config_path()
        .ok_or_else(|| FolioError::content("no config directory on this platform"))?;
    if path.exists() {
        return Err(FolioError::Io(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("{} already exists", path.display()),
        )));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, default_config_string())?;
    Ok(path)
}

/// Generate a default config file with all options commented out
pub fn default_config_string() -> String {
    r##"# termfolio configuration
# Use --show-config to see the active config file path.
# CLI flags override these settings.

# Default render mode: braille, half-block, ascii
# render = "half-block"

# Default color mode: mono, ansi16, ansi256, true-color
# color = "true-color"

# Target FPS (1-120)
# fps = 60

# Hide status bar
# clean = false

# Portfolio content (.toml or .json); see --dump-content for the format
# content = "~/portfolio.toml"

# Reload the content file whenever it changes
# watch = false

# Delay between typed intro characters, in milliseconds
# typing_interval_ms = 50

# Card fill colors, cycled by card position
# palette = ["#FFD6A5", "#CAFFBF", "#9BF6FF", "#BDB2FF"]

# Color quantization step (0 = off, 4/8/16 = coarser colors, less output)
# color_quant = 0

# Write debug logs to this file
# log_file = "/tmp/termfolio.log"
"##
    .to_string()
}
