use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub gallery: GalleryConfig,

    #[serde(default)]
    pub lightbox: LightboxConfig,

    #[serde(default)]
    pub preloader: PreloaderConfig,

    #[serde(default)]
    pub preview: PreviewConfig,

    #[serde(default)]
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// A TOML manifest, or a directory with one folder per category.
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,

    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,
}

fn default_catalog_path() -> PathBuf {
    dirs::picture_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("glimpses")
}

fn default_image_extensions() -> Vec<String> {
    vec![
        "jpg".to_string(),
        "jpeg".to_string(),
        "png".to_string(),
        "gif".to_string(),
        "webp".to_string(),
    ]
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
            image_extensions: default_image_extensions(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryConfig {
    /// Rows shown before "load more".
    #[serde(default = "default_rows_initially")]
    pub rows_initially: usize,

    /// Delay between consecutive item reveals.
    #[serde(default = "default_reveal_stagger_ms")]
    pub reveal_stagger_ms: u64,

    #[serde(default = "default_resize_debounce_ms")]
    pub resize_debounce_ms: u64,

    /// Items whose tops differ by less than this share a row.
    #[serde(default = "default_row_epsilon")]
    pub row_epsilon: f32,

    #[serde(default = "default_cell_width")]
    pub cell_width: u16,

    #[serde(default = "default_cell_height")]
    pub cell_height: u16,
}

fn default_rows_initially() -> usize {
    2
}

fn default_reveal_stagger_ms() -> u64 {
    80
}

fn default_resize_debounce_ms() -> u64 {
    250
}

fn default_row_epsilon() -> f32 {
    5.0
}

fn default_cell_width() -> u16 {
    30
}

fn default_cell_height() -> u16 {
    7
}

impl GalleryConfig {
    pub fn reveal_stagger(&self) -> Duration {
        Duration::from_millis(self.reveal_stagger_ms)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            rows_initially: default_rows_initially(),
            reveal_stagger_ms: default_reveal_stagger_ms(),
            resize_debounce_ms: default_resize_debounce_ms(),
            row_epsilon: default_row_epsilon(),
            cell_width: default_cell_width(),
            cell_height: default_cell_height(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightboxConfig {
    /// Idle time before the controls hide.
    #[serde(default = "default_auto_hide_ms")]
    pub auto_hide_ms: u64,

    /// Horizontal drag distance, in layout units, that counts as a swipe.
    #[serde(default = "default_drag_threshold")]
    pub drag_threshold: f32,

    /// Horizontal wheel delta that counts as a swipe.
    #[serde(default = "default_wheel_threshold")]
    pub wheel_threshold: f32,

    #[serde(default = "default_swap_delay_ms")]
    pub swap_delay_ms: u64,

    #[serde(default = "default_scale_up_delay_ms")]
    pub scale_up_delay_ms: u64,

    #[serde(default = "default_open_zoom_delay_ms")]
    pub open_zoom_delay_ms: u64,

    /// Layout units per terminal column for pointer gestures.
    #[serde(default = "default_pointer_unit")]
    pub pointer_unit: f32,

    /// Wheel delta reported for one horizontal scroll step.
    #[serde(default = "default_wheel_step")]
    pub wheel_step: f32,
}

fn default_auto_hide_ms() -> u64 {
    2000
}

fn default_drag_threshold() -> f32 {
    40.0
}

fn default_wheel_threshold() -> f32 {
    10.0
}

fn default_swap_delay_ms() -> u64 {
    100
}

fn default_scale_up_delay_ms() -> u64 {
    50
}

fn default_open_zoom_delay_ms() -> u64 {
    100
}

fn default_pointer_unit() -> f32 {
    8.0
}

fn default_wheel_step() -> f32 {
    24.0
}

impl LightboxConfig {
    pub fn auto_hide(&self) -> Duration {
        Duration::from_millis(self.auto_hide_ms)
    }

    pub fn swap_delay(&self) -> Duration {
        Duration::from_millis(self.swap_delay_ms)
    }

    pub fn scale_up_delay(&self) -> Duration {
        Duration::from_millis(self.scale_up_delay_ms)
    }

    pub fn open_zoom_delay(&self) -> Duration {
        Duration::from_millis(self.open_zoom_delay_ms)
    }
}

impl Default for LightboxConfig {
    fn default() -> Self {
        Self {
            auto_hide_ms: default_auto_hide_ms(),
            drag_threshold: default_drag_threshold(),
            wheel_threshold: default_wheel_threshold(),
            swap_delay_ms: default_swap_delay_ms(),
            scale_up_delay_ms: default_scale_up_delay_ms(),
            open_zoom_delay_ms: default_open_zoom_delay_ms(),
            pointer_unit: default_pointer_unit(),
            wheel_step: default_wheel_step(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreloaderConfig {
    /// How long the splash stays up when there is nothing to load.
    #[serde(default = "default_min_display_ms")]
    pub min_display_ms: u64,

    /// Pause after the last asset before the splash leaves.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// The splash leaves after this long no matter what.
    #[serde(default = "default_force_ms")]
    pub force_ms: u64,
}

fn default_min_display_ms() -> u64 {
    1500
}

fn default_settle_ms() -> u64 {
    800
}

fn default_force_ms() -> u64 {
    5000
}

impl Default for PreloaderConfig {
    fn default() -> Self {
        Self {
            min_display_ms: default_min_display_ms(),
            settle_ms: default_settle_ms(),
            force_ms: default_force_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageProtocol {
    #[default]
    Auto,
    Sixel,
    Kitty,
    ITerm2,
    Halfblocks,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    #[serde(default)]
    pub protocol: ImageProtocol,

    /// Longest edge, in pixels, of images decoded for the lightbox.
    #[serde(default = "default_max_image_size")]
    pub max_image_size: u32,
}

fn default_max_image_size() -> u32 {
    2048
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            protocol: ImageProtocol::default(),
            max_image_size: default_max_image_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// Where the theme preference is persisted.
    #[serde(default = "default_theme_store_path")]
    pub store_path: PathBuf,

    /// Toggles are ignored for this long after a toggle.
    #[serde(default = "default_toggle_lock_ms")]
    pub toggle_lock_ms: u64,
}

fn default_theme_store_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from(".local/share"))
        .join("glimpses")
        .join("preferences.json")
}

fn default_toggle_lock_ms() -> u64 {
    250
}

impl ThemeConfig {
    pub fn toggle_lock(&self) -> Duration {
        Duration::from_millis(self.toggle_lock_ms)
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            store_path: default_theme_store_path(),
            toggle_lock_ms: default_toggle_lock_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            gallery: GalleryConfig::default(),
            lightbox: LightboxConfig::default(),
            preloader: PreloaderConfig::default(),
            preview: PreviewConfig::default(),
            theme: ThemeConfig::default(),
        }
    }
}

impl Config {
    /// Load from `GLIMPSES_CONFIG` or the default location, writing a default
    /// config there on first run.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            // Create default config
            let config = Config::default();
            config.save_to(&config_path)?;
            tracing::info!(path = %config_path.display(), "Wrote default config");
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("glimpses")
    }

    fn config_path() -> PathBuf {
        match std::env::var_os("GLIMPSES_CONFIG") {
            Some(path) => PathBuf::from(path),
            None => Self::config_dir().join("config.toml"),
        }
    }
}
