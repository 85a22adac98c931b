//! Engine configuration.
//!
//! Provides configurable parameters for the world, camera, simulation,
//! rendering and logging. Configuration can be loaded from and saved to a
//! TOML file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use strata_common::{ConfigError, StrataResult};
use strata_world::{GeneratorConfig, ProviderKind, WorldConfig, DEFAULT_CHUNK_SIZE};
use tracing::{info, warn};

use crate::camera::{Camera, DEFAULT_ZOOM, MAX_ZOOM, MIN_ZOOM};
use crate::render::RenderView;

/// Configuration file name.
const CONFIG_FILE: &str = "strata.toml";

/// Engine configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === World Settings ===
    /// Chunk edge length in tiles
    pub chunk_size: u32,
    /// World units per tile
    pub tile_size: f32,
    /// Chunk provider the world is built with
    pub provider: ProviderKind,
    /// Seed for the noise provider and demo placement
    pub world_seed: u32,
    /// Horizontal noise scale
    pub terrain_scale: f64,
    /// Maximum surface displacement in tiles
    pub height_scale: f64,

    // === Camera Settings ===
    /// Viewport width in pixels
    pub viewport_width: u32,
    /// Viewport height in pixels
    pub viewport_height: u32,
    /// Camera zoom level
    pub camera_zoom: f32,

    // === Simulation Settings ===
    /// Simulation ticks per second
    pub tick_rate: u32,
    /// Maximum ticks run for one frame
    pub max_ticks_per_frame: u32,
    /// Chunks preloaded around the host per tick (0 = none)
    pub preload_radius: u32,

    // === Render Settings ===
    /// Chunk cull distance in chunk extents
    pub chunk_cull_radius: f32,
    /// Entity cull distance in chunk extents
    pub entity_cull_radius: f32,

    // === Demo Settings ===
    /// Frames rendered before the demo exits
    pub demo_frames: u32,
    /// Wandering entities spawned around the host
    pub demo_wanderers: u32,

    // === Logging ===
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let generator = GeneratorConfig::default();
        let view = RenderView::default();
        Self {
            // World
            chunk_size: DEFAULT_CHUNK_SIZE,
            tile_size: strata_world::DEFAULT_TILE_SIZE,
            provider: ProviderKind::default(),
            world_seed: generator.seed,
            terrain_scale: generator.terrain_scale,
            height_scale: generator.height_scale,

            // Camera
            viewport_width: 1280,
            viewport_height: 720,
            camera_zoom: DEFAULT_ZOOM,

            // Simulation
            tick_rate: 60,
            max_ticks_per_frame: 10,
            preload_radius: 1,

            // Render
            chunk_cull_radius: view.chunk_cull_radius,
            entity_cull_radius: view.entity_cull_radius,

            // Demo
            demo_frames: 600,
            demo_wanderers: 16,

            // Logging
            log_filter: "strata=info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from the default file location.
    /// Returns default config if file doesn't exist.
    pub fn load() -> Self {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match Self::try_load_from(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Failed to load config file: {e}");
                Self::default()
            },
        }
    }

    /// Load configuration from a specific path, reporting failures.
    pub fn try_load_from<P: AsRef<Path>>(path: P) -> StrataResult<Self> {
        let contents = fs::read_to_string(path)?;
        let mut config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate();
        Ok(config)
    }

    /// Save configuration to the default file location.
    pub fn save(&self) -> StrataResult<()> {
        self.save_to(Self::config_path())
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> StrataResult<()> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Encode(e.to_string()))?;
        fs::write(path, contents)?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn config_path() -> PathBuf {
        if let Some(config_dir) = dirs_config_path() {
            config_dir.join("strata").join(CONFIG_FILE)
        } else {
            PathBuf::from(CONFIG_FILE)
        }
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        // World
        self.chunk_size = self.chunk_size.clamp(8, 256);
        self.tile_size = self.tile_size.clamp(1.0, 128.0);
        self.terrain_scale = self.terrain_scale.clamp(1.0, 4096.0);
        self.height_scale = self.height_scale.clamp(0.0, f64::from(self.chunk_size / 2));

        // Camera
        self.viewport_width = self.viewport_width.clamp(64, 7680);
        self.viewport_height = self.viewport_height.clamp(64, 4320);
        self.camera_zoom = self.camera_zoom.clamp(MIN_ZOOM, MAX_ZOOM);

        // Simulation
        self.tick_rate = self.tick_rate.clamp(1, 1000);
        self.max_ticks_per_frame = self.max_ticks_per_frame.clamp(1, 100);
        self.preload_radius = self.preload_radius.min(8);

        // Render
        self.chunk_cull_radius = self.chunk_cull_radius.clamp(0.5, 64.0);
        self.entity_cull_radius = self.entity_cull_radius.clamp(0.5, 64.0);

        if self.log_filter.trim().is_empty() {
            self.log_filter = Self::default().log_filter;
        }
    }

    /// World index settings.
    #[must_use]
    pub fn world_config(&self) -> WorldConfig {
        WorldConfig {
            chunk_size: self.chunk_size,
            tile_size: self.tile_size,
        }
    }

    /// Provider settings. Chunks carry the tile size as their scale.
    #[must_use]
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            seed: self.world_seed,
            chunk_size: self.chunk_size,
            tile_scale: glam::Vec2::splat(self.tile_size),
            terrain_scale: self.terrain_scale,
            height_scale: self.height_scale,
        }
    }

    /// Camera built from viewport and zoom.
    #[must_use]
    pub fn camera(&self) -> Camera {
        let mut camera = Camera::new(self.viewport_width, self.viewport_height);
        camera.set_zoom(self.camera_zoom);
        camera
    }

    /// Culling settings.
    #[must_use]
    pub fn render_view(&self) -> RenderView {
        RenderView {
            chunk_cull_radius: self.chunk_cull_radius,
            entity_cull_radius: self.entity_cull_radius,
        }
    }
}

/// Get platform-specific config directory.
fn dirs_config_path() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join("Library/Application Support"))
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA").ok().map(PathBuf::from)
    }

    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|h| PathBuf::from(h).join(".config"))
            })
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_common::StrataError;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        let mut validated = config.clone();
        validated.validate();
        assert_eq!(config, validated);
        assert_eq!(config.world_config(), WorldConfig::default());
        assert_eq!(config.render_view(), RenderView::default());
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig {
            chunk_size: 1,
            camera_zoom: 500.0,
            tick_rate: 0,
            chunk_cull_radius: -3.0,
            log_filter: "  ".to_string(),
            ..EngineConfig::default()
        };

        config.validate();

        assert_eq!(config.chunk_size, 8);
        assert!((config.camera_zoom - MAX_ZOOM).abs() < f32::EPSILON);
        assert_eq!(config.tick_rate, 1);
        assert!((config.chunk_cull_radius - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.log_filter, "strata=info");
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join("strata.toml");

        let config = EngineConfig {
            chunk_size: 32,
            provider: ProviderKind::Noise,
            world_seed: 99,
            ..EngineConfig::default()
        };
        config.save_to(&config_path).expect("Failed to save config");

        let loaded = EngineConfig::load_from(&config_path);
        assert_eq!(loaded, config);
        assert_eq!(loaded.generator_config().chunk_size, 32);
        assert_eq!(loaded.world_config().chunk_extent(), 32.0 * 16.0);
    }

    #[test]
    fn test_config_load_missing_file() {
        let config = EngineConfig::load_from("/nonexistent/path/strata.toml");
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_config_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("strata.toml");
        fs::write(&path, "provider = \"flat\"\ntick_rate = 30\n").expect("write");

        let config = EngineConfig::load_from(&path);
        assert_eq!(config.provider, ProviderKind::Flat);
        assert_eq!(config.tick_rate, 30);
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_config_invalid_file_reports_parse_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("strata.toml");
        fs::write(&path, "chunk_size = \"big\"").expect("write");

        assert!(matches!(
            EngineConfig::try_load_from(&path),
            Err(StrataError::Config(ConfigError::Parse(_)))
        ));
        assert_eq!(EngineConfig::load_from(&path), EngineConfig::default());
    }

    #[test]
    fn test_config_camera() {
        let config = EngineConfig {
            viewport_width: 640,
            viewport_height: 480,
            camera_zoom: 2.0,
            ..EngineConfig::default()
        };
        let camera = config.camera();
        assert_eq!(camera.viewport_size, (640, 480));
        assert!((camera.zoom - 2.0).abs() < f32::EPSILON);
    }
}
