use bevy::prelude::*;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_DIR: &str = "config";
const GAME_FILE: &str = "game.toml";

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, reload_game_config_hotkey);
    }
}

fn reload_game_config_hotkey(
    keyboard: Res<ButtonInput<KeyCode>>,
    game_config: Option<ResMut<GameConfig>>,
) {
    if !keyboard.just_pressed(KeyCode::F5) {
        return;
    }

    let Some(mut current_config) = game_config else {
        warn!("Config hot-reload requested, but `GameConfig` resource is not initialized yet.");
        return;
    };

    match GameConfig::load_from_dir(Path::new(CONFIG_DIR)) {
        Ok(new_config) => {
            *current_config = new_config;
            log_config_summary("Hot-reloaded", &current_config);
        }
        Err(error) => {
            error!("Config hot-reload failed; keeping previous config: {error}");
        }
    }
}

pub fn log_config_summary(prefix: &str, config: &GameConfig) {
    info!(
        "{prefix} config: {} initial segments of {:.0} wide, window of {} live, wheel radius {:.0}, spacing {:.0}.",
        config.terrain.initial_segments,
        config.terrain.segment_width,
        config.terrain.max_live_segments,
        config.vehicle.wheel_radius,
        config.vehicle.wheel_spacing,
    );
}

#[derive(Resource, Debug, Clone, Deserialize)]
pub struct GameConfig {
    pub app: AppConfig,
    pub world: WorldConfig,
    pub terrain: TerrainConfig,
    pub vehicle: VehicleConfig,
    pub camera: CameraConfig,
    pub hud: HudConfig,
    pub parallax: ParallaxConfig,
    pub features: FeatureToggles,
}

impl GameConfig {
    pub fn load_from_dir(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(GAME_FILE);
        let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        Self::parse(&raw, &path)
    }

    pub fn parse(raw: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source: Box::new(source),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.app.window_width == 0 || self.app.window_height == 0 {
            return Err(ConfigError::Validation(
                "game.toml::app window size must be non-zero".to_string(),
            ));
        }
        positive("app.viewport_height", self.app.viewport_height)?;
        positive("world.pixels_per_meter", self.world.pixels_per_meter)?;
        non_negative("world.gravity", self.world.gravity)?;

        let terrain = &self.terrain;
        positive("terrain.segment_width", terrain.segment_width)?;
        positive("terrain.sample_step", terrain.sample_step)?;
        positive("terrain.period", terrain.period)?;
        non_negative("terrain.lookahead", terrain.lookahead)?;
        non_negative("terrain.friction", terrain.friction)?;
        positive("terrain.stroke_width", terrain.stroke_width)?;
        if terrain.sample_step > terrain.segment_width {
            return Err(ConfigError::Validation(
                "game.toml::terrain.sample_step must not exceed terrain.segment_width".to_string(),
            ));
        }
        if terrain.initial_segments == 0 {
            return Err(ConfigError::Validation(
                "game.toml::terrain.initial_segments must be >= 1".to_string(),
            ));
        }
        if terrain.max_live_segments < terrain.initial_segments {
            return Err(ConfigError::Validation(format!(
                "game.toml::terrain.max_live_segments ({}) must be >= terrain.initial_segments ({})",
                terrain.max_live_segments, terrain.initial_segments
            )));
        }

        let vehicle = &self.vehicle;
        positive("vehicle.wheel_radius", vehicle.wheel_radius)?;
        positive("vehicle.wheel_spacing", vehicle.wheel_spacing)?;
        positive("vehicle.chassis_size[0]", vehicle.chassis_size[0])?;
        positive("vehicle.chassis_size[1]", vehicle.chassis_size[1])?;
        positive("vehicle.chassis_mass", vehicle.chassis_mass)?;
        positive("vehicle.wheel_mass", vehicle.wheel_mass)?;
        non_negative("vehicle.wheel_friction", vehicle.wheel_friction)?;
        non_negative("vehicle.wheel_restitution", vehicle.wheel_restitution)?;
        non_negative("vehicle.wheel_linear_damping", vehicle.wheel_linear_damping)?;
        non_negative("vehicle.wheel_angular_damping", vehicle.wheel_angular_damping)?;
        positive("vehicle.suspension_travel", vehicle.suspension_travel)?;
        non_negative("vehicle.suspension_frequency", vehicle.suspension_frequency)?;
        non_negative("vehicle.suspension_damping", vehicle.suspension_damping)?;
        non_negative("vehicle.drive_torque", vehicle.drive_torque)?;
        non_negative(
            "vehicle.brake_torque_multiplier",
            vehicle.brake_torque_multiplier,
        )?;
        non_negative("vehicle.air_control_impulse", vehicle.air_control_impulse)?;

        positive("hud.rpm_cap", self.hud.rpm_cap)?;
        if !(0.0..1.0).contains(&self.hud.rpm_smoothing) {
            return Err(ConfigError::Validation(
                "game.toml::hud.rpm_smoothing must be in [0, 1)".to_string(),
            ));
        }
        if self.hud.speed_display_divisor == 0 {
            return Err(ConfigError::Validation(
                "game.toml::hud.speed_display_divisor must be >= 1".to_string(),
            ));
        }

        non_negative("parallax.factor", self.parallax.factor)?;
        non_negative("parallax.wrap_margin", self.parallax.wrap_margin)?;
        non_negative("parallax.min_delta_x", self.parallax.min_delta_x)?;

        Ok(())
    }
}

fn positive(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "game.toml::{field} must be > 0 (got {value})"
        )))
    }
}

fn non_negative(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "game.toml::{field} must be >= 0 (got {value})"
        )))
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: Box<toml::de::Error>,
    },
    Validation(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse `{}`: {source}", path.display())
            }
            Self::Validation(message) => write!(f, "{message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Validation(_) => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub viewport_height: f32,
    pub background_color: [f32; 3],
    pub debug_overlay: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorldConfig {
    pub pixels_per_meter: f32,
    pub gravity: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TerrainConfig {
    pub start_x: f32,
    pub initial_segments: usize,
    pub segment_width: f32,
    pub sample_step: f32,
    pub baseline: f32,
    pub amplitude: f32,
    pub period: f32,
    pub lookahead: f32,
    pub max_live_segments: usize,
    pub friction: f32,
    pub stroke_width: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VehicleConfig {
    pub spawn_x: f32,
    pub spawn_y: f32,
    pub wheel_radius: f32,
    pub wheel_spacing: f32,
    pub chassis_size: [f32; 2],
    pub chassis_offset_y: f32,
    pub chassis_mass: f32,
    pub wheel_mass: f32,
    pub wheel_friction: f32,
    pub wheel_restitution: f32,
    pub wheel_linear_damping: f32,
    pub wheel_angular_damping: f32,
    pub limit_anchor_height: f32,
    pub suspension_travel: f32,
    pub suspension_frequency: f32,
    pub suspension_damping: f32,
    pub drive_torque: f32,
    #[serde(default = "default_brake_torque_multiplier")]
    pub brake_torque_multiplier: f32,
    #[serde(default)]
    pub air_control_impulse: f32,
}

fn default_brake_torque_multiplier() -> f32 {
    2.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfig {
    pub lead: [f32; 2],
}

#[derive(Debug, Clone, Deserialize)]
pub struct HudConfig {
    pub rpm_cap: f32,
    pub rpm_smoothing: f32,
    #[serde(default = "default_speed_display_divisor")]
    pub speed_display_divisor: i32,
}

fn default_speed_display_divisor() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParallaxConfig {
    pub factor: f32,
    pub wrap_margin: f32,
    pub min_delta_x: f32,
    pub cloud_count: usize,
    pub seed: u64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FeatureToggles {
    #[serde(default = "default_enabled")]
    pub hud_enabled: bool,
    #[serde(default = "default_enabled")]
    pub pause_menu_enabled: bool,
    #[serde(default = "default_enabled")]
    pub parallax_enabled: bool,
}

fn default_enabled() -> bool {
    true
}

#[cfg(test)]
pub(crate) fn test_config() -> GameConfig {
    GameConfig::parse(
        include_str!("../../config/game.toml"),
        Path::new("config/game.toml"),
    )
    .expect("shipped config should parse")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHIPPED: &str = include_str!("../../config/game.toml");

    fn parse_with(from: &str, to: &str) -> Result<GameConfig, ConfigError> {
        assert!(SHIPPED.contains(from), "fixture line `{from}` missing");
        GameConfig::parse(&SHIPPED.replace(from, to), Path::new("game.toml"))
    }

    #[test]
    fn shipped_config_parses_and_validates() {
        let config = test_config();
        assert_eq!(config.terrain.initial_segments, 3);
        assert_eq!(config.terrain.max_live_segments, 5);
        assert_eq!(config.terrain.segment_width, 4000.0);
        assert_eq!(config.hud.rpm_cap, 300.0);
        assert!(config.features.pause_menu_enabled);
    }

    #[test]
    fn validation_rejects_negative_segment_width() {
        let error = parse_with("segment_width = 4000.0", "segment_width = -4000.0")
            .expect_err("negative width must be rejected");
        assert!(error.to_string().contains("terrain.segment_width"));
    }

    #[test]
    fn validation_rejects_zero_window() {
        let error = parse_with("window_width = 1280", "window_width = 0")
            .expect_err("zero window must be rejected");
        assert!(matches!(error, ConfigError::Validation(_)));
    }

    #[test]
    fn validation_rejects_window_smaller_than_initial_terrain() {
        let error = parse_with("max_live_segments = 5", "max_live_segments = 2")
            .expect_err("live window below initial count must be rejected");
        assert!(error.to_string().contains("max_live_segments"));
    }

    #[test]
    fn validation_rejects_unit_smoothing() {
        let error = parse_with("rpm_smoothing = 0.9", "rpm_smoothing = 1.0")
            .expect_err("smoothing of 1 never updates");
        assert!(error.to_string().contains("rpm_smoothing"));
    }

    #[test]
    fn parse_error_reports_origin_path() {
        let error = GameConfig::parse("[app", Path::new("broken.toml"))
            .expect_err("malformed toml must fail");
        assert!(matches!(error, ConfigError::Parse { .. }));
        assert!(error.to_string().contains("broken.toml"));
    }

    #[test]
    fn missing_directory_is_io_error() {
        let error = GameConfig::load_from_dir(Path::new("does/not/exist"))
            .expect_err("missing file must fail");
        assert!(matches!(error, ConfigError::Io { .. }));
        assert!(error.source().is_some());
    }
}
