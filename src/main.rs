mod config;
mod debug;
mod gameplay;
mod input;
mod sim;
mod states;
mod ui;

use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_rapier2d::prelude::*;
use config::{log_config_summary, ConfigPlugin, GameConfig, CONFIG_DIR};
use debug::DebugOverlayPlugin;
use gameplay::GameplayPlugin;
use input::ControlInputPlugin;
use states::{GameState, GameStatePlugin};
use std::path::Path;
use ui::GameHudPlugin;

fn main() {
    let config = match GameConfig::load_from_dir(Path::new(CONFIG_DIR)) {
        Ok(config) => config,
        Err(error) => panic!("Failed to load config from `{CONFIG_DIR}`: {error}"),
    };
    log_config_summary("Loaded", &config);

    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: config.app.window_title.clone(),
            resolution: (config.app.window_width, config.app.window_height).into(),
            ..default()
        }),
        ..default()
    }))
    .add_plugins(EguiPlugin::default())
    .add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(
        config.world.pixels_per_meter,
    ))
    .add_plugins(FrameTimeDiagnosticsPlugin::default())
    .insert_resource(config)
    .add_plugins(ConfigPlugin)
    .add_plugins(DebugOverlayPlugin)
    .add_plugins(GameplayPlugin)
    .add_plugins(ControlInputPlugin)
    .add_plugins(GameHudPlugin)
    .init_state::<GameState>()
    .add_plugins(GameStatePlugin);

    app.run();
}
