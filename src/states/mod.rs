use crate::config::GameConfig;
use bevy::camera::ScalingMode;
use bevy::prelude::*;

#[derive(States, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum GameState {
    #[default]
    Boot,
    InRun,
    Restarting,
}

pub struct GameStatePlugin;

impl Plugin for GameStatePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_camera)
            .add_systems(OnEnter(GameState::Boot), enter_boot)
            .add_systems(
                Update,
                boot_to_in_run
                    .run_if(in_state(GameState::Boot))
                    .run_if(resource_exists::<GameConfig>),
            )
            .add_systems(OnEnter(GameState::InRun), enter_in_run)
            .add_systems(OnEnter(GameState::Restarting), enter_restarting)
            .add_systems(
                Update,
                restarting_to_in_run.run_if(in_state(GameState::Restarting)),
            )
            .add_systems(
                Update,
                sync_clear_color_from_config.run_if(resource_changed::<GameConfig>),
            );
    }
}

#[derive(Component, Debug, Clone, Copy)]
pub struct GameCamera;

pub fn viewport_half_extents(config: &GameConfig, window: Option<&Window>) -> Vec2 {
    let half_height = config.app.viewport_height * 0.5;
    let aspect = window
        .map(|window| window.width() / window.height().max(1.0))
        .filter(|aspect| aspect.is_finite() && *aspect > 0.0)
        .unwrap_or(config.app.window_width as f32 / config.app.window_height as f32);
    Vec2::new(half_height * aspect, half_height)
}

fn setup_camera(mut commands: Commands, config: Res<GameConfig>) {
    commands.spawn((
        Name::new("GameCamera"),
        GameCamera,
        Camera2d,
        Projection::Orthographic(OrthographicProjection {
            scaling_mode: ScalingMode::FixedVertical {
                viewport_height: config.app.viewport_height,
            },
            ..OrthographicProjection::default_2d()
        }),
        Transform::from_xyz(0.0, 0.0, 999.9),
    ));
}

fn sync_clear_color_from_config(config: Res<GameConfig>, mut clear_color: ResMut<ClearColor>) {
    let [r, g, b] = config.app.background_color;
    clear_color.0 = Color::srgb(r, g, b);
}

fn enter_boot() {
    info!("Entered state: Boot");
}

fn boot_to_in_run(mut next_state: ResMut<NextState<GameState>>) {
    next_state.set(GameState::InRun);
}

fn enter_in_run() {
    info!("Entered state: InRun");
}

fn enter_restarting() {
    info!("Entered state: Restarting");
}

fn restarting_to_in_run(mut next_state: ResMut<NextState<GameState>>) {
    next_state.set(GameState::InRun);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    #[test]
    fn half_extents_follow_window_aspect() {
        let config = test_config();
        let half = viewport_half_extents(&config, None);
        assert_eq!(half.y, 768.0);
        assert!((half.x - 768.0 * 1280.0 / 720.0).abs() < 1e-3);
    }
}
