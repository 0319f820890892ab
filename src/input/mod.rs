use crate::config::GameConfig;
use crate::gameplay::vehicle::{RapierBackend, Simulation, SimulationSystems};
use crate::sim::{ControlId, InputEvent, PauseState, SceneRequest};
use crate::states::GameState;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

pub struct ControlInputPlugin;

impl Plugin for ControlInputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ControlBindings>().add_systems(
            Update,
            read_control_input
                .in_set(SimulationSystems::ReadInput)
                .run_if(resource_exists::<GameConfig>),
        );
    }
}

#[derive(Resource, Debug, Clone)]
pub struct ControlBindings {
    pub gas: Vec<KeyCode>,
    pub brake: Vec<KeyCode>,
    pub pause: Vec<KeyCode>,
}

impl Default for ControlBindings {
    fn default() -> Self {
        Self {
            gas: vec![KeyCode::KeyD, KeyCode::ArrowRight],
            brake: vec![KeyCode::KeyA, KeyCode::ArrowLeft],
            pause: vec![KeyCode::Escape, KeyCode::KeyP],
        }
    }
}

// Window pixels (origin top-left, +y down) to camera space (origin centre, +y up).
pub fn screen_to_camera_space(cursor: Vec2, window_size: Vec2, viewport_height: f32) -> Vec2 {
    let scale = viewport_height / window_size.y.max(1.0);
    let centred = cursor - window_size * 0.5;
    Vec2::new(centred.x * scale, -centred.y * scale)
}

#[allow(clippy::too_many_arguments)]
fn read_control_input(
    config: Res<GameConfig>,
    bindings: Res<ControlBindings>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    mut simulation: ResMut<Simulation>,
    mut backend: RapierBackend,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let pause = simulation.0.pause;
    let mut events = keyboard_events(&bindings, &keyboard, pause);

    if let Ok(window) = window_query.single() {
        let window_size = Vec2::new(window.width(), window.height());
        let hit_table = simulation.0.layout.hit_table();
        let resolve = |screen: Vec2| {
            let point = screen_to_camera_space(screen, window_size, config.app.viewport_height);
            hit_table.resolve(point, pause)
        };

        for touch in touches.iter_just_pressed() {
            if let Some(control) = resolve(touch.position()) {
                events.push(InputEvent::Pressed(control));
            }
        }
        if mouse_buttons.just_pressed(MouseButton::Left) {
            if let Some(control) = window.cursor_position().and_then(resolve) {
                events.push(InputEvent::Pressed(control));
            }
        }
    }

    let pointer_lifted = touches.iter_just_released().next().is_some()
        || touches.iter_just_canceled().next().is_some()
        || mouse_buttons.just_released(MouseButton::Left);
    if pointer_lifted {
        events.push(InputEvent::ReleasedAll);
    }

    for event in events {
        if let Some(SceneRequest::Restart) = simulation.0.handle_input(&mut backend, event) {
            next_state.set(GameState::Restarting);
        }
    }
}

fn keyboard_events(
    bindings: &ControlBindings,
    keyboard: &ButtonInput<KeyCode>,
    pause: PauseState,
) -> Vec<InputEvent> {
    let mut events = Vec::new();
    for (keys, control) in [(&bindings.gas, ControlId::Gas), (&bindings.brake, ControlId::Brake)] {
        if keyboard.any_just_pressed(keys.iter().copied()) {
            events.push(InputEvent::Pressed(control));
        }
        if keyboard.any_just_released(keys.iter().copied()) {
            events.push(InputEvent::Released(control));
        }
    }
    if keyboard.any_just_pressed(bindings.pause.iter().copied()) {
        let control = match pause {
            PauseState::Running => ControlId::Pause,
            PauseState::Paused => ControlId::Resume,
        };
        events.push(InputEvent::Pressed(control));
    }
    events
}
