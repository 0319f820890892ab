mod backend;
mod runtime;
mod scene;

use crate::config::GameConfig;
use crate::sim::SimulationContext;
use crate::states::GameState;
use bevy::prelude::*;

pub use backend::{BodyRegistry, RapierBackend, SceneEntity};

use runtime::*;
use scene::*;

const TERRAIN_COLOR: Color = Color::srgb(0.24, 0.42, 0.20);
const TERRAIN_Z: f32 = 1.0;
const CHASSIS_COLOR: Color = Color::srgb(0.86, 0.18, 0.16);
const WHEEL_COLOR: Color = Color::srgb(0.12, 0.12, 0.14);
const SPOKE_COLOR: Color = Color::srgb(0.95, 0.95, 0.95);
const SPOKE_THICKNESS: f32 = 10.0;
const CHASSIS_Z: f32 = 2.0;
const WHEEL_Z: f32 = 3.0;

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSystems {
    ReadInput,
    Step,
    Present,
}

#[derive(Resource, Debug)]
pub struct Simulation(pub SimulationContext<Entity>);

pub struct VehicleGameplayPlugin;

impl Plugin for VehicleGameplayPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BodyRegistry>()
            .configure_sets(
                Update,
                (
                    SimulationSystems::ReadInput,
                    SimulationSystems::Step,
                    SimulationSystems::Present,
                )
                    .chain()
                    .run_if(in_state(GameState::InRun))
                    .run_if(resource_exists::<Simulation>),
            )
            .add_systems(OnEnter(GameState::InRun), spawn_vehicle_scene)
            .add_systems(OnExit(GameState::InRun), cleanup_vehicle_scene)
            .add_systems(
                Update,
                (sync_viewport_to_window, collect_contact_events)
                    .in_set(SimulationSystems::ReadInput),
            )
            .add_systems(
                Update,
                (
                    retune_simulation_from_config.run_if(resource_changed::<GameConfig>),
                    run_simulation_tick,
                )
                    .chain()
                    .in_set(SimulationSystems::Step),
            )
            .add_systems(
                Update,
                (
                    camera_follow_vehicle,
                    decorate_terrain_segments,
                    decorate_vehicle_bodies,
                )
                    .in_set(SimulationSystems::Present),
            )
            .add_systems(
                Update,
                sync_rapier_gravity_from_config.run_if(resource_changed::<GameConfig>),
            );
    }
}
