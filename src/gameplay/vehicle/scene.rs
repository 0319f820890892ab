use super::backend::{BodyShape, SimBody};
use super::*;
use crate::sim::{BodyRole, PhysicsBackend, ShapeDesc};
use crate::states::viewport_half_extents;
use bevy::window::PrimaryWindow;

pub(super) fn spawn_vehicle_scene(
    config: Res<GameConfig>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    mut backend: RapierBackend,
) {
    let half_extents = viewport_half_extents(&config, window_query.single().ok());
    let context = match SimulationContext::new(&config, half_extents, &mut backend) {
        Ok(context) => context,
        Err(error) => panic!("Vehicle scene construction failed: {error}"),
    };
    info!(
        "Vehicle scene ready: {} terrain segments up to x={:.0}.",
        context.terrain.live_count(),
        context.terrain.right_edge()
    );
    backend.commands().insert_resource(Simulation(context));
}

pub(super) fn cleanup_vehicle_scene(
    simulation: Option<ResMut<Simulation>>,
    scene_query: Query<Entity, With<SceneEntity>>,
    mut backend: RapierBackend,
) {
    if let Some(mut simulation) = simulation {
        simulation.0.teardown(&mut backend);
        info!(
            "Vehicle scene torn down after {} ticks.",
            simulation.0.tick_count
        );
    }
    // Anything the context no longer tracked, e.g. after a failed build.
    for entity in &scene_query {
        backend.commands().entity(entity).try_despawn();
    }
    backend.set_time_scale(1.0);
    backend.commands().remove_resource::<Simulation>();
}

pub(super) fn decorate_terrain_segments(
    mut commands: Commands,
    config: Res<GameConfig>,
    new_bodies: Query<(Entity, &SimBody, &BodyShape), Added<SimBody>>,
) {
    let stroke = config.terrain.stroke_width;
    for (entity, body, shape) in &new_bodies {
        let (BodyRole::Ground, ShapeDesc::Polyline(points)) = (body.role, &shape.0) else {
            continue;
        };

        commands.entity(entity).with_children(|parent| {
            for edge in points.windows(2) {
                let (start, end) = (edge[0], edge[1]);
                let delta = end - start;
                let length = delta.length();
                if length <= f32::EPSILON {
                    continue;
                }
                parent.spawn((
                    Name::new("TerrainStroke"),
                    Sprite::from_color(TERRAIN_COLOR, Vec2::new(length + stroke, stroke)),
                    Transform::from_translation(((start + end) * 0.5).extend(TERRAIN_Z))
                        .with_rotation(Quat::from_rotation_z(delta.y.atan2(delta.x))),
                ));
            }
        });
    }
}

pub(super) fn decorate_vehicle_bodies(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    new_bodies: Query<(Entity, &SimBody, &BodyShape), Added<SimBody>>,
) {
    for (entity, body, shape) in &new_bodies {
        match (body.role, &shape.0) {
            (BodyRole::Chassis, ShapeDesc::Rectangle { half_extents }) => {
                commands.entity(entity).with_children(|parent| {
                    parent.spawn((
                        Name::new("ChassisVisual"),
                        Sprite::from_color(CHASSIS_COLOR, *half_extents * 2.0),
                        Transform::from_xyz(0.0, 0.0, CHASSIS_Z),
                    ));
                });
            }
            (BodyRole::Wheel(slot), ShapeDesc::Circle { radius }) => {
                let disc = meshes.add(Circle::new(*radius));
                let material = materials.add(ColorMaterial::from(WHEEL_COLOR));
                let radius = *radius;
                commands.entity(entity).with_children(|parent| {
                    parent.spawn((
                        Name::new(format!("WheelVisual {}", slot.label())),
                        Mesh2d(disc),
                        MeshMaterial2d(material),
                        Transform::from_xyz(0.0, 0.0, WHEEL_Z),
                    ));
                    // Two crossed spokes make the spin readable.
                    for angle in [0.0, std::f32::consts::FRAC_PI_2] {
                        parent.spawn((
                            Name::new("WheelSpoke"),
                            Sprite::from_color(
                                SPOKE_COLOR,
                                Vec2::new(radius * 1.6, SPOKE_THICKNESS),
                            ),
                            Transform::from_xyz(0.0, 0.0, WHEEL_Z + 0.1)
                                .with_rotation(Quat::from_rotation_z(angle)),
                        ));
                    }
                });
            }
            _ => {}
        }
    }
}
