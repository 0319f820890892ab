use crate::gameplay::vehicle::{Simulation, SimulationSystems};
use crate::sim::ControlId;
use crate::sim::layout::HudLayout;
use crate::states::{GameCamera, GameState};
use bevy::prelude::*;

const HUD_ROOT_LOCAL_Z: f32 = -10.0;
const SKY_Z: f32 = -50.0;
const CLOUD_SCALE: f32 = 0.4;
const CLOUD_SIZE: Vec2 = Vec2::new(600.0, 260.0);
const PEDAL_PRESSED_SCALE: f32 = 0.92;

const GAS_IDLE: Color = Color::srgb(0.20, 0.62, 0.28);
const GAS_PRESSED: Color = Color::srgb(0.36, 0.90, 0.44);
const BRAKE_IDLE: Color = Color::srgb(0.66, 0.20, 0.18);
const BRAKE_PRESSED: Color = Color::srgb(0.95, 0.36, 0.30);
const PAUSE_BUTTON_COLOR: Color = Color::srgba(0.10, 0.12, 0.16, 0.75);
const PANEL_COLOR: Color = Color::srgba(0.06, 0.08, 0.12, 0.90);
const MENU_BUTTON_COLOR: Color = Color::srgb(0.22, 0.30, 0.42);
const RPM_BAR_BG: Color = Color::srgba(0.0, 0.0, 0.0, 0.45);
const RPM_BAR_FILL: Color = Color::srgb(1.0, 0.70, 0.15);
const HUD_TEXT: Color = Color::srgb(0.98, 0.98, 1.0);
const SUN_COLOR: Color = Color::srgb(1.0, 0.88, 0.30);
const CLOUD_COLOR: Color = Color::srgba(1.0, 1.0, 1.0, 0.92);

pub struct GameHudPlugin;

impl Plugin for GameHudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            spawn_game_hud
                .run_if(in_state(GameState::InRun))
                .run_if(resource_added::<Simulation>),
        )
        .add_systems(OnExit(GameState::InRun), cleanup_game_hud)
        .add_systems(
            Update,
            (
                layout_hud_elements,
                update_pedals,
                update_rpm_readout,
                update_pause_overlay,
                update_sky,
            )
                .chain()
                .in_set(SimulationSystems::Present),
        );
    }
}

#[derive(Component)]
struct GameHudRoot;

#[derive(Component)]
struct SkyRoot;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
enum HudSlot {
    Pedal(ControlId),
    PauseButton,
    RpmBarBackground,
    RpmBarFill,
    RpmLabel,
    SpeedLabel,
    Panel,
    PanelTitle,
    MenuButton(ControlId),
}

#[derive(Component)]
struct DrivingHud;

#[derive(Component)]
struct GaugeHud;

#[derive(Component)]
struct PauseOverlay;

#[derive(Component)]
struct MenuLabel(ControlId);

#[derive(Component)]
struct Sun;

#[derive(Component)]
struct CloudSprite(usize);

fn spawn_game_hud(
    mut commands: Commands,
    simulation: Res<Simulation>,
    camera_query: Query<Entity, With<GameCamera>>,
    existing_hud: Query<Entity, With<GameHudRoot>>,
) {
    if !existing_hud.is_empty() {
        return;
    }
    let Ok(camera_entity) = camera_query.single() else {
        return;
    };
    let context = &simulation.0;
    let layout = &context.layout;

    let hud_root = commands
        .spawn((
            Name::new("GameHudRoot"),
            GameHudRoot,
            Transform::from_xyz(0.0, 0.0, HUD_ROOT_LOCAL_Z),
            Visibility::Inherited,
        ))
        .id();
    commands.entity(camera_entity).add_child(hud_root);

    commands.entity(hud_root).with_children(|root| {
        for (control, rect, color, label) in [
            (ControlId::Gas, layout.gas, GAS_IDLE, "GAS"),
            (ControlId::Brake, layout.brake, BRAKE_IDLE, "BRAKE"),
        ] {
            root.spawn((
                Name::new(format!("Pedal {label}")),
                HudSlot::Pedal(control),
                DrivingHud,
                Sprite::from_color(color, rect.size()),
                Transform::from_translation(rect.center().extend(0.0)),
            ))
            .with_children(|pedal| {
                pedal.spawn((
                    Text2d::new(label),
                    TextFont {
                        font_size: 40.0,
                        ..default()
                    },
                    TextColor(HUD_TEXT),
                    Transform::from_xyz(0.0, 0.0, 0.1),
                ));
            });
        }

        if let Some(rect) = layout.pause_button {
            root.spawn((
                Name::new("PauseButton"),
                HudSlot::PauseButton,
                DrivingHud,
                Sprite::from_color(PAUSE_BUTTON_COLOR, rect.size()),
                Transform::from_translation(rect.center().extend(0.0)),
            ))
            .with_children(|button| {
                for x in [-16.0, 16.0] {
                    button.spawn((
                        Sprite::from_color(HUD_TEXT, Vec2::new(18.0, 60.0)),
                        Transform::from_xyz(x, 0.0, 0.1),
                    ));
                }
            });
        }

        root.spawn((
            Name::new("RpmBarBackground"),
            HudSlot::RpmBarBackground,
            DrivingHud,
            GaugeHud,
            Sprite::from_color(RPM_BAR_BG, layout.rpm_bar.size()),
            Transform::default(),
        ));
        root.spawn((
            Name::new("RpmBarFill"),
            HudSlot::RpmBarFill,
            DrivingHud,
            GaugeHud,
            Sprite::from_color(RPM_BAR_FILL, Vec2::new(0.0, layout.rpm_bar.height())),
            Transform::default(),
        ));
        for (slot, text) in [
            (HudSlot::RpmLabel, "RPM: 0".to_string()),
            (HudSlot::SpeedLabel, context.speed_text()),
        ] {
            root.spawn((
                slot,
                DrivingHud,
                GaugeHud,
                Text2d::new(text),
                TextFont {
                    font_size: 44.0,
                    ..default()
                },
                TextColor(HUD_TEXT),
                Transform::default(),
            ));
        }

        root.spawn((
            Name::new("PausePanel"),
            HudSlot::Panel,
            PauseOverlay,
            Sprite::from_color(PANEL_COLOR, layout.panel.size()),
            Transform::default(),
            Visibility::Hidden,
        ));
        root.spawn((
            HudSlot::PanelTitle,
            PauseOverlay,
            Text2d::new("PAUSED"),
            TextFont {
                font_size: 72.0,
                ..default()
            },
            TextColor(HUD_TEXT),
            Transform::default(),
            Visibility::Hidden,
        ));
        for (control, rect) in layout.menu_buttons {
            root.spawn((
                Name::new(format!("MenuButton {control:?}")),
                HudSlot::MenuButton(control),
                PauseOverlay,
                Sprite::from_color(MENU_BUTTON_COLOR, rect.size()),
                Transform::default(),
                Visibility::Hidden,
            ))
            .with_children(|button| {
                button.spawn((
                    MenuLabel(control),
                    Text2d::new(menu_label(context, control)),
                    TextFont {
                        font_size: 40.0,
                        ..default()
                    },
                    TextColor(HUD_TEXT),
                    Transform::from_xyz(0.0, 0.0, 0.1),
                ));
            });
        }
    });

    commands
        .spawn((
            Name::new("SkyRoot"),
            SkyRoot,
            Transform::from_translation(context.camera_target.extend(SKY_Z)),
            Visibility::Inherited,
        ))
        .with_children(|sky| {
            sky.spawn((
                Name::new("Sun"),
                Sun,
                Sprite::from_color(SUN_COLOR, layout.sun.size()),
                Transform::from_translation(layout.sun.center().extend(0.0)),
            ));
            for (index, cloud) in context.clouds.clouds().iter().enumerate() {
                sky.spawn((
                    Name::new("Cloud"),
                    CloudSprite(index),
                    Sprite::from_color(CLOUD_COLOR, CLOUD_SIZE),
                    Transform::from_translation(cloud.position.extend(0.1 + index as f32 * 0.01))
                        .with_scale(Vec3::splat(CLOUD_SCALE)),
                ));
            }
        });
}

fn cleanup_game_hud(
    mut commands: Commands,
    hud_query: Query<Entity, Or<(With<GameHudRoot>, With<SkyRoot>)>>,
) {
    for entity in &hud_query {
        commands.entity(entity).try_despawn();
    }
}

fn menu_label(context: &crate::sim::SimulationContext<Entity>, control: ControlId) -> String {
    match control {
        ControlId::Resume => "RESUME".to_string(),
        ControlId::Restart => "RESTART".to_string(),
        ControlId::MusicToggle => context.audio.music_label().to_string(),
        ControlId::SoundToggle => context.audio.sound_label().to_string(),
        ControlId::Gas | ControlId::Brake | ControlId::Pause => String::new(),
    }
}

fn slot_center(layout: &HudLayout, slot: HudSlot) -> Option<Vec2> {
    let center = match slot {
        HudSlot::Pedal(ControlId::Gas) => layout.gas.center(),
        HudSlot::Pedal(_) => layout.brake.center(),
        HudSlot::PauseButton => layout.pause_button?.center(),
        HudSlot::RpmBarBackground | HudSlot::RpmBarFill => layout.rpm_bar.center(),
        HudSlot::RpmLabel => layout.rpm_label,
        HudSlot::SpeedLabel => layout.speed_label,
        HudSlot::Panel => layout.panel.center(),
        HudSlot::PanelTitle => layout.panel_title,
        HudSlot::MenuButton(control) => layout.menu_button(control)?.center(),
    };
    Some(center)
}

fn layout_hud_elements(
    simulation: Res<Simulation>,
    mut slot_query: Query<(&HudSlot, &mut Transform)>,
) {
    let layout = &simulation.0.layout;
    for (slot, mut transform) in &mut slot_query {
        let Some(center) = slot_center(layout, *slot) else {
            continue;
        };
        transform.translation.x = center.x;
        transform.translation.y = center.y;
        transform.translation.z = match slot {
            HudSlot::RpmBarFill | HudSlot::PanelTitle => 0.2,
            HudSlot::MenuButton(_) | HudSlot::RpmLabel | HudSlot::SpeedLabel => 0.1,
            _ => 0.0,
        };
        if *slot == HudSlot::Pedal(ControlId::Gas) {
            transform.rotation = Quat::from_rotation_z(layout.gas_tilt);
        }
    }
}

fn update_pedals(
    simulation: Res<Simulation>,
    mut pedal_query: Query<(&HudSlot, &mut Sprite, &mut Transform)>,
) {
    let controls = simulation.0.controls;
    for (slot, mut sprite, mut transform) in &mut pedal_query {
        let HudSlot::Pedal(control) = *slot else {
            continue;
        };
        let pressed = controls.is_pressed(control);
        sprite.color = match (control, pressed) {
            (ControlId::Gas, false) => GAS_IDLE,
            (ControlId::Gas, true) => GAS_PRESSED,
            (_, false) => BRAKE_IDLE,
            (_, true) => BRAKE_PRESSED,
        };
        transform.scale = Vec3::splat(if pressed { PEDAL_PRESSED_SCALE } else { 1.0 });
    }
}

fn update_rpm_readout(
    simulation: Res<Simulation>,
    mut fill_query: Query<(&HudSlot, &mut Sprite, &mut Transform), Without<Text2d>>,
    mut text_query: Query<(&HudSlot, &mut Text2d)>,
) {
    let context = &simulation.0;
    let bar = context.layout.rpm_bar;
    for (slot, mut sprite, mut transform) in &mut fill_query {
        if *slot != HudSlot::RpmBarFill {
            continue;
        }
        let width = bar.width() * context.hud.rpm_fraction;
        sprite.custom_size = Some(Vec2::new(width, bar.height()));
        // Grow from the left edge of the bar.
        transform.translation.x = bar.min.x + width * 0.5;
    }

    for (slot, mut text) in &mut text_query {
        match slot {
            HudSlot::RpmLabel => text.0 = context.hud.rpm_text(),
            HudSlot::SpeedLabel => text.0 = context.speed_text(),
            _ => {}
        }
    }
}

#[allow(clippy::type_complexity)]
fn update_pause_overlay(
    simulation: Res<Simulation>,
    mut driving_query: Query<
        (&mut Visibility, Has<GaugeHud>),
        (With<DrivingHud>, Without<PauseOverlay>),
    >,
    mut overlay_query: Query<&mut Visibility, (With<PauseOverlay>, Without<DrivingHud>)>,
    mut label_query: Query<(&MenuLabel, &mut Text2d)>,
) {
    let context = &simulation.0;
    let paused = context.pause.is_paused();
    let hud_enabled = context.settings.features.hud_enabled;

    for (mut visibility, is_gauge) in &mut driving_query {
        let shown = !paused && (hud_enabled || !is_gauge);
        visibility.set_if_neq(if shown {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        });
    }
    for mut visibility in &mut overlay_query {
        visibility.set_if_neq(if paused {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        });
    }
    if paused {
        for (label, mut text) in &mut label_query {
            let wanted = menu_label(context, label.0);
            if text.0 != wanted {
                text.0 = wanted;
            }
        }
    }
}

fn update_sky(
    simulation: Res<Simulation>,
    mut sky_query: Query<&mut Transform, (With<SkyRoot>, Without<CloudSprite>, Without<Sun>)>,
    mut sun_query: Query<&mut Transform, (With<Sun>, Without<CloudSprite>, Without<SkyRoot>)>,
    mut cloud_query: Query<(&CloudSprite, &mut Transform, &mut Visibility), (Without<SkyRoot>, Without<Sun>)>,
) {
    let context = &simulation.0;
    if let Ok(mut sky_transform) = sky_query.single_mut() {
        sky_transform.translation = context.camera_target.extend(SKY_Z);
    }
    if let Ok(mut sun_transform) = sun_query.single_mut() {
        sun_transform.translation = context.layout.sun.center().extend(0.0);
    }

    let clouds = context.clouds.clouds();
    let parallax_enabled = context.settings.features.parallax_enabled;
    for (cloud, mut transform, mut visibility) in &mut cloud_query {
        let Some(state) = clouds.get(cloud.0) else {
            continue;
        };
        transform.translation.x = state.position.x;
        transform.translation.y = state.position.y;
        visibility.set_if_neq(if parallax_enabled {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    #[test]
    fn every_slot_resolves_with_full_layout() {
        let config = test_config();
        let layout = HudLayout::new(Vec2::new(1365.0, 768.0), &config.features);
        let slots = [
            HudSlot::Pedal(ControlId::Gas),
            HudSlot::Pedal(ControlId::Brake),
            HudSlot::PauseButton,
            HudSlot::RpmBarBackground,
            HudSlot::RpmBarFill,
            HudSlot::RpmLabel,
            HudSlot::SpeedLabel,
            HudSlot::Panel,
            HudSlot::PanelTitle,
            HudSlot::MenuButton(ControlId::SoundToggle),
        ];
        for slot in slots {
            assert!(slot_center(&layout, slot).is_some(), "{slot:?}");
        }
        assert_eq!(
            slot_center(&layout, HudSlot::MenuButton(ControlId::SoundToggle)),
            Some(Vec2::new(0.0, -188.0))
        );
    }
}
