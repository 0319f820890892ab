use crate::config::GameConfig;
use crate::gameplay::vehicle::{BodyRegistry, Simulation};
use crate::sim::WheelSlot;
use crate::states::GameState;
use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};

pub struct DebugOverlayPlugin;

impl Plugin for DebugOverlayPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DebugPanelState>()
            .add_systems(Startup, init_debug_panel_from_config)
            .add_systems(Update, toggle_debug_panel)
            .add_systems(
                EguiPrimaryContextPass,
                simulation_debug_panel_ui
                    .run_if(in_state(GameState::InRun))
                    .run_if(resource_exists::<Simulation>),
            );
    }
}

#[derive(Resource, Debug, Clone, Default)]
struct DebugPanelState {
    visible: bool,
}

fn init_debug_panel_from_config(
    config: Res<GameConfig>,
    mut panel_state: ResMut<DebugPanelState>,
) {
    panel_state.visible = config.app.debug_overlay;
}

fn toggle_debug_panel(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut panel_state: ResMut<DebugPanelState>,
) {
    if keyboard.just_pressed(KeyCode::F1) {
        panel_state.visible = !panel_state.visible;
        info!(
            "Simulation debug panel {}.",
            if panel_state.visible { "shown" } else { "hidden" }
        );
    }
}

fn simulation_debug_panel_ui(
    mut egui_contexts: EguiContexts,
    mut panel_state: ResMut<DebugPanelState>,
    mut simulation: ResMut<Simulation>,
    registry: Res<BodyRegistry>,
    diagnostics: Res<DiagnosticsStore>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if !panel_state.visible {
        return;
    }

    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps| fps.smoothed())
        .unwrap_or(0.0);
    let context = &mut simulation.0;
    let position = context
        .last_report
        .map(|report| report.vehicle_position)
        .unwrap_or(context.rig.geometry().chassis);

    let mut window_open = panel_state.visible;
    let mut restart_clicked = false;
    let mut tuning_changed = false;

    let Ok(ctx) = egui_contexts.ctx_mut() else {
        return;
    };
    egui::Window::new("Vehicle Simulation")
        .open(&mut window_open)
        .resizable(true)
        .default_width(420.0)
        .show(ctx, |ui| {
            ui.label(format!("FPS: {fps:.0}   tick: {}", context.tick_count));
            ui.label(format!("pause: {:?}", context.pause));
            ui.label(format!(
                "vehicle: ({:.0}, {:.0})   rpm: {:.0}   speed: {} km/h",
                position.x, position.y, context.hud.rpm, context.hud.speed_kmh
            ));
            ui.label(format!(
                "contacts: rear {} / front {}   grounded: {}",
                context.contacts.count(WheelSlot::Rear),
                context.contacts.count(WheelSlot::Front),
                context.contacts.any_wheel_on_ground()
            ));
            ui.label(format!(
                "terrain: {} live, {} generated, right edge {:.0}",
                context.terrain.live_count(),
                context.terrain.generated_count(),
                context.terrain.right_edge()
            ));
            if let Some(report) = context.last_report {
                ui.label(format!(
                    "last tick #{}: pitch {:.1} deg   terrain extended={} air control={} clouds wrapped={}",
                    report.tick,
                    report.vehicle_angle.to_degrees(),
                    report.terrain_extended,
                    report.air_control_fired,
                    report.clouds_wrapped
                ));
            }
            ui.label(format!(
                "bodies: {}   pedals: gas={} brake={}",
                registry.len(),
                context.controls.gas,
                context.controls.brake
            ));
            ui.separator();

            ui.collapsing("Drive", |ui| {
                let tuning = &mut context.rig.tuning;
                tuning_changed |= tuning_slider_row(
                    ui,
                    "drive_torque",
                    &mut tuning.drive_torque,
                    0.0..=2_000_000.0,
                    1_000.0,
                );
                tuning_changed |= tuning_slider_row(
                    ui,
                    "brake_torque_multiplier",
                    &mut tuning.brake_torque_multiplier,
                    0.0..=5.0,
                    0.01,
                );
                tuning_changed |= tuning_slider_row(
                    ui,
                    "air_control_impulse",
                    &mut tuning.air_control_impulse,
                    0.0..=50_000.0,
                    50.0,
                );
            });

            ui.collapsing("Camera", |ui| {
                let lead = &mut context.settings.camera.lead;
                tuning_changed |=
                    tuning_slider_row(ui, "lead_x", &mut lead[0], -1_500.0..=1_500.0, 5.0);
                tuning_changed |=
                    tuning_slider_row(ui, "lead_y", &mut lead[1], -1_000.0..=1_000.0, 5.0);
            });

            ui.separator();
            ui.label("Slider edits last until the next F5 reload.");
            restart_clicked = ui.button("Restart run").clicked();
        });

    panel_state.visible = window_open;
    if tuning_changed {
        debug!("Debug panel tuning: {:?}", simulation.0.rig.tuning);
    }
    if restart_clicked {
        next_state.set(GameState::Restarting);
    }
}

fn tuning_slider_row(
    ui: &mut egui::Ui,
    label: &str,
    value: &mut f32,
    slider_range: std::ops::RangeInclusive<f32>,
    drag_speed: f32,
) -> bool {
    let mut changed = false;
    ui.horizontal(|ui| {
        ui.label(label);
        changed |= ui
            .add(egui::Slider::new(value, slider_range).show_value(false))
            .changed();
        changed |= ui
            .add(egui::DragValue::new(value).speed(drag_speed as f64))
            .changed();
    });
    changed
}
