use bevy::log::info;
use bevy::math::Vec2;

use super::backend::{PhysicsBackend, SimError, WheelSlot};
use super::contacts::{ContactEvent, ContactTracker};
use super::controls::{AudioToggles, ControlId, ControlState, InputEvent, PauseState, SceneRequest};
use super::hud::{camera_target, speed_kmh, HudReadout, RpmGauge};
use super::layout::HudLayout;
use super::parallax::CloudField;
use super::rig::{DriveDirection, DriveTuning, VehicleRig};
use super::terrain::TerrainGenerator;
use crate::config::{CameraConfig, FeatureToggles, GameConfig};

#[derive(Debug, Clone)]
pub struct SimSettings {
    pub camera: CameraConfig,
    pub speed_display_divisor: i32,
    pub features: FeatureToggles,
}

impl SimSettings {
    fn from_config(config: &GameConfig) -> Self {
        Self {
            camera: config.camera.clone(),
            speed_display_divisor: config.hud.speed_display_divisor,
            features: config.features,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    pub tick: u64,
    pub vehicle_position: Vec2,
    pub vehicle_angle: f32,
    pub terrain_extended: bool,
    pub air_control_fired: bool,
    pub clouds_wrapped: usize,
}

#[derive(Debug)]
pub struct SimulationContext<H> {
    pub settings: SimSettings,
    pub terrain: TerrainGenerator<H>,
    pub rig: VehicleRig<H>,
    pub contacts: ContactTracker,
    pub controls: ControlState,
    pub pause: PauseState,
    pub audio: AudioToggles,
    pub rpm: RpmGauge,
    pub hud: HudReadout,
    pub camera_target: Vec2,
    pub clouds: CloudField,
    pub layout: HudLayout,
    pub tick_count: u64,
    pub last_report: Option<FrameReport>,
}

impl<H: Copy + Eq + std::fmt::Debug> SimulationContext<H> {
    pub fn new<B: PhysicsBackend<Body = H>>(
        config: &GameConfig,
        half_extents: Vec2,
        backend: &mut B,
    ) -> Result<Self, SimError> {
        let mut terrain = TerrainGenerator::new(&config.terrain, backend);
        let rig = match VehicleRig::build(backend, &config.vehicle) {
            Ok(rig) => rig,
            Err(error) => {
                terrain.despawn_all(backend);
                return Err(error);
            }
        };
        backend.set_time_scale(1.0);

        let layout = HudLayout::new(half_extents, &config.features);
        let clouds = CloudField::new(&config.parallax, half_extents.x, layout.cloud_band);
        let camera_target = camera_target(rig.geometry().chassis, &config.camera);

        Ok(Self {
            settings: SimSettings::from_config(config),
            terrain,
            rig,
            contacts: ContactTracker::default(),
            controls: ControlState::default(),
            pause: PauseState::Running,
            audio: AudioToggles::default(),
            rpm: RpmGauge::new(&config.hud),
            hud: HudReadout::default(),
            camera_target,
            clouds,
            layout,
            tick_count: 0,
            last_report: None,
        })
    }

    pub fn handle_input<B: PhysicsBackend<Body = H>>(
        &mut self,
        backend: &mut B,
        event: InputEvent,
    ) -> Option<SceneRequest> {
        match (self.pause, event) {
            (_, InputEvent::ReleasedAll) => self.controls.release_all(),
            (PauseState::Running, InputEvent::Pressed(ControlId::Pause)) => {
                if self.settings.features.pause_menu_enabled {
                    self.pause(backend);
                }
            }
            (PauseState::Running, InputEvent::Pressed(control)) => self.controls.press(control),
            (PauseState::Running, InputEvent::Released(control)) => {
                self.controls.release(control)
            }
            (PauseState::Paused, InputEvent::Pressed(ControlId::Resume)) => self.resume(backend),
            (PauseState::Paused, InputEvent::Pressed(ControlId::Restart)) => {
                self.resume(backend);
                info!("Restart requested from pause menu.");
                return Some(SceneRequest::Restart);
            }
            (PauseState::Paused, InputEvent::Pressed(ControlId::MusicToggle)) => {
                self.audio.music = !self.audio.music;
                info!("{}", self.audio.music_label());
            }
            (PauseState::Paused, InputEvent::Pressed(ControlId::SoundToggle)) => {
                self.audio.sound = !self.audio.sound;
                info!("{}", self.audio.sound_label());
            }
            (PauseState::Paused, _) => {}
        }
        None
    }

    fn pause<B: PhysicsBackend<Body = H>>(&mut self, backend: &mut B) {
        self.pause = PauseState::Paused;
        self.controls.release_all();
        backend.set_time_scale(0.0);
        info!("Simulation paused at tick {}.", self.tick_count);
    }

    fn resume<B: PhysicsBackend<Body = H>>(&mut self, backend: &mut B) {
        self.pause = PauseState::Running;
        backend.set_time_scale(1.0);
        info!("Simulation resumed.");
    }

    pub fn record_contact(&mut self, event: ContactEvent) -> Option<WheelSlot> {
        self.contacts.apply(event)
    }

    pub fn retune<B: PhysicsBackend<Body = H>>(&mut self, config: &GameConfig, backend: &mut B) {
        self.rig.tuning = DriveTuning::from_config(&config.vehicle);
        self.rpm.cap = config.hud.rpm_cap;
        self.rpm.smoothing = config.hud.rpm_smoothing;
        self.clouds.set_factor(config.parallax.factor);

        let features_changed = self.settings.features.pause_menu_enabled
            != config.features.pause_menu_enabled;
        self.settings = SimSettings::from_config(config);
        if features_changed {
            self.layout = HudLayout::new(self.layout.half_extents, &config.features);
        }
        if self.pause.is_paused() && !config.features.pause_menu_enabled {
            self.resume(backend);
        }
    }

    pub fn set_viewport(&mut self, half_extents: Vec2) {
        if self.layout.half_extents != half_extents {
            self.layout = HudLayout::new(half_extents, &self.settings.features);
        }
    }

    // One simulation tick. Does nothing while paused; returns `None` then or
    // when the chassis cannot be read back yet.
    pub fn step<B: PhysicsBackend<Body = H>>(&mut self, backend: &mut B) -> Option<FrameReport> {
        if self.pause.is_paused() {
            return None;
        }
        self.tick_count += 1;

        let grounded = self.contacts.any_wheel_on_ground();
        let mut air_control_fired = false;
        for (held, direction) in [
            (self.controls.gas, DriveDirection::Accelerate),
            (self.controls.brake, DriveDirection::Brake),
        ] {
            if held {
                self.rig.apply_drive_torque(backend, direction);
                air_control_fired |= self.rig.apply_air_control(backend, direction, grounded);
            }
        }

        let chassis = self.rig.chassis_state(backend)?;
        let rear_spin = self
            .rig
            .wheel_state(backend, WheelSlot::Rear)
            .map_or(0.0, |state| state.angular_velocity);

        let rpm = self.rpm.update(rear_spin);
        self.hud = HudReadout {
            rpm,
            rpm_fraction: self.rpm.fraction(),
            speed_kmh: speed_kmh(chassis.linear_velocity.x),
        };
        self.camera_target = camera_target(chassis.position, &self.settings.camera);

        let terrain_extended = self.terrain.ensure_coverage(backend, chassis.position.x);
        let clouds_wrapped = if self.settings.features.parallax_enabled {
            self.clouds.update(chassis.position.x)
        } else {
            self.clouds.track(chassis.position.x);
            0
        };

        let report = FrameReport {
            tick: self.tick_count,
            vehicle_position: chassis.position,
            vehicle_angle: chassis.rotation,
            terrain_extended,
            air_control_fired,
            clouds_wrapped,
        };
        self.last_report = Some(report);
        Some(report)
    }

    pub fn speed_text(&self) -> String {
        self.hud.speed_text(self.settings.speed_display_divisor)
    }

    pub fn teardown<B: PhysicsBackend<Body = H>>(&mut self, backend: &mut B) {
        self.terrain.despawn_all(backend);
        self.rig.despawn(backend);
        self.contacts.reset();
        self.controls.release_all();
    }
}
