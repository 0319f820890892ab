use std::f32::consts::TAU;

use bevy::math::Vec2;

use crate::config::{CameraConfig, HudConfig};

pub fn raw_rpm(angular_velocity: f32, cap: f32) -> f32 {
    (angular_velocity.abs() * 60.0 / TAU).min(cap)
}

pub fn speed_kmh(horizontal_velocity: f32) -> i32 {
    (horizontal_velocity.abs() * 3.6) as i32
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RpmGauge {
    smoothed: f32,
    pub cap: f32,
    pub smoothing: f32,
}

impl RpmGauge {
    pub fn new(config: &HudConfig) -> Self {
        Self {
            smoothed: 0.0,
            cap: config.rpm_cap,
            smoothing: config.rpm_smoothing,
        }
    }

    pub fn update(&mut self, angular_velocity: f32) -> f32 {
        let sample = raw_rpm(angular_velocity, self.cap);
        self.smoothed = self.smoothing * self.smoothed + (1.0 - self.smoothing) * sample;
        self.smoothed
    }

    pub fn value(&self) -> f32 {
        self.smoothed
    }

    pub fn fraction(&self) -> f32 {
        (self.smoothed / self.cap).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HudReadout {
    pub rpm: f32,
    pub rpm_fraction: f32,
    pub speed_kmh: i32,
}

impl HudReadout {
    pub fn rpm_text(&self) -> String {
        format!("RPM: {}", self.rpm as i32)
    }

    pub fn speed_text(&self, divisor: i32) -> String {
        format!("{} km/h", self.speed_kmh / divisor.max(1))
    }
}

pub fn camera_target(body_position: Vec2, config: &CameraConfig) -> Vec2 {
    body_position + Vec2::from(config.lead)
}
