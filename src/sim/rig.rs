use std::f32::consts::TAU;

use bevy::log::info;
use bevy::math::Vec2;

use super::backend::{
    BodyDesc, BodyRole, BodyState, ContactCategory, JointDesc, PhysicsBackend, ShapeDesc,
    SimError, WheelSlot,
};
use crate::config::VehicleConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveDirection {
    Accelerate,
    Brake,
}

impl DriveDirection {
    // Negative spins the wheels clockwise, which rolls the vehicle to +x.
    pub fn sign(self) -> f32 {
        match self {
            DriveDirection::Accelerate => -1.0,
            DriveDirection::Brake => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveTuning {
    pub drive_torque: f32,
    pub brake_torque_multiplier: f32,
    pub air_control_impulse: f32,
}

impl DriveTuning {
    pub fn from_config(config: &VehicleConfig) -> Self {
        Self {
            drive_torque: config.drive_torque,
            brake_torque_multiplier: config.brake_torque_multiplier,
            air_control_impulse: config.air_control_impulse,
        }
    }

    pub fn torque(&self, direction: DriveDirection) -> f32 {
        match direction {
            DriveDirection::Accelerate => direction.sign() * self.drive_torque,
            DriveDirection::Brake => {
                direction.sign() * self.drive_torque * self.brake_torque_multiplier
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigGeometry {
    pub rear_wheel: Vec2,
    pub front_wheel: Vec2,
    pub chassis: Vec2,
}

impl RigGeometry {
    pub fn from_config(config: &VehicleConfig) -> Self {
        let rear_wheel = Vec2::new(config.spawn_x, config.spawn_y);
        let front_wheel = rear_wheel + Vec2::new(2.0 * config.wheel_spacing, 0.0);
        let chassis = rear_wheel + Vec2::new(config.wheel_spacing, config.chassis_offset_y);
        Self {
            rear_wheel,
            front_wheel,
            chassis,
        }
    }

    pub fn wheel(&self, slot: WheelSlot) -> Vec2 {
        match slot {
            WheelSlot::Rear => self.rear_wheel,
            WheelSlot::Front => self.front_wheel,
        }
    }
}

#[derive(Debug)]
pub struct VehicleRig<H> {
    chassis: H,
    wheels: [H; 2],
    geometry: RigGeometry,
    pub tuning: DriveTuning,
}

impl<H: Copy + Eq + std::fmt::Debug> VehicleRig<H> {
    pub fn build<B: PhysicsBackend<Body = H>>(
        backend: &mut B,
        config: &VehicleConfig,
    ) -> Result<Self, SimError> {
        validate_dimensions(config)?;

        let geometry = RigGeometry::from_config(config);
        let rear = backend.spawn_body(&wheel_desc(config, WheelSlot::Rear, geometry.rear_wheel));
        let front =
            backend.spawn_body(&wheel_desc(config, WheelSlot::Front, geometry.front_wheel));
        let chassis = backend.spawn_body(&BodyDesc {
            role: BodyRole::Chassis,
            position: geometry.chassis,
            shape: ShapeDesc::Rectangle {
                half_extents: Vec2::new(config.chassis_size[0], config.chassis_size[1]) * 0.5,
            },
            mass: config.chassis_mass,
            friction: 0.5,
            restitution: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            dynamic: true,
            category: ContactCategory::Chassis,
        });

        let rig = Self {
            chassis,
            wheels: [rear, front],
            geometry,
            tuning: DriveTuning::from_config(config),
        };

        for slot in WheelSlot::ALL {
            for joint in suspension_joints(config, &geometry, slot) {
                if let Err(error) = backend.attach_joint(chassis, rig.wheel(slot), &joint) {
                    rig.despawn(backend);
                    return Err(error);
                }
            }
        }

        info!(
            "Vehicle rig built: chassis at ({:.0}, {:.0}), wheels {:.0} apart.",
            geometry.chassis.x,
            geometry.chassis.y,
            geometry.front_wheel.x - geometry.rear_wheel.x
        );
        Ok(rig)
    }

    pub fn chassis(&self) -> H {
        self.chassis
    }

    pub fn wheel(&self, slot: WheelSlot) -> H {
        self.wheels[slot.index()]
    }

    pub fn geometry(&self) -> &RigGeometry {
        &self.geometry
    }

    pub fn apply_drive_torque<B: PhysicsBackend<Body = H>>(
        &self,
        backend: &mut B,
        direction: DriveDirection,
    ) {
        backend.apply_torque(self.wheel(WheelSlot::Rear), self.tuning.torque(direction));
    }

    pub fn apply_air_control<B: PhysicsBackend<Body = H>>(
        &self,
        backend: &mut B,
        direction: DriveDirection,
        any_wheel_on_ground: bool,
    ) -> bool {
        if any_wheel_on_ground || self.tuning.air_control_impulse == 0.0 {
            return false;
        }
        backend.apply_angular_impulse(
            self.chassis,
            direction.sign() * self.tuning.air_control_impulse,
        );
        true
    }

    pub fn chassis_state<B: PhysicsBackend<Body = H>>(&self, backend: &B) -> Option<BodyState> {
        backend.body_state(self.chassis)
    }

    pub fn wheel_state<B: PhysicsBackend<Body = H>>(
        &self,
        backend: &B,
        slot: WheelSlot,
    ) -> Option<BodyState> {
        backend.body_state(self.wheel(slot))
    }

    pub fn despawn<B: PhysicsBackend<Body = H>>(&self, backend: &mut B) {
        for wheel in self.wheels {
            backend.despawn_body(wheel);
        }
        backend.despawn_body(self.chassis);
    }
}

fn validate_dimensions(config: &VehicleConfig) -> Result<(), SimError> {
    let checks = [
        ("wheel radius", config.wheel_radius),
        ("wheel spacing", config.wheel_spacing),
        ("chassis width", config.chassis_size[0]),
        ("chassis height", config.chassis_size[1]),
        ("chassis mass", config.chassis_mass),
        ("wheel mass", config.wheel_mass),
    ];
    for (name, value) in checks {
        if !(value.is_finite() && value > 0.0) {
            return Err(SimError::InvalidRig(format!("{name} must be > 0, got {value}")));
        }
    }
    Ok(())
}

fn wheel_desc(config: &VehicleConfig, slot: WheelSlot, position: Vec2) -> BodyDesc {
    BodyDesc {
        role: BodyRole::Wheel(slot),
        position,
        shape: ShapeDesc::Circle {
            radius: config.wheel_radius,
        },
        mass: config.wheel_mass,
        friction: config.wheel_friction,
        restitution: config.wheel_restitution,
        linear_damping: config.wheel_linear_damping,
        angular_damping: config.wheel_angular_damping,
        dynamic: true,
        category: ContactCategory::Wheel(slot),
    }
}

fn suspension_joints(config: &VehicleConfig, geometry: &RigGeometry, slot: WheelSlot) -> [JointDesc; 3] {
    let wheel_on_chassis = geometry.wheel(slot) - geometry.chassis;
    let limit_anchor = wheel_on_chassis + Vec2::new(0.0, config.limit_anchor_height);

    // Each wheel carries half the chassis.
    let sprung_mass = config.chassis_mass * 0.5;
    let omega = TAU * config.suspension_frequency;

    [
        JointDesc::Pin {
            anchor_on_parent: wheel_on_chassis,
            anchor_on_child: Vec2::ZERO,
        },
        JointDesc::DistanceLimit {
            anchor_on_parent: limit_anchor,
            anchor_on_child: Vec2::ZERO,
            max_length: config.suspension_travel,
        },
        JointDesc::Spring {
            anchor_on_parent: Vec2::ZERO,
            anchor_on_child: Vec2::ZERO,
            rest_length: wheel_on_chassis.length(),
            stiffness: sprung_mass * omega * omega,
            damping: 2.0 * config.suspension_damping * sprung_mass * omega,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::sim::testing::RecordingBackend;

    fn build_rig(backend: &mut RecordingBackend) -> VehicleRig<usize> {
        VehicleRig::build(backend, &test_config().vehicle).expect("rig should build")
    }

    #[test]
    fn build_spawns_three_bodies_and_six_joints() {
        let mut backend = RecordingBackend::default();
        let rig = build_rig(&mut backend);

        assert_eq!(backend.live_bodies(), 3);
        assert_eq!(backend.joints.len(), 6);
        for slot in WheelSlot::ALL {
            let kinds: Vec<_> = backend
                .joints
                .iter()
                .filter(|joint| joint.child == rig.wheel(slot))
                .map(|joint| joint.joint.kind())
                .collect();
            assert_eq!(kinds, ["pin", "distance limit", "spring"]);
            assert!(backend
                .joints
                .iter()
                .all(|joint| joint.parent == rig.chassis()));
        }
    }

    #[test]
    fn front_wheel_sits_two_spacings_ahead() {
        let config = test_config().vehicle;
        let mut backend = RecordingBackend::default();
        let rig = build_rig(&mut backend);

        let rear = backend.bodies[rig.wheel(WheelSlot::Rear)].desc.position;
        let front = backend.bodies[rig.wheel(WheelSlot::Front)].desc.position;
        let chassis = backend.bodies[rig.chassis()].desc.position;

        assert_eq!(front.x - rear.x, 2.0 * config.wheel_spacing);
        assert_eq!(front.y, rear.y);
        assert_eq!(chassis.x, (rear.x + front.x) * 0.5);
        assert!(chassis.y > rear.y);
    }

    #[test]
    fn pin_anchor_lands_on_wheel_centre() {
        let mut backend = RecordingBackend::default();
        let rig = build_rig(&mut backend);
        let geometry = *rig.geometry();

        let pin = backend
            .joints
            .iter()
            .find(|joint| joint.child == rig.wheel(WheelSlot::Front))
            .map(|joint| joint.joint);
        let Some(JointDesc::Pin {
            anchor_on_parent, ..
        }) = pin
        else {
            panic!("first joint should be a pin, got {pin:?}");
        };
        assert_eq!(geometry.chassis + anchor_on_parent, geometry.front_wheel);
    }

    #[test]
    fn invalid_dimensions_fail_before_spawning() {
        let mut config = test_config().vehicle;
        config.wheel_spacing = 0.0;
        let mut backend = RecordingBackend::default();

        let error = VehicleRig::build(&mut backend, &config).expect_err("spacing 0 is invalid");
        assert!(matches!(error, SimError::InvalidRig(_)));
        assert!(backend.bodies.is_empty());

        config.wheel_spacing = 160.0;
        config.wheel_radius = -1.0;
        assert!(VehicleRig::build(&mut backend, &config).is_err());
        assert!(backend.bodies.is_empty());
    }

    #[test]
    fn rejected_joint_fails_construction() {
        let mut backend = RecordingBackend {
            reject_joints: true,
            ..RecordingBackend::default()
        };
        let error = VehicleRig::build(&mut backend, &test_config().vehicle)
            .expect_err("joint rejection must be fatal");
        assert!(matches!(error, SimError::UnknownBody { .. }));
        assert_eq!(backend.live_bodies(), 0, "partial rig must not survive");
    }

    #[test]
    fn drive_torques_have_opposite_signs_on_rear_wheel_only() {
        let mut backend = RecordingBackend::default();
        let rig = build_rig(&mut backend);

        rig.apply_drive_torque(&mut backend, DriveDirection::Accelerate);
        let accelerate = backend.torque_sum(rig.wheel(WheelSlot::Rear));
        backend.torques.clear();
        rig.apply_drive_torque(&mut backend, DriveDirection::Brake);
        let brake = backend.torque_sum(rig.wheel(WheelSlot::Rear));

        assert!(accelerate < 0.0);
        assert!(brake > 0.0);
        assert_eq!(brake, -accelerate * rig.tuning.brake_torque_multiplier);
        assert_eq!(backend.torque_sum(rig.wheel(WheelSlot::Front)), 0.0);
    }

    #[test]
    fn air_control_only_fires_when_airborne() {
        let mut backend = RecordingBackend::default();
        let rig = build_rig(&mut backend);

        assert!(!rig.apply_air_control(&mut backend, DriveDirection::Accelerate, true));
        assert!(backend.impulses.is_empty());

        assert!(rig.apply_air_control(&mut backend, DriveDirection::Accelerate, false));
        assert!(rig.apply_air_control(&mut backend, DriveDirection::Brake, false));
        assert_eq!(backend.impulses.len(), 2);
        assert_eq!(backend.impulses[0].0, rig.chassis());
        assert!(backend.impulses[0].1 < 0.0);
        assert!(backend.impulses[1].1 > 0.0);
    }

    #[test]
    fn despawn_removes_every_rig_body() {
        let mut backend = RecordingBackend::default();
        let rig = build_rig(&mut backend);
        rig.despawn(&mut backend);
        assert_eq!(backend.live_bodies(), 0);
    }
}
