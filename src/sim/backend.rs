use bevy::math::Vec2;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WheelSlot {
    Rear,
    Front,
}

impl WheelSlot {
    pub const ALL: [WheelSlot; 2] = [WheelSlot::Rear, WheelSlot::Front];

    pub fn index(self) -> usize {
        match self {
            WheelSlot::Rear => 0,
            WheelSlot::Front => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WheelSlot::Rear => "rear",
            WheelSlot::Front => "front",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactCategory {
    Ground,
    Chassis,
    Wheel(WheelSlot),
}

impl ContactCategory {
    pub const GROUND_BIT: u32 = 1 << 0;
    pub const CHASSIS_BIT: u32 = 1 << 1;
    pub const REAR_WHEEL_BIT: u32 = 1 << 2;
    pub const FRONT_WHEEL_BIT: u32 = 1 << 3;

    pub fn membership(self) -> u32 {
        match self {
            ContactCategory::Ground => Self::GROUND_BIT,
            ContactCategory::Chassis => Self::CHASSIS_BIT,
            ContactCategory::Wheel(WheelSlot::Rear) => Self::REAR_WHEEL_BIT,
            ContactCategory::Wheel(WheelSlot::Front) => Self::FRONT_WHEEL_BIT,
        }
    }

    pub fn filter(self) -> u32 {
        match self {
            ContactCategory::Ground => {
                Self::CHASSIS_BIT | Self::REAR_WHEEL_BIT | Self::FRONT_WHEEL_BIT
            }
            ContactCategory::Chassis | ContactCategory::Wheel(_) => Self::GROUND_BIT,
        }
    }

    pub fn reports_contacts(self) -> bool {
        matches!(self, ContactCategory::Wheel(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyRole {
    Chassis,
    Wheel(WheelSlot),
    Ground,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeDesc {
    Rectangle { half_extents: Vec2 },
    Circle { radius: f32 },
    Polyline(Vec<Vec2>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BodyDesc {
    pub role: BodyRole,
    pub position: Vec2,
    pub shape: ShapeDesc,
    pub mass: f32,
    pub friction: f32,
    pub restitution: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub dynamic: bool,
    pub category: ContactCategory,
}

impl BodyDesc {
    pub fn ground(points: Vec<Vec2>, friction: f32) -> Self {
        Self {
            role: BodyRole::Ground,
            position: Vec2::ZERO,
            shape: ShapeDesc::Polyline(points),
            mass: 0.0,
            friction,
            restitution: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            dynamic: false,
            category: ContactCategory::Ground,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JointDesc {
    Pin {
        anchor_on_parent: Vec2,
        anchor_on_child: Vec2,
    },
    DistanceLimit {
        anchor_on_parent: Vec2,
        anchor_on_child: Vec2,
        max_length: f32,
    },
    Spring {
        anchor_on_parent: Vec2,
        anchor_on_child: Vec2,
        rest_length: f32,
        stiffness: f32,
        damping: f32,
    },
}

impl JointDesc {
    pub fn kind(&self) -> &'static str {
        match self {
            JointDesc::Pin { .. } => "pin",
            JointDesc::DistanceLimit { .. } => "distance limit",
            JointDesc::Spring { .. } => "spring",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BodyState {
    pub position: Vec2,
    pub rotation: f32,
    pub linear_velocity: Vec2,
    pub angular_velocity: f32,
}

pub trait PhysicsBackend {
    type Body: Copy + Eq + Debug;

    fn spawn_body(&mut self, desc: &BodyDesc) -> Self::Body;

    fn despawn_body(&mut self, body: Self::Body);

    fn attach_joint(
        &mut self,
        parent: Self::Body,
        child: Self::Body,
        joint: &JointDesc,
    ) -> Result<(), SimError>;

    fn apply_torque(&mut self, body: Self::Body, torque: f32);

    fn apply_angular_impulse(&mut self, body: Self::Body, impulse: f32);

    fn body_state(&self, body: Self::Body) -> Option<BodyState>;

    // 0 freezes the solver, 1 runs it at normal speed.
    fn set_time_scale(&mut self, scale: f32);
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    UnknownBody { body: String, joint: &'static str },
    InvalidRig(String),
}

impl Display for SimError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownBody { body, joint } => {
                write!(f, "cannot attach {joint} joint: body {body} does not exist")
            }
            Self::InvalidRig(message) => write!(f, "invalid vehicle rig: {message}"),
        }
    }
}

impl Error for SimError {}
