
pub mod backend;
pub mod contacts;
pub mod controls;
pub mod hud;
pub mod layout;
pub mod parallax;
pub mod rig;
pub mod step;
pub mod terrain;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{
    BodyDesc, BodyRole, BodyState, ContactCategory, JointDesc, PhysicsBackend, ShapeDesc,
    SimError, WheelSlot,
};
pub use contacts::{ContactEvent, ContactPhase};
pub use controls::{ControlId, InputEvent, PauseState, SceneRequest};
pub use step::SimulationContext;
