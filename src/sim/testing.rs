use super::backend::{BodyDesc, BodyState, JointDesc, PhysicsBackend, SimError};

#[derive(Debug, Clone)]
pub struct RecordedBody {
    pub desc: BodyDesc,
    pub state: BodyState,
    pub alive: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct RecordedJoint {
    pub parent: usize,
    pub child: usize,
    pub joint: JointDesc,
}

#[derive(Debug)]
pub struct RecordingBackend {
    pub bodies: Vec<RecordedBody>,
    pub joints: Vec<RecordedJoint>,
    pub torques: Vec<(usize, f32)>,
    pub impulses: Vec<(usize, f32)>,
    pub time_scale: f32,
    pub reject_joints: bool,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self {
            bodies: Vec::new(),
            joints: Vec::new(),
            torques: Vec::new(),
            impulses: Vec::new(),
            time_scale: 1.0,
            reject_joints: false,
        }
    }
}

impl RecordingBackend {
    pub fn live_bodies(&self) -> usize {
        self.bodies.iter().filter(|body| body.alive).count()
    }

    pub fn set_state(&mut self, body: usize, state: BodyState) {
        self.bodies[body].state = state;
    }

    pub fn state_mut(&mut self, body: usize) -> &mut BodyState {
        &mut self.bodies[body].state
    }

    pub fn torque_sum(&self, body: usize) -> f32 {
        self.torques
            .iter()
            .filter(|(target, _)| *target == body)
            .map(|(_, torque)| torque)
            .sum()
    }

    fn check(&self, body: usize, joint: &JointDesc) -> Result<(), SimError> {
        match self.bodies.get(body) {
            Some(record) if record.alive => Ok(()),
            _ => Err(SimError::UnknownBody {
                body: format!("#{body}"),
                joint: joint.kind(),
            }),
        }
    }
}

impl PhysicsBackend for RecordingBackend {
    type Body = usize;

    fn spawn_body(&mut self, desc: &BodyDesc) -> usize {
        self.bodies.push(RecordedBody {
            desc: desc.clone(),
            state: BodyState {
                position: desc.position,
                ..BodyState::default()
            },
            alive: true,
        });
        self.bodies.len() - 1
    }

    fn despawn_body(&mut self, body: usize) {
        if let Some(record) = self.bodies.get_mut(body) {
            record.alive = false;
        }
    }

    fn attach_joint(
        &mut self,
        parent: usize,
        child: usize,
        joint: &JointDesc,
    ) -> Result<(), SimError> {
        self.check(parent, joint)?;
        self.check(child, joint)?;
        if self.reject_joints {
            return Err(SimError::UnknownBody {
                body: format!("#{child}"),
                joint: joint.kind(),
            });
        }
        self.joints.push(RecordedJoint {
            parent,
            child,
            joint: *joint,
        });
        Ok(())
    }

    fn apply_torque(&mut self, body: usize, torque: f32) {
        self.torques.push((body, torque));
    }

    fn apply_angular_impulse(&mut self, body: usize, impulse: f32) {
        self.impulses.push((body, impulse));
    }

    fn body_state(&self, body: usize) -> Option<BodyState> {
        self.bodies
            .get(body)
            .filter(|record| record.alive)
            .map(|record| record.state)
    }

    fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale;
    }
}
