use bevy::ecs::system::SystemParam;
use bevy::platform::collections::HashSet;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

use crate::sim::{
    BodyDesc, BodyRole, BodyState, ContactCategory, JointDesc, PhysicsBackend, ShapeDesc,
    SimError,
};

#[derive(Component, Debug, Clone, Copy)]
pub struct SceneEntity;

#[derive(Component, Debug, Clone, Copy)]
pub struct SimBody {
    pub role: BodyRole,
}

#[derive(Component, Debug, Clone, Copy)]
pub struct ContactCategoryTag(pub ContactCategory);

#[derive(Component, Debug, Clone)]
pub struct BodyShape(pub ShapeDesc);

// Bodies spawned this run. Commands are deferred, so joint preconditions are
// checked here instead of against the world.
#[derive(Resource, Debug, Default)]
pub struct BodyRegistry {
    bodies: HashSet<Entity>,
}

impl BodyRegistry {
    pub fn len(&self) -> usize {
        self.bodies.len()
    }
}

#[derive(SystemParam)]
pub struct RapierBackend<'w, 's> {
    commands: Commands<'w, 's>,
    registry: ResMut<'w, BodyRegistry>,
    states: Query<'w, 's, (&'static Transform, &'static Velocity), With<SimBody>>,
    forces: Query<
        'w,
        's,
        (&'static mut ExternalForce, &'static mut ExternalImpulse),
        With<SimBody>,
    >,
    rapier_config: Query<'w, 's, &'static mut RapierConfiguration, With<DefaultRapierContext>>,
}

impl<'w, 's> RapierBackend<'w, 's> {
    pub fn commands(&mut self) -> &mut Commands<'w, 's> {
        &mut self.commands
    }

    // Drive torques are per tick; Rapier keeps `ExternalForce` until cleared.
    pub fn clear_forces(&mut self) {
        for (mut force, _) in &mut self.forces {
            force.force = Vec2::ZERO;
            force.torque = 0.0;
        }
    }
}

impl PhysicsBackend for RapierBackend<'_, '_> {
    type Body = Entity;

    fn spawn_body(&mut self, desc: &BodyDesc) -> Entity {
        let collider = match &desc.shape {
            ShapeDesc::Rectangle { half_extents } => Collider::cuboid(half_extents.x, half_extents.y),
            ShapeDesc::Circle { radius } => Collider::ball(*radius),
            ShapeDesc::Polyline(points) => Collider::polyline(points.clone(), None),
        };
        let groups = CollisionGroups::new(
            Group::from_bits_truncate(desc.category.membership()),
            Group::from_bits_truncate(desc.category.filter()),
        );
        let name = match desc.role {
            BodyRole::Chassis => "VehicleChassis".to_string(),
            BodyRole::Wheel(slot) => format!("VehicleWheel {}", slot.label()),
            BodyRole::Ground => "TerrainSegment".to_string(),
        };

        let mut entity = self.commands.spawn((
            Name::new(name),
            SceneEntity,
            SimBody { role: desc.role },
            ContactCategoryTag(desc.category),
            BodyShape(desc.shape.clone()),
            Transform::from_translation(desc.position.extend(0.0)),
            Visibility::Inherited,
            collider,
            groups,
            Friction::coefficient(desc.friction),
            Restitution::coefficient(desc.restitution),
        ));

        if desc.dynamic {
            entity.insert((
                RigidBody::Dynamic,
                ColliderMassProperties::Mass(desc.mass),
                Damping {
                    linear_damping: desc.linear_damping,
                    angular_damping: desc.angular_damping,
                },
                Velocity::zero(),
                ExternalForce::default(),
                ExternalImpulse::default(),
                Sleeping::disabled(),
            ));
        } else {
            entity.insert(RigidBody::Fixed);
        }
        if desc.category.reports_contacts() {
            entity.insert(ActiveEvents::COLLISION_EVENTS);
        }

        let id = entity.id();
        self.registry.bodies.insert(id);
        id
    }

    fn despawn_body(&mut self, body: Entity) {
        if self.registry.bodies.remove(&body) {
            self.commands.entity(body).try_despawn();
        }
    }

    fn attach_joint(
        &mut self,
        parent: Entity,
        child: Entity,
        joint: &JointDesc,
    ) -> Result<(), SimError> {
        for body in [parent, child] {
            if !self.registry.bodies.contains(&body) {
                return Err(SimError::UnknownBody {
                    body: format!("{body:?}"),
                    joint: joint.kind(),
                });
            }
        }

        let data: TypedJoint = match *joint {
            JointDesc::Pin {
                anchor_on_parent,
                anchor_on_child,
            } => RevoluteJointBuilder::new()
                .local_anchor1(anchor_on_parent)
                .local_anchor2(anchor_on_child)
                .build()
                .into(),
            JointDesc::DistanceLimit {
                anchor_on_parent,
                anchor_on_child,
                max_length,
            } => RopeJointBuilder::new(max_length)
                .local_anchor1(anchor_on_parent)
                .local_anchor2(anchor_on_child)
                .build()
                .into(),
            JointDesc::Spring {
                anchor_on_parent,
                anchor_on_child,
                rest_length,
                stiffness,
                damping,
            } => SpringJointBuilder::new(rest_length, stiffness, damping)
                .local_anchor1(anchor_on_parent)
                .local_anchor2(anchor_on_child)
                .build()
                .into(),
        };

        // One ImpulseJoint per entity, so each joint rides on its own child of the wheel.
        let kind = joint.kind();
        self.commands.entity(child).with_children(|wheel| {
            wheel.spawn((
                Name::new(format!("Suspension {kind}")),
                ImpulseJoint::new(parent, data),
            ));
        });
        Ok(())
    }

    fn apply_torque(&mut self, body: Entity, torque: f32) {
        if let Ok((mut force, _)) = self.forces.get_mut(body) {
            force.torque += torque;
        }
    }

    fn apply_angular_impulse(&mut self, body: Entity, impulse: f32) {
        if let Ok((_, mut external)) = self.forces.get_mut(body) {
            external.torque_impulse += impulse;
        }
    }

    fn body_state(&self, body: Entity) -> Option<BodyState> {
        let (transform, velocity) = self.states.get(body).ok()?;
        Some(BodyState {
            position: transform.translation.truncate(),
            rotation: transform.rotation.to_euler(EulerRot::XYZ).2,
            linear_velocity: velocity.linvel,
            angular_velocity: velocity.angvel,
        })
    }

    fn set_time_scale(&mut self, scale: f32) {
        if let Ok(mut rapier_config) = self.rapier_config.single_mut() {
            rapier_config.physics_pipeline_active = scale > 0.0;
        }
    }
}
