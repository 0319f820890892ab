use super::backend::ContactCategoryTag;
use super::*;
use crate::sim::{ContactCategory, ContactEvent, ContactPhase};
use crate::states::{viewport_half_extents, GameCamera};
use bevy::window::PrimaryWindow;
use bevy_rapier2d::prelude::*;

pub(super) fn sync_viewport_to_window(
    config: Res<GameConfig>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    mut simulation: ResMut<Simulation>,
) {
    let half_extents = viewport_half_extents(&config, window_query.single().ok());
    simulation.0.set_viewport(half_extents);
}

pub(super) fn collect_contact_events(
    mut collision_events: MessageReader<CollisionEvent>,
    category_query: Query<&ContactCategoryTag>,
    mut simulation: ResMut<Simulation>,
) {
    for collision_event in collision_events.read() {
        let event = contact_event(collision_event, |entity| {
            category_query.get(entity).ok().map(|tag| tag.0)
        });
        if let Some(slot) = simulation.0.record_contact(event) {
            debug!(
                "Contact {:?} on {} wheel, count now {}.",
                event.phase,
                slot.label(),
                simulation.0.contacts.count(slot)
            );
        }
    }
}

// Wheels are filtered to collide with ground only, so a side that has
// already been despawned (an evicted segment) is still ground.
fn contact_event(
    collision_event: &CollisionEvent,
    category_of: impl Fn(Entity) -> Option<ContactCategory>,
) -> ContactEvent {
    let (phase, first, second) = match *collision_event {
        CollisionEvent::Started(first, second, _) => (ContactPhase::Begin, first, second),
        CollisionEvent::Stopped(first, second, _) => (ContactPhase::End, first, second),
    };
    let category = |entity| category_of(entity).unwrap_or(ContactCategory::Ground);
    ContactEvent {
        phase,
        first: category(first),
        second: category(second),
    }
}

pub(super) fn retune_simulation_from_config(
    config: Res<GameConfig>,
    mut simulation: ResMut<Simulation>,
    mut backend: RapierBackend,
) {
    simulation.0.retune(&config, &mut backend);
}

pub(super) fn run_simulation_tick(mut simulation: ResMut<Simulation>, mut backend: RapierBackend) {
    backend.clear_forces();
    simulation.0.step(&mut backend);
}

pub(super) fn camera_follow_vehicle(
    simulation: Res<Simulation>,
    mut camera_query: Query<&mut Transform, With<GameCamera>>,
) {
    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };
    let target = simulation.0.camera_target;
    camera_transform.translation.x = target.x;
    camera_transform.translation.y = target.y;
}

pub(super) fn sync_rapier_gravity_from_config(
    config: Res<GameConfig>,
    mut rapier_config_query: Query<&mut RapierConfiguration, With<DefaultRapierContext>>,
) {
    if let Ok(mut rapier_config) = rapier_config_query.single_mut() {
        rapier_config.gravity =
            Vec2::new(0.0, -config.world.gravity * config.world.pixels_per_meter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_rapier2d::rapier::geometry::CollisionEventFlags;
    use crate::sim::contacts::ContactTracker;
    use crate::sim::WheelSlot;

    #[test]
    fn stopped_contact_with_despawned_ground_still_ends_wheel_contact() {
        let mut world = World::new();
        let wheel = world.spawn_empty().id();
        let segment = world.spawn_empty().id();
        let tags = |entity: Entity| {
            if entity == wheel {
                Some(ContactCategory::Wheel(WheelSlot::Rear))
            } else if entity == segment {
                Some(ContactCategory::Ground)
            } else {
                None
            }
        };

        let mut tracker = ContactTracker::default();
        let started = CollisionEvent::Started(segment, wheel, CollisionEventFlags::empty());
        tracker.apply(contact_event(&started, tags));
        assert_eq!(tracker.count(WheelSlot::Rear), 1);

        // The segment was evicted before its Stopped event arrived.
        let untagged =
            |entity: Entity| (entity == wheel).then_some(ContactCategory::Wheel(WheelSlot::Rear));
        let stopped = CollisionEvent::Stopped(segment, wheel, CollisionEventFlags::REMOVED);
        let event = contact_event(&stopped, untagged);
        assert_eq!(event.phase, ContactPhase::End);
        assert_eq!(event.first, ContactCategory::Ground);
        tracker.apply(event);
        assert_eq!(tracker.count(WheelSlot::Rear), 0);
        assert!(!tracker.any_wheel_on_ground());
    }
}
