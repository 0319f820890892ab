use super::backend::{ContactCategory, WheelSlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    Begin,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEvent {
    pub phase: ContactPhase,
    pub first: ContactCategory,
    pub second: ContactCategory,
}

// Per-wheel ground contact counters. A wheel against an edge chain can hold
// several contact points at once, so a flag would drop to airborne too early.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactTracker {
    counts: [u32; 2],
}

impl ContactTracker {
    pub fn classify(first: ContactCategory, second: ContactCategory) -> Option<WheelSlot> {
        match (first, second) {
            (ContactCategory::Wheel(slot), ContactCategory::Ground)
            | (ContactCategory::Ground, ContactCategory::Wheel(slot)) => Some(slot),
            _ => None,
        }
    }

    pub fn apply(&mut self, event: ContactEvent) -> Option<WheelSlot> {
        let slot = Self::classify(event.first, event.second)?;
        match event.phase {
            ContactPhase::Begin => self.on_begin(slot),
            ContactPhase::End => self.on_end(slot),
        }
        Some(slot)
    }

    pub fn on_begin(&mut self, slot: WheelSlot) {
        let count = &mut self.counts[slot.index()];
        *count = count.saturating_add(1);
    }

    // Unmatched ends are ignored; platforms do not guarantee event pairing.
    pub fn on_end(&mut self, slot: WheelSlot) {
        let count = &mut self.counts[slot.index()];
        *count = count.saturating_sub(1);
    }

    pub fn count(&self, slot: WheelSlot) -> u32 {
        self.counts[slot.index()]
    }

    pub fn wheel_on_ground(&self, slot: WheelSlot) -> bool {
        self.count(slot) > 0
    }

    pub fn any_wheel_on_ground(&self) -> bool {
        WheelSlot::ALL
            .into_iter()
            .any(|slot| self.wheel_on_ground(slot))
    }

    pub fn reset(&mut self) {
        self.counts = [0; 2];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(phase: ContactPhase, slot: WheelSlot) -> ContactEvent {
        ContactEvent {
            phase,
            first: ContactCategory::Wheel(slot),
            second: ContactCategory::Ground,
        }
    }

    #[test]
    fn two_begins_need_two_ends() {
        let mut tracker = ContactTracker::default();
        tracker.apply(event(ContactPhase::Begin, WheelSlot::Rear));
        tracker.apply(event(ContactPhase::Begin, WheelSlot::Rear));
        tracker.apply(event(ContactPhase::End, WheelSlot::Rear));

        assert_eq!(tracker.count(WheelSlot::Rear), 1);
        assert!(tracker.wheel_on_ground(WheelSlot::Rear));
        assert!(tracker.any_wheel_on_ground());

        tracker.apply(event(ContactPhase::End, WheelSlot::Rear));
        assert_eq!(tracker.count(WheelSlot::Rear), 0);
        assert!(!tracker.wheel_on_ground(WheelSlot::Rear));
        assert!(!tracker.any_wheel_on_ground());
    }

    #[test]
    fn counter_never_goes_negative() {
        let mut tracker = ContactTracker::default();
        let script = [
            ContactPhase::End,
            ContactPhase::End,
            ContactPhase::Begin,
            ContactPhase::End,
            ContactPhase::End,
            ContactPhase::Begin,
        ];
        for phase in script {
            tracker.apply(event(phase, WheelSlot::Front));
            let count = tracker.count(WheelSlot::Front);
            assert_eq!(tracker.wheel_on_ground(WheelSlot::Front), count > 0);
        }
        assert_eq!(tracker.count(WheelSlot::Front), 1);
    }

    #[test]
    fn wheels_are_tracked_independently() {
        let mut tracker = ContactTracker::default();
        tracker.on_begin(WheelSlot::Front);
        assert!(!tracker.wheel_on_ground(WheelSlot::Rear));
        assert!(tracker.any_wheel_on_ground());
    }

    #[test]
    fn classify_accepts_either_order_and_ignores_chassis() {
        assert_eq!(
            ContactTracker::classify(ContactCategory::Ground, ContactCategory::Wheel(WheelSlot::Front)),
            Some(WheelSlot::Front)
        );
        assert_eq!(
            ContactTracker::classify(ContactCategory::Chassis, ContactCategory::Ground),
            None
        );
        assert_eq!(
            ContactTracker::classify(
                ContactCategory::Wheel(WheelSlot::Rear),
                ContactCategory::Wheel(WheelSlot::Front)
            ),
            None
        );

        let mut tracker = ContactTracker::default();
        let ignored = tracker.apply(ContactEvent {
            phase: ContactPhase::Begin,
            first: ContactCategory::Chassis,
            second: ContactCategory::Ground,
        });
        assert_eq!(ignored, None);
        assert_eq!(tracker, ContactTracker::default());
    }
}
