//! AlarmRegistry: canonical owner of the persisted alarm collection.

use crate::alarm::Alarm;
use crate::time::ClockTime;

/// Registry order is insertion order. Display ordering is a view concern;
/// the only ordering the registry guarantees is the tie-break in
/// [`AlarmRegistry::take_due`].
#[derive(Debug, Default, Clone)]
pub struct AlarmRegistry {
    alarms: Vec<Alarm>,
}

impl AlarmRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_alarms(alarms: Vec<Alarm>) -> Self {
        Self { alarms }
    }

    pub fn add(&mut self, alarm: Alarm) {
        self.alarms.push(alarm);
    }

    /// Replace the alarm with the given id. Returns false if absent.
    pub fn update(&mut self, id: &str, alarm: Alarm) -> bool {
        match self.alarms.iter_mut().find(|a| a.id == id) {
            Some(slot) => {
                *slot = alarm;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Alarm> {
        let idx = self.alarms.iter().position(|a| a.id == id)?;
        Some(self.alarms.remove(idx))
    }

    pub fn get(&self, id: &str) -> Option<&Alarm> {
        self.alarms.iter().find(|a| a.id == id)
    }

    pub fn list(&self) -> &[Alarm] {
        &self.alarms
    }

    pub fn len(&self) -> usize {
        self.alarms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alarms.is_empty()
    }

    /// Remove and return the first alarm whose time matches `now`.
    ///
    /// The remove happens before the alarm is handed to any dispatch step,
    /// so a re-entrant tick in the same minute cannot double-match. When
    /// several alarms share the minute only the first in registry order
    /// fires; the rest stay pending for a later tick.
    pub fn take_due(&mut self, now: ClockTime) -> Option<Alarm> {
        let idx = self.alarms.iter().position(|a| a.time == now)?;
        Some(self.alarms.remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::AlarmSound;

    fn alarm(id: &str, h: u32, m: u32) -> Alarm {
        Alarm::new(
            id,
            format!("alarm {id}"),
            ClockTime::new(h, m).unwrap(),
            AlarmSound::Classic,
        )
    }

    #[test]
    fn take_due_removes_the_match() {
        let mut reg = AlarmRegistry::from_alarms(vec![alarm("a1", 7, 0), alarm("a2", 8, 0)]);

        let due = reg.take_due(ClockTime::new(7, 0).unwrap()).unwrap();
        assert_eq!(due.id, "a1");
        assert_eq!(reg.len(), 1);
        assert!(reg.get("a1").is_none());
    }

    #[test]
    fn no_match_leaves_registry_untouched() {
        let mut reg = AlarmRegistry::from_alarms(vec![alarm("a1", 7, 0)]);
        assert!(reg.take_due(ClockTime::new(7, 1).unwrap()).is_none());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn same_minute_ties_fire_first_in_registry_order() {
        let mut reg = AlarmRegistry::from_alarms(vec![alarm("a1", 7, 0), alarm("a2", 7, 0)]);

        let first = reg.take_due(ClockTime::new(7, 0).unwrap()).unwrap();
        assert_eq!(first.id, "a1");
        // The second stays pending and can fire on a later tick of the
        // same minute.
        let second = reg.take_due(ClockTime::new(7, 0).unwrap()).unwrap();
        assert_eq!(second.id, "a2");
    }

    #[test]
    fn update_replaces_in_place() {
        let mut reg = AlarmRegistry::from_alarms(vec![alarm("a1", 7, 0)]);
        assert!(reg.update("a1", alarm("a1", 9, 30)));
        assert_eq!(reg.get("a1").unwrap().time, ClockTime::new(9, 30).unwrap());
        assert!(!reg.update("missing", alarm("a9", 1, 0)));
    }
}
