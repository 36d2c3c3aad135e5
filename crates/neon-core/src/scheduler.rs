//! Delayed-task queue
//!
//! Time is passed in explicitly as a [`Duration`] since an arbitrary origin,
//! so the same queue drives both the live event loop and deterministic tests.
//! Tasks due at the same instant fire in the order they were scheduled.

use std::collections::BTreeMap;
use std::time::Duration;

/// Handle to a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

/// A queue of events that become due at fixed times
#[derive(Debug)]
pub struct Scheduler<E> {
    tasks: BTreeMap<(Duration, u64), E>,
    next_seq: u64,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            tasks: BTreeMap::new(),
            next_seq: 0,
        }
    }

    /// Schedule `event` to fire `delay` after `now`
    pub fn schedule(&mut self, now: Duration, delay: Duration, event: E) -> TaskId {
        self.schedule_at(now.saturating_add(delay), event)
    }

    /// Schedule `event` to fire at an absolute time
    pub fn schedule_at(&mut self, due: Duration, event: E) -> TaskId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.tasks.insert((due, seq), event);
        TaskId(seq)
    }

    /// Cancel a pending task; returns false if it already fired or was cancelled
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|&(_, seq), _| seq != id.0);
        self.tasks.len() != before
    }

    /// Drop every pending task
    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Remove and return the earliest task due at or before `now`
    ///
    /// The returned time is the task's scheduled time, not `now`, so chained
    /// follow-ups can be scheduled relative to it without accumulating lag.
    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, E)> {
        let (&(due, _), _) = self.tasks.first_key_value()?;
        if due > now {
            return None;
        }
        self.tasks.pop_first().map(|((due, _), event)| (due, event))
    }

    /// Remove and return every task due at or before `now`, in firing order
    pub fn drain_due(&mut self, now: Duration) -> Vec<E> {
        let mut fired = Vec::new();
        while let Some((_, event)) = self.pop_due(now) {
            fired.push(event);
        }
        fired
    }

    /// Time of the earliest pending task
    pub fn next_deadline(&self) -> Option<Duration> {
        self.tasks.keys().next().map(|&(due, _)| due)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_nothing_due_before_deadline() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(0), ms(300), "commit");
        assert!(scheduler.drain_due(ms(299)).is_empty());
        assert_eq!(scheduler.drain_due(ms(300)), vec!["commit"]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_fires_in_time_then_schedule_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(0), ms(50), 'b');
        scheduler.schedule(ms(0), ms(10), 'a');
        scheduler.schedule(ms(0), ms(50), 'c');
        assert_eq!(scheduler.drain_due(ms(100)), vec!['a', 'b', 'c']);
    }

    #[test]
    fn test_cancel() {
        let mut scheduler = Scheduler::new();
        let id = scheduler.schedule(ms(0), ms(10), 1);
        scheduler.schedule(ms(0), ms(20), 2);
        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        assert_eq!(scheduler.drain_due(ms(100)), vec![2]);
    }

    #[test]
    fn test_pop_due_reports_scheduled_time() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(100), ms(300), ());
        assert_eq!(scheduler.next_deadline(), Some(ms(400)));
        assert_eq!(scheduler.pop_due(ms(1000)), Some((ms(400), ())));
    }

    #[test]
    fn test_clear() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(0), ms(1), ());
        scheduler.schedule(ms(0), ms(2), ());
        scheduler.clear();
        assert_eq!(scheduler.len(), 0);
        assert_eq!(scheduler.next_deadline(), None);
    }
}
