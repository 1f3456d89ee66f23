//! Cooperative single-threaded timers.
//!
//! The dashboard never runs work in parallel: display delays and the
//! optimization ticker are entries in a [`TimerQueue`] owned by the session.
//! Time only moves when the driver asks for it, via [`TimerQueue::pop_due`]
//! and [`TimerQueue::settle`], which makes every timed flow reproducible
//! in tests.
//!
//! Due timers fire in deadline order; timers sharing a deadline fire in the
//! order they were scheduled.

use std::time::Duration;

/// Handle for a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Entry<T> {
    id: TimerId,
    deadline: Duration,
    seq: u64,
    period: Option<Duration>,
    task: T,
}

/// Queue of one-shot and repeating timers against a virtual clock.
#[derive(Debug)]
pub struct TimerQueue<T> {
    now: Duration,
    next_id: u64,
    next_seq: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            next_seq: 0,
            entries: Vec::new(),
        }
    }
}

impl<T: Clone> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time since the queue was created.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Run `task` once, `delay` from now.
    pub fn schedule_once(&mut self, delay: Duration, task: T) -> TimerId {
        self.push(delay, None, task)
    }

    /// Run `task` every `period`, first firing one period from now.
    pub fn schedule_repeating(&mut self, period: Duration, task: T) -> TimerId {
        debug_assert!(!period.is_zero(), "repeating timer needs a non-zero period");
        self.push(period, Some(period), task)
    }

    /// Cancel a timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Deadline of the earliest pending timer.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.iter().map(|e| e.deadline).min()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pop the earliest timer due at or before `until`.
    ///
    /// Moves the clock to that timer's deadline. Repeating timers are
    /// re-armed one period later under the same id before the task is
    /// returned, so the handler may cancel them.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, T)> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.deadline <= until)
            .min_by_key(|(_, e)| (e.deadline, e.seq))
            .map(|(i, _)| i)?;

        let entry = self.entries.swap_remove(index);
        self.now = self.now.max(entry.deadline);

        if let Some(period) = entry.period {
            let seq = self.bump_seq();
            self.entries.push(Entry {
                id: entry.id,
                deadline: entry.deadline.saturating_add(period),
                seq,
                period: entry.period,
                task: entry.task.clone(),
            });
        }

        Some((entry.id, entry.task))
    }

    /// Move the clock forward to `until` once no more timers are due.
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    fn push(&mut self, delay: Duration, period: Option<Duration>, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let seq = self.bump_seq();
        self.entries.push(Entry {
            id,
            deadline: self.now.saturating_add(delay),
            seq,
            period,
            task,
        });
        id
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(queue: &mut TimerQueue<&'static str>, until: Duration) -> Vec<&'static str> {
        let mut fired = Vec::new();
        while let Some((_, task)) = queue.pop_due(until) {
            fired.push(task);
        }
        queue.settle(until);
        fired
    }

    #[test]
    fn one_shot_fires_once_at_deadline() {
        let mut queue = TimerQueue::new();
        queue.schedule_once(Duration::from_millis(100), "done");

        assert!(drain(&mut queue, Duration::from_millis(99)).is_empty());
        assert_eq!(drain(&mut queue, Duration::from_millis(100)), vec!["done"]);
        assert!(drain(&mut queue, Duration::from_secs(10)).is_empty());
        assert_eq!(queue.now(), Duration::from_secs(10));
    }

    #[test]
    fn fires_in_deadline_then_schedule_order() {
        let mut queue = TimerQueue::new();
        queue.schedule_once(Duration::from_millis(30), "late");
        queue.schedule_once(Duration::from_millis(10), "first");
        queue.schedule_once(Duration::from_millis(10), "second");

        assert_eq!(
            drain(&mut queue, Duration::from_millis(50)),
            vec!["first", "second", "late"]
        );
    }

    #[test]
    fn repeating_timer_fires_each_period_until_cancelled() {
        let mut queue = TimerQueue::new();
        let id = queue.schedule_repeating(Duration::from_secs(10), "tick");

        assert_eq!(drain(&mut queue, Duration::from_secs(30)).len(), 3);
        assert!(queue.is_scheduled(id));
        assert_eq!(queue.next_deadline(), Some(Duration::from_secs(40)));

        assert!(queue.cancel(id));
        assert!(!queue.cancel(id));
        assert!(drain(&mut queue, Duration::from_secs(100)).is_empty());
    }

    #[test]
    fn delays_are_relative_to_the_current_clock() {
        let mut queue = TimerQueue::new();
        queue.settle(Duration::from_secs(5));
        queue.schedule_once(Duration::from_secs(1), "x");
        assert_eq!(queue.next_deadline(), Some(Duration::from_secs(6)));
    }

    #[test]
    fn pop_due_advances_clock_to_deadline() {
        let mut queue = TimerQueue::new();
        queue.schedule_once(Duration::from_millis(40), "a");
        let (_, task) = queue.pop_due(Duration::from_secs(1)).unwrap();
        assert_eq!(task, "a");
        assert_eq!(queue.now(), Duration::from_millis(40));
        assert!(queue.is_empty());
    }
}
