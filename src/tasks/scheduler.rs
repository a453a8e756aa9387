//! Virtual-clock scheduler for purpose-keyed deferred tasks.

use std::time::Duration;

use super::TaskPurpose;

struct PendingTask<T> {
    purpose: TaskPurpose,
    due: Duration,
    seq: u64,
    payload: T,
}

/// Holds pending tasks until the clock passes their due time.
///
/// The clock only moves through [`Scheduler::advance_to`], so tests drive time
/// explicitly and the event loop feeds it the elapsed wall time.
pub struct Scheduler<T> {
    now: Duration,
    next_seq: u64,
    pending: Vec<PendingTask<T>>,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            pending: Vec::new(),
        }
    }

    /// Current position of the clock.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule a task, replacing every pending task with the same purpose.
    pub fn schedule(&mut self, purpose: TaskPurpose, delay: Duration, payload: T) {
        self.cancel(purpose);
        self.push(purpose, delay, payload);
    }

    /// Replace pending tasks of `purpose` with a whole batch.
    pub fn schedule_batch<I>(&mut self, purpose: TaskPurpose, tasks: I)
    where
        I: IntoIterator<Item = (Duration, T)>,
    {
        self.cancel(purpose);
        self.append_batch(purpose, tasks);
    }

    /// Add tasks alongside those already pending for `purpose`.
    pub fn append_batch<I>(&mut self, purpose: TaskPurpose, tasks: I)
    where
        I: IntoIterator<Item = (Duration, T)>,
    {
        for (delay, payload) in tasks {
            self.push(purpose, delay, payload);
        }
    }

    /// Drop every pending task with this purpose. Returns how many were dropped.
    pub fn cancel(&mut self, purpose: TaskPurpose) -> usize {
        let before = self.pending.len();
        self.pending.retain(|t| t.purpose != purpose);
        let cancelled = before - self.pending.len();
        if cancelled > 0 {
            tracing::trace!(purpose = %purpose, cancelled, "Cancelled pending tasks");
        }
        cancelled
    }

    /// Number of pending tasks with this purpose.
    pub fn pending(&self, purpose: TaskPurpose) -> usize {
        self.pending.iter().filter(|t| t.purpose == purpose).count()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Due time of the earliest pending task.
    pub fn next_due(&self) -> Option<Duration> {
        self.pending.iter().map(|t| t.due).min()
    }

    /// Move the clock forward and take every task that is now due, earliest
    /// first. Tasks due at the same instant come out in scheduling order.
    /// The clock never moves backwards.
    pub fn advance_to(&mut self, now: Duration) -> Vec<T> {
        if now > self.now {
            self.now = now;
        }

        let current = self.now;
        let (mut due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|t| t.due <= current);
        self.pending = waiting;

        due.sort_by_key(|t| (t.due, t.seq));
        due.into_iter().map(|t| t.payload).collect()
    }

    /// Advance the clock by a relative amount.
    pub fn advance_by(&mut self, delta: Duration) -> Vec<T> {
        let target = self.now + delta;
        self.advance_to(target)
    }

    fn push(&mut self, purpose: TaskPurpose, delay: Duration, payload: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(PendingTask {
            purpose,
            due: self.now + delay,
            seq,
            payload,
        });
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_tasks_fire_in_due_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(TaskPurpose::AutoHide, ms(200), "hide");
        scheduler.schedule(TaskPurpose::ContentSwap, ms(100), "swap");

        assert!(scheduler.advance_to(ms(50)).is_empty());
        assert_eq!(scheduler.advance_to(ms(250)), vec!["swap", "hide"]);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_same_purpose_replaces_pending_task() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(TaskPurpose::ResizeDebounce, ms(250), 1);
        scheduler.advance_to(ms(100));
        scheduler.schedule(TaskPurpose::ResizeDebounce, ms(250), 2);

        assert!(scheduler.advance_to(ms(300)).is_empty());
        assert_eq!(scheduler.advance_to(ms(350)), vec![2]);
    }

    #[test]
    fn test_batch_keeps_scheduling_order_for_ties() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_batch(
            TaskPurpose::RevealBatch,
            vec![(ms(0), 'a'), (ms(0), 'b'), (ms(80), 'c')],
        );
        scheduler.append_batch(TaskPurpose::RevealBatch, vec![(ms(0), 'd')]);
        assert_eq!(scheduler.pending(TaskPurpose::RevealBatch), 4);

        assert_eq!(scheduler.advance_to(ms(100)), vec!['a', 'b', 'd', 'c']);
    }

    #[test]
    fn test_cancel_only_touches_its_purpose() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(TaskPurpose::AutoHide, ms(10), 1);
        scheduler.schedule(TaskPurpose::ImageScale, ms(10), 2);

        assert_eq!(scheduler.cancel(TaskPurpose::AutoHide), 1);
        assert_eq!(scheduler.cancel(TaskPurpose::AutoHide), 0);
        assert_eq!(scheduler.next_due(), Some(ms(10)));
        assert_eq!(scheduler.advance_by(ms(10)), vec![2]);
    }

    #[test]
    fn test_clock_never_moves_backwards() {
        let mut scheduler: Scheduler<u8> = Scheduler::new();
        scheduler.advance_to(ms(500));
        scheduler.advance_to(ms(100));
        assert_eq!(scheduler.now(), ms(500));

        scheduler.schedule(TaskPurpose::AutoHide, ms(10), 7);
        assert_eq!(scheduler.next_due(), Some(ms(510)));
    }
}
