//! Single-threaded timer queue with drop-cancelling handles.
//!
//! The queue runs on a virtual millisecond clock. The owner pulls due
//! payloads with [`TimerQueue::pop_due`], handles them, and finally moves the
//! clock with [`TimerQueue::advance_to`]. Dropping a [`TimerHandle`] cancels
//! its timer, so whoever owns a handle owns the timer's lifetime.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use std::time::Duration;

/// Identifier of a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

struct Entry<T> {
    deadline: u64,
    interval: Option<u64>,
    payload: T,
}

struct QueueInner<T> {
    now: u64,
    next_id: u64,
    entries: BTreeMap<TimerId, Entry<T>>,
}

trait CancelTimer {
    fn cancel(&mut self, id: TimerId) -> bool;
}

impl<T> CancelTimer for QueueInner<T> {
    fn cancel(&mut self, id: TimerId) -> bool {
        self.entries.remove(&id).is_some()
    }
}

/// Cancellation token for one scheduled timer.
#[must_use = "dropping a TimerHandle cancels the timer"]
pub struct TimerHandle {
    id: TimerId,
    queue: Weak<RefCell<dyn CancelTimer>>,
}

impl TimerHandle {
    pub fn id(&self) -> TimerId {
        self.id
    }

    /// Cancel explicitly. Equivalent to dropping the handle.
    pub fn cancel(self) {}
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        let Some(queue) = self.queue.upgrade() else {
            return;
        };
        match queue.try_borrow_mut() {
            Ok(mut queue) => {
                if !queue.cancel(self.id) {
                    tracing::debug!(timer = self.id.0, "Cancelled timer already gone");
                }
            }
            Err(_) => tracing::warn!(timer = self.id.0, "Timer queue busy, cancel skipped"),
        }
    }
}

impl std::fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerHandle").field("id", &self.id).finish()
    }
}

/// Millisecond timer queue carrying a payload per timer.
pub struct TimerQueue<T> {
    inner: Rc<RefCell<QueueInner<T>>>,
}

impl<T: Clone + 'static> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(QueueInner {
                now: 0,
                next_id: 1,
                entries: BTreeMap::new(),
            })),
        }
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.inner.borrow().now
    }

    /// Fire `payload` once after `delay`.
    pub fn schedule_once(&self, delay: Duration, payload: T) -> TimerHandle {
        self.schedule(delay, None, payload)
    }

    /// Fire `payload` every `interval` until the handle is dropped.
    pub fn schedule_repeating(&self, interval: Duration, payload: T) -> TimerHandle {
        let ms = duration_ms(interval).max(1);
        self.schedule(interval, Some(ms), payload)
    }

    fn schedule(&self, delay: Duration, interval: Option<u64>, payload: T) -> TimerHandle {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = TimerId(inner.next_id);
            inner.next_id += 1;
            let deadline = inner.now.saturating_add(duration_ms(delay));
            inner.entries.insert(
                id,
                Entry {
                    deadline,
                    interval,
                    payload,
                },
            );
            id
        };
        let shared: Rc<RefCell<dyn CancelTimer>> = self.inner.clone();
        TimerHandle {
            id,
            queue: Rc::downgrade(&shared),
        }
    }

    /// Pop the earliest timer due at or before `until`.
    ///
    /// The clock moves to that timer's deadline. Repeating timers are
    /// re-armed before their payload is returned.
    pub fn pop_due(&self, until: u64) -> Option<T> {
        let mut inner = self.inner.borrow_mut();
        let (id, deadline) = inner
            .entries
            .iter()
            .filter(|(_, e)| e.deadline <= until)
            .min_by_key(|(id, e)| (e.deadline, **id))
            .map(|(id, e)| (*id, e.deadline))?;

        inner.now = inner.now.max(deadline);
        let entry = inner.entries.get_mut(&id)?;
        match entry.interval {
            Some(interval) => {
                entry.deadline = deadline.saturating_add(interval);
                Some(entry.payload.clone())
            }
            None => inner.entries.remove(&id).map(|e| e.payload),
        }
    }

    /// Move the clock forward to `until` (never backwards).
    pub fn advance_to(&self, until: u64) {
        let mut inner = self.inner.borrow_mut();
        inner.now = inner.now.max(until);
    }

    /// Deadline of the next pending timer.
    pub fn next_deadline(&self) -> Option<u64> {
        self.inner.borrow().entries.values().map(|e| e.deadline).min()
    }

    pub fn pending(&self) -> usize {
        self.inner.borrow().entries.len()
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(queue: &TimerQueue<&'static str>, until: u64) -> Vec<&'static str> {
        let mut fired = Vec::new();
        while let Some(p) = queue.pop_due(until) {
            fired.push(p);
        }
        queue.advance_to(until);
        fired
    }

    #[test]
    fn fires_in_deadline_order() {
        let queue = TimerQueue::new();
        let _b = queue.schedule_once(Duration::from_millis(20), "b");
        let _a = queue.schedule_once(Duration::from_millis(10), "a");
        assert_eq!(drain(&queue, 5), Vec::<&str>::new());
        assert_eq!(drain(&queue, 30), vec!["a", "b"]);
        assert_eq!(queue.now(), 30);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn dropping_handle_cancels() {
        let queue = TimerQueue::new();
        let handle = queue.schedule_once(Duration::from_millis(10), "x");
        drop(handle);
        assert_eq!(drain(&queue, 100), Vec::<&str>::new());
    }

    #[test]
    fn explicit_cancel_cancels() {
        let queue = TimerQueue::new();
        let handle = queue.schedule_repeating(Duration::from_millis(10), "tick");
        assert_eq!(drain(&queue, 25), vec!["tick", "tick"]);
        handle.cancel();
        assert_eq!(drain(&queue, 100), Vec::<&str>::new());
    }

    #[test]
    fn repeating_timer_rearms() {
        let queue = TimerQueue::new();
        let _h = queue.schedule_repeating(Duration::from_millis(33), "tick");
        assert_eq!(drain(&queue, 100).len(), 3);
        assert_eq!(queue.next_deadline(), Some(132));
    }

    #[test]
    fn schedule_is_relative_to_clock() {
        let queue = TimerQueue::new();
        queue.advance_to(1000);
        let _h = queue.schedule_once(Duration::from_millis(5), "late");
        assert_eq!(queue.next_deadline(), Some(1005));
    }

    #[test]
    fn handle_outliving_queue_is_harmless() {
        let queue = TimerQueue::new();
        let handle = queue.schedule_once(Duration::from_millis(5), "x");
        drop(queue);
        drop(handle);
    }
}
