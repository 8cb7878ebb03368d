//! Timeout queue on a virtual clock
//!
//! The host owns the clock and moves it forward with [`TimerQueue::advance_to`].
//! Timers fire in deadline order (ties in registration order), and the clock
//! reads as the timer's deadline while its callback runs, so callbacks that
//! re-arm themselves observe a consistent `now`.

use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::rc::Rc;

new_key_type! {
    /// Handle to a pending timeout
    pub struct TimerId;
}

struct Timer {
    deadline: f64,
    seq: u64,
    callback: Box<dyn FnOnce()>,
}

struct TimerInner {
    timers: SlotMap<TimerId, Timer>,
    now_ms: f64,
    next_seq: u64,
}

/// Shared timeout queue
///
/// Cloning yields another handle to the same queue.
#[derive(Clone)]
pub struct TimerQueue {
    inner: Rc<RefCell<TimerInner>>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(TimerInner {
                timers: SlotMap::with_key(),
                now_ms: 0.0,
                next_seq: 0,
            })),
        }
    }

    /// Current virtual time in milliseconds
    pub fn now(&self) -> f64 {
        self.inner.borrow().now_ms
    }

    /// Schedule `callback` to run `delay_ms` from now
    pub fn set_timeout<F>(&self, delay_ms: f64, callback: F) -> TimerId
    where
        F: FnOnce() + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let deadline = inner.now_ms + delay_ms.max(0.0);
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.timers.insert(Timer {
            deadline,
            seq,
            callback: Box::new(callback),
        })
    }

    /// Cancel a pending timeout
    ///
    /// Returns `true` if a pending timer was removed. Clearing a timer that
    /// already fired or was already cleared is a no-op.
    pub fn clear(&self, id: TimerId) -> bool {
        self.inner.borrow_mut().timers.remove(id).is_some()
    }

    /// Whether `id` is still waiting to fire
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.inner.borrow().timers.contains_key(id)
    }

    /// Number of timers waiting to fire
    pub fn pending(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    /// Deadline of the earliest pending timer
    pub fn next_deadline(&self) -> Option<f64> {
        self.inner
            .borrow()
            .timers
            .values()
            .map(|t| t.deadline)
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Move the clock forward to `now_ms`, firing every timer that falls due
    ///
    /// Returns the number of callbacks that ran. The clock never moves
    /// backwards; an earlier `now_ms` only fires nothing.
    pub fn advance_to(&self, now_ms: f64) -> usize {
        let mut fired = 0;
        loop {
            let due = {
                let mut inner = self.inner.borrow_mut();
                let next = inner
                    .timers
                    .iter()
                    .filter(|(_, t)| t.deadline <= now_ms)
                    .min_by(|(_, a), (_, b)| {
                        a.deadline.total_cmp(&b.deadline).then(a.seq.cmp(&b.seq))
                    })
                    .map(|(id, _)| id);
                match next.and_then(|id| inner.timers.remove(id)) {
                    Some(timer) => {
                        if timer.deadline > inner.now_ms {
                            inner.now_ms = timer.deadline;
                        }
                        Some(timer.callback)
                    }
                    None => None,
                }
            };

            match due {
                Some(callback) => {
                    callback();
                    fired += 1;
                }
                None => break,
            }
        }

        let mut inner = self.inner.borrow_mut();
        if now_ms > inner.now_ms {
            inner.now_ms = now_ms;
        }
        if fired > 0 {
            tracing::trace!(fired, now_ms = inner.now_ms, "timers fired");
        }
        fired
    }
}

impl Default for TimerQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_fires_in_deadline_order() {
        let timers = TimerQueue::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for (delay, tag) in [(300.0, "c"), (100.0, "a"), (200.0, "b"), (100.0, "a2")] {
            let log = log.clone();
            timers.set_timeout(delay, move || log.borrow_mut().push(tag));
        }

        assert_eq!(timers.advance_to(1000.0), 4);
        assert_eq!(*log.borrow(), vec!["a", "a2", "b", "c"]);
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let timers = TimerQueue::new();
        let id = timers.set_timeout(50.0, || {});

        assert!(timers.clear(id));
        assert!(!timers.clear(id));
        assert_eq!(timers.advance_to(100.0), 0);

        let fired = timers.set_timeout(10.0, || {});
        timers.advance_to(200.0);
        assert!(!timers.clear(fired));
    }

    #[test]
    fn test_callback_sees_deadline_as_now() {
        let timers = TimerQueue::new();
        let seen = Rc::new(Cell::new(0.0));
        let handle = timers.clone();
        let seen_in = seen.clone();
        timers.set_timeout(250.0, move || seen_in.set(handle.now()));

        timers.advance_to(1000.0);
        assert_eq!(seen.get(), 250.0);
        assert_eq!(timers.now(), 1000.0);
    }

    #[test]
    fn test_rearm_from_callback() {
        let timers = TimerQueue::new();
        let count = Rc::new(Cell::new(0));

        let handle = timers.clone();
        let count_in = count.clone();
        timers.set_timeout(100.0, move || {
            count_in.set(count_in.get() + 1);
            let count_again = count_in.clone();
            handle.set_timeout(100.0, move || count_again.set(count_again.get() + 1));
        });

        timers.advance_to(150.0);
        assert_eq!(count.get(), 1);
        assert_eq!(timers.next_deadline(), Some(200.0));

        timers.advance_to(200.0);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_clock_never_rewinds() {
        let timers = TimerQueue::new();
        timers.advance_to(500.0);
        timers.advance_to(100.0);
        assert_eq!(timers.now(), 500.0);
    }
}
