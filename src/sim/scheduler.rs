/// Virtual-time timer queue.
///
/// Timers are keyed by a caller-defined value `T` and fire in due order
/// (ties in insertion order). Time only moves when the owner pops due
/// timers, and a timer scheduled from inside a handler is measured from
/// the moment the handler's timer was due, not from wall-clock "now".
/// Chained delays therefore never drift with frame jitter.

use std::time::Duration;

struct Pending<T> {
    due: Duration,
    seq: u64,
    timer: T,
}

pub struct Scheduler<T> {
    now: Duration,
    next_seq: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Scheduler {
            now: Duration::ZERO,
            next_seq: 0,
            pending: Vec::with_capacity(8),
        }
    }

    #[allow(dead_code)]
    /// Virtual time of the last fired timer (or the last `advance_to`).
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule(&mut self, delay: Duration, timer: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Pending { due: self.now + delay, seq, timer });
    }

    /// Remove every pending timer matching `pred`. Returns how many went.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let before = self.pending.len();
        self.pending.retain(|p| !pred(&p.timer));
        before - self.pending.len()
    }

    pub fn cancel_all(&mut self) -> usize {
        let n = self.pending.len();
        self.pending.clear();
        n
    }

    /// Pop the earliest timer due at or before `until`, moving virtual
    /// time to its due instant.
    pub fn pop_due(&mut self, until: Duration) -> Option<T> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= until)
            .min_by_key(|(_, p)| (p.due, p.seq))
            .map(|(i, _)| i)?;
        let p = self.pending.swap_remove(idx);
        self.now = self.now.max(p.due);
        Some(p.timer)
    }

    /// Move virtual time forward once nothing else is due.
    pub fn advance_to(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[allow(dead_code)]
    pub fn contains(&self, mut pred: impl FnMut(&T) -> bool) -> bool {
        self.pending.iter().any(|p| pred(&p.timer))
    }
}
