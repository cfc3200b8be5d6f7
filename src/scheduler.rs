use std::cmp::Ordering;
use std::collections::BinaryHeap;

struct Timer<T> {
    due_ms: u64,
    seq: u64,
    epoch: u64,
    task: T,
}

// Min-heap on (due_ms, seq): earliest first, ties in scheduling order
impl<T> Ord for Timer<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_ms
            .cmp(&self.due_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<T> PartialOrd for Timer<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> PartialEq for Timer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due_ms == other.due_ms && self.seq == other.seq
    }
}

impl<T> Eq for Timer<T> {}

/// One-shot delayed tasks on a virtual clock.
///
/// Time only advances through `tick`, so tests can drain a whole enemy turn
/// without sleeping. Each timer carries the epoch it was scheduled in; after
/// `invalidate` older timers are never returned.
pub struct Scheduler<T> {
    now_ms: u64,
    next_seq: u64,
    epoch: u64,
    timers: BinaryHeap<Timer<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_seq: 0,
            epoch: 0,
            timers: BinaryHeap::new(),
        }
    }

    #[cfg(test)]
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.timers.iter().filter(|t| t.epoch == self.epoch).count()
    }

    pub fn schedule(&mut self, delay_ms: u64, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.push(Timer {
            due_ms: self.now_ms + delay_ms,
            seq,
            epoch: self.epoch,
            task,
        });
    }

    pub fn tick(&mut self, delta_ms: u64) {
        self.now_ms += delta_ms;
    }

    /// Next due task from the current epoch, if any.
    ///
    /// Returns one task at a time so the caller can schedule follow-ups that
    /// may themselves be due in the same tick.
    pub fn pop_due(&mut self) -> Option<T> {
        loop {
            let due = self.timers.peek().map(|t| t.due_ms <= self.now_ms)?;
            if !due {
                return None;
            }
            let timer = self.timers.pop()?;
            if timer.epoch == self.epoch {
                return Some(timer.task);
            }
        }
    }

    /// Drops every pending timer. Anything scheduled before this call will never fire.
    pub fn invalidate(&mut self) {
        self.epoch += 1;
        self.timers.clear();
    }

    /// Jumps the clock to the next live timer and returns it. Test helper for
    /// running a sequence to completion.
    #[cfg(test)]
    pub fn advance_to_next(&mut self) -> Option<T> {
        let next_due = self
            .timers
            .iter()
            .filter(|t| t.epoch == self.epoch)
            .map(|t| t.due_ms)
            .min()?;
        if next_due > self.now_ms {
            self.now_ms = next_due;
        }
        self.pop_due()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_fire_in_due_order() {
        let mut sched = Scheduler::new();
        sched.schedule(400, "b");
        sched.schedule(250, "a");
        sched.schedule(400, "c");

        sched.tick(249);
        assert_eq!(sched.pop_due(), None);
        sched.tick(1);
        assert_eq!(sched.pop_due(), Some("a"));
        assert_eq!(sched.pop_due(), None);
        sched.tick(500);
        assert_eq!(sched.pop_due(), Some("b"));
        assert_eq!(sched.pop_due(), Some("c"));
        assert_eq!(sched.pop_due(), None);
    }

    #[test]
    fn invalidate_drops_stale_timers() {
        let mut sched = Scheduler::new();
        sched.schedule(100, 1);
        sched.schedule(200, 2);
        sched.invalidate();
        sched.schedule(300, 3);
        sched.tick(1_000);
        assert_eq!(sched.pop_due(), Some(3));
        assert_eq!(sched.pop_due(), None);
    }

    #[test]
    fn follow_up_scheduled_from_due_task_uses_current_time() {
        let mut sched = Scheduler::new();
        sched.schedule(100, 1);
        sched.tick(150);
        assert_eq!(sched.pop_due(), Some(1));
        sched.schedule(100, 2);
        assert_eq!(sched.pop_due(), None);
        sched.tick(100);
        assert_eq!(sched.pop_due(), Some(2));
    }

    #[test]
    fn advance_to_next_jumps_the_clock() {
        let mut sched = Scheduler::new();
        sched.schedule(1_000, "finish");
        assert_eq!(sched.advance_to_next(), Some("finish"));
        assert_eq!(sched.now_ms(), 1_000);
        assert_eq!(sched.advance_to_next(), None);
    }
}
