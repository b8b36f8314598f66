//! Discrete-event kernel: an integer-microsecond priority queue of
//! scheduled wake-ups, driving a set of cooperative processes.
//!
//! The source simulation library runs an event loop with `yield`-based
//! processes; here that is mapped to an explicit min-heap of
//! `(time, sequence)`-keyed events. Processes are plain structs rather
//! than coroutines: each owns a "pending event id" it compares against
//! the id the kernel hands back on wake, so a process can tell a live
//! wake-up from a stale one left behind by an interruption that already
//! rescheduled it.
//!
//! Ties at equal timestamps are broken by insertion order (FIFO), never
//! by token identity, so two processes racing to wake at the same
//! instant are always ordered the same way across runs.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Opaque handle for who receives a scheduled wake-up. The kernel knows
/// nothing about the actor beyond equality and cloning.
pub trait ActorToken: Clone + std::fmt::Debug {}
impl<T: Clone + std::fmt::Debug> ActorToken for T {}

#[derive(Debug, Clone)]
struct Event<T: ActorToken> {
    time: u64,
    seq: u64,
    id: u64,
    token: T,
}

impl<T: ActorToken> PartialEq for Event<T> {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.seq == other.seq
    }
}
impl<T: ActorToken> Eq for Event<T> {}

impl<T: ActorToken> Ord for Event<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap (a max-heap) pops the smallest time/seq first.
        other
            .time
            .cmp(&self.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}
impl<T: ActorToken> PartialOrd for Event<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A fired wake-up: the time it occurred, the monotonic id assigned at
/// scheduling time (for staleness checks), and the token identifying who
/// it was for.
#[derive(Debug, Clone)]
pub struct Fired<T: ActorToken> {
    pub time: u64,
    pub id: u64,
    pub token: T,
}

/// Min-heap event kernel over virtual microsecond time.
pub struct Kernel<T: ActorToken> {
    heap: BinaryHeap<Event<T>>,
    now: u64,
    next_seq: u64,
    next_id: u64,
}

impl<T: ActorToken> Kernel<T> {
    pub fn new() -> Self {
        Kernel {
            heap: BinaryHeap::new(),
            now: 0,
            next_seq: 0,
            next_id: 1,
        }
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    /// Schedules `token` to wake after `delay` microseconds from the
    /// current time. Returns the event id the caller should remember and
    /// compare against on wake to detect staleness.
    pub fn schedule(&mut self, delay: u64, token: T) -> u64 {
        self.schedule_at(self.now + delay, token)
    }

    /// Schedules `token` to wake at absolute time `time`. `time` must be
    /// `>= now`; scheduling into the past is a caller bug.
    pub fn schedule_at(&mut self, time: u64, token: T) -> u64 {
        debug_assert!(time >= self.now, "cannot schedule an event in the past");
        let id = self.next_id;
        self.next_id += 1;
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Event { time, seq, id, token });
        id
    }

    /// Time of the next pending event, if any.
    pub fn peek_time(&self) -> Option<u64> {
        self.heap.peek().map(|e| e.time)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Pops the next event, advancing `now` to its timestamp. Returns
    /// `None` if the queue is empty.
    pub fn pop(&mut self) -> Option<Fired<T>> {
        let ev = self.heap.pop()?;
        self.now = ev.time;
        Some(Fired {
            time: ev.time,
            id: ev.id,
            token: ev.token,
        })
    }

    /// Pops and returns the next event only if it is due at or before
    /// `horizon`; otherwise leaves the heap untouched and advances `now`
    /// to `horizon` if further in the future than the current time.
    pub fn pop_until(&mut self, horizon: u64) -> Option<Fired<T>> {
        match self.heap.peek() {
            Some(ev) if ev.time <= horizon => self.pop(),
            _ => {
                if self.now < horizon {
                    self.now = horizon;
                }
                None
            }
        }
    }
}

impl<T: ActorToken> Default for Kernel<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_tie_break_at_equal_time() {
        let mut k: Kernel<&'static str> = Kernel::new();
        k.schedule(10, "a");
        k.schedule(10, "b");
        k.schedule(10, "c");
        let first = k.pop().unwrap();
        let second = k.pop().unwrap();
        let third = k.pop().unwrap();
        assert_eq!(first.token, "a");
        assert_eq!(second.token, "b");
        assert_eq!(third.token, "c");
        assert_eq!(first.time, 10);
    }

    #[test]
    fn pops_in_time_order_regardless_of_schedule_order() {
        let mut k: Kernel<u32> = Kernel::new();
        k.schedule(30, 3);
        k.schedule(10, 1);
        k.schedule(20, 2);
        assert_eq!(k.pop().unwrap().token, 1);
        assert_eq!(k.pop().unwrap().token, 2);
        assert_eq!(k.pop().unwrap().token, 3);
    }

    #[test]
    fn stale_event_id_detectable_by_caller() {
        let mut k: Kernel<u32> = Kernel::new();
        let old_id = k.schedule(10, 1);
        // Simulate an interruption: reschedule the same token to a new time.
        let new_id = k.schedule(5, 1);
        assert_ne!(old_id, new_id);
        let fired = k.pop().unwrap();
        assert_eq!(fired.id, new_id);
        assert_eq!(fired.time, 5);
    }

    #[test]
    fn pop_until_respects_horizon() {
        let mut k: Kernel<u32> = Kernel::new();
        k.schedule(50, 1);
        assert!(k.pop_until(10).is_none());
        assert_eq!(k.now(), 10);
        assert!(k.pop_until(100).is_some());
    }
}
