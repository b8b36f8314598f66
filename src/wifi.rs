//! Wi-Fi DCF per-station state.
//!
//! Grounded on `Coexistence.py::Station`. The original holds its process
//! as a live `simpy` generator; this crate represents the same life
//! cycle (generate-frame -> contend -> transmit -> record) as an
//! explicit phase driven by `Simulation` (src/sim.rs), since there is no
//! coroutine runtime here (see the "interruption-driven backoff" design
//! note: a tagged resume value rather than a raised exception).

use std::collections::VecDeque;

use crate::model::{Frame, Packet};

/// What a station is doing right now; `Simulation` advances this on
/// every kernel wake-up and every channel event that concerns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiPhase {
    /// Waiting for the channel to go idle before a fresh backoff draw.
    WaitingIdle,
    /// Counting down backoff (registered in `channel.backoff_wifi`).
    CountingBackoff,
    /// In flight for the duration of `frame.frame_time`, win or lose.
    Transmitting,
    /// Waiting the post-frame delay (ACK on success, ack_timeout on
    /// collision) before re-entering contention.
    WaitingPost,
}

#[derive(Debug)]
pub struct Station {
    pub id: usize,
    pub cw_min: u32,
    pub cw_max: u32,
    pub consecutive_failures: u32,
    pub transmit_power_dbm: f64,

    pub phase: WifiPhase,
    /// Backoff residue in microseconds, re-derived on every interrupt
    /// rather than trusted from the kernel's (discarded) timeout.
    pub residue: u64,
    /// Simulated time the current countdown/wait began.
    pub wait_start: u64,
    /// Event id of the currently pending kernel wake-up, used to detect
    /// a stale fire left behind by an interruption.
    pub pending_event_id: u64,
    /// True for the whole frame-duration + post-frame wait iff this
    /// station won the tx_queue/tx_lock race for the current contention.
    pub holds_lock: bool,

    pub frame: Frame,
    pub packet_queue: VecDeque<Packet>,
    pub next_packet_id: u64,

    pub successes: u64,
    pub failures: u64,
    pub total_latency: u64,
    pub packet_count: u64,
}

impl Station {
    pub fn new(id: usize, cw_min: u32, cw_max: u32, transmit_power_dbm: f64, frame_time: u64) -> Self {
        Station {
            id,
            cw_min,
            cw_max,
            consecutive_failures: 0,
            transmit_power_dbm,
            phase: WifiPhase::WaitingIdle,
            residue: 0,
            wait_start: 0,
            pending_event_id: 0,
            holds_lock: false,
            frame: Frame::new(frame_time, 0),
            packet_queue: VecDeque::new(),
            next_packet_id: 0,
            successes: 0,
            failures: 0,
            total_latency: 0,
            packet_count: 0,
        }
    }

    pub fn queue_packet(&mut self, now: u64) {
        self.packet_queue.push_back(Packet {
            id: self.next_packet_id,
            gen_time: now,
        });
        self.next_packet_id += 1;
    }

    /// Binary-exponential-backoff upper bound given `k` prior consecutive
    /// failures (spec section 4.3): `min(2^k * (CW_min+1) - 1, CW_max)`.
    pub fn backoff_upper_bound(&self) -> u64 {
        let k = self.consecutive_failures.min(32);
        let scaled = 2u64.saturating_pow(k) * (self.cw_min as u64 + 1) - 1;
        scaled.min(self.cw_max as u64)
    }
}
