//! Shared-channel arbiter: mutual-exclusion transmission lock, the
//! length-priority preemptive queue, tx/backoff lists, and per-technology
//! airtime/outcome tallies.
//!
//! Grounded on `Coexistence.py::Channel` (the `tx_lock`/`tx_queue`
//! `simpy` resources, `tx_list`/`tx_list_NR`, `back_off_list`/
//! `back_off_list_NR`, `airtime_data*`/`airtime_control*` dicts, and the
//! failed/succeeded counters). The Python version stores live references
//! to every `Station`/`Gnb` so the dynamic CW controller can reach them;
//! here the channel only ever stores `NodeId`s, and `Simulation`
//! (src/sim.rs) resolves them against its own arenas — see the "cyclic
//! ownership" design note this crate follows.

use crate::model::NodeId;

/// One contender that reached the end of its backoff countdown at the
/// same simulated instant and is racing for `tx_queue`/`tx_lock`.
#[derive(Debug, Clone, Copy)]
pub struct Contender {
    pub node: NodeId,
    /// Frame/transmission duration in microseconds; the longest duration
    /// wins the race (lowest `simpy` priority number = highest rank).
    pub frame_duration: u64,
}

#[derive(Debug, Default)]
pub struct Channel {
    /// Node currently holding the transmission lock, if any.
    pub tx_lock_holder: Option<NodeId>,
    /// FIFO of nodes waiting for the channel to go idle before they may
    /// register a fresh backoff countdown (mirrors `tx_lock.request()`
    /// waiters in the original).
    pub lock_waiters: Vec<NodeId>,

    /// Nodes currently "transmitting" (includes both the lock holder and
    /// any simultaneous losers who must still hold the medium busy for
    /// their own frame duration).
    pub tx_wifi: Vec<usize>,
    pub tx_nru: Vec<usize>,

    /// Nodes currently counting down a backoff.
    pub backoff_wifi: Vec<usize>,
    pub backoff_nru: Vec<usize>,

    pub airtime_data_wifi: Vec<u64>,
    pub airtime_control_wifi: Vec<u64>,
    pub airtime_data_nru: Vec<u64>,
    pub airtime_control_nru: Vec<u64>,

    pub failed_wifi: u64,
    pub succeeded_wifi: u64,
    pub failed_nru: u64,
    pub succeeded_nru: u64,

    pub noise_floor_dbm: f64,
}

impl Channel {
    pub fn new(wifi_count: usize, nru_count: usize, noise_floor_dbm: f64) -> Self {
        Channel {
            tx_lock_holder: None,
            lock_waiters: Vec::new(),
            tx_wifi: Vec::new(),
            tx_nru: Vec::new(),
            backoff_wifi: Vec::new(),
            backoff_nru: Vec::new(),
            airtime_data_wifi: vec![0; wifi_count],
            airtime_control_wifi: vec![0; wifi_count],
            airtime_data_nru: vec![0; nru_count],
            airtime_control_nru: vec![0; nru_count],
            failed_wifi: 0,
            succeeded_wifi: 0,
            failed_nru: 0,
            succeeded_nru: 0,
            noise_floor_dbm,
        }
    }

    pub fn channel_idle(&self) -> bool {
        self.tx_lock_holder.is_none()
    }

    /// Evaluates the collision rule for whichever node is asking right
    /// now: collision if zero or more than one simultaneous participant,
    /// success iff exactly one (spec section 4.2).
    pub fn check_collision(&self) -> bool {
        let total = self.tx_wifi.len() + self.tx_nru.len();
        total == 1
    }

    /// Clears both tx lists and discards the priority queue's stale
    /// state, matching the original's fresh `PreemptiveResource` after
    /// every resolved contention.
    pub fn clear_tx_lists(&mut self) {
        self.tx_wifi.clear();
        self.tx_nru.clear();
    }
}
