//! NR-U LBT Cat-4 per-gNB state.
//!
//! Grounded on `Coexistence.py::Gnb`. Mirrors `wifi.rs::Station` with two
//! additions the Wi-Fi side doesn't need: the synchronization-slot
//! boundary tracker (`sync_slot_counter` in the original) and the extra
//! gap-mode phase between "backoff drawn" and "counting down" that waits
//! out the dead air before a sync-slot boundary.

use crate::model::Transmission;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NruPhase {
    /// Waiting for the channel to go idle before a fresh backoff draw.
    WaitingIdle,
    /// Gap mode only: backoff has been drawn and includes PP; waiting
    /// out the dead-air gap so the countdown finishes on a sync boundary.
    WaitingGap,
    /// Counting down backoff (registered in `channel.backoff_nru`).
    CountingBackoff,
    /// In flight for `transmission.total_time`, win or lose.
    Transmitting,
    /// Waiting the post-transmission delay before re-entering contention.
    WaitingPost,
}

#[derive(Debug)]
pub struct Gnb {
    pub id: usize,
    pub cw_min: u32,
    pub cw_max: u32,
    pub consecutive_failures: u32,
    pub transmit_power_dbm: f64,

    pub phase: NruPhase,
    pub residue: u64,
    pub wait_start: u64,
    pub pending_event_id: u64,
    pub holds_lock: bool,

    /// Next synchronization-slot boundary timestamp, advanced by the
    /// sync tracker side process (`Simulation::nru_sync_tick`).
    pub next_sync_boundary: u64,
    pub desync_offset: u64,

    pub transmission: Transmission,
    /// When the current logical transmission attempt was first generated;
    /// held across BEB retries and consumed on success, mirroring
    /// `wifi::Station`'s packet-queue latency bookkeeping (gNBs have no
    /// queue of their own in the data model, so this plays the same role
    /// for the one outstanding transmission).
    pub gen_time: u64,

    pub successes: u64,
    pub failures: u64,
    pub total_latency: u64,
    pub packet_count: u64,
}

impl Gnb {
    pub fn new(id: usize, cw_min: u32, cw_max: u32, transmit_power_dbm: f64, mcot_us: u64) -> Self {
        Gnb {
            id,
            cw_min,
            cw_max,
            consecutive_failures: 0,
            transmit_power_dbm,
            phase: NruPhase::WaitingIdle,
            residue: 0,
            wait_start: 0,
            pending_event_id: 0,
            holds_lock: false,
            next_sync_boundary: 0,
            desync_offset: 0,
            transmission: Transmission::new(mcot_us, 0),
            gen_time: 0,
            successes: 0,
            failures: 0,
            total_latency: 0,
            packet_count: 0,
        }
    }

    /// Same BEB bound shape as Wi-Fi (spec section 4.4 step 1).
    pub fn backoff_upper_bound(&self) -> u64 {
        let k = self.consecutive_failures.min(32);
        let scaled = 2u64.saturating_pow(k) * (self.cw_min as u64 + 1) - 1;
        scaled.min(self.cw_max as u64)
    }
}
