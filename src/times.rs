//! Time-constant collaborators for the channel-access state machines.
//!
//! The source protocol specifications treat DIFS/SIFS/slot timing and
//! frame-time arithmetic as externally supplied constants (a `Times`
//! collaborator). This module provides one concrete, documented
//! realization using standard 802.11g OFDM numbers so the crate runs
//! standalone; a caller that needs a different PHY table constructs its
//! own `Times` and passes it into `SimConfig`.

use serde::Deserialize;

/// MCS index -> PHY data rate in Mbps, 802.11g/OFDM, 20 MHz, long GI.
const MCS_RATES_MBPS: [f64; 8] = [6.0, 9.0, 12.0, 18.0, 24.0, 36.0, 48.0, 54.0];

/// Channel-access timing constants, all in microseconds unless noted.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Times {
    /// DCF inter-frame space.
    pub difs: u64,
    /// Short inter-frame space.
    pub sifs: u64,
    /// Backoff slot duration.
    pub slot_time: u64,
    /// Fixed ACK frame transmission time.
    pub ack_frame_time: u64,
    /// Wait for an ACK before declaring the frame lost.
    pub ack_timeout: u64,
    /// Basic (ACK) rate in Mbps, used only for documentation purposes here.
    pub basic_rate_mbps: f64,
}

impl Default for Times {
    fn default() -> Self {
        Times {
            difs: 34,
            sifs: 16,
            slot_time: 9,
            ack_frame_time: 44,
            ack_timeout: 100,
            basic_rate_mbps: 6.0,
        }
    }
}

impl Times {
    /// Computed frame transmission time in microseconds for `payload_bytes`
    /// at the given MCS index, assuming a flat per-MCS rate table.
    ///
    /// This is the "computed" path of the frame-duration Open Question;
    /// the alternative fixed-length path lives on `WifiConfig::fixed_frame_time`.
    pub fn frame_time(&self, payload_bytes: u32, mcs: usize) -> u64 {
        let rate = MCS_RATES_MBPS
            .get(mcs)
            .copied()
            .unwrap_or(*MCS_RATES_MBPS.last().unwrap());
        let bits = payload_bytes as f64 * 8.0;
        let micros = bits / rate;
        micros.round() as u64
    }
}
