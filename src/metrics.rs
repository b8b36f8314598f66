//! Metrics aggregator: reduces a finished `Simulation` into one results
//! record.
//!
//! Grounded on the metrics block at the end of
//! `Coexistence.py::run_simulation` (collision probabilities, normalized
//! occupancy/efficiency, throughput, latency, traditional and Jain's
//! fairness, SINR) and on `Channel.calculate_sinr` for the SINR formula.

use crate::sim::Simulation;

const WIFI_DATA_RATE_MBPS: f64 = 866.7;
const NRU_DATA_RATE_MBPS: f64 = 1200.0;

/// One row of the per-run results table (spec section 4.6 / CSV layout).
#[derive(Debug, Clone, Copy)]
pub struct Results {
    pub seed: u64,
    pub wifi_nodes: u32,
    pub nru_nodes: u32,
    pub wifi_cw_min: u32,
    pub wifi_cw_max: u32,
    pub nru_cw_min: u32,
    pub nru_cw_max: u32,

    pub wifi_throughput_mbps: f64,
    pub nru_throughput_mbps: f64,
    pub total_throughput_mbps: f64,

    pub wifi_collision_prob: f64,
    pub nru_collision_prob: f64,

    pub wifi_avg_latency_us: f64,
    pub nru_avg_latency_us: f64,

    pub wifi_access_delay_us: f64,
    pub nru_access_delay_us: f64,

    pub wifi_sinr_db: f64,
    pub nru_sinr_db: f64,

    pub traditional_fairness: f64,
    pub jains_fairness: f64,
    pub joint_metric: f64,

    pub wifi_cot: f64,
    pub nru_cot: f64,
    pub total_cot: f64,
    pub wifi_efficiency: f64,
    pub nru_efficiency: f64,
    pub total_efficiency: f64,
}

/// Reduces a finished simulation into a `Results` row. `duration_us` is
/// the horizon the run was driven to, used to normalize occupancy and
/// efficiency.
pub fn compute(sim: &Simulation, seed: u64, duration_us: u64) -> Results {
    let time = duration_us as f64;
    let channel = sim.channel();
    let stations = sim.stations();
    let gnbs = sim.gnbs();

    let wifi_total = channel.failed_wifi + channel.succeeded_wifi;
    let wifi_collision_prob = if wifi_total > 0 {
        channel.failed_wifi as f64 / wifi_total as f64
    } else {
        0.0
    };
    let nru_total = channel.failed_nru + channel.succeeded_nru;
    let nru_collision_prob = if nru_total > 0 {
        channel.failed_nru as f64 / nru_total as f64
    } else {
        0.0
    };

    let channel_occupancy_wifi: u64 = channel
        .airtime_data_wifi
        .iter()
        .zip(&channel.airtime_control_wifi)
        .map(|(d, c)| d + c)
        .sum();
    let channel_efficiency_wifi: u64 = channel.airtime_data_wifi.iter().sum();
    let channel_occupancy_nru: u64 = channel
        .airtime_data_nru
        .iter()
        .zip(&channel.airtime_control_nru)
        .map(|(d, c)| d + c)
        .sum();
    let channel_efficiency_nru: u64 = channel.airtime_data_nru.iter().sum();

    let wifi_cot = channel_occupancy_wifi as f64 / time;
    let wifi_efficiency = channel_efficiency_wifi as f64 / time;
    let nru_cot = channel_occupancy_nru as f64 / time;
    let nru_efficiency = channel_efficiency_nru as f64 / time;
    let total_cot = wifi_cot + nru_cot;
    let total_efficiency = wifi_efficiency + nru_efficiency;

    let wifi_throughput_mbps = if !stations.is_empty() { wifi_efficiency * WIFI_DATA_RATE_MBPS } else { 0.0 };
    let nru_throughput_mbps = if !gnbs.is_empty() { nru_efficiency * NRU_DATA_RATE_MBPS } else { 0.0 };
    let total_throughput_mbps = wifi_throughput_mbps + nru_throughput_mbps;

    let wifi_latency: u64 = stations.iter().map(|s| s.total_latency).sum();
    let wifi_packet_count: u64 = stations.iter().map(|s| s.packet_count).sum();
    let wifi_avg_latency_us = if wifi_packet_count > 0 {
        wifi_latency as f64 / wifi_packet_count as f64
    } else {
        0.0
    };
    let nru_latency: u64 = gnbs.iter().map(|g| g.total_latency).sum();
    let nru_packet_count: u64 = gnbs.iter().map(|g| g.packet_count).sum();
    let nru_avg_latency_us = if nru_packet_count > 0 {
        nru_latency as f64 / nru_packet_count as f64
    } else {
        0.0
    };

    let (wifi_cw_min, wifi_cw_max) = stations.first().map(|s| (s.cw_min, s.cw_max)).unwrap_or((0, 0));
    let (nru_cw_min, nru_cw_max) = gnbs.first().map(|g| (g.cw_min, g.cw_max)).unwrap_or((0, 0));

    let wifi_access_delay_us = if !stations.is_empty() {
        let mut d = (wifi_cw_min as f64 / 2.0) * 9.0;
        if wifi_collision_prob > 0.0 {
            d *= 1.0 + wifi_collision_prob * 2.0;
        }
        d
    } else {
        0.0
    };
    let nru_access_delay_us = if !gnbs.is_empty() {
        let pp = sim.nru_prioritization_period_us();
        let mut d = (nru_cw_min as f64 / 2.0) * sim.nru_observation_slot_duration_us() as f64 + pp as f64;
        if nru_collision_prob > 0.0 {
            d *= 1.0 + nru_collision_prob * 2.0;
        }
        d
    } else {
        0.0
    };

    let wifi_sinr_db = if !stations.is_empty() {
        let sum: f64 = (0..stations.len())
            .map(|i| sinr_db(stations[i].transmit_power_dbm, i, true, sim))
            .sum();
        sum / stations.len() as f64
    } else {
        0.0
    };
    let nru_sinr_db = if !gnbs.is_empty() {
        let sum: f64 = (0..gnbs.len()).map(|i| sinr_db(gnbs[i].transmit_power_dbm, i, false, sim)).sum();
        sum / gnbs.len() as f64
    } else {
        0.0
    };

    let traditional_fairness = if wifi_cot > 0.0 || nru_cot > 0.0 {
        total_cot.powi(2) / (2.0 * (wifi_cot.powi(2) + nru_cot.powi(2)))
    } else {
        0.0
    };

    let mut throughputs = Vec::with_capacity(stations.len() + gnbs.len());
    for &airtime in &channel.airtime_data_wifi {
        throughputs.push((airtime as f64 / time) * WIFI_DATA_RATE_MBPS);
    }
    for &airtime in &channel.airtime_data_nru {
        throughputs.push((airtime as f64 / time) * NRU_DATA_RATE_MBPS);
    }
    let jains_fairness = if !throughputs.is_empty() {
        let sum: f64 = throughputs.iter().sum();
        let sum_sq: f64 = throughputs.iter().map(|t| t * t).sum();
        if sum_sq > 0.0 {
            sum.powi(2) / (throughputs.len() as f64 * sum_sq)
        } else {
            0.0
        }
    } else {
        0.0
    };

    let joint_metric = traditional_fairness * total_cot;

    Results {
        seed,
        wifi_nodes: stations.len() as u32,
        nru_nodes: gnbs.len() as u32,
        wifi_cw_min,
        wifi_cw_max,
        nru_cw_min,
        nru_cw_max,
        wifi_throughput_mbps,
        nru_throughput_mbps,
        total_throughput_mbps,
        wifi_collision_prob,
        nru_collision_prob,
        wifi_avg_latency_us,
        nru_avg_latency_us,
        wifi_access_delay_us,
        nru_access_delay_us,
        wifi_sinr_db,
        nru_sinr_db,
        traditional_fairness,
        jains_fairness,
        joint_metric,
        wifi_cot,
        nru_cot,
        total_cot,
        wifi_efficiency,
        nru_efficiency,
        total_efficiency,
    }
}

/// SINR for node `index` of technology `is_wifi`, against whichever nodes
/// are captured transmitting in `channel.tx_wifi`/`tx_nru` at the instant
/// `sim` is evaluated (spec section 4.6: "at the moment of evaluation" —
/// typically empty right after a run, which is why the 100 dB ceiling is
/// the common case, not a bug).
fn sinr_db(tx_power_dbm: f64, index: usize, is_wifi: bool, sim: &Simulation) -> f64 {
    let signal_mw = 10f64.powf(tx_power_dbm / 10.0);
    let channel = sim.channel();
    let mut interference_mw = 0.0;
    for &other in &channel.tx_wifi {
        if !(is_wifi && other == index) {
            interference_mw += 10f64.powf(sim.stations()[other].transmit_power_dbm / 10.0);
        }
    }
    for &other in &channel.tx_nru {
        if !(!is_wifi && other == index) {
            interference_mw += 10f64.powf(sim.gnbs()[other].transmit_power_dbm / 10.0);
        }
    }
    let noise_mw = 10f64.powf(channel.noise_floor_dbm / 10.0);
    let total = interference_mw + noise_mw;
    if total > 0.0 {
        10.0 * (signal_mw / total).log10()
    } else {
        100.0
    }
}
