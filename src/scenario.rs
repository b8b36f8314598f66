//! Scenario/sweep runner: drives a grid of `Simulation` runs and collects
//! one `Results` row per cell.
//!
//! Grounded on `run_coexistenxe_matrix.py`'s nested loop (1..=5 Wi-Fi
//! stations × 1..=5 gNBs, a fixed number of repeated runs per cell, seed
//! derived as `base_seed + run_index`) and `run_all_modes.py`'s simpler
//! loop over LBT-variant × controller-on/off combinations. Neither script
//! carries core simulation logic — both are thin drivers over
//! `run_simulation(...)` — so this module reproduces only the iteration
//! shape and seed derivation, not the `pandas`/`matplotlib` reporting the
//! originals also do (kept as a Non-goal per spec section 1).

use log::info;

use crate::config::SimConfig;
use crate::metrics::{self, Results};
use crate::sim::Simulation;

/// Ranges for a Wi-Fi-count × gNB-count matrix sweep, `runs` repeated
/// seeds per cell.
#[derive(Debug, Clone)]
pub struct SweepGrid {
    pub wifi_counts: Vec<u32>,
    pub gnb_counts: Vec<u32>,
    pub runs: u32,
    pub base_seed: u64,
}

impl SweepGrid {
    /// The 1..=5 × 1..=5 matrix `run_coexistenxe_matrix.py` defaults to.
    pub fn default_matrix(runs: u32, base_seed: u64) -> Self {
        SweepGrid {
            wifi_counts: (1..=5).collect(),
            gnb_counts: (1..=5).collect(),
            runs,
            base_seed,
        }
    }
}

/// Runs one simulation to completion and reduces it to a `Results` row.
pub fn run_one(cfg: &SimConfig, seed: u64) -> Results {
    let mut cfg = cfg.clone();
    cfg.seed = seed;
    let duration_us = cfg.duration_us();
    let mut sim = Simulation::new(&cfg);
    sim.run(duration_us);
    let results = metrics::compute(&sim, seed, duration_us);
    info!(
        target: "scenario",
        "seed={} wifi_nodes={} nru_nodes={} wifi_pcol={:.4} nru_pcol={:.4} wifi_thpt={:.2} nru_thpt={:.2} jains={:.4}",
        results.seed,
        results.wifi_nodes,
        results.nru_nodes,
        results.wifi_collision_prob,
        results.nru_collision_prob,
        results.wifi_throughput_mbps,
        results.nru_throughput_mbps,
        results.jains_fairness,
    );
    results
}

/// Walks `grid` and runs every (wifi_count, gnb_count, run) cell,
/// returning one `Results` row per cell in the same nested iteration
/// order as the original (wifi_count outer, gnb_count middle, run inner).
pub fn run_sweep(base_cfg: &SimConfig, grid: &SweepGrid) -> Vec<Results> {
    let mut out = Vec::with_capacity(grid.wifi_counts.len() * grid.gnb_counts.len() * grid.runs as usize);
    for &wifi_count in &grid.wifi_counts {
        for &gnb_count in &grid.gnb_counts {
            for run in 0..grid.runs {
                let seed = grid.base_seed + run as u64;
                let mut cfg = base_cfg.clone();
                cfg.wifi_station_count = wifi_count;
                cfg.nru_gnb_count = gnb_count;
                out.push(run_one(&cfg, seed));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ControllerConfig, NruConfig, NruMode, WifiConfig};
    use crate::times::Times;

    fn base_cfg() -> SimConfig {
        SimConfig {
            wifi_station_count: 2,
            nru_gnb_count: 2,
            seed: 1,
            simulation_time_s: 0.05,
            wifi: WifiConfig::default(),
            nru: NruConfig::default(),
            nru_mode: NruMode::Gap,
            controller: ControllerConfig::default(),
            times: Times::default(),
            noise_floor_dbm: -95.0,
            transmit_power_dbm: 23.0,
        }
    }

    #[test]
    fn sweep_visits_every_cell_in_order() {
        let grid = SweepGrid {
            wifi_counts: vec![1, 2],
            gnb_counts: vec![1],
            runs: 2,
            base_seed: 10,
        };
        let results = run_sweep(&base_cfg(), &grid);
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].wifi_nodes, 1);
        assert_eq!(results[2].wifi_nodes, 2);
        assert_eq!(results[0].seed, 10);
        assert_eq!(results[1].seed, 11);
    }

    #[test]
    fn single_run_produces_finite_metrics() {
        let results = run_one(&base_cfg(), 7);
        assert!(results.wifi_throughput_mbps.is_finite());
        assert!(results.jains_fairness.is_finite());
        assert!(results.wifi_collision_prob >= 0.0 && results.wifi_collision_prob <= 1.0);
    }
}
