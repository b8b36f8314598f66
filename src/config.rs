//! Run configuration structs.
//!
//! Plain `#[derive(Deserialize)]` structs with documented field units,
//! mirroring the teacher's `Scene`/`RadioModuleConfig` pattern. Parsing
//! from JSON is offered as a thin convenience for callers that want a
//! scenario file; the library itself has no opinion on where the values
//! come from.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::times::Times;

/// Wi-Fi DCF configuration, matching `Config` in the original model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WifiConfig {
    /// MAC payload size in bytes.
    pub data_size: u32,
    pub cw_min: u32,
    pub cw_max: u32,
    /// Consecutive failures before a frame is dropped.
    pub r_limit: u32,
    pub mcs: usize,
    /// Open Question (b): when set, overrides the computed frame time
    /// with this fixed value in microseconds, matching the original's
    /// hard-coded 5400 us path. `None` (the default) uses the computed
    /// path via `Times::frame_time`.
    #[serde(default)]
    pub fixed_frame_time: Option<u64>,
}

impl Default for WifiConfig {
    fn default() -> Self {
        WifiConfig {
            data_size: 1472,
            cw_min: 15,
            cw_max: 63,
            r_limit: 7,
            mcs: 7,
            fixed_frame_time: None,
        }
    }
}

/// NR-U LBT Cat-4 configuration, matching `Config_NR` in the original model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NruConfig {
    /// Deterministic part of the prioritization period, in microseconds.
    pub deter_period: u64,
    /// Observation slot duration, in microseconds.
    pub observation_slot_duration: u64,
    /// Synchronization slot duration, in microseconds.
    pub synchronization_slot_duration: u64,
    pub max_sync_slot_desync: u64,
    pub min_sync_slot_desync: u64,
    /// Number of observation slots in the prioritization period.
    pub m: u32,
    pub cw_min: u32,
    pub cw_max: u32,
    /// Maximum channel occupancy time, in milliseconds.
    pub mcot: u64,
}

impl Default for NruConfig {
    fn default() -> Self {
        NruConfig {
            deter_period: 16,
            observation_slot_duration: 9,
            synchronization_slot_duration: 1000,
            max_sync_slot_desync: 1000,
            min_sync_slot_desync: 0,
            m: 3,
            cw_min: 15,
            cw_max: 63,
            mcot: 6,
        }
    }
}

/// Which NR-U LBT variant is active for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NruMode {
    /// Backoff is aligned to end exactly at a synchronization-slot boundary.
    Gap,
    /// No alignment; a reservation signal pads the gap instead.
    ReservationSignal,
}

/// Dynamic contention-window controller tuning parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ControllerConfig {
    pub enabled: bool,
    #[serde(default = "default_measurement_interval")]
    pub measurement_interval: u64,
    #[serde(default = "default_adjustment_step")]
    pub adjustment_step: u32,
    #[serde(default = "default_target_fairness")]
    pub target_fairness: f64,
    #[serde(default = "default_min_cw")]
    pub min_cw: u32,
    #[serde(default = "default_max_cw")]
    pub max_cw: u32,
}

fn default_measurement_interval() -> u64 {
    1_000_000
}
fn default_adjustment_step() -> u32 {
    5
}
fn default_target_fairness() -> f64 {
    0.95
}
fn default_min_cw() -> u32 {
    7
}
fn default_max_cw() -> u32 {
    511
}

impl Default for ControllerConfig {
    fn default() -> Self {
        ControllerConfig {
            enabled: false,
            measurement_interval: default_measurement_interval(),
            adjustment_step: default_adjustment_step(),
            target_fairness: default_target_fairness(),
            min_cw: default_min_cw(),
            max_cw: default_max_cw(),
        }
    }
}

/// Top-level per-run configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimConfig {
    pub wifi_station_count: u32,
    pub nru_gnb_count: u32,
    pub seed: u64,
    /// Simulated duration, in seconds.
    pub simulation_time_s: f64,
    pub wifi: WifiConfig,
    pub nru: NruConfig,
    pub nru_mode: NruMode,
    pub controller: ControllerConfig,
    #[serde(default)]
    pub times: Times,
    /// dBm, applied uniformly as background noise in SINR calculations.
    #[serde(default = "default_noise_floor_dbm")]
    pub noise_floor_dbm: f64,
    /// dBm, applied uniformly to every station/gNB's transmissions.
    #[serde(default = "default_transmit_power_dbm")]
    pub transmit_power_dbm: f64,
}

fn default_noise_floor_dbm() -> f64 {
    -95.0
}
fn default_transmit_power_dbm() -> f64 {
    23.0
}

impl SimConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let cfg: SimConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates invariants that are programming faults, not simulated
    /// outcomes (spec section 7): misconfiguration aborts the run before
    /// the kernel starts.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.wifi_station_count > 0 || self.nru_gnb_count > 0,
            "at least one Wi-Fi station or NR-U gNB is required"
        );
        anyhow::ensure!(
            self.simulation_time_s > 0.0,
            "simulation_time_s must be positive"
        );
        anyhow::ensure!(
            self.nru.min_sync_slot_desync <= self.nru.max_sync_slot_desync,
            "nru.min_sync_slot_desync must be <= nru.max_sync_slot_desync"
        );
        anyhow::ensure!(self.wifi.cw_min <= self.wifi.cw_max, "wifi.cw_min <= wifi.cw_max");
        anyhow::ensure!(self.nru.cw_min <= self.nru.cw_max, "nru.cw_min <= nru.cw_max");
        anyhow::ensure!(self.nru.m > 0, "nru.m must be positive");
        Ok(())
    }

    /// Total simulated horizon in microseconds.
    pub fn duration_us(&self) -> u64 {
        (self.simulation_time_s * 1_000_000.0).round() as u64
    }
}
