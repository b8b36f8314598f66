//! Dynamic contention-window fairness controller.
//!
//! Grounded on `Coexistence.py::DynamicCWController`: a periodic sampler
//! that measures each technology's data-airtime gain since the previous
//! tick, computes Jain's fairness index over the two deltas, and nudges
//! both technologies' CW bounds apart whenever fairness drops below
//! `target_fairness`. Adjustments are broadcast to every live node by
//! `Simulation::controller_tick`; they never touch a countdown already
//! in flight (spec section 4.5: non-retroactive).

use log::info;

use crate::channel::Channel;
use crate::config::ControllerConfig;

/// One CW retune to broadcast to every station/gNB.
#[derive(Debug, Clone, Copy)]
pub struct CwAdjustment {
    pub wifi_cw_min: u32,
    pub wifi_cw_max: u32,
    pub nru_cw_min: u32,
    pub nru_cw_max: u32,
}

#[derive(Debug, Clone)]
struct AdjustmentRecord {
    time: u64,
    fairness: f64,
    wifi_cw_min: u32,
    nru_cw_min: u32,
}

pub struct Controller {
    cfg: ControllerConfig,
    last_wifi_airtime: u64,
    last_nru_airtime: u64,
    wifi_cw_min: u32,
    wifi_cw_max: u32,
    nru_cw_min: u32,
    nru_cw_max: u32,
    adjustment_history: Vec<AdjustmentRecord>,
}

impl Controller {
    pub fn new(cfg: ControllerConfig) -> Self {
        Controller {
            wifi_cw_min: 0,
            wifi_cw_max: 0,
            nru_cw_min: 0,
            nru_cw_max: 0,
            last_wifi_airtime: 0,
            last_nru_airtime: 0,
            adjustment_history: Vec::new(),
            cfg,
        }
    }

    pub fn measurement_interval(&self) -> u64 {
        self.cfg.measurement_interval
    }

    pub fn history(&self) -> impl Iterator<Item = (u64, f64)> + '_ {
        self.adjustment_history.iter().map(|r| (r.time, r.fairness))
    }

    /// Seeds the tracked CW values from a station/gNB the first time it's
    /// read back, so the controller's broadcast reflects the run's actual
    /// starting configuration rather than zero.
    pub fn seed(&mut self, wifi_cw_min: u32, wifi_cw_max: u32, nru_cw_min: u32, nru_cw_max: u32) {
        self.wifi_cw_min = wifi_cw_min;
        self.wifi_cw_max = wifi_cw_max;
        self.nru_cw_min = nru_cw_min;
        self.nru_cw_max = nru_cw_max;
    }

    /// Samples cumulative data airtime, computes the period delta and
    /// Jain's fairness index, and returns a broadcast-ready adjustment if
    /// fairness fell below target. Returns `None` on every tick where no
    /// retune is warranted (including the very first tick, which only
    /// establishes a baseline).
    pub fn sample_and_adjust(&mut self, now: u64, channel: &Channel) -> Option<CwAdjustment> {
        let current_wifi: u64 = channel.airtime_data_wifi.iter().sum();
        let current_nru: u64 = channel.airtime_data_nru.iter().sum();
        let wifi_delta = current_wifi.saturating_sub(self.last_wifi_airtime);
        let nru_delta = current_nru.saturating_sub(self.last_nru_airtime);
        self.last_wifi_airtime = current_wifi;
        self.last_nru_airtime = current_nru;

        if wifi_delta == 0 && nru_delta == 0 {
            return None;
        }

        let fairness = Self::jains_fairness(wifi_delta as f64, nru_delta as f64);
        if fairness >= self.cfg.target_fairness {
            return None;
        }

        let wifi = wifi_delta as f64;
        let nru = nru_delta as f64;
        if wifi > nru * 1.1 {
            self.increase_wifi_cw();
            if self.nru_cw_min > self.cfg.min_cw {
                self.decrease_nru_cw();
            }
        } else if nru > wifi * 1.1 {
            if self.wifi_cw_min > self.cfg.min_cw {
                self.decrease_wifi_cw();
            }
            self.increase_nru_cw();
        }

        info!(
            target: "controller",
            "t={} fairness={:.4} wifi_cw=({},{}) nru_cw=({},{})",
            now, fairness, self.wifi_cw_min, self.wifi_cw_max, self.nru_cw_min, self.nru_cw_max
        );
        self.adjustment_history.push(AdjustmentRecord {
            time: now,
            fairness,
            wifi_cw_min: self.wifi_cw_min,
            nru_cw_min: self.nru_cw_min,
        });

        Some(CwAdjustment {
            wifi_cw_min: self.wifi_cw_min,
            wifi_cw_max: self.wifi_cw_max,
            nru_cw_min: self.nru_cw_min,
            nru_cw_max: self.nru_cw_max,
        })
    }

    fn jains_fairness(wifi_airtime: f64, nru_airtime: f64) -> f64 {
        if wifi_airtime == 0.0 && nru_airtime == 0.0 {
            return 1.0;
        }
        let sum = wifi_airtime + nru_airtime;
        let sum_squared = wifi_airtime.powi(2) + nru_airtime.powi(2);
        if sum_squared == 0.0 {
            return 1.0;
        }
        sum.powi(2) / (2.0 * sum_squared)
    }

    fn increase_wifi_cw(&mut self) {
        let new_cw = (self.wifi_cw_min + self.cfg.adjustment_step).min(self.cfg.max_cw);
        self.wifi_cw_min = new_cw;
        self.wifi_cw_max = (new_cw * 4).min(self.cfg.max_cw);
    }

    fn decrease_wifi_cw(&mut self) {
        let new_cw = self.wifi_cw_min.saturating_sub(self.cfg.adjustment_step).max(self.cfg.min_cw);
        self.wifi_cw_min = new_cw;
        self.wifi_cw_max = (new_cw * 4).min(self.cfg.max_cw);
    }

    fn increase_nru_cw(&mut self) {
        let new_cw = (self.nru_cw_min + self.cfg.adjustment_step).min(self.cfg.max_cw);
        self.nru_cw_min = new_cw;
        self.nru_cw_max = (new_cw * 4).min(self.cfg.max_cw);
    }

    fn decrease_nru_cw(&mut self) {
        let new_cw = self.nru_cw_min.saturating_sub(self.cfg.adjustment_step).max(self.cfg.min_cw);
        self.nru_cw_min = new_cw;
        self.nru_cw_max = (new_cw * 4).min(self.cfg.max_cw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ControllerConfig {
        ControllerConfig {
            enabled: true,
            measurement_interval: 1_000_000,
            adjustment_step: 5,
            target_fairness: 0.95,
            min_cw: 7,
            max_cw: 511,
        }
    }

    #[test]
    fn perfectly_balanced_airtime_is_fully_fair() {
        assert_eq!(Controller::jains_fairness(100.0, 100.0), 1.0);
    }

    #[test]
    fn skewed_airtime_falls_below_target_and_skews_cw_apart() {
        let mut c = Controller::new(cfg());
        c.seed(15, 63, 15, 63);
        let mut channel = Channel::new(1, 1, -95.0);
        channel.airtime_data_wifi[0] = 900_000;
        channel.airtime_data_nru[0] = 100_000;
        let adj = c.sample_and_adjust(1_000_000, &channel).expect("should adjust");
        assert!(adj.wifi_cw_min > 15);
        assert!(adj.nru_cw_min < 15);
    }

    #[test]
    fn no_traffic_yields_no_adjustment() {
        let mut c = Controller::new(cfg());
        let channel = Channel::new(1, 1, -95.0);
        assert!(c.sample_and_adjust(1_000_000, &channel).is_none());
    }
}
