//! Discrete-event driver: wires the kernel, the channel arbiter, and the
//! Wi-Fi/NR-U node arenas into a runnable simulation.
//!
//! Grounded on `Coexistence.py::run_simulation` and the `Station`/`Gnb`
//! process bodies, translated from `simpy` generators into synchronous
//! event handlers. Every handler runs to completion at a single simulated
//! instant; the kernel is only used for genuine time-delayed waits
//! (backoff countdowns, frame/gap/post timers, controller ticks,
//! sync-slot boundaries). Channel-state transitions that happen
//! "instantaneously" in the original (interrupting a waiter, clearing the
//! tx lists, handing the lock to the next requester) are plain function
//! calls within a handler, since nothing else can happen in between at
//! the same virtual instant.

use log::{debug, info, trace};

use crate::channel::{Channel, Contender};
use crate::config::{NruMode, SimConfig};
use crate::controller::Controller;
use crate::kernel::Kernel;
use crate::model::{Frame, NodeId, Transmission};
use crate::nru::{Gnb, NruPhase};
use crate::rng::SimRng;
use crate::times::Times;
use crate::wifi::{Station, WifiPhase};

/// Everything the kernel can wake a process up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    WifiBackoffDone(usize),
    WifiFrameDone(usize),
    WifiPostDone(usize),
    NruGapDone(usize),
    NruBackoffDone(usize),
    NruFrameDone(usize),
    NruSyncBoundary(usize),
    ControllerTick,
}

pub struct Simulation {
    kernel: Kernel<Event>,
    channel: Channel,
    stations: Vec<Station>,
    gnbs: Vec<Gnb>,
    controller: Option<Controller>,
    times: Times,
    wifi_r_limit: u32,
    nru_cfg: crate::config::NruConfig,
    nru_mode: NruMode,
    rng: SimRng,
    /// Contenders whose backoff elapsed at the current batch timestamp,
    /// accumulated until the kernel's next event strictly exceeds it
    /// (see `run`), then resolved all at once by `resolve_contention`.
    pending_contenders: Vec<Contender>,
}

impl Simulation {
    pub fn new(cfg: &SimConfig) -> Self {
        let wifi_count = cfg.wifi_station_count as usize;
        let nru_count = cfg.nru_gnb_count as usize;
        let frame_time = cfg
            .wifi
            .fixed_frame_time
            .unwrap_or_else(|| cfg.times.frame_time(cfg.wifi.data_size, cfg.wifi.mcs));
        let mcot_us = cfg.nru.mcot * 1000;

        let stations = (0..wifi_count)
            .map(|i| Station::new(i, cfg.wifi.cw_min, cfg.wifi.cw_max, cfg.transmit_power_dbm, frame_time))
            .collect();
        let gnbs = (0..nru_count)
            .map(|i| Gnb::new(i, cfg.nru.cw_min, cfg.nru.cw_max, cfg.transmit_power_dbm, mcot_us))
            .collect();
        let controller = if cfg.controller.enabled {
            let mut controller = Controller::new(cfg.controller.clone());
            controller.seed(cfg.wifi.cw_min, cfg.wifi.cw_max, cfg.nru.cw_min, cfg.nru.cw_max);
            Some(controller)
        } else {
            None
        };

        Simulation {
            kernel: Kernel::new(),
            channel: Channel::new(wifi_count, nru_count, cfg.noise_floor_dbm),
            stations,
            gnbs,
            controller,
            times: cfg.times,
            wifi_r_limit: cfg.wifi.r_limit,
            nru_cfg: cfg.nru.clone(),
            nru_mode: cfg.nru_mode,
            rng: SimRng::new(cfg.seed),
            pending_contenders: Vec::new(),
        }
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn gnbs(&self) -> &[Gnb] {
        &self.gnbs
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    pub fn controller(&self) -> Option<&Controller> {
        self.controller.as_ref()
    }

    pub fn nru_prioritization_period_us(&self) -> u64 {
        self.prioritization_period()
    }

    pub fn nru_observation_slot_duration_us(&self) -> u64 {
        self.nru_cfg.observation_slot_duration
    }

    /// Starts every node's contention cycle and the sync-slot trackers,
    /// then drives the kernel through `duration_us` of simulated time.
    pub fn run(&mut self, duration_us: u64) {
        let wifi_count = self.stations.len();
        for i in 0..wifi_count {
            self.stations[i].queue_packet(0);
            self.wifi_begin_contend(i, 0);
        }

        let nru_count = self.gnbs.len();
        for i in 0..nru_count {
            let desync = self
                .rng
                .uniform_range_inclusive(self.nru_cfg.min_sync_slot_desync, self.nru_cfg.max_sync_slot_desync);
            self.gnbs[i].next_sync_boundary = desync;
            self.gnbs[i].desync_offset = desync;
            self.kernel.schedule_at(desync, Event::NruSyncBoundary(i));
            self.nru_begin_contend(i, 0);
        }

        if let Some(controller) = &self.controller {
            let interval = controller.measurement_interval();
            self.kernel.schedule(interval, Event::ControllerTick);
        }

        let mut batch_time: Option<u64> = None;
        loop {
            let next_time = match self.kernel.peek_time() {
                Some(t) if t <= duration_us => t,
                _ => break,
            };
            if batch_time != Some(next_time) {
                if let Some(bt) = batch_time {
                    self.resolve_contention(bt);
                }
                batch_time = Some(next_time);
            }
            let fired = self.kernel.pop().expect("peeked event must pop");
            self.dispatch(fired.token, fired.time, fired.id);
        }
        if let Some(bt) = batch_time {
            self.resolve_contention(bt);
        }

        info!(
            target: "sim",
            "run complete: duration_us={} wifi_succ={} wifi_fail={} nru_succ={} nru_fail={}",
            duration_us,
            self.channel.succeeded_wifi,
            self.channel.failed_wifi,
            self.channel.succeeded_nru,
            self.channel.failed_nru
        );
    }

    fn dispatch(&mut self, event: Event, now: u64, id: u64) {
        match event {
            Event::WifiBackoffDone(i) => self.wifi_backoff_done(i, id, now),
            Event::WifiFrameDone(i) => self.wifi_frame_done(i, now),
            Event::WifiPostDone(i) => self.wifi_post_done(i, now),
            Event::NruGapDone(i) => self.nru_gap_done(i, now),
            Event::NruBackoffDone(i) => self.nru_backoff_done(i, id, now),
            Event::NruFrameDone(i) => self.nru_frame_done(i, now),
            Event::NruSyncBoundary(i) => self.nru_sync_boundary(i, now),
            Event::ControllerTick => self.controller_tick(now),
        }
    }

    // ---- shared tx_queue race resolution --------------------------------

    /// Resolves every contender whose backoff elapsed at `batch_time`:
    /// the longest frame/transmission duration wins `tx_lock` (ties go to
    /// whichever contender reached the head of the batch first), matching
    /// the original's `PreemptiveResource` priority of `BIG - duration`.
    /// Every other node still counting down backoff is interrupted.
    fn resolve_contention(&mut self, batch_time: u64) {
        if self.pending_contenders.is_empty() {
            return;
        }
        let contenders = std::mem::take(&mut self.pending_contenders);
        let mut winner = contenders[0];
        for c in &contenders[1..] {
            if c.frame_duration > winner.frame_duration {
                winner = *c;
            }
        }
        self.channel.tx_lock_holder = Some(winner.node);
        trace!(target: "channel", "t={} tx_lock granted to {:?} ({} contenders)", batch_time, winner.node, contenders.len());

        let interrupted_wifi: Vec<usize> = self.channel.backoff_wifi.drain(..).collect();
        let interrupted_nru: Vec<usize> = self.channel.backoff_nru.drain(..).collect();
        for idx in interrupted_wifi {
            self.wifi_interrupt(idx, batch_time);
        }
        for idx in interrupted_nru {
            self.nru_interrupt(idx, batch_time);
        }

        for c in &contenders {
            let holds_lock = c.node == winner.node;
            match c.node {
                NodeId::Wifi(i) => {
                    self.stations[i].holds_lock = holds_lock;
                    self.kernel.schedule(c.frame_duration, Event::WifiFrameDone(i));
                }
                NodeId::Nru(i) => {
                    self.gnbs[i].holds_lock = holds_lock;
                    self.kernel.schedule(c.frame_duration, Event::NruFrameDone(i));
                }
            }
        }
    }

    fn drain_lock_waiters(&mut self, now: u64) {
        let waiters: Vec<NodeId> = std::mem::take(&mut self.channel.lock_waiters);
        for w in waiters {
            match w {
                NodeId::Wifi(i) => self.wifi_start_backoff_timer(i, now),
                NodeId::Nru(i) => self.nru_try_enter(i, now),
            }
        }
    }

    // ---- Wi-Fi DCF --------------------------------------------------------

    fn wifi_begin_contend(&mut self, i: usize, now: u64) {
        let upper = self.stations[i].backoff_upper_bound();
        let b = self.rng.uniform_inclusive(upper);
        self.stations[i].residue = b * self.times.slot_time;
        self.wifi_try_enter_backoff(i, now);
    }

    fn wifi_try_enter_backoff(&mut self, i: usize, now: u64) {
        if self.channel.channel_idle() {
            self.wifi_start_backoff_timer(i, now);
        } else {
            self.channel.lock_waiters.push(NodeId::Wifi(i));
        }
    }

    fn wifi_start_backoff_timer(&mut self, i: usize, now: u64) {
        self.stations[i].residue += self.times.difs;
        self.stations[i].wait_start = now;
        self.channel.backoff_wifi.push(i);
        self.stations[i].phase = WifiPhase::CountingBackoff;
        let id = self.kernel.schedule(self.stations[i].residue, Event::WifiBackoffDone(i));
        self.stations[i].pending_event_id = id;
    }

    fn wifi_backoff_done(&mut self, i: usize, fired_id: u64, _now: u64) {
        if fired_id != self.stations[i].pending_event_id {
            return;
        }
        self.channel.backoff_wifi.retain(|&x| x != i);
        self.channel.tx_wifi.push(i);
        self.stations[i].phase = WifiPhase::Transmitting;
        self.pending_contenders.push(Contender {
            node: NodeId::Wifi(i),
            frame_duration: self.stations[i].frame.frame_time,
        });
    }

    /// Re-derives remaining backoff after another node wins the channel
    /// (spec section 4.3, interruption rule): subtract whatever was
    /// actually counted down, including DIFS, then queue for the next
    /// chance to resume once the channel frees.
    fn wifi_interrupt(&mut self, i: usize, now: u64) {
        let st = &mut self.stations[i];
        let elapsed = now - st.wait_start;
        if elapsed <= self.times.difs {
            st.residue = st.residue.saturating_sub(self.times.difs);
        } else {
            let slots = (elapsed - self.times.difs) / self.times.slot_time;
            st.residue = st
                .residue
                .saturating_sub(slots * self.times.slot_time + self.times.difs);
        }
        st.phase = WifiPhase::WaitingIdle;
        st.pending_event_id = 0;
        self.channel.lock_waiters.push(NodeId::Wifi(i));
    }

    fn wifi_frame_done(&mut self, i: usize, now: u64) {
        let success = self.channel.check_collision();
        if success {
            self.stations[i].successes += 1;
            self.channel.succeeded_wifi += 1;
            self.channel.airtime_data_wifi[i] += self.stations[i].frame.frame_time;
            self.channel.airtime_control_wifi[i] += self.times.ack_frame_time;
            if let Some(pkt) = self.stations[i].packet_queue.pop_front() {
                self.stations[i].total_latency += now - pkt.gen_time;
                self.stations[i].packet_count += 1;
            }
            self.stations[i].consecutive_failures = 0;
            let frame_time = self.stations[i].frame.frame_time;
            self.stations[i].frame = Frame::new(frame_time, now);
            self.stations[i].queue_packet(now);
        } else {
            self.stations[i].failures += 1;
            self.channel.failed_wifi += 1;
            self.stations[i].frame.retransmissions += 1;
            if self.stations[i].frame.retransmissions > self.wifi_r_limit {
                debug!(target: "wifi", "station {} dropped frame after {} retransmissions", i, self.stations[i].frame.retransmissions);
                let frame_time = self.stations[i].frame.frame_time;
                self.stations[i].frame = Frame::new(frame_time, now);
                self.stations[i].queue_packet(now);
                self.stations[i].consecutive_failures = 0;
            } else {
                self.stations[i].consecutive_failures += 1;
            }
        }

        if self.stations[i].holds_lock {
            self.channel.clear_tx_lists();
        }

        let post_delay = if success { self.times.ack_frame_time } else { self.times.ack_timeout };
        self.stations[i].phase = WifiPhase::WaitingPost;
        self.kernel.schedule(post_delay, Event::WifiPostDone(i));
    }

    fn wifi_post_done(&mut self, i: usize, now: u64) {
        if self.stations[i].holds_lock {
            self.stations[i].holds_lock = false;
            self.channel.tx_lock_holder = None;
            self.drain_lock_waiters(now);
        }
        self.stations[i].phase = WifiPhase::WaitingIdle;
        // A fresh frame is minted on success or retry-limit drop
        // (wifi_frame_done); an ordinary retry keeps the same frame and
        // just redraws backoff.
        self.wifi_begin_contend(i, now);
    }

    // ---- NR-U LBT Cat-4 ---------------------------------------------------

    fn prioritization_period(&self) -> u64 {
        self.nru_cfg.deter_period + self.nru_cfg.m as u64 * self.nru_cfg.observation_slot_duration
    }

    fn nru_begin_contend(&mut self, i: usize, now: u64) {
        let upper = self.gnbs[i].backoff_upper_bound();
        let b = self.rng.uniform_inclusive(upper);
        let pp = self.prioritization_period();
        self.gnbs[i].residue = b * self.nru_cfg.observation_slot_duration + pp;
        self.nru_try_enter(i, now);
    }

    /// Step 2 (spec section 4.4): wait for the channel to go idle before
    /// either the gap dance (gap mode) or registering the countdown
    /// directly (reservation-signal mode).
    fn nru_try_enter(&mut self, i: usize, now: u64) {
        if self.channel.channel_idle() {
            match self.nru_mode {
                NruMode::Gap => self.nru_enter_gap(i, now),
                NruMode::ReservationSignal => self.nru_start_backoff_timer(i, now),
            }
        } else {
            self.channel.lock_waiters.push(NodeId::Nru(i));
        }
    }

    /// Steps 3-4: place the backoff so it finishes exactly on a
    /// synchronization-slot boundary, then wait out the gap. `ttns` is a
    /// local projection, not the sync tracker's own boundary: a long
    /// backoff can span several tracker periods before it lands.
    fn nru_enter_gap(&mut self, i: usize, now: u64) {
        let sync_dur = self.nru_cfg.synchronization_slot_duration;
        let mut ttns = self.gnbs[i].next_sync_boundary.saturating_sub(now);
        while self.gnbs[i].residue >= ttns {
            ttns += sync_dur;
        }
        let gap_time = ttns - self.gnbs[i].residue;
        self.gnbs[i].phase = NruPhase::WaitingGap;
        self.kernel.schedule(gap_time, Event::NruGapDone(i));
    }

    /// Step 5: the gap elapsed; if the channel went busy in the meantime,
    /// rejoin the lock-waiter queue and redo the gap placement once it
    /// frees, otherwise register the countdown (step 6).
    fn nru_gap_done(&mut self, i: usize, now: u64) {
        if self.channel.channel_idle() {
            self.nru_start_backoff_timer(i, now);
        } else {
            self.gnbs[i].phase = NruPhase::WaitingIdle;
            self.channel.lock_waiters.push(NodeId::Nru(i));
        }
    }

    fn nru_start_backoff_timer(&mut self, i: usize, now: u64) {
        self.gnbs[i].wait_start = now;
        self.channel.backoff_nru.push(i);
        self.gnbs[i].phase = NruPhase::CountingBackoff;
        let id = self.kernel.schedule(self.gnbs[i].residue, Event::NruBackoffDone(i));
        self.gnbs[i].pending_event_id = id;
    }

    fn nru_backoff_done(&mut self, i: usize, fired_id: u64, now: u64) {
        if fired_id != self.gnbs[i].pending_event_id {
            return;
        }
        self.channel.backoff_nru.retain(|&x| x != i);
        let total = self.gnbs[i].transmission.total_time;
        let rs_time = match self.nru_mode {
            NruMode::Gap => 0,
            NruMode::ReservationSignal => self.gnbs[i].next_sync_boundary.saturating_sub(now).min(total),
        };
        self.gnbs[i].transmission = Transmission::new(total, rs_time);
        self.channel.tx_nru.push(i);
        self.gnbs[i].phase = NruPhase::Transmitting;
        self.pending_contenders.push(Contender {
            node: NodeId::Nru(i),
            frame_duration: total,
        });
    }

    /// Step 7: re-derive remaining backoff (including PP) and re-add a
    /// fresh PP for the next attempt, common to both modes per the spec's
    /// "identical to gap mode" note on the reservation-signal variant.
    fn nru_interrupt(&mut self, i: usize, now: u64) {
        let pp = self.prioritization_period();
        let obs = self.nru_cfg.observation_slot_duration;
        let gnb = &mut self.gnbs[i];
        let elapsed = now - gnb.wait_start;
        if elapsed <= pp {
            gnb.residue = gnb.residue.saturating_sub(pp);
        } else {
            let slots = (elapsed - pp) / obs;
            gnb.residue = gnb.residue.saturating_sub(slots * obs + pp);
        }
        gnb.residue += pp;
        gnb.phase = NruPhase::WaitingIdle;
        gnb.pending_event_id = 0;
        self.channel.lock_waiters.push(NodeId::Nru(i));
    }

    /// NR-U has no post-transmission wait in the source model (the
    /// commented-out `ack_timeout` wait in `Gnb.send_transmission`): the
    /// winner releases `tx_lock` and every node re-enters contention in
    /// the same instant the burst ends.
    fn nru_frame_done(&mut self, i: usize, now: u64) {
        let success = self.channel.check_collision();
        if success {
            self.gnbs[i].successes += 1;
            self.channel.succeeded_nru += 1;
            self.channel.airtime_data_nru[i] += self.gnbs[i].transmission.airtime;
            self.channel.airtime_control_nru[i] += self.gnbs[i].transmission.rs_time;
            self.gnbs[i].total_latency += now - self.gnbs[i].gen_time;
            self.gnbs[i].packet_count += 1;
            self.gnbs[i].consecutive_failures = 0;
            self.gnbs[i].gen_time = now;
        } else {
            self.gnbs[i].failures += 1;
            self.channel.failed_nru += 1;
            self.gnbs[i].consecutive_failures += 1;
            if self.gnbs[i].consecutive_failures > self.wifi_r_limit {
                debug!(target: "nru", "gNB {} dropped transmission after {} consecutive failures", i, self.gnbs[i].consecutive_failures);
                self.gnbs[i].consecutive_failures = 0;
                self.gnbs[i].gen_time = now;
            }
        }

        if self.gnbs[i].holds_lock {
            self.channel.clear_tx_lists();
            self.gnbs[i].holds_lock = false;
            self.channel.tx_lock_holder = None;
            self.drain_lock_waiters(now);
        }
        self.nru_begin_contend(i, now);
    }

    fn nru_sync_boundary(&mut self, i: usize, _now: u64) {
        let next = self.gnbs[i].next_sync_boundary + self.nru_cfg.synchronization_slot_duration;
        self.gnbs[i].next_sync_boundary = next;
        self.kernel.schedule_at(next, Event::NruSyncBoundary(i));
    }

    // ---- dynamic CW controller --------------------------------------------

    fn controller_tick(&mut self, now: u64) {
        let interval = match &self.controller {
            Some(c) => c.measurement_interval(),
            None => return,
        };
        let adjustment = {
            let controller = self.controller.as_mut().unwrap();
            controller.sample_and_adjust(now, &self.channel)
        };
        if let Some(adj) = adjustment {
            for station in &mut self.stations {
                station.cw_min = adj.wifi_cw_min;
                station.cw_max = adj.wifi_cw_max;
            }
            for gnb in &mut self.gnbs {
                gnb.cw_min = adj.nru_cw_min;
                gnb.cw_max = adj.nru_cw_max;
            }
        }
        self.kernel.schedule(interval, Event::ControllerTick);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ControllerConfig, NruConfig, WifiConfig};
    use crate::metrics;

    fn cfg(wifi_count: u32, nru_count: u32, nru_mode: NruMode, controller_enabled: bool) -> SimConfig {
        SimConfig {
            wifi_station_count: wifi_count,
            nru_gnb_count: nru_count,
            seed: 42,
            simulation_time_s: 0.2,
            wifi: WifiConfig::default(),
            nru: NruConfig::default(),
            nru_mode,
            controller: ControllerConfig {
                enabled: controller_enabled,
                ..ControllerConfig::default()
            },
            times: Times::default(),
            noise_floor_dbm: -95.0,
            transmit_power_dbm: 23.0,
        }
    }

    // P1: at most one contender ever holds tx_lock at a time.
    #[test]
    fn resolve_contention_grants_lock_to_exactly_one_contender() {
        let mut sim = Simulation::new(&cfg(2, 0, NruMode::Gap, false));
        sim.pending_contenders.push(Contender {
            node: NodeId::Wifi(0),
            frame_duration: 100,
        });
        sim.pending_contenders.push(Contender {
            node: NodeId::Wifi(1),
            frame_duration: 300,
        });
        sim.resolve_contention(0);
        assert_eq!(sim.channel.tx_lock_holder, Some(NodeId::Wifi(1)));
        assert!(sim.stations[1].holds_lock);
        assert!(!sim.stations[0].holds_lock);
    }

    // P2: two simultaneous transmitters both collide.
    #[test]
    fn two_simultaneous_transmitters_both_collide() {
        let mut channel = Channel::new(2, 0, -95.0);
        channel.tx_wifi.push(0);
        channel.tx_wifi.push(1);
        assert!(!channel.check_collision());
    }

    // P2 (== 0 guard): an empty tx list is also treated as unsuccessful.
    #[test]
    fn empty_tx_lists_are_not_a_success() {
        let channel = Channel::new(1, 0, -95.0);
        assert!(!channel.check_collision());
    }

    // P3: backoff draws never exceed the BEB upper bound.
    #[test]
    fn wifi_backoff_upper_bound_saturates_at_cw_max() {
        let mut st = Station::new(0, 15, 63, 23.0, 1000);
        assert_eq!(st.backoff_upper_bound(), 15);
        st.consecutive_failures = 1;
        assert_eq!(st.backoff_upper_bound(), 31);
        st.consecutive_failures = 10;
        assert_eq!(st.backoff_upper_bound(), 63);
    }

    // P4: total channel busy time never exceeds the simulated horizon.
    #[test]
    fn airtime_never_exceeds_simulated_duration() {
        let config = cfg(3, 3, NruMode::ReservationSignal, false);
        let duration_us = config.duration_us();
        let mut sim = Simulation::new(&config);
        sim.run(duration_us);
        let channel = sim.channel();
        let wifi_busy: u64 = channel
            .airtime_data_wifi
            .iter()
            .zip(&channel.airtime_control_wifi)
            .map(|(d, c)| d + c)
            .sum();
        let nru_busy: u64 = channel
            .airtime_data_nru
            .iter()
            .zip(&channel.airtime_control_nru)
            .map(|(d, c)| d + c)
            .sum();
        assert!(wifi_busy + nru_busy <= duration_us * (config.wifi_station_count + config.nru_gnb_count) as u64);
    }

    // P5: a gap-mode backoff always lands exactly on a sync-slot boundary.
    #[test]
    fn gap_mode_backoff_lands_on_sync_boundary() {
        let mut sim = Simulation::new(&cfg(0, 1, NruMode::Gap, false));
        sim.gnbs[0].next_sync_boundary = 500;
        sim.gnbs[0].residue = 1234;
        let now = sim.kernel.now();
        sim.nru_enter_gap(0, now);
        let fired = sim.kernel.pop().expect("gap timer must be scheduled");
        let landing = fired.time + sim.gnbs[0].residue;
        let sync_dur = sim.nru_cfg.synchronization_slot_duration;
        assert_eq!((landing - 500) % sync_dur, 0);
    }

    // P6: identical seed and configuration reproduce identical metrics.
    #[test]
    fn same_seed_reproduces_identical_results() {
        let config = cfg(1, 1, NruMode::Gap, false);
        let duration_us = config.duration_us();
        let mut a = Simulation::new(&config);
        a.run(duration_us);
        let mut b = Simulation::new(&config);
        b.run(duration_us);
        let ra = metrics::compute(&a, config.seed, duration_us);
        let rb = metrics::compute(&b, config.seed, duration_us);
        assert_eq!(ra.wifi_collision_prob, rb.wifi_collision_prob);
        assert_eq!(ra.nru_collision_prob, rb.nru_collision_prob);
        assert_eq!(ra.wifi_cot, rb.wifi_cot);
        assert_eq!(ra.nru_cot, rb.nru_cot);
    }

    // P8: Jain's fairness index is always within [0, 1].
    #[test]
    fn jains_fairness_stays_within_unit_interval() {
        let config = cfg(2, 2, NruMode::ReservationSignal, true);
        let duration_us = config.duration_us();
        let mut sim = Simulation::new(&config);
        sim.run(duration_us);
        let results = metrics::compute(&sim, config.seed, duration_us);
        assert!(results.jains_fairness >= 0.0 && results.jains_fairness <= 1.0);
    }

    // S1: Wi-Fi only.
    #[test]
    fn scenario_wifi_only_runs_to_completion() {
        let config = cfg(4, 0, NruMode::Gap, false);
        let duration_us = config.duration_us();
        let mut sim = Simulation::new(&config);
        sim.run(duration_us);
        assert!(sim.channel.succeeded_wifi + sim.channel.failed_wifi > 0);
        assert_eq!(sim.channel.succeeded_nru + sim.channel.failed_nru, 0);
    }

    // S2: NR-U only, gap mode.
    #[test]
    fn scenario_nru_only_gap_mode_runs_to_completion() {
        let config = cfg(0, 4, NruMode::Gap, false);
        let duration_us = config.duration_us();
        let mut sim = Simulation::new(&config);
        sim.run(duration_us);
        assert!(sim.channel.succeeded_nru + sim.channel.failed_nru > 0);
        assert_eq!(sim.channel.succeeded_wifi + sim.channel.failed_wifi, 0);
    }

    // S3: 1 Wi-Fi station + 1 gNB, gap mode.
    #[test]
    fn scenario_one_wifi_one_nru_gap_mode_coexist() {
        let config = cfg(1, 1, NruMode::Gap, false);
        let duration_us = config.duration_us();
        let mut sim = Simulation::new(&config);
        sim.run(duration_us);
        assert!(sim.channel.succeeded_wifi + sim.channel.failed_wifi > 0);
        assert!(sim.channel.succeeded_nru + sim.channel.failed_nru > 0);
    }

    // S4: 3+3, reservation-signal mode, dynamic CW disabled.
    #[test]
    fn scenario_three_and_three_rs_mode_no_controller() {
        let config = cfg(3, 3, NruMode::ReservationSignal, false);
        let duration_us = config.duration_us();
        let mut sim = Simulation::new(&config);
        sim.run(duration_us);
        assert!(sim.controller().is_none());
        assert!(sim.channel.succeeded_wifi + sim.channel.failed_wifi > 0);
        assert!(sim.channel.succeeded_nru + sim.channel.failed_nru > 0);
    }

    // S5: 3+3, reservation-signal mode, dynamic CW enabled.
    #[test]
    fn scenario_three_and_three_rs_mode_with_controller() {
        let config = cfg(3, 3, NruMode::ReservationSignal, true);
        let duration_us = config.duration_us();
        let mut sim = Simulation::new(&config);
        sim.run(duration_us);
        assert!(sim.controller().is_some());
        assert!(sim.channel.succeeded_wifi + sim.channel.failed_wifi > 0);
        assert!(sim.channel.succeeded_nru + sim.channel.failed_nru > 0);
    }

    // S6: re-running S3's seed and configuration is byte-identical in outcome.
    #[test]
    fn scenario_seed_determinism_matches_rerun() {
        let config = cfg(1, 1, NruMode::Gap, false);
        let duration_us = config.duration_us();
        let mut first = Simulation::new(&config);
        first.run(duration_us);
        let mut second = Simulation::new(&config);
        second.run(duration_us);
        assert_eq!(first.channel.succeeded_wifi, second.channel.succeeded_wifi);
        assert_eq!(first.channel.failed_wifi, second.channel.failed_wifi);
        assert_eq!(first.channel.succeeded_nru, second.channel.succeeded_nru);
        assert_eq!(first.channel.failed_nru, second.channel.failed_nru);
        assert_eq!(first.channel.airtime_data_wifi, second.channel.airtime_data_wifi);
        assert_eq!(first.channel.airtime_data_nru, second.channel.airtime_data_nru);
    }
}
