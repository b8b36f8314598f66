//! Entry point for the Wi-Fi / NR-U coexistence simulator.
//!
//! Loads a run configuration from a JSON file, runs either a single
//! simulation or a Wi-Fi x gNB sweep, and appends one results row per run
//! to a CSV file.

use std::env;
use std::fs::OpenOptions;
use std::io::Write;
use std::process::ExitCode;

use env_logger::Builder;
use log::{error, info, LevelFilter};

mod channel;
mod config;
mod controller;
mod kernel;
mod metrics;
mod model;
mod nru;
mod rng;
mod scenario;
mod sim;
mod times;
mod wifi;

use config::SimConfig;
use metrics::Results;

fn init_logging() {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter(Some("kernel"), LevelFilter::Warn)
        .filter(Some("channel"), LevelFilter::Debug)
        .filter(Some("wifi"), LevelFilter::Debug)
        .filter(Some("nru"), LevelFilter::Debug)
        .filter(Some("controller"), LevelFilter::Info)
        .filter(Some("scenario"), LevelFilter::Info)
        .filter(Some("sim"), LevelFilter::Info)
        .init();
}

fn write_csv(path: &str, rows: &[Results]) -> anyhow::Result<()> {
    let write_header = !std::path::Path::new(path).exists();
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if write_header {
        writeln!(
            file,
            "Seed,WiFi_Nodes,NRU_Nodes,WiFi_CW_Min,WiFi_CW_Max,NRU_CW_Min,NRU_CW_Max,\
WiFi_Throughput,NRU_Throughput,Total_Throughput,WiFi_PLR,NRU_PLR,WiFi_Latency,NRU_Latency,\
WiFi_Access_Delay,NRU_Access_Delay,WiFi_SINR,NRU_SINR,Traditional_Fairness,Jains_Fairness,Joint_Metric,\
WiFi_COT,NRU_COT,Total_COT,WiFi_Efficiency,NRU_Efficiency,Total_Efficiency"
        )?;
    }
    for r in rows {
        writeln!(
            file,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            r.seed,
            r.wifi_nodes,
            r.nru_nodes,
            r.wifi_cw_min,
            r.wifi_cw_max,
            r.nru_cw_min,
            r.nru_cw_max,
            r.wifi_throughput_mbps,
            r.nru_throughput_mbps,
            r.total_throughput_mbps,
            r.wifi_collision_prob,
            r.nru_collision_prob,
            r.wifi_avg_latency_us,
            r.nru_avg_latency_us,
            r.wifi_access_delay_us,
            r.nru_access_delay_us,
            r.wifi_sinr_db,
            r.nru_sinr_db,
            r.traditional_fairness,
            r.jains_fairness,
            r.joint_metric,
            r.wifi_cot,
            r.nru_cot,
            r.total_cot,
            r.wifi_efficiency,
            r.nru_efficiency,
            r.total_efficiency,
        )?;
    }
    Ok(())
}

fn run() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let config_path = args.get(1).cloned();
    let output_csv = args.get(2).cloned().unwrap_or_else(|| "results.csv".to_string());
    let sweep = args.iter().any(|a| a == "--sweep");

    let cfg = match config_path {
        Some(ref p) if p != "--sweep" => SimConfig::from_json_file(p)?,
        _ => anyhow::bail!("usage: nru-wifi-coexistence-sim <config.json> [output.csv] [--sweep]"),
    };

    let rows = if sweep {
        let grid = scenario::SweepGrid::default_matrix(3, cfg.seed);
        info!(target: "scenario", "running sweep grid: {:?}", grid);
        scenario::run_sweep(&cfg, &grid)
    } else {
        vec![scenario::run_one(&cfg, cfg.seed)]
    };

    write_csv(&output_csv, &rows)?;
    info!(target: "scenario", "wrote {} result row(s) to {}", rows.len(), output_csv);
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
