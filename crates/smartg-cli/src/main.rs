//! SMART-G command line driver.
//!
//! Commands:
//! - seed: insert the demo roster into an empty database
//! - workers / devices: list and edit records
//! - pair / unpair: bind a wristband to a worker
//! - run: sample the paired workers on a timer and print the dashboard
//! - config: print the effective configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};

use smartg_core::{
    lock_monitor, shared, Monitor, MonitorConfig, NewWorker, SamplingScheduler, StdRandom, SystemClock,
    TickReport, WorkerId,
};
use smartg_projectors::{chart_series, DashboardSnapshot};
use smartg_store::SqliteStore;

#[derive(Parser)]
#[command(name = "smartg")]
#[command(version)]
#[command(about = "Wearable heat-stress and fatigue monitor for site workers")]
struct Cli {
    /// SQLite database file
    #[arg(long, env = "SMARTG_DB", default_value = "smartg.db")]
    db: PathBuf,

    /// TOML config file; SMARTG_* environment variables override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert the demo workers and devices into an empty database
    Seed,

    /// Manage workers
    Workers {
        #[command(subcommand)]
        action: WorkerAction,
    },

    /// Manage wristbands
    Devices {
        #[command(subcommand)]
        action: DeviceAction,
    },

    /// Pair a registered wristband with a worker
    Pair { worker: String, device: String },

    /// Release a worker's wristband
    Unpair { worker: String },

    /// Run the sampling loop
    Run {
        /// Stop after this many ticks
        #[arg(long, default_value = "12")]
        ticks: usize,

        /// Seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,

        /// Override the sampling period
        #[arg(long)]
        period_ms: Option<u64>,

        /// Print the final dashboard as JSON
        #[arg(long)]
        json: bool,

        /// Print a chart of this worker's last readings
        #[arg(long)]
        chart: Option<String>,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[derive(Subcommand)]
enum WorkerAction {
    List,
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        occupation: String,
        #[arg(long)]
        age: u32,
    },
    /// Delete a worker, unpairing its wristband first
    Delete { id: String },
}

#[derive(Subcommand)]
enum DeviceAction {
    List,
    /// Register a new wristband and pair it with a worker
    Register {
        id: String,
        #[arg(long)]
        worker: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let cfg = MonitorConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let db = cli.db;

    match cli.command {
        Commands::Config => print!("{}", cfg.to_toml_string()?),
        Commands::Seed => {
            let mut store = open_store(&db)?;
            if store.seed_demo()? {
                println!("seeded demo workers and devices into {}", db.display());
            } else {
                println!("database not empty; nothing seeded");
            }
        }
        Commands::Workers { action } => {
            let mut monitor = loaded(cfg, open_store(&db)?)?;
            match action {
                WorkerAction::List => print_workers(&monitor),
                WorkerAction::Add { name, occupation, age } => {
                    let id = monitor.add_worker(NewWorker { name, occupation, age })?;
                    println!("added worker {id}");
                }
                WorkerAction::Delete { id } => {
                    monitor.delete_worker(&WorkerId(id.clone()))?;
                    println!("deleted worker {id}");
                }
            }
        }
        Commands::Devices { action } => {
            let mut monitor = loaded(cfg, open_store(&db)?)?;
            match action {
                DeviceAction::List => print_devices(&monitor),
                DeviceAction::Register { id, worker } => {
                    let device = monitor.register_device(&id, &WorkerId(worker.clone()))?;
                    println!("registered {device} and paired it with {worker}");
                }
            }
        }
        Commands::Pair { worker, device } => {
            let mut monitor = loaded(cfg, open_store(&db)?)?;
            monitor.pair(&WorkerId(worker.clone()), &device)?;
            println!("paired {} with {worker}", device.trim().to_uppercase());
        }
        Commands::Unpair { worker } => {
            let mut monitor = loaded(cfg, open_store(&db)?)?;
            let device = monitor.unpair(&WorkerId(worker.clone()))?;
            println!("unpaired {device} from {worker}");
        }
        Commands::Run { ticks, seed, period_ms, json, chart } => {
            let mut cfg = cfg;
            if let Some(ms) = period_ms {
                cfg.sampling.period_ms = ms;
                cfg.validate()?;
            }
            cfg.sampling.simulation_enabled = true;
            run(cfg, open_store(&db)?, ticks, seed, json, chart)?;
        }
    }
    Ok(())
}

fn open_store(db: &Path) -> Result<SqliteStore> {
    SqliteStore::open(db).with_context(|| format!("opening {}", db.display()))
}

fn loaded(cfg: MonitorConfig, store: SqliteStore) -> Result<Monitor<SqliteStore>> {
    let mut monitor = Monitor::new(cfg, store);
    monitor.load().context("loading records")?;
    Ok(monitor)
}

fn run(
    cfg: MonitorConfig,
    store: SqliteStore,
    ticks: usize,
    seed: Option<u64>,
    json: bool,
    chart: Option<String>,
) -> Result<()> {
    let rng = match seed {
        Some(s) => StdRandom::seeded(s),
        None => StdRandom::from_entropy(),
    };
    let period = cfg.sampling.period();
    let chart_window = cfg.logs.chart_window;
    let mut monitor = Monitor::with_sources(cfg, store, Box::new(rng), Box::new(SystemClock));
    monitor.load().context("loading records")?;
    if !monitor.should_sample() {
        bail!("no workers on record; run `smartg seed` or add one first");
    }

    let monitor = shared(monitor);
    let mut scheduler = SamplingScheduler::new(monitor.clone(), period);
    let reports = scheduler.reports();
    scheduler.start();

    let patience = period * 4 + Duration::from_secs(1);
    for n in 1..=ticks {
        match reports.recv_timeout(patience) {
            Ok(report) => print_tick(n, &report),
            Err(e) => {
                warn!("no tick report within {patience:?}: {e}");
                break;
            }
        }
    }
    scheduler.stop();
    info!("sampling finished");

    let guard = lock_monitor(&monitor);
    let state = guard.state();
    let snapshot = DashboardSnapshot::project(state);
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!();
        for m in &snapshot.metric_list {
            println!("{:>14}: {}", m.name, m.count);
        }
        if !snapshot.critical.is_empty() {
            println!("critical:");
            for w in &snapshot.critical {
                println!("  {} {} gsr={} imu={} spo2={}", w.id, w.name, w.gsr, w.imu, w.spo2);
            }
        }
        println!("alerts (newest first):");
        for a in &snapshot.alerts {
            println!(
                "  {} {} [{}] {} -> {}",
                a.time,
                a.worker_name.as_deref().unwrap_or(&a.worker_id),
                a.risk_level,
                a.trigger,
                a.action
            );
        }
    }
    if let Some(worker) = chart {
        let series = chart_series(state.history(), &WorkerId(worker.clone()), chart_window);
        println!("chart {worker} ({} points):", series.len());
        for ((g, i), s) in series.gsr.iter().zip(&series.imu).zip(&series.spo2) {
            println!("  {} gsr={:>6.2} imu={:>4.2} spo2={:>5.2}", g.time, g.value, i.value, s.value);
        }
    }
    println!("state digest {}", hex::encode(state.digest()));
    Ok(())
}

fn print_tick(n: usize, report: &TickReport) {
    println!(
        "tick {n} at {}: {} sampled, {} escalations",
        report.ticked_at.format("%H.%M.%S"),
        report.samples.len(),
        report.escalations()
    );
    for a in &report.alerts {
        println!("  ! {} {} {} -> {}", a.worker_id, a.risk_level, a.trigger, a.action);
    }
}

fn print_workers(monitor: &Monitor<SqliteStore>) {
    for w in monitor.state().workers() {
        let device = w.device_id.as_ref().map(|d| d.as_str()).unwrap_or("-");
        println!("{:<6} {:<20} {:>3} {:<14} {}", w.id.as_str(), w.name, w.age, w.occupation, device);
    }
}

fn print_devices(monitor: &Monitor<SqliteStore>) {
    let state = monitor.state();
    for d in state.devices() {
        let holder = state.holder_of(&d.id).map(|w| w.id.as_str()).unwrap_or("-");
        println!("{:<10} {:<12} {:>6.1}% {}", d.id.as_str(), d.status.as_str(), d.battery, holder);
    }
}
