use clap::{Parser, Subcommand};
use dg_app::{
    ActorOptions, AppError, AppResult, JsonReporter, OrderReport, OrderReporter, ReportMessage,
    SimEvent, SimulationHandle,
};
use dg_config::PlantConfig;
use dg_controls::ControlMode;
use dg_sim::{Simulation, SystemState};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dg-cli")]
#[command(about = "DamGate CLI - Dam sluice gate and reservoir simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a plant configuration file
    Validate {
        /// Path to the YAML or JSON configuration
        config_path: PathBuf,
    },
    /// Run a headless simulation for a fixed number of ticks
    Run {
        /// Plant configuration (defaults to the reference dam)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Number of ticks to simulate
        #[arg(long, default_value_t = 600)]
        ticks: u64,
        /// Control mode (auto or manual)
        #[arg(long, default_value = "auto")]
        mode: ControlMode,
        /// Override the level setpoint (m)
        #[arg(long)]
        target_level: Option<f64>,
        /// Rainfall intensity; rain is off when omitted
        #[arg(long)]
        rain: Option<f64>,
        /// Print every Nth tick
        #[arg(long, default_value_t = 60)]
        every: u64,
        /// Write every tick as JSON lines instead of printing a table
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Deliver one watering order headless and print its report
    Order {
        /// Plant configuration (defaults to the reference dam)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Client name
        #[arg(long)]
        client: String,
        /// Irrigated area in hectares
        #[arg(long)]
        hectares: f64,
        /// Give up after this many ticks
        #[arg(long, default_value_t = 100_000)]
        max_ticks: u64,
        /// Directory for the JSON report
        #[arg(long)]
        report_dir: Option<PathBuf>,
    },
    /// Run the real-time scheduler and print telemetry
    Live {
        /// Plant configuration (defaults to the reference dam)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Wall-clock duration of the session
        #[arg(long, default_value_t = 10)]
        seconds: u64,
        /// Override the tick period (ms)
        #[arg(long)]
        speed_ms: Option<u64>,
        /// Directory for reports of orders completed during the session
        #[arg(long)]
        report_dir: Option<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Run {
            config,
            ticks,
            mode,
            target_level,
            rain,
            every,
            output,
        } => cmd_run(
            config.as_deref(),
            ticks,
            mode,
            target_level,
            rain,
            every,
            output.as_deref(),
        ),
        Commands::Order {
            config,
            client,
            hectares,
            max_ticks,
            report_dir,
        } => cmd_order(
            config.as_deref(),
            &client,
            hectares,
            max_ticks,
            report_dir.as_deref(),
        ),
        Commands::Live {
            config,
            seconds,
            speed_ms,
            report_dir,
        } => cmd_live(config.as_deref(), seconds, speed_ms, report_dir.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> AppResult<PlantConfig> {
    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading configuration");
            Ok(dg_config::load(path)?)
        }
        None => Ok(PlantConfig::reference()),
    }
}

fn build(config: &PlantConfig) -> AppResult<Simulation> {
    Ok(config.build_simulation(chrono::Utc::now())?)
}

fn cmd_validate(config_path: &Path) -> AppResult<()> {
    println!("Validating configuration: {}", config_path.display());
    let config = dg_config::load(config_path)?;
    build(&config)?;
    println!("✓ Configuration is valid: {}", config.name);
    Ok(())
}

fn cmd_run(
    config_path: Option<&Path>,
    ticks: u64,
    mode: ControlMode,
    target_level: Option<f64>,
    rain: Option<f64>,
    every: u64,
    output: Option<&Path>,
) -> AppResult<()> {
    let config = load_config(config_path)?;
    let mut sim = build(&config)?;
    sim.set_mode(mode);
    if let Some(level) = target_level {
        sim.set_target_level(level)?;
    }
    if let Some(intensity) = rain {
        sim.set_rain(true, intensity)?;
    }

    println!("Running {} ticks of '{}' in {} mode", ticks, config.name, mode);

    let mut writer = match output {
        Some(path) => Some(BufWriter::new(File::create(path)?)),
        None => {
            print_header();
            None
        }
    };
    let every = every.max(1);

    for _ in 0..ticks {
        let summary = sim.tick()?;
        match writer.as_mut() {
            Some(w) => {
                serde_json::to_writer(&mut *w, &summary.state)
                    .map_err(|e| AppError::InvalidInput(e.to_string()))?;
                writeln!(w)?;
            }
            None if summary.state.tick % every == 0 => print_row(&summary.state),
            None => {}
        }
    }
    if let Some(mut w) = writer {
        w.flush()?;
    }

    let state = sim.state();
    println!("✓ Simulated {:.0} s", state.elapsed_s);
    println!("  Water level: {:.3} m ({})", state.water_level, sim.alert_level());
    println!("  Gate: {:.1} % ({:?})", state.gate_opening, state.gate_status);
    println!(
        "  Energy: {:.3} kWh, cost {:.2}",
        state.total_energy, state.total_cost
    );
    Ok(())
}

fn cmd_order(
    config_path: Option<&Path>,
    client: &str,
    hectares: f64,
    max_ticks: u64,
    report_dir: Option<&Path>,
) -> AppResult<()> {
    let config = load_config(config_path)?;
    let mut sim = build(&config)?;
    let order = sim.start_order(client, hectares)?;
    println!(
        "Delivering {:.0} m³ to {} ({} ha)",
        order.target_volume, order.client_name, order.hectares
    );

    let mut completed = None;
    for _ in 0..max_ticks {
        if let Some(done) = sim.tick()?.completed {
            completed = Some(done);
            break;
        }
    }
    let Some(done) = completed else {
        let delivered = sim.active_order().map_or(0.0, |o| o.delivered_volume);
        sim.cancel_order()?;
        return Err(AppError::Simulation(format!(
            "order not fulfilled within {max_ticks} ticks ({delivered:.0} m³ delivered)"
        )));
    };

    let report = OrderReport::from_order(&done, sim.tariffs())?;
    println!("✓ Order completed in {:.0} s", report.duration_s);
    println!("  Delivered:   {:.1} m³", report.delivered_volume_m3);
    println!("  Energy:      {:.3} kWh", report.power_consumed_kwh);
    println!("  Energy cost: {:.2}", report.energy_cost);
    println!("  Water cost:  {:.2}", report.water_cost);
    println!("  Total:       {:.2}", report.total_cost);

    if let Some(dir) = report_dir {
        let location = JsonReporter::new(dir).export(&report)?;
        println!("  Report: {location}");
    }
    Ok(())
}

fn cmd_live(
    config_path: Option<&Path>,
    seconds: u64,
    speed_ms: Option<u64>,
    report_dir: Option<&Path>,
) -> AppResult<()> {
    let config = load_config(config_path)?;
    let mut sim = build(&config)?;
    if let Some(speed_ms) = speed_ms {
        sim.set_simulation_speed(speed_ms)?;
    }

    let options = ActorOptions {
        jog: config.jog.clone(),
        reporter: report_dir
            .map(|dir| Box::new(JsonReporter::new(dir)) as Box<dyn OrderReporter>),
    };
    let handle = SimulationHandle::spawn(sim, options)?;
    let events = handle.subscribe(256)?;
    handle.start()?;

    println!("Live session '{}' for {} s", config.name, seconds);
    print_header();

    let deadline = Instant::now() + Duration::from_secs(seconds);
    while let Some(left) = deadline.checked_duration_since(Instant::now()) {
        let event = match events.recv_timeout(left) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };
        match event {
            SimEvent::Tick(state) => print_row(&state),
            SimEvent::AlertChanged(change) => println!("! alert {} -> {}", change.from, change.to),
            SimEvent::OrderCompleted(order) => {
                println!("✓ order {} completed for {}", order.id, order.client_name)
            }
            SimEvent::Report(ReportMessage::Exported { location, .. }) => {
                println!("  report written: {location}")
            }
            SimEvent::Report(ReportMessage::Fallback { message, .. }) => println!("  {message}"),
            _ => {}
        }
    }

    handle.stop()?;
    let sim = handle.shutdown()?;
    println!("✓ Session ended after {} ticks", sim.state().tick);
    Ok(())
}

fn print_header() {
    println!(
        "{:>7} {:>9} {:>9} {:>8} {:>8} {:>9} {:>9} {:>10}",
        "tick", "level_m", "down_m", "gate_%", "tgt_%", "in_m3s", "out_m3s", "energy_kwh"
    );
}

fn print_row(s: &SystemState) {
    println!(
        "{:>7} {:>9.3} {:>9.3} {:>8.1} {:>8.1} {:>9.2} {:>9.2} {:>10.4}",
        s.tick,
        s.water_level,
        s.downstream_level,
        s.gate_opening,
        s.target_gate_opening,
        s.inflow_rate,
        s.outflow_rate,
        s.total_energy
    );
}
