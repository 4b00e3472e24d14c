use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use mission_core::{
    Event, EventEnvelope, MetricsFileWriter, MissionEngine, MissionParameters, MissionPhase,
    TickOutcome, TimeUnit,
};
use mission_world::{
    apply_mode, apply_overrides, apply_time_unit, build_engine, load_content, parse_override,
    MissionContent,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "mission_cli", about = "Debris Collection Mission CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum UnitArg {
    Days,
    Months,
    Years,
}

impl From<UnitArg> for TimeUnit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Days => TimeUnit::Days,
            UnitArg::Months => TimeUnit::Months,
            UnitArg::Years => TimeUnit::Years,
        }
    }
}

#[derive(Args)]
struct MissionArgs {
    /// Seed for the catalog RNG. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value = "./content")]
    content_dir: String,
    /// Mission mode preset from presets.json (e.g. short, long).
    #[arg(long)]
    mode: Option<String>,
    /// Switch time unit, adopting that unit's preset duration and catalog size.
    #[arg(long, value_enum)]
    time_unit: Option<UnitArg>,
    /// Override one parameter, e.g. `--set numDebris=40`. Applied last; repeatable.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a mission from start to completion.
    Run {
        #[command(flatten)]
        mission: MissionArgs,
        #[arg(long, default_value_t = 1)]
        print_every: u32,
        /// Pause after this period instead of running to completion.
        #[arg(long)]
        stop_at: Option<u32>,
        /// Sleep the configured tick interval between periods.
        #[arg(long, conflicts_with = "manual")]
        realtime: bool,
        /// Drive the mission with explicit steps instead of the timer.
        #[arg(long)]
        manual: bool,
        /// Disable writing the run directory.
        #[arg(long)]
        no_metrics: bool,
        #[arg(long, default_value = "runs")]
        output_dir: String,
    },
    /// Print the highest-priority catalog entries without running.
    Catalog {
        #[command(flatten)]
        mission: MissionArgs,
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
}

struct RunOptions {
    print_every: u32,
    stop_at: Option<u32>,
    realtime: bool,
    manual: bool,
    no_metrics: bool,
    output_dir: String,
}

// ---------------------------------------------------------------------------
// Parameter resolution
// ---------------------------------------------------------------------------

/// Content defaults, then mode, then time unit, then explicit overrides.
fn resolve_params(content: &MissionContent, args: &MissionArgs) -> Result<MissionParameters> {
    let mut params = content.parameters.clone();
    if let Some(mode) = &args.mode {
        apply_mode(&mut params, mode, &content.presets)?;
    }
    if let Some(unit) = args.time_unit {
        apply_time_unit(&mut params, unit.into(), &content.presets);
    }
    let overrides = args
        .overrides
        .iter()
        .map(|pair| parse_override(pair))
        .collect::<Result<HashMap<_, _>>>()?;
    apply_overrides(&mut params, &overrides)?;
    Ok(params)
}

fn setup_engine(args: &MissionArgs) -> Result<MissionEngine> {
    let content = load_content(&args.content_dir)?;
    let params = resolve_params(&content, args)?;
    let seed = args.seed.unwrap_or_else(rand::random);
    build_engine(&content, params, seed)
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

fn generate_run_id(seed: u64) -> String {
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    format!("{timestamp}_seed{seed}")
}

fn create_run_dir(output_dir: &str, run_id: &str) -> Result<PathBuf> {
    let dir = PathBuf::from(output_dir).join(run_id);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating run directory: {}", dir.display()))?;
    Ok(dir)
}

fn write_json(dir: &Path, name: &str, value: &impl serde::Serialize) -> Result<()> {
    let path = dir.join(name);
    let file =
        std::fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, value)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn write_run_info(
    dir: &Path,
    run_id: &str,
    engine: &MissionEngine,
    opts: &RunOptions,
) -> Result<()> {
    let info = serde_json::json!({
        "run_id": run_id,
        "seed": engine.seed(),
        "runner": "mission_cli",
        "params": engine.params(),
        "tick_interval_ms": u64::try_from(engine.tick_interval().as_millis()).unwrap_or(u64::MAX),
        "args": {
            "print_every": opts.print_every,
            "stop_at": opts.stop_at,
            "realtime": opts.realtime,
            "manual": opts.manual,
        }
    });
    write_json(dir, "run_info.json", &info)
}

/// Create the run directory with its static files and the metrics CSV writer.
fn open_run_dir(
    engine: &MissionEngine,
    opts: &RunOptions,
) -> Result<(PathBuf, MetricsFileWriter)> {
    let run_id = generate_run_id(engine.seed());
    let dir = create_run_dir(&opts.output_dir, &run_id)?;
    write_run_info(&dir, &run_id, engine, opts)?;
    write_json(&dir, "catalog.json", &engine.catalog())?;
    let writer = MetricsFileWriter::new(dir.clone())
        .with_context(|| format!("opening metrics CSV in {}", dir.display()))?;
    tracing::debug!(run_id = %run_id, "run directory created");
    println!("Run directory: {}", dir.display());
    Ok((dir, writer))
}

fn run(mut engine: MissionEngine, opts: &RunOptions) -> Result<()> {
    if opts.print_every == 0 {
        bail!("--print-every must be >= 1");
    }
    if let Some(stop) = opts.stop_at {
        if stop == 0 || stop > engine.params().mission_duration {
            bail!(
                "--stop-at must be within 1..={}",
                engine.params().mission_duration
            );
        }
    }

    let (run_dir, mut metrics_writer) = if opts.no_metrics {
        (None, None)
    } else {
        let (dir, writer) = open_run_dir(&engine, opts)?;
        (Some(dir), Some(writer))
    };

    let params = engine.params().clone();
    println!(
        "Starting mission: seed={} debris={} duration={} {} rate={:.2}/{} efficiency={:.0}% \
         cost=${:.1}M",
        engine.seed(),
        params.num_debris,
        params.mission_duration,
        params.time_unit.label_plural().to_lowercase(),
        params.collection_rate(),
        params.time_unit.label().to_lowercase(),
        params.collection_efficiency * 100.0,
        params.cost_per_mission / 1e6,
    );
    println!("{}", "-".repeat(80));

    engine.start()?;
    if opts.manual {
        engine.pause()?;
    }

    loop {
        if opts
            .stop_at
            .is_some_and(|stop| engine.current_period() >= stop)
        {
            if engine.phase() == MissionPhase::Running {
                engine.pause()?;
            }
            break;
        }
        let Some(events) = next_period(&mut engine, opts)? else {
            break;
        };

        let period = engine.current_period();
        if period % opts.print_every == 0 {
            print_status(&engine);
        }
        for event in &events {
            if let Event::MissionCompleted { .. } = event.event {
                println!(
                    "*** MISSION COMPLETE at {} {} ***",
                    params.time_unit.label(),
                    period
                );
            }
        }

        if let Some(ref mut writer) = metrics_writer {
            writer
                .write_row(period, engine.results())
                .context("writing metrics row")?;
        }
    }

    println!("{}", "-".repeat(80));
    println!(
        "Done. Phase {} at {} {}:",
        engine.phase(),
        params.time_unit.label(),
        engine.current_period()
    );
    print_summary(&engine);

    if let Some(ref mut writer) = metrics_writer {
        writer.flush().context("final metrics flush")?;
    }
    if let Some(dir) = run_dir {
        write_json(&dir, "period_log.json", &engine.period_log())?;
        println!("Metrics written to {}.", dir.display());
    }

    Ok(())
}

/// Advance one period, by stepping in manual mode or by firing the armed
/// timer otherwise. `None` once nothing is left to advance.
fn next_period(
    engine: &mut MissionEngine,
    opts: &RunOptions,
) -> Result<Option<Vec<EventEnvelope>>> {
    if opts.manual {
        if !engine.can_step() {
            return Ok(None);
        }
        return Ok(Some(engine.step()?));
    }
    let Some(scheduled) = engine.scheduled_tick() else {
        return Ok(None);
    };
    if opts.realtime {
        std::thread::sleep(scheduled.interval);
    }
    match engine.tick(scheduled.token) {
        TickOutcome::Advanced(events) | TickOutcome::Completed(events) => Ok(Some(events)),
        TickOutcome::Cancelled => Ok(None),
    }
}

fn print_status(engine: &MissionEngine) {
    let params = engine.params();
    let results = engine.results();
    let target = engine
        .current_target()
        .map_or_else(|| "-".to_string(), |t| t.id.to_string());
    println!(
        "[{label} {period:>3}/{duration}]  collected={collected:>4}/{total}  \
         mass={mass:>10.1} kg  value=${value:>8.2}M  profit=${profit:>8.2}M  \
         risk={risk:>5.1}%  target={target}",
        label = params.time_unit.label(),
        period = engine.current_period(),
        duration = params.mission_duration,
        collected = results.total_collected,
        total = params.num_debris,
        mass = results.total_mass,
        value = results.total_value / 1e6,
        profit = results.profit / 1e6,
        risk = results.risk_reduced,
    );
}

fn print_summary(engine: &MissionEngine) {
    let results = engine.results();
    println!(
        "  stage           {}/5 {}",
        engine.stage().index(),
        engine.stage().title()
    );
    println!("  collected       {}", results.total_collected);
    println!("  recovered mass  {:.1} kg", results.total_mass);
    println!("  value           ${:.2}M", results.total_value / 1e6);
    println!("  cost            ${:.2}M", results.total_cost / 1e6);
    println!("  profit          ${:.2}M", results.profit / 1e6);
    println!("  risk reduced    {:.1}%", results.risk_reduced);
    for (material, kg) in &results.material_breakdown {
        println!("    {material:<14} {kg:>10.1} kg");
    }
}

fn print_catalog(engine: &MissionEngine, top: usize) {
    println!(
        "{:<10} {:<13} {:>8} {:>8} {:>9} {:>7} {:>7} {:>10} {:>8}",
        "id", "material", "g/cm3", "mass_kg", "alt_km", "threat", "access", "value_$M", "priority"
    );
    for debris in engine.catalog().iter().take(top) {
        println!(
            "{:<10} {:<13} {:>8.1} {:>8.1} {:>9.1} {:>6.0}% {:>6.0}% {:>10.2} {:>8.4}",
            debris.id.to_string(),
            debris.material.to_string(),
            debris.material.density(),
            debris.mass,
            debris.altitude,
            debris.threat_level * 100.0,
            debris.accessibility * 100.0,
            debris.value / 1e6,
            debris.priority,
        );
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            mission,
            print_every,
            stop_at,
            realtime,
            manual,
            no_metrics,
            output_dir,
        } => {
            let engine = setup_engine(&mission)?;
            let opts = RunOptions {
                print_every,
                stop_at,
                realtime,
                manual,
                no_metrics,
                output_dir,
            };
            run(engine, &opts)?;
        }
        Commands::Catalog { mission, top } => {
            let engine = setup_engine(&mission)?;
            print_catalog(&engine, top);
        }
    }
    Ok(())
}
