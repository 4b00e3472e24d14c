mod routes;
mod state;
mod tick_loop;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use mission_world::{apply_mode, build_engine, load_content};

use crate::routes::make_router_with_cors;
use crate::state::AppState;
use crate::tick_loop::sync_timer;

#[derive(Parser)]
#[command(name = "mission_daemon", about = "Debris Collection Mission HTTP daemon")]
struct Cli {
    #[arg(long, default_value = "./content")]
    content_dir: String,
    /// Seed for the catalog RNG. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = 3001)]
    port: u16,
    /// Override the content's tick interval.
    #[arg(long)]
    tick_interval_ms: Option<u64>,
    /// Mission mode preset to configure at startup.
    #[arg(long)]
    mode: Option<String>,
    /// Start the mission immediately instead of waiting for POST /start.
    #[arg(long)]
    autostart: bool,
    #[arg(long, default_value = "http://localhost:5173")]
    cors_origin: String,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn build_state(cli: &Cli) -> Result<AppState> {
    let content = load_content(&cli.content_dir)?;
    let mut params = content.parameters.clone();
    if let Some(mode) = &cli.mode {
        apply_mode(&mut params, mode, &content.presets)?;
    }
    let seed = cli.seed.unwrap_or_else(rand::random);
    let mut engine = build_engine(&content, params, seed)?;
    if let Some(ms) = cli.tick_interval_ms {
        engine
            .set_tick_interval(Duration::from_millis(ms))
            .context("--tick-interval-ms")?;
    }
    tracing::info!(
        seed,
        num_debris = engine.params().num_debris,
        duration = engine.params().mission_duration,
        tick_interval_ms = u64::try_from(engine.tick_interval().as_millis()).unwrap_or(u64::MAX),
        "mission loaded"
    );
    Ok(AppState::new(engine, content.content_version))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let app_state = build_state(&cli)?;

    if cli.autostart {
        let mut mission = app_state.mission.lock();
        let events = mission.engine.start()?;
        sync_timer(&app_state, &mut mission);
        let _ = app_state.event_tx.send(events);
    }

    let router = make_router_with_cors(app_state, &cli.cors_origin);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", cli.port))
        .await
        .with_context(|| format!("binding port {}", cli.port))?;
    tracing::info!("listening on http://0.0.0.0:{}", cli.port);
    axum::serve(listener, router).await.context("serving HTTP")?;
    Ok(())
}
