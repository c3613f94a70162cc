//! Sensor Pong - main entry point
//!
//! Wires the sensor array to the scoring engine, maps typed cup numbers to
//! synchronous hits through the same dispatcher the sensors use, and hands
//! the session summary to whatever keeps the high-score table.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pong_common::events::{EventBus, GameEvent, SessionSummary};
use pong_engine::config::Config;
use pong_engine::dispatch::{Dispatcher, HitSink};
use pong_engine::scoring::{ComboRules, ScoreBoard};
use pong_engine::sensing::{DistanceProbe, ScriptedProbe, SensorArray};

/// Command-line arguments for pong-engine
#[derive(Parser, Debug)]
#[command(name = "pong-engine")]
#[command(about = "Sensor-driven cup scoring engine")]
#[command(version)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "PONG_CONFIG")]
    config: Option<PathBuf>,

    /// Player name recorded on the session summary
    #[arg(short, long, default_value = "player", env = "PONG_PLAYER")]
    player: String,

    /// End the session automatically after this many seconds
    #[arg(short, long)]
    duration: Option<u64>,

    /// Run against simulated sensors instead of GPIO hardware
    #[arg(long)]
    sim: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pong_engine=debug,pong_common=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path).context("Failed to load configuration")?,
        None => Config::default(),
    };
    info!("Configured for {} cups", config.cup_count());

    let events = EventBus::new(256);
    let board = Arc::new(ScoreBoard::new(config.cup_count(), ComboRules::default()));
    let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&board), events.clone()));

    let sim = args.sim || cfg!(not(feature = "hardware"));
    if sim && !args.sim {
        info!("Built without the `hardware` feature; running simulated sensors");
    }

    if sim {
        let array = sim_array(&config, events.clone());
        return run_session(array, args, board, dispatcher, events).await;
    }

    #[cfg(feature = "hardware")]
    return run_hardware(args, config, board, dispatcher, events).await;

    #[cfg(not(feature = "hardware"))]
    unreachable!("sim is forced on when the hardware feature is absent");
}

/// Bind the physical rack and run the session against it
#[cfg(feature = "hardware")]
async fn run_hardware(
    args: Args,
    config: Config,
    board: Arc<ScoreBoard>,
    dispatcher: Arc<Dispatcher>,
    events: EventBus,
) -> Result<()> {
    let bank =
        pong_engine::hal::rpi::RpiBank::new().context("Failed to open the GPIO controller")?;
    let array = pong_engine::sensing::setup(
        &bank,
        &config.sensors,
        config.tunables.clone(),
        events.clone(),
    );
    run_session(array, args, board, dispatcher, events).await
}

/// Simulated rack: every channel reads a steady baseline, so hits come only
/// from typed input. Useful for exercising the full pipeline off-target.
fn sim_array(config: &Config, events: EventBus) -> SensorArray<ScriptedProbe> {
    let mut array = SensorArray::new(config.tunables.clone(), events);
    for index in 0..config.cup_count() {
        array.add_channel(index, ScriptedProbe::steady(30.0));
    }
    array
}

/// Drive one session to completion: calibration, monitoring, key input,
/// shutdown, summary.
async fn run_session<P>(
    mut array: SensorArray<P>,
    args: Args,
    board: Arc<ScoreBoard>,
    dispatcher: Arc<Dispatcher>,
    events: EventBus,
) -> Result<()>
where
    P: DistanceProbe + Send + 'static,
{
    array.calibrate_all();
    array.start_monitoring(dispatcher.clone())?;

    // Terminal stand-in for the display: log every event as JSON.
    let mut rx = events.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => info!("event: {json}"),
                Err(e) => warn!("Failed to serialize {}: {e}", event.event_type()),
            }
        }
    });

    // Keyboard stand-in: a typed digit hits the matching cup directly,
    // through the same dispatcher the polling loops use.
    let key_sink = Arc::clone(&dispatcher);
    tokio::spawn(async move {
        use tokio::io::{AsyncBufReadExt, BufReader};
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match trimmed.parse::<usize>() {
                Ok(cup) => {
                    if let Err(e) = key_sink.on_hit(cup) {
                        warn!("Key input rejected: {e}");
                    }
                }
                Err(_) => warn!("Ignoring input {trimmed:?}; enter a cup number"),
            }
        }
    });

    match args.duration {
        Some(secs) => {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(secs)) => info!("Session time is up"),
                _ = shutdown_signal() => {}
            }
        }
        None => shutdown_signal().await,
    }

    array.stop_monitoring();

    let summary = SessionSummary {
        session_id: uuid::Uuid::new_v4(),
        player: args.player.clone(),
        score: board.score(),
        ended_at: chrono::Utc::now(),
    };
    events.emit_lossy(GameEvent::SessionEnded {
        summary: summary.clone(),
        timestamp: summary.ended_at,
    });
    info!("Final score for {}: {}", summary.player, summary.score);

    // Hand the record to whatever keeps the high-score table.
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
