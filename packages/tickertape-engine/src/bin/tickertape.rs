//! Tickertape CLI - drive and inspect the market simulation.
//!
//! Every command prints a JSON `ApiResponse` on stdout; logs go to stderr.

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use tickertape_engine::{
    heartbeat::{self, HeartbeatConfig},
    market::SECTOR_MULTIPLIERS,
    ApiResponse, AssetClass, CryptoMetrics, CyclePhase, EngineConfig, MacroMetrics,
    MarketMetrics, MarketSnapshot, Sector, Simulation, SnapshotStore,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "tickertape")]
#[command(about = "Tickertape market simulation CLI")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show mood, cycle phase and prices
    Status,
    /// Run the heartbeat for a number of ticks
    Run {
        /// Ticks to run
        #[arg(short, long, default_value = "60")]
        ticks: u64,
        /// Override the heartbeat interval
        #[arg(short, long)]
        interval_ms: Option<u64>,
    },
    /// Evaluate the stock cycle with the given momentum
    Cycle {
        #[arg(short, long, allow_hyphen_values = true)]
        momentum: f64,
    },
    /// Evaluate the crypto cycle with the given narrative metrics
    CryptoCycle {
        #[arg(long)]
        hype: f64,
        #[arg(long)]
        dominance: f64,
    },
    /// Overwrite the macro backdrop
    Macro {
        #[arg(long, allow_hyphen_values = true)]
        interest_rate: f64,
        #[arg(long, allow_hyphen_values = true)]
        gdp_growth: f64,
        #[arg(long, allow_hyphen_values = true)]
        inflation: f64,
    },
    /// Print the sector multiplier table
    Sectors,
    /// Reset mood and prices to their initial values
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match EngineConfig::load() {
        Ok(config) => config,
        Err(e) => {
            println!("{}", render(&ApiResponse::<()>::err(e.to_string())));
            return Ok(());
        }
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let store = SnapshotStore::new(config.state_path());
    let snapshot = match store.load() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::warn!("Ignoring unreadable snapshot {}: {}", store.path().display(), e);
            MarketSnapshot::default()
        }
    };
    let mut sim = Simulation::from_config(&config, Some(&snapshot));

    let output = match cli.command {
        Commands::Status => handle_status(&sim),
        Commands::Run { ticks, interval_ms } => {
            let mut heartbeat = HeartbeatConfig::from(&config);
            heartbeat.max_ticks = Some(ticks);
            if let Some(ms) = interval_ms {
                heartbeat.interval = Duration::from_millis(ms.max(1));
            }
            handle_run(&mut sim, &heartbeat, &store).await
        }
        Commands::Cycle { momentum } => {
            let transition = sim.update_market_engine(MarketMetrics { momentum });
            save_then(&sim, &store, json!({
                "transition": transition,
                "phase": sim.engine().stock().cycle_phase(),
            }))
        }
        Commands::CryptoCycle { hype, dominance } => {
            let transition = sim.update_crypto_engine(CryptoMetrics { hype, dominance });
            save_then(&sim, &store, json!({
                "transition": transition,
                "phase": sim.engine().crypto().cycle_phase(),
            }))
        }
        Commands::Macro {
            interest_rate,
            gdp_growth,
            inflation,
        } => {
            let metrics = MacroMetrics {
                interest_rate,
                gdp_growth,
                inflation,
            };
            sim.set_macro_metrics(metrics);
            save_then(&sim, &store, json!({ "macro": metrics }))
        }
        Commands::Sectors => handle_sectors(),
        Commands::Reset => {
            sim.reset();
            save_then(&sim, &store, json!({ "message": "Market reset" }))
        }
    };

    println!("{}", output);
    Ok(())
}

fn render<T: Serialize>(response: &ApiResponse<T>) -> String {
    serde_json::to_string_pretty(response)
        .unwrap_or_else(|e| format!("{{\"ok\":false,\"error\":\"{}\"}}", e))
}

fn save_then(sim: &Simulation, store: &SnapshotStore, data: serde_json::Value) -> String {
    if let Err(e) = store.save(&sim.snapshot()) {
        return render(&ApiResponse::<()>::err(e.to_string()));
    }
    render(&ApiResponse::ok(data))
}

fn status_json(sim: &Simulation) -> serde_json::Value {
    let engine = sim.engine();
    let assets: Vec<_> = sim
        .market()
        .assets()
        .iter()
        .map(|a| {
            json!({
                "symbol": a.symbol,
                "name": a.name,
                "class": a.asset_class,
                "sector": a.sector,
                "price": a.price,
                "changePercent": a.change_since_session_start(),
            })
        })
        .collect();

    json!({
        "stock": {
            "mood": engine.stock(),
            "label": engine.mood_label(AssetClass::Stock).as_str(),
            "color": engine.mood_color(AssetClass::Stock).hex(),
        },
        "crypto": {
            "mood": engine.crypto(),
            "label": engine.mood_label(AssetClass::Crypto).as_str(),
            "color": engine.mood_color(AssetClass::Crypto).hex(),
        },
        "momentum": sim.market_momentum(),
        "assets": assets,
    })
}

fn handle_status(sim: &Simulation) -> String {
    render(&ApiResponse::ok(status_json(sim)))
}

async fn handle_run(sim: &mut Simulation, config: &HeartbeatConfig, store: &SnapshotStore) -> String {
    let (tx, rx) = heartbeat::shutdown_channel();
    tokio::spawn(heartbeat::shutdown_on(tokio::signal::ctrl_c(), tx));
    sim.on_price_update(|update| {
        tracing::trace!("{} {:.2} ({:+.3}%)", update.symbol, update.price, update.change_percent());
    });

    let ticks = heartbeat::run(sim, config, rx).await;
    let status = status_json(sim);
    save_then(sim, store, json!({ "ticks": ticks, "status": status }))
}

fn handle_sectors() -> String {
    let rows: Vec<_> = CyclePhase::ALL
        .iter()
        .zip(SECTOR_MULTIPLIERS.iter())
        .map(|(phase, values)| {
            let cells: serde_json::Map<String, serde_json::Value> = Sector::ALL
                .iter()
                .zip(values.iter())
                .map(|(sector, value)| (sector.as_str().to_string(), json!(value)))
                .collect();
            json!({ "phase": phase, "multipliers": cells })
        })
        .collect();
    render(&ApiResponse::ok(json!({ "sectors": rows })))
}
