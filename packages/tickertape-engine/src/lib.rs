//! Tickertape Engine - market simulation for the Tickertape paper-trading game.
//!
//! This crate generates the synthetic markets players trade against:
//!
//! - **Mood engine**: fear/greed and volatility indices per asset class
//! - **Cycle state machine**: accumulation, markup, distribution, markdown
//! - **Price process**: per-asset noise, sector drift and sentiment bias
//! - **Persistence**: JSON snapshots with rehydration repair
//! - **Heartbeat**: a cancellable tokio timer driving the simulation
//!
//! # Example
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use tickertape_engine::{MarketMetrics, SeededRandom, Simulation};
//!
//! let mut sim = Simulation::new(SeededRandom::new(42));
//!
//! // One heartbeat: mood tick, then every price moves
//! let updates = sim.step(Utc::now());
//! println!("{} prices updated", updates.len());
//!
//! // Slower cadence: evaluate the market cycle
//! sim.update_market_engine(MarketMetrics { momentum: 3.0 });
//! println!("Stock mood: {}", sim.engine().stock().mood_label());
//! ```

pub mod config;
pub mod heartbeat;
pub mod market;
pub mod mood;
pub mod random;
pub mod simulation;
pub mod snapshot;
pub mod types;

// Re-export commonly used types
pub use types::{
    ApiResponse, AssetClass, CryptoMetrics, CyclePhase, MacroMetrics, MarketMetrics,
    PhaseTransition, PricePoint, PriceUpdate,
};

// Re-export main functionality
pub use config::EngineConfig;
pub use heartbeat::HeartbeatConfig;
pub use market::{sector_multiplier, sector_multiplier_by_name, Asset, Market, PriceGenerator, Sector};
pub use mood::{CryptoMood, MoodColor, MoodEngine, MoodLabel, StockMood};
pub use random::{RandomSource, SeededRandom, SequenceRandom};
pub use simulation::{CycleOutcome, Simulation};
pub use snapshot::{normalize, MarketSnapshot, SnapshotStore};

/// Error types for tickertape-engine I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type for tickertape-engine operations.
pub type Result<T> = std::result::Result<T, Error>;
