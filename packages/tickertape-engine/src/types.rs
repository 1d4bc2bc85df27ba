//! Core data types shared by the mood engine, the market and the simulation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Market-cycle regime driving drift bias and target volatility.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum CyclePhase {
    #[default]
    Accumulation,
    Markup,
    Distribution,
    Markdown,
}

impl CyclePhase {
    /// All phases in cycle order.
    pub const ALL: [CyclePhase; 4] = [
        CyclePhase::Accumulation,
        CyclePhase::Markup,
        CyclePhase::Distribution,
        CyclePhase::Markdown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CyclePhase::Accumulation => "accumulation",
            CyclePhase::Markup => "markup",
            CyclePhase::Distribution => "distribution",
            CyclePhase::Markdown => "markdown",
        }
    }

    /// Parse a persisted phase name, falling back to accumulation for
    /// anything outside the four known values.
    pub fn parse_or_default(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CyclePhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "accumulation" => Ok(CyclePhase::Accumulation),
            "markup" => Ok(CyclePhase::Markup),
            "distribution" => Ok(CyclePhase::Distribution),
            "markdown" => Ok(CyclePhase::Markdown),
            other => Err(format!("unknown cycle phase: {}", other)),
        }
    }
}

/// Asset class; each class has its own mood state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Stock,
    Crypto,
}

/// A single price sample in an asset's history.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Simulated macro conditions for the stock market.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MacroMetrics {
    /// Policy interest rate (percent)
    pub interest_rate: f64,
    /// Real GDP growth (percent)
    pub gdp_growth: f64,
    /// Inflation (percent)
    pub inflation: f64,
}

impl Default for MacroMetrics {
    fn default() -> Self {
        Self {
            interest_rate: 2.5,
            gdp_growth: 2.0,
            inflation: 2.0,
        }
    }
}

/// Input to a stock cycle evaluation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct MarketMetrics {
    /// Sign and magnitude of the recent price trend
    pub momentum: f64,
}

/// Input to a crypto cycle evaluation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CryptoMetrics {
    pub hype: f64,
    pub dominance: f64,
}

/// A phase change produced by a cycle evaluation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhaseTransition {
    pub from: CyclePhase,
    pub to: CyclePhase,
}

/// Emitted for every asset on every price tick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceUpdate {
    pub symbol: String,
    pub asset_class: AssetClass,
    pub previous: f64,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
}

impl PriceUpdate {
    /// Percent change produced by this tick.
    pub fn change_percent(&self) -> f64 {
        if self.previous > 0.0 {
            (self.price - self.previous) / self.previous * 100.0
        } else {
            0.0
        }
    }
}

/// API response wrapper used by the CLI's JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
