//! Persisted engine snapshot and its rehydration repair.
//!
//! The snapshot mirrors the mood state field by field and is versioned only by
//! field presence: anything missing falls back to its initial constant.
//! [`normalize`] is the single place where persisted state is repaired.

use crate::market::{catalog_assets, Asset, Market, Sector};
use crate::mood::cycle::{clamp_sentiment, clamp_volatility};
use crate::mood::{CryptoMood, StockMood};
use crate::types::{AssetClass, CyclePhase, MacroMetrics, PricePoint};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted stock mood. Every field is optional.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct StockMoodSnapshot {
    pub sentiment_index: Option<f64>,
    pub volatility_index: Option<f64>,
    /// Kept untyped so a corrupted value can be repaired instead of failing
    /// the whole load
    pub cycle_phase: Option<serde_json::Value>,
    pub momentum: Option<f64>,
    pub interest_rate: Option<f64>,
    pub gdp_growth: Option<f64>,
    pub inflation: Option<f64>,
    pub tick_count: Option<u64>,
}

/// Persisted crypto mood.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CryptoMoodSnapshot {
    pub sentiment_index: Option<f64>,
    pub volatility_index: Option<f64>,
    pub cycle_phase: Option<serde_json::Value>,
    pub hype: Option<f64>,
    pub dominance: Option<f64>,
    pub tick_count: Option<u64>,
}

/// Persisted asset price state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssetSnapshot {
    pub symbol: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_open: Option<f64>,
    #[serde(default)]
    pub history: Vec<PricePoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_class: Option<AssetClass>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<Sector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volatility: Option<f64>,
}

/// Complete persisted engine state.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MarketSnapshot {
    pub stock: StockMoodSnapshot,
    pub crypto: CryptoMoodSnapshot,
    pub assets: Vec<AssetSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl MarketSnapshot {
    /// Capture live state.
    pub fn capture(stock: &StockMood, crypto: &CryptoMood, market: &Market) -> Self {
        let macro_metrics = stock.macro_metrics();
        Self {
            stock: StockMoodSnapshot {
                sentiment_index: Some(stock.sentiment_index()),
                volatility_index: Some(stock.volatility_index()),
                cycle_phase: Some(stock.cycle_phase().as_str().into()),
                momentum: Some(stock.momentum()),
                interest_rate: Some(macro_metrics.interest_rate),
                gdp_growth: Some(macro_metrics.gdp_growth),
                inflation: Some(macro_metrics.inflation),
                tick_count: Some(stock.tick_count()),
            },
            crypto: CryptoMoodSnapshot {
                sentiment_index: Some(crypto.sentiment_index()),
                volatility_index: Some(crypto.volatility_index()),
                cycle_phase: Some(crypto.cycle_phase().as_str().into()),
                hype: Some(crypto.hype()),
                dominance: Some(crypto.dominance()),
                tick_count: Some(crypto.tick_count()),
            },
            assets: market.assets().iter().map(AssetSnapshot::from).collect(),
            saved_at: Some(Utc::now()),
        }
    }
}

impl From<Asset> for AssetSnapshot {
    fn from(asset: Asset) -> Self {
        Self::from(&asset)
    }
}

impl TryFrom<AssetSnapshot> for Asset {
    type Error = String;

    fn try_from(snapshot: AssetSnapshot) -> std::result::Result<Self, Self::Error> {
        if !valid_price(snapshot.price) {
            return Err(format!("invalid price {} for {}", snapshot.price, snapshot.symbol));
        }
        let mut asset = custom_asset(&snapshot).ok_or_else(|| {
            format!("{} needs an asset class, and a sector for stocks", snapshot.symbol)
        })?;
        apply_persisted(&mut asset, &snapshot);
        Ok(asset)
    }
}

impl From<&Asset> for AssetSnapshot {
    fn from(asset: &Asset) -> Self {
        Self {
            symbol: asset.symbol.clone(),
            price: asset.price,
            session_open: Some(asset.session_open),
            history: asset.history().iter().copied().collect(),
            name: Some(asset.name.clone()),
            asset_class: Some(asset.asset_class),
            sector: asset.sector,
            volatility: Some(asset.volatility),
        }
    }
}

/// Mood state rebuilt from a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredMood {
    pub stock: StockMood,
    pub crypto: CryptoMood,
}

/// Repair a snapshot into valid mood state: missing or non-finite numbers
/// take their initial constants, indices are clamped into bounds and any
/// phase outside the enum becomes accumulation.
pub fn normalize(snapshot: &MarketSnapshot) -> RestoredMood {
    RestoredMood {
        stock: normalize_stock(&snapshot.stock),
        crypto: normalize_crypto(&snapshot.crypto),
    }
}

pub fn normalize_stock(snapshot: &StockMoodSnapshot) -> StockMood {
    let defaults = StockMood::default();
    let macro_defaults = MacroMetrics::default();
    StockMood {
        sentiment_index: clamp_sentiment(finite_or(snapshot.sentiment_index, defaults.sentiment_index)),
        volatility_index: clamp_volatility(finite_or(
            snapshot.volatility_index,
            defaults.volatility_index,
        )),
        cycle_phase: normalize_phase("stock", snapshot.cycle_phase.as_ref()),
        momentum: finite_or(snapshot.momentum, defaults.momentum),
        macro_metrics: MacroMetrics {
            interest_rate: finite_or(snapshot.interest_rate, macro_defaults.interest_rate),
            gdp_growth: finite_or(snapshot.gdp_growth, macro_defaults.gdp_growth),
            inflation: finite_or(snapshot.inflation, macro_defaults.inflation),
        },
        tick_count: snapshot.tick_count.unwrap_or(0),
    }
}

pub fn normalize_crypto(snapshot: &CryptoMoodSnapshot) -> CryptoMood {
    let defaults = CryptoMood::default();
    CryptoMood {
        sentiment_index: clamp_sentiment(finite_or(snapshot.sentiment_index, defaults.sentiment_index)),
        volatility_index: clamp_volatility(finite_or(
            snapshot.volatility_index,
            defaults.volatility_index,
        )),
        cycle_phase: normalize_phase("crypto", snapshot.cycle_phase.as_ref()),
        hype: finite_or(snapshot.hype, defaults.hype).clamp(0.0, 100.0),
        dominance: finite_or(snapshot.dominance, defaults.dominance).clamp(0.0, 100.0),
        tick_count: snapshot.tick_count.unwrap_or(0),
    }
}

fn normalize_phase(market: &str, value: Option<&serde_json::Value>) -> CyclePhase {
    match value {
        None | Some(serde_json::Value::Null) => CyclePhase::default(),
        Some(serde_json::Value::String(s)) => match s.parse() {
            Ok(phase) => phase,
            Err(_) => {
                tracing::warn!("Repaired invalid {} cycle phase {:?}", market, s);
                CyclePhase::default()
            }
        },
        Some(other) => {
            tracing::warn!("Repaired invalid {} cycle phase {}", market, other);
            CyclePhase::default()
        }
    }
}

fn finite_or(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(default)
}

/// Rebuild the market: catalog assets take their persisted price and
/// history, persisted non-catalog assets are appended when fully described.
/// Entries with a non-positive or non-finite price are ignored.
pub fn restore_market(snapshots: &[AssetSnapshot]) -> Market {
    let mut assets = catalog_assets();

    for snapshot in snapshots {
        if !valid_price(snapshot.price) {
            tracing::warn!("Dropping persisted {} with price {}", snapshot.symbol, snapshot.price);
            continue;
        }

        let symbol = snapshot.symbol.to_uppercase();
        let idx = match assets.iter().position(|a| a.symbol == symbol) {
            Some(idx) => idx,
            None => match custom_asset(snapshot) {
                Some(asset) => {
                    assets.push(asset);
                    assets.len() - 1
                }
                None => continue,
            },
        };

        apply_persisted(&mut assets[idx], snapshot);
    }

    Market::new(assets)
}

fn valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

fn apply_persisted(asset: &mut Asset, snapshot: &AssetSnapshot) {
    asset.price = snapshot.price;
    asset.session_open = snapshot
        .session_open
        .filter(|p| valid_price(*p))
        .unwrap_or(snapshot.price);
    asset.restore_history(snapshot.history.clone());
}

fn custom_asset(snapshot: &AssetSnapshot) -> Option<Asset> {
    let name = snapshot.name.as_deref().unwrap_or(&snapshot.symbol);
    let volatility = snapshot.volatility.unwrap_or(5.0);
    match (snapshot.asset_class?, snapshot.sector) {
        (AssetClass::Stock, Some(sector)) => Some(Asset::stock(
            &snapshot.symbol,
            name,
            sector,
            snapshot.price,
            volatility,
        )),
        (AssetClass::Crypto, _) => Some(Asset::crypto(&snapshot.symbol, name, snapshot.price, volatility)),
        (AssetClass::Stock, None) => None,
    }
}

/// JSON file persistence for [`MarketSnapshot`].
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default snapshot path: `~/.tickertape/market.json`.
    /// Can be overridden with the `TICKERTAPE_STATE_FILE` environment variable.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var("TICKERTAPE_STATE_FILE") {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".tickertape/market.json"))
            .unwrap_or_else(|| PathBuf::from("market.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot; a missing file yields an empty snapshot.
    pub fn load(&self) -> Result<MarketSnapshot> {
        if !self.path.exists() {
            return Ok(MarketSnapshot::default());
        }

        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, snapshot: &MarketSnapshot) -> Result<()> {
        let content = serde_json::to_string_pretty(snapshot)?;
        write_file(&self.path, &content)
    }
}

/// Write `content` to `path`, creating parent directories.
pub(crate) fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}
