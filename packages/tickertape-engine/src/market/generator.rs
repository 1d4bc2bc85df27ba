//! Per-asset price process.
//!
//! `new = price * (1 + noise + sector + sentiment_bias)` where noise scales
//! with the market volatility index and the asset's own volatility scalar.

use super::asset::{floor_price, Asset};
use super::sector::sector_multiplier;
use crate::types::{AssetClass, CyclePhase};
use serde::{Deserialize, Serialize};

/// The slice of mood state the price process reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketConditions {
    pub phase: CyclePhase,
    pub sentiment_index: f64,
    pub volatility_index: f64,
}

/// Scaling constants of the price process.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PriceGenerator {
    /// Max per-tick noise for a stock at volatility index 100 and scalar 10
    pub stock_noise_scale: f64,
    /// Same for crypto
    pub crypto_noise_scale: f64,
    /// Drift at sentiment 100 (negated at sentiment 0)
    pub sentiment_bias_scale: f64,
}

impl Default for PriceGenerator {
    fn default() -> Self {
        Self {
            stock_noise_scale: 0.02,
            crypto_noise_scale: 0.04,
            sentiment_bias_scale: 0.002,
        }
    }
}

impl PriceGenerator {
    /// Symmetric noise for a uniform draw in `[0, 1)`.
    pub fn base_noise(&self, asset: &Asset, conditions: &MarketConditions, draw: f64) -> f64 {
        let scale = match asset.asset_class {
            AssetClass::Stock => self.stock_noise_scale,
            AssetClass::Crypto => self.crypto_noise_scale,
        };
        (2.0 * draw - 1.0) * (conditions.volatility_index / 100.0) * (asset.volatility / 10.0) * scale
    }

    /// Sector drift; zero for crypto and sector-less assets.
    pub fn sector_drift(&self, asset: &Asset, conditions: &MarketConditions) -> f64 {
        match (asset.asset_class, asset.sector) {
            (AssetClass::Stock, Some(sector)) => sector_multiplier(conditions.phase, sector),
            _ => 0.0,
        }
    }

    /// Drift from how far sentiment sits from neutral.
    pub fn sentiment_bias(&self, conditions: &MarketConditions) -> f64 {
        (conditions.sentiment_index - 50.0) / 50.0 * self.sentiment_bias_scale
    }

    /// Next price for `asset`, floored to stay positive.
    pub fn next_price(&self, asset: &Asset, conditions: &MarketConditions, draw: f64) -> f64 {
        let change = self.base_noise(asset, conditions, draw)
            + self.sector_drift(asset, conditions)
            + self.sentiment_bias(conditions);
        floor_price(asset.price * (1.0 + change), asset.price)
    }
}
