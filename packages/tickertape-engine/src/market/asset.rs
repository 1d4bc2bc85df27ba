//! Tradable simulated assets and their bounded price history.

use super::sector::Sector;
use crate::snapshot::AssetSnapshot;
use crate::types::{AssetClass, PricePoint};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum number of samples kept per asset.
pub const HISTORY_LIMIT: usize = 50;

/// Prices never fall below this floor.
pub const PRICE_FLOOR: f64 = 0.01;

pub const VOLATILITY_SCALE_MIN: f64 = 1.0;
pub const VOLATILITY_SCALE_MAX: f64 = 10.0;

/// A simulated stock or crypto asset.
///
/// Serialized as an [`AssetSnapshot`]; deserializing goes through the same
/// validation as snapshot restore.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "AssetSnapshot", into = "AssetSnapshot")]
pub struct Asset {
    /// Ticker symbol (uppercase)
    pub symbol: String,
    /// Display name
    pub name: String,
    pub asset_class: AssetClass,
    /// Sector for the drift table (stocks only)
    pub sector: Option<Sector>,
    /// Per-asset noise scalar on a 1-10 scale
    pub volatility: f64,
    /// Current price
    pub price: f64,
    /// Price when the session started
    pub session_open: f64,
    history: VecDeque<PricePoint>,
}

impl Asset {
    /// Create a stock with an empty history.
    pub fn stock(symbol: &str, name: &str, sector: Sector, price: f64, volatility: f64) -> Self {
        Self::build(symbol, name, AssetClass::Stock, Some(sector), price, volatility)
    }

    /// Create a crypto asset with an empty history.
    pub fn crypto(symbol: &str, name: &str, price: f64, volatility: f64) -> Self {
        Self::build(symbol, name, AssetClass::Crypto, None, price, volatility)
    }

    fn build(
        symbol: &str,
        name: &str,
        asset_class: AssetClass,
        sector: Option<Sector>,
        price: f64,
        volatility: f64,
    ) -> Self {
        let price = floor_price(price, PRICE_FLOOR);
        Self {
            symbol: symbol.to_uppercase(),
            name: name.to_string(),
            asset_class,
            sector,
            volatility: clamp_volatility_scale(volatility),
            price,
            session_open: price,
            history: VecDeque::with_capacity(HISTORY_LIMIT),
        }
    }

    /// Recorded samples, oldest first.
    pub fn history(&self) -> &VecDeque<PricePoint> {
        &self.history
    }

    /// Set the current price and append it to the history, dropping the
    /// oldest sample once the history is full. Returns the stored price.
    pub fn record_price(&mut self, timestamp: DateTime<Utc>, price: f64) -> f64 {
        let price = floor_price(price, self.price);
        self.price = price;
        self.history.push_back(PricePoint::new(timestamp, price));
        while self.history.len() > HISTORY_LIMIT {
            self.history.pop_front();
        }
        price
    }

    /// Replace the history with restored samples, keeping the newest
    /// [`HISTORY_LIMIT`] in chronological order.
    pub fn restore_history(&mut self, mut samples: Vec<PricePoint>) {
        samples.retain(|p| p.value.is_finite() && p.value > 0.0);
        samples.sort_by_key(|p| p.timestamp);
        let skip = samples.len().saturating_sub(HISTORY_LIMIT);
        self.history = samples.into_iter().skip(skip).collect();
    }

    /// Percent change from the session open to the current price.
    pub fn change_since_session_start(&self) -> f64 {
        if self.session_open > 0.0 {
            (self.price - self.session_open) / self.session_open * 100.0
        } else {
            0.0
        }
    }

    /// Percent rate of change across the last `period` samples, if the
    /// history is long enough.
    pub fn rate_of_change(&self, period: usize) -> Option<f64> {
        if period == 0 || self.history.len() <= period {
            return None;
        }
        let last = self.history.back()?.value;
        let base = self.history[self.history.len() - 1 - period].value;
        if base > 0.0 {
            Some((last - base) / base * 100.0)
        } else {
            None
        }
    }

    /// Start a fresh session at `price` with an empty history.
    pub fn reset_to(&mut self, price: f64) {
        let price = floor_price(price, PRICE_FLOOR);
        self.price = price;
        self.session_open = price;
        self.history.clear();
    }
}

/// Floor at [`PRICE_FLOOR`]; a non-finite input falls back to `previous`.
pub fn floor_price(price: f64, previous: f64) -> f64 {
    if !price.is_finite() {
        return previous.max(PRICE_FLOOR);
    }
    price.max(PRICE_FLOOR)
}

fn clamp_volatility_scale(value: f64) -> f64 {
    if value.is_nan() {
        return VOLATILITY_SCALE_MIN;
    }
    value.clamp(VOLATILITY_SCALE_MIN, VOLATILITY_SCALE_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_stock() {
        let asset = Asset::stock("nova", "Nova Systems", Sector::Tech, 120.0, 6.0);
        assert_eq!(asset.symbol, "NOVA");
        assert_eq!(asset.sector, Some(Sector::Tech));
        assert_eq!(asset.session_open, 120.0);
        assert!(asset.history().is_empty());
    }

    #[test]
    fn test_volatility_scale_clamped() {
        let asset = Asset::crypto("MOON", "Moon", 1.0, 42.0);
        assert_eq!(asset.volatility, 10.0);
        let asset = Asset::crypto("DUST", "Dust", 1.0, 0.0);
        assert_eq!(asset.volatility, 1.0);
    }

    #[test]
    fn test_history_bound() {
        let mut asset = Asset::stock("NOVA", "Nova", Sector::Tech, 100.0, 5.0);
        let start = Utc::now();
        for i in 0..75 {
            asset.record_price(start + Duration::seconds(i), 100.0 + i as f64);
        }

        let history = asset.history();
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history.front().unwrap().value, 125.0);
        assert_eq!(history.back().unwrap().value, 174.0);
        assert!(history
            .iter()
            .zip(history.iter().skip(1))
            .all(|(a, b)| a.timestamp < b.timestamp));
    }

    #[test]
    fn test_record_price_floors() {
        let mut asset = Asset::stock("NOVA", "Nova", Sector::Tech, 100.0, 5.0);
        assert_eq!(asset.record_price(Utc::now(), -4.0), PRICE_FLOOR);
        assert_eq!(asset.record_price(Utc::now(), f64::NAN), PRICE_FLOOR);
        assert_eq!(asset.record_price(Utc::now(), 3.0), 3.0);
        assert_eq!(asset.record_price(Utc::now(), f64::INFINITY), 3.0);
    }

    #[test]
    fn test_change_since_session_start() {
        let mut asset = Asset::stock("NOVA", "Nova", Sector::Tech, 200.0, 5.0);
        asset.record_price(Utc::now(), 210.0);
        assert!((asset.change_since_session_start() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_rate_of_change() {
        let mut asset = Asset::stock("NOVA", "Nova", Sector::Tech, 100.0, 5.0);
        let start = Utc::now();
        for (i, price) in [100.0, 102.0, 104.0, 110.0].iter().enumerate() {
            asset.record_price(start + Duration::seconds(i as i64), *price);
        }
        assert!((asset.rate_of_change(3).unwrap() - 10.0).abs() < 1e-9);
        assert!(asset.rate_of_change(4).is_none());
        assert!(asset.rate_of_change(0).is_none());
    }

    #[test]
    fn test_restore_history_keeps_newest() {
        let mut asset = Asset::crypto("MOON", "Moon", 1.0, 5.0);
        let start = Utc::now();
        let mut samples: Vec<PricePoint> = (0..60)
            .map(|i| PricePoint::new(start + Duration::seconds(i), 1.0 + i as f64))
            .collect();
        samples.reverse();
        samples.push(PricePoint::new(start, -1.0));

        asset.restore_history(samples);
        assert_eq!(asset.history().len(), HISTORY_LIMIT);
        assert_eq!(asset.history().front().unwrap().value, 11.0);
        assert_eq!(asset.history().back().unwrap().value, 60.0);
    }

    #[test]
    fn test_reset_to() {
        let mut asset = Asset::stock("NOVA", "Nova", Sector::Tech, 100.0, 5.0);
        asset.record_price(Utc::now(), 150.0);
        asset.reset_to(100.0);
        assert_eq!(asset.price, 100.0);
        assert_eq!(asset.session_open, 100.0);
        assert!(asset.history().is_empty());
    }
}
