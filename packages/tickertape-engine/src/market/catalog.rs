//! Built-in asset universe. All names are fictional.

use super::asset::Asset;
use super::sector::Sector;
use std::sync::LazyLock;

/// Stocks: (symbol, name, sector, opening price, volatility scale)
const STOCKS: [(&str, &str, Sector, f64, f64); 12] = [
    ("NOVA", "Nova Systems", Sector::Tech, 184.20, 7.0),
    ("BYTE", "Bytewise Labs", Sector::Tech, 62.75, 8.0),
    ("LDGR", "Ledger Trust", Sector::Finance, 48.10, 4.0),
    ("CRWN", "Crown Capital", Sector::Finance, 121.40, 5.0),
    ("HLIX", "Helix Therapeutics", Sector::Healthcare, 93.60, 6.0),
    ("CARE", "CarePoint Health", Sector::Healthcare, 57.30, 3.0),
    ("BSKT", "Basket Foods", Sector::Consumer, 34.85, 2.0),
    ("TRND", "Trendline Apparel", Sector::Consumer, 72.15, 5.0),
    ("FLUX", "Flux Energy", Sector::Energy, 66.90, 6.0),
    ("GRID", "Gridline Power", Sector::Energy, 41.25, 4.0),
    ("KEYS", "Keystone Realty", Sector::RealEstate, 28.40, 3.0),
    ("TOWR", "Tower Residential", Sector::RealEstate, 54.70, 2.0),
];

/// Crypto: (symbol, name, opening price, volatility scale)
const CRYPTO: [(&str, &str, f64, f64); 6] = [
    ("BTX", "Bitex", 43_250.0, 5.0),
    ("ETHR", "Etherion", 2_310.0, 6.0),
    ("SOLR", "Solaris", 98.40, 8.0),
    ("DOGO", "Dogocoin", 0.084, 10.0),
    ("LNKS", "Linkstone", 14.70, 7.0),
    ("STBL", "Stablecore", 1.0, 1.0),
];

/// The catalog at its opening prices.
pub static CATALOG: LazyLock<Vec<Asset>> = LazyLock::new(|| {
    let stocks = STOCKS
        .iter()
        .map(|(symbol, name, sector, price, vol)| Asset::stock(symbol, name, *sector, *price, *vol));
    let crypto = CRYPTO
        .iter()
        .map(|(symbol, name, price, vol)| Asset::crypto(symbol, name, *price, *vol));
    stocks.chain(crypto).collect()
});

/// Fresh copies of every catalog asset.
pub fn catalog_assets() -> Vec<Asset> {
    CATALOG.clone()
}

/// Opening price of a catalog symbol.
pub fn catalog_price(symbol: &str) -> Option<f64> {
    let symbol = symbol.to_uppercase();
    CATALOG.iter().find(|a| a.symbol == symbol).map(|a| a.price)
}
