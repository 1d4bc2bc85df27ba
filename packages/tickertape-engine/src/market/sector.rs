//! Stock sectors and the phase × sector drift table.

use crate::types::CyclePhase;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stock market sector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Sector {
    Tech,
    Finance,
    Healthcare,
    Consumer,
    Energy,
    #[serde(rename = "Real Estate")]
    RealEstate,
}

impl Sector {
    /// Sectors in table column order.
    pub const ALL: [Sector; 6] = [
        Sector::Tech,
        Sector::Finance,
        Sector::Healthcare,
        Sector::Consumer,
        Sector::Energy,
        Sector::RealEstate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sector::Tech => "Tech",
            Sector::Finance => "Finance",
            Sector::Healthcare => "Healthcare",
            Sector::Consumer => "Consumer",
            Sector::Energy => "Energy",
            Sector::RealEstate => "Real Estate",
        }
    }

    fn column(&self) -> usize {
        match self {
            Sector::Tech => 0,
            Sector::Finance => 1,
            Sector::Healthcare => 2,
            Sector::Consumer => 3,
            Sector::Energy => 4,
            Sector::RealEstate => 5,
        }
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "tech" => Ok(Sector::Tech),
            "finance" => Ok(Sector::Finance),
            "healthcare" => Ok(Sector::Healthcare),
            "consumer" => Ok(Sector::Consumer),
            "energy" => Ok(Sector::Energy),
            "realestate" => Ok(Sector::RealEstate),
            _ => Err(format!("unknown sector: {}", s)),
        }
    }
}

/// Additive per-tick drift, rows in phase order, columns in sector order.
pub const SECTOR_MULTIPLIERS: [[f64; 6]; 4] = [
    // accumulation
    [0.02, 0.01, 0.0, 0.01, 0.0, -0.005],
    // markup
    [0.01, 0.01, 0.0, 0.01, 0.01, 0.005],
    // distribution
    [-0.01, 0.02, 0.0, -0.01, 0.02, 0.01],
    // markdown
    [-0.02, -0.03, 0.02, -0.02, -0.01, -0.015],
];

fn row(phase: CyclePhase) -> usize {
    match phase {
        CyclePhase::Accumulation => 0,
        CyclePhase::Markup => 1,
        CyclePhase::Distribution => 2,
        CyclePhase::Markdown => 3,
    }
}

/// Drift bonus for a sector under a phase.
pub fn sector_multiplier(phase: CyclePhase, sector: Sector) -> f64 {
    SECTOR_MULTIPLIERS[row(phase)][sector.column()]
}

/// Lookup by sector name; unknown names contribute nothing.
pub fn sector_multiplier_by_name(phase: CyclePhase, sector: &str) -> f64 {
    sector
        .parse::<Sector>()
        .map(|s| sector_multiplier(phase, s))
        .unwrap_or(0.0)
}
