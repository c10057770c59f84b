//! Landcover-derived risk flags for the analysis panel.

use serde::{Deserialize, Serialize};

use crate::aggregate::Breakdown;

const FLOOD_HIGH_WATER_PCT: f64 = 15.0;
const FLOOD_MEDIUM_WATER_PCT: f64 = 5.0;
const DEVELOPMENT_URBAN_PCT: f64 = 40.0;

/// Landuse labels counted as built-up area.
pub const URBAN_CATEGORIES: [&str; 6] = ["residential", "commercial", "industrial", "retail", "construction", "urban"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFlag {
    pub kind: String,
    pub level: RiskLevel,
    pub reason: String,
}

impl RiskFlag {
    fn new(kind: &str, level: RiskLevel, reason: impl Into<String>) -> Self {
        Self { kind: kind.to_owned(), level, reason: reason.into() }
    }
}

/// Evaluate flood and development flags; a single LOW flag when nothing trips.
#[must_use]
pub fn assess(breakdown: &Breakdown) -> Vec<RiskFlag> {
    let mut flags = Vec::new();

    let water_pct = breakdown.water_percentage();
    if water_pct > FLOOD_HIGH_WATER_PCT {
        flags.push(RiskFlag::new("Flood Risk", RiskLevel::High, format!("High water coverage ({water_pct}%)")));
    } else if water_pct > FLOOD_MEDIUM_WATER_PCT {
        flags.push(RiskFlag::new("Flood Risk", RiskLevel::Medium, format!("Moderate water presence ({water_pct}%)")));
    }

    let urban_pct = breakdown.percentage_of(breakdown.area_of(&URBAN_CATEGORIES));
    if urban_pct > DEVELOPMENT_URBAN_PCT {
        flags.push(RiskFlag::new(
            "Development Pressure",
            RiskLevel::Medium,
            format!("High urban density ({urban_pct}%)"),
        ));
    }

    if flags.is_empty() {
        flags.push(RiskFlag::new("Environmental Risk", RiskLevel::Low, "No significant risks detected"));
    }
    flags
}

#[cfg(test)]
#[path = "risk_test.rs"]
mod tests;
