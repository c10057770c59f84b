use std::collections::BTreeMap;

use super::*;
use crate::aggregate::WATER_CATEGORIES;

fn breakdown(categories: &[(&str, f64)]) -> Breakdown {
    let categories: BTreeMap<String, f64> = categories.iter().map(|(k, v)| ((*k).to_owned(), *v)).collect();
    let water_m2 = WATER_CATEGORIES
        .iter()
        .filter_map(|c| categories.get(*c))
        .sum();
    Breakdown {
        total_intersection_m2: categories.values().sum(),
        water_m2,
        categories,
        selection_area_m2: 100.0,
        selection_perimeter_m: 40.0,
        features_considered: 0,
        features_skipped: 0,
    }
}

#[test]
fn empty_breakdown_is_low_risk() {
    let flags = assess(&breakdown(&[]));
    assert_eq!(flags.len(), 1);
    assert_eq!(flags[0].kind, "Environmental Risk");
    assert_eq!(flags[0].level, RiskLevel::Low);
}

#[test]
fn water_over_fifteen_percent_is_high_flood_risk() {
    let flags = assess(&breakdown(&[("lake", 20.0)]));
    assert_eq!(flags[0].kind, "Flood Risk");
    assert_eq!(flags[0].level, RiskLevel::High);
}

#[test]
fn water_between_five_and_fifteen_is_medium() {
    let flags = assess(&breakdown(&[("river", 4.0), ("water", 4.0)]));
    assert_eq!(flags[0].level, RiskLevel::Medium);
    assert!(flags[0].reason.contains("8%"));
}

#[test]
fn exactly_five_percent_water_is_not_flagged() {
    let flags = assess(&breakdown(&[("water", 5.0)]));
    assert_eq!(flags[0].kind, "Environmental Risk");
}

#[test]
fn urban_majority_is_development_pressure() {
    let flags = assess(&breakdown(&[("residential", 30.0), ("commercial", 15.0)]));
    assert_eq!(flags.len(), 1);
    assert_eq!(flags[0].kind, "Development Pressure");
    assert_eq!(flags[0].level, RiskLevel::Medium);
}

#[test]
fn flood_and_development_can_both_trip() {
    let flags = assess(&breakdown(&[("lake", 30.0), ("industrial", 50.0)]));
    let kinds: Vec<_> = flags.iter().map(|f| f.kind.as_str()).collect();
    assert_eq!(kinds, vec!["Flood Risk", "Development Pressure"]);
}

#[test]
fn risk_level_serializes_uppercase() {
    assert_eq!(serde_json::to_string(&RiskLevel::High).unwrap(), "\"HIGH\"");
}
