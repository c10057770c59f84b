//! Selection analysis for drawn map areas.
//!
//! A user-drawn polygon becomes a validated [`Geometry`]; the pipeline computes
//! its geodesic area and perimeter, fetches landcover reference polygons in its
//! bounding box from a [`FeatureSource`], intersects each one with the
//! selection, and aggregates the areas into a per-category [`Breakdown`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`geometry`] | Ring validation, auto-closing, GeoJSON intake |
//! | [`metrics`] | Geodesic area and perimeter |
//! | [`features`] | Reference features and the [`FeatureSource`] seam |
//! | [`overpass`] | Overpass API client and response parsing |
//! | [`aggregate`] | Per-feature intersection and category totals |
//! | [`risk`] | Flood and development flags from the breakdown |
//! | [`session`] | Active selection, run tokens, phase machine |
//! | [`pipeline`] | End-to-end runs, with or without a session |
//! | [`config`] | Environment configuration |
//! | [`error`] | Error enums and `E_*` codes |

pub mod aggregate;
pub mod config;
pub mod error;
pub mod features;
pub mod geometry;
pub mod metrics;
pub mod overpass;
pub mod pipeline;
pub mod risk;
pub mod session;

pub use aggregate::{Breakdown, CategoryShare};
pub use config::{ConfigError, OverpassConfig};
pub use error::{ErrorCode, ErrorReport, FetchError, GeometryError, IntersectionError};
pub use features::{FeatureSource, ReferenceFeature};
pub use geometry::{BoundingBox, Geometry};
pub use metrics::SelectionMetrics;
pub use overpass::OverpassClient;
pub use pipeline::{AnalysisReport, Landcover, RunOutcome, analyze, run_analysis};
pub use risk::{RiskFlag, RiskLevel};
pub use session::{AnalysisPhase, AnalysisSession, SelectionId, SelectionOrigin};
