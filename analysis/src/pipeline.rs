//! Selection analysis pipeline: metrics, feature fetch, aggregation, report.
//!
//! DESIGN
//! ======
//! Metrics are computed synchronously and always ship. The feature fetch is
//! the only await point; a fetch failure turns the landcover section into a
//! recoverable error instead of failing the run.
//!
//! `run_analysis` threads a run through an `AnalysisSession` behind a
//! `std::sync::Mutex`. The lock is taken to begin the run, released for the
//! fetch, and taken again to publish. Never held across `.await`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::aggregate::{Breakdown, CategoryShare, aggregate};
use crate::error::{ErrorCode, ErrorReport, FetchError};
use crate::features::{FeatureSource, ReferenceFeature};
use crate::geometry::Geometry;
use crate::metrics::{SelectionMetrics, compute_metrics};
use crate::risk::{RiskFlag, assess};
use crate::session::{AnalysisPhase, AnalysisSession, Publish, RunToken, SelectionId, SelectionOrigin};

// =============================================================================
// REPORT
// =============================================================================

/// Everything the display needs for one analyzed selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub selection_id: SelectionId,
    pub origin: SelectionOrigin,
    /// The input ring had to be closed before analysis.
    pub auto_closed: bool,
    pub metrics: SelectionMetrics,
    pub landcover: Landcover,
}

/// Landcover section of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Landcover {
    Aggregated { breakdown: Breakdown, shares: Vec<CategoryShare>, risks: Vec<RiskFlag> },
    FetchFailed { error: ErrorReport },
}

impl AnalysisReport {
    #[must_use]
    pub fn breakdown(&self) -> Option<&Breakdown> {
        match &self.landcover {
            Landcover::Aggregated { breakdown, .. } => Some(breakdown),
            Landcover::FetchFailed { .. } => None,
        }
    }

    #[must_use]
    pub fn fetch_error(&self) -> Option<&ErrorReport> {
        match &self.landcover {
            Landcover::Aggregated { .. } => None,
            Landcover::FetchFailed { error } => Some(error),
        }
    }
}

/// Outcome of a session-bound run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The run was still current and its report is now the session's latest.
    Current(Box<AnalysisReport>),
    /// A newer selection or a reset invalidated the run; its result was dropped.
    Superseded { token: RunToken },
}

// =============================================================================
// ENTRY POINTS
// =============================================================================

/// Analyze one geometry without a session.
pub async fn analyze(source: &dyn FeatureSource, geometry: &Geometry) -> AnalysisReport {
    let metrics = compute_metrics(geometry);
    let fetched = source.fetch_features(metrics.bbox).await;
    build_report(SelectionId::new(), SelectionOrigin::Drawn, geometry, metrics, fetched)
}

/// Make `geometry` the session's active selection and analyze it.
///
/// Only the newest run publishes; older runs finishing later come back as
/// [`RunOutcome::Superseded`].
pub async fn run_analysis(
    session: &Mutex<AnalysisSession>,
    source: &dyn FeatureSource,
    geometry: Geometry,
    origin: SelectionOrigin,
) -> RunOutcome {
    let metrics = compute_metrics(&geometry);

    let ticket = {
        let mut guard = lock(session);
        let ticket = guard.begin(geometry.clone(), origin);
        guard.advance(ticket.token, AnalysisPhase::MetricsComputed);
        guard.advance(ticket.token, AnalysisPhase::FetchingFeatures);
        ticket
    };
    tracing::info!(
        selection_id = %ticket.selection_id,
        token = %ticket.token,
        area_m2 = metrics.area_m2_rounded(),
        perimeter_m = metrics.perimeter_m_rounded(),
        vertices = metrics.vertex_count,
        "analysis started"
    );

    let fetched = source.fetch_features(metrics.bbox).await;

    if !lock(session).is_current(ticket.token) {
        tracing::info!(selection_id = %ticket.selection_id, token = %ticket.token, "run superseded during fetch");
        return RunOutcome::Superseded { token: ticket.token };
    }

    let report = build_report(ticket.selection_id, origin, &geometry, metrics, fetched);
    let phase = match report.landcover {
        Landcover::Aggregated { .. } => AnalysisPhase::FeaturesAggregated,
        Landcover::FetchFailed { .. } => AnalysisPhase::FetchFailed,
    };

    // Clone outside the lock; the session keeps its own copy.
    let published = report.clone();
    let applied = {
        let mut guard = lock(session);
        guard.advance(ticket.token, phase);
        guard.publish(ticket.token, published)
    };
    match applied {
        Publish::Applied => RunOutcome::Current(Box::new(report)),
        Publish::Discarded => RunOutcome::Superseded { token: ticket.token },
    }
}

fn build_report(
    selection_id: SelectionId,
    origin: SelectionOrigin,
    geometry: &Geometry,
    metrics: SelectionMetrics,
    fetched: Result<Vec<ReferenceFeature>, FetchError>,
) -> AnalysisReport {
    let landcover = match fetched {
        Ok(features) => {
            let breakdown = aggregate(geometry, &metrics, &features);
            let shares = breakdown.shares();
            let risks = assess(&breakdown);
            tracing::info!(
                %selection_id,
                categories = breakdown.categories.len(),
                skipped = breakdown.features_skipped,
                water_pct = breakdown.water_percentage(),
                "landcover breakdown ready"
            );
            Landcover::Aggregated { breakdown, shares, risks }
        }
        Err(e) => {
            tracing::warn!(%selection_id, code = e.error_code(), error = %e, "feature fetch failed; metrics only");
            Landcover::FetchFailed { error: ErrorReport::from_error(&e) }
        }
    };

    AnalysisReport { selection_id, origin, auto_closed: geometry.auto_closed(), metrics, landcover }
}

/// Session state stays consistent across a panicked holder, so poisoning is ignored.
fn lock(session: &Mutex<AnalysisSession>) -> MutexGuard<'_, AnalysisSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
