//! Analysis session: the single active selection and its latest result.
//!
//! DESIGN
//! ======
//! The hosting layer owns one `AnalysisSession` and hands it to the pipeline
//! by reference. Every `begin` issues a fresh `RunToken`; a run may only move
//! the state machine or publish while its token is still the current one.
//! `clear` also bumps the token, so a run in flight at reset time is dropped.
//!
//! Phases advance strictly:
//! `Idle → MetricsComputed → FetchingFeatures → {FeaturesAggregated | FetchFailed} → Done`.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::Geometry;
use crate::pipeline::AnalysisReport;

// =============================================================================
// IDENTIFIERS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionId(pub Uuid);

impl SelectionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SelectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SelectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Monotonic run identifier. Only the newest token may publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunToken(u64);

impl RunToken {
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RunToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// How the active selection came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionOrigin {
    #[default]
    Drawn,
    Edited,
}

// =============================================================================
// PHASE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisPhase {
    #[default]
    Idle,
    MetricsComputed,
    FetchingFeatures,
    FeaturesAggregated,
    FetchFailed,
    Done,
}

impl AnalysisPhase {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::MetricsComputed => "metrics_computed",
            Self::FetchingFeatures => "fetching_features",
            Self::FeaturesAggregated => "features_aggregated",
            Self::FetchFailed => "fetch_failed",
            Self::Done => "done",
        }
    }

    /// Whether `next` directly follows `self`.
    #[must_use]
    pub fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::MetricsComputed)
                | (Self::MetricsComputed, Self::FetchingFeatures)
                | (Self::FetchingFeatures, Self::FeaturesAggregated | Self::FetchFailed)
                | (Self::FeaturesAggregated | Self::FetchFailed, Self::Done)
        )
    }
}

impl fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// The active selection: identity, origin, and validated geometry.
#[derive(Debug, Clone)]
pub struct Selection {
    pub id: SelectionId,
    pub origin: SelectionOrigin,
    pub geometry: Geometry,
}

/// Handle for one run, returned by [`AnalysisSession::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTicket {
    pub token: RunToken,
    pub selection_id: SelectionId,
}

/// Result of offering a finished report to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publish {
    Applied,
    Discarded,
}

#[derive(Debug, Default)]
pub struct AnalysisSession {
    selection: Option<Selection>,
    phase: AnalysisPhase,
    issued: u64,
    latest: Option<AnalysisReport>,
}

impl AnalysisSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active selection and start a new run.
    pub fn begin(&mut self, geometry: Geometry, origin: SelectionOrigin) -> RunTicket {
        let token = self.next_token();
        let id = SelectionId::new();
        if let Some(previous) = &self.selection {
            tracing::debug!(previous = %previous.id, selection_id = %id, "selection replaced");
        }
        self.selection = Some(Selection { id, origin, geometry });
        self.phase = AnalysisPhase::Idle;
        self.latest = None;
        RunTicket { token, selection_id: id }
    }

    /// Move the state machine on behalf of `token`. Returns false if the run
    /// is stale or the transition is not allowed.
    pub fn advance(&mut self, token: RunToken, next: AnalysisPhase) -> bool {
        if !self.is_current(token) {
            tracing::debug!(%token, phase = %next, "stale run tried to advance");
            return false;
        }
        if !self.phase.can_advance_to(next) {
            tracing::warn!(%token, from = %self.phase, to = %next, "illegal phase transition ignored");
            return false;
        }
        self.phase = next;
        true
    }

    /// Publish `report` as the latest result if `token` is still current.
    pub fn publish(&mut self, token: RunToken, report: AnalysisReport) -> Publish {
        if !self.is_current(token) {
            tracing::info!(
                %token,
                current = self.issued,
                selection_id = %report.selection_id,
                "stale analysis result discarded"
            );
            return Publish::Discarded;
        }
        if !self.advance(token, AnalysisPhase::Done) {
            tracing::warn!(%token, phase = %self.phase, "publishing from unexpected phase");
            self.phase = AnalysisPhase::Done;
        }
        self.latest = Some(report);
        Publish::Applied
    }

    /// Drop the selection and result; any in-flight run becomes stale.
    pub fn clear(&mut self) {
        let token = self.next_token();
        self.selection = None;
        self.latest = None;
        self.phase = AnalysisPhase::Idle;
        tracing::debug!(%token, "session cleared");
    }

    #[must_use]
    pub fn is_current(&self, token: RunToken) -> bool {
        token.0 == self.issued
    }

    #[must_use]
    pub fn phase(&self) -> AnalysisPhase {
        self.phase
    }

    #[must_use]
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&AnalysisReport> {
        self.latest.as_ref()
    }

    fn next_token(&mut self) -> RunToken {
        self.issued += 1;
        RunToken(self.issued)
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
