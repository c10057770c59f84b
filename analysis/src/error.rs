//! Error taxonomy for the selection analysis pipeline.
//!
//! DESIGN
//! ======
//! Three failure scopes, each with its own enum:
//! - `GeometryError` aborts a run before it starts (the shape cannot be analyzed).
//! - `FetchError` fails only the landcover enrichment; metrics still ship.
//! - `IntersectionError` is per reference feature and never leaves aggregation.
//!
//! Every error carries a grepable `E_*` code and a retryable flag via
//! [`ErrorCode`], so hosts can render them without matching on variants.

use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR CODES
// =============================================================================

/// Grepable error code plus retry hint, shared by every pipeline error.
pub trait ErrorCode {
    /// Stable `E_*` identifier for logs and API payloads.
    fn error_code(&self) -> &'static str;

    /// Whether re-running the same analysis could plausibly succeed.
    fn retryable(&self) -> bool {
        false
    }
}

/// Serializable snapshot of an error for display collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: String,
    pub message: String,
    pub retryable: bool,
}

impl ErrorReport {
    #[must_use]
    pub fn from_error<E>(err: &E) -> Self
    where
        E: ErrorCode + std::fmt::Display,
    {
        Self { code: err.error_code().to_owned(), message: err.to_string(), retryable: err.retryable() }
    }
}

// =============================================================================
// GEOMETRY
// =============================================================================

/// The selection shape cannot be analyzed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("cannot analyze this shape: need at least 3 distinct vertices, got {distinct}")]
    TooFewVertices { distinct: usize },

    #[error("cannot analyze this shape: vertex {index} has non-finite coordinates")]
    NonFinite { index: usize },

    #[error("cannot analyze this shape: vertex {index} out of range (lon {lon}, lat {lat})")]
    OutOfRange { index: usize, lon: f64, lat: f64 },

    #[error("cannot analyze this shape: unsupported GeoJSON input ({0})")]
    Unsupported(String),

    #[error("cannot analyze this shape: invalid GeoJSON ({0})")]
    GeoJson(String),
}

impl ErrorCode for GeometryError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::TooFewVertices { .. } => "E_TOO_FEW_VERTICES",
            Self::NonFinite { .. } => "E_NON_FINITE_COORDINATE",
            Self::OutOfRange { .. } => "E_COORDINATE_OUT_OF_RANGE",
            Self::Unsupported(_) => "E_UNSUPPORTED_GEOMETRY",
            Self::GeoJson(_) => "E_GEOJSON_PARSE",
        }
    }
}

// =============================================================================
// FEATURE FETCH
// =============================================================================

/// The geodata query service could not supply reference features.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, connect, timeout, body read).
    #[error("geodata request failed: {0}")]
    Request(String),

    /// The service answered with a non-success status.
    #[error("geodata service returned status {status}")]
    Status { status: u16, body: String },

    /// The response body was not the expected JSON document.
    #[error("geodata response parse failed: {0}")]
    Parse(String),

    /// The query ran but the server aborted it (`remark: "runtime error: ..."`).
    #[error("geodata query failed on the server: {0}")]
    Remark(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ErrorCode for FetchError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Request(_) => "E_FEATURE_REQUEST",
            Self::Status { .. } => "E_FEATURE_STATUS",
            Self::Parse(_) => "E_FEATURE_PARSE",
            Self::Remark(_) => "E_FEATURE_QUERY_FAILED",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Remark(_) | Self::Status { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// INTERSECTION
// =============================================================================

/// A single reference feature could not be intersected with the selection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntersectionError {
    #[error("feature {id} is malformed: {reason}")]
    Malformed { id: String, reason: String },

    #[error("boolean intersection failed for feature {id}")]
    BooleanOp { id: String },
}

impl ErrorCode for IntersectionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Malformed { .. } => "E_FEATURE_MALFORMED",
            Self::BooleanOp { .. } => "E_INTERSECTION_FAILED",
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
