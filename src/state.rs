//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the one analysis session the service drives and the feature source
//! runs fetch from. The session sits behind a `std::sync::Mutex`; the
//! pipeline only locks it between awaits.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use analysis::{AnalysisSession, FeatureSource};

/// Shared application state, injected into Axum handlers via State extractor.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<AnalysisSession>>,
    pub source: Arc<dyn FeatureSource>,
}

impl AppState {
    #[must_use]
    pub fn new(source: Arc<dyn FeatureSource>) -> Self {
        Self { session: Arc::new(Mutex::new(AnalysisSession::new())), source }
    }

    /// Lock the session, recovering from a poisoned mutex.
    pub fn session(&self) -> MutexGuard<'_, AnalysisSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
pub mod test_helpers {
    use std::time::Duration;

    use analysis::geometry::BoundingBox;
    use analysis::{FetchError, ReferenceFeature};

    use super::*;

    /// Feature source with a canned reply and an optional delay.
    pub struct MockSource {
        pub features: Vec<ReferenceFeature>,
        pub fail_status: Option<u16>,
        pub delay: Option<Duration>,
    }

    #[async_trait::async_trait]
    impl FeatureSource for MockSource {
        async fn fetch_features(&self, _bbox: BoundingBox) -> Result<Vec<ReferenceFeature>, FetchError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match self.fail_status {
                Some(status) => Err(FetchError::Status { status, body: "mock".into() }),
                None => Ok(self.features.clone()),
            }
        }
    }

    /// App state whose source answers with no features.
    #[must_use]
    pub fn test_app_state() -> AppState {
        test_app_state_with(MockSource { features: Vec::new(), fail_status: None, delay: None })
    }

    #[must_use]
    pub fn test_app_state_with(source: MockSource) -> AppState {
        AppState::new(Arc::new(source))
    }

    /// GeoJSON Polygon body for a 0.001° square at (`lon`, `lat`).
    #[must_use]
    pub fn square_geojson(lon: f64, lat: f64) -> String {
        serde_json::json!({
            "type": "Polygon",
            "coordinates": [[
                [lon, lat], [lon, lat + 0.001], [lon + 0.001, lat + 0.001], [lon + 0.001, lat], [lon, lat]
            ]]
        })
        .to_string()
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
