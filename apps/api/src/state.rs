use std::sync::Arc;

use crate::pipeline::orchestrator::Orchestrator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The single run state machine; owns the uploaded assets and enforces
    /// at-most-one in-flight pipeline.
    pub orchestrator: Arc<Orchestrator>,
}
