use axum::{extract::State, http::StatusCode};

use trackwise_core::health::readiness;

use crate::state::AppState;

pub use trackwise_core::health::healthz;

/// `GET /readyz`: 200 once the database answers a ping.
pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    readiness(state.db.ping().await)
}
