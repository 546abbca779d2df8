//! Readiness endpoint

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use axum_helpers::{run_health_checks, HealthCheckFuture};
use database::postgres::{check_health, DatabaseConnection};
use serde_json::Value;

async fn ready(State(db): State<DatabaseConnection>) -> (StatusCode, Json<Value>) {
    let postgres: HealthCheckFuture = Box::pin(async move {
        check_health(&db).await.map_err(|e| e.to_string())
    });
    run_health_checks(vec![("postgres", postgres)]).await
}

/// `/ready`: 200 while Postgres answers, 503 otherwise
pub fn router(db: DatabaseConnection) -> Router {
    Router::new().route("/ready", get(ready)).with_state(db)
}
