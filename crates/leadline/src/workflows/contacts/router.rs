use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::domain::{AdvisorId, ContactDraft, ContactId, NewAdvisor};
use super::repository::{ContactStore, StoreError};
use super::service::{ContactDeskService, ContactServiceError};
use crate::workflows::distribution::DistributionError;

/// Router builder exposing scoring, intake, analysis, and distribution endpoints.
pub fn contact_router<S>(service: Arc<ContactDeskService<S>>) -> Router
where
    S: ContactStore + ?Sized + 'static,
{
    Router::new()
        .route("/api/v1/contacts", post(register_handler::<S>))
        .route("/api/v1/contacts/score", post(score_handler::<S>))
        .route(
            "/api/v1/contacts/:contact_id/analysis",
            get(analysis_handler::<S>),
        )
        .route(
            "/api/v1/contacts/bulk-analyze",
            post(bulk_analyze_handler::<S>),
        )
        .route("/api/v1/advisors", post(register_advisor_handler::<S>))
        .route(
            "/api/v1/advisors/:advisor_id/workload",
            get(workload_handler::<S>),
        )
        .route("/api/v1/distribution", post(distribution_handler::<S>))
        .route("/api/v1/stats", get(stats_handler::<S>))
        .route(
            "/api/v1/suggest-improvements",
            post(improvements_handler::<S>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BulkAnalyzeRequest {
    pub contact_ids: Vec<ContactId>,
}

pub(crate) async fn score_handler<S>(
    State(service): State<Arc<ContactDeskService<S>>>,
    axum::Json(draft): axum::Json<ContactDraft>,
) -> Response
where
    S: ContactStore + ?Sized + 'static,
{
    let analysis = service.score_contact(&draft).await;
    (StatusCode::OK, axum::Json(analysis)).into_response()
}

pub(crate) async fn register_handler<S>(
    State(service): State<Arc<ContactDeskService<S>>>,
    axum::Json(draft): axum::Json<ContactDraft>,
) -> Response
where
    S: ContactStore + ?Sized + 'static,
{
    match service.register_contact(draft).await {
        Ok(registered) => (StatusCode::CREATED, axum::Json(registered)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn analysis_handler<S>(
    State(service): State<Arc<ContactDeskService<S>>>,
    Path(contact_id): Path<i64>,
) -> Response
where
    S: ContactStore + ?Sized + 'static,
{
    match service.analyze_contact(ContactId(contact_id)).await {
        Ok(analysis) => (StatusCode::OK, axum::Json(analysis)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn bulk_analyze_handler<S>(
    State(service): State<Arc<ContactDeskService<S>>>,
    axum::Json(request): axum::Json<BulkAnalyzeRequest>,
) -> Response
where
    S: ContactStore + ?Sized + 'static,
{
    match service.bulk_analyze(&request.contact_ids).await {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn register_advisor_handler<S>(
    State(service): State<Arc<ContactDeskService<S>>>,
    axum::Json(advisor): axum::Json<NewAdvisor>,
) -> Response
where
    S: ContactStore + ?Sized + 'static,
{
    match service.register_advisor(advisor) {
        Ok(advisor) => (StatusCode::CREATED, axum::Json(advisor)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn workload_handler<S>(
    State(service): State<Arc<ContactDeskService<S>>>,
    Path(advisor_id): Path<i64>,
) -> Response
where
    S: ContactStore + ?Sized + 'static,
{
    match service.advisor_workload(AdvisorId(advisor_id)) {
        Ok(workload) => (StatusCode::OK, axum::Json(workload)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn distribution_handler<S>(
    State(service): State<Arc<ContactDeskService<S>>>,
) -> Response
where
    S: ContactStore + ?Sized + 'static,
{
    // Planning reads and writes the store synchronously; keep it off the async workers.
    let outcome = tokio::task::spawn_blocking(move || service.distribute_contacts()).await;
    match outcome {
        Ok(Ok(report)) => (StatusCode::OK, axum::Json(report)).into_response(),
        Ok(Err(error)) => error_response(error),
        Err(join_error) => {
            error!(error = %join_error, "distribution task did not complete");
            let payload = json!({ "error": "distribution task did not complete" });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn stats_handler<S>(State(service): State<Arc<ContactDeskService<S>>>) -> Response
where
    S: ContactStore + ?Sized + 'static,
{
    match service.database_health() {
        Ok(health) => (StatusCode::OK, axum::Json(health)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn improvements_handler<S>(
    State(service): State<Arc<ContactDeskService<S>>>,
) -> Response
where
    S: ContactStore + ?Sized + 'static,
{
    match service.suggest_improvements() {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: ContactServiceError) -> Response {
    let status = match &error {
        ContactServiceError::Intake(_) => StatusCode::BAD_REQUEST,
        ContactServiceError::Store(
            StoreError::ContactNotFound(_) | StoreError::AdvisorNotFound(_),
        ) => StatusCode::NOT_FOUND,
        ContactServiceError::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
        ContactServiceError::Distribution(DistributionError::Planning(_)) => {
            StatusCode::BAD_REQUEST
        }
        ContactServiceError::Store(_) | ContactServiceError::Distribution(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
