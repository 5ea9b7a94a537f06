use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query};
use axum::routing::get;
use axum::{Router, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::auth::{self, LecturerId};
use crate::error::AppError;
use crate::services::{InsightsService, ReviewService};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/lecturer/applications/{id}/review",
            get(get_own_review).post(submit_review),
        )
        .route("/applications/visual-insights", get(visual_insights))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitReviewBody {
    lecturer_id: Option<LecturerId>,
    rank: Option<i64>,
    comment: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LecturerQuery {
    lecturer_id: Option<String>,
}

/// First non-empty lecturer identifier wins: request body, then query
/// string.
fn raw_lecturer_id(body: Option<LecturerId>, query: LecturerQuery) -> Option<String> {
    body.map(LecturerId::into_raw)
        .filter(|s| !s.trim().is_empty())
        .or(query.lecturer_id)
}

async fn submit_review(
    State(state): State<AppState>,
    Path(application_id): Path<i64>,
    Query(query): Query<LecturerQuery>,
    body: Result<Json<SubmitReviewBody>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    // A request without a JSON body is an empty submission (the lecturer id
    // may arrive via the query string); a body that fails to parse is the
    // caller's mistake and maps to 400.
    let body = match body {
        Ok(Json(body)) => body,
        Err(JsonRejection::MissingJsonContentType(_)) => SubmitReviewBody::default(),
        Err(rejection) => return Err(AppError::InvalidInput(rejection.body_text())),
    };

    let raw = raw_lecturer_id(body.lecturer_id, query);
    let lecturer = auth::resolve_lecturer(&state.db, raw).await?;

    let service = ReviewService::new(state.db.clone());
    let details = service
        .submit(
            &lecturer,
            application_id,
            crate::models::SubmitReview {
                rank: body.rank,
                comment: body.comment,
            },
        )
        .await?;

    Ok(Json(json!({
        "message": "Review saved",
        "review": details,
    })))
}

async fn get_own_review(
    State(state): State<AppState>,
    Path(application_id): Path<i64>,
    Query(query): Query<LecturerQuery>,
) -> Result<Json<crate::models::Review>, AppError> {
    let lecturer = auth::resolve_lecturer(&state.db, query.lecturer_id).await?;

    let service = ReviewService::new(state.db.clone());
    let review = service
        .own_review(&lecturer, application_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(review))
}

async fn visual_insights(
    State(state): State<AppState>,
) -> Result<Json<crate::models::InsightsReport>, AppError> {
    let report = InsightsService::new(state.db.clone()).compute().await?;
    Ok(Json(report))
}
