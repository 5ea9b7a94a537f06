use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{Application, UserSummary};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    pub lecturer_id: i64,
    pub application_id: i64,
    pub rank: Option<i64>,
    pub comment: Option<String>,
    pub reviewed_at: String,
    pub updated_at: String,
}

/// A saved review with its lecturer and application attached, as returned
/// by the submission endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDetails {
    #[serde(flatten)]
    pub review: Review,
    pub lecturer: UserSummary,
    pub application: Application,
}

/// Fields a lecturer may supply when submitting a review. Omitted fields
/// are left unchanged on resubmission.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReview {
    pub rank: Option<i64>,
    pub comment: Option<String>,
}
