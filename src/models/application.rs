use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum PositionType {
    Tutor,
    LabAssistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Availability {
    #[serde(rename = "Full-Time")]
    #[sqlx(rename = "Full-Time")]
    FullTime,
    #[serde(rename = "Part-Time")]
    #[sqlx(rename = "Part-Time")]
    PartTime,
    #[serde(rename = "Not Available")]
    #[sqlx(rename = "Not Available")]
    NotAvailable,
}

/// One candidacy for a (course, position type) pair. The pair
/// (course_id, position_type) is the scope within which a lecturer's
/// ranks must stay unique.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: i64,
    pub candidate_id: i64,
    pub course_id: i64,
    pub position_type: PositionType,
    pub status: ApplicationStatus,
    pub availability: Availability,
    pub selected: bool,
    pub applied_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApplicationRequest {
    pub candidate_id: i64,
    pub course_id: i64,
    pub position_type: PositionType,
    pub availability: Availability,
}
