use serde::Serialize;
use sqlx::FromRow;

use super::{Application, ApplicationStatus, PositionType, UserSummary};

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: ApplicationStatus,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StatusAverageRank {
    pub status: ApplicationStatus,
    pub average_rank: f64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PositionCount {
    pub position_type: PositionType,
    pub count: i64,
}

/// A skill's frequency among accepted candidates, paired with the
/// candidates who hold it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillInsight {
    pub skill: String,
    pub candidate_count: i64,
    pub candidates: Vec<UserSummary>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RankedApplicant {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub average_rank: f64,
}

/// Dashboard payload for `GET /applications/visual-insights`. Every list
/// is empty and `most_accepted_applicant` null on an empty dataset.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsReport {
    pub status_breakdown: Vec<StatusCount>,
    pub average_rank_by_status: Vec<StatusAverageRank>,
    pub most_common_skills: Vec<SkillInsight>,
    pub least_common_skills: Vec<SkillInsight>,
    pub top_applicants: Vec<RankedApplicant>,
    pub bottom_applicants: Vec<RankedApplicant>,
    pub most_accepted_applicant: Option<UserSummary>,
    pub position_breakdown: Vec<PositionCount>,
    pub unranked_applicants: Vec<Application>,
}
