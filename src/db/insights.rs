use sqlx::{FromRow, SqlitePool};

use crate::models::{
    Application, PositionCount, RankedApplicant, StatusAverageRank, StatusCount, UserSummary,
};

/// How often a skill occurs among accepted candidates.
#[derive(Debug, Clone, FromRow)]
pub struct SkillFrequency {
    pub id: i64,
    pub name: String,
    pub candidate_count: i64,
}

pub async fn status_breakdown(db: &SqlitePool) -> Result<Vec<StatusCount>, sqlx::Error> {
    sqlx::query_as::<_, StatusCount>(
        r#"
        SELECT status, COUNT(*) AS count
        FROM applications
        GROUP BY status
        ORDER BY count DESC
        "#,
    )
    .fetch_all(db)
    .await
}

pub async fn average_rank_by_status(
    db: &SqlitePool,
) -> Result<Vec<StatusAverageRank>, sqlx::Error> {
    sqlx::query_as::<_, StatusAverageRank>(
        r#"
        SELECT a.status AS status, AVG(r.rank) AS average_rank
        FROM reviews r
        JOIN applications a ON a.id = r.application_id
        WHERE r.rank IS NOT NULL
        GROUP BY a.status
        ORDER BY average_rank ASC
        "#,
    )
    .fetch_all(db)
    .await
}

/// All skills held by at least one accepted candidate, most frequent first.
pub async fn skill_frequencies(db: &SqlitePool) -> Result<Vec<SkillFrequency>, sqlx::Error> {
    sqlx::query_as::<_, SkillFrequency>(
        r#"
        SELECT s.id AS id, s.name AS name, COUNT(DISTINCT us.user_id) AS candidate_count
        FROM skills s
        JOIN user_skills us ON us.skill_id = s.id
        JOIN applications a ON a.candidate_id = us.user_id AND a.status = 'accepted'
        GROUP BY s.id, s.name
        ORDER BY candidate_count DESC, s.name ASC
        "#,
    )
    .fetch_all(db)
    .await
}

/// Accepted candidates holding the given skill. Bound by skill id, so skill
/// names never reach the query text.
pub async fn accepted_candidates_with_skill(
    db: &SqlitePool,
    skill_id: i64,
) -> Result<Vec<UserSummary>, sqlx::Error> {
    sqlx::query_as::<_, UserSummary>(
        r#"
        SELECT DISTINCT u.id, u.email, u.first_name, u.last_name
        FROM users u
        JOIN user_skills us ON us.user_id = u.id
        JOIN applications a ON a.candidate_id = u.id AND a.status = 'accepted'
        WHERE us.skill_id = ?
        ORDER BY u.id
        "#,
    )
    .bind(skill_id)
    .fetch_all(db)
    .await
}

pub async fn top_ranked_applicants(
    db: &SqlitePool,
    limit: i64,
) -> Result<Vec<RankedApplicant>, sqlx::Error> {
    sqlx::query_as::<_, RankedApplicant>(
        r#"
        SELECT u.id, u.email, u.first_name, u.last_name, AVG(r.rank) AS average_rank
        FROM users u
        JOIN applications a ON a.candidate_id = u.id AND a.status = 'accepted'
        JOIN reviews r ON r.application_id = a.id
        WHERE r.rank IS NOT NULL
        GROUP BY u.id
        ORDER BY average_rank ASC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(db)
    .await
}

pub async fn bottom_ranked_applicants(
    db: &SqlitePool,
    limit: i64,
) -> Result<Vec<RankedApplicant>, sqlx::Error> {
    sqlx::query_as::<_, RankedApplicant>(
        r#"
        SELECT u.id, u.email, u.first_name, u.last_name, AVG(r.rank) AS average_rank
        FROM users u
        JOIN applications a ON a.candidate_id = u.id AND a.status = 'accepted'
        JOIN reviews r ON r.application_id = a.id
        WHERE r.rank IS NOT NULL
        GROUP BY u.id
        ORDER BY average_rank DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(db)
    .await
}

pub async fn most_accepted_applicant(
    db: &SqlitePool,
) -> Result<Option<UserSummary>, sqlx::Error> {
    sqlx::query_as::<_, UserSummary>(
        r#"
        SELECT u.id, u.email, u.first_name, u.last_name
        FROM users u
        JOIN applications a ON a.candidate_id = u.id AND a.status = 'accepted'
        GROUP BY u.id
        ORDER BY COUNT(a.id) DESC, u.id ASC
        LIMIT 1
        "#,
    )
    .fetch_optional(db)
    .await
}

pub async fn position_breakdown(db: &SqlitePool) -> Result<Vec<PositionCount>, sqlx::Error> {
    sqlx::query_as::<_, PositionCount>(
        r#"
        SELECT position_type, COUNT(*) AS count
        FROM applications
        GROUP BY position_type
        ORDER BY count DESC
        "#,
    )
    .fetch_all(db)
    .await
}

/// Applications that no lecturer has reviewed yet.
pub async fn unranked_applications(db: &SqlitePool) -> Result<Vec<Application>, sqlx::Error> {
    sqlx::query_as::<_, Application>(
        r#"
        SELECT a.id, a.candidate_id, a.course_id, a.position_type, a.status,
               a.availability, a.selected, a.applied_at
        FROM applications a
        LEFT JOIN reviews r ON r.application_id = a.id
        WHERE r.id IS NULL
        ORDER BY a.applied_at DESC
        "#,
    )
    .fetch_all(db)
    .await
}
