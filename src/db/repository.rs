use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::{
    Application, Course, NewApplicationRequest, NewCourseRequest, NewUserRequest, PositionType,
    Review, Skill, SubmitReview, User,
};

pub async fn insert_user(db: &SqlitePool, req: NewUserRequest) -> Result<User, sqlx::Error> {
    let now = Utc::now().to_rfc3339();

    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, first_name, last_name, role, created_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id, email, first_name, last_name, role, created_at
        "#,
    )
    .bind(&req.email)
    .bind(&req.first_name)
    .bind(&req.last_name)
    .bind(req.role)
    .bind(&now)
    .fetch_one(db)
    .await
}

pub async fn find_user_by_id(db: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, email, first_name, last_name, role, created_at FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_course(db: &SqlitePool, req: NewCourseRequest) -> Result<Course, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        r#"
        INSERT INTO courses (code, name, semester)
        VALUES (?, ?, ?)
        RETURNING id, code, name, semester
        "#,
    )
    .bind(&req.code)
    .bind(&req.name)
    .bind(&req.semester)
    .fetch_one(db)
    .await
}

pub async fn assign_lecturer_to_course(
    db: &SqlitePool,
    lecturer_id: i64,
    course_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT OR IGNORE INTO lecturer_courses (lecturer_id, course_id) VALUES (?, ?)")
        .bind(lecturer_id)
        .bind(course_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn fetch_lecturer_course_ids(
    db: &SqlitePool,
    lecturer_id: i64,
) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT course_id FROM lecturer_courses WHERE lecturer_id = ? ORDER BY course_id",
    )
    .bind(lecturer_id)
    .fetch_all(db)
    .await
}

pub async fn insert_skill(db: &SqlitePool, name: &str) -> Result<Skill, sqlx::Error> {
    sqlx::query_as::<_, Skill>("INSERT INTO skills (name) VALUES (?) RETURNING id, name")
        .bind(name)
        .fetch_one(db)
        .await
}

pub async fn add_user_skill(
    db: &SqlitePool,
    user_id: i64,
    skill_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT OR IGNORE INTO user_skills (user_id, skill_id) VALUES (?, ?)")
        .bind(user_id)
        .bind(skill_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn insert_application(
    db: &SqlitePool,
    req: NewApplicationRequest,
) -> Result<Application, sqlx::Error> {
    let now = Utc::now().to_rfc3339();

    sqlx::query_as::<_, Application>(
        r#"
        INSERT INTO applications (candidate_id, course_id, position_type, availability, applied_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id, candidate_id, course_id, position_type, status, availability, selected, applied_at
        "#,
    )
    .bind(req.candidate_id)
    .bind(req.course_id)
    .bind(req.position_type)
    .bind(req.availability)
    .bind(&now)
    .fetch_one(db)
    .await
}

pub async fn find_application_by_id(
    db: &SqlitePool,
    id: i64,
) -> Result<Option<Application>, sqlx::Error> {
    sqlx::query_as::<_, Application>(
        r#"
        SELECT id, candidate_id, course_id, position_type, status, availability, selected, applied_at
        FROM applications
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn set_application_status(
    db: &SqlitePool,
    id: i64,
    status: crate::models::ApplicationStatus,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE applications SET status = ? WHERE id = ?")
        .bind(status)
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();
    Ok(result > 0)
}

pub async fn find_review(
    db: &SqlitePool,
    lecturer_id: i64,
    application_id: i64,
) -> Result<Option<Review>, sqlx::Error> {
    sqlx::query_as::<_, Review>(
        r#"
        SELECT id, lecturer_id, application_id, rank, comment, reviewed_at, updated_at
        FROM reviews
        WHERE lecturer_id = ? AND application_id = ?
        "#,
    )
    .bind(lecturer_id)
    .bind(application_id)
    .fetch_optional(db)
    .await
}

/// Finds another application in the same (course, position type) scope that
/// this lecturer has already given the submitted rank. Returns its id.
pub async fn find_conflicting_rank(
    db: &SqlitePool,
    lecturer_id: i64,
    course_id: i64,
    position_type: PositionType,
    rank: i64,
    exclude_application_id: i64,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT r.application_id
        FROM reviews r
        JOIN applications a ON a.id = r.application_id
        WHERE r.lecturer_id = ?
          AND a.course_id = ?
          AND a.position_type = ?
          AND r.rank = ?
          AND r.application_id != ?
        LIMIT 1
        "#,
    )
    .bind(lecturer_id)
    .bind(course_id)
    .bind(position_type)
    .bind(rank)
    .bind(exclude_application_id)
    .fetch_optional(db)
    .await
}

/// Single-statement insert-or-update keyed on (lecturer_id, application_id).
/// Fields omitted from the submission stay as they were on the existing row.
pub async fn upsert_review(
    db: &SqlitePool,
    lecturer_id: i64,
    application_id: i64,
    fields: &SubmitReview,
) -> Result<Review, sqlx::Error> {
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO reviews (lecturer_id, application_id, rank, comment, reviewed_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT (lecturer_id, application_id) DO UPDATE SET
            rank = COALESCE(excluded.rank, rank),
            comment = COALESCE(excluded.comment, comment),
            updated_at = excluded.updated_at
        "#,
    )
    .bind(lecturer_id)
    .bind(application_id)
    .bind(fields.rank)
    .bind(&fields.comment)
    .bind(&now)
    .bind(&now)
    .execute(db)
    .await?;

    find_review(db, lecturer_id, application_id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

pub async fn reviews_for_application(
    db: &SqlitePool,
    application_id: i64,
) -> Result<Vec<Review>, sqlx::Error> {
    sqlx::query_as::<_, Review>(
        r#"
        SELECT id, lecturer_id, application_id, rank, comment, reviewed_at, updated_at
        FROM reviews
        WHERE application_id = ?
        ORDER BY reviewed_at DESC
        "#,
    )
    .bind(application_id)
    .fetch_all(db)
    .await
}

pub async fn reviews_by_lecturer(
    db: &SqlitePool,
    lecturer_id: i64,
) -> Result<Vec<Review>, sqlx::Error> {
    sqlx::query_as::<_, Review>(
        r#"
        SELECT id, lecturer_id, application_id, rank, comment, reviewed_at, updated_at
        FROM reviews
        WHERE lecturer_id = ?
        ORDER BY reviewed_at DESC
        "#,
    )
    .bind(lecturer_id)
    .fetch_all(db)
    .await
}

pub async fn delete_review(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM reviews WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();
    Ok(result > 0)
}
