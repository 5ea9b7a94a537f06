use serde::Deserialize;
use sqlx::SqlitePool;

use crate::db::repository;
use crate::error::AppError;
use crate::models::{Role, User};

/// Lecturer identifier as clients send it: a JSON number or a numeric string
/// (body field or query parameter).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LecturerId {
    Number(i64),
    Text(String),
}

impl LecturerId {
    pub fn into_raw(self) -> String {
        match self {
            LecturerId::Number(n) => n.to_string(),
            LecturerId::Text(s) => s,
        }
    }
}

/// The acting lecturer, resolved once per request and threaded into
/// handlers as an explicit argument.
#[derive(Debug, Clone)]
pub struct Lecturer {
    pub user: User,
    pub course_ids: Vec<i64>,
}

impl Lecturer {
    pub fn is_assigned_to(&self, course_id: i64) -> bool {
        self.course_ids.contains(&course_id)
    }
}

/// Validates the raw lecturer identifier and loads the lecturer with its
/// assigned courses. Asserts role only; per-course scope checks stay with
/// the callers.
pub async fn resolve_lecturer(
    db: &SqlitePool,
    raw: Option<String>,
) -> Result<Lecturer, AppError> {
    let raw = raw
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput("Lecturer id is required".to_string()))?;

    let id: i64 = raw
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("Invalid lecturer id: {raw}")))?;

    let user = repository::find_user_by_id(db, id)
        .await?
        .ok_or_else(|| AppError::Forbidden("Lecturer access required".to_string()))?;

    if user.role != Role::Lecturer {
        return Err(AppError::Forbidden("Lecturer access required".to_string()));
    }

    let course_ids = repository::fetch_lecturer_course_ids(db, id).await?;

    Ok(Lecturer { user, course_ids })
}
