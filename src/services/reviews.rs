use sqlx::SqlitePool;
use tracing::info;

use crate::auth::Lecturer;
use crate::db::repository;
use crate::error::AppError;
use crate::models::{Review, ReviewDetails, SubmitReview, UserSummary};

/// Write path for lecturer reviews plus the read-only accessors over them.
pub struct ReviewService {
    db: SqlitePool,
}

impl ReviewService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create-or-update a lecturer's review of an application, enforcing
    /// rank uniqueness within the application's (course, position type)
    /// scope. Idempotent: resubmitting the same fields leaves the same row
    /// with the same id.
    pub async fn submit(
        &self,
        lecturer: &Lecturer,
        application_id: i64,
        fields: SubmitReview,
    ) -> Result<ReviewDetails, AppError> {
        let application = repository::find_application_by_id(&self.db, application_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !lecturer.is_assigned_to(application.course_id) {
            return Err(AppError::Forbidden(
                "Not a lecturer of this course".to_string(),
            ));
        }

        if let Some(rank) = fields.rank {
            // The check and the upsert below are separate statements; two
            // in-flight submissions for different applications in the same
            // scope can both pass this check with the same rank. Closing
            // that window needs per-scope write serialization or a
            // store-level exclusion constraint.
            let conflict = repository::find_conflicting_rank(
                &self.db,
                lecturer.user.id,
                application.course_id,
                application.position_type,
                rank,
                application_id,
            )
            .await?;

            if conflict.is_some() {
                return Err(AppError::Conflict {
                    message: format!(
                        "Rank {rank} is already assigned to another application for this course and position"
                    ),
                    rank: Some(rank),
                });
            }
        }

        let review =
            repository::upsert_review(&self.db, lecturer.user.id, application_id, &fields).await?;

        info!(
            lecturer_id = lecturer.user.id,
            application_id,
            rank = review.rank,
            "review saved"
        );

        Ok(ReviewDetails {
            review,
            lecturer: UserSummary {
                id: lecturer.user.id,
                email: lecturer.user.email.clone(),
                first_name: lecturer.user.first_name.clone(),
                last_name: lecturer.user.last_name.clone(),
            },
            application,
        })
    }

    /// The lecturer's own review of an application, if any.
    pub async fn own_review(
        &self,
        lecturer: &Lecturer,
        application_id: i64,
    ) -> Result<Option<Review>, AppError> {
        Ok(repository::find_review(&self.db, lecturer.user.id, application_id).await?)
    }

    pub async fn reviews_for_application(
        &self,
        application_id: i64,
    ) -> Result<Vec<Review>, AppError> {
        Ok(repository::reviews_for_application(&self.db, application_id).await?)
    }

    pub async fn reviews_by_lecturer(&self, lecturer_id: i64) -> Result<Vec<Review>, AppError> {
        Ok(repository::reviews_by_lecturer(&self.db, lecturer_id).await?)
    }
}
