use sqlx::SqlitePool;

use crate::db::insights;
use crate::error::AppError;
use crate::models::{InsightsReport, SkillInsight};

const SKILL_LIMIT: usize = 2;
const APPLICANT_LIMIT: i64 = 3;

/// Read-only pipeline assembling the dashboard report from independent
/// aggregate queries. No snapshot guarantee across sub-queries.
pub struct InsightsService {
    db: SqlitePool,
}

impl InsightsService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn compute(&self) -> Result<InsightsReport, AppError> {
        let status_breakdown = insights::status_breakdown(&self.db).await?;
        let average_rank_by_status = insights::average_rank_by_status(&self.db).await?;

        let frequencies = insights::skill_frequencies(&self.db).await?;
        let most_common_skills = self
            .with_candidates(frequencies.iter().take(SKILL_LIMIT))
            .await?;
        // Least common, rarest first.
        let least_common_skills = self
            .with_candidates(frequencies.iter().rev().take(SKILL_LIMIT))
            .await?;

        let top_applicants = insights::top_ranked_applicants(&self.db, APPLICANT_LIMIT).await?;
        let bottom_applicants =
            insights::bottom_ranked_applicants(&self.db, APPLICANT_LIMIT).await?;
        let most_accepted_applicant = insights::most_accepted_applicant(&self.db).await?;
        let position_breakdown = insights::position_breakdown(&self.db).await?;
        let unranked_applicants = insights::unranked_applications(&self.db).await?;

        Ok(InsightsReport {
            status_breakdown,
            average_rank_by_status,
            most_common_skills,
            least_common_skills,
            top_applicants,
            bottom_applicants,
            most_accepted_applicant,
            position_breakdown,
            unranked_applicants,
        })
    }

    async fn with_candidates(
        &self,
        frequencies: impl Iterator<Item = &insights::SkillFrequency>,
    ) -> Result<Vec<SkillInsight>, AppError> {
        let mut out = Vec::new();
        for freq in frequencies {
            let candidates =
                insights::accepted_candidates_with_skill(&self.db, freq.id).await?;
            out.push(SkillInsight {
                skill: freq.name.clone(),
                candidate_count: freq.candidate_count,
                candidates,
            });
        }
        Ok(out)
    }
}
