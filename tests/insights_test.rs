use axum::body::Body;
use axum::http::{Request, StatusCode};
use sqlx::SqlitePool;
use tower::ServiceExt;

use teachhire_backend::api::router;
use teachhire_backend::db::repository;
use teachhire_backend::models::{
    Application, ApplicationStatus, Availability, NewApplicationRequest, NewCourseRequest,
    NewUserRequest, PositionType, Role, SubmitReview, User,
};
use teachhire_backend::services::InsightsService;
use teachhire_backend::state::AppState;

async fn setup_db() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create test db");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

async fn create_user(pool: &SqlitePool, email: &str, name: &str, role: Role) -> User {
    repository::insert_user(
        pool,
        NewUserRequest {
            email: email.to_string(),
            first_name: name.to_string(),
            last_name: "Test".to_string(),
            role,
        },
    )
    .await
    .expect("Failed to insert user")
}

async fn create_course(pool: &SqlitePool, code: &str) -> i64 {
    repository::insert_course(
        pool,
        NewCourseRequest {
            code: code.to_string(),
            name: format!("Course {code}"),
            semester: "2026-1".to_string(),
        },
    )
    .await
    .expect("Failed to insert course")
    .id
}

async fn accepted_application(
    pool: &SqlitePool,
    candidate_id: i64,
    course_id: i64,
    position_type: PositionType,
) -> Application {
    let app = repository::insert_application(
        pool,
        NewApplicationRequest {
            candidate_id,
            course_id,
            position_type,
            availability: Availability::FullTime,
        },
    )
    .await
    .expect("Failed to insert application");

    repository::set_application_status(pool, app.id, ApplicationStatus::Accepted)
        .await
        .expect("Failed to accept application");

    repository::find_application_by_id(pool, app.id)
        .await
        .expect("Failed to reload application")
        .expect("Application should exist")
}

async fn rank_application(pool: &SqlitePool, lecturer_id: i64, application_id: i64, rank: i64) {
    repository::upsert_review(
        pool,
        lecturer_id,
        application_id,
        &SubmitReview {
            rank: Some(rank),
            comment: None,
        },
    )
    .await
    .expect("Failed to upsert review");
}

async fn give_skill(pool: &SqlitePool, user_id: i64, skill_name: &str) {
    let skill = match repository::insert_skill(pool, skill_name).await {
        Ok(s) => s,
        // Already present from an earlier call
        Err(_) => sqlx::query_as::<_, teachhire_backend::models::Skill>(
            "SELECT id, name FROM skills WHERE name = ?",
        )
        .bind(skill_name)
        .fetch_one(pool)
        .await
        .expect("Skill should exist"),
    };
    repository::add_user_skill(pool, user_id, skill.id)
        .await
        .expect("Failed to link skill");
}

#[tokio::test]
async fn empty_dataset_yields_empty_report() {
    let pool = setup_db().await;
    let report = InsightsService::new(pool)
        .compute()
        .await
        .expect("Empty dataset must not fail");

    assert!(report.status_breakdown.is_empty());
    assert!(report.average_rank_by_status.is_empty());
    assert!(report.most_common_skills.is_empty());
    assert!(report.least_common_skills.is_empty());
    assert!(report.top_applicants.is_empty());
    assert!(report.bottom_applicants.is_empty());
    assert!(report.most_accepted_applicant.is_none());
    assert!(report.position_breakdown.is_empty());
    assert!(report.unranked_applicants.is_empty());
}

#[tokio::test]
async fn top_applicants_ordered_by_ascending_average_rank() {
    let pool = setup_db().await;
    let course = create_course(&pool, "COSC2626").await;

    let mut expected = Vec::new();
    for (i, rank) in [1_i64, 2, 3].iter().enumerate() {
        let lecturer = create_user(
            &pool,
            &format!("lect{i}@uni.edu"),
            &format!("Lect{i}"),
            Role::Lecturer,
        )
        .await;
        let candidate = create_user(
            &pool,
            &format!("cand{i}@uni.edu"),
            &format!("Cand{i}"),
            Role::Candidate,
        )
        .await;
        let app = accepted_application(&pool, candidate.id, course, PositionType::Tutor).await;
        rank_application(&pool, lecturer.id, app.id, *rank).await;
        expected.push(candidate.id);
    }

    let report = InsightsService::new(pool)
        .compute()
        .await
        .expect("Compute should succeed");

    // Best (rank 1) first
    let top_ids: Vec<i64> = report.top_applicants.iter().map(|a| a.id).collect();
    assert_eq!(top_ids, expected);
    assert_eq!(report.top_applicants[0].average_rank, 1.0);

    // Worst first on the other list
    let bottom_ids: Vec<i64> = report.bottom_applicants.iter().map(|a| a.id).collect();
    let reversed: Vec<i64> = expected.into_iter().rev().collect();
    assert_eq!(bottom_ids, reversed);
}

#[tokio::test]
async fn skill_frequencies_with_quoted_names_survive_aggregation() {
    let pool = setup_db().await;
    let course = create_course(&pool, "COSC1111").await;

    // Three accepted candidates; the quote-laden skill is the most common
    let spiky = r#"C++ "teacher's" pet; DROP TABLE skills; --"#;
    let mut candidates = Vec::new();
    for i in 0..3 {
        let c = create_user(
            &pool,
            &format!("sk{i}@uni.edu"),
            &format!("Sk{i}"),
            Role::Candidate,
        )
        .await;
        let pt = if i == 0 {
            PositionType::Tutor
        } else {
            PositionType::LabAssistant
        };
        accepted_application(&pool, c.id, course, pt).await;
        give_skill(&pool, c.id, spiky).await;
        candidates.push(c);
    }
    give_skill(&pool, candidates[0].id, "SQL").await;
    give_skill(&pool, candidates[0].id, "Rust").await;
    give_skill(&pool, candidates[1].id, "Rust").await;

    let report = InsightsService::new(pool)
        .compute()
        .await
        .expect("Quoted skill names must not break aggregation");

    assert_eq!(report.most_common_skills.len(), 2);
    assert_eq!(report.most_common_skills[0].skill, spiky);
    assert_eq!(report.most_common_skills[0].candidate_count, 3);
    assert_eq!(report.most_common_skills[0].candidates.len(), 3);
    assert_eq!(report.most_common_skills[1].skill, "Rust");

    assert_eq!(report.least_common_skills.len(), 2);
    assert_eq!(report.least_common_skills[0].skill, "SQL");
    assert_eq!(report.least_common_skills[0].candidate_count, 1);
    assert_eq!(
        report.least_common_skills[0].candidates[0].id,
        candidates[0].id
    );
}

#[tokio::test]
async fn http_visual_insights_returns_camel_case_report() {
    let pool = setup_db().await;
    let course = create_course(&pool, "COSC3030").await;
    let lecturer = create_user(&pool, "lect@uni.edu", "Lect", Role::Lecturer).await;
    let candidate = create_user(&pool, "cand@uni.edu", "Cand", Role::Candidate).await;
    let app_row = accepted_application(&pool, candidate.id, course, PositionType::Tutor).await;
    rank_application(&pool, lecturer.id, app_row.id, 1).await;
    give_skill(&pool, candidate.id, "Rust").await;

    let app = router(AppState { db: pool });
    let response = app
        .oneshot(
            Request::builder()
                .uri("/applications/visual-insights")
                .body(Body::empty())
                .expect("Failed to build request"),
        )
        .await
        .expect("Request should complete");
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body: serde_json::Value = serde_json::from_slice(&bytes).expect("Body should be JSON");

    assert_eq!(body["statusBreakdown"][0]["status"], "accepted");
    assert_eq!(body["statusBreakdown"][0]["count"], 1);
    assert_eq!(body["averageRankByStatus"][0]["averageRank"], 1.0);
    assert_eq!(body["mostCommonSkills"][0]["skill"], "Rust");
    assert_eq!(
        body["mostCommonSkills"][0]["candidates"][0]["id"],
        candidate.id
    );
    assert_eq!(body["topApplicants"][0]["id"], candidate.id);
    assert_eq!(body["mostAcceptedApplicant"]["id"], candidate.id);
    assert_eq!(body["positionBreakdown"][0]["positionType"], "tutor");
    assert!(body["unrankedApplicants"].as_array().expect("array").is_empty());
}

#[tokio::test]
async fn breakdowns_most_accepted_and_unranked() {
    let pool = setup_db().await;
    let course_a = create_course(&pool, "COSC0001").await;
    let course_b = create_course(&pool, "COSC0002").await;

    let lecturer = create_user(&pool, "lect@uni.edu", "Lect", Role::Lecturer).await;
    let star = create_user(&pool, "star@uni.edu", "Star", Role::Candidate).await;
    let other = create_user(&pool, "other@uni.edu", "Other", Role::Candidate).await;

    // Star: two accepted applications, one of them reviewed
    let star_a = accepted_application(&pool, star.id, course_a, PositionType::Tutor).await;
    accepted_application(&pool, star.id, course_b, PositionType::Tutor).await;
    rank_application(&pool, lecturer.id, star_a.id, 1).await;

    // Other: one accepted, plus a pending lab application, all unreviewed
    accepted_application(&pool, other.id, course_a, PositionType::LabAssistant).await;
    let pending = repository::insert_application(
        &pool,
        NewApplicationRequest {
            candidate_id: other.id,
            course_id: course_b,
            position_type: PositionType::LabAssistant,
            availability: Availability::PartTime,
        },
    )
    .await
    .expect("Failed to insert application");

    let report = InsightsService::new(pool)
        .compute()
        .await
        .expect("Compute should succeed");

    let accepted = report
        .status_breakdown
        .iter()
        .find(|s| s.status == ApplicationStatus::Accepted)
        .expect("Accepted bucket present");
    assert_eq!(accepted.count, 3);
    let pending_bucket = report
        .status_breakdown
        .iter()
        .find(|s| s.status == ApplicationStatus::Pending)
        .expect("Pending bucket present");
    assert_eq!(pending_bucket.count, 1);

    let tutors = report
        .position_breakdown
        .iter()
        .find(|p| p.position_type == PositionType::Tutor)
        .expect("Tutor bucket present");
    assert_eq!(tutors.count, 2);
    let labs = report
        .position_breakdown
        .iter()
        .find(|p| p.position_type == PositionType::LabAssistant)
        .expect("Lab bucket present");
    assert_eq!(labs.count, 2);

    assert_eq!(
        report
            .most_accepted_applicant
            .as_ref()
            .expect("Someone has accepted applications")
            .id,
        star.id
    );

    // Every application without a review shows up as unranked
    let unranked_ids: Vec<i64> = report.unranked_applicants.iter().map(|a| a.id).collect();
    assert_eq!(unranked_ids.len(), 3);
    assert!(unranked_ids.contains(&pending.id));
    assert!(!unranked_ids.contains(&star_a.id));

    let avg = report
        .average_rank_by_status
        .iter()
        .find(|s| s.status == ApplicationStatus::Accepted)
        .expect("Accepted average present");
    assert_eq!(avg.average_rank, 1.0);
}
