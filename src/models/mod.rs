pub mod application;
pub mod course;
pub mod insights;
pub mod review;
pub mod skill;
pub mod user;

pub use application::{
    Application, ApplicationStatus, Availability, NewApplicationRequest, PositionType,
};
pub use course::{Course, NewCourseRequest};
pub use insights::{
    InsightsReport, PositionCount, RankedApplicant, SkillInsight, StatusAverageRank, StatusCount,
};
pub use review::{Review, ReviewDetails, SubmitReview};
pub use skill::Skill;
pub use user::{NewUserRequest, Role, User, UserSummary};
