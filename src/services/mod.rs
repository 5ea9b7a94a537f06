pub mod insights;
pub mod reviews;

pub use insights::InsightsService;
pub use reviews::ReviewService;
