pub mod insights;
pub mod repository;
