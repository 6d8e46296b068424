//! sea-orm entities for the TrackWise database.

pub mod companies;
pub mod email_verifications;
pub mod issue_comments;
pub mod issue_reports;
pub mod products;
pub mod staff_profiles;
pub mod user_profiles;
pub mod users;
