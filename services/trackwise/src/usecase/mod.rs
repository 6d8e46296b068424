pub mod dashboard;
pub mod inventory;
pub mod issue;
pub mod otp;
pub mod profile;
pub mod registration;
pub mod report;
pub mod session;
pub mod staff;
