pub mod access;
pub mod password;
pub mod report;
pub mod repository;
pub mod types;
