pub mod db;
pub mod export;
pub mod mail;
