pub mod actors;
pub mod error;
pub mod logger;
pub mod models;
