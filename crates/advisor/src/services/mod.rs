pub mod console;
pub mod prediction_service;
