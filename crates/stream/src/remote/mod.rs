pub mod predict_client;

pub use predict_client::{PredictClient, PredictionResponse};
