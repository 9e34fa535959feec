pub mod remote;
pub mod services;

pub use remote::predict_client::{PredictClient, PredictionResponse};
pub use services::log_publisher::LogPublisher;
pub use services::stream_client::{LogStreamClient, LogView, StreamShutdown};
pub use services::stream_server::StreamServer;
