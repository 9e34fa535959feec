pub mod log_publisher;
pub mod stream_client;
pub mod stream_server;
