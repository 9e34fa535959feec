use dotenvy::dotenv;
use std::{env, sync::Arc};
use tracing::debug;

use common::actors::ActorType;
use common::logger;
use storage::persistence::SnapshotPersistence;
use storage::{JsonFilePersistence, LogStore, SNAPSHOT_KEY, SqlitePersistence};
use stream::{LogPublisher, PredictClient, StreamServer};

use crate::actors::supervisor::Supervisor;
use crate::services::prediction_service::PredictionService;

mod actors;
mod services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::setup_logger();
    dotenv().ok();
    debug!("Advisor starting up...");

    let data_folder = env::var("ADVISOR_DATA").unwrap_or_else(|_| "data".to_string());

    let persistence: Arc<dyn SnapshotPersistence> = match env::var("ADVISOR_STORE").as_deref() {
        Ok("sqlite") => {
            let pool = storage::db::connect_pool(&data_folder).await?;
            Arc::new(SqlitePersistence::new(pool, SNAPSHOT_KEY))
        }
        _ => Arc::new(JsonFilePersistence::new(format!(
            "{}/{}.json",
            data_folder, SNAPSHOT_KEY
        ))),
    };
    let store = Arc::new(LogStore::open(persistence).await);

    let publisher = LogPublisher::new(1024);

    let mut supervisor = Supervisor::new();
    let stream_addr =
        env::var("ADVISOR_STREAM_ADDR").unwrap_or_else(|_| "127.0.0.1:8765".to_string());
    let publisher_for_server = publisher.clone();
    supervisor.register_actor(
        ActorType::StreamServerActor,
        Box::new(move || {
            Box::new(StreamServer::new(
                stream_addr.clone(),
                publisher_for_server.clone(),
            ))
        }),
    );
    tokio::spawn(async move { supervisor.start().await });

    let mut service = PredictionService::new(store.clone(), publisher);
    if let Some(client) = PredictClient::from_env() {
        debug!("Remote prediction service configured");
        service = service.with_remote(client);
    }

    services::console::run(service, store).await
}
