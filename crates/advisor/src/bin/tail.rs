use std::env;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time;

use common::actors::{Actor, ControlMessage};
use common::logger;
use stream::{LogStreamClient, LogView};

/// Follows the live log stream and prints each line as it lands in the view.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::setup_logger();

    let url = env::args().nth(1).unwrap_or_else(|| {
        env::var("ADVISOR_STREAM_URL").unwrap_or_else(|_| "ws://127.0.0.1:8765".to_string())
    });

    let view = LogView::new();
    let (mut client, stop) = LogStreamClient::new(url, view.clone());

    let (ctl_tx, mut ctl_rx) = mpsc::channel::<ControlMessage>(64);
    tokio::spawn(async move { while ctl_rx.recv().await.is_some() {} });
    let handle = tokio::spawn(async move { client.run(ctl_tx).await });

    let mut printed = 0usize;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = time::sleep(Duration::from_millis(500)) => {
                let lines = view.lines().await;
                for line in &lines[printed..] {
                    println!("{}", line);
                }
                printed = lines.len();
            }
        }
    }

    stop.shutdown();
    let _ = handle.await;
    Ok(())
}
