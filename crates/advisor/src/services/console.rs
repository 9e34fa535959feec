use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use common::models::Asset;
use storage::LogStore;

use crate::services::prediction_service::PredictionService;

fn print_help() {
    println!("commands:");
    println!("  predict <YYYY-MM-DD>         issue a signal and record it");
    println!("  quote <asset> <YYYY-MM-DD>   ask the remote prediction service");
    println!("  logs                         list recorded predictions");
    println!("  clear                        wipe all recorded predictions");
    println!("  quit");
    println!(
        "assets: {}",
        Asset::ALL.map(|a| a.to_string()).join(", ")
    );
}

/// Operator loop on stdin. Confirmation for destructive operations lives
/// here; the store itself never asks.
pub async fn run(service: PredictionService, store: Arc<LogStore>) -> anyhow::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    print_help();

    while let Some(line) = lines.next_line().await? {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("predict") => {
                let date = parts.next().unwrap_or("");
                match service.predict(date).await {
                    Ok(log) => println!("{}: {} - {}", log.date, log.action, log.message),
                    Err(e) => println!("{}", e),
                }
            }
            Some("quote") => {
                let asset = parts.next().unwrap_or("");
                let date = parts.next().unwrap_or("");
                match asset.parse::<Asset>() {
                    Ok(asset) => match service.quote(asset, date).await {
                        Ok(resp) => {
                            println!("{} on {}: {}", resp.asset, resp.date, resp.signal);
                            if let Some(message) = &resp.message {
                                println!("{}", message);
                            }
                            if let Some(price) = resp.current_price {
                                println!("current price: {:.2}", price);
                            }
                            if let Some(forecast) = resp.prediction {
                                println!("forecast: {:.2}", forecast);
                            }
                        }
                        Err(e) => println!("{}", e),
                    },
                    Err(e) => println!("{}", e),
                }
            }
            Some("logs") => {
                let all = store.list_all().await;
                if all.is_empty() {
                    println!("no logs recorded");
                }
                for (i, log) in all.iter().enumerate() {
                    println!("{:>3} {}", i + 1, log.to_line());
                }
            }
            Some("clear") => {
                // Irreversible, so make the operator spell it out.
                println!("this deletes every recorded log; type 'yes' to confirm:");
                match lines.next_line().await? {
                    Some(answer) if answer.trim() == "yes" => {
                        store.clear().await;
                        println!("logs cleared");
                    }
                    _ => println!("aborted"),
                }
            }
            Some("help") => print_help(),
            Some("quit") | Some("exit") => break,
            Some(other) => println!("unknown command: {} (try 'help')", other),
            None => {}
        }
    }

    Ok(())
}
