use anyhow::Result;
use betfair_rpc::{BetfairConfig, ExchangeClient};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file first
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut client = ExchangeClient::new(BetfairConfig::from_env())?;

    let token = client.get_session_token(false).await?;
    info!("Logged in, token length {}", token.len());

    let response = client
        .request_with_reauth("listEventTypes", r#"{"filter":{}}"#)
        .await?;

    if let Some(event_types) = response.result().and_then(|r| r.as_array()) {
        info!("Found {} event types", event_types.len());
        for event_type in event_types {
            println!(
                "{:>8}  {}",
                event_type["eventType"]["id"].as_str().unwrap_or("-"),
                event_type["eventType"]["name"].as_str().unwrap_or("-")
            );
        }
    }

    Ok(())
}
