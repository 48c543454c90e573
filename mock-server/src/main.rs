//! Standalone mock of the Avisa App API. Filtering follows `RUST_LOG`.

use std::sync::Arc;

use avisa_mock_server::{MockConfig, MockState};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt::init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let mut config = MockConfig::default();
    if let Ok(token) = std::env::var("AVISA_MOCK_TOKEN") {
        config.token = token;
    }

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "mock Avisa API listening");
    avisa_mock_server::run_with_state(listener, Arc::new(MockState::new(config))).await
}
