use mock_server::{AppState, DEFAULT_ANON_KEY, DEFAULT_SERVICE_KEY};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let anon_key = std::env::var("MOCK_ANON_KEY").unwrap_or_else(|_| DEFAULT_ANON_KEY.to_string());
    let service_key =
        std::env::var("MOCK_SERVICE_KEY").unwrap_or_else(|_| DEFAULT_SERVICE_KEY.to_string());

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "mock backend listening");
    mock_server::run(listener, AppState::new(&anon_key, &service_key)).await
}
