mod config;
mod proxy;

use config::DevServerConfig;

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Proxy(#[from] proxy::ProxyError),
    #[error("failed to bind port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },
    #[error("server failed: {0}")]
    Serve(#[source] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = DevServerConfig::from_env()?;
    let app = proxy::app(&config)?;
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .map_err(|source| StartupError::Bind { port: config.port, source })?;

    tracing::info!(
        port = config.port,
        prefix = %config.prefix,
        target = %config.target,
        static_dir = ?config.static_dir,
        "medimeow dev server listening"
    );
    axum::serve(listener, app).await.map_err(StartupError::Serve)
}
