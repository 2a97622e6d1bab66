use chess_server::{api, config::ServerConfig};

use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    dotenv::dotenv().ok();

    let config = ServerConfig::from_env()?;
    let app = api::router(config.engine_path.clone());

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!(addr = %config.listen_addr, engine = %config.engine_path, "chess server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
