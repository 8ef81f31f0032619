use anyhow::Context;
use pos_server::{Config, Server, ServerState, init_logger_with_file};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 可选
    let _ = dotenvy::dotenv();

    let config = Config::from_env().context("Failed to load configuration")?;
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());

    tracing::info!("POS server starting (env: {})", config.environment);

    // 存储打不开时直接退出 (已按配置重试)
    let state = ServerState::initialize(&config)
        .await
        .context("Failed to initialize server state")?;

    if let Err(e) = Server::new(config, state).run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
