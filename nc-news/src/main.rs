use nc_news::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_tracing(&config)?;

    tracing::info!(
        environment = %config.service.environment,
        "Loaded configuration for {}",
        config.service.name
    );

    let state = AppState::connect(config.clone()).await?;

    Server::new(config).serve(router(state)).await
}
