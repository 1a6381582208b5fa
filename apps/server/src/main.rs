mod api;
mod config;
mod error;
mod main_lib;

use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    main_lib::init_tracing();
    let config = Config::from_env();

    let state = main_lib::build_state(&config).await?;
    let app = api::router(state.clone(), &config);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!("Lumen server listening on {}", config.listen_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
