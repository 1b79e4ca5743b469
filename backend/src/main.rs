//! LedgerPress backend server: public site API plus the admin dashboard
//! API, both thin layers over the hosted storage and identity providers.

mod auth;
mod config;
mod document;
mod handlers;
mod permissions;
mod request_context;
mod routes;
mod state;

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = config::AppConfig::from_env()?;
    tracing::info!("Starting LedgerPress backend server");
    tracing::info!("Storage data API: {}", config.storage_url);
    tracing::info!("Identity provider: {}", config.identity_url);

    let app_state = state::AppState::new(&config);
    let app = routes::create_router(app_state);

    let addr = format!("{}:{}", config.bind_addr, config.port);
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
