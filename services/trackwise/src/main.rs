use anyhow::Context;
use sea_orm::Database;
use tracing::info;

use trackwise::config::TrackwiseConfig;
use trackwise::infra::mail::Mailer;
use trackwise::router::build_router;
use trackwise::state::AppState;
use trackwise_core::config::Config;
use trackwise_core::tracing::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = TrackwiseConfig::from_env().context("failed to load configuration")?;

    let db = Database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    let mailer = Mailer::from_config(&config)?;

    let state = AppState {
        db,
        jwt_secret: config.jwt_secret.clone(),
        cookies: config.cookie_settings(),
        mailer,
        otp_fallback_in_response: config.otp_fallback_in_response,
        currency_symbol: config.currency_symbol.clone(),
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, mail_transport = ?config.mail_transport, "trackwise listening");
    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
