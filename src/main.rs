use std::net::SocketAddr;
use std::sync::Arc;

use auditlog_service::{
    build_router,
    config::{Config, LogFormat},
    database::MssqlExecutor,
    middleware::auth::JwtAuth,
    AppState,
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    let auth = match config.jwt_public_key.as_deref() {
        Some(pem) => Some(JwtAuth::from_pem(pem)?),
        None => {
            tracing::warn!("JWT_PUBLIC_KEY not set; audit log endpoints are unauthenticated");
            None
        }
    };

    let executor = Arc::new(MssqlExecutor::new(&config.database));
    let app_state = AppState::new(executor, config.schema_variant);
    info!(
        "Serving audit log schema {:?} from {}:{}/{}",
        config.schema_variant, config.database.server, config.database.port, config.database.database
    );

    let app = build_router(app_state, auth);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
