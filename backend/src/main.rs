//! Backend entry-point: wires the auth, ledger, and health endpoints.

use actix_web::{App, HttpServer, web};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::AuthRedirect;
use backend::config::AppConfig;
use backend::inbound::http::auth::{login, logout, signup};
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::revenue::{list_revenue, record_revenue};
use backend::inbound::http::session::SessionSettings;
use backend::outbound::persistence::select_store;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = AppConfig::parse();
    let store = select_store(&config).await.map_err(std::io::Error::other)?;
    let store_data = web::Data::from(store);
    let settings = web::Data::new(SessionSettings {
        cookie_secure: config.session_secure(),
    });

    let health_state = web::Data::new(HealthState::new());
    // Clone for the server factory so the readiness probe remains accessible.
    let server_health_state = health_state.clone();

    info!(mode = ?config.mode, addr = %config.bind_addr, "starting revenue ledger");
    let server = HttpServer::new(move || {
        App::new()
            .app_data(store_data.clone())
            .app_data(settings.clone())
            .app_data(server_health_state.clone())
            .wrap(AuthRedirect)
            .service(
                web::scope("/auth")
                    .service(signup)
                    .service(login)
                    .service(logout),
            )
            .service(list_revenue)
            .service(record_revenue)
            .service(ready)
            .service(live)
    })
    .bind(config.bind_addr)?;

    health_state.mark_ready();
    server.run().await
}
