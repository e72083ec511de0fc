mod auth;
mod config;
mod doc;
mod dtos;
mod error;
mod payments;
mod routes;
mod state;
mod utils;

use crate::{
    auth::LmsClaims,
    config::Config,
    payments::stripe::StripeGateway,
    state::AppState,
    utils::shutdown::shutdown_signal,
};
use database::{db::create_connection, storage::FileStore};
use log::{error, info};
use migration::{Migrator, MigratorTrait};
use std::{process::ExitCode, sync::Arc};
use tower::ServiceBuilder;
use tower_oauth2_resource_server::server::OAuth2ResourceServer;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    let db = create_connection(&config.database_url).await?;
    if config.run_migrations {
        Migrator::up(&db, None).await?;
        info!("Database migrations applied");
    }

    let oauth2_resource_server = OAuth2ResourceServer::<LmsClaims>::builder()
        .issuer_url(config.oidc_issuer_url.as_str())
        .build()
        .await?;

    if config.stripe_secret_key.is_none() || config.stripe_webhook_secret.is_none() {
        info!("Stripe keys not set; checkout and payment confirmation are disabled");
    }

    let state = AppState {
        db,
        files: FileStore::new(&config.upload_root),
        payments: Arc::new(StripeGateway::new(
            config.stripe_secret_key.clone(),
            config.stripe_webhook_secret.clone(),
        )),
        public_base_url: config.public_base_url.clone(),
    };

    let app = routes::app(
        routes::public_routes(),
        routes::protected_routes()
            .layer(ServiceBuilder::new().layer(oauth2_resource_server.into_layer())),
        state,
    );

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Running axum on http://{}", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
