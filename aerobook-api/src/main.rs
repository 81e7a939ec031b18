use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use aerobook_api::{app, AppState, AuthConfig, Repositories};
use aerobook_core::supplier::ExternalOfferProvider;
use aerobook_offer::{AmadeusClient, AmadeusSettings};
use aerobook_order::SimulatedPaymentAdapter;
use aerobook_store::{seed::seed_demo_data, Config, DbClient, RedisClient};
use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 10_000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aerobook_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting AeroBook API on port {}", config.server.port);

    let repos = match &config.database.url {
        Some(url) => {
            let db = DbClient::new(url).await.context("Failed to connect to Postgres")?;
            db.migrate().await.context("Failed to run migrations")?;
            Repositories::postgres(db.pool.clone())
        }
        None => {
            tracing::warn!("No database configured, using in-memory storage");
            Repositories::in_memory()
        }
    };

    if config.database.seed_demo_data {
        seed_demo_data(repos.flights.as_ref(), repos.promotions.as_ref())
            .await
            .context("Failed to seed demo data")?;
    }

    let (provider, provider_timeout): (Option<Arc<dyn ExternalOfferProvider>>, u64) = match &config.amadeus {
        Some(amadeus) => {
            let client = AmadeusClient::new(AmadeusSettings {
                base_url: amadeus.base_url.clone(),
                client_id: amadeus.client_id.clone(),
                client_secret: amadeus.client_secret.clone(),
                timeout: Duration::from_millis(amadeus.timeout_ms),
            })
            .context("Failed to build flight offer client")?;
            tracing::info!("External flight offers enabled ({})", amadeus.base_url);
            let client: Arc<dyn ExternalOfferProvider> = Arc::new(client);
            (Some(client), amadeus.timeout_ms)
        }
        None => (None, DEFAULT_PROVIDER_TIMEOUT_MS),
    };

    let payments = Arc::new(SimulatedPaymentAdapter::new(config.business_rules.payment_success_rate));

    let mut state = AppState::new(
        &repos,
        provider,
        Duration::from_millis(provider_timeout),
        payments,
        &config.business_rules,
        AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    )
    .context("Failed to register metrics")?;

    if let Some(url) = &config.redis.url {
        let redis = RedisClient::new(url).await.context("Failed to connect to Redis")?;
        state = state.with_rate_limit(Arc::new(redis), config.rate_limit.clone());
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state).into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
