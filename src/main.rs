//! Next Level Web portal server.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nextlevel_portal::adapters::auth::JwtSessionCodec;
use nextlevel_portal::adapters::email::{ResendConfig, ResendEmailSender};
use nextlevel_portal::adapters::http::{app_router, AppState, HttpSettings};
use nextlevel_portal::adapters::postgres::{
    PostgresLeadRepository, PostgresMagicLinkRepository, PostgresProcessedEventStore,
    PostgresSubscriberRepository,
};
use nextlevel_portal::adapters::rate_limiter::{InMemoryRateLimiter, RateLimits};
use nextlevel_portal::adapters::stripe::{StripeConfig, StripePaymentAdapter};
use nextlevel_portal::application::CleanupMagicLinksHandler;
use nextlevel_portal::config::AppConfig;
use nextlevel_portal::domain::auth::UnsubscribeSigner;
use nextlevel_portal::ports::{PaymentProvider, RateLimiter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load_validated()?;
    init_tracing(&config);

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;
    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Migrations applied");
    }

    let payment_provider = StripeConfig::from_payment_config(&config.payment)
        .map(|c| Arc::new(StripePaymentAdapter::new(c)) as Arc<dyn PaymentProvider>);
    if payment_provider.is_none() {
        tracing::warn!("Stripe not configured; checkout and webhooks are disabled");
    }

    let email = ResendConfig::from_email_config(&config.email);
    if !email.is_configured() {
        tracing::warn!("Resend not configured; login links cannot be emailed");
    }

    let rate_limiter = Arc::new(InMemoryRateLimiter::new(RateLimits::from(
        &config.rate_limit,
    )));
    let magic_links = Arc::new(PostgresMagicLinkRepository::new(pool.clone()));

    let state = AppState {
        magic_links: magic_links.clone(),
        leads: Arc::new(PostgresLeadRepository::new(pool.clone())),
        processed_events: Arc::new(PostgresProcessedEventStore::new(pool.clone())),
        subscribers: Arc::new(PostgresSubscriberRepository::new(pool.clone())),
        payment_provider,
        email_sender: Arc::new(ResendEmailSender::new(email)),
        session_codec: Arc::new(JwtSessionCodec::new(SecretString::new(
            config.auth.session_secret.clone(),
        ))),
        unsubscribe_signer: Arc::new(UnsubscribeSigner::new(SecretString::new(
            config.auth.effective_unsubscribe_secret().to_string(),
        ))),
        rate_limiter: rate_limiter.clone(),
        settings: Arc::new(HttpSettings::from_config(&config)),
    };

    spawn_cleanup(
        CleanupMagicLinksHandler::new(magic_links),
        rate_limiter,
        config.auth.cleanup_interval(),
    );

    let app = app_router(state)
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// JSON lines in production, human-readable output elsewhere.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Deletes expired and used login links, and prunes idle rate-limit
/// windows, on a fixed interval.
fn spawn_cleanup(
    cleanup: CleanupMagicLinksHandler,
    rate_limiter: Arc<InMemoryRateLimiter>,
    every: Duration,
) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            match cleanup.handle().await {
                Ok(result) => {
                    tracing::debug!(deleted = result.deleted, "Magic link cleanup ran")
                }
                Err(e) => tracing::error!(error = %e, "Magic link cleanup failed"),
            }
            let pruned = rate_limiter.prune().await;
            if pruned > 0 {
                tracing::debug!(pruned, "Rate limit windows pruned");
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
