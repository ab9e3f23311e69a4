//! Pantry Chef server entry point.

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use secrecy::ExposeSecret;
use tracing_subscriber::EnvFilter;

use pantry_chef::adapters::ai::{AnthropicConfig, AnthropicProvider, MockAIProvider};
use pantry_chef::adapters::auth::{JwtConfig, JwtSessionValidator};
use pantry_chef::adapters::http::{build_router, AppServices};
use pantry_chef::adapters::rate_limiter::InMemoryRateLimiter;
use pantry_chef::adapters::recipe_store::InMemoryRecipeRepository;
use pantry_chef::application::{GenerateRecipeHandler, IngredientLookupHandler};
use pantry_chef::config::{AiConfig, AppConfig, AuthConfig};
use pantry_chef::domain::ingredient::IngredientCatalog;
use pantry_chef::ports::{AIProvider, SessionValidator};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let addr = config.server.socket_addr()?;
    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        relay = ?config.generation.relay_strategy,
        "pantry chef starting"
    );

    let catalog = Arc::new(IngredientCatalog::builtin().clone());
    let rate = &config.rate_limit;
    let generation_limiter = Arc::new(
        InMemoryRateLimiter::new(rate.generation_limits()).with_sweep_threshold(rate.sweep_threshold),
    );
    let validation_limiter = Arc::new(
        InMemoryRateLimiter::new(rate.validation_limits()).with_sweep_threshold(rate.sweep_threshold),
    );

    let provider = build_provider(&config.ai)?;
    let generate = GenerateRecipeHandler::new(
        generation_limiter,
        provider,
        Arc::clone(&catalog),
        (&config.generation).into(),
    );
    let lookup = IngredientLookupHandler::new(validation_limiter, catalog);

    let app = build_router(AppServices {
        generate: Arc::new(generate),
        lookup: Arc::new(lookup),
        recipes: Arc::new(InMemoryRecipeRepository::new()),
        sessions: build_sessions(&config.auth),
        request_timeout: config.server.request_timeout(),
        cors_origins: config.server.cors_origins_list(),
    });

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("server stopped");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .compact()
            .with_env_filter(filter)
            .init();
    }
}

fn build_provider(ai: &AiConfig) -> Result<Arc<dyn AIProvider>, Box<dyn Error>> {
    match &ai.anthropic_api_key {
        Some(key) if !ai.use_mock_provider => {
            let provider = AnthropicProvider::new(
                AnthropicConfig::new(key.expose_secret().as_str())
                    .with_model(&ai.model)
                    .with_base_url(&ai.base_url)
                    .with_timeout(ai.timeout()),
            )?;
            tracing::info!(model = %ai.model, "using anthropic provider");
            Ok(Arc::new(provider))
        }
        _ => {
            tracing::warn!("no provider key configured, serving mock recipes");
            Ok(Arc::new(MockAIProvider::new()))
        }
    }
}

fn build_sessions(auth: &AuthConfig) -> Option<Arc<dyn SessionValidator>> {
    let secret = auth.jwt_secret.as_ref()?;
    let mut jwt = JwtConfig::new(secret.expose_secret().as_str());
    if let Some(issuer) = &auth.jwt_issuer {
        jwt = jwt.with_issuer(issuer);
    }
    if let Some(audience) = &auth.jwt_audience {
        jwt = jwt.with_audience(audience);
    }
    Some(Arc::new(JwtSessionValidator::new(jwt)))
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for shutdown signal");
    }
    tracing::info!("shutdown requested");
}
