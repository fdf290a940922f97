//! chat-relay server binary.
//!
//! Loads configuration from the environment, wires the adapters into a
//! `Relay` and serves the HTTP/WebSocket router until interrupted.

use std::error::Error;
use std::sync::Arc;

use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chat_relay::adapters::ai::{OpenAICompletionClient, OpenAIConfig};
use chat_relay::adapters::auth::{JwtTokenValidator, StaticTokenValidator};
use chat_relay::adapters::gateway::CallbackGateway;
use chat_relay::adapters::http::app_router;
use chat_relay::adapters::registry::{
    InMemoryConnectionRegistry, PostgresConnectionRegistry, RedisConnectionRegistry,
};
use chat_relay::adapters::websocket::LocalGateway;
use chat_relay::application::Relay;
use chat_relay::config::{
    AppConfig, AuthConfig, AuthMode, CompletionConfig, GatewayConfig, GatewayMode,
    RegistryBackend, RegistryConfig, ServerConfig,
};
use chat_relay::ports::{
    CompletionClient, ConnectionGateway, ConnectionRegistry, TokenValidator,
};

type BoxError = Box<dyn Error + Send + Sync>;

fn init_telemetry(server: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    if server.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .init();
    }
}

async fn build_registry(config: &RegistryConfig) -> Result<Arc<dyn ConnectionRegistry>, BoxError> {
    let url = config.url.as_deref().unwrap_or_default();
    let registry: Arc<dyn ConnectionRegistry> = match config.backend {
        RegistryBackend::Memory => Arc::new(InMemoryConnectionRegistry::new()),
        RegistryBackend::Redis => {
            Arc::new(RedisConnectionRegistry::connect(url, config.table_name.clone()).await?)
        }
        RegistryBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.pool_size)
                .acquire_timeout(config.timeout())
                .connect(url)
                .await?;
            let registry = PostgresConnectionRegistry::new(pool, config.table_name.clone())?;
            registry.ensure_table().await?;
            Arc::new(registry)
        }
    };
    tracing::info!(backend = ?config.backend, table = %config.table_name, "Connection registry ready");
    Ok(registry)
}

fn build_validator(config: &AuthConfig) -> Result<Arc<dyn TokenValidator>, BoxError> {
    let validator: Arc<dyn TokenValidator> = match config.mode {
        AuthMode::Jwt => {
            let secret = config
                .jwt_secret
                .as_ref()
                .ok_or("auth.jwt_secret is required in jwt mode")?;
            Arc::new(JwtTokenValidator::new(
                secret,
                config.issuer.as_deref(),
                config.audience.as_deref(),
            )?)
        }
        AuthMode::Static => {
            let tokens = config
                .static_tokens
                .as_ref()
                .map(|t| t.expose_secret().as_str())
                .unwrap_or_default();
            Arc::new(StaticTokenValidator::from_list(tokens))
        }
    };
    Ok(validator)
}

fn build_completions(config: &CompletionConfig) -> Result<Arc<dyn CompletionClient>, BoxError> {
    let api_key = config
        .api_key
        .clone()
        .ok_or("completion.api_key is required")?;
    let client = OpenAICompletionClient::new(
        OpenAIConfig::with_secret(api_key)
            .with_model(config.model.clone())
            .with_base_url(config.base_url.clone())
            .with_timeout(config.timeout()),
    )?;
    Ok(Arc::new(client))
}

/// Returns the gateway the relay pushes through, plus the local gateway
/// when this process holds the sockets itself.
fn build_gateway(
    config: &GatewayConfig,
) -> Result<(Arc<dyn ConnectionGateway>, Option<Arc<LocalGateway>>), BoxError> {
    match config.mode {
        GatewayMode::WebSocket => {
            let local = Arc::new(LocalGateway::new());
            Ok((local.clone(), Some(local)))
        }
        GatewayMode::Callback => {
            let endpoint = config
                .callback_endpoint
                .clone()
                .ok_or("gateway.callback_endpoint is required in callback mode")?;
            let gateway = CallbackGateway::new(
                endpoint,
                config.callback_token.clone(),
                config.callback_timeout(),
            )?;
            Ok((Arc::new(gateway), None))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_telemetry(&config.server);
    config.validate()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.server.environment,
        gateway = ?config.gateway.mode,
        "chat-relay starting"
    );

    let settings = config.relay.settings(&config.completion)?;
    let registry = build_registry(&config.registry).await?;
    let validator = build_validator(&config.auth)?;
    let completions = build_completions(&config.completion)?;
    let (gateway, local_gateway) = build_gateway(&config.gateway)?;

    let relay = Relay::new(registry, completions, gateway, validator, settings);
    let app = app_router(relay, local_gateway);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
