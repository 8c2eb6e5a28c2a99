use axum::routing::{get, post};
use axum::Router;
use qualpay_gateway::config::QualpaySettings;
use qualpay_gateway::host::MemoryOrderStore;
use qualpay_gateway::manager::QualpayManager;
use qualpay_gateway::service::payment_flow::PaymentFlow;
use qualpay_gateway::service::webhook_processor::WebhookProcessor;
use qualpay_gateway::transport::HttpTransport;
use qualpay_gateway::AppState;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let settings = QualpaySettings::from_env();
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

    let transport = Arc::new(HttpTransport::new(&settings)?);
    let manager = QualpayManager::new(settings.clone(), transport);
    let order_store = Arc::new(MemoryOrderStore::default());

    let state = AppState {
        payment_flow: Arc::new(PaymentFlow {
            settings: settings.clone(),
            manager: manager.clone(),
        }),
        webhook_processor: Arc::new(WebhookProcessor {
            secret: settings.webhook_secret.clone().unwrap_or_default(),
            manager,
            store: order_store,
        }),
    };

    let app = Router::new()
        .route("/health", get(qualpay_gateway::http::handlers::ops::health))
        .route(
            "/webhooks/qualpay",
            post(qualpay_gateway::http::handlers::webhook::receive),
        )
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on {}", bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
