pub mod config;
pub mod domain {
    pub mod gateway;
    pub mod platform;
}
pub mod endpoint;
pub mod host;
pub mod http {
    pub mod handlers {
        pub mod ops;
        pub mod webhook;
    }
}
pub mod manager;
pub mod service {
    pub mod card_checks;
    pub mod line_items;
    pub mod payment_flow;
    pub mod recurring;
    pub mod setup;
    pub mod vault_cards;
    pub mod webhook_processor;
}
pub mod transport;

use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub payment_flow: Arc<service::payment_flow::PaymentFlow>,
    pub webhook_processor: Arc<service::webhook_processor::WebhookProcessor>,
}
