use qualpay_gateway::config::{QualpaySettings, TransactionType};
use qualpay_gateway::transport::{HttpCall, HttpReply, QualpayTransport, TransportError};
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Records every outgoing call and answers from a queue of canned replies.
/// A test that triggers more calls than it queued replies for fails loudly.
#[derive(Default)]
pub struct MockTransport {
    pub calls: Mutex<Vec<HttpCall>>,
    replies: Mutex<VecDeque<HttpReply>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn enqueue(&self, status: u16, body: serde_json::Value) {
        self.replies.lock().unwrap().push_back(HttpReply {
            status,
            body: body.to_string(),
        });
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn call(&self, index: usize) -> HttpCall {
        self.calls.lock().unwrap()[index].clone()
    }
}

#[async_trait::async_trait]
impl QualpayTransport for MockTransport {
    async fn execute(&self, call: HttpCall) -> Result<HttpReply, TransportError> {
        self.calls.lock().unwrap().push(call);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TransportError::Connect("no canned reply queued".to_string()))
    }
}

pub fn settings() -> QualpaySettings {
    QualpaySettings {
        merchant_id: "212000000001".to_string(),
        security_key: "sandbox-key".to_string(),
        use_sandbox: true,
        transaction_type: TransactionType::Sale,
        use_embedded_fields: false,
        use_customer_vault: false,
        use_recurring_billing: false,
        webhook_id: None,
        webhook_secret: Some("webhook-secret".to_string()),
        additional_fee: Decimal::ZERO,
        additional_fee_percentage: false,
        request_timeout_ms: 30_000,
    }
}
