//! Data the host platform supplies to the gateway client, and the narrow
//! seam the webhook processor mutates order state through. The host's own
//! order lifecycle lives outside this crate.

use crate::domain::platform::SubscriptionStatus;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct Address {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state_code: Option<String>,
    pub country_code: Option<String>,
    pub zip: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CustomerProfile {
    pub customer_id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub is_guest: bool,
    pub billing_address: Option<Address>,
    pub shipping_address: Option<Address>,
}

#[derive(Debug, Clone)]
pub struct CartLine {
    pub description: String,
    pub sku: String,
    pub quantity: i32,
    /// Per-unit price with tax excluded.
    pub unit_price: Decimal,
}

#[derive(Debug, Clone)]
pub struct CheckoutCharge {
    pub label: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct Cart {
    pub lines: Vec<CartLine>,
    pub attribute_charges: Vec<CheckoutCharge>,
    pub shipping: Option<Decimal>,
    pub tax_total: Decimal,
}

#[derive(Debug, Clone)]
pub struct RawCard {
    pub cardholder_name: String,
    pub number: String,
    pub expire_month: u8,
    pub expire_year: u16,
    pub cvv2: String,
}

/// The card reference attached to a payment. Exactly one source by
/// construction; the orchestrator maps it onto the wire request.
#[derive(Debug, Clone)]
pub enum CardSource {
    /// A card previously saved to the customer's vault record.
    Stored { card_id: String },
    /// A card id produced client-side by embedded-fields tokenization.
    Tokenized { card_id: String },
    Raw(RawCard),
}

#[derive(Debug, Clone)]
pub struct PaymentData {
    pub order_id: Uuid,
    pub order_total: Decimal,
    pub card: CardSource,
    pub save_card: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePeriod {
    Days,
    Weeks,
    Months,
    Years,
}

#[derive(Debug, Clone)]
pub struct RecurringCycle {
    pub period: CyclePeriod,
    pub length: i32,
    /// None means the subscription runs until cancelled.
    pub total_cycles: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Authorized,
    Paid,
    PartiallyRefunded,
    Refunded,
    Voided,
}

#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub order_id: Uuid,
    pub customer_id: String,
    pub order_total: Decimal,
    pub authorization_transaction_id: Option<String>,
    pub capture_transaction_id: Option<String>,
    pub subscription_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct RecurringHistoryEntry {
    pub transaction_id: Option<String>,
    pub succeeded: bool,
    pub detail: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct RecurringRecord {
    pub initial_order_id: Uuid,
    pub customer_id: String,
    pub subscription_id: i64,
    pub status: SubscriptionStatus,
    pub history: Vec<RecurringHistoryEntry>,
}

/// Order-state mutation seam used by webhook processing. Implemented by the
/// host; the in-memory version backs the binary and tests.
pub trait OrderStore: Send + Sync {
    fn recurring_by_initial_order(&self, order_id: Uuid) -> Option<RecurringRecord>;
    /// Transaction ids already recorded against the recurring payment, used
    /// for idempotent webhook replay.
    fn recorded_transaction_ids(&self, initial_order_id: Uuid) -> Vec<String>;
    fn append_recurring_history(&self, initial_order_id: Uuid, entry: RecurringHistoryEntry);
    fn set_recurring_status(&self, initial_order_id: Uuid, status: SubscriptionStatus);
}

#[derive(Default)]
pub struct MemoryOrderStore {
    records: Mutex<HashMap<Uuid, RecurringRecord>>,
}

impl MemoryOrderStore {
    pub fn register(&self, record: RecurringRecord) {
        self.records
            .lock()
            .expect("order store lock poisoned")
            .insert(record.initial_order_id, record);
    }
}

impl OrderStore for MemoryOrderStore {
    fn recurring_by_initial_order(&self, order_id: Uuid) -> Option<RecurringRecord> {
        self.records
            .lock()
            .expect("order store lock poisoned")
            .get(&order_id)
            .cloned()
    }

    fn recorded_transaction_ids(&self, initial_order_id: Uuid) -> Vec<String> {
        self.records
            .lock()
            .expect("order store lock poisoned")
            .get(&initial_order_id)
            .map(|record| {
                record
                    .history
                    .iter()
                    .filter_map(|entry| entry.transaction_id.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn append_recurring_history(&self, initial_order_id: Uuid, entry: RecurringHistoryEntry) {
        if let Some(record) = self
            .records
            .lock()
            .expect("order store lock poisoned")
            .get_mut(&initial_order_id)
        {
            record.history.push(entry);
        }
    }

    fn set_recurring_status(&self, initial_order_id: Uuid, status: SubscriptionStatus) {
        if let Some(record) = self
            .records
            .lock()
            .expect("order store lock poisoned")
            .get_mut(&initial_order_id)
        {
            record.status = status;
        }
    }
}
