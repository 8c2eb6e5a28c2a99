use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

/// Platform API response codes. Small integers, 0 is the only success value.
/// Independent of the Payment Gateway code space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum PlatformResponseCode {
    Success = 0,
    BadRequest = 2,
    InvalidCredentials = 6,
    ResourceNotExists = 7,
    Unauthorized = 11,
    InternalError = 99,
}

impl PlatformResponseCode {
    pub fn is_success(self) -> bool {
        self == PlatformResponseCode::Success
    }
}

impl std::fmt::Display for PlatformResponseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Generic platform reply envelope: `{"code": ..., "message": ..., "data": ...}`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformResponse<T> {
    pub code: PlatformResponseCode,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

/// Recurring billing frequency. Numeric tokens fixed by the gateway; note the
/// gap at 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum PlanFrequency {
    Weekly = 0,
    BiWeekly = 1,
    Monthly = 3,
    Quarterly = 4,
    BiAnnually = 5,
    Annually = 6,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubscriptionStatus {
    #[serde(rename = "A")]
    Active,
    #[serde(rename = "D")]
    Complete,
    #[serde(rename = "P")]
    Paused,
    #[serde(rename = "C")]
    Cancelled,
    #[serde(rename = "S")]
    Suspended,
}

/// Settlement status of a single gateway-side transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    #[serde(rename = "A")]
    Approved,
    #[serde(rename = "H")]
    Held,
    #[serde(rename = "C")]
    Captured,
    #[serde(rename = "V")]
    Voided,
    #[serde(rename = "K")]
    Cancelled,
    #[serde(rename = "D")]
    Declined,
    #[serde(rename = "F")]
    Failed,
    #[serde(rename = "S")]
    Settled,
    #[serde(rename = "P")]
    DepositSent,
    #[serde(rename = "N")]
    SettledUnfunded,
    #[serde(rename = "R")]
    Rejected,
}

impl TransactionStatus {
    /// Whether the transaction moved money (or will): approved, captured,
    /// settled or deposit stages.
    pub fn is_successful(self) -> bool {
        matches!(
            self,
            TransactionStatus::Approved
                | TransactionStatus::Captured
                | TransactionStatus::Settled
                | TransactionStatus::DepositSent
                | TransactionStatus::SettledUnfunded
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardType {
    #[serde(rename = "VS")]
    Visa,
    #[serde(rename = "MC")]
    MasterCard,
    #[serde(rename = "PP")]
    PayPal,
    #[serde(rename = "DS")]
    Discover,
    #[serde(rename = "AM")]
    AmericanExpress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WebhookStatus {
    #[serde(rename = "Active")]
    Active,
    #[serde(rename = "Disabled")]
    Disabled,
    #[serde(rename = "Suspended")]
    Suspended,
}

/// Billing card stored in the customer vault. At most one card per customer
/// carries the `primary` flag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillingCard {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_id: Option<String>,
    /// Masked except during card creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    #[serde(rename = "exp_date", skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cvv2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_type: Option<CardType>,
    #[serde(rename = "billing_first_name", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(rename = "billing_last_name", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(rename = "billing_firm_name", skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(rename = "billing_addr1", skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    #[serde(rename = "billing_city", skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(rename = "billing_state", skip_serializing_if = "Option::is_none")]
    pub state_code: Option<String>,
    #[serde(rename = "billing_zip", skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(rename = "billing_country", skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_date: Option<String>,
    #[serde(rename = "primary", skip_serializing_if = "Option::is_none")]
    pub is_primary: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VaultCustomer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(rename = "customer_email", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "customer_first_name", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(rename = "customer_last_name", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(rename = "customer_firm_name", skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(rename = "customer_phone", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub billing_cards: Vec<BillingCard>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateCustomerRequest {
    #[serde(flatten)]
    pub customer: VaultCustomer,
    #[serde(rename = "auto_generate_customer_id", skip_serializing_if = "Option::is_none")]
    pub auto_generate_id: Option<bool>,
}

/// Card create/update payload; the owning customer id travels in the path.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BillingCardRequest {
    #[serde(skip)]
    pub customer_id: String,
    #[serde(flatten)]
    pub card: BillingCard,
}

/// Embedded fields transient key, used by the hosted card-capture form.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddedKey {
    pub transient_key: Option<String>,
    #[serde(rename = "expiry_time")]
    pub expiration_time: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Webhook {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_node: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<WebhookStatus>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub events: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SubscriptionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_last_name: Option<String>,
    #[serde(rename = "tran_currency")]
    pub currency_iso_code: u16,
    /// YYYY-MM-DD.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_start: Option<String>,
    #[serde(rename = "plan_desc", skip_serializing_if = "Option::is_none")]
    pub plan_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_frequency: Option<PlanFrequency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_duration: Option<i32>,
    #[serde(rename = "amt_setup", skip_serializing_if = "Option::is_none")]
    pub setup_amount: Option<Decimal>,
    #[serde(rename = "recur_amt", skip_serializing_if = "Option::is_none")]
    pub recurring_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SubscriptionStatus>,
    #[serde(rename = "subscription_on_plan", skip_serializing_if = "Option::is_none")]
    pub is_subscription_on_plan: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CancelSubscriptionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Subscription {
    pub subscription_id: Option<i64>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub status: Option<SubscriptionStatus>,
    #[serde(rename = "plan_desc", default)]
    pub plan_description: Option<String>,
    #[serde(default)]
    pub plan_frequency: Option<PlanFrequency>,
    #[serde(default)]
    pub interval: Option<i32>,
    #[serde(default)]
    pub plan_duration: Option<i32>,
    #[serde(default)]
    pub date_start: Option<String>,
    #[serde(default)]
    pub date_next: Option<String>,
    #[serde(rename = "amt_setup", default)]
    pub setup_amount: Option<Decimal>,
    #[serde(rename = "recur_amt", default)]
    pub recurring_amount: Option<Decimal>,
    /// First-cycle charge outcome, present when the gateway booked the setup
    /// amount at creation time.
    #[serde(rename = "response", default)]
    pub transaction_response: Option<super::gateway::TransactionResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionTransaction {
    #[serde(rename = "pg_id")]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub auth_code: Option<String>,
    #[serde(default)]
    pub status: Option<TransactionStatus>,
    #[serde(rename = "amt_tran", default)]
    pub amount: Option<Decimal>,
    #[serde(rename = "date_payment", default)]
    pub payment_date: Option<String>,
}

/// Inbound webhook notification: an event tag plus a typed payload.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent<T> {
    pub event: String,
    pub data: Option<T>,
}

impl<T: DeserializeOwned> WebhookEvent<T> {
    pub fn from_body(raw: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_codes_serialize_as_integers() {
        assert_eq!(
            serde_json::to_string(&PlatformResponseCode::Success).unwrap(),
            "0"
        );
        assert_eq!(
            serde_json::to_string(&PlatformResponseCode::InternalError).unwrap(),
            "99"
        );
        let parsed: PlatformResponseCode = serde_json::from_str("7").unwrap();
        assert_eq!(parsed, PlatformResponseCode::ResourceNotExists);
    }

    #[test]
    fn plan_frequency_skips_token_two() {
        assert_eq!(serde_json::to_string(&PlanFrequency::BiWeekly).unwrap(), "1");
        assert_eq!(serde_json::to_string(&PlanFrequency::Monthly).unwrap(), "3");
        assert_eq!(serde_json::to_string(&PlanFrequency::Annually).unwrap(), "6");
        assert!(serde_json::from_str::<PlanFrequency>("2").is_err());
    }

    #[test]
    fn subscription_status_uses_letter_tokens() {
        assert_eq!(
            serde_json::to_string(&SubscriptionStatus::Complete).unwrap(),
            "\"D\""
        );
        let parsed: SubscriptionStatus = serde_json::from_str("\"S\"").unwrap();
        assert_eq!(parsed, SubscriptionStatus::Suspended);
    }

    #[test]
    fn envelope_parses_vault_customer() {
        let body = serde_json::json!({
            "code": 0,
            "message": "Success",
            "data": {
                "customer_id": "42",
                "customer_email": "jo@example.com",
                "billing_cards": [{"card_id": "card_1", "primary": true}]
            }
        });
        let reply: PlatformResponse<VaultCustomer> =
            serde_json::from_value(body).unwrap();
        assert!(reply.code.is_success());
        let customer = reply.data.unwrap();
        assert_eq!(customer.billing_cards.len(), 1);
        assert_eq!(customer.billing_cards[0].is_primary, Some(true));
    }

    #[test]
    fn webhook_event_parses_subscription_payload() {
        let body = br#"{"event":"subscription_payment_success","data":{"subscription_id":77,"status":"A","plan_desc":"9f2c7e1a-1111-2222-3333-444455556666"}}"#;
        let event: WebhookEvent<Subscription> = WebhookEvent::from_body(body).unwrap();
        assert_eq!(event.event, "subscription_payment_success");
        assert_eq!(event.data.unwrap().subscription_id, Some(77));
    }
}
