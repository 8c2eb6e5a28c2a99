use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The gateway accepts a single settlement currency.
pub const USD_NUMERIC_ISO_CODE: u16 = 840;

/// Payment Gateway response codes. Three-digit string tokens fixed by the
/// gateway; "000" is the only success value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatewayResponseCode {
    #[serde(rename = "000")]
    Success,
    #[serde(rename = "100")]
    BadRequest,
    #[serde(rename = "101")]
    InvalidCredentials,
    #[serde(rename = "102")]
    InvalidTransactionId,
    #[serde(rename = "103")]
    MissingCardholderData,
    #[serde(rename = "104")]
    InvalidTransactionAmount,
    #[serde(rename = "105")]
    MissingAuthorizationCode,
    #[serde(rename = "106")]
    InvalidAvsData,
    #[serde(rename = "107")]
    InvalidExpirationDate,
    #[serde(rename = "108")]
    InvalidCardNumber,
    #[serde(rename = "109")]
    FieldLengthValidationFailed,
    #[serde(rename = "110")]
    DynamicDbaNotAllowed,
    #[serde(rename = "111")]
    CreditsNotAllowed,
    #[serde(rename = "112")]
    InvalidCustomerData,
    #[serde(rename = "401")]
    VoidFailed,
    #[serde(rename = "402")]
    RefundFailed,
    #[serde(rename = "403")]
    CaptureFailed,
    #[serde(rename = "404")]
    BatchCloseFailed,
    #[serde(rename = "405")]
    TokenizationFailed,
    #[serde(rename = "998")]
    Timeout,
    #[serde(rename = "999")]
    InternalError,
}

impl GatewayResponseCode {
    pub fn is_success(self) -> bool {
        self == GatewayResponseCode::Success
    }
}

impl std::fmt::Display for GatewayResponseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Line item debit/credit indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreditType {
    #[serde(rename = "D")]
    Debit,
    #[serde(rename = "C")]
    Credit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub quantity: i32,
    pub description: String,
    #[serde(rename = "unit_of_measure")]
    pub measure_unit: String,
    pub product_code: String,
    #[serde(rename = "debit_credit_ind")]
    pub credit_type: CreditType,
    #[serde(rename = "unit_cost")]
    pub unit_price: Decimal,
}

/// Customer record embedded in a gateway request when the cardholder is being
/// vaulted as part of the transaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayCustomer {
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
    #[serde(rename = "billing_addr1", skip_serializing_if = "Option::is_none")]
    pub billing_address1: Option<String>,
    #[serde(rename = "billing_addr2", skip_serializing_if = "Option::is_none")]
    pub billing_address2: Option<String>,
    #[serde(rename = "billing_city", skip_serializing_if = "Option::is_none")]
    pub billing_city: Option<String>,
    #[serde(rename = "billing_state", skip_serializing_if = "Option::is_none")]
    pub billing_state_code: Option<String>,
    #[serde(rename = "billing_country", skip_serializing_if = "Option::is_none")]
    pub billing_country: Option<String>,
    #[serde(rename = "billing_zip", skip_serializing_if = "Option::is_none")]
    pub billing_zip: Option<String>,
    #[serde(rename = "shipping_addresses", skip_serializing_if = "Vec::is_empty", default)]
    pub shipping_addresses: Vec<ShippingAddress>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShippingAddress {
    #[serde(rename = "shipping_first_name", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(rename = "shipping_last_name", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(rename = "shipping_firm_name", skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(rename = "shipping_addr1", skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    #[serde(rename = "shipping_addr2", skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    #[serde(rename = "shipping_city", skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(rename = "shipping_state", skip_serializing_if = "Option::is_none")]
    pub state_code: Option<String>,
    #[serde(rename = "shipping_country", skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(rename = "shipping_zip", skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<bool>,
}

/// Authorization/sale request. Exactly one card reference is populated by the
/// orchestrator: a vaulted card id plus customer id, a tokenized card id, or
/// raw card fields.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransactionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_id: Option<String>,
    #[serde(rename = "amt_tran")]
    pub amount: Decimal,
    #[serde(rename = "tran_currency")]
    pub currency_iso_code: u16,
    #[serde(rename = "amt_tax", skip_serializing_if = "Option::is_none")]
    pub tax_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    #[serde(rename = "exp_date", skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cvv2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cardholder_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avs_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avs_zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(rename = "tokenize", skip_serializing_if = "Option::is_none")]
    pub is_tokenize: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_email_receipt: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(rename = "line_items", skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<LineItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<GatewayCustomer>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TokenizeRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    #[serde(rename = "exp_date", skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cvv2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cardholder_name: Option<String>,
    #[serde(rename = "single_use", skip_serializing_if = "Option::is_none")]
    pub is_single_use: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CaptureRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer_id: Option<String>,
    #[serde(rename = "amt_tran")]
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VoidRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RefundRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer_id: Option<String>,
    #[serde(rename = "amt_tran")]
    pub amount: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionResponse {
    #[serde(rename = "rcode")]
    pub code: GatewayResponseCode,
    #[serde(rename = "rmsg", default)]
    pub message: String,
    #[serde(rename = "pg_id")]
    pub transaction_id: Option<String>,
    pub auth_code: Option<String>,
    #[serde(rename = "auth_avs_result")]
    pub avs_result: Option<String>,
    #[serde(rename = "auth_cvv2_result")]
    pub cvv2_result: Option<String>,
    /// Set when the gateway vaulted the card as part of the transaction.
    pub card_id: Option<String>,
    pub merchant_advice_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenizeResponse {
    #[serde(rename = "rcode")]
    pub code: GatewayResponseCode,
    #[serde(rename = "rmsg", default)]
    pub message: String,
    pub card_id: Option<String>,
    /// Masked card number echoed back by the gateway.
    pub card_number: Option<String>,
}
