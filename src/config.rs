use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    Authorization,
    Sale,
}

#[derive(Clone)]
pub struct QualpaySettings {
    pub merchant_id: String,
    pub security_key: String,
    pub use_sandbox: bool,
    pub transaction_type: TransactionType,
    pub use_embedded_fields: bool,
    pub use_customer_vault: bool,
    pub use_recurring_billing: bool,
    pub webhook_id: Option<String>,
    pub webhook_secret: Option<String>,
    pub additional_fee: Decimal,
    pub additional_fee_percentage: bool,
    pub request_timeout_ms: u64,
}

impl QualpaySettings {
    pub fn from_env() -> Self {
        Self {
            merchant_id: std::env::var("QUALPAY_MERCHANT_ID").unwrap_or_default(),
            security_key: std::env::var("QUALPAY_SECURITY_KEY").unwrap_or_default(),
            use_sandbox: std::env::var("QUALPAY_USE_SANDBOX")
                .map(|v| v != "false")
                .unwrap_or(true),
            transaction_type: match std::env::var("QUALPAY_TRANSACTION_TYPE").as_deref() {
                Ok("authorization") => TransactionType::Authorization,
                _ => TransactionType::Sale,
            },
            use_embedded_fields: std::env::var("QUALPAY_USE_EMBEDDED_FIELDS")
                .map(|v| v == "true")
                .unwrap_or(false),
            use_customer_vault: std::env::var("QUALPAY_USE_CUSTOMER_VAULT")
                .map(|v| v == "true")
                .unwrap_or(false),
            use_recurring_billing: std::env::var("QUALPAY_USE_RECURRING_BILLING")
                .map(|v| v == "true")
                .unwrap_or(false),
            webhook_id: std::env::var("QUALPAY_WEBHOOK_ID").ok(),
            webhook_secret: std::env::var("QUALPAY_WEBHOOK_SECRET").ok(),
            additional_fee: std::env::var("QUALPAY_ADDITIONAL_FEE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            additional_fee_percentage: std::env::var("QUALPAY_ADDITIONAL_FEE_PERCENTAGE")
                .map(|v| v == "true")
                .unwrap_or(false),
            request_timeout_ms: std::env::var("QUALPAY_REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30_000),
        }
    }

    /// Payment method surcharge for a given order subtotal, either a fixed
    /// amount or a percentage of the subtotal per the merchant's settings.
    pub fn additional_fee_for(&self, subtotal: Decimal) -> Decimal {
        if self.additional_fee.is_zero() {
            return Decimal::ZERO;
        }
        let fee = if self.additional_fee_percentage {
            subtotal * self.additional_fee / Decimal::ONE_HUNDRED
        } else {
            self.additional_fee
        };
        fee.round_dp(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn settings(fee: Decimal, percentage: bool) -> QualpaySettings {
        QualpaySettings {
            merchant_id: "212000000001".to_string(),
            security_key: "key".to_string(),
            use_sandbox: true,
            transaction_type: TransactionType::Sale,
            use_embedded_fields: false,
            use_customer_vault: false,
            use_recurring_billing: false,
            webhook_id: None,
            webhook_secret: None,
            additional_fee: fee,
            additional_fee_percentage: percentage,
            request_timeout_ms: 30_000,
        }
    }

    #[test]
    fn fixed_fee_ignores_subtotal() {
        let s = settings(dec!(1.50), false);
        assert_eq!(s.additional_fee_for(dec!(200.00)), dec!(1.50));
    }

    #[test]
    fn percentage_fee_scales_with_subtotal() {
        let s = settings(dec!(2.5), true);
        assert_eq!(s.additional_fee_for(dec!(200.00)), dec!(5.00));
    }

    #[test]
    fn zero_fee_yields_zero() {
        let s = settings(Decimal::ZERO, true);
        assert_eq!(s.additional_fee_for(dec!(99.99)), Decimal::ZERO);
    }
}
