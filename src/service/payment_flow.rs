use crate::config::{QualpaySettings, TransactionType};
use crate::domain::gateway::{
    GatewayCustomer, ShippingAddress, TokenizeRequest, TransactionRequest, TransactionResponse,
    USD_NUMERIC_ISO_CODE,
};
use crate::domain::platform::{
    BillingCard, BillingCardRequest, CreateCustomerRequest, SubscriptionRequest,
    SubscriptionStatus, VaultCustomer,
};
use crate::host::{
    Cart, CardSource, CustomerProfile, OrderRecord, PaymentData, PaymentStatus, RawCard,
    RecurringCycle,
};
use crate::manager::{QualpayError, QualpayManager};
use crate::service::card_checks::validate_card;
use crate::service::line_items::build_line_items;
use crate::service::recurring::normalize_cycle;
use rust_decimal::Decimal;

const MAX_PURCHASE_ID_LEN: usize = 25;
const MAX_AVS_ADDRESS_LEN: usize = 20;

#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub authorization_code: Option<String>,
    pub avs_result: Option<String>,
    pub cvv2_result: Option<String>,
    pub message: String,
    /// Card id the gateway vaulted during the transaction, when the customer
    /// opted to save the card.
    pub saved_card_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RecurringOutcome {
    pub subscription_id: i64,
    /// Outcome of the setup charge when the gateway booked it at creation.
    pub first_transaction: Option<TransactionResponse>,
}

/// Decision logic behind the host's payment-processing contract. Builds the
/// itemized transaction, resolves which card reference to charge, and drives
/// the operations facade. Holds no mutable state; every call stands alone.
pub struct PaymentFlow {
    pub settings: QualpaySettings,
    pub manager: QualpayManager,
}

impl PaymentFlow {
    pub async fn process_payment(
        &self,
        customer: &CustomerProfile,
        cart: &Cart,
        payment: &PaymentData,
        store_currency: &str,
    ) -> Result<PaymentOutcome, QualpayError> {
        ensure_usd(store_currency)?;

        let subtotal: Decimal = cart
            .lines
            .iter()
            .map(|line| line.unit_price * Decimal::from(line.quantity))
            .sum();
        let surcharge = self.settings.additional_fee_for(subtotal);
        let breakdown = build_line_items(cart, payment.order_total, surcharge);

        let billing_email = customer
            .billing_address
            .as_ref()
            .and_then(|a| a.email.clone())
            .or_else(|| customer.email.clone());

        let mut request = TransactionRequest {
            purchase_id: Some(truncate(&payment.order_id.to_string(), MAX_PURCHASE_ID_LEN)),
            amount: payment.order_total.round_dp(2),
            currency_iso_code: USD_NUMERIC_ISO_CODE,
            tax_amount: Some(breakdown.tax_amount),
            send_email_receipt: Some(billing_email.is_some()),
            customer_email: billing_email,
            items: breakdown.items,
            ..Default::default()
        };

        self.attach_card_source(&mut request, customer, payment)
            .await?;

        let response = match self.settings.transaction_type {
            TransactionType::Authorization => self.manager.authorize(request).await?,
            TransactionType::Sale => self.manager.sale(request).await?,
        };

        let saved_card_id = if payment.save_card && self.settings.use_customer_vault {
            self.vault_transaction_card(customer, &response).await
        } else {
            None
        };

        Ok(PaymentOutcome {
            status: match self.settings.transaction_type {
                TransactionType::Authorization => PaymentStatus::Authorized,
                TransactionType::Sale => PaymentStatus::Paid,
            },
            transaction_id: response.transaction_id,
            authorization_code: response.auth_code,
            avs_result: response.avs_result,
            cvv2_result: response.cvv2_result,
            message: response.message,
            saved_card_id,
        })
    }

    /// Sets exactly one card reference on the outgoing request, in priority
    /// order: a vaulted card chosen by the customer, a client-side token
    /// from embedded fields, or the raw card data itself.
    async fn attach_card_source(
        &self,
        request: &mut TransactionRequest,
        customer: &CustomerProfile,
        payment: &PaymentData,
    ) -> Result<(), QualpayError> {
        match &payment.card {
            CardSource::Stored { card_id } => {
                // A stale saved-card id must fail loudly, not fall through to
                // some other card.
                let cards = self.manager.get_customer_cards(&customer.customer_id).await?;
                let exists = cards
                    .iter()
                    .any(|card| card.card_id.as_deref() == Some(card_id.as_str()));
                if !exists {
                    return Err(QualpayError::Validation(vec![
                        "the selected saved card is no longer available".to_string(),
                    ]));
                }
                request.card_id = Some(card_id.clone());
                request.customer_id = Some(customer.customer_id.clone());
            }
            CardSource::Tokenized { card_id } => {
                request.card_id = Some(card_id.clone());
            }
            CardSource::Raw(card) => {
                let errors = validate_card(card);
                if !errors.is_empty() {
                    return Err(QualpayError::Validation(errors));
                }
                request.cardholder_name = Some(card.cardholder_name.clone());
                request.card_number = Some(card.number.clone());
                request.cvv2 = Some(card.cvv2.clone());
                request.expiration_date = Some(expiration(card));
                if let Some(billing) = &customer.billing_address {
                    request.avs_address = billing
                        .address1
                        .as_deref()
                        .map(|a| truncate(a, MAX_AVS_ADDRESS_LEN));
                    request.avs_zip = billing.zip.clone();
                }

                if payment.save_card && self.settings.use_customer_vault {
                    request.is_tokenize = Some(true);
                    // A first-time vault customer is created inline with the
                    // transaction.
                    if self.manager.get_customer(&customer.customer_id).await?.is_none() {
                        request.customer_id = Some(customer.customer_id.clone());
                        request.customer = Some(gateway_customer(customer));
                    }
                }
            }
        }
        Ok(())
    }

    /// Attaches a card the gateway tokenized mid-transaction to the
    /// customer's vault record. A failure here must not unwind an already
    /// charged payment, so it is logged and dropped.
    async fn vault_transaction_card(
        &self,
        customer: &CustomerProfile,
        response: &TransactionResponse,
    ) -> Option<String> {
        let card_id = response.card_id.clone()?;
        let result = self
            .manager
            .create_customer_card(BillingCardRequest {
                customer_id: customer.customer_id.clone(),
                card: BillingCard {
                    card_id: Some(card_id.clone()),
                    zip: customer
                        .billing_address
                        .as_ref()
                        .and_then(|a| a.zip.clone()),
                    verify: Some(true),
                    ..Default::default()
                },
            })
            .await;
        if let Err(e) = result {
            tracing::warn!(customer_id = %customer.customer_id, error = %e, "failed to save tokenized card to vault");
        }
        Some(card_id)
    }

    pub async fn capture(
        &self,
        order: &OrderRecord,
        amount: Decimal,
    ) -> Result<PaymentOutcome, QualpayError> {
        let transaction_id = order.authorization_transaction_id.as_deref().ok_or_else(|| {
            QualpayError::Validation(vec![
                "order has no authorized transaction to capture".to_string(),
            ])
        })?;
        let response = self.manager.capture(transaction_id, amount).await?;
        Ok(settled_outcome(PaymentStatus::Paid, response))
    }

    pub async fn refund(
        &self,
        order: &OrderRecord,
        amount: Decimal,
    ) -> Result<PaymentOutcome, QualpayError> {
        let transaction_id = order.capture_transaction_id.as_deref().ok_or_else(|| {
            QualpayError::Validation(vec![
                "order has no captured transaction to refund".to_string(),
            ])
        })?;
        let response = self.manager.refund(transaction_id, amount).await?;
        let status = if amount < order.order_total {
            PaymentStatus::PartiallyRefunded
        } else {
            PaymentStatus::Refunded
        };
        Ok(settled_outcome(status, response))
    }

    pub async fn void_payment(&self, order: &OrderRecord) -> Result<PaymentOutcome, QualpayError> {
        let transaction_id = order.authorization_transaction_id.as_deref().ok_or_else(|| {
            QualpayError::Validation(vec![
                "order has no authorized transaction to void".to_string(),
            ])
        })?;
        let response = self.manager.void_transaction(transaction_id).await?;
        Ok(settled_outcome(PaymentStatus::Voided, response))
    }

    /// Books a gateway-side subscription for a recurring order. The first
    /// cycle is charged as the setup amount at creation time; later cycles
    /// arrive through webhooks.
    pub async fn process_recurring(
        &self,
        customer: &CustomerProfile,
        payment: &PaymentData,
        cycle: &RecurringCycle,
        store_currency: &str,
    ) -> Result<RecurringOutcome, QualpayError> {
        ensure_usd(store_currency)?;
        if !self.settings.use_recurring_billing {
            return Err(QualpayError::Config(
                "recurring billing is not enabled".to_string(),
            ));
        }
        if customer.is_guest {
            return Err(QualpayError::Config(
                "recurring billing requires a registered customer".to_string(),
            ));
        }

        let schedule = normalize_cycle(cycle, chrono::Utc::now())
            .map_err(QualpayError::Config)?;

        let vaulted = match self.manager.get_customer(&customer.customer_id).await? {
            Some(existing) => existing,
            None => {
                self.manager
                    .create_customer(CreateCustomerRequest {
                        customer: vault_customer(customer),
                        auto_generate_id: Some(false),
                    })
                    .await?
            }
        };
        self.ensure_vault_card(customer, &vaulted, payment).await?;

        let amount = payment.order_total.round_dp(2);
        let subscription = self
            .manager
            .create_subscription(SubscriptionRequest {
                customer_id: Some(customer.customer_id.clone()),
                customer_first_name: customer.first_name.clone(),
                customer_last_name: customer.last_name.clone(),
                currency_iso_code: USD_NUMERIC_ISO_CODE,
                date_start: Some(schedule.start_date.format("%Y-%m-%d").to_string()),
                // Carries the originating order id so webhook deliveries can
                // be correlated back to it.
                plan_description: Some(payment.order_id.to_string()),
                plan_frequency: Some(schedule.frequency),
                interval: schedule.interval,
                plan_duration: schedule.duration,
                setup_amount: Some(amount),
                recurring_amount: Some(amount),
                status: Some(SubscriptionStatus::Active),
                is_subscription_on_plan: Some(false),
                ..Default::default()
            })
            .await?;

        let subscription_id = subscription.subscription_id.ok_or_else(|| {
            QualpayError::Config("gateway did not return a subscription id".to_string())
        })?;

        Ok(RecurringOutcome {
            subscription_id,
            first_transaction: subscription.transaction_response,
        })
    }

    /// Recurring charges draw on the customer's vaulted card. When the vault
    /// record has none yet, tokenize and attach the submitted card first.
    async fn ensure_vault_card(
        &self,
        customer: &CustomerProfile,
        vaulted: &VaultCustomer,
        payment: &PaymentData,
    ) -> Result<(), QualpayError> {
        if !vaulted.billing_cards.is_empty() {
            return Ok(());
        }
        let card_id = match &payment.card {
            CardSource::Stored { card_id } | CardSource::Tokenized { card_id } => card_id.clone(),
            CardSource::Raw(card) => {
                let errors = validate_card(card);
                if !errors.is_empty() {
                    return Err(QualpayError::Validation(errors));
                }
                self.manager
                    .tokenize_card(TokenizeRequest {
                        card_number: Some(card.number.clone()),
                        expiration_date: Some(expiration(card)),
                        cvv2: Some(card.cvv2.clone()),
                        cardholder_name: Some(card.cardholder_name.clone()),
                        is_single_use: Some(false),
                        ..Default::default()
                    })
                    .await?
            }
        };
        self.manager
            .create_customer_card(BillingCardRequest {
                customer_id: customer.customer_id.clone(),
                card: BillingCard {
                    card_id: Some(card_id),
                    zip: customer
                        .billing_address
                        .as_ref()
                        .and_then(|a| a.zip.clone()),
                    verify: Some(true),
                    is_primary: Some(true),
                    ..Default::default()
                },
            })
            .await
    }

    pub async fn cancel_recurring(&self, order: &OrderRecord) -> Result<(), QualpayError> {
        let subscription_id = order.subscription_id.ok_or_else(|| {
            QualpayError::Validation(vec!["order has no subscription to cancel".to_string()])
        })?;
        let cancelled = self
            .manager
            .cancel_subscription(&order.customer_id, subscription_id)
            .await?;
        match cancelled {
            Some(subscription)
                if subscription.status != Some(SubscriptionStatus::Active) =>
            {
                Ok(())
            }
            _ => Err(QualpayError::Config(
                "gateway did not confirm subscription cancellation".to_string(),
            )),
        }
    }
}

fn settled_outcome(status: PaymentStatus, response: TransactionResponse) -> PaymentOutcome {
    PaymentOutcome {
        status,
        transaction_id: response.transaction_id,
        authorization_code: response.auth_code,
        avs_result: response.avs_result,
        cvv2_result: response.cvv2_result,
        message: response.message,
        saved_card_id: None,
    }
}

fn ensure_usd(store_currency: &str) -> Result<(), QualpayError> {
    if store_currency.eq_ignore_ascii_case("USD") {
        Ok(())
    } else {
        Err(QualpayError::Config(format!(
            "the gateway settles in USD only; the store's primary currency is {store_currency}"
        )))
    }
}

/// MMYY, the gateway's expiry wire format.
fn expiration(card: &RawCard) -> String {
    format!("{:02}{:02}", card.expire_month, card.expire_year % 100)
}

fn truncate(value: &str, max_len: usize) -> String {
    value.chars().take(max_len).collect()
}

fn gateway_customer(customer: &CustomerProfile) -> GatewayCustomer {
    let billing = customer.billing_address.as_ref();
    GatewayCustomer {
        email: customer.email.clone(),
        first_name: customer.first_name.clone(),
        last_name: customer.last_name.clone(),
        company: customer.company.clone(),
        phone: customer.phone.clone(),
        billing_address1: billing.and_then(|a| a.address1.clone()),
        billing_address2: billing.and_then(|a| a.address2.clone()),
        billing_city: billing.and_then(|a| a.city.clone()),
        billing_state_code: billing.and_then(|a| a.state_code.clone()),
        billing_country: billing.and_then(|a| a.country_code.clone()),
        billing_zip: billing.and_then(|a| a.zip.clone()),
        shipping_addresses: customer
            .shipping_address
            .as_ref()
            .map(|shipping| {
                vec![ShippingAddress {
                    first_name: shipping.first_name.clone(),
                    last_name: shipping.last_name.clone(),
                    company: shipping.company.clone(),
                    address1: shipping.address1.clone(),
                    address2: shipping.address2.clone(),
                    city: shipping.city.clone(),
                    state_code: shipping.state_code.clone(),
                    country: shipping.country_code.clone(),
                    zip: shipping.zip.clone(),
                    primary: Some(true),
                }]
            })
            .unwrap_or_default(),
    }
}

fn vault_customer(customer: &CustomerProfile) -> VaultCustomer {
    VaultCustomer {
        customer_id: Some(customer.customer_id.clone()),
        email: customer.email.clone(),
        first_name: customer.first_name.clone(),
        last_name: customer.last_name.clone(),
        company: customer.company.clone(),
        phone: customer.phone.clone(),
        billing_cards: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiration_uses_two_digit_month_and_year() {
        let card = RawCard {
            cardholder_name: "Jo".to_string(),
            number: "4111111111111111".to_string(),
            expire_month: 3,
            expire_year: 2031,
            cvv2: "123".to_string(),
        };
        assert_eq!(expiration(&card), "0331");
    }

    #[test]
    fn non_usd_store_is_rejected() {
        let err = ensure_usd("EUR").unwrap_err();
        assert!(matches!(err, QualpayError::Config(_)));
        assert!(ensure_usd("usd").is_ok());
    }
}
