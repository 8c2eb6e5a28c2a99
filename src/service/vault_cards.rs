use crate::config::QualpaySettings;
use crate::domain::gateway::{GatewayResponseCode, TransactionRequest, USD_NUMERIC_ISO_CODE};
use crate::domain::platform::{
    BillingCard, BillingCardRequest, CreateCustomerRequest, VaultCustomer,
};
use crate::host::{CustomerProfile, RawCard};
use crate::manager::{QualpayError, QualpayManager};
use crate::service::card_checks::validate_card;

/// Customer vault card management, driven from the storefront's account
/// area. Card numbers never touch host storage: raw input is tokenized at
/// the gateway and only the returned card id is kept.
pub struct VaultCards {
    pub settings: QualpaySettings,
    pub manager: QualpayManager,
}

impl VaultCards {
    fn ensure_enabled(&self) -> Result<(), QualpayError> {
        if self.settings.use_customer_vault {
            Ok(())
        } else {
            Err(QualpayError::Config(
                "customer vault is not enabled".to_string(),
            ))
        }
    }

    /// Fetches the customer's vault record, creating it on first use.
    pub async fn ensure_customer(
        &self,
        customer: &CustomerProfile,
    ) -> Result<VaultCustomer, QualpayError> {
        self.ensure_enabled()?;
        if let Some(existing) = self.manager.get_customer(&customer.customer_id).await? {
            return Ok(existing);
        }
        self.manager
            .create_customer(CreateCustomerRequest {
                customer: VaultCustomer {
                    customer_id: Some(customer.customer_id.clone()),
                    email: customer.email.clone(),
                    first_name: customer.first_name.clone(),
                    last_name: customer.last_name.clone(),
                    company: customer.company.clone(),
                    phone: customer.phone.clone(),
                    billing_cards: Vec::new(),
                },
                auto_generate_id: Some(false),
            })
            .await
    }

    pub async fn list_cards(&self, customer_id: &str) -> Result<Vec<BillingCard>, QualpayError> {
        self.ensure_enabled()?;
        self.manager.get_customer_cards(customer_id).await
    }

    /// Runs a zero-dollar issuer verification that tokenizes the submitted
    /// card, then attaches the returned card id to the customer's vault
    /// record.
    pub async fn add_card(
        &self,
        customer: &CustomerProfile,
        card: &RawCard,
        make_primary: bool,
    ) -> Result<String, QualpayError> {
        self.ensure_enabled()?;
        let errors = validate_card(card);
        if !errors.is_empty() {
            return Err(QualpayError::Validation(errors));
        }
        self.ensure_customer(customer).await?;

        let verified = self
            .manager
            .verify(TransactionRequest {
                currency_iso_code: USD_NUMERIC_ISO_CODE,
                card_number: Some(card.number.clone()),
                expiration_date: Some(format!("{:02}{:02}", card.expire_month, card.expire_year % 100)),
                cvv2: Some(card.cvv2.clone()),
                cardholder_name: Some(card.cardholder_name.clone()),
                avs_zip: customer
                    .billing_address
                    .as_ref()
                    .and_then(|a| a.zip.clone()),
                is_tokenize: Some(true),
                ..Default::default()
            })
            .await?;
        let card_id = verified.card_id.ok_or_else(|| QualpayError::Gateway {
            code: GatewayResponseCode::TokenizationFailed,
            message: "verification returned no card id".to_string(),
        })?;

        self.manager
            .create_customer_card(BillingCardRequest {
                customer_id: customer.customer_id.clone(),
                card: BillingCard {
                    card_id: Some(card_id.clone()),
                    first_name: customer.first_name.clone(),
                    last_name: customer.last_name.clone(),
                    zip: customer
                        .billing_address
                        .as_ref()
                        .and_then(|a| a.zip.clone()),
                    verify: Some(true),
                    is_primary: make_primary.then_some(true),
                    ..Default::default()
                },
            })
            .await?;
        Ok(card_id)
    }

    /// Flags one card as the default; the gateway clears the flag from any
    /// other card on the record.
    pub async fn set_primary_card(
        &self,
        customer_id: &str,
        card_id: &str,
    ) -> Result<(), QualpayError> {
        self.ensure_enabled()?;
        self.manager
            .update_customer_card(BillingCardRequest {
                customer_id: customer_id.to_string(),
                card: BillingCard {
                    card_id: Some(card_id.to_string()),
                    is_primary: Some(true),
                    ..Default::default()
                },
            })
            .await
    }

    pub async fn remove_card(
        &self,
        customer_id: &str,
        card_id: &str,
    ) -> Result<(), QualpayError> {
        self.ensure_enabled()?;
        self.manager.delete_customer_card(customer_id, card_id).await
    }
}
