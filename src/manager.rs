use crate::config::QualpaySettings;
use crate::domain::gateway::{
    CaptureRequest, GatewayResponseCode, RefundRequest, TokenizeRequest, TokenizeResponse,
    TransactionRequest, TransactionResponse, VoidRequest,
};
use crate::domain::platform::{
    BillingCard, BillingCardRequest, CancelSubscriptionRequest, CreateCustomerRequest,
    EmbeddedKey, PlatformResponse, PlatformResponseCode, Subscription, SubscriptionRequest,
    SubscriptionTransaction, VaultCustomer, Webhook,
};
use crate::endpoint::Endpoint;
use crate::transport::{HttpCall, QualpayTransport, TransportError};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Identifies this integration to the gateway on every request.
pub const DEVELOPER_ID: &str = "storefront-plugin";

#[derive(Debug, thiserror::Error)]
pub enum QualpayError {
    #[error("gateway not configured: {0}")]
    Config(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("payment gateway error: {code}. {message}")]
    Gateway {
        code: GatewayResponseCode,
        message: String,
    },
    #[error("platform error: {code}. {message}")]
    Platform {
        code: PlatformResponseCode,
        message: String,
    },
    #[error("payment data is invalid: {}", .0.join("; "))]
    Validation(Vec<String>),
}

/// Operations facade over the two gateway API families. One method per
/// business action; credentials are injected here, response codes are
/// interpreted here, and callers only ever see typed results.
#[derive(Clone)]
pub struct QualpayManager {
    settings: QualpaySettings,
    transport: Arc<dyn QualpayTransport>,
}

impl QualpayManager {
    pub fn new(settings: QualpaySettings, transport: Arc<dyn QualpayTransport>) -> Self {
        Self {
            settings,
            transport,
        }
    }

    /// The merchant id must parse as a positive integer before any request
    /// goes out; anything else is a configuration error, not a gateway one.
    fn merchant_id(&self) -> Result<i64, QualpayError> {
        self.settings
            .merchant_id
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| QualpayError::Config("merchant id is missing or invalid".to_string()))
    }

    async fn send<T: Serialize>(
        &self,
        endpoint: Endpoint,
        body: Option<&T>,
    ) -> Result<String, QualpayError> {
        let body = body
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| TransportError::Decode(e.to_string()))?;
        let reply = self
            .transport
            .execute(HttpCall { endpoint, body })
            .await?;
        Ok(reply.body)
    }

    /// Payment Gateway family call: returns the parsed reply, which still has
    /// to be checked for a non-success `rcode` by `expect_gateway_success`.
    async fn gateway_call<T: Serialize, R: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        body: &T,
    ) -> Result<R, QualpayError> {
        self.merchant_id()?;
        let raw = self.send(endpoint, Some(body)).await?;
        serde_json::from_str(&raw)
            .map_err(|e| QualpayError::from(TransportError::Decode(format!("{e}: {raw}"))))
    }

    /// Platform family call; `body` is `None` for GET endpoints.
    async fn platform_call<T: Serialize, D: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        body: Option<&T>,
    ) -> Result<PlatformResponse<D>, QualpayError> {
        self.merchant_id()?;
        let raw = self.send(endpoint, body).await?;
        let reply: PlatformResponse<D> = serde_json::from_str(&raw)
            .map_err(|e| QualpayError::from(TransportError::Decode(format!("{e}: {raw}"))))?;
        if !reply.code.is_success() {
            return Err(QualpayError::Platform {
                code: reply.code,
                message: reply.message.unwrap_or_default(),
            });
        }
        Ok(reply)
    }

    fn expect_gateway_success(
        code: GatewayResponseCode,
        message: &str,
    ) -> Result<(), QualpayError> {
        if code.is_success() {
            Ok(())
        } else {
            Err(QualpayError::Gateway {
                code,
                message: message.to_string(),
            })
        }
    }

    fn stamp_transaction(&self, request: &mut TransactionRequest) -> Result<(), QualpayError> {
        request.merchant_id = Some(self.merchant_id()?);
        request.developer_id = Some(DEVELOPER_ID.to_string());
        Ok(())
    }

    // --- Payment Gateway operations ---

    pub async fn authorize(
        &self,
        mut request: TransactionRequest,
    ) -> Result<TransactionResponse, QualpayError> {
        self.stamp_transaction(&mut request)?;
        let response: TransactionResponse =
            self.gateway_call(Endpoint::Authorize, &request).await?;
        Self::expect_gateway_success(response.code, &response.message)?;
        Ok(response)
    }

    pub async fn sale(
        &self,
        mut request: TransactionRequest,
    ) -> Result<TransactionResponse, QualpayError> {
        self.stamp_transaction(&mut request)?;
        let response: TransactionResponse = self.gateway_call(Endpoint::Sale, &request).await?;
        Self::expect_gateway_success(response.code, &response.message)?;
        Ok(response)
    }

    /// Zero-dollar account verification, used before vaulting a card outside
    /// of checkout.
    pub async fn verify(
        &self,
        mut request: TransactionRequest,
    ) -> Result<TransactionResponse, QualpayError> {
        self.stamp_transaction(&mut request)?;
        let response: TransactionResponse = self.gateway_call(Endpoint::Verify, &request).await?;
        Self::expect_gateway_success(response.code, &response.message)?;
        Ok(response)
    }

    pub async fn capture(
        &self,
        transaction_id: &str,
        amount: Decimal,
    ) -> Result<TransactionResponse, QualpayError> {
        let request = CaptureRequest {
            merchant_id: Some(self.merchant_id()?),
            developer_id: Some(DEVELOPER_ID.to_string()),
            amount: amount.round_dp(2),
        };
        let response: TransactionResponse = self
            .gateway_call(
                Endpoint::Capture {
                    transaction_id: transaction_id.to_string(),
                },
                &request,
            )
            .await?;
        Self::expect_gateway_success(response.code, &response.message)?;
        Ok(response)
    }

    pub async fn void_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<TransactionResponse, QualpayError> {
        let request = VoidRequest {
            merchant_id: Some(self.merchant_id()?),
            developer_id: Some(DEVELOPER_ID.to_string()),
        };
        let response: TransactionResponse = self
            .gateway_call(
                Endpoint::Void {
                    transaction_id: transaction_id.to_string(),
                },
                &request,
            )
            .await?;
        Self::expect_gateway_success(response.code, &response.message)?;
        Ok(response)
    }

    pub async fn refund(
        &self,
        transaction_id: &str,
        amount: Decimal,
    ) -> Result<TransactionResponse, QualpayError> {
        let request = RefundRequest {
            merchant_id: Some(self.merchant_id()?),
            developer_id: Some(DEVELOPER_ID.to_string()),
            amount: amount.round_dp(2),
        };
        let response: TransactionResponse = self
            .gateway_call(
                Endpoint::Refund {
                    transaction_id: transaction_id.to_string(),
                },
                &request,
            )
            .await?;
        Self::expect_gateway_success(response.code, &response.message)?;
        Ok(response)
    }

    /// Converts raw card data into a reusable card id.
    pub async fn tokenize_card(
        &self,
        mut request: TokenizeRequest,
    ) -> Result<String, QualpayError> {
        request.merchant_id = Some(self.merchant_id()?);
        request.developer_id = Some(DEVELOPER_ID.to_string());
        let response: TokenizeResponse = self.gateway_call(Endpoint::Tokenize, &request).await?;
        Self::expect_gateway_success(response.code, &response.message)?;
        response.card_id.ok_or_else(|| QualpayError::Gateway {
            code: GatewayResponseCode::TokenizationFailed,
            message: "tokenize reply carried no card id".to_string(),
        })
    }

    // --- Platform operations ---

    /// "Customer not yet vaulted" is an expected state, reported as `None`
    /// rather than an error. Every other non-success still fails.
    pub async fn get_customer(
        &self,
        customer_id: &str,
    ) -> Result<Option<VaultCustomer>, QualpayError> {
        let result = self
            .platform_call::<(), VaultCustomer>(
                Endpoint::GetCustomer {
                    customer_id: customer_id.to_string(),
                },
                None,
            )
            .await;
        match result {
            Ok(reply) => Ok(reply.data),
            Err(QualpayError::Platform {
                code: PlatformResponseCode::ResourceNotExists,
                ..
            }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<VaultCustomer, QualpayError> {
        let reply: PlatformResponse<VaultCustomer> = self
            .platform_call(Endpoint::CreateCustomer, Some(&request))
            .await?;
        reply.data.ok_or_else(|| QualpayError::Platform {
            code: PlatformResponseCode::InternalError,
            message: "vault reply carried no customer".to_string(),
        })
    }

    pub async fn get_customer_cards(
        &self,
        customer_id: &str,
    ) -> Result<Vec<BillingCard>, QualpayError> {
        let result = self
            .platform_call::<(), VaultCustomer>(
                Endpoint::GetCustomerCards {
                    customer_id: customer_id.to_string(),
                },
                None,
            )
            .await;
        match result {
            Ok(reply) => Ok(reply.data.map(|c| c.billing_cards).unwrap_or_default()),
            Err(QualpayError::Platform {
                code: PlatformResponseCode::ResourceNotExists,
                ..
            }) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    pub async fn create_customer_card(
        &self,
        request: BillingCardRequest,
    ) -> Result<(), QualpayError> {
        self.platform_call::<_, VaultCustomer>(
            Endpoint::CreateCustomerCard {
                customer_id: request.customer_id.clone(),
            },
            Some(&request),
        )
        .await?;
        Ok(())
    }

    pub async fn update_customer_card(
        &self,
        request: BillingCardRequest,
    ) -> Result<(), QualpayError> {
        self.platform_call::<_, VaultCustomer>(
            Endpoint::UpdateCustomerCard {
                customer_id: request.customer_id.clone(),
            },
            Some(&request),
        )
        .await?;
        Ok(())
    }

    pub async fn delete_customer_card(
        &self,
        customer_id: &str,
        card_id: &str,
    ) -> Result<(), QualpayError> {
        let request = BillingCardRequest {
            customer_id: customer_id.to_string(),
            card: BillingCard {
                card_id: Some(card_id.to_string()),
                ..Default::default()
            },
        };
        self.platform_call::<_, VaultCustomer>(
            Endpoint::DeleteCustomerCard {
                customer_id: customer_id.to_string(),
            },
            Some(&request),
        )
        .await?;
        Ok(())
    }

    /// Short-lived key for the hosted embedded-fields form.
    pub async fn get_transient_key(&self) -> Result<Option<EmbeddedKey>, QualpayError> {
        let reply: PlatformResponse<EmbeddedKey> = self
            .platform_call::<(), EmbeddedKey>(Endpoint::GetTransientKey, None)
            .await?;
        Ok(reply.data)
    }

    pub async fn get_webhook(&self, webhook_id: i64) -> Result<Option<Webhook>, QualpayError> {
        let reply: PlatformResponse<Webhook> = self
            .platform_call::<(), Webhook>(Endpoint::GetWebhook { webhook_id }, None)
            .await?;
        Ok(reply.data)
    }

    pub async fn create_webhook(&self, mut webhook: Webhook) -> Result<Webhook, QualpayError> {
        self.merchant_id()?;
        webhook.webhook_node = Some(self.settings.merchant_id.clone());
        let reply: PlatformResponse<Webhook> = self
            .platform_call(Endpoint::CreateWebhook, Some(&webhook))
            .await?;
        reply.data.ok_or_else(|| QualpayError::Platform {
            code: PlatformResponseCode::InternalError,
            message: "webhook reply carried no data".to_string(),
        })
    }

    /// Transactions are returned most recent first.
    pub async fn get_subscription_transactions(
        &self,
        subscription_id: i64,
    ) -> Result<Vec<SubscriptionTransaction>, QualpayError> {
        let reply: PlatformResponse<Vec<SubscriptionTransaction>> = self
            .platform_call::<(), Vec<SubscriptionTransaction>>(
                Endpoint::GetSubscriptionTransactions { subscription_id },
                None,
            )
            .await?;
        Ok(reply.data.unwrap_or_default())
    }

    pub async fn create_subscription(
        &self,
        mut request: SubscriptionRequest,
    ) -> Result<Subscription, QualpayError> {
        request.merchant_id = Some(self.merchant_id()?);
        let reply: PlatformResponse<Subscription> = self
            .platform_call(Endpoint::CreateSubscription, Some(&request))
            .await?;
        reply.data.ok_or_else(|| QualpayError::Platform {
            code: PlatformResponseCode::InternalError,
            message: "subscription reply carried no data".to_string(),
        })
    }

    pub async fn cancel_subscription(
        &self,
        customer_id: &str,
        subscription_id: i64,
    ) -> Result<Option<Subscription>, QualpayError> {
        let request = CancelSubscriptionRequest {
            merchant_id: Some(self.merchant_id()?),
            customer_id: Some(customer_id.to_string()),
        };
        let reply: PlatformResponse<Subscription> = self
            .platform_call(
                Endpoint::CancelSubscription { subscription_id },
                Some(&request),
            )
            .await?;
        Ok(reply.data)
    }
}
