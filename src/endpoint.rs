use reqwest::Method;

/// Every gateway operation as data: the variant carries its path parameters,
/// and a single match maps it to the fixed path template and HTTP verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Authorize,
    Sale,
    Verify,
    Tokenize,
    Capture { transaction_id: String },
    Void { transaction_id: String },
    Refund { transaction_id: String },
    GetCustomer { customer_id: String },
    CreateCustomer,
    GetCustomerCards { customer_id: String },
    CreateCustomerCard { customer_id: String },
    UpdateCustomerCard { customer_id: String },
    DeleteCustomerCard { customer_id: String },
    GetTransientKey,
    GetWebhook { webhook_id: i64 },
    CreateWebhook,
    CreateSubscription,
    CancelSubscription { subscription_id: i64 },
    GetSubscriptionTransactions { subscription_id: i64 },
}

impl Endpoint {
    pub fn path(&self) -> String {
        match self {
            Endpoint::Authorize => "pg/auth".to_string(),
            Endpoint::Sale => "pg/sale".to_string(),
            Endpoint::Verify => "pg/verify".to_string(),
            Endpoint::Tokenize => "pg/tokenize".to_string(),
            Endpoint::Capture { transaction_id } => format!("pg/capture/{transaction_id}"),
            Endpoint::Void { transaction_id } => format!("pg/void/{transaction_id}"),
            Endpoint::Refund { transaction_id } => format!("pg/refund/{transaction_id}"),
            Endpoint::GetCustomer { customer_id } => {
                format!("platform/vault/customer/{customer_id}")
            }
            Endpoint::CreateCustomer => "platform/vault/customer".to_string(),
            Endpoint::GetCustomerCards { customer_id }
            | Endpoint::CreateCustomerCard { customer_id }
            | Endpoint::UpdateCustomerCard { customer_id } => {
                format!("platform/vault/customer/{customer_id}/billing")
            }
            Endpoint::DeleteCustomerCard { customer_id } => {
                format!("platform/vault/customer/{customer_id}/billing/delete")
            }
            Endpoint::GetTransientKey => "platform/embedded".to_string(),
            Endpoint::GetWebhook { webhook_id } => format!("platform/webhook/{webhook_id}"),
            Endpoint::CreateWebhook => "platform/webhook".to_string(),
            Endpoint::CreateSubscription => "platform/subscription".to_string(),
            Endpoint::CancelSubscription { subscription_id } => {
                format!("platform/subscription/{subscription_id}/cancel")
            }
            Endpoint::GetSubscriptionTransactions { subscription_id } => {
                format!("platform/subscription/transactions/{subscription_id}")
            }
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Endpoint::GetCustomer { .. }
            | Endpoint::GetCustomerCards { .. }
            | Endpoint::GetTransientKey
            | Endpoint::GetWebhook { .. }
            | Endpoint::GetSubscriptionTransactions { .. } => Method::GET,
            Endpoint::UpdateCustomerCard { .. } | Endpoint::DeleteCustomerCard { .. } => {
                Method::PUT
            }
            _ => Method::POST,
        }
    }
}
