mod support;

use chrono::{Datelike, Utc};
use qualpay_gateway::endpoint::Endpoint;
use qualpay_gateway::host::{
    Address, CardSource, CustomerProfile, CyclePeriod, OrderRecord, PaymentData, RawCard,
    RecurringCycle,
};
use qualpay_gateway::manager::{QualpayError, QualpayManager};
use qualpay_gateway::service::payment_flow::PaymentFlow;
use rust_decimal_macros::dec;
use serde_json::json;
use std::sync::Arc;
use support::MockTransport;
use uuid::Uuid;

fn recurring_flow(transport: Arc<MockTransport>) -> PaymentFlow {
    let mut settings = support::settings();
    settings.use_recurring_billing = true;
    settings.use_customer_vault = true;
    PaymentFlow {
        settings: settings.clone(),
        manager: QualpayManager::new(settings, transport),
    }
}

fn member() -> CustomerProfile {
    CustomerProfile {
        customer_id: "42".to_string(),
        email: Some("jo@example.com".to_string()),
        first_name: Some("Jo".to_string()),
        last_name: Some("Shopper".to_string()),
        is_guest: false,
        billing_address: Some(Address {
            zip: Some("98101".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn subscription_payment(order_id: Uuid) -> PaymentData {
    PaymentData {
        order_id,
        order_total: dec!(29.99),
        card: CardSource::Raw(RawCard {
            cardholder_name: "Jo Shopper".to_string(),
            number: "4111111111111111".to_string(),
            expire_month: 12,
            expire_year: 2031,
            cvv2: "123".to_string(),
        }),
        save_card: false,
    }
}

fn cycle(period: CyclePeriod, length: i32) -> RecurringCycle {
    RecurringCycle {
        period,
        length,
        total_cycles: Some(12),
    }
}

fn vaulted_customer_reply() -> serde_json::Value {
    json!({
        "code": 0,
        "message": "Success",
        "data": {
            "customer_id": "42",
            "billing_cards": [{"card_id": "card_7", "primary": true}]
        }
    })
}

#[tokio::test]
async fn twelve_month_cycle_books_an_annual_subscription() {
    let transport = MockTransport::new();
    let flow = recurring_flow(transport.clone());
    let order_id = Uuid::new_v4();

    transport.enqueue(200, vaulted_customer_reply());
    transport.enqueue(
        200,
        json!({
            "code": 0,
            "message": "Success",
            "data": {
                "subscription_id": 5001,
                "status": "A",
                "response": {"rcode": "000", "rmsg": "Success", "pg_id": "pg_setup_1"}
            }
        }),
    );

    let outcome = flow
        .process_recurring(
            &member(),
            &subscription_payment(order_id),
            &cycle(CyclePeriod::Months, 12),
            "USD",
        )
        .await
        .unwrap();

    assert_eq!(outcome.subscription_id, 5001);
    assert_eq!(
        outcome
            .first_transaction
            .unwrap()
            .transaction_id
            .as_deref(),
        Some("pg_setup_1")
    );

    assert_eq!(transport.call(1).endpoint, Endpoint::CreateSubscription);
    let body = transport.call(1).body.unwrap();
    assert_eq!(body["plan_frequency"], 6);
    assert!(body.get("interval").is_none());
    assert_eq!(body["plan_desc"], order_id.to_string());
    assert_eq!(body["amt_setup"], body["recur_amt"]);
    assert_eq!(body["plan_duration"], 11);
    assert_eq!(body["status"], "A");
    // First charge lands one cycle out.
    let next_year = Utc::now().year() + 1;
    assert!(body["date_start"]
        .as_str()
        .unwrap()
        .starts_with(&next_year.to_string()));
}

#[tokio::test]
async fn ten_day_cycle_fails_validation_before_any_call() {
    let transport = MockTransport::new();
    let flow = recurring_flow(transport.clone());

    let err = flow
        .process_recurring(
            &member(),
            &subscription_payment(Uuid::new_v4()),
            &cycle(CyclePeriod::Days, 10),
            "USD",
        )
        .await
        .unwrap_err();

    assert!(matches!(err, QualpayError::Config(_)));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn guests_cannot_start_recurring_billing() {
    let transport = MockTransport::new();
    let flow = recurring_flow(transport.clone());
    let mut guest = member();
    guest.is_guest = true;

    let err = flow
        .process_recurring(
            &guest,
            &subscription_payment(Uuid::new_v4()),
            &cycle(CyclePeriod::Months, 1),
            "USD",
        )
        .await
        .unwrap_err();

    assert!(matches!(err, QualpayError::Config(_)));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn recurring_billing_must_be_enabled() {
    let transport = MockTransport::new();
    let flow = PaymentFlow {
        settings: support::settings(),
        manager: QualpayManager::new(support::settings(), transport.clone()),
    };

    let err = flow
        .process_recurring(
            &member(),
            &subscription_payment(Uuid::new_v4()),
            &cycle(CyclePeriod::Months, 1),
            "USD",
        )
        .await
        .unwrap_err();

    assert!(matches!(err, QualpayError::Config(_)));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn unvaulted_customer_is_created_and_card_attached_first() {
    let transport = MockTransport::new();
    let flow = recurring_flow(transport.clone());

    // Not vaulted yet.
    transport.enqueue(200, json!({"code": 7, "message": "Resource does not exist"}));
    // Vault customer created, still without a card.
    transport.enqueue(
        200,
        json!({"code": 0, "message": "Success", "data": {"customer_id": "42"}}),
    );
    // Card tokenized, then attached as the primary vault card.
    transport.enqueue(200, json!({"rcode": "000", "rmsg": "Success", "card_id": "tok_9"}));
    transport.enqueue(
        200,
        json!({"code": 0, "message": "Success", "data": {"customer_id": "42"}}),
    );
    transport.enqueue(
        200,
        json!({"code": 0, "message": "Success", "data": {"subscription_id": 7001, "status": "A"}}),
    );

    let outcome = flow
        .process_recurring(
            &member(),
            &subscription_payment(Uuid::new_v4()),
            &cycle(CyclePeriod::Weeks, 2),
            "USD",
        )
        .await
        .unwrap();

    assert_eq!(outcome.subscription_id, 7001);
    assert_eq!(
        transport.call(0).endpoint,
        Endpoint::GetCustomer {
            customer_id: "42".to_string()
        }
    );
    assert_eq!(transport.call(1).endpoint, Endpoint::CreateCustomer);
    assert_eq!(transport.call(2).endpoint, Endpoint::Tokenize);
    assert_eq!(
        transport.call(3).endpoint,
        Endpoint::CreateCustomerCard {
            customer_id: "42".to_string()
        }
    );
    let card_body = transport.call(3).body.unwrap();
    assert_eq!(card_body["card_id"], "tok_9");
    assert_eq!(card_body["primary"], true);

    let sub_body = transport.call(4).body.unwrap();
    assert_eq!(sub_body["plan_frequency"], 1);
}

#[tokio::test]
async fn cancel_reports_failure_when_subscription_stays_active() {
    let transport = MockTransport::new();
    let flow = recurring_flow(transport.clone());
    let order = OrderRecord {
        order_id: Uuid::new_v4(),
        customer_id: "42".to_string(),
        order_total: dec!(29.99),
        authorization_transaction_id: None,
        capture_transaction_id: None,
        subscription_id: Some(5001),
    };

    transport.enqueue(
        200,
        json!({"code": 0, "message": "Success", "data": {"subscription_id": 5001, "status": "C"}}),
    );
    flow.cancel_recurring(&order).await.unwrap();
    assert_eq!(
        transport.call(0).endpoint,
        Endpoint::CancelSubscription { subscription_id: 5001 }
    );

    transport.enqueue(
        200,
        json!({"code": 0, "message": "Success", "data": {"subscription_id": 5001, "status": "A"}}),
    );
    let err = flow.cancel_recurring(&order).await.unwrap_err();
    assert!(matches!(err, QualpayError::Config(_)));
}
