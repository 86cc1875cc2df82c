mod common;

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use common::{canned, serve, texts, Seen};
use gatehouse::{
    api::{CheckoutError, PaymentError, PaymentMethodId, PaymentProcessor},
    model::Severity,
};
use parking_lot::Mutex;
use serde_json::json;

#[derive(Default)]
struct FakeProcessor {
    decline: bool,
    confirmations: Mutex<Vec<String>>,
    created: AtomicUsize,
}

#[async_trait]
impl PaymentProcessor for FakeProcessor {
    async fn create_payment_method(&self) -> Result<PaymentMethodId, PaymentError> {
        if self.decline {
            return Err(PaymentError::new("Your card was declined."));
        }
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(PaymentMethodId("pm_123".into()))
    }

    async fn confirm_card_payment(&self, client_secret: &str) -> Result<(), PaymentError> {
        self.confirmations.lock().push(client_secret.to_string());
        Ok(())
    }
}

#[tokio::test]
async fn subscribes_without_extra_authentication() {
    let seen = Seen::default();
    let url = serve(Router::new().route(
        "/subscribe/price_basic/",
        canned(&seen, 200, json!({"data": {"checkout_session_id": "cs_1"}})),
    ));
    let state = common::app(&url);
    let processor = FakeProcessor::default();

    let outcome = state
        .subscriptions
        .subscribe("price_basic", &processor)
        .await
        .expect("subscribes");

    assert_eq!(outcome.checkout_session_id.as_deref(), Some("cs_1"));
    assert!(!outcome.authenticated_payment);
    assert!(processor.confirmations.lock().is_empty());
    assert_eq!(
        seen.hits()[0].body,
        json!({"plan_id": "price_basic", "payment_method_id": "pm_123"})
    );
    assert_eq!(
        texts(&state),
        vec![(Severity::Success, "Subscription created.".to_string())]
    );
}

#[tokio::test]
async fn confirms_the_card_when_the_backend_asks() {
    let seen = Seen::default();
    let url = serve(Router::new().route(
        "/subscribe/price_premium/",
        canned(
            &seen,
            200,
            json!({"requires_action": true, "client_secret": "pi_secret_42"}),
        ),
    ));
    let state = common::app(&url);
    let processor = FakeProcessor::default();

    let outcome = state
        .subscriptions
        .subscribe("price_premium", &processor)
        .await
        .expect("subscribes");

    assert!(outcome.authenticated_payment);
    assert_eq!(*processor.confirmations.lock(), vec!["pi_secret_42".to_string()]);
}

#[tokio::test]
async fn action_without_secret_is_rejected() {
    let seen = Seen::default();
    let url = serve(Router::new().route(
        "/subscribe/price_basic/",
        canned(&seen, 200, json!({"requires_action": true})),
    ));
    let state = common::app(&url);
    let processor = FakeProcessor::default();

    let err = state
        .subscriptions
        .subscribe("price_basic", &processor)
        .await
        .expect_err("no secret");

    assert!(matches!(err, CheckoutError::MissingClientSecret));
    assert!(processor.confirmations.lock().is_empty());
}

#[tokio::test]
async fn declined_card_never_reaches_the_backend() {
    let seen = Seen::default();
    let url = serve(Router::new().route(
        "/subscribe/price_basic/",
        canned(&seen, 200, json!({})),
    ));
    let state = common::app(&url);
    let processor = FakeProcessor {
        decline: true,
        ..FakeProcessor::default()
    };

    let err = state
        .subscriptions
        .subscribe("price_basic", &processor)
        .await
        .expect_err("declined");

    match err {
        CheckoutError::Payment(err) => assert_eq!(err.message, "Your card was declined."),
        other => panic!("expected a payment error, got {:?}", other),
    }
    assert_eq!(seen.count(), 0);
}

#[tokio::test]
async fn backend_rejection_is_reported() {
    let seen = Seen::default();
    let url = serve(Router::new().route(
        "/subscribe/price_basic/",
        canned(&seen, 402, json!({})),
    ));
    let state = common::app(&url);
    let processor = FakeProcessor::default();

    let err = state
        .subscriptions
        .subscribe("price_basic", &processor)
        .await
        .expect_err("rejected");

    assert!(matches!(err, CheckoutError::Api(_)));
    assert_eq!(processor.created.load(Ordering::SeqCst), 1);
    assert_eq!(
        texts(&state),
        vec![(Severity::Error, "Subscription failed.".to_string())]
    );
}

#[test]
fn plan_catalogue_follows_config() {
    let mut config = common::config("http://127.0.0.1:1/");
    config.plans.standard = "price_standard".into();

    let storage = std::sync::Arc::new(gatehouse::model::Database::in_memory().expect("opens"));
    let state = gatehouse::AppState::with_storage(config, storage, None).expect("builds");

    let names: Vec<_> = state.plans().iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["Basic", "Standard", "Premium"]);
    assert_eq!(state.plans()[1].id, "price_standard");
}
