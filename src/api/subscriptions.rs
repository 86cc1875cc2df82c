use async_trait::async_trait;
use log::{debug, info};
use serde_json::json;

use crate::config::PlanIds;

use super::{
    error::ApiError,
    request::{ApiRequest, CallOptions},
    routes, Gateway,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plan {
    /// The payment processor's price id.
    pub id: String,
    pub name: &'static str,
    pub description: &'static str,
    pub price_cents: u64,
    pub features: Vec<&'static str>,
}

pub fn plans(ids: &PlanIds) -> Vec<Plan> {
    let features = |n: usize| -> Vec<&'static str> {
        [
            "Feature 1",
            "Feature 2",
            "Feature 3",
            "Feature 4",
            "Feature 5",
            "Feature 6",
            "Feature 7",
        ][..n]
            .to_vec()
    };

    vec![
        Plan {
            id: ids.basic.clone(),
            name: "Basic",
            description: "Great for starters",
            price_cents: 55_000,
            features: features(3),
        },
        Plan {
            id: ids.standard.clone(),
            name: "Standard",
            description: "Perfect for professionals",
            price_cents: 85_000,
            features: features(5),
        },
        Plan {
            id: ids.premium.clone(),
            name: "Premium",
            description: "For large organizations",
            price_cents: 150_000,
            features: features(7),
        },
    ]
}

/// Reference to card details tokenized by the payment processor.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct PaymentMethodId(pub String);

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct PaymentError {
    pub message: String,
}

impl PaymentError {
    pub fn new(message: impl Into<String>) -> PaymentError {
        PaymentError {
            message: message.into(),
        }
    }
}

/// The hosted payment SDK: card entry, tokenization, and the extra
/// authentication step some cards need.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn create_payment_method(&self) -> Result<PaymentMethodId, PaymentError>;

    async fn confirm_card_payment(&self, client_secret: &str) -> Result<(), PaymentError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("payment failed: {0}")]
    Payment(#[from] PaymentError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("unexpected response from server: {0}")]
    UnexpectedResponse(#[from] serde_json::Error),
    #[error("server asked for card authentication without a client secret")]
    MissingClientSecret,
}

#[derive(Debug, Default, serde::Deserialize)]
struct SubscribePayload {
    #[serde(default)]
    requires_action: bool,
    #[serde(default)]
    client_secret: Option<String>,
    #[serde(default)]
    checkout_session_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscriptionOutcome {
    pub checkout_session_id: Option<String>,
    /// The card needed, and passed, the extra authentication step.
    pub authenticated_payment: bool,
}

#[derive(Clone)]
pub struct SubscriptionClient {
    gateway: Gateway,
}

impl SubscriptionClient {
    pub fn new(gateway: Gateway) -> SubscriptionClient {
        SubscriptionClient { gateway }
    }

    pub async fn subscribe(
        &self,
        plan_id: &str,
        processor: &dyn PaymentProcessor,
    ) -> Result<SubscriptionOutcome, CheckoutError> {
        let payment_method = processor.create_payment_method().await?;
        debug!("Subscribing to plan {}", plan_id);

        let response = self
            .gateway
            .call(
                ApiRequest::post(
                    routes::subscribe(plan_id),
                    json!({ "plan_id": plan_id, "payment_method_id": payment_method }),
                ),
                CallOptions::default()
                    .success_message("Subscription created.")
                    .error_message("Subscription failed."),
            )
            .await?;

        let payload: SubscribePayload = if response.payload().is_object() {
            response.json()?
        } else {
            SubscribePayload::default()
        };

        let mut outcome = SubscriptionOutcome {
            checkout_session_id: payload.checkout_session_id,
            authenticated_payment: false,
        };

        if payload.requires_action {
            let client_secret = payload
                .client_secret
                .ok_or(CheckoutError::MissingClientSecret)?;
            debug!("Card needs extra authentication");
            processor.confirm_card_payment(&client_secret).await?;
            outcome.authenticated_payment = true;
        }

        info!("Subscribed to plan {}", plan_id);
        Ok(outcome)
    }
}
