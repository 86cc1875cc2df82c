pub mod account;
pub mod error;
pub mod gateway;
pub mod request;
pub mod routes;
pub mod subscriptions;

pub use account::{AccountClient, AccountError, SignUp};
pub use error::ApiError;
pub use gateway::{Gateway, StatusHook};
pub use request::{ApiRequest, ApiResponse, CallOptions};
pub use subscriptions::{
    CheckoutError, PaymentError, PaymentMethodId, PaymentProcessor, SubscriptionClient,
    SubscriptionOutcome,
};
