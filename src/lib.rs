//! Client-side account and subscription state for the gatehouse backend.
//!
//! [`AppState`] owns the persisted [`SessionStore`](store::SessionStore),
//! the [`NotificationStore`](store::NotificationStore) and the
//! [`Gateway`](api::Gateway) every backend request goes through.

pub mod api;
pub mod auth;
pub mod config;
pub mod logger;
pub mod model;
pub mod state;
pub mod store;

pub use config::Config;
pub use state::{AppState, BuildError};
