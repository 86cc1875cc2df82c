pub mod notifications;
pub mod observable;
pub mod session;

pub use notifications::{NotificationError, NotificationStore};
pub use observable::{ListenerId, Observable};
pub use session::{SessionStore, StoreError};
