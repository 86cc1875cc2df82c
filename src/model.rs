pub mod database;
pub mod notification;
pub mod session;
pub mod snowflake;
pub mod user;

pub use database::{Database, Storage, StorageError};
pub use notification::{Notification, Severity};
pub use session::Session;
pub use snowflake::Snowflake;
pub use user::{User, UserPatch};
