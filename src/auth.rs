pub mod token;
pub mod validation;

pub use token::Credential;
