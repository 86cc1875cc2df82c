use log::{debug, info, warn};
use serde_json::json;

use crate::{
    auth::{
        validation::{self, Issue},
        Credential,
    },
    model::{User, UserPatch},
    store::{SessionStore, StoreError},
};

use super::{
    error::ApiError,
    request::{ApiRequest, ApiResponse, CallOptions},
    routes, Gateway,
};

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("invalid input: {}", list(.0))]
    Validation(Vec<Issue>),
    #[error("unexpected response from server: {0}")]
    UnexpectedResponse(#[from] serde_json::Error),
    #[error(transparent)]
    Session(#[from] StoreError),
}

fn list(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(Issue::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<Issue> for AccountError {
    fn from(issue: Issue) -> Self {
        AccountError::Validation(vec![issue])
    }
}

#[derive(Debug, serde::Deserialize)]
struct AuthPayload {
    user: User,
    token: Credential,
}

#[derive(Debug, serde::Deserialize)]
struct TokenCheck {
    is_valid: bool,
}

/// Fields of the sign up form.
#[derive(Clone)]
pub struct SignUp {
    pub name: String,
    pub email: String,
    /// The (**unhashed**) password
    pub password: String,
    pub confirm_password: String,
}

impl core::fmt::Debug for SignUp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Don't print the password
        f.debug_struct("SignUp")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish()
    }
}

/// Login, sign up, password reset and the rest of the account endpoints.
#[derive(Clone)]
pub struct AccountClient {
    gateway: Gateway,
}

impl AccountClient {
    pub fn new(gateway: Gateway) -> AccountClient {
        AccountClient { gateway }
    }

    fn session(&self) -> &SessionStore {
        self.gateway.session()
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, AccountError> {
        validation::check_email(email)?;
        validation::check_required(password, Issue::PasswordRequired)?;

        debug!("Got login request for {}", email);
        let response = self
            .gateway
            .call(
                ApiRequest::post(routes::LOGIN, json!({ "email": email, "password": password })),
                CallOptions::default()
                    .success_message("Successfully logged in.")
                    .error_message("Login failed."),
            )
            .await?;

        self.start_session(&response)
    }

    pub async fn register(&self, form: &SignUp) -> Result<User, AccountError> {
        let mut issues = Vec::new();
        if let Err(issue) = validation::check_required(&form.name, Issue::NameRequired) {
            issues.push(issue);
        }
        if let Err(issue) = validation::check_email(&form.email) {
            issues.push(issue);
        }
        issues.extend(validation::check_new_password(
            &form.password,
            &form.confirm_password,
        ));
        if !issues.is_empty() {
            debug!("Sign up form rejected: {:?}", issues);
            return Err(AccountError::Validation(issues));
        }

        let response = self
            .gateway
            .call(
                ApiRequest::post(
                    routes::REGISTER,
                    json!({ "name": form.name, "email": form.email, "password": form.password }),
                ),
                CallOptions::default()
                    .success_message("Registration successful.")
                    .error_message("Registration failed."),
            )
            .await?;

        self.start_session(&response)
    }

    /// Ends the session locally even when the backend call fails.
    pub async fn logout(&self) -> Result<(), AccountError> {
        let result = self
            .gateway
            .call(
                ApiRequest::post(routes::LOGOUT, json!({})),
                CallOptions::default()
                    .success_message("Successfully logged out.")
                    .error_message("Logout failed."),
            )
            .await;

        self.session().logout()?;
        info!("Logged out");

        result?;
        Ok(())
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<(), AccountError> {
        validation::check_email(email)?;

        self.gateway
            .call(
                ApiRequest::post(routes::PASSWORD_RESET_REQUEST, json!({ "email": email })),
                CallOptions::default()
                    .success_message("If the email exists, a password reset link has been sent.")
                    .error_message("Password reset request failed."),
            )
            .await?;
        Ok(())
    }

    /// Whether the reset link a user followed is still good.
    pub async fn verify_reset_token(&self, user_id: &str, token: &str) -> Result<bool, AccountError> {
        let response = self
            .gateway
            .call(
                ApiRequest::get(routes::password_reset(user_id, token)),
                CallOptions::default()
                    .quiet_success()
                    .error_message("This password reset link is invalid."),
            )
            .await?;

        let check: TokenCheck = response.json()?;
        Ok(check.is_valid)
    }

    pub async fn confirm_password_reset(
        &self,
        user_id: &str,
        token: &str,
        new_password: &str,
        confirmation: &str,
    ) -> Result<(), AccountError> {
        let issues = validation::check_new_password(new_password, confirmation);
        if !issues.is_empty() {
            return Err(AccountError::Validation(issues));
        }

        self.gateway
            .call(
                ApiRequest::post(
                    routes::PASSWORD_RESET_CONFIRM,
                    json!({ "user_id": user_id, "token": token, "new_password": new_password }),
                ),
                CallOptions::default()
                    .success_message("Password has been reset successfully.")
                    .error_message("Password reset failed."),
            )
            .await?;
        Ok(())
    }

    /// Fetch the profile and fold it into the stored user.
    pub async fn profile(&self) -> Result<User, AccountError> {
        let response = self
            .gateway
            .call(
                ApiRequest::get(routes::PROFILE),
                CallOptions::default()
                    .quiet_success()
                    .error_message("Could not load your profile."),
            )
            .await?;

        let user: User = response.json()?;
        if !self.session().update_user(UserPatch::from(user.clone()))? {
            warn!("Fetched a profile without a session; not storing it");
        }
        Ok(user)
    }

    /// Deletes the account and ends the session.
    pub async fn delete_account(&self, reason: Option<&str>) -> Result<(), AccountError> {
        let body = match reason {
            Some(reason) => json!({ "reason": reason }),
            None => json!({}),
        };

        self.gateway
            .call(
                ApiRequest::post(routes::DELETE_ACCOUNT, body),
                CallOptions::default()
                    .success_message("Your account has been successfully deleted.")
                    .error_message("Account deletion failed."),
            )
            .await?;

        self.session().logout()?;
        info!("Account deleted");
        Ok(())
    }

    fn start_session(&self, response: &ApiResponse) -> Result<User, AccountError> {
        let AuthPayload { user, token } = response.json()?;
        self.session().login(user.clone(), token)?;
        info!("Logged in as user {}", user.id);
        Ok(user)
    }
}
