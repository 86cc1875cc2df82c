use std::{sync::Arc, time::Duration};

use log::{debug, trace, warn};
use reqwest::{
    cookie::Jar,
    header::{ACCEPT, AUTHORIZATION},
    Client, Response, StatusCode,
};
use serde_json::Value;
use url::Url;

use crate::{
    model::Severity,
    store::{NotificationStore, SessionStore},
};

use super::{
    error::ApiError,
    request::{server_message, ApiRequest, ApiResponse, CallOptions},
};

/// Reaction point for authorization failures.
///
/// Runs after the error notification; the error is still returned to the
/// caller. Nothing is done by default.
pub trait StatusHook: Send + Sync {
    fn unauthorized(&self, _request: &ApiRequest) {}
    fn forbidden(&self, _request: &ApiRequest) {}
}

/// The one place backend requests go through.
#[derive(Clone)]
pub struct Gateway {
    base_url: Url,
    with_cookies: Client,
    without_cookies: Client,
    session: SessionStore,
    notifications: NotificationStore,
    status_hook: Option<Arc<dyn StatusHook>>,
}

impl Gateway {
    pub fn new(
        base_url: Url,
        timeout: Duration,
        session: SessionStore,
        notifications: NotificationStore,
    ) -> Result<Gateway, reqwest::Error> {
        let jar = Arc::new(Jar::default());
        let with_cookies = Client::builder()
            .timeout(timeout)
            .cookie_provider(jar)
            .build()?;
        let without_cookies = Client::builder().timeout(timeout).build()?;

        Ok(Gateway {
            base_url,
            with_cookies,
            without_cookies,
            session,
            notifications,
            status_hook: None,
        })
    }

    pub fn with_status_hook(mut self, hook: Arc<dyn StatusHook>) -> Gateway {
        self.status_hook = Some(hook);
        self
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn notifications(&self) -> &NotificationStore {
        &self.notifications
    }

    pub async fn call(
        &self,
        request: ApiRequest,
        options: CallOptions,
    ) -> Result<ApiResponse, ApiError> {
        let url = match self.resolve(&request.url) {
            Ok(url) => url,
            Err(err) => {
                warn!("Bad request url {:?}: {}", request.url, err);
                if options.show_error_notification {
                    self.notify(Severity::Error, &options.error_message);
                }
                return Err(ApiError::InvalidUrl(err));
            }
        };
        debug!("{} {}", request.method, url);

        let client = if options.with_credentials {
            &self.with_cookies
        } else {
            &self.without_cookies
        };
        let mut builder = client
            .request(request.method.clone(), url.clone())
            .header(ACCEPT, "application/json");

        if options.attach_credential {
            if let Some(credential) = self.session.credential() {
                trace!("Attaching credential");
                builder = builder.header(AUTHORIZATION, credential.bearer());
            }
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => return Err(self.transport_failure(&request, &url, &options, err)),
        };

        // A status the server sent stands even when its body is cut short
        let status = response.status();
        let body = match read_body(response).await {
            Ok(body) => body,
            Err(err) if !status.is_success() => {
                warn!("{} {} -> {}, body unreadable: {}", request.method, url, status, err);
                Value::Null
            }
            Err(err) => return Err(self.transport_failure(&request, &url, &options, err)),
        };

        if status.is_success() {
            debug!("{} {} -> {}", request.method, url, status);
            if options.show_success_notification {
                self.notify(Severity::Success, &options.success_message);
            }
            return Ok(ApiResponse { status, body });
        }

        let message = server_message(&body).map(String::from);
        debug!(
            "{} {} -> {} ({})",
            request.method,
            url,
            status,
            message.as_deref().unwrap_or("no message")
        );
        if options.show_error_notification {
            let text = message.as_deref().unwrap_or(&options.error_message);
            self.notify(Severity::Error, text);
        }

        match status {
            StatusCode::UNAUTHORIZED => {
                debug!("Unauthorized: {}", url);
                if let Some(hook) = &self.status_hook {
                    hook.unauthorized(&request);
                }
            }
            StatusCode::FORBIDDEN => {
                debug!("Forbidden: {}", url);
                if let Some(hook) = &self.status_hook {
                    hook.forbidden(&request);
                }
            }
            _ => {}
        }

        Err(ApiError::Http {
            status,
            message,
            body,
        })
    }

    fn resolve(&self, target: &str) -> Result<Url, url::ParseError> {
        match Url::parse(target) {
            Ok(absolute) => Ok(absolute),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                self.base_url.join(target.trim_start_matches('/'))
            }
            Err(err) => Err(err),
        }
    }

    fn transport_failure(
        &self,
        request: &ApiRequest,
        url: &Url,
        options: &CallOptions,
        err: reqwest::Error,
    ) -> ApiError {
        warn!("{} {} failed: {}", request.method, url, err);
        if options.show_error_notification {
            self.notify(Severity::Error, &options.error_message);
        }
        ApiError::Transport(err)
    }

    fn notify(&self, severity: Severity, text: &str) {
        if let Err(err) = self.notifications.push(severity, text) {
            warn!("Failed to push notification: {}", err);
        }
    }
}

async fn read_body(response: Response) -> Result<Value, reqwest::Error> {
    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }

    Ok(serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned())))
}
