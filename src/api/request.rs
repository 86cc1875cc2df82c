use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub const DEFAULT_SUCCESS_MESSAGE: &str = "Operation successful";
pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred";

/// One backend request. Relative urls are resolved against the api base url.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> ApiRequest {
        ApiRequest {
            method,
            url: url.into(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> ApiRequest {
        ApiRequest::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>, body: Value) -> ApiRequest {
        ApiRequest::new(Method::POST, url).with_body(body)
    }

    pub fn with_body(mut self, body: Value) -> ApiRequest {
        self.body = Some(body);
        self
    }
}

/// Per-call policy for [`Gateway::call`](super::Gateway::call).
#[derive(Clone, Debug)]
pub struct CallOptions {
    pub success_message: String,
    pub error_message: String,
    pub show_success_notification: bool,
    pub show_error_notification: bool,
    /// Send the session credential as a bearer token when there is one.
    pub attach_credential: bool,
    /// Send and keep cookies (the backend's session cookie among them).
    pub with_credentials: bool,
}

impl Default for CallOptions {
    fn default() -> Self {
        CallOptions {
            success_message: DEFAULT_SUCCESS_MESSAGE.to_string(),
            error_message: DEFAULT_ERROR_MESSAGE.to_string(),
            show_success_notification: true,
            show_error_notification: true,
            attach_credential: true,
            with_credentials: true,
        }
    }
}

impl CallOptions {
    pub fn success_message(mut self, message: impl Into<String>) -> CallOptions {
        self.success_message = message.into();
        self
    }

    pub fn error_message(mut self, message: impl Into<String>) -> CallOptions {
        self.error_message = message.into();
        self
    }

    pub fn quiet_success(mut self) -> CallOptions {
        self.show_success_notification = false;
        self
    }

    pub fn quiet_errors(mut self) -> CallOptions {
        self.show_error_notification = false;
        self
    }

    pub fn without_credential(mut self) -> CallOptions {
        self.attach_credential = false;
        self
    }

    pub fn without_cookies(mut self) -> CallOptions {
        self.with_credentials = false;
        self
    }
}

/// A 2xx response, as the backend sent it.
#[derive(Clone, Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    /// `Null` for an empty body, a JSON string for a body that isn't JSON.
    pub body: Value,
}

impl ApiResponse {
    /// The `data` member of the backend's `{status, message, data}`
    /// envelope, or the whole body when there is no envelope.
    pub fn payload(&self) -> &Value {
        match self.body.get("data") {
            Some(data) if !data.is_null() => data,
            _ => &self.body,
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(self.payload())
    }

    pub fn message(&self) -> Option<&str> {
        server_message(&self.body)
    }
}

/// The backend's human readable `message`, when it sent a non-empty one.
pub(crate) fn server_message(body: &Value) -> Option<&str> {
    body.get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
}
