//! Backend endpoints, relative to the configured api url.

pub const LOGIN: &str = "login/";
pub const LOGOUT: &str = "logout/";
pub const REGISTER: &str = "register/";
pub const PASSWORD_RESET_REQUEST: &str = "password-reset-request/";
pub const PASSWORD_RESET_CONFIRM: &str = "password-reset-confirm/";
pub const PROFILE: &str = "profile/";
pub const DELETE_ACCOUNT: &str = "delete-account/";

pub fn password_reset(user_id: &str, token: &str) -> String {
    format!("password-reset/{}/{}/", segment(user_id), segment(token))
}

pub fn subscribe(plan_id: &str) -> String {
    format!("subscribe/{}/", segment(plan_id))
}

/// Percent-encode one path segment.
fn segment(s: &str) -> String {
    // Form encoding writes spaces as `+`; a literal `+` is already `%2B`
    url::form_urlencoded::byte_serialize(s.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_parameterized_paths() {
        assert_eq!(password_reset("MQ", "c4d-9f2"), "password-reset/MQ/c4d-9f2/");
        assert_eq!(subscribe("price_123"), "subscribe/price_123/");
    }

    #[test]
    fn escapes_segments() {
        assert_eq!(subscribe("a/b c"), "subscribe/a%2Fb%20c/");
        assert_eq!(password_reset("é", "x"), "password-reset/%C3%A9/x/");
        assert_eq!(subscribe("1+1"), "subscribe/1%2B1/");
    }
}
