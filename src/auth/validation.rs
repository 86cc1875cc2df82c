//! Form checks that run before anything is sent to the backend.

const SPECIAL_CHARACTERS: &str = "!@#$%^&*(),.?\":{}|<>";
const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Issue {
    #[error("Name is required")]
    NameRequired,
    #[error("Email is required")]
    EmailRequired,
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Password is required")]
    PasswordRequired,
    #[error("Password must be at least 8 characters long")]
    TooShort,
    #[error("Password must contain at least one uppercase letter")]
    NoUppercase,
    #[error("Password must contain at least one lowercase letter")]
    NoLowercase,
    #[error("Password must contain at least one number")]
    NoDigit,
    #[error("Password must contain at least one special character")]
    NoSpecialCharacter,
    #[error("Passwords must match each other")]
    Mismatch,
}

/// Something shaped like `local@domain` without whitespace.
pub fn check_email(email: &str) -> Result<(), Issue> {
    if email.is_empty() {
        return Err(Issue::EmailRequired);
    }
    if email.chars().any(char::is_whitespace) {
        return Err(Issue::InvalidEmail);
    }

    let last = email.len() - 1;
    let has_split = email
        .char_indices()
        .any(|(i, c)| c == '@' && i > 0 && i < last);
    if has_split {
        Ok(())
    } else {
        Err(Issue::InvalidEmail)
    }
}

pub fn check_required(value: &str, issue: Issue) -> Result<(), Issue> {
    if value.trim().is_empty() {
        Err(issue)
    } else {
        Ok(())
    }
}

/// Every rule a new password breaks, in a stable order.
pub fn check_new_password(password: &str, confirmation: &str) -> Vec<Issue> {
    let mut issues = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        issues.push(Issue::TooShort);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        issues.push(Issue::NoUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        issues.push(Issue::NoLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        issues.push(Issue::NoDigit);
    }
    if !password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
        issues.push(Issue::NoSpecialCharacter);
    }
    if password != confirmation {
        issues.push(Issue::Mismatch);
    }

    issues
}
