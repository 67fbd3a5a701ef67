//! Field-level form validation. Each validator returns `None` when the
//! value passes or the message to show inline when it does not. Whole-form
//! validation collects every message at once rather than stopping at the
//! first failure.

use std::collections::BTreeMap;

pub fn required(value: &str, label: &str) -> Option<String> {
    if value.trim().is_empty() {
        return Some(format!("{label} is required"));
    }
    None
}

pub fn email(value: &str) -> Option<String> {
    if value.is_empty() {
        return Some("Email is required".to_string());
    }
    if !looks_like_email(value) {
        return Some("Please enter a valid email address".to_string());
    }
    None
}

// local-part@domain.tld with no whitespace and exactly one '@'.
fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

pub fn password(value: &str) -> Option<String> {
    if value.is_empty() {
        return Some("Password is required".to_string());
    }
    if value.len() < 6 {
        return Some("Password must be at least 6 characters long".to_string());
    }
    if !value.chars().any(|c| c.is_ascii_lowercase()) {
        return Some("Password must contain at least one lowercase letter".to_string());
    }
    if !value.chars().any(|c| c.is_ascii_uppercase()) {
        return Some("Password must contain at least one uppercase letter".to_string());
    }
    if !value.chars().any(|c| c.is_ascii_digit()) {
        return Some("Password must contain at least one number".to_string());
    }
    None
}

pub fn confirm_password(password: &str, confirm: &str) -> Option<String> {
    if confirm.is_empty() {
        return Some("Please confirm your password".to_string());
    }
    if password != confirm {
        return Some("Passwords do not match".to_string());
    }
    None
}

/// Per-field error messages for one form. Empty means the form may submit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    errors: BTreeMap<String, String>,
}

impl FormErrors {
    pub fn record(&mut self, field: &str, result: Option<String>) {
        if let Some(message) = result {
            self.errors.insert(field.to_string(), message);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }
}

impl From<BTreeMap<String, String>> for FormErrors {
    fn from(errors: BTreeMap<String, String>) -> Self {
        Self { errors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_blank_values_with_the_field_label() {
        assert_eq!(required("  ", "Name").unwrap(), "Name is required");
        assert_eq!(required("Ada", "Name"), None);
    }

    #[test]
    fn email_rejects_malformed_addresses() {
        assert_eq!(email("").unwrap(), "Email is required");
        assert_eq!(
            email("x").unwrap(),
            "Please enter a valid email address"
        );
        assert!(email("a b@c.com").is_some());
        assert!(email("a@b").is_some());
        assert_eq!(email("john@techcorp.com"), None);
    }

    #[test]
    fn password_rules_match_the_signup_policy() {
        // Too short, no uppercase, no digit; the length rule reports first.
        assert_eq!(
            password("abc").unwrap(),
            "Password must be at least 6 characters long"
        );
        assert_eq!(
            password("abcdef").unwrap(),
            "Password must contain at least one uppercase letter"
        );
        assert_eq!(
            password("ABCDEF1").unwrap(),
            "Password must contain at least one lowercase letter"
        );
        assert_eq!(
            password("Abcdefg").unwrap(),
            "Password must contain at least one number"
        );
        assert_eq!(password("Abcdef1"), None);
    }

    #[test]
    fn confirm_password_checks_presence_then_equality() {
        assert_eq!(
            confirm_password("Abcdef1", "").unwrap(),
            "Please confirm your password"
        );
        assert_eq!(
            confirm_password("Abcdef1", "Abcdef2").unwrap(),
            "Passwords do not match"
        );
        assert_eq!(confirm_password("Abcdef1", "Abcdef1"), None);
    }

    #[test]
    fn whole_form_collects_every_violation_at_once() {
        let mut errors = FormErrors::default();
        errors.record("name", required("", "Name"));
        errors.record("email", email("x"));
        assert!(!errors.is_valid());
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("name").unwrap(), "Name is required");
        assert_eq!(
            errors.get("email").unwrap(),
            "Please enter a valid email address"
        );
    }

    #[test]
    fn valid_fields_leave_the_form_submittable() {
        let mut errors = FormErrors::default();
        errors.record("name", required("Ada", "Name"));
        errors.record("email", email("ada@example.com"));
        assert!(errors.is_valid());
    }
}
