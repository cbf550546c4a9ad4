//! Customer contact field rules shared by orders and users.

use super::errors::DomainError;

pub const PHONE_COUNTRY_PREFIX: &str = "+91";

/// Normalizes a phone number to `+91` followed by its last 10 digits.
///
/// Anything that is not a digit is discarded first. Inputs with fewer than
/// 10 digits (including the empty string) are returned unchanged.
pub fn normalize_phone(raw: &str) -> String {
    let digits: Vec<char> = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 10 {
        return raw.to_string();
    }
    let last10: String = digits[digits.len() - 10..].iter().collect();
    format!("{PHONE_COUNTRY_PREFIX}{last10}")
}

/// Loose syntactic email check: one `@`, non-empty local part, dotted domain,
/// no whitespace.
pub fn validate_email(field: &str, email: &str) -> Result<(), DomainError> {
    let invalid = || DomainError::validation(format!("{field}: Enter a valid email address."));

    if email.len() > 254 || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let dotted = domain
        .split('.')
        .collect::<Vec<_>>();
    if dotted.len() < 2 || dotted.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }
    Ok(())
}

/// Returns the trimmed value of a required text field.
pub fn require<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, DomainError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DomainError::validation(format!("{field}: This field is required."))),
    }
}

pub fn max_len(field: &str, value: &str, max: usize) -> Result<(), DomainError> {
    if value.chars().count() > max {
        return Err(DomainError::validation(format!(
            "{field}: Ensure this field has no more than {max} characters."
        )));
    }
    Ok(())
}
