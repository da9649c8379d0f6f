//! Input validation utilities.
//!
//! This module contains functions for validating intake and registration fields before a
//! record is built. Values are checked, never coerced; ZIP codes are validated by
//! [`pttrack_types::ZipCode`].

use crate::{ClinicError, ClinicResult};
use chrono::NaiveDate;

/// Validates that a phone number is present and made of dialable characters.
///
/// Digits, spaces and `+ - ( ) .` are accepted; at least one digit is required.
pub fn validate_phone(phone: &str) -> ClinicResult<()> {
    const MAX_PHONE_LEN: usize = 50;

    let phone = phone.trim();
    if phone.is_empty() {
        return Err(ClinicError::InvalidInput("phone cannot be empty".into()));
    }

    if phone.len() > MAX_PHONE_LEN {
        return Err(ClinicError::InvalidInput(format!(
            "phone exceeds maximum length of {} characters",
            MAX_PHONE_LEN
        )));
    }

    let ok = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')' | '.'));
    if !ok || !phone.chars().any(|c| c.is_ascii_digit()) {
        return Err(ClinicError::InvalidInput(format!(
            "{phone} is not a valid phone number"
        )));
    }

    Ok(())
}

/// Validates a two-letter state or region code.
pub fn validate_state(state: &str) -> ClinicResult<()> {
    if state.len() != 2 || !state.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(ClinicError::InvalidInput(format!(
            "{state} is not a two-letter state code"
        )));
    }
    Ok(())
}

/// Validates that a date of birth is not after `today`.
pub fn validate_birth_date(date_of_birth: NaiveDate, today: NaiveDate) -> ClinicResult<()> {
    if date_of_birth > today {
        return Err(ClinicError::InvalidInput(format!(
            "date of birth {date_of_birth} is in the future"
        )));
    }
    Ok(())
}

/// Minimal shape check for an email address: one `@` with text on both sides and no spaces.
pub fn validate_email(email: &str) -> ClinicResult<()> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if !valid {
        return Err(ClinicError::InvalidInput(format!(
            "{email} is not a valid email address"
        )));
    }
    Ok(())
}

/// Validates that free text required by a form is present.
pub fn require_text(field: &str, value: &str) -> ClinicResult<()> {
    if value.trim().is_empty() {
        return Err(ClinicError::InvalidInput(format!("{field} cannot be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_accepts_international_format() {
        validate_phone("+49 178 236 5288").expect("international number");
        validate_phone("(314) 555-0100").expect("us number");
    }

    #[test]
    fn phone_rejects_letters_and_blank() {
        assert!(validate_phone("call me").is_err());
        assert!(validate_phone("   ").is_err());
        assert!(validate_phone("+-").is_err());
    }

    #[test]
    fn state_must_be_two_letters() {
        validate_state("MO").expect("missouri");
        assert!(validate_state("Missouri").is_err());
        assert!(validate_state("M1").is_err());
    }

    #[test]
    fn birth_date_cannot_be_in_future() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        validate_birth_date(today, today).expect("born today");
        assert!(validate_birth_date(today.succ_opt().unwrap(), today).is_err());
    }

    #[test]
    fn email_shape_is_checked() {
        validate_email("coordinator@clinic.org").expect("valid email");
        assert!(validate_email("coordinator").is_err());
        assert!(validate_email("a@b@c").is_err());
        assert!(validate_email("a b@c.org").is_err());
    }
}
