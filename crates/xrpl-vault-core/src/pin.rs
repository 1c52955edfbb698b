//! Unlock PIN policy
//!
//! The PIN is the sole unlock secret for PIN-type wallets, so trivially
//! guessable values are refused at entry.

use crate::{Error, Result};

/// Required PIN length
pub const PIN_LENGTH: usize = 6;

/// Validate a candidate unlock PIN.
///
/// Accepts exactly six ASCII digits that are neither a single repeated
/// digit nor a monotone ascending/descending run.
pub fn validate(pin: &str) -> Result<()> {
    if pin.len() != PIN_LENGTH {
        return Err(Error::Validation(format!(
            "PIN must be exactly {} digits",
            PIN_LENGTH
        )));
    }

    if !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::Validation(
            "PIN must contain only digits".to_string(),
        ));
    }

    let digits: Vec<u8> = pin.bytes().map(|b| b - b'0').collect();

    if digits.windows(2).all(|w| w[0] == w[1]) {
        return Err(Error::Validation(
            "PIN must not repeat a single digit".to_string(),
        ));
    }

    let ascending = digits.windows(2).all(|w| w[1] == w[0].wrapping_add(1));
    let descending = digits.windows(2).all(|w| w[0] == w[1].wrapping_add(1));
    if ascending || descending {
        return Err(Error::Validation(
            "PIN must not be a sequential run".to_string(),
        ));
    }

    Ok(())
}

/// Check whether a PIN passes the policy
pub fn is_valid(pin: &str) -> bool {
    validate(pin).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_pin_accepted() {
        assert!(validate("284719").is_ok());
        assert!(validate("905031").is_ok());
        assert!(validate("112358").is_ok());
    }

    #[test]
    fn test_sequential_rejected() {
        assert!(validate("123456").is_err());
        assert!(validate("456789").is_err());
        assert!(validate("654321").is_err());
        assert!(validate("987654").is_err());
    }

    #[test]
    fn test_repeated_rejected() {
        assert!(validate("111111").is_err());
        assert!(validate("000000").is_err());
        assert!(validate("999999").is_err());
    }

    #[test]
    fn test_length_and_charset() {
        assert!(validate("12345").is_err());
        assert!(validate("1234567").is_err());
        assert!(validate("").is_err());
        assert!(validate("12a456").is_err());
        assert!(validate("28471 ").is_err());
    }

    #[test]
    fn test_is_valid_helper() {
        assert!(is_valid("284719"));
        assert!(!is_valid("123456"));
    }
}
