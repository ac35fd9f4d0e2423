//! Common validation utilities.

use validator::{ValidateEmail, ValidationError};

/// Maximum length of a monitored email address (RFC 5321 path limit).
const MAX_EMAIL_LENGTH: usize = 254;

/// Validates that a string is a plausible email address.
pub fn validate_email_address(email: &str) -> Result<(), ValidationError> {
    if email.len() > MAX_EMAIL_LENGTH {
        let mut err = ValidationError::new("email_length");
        err.message = Some("Email address cannot exceed 254 characters".into());
        return Err(err);
    }

    if email.validate_email() {
        Ok(())
    } else {
        let mut err = ValidationError::new("email_format");
        err.message = Some("Invalid email address format".into());
        Err(err)
    }
}

/// Largest accepted schedule interval value, whatever the unit.
///
/// Keeps `value * unit` far inside what a `chrono::Duration` can hold, so the
/// next run time of a job can always be computed.
pub const MAX_INTERVAL_VALUE: i64 = 1_000_000;

/// Validates that a schedule interval value is positive and at most
/// [`MAX_INTERVAL_VALUE`].
pub fn validate_positive_interval(value: i64) -> Result<(), ValidationError> {
    if value <= 0 {
        let mut err = ValidationError::new("interval_value_range");
        err.message = Some("Interval value must be greater than 0".into());
        return Err(err);
    }

    if value > MAX_INTERVAL_VALUE {
        let mut err = ValidationError::new("interval_value_too_large");
        err.message = Some(format!("Interval value cannot exceed {}", MAX_INTERVAL_VALUE).into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::Fake;

    #[test]
    fn test_validate_email_address() {
        assert!(validate_email_address("a@x.com").is_ok());
        assert!(validate_email_address("first.last+tag@example.co.uk").is_ok());
        assert!(validate_email_address("not-an-email").is_err());
        assert!(validate_email_address("missing@").is_err());
        assert!(validate_email_address("").is_err());
    }

    #[test]
    fn test_validate_generated_emails() {
        for _ in 0..20 {
            let email: String = SafeEmail().fake();
            assert!(validate_email_address(&email).is_ok(), "{email}");
        }
    }

    #[test]
    fn test_validate_email_too_long() {
        let local = "a".repeat(250);
        let err = validate_email_address(&format!("{local}@x.com")).unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Email address cannot exceed 254 characters"
        );
    }

    #[test]
    fn test_validate_email_error_message() {
        let err = validate_email_address("nope").unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Invalid email address format"
        );
    }

    #[test]
    fn test_validate_positive_interval() {
        assert!(validate_positive_interval(1).is_ok());
        assert!(validate_positive_interval(365).is_ok());
        assert!(validate_positive_interval(MAX_INTERVAL_VALUE).is_ok());
        assert!(validate_positive_interval(0).is_err());
        assert!(validate_positive_interval(-3).is_err());
        assert!(validate_positive_interval(MAX_INTERVAL_VALUE + 1).is_err());
        assert!(validate_positive_interval(i64::MAX).is_err());
    }

    #[test]
    fn test_validate_interval_too_large_message() {
        let err = validate_positive_interval(i64::MAX).unwrap_err();
        assert_eq!(err.code, "interval_value_too_large");
        assert_eq!(
            err.message.unwrap().to_string(),
            "Interval value cannot exceed 1000000"
        );
    }

    #[test]
    fn test_validate_positive_interval_error_message() {
        let err = validate_positive_interval(0).unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Interval value must be greater than 0"
        );
    }
}
