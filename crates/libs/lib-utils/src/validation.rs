//! # Validation Utilities
//!
//! Input validation helpers.

/// Validate email format (basic check).
pub fn validate_email(email: &str) -> Result<(), String> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err("Invalid email format".to_string());
    };

    if local.is_empty() || !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate minimum length.
pub fn validate_min_length(value: &str, min: usize, field_name: &str) -> Result<(), String> {
    if value.chars().count() < min {
        Err(format!("{} must be at least {} characters", field_name, min))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("alice.example.com").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("alice@localhost").is_err());
        assert!(validate_email("alice@example.").is_err());
    }

    #[test]
    fn test_validate_min_length() {
        assert!(validate_min_length("12345678", 8, "Password").is_ok());
        assert_eq!(
            validate_min_length("short", 8, "Password").unwrap_err(),
            "Password must be at least 8 characters"
        );
    }
}
