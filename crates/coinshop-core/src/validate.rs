//! Syntactic input checks applied by callers before reaching the ledger.
//!
//! Usernames, passwords and item names share one rule: 1 to 100 characters,
//! all of them visible ASCII (`!` through `~`).

/// Longest accepted username, password, or item name.
pub const MAX_FIELD_LEN: usize = 100;

/// A rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Field was empty.
    #[error("{field} must not be empty")]
    Empty {
        /// Field name.
        field: &'static str,
    },

    /// Field exceeded [`MAX_FIELD_LEN`].
    #[error("{field} must not exceed {MAX_FIELD_LEN} characters")]
    TooLong {
        /// Field name.
        field: &'static str,
    },

    /// Field contained whitespace, control, or non-ASCII characters.
    #[error("{field} must contain only visible ASCII characters")]
    InvalidCharacters {
        /// Field name.
        field: &'static str,
    },

    /// Amount was zero or negative.
    #[error("amount must be positive")]
    NonPositiveAmount,
}

fn visible_ascii(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if value.len() > MAX_FIELD_LEN {
        return Err(ValidationError::TooLong { field });
    }
    if !value.bytes().all(|b| b.is_ascii_graphic()) {
        return Err(ValidationError::InvalidCharacters { field });
    }
    Ok(())
}

/// Validate a username (also used for transfer recipients).
///
/// # Errors
///
/// Returns the first rule the value breaks.
pub fn username(value: &str) -> Result<(), ValidationError> {
    visible_ascii("username", value)
}

/// Validate a password.
///
/// # Errors
///
/// Returns the first rule the value breaks.
pub fn password(value: &str) -> Result<(), ValidationError> {
    visible_ascii("password", value)
}

/// Validate a catalog item name.
///
/// # Errors
///
/// Returns the first rule the value breaks.
pub fn item_name(value: &str) -> Result<(), ValidationError> {
    visible_ascii("item", value)
}

/// Validate a transfer amount.
///
/// # Errors
///
/// Returns `NonPositiveAmount` for zero or negative values.
pub fn amount(value: i64) -> Result<(), ValidationError> {
    if value <= 0 {
        return Err(ValidationError::NonPositiveAmount);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_visible_ascii() {
        assert!(username("alice_01!").is_ok());
        assert!(item_name("pink-hoody").is_ok());
        assert!(password(&"x".repeat(MAX_FIELD_LEN)).is_ok());
    }

    #[test]
    fn rejects_empty_long_and_invisible() {
        assert_eq!(
            username(""),
            Err(ValidationError::Empty { field: "username" })
        );
        assert_eq!(
            password(&"x".repeat(MAX_FIELD_LEN + 1)),
            Err(ValidationError::TooLong { field: "password" })
        );
        assert_eq!(
            username("has space"),
            Err(ValidationError::InvalidCharacters { field: "username" })
        );
        assert_eq!(
            item_name("чашка"),
            Err(ValidationError::InvalidCharacters { field: "item" })
        );
    }

    #[test]
    fn amount_must_be_positive() {
        assert!(amount(1).is_ok());
        assert_eq!(amount(0), Err(ValidationError::NonPositiveAmount));
        assert_eq!(amount(-5), Err(ValidationError::NonPositiveAmount));
    }
}
