//! Identity validation.
//!
//! An identity is a non-empty, case-sensitive string and the sole key into
//! the template store. Because it names a directory on disk it must also be
//! path-safe: no separators, no `.`/`..`, no control characters.

use crate::error::IdentityError;

/// Maximum identity length in bytes.
pub const MAX_IDENTITY_LEN: usize = 64;

/// Validate an identity string for use as a template store key.
pub fn validate_identity(identity: &str) -> Result<&str, IdentityError> {
    if identity.is_empty() {
        return Err(IdentityError::Empty);
    }

    if identity.len() > MAX_IDENTITY_LEN {
        return Err(IdentityError::TooLong {
            max: MAX_IDENTITY_LEN,
            actual: identity.len(),
        });
    }

    if identity == "." || identity == ".." {
        return Err(IdentityError::InvalidCharacters);
    }

    if identity
        .chars()
        .any(|c| c.is_control() || c == '/' || c == '\\' || c == '\0')
    {
        return Err(IdentityError::InvalidCharacters);
    }

    Ok(identity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_valid() {
        assert!(validate_identity("alice").is_ok());
        assert!(validate_identity("john_doe").is_ok());
        assert!(validate_identity("user-2024").is_ok());
        assert!(validate_identity("Älice Ö").is_ok());
    }

    #[test]
    fn test_identity_case_sensitive_keys_distinct() {
        assert_eq!(validate_identity("Alice").unwrap(), "Alice");
        assert_eq!(validate_identity("alice").unwrap(), "alice");
    }

    #[test]
    fn test_identity_empty() {
        assert!(matches!(validate_identity(""), Err(IdentityError::Empty)));
    }

    #[test]
    fn test_identity_too_long() {
        assert!(validate_identity(&"a".repeat(64)).is_ok());
        assert!(matches!(
            validate_identity(&"a".repeat(65)),
            Err(IdentityError::TooLong { .. })
        ));
    }

    #[test]
    fn test_identity_path_unsafe() {
        assert!(validate_identity("..").is_err());
        assert!(validate_identity(".").is_err());
        assert!(validate_identity("a/b").is_err());
        assert!(validate_identity("a\\b").is_err());
        assert!(validate_identity("user\x00name").is_err());
        assert!(validate_identity("user\nname").is_err());
    }

    #[test]
    fn test_identity_dots_inside_name_allowed() {
        assert!(validate_identity("alice.v2").is_ok());
        assert!(validate_identity("...three").is_ok());
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn identity_rejects_controls(s in r"[\x00-\x1F\x7F]{1,16}") {
            prop_assert!(validate_identity(&s).is_err());
        }

        #[test]
        fn identity_accepts_reasonable_ascii(s in r"[A-Za-z0-9 _\-]{1,64}") {
            prop_assert!(validate_identity(&s).is_ok());
        }
    }
}
