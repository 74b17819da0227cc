//! User identity rules.

use crate::error::CoreError;

/// Maximum accepted length of a platform user slug.
pub const MAX_USER_ID_LEN: usize = 64;

/// Maximum accepted length of a display name.
pub const MAX_DISPLAY_NAME_LEN: usize = 128;

/// Validate a platform user slug.
///
/// Must be non-empty, at most [`MAX_USER_ID_LEN`] characters, and contain
/// only ASCII letters, digits, `_`, `-` and `.`.
pub fn validate_user_id(user_id: &str) -> Result<(), CoreError> {
    if user_id.is_empty() {
        return Err(CoreError::Validation("user id must not be empty".to_string()));
    }
    if user_id.len() > MAX_USER_ID_LEN {
        return Err(CoreError::Validation(format!(
            "user id must be at most {MAX_USER_ID_LEN} characters, got {}",
            user_id.len()
        )));
    }
    if let Some(bad) = user_id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
    {
        return Err(CoreError::Validation(format!(
            "Invalid user id '{user_id}': unexpected character '{bad}'"
        )));
    }
    Ok(())
}

/// Normalize an optional display name: trimmed, `None` when blank.
pub fn normalize_display_name(display_name: Option<&str>) -> Result<Option<String>, CoreError> {
    let Some(name) = display_name.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };
    if name.chars().count() > MAX_DISPLAY_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "display name must be at most {MAX_DISPLAY_NAME_LEN} characters"
        )));
    }
    Ok(Some(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_typical_slugs() {
        for id in ["alice", "bob_99", "carol-dev", "d.ave", "X"] {
            assert!(validate_user_id(id).is_ok(), "{id} should be valid");
        }
    }

    #[test]
    fn rejects_empty_and_long() {
        assert!(validate_user_id("").is_err());
        assert!(validate_user_id(&"a".repeat(MAX_USER_ID_LEN + 1)).is_err());
    }

    #[test]
    fn rejects_whitespace_and_symbols() {
        assert!(validate_user_id("al ice").is_err());
        assert!(validate_user_id("bob/../etc").is_err());
        assert!(validate_user_id("caröl").is_err());
    }

    #[test]
    fn blank_display_name_is_none() {
        assert_eq!(normalize_display_name(None).unwrap(), None);
        assert_eq!(normalize_display_name(Some("   ")).unwrap(), None);
    }

    #[test]
    fn display_name_is_trimmed() {
        assert_eq!(
            normalize_display_name(Some("  Alice Liddell ")).unwrap(),
            Some("Alice Liddell".to_string())
        );
    }
}
