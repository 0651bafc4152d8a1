//! Email helpers shared by registration, login and profile updates.

/// Canonical form of an email address: trimmed and lowercased.
///
/// # Examples
///
/// ```
/// use ticketing_auth::utils::normalize_email;
///
/// assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
/// ```
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate email address format.
///
/// Basic structural check:
/// - exactly one `@` with non-empty local and domain parts
/// - a dotted domain without empty labels
/// - length between 3 and 255 characters
///
/// # Examples
///
/// ```
/// use ticketing_auth::utils::is_valid_email;
///
/// assert!(is_valid_email("user@example.com"));
/// assert!(is_valid_email("user+tag@subdomain.example.com"));
/// assert!(!is_valid_email("invalid"));
/// assert!(!is_valid_email("@example.com"));
/// assert!(!is_valid_email("user@"));
/// ```
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 3 || email.len() > 255 {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }

    let valid_local = |c: char| c.is_alphanumeric() || matches!(c, '.' | '-' | '+' | '_');
    let valid_domain = |c: char| c.is_alphanumeric() || matches!(c, '.' | '-');

    local.chars().all(valid_local)
        && domain.chars().all(valid_domain)
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_multiple_at_signs() {
        assert!(!is_valid_email("a@b@example.com"));
    }

    #[test]
    fn rejects_empty_domain_labels() {
        assert!(!is_valid_email("user@example..com"));
        assert!(!is_valid_email("user@.example.com"));
        assert!(!is_valid_email("user@localhost"));
    }

    #[test]
    fn rejects_spaces() {
        assert!(!is_valid_email("us er@example.com"));
    }

    #[test]
    fn normalized_email_validates() {
        assert!(is_valid_email(&normalize_email(" Bob@Example.org ")));
    }
}
