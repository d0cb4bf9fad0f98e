use crate::error::CredentialRejection;

/// Prefixes issued by the service, longest first.
pub const KNOWN_PREFIXES: &[&str] = &["sk-proj-", "sk-svcacct-", "sk-admin-", "sk-"];

/// A key must be strictly longer than this.
pub const MIN_KEY_LEN: usize = 30;

/// Local syntactic check of an already normalized key. Makes no network call.
pub fn check_shape(key: &str) -> Result<(), CredentialRejection> {
    if key.is_empty() {
        return Err(CredentialRejection::Empty);
    }
    if !KNOWN_PREFIXES.iter().any(|prefix| key.starts_with(prefix)) {
        return Err(CredentialRejection::UnknownPrefix);
    }
    if key.chars().count() <= MIN_KEY_LEN {
        return Err(CredentialRejection::TooShort);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_key_passes() {
        assert_eq!(
            check_shape("sk-proj-ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789"),
            Ok(())
        );
    }

    #[test]
    fn rejections_are_specific() {
        assert_eq!(check_shape(""), Err(CredentialRejection::Empty));
        assert_eq!(
            check_shape("pk-ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789"),
            Err(CredentialRejection::UnknownPrefix)
        );
        assert_eq!(check_shape("sk-short"), Err(CredentialRejection::TooShort));
    }

    #[test]
    fn length_threshold_is_exclusive() {
        let at_limit = format!("sk-{}", "a".repeat(MIN_KEY_LEN - 3));
        assert_eq!(at_limit.len(), MIN_KEY_LEN);
        assert_eq!(check_shape(&at_limit), Err(CredentialRejection::TooShort));

        let over = format!("{at_limit}b");
        assert_eq!(check_shape(&over), Ok(()));
    }
}
