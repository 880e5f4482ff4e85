//! Subdomain derivation from tenant display names.

/// Maximum length of a derived subdomain.
pub const MAX_SUBDOMAIN_LENGTH: usize = 50;

/// Derive a subdomain slug from a tenant display name.
///
/// Lowercases the name, replaces every non-alphanumeric character with
/// `-`, collapses runs of `-`, trims leading/trailing separators, and
/// caps the result at [`MAX_SUBDOMAIN_LENGTH`] characters. The cap is
/// applied before the final trim so a cut can never leave a trailing
/// separator.
///
/// Deterministic: the same name always yields the same slug. A name
/// containing no alphanumerics yields the empty string; callers must
/// reject that before persisting.
pub fn subdomain_from_name(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_sep = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_sep = false;
        } else if !last_was_sep {
            slug.push('-');
            last_was_sep = true;
        }
    }

    slug.truncate(MAX_SUBDOMAIN_LENGTH);
    slug.trim_matches('-').to_string()
}
