//! Club field validation and normalization.
//!
//! Club profiles are student-entered; inputs are cleaned up rather than
//! bounced back where a correction is unambiguous (missing URL scheme,
//! social handles pasted with an `@`, stray whitespace). Hard failures are
//! reserved for fields that cannot be repaired.

use std::sync::LazyLock;

use regex::Regex;
use validator::ValidateEmail;

/// Minimum visible characters a club description must contain after HTML
/// tags are stripped.
pub const MIN_DESCRIPTION_LEN: usize = 10;

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

static URL_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+://").expect("valid regex"));

static SLUG_INVALID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

/// Derive a URL-safe club code from a club name.
///
/// Lowercases, collapses every non-alphanumeric run into a single hyphen,
/// and trims leading/trailing hyphens.
pub fn slugify(name: &str) -> String {
    SLUG_INVALID
        .replace_all(&name.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// Validate a club description: must carry real content once HTML tags are
/// stripped.
pub fn validate_description(value: &str) -> Result<String, String> {
    let cleaned = value.trim();
    let visible = HTML_TAG.replace_all(cleaned, "");
    if visible.trim().len() <= MIN_DESCRIPTION_LEN {
        return Err("You must enter a valid description for your club".to_string());
    }
    Ok(cleaned.to_string())
}

/// Validate the club contact email. Required so notifications have
/// somewhere to go; whether it is shown publicly is a separate flag.
pub fn validate_contact_email(value: &str) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(
            "You must enter a contact email for notification purposes. \
             If the club has no shared address, use an officer email."
                .to_string(),
        );
    }
    if !value.validate_email() {
        return Err(format!("'{value}' is not a valid email address"));
    }
    Ok(value.to_string())
}

/// Normalize a website URL, defaulting the scheme to https.
pub fn normalize_website(value: &str) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(String::new());
    }
    let with_scheme = if URL_SCHEME.is_match(value) {
        value.to_string()
    } else {
        format!("https://{value}")
    };
    // A bare scheme or a host without a dot is not a usable website.
    let rest = with_scheme
        .split_once("://")
        .map(|(_, r)| r)
        .unwrap_or_default();
    if rest.is_empty() || !rest.contains('.') || rest.contains(' ') {
        return Err(
            "The URL you entered does not appear to be valid. \
             Please check your URL and try again."
                .to_string(),
        );
    }
    Ok(with_scheme)
}

/// Normalize a social-media field into a canonical profile URL.
///
/// Accepts full URLs, bare handles, and `@handle` forms. `prefix` is
/// prepended to bare handles (e.g. `/company` for LinkedIn); `at_prefix`,
/// when set, replaces it for `@handle` inputs.
pub fn normalize_social(
    value: &str,
    domains: &[&str],
    prefix: &str,
    at_prefix: Option<&str>,
) -> String {
    let value = value.trim();
    if value.is_empty() {
        return String::new();
    }

    // Split an absolute URL into host + path; treat anything else as a path.
    let (host, path_and_query) = match value.split_once("://") {
        Some((_, rest)) => match rest.split_once('/') {
            Some((host, path)) => (Some(host), format!("/{path}")),
            None => (Some(rest), String::new()),
        },
        None => (None, value.to_string()),
    };

    let path = if let Some(handle) = path_and_query.strip_prefix('@') {
        format!("{}/{}/", at_prefix.unwrap_or(prefix), handle)
    } else if !path_and_query.starts_with('/') {
        format!("{prefix}/{path_and_query}/")
    } else {
        path_and_query
    };

    let domain = match host {
        Some(h) if domains.contains(&h) => h,
        _ => domains[0],
    };

    format!("https://{domain}{path}")
}

/// Canonical normalizers for the social fields a club carries.
pub mod social {
    use super::normalize_social;

    pub fn facebook(value: &str) -> String {
        normalize_social(value, &["facebook.com"], "/groups", Some(""))
    }

    pub fn twitter(value: &str) -> String {
        normalize_social(value, &["twitter.com"], "", None)
    }

    pub fn instagram(value: &str) -> String {
        normalize_social(value, &["instagram.com"], "", None)
    }

    pub fn linkedin(value: &str) -> String {
        normalize_social(value, &["linkedin.com"], "/company", None)
    }

    pub fn github(value: &str) -> String {
        normalize_social(value, &["github.com"], "", None)
    }

    pub fn youtube(value: &str) -> String {
        normalize_social(value, &["youtube.com", "youtu.be"], "", None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // slugify
    // -----------------------------------------------------------------------

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Chess Society"), "chess-society");
    }

    #[test]
    fn test_slugify_collapses_punctuation() {
        assert_eq!(slugify("A.C.M. @ Tech!"), "a-c-m-tech");
    }

    #[test]
    fn test_slugify_trims_hyphens() {
        assert_eq!(slugify("  (Robotics)  "), "robotics");
    }

    // -----------------------------------------------------------------------
    // description
    // -----------------------------------------------------------------------

    #[test]
    fn test_description_strips_tags_for_length_check() {
        let result = validate_description("<p><b></b><i>hi</i></p>");
        assert!(result.is_err());
    }

    #[test]
    fn test_description_keeps_markup_when_valid() {
        let result = validate_description("<p>We meet weekly to play chess.</p>").unwrap();
        assert_eq!(result, "<p>We meet weekly to play chess.</p>");
    }

    #[test]
    fn test_short_description_rejected() {
        assert!(validate_description("too short").is_err());
    }

    // -----------------------------------------------------------------------
    // contact email
    // -----------------------------------------------------------------------

    #[test]
    fn test_empty_email_rejected() {
        let result = validate_contact_email("  ");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("contact email"));
    }

    #[test]
    fn test_invalid_email_rejected() {
        assert!(validate_contact_email("not-an-email").is_err());
    }

    #[test]
    fn test_valid_email_trimmed() {
        assert_eq!(
            validate_contact_email(" chess@example.edu ").unwrap(),
            "chess@example.edu"
        );
    }

    // -----------------------------------------------------------------------
    // website
    // -----------------------------------------------------------------------

    #[test]
    fn test_website_defaults_scheme() {
        assert_eq!(
            normalize_website("chess.example.edu").unwrap(),
            "https://chess.example.edu"
        );
    }

    #[test]
    fn test_website_keeps_existing_scheme() {
        assert_eq!(
            normalize_website("http://chess.example.edu").unwrap(),
            "http://chess.example.edu"
        );
    }

    #[test]
    fn test_website_blank_is_ok() {
        assert_eq!(normalize_website("").unwrap(), "");
    }

    #[test]
    fn test_website_garbage_rejected() {
        assert!(normalize_website("not a url").is_err());
    }

    // -----------------------------------------------------------------------
    // social
    // -----------------------------------------------------------------------

    #[test]
    fn test_social_bare_handle() {
        assert_eq!(
            social::github("chess-club"),
            "https://github.com/chess-club/"
        );
    }

    #[test]
    fn test_social_at_handle() {
        assert_eq!(
            social::instagram("@chessclub"),
            "https://instagram.com/chessclub/"
        );
    }

    #[test]
    fn test_social_full_url_passes_through() {
        assert_eq!(
            social::twitter("https://twitter.com/chessclub"),
            "https://twitter.com/chessclub"
        );
    }

    #[test]
    fn test_social_wrong_domain_is_corrected() {
        assert_eq!(
            social::twitter("https://example.com/chessclub"),
            "https://twitter.com/chessclub"
        );
    }

    #[test]
    fn test_social_alternate_domain_kept() {
        assert_eq!(
            social::youtube("https://youtu.be/abc123"),
            "https://youtu.be/abc123"
        );
    }

    #[test]
    fn test_facebook_at_handle_uses_profile_path() {
        assert_eq!(
            social::facebook("@chessclub"),
            "https://facebook.com/chessclub/"
        );
    }

    #[test]
    fn test_facebook_bare_name_uses_groups_path() {
        assert_eq!(
            social::facebook("chessclub"),
            "https://facebook.com/groups/chessclub/"
        );
    }

    #[test]
    fn test_social_blank_stays_blank() {
        assert_eq!(social::twitter(""), "");
    }
}
