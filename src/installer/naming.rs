//! Names of the certificates uploaded to the certificate store.
//!
//! Certificates are named `le-<domain>-<suffix>`, where the suffix is the modification time of the
//! certificate file in seconds since the Unix epoch. Each renewal therefore gets a fresh name and
//! never collides with the certificate still being served.

use chrono::{DateTime, Utc};

/// Prefix of every certificate uploaded by the installer
pub const CERTIFICATE_PREFIX: &str = "le-";

/// The name shared by every certificate issued for `domain`
pub fn base_name(domain: &str) -> String {
    format!("{CERTIFICATE_PREFIX}{domain}")
}

/// The unique name for the certificate of `domain` written at `created_at`
pub fn certificate_name(domain: &str, created_at: DateTime<Utc>) -> String {
    format!("{}-{}", base_name(domain), created_at.timestamp())
}

/// Recover the domain from a certificate name.
///
/// Both `le-example.com` and `le-example.com-1700000000` yield `example.com`. Names without the
/// installer's prefix yield `None`.
pub fn domain_from_certificate_name(name: &str) -> Option<&str> {
    let name = name.strip_prefix(CERTIFICATE_PREFIX)?;

    let domain = match name.rsplit_once('-') {
        Some((domain, suffix))
            if !domain.is_empty()
                && !suffix.is_empty()
                && suffix.bytes().all(|b| b.is_ascii_digit()) =>
        {
            domain
        }
        _ => name,
    };

    (!domain.is_empty()).then_some(domain)
}

/// Whether a stored certificate was issued for `domain`.
///
/// Stricter than matching the `le-<domain>` prefix, so `le-example.com.au-…` never belongs to
/// `example.com`.
pub fn belongs_to(name: &str, domain: &str) -> bool {
    domain_from_certificate_name(name) == Some(domain)
}
