//! HTTP-01 challenge descriptors and the mapping of a challenge onto a bucket key.

use serde::{Deserialize, Serialize};

/// HTTP-01 challenge path prefix
pub const ACME_CHALLENGE_PREFIX: &str = "/.well-known/acme-challenge/";

/// The types of challenge the authenticator can solve.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum ChallengeType {
    /// Prove control of a domain by serving a file at a well-known HTTP path
    #[serde(rename = "http-01")]
    Http01,
}

/// A pending HTTP-01 challenge for a single authorization
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Http01Challenge {
    /// The domain being validated
    pub domain: String,
    /// The random token chosen by the ACME server
    pub token: String,
}

impl Http01Challenge {
    pub fn new<D: Into<String>, T: Into<String>>(domain: D, token: T) -> Self {
        Http01Challenge {
            domain: domain.into(),
            token: token.into(),
        }
    }

    /// The request path the ACME server will fetch
    pub fn path(&self) -> String {
        format!("{ACME_CHALLENGE_PREFIX}{}", self.token)
    }

    /// The key under which the challenge file is stored in the bucket
    pub fn storage_key(&self, directory: Option<&str>) -> String {
        storage_key(&self.path(), directory)
    }
}

/// The answer to an HTTP-01 challenge, handed back to the ACME client once the challenge file is
/// reachable.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChallengeResponse {
    /// The key authorization served at the challenge path
    pub key_authorization: String,
}

/// Map a request path onto a bucket key.
///
/// Exactly one leading `/` is removed and the remainder is placed under `directory` when one is
/// configured, matching a distribution whose origin path is that directory.
pub fn storage_key(path: &str, directory: Option<&str>) -> String {
    let key = path.strip_prefix('/').unwrap_or(path);
    match directory {
        Some(directory) if !directory.is_empty() => format!("{directory}/{key}"),
        _ => key.to_owned(),
    }
}
