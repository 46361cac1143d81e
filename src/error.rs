use crate::provider::ProviderError;
use openssl::error::ErrorStack;
use std::{
    error::Error as StdError,
    fmt::{Display, Formatter},
    io,
    path::PathBuf,
};

pub(crate) type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum Error {
    /// The configured RSA key size exceeds what the CDN accepts
    KeyTooLarge { size: u32, max: u32 },
    /// A required configuration option was not set
    MissingConfiguration(&'static str),
    /// A configuration option was set to an unusable value
    InvalidConfiguration(&'static str),
    /// The distribution changed since its configuration was fetched
    ConcurrencyConflict { distribution_id: String },
    /// A request to the storage, certificate store, or CDN provider failed
    Provider {
        operation: &'static str,
        source: ProviderError,
    },
    /// Some challenge files could not be removed from the bucket
    Cleanup(Vec<CleanupFailure>),
    /// Failed to construct the HTTP client used for self-verification
    Reqwest(reqwest::Error),
    /// Failed to read a certificate, key, or chain file
    Io { path: PathBuf, source: io::Error },
    /// An error occurred in OpenSSL while deriving the account key thumbprint
    OpenSSL(ErrorStack),
    /// Failed serializing the account key
    Serialization(serde_json::Error),
    /// The account key is not an RSA or ECDSA key
    UnsupportedKeyType,
    /// The ECDSA account key uses a curve other than P-256, P-384, or P-521
    UnsupportedECDSACurve,
}

impl Error {
    pub(crate) fn provider(operation: &'static str) -> impl FnOnce(ProviderError) -> Error {
        move |source| Error::Provider { operation, source }
    }

    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Error {
        let path = path.into();
        move |source| Error::Io { path, source }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KeyTooLarge { size, max } => write!(
                f,
                "the maximum public key size allowed for CloudFront is {max} bits, got {size} bits"
            ),
            Self::MissingConfiguration(name) => write!(f, "the `{name}` option is required"),
            Self::InvalidConfiguration(name) => write!(f, "the value of `{name}` is invalid"),
            Self::ConcurrencyConflict { distribution_id } => write!(
                f,
                "distribution `{distribution_id}` was modified concurrently, retry the deployment"
            ),
            Self::Provider { operation, .. } => write!(f, "the `{operation}` request failed"),
            Self::Cleanup(failures) => {
                write!(f, "failed to remove {} challenge file(s)", failures.len())
            }
            Self::Reqwest(_) => write!(f, "failed to build the http client"),
            Self::Io { path, .. } => write!(f, "failed to read `{}`", path.display()),
            Self::OpenSSL(_) => write!(f, "an error occurred in openssl"),
            Self::Serialization(_) => write!(f, "failed to serialize the account key"),
            Self::UnsupportedKeyType => write!(f, "only RSA and ECDSA keys are supported"),
            Self::UnsupportedECDSACurve => {
                write!(f, "only the P-256, P-384, and P-521 curves are supported")
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Provider { source, .. } => Some(source),
            Self::Reqwest(e) => Some(e),
            Self::Io { source, .. } => Some(source),
            Self::OpenSSL(e) => Some(e),
            Self::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Reqwest(err)
    }
}

impl From<ErrorStack> for Error {
    fn from(err: ErrorStack) -> Self {
        Self::OpenSSL(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err)
    }
}

/// A challenge file that could not be removed during cleanup
#[derive(Debug)]
pub struct CleanupFailure {
    /// The object key that is still present in the bucket
    pub key: String,
    /// Why the deletion failed
    pub source: ProviderError,
}

impl Display for CleanupFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to delete `{}`: {}", self.key, self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::{CleanupFailure, Error};
    use crate::provider::ProviderError;
    use std::error::Error as _;

    #[test]
    fn key_too_large_message() {
        let error = Error::KeyTooLarge {
            size: 4096,
            max: 2048,
        };
        assert_eq!(
            error.to_string(),
            "the maximum public key size allowed for CloudFront is 2048 bits, got 4096 bits"
        );
    }

    #[test]
    fn provider_error_exposes_source() {
        let error = Error::provider("put_object")(ProviderError::request("access denied"));
        assert_eq!(error.to_string(), "the `put_object` request failed");
        assert_eq!(error.source().unwrap().to_string(), "access denied");
    }

    #[test]
    fn cleanup_counts_failures() {
        let error = Error::Cleanup(vec![
            CleanupFailure {
                key: "a".into(),
                source: ProviderError::request("boom"),
            },
            CleanupFailure {
                key: "b".into(),
                source: ProviderError::request("boom"),
            },
        ]);
        assert_eq!(error.to_string(), "failed to remove 2 challenge file(s)");
    }
}
