//! Cloud provider integrations
//!
//! The authenticator and installer only talk to the outside world through three traits:
//! - [`ObjectStore`]: the bucket serving as the distribution's origin
//! - [`CertificateStore`]: where server certificates are uploaded for the distribution to use
//! - [`Cdn`]: the distribution whose viewer certificate is rotated
//!
//! The [AWS](aws) implementations are enabled by the `aws` feature. Any other backend, or a test
//! double, can be plugged in by implementing the traits.

use crate::installer::ViewerCertificate;
use chrono::{DateTime, Utc};
use std::{
    error::Error as StdError,
    fmt::{Display, Formatter},
};

#[cfg(feature = "aws")]
#[cfg_attr(docsrs, doc(cfg(feature = "aws")))]
pub mod aws;

pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// An error returned by a provider
#[derive(Debug)]
pub enum ProviderError {
    /// A conditional update was rejected because the resource changed since it was read
    PreconditionFailed,
    /// The request could not be completed
    Request(BoxError),
}

impl ProviderError {
    /// Wrap an arbitrary error as a failed request
    pub fn request<E>(e: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Request(e.into())
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PreconditionFailed => write!(f, "the resource was modified concurrently"),
            Self::Request(e) => write!(f, "{e}"),
        }
    }
}

impl StdError for ProviderError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::PreconditionFailed => None,
            Self::Request(e) => Some(e.as_ref()),
        }
    }
}

/// A bucket the challenge files are published to.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `body` at `key`, readable by anyone
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), ProviderError>;

    /// Remove the object at `key`
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ProviderError>;
}

/// A server certificate held by the [`CertificateStore`]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServerCertificate {
    /// The friendly name the certificate was uploaded with
    pub name: String,
    /// The identifier assigned by the store, referenced by the distribution
    pub id: String,
    /// The path the certificate is grouped under
    pub path: String,
}

/// The PEM-encoded certificate, private key, and chain to upload
#[derive(Clone, Eq, PartialEq)]
pub struct CertificateBundle {
    /// The primary domain of the certificate
    pub domain: String,
    /// The unique name to upload the bundle as
    pub name: String,
    pub body: String,
    pub private_key: String,
    pub chain: String,
    /// When the certificate file was written by the ACME client
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for CertificateBundle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // Never log the private key
        f.debug_struct("CertificateBundle")
            .field("domain", &self.domain)
            .field("name", &self.name)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// A store of server certificates usable by the distribution.
#[async_trait::async_trait]
pub trait CertificateStore: Send + Sync {
    /// List every certificate grouped under `path_prefix`
    async fn list_certificates(
        &self,
        path_prefix: &str,
    ) -> Result<Vec<ServerCertificate>, ProviderError>;

    /// Upload a certificate bundle under `path`
    async fn upload_certificate(
        &self,
        path: &str,
        bundle: &CertificateBundle,
    ) -> Result<ServerCertificate, ProviderError>;

    /// Delete the certificate with the given name
    async fn delete_certificate(&self, name: &str) -> Result<(), ProviderError>;
}

/// The viewer-certificate section of a distribution together with its concurrency token
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DistributionConfig {
    pub viewer_certificate: ViewerCertificate,
    /// Must be presented unchanged when updating the distribution
    pub etag: String,
}

/// A content delivery network holding the distribution.
#[async_trait::async_trait]
pub trait Cdn: Send + Sync {
    /// Fetch the distribution's current configuration
    async fn get_distribution_config(&self, id: &str) -> Result<DistributionConfig, ProviderError>;

    /// Replace the distribution's viewer certificate.
    ///
    /// Must fail with [`ProviderError::PreconditionFailed`] when `etag` is no longer current.
    async fn update_distribution(
        &self,
        id: &str,
        viewer_certificate: &ViewerCertificate,
        etag: &str,
    ) -> Result<(), ProviderError>;
}
