#![cfg_attr(docsrs, feature(doc_cfg))]

mod authenticator;
mod challenge;
mod config;
mod error;
mod installer;
mod jwk;
mod lineage;
mod plugin;
pub mod provider;

pub use authenticator::S3Authenticator;
pub use challenge::{ChallengeResponse, ChallengeType, Http01Challenge, ACME_CHALLENGE_PREFIX};
pub use config::{
    Config, ConfigBuilder, Credentials, DEFAULT_CERTIFICATE_PATH, DEFAULT_HTTP01_PORT,
    DEFAULT_LIVE_DIR, DEFAULT_MINIMUM_PROTOCOL_VERSION, DEFAULT_REGION, DEFAULT_RSA_KEY_SIZE,
};
pub use error::{CleanupFailure, Error};
pub use installer::{
    naming, CertificateSource, CloudFrontInstaller, DeployOutcome, Deployment, SslSupportMethod,
    ViewerCertificate, MAX_KEY_SIZE,
};
pub use jwk::AccountKey;
pub use lineage::Lineage;
pub use plugin::{Authenticator, Enhancement, Installer};
