//! Contracts between the ACME client and the plugins
//!
//! The ACME client drives every call; the plugins keep no state between invocations except what
//! is needed to make a renewal cycle idempotent.
//!
//! ## Authenticator
//! Called for each authorization of an order. The client asks which challenge types are
//! preferred, hands over the pending challenges to [`Authenticator::perform`], asks the CA to
//! validate the ones that returned a response, and finally calls [`Authenticator::cleanup`]
//! regardless of the outcome.
//!
//! ## Installer
//! Called once the certificate is issued. [`Installer::deploy_cert`] is invoked once per domain
//! on the certificate, followed by [`Installer::save`]. On later renewals of an already installed
//! lineage the client fires [`Installer::renew_deploy`] instead.

use crate::{
    challenge::{ChallengeResponse, ChallengeType, Http01Challenge},
    error::Result,
    installer::DeployOutcome,
    lineage::Lineage,
    AccountKey,
};
use std::path::Path;

/// Proves control over domains to the CA.
#[async_trait::async_trait]
pub trait Authenticator: Send + Sync {
    /// The challenge types this authenticator can solve for `domain`, most preferred first
    fn challenge_preference(&self, domain: &str) -> Vec<ChallengeType>;

    /// Make the challenges available to the CA.
    ///
    /// Returns one entry per challenge, in order. `None` means the challenge could not be
    /// verified locally and the authorization should be abandoned.
    async fn perform(
        &self,
        challenges: &[Http01Challenge],
        account: &AccountKey,
    ) -> Result<Vec<Option<ChallengeResponse>>>;

    /// Remove whatever [`Authenticator::perform`] put in place for the challenges
    async fn cleanup(&self, challenges: &[Http01Challenge]) -> Result<()>;
}

/// Enhancements an installer may apply on top of the certificate
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Enhancement {
    Redirect,
    Hsts,
    StapleOcsp,
}

/// Installs issued certificates.
#[async_trait::async_trait]
pub trait Installer: Send + Sync {
    /// Deploy the certificate found at the given paths for `domain`
    async fn deploy_cert(
        &self,
        domain: &str,
        cert_path: &Path,
        key_path: &Path,
        chain_path: &Path,
        fullchain_path: &Path,
    ) -> Result<DeployOutcome>;

    /// Commit the changes made since the last save
    async fn save(&self) -> Result<()>;

    /// Redeploy the certificates of the given domains that were installed previously
    async fn restart(&self, domains: &[String]) -> Result<Vec<DeployOutcome>>;

    /// The enhancements this installer can apply
    fn supported_enhancements(&self) -> Vec<Enhancement> {
        Vec::new()
    }

    /// Keep an installed lineage in sync after it was renewed
    async fn renew_deploy(&self, lineage: &Lineage) -> Result<DeployOutcome> {
        let outcome = self
            .deploy_cert(
                &lineage.name,
                &lineage.cert,
                &lineage.privkey,
                &lineage.chain,
                &lineage.fullchain,
            )
            .await?;
        self.save().await?;

        Ok(outcome)
    }
}
