use crate::{
    challenge::{ChallengeResponse, ChallengeType, Http01Challenge},
    error::{CleanupFailure, Error, Result},
    plugin::Authenticator,
    provider::ObjectStore,
    AccountKey, Config,
};
use reqwest::Client;
use std::fmt::{Debug, Formatter};
use tracing::{debug, error, info, warn};

mod verify;

/// Solves HTTP-01 challenges by publishing them to the bucket behind a distribution.
///
/// The challenge file is written with public-read visibility at the challenge path, below the
/// configured directory, and is then fetched over HTTP to make sure the distribution serves it
/// before the CA is asked to validate.
pub struct S3Authenticator {
    store: Box<dyn ObjectStore>,
    bucket: String,
    directory: Option<String>,
    http01_port: u16,
    client: Client,
}

impl S3Authenticator {
    /// Create an authenticator publishing through `store`.
    ///
    /// Fails if no bucket is configured.
    pub fn new(config: &Config, store: Box<dyn ObjectStore>) -> Result<Self> {
        Ok(S3Authenticator {
            store,
            bucket: config.bucket()?.to_owned(),
            directory: config.directory().map(str::to_owned),
            http01_port: config.http01_port(),
            client: config.client().clone(),
        })
    }

    /// Create an authenticator publishing to S3 with credentials from the configuration
    #[cfg(feature = "aws")]
    #[cfg_attr(docsrs, doc(cfg(feature = "aws")))]
    pub async fn from_config(config: &Config) -> Result<Self> {
        let store = crate::provider::aws::S3Bucket::from_config(config).await;
        Self::new(config, Box::new(store))
    }

    fn storage_key(&self, challenge: &Http01Challenge) -> String {
        challenge.storage_key(self.directory.as_deref())
    }

    async fn perform_single(
        &self,
        challenge: &Http01Challenge,
        account: &AccountKey,
    ) -> Result<Option<ChallengeResponse>> {
        let key = self.storage_key(challenge);
        let key_authorization = account.key_authorization(&challenge.token);

        debug!(bucket = %self.bucket, key = %key, "uploading challenge file");
        self.store
            .put_object(&self.bucket, &key, key_authorization.clone().into_bytes())
            .await
            .map_err(Error::provider("put_object"))?;
        info!(domain = %challenge.domain, key = %key, "published http-01 challenge");

        let verification = verify::simple_verify(
            &self.client,
            challenge,
            &key_authorization,
            self.http01_port,
        )
        .await;

        if verification.is_valid() {
            Ok(Some(ChallengeResponse { key_authorization }))
        } else {
            error!(
                domain = %challenge.domain,
                reason = ?verification,
                "Self-verify of challenge failed, authorization abandoned!"
            );
            Ok(None)
        }
    }
}

#[async_trait::async_trait]
impl Authenticator for S3Authenticator {
    fn challenge_preference(&self, _domain: &str) -> Vec<ChallengeType> {
        vec![ChallengeType::Http01]
    }

    async fn perform(
        &self,
        challenges: &[Http01Challenge],
        account: &AccountKey,
    ) -> Result<Vec<Option<ChallengeResponse>>> {
        let mut responses = Vec::with_capacity(challenges.len());
        for challenge in challenges {
            responses.push(self.perform_single(challenge, account).await?);
        }

        Ok(responses)
    }

    /// Delete every challenge file, even after one of the deletions failed.
    async fn cleanup(&self, challenges: &[Http01Challenge]) -> Result<()> {
        let mut failures = Vec::new();

        for challenge in challenges {
            let key = self.storage_key(challenge);
            debug!(bucket = %self.bucket, key = %key, "deleting challenge file");

            if let Err(source) = self.store.delete_object(&self.bucket, &key).await {
                warn!(key = %key, error = %source, "failed to delete challenge file");
                failures.push(CleanupFailure { key, source });
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::Cleanup(failures))
        }
    }
}

impl Debug for S3Authenticator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // `ObjectStore` doesn't implement debug, so only show where challenges end up
        f.debug_struct("S3Authenticator")
            .field("bucket", &self.bucket)
            .field("directory", &self.directory)
            .field("http01_port", &self.http01_port)
            .finish()
    }
}
