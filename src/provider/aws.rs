//! Amazon S3, IAM, and CloudFront
//!
//! IAM and CloudFront are global services and are always addressed through `us-east-1`. The
//! bucket is addressed through the configured region.

use super::{
    CertificateBundle, CertificateStore, Cdn, DistributionConfig, ObjectStore, ProviderError,
    ServerCertificate,
};
use crate::{
    installer::{CertificateSource, SslSupportMethod, ViewerCertificate},
    Config,
};
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_cloudfront::types as cloudfront;
use aws_sdk_iam::types::ServerCertificateMetadata;
use aws_sdk_s3::{
    config::{Credentials, Region},
    primitives::ByteStream,
    types::ObjectCannedAcl,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Region of the global services
pub const GLOBAL_REGION: &str = "us-east-1";

const PROVIDER_NAME: &str = "s3front";

async fn sdk_config(config: &Config, region: &str) -> SdkConfig {
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_owned()));

    if let Some(credentials) = config.credentials() {
        loader = loader.credentials_provider(Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            credentials.session_token.clone(),
            None,
            PROVIDER_NAME,
        ));
    }

    loader.load().await
}

/// Load the SDK configuration used for IAM and CloudFront
pub async fn global_sdk_config(config: &Config) -> SdkConfig {
    sdk_config(config, GLOBAL_REGION).await
}

/// An S3 bucket serving as the distribution's origin
#[derive(Clone, Debug)]
pub struct S3Bucket {
    client: aws_sdk_s3::Client,
}

impl S3Bucket {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        S3Bucket {
            client: aws_sdk_s3::Client::new(sdk_config),
        }
    }

    /// Connect to S3 in the configured region
    pub async fn from_config(config: &Config) -> Self {
        Self::new(&sdk_config(config, config.region()).await)
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3Bucket {
    #[instrument(level = "debug", skip(self, body))]
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
    ) -> Result<(), ProviderError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .acl(ObjectCannedAcl::PublicRead)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| ProviderError::request(e.into_service_error()))?;

        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ProviderError> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| ProviderError::request(e.into_service_error()))?;

        Ok(())
    }
}

/// The IAM server certificate store
#[derive(Clone, Debug)]
pub struct IamCertificateStore {
    client: aws_sdk_iam::Client,
}

impl IamCertificateStore {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        IamCertificateStore {
            client: aws_sdk_iam::Client::new(sdk_config),
        }
    }
}

fn server_certificate(metadata: &ServerCertificateMetadata) -> ServerCertificate {
    ServerCertificate {
        name: metadata.server_certificate_name().to_owned(),
        id: metadata.server_certificate_id().to_owned(),
        path: metadata.path().to_owned(),
    }
}

#[async_trait::async_trait]
impl CertificateStore for IamCertificateStore {
    #[instrument(level = "debug", skip(self))]
    async fn list_certificates(
        &self,
        path_prefix: &str,
    ) -> Result<Vec<ServerCertificate>, ProviderError> {
        let mut certificates = Vec::new();
        let mut marker = None;

        loop {
            let output = self
                .client
                .list_server_certificates()
                .path_prefix(path_prefix)
                .set_marker(marker.take())
                .send()
                .await
                .map_err(|e| ProviderError::request(e.into_service_error()))?;

            certificates.extend(
                output
                    .server_certificate_metadata_list()
                    .iter()
                    .map(server_certificate),
            );

            match output.marker() {
                Some(next) if output.is_truncated() => marker = Some(next.to_owned()),
                _ => break,
            }
        }

        debug!(count = certificates.len(), "listed server certificates");
        Ok(certificates)
    }

    #[instrument(level = "debug", skip_all, fields(name = %bundle.name))]
    async fn upload_certificate(
        &self,
        path: &str,
        bundle: &CertificateBundle,
    ) -> Result<ServerCertificate, ProviderError> {
        let output = self
            .client
            .upload_server_certificate()
            .path(path)
            .server_certificate_name(&bundle.name)
            .certificate_body(&bundle.body)
            .private_key(&bundle.private_key)
            .certificate_chain(&bundle.chain)
            .send()
            .await
            .map_err(|e| ProviderError::request(e.into_service_error()))?;

        let metadata = output
            .server_certificate_metadata()
            .ok_or_else(|| ProviderError::request("no certificate metadata in the response"))?;
        Ok(server_certificate(metadata))
    }

    #[instrument(level = "debug", skip(self))]
    async fn delete_certificate(&self, name: &str) -> Result<(), ProviderError> {
        self.client
            .delete_server_certificate()
            .server_certificate_name(name)
            .send()
            .await
            .map_err(|e| ProviderError::request(e.into_service_error()))?;

        Ok(())
    }
}

/// CloudFront distributions.
///
/// Updates replace the whole distribution configuration, so every configuration fetched is kept
/// until it is written back with only its viewer certificate changed.
#[derive(Debug)]
pub struct CloudFrontDistributions {
    client: aws_sdk_cloudfront::Client,
    fetched: Mutex<HashMap<(String, String), cloudfront::DistributionConfig>>,
}

impl CloudFrontDistributions {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        CloudFrontDistributions {
            client: aws_sdk_cloudfront::Client::new(sdk_config),
            fetched: Mutex::new(HashMap::new()),
        }
    }
}

/// Cache a fetched configuration, replacing any older one of the same distribution
fn remember<T>(fetched: &mut HashMap<(String, String), T>, id: &str, etag: &str, config: T) {
    fetched.retain(|(cached, _), _| cached != id);
    fetched.insert((id.to_owned(), etag.to_owned()), config);
}

fn from_sdk(viewer: &cloudfront::ViewerCertificate) -> ViewerCertificate {
    ViewerCertificate {
        cloudfront_default_certificate: viewer.cloud_front_default_certificate(),
        iam_certificate_id: viewer.iam_certificate_id().map(str::to_owned),
        acm_certificate_arn: viewer.acm_certificate_arn().map(str::to_owned),
        ssl_support_method: viewer
            .ssl_support_method()
            .map(|method| SslSupportMethod::from(method.as_str())),
        minimum_protocol_version: viewer
            .minimum_protocol_version()
            .map(|version| version.as_str().to_owned()),
        certificate: viewer.certificate().map(str::to_owned),
        certificate_source: viewer
            .certificate_source()
            .map(|source| CertificateSource::from(source.as_str())),
    }
}

fn to_sdk(viewer: &ViewerCertificate) -> cloudfront::ViewerCertificate {
    cloudfront::ViewerCertificate::builder()
        .set_cloud_front_default_certificate(viewer.cloudfront_default_certificate)
        .set_iam_certificate_id(viewer.iam_certificate_id.clone())
        .set_acm_certificate_arn(viewer.acm_certificate_arn.clone())
        .set_ssl_support_method(
            viewer
                .ssl_support_method
                .as_ref()
                .map(|method| cloudfront::SslSupportMethod::from(method.as_str())),
        )
        .set_minimum_protocol_version(
            viewer
                .minimum_protocol_version
                .as_deref()
                .map(cloudfront::MinimumProtocolVersion::from),
        )
        .set_certificate(viewer.certificate.clone())
        .set_certificate_source(
            viewer
                .certificate_source
                .as_ref()
                .map(|source| cloudfront::CertificateSource::from(source.as_str())),
        )
        .build()
}

#[async_trait::async_trait]
impl Cdn for CloudFrontDistributions {
    #[instrument(level = "debug", skip(self))]
    async fn get_distribution_config(&self, id: &str) -> Result<DistributionConfig, ProviderError> {
        let output = self
            .client
            .get_distribution_config()
            .id(id)
            .send()
            .await
            .map_err(|e| ProviderError::request(e.into_service_error()))?;

        let etag = output
            .e_tag()
            .ok_or_else(|| ProviderError::request("the distribution config has no etag"))?
            .to_owned();
        let config = output
            .distribution_config()
            .ok_or_else(|| ProviderError::request("the distribution config is missing"))?
            .clone();

        let viewer_certificate = config
            .viewer_certificate()
            .map(from_sdk)
            .unwrap_or_default();

        remember(&mut self.fetched.lock(), id, &etag, config);

        Ok(DistributionConfig {
            viewer_certificate,
            etag,
        })
    }

    #[instrument(level = "debug", skip(self, viewer_certificate))]
    async fn update_distribution(
        &self,
        id: &str,
        viewer_certificate: &ViewerCertificate,
        etag: &str,
    ) -> Result<(), ProviderError> {
        let mut config = self
            .fetched
            .lock()
            .remove(&(id.to_owned(), etag.to_owned()))
            .ok_or(ProviderError::PreconditionFailed)?;
        config.viewer_certificate = Some(to_sdk(viewer_certificate));

        let result = self
            .client
            .update_distribution()
            .id(id)
            .if_match(etag)
            .distribution_config(config)
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let e = e.into_service_error();
                if e.is_precondition_failed() {
                    Err(ProviderError::PreconditionFailed)
                } else {
                    Err(ProviderError::request(e))
                }
            }
        }
    }
}
