use crate::error::{Error, Result};
use reqwest::Client;
use std::{
    env,
    fmt::{Debug, Formatter},
    path::{Path, PathBuf},
    time::Duration,
};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Region used when the bucket region is not configured
pub const DEFAULT_REGION: &str = "us-east-1";

/// Path under which uploaded certificates are grouped in the certificate store
pub const DEFAULT_CERTIFICATE_PATH: &str = "/cloudfront/letsencrypt/";

/// Where the ACME client keeps the current version of each certificate lineage
pub const DEFAULT_LIVE_DIR: &str = "/etc/letsencrypt/live";

/// Protocol floor applied when a distribution has no SSL support method yet
pub const DEFAULT_MINIMUM_PROTOCOL_VERSION: &str = "TLSv1";

/// Key size assumed when none was requested
pub const DEFAULT_RSA_KEY_SIZE: u32 = 2048;

pub const DEFAULT_HTTP01_PORT: u16 = 80;

/// An explicit access key pair for the cloud provider
#[derive(Clone, Eq, PartialEq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl Credentials {
    pub fn new<A: Into<String>, S: Into<String>>(access_key_id: A, secret_access_key: S) -> Self {
        Credentials {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "** redacted **"),
            )
            .finish()
    }
}

/// A builder used to create a [`Config`]
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    bucket: Option<String>,
    region: Option<String>,
    directory: Option<String>,
    credentials: Option<Credentials>,
    distribution_id: Option<String>,
    rsa_key_size: Option<u32>,
    http01_port: Option<u16>,
    certificate_path: Option<String>,
    live_dir: Option<PathBuf>,
    minimum_protocol_version: Option<String>,
    client: Option<Client>,
}

impl ConfigBuilder {
    /// Creates a new builder with nothing set
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new builder seeded from the environment.
    ///
    /// Reads `S3_BUCKET`, `S3_REGION`, `S3_DIRECTORY`, `CF_DISTRIBUTION_ID`, `RSA_KEY_SIZE`,
    /// `HTTP01_PORT`, `LIVE_DIR`, and the `AWS_ACCESS_KEY_ID`/`AWS_SECRET_ACCESS_KEY` pair with
    /// an optional `AWS_SESSION_TOKEN`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rsa_key_size = lookup("RSA_KEY_SIZE")
            .map(|size| size.trim().parse::<u32>())
            .transpose()
            .map_err(|_| Error::InvalidConfiguration("RSA_KEY_SIZE"))?;
        let http01_port = lookup("HTTP01_PORT")
            .map(|port| port.trim().parse::<u16>())
            .transpose()
            .map_err(|_| Error::InvalidConfiguration("HTTP01_PORT"))?;

        let access_key_id = lookup("AWS_ACCESS_KEY_ID");
        let secret_access_key = lookup("AWS_SECRET_ACCESS_KEY");
        let credentials = match (access_key_id, secret_access_key) {
            (Some(access_key_id), Some(secret_access_key)) => Some(Credentials {
                access_key_id,
                secret_access_key,
                session_token: lookup("AWS_SESSION_TOKEN"),
            }),
            _ => None,
        };

        Ok(ConfigBuilder {
            bucket: lookup("S3_BUCKET"),
            region: lookup("S3_REGION"),
            directory: lookup("S3_DIRECTORY"),
            credentials,
            distribution_id: lookup("CF_DISTRIBUTION_ID"),
            rsa_key_size,
            http01_port,
            live_dir: lookup("LIVE_DIR").map(PathBuf::from),
            ..Self::default()
        })
    }

    /// The bucket referenced by the distribution's origin
    pub fn bucket<S: Into<String>>(mut self, bucket: S) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    /// The region the bucket lives in, defaults to `us-east-1`
    pub fn region<S: Into<String>>(mut self, region: S) -> Self {
        self.region = Some(region.into());
        self
    }

    /// A directory of the bucket, i.e. the distribution's origin path
    pub fn directory<S: Into<String>>(mut self, directory: S) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// Use an explicit key pair instead of the provider's default credential chain
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// The distribution whose viewer certificate is managed
    pub fn distribution_id<S: Into<String>>(mut self, id: S) -> Self {
        self.distribution_id = Some(id.into());
        self
    }

    /// The RSA key size the certificate was requested with, defaults to 2048
    pub fn rsa_key_size(mut self, bits: u32) -> Self {
        self.rsa_key_size = Some(bits);
        self
    }

    /// The port used when self-verifying a challenge, defaults to 80
    pub fn http01_port(mut self, port: u16) -> Self {
        self.http01_port = Some(port);
        self
    }

    /// The certificate store path uploaded certificates are grouped under
    pub fn certificate_path<S: Into<String>>(mut self, path: S) -> Self {
        self.certificate_path = Some(path.into());
        self
    }

    /// The directory holding the current version of each certificate lineage
    pub fn live_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.live_dir = Some(path.into());
        self
    }

    /// The minimum TLS version set alongside the default SSL support method
    pub fn minimum_protocol_version<S: Into<String>>(mut self, version: S) -> Self {
        self.minimum_protocol_version = Some(version.into());
        self
    }

    /// Use a custom [`reqwest::Client`] for self-verification requests
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Build a [`Config`] using the given parameters.
    ///
    /// If no http client is specified, a default client will be created with
    /// the user-agent `s3front/<version>`.
    pub fn build(self) -> Result<Config> {
        let bucket = non_empty(self.bucket, "bucket")?;
        let distribution_id = non_empty(self.distribution_id, "distribution_id")?;
        let region = non_empty(self.region, "region")?.unwrap_or_else(|| DEFAULT_REGION.into());

        let directory = self
            .directory
            .map(|directory| directory.trim_matches('/').to_owned())
            .filter(|directory| !directory.is_empty());

        let rsa_key_size = self.rsa_key_size.unwrap_or(DEFAULT_RSA_KEY_SIZE);
        if rsa_key_size == 0 {
            return Err(Error::InvalidConfiguration("rsa_key_size"));
        }

        let certificate_path = match self.certificate_path {
            Some(path) if path.starts_with('/') && path.ends_with('/') => path,
            Some(_) => return Err(Error::InvalidConfiguration("certificate_path")),
            None => DEFAULT_CERTIFICATE_PATH.into(),
        };

        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .user_agent(USER_AGENT)
                .timeout(Duration::from_secs(10))
                .build()?,
        };

        Ok(Config {
            bucket,
            region,
            directory,
            credentials: self.credentials,
            distribution_id,
            rsa_key_size,
            http01_port: self.http01_port.unwrap_or(DEFAULT_HTTP01_PORT),
            certificate_path,
            live_dir: self
                .live_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LIVE_DIR)),
            minimum_protocol_version: self
                .minimum_protocol_version
                .unwrap_or_else(|| DEFAULT_MINIMUM_PROTOCOL_VERSION.into()),
            client,
        })
    }
}

fn non_empty(value: Option<String>, name: &'static str) -> Result<Option<String>> {
    match value {
        Some(value) if value.trim().is_empty() => Err(Error::InvalidConfiguration(name)),
        value => Ok(value),
    }
}

/// Settings shared by the authenticator and the installer
#[derive(Clone, Debug)]
pub struct Config {
    bucket: Option<String>,
    region: String,
    directory: Option<String>,
    credentials: Option<Credentials>,
    distribution_id: Option<String>,
    rsa_key_size: u32,
    http01_port: u16,
    certificate_path: String,
    live_dir: PathBuf,
    minimum_protocol_version: String,
    client: Client,
}

impl Config {
    /// Start configuring a new [`Config`]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// The bucket challenge files are written to
    pub fn bucket(&self) -> Result<&str> {
        self.bucket
            .as_deref()
            .ok_or(Error::MissingConfiguration("bucket"))
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn directory(&self) -> Option<&str> {
        self.directory.as_deref()
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// The distribution whose viewer certificate is managed
    pub fn distribution_id(&self) -> Result<&str> {
        self.distribution_id
            .as_deref()
            .ok_or(Error::MissingConfiguration("distribution_id"))
    }

    pub fn rsa_key_size(&self) -> u32 {
        self.rsa_key_size
    }

    pub fn http01_port(&self) -> u16 {
        self.http01_port
    }

    pub fn certificate_path(&self) -> &str {
        &self.certificate_path
    }

    pub fn live_dir(&self) -> &Path {
        &self.live_dir
    }

    pub fn minimum_protocol_version(&self) -> &str {
        &self.minimum_protocol_version
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }
}
