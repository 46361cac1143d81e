use std::fmt::{Display, Formatter};

/// How the distribution serves HTTPS requests
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum SslSupportMethod {
    /// Only clients supporting Server Name Indication are served
    SniOnly,
    /// A dedicated IP address per edge location, billed separately
    Vip,
    StaticIp,
    /// A method this crate doesn't know about, passed through untouched
    Other(String),
}

impl SslSupportMethod {
    pub fn as_str(&self) -> &str {
        match self {
            Self::SniOnly => "sni-only",
            Self::Vip => "vip",
            Self::StaticIp => "static-ip",
            Self::Other(other) => other.as_str(),
        }
    }
}

impl From<&str> for SslSupportMethod {
    fn from(value: &str) -> Self {
        match value {
            "sni-only" => Self::SniOnly,
            "vip" => Self::Vip,
            "static-ip" => Self::StaticIp,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl Display for SslSupportMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the referenced certificate is stored
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum CertificateSource {
    /// The identity and access management server certificate store
    Iam,
    Acm,
    /// The CDN's own default certificate
    CloudFront,
    Other(String),
}

impl CertificateSource {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Iam => "iam",
            Self::Acm => "acm",
            Self::CloudFront => "cloudfront",
            Self::Other(other) => other.as_str(),
        }
    }
}

impl From<&str> for CertificateSource {
    fn from(value: &str) -> Self {
        match value {
            "iam" => Self::Iam,
            "acm" => Self::Acm,
            "cloudfront" => Self::CloudFront,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// The TLS certificate configuration a distribution presents to viewers
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ViewerCertificate {
    pub cloudfront_default_certificate: Option<bool>,
    pub iam_certificate_id: Option<String>,
    pub acm_certificate_arn: Option<String>,
    pub ssl_support_method: Option<SslSupportMethod>,
    pub minimum_protocol_version: Option<String>,
    /// Legacy mirror of the certificate reference
    pub certificate: Option<String>,
    /// Legacy mirror of the certificate origin
    pub certificate_source: Option<CertificateSource>,
}

impl ViewerCertificate {
    /// The store-assigned id of the certificate currently served, if any
    pub fn certificate_id(&self) -> Option<&str> {
        match (&self.iam_certificate_id, &self.certificate_source) {
            (Some(id), _) => Some(id.as_str()),
            (None, Some(CertificateSource::Iam)) => self.certificate.as_deref(),
            _ => None,
        }
    }

    /// Point the distribution at a certificate from the certificate store.
    ///
    /// An unset SSL support method defaults to SNI-only with `minimum_protocol_version`. The
    /// default-certificate flag and any alternate certificate reference are removed.
    pub fn use_certificate(&mut self, certificate_id: &str, minimum_protocol_version: &str) {
        self.iam_certificate_id = Some(certificate_id.to_owned());
        self.certificate = Some(certificate_id.to_owned());
        self.certificate_source = Some(CertificateSource::Iam);

        if self.ssl_support_method.is_none() {
            self.ssl_support_method = Some(SslSupportMethod::SniOnly);
            self.minimum_protocol_version = Some(minimum_protocol_version.to_owned());
        }

        self.cloudfront_default_certificate = None;
        self.acm_certificate_arn = None;
    }
}
