use crate::challenge::Http01Challenge;
use reqwest::{Client, StatusCode};
use tracing::debug;

/// The result of fetching a published challenge the way the ACME server would
#[derive(Debug)]
pub(crate) enum Verification {
    Valid,
    /// The challenge URL could not be fetched
    Unreachable(reqwest::Error),
    /// The origin answered with a non-success status
    Status(StatusCode),
    /// The origin served something other than the key authorization
    Mismatch { received: String },
}

impl Verification {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verification::Valid)
    }
}

/// Build the URL the ACME server will request for the challenge
pub(crate) fn challenge_url(challenge: &Http01Challenge, port: u16) -> String {
    if port == 80 {
        format!("http://{}{}", challenge.domain, challenge.path())
    } else {
        format!("http://{}:{port}{}", challenge.domain, challenge.path())
    }
}

/// Check that the challenge is served at its well-known path.
///
/// Surrounding whitespace in the response body is ignored.
pub(crate) async fn simple_verify(
    client: &Client,
    challenge: &Http01Challenge,
    key_authorization: &str,
    port: u16,
) -> Verification {
    let url = challenge_url(challenge, port);
    debug!(url = %url, "verifying http-01 challenge");

    let response = match client.get(&url).send().await {
        Ok(response) => response,
        Err(e) => return Verification::Unreachable(e),
    };

    let status = response.status();
    if !status.is_success() {
        return Verification::Status(status);
    }

    match response.text().await {
        Ok(body) if body.trim() == key_authorization => Verification::Valid,
        Ok(body) => Verification::Mismatch { received: body },
        Err(e) => Verification::Unreachable(e),
    }
}

#[cfg(test)]
mod tests {
    use super::{challenge_url, simple_verify, Verification};
    use crate::{
        challenge::Http01Challenge,
        provider::ObjectStore,
        test::{client_for, Calls, MemoryBucket, Origin},
    };
    use reqwest::StatusCode;

    const DOMAIN: &str = "example.com";
    const TOKEN: &str = "testing-token";
    const KEY_AUTHZ: &str = "testing-token.thumbprint";
    const KEY: &str = ".well-known/acme-challenge/testing-token";

    #[test]
    fn url_omits_default_port() {
        let challenge = Http01Challenge::new(DOMAIN, TOKEN);
        assert_eq!(
            challenge_url(&challenge, 80),
            "http://example.com/.well-known/acme-challenge/testing-token"
        );
        assert_eq!(
            challenge_url(&challenge, 5002),
            "http://example.com:5002/.well-known/acme-challenge/testing-token"
        );
    }

    #[tokio::test]
    async fn valid() {
        let bucket = MemoryBucket::new(Calls::default());
        bucket
            .put_object("site", KEY, format!("{KEY_AUTHZ}\n").into_bytes())
            .await
            .unwrap();
        let (addr, handle) = Origin::new(bucket, "site", None).start();

        let verification = simple_verify(
            &client_for(DOMAIN, &addr),
            &Http01Challenge::new(DOMAIN, TOKEN),
            KEY_AUTHZ,
            addr.port(),
        )
        .await;
        assert!(verification.is_valid());

        handle.stop().await.unwrap();
    }

    #[tokio::test]
    async fn missing_file() {
        let bucket = MemoryBucket::new(Calls::default());
        let (addr, handle) = Origin::new(bucket, "site", None).start();

        let verification = simple_verify(
            &client_for(DOMAIN, &addr),
            &Http01Challenge::new(DOMAIN, TOKEN),
            KEY_AUTHZ,
            addr.port(),
        )
        .await;
        assert!(matches!(verification, Verification::Status(StatusCode::NOT_FOUND)));

        handle.stop().await.unwrap();
    }

    #[tokio::test]
    async fn wrong_contents() {
        let bucket = MemoryBucket::new(Calls::default());
        bucket
            .put_object("site", KEY, b"something-else".to_vec())
            .await
            .unwrap();
        let (addr, handle) = Origin::new(bucket, "site", None).start();

        let verification = simple_verify(
            &client_for(DOMAIN, &addr),
            &Http01Challenge::new(DOMAIN, TOKEN),
            KEY_AUTHZ,
            addr.port(),
        )
        .await;
        let Verification::Mismatch { received } = verification else {
            panic!("expected a mismatch")
        };
        assert_eq!(received, "something-else");

        handle.stop().await.unwrap();
    }

    #[tokio::test]
    async fn unreachable() {
        let bucket = MemoryBucket::new(Calls::default());
        let (addr, handle) = Origin::new(bucket, "site", None).start();
        handle.stop().await.unwrap();

        let verification = simple_verify(
            &client_for(DOMAIN, &addr),
            &Http01Challenge::new(DOMAIN, TOKEN),
            KEY_AUTHZ,
            addr.port(),
        )
        .await;
        assert!(matches!(verification, Verification::Unreachable(_)));
    }
}
