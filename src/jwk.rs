use crate::error::{Error, Result};
use base64::engine::{general_purpose::URL_SAFE_NO_PAD as BASE64, Engine};
use openssl::{
    bn::{BigNum, BigNumContext},
    hash::{hash, MessageDigest},
    nid::Nid,
    pkey::{HasPublic, Id, PKeyRef},
};
use serde::{ser::SerializeStruct, Serialize, Serializer};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
enum Curve {
    #[serde(rename = "P-256")]
    P256,
    #[serde(rename = "P-384")]
    P384,
    #[serde(rename = "P-521")]
    P521,
}

impl Curve {
    /// Length in bytes of a field element, coordinates are padded to this size
    fn coordinate_size(self) -> i32 {
        match self {
            Curve::P256 => 32,
            Curve::P384 => 48,
            Curve::P521 => 66,
        }
    }
}

impl TryFrom<Nid> for Curve {
    type Error = Error;

    fn try_from(group: Nid) -> Result<Self, Self::Error> {
        match group {
            Nid::X9_62_PRIME256V1 => Ok(Curve::P256),
            Nid::SECP384R1 => Ok(Curve::P384),
            Nid::SECP521R1 => Ok(Curve::P521),
            _ => Err(Error::UnsupportedECDSACurve),
        }
    }
}

/// The public half of an account key
#[derive(Debug)]
enum Jwk {
    Rsa { e: String, n: String },
    EC { crv: Curve, x: String, y: String },
}

impl<T: HasPublic> TryFrom<&PKeyRef<T>> for Jwk {
    type Error = Error;

    fn try_from(key: &PKeyRef<T>) -> Result<Self, Self::Error> {
        match key.id() {
            Id::RSA => {
                let rsa = key.rsa()?;
                Ok(Jwk::Rsa {
                    e: BASE64.encode(rsa.e().to_vec()),
                    n: BASE64.encode(rsa.n().to_vec()),
                })
            }
            Id::EC => {
                let ec = key.ec_key()?;
                let ec_public = ec.public_key();

                let curve = ec
                    .group()
                    .curve_name()
                    .ok_or(Error::UnsupportedECDSACurve)?;
                let crv = Curve::try_from(curve)?;

                let mut ctx = BigNumContext::new()?;
                let mut x = BigNum::new()?;
                let mut y = BigNum::new()?;
                ec_public.affine_coordinates_gfp(ec.group(), &mut x, &mut y, &mut ctx)?;

                let size = crv.coordinate_size();
                Ok(Jwk::EC {
                    x: BASE64.encode(x.to_vec_padded(size)?),
                    y: BASE64.encode(y.to_vec_padded(size)?),
                    crv,
                })
            }
            _ => Err(Error::UnsupportedKeyType),
        }
    }
}

// We manually implement serialization to ensure lexicographical ordering of the fields per
// RFC 7638 Section 3 (https://www.rfc-editor.org/rfc/rfc7638#section-3)
impl Serialize for Jwk {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // 1 + number of fields taking into account the `kty`
        let (fields, kty) = match self {
            Self::Rsa { .. } => (3, "RSA"),
            Self::EC { .. } => (4, "EC"),
        };

        let mut state = serializer.serialize_struct("Jwk", fields)?;
        match self {
            Self::Rsa { e, n } => {
                state.serialize_field("e", e)?;
                state.serialize_field("kty", kty)?;
                state.serialize_field("n", n)?;
            }
            Self::EC { crv, x, y } => {
                state.serialize_field("crv", crv)?;
                state.serialize_field("kty", kty)?;
                state.serialize_field("x", x)?;
                state.serialize_field("y", y)?;
            }
        }
        state.end()
    }
}

/// The ACME account key, reduced to what is needed to answer challenges.
///
/// Only the [RFC 7638](https://www.rfc-editor.org/rfc/rfc7638) thumbprint of the public key is
/// kept, so an `AccountKey` can be built from either half of the key pair.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccountKey {
    thumbprint: String,
}

impl AccountKey {
    /// Compute the thumbprint of an RSA or ECDSA account key
    pub fn from_key<T: HasPublic>(key: &PKeyRef<T>) -> Result<Self> {
        let jwk = Jwk::try_from(key)?;
        let serialized = serde_json::to_vec(&jwk)?;
        let digest = hash(MessageDigest::sha256(), &serialized)?;

        Ok(AccountKey {
            thumbprint: BASE64.encode(digest),
        })
    }

    /// The base64url-encoded SHA-256 JWK thumbprint
    pub fn thumbprint(&self) -> &str {
        &self.thumbprint
    }

    /// Generate the key authorization for a challenge token
    pub fn key_authorization(&self, token: &str) -> String {
        format!("{token}.{}", self.thumbprint)
    }
}
