use std::path::{Path, PathBuf};

/// The files making up the current version of a certificate lineage, as laid out by the ACME
/// client in its live directory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Lineage {
    /// The lineage name, which is also the certificate's primary domain
    pub name: String,
    pub cert: PathBuf,
    pub privkey: PathBuf,
    pub chain: PathBuf,
    pub fullchain: PathBuf,
}

impl Lineage {
    /// Locate the lineage `name` under `live_dir`
    pub fn from_live_dir<P: AsRef<Path>, S: Into<String>>(live_dir: P, name: S) -> Self {
        let name = name.into();
        let dir = live_dir.as_ref().join(&name);

        Lineage {
            cert: dir.join("cert.pem"),
            privkey: dir.join("privkey.pem"),
            chain: dir.join("chain.pem"),
            fullchain: dir.join("fullchain.pem"),
            name,
        }
    }
}
