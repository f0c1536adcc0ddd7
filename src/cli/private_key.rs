use std::fmt;
use std::str::FromStr;

use ethers::prelude::k256::SecretKey;

#[derive(Debug, Clone)]
pub struct PrivateKey {
    pub key: SecretKey,
}

impl FromStr for PrivateKey {
    type Err = eyre::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches("0x");

        let bytes = hex::decode(s)?;

        let key = SecretKey::from_slice(&bytes)?;

        Ok(Self { key })
    }
}

/// `{:#}` prints the full key, `{}` only a redacted prefix and suffix
impl fmt::Display for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let encoded = hex::encode(self.key.to_bytes());

        if f.alternate() {
            write!(f, "{encoded}")
        } else {
            write!(f, "0x{}..{}", &encoded[..4], &encoded[encoded.len() - 4..])
        }
    }
}
