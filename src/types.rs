use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FaucetError;

pub type AccountId = String;
pub type Salt = u64;

pub const PUBLIC_KEY_LEN: usize = 33;

/// Compressed elliptic-curve public key bound to a newly created account.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct PublicKey([u8; PUBLIC_KEY_LEN]);

impl PublicKey {
    pub fn new(bytes: [u8; PUBLIC_KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.0
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = FaucetError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; PUBLIC_KEY_LEN] = value
            .try_into()
            .map_err(|_| FaucetError::InvalidPublicKey {
                expected: PUBLIC_KEY_LEN,
                actual: value.len(),
            })?;
        Ok(Self(bytes))
    }
}

impl TryFrom<Vec<u8>> for PublicKey {
    type Error = FaucetError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Self::try_from(value.as_slice())
    }
}

impl From<PublicKey> for Vec<u8> {
    fn from(value: PublicKey) -> Self {
        value.0.to_vec()
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey(")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreationRequest {
    pub account_id: AccountId,
    pub public_key: PublicKey,
    pub salt: Salt,
}

impl CreationRequest {
    pub fn new(account_id: impl Into<AccountId>, public_key: PublicKey, salt: Salt) -> Self {
        Self {
            account_id: account_id.into(),
            public_key,
            salt,
        }
    }
}
