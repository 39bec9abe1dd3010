use crate::identity::Address;
use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const KEY_LENGTH: usize = 32;

#[derive(Error, Debug)]
pub enum KeypairError {
    #[error("Invalid key length: expected {expected}, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("Invalid key bytes: {0}")]
    InvalidBytes(String),
}

fn to_key_array(bytes: &[u8]) -> Result<[u8; KEY_LENGTH], KeypairError> {
    bytes.try_into().map_err(|_| KeypairError::InvalidLength {
        expected: KEY_LENGTH,
        got: bytes.len(),
    })
}

/// Ed25519 public key of a transaction signer
///
/// Serialized as its 32 raw bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct PublicKey(VerifyingKey);

impl TryFrom<Vec<u8>> for PublicKey {
    type Error = KeypairError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        Self::from_bytes(&bytes)
    }
}

impl From<PublicKey> for Vec<u8> {
    fn from(key: PublicKey) -> Self {
        key.0.to_bytes().to_vec()
    }
}

impl PublicKey {
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeypairError> {
        let array = to_key_array(bytes)?;
        let verifying_key = VerifyingKey::from_bytes(&array)
            .map_err(|e| KeypairError::InvalidBytes(e.to_string()))?;
        Ok(Self(verifying_key))
    }

    /// Account address controlled by this key
    pub fn address(&self) -> Address {
        Address::from_public_key(self)
    }

    pub(crate) fn inner(&self) -> &VerifyingKey {
        &self.0
    }
}

/// Ed25519 keypair used to sign governance transactions
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key())
    }

    /// Shortcut for `public_key().address()`
    pub fn address(&self) -> Address {
        self.public_key().address()
    }

    /// Secret key bytes, the only thing needed to restore the keypair
    pub fn to_bytes(&self) -> Vec<u8> {
        self.signing_key.to_bytes().to_vec()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeypairError> {
        let array = to_key_array(bytes)?;
        Ok(Self {
            signing_key: SigningKey::from_bytes(&array),
        })
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
