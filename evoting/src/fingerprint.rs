use crate::*;
use digest::Digest;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::Sha256;
use std::convert::TryInto;
use std::str::FromStr;

const FINGERPRINT_DOMAIN: &[u8] = b"evoting/voter-fingerprint/v1";

/// Voter fingerprint
///
/// The stable key under which a voter's single ballot is stored. It is derived from the
/// voter's roll identity (not from their public key, which a voter could regenerate at will):
///
/// `SHA-256("evoting/voter-fingerprint/v1" || 0x00 || identity)`
///
/// The same derivation is used for the eligibility check, the signed message and the store key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Derive the fingerprint for a roll identity
    pub fn derive(identity: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(FINGERPRINT_DOMAIN);
        hasher.update(&[0u8]);
        hasher.update(identity.as_bytes());
        let digest = hasher.finalize();

        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Fingerprint(bytes)
    }
}

impl FromStr for Fingerprint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|_| Error::FingerprintBadHex)?;
        let bytes: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| Error::FingerprintBadLen)?;
        Ok(Fingerprint(bytes))
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Fingerprint::from_str(&s).map_err(de::Error::custom)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

// Field order is part of the signed format.
#[derive(Serialize)]
struct CanonicalBallot<'a> {
    voter_hash: &'a Fingerprint,
    candidate: &'a str,
}

/// The exact bytes a voter signs and the server re-verifies.
///
/// Compact JSON, fixed field order, no whitespace:
/// `{"voter_hash":"<fingerprint hex>","candidate":"<candidate>"}`
pub fn canonical_message(voter: &Fingerprint, candidate: &str) -> Vec<u8> {
    let package = CanonicalBallot {
        voter_hash: voter,
        candidate,
    };

    serde_json::to_vec(&package).expect("evoting: unexpected error serializing canonical message")
}
