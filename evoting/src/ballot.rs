use crate::*;
use ed25519_dalek::PublicKey;
use ed25519_dalek::Signature;
use uuid::Uuid;

/// A recorded ballot.
///
/// The key and signature are kept as the raw bytes the voter sent, so a damaged or tampered
/// store entry can still be loaded and then excluded at tally time.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Ballot {
    pub voter: Fingerprint,
    pub candidate: String,

    #[serde(with = "crate::serde_b64")]
    pub public_key: Vec<u8>,

    #[serde(with = "crate::serde_b64")]
    pub signature: Vec<u8>,

    /// Confirmation receipt handed back to the voter
    pub receipt: Uuid,
}

impl Ballot {
    pub fn new(
        voter: Fingerprint,
        candidate: String,
        public_key: Vec<u8>,
        signature: Vec<u8>,
    ) -> Self {
        Ballot {
            voter,
            candidate,
            public_key,
            signature,
            receipt: Uuid::new_v4(),
        }
    }

    /// Re-check the signature against the canonical message for this ballot
    pub fn verify_signature(&self) -> Verification {
        verify_ballot(&self.voter, &self.candidate, &self.public_key, &self.signature)
    }
}

/// A ballot submission as it arrives from a voting client.
///
/// Every field is optional on the wire so that an incomplete request can be told apart from
/// an ineligible one. `public_key` and `signature` are base64.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct BallotRequest {
    #[serde(default, alias = "voter_id")]
    pub identity: Option<String>,

    #[serde(default, alias = "voter_card_number")]
    pub card_number: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub full_name: Option<String>,

    #[serde(default)]
    pub candidate: Option<String>,

    #[serde(default)]
    pub public_key: Option<String>,

    #[serde(default)]
    pub signature: Option<String>,

    /// Fingerprint as computed by the client, checked against the server's derivation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voter_hash: Option<String>,
}

impl BallotRequest {
    /// Build and sign a request the way a voting client does
    pub fn signed(
        claim: &VoterClaim,
        candidate: &str,
        secret: &ed25519_dalek::SecretKey,
    ) -> Self {
        let voter = Fingerprint::derive(&claim.identity);
        let public_key = PublicKey::from(secret);
        let signature: Signature = sign_ballot(secret, &voter, candidate);

        BallotRequest {
            identity: Some(claim.identity.clone()),
            card_number: Some(claim.card_number.clone()),
            email: Some(claim.email.clone()),
            full_name: Some(claim.full_name.clone()),
            candidate: Some(candidate.to_owned()),
            public_key: Some(base64::encode(public_key.as_bytes())),
            signature: Some(base64::encode(&signature.to_bytes()[..])),
            voter_hash: Some(voter.to_string()),
        }
    }

    /// Check that every required field is present and non-empty
    pub fn parts(&self) -> Result<RequestParts, Rejection> {
        fn required(field: &Option<String>) -> Result<&str, Rejection> {
            match field.as_deref() {
                Some(value) if !value.trim().is_empty() => Ok(value),
                _ => Err(Rejection::MissingFields),
            }
        }

        Ok(RequestParts {
            claim: VoterClaim {
                identity: required(&self.identity)?.to_owned(),
                card_number: required(&self.card_number)?.to_owned(),
                email: required(&self.email)?.to_owned(),
                full_name: required(&self.full_name)?.to_owned(),
            },
            candidate: required(&self.candidate)?.to_owned(),
            public_key: required(&self.public_key)?.to_owned(),
            signature: required(&self.signature)?.to_owned(),
            voter_hash: self.voter_hash.clone().filter(|h| !h.is_empty()),
        })
    }
}

/// A request with all required fields present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParts {
    pub claim: VoterClaim,
    pub candidate: String,
    pub public_key: String,
    pub signature: String,
    pub voter_hash: Option<String>,
}
