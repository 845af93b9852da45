use crate::*;
use ed25519_dalek::ExpandedSecretKey;
use ed25519_dalek::PublicKey;
use ed25519_dalek::SecretKey;
use ed25519_dalek::Signature;
use std::convert::TryFrom;

/// Outcome of a signature check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Valid,
    Invalid,
}

impl Verification {
    pub fn is_valid(self) -> bool {
        self == Verification::Valid
    }
}

/// Verify an Ed25519 signature over `message`.
///
/// All inputs are untrusted bytes. A key or signature of the wrong length, a non-canonical
/// encoding, a weak key, or a signature that simply does not match are all `Invalid`.
pub fn verify(public_key: &[u8], message: &[u8], signature: &[u8]) -> Verification {
    let public_key = match PublicKey::from_bytes(public_key) {
        Ok(pk) => pk,
        Err(_) => return Verification::Invalid,
    };
    let signature = match Signature::try_from(signature) {
        Ok(sig) => sig,
        Err(_) => return Verification::Invalid,
    };

    match public_key.verify_strict(message, &signature) {
        Ok(()) => Verification::Valid,
        Err(_) => Verification::Invalid,
    }
}

/// Verify a ballot's signature against the canonical message for its voter and candidate.
pub fn verify_ballot(
    voter: &Fingerprint,
    candidate: &str,
    public_key: &[u8],
    signature: &[u8],
) -> Verification {
    let message = canonical_message(voter, candidate);
    verify(public_key, &message, signature)
}

/// Sign a ballot the way a voting client does.
pub fn sign_ballot(secret: &SecretKey, voter: &Fingerprint, candidate: &str) -> Signature {
    let public_key = PublicKey::from(secret);
    let message = canonical_message(voter, candidate);

    let expanded: ExpandedSecretKey = secret.into();
    expanded.sign(&message, &public_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_ballot_verifies() {
        let (secret, public) = generate_keypair();
        let voter = Fingerprint::derive("V1");
        let sig = sign_ballot(&secret, &voter, "Alice");

        let result = verify_ballot(&voter, "Alice", public.as_bytes(), &sig.to_bytes());
        assert_eq!(result, Verification::Valid);
    }

    #[test]
    fn mutated_fields_do_not_verify() {
        let (secret, public) = generate_keypair();
        let voter = Fingerprint::derive("V1");
        let sig = sign_ballot(&secret, &voter, "Alice").to_bytes();

        // Different candidate
        assert!(!verify_ballot(&voter, "Bob", public.as_bytes(), &sig).is_valid());

        // Different voter
        let other = Fingerprint::derive("V2");
        assert!(!verify_ballot(&other, "Alice", public.as_bytes(), &sig).is_valid());

        // Different key
        let (_, other_public) = generate_keypair();
        assert!(!verify_ballot(&voter, "Alice", other_public.as_bytes(), &sig).is_valid());
    }

    #[test]
    fn malformed_inputs_are_invalid() {
        let (secret, public) = generate_keypair();
        let voter = Fingerprint::derive("V1");
        let sig = sign_ballot(&secret, &voter, "Alice").to_bytes();
        let message = canonical_message(&voter, "Alice");

        assert_eq!(verify(&[], &message, &sig), Verification::Invalid);
        assert_eq!(verify(&[7u8; 31], &message, &sig), Verification::Invalid);
        assert_eq!(verify(public.as_bytes(), &message, &[]), Verification::Invalid);
        assert_eq!(verify(public.as_bytes(), &message, &sig[..63]), Verification::Invalid);
        assert_eq!(verify(public.as_bytes(), &message, &[0xffu8; 64]), Verification::Invalid);
    }
}
