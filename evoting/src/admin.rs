use crate::*;
use digest::Digest;
use sha2::Sha256;
use subtle::ConstantTimeEq;

/// Decides whether a credential belongs to an election administrator.
pub trait AdminGate: Send + Sync {
    fn is_admin(&self, credential: &str) -> bool;
}

/// Admin gate holding only the SHA-256 digest of the admin token.
///
/// Digests are compared in constant time. A gate built without a token denies everyone.
#[derive(Clone, Default)]
pub struct TokenGate {
    digest: Option<[u8; 32]>,
}

impl TokenGate {
    /// Gate for a plaintext token. The token itself is not retained.
    pub fn from_token(token: &str) -> Self {
        TokenGate {
            digest: Some(token_digest(token)),
        }
    }

    /// Gate for a token known only by its SHA-256 digest (hex)
    pub fn from_digest_hex(digest: &str) -> Result<Self, Error> {
        let bytes = hex::decode(digest.trim())
            .map_err(|_| Error::Config("admin token digest is not hex".to_owned()))?;
        if bytes.len() != 32 {
            return Err(Error::Config(
                "admin token digest must be 32 bytes".to_owned(),
            ));
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        Ok(TokenGate { digest: Some(out) })
    }

    /// Gate that denies every credential
    pub fn closed() -> Self {
        TokenGate { digest: None }
    }

    pub fn is_closed(&self) -> bool {
        self.digest.is_none()
    }
}

impl AdminGate for TokenGate {
    fn is_admin(&self, credential: &str) -> bool {
        match &self.digest {
            Some(expected) => {
                let presented = token_digest(credential);
                bool::from(presented[..].ct_eq(&expected[..]))
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for TokenGate {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("TokenGate")
            .field("closed", &self.is_closed())
            .finish()
    }
}

fn token_digest(token: &str) -> [u8; 32] {
    let digest = Sha256::digest(token.as_bytes());
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}
