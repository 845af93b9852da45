use thiserror::Error;

/// Error types
#[derive(Debug, Error)]
pub enum Error {
    #[error("evoting: io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("evoting: JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("evoting: invalid fingerprint - invalid hexidecimal")]
    FingerprintBadHex,

    #[error("evoting: invalid fingerprint - wrong length")]
    FingerprintBadLen,

    #[error("evoting: candidate list contains an empty name")]
    EmptyCandidate,

    #[error("evoting: candidate {0} is listed more than once")]
    DuplicateCandidate(String),

    #[error("evoting: configuration error: {0}")]
    Config(String),

    #[error("evoting: store error: {0}")]
    Store(#[from] StoreError),

    #[error("evoting: not authorized")]
    Unauthorized,
}

/// Ballot store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("ballot store: journal writer lock poisoned")]
    LockPoisoned,

    #[error("ballot store: journal io error: {0}")]
    Journal(#[from] std::io::Error),

    #[error("ballot store: journal encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("ballot store: journal could not be rolled back after a failed write")]
    JournalFailed,
}

/// Why a ballot submission was refused.
///
/// Every variant is terminal for its request. `AlreadyVoted` is returned with the same
/// wording whether the duplicate was caught by the eligibility check or by the store commit.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    #[error("invalid request, missing fields")]
    MissingFields,

    #[error("voter details do not match our records")]
    Ineligible,

    #[error("voter hash does not match the submitted identity")]
    VoterMismatch,

    #[error("you have already voted")]
    AlreadyVoted,

    #[error("invalid signature, vote rejected")]
    InvalidSignature,

    #[error("candidate is not on the ballot")]
    UnknownCandidate,

    #[error("ballot box unavailable, vote not recorded")]
    Unavailable,
}

impl Rejection {
    /// HTTP-equivalent status code for this rejection
    pub fn status(&self) -> u16 {
        match self {
            Rejection::MissingFields => 400,
            Rejection::InvalidSignature => 400,
            Rejection::UnknownCandidate => 400,
            Rejection::Ineligible => 403,
            Rejection::VoterMismatch => 403,
            Rejection::AlreadyVoted => 403,
            Rejection::Unavailable => 503,
        }
    }
}
