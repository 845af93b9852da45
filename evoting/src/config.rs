use crate::*;
use std::env::var;
use std::path::PathBuf;

/// Runtime configuration, read from the environment
#[derive(Debug, Clone)]
pub struct Config {
    pub roll_path: PathBuf,
    pub candidates_path: PathBuf,
    pub journal_path: PathBuf,
    pub admin_gate: TokenGate,
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// - `EVOTING_ROLL_PATH` (default `./voters.json`)
    /// - `EVOTING_CANDIDATES_PATH` (default `./candidates.json`)
    /// - `EVOTING_JOURNAL_PATH` (default `./evoting.journal`)
    /// - `EVOTING_ADMIN_TOKEN` or `EVOTING_ADMIN_TOKEN_SHA256` (hex). With neither set, every
    ///   admin request is denied.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = |key: &str, default: &str| -> PathBuf {
            match lookup(key) {
                Some(val) if !val.is_empty() => PathBuf::from(val),
                _ => PathBuf::from(default),
            }
        };

        let roll_path = path("EVOTING_ROLL_PATH", "./voters.json");
        let candidates_path = path("EVOTING_CANDIDATES_PATH", "./candidates.json");
        let journal_path = path("EVOTING_JOURNAL_PATH", "./evoting.journal");

        let token = lookup("EVOTING_ADMIN_TOKEN").filter(|t| !t.is_empty());
        let digest = lookup("EVOTING_ADMIN_TOKEN_SHA256").filter(|d| !d.is_empty());
        let admin_gate = match (token, digest) {
            (Some(_), Some(_)) => {
                return Err(Error::Config(
                    "set only one of EVOTING_ADMIN_TOKEN and EVOTING_ADMIN_TOKEN_SHA256".to_owned(),
                ))
            }
            (Some(token), None) => TokenGate::from_token(&token),
            (None, Some(digest)) => TokenGate::from_digest_hex(&digest)?,
            (None, None) => {
                log::warn!("config: no admin token configured, admin access is disabled");
                TokenGate::closed()
            }
        };

        Ok(Config {
            roll_path,
            candidates_path,
            journal_path,
            admin_gate,
        })
    }
}
