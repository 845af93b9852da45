use crate::*;
use indexmap::IndexSet;
use std::collections::HashMap;
use std::path::Path;

/// An eligible voter, as listed on the voter roll.
///
/// Loaded once at startup and never mutated.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VoterRecord {
    pub identity: String,
    pub card_number: String,
    pub email: String,
    pub full_name: String,
}

impl VoterRecord {
    fn is_complete(&self) -> bool {
        !self.identity.is_empty()
            && !self.card_number.is_empty()
            && !self.email.is_empty()
            && !self.full_name.is_empty()
    }

    /// All four fields must match exactly
    pub fn matches(&self, claim: &VoterClaim) -> bool {
        self.identity == claim.identity
            && self.card_number == claim.card_number
            && self.email == claim.email
            && self.full_name == claim.full_name
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::derive(&self.identity)
    }
}

/// The voter details a submitter claims.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VoterClaim {
    pub identity: String,
    pub card_number: String,
    pub email: String,
    pub full_name: String,
}

impl From<&VoterRecord> for VoterClaim {
    fn from(record: &VoterRecord) -> Self {
        VoterClaim {
            identity: record.identity.clone(),
            card_number: record.card_number.clone(),
            email: record.email.clone(),
            full_name: record.full_name.clone(),
        }
    }
}

/// Read-only lookup of eligible voters by identity.
#[derive(Debug, Clone, Default)]
pub struct VoterRoll {
    records: HashMap<String, VoterRecord>,
    dropped: usize,
}

impl VoterRoll {
    /// Build a roll from raw records.
    ///
    /// Incomplete rows are dropped. An identity that appears on more than one row is dropped
    /// entirely since there is no way to tell which row is authoritative. Dropped rows make
    /// nobody eligible.
    pub fn new<I: IntoIterator<Item = VoterRecord>>(rows: I) -> Self {
        let mut records: HashMap<String, VoterRecord> = HashMap::new();
        let mut duplicated: Vec<String> = Vec::new();
        let mut dropped = 0;

        for (row, record) in rows.into_iter().enumerate() {
            if !record.is_complete() {
                log::warn!("voter roll: dropping incomplete row {}", row);
                dropped += 1;
                continue;
            }
            if records.contains_key(&record.identity) {
                log::warn!("voter roll: identity on row {} is listed more than once", row);
                duplicated.push(record.identity);
                dropped += 1;
                continue;
            }
            records.insert(record.identity.clone(), record);
        }

        for identity in duplicated {
            if records.remove(&identity).is_some() {
                dropped += 1;
            }
        }

        log::info!(
            "voter roll: {} eligible voters, {} rows dropped",
            records.len(),
            dropped
        );

        VoterRoll { records, dropped }
    }

    /// Load a roll from a JSON array of records
    pub fn from_json(bytes: &[u8]) -> Result<Self, Error> {
        let rows: Vec<VoterRecord> = serde_json::from_slice(bytes)?;
        Ok(Self::new(rows))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let bytes = std::fs::read(path)?;
        Self::from_json(&bytes)
    }

    pub fn get(&self, identity: &str) -> Option<&VoterRecord> {
        self.records.get(identity)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of input rows that were not admitted to the roll
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

/// Candidates in registration order.
///
/// Registration order is the tally's output order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateList {
    names: IndexSet<String>,
}

impl CandidateList {
    pub fn new<I, S>(names: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = IndexSet::new();
        for name in names {
            let name = name.into();
            if name.trim().is_empty() {
                return Err(Error::EmptyCandidate);
            }
            if set.contains(&name) {
                return Err(Error::DuplicateCandidate(name));
            }
            set.insert(name);
        }
        Ok(CandidateList { names: set })
    }

    /// Load candidates from a JSON array of names
    pub fn from_json(bytes: &[u8]) -> Result<Self, Error> {
        let names: Vec<String> = serde_json::from_slice(bytes)?;
        Self::new(names)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let bytes = std::fs::read(path)?;
        Self::from_json(&bytes)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
