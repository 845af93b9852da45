use crate::*;
use indexmap::IndexMap;
use rayon::prelude::*;
use std::collections::HashMap;
use tallystick::plurality::DefaultPluralityTally;
use uuid::Uuid;

/// Why a stored ballot was left out of the count
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    /// Signature does not verify under the ballot's own key and canonical message
    InvalidSignature,
    /// Names a candidate that is not on the candidate list
    UnknownCandidate,
}

/// A stored ballot that failed re-verification
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ExcludedBallot {
    pub voter: Fingerprint,
    pub candidate: String,
    pub reason: ExclusionReason,
}

/// A stored ballot that was counted
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CountedBallot {
    pub voter: Fingerprint,
    pub candidate: String,
    pub receipt: Uuid,
}

/// Tally of verified ballots.
///
/// `totals` follows candidate registration order, never count order, and lists every
/// candidate including those with no votes. `counted` and `excluded` together list every
/// ballot in the snapshot, each in snapshot order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TallyReport {
    pub totals: IndexMap<String, u64>,
    pub num_votes: usize,
    pub winners: Vec<String>,
    pub counted: Vec<CountedBallot>,
    pub excluded: Vec<ExcludedBallot>,
}

impl TallyReport {
    /// Tally a fixed sequence of ballots
    pub fn from_ballots(candidates: &CandidateList, ballots: &[Ballot]) -> Self {
        // Signature checks are the slow part; run them in parallel but keep snapshot order
        let checks: Vec<Option<ExclusionReason>> = ballots
            .par_iter()
            .map(|ballot| {
                if !ballot.verify_signature().is_valid() {
                    Some(ExclusionReason::InvalidSignature)
                } else if !candidates.contains(&ballot.candidate) {
                    Some(ExclusionReason::UnknownCandidate)
                } else {
                    None
                }
            })
            .collect();

        let mut tally = DefaultPluralityTally::new(1);
        let mut counted = Vec::new();
        let mut excluded = Vec::new();

        for (ballot, check) in ballots.iter().zip(checks) {
            match check {
                None => {
                    tally.add_ref(&ballot.candidate);
                    counted.push(CountedBallot {
                        voter: ballot.voter,
                        candidate: ballot.candidate.clone(),
                        receipt: ballot.receipt,
                    });
                }
                Some(reason) => {
                    log::warn!(
                        "tally: excluding ballot from voter {}: {:?}",
                        ballot.voter,
                        reason
                    );
                    excluded.push(ExcludedBallot {
                        voter: ballot.voter,
                        candidate: ballot.candidate.clone(),
                        reason,
                    });
                }
            }
        }

        let by_candidate: HashMap<String, u64> = tally
            .totals()
            .into_iter()
            .map(|(candidate, total)| (candidate, total as u64))
            .collect();

        let mut totals = IndexMap::new();
        for candidate in candidates.iter() {
            let total = by_candidate.get(candidate).copied().unwrap_or(0);
            totals.insert(candidate.to_owned(), total);
        }

        let top = totals.values().copied().max().unwrap_or(0);
        let winners = if top == 0 {
            vec![]
        } else {
            totals
                .iter()
                .filter(|(_, total)| **total == top)
                .map(|(candidate, _)| candidate.clone())
                .collect()
        };

        TallyReport {
            totals,
            num_votes: counted.len(),
            winners,
            counted,
            excluded,
        }
    }

    /// Votes counted for a candidate
    pub fn count(&self, candidate: &str) -> u64 {
        self.totals.get(candidate).copied().unwrap_or(0)
    }

    /// Number of stored ballots left out of the count
    pub fn num_excluded(&self) -> usize {
        self.excluded.len()
    }
}

/// Re-verifies and counts the ballots in a store
pub struct TallyEngine<'a, S: BallotStore + ?Sized> {
    store: &'a S,
    candidates: &'a CandidateList,
}

impl<'a, S: BallotStore + ?Sized> TallyEngine<'a, S> {
    pub fn new(store: &'a S, candidates: &'a CandidateList) -> Self {
        TallyEngine { store, candidates }
    }

    pub fn tally(&self) -> TallyReport {
        // The store lock is only held for the copy
        let snapshot = self.store.snapshot();
        let report = TallyReport::from_ballots(self.candidates, &snapshot);

        log::info!(
            "tally: {} ballots counted, {} excluded",
            report.num_votes,
            report.num_excluded()
        );
        report
    }
}
