use crate::*;

/// Result of an eligibility check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    /// On the roll and has not voted yet
    Eligible(Fingerprint),
    Ineligible,
    AlreadyVoted,
}

/// Checks a claimed identity against the voter roll and the ballot store.
///
/// Read-only: it never marks a voter as having voted. That happens only when the orchestrator
/// commits a ballot whose signature has been verified.
pub struct IdentityVerifier<'a, S: BallotStore + ?Sized> {
    roll: &'a VoterRoll,
    store: &'a S,
}

impl<'a, S: BallotStore + ?Sized> IdentityVerifier<'a, S> {
    pub fn new(roll: &'a VoterRoll, store: &'a S) -> Self {
        IdentityVerifier { roll, store }
    }

    pub fn verify_eligibility(&self, claim: &VoterClaim) -> Eligibility {
        let record = match self.roll.get(&claim.identity) {
            Some(record) => record,
            None => return Eligibility::Ineligible,
        };

        if !record.matches(claim) {
            return Eligibility::Ineligible;
        }

        let voter = record.fingerprint();
        if self.store.contains(&voter) {
            return Eligibility::AlreadyVoted;
        }

        Eligibility::Eligible(voter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roll() -> VoterRoll {
        VoterRoll::new(vec![
            VoterRecord {
                identity: "V1".to_owned(),
                card_number: "C1".to_owned(),
                email: "v1@example.org".to_owned(),
                full_name: "Voter One".to_owned(),
            },
            VoterRecord {
                identity: "V2".to_owned(),
                card_number: "C2".to_owned(),
                email: "v2@example.org".to_owned(),
                full_name: "Voter Two".to_owned(),
            },
        ])
    }

    #[test]
    fn eligible_voter() {
        let roll = roll();
        let store = MemStore::new();
        let verifier = IdentityVerifier::new(&roll, &store);

        let claim = VoterClaim::from(roll.get("V1").unwrap());
        assert_eq!(
            verifier.verify_eligibility(&claim),
            Eligibility::Eligible(Fingerprint::derive("V1"))
        );

        // Checking twice is fine, nothing is recorded
        assert!(matches!(
            verifier.verify_eligibility(&claim),
            Eligibility::Eligible(_)
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn unknown_or_partial_match_is_ineligible() {
        let roll = roll();
        let store = MemStore::new();
        let verifier = IdentityVerifier::new(&roll, &store);

        let mut claim = VoterClaim::from(roll.get("V1").unwrap());
        claim.identity = "V9".to_owned();
        assert_eq!(verifier.verify_eligibility(&claim), Eligibility::Ineligible);

        let mut claim = VoterClaim::from(roll.get("V1").unwrap());
        claim.card_number = "C2".to_owned();
        assert_eq!(verifier.verify_eligibility(&claim), Eligibility::Ineligible);

        let mut claim = VoterClaim::from(roll.get("V1").unwrap());
        claim.full_name = "voter one".to_owned();
        assert_eq!(verifier.verify_eligibility(&claim), Eligibility::Ineligible);
    }

    #[test]
    fn voter_with_a_ballot_has_already_voted() {
        let roll = roll();
        let store = MemStore::new();
        store
            .try_commit(Ballot::new(
                Fingerprint::derive("V2"),
                "A".to_owned(),
                vec![],
                vec![],
            ))
            .unwrap();

        let verifier = IdentityVerifier::new(&roll, &store);
        let claim = VoterClaim::from(roll.get("V2").unwrap());
        assert_eq!(verifier.verify_eligibility(&claim), Eligibility::AlreadyVoted);

        // An unknown identity stays ineligible even if the store has something for it
        let mut claim = claim;
        claim.identity = "V3".to_owned();
        assert_eq!(verifier.verify_eligibility(&claim), Eligibility::Ineligible);
    }
}
