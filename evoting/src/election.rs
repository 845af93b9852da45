use crate::*;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// A vote that was recorded
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VoteAccepted {
    pub candidate: String,
    pub receipt: Uuid,
}

/// An election: the voter roll, the candidates, and the ballot box.
///
/// `submit` is the only way a ballot gets into the store. The store is shared, so any number
/// of threads may submit at once.
pub struct Election<S: BallotStore> {
    roll: VoterRoll,
    candidates: CandidateList,
    store: Arc<S>,
    notifier: Arc<dyn Notifier>,
    notify_inline: bool,
}

impl<S: BallotStore> Election<S> {
    /// Create an election that logs voter confirmations
    pub fn new(roll: VoterRoll, candidates: CandidateList, store: Arc<S>) -> Self {
        Election {
            roll,
            candidates,
            store,
            notifier: Arc::new(LogNotifier),
            notify_inline: false,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Send confirmations on the submitting thread, after the commit and before `submit`
    /// returns. For short-lived processes that would exit before a detached send runs.
    pub fn notify_inline(mut self) -> Self {
        self.notify_inline = true;
        self
    }

    pub fn roll(&self) -> &VoterRoll {
        &self.roll
    }

    pub fn candidates(&self) -> &CandidateList {
        &self.candidates
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Cast a vote.
    ///
    /// Steps run in a fixed order and the first failure is final:
    /// request shape, eligibility, client voter hash, candidate, signature, commit.
    /// A voter is only marked as having voted by the commit, after the signature checks out.
    pub fn submit(&self, request: &BallotRequest) -> Result<VoteAccepted, Rejection> {
        let parts = request.parts().map_err(|r| rejected(None, r))?;

        let verifier = IdentityVerifier::new(&self.roll, &*self.store);
        let voter = match verifier.verify_eligibility(&parts.claim) {
            Eligibility::Eligible(voter) => voter,
            Eligibility::Ineligible => return Err(rejected(None, Rejection::Ineligible)),
            Eligibility::AlreadyVoted => return Err(rejected(None, Rejection::AlreadyVoted)),
        };

        if let Some(claimed) = &parts.voter_hash {
            if Fingerprint::from_str(claimed).ok() != Some(voter) {
                return Err(rejected(Some(&voter), Rejection::VoterMismatch));
            }
        }

        if !self.candidates.contains(&parts.candidate) {
            return Err(rejected(Some(&voter), Rejection::UnknownCandidate));
        }

        let public_key = decode_base64(&parts.public_key)
            .map_err(|_| rejected(Some(&voter), Rejection::InvalidSignature))?;
        let signature = decode_base64(&parts.signature)
            .map_err(|_| rejected(Some(&voter), Rejection::InvalidSignature))?;

        if !verify_ballot(&voter, &parts.candidate, &public_key, &signature).is_valid() {
            return Err(rejected(Some(&voter), Rejection::InvalidSignature));
        }

        let ballot = Ballot::new(voter, parts.candidate.clone(), public_key, signature);
        let receipt = ballot.receipt;

        match self.store.try_commit(ballot) {
            Ok(Commit::Committed) => {}
            Ok(Commit::AlreadyVoted) => {
                return Err(rejected(Some(&voter), Rejection::AlreadyVoted));
            }
            Err(e) => {
                log::error!("ballot store failure for voter {}: {}", voter, e);
                return Err(rejected(Some(&voter), Rejection::Unavailable));
            }
        }

        log::info!("vote recorded for voter {}, receipt {}", voter, receipt);
        self.send_confirmation(voter, parts.claim.email, parts.candidate.clone());

        Ok(VoteAccepted {
            candidate: parts.candidate,
            receipt,
        })
    }

    // The vote is already committed whatever happens here
    fn send_confirmation(&self, voter: Fingerprint, email: String, candidate: String) {
        if self.notify_inline {
            if let Err(e) = self.notifier.notify(&email, &candidate) {
                log::error!("confirmation for voter {} not sent: {}", voter, e);
            }
            return;
        }

        let notifier = self.notifier.clone();
        let spawned = std::thread::Builder::new()
            .name("evoting-notify".to_owned())
            .spawn(move || {
                if let Err(e) = notifier.notify(&email, &candidate) {
                    log::error!("confirmation for voter {} not sent: {}", voter, e);
                }
            });

        if let Err(e) = spawned {
            log::error!("confirmation for voter {} not sent: {}", voter, e);
        }
    }

    /// Tally the ballot box
    pub fn tally(&self) -> TallyReport {
        TallyEngine::new(&*self.store, &self.candidates).tally()
    }

    /// Tally, for an administrator
    pub fn admin_tally<G: AdminGate + ?Sized>(
        &self,
        gate: &G,
        credential: &str,
    ) -> Result<TallyReport, Error> {
        if !gate.is_admin(credential) {
            log::warn!("admin: tally refused, bad credential");
            return Err(Error::Unauthorized);
        }
        Ok(self.tally())
    }

    /// Empty the ballot box, for an administrator. Returns the number of ballots removed.
    pub fn admin_reset<G: AdminGate + ?Sized>(
        &self,
        gate: &G,
        credential: &str,
    ) -> Result<usize, Error> {
        if !gate.is_admin(credential) {
            log::warn!("admin: reset refused, bad credential");
            return Err(Error::Unauthorized);
        }
        let cleared = self.store.reset()?;
        log::warn!("admin: ballot box reset, {} ballots removed", cleared);
        Ok(cleared)
    }
}

fn rejected(voter: Option<&Fingerprint>, rejection: Rejection) -> Rejection {
    match voter {
        Some(voter) => log::warn!("vote rejected for voter {}: {}", voter, rejection),
        None => log::warn!("vote rejected: {}", rejection),
    }
    rejection
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::sync::Mutex;
    use std::time::Duration;

    fn record(identity: &str) -> VoterRecord {
        VoterRecord {
            identity: identity.to_owned(),
            card_number: format!("card-{}", identity),
            email: format!("{}@example.org", identity),
            full_name: format!("Voter {}", identity),
        }
    }

    fn election() -> Election<MemStore> {
        let roll = VoterRoll::new(vec![record("V1"), record("V2")]);
        let candidates = CandidateList::new(vec!["A", "B"]).unwrap();
        Election::new(roll, candidates, Arc::new(MemStore::new())).with_notifier(Arc::new(NoopNotifier))
    }

    fn request(identity: &str, candidate: &str) -> BallotRequest {
        let (secret, _) = generate_keypair();
        BallotRequest::signed(&VoterClaim::from(&record(identity)), candidate, &secret)
    }

    struct ChannelNotifier(Mutex<mpsc::Sender<(String, String)>>);

    impl Notifier for ChannelNotifier {
        fn notify(&self, email: &str, candidate: &str) -> Result<(), NotifyError> {
            let sender = self.0.lock().unwrap();
            sender.send((email.to_owned(), candidate.to_owned())).unwrap();
            Ok(())
        }
    }

    struct FailingNotifier;

    impl Notifier for FailingNotifier {
        fn notify(&self, _email: &str, _candidate: &str) -> Result<(), NotifyError> {
            Err(NotifyError("smtp down".to_owned()))
        }
    }

    struct BrokenStore;

    impl BallotStore for BrokenStore {
        fn try_commit(&self, _ballot: Ballot) -> Result<Commit, StoreError> {
            Err(StoreError::LockPoisoned)
        }
        fn contains(&self, _voter: &Fingerprint) -> bool {
            false
        }
        fn get(&self, _voter: &Fingerprint) -> Option<Ballot> {
            None
        }
        fn snapshot(&self) -> Vec<Ballot> {
            vec![]
        }
        fn len(&self) -> usize {
            0
        }
        fn reset(&self) -> Result<usize, StoreError> {
            Err(StoreError::LockPoisoned)
        }
    }

    #[test]
    fn accepted_vote_is_recorded() {
        let election = election();
        let accepted = election.submit(&request("V1", "A")).unwrap();
        assert_eq!(accepted.candidate, "A");

        let stored = election.store().get(&Fingerprint::derive("V1")).unwrap();
        assert_eq!(stored.receipt, accepted.receipt);
        assert_eq!(stored.candidate, "A");
    }

    #[test]
    fn missing_fields() {
        let election = election();
        let mut req = request("V1", "A");
        req.signature = None;
        assert_eq!(election.submit(&req), Err(Rejection::MissingFields));
        assert_eq!(
            election.submit(&BallotRequest::default()),
            Err(Rejection::MissingFields)
        );
    }

    #[test]
    fn ineligible_is_checked_before_everything_else() {
        let election = election();

        // Not on the roll, even with a perfectly good signature
        let req = request("V9", "A");
        assert_eq!(election.submit(&req), Err(Rejection::Ineligible));

        // On the roll but details wrong, and a bad signature: still Ineligible
        let mut req = request("V1", "A");
        req.email = Some("wrong@example.org".to_owned());
        req.signature = Some("garbage".to_owned());
        assert_eq!(election.submit(&req), Err(Rejection::Ineligible));
        assert!(election.store().is_empty());
    }

    #[test]
    fn voter_hash_must_match() {
        let election = election();
        let mut req = request("V1", "A");
        req.voter_hash = Some(Fingerprint::derive("V2").to_string());
        assert_eq!(election.submit(&req), Err(Rejection::VoterMismatch));

        req.voter_hash = Some("not-a-hash".to_owned());
        assert_eq!(election.submit(&req), Err(Rejection::VoterMismatch));

        // Omitting it is fine
        req.voter_hash = None;
        assert!(election.submit(&req).is_ok());
    }

    #[test]
    fn unknown_candidate() {
        let election = election();
        assert_eq!(
            election.submit(&request("V1", "Z")),
            Err(Rejection::UnknownCandidate)
        );
        assert!(election.store().is_empty());
    }

    #[test]
    fn bad_signatures_do_not_use_up_the_vote() {
        let election = election();

        // Signed for A, submitted for B
        let mut req = request("V1", "A");
        req.candidate = Some("B".to_owned());
        assert_eq!(election.submit(&req), Err(Rejection::InvalidSignature));

        // Not base64 at all
        let mut req = request("V1", "A");
        req.public_key = Some("%%%".to_owned());
        assert_eq!(election.submit(&req), Err(Rejection::InvalidSignature));

        // Valid base64, wrong length
        let mut req = request("V1", "A");
        req.signature = Some(base64::encode(b"short"));
        assert_eq!(election.submit(&req), Err(Rejection::InvalidSignature));

        assert!(election.store().is_empty());
        assert!(election.submit(&request("V1", "A")).is_ok());
    }

    #[test]
    fn second_vote_is_already_voted() {
        let election = election();
        election.submit(&request("V1", "A")).unwrap();
        assert_eq!(
            election.submit(&request("V1", "B")),
            Err(Rejection::AlreadyVoted)
        );
        assert_eq!(election.tally().count("A"), 1);
        assert_eq!(election.tally().count("B"), 0);
    }

    #[test]
    fn confirmation_is_sent() {
        let (tx, rx) = mpsc::channel();
        let election = election().with_notifier(Arc::new(ChannelNotifier(Mutex::new(tx))));
        election.submit(&request("V2", "B")).unwrap();

        let (email, candidate) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(email, "V2@example.org");
        assert_eq!(candidate, "B");
    }

    #[test]
    fn inline_confirmation_is_sent_before_submit_returns() {
        let (tx, rx) = mpsc::channel();
        let inline = election()
            .with_notifier(Arc::new(ChannelNotifier(Mutex::new(tx))))
            .notify_inline();
        inline.submit(&request("V1", "A")).unwrap();

        assert_eq!(
            rx.try_recv().unwrap(),
            ("V1@example.org".to_owned(), "A".to_owned())
        );

        let failing = election().with_notifier(Arc::new(FailingNotifier)).notify_inline();
        assert!(failing.submit(&request("V2", "B")).is_ok());
    }

    #[test]
    fn notifier_failure_does_not_affect_the_vote() {
        let election = election().with_notifier(Arc::new(FailingNotifier));
        assert!(election.submit(&request("V1", "A")).is_ok());
        assert!(election.store().contains(&Fingerprint::derive("V1")));
    }

    #[test]
    fn store_failure_is_unavailable() {
        let roll = VoterRoll::new(vec![record("V1")]);
        let candidates = CandidateList::new(vec!["A"]).unwrap();
        let election = Election::new(roll, candidates, Arc::new(BrokenStore))
            .with_notifier(Arc::new(NoopNotifier));

        assert_eq!(
            election.submit(&request("V1", "A")),
            Err(Rejection::Unavailable)
        );
    }

    #[test]
    fn admin_operations_need_the_token() {
        let election = election();
        election.submit(&request("V1", "A")).unwrap();
        let gate = TokenGate::from_token("hunter2");

        assert!(matches!(
            election.admin_tally(&gate, "admin"),
            Err(Error::Unauthorized)
        ));
        assert!(matches!(
            election.admin_reset(&TokenGate::closed(), ""),
            Err(Error::Unauthorized)
        ));
        assert_eq!(election.store().len(), 1);

        let report = election.admin_tally(&gate, "hunter2").unwrap();
        assert_eq!(report.count("A"), 1);

        assert_eq!(election.admin_reset(&gate, "hunter2").unwrap(), 1);
        assert!(election.store().is_empty());
    }
}
