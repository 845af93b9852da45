use crate::*;
use indexmap::map::Entry;
use indexmap::IndexMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Result of an insert-if-absent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    Committed,
    AlreadyVoted,
}

/// A ballot store
///
/// Holds at most one ballot per voter fingerprint, ever. `try_commit` is the only way in and
/// is a single atomic check-and-insert: of any number of concurrent commits for the same
/// fingerprint, exactly one returns `Committed`.
pub trait BallotStore: Send + Sync {
    /// Insert the ballot under `ballot.voter` unless that voter already has one
    fn try_commit(&self, ballot: Ballot) -> Result<Commit, StoreError>;

    /// Is there a ballot for this voter?
    fn contains(&self, voter: &Fingerprint) -> bool;

    /// Get the ballot recorded for this voter
    fn get(&self, voter: &Fingerprint) -> Option<Ballot>;

    /// Point-in-time copy of every ballot, in commit order
    fn snapshot(&self) -> Vec<Ballot>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every ballot, returning how many were removed.
    ///
    /// Administrative only. Never called on the submission path.
    fn reset(&self) -> Result<usize, StoreError>;
}

/// A simple store that uses an in-memory IndexMap
///
/// Every write holds the lock for a single map operation, so a panic can never leave the map
/// half-updated and a poisoned lock is safe to recover.
#[derive(Default, Debug)]
pub struct MemStore {
    inner: RwLock<IndexMap<Fingerprint, Ballot>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, IndexMap<Fingerprint, Ballot>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexMap<Fingerprint, Ballot>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BallotStore for MemStore {
    fn try_commit(&self, ballot: Ballot) -> Result<Commit, StoreError> {
        let mut map = self.write();
        match map.entry(ballot.voter) {
            Entry::Occupied(_) => Ok(Commit::AlreadyVoted),
            Entry::Vacant(slot) => {
                slot.insert(ballot);
                Ok(Commit::Committed)
            }
        }
    }

    fn contains(&self, voter: &Fingerprint) -> bool {
        self.read().contains_key(voter)
    }

    fn get(&self, voter: &Fingerprint) -> Option<Ballot> {
        self.read().get(voter).cloned()
    }

    fn snapshot(&self) -> Vec<Ballot> {
        self.read().values().cloned().collect()
    }

    fn len(&self) -> usize {
        self.read().len()
    }

    fn reset(&self) -> Result<usize, StoreError> {
        let mut map = self.write();
        let cleared = map.len();
        map.clear();
        Ok(cleared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};

    fn ballot(identity: &str, candidate: &str) -> Ballot {
        Ballot::new(
            Fingerprint::derive(identity),
            candidate.to_owned(),
            vec![0; 32],
            vec![0; 64],
        )
    }

    #[test]
    fn commit_is_insert_once() {
        let store = MemStore::new();
        assert_eq!(store.try_commit(ballot("V1", "A")).unwrap(), Commit::Committed);
        assert_eq!(
            store.try_commit(ballot("V1", "B")).unwrap(),
            Commit::AlreadyVoted
        );

        let voter = Fingerprint::derive("V1");
        assert!(store.contains(&voter));
        assert_eq!(store.get(&voter).unwrap().candidate, "A");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn snapshot_is_in_commit_order() {
        let store = MemStore::new();
        for (voter, candidate) in &[("V3", "A"), ("V1", "B"), ("V2", "A")] {
            store.try_commit(ballot(voter, candidate)).unwrap();
        }
        let order: Vec<Fingerprint> = store.snapshot().iter().map(|b| b.voter).collect();
        assert_eq!(
            order,
            vec![
                Fingerprint::derive("V3"),
                Fingerprint::derive("V1"),
                Fingerprint::derive("V2")
            ]
        );

        // Later commits don't show up in an earlier snapshot
        let before = store.snapshot();
        store.try_commit(ballot("V4", "A")).unwrap();
        assert_eq!(before.len(), 3);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn concurrent_commits_for_one_voter() {
        let store = Arc::new(MemStore::new());
        let threads = 16;
        let barrier = Arc::new(Barrier::new(threads));

        let handles: Vec<_> = (0..threads)
            .map(|i| {
                let store = store.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    let candidate = if i % 2 == 0 { "A" } else { "B" };
                    barrier.wait();
                    store.try_commit(ballot("V1", candidate)).unwrap()
                })
            })
            .collect();

        let committed = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|c| *c == Commit::Committed)
            .count();

        assert_eq!(committed, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn reset_clears_everything() {
        let store = MemStore::new();
        for (voter, candidate) in &[("V1", "A"), ("V2", "B"), ("V1", "C")] {
            store.try_commit(ballot(voter, candidate)).unwrap();
        }
        assert_eq!(store.len(), 2);
        assert_eq!(store.reset().unwrap(), 2);
        assert!(store.is_empty());
        assert_eq!(store.try_commit(ballot("V1", "A")).unwrap(), Commit::Committed);
    }
}
