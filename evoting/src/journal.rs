use crate::*;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One line of the journal
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "kind")]
#[serde(rename_all = "snake_case")]
enum JournalEntry {
    Ballot(Ballot),
    Reset { cleared: usize },
}

/// A durable ballot store backed by an append-only JSON-lines journal.
///
/// A ballot is written and synced to the journal before its commit is acknowledged. Resets
/// are journaled too, so the file is a complete audit history of the ballot box. On open the
/// journal is replayed into an in-memory index that serves reads.
///
/// The file never holds more than the acknowledged entries: a failed append is truncated
/// away, and anything found past the last acknowledged entry is discarded before the next
/// append. If a failed append cannot be undone the store refuses all further writes.
pub struct JournalStore {
    path: PathBuf,
    writer: Mutex<Journal>,
    ballots: MemStore,
}

struct Journal {
    file: File,
    /// Length of the file up to the last acknowledged entry
    len: u64,
    failed: bool,
}

impl Journal {
    fn append(&mut self, entry: &JournalEntry) -> Result<(), StoreError> {
        if self.failed {
            return Err(StoreError::JournalFailed);
        }

        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        match self.write_line(&line) {
            Ok(()) => {
                self.len += line.len() as u64;
                Ok(())
            }
            Err(e) => {
                self.rollback();
                Err(e.into())
            }
        }
    }

    fn write_line(&mut self, line: &[u8]) -> std::io::Result<()> {
        self.discard_tail()?;
        self.file.write_all(line)?;
        self.file.sync_data()
    }

    // Bytes past `len` were never acknowledged
    fn discard_tail(&mut self) -> std::io::Result<()> {
        let actual = self.file.metadata()?.len();
        if actual != self.len {
            log::warn!(
                "journal: discarding {} unacknowledged bytes",
                actual.saturating_sub(self.len)
            );
            self.truncate()?;
        }
        Ok(())
    }

    fn truncate(&mut self) -> std::io::Result<()> {
        self.file.set_len(self.len)?;
        self.file.sync_data()
    }

    fn rollback(&mut self) {
        if let Err(e) = self.truncate() {
            log::error!("journal: rollback of a failed append failed, refusing writes: {}", e);
            self.failed = true;
        }
    }
}

impl JournalStore {
    /// Open (or create) the journal at `path` and replay it
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let ballots = MemStore::new();

        let existing = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        // A torn final line was never acknowledged
        let complete = match existing.rfind('\n') {
            Some(last) => &existing[..=last],
            None => "",
        };
        if complete.len() != existing.len() {
            log::warn!(
                "journal {}: dropping torn final line ({} bytes)",
                path.display(),
                existing.len() - complete.len()
            );
        }

        let mut replayed = 0;
        let mut skipped = 0;
        for (lineno, line) in complete.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<JournalEntry>(line) {
                Ok(JournalEntry::Ballot(ballot)) => {
                    let voter = ballot.voter;
                    if ballots.try_commit(ballot)? == Commit::AlreadyVoted {
                        log::warn!(
                            "journal {}: line {} repeats voter {}, keeping the first ballot",
                            path.display(),
                            lineno + 1,
                            voter
                        );
                        skipped += 1;
                    } else {
                        replayed += 1;
                    }
                }
                Ok(JournalEntry::Reset { .. }) => {
                    ballots.reset()?;
                }
                Err(e) => {
                    log::warn!(
                        "journal {}: skipping unreadable line {}: {}",
                        path.display(),
                        lineno + 1,
                        e
                    );
                    skipped += 1;
                }
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut journal = Journal {
            file,
            len: complete.len() as u64,
            failed: false,
        };
        journal.discard_tail()?;

        log::info!(
            "journal {}: {} ballots replayed, {} lines skipped, {} ballots live",
            path.display(),
            replayed,
            skipped,
            ballots.len()
        );

        Ok(JournalStore {
            path,
            writer: Mutex::new(journal),
            ballots,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BallotStore for JournalStore {
    fn try_commit(&self, ballot: Ballot) -> Result<Commit, StoreError> {
        // The writer lock spans the check, the append and the index insert
        let mut journal = self.writer.lock().map_err(|_| StoreError::LockPoisoned)?;

        if self.ballots.contains(&ballot.voter) {
            return Ok(Commit::AlreadyVoted);
        }

        journal.append(&JournalEntry::Ballot(ballot.clone()))?;
        self.ballots.try_commit(ballot)
    }

    fn contains(&self, voter: &Fingerprint) -> bool {
        self.ballots.contains(voter)
    }

    fn get(&self, voter: &Fingerprint) -> Option<Ballot> {
        self.ballots.get(voter)
    }

    fn snapshot(&self) -> Vec<Ballot> {
        self.ballots.snapshot()
    }

    fn len(&self) -> usize {
        self.ballots.len()
    }

    fn reset(&self) -> Result<usize, StoreError> {
        let mut journal = self.writer.lock().map_err(|_| StoreError::LockPoisoned)?;

        let cleared = self.ballots.len();
        journal.append(&JournalEntry::Reset { cleared })?;
        self.ballots.reset()
    }
}
