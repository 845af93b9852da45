use evoting::{BallotStore, CandidateList, Config, Election, JournalStore, VoterRoll};
use std::sync::Arc;

pub fn config() -> Config {
    Config::from_env().unwrap_or_else(|e| {
        eprintln!("evoting: {}", e);
        std::process::exit(1);
    })
}

/// Open the election described by the environment
pub fn election() -> Election<JournalStore> {
    election_with(&config())
}

pub fn election_with(config: &Config) -> Election<JournalStore> {
    let roll = VoterRoll::load(&config.roll_path).unwrap_or_else(|e| {
        eprintln!(
            "evoting: unable to load voter roll {}: {}",
            config.roll_path.display(),
            e
        );
        std::process::exit(1);
    });

    let candidates = CandidateList::load(&config.candidates_path).unwrap_or_else(|e| {
        eprintln!(
            "evoting: unable to load candidates {}: {}",
            config.candidates_path.display(),
            e
        );
        std::process::exit(1);
    });

    let store = JournalStore::open(&config.journal_path).unwrap_or_else(|e| {
        eprintln!(
            "evoting: unable to open journal {}: {}",
            config.journal_path.display(),
            e
        );
        std::process::exit(1);
    });

    log::info!(
        "election loaded: {} voters, {} candidates, {} ballots",
        roll.len(),
        candidates.len(),
        store.len()
    );

    Election::new(roll, candidates, Arc::new(store)).notify_inline()
}
