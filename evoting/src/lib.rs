//! Signed-ballot submission and auditable tallying.
//!
//! A voter submits a [`BallotRequest`] signed with their Ed25519 key. [`Election::submit`]
//! checks the voter against the [`VoterRoll`], verifies the signature over the canonical
//! message, and commits the [`Ballot`] to a [`BallotStore`] at most once per voter
//! [`Fingerprint`]. [`TallyEngine`] re-verifies every stored ballot when counting.

#[macro_use]
extern crate serde;

mod admin;
mod ballot;
mod config;
mod election;
mod error;
mod fingerprint;
mod identity;
mod journal;
mod notify;
mod roll;
pub mod serde_b64;
mod signature;
mod store;
mod tally;
mod util;

pub use admin::*;
pub use ballot::*;
pub use config::*;
pub use election::*;
pub use error::*;
pub use fingerprint::*;
pub use identity::*;
pub use journal::*;
pub use notify::*;
pub use roll::*;
pub use signature::*;
pub use store::*;
pub use tally::*;
pub use util::*;
