pub mod governance_object;
pub mod proposal;
pub mod superblock;
pub mod vote;

pub use governance_object::{GovernanceObject, ObjectType};
pub use proposal::Proposal;
pub use superblock::{Payment, Superblock, SuperblockPayload};
pub use vote::{Vote, VoteOutcome, VoteSignal};
