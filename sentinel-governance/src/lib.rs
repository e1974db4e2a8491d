pub mod decision;
pub mod error;
pub mod runner;
pub mod submission;
pub mod superblock_maker;
pub mod sync;
pub mod validity;
pub mod votable;

pub use decision::{SuperblockDecision, SuperblockDecisionEngine};
pub use error::PreconditionFailure;
pub use runner::{RunReport, Runner};
pub use votable::Votable;
