//! Contest lifecycle and winner selection engine for raffle-style
//! promotional giveaways.
//!
//! Participants submit an EVM wallet address, gated by completion of
//! required tasks, until the contest closes by elapsed duration or by
//! reaching a participant cap; an operator then triggers random winner
//! selection. The engine owns the state machine (active -> ended ->
//! completed), expiry detection, submission admission, and the unbiased
//! draw. Storage is abstracted behind [`store::ContestStore`]; an
//! in-process [`memory::MemoryStore`] is provided for tests and examples.

pub mod engine;
pub mod error;
pub mod expiry;
pub mod memory;
pub mod state;
pub mod store;
pub mod utils;

pub use engine::ContestEngine;
pub use error::EngineError;
pub use memory::MemoryStore;
pub use state::{
    Contest, ContestId, ContestOverview, ContestSpec, ContestStatus, ContestTask, ContestType,
    Submission, TaskCompletion, TaskId, TaskSpec, Winner,
};
pub use store::{ContestStore, StoreError};
