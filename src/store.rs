//! Persistence port consumed by the engine.
//!
//! All exclusivity the engine relies on comes from these primitives:
//! unique-constraint rejection on inserts and single-statement conditional
//! updates. Implementations must provide at least single-statement
//! atomicity; the engine never holds in-memory locks across calls, because
//! multiple stateless engine instances may run against the same store.

use crate::state::{
    Contest, ContestId, ContestTask, NewContest, Submission, TaskCompletion, TaskId, TaskSpec,
    Winner,
};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors surfaced by a store implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("Duplicate key")]
    DuplicateKey,

    /// The backing store failed for reasons unrelated to business rules
    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable storage for contests and their child records.
pub trait ContestStore: Send + Sync {
    fn insert_contest(&self, contest: NewContest) -> StoreResult<Contest>;

    /// Single-statement "end every active contest". Returns rows changed.
    fn end_active_contests(&self) -> StoreResult<u64>;

    fn find_active_contest(&self) -> StoreResult<Option<Contest>>;

    fn find_contest(&self, id: ContestId) -> StoreResult<Option<Contest>>;

    /// Most recently created completed contest, if any.
    fn last_completed_contest(&self) -> StoreResult<Option<Contest>>;

    /// Conditionally sets `submissions_stopped` on an active contest.
    /// Setting an already-set flag matches no row. Returns rows changed.
    fn stop_submissions(&self, id: ContestId) -> StoreResult<u64>;

    /// Sets `manually_stopped` and `status = ended` unless the contest is
    /// already completed. Returns rows changed.
    fn mark_manually_stopped(&self, id: ContestId) -> StoreResult<u64>;

    /// Atomic completion claim: flips status to `completed` iff the contest
    /// exists, is not already completed, and submissions are closed
    /// (`submissions_stopped` set or status `ended`). Returns whether this
    /// caller performed the flip.
    fn claim_completion(&self, id: ContestId) -> StoreResult<bool>;

    /// Rejects with [`StoreError::DuplicateKey`] when `(contest_id,
    /// address)` already exists.
    fn insert_submission(
        &self,
        contest_id: ContestId,
        address: &str,
        submitted_at: DateTime<Utc>,
    ) -> StoreResult<Submission>;

    fn count_submissions(&self, contest_id: ContestId) -> StoreResult<u64>;

    fn list_submissions(&self, contest_id: ContestId) -> StoreResult<Vec<Submission>>;

    fn insert_task(
        &self,
        contest_id: ContestId,
        task: &TaskSpec,
        created_at: DateTime<Utc>,
    ) -> StoreResult<ContestTask>;

    fn list_tasks(&self, contest_id: ContestId) -> StoreResult<Vec<ContestTask>>;

    /// Idempotent on `(contest_id, address, task_id)`. Returns `false` when
    /// the completion already existed.
    fn insert_completion(
        &self,
        contest_id: ContestId,
        address: &str,
        task_id: TaskId,
        completed_at: DateTime<Utc>,
    ) -> StoreResult<bool>;

    fn list_completions(
        &self,
        contest_id: ContestId,
        address: &str,
    ) -> StoreResult<Vec<TaskCompletion>>;

    fn insert_winner(
        &self,
        contest_id: ContestId,
        address: &str,
        prize_amount: f64,
        won_at: DateTime<Utc>,
    ) -> StoreResult<Winner>;

    fn list_winners(&self, contest_id: ContestId) -> StoreResult<Vec<Winner>>;

    /// Winner history joined with the owning contest, newest first.
    fn list_all_winners(&self) -> StoreResult<Vec<(Winner, Contest)>>;
}
