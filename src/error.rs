use crate::store::StoreError;
use thiserror::Error;

/// Errors that may be returned by the contest engine
#[derive(Error, Debug)]
pub enum EngineError {
    /// Candidate address does not match the required format
    #[error("Invalid EVM address format")]
    InvalidAddress,

    /// Prize amount must be a positive number
    #[error("Prize amount must be greater than zero")]
    InvalidPrizeAmount,

    /// Duration contests need a positive duration
    #[error("Duration must be greater than zero minutes")]
    InvalidDuration,

    /// Participant-capped contests need a positive cap
    #[error("Participant limit must be greater than zero")]
    InvalidParticipantLimit,

    /// Every contest draws at least one winner
    #[error("Winner count must be greater than zero")]
    InvalidWinnerCount,

    /// Task descriptions must not be empty
    #[error("Task description must not be empty")]
    InvalidTask,

    /// No contest with the given id
    #[error("Contest not found")]
    ContestNotFound,

    /// Contest is not accepting anything because it is not active
    #[error("Contest is not active")]
    ContestNotActive,

    /// Submissions have been stopped for this contest
    #[error("Submissions are closed for this contest")]
    SubmissionsClosed,

    /// A required task lacks a completion for this address
    #[error("Complete all required tasks before submitting")]
    TasksIncomplete,

    /// The address already entered this contest
    #[error("Address already submitted for this contest")]
    DuplicateSubmission,

    /// Winner selection requires submissions to be closed first
    #[error("Contest has not ended yet")]
    ContestNotEnded,

    /// Persistence failed for reasons unrelated to business rules
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Expected, user-facing outcome of a business rule, as opposed to
    /// malformed caller input or an infrastructure fault.
    pub fn is_business_rule(&self) -> bool {
        matches!(
            self,
            EngineError::ContestNotFound
                | EngineError::ContestNotActive
                | EngineError::SubmissionsClosed
                | EngineError::TasksIncomplete
                | EngineError::DuplicateSubmission
                | EngineError::ContestNotEnded
        )
    }

    /// Malformed or out-of-range caller input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidAddress
                | EngineError::InvalidPrizeAmount
                | EngineError::InvalidDuration
                | EngineError::InvalidParticipantLimit
                | EngineError::InvalidWinnerCount
                | EngineError::InvalidTask
        )
    }
}
