//! Contest lifecycle, submission admission, and winner selection.
//!
//! The engine is request-driven: any number of concurrent callers may
//! invoke any operation at any time, and several stateless engine
//! instances may share one store. Exactly-once behavior therefore rests
//! entirely on the store's conditional writes; application-level reads
//! here are advisory fast paths that produce friendlier errors.
//!
//! Every time-dependent operation has an `*_at` form taking a single
//! clock snapshot. The plain form samples `Utc::now()` once and delegates,
//! so no evaluation ever mixes two clock reads.

use crate::error::EngineError;
use crate::expiry::is_naturally_expired;
use crate::state::{
    Contest, ContestId, ContestOverview, ContestSpec, ContestStatus, ContestTask, ContestType,
    NewContest, Submission, TaskCompletion, TaskId, TaskSpec, Winner,
};
use crate::store::{ContestStore, StoreError};
use crate::utils::{is_valid_evm_address, shorten_address};
use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use rand::seq::SliceRandom;
use std::collections::HashSet;

pub struct ContestEngine<S> {
    store: S,
}

impl<S: ContestStore> ContestEngine<S> {
    pub fn new(store: S) -> Self {
        ContestEngine { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn create_contest(&self, spec: ContestSpec) -> Result<Contest, EngineError> {
        self.create_contest_at(spec, Utc::now())
    }

    /// Create a contest, atomically ending any currently active one first:
    /// callers must treat this as "create replaces". The end time of a
    /// duration contest is computed from the server-sampled `now`; a
    /// client-supplied start time is never trusted.
    pub fn create_contest_at(
        &self,
        spec: ContestSpec,
        now: DateTime<Utc>,
    ) -> Result<Contest, EngineError> {
        if !(spec.prize_amount.is_finite() && spec.prize_amount > 0.0) {
            return Err(EngineError::InvalidPrizeAmount);
        }
        if spec.winner_count == 0 {
            return Err(EngineError::InvalidWinnerCount);
        }
        for task in &spec.tasks {
            if task.description.trim().is_empty() {
                return Err(EngineError::InvalidTask);
            }
        }
        let (duration_minutes, max_participants, end_time) = match spec.contest_type {
            ContestType::Duration => {
                let minutes = spec.duration_minutes.ok_or(EngineError::InvalidDuration)?;
                if minutes <= 0 {
                    return Err(EngineError::InvalidDuration);
                }
                let span =
                    Duration::try_minutes(minutes).ok_or(EngineError::InvalidDuration)?;
                let end = now
                    .checked_add_signed(span)
                    .ok_or(EngineError::InvalidDuration)?;
                (Some(minutes), None, Some(end))
            }
            ContestType::ParticipantCap => {
                let max = spec
                    .max_participants
                    .ok_or(EngineError::InvalidParticipantLimit)?;
                if max == 0 {
                    return Err(EngineError::InvalidParticipantLimit);
                }
                (None, Some(max), None)
            }
        };

        let ended = self.store.end_active_contests()?;
        if ended > 0 {
            info!("ended {ended} previously active contest(s)");
        }

        let contest = self.store.insert_contest(NewContest {
            prize_amount: spec.prize_amount,
            contest_type: spec.contest_type,
            duration_minutes,
            max_participants,
            start_time: now,
            end_time,
            status: ContestStatus::Active,
            manually_stopped: false,
            submissions_stopped: false,
            winner_count: spec.winner_count,
        })?;

        // A contest always carries at least one required task.
        if spec.tasks.is_empty() {
            self.store
                .insert_task(contest.id, &TaskSpec::default_follow_task(), now)?;
        } else {
            for task in &spec.tasks {
                self.store.insert_task(contest.id, task, now)?;
            }
        }

        info!(
            "contest {} created: type={}, prize={}, winners={}",
            contest.id, contest.contest_type, contest.prize_amount, contest.winner_count
        );
        Ok(contest)
    }

    /// Attach a further task to an existing contest.
    pub fn add_task(
        &self,
        contest_id: ContestId,
        task: TaskSpec,
    ) -> Result<ContestTask, EngineError> {
        if task.description.trim().is_empty() {
            return Err(EngineError::InvalidTask);
        }
        if self.store.find_contest(contest_id)?.is_none() {
            return Err(EngineError::ContestNotFound);
        }
        Ok(self.store.insert_task(contest_id, &task, Utc::now())?)
    }

    pub fn reconcile_expired(&self) -> Result<u64, EngineError> {
        self.reconcile_expired_at(Utc::now())
    }

    /// Reconciliation pass: stops submissions on the active contest when
    /// its natural end condition holds. Does not touch `status`; the
    /// transition to ended or completed happens only via an explicit stop
    /// or winner selection.
    ///
    /// Safe to invoke redundantly from many concurrent callers: the flip
    /// is a conditional update in the store, so concurrent executions
    /// converge on the same state. Returns how many contests were flipped.
    pub fn reconcile_expired_at(&self, now: DateTime<Utc>) -> Result<u64, EngineError> {
        let contest = match self.store.find_active_contest()? {
            Some(contest) => contest,
            None => return Ok(0),
        };
        if contest.manually_stopped || contest.submissions_stopped {
            return Ok(0);
        }
        let count = self.store.count_submissions(contest.id)?;
        if !is_naturally_expired(&contest, count, now) {
            return Ok(0);
        }
        let flipped = self.store.stop_submissions(contest.id)?;
        if flipped > 0 {
            info!(
                "contest {} naturally expired ({} submission(s)), submissions stopped",
                contest.id, count
            );
        }
        Ok(flipped)
    }

    /// Operator stop of submissions only; the contest stays active for
    /// reads. Idempotent.
    pub fn stop_submissions(&self, contest_id: ContestId) -> Result<(), EngineError> {
        if self.store.find_contest(contest_id)?.is_none() {
            return Err(EngineError::ContestNotFound);
        }
        let changed = self.store.stop_submissions(contest_id)?;
        if changed > 0 {
            info!("submissions stopped for contest {contest_id}");
        }
        Ok(())
    }

    pub fn stop_contest(&self, contest_id: ContestId) -> Result<Vec<Winner>, EngineError> {
        self.stop_contest_at(contest_id, Utc::now())
    }

    /// Operator force-stop: marks the contest manually stopped and ended,
    /// then always concludes in a drawing.
    pub fn stop_contest_at(
        &self,
        contest_id: ContestId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Winner>, EngineError> {
        let changed = self.store.mark_manually_stopped(contest_id)?;
        if changed == 0 && self.store.find_contest(contest_id)?.is_none() {
            return Err(EngineError::ContestNotFound);
        }
        if changed > 0 {
            info!("contest {contest_id} manually stopped");
        }
        self.select_winners_at(contest_id, now)
    }

    pub fn submit(&self, contest_id: ContestId, address: &str) -> Result<Submission, EngineError> {
        self.submit_at(contest_id, address, Utc::now())
    }

    /// Admit one submission: format check, active check, closed check,
    /// required-task gating, then the conditional insert. The write path
    /// has no expiry side effect; reconciliation belongs to readers.
    pub fn submit_at(
        &self,
        contest_id: ContestId,
        address: &str,
        now: DateTime<Utc>,
    ) -> Result<Submission, EngineError> {
        if !is_valid_evm_address(address) {
            return Err(EngineError::InvalidAddress);
        }
        let contest = match self.store.find_contest(contest_id)? {
            Some(contest) => contest,
            None => return Err(EngineError::ContestNotActive),
        };
        if !contest.is_active() {
            return Err(EngineError::ContestNotActive);
        }
        if contest.submissions_stopped {
            return Err(EngineError::SubmissionsClosed);
        }

        let required: Vec<TaskId> = self
            .store
            .list_tasks(contest_id)?
            .into_iter()
            .filter(|task| task.is_required)
            .map(|task| task.id)
            .collect();
        if !required.is_empty() {
            let completed: HashSet<TaskId> = self
                .store
                .list_completions(contest_id, address)?
                .into_iter()
                .map(|completion| completion.task_id)
                .collect();
            if required.iter().any(|id| !completed.contains(id)) {
                return Err(EngineError::TasksIncomplete);
            }
        }

        // The unique constraint is the source of truth for "at most one
        // entry per address"; a concurrent duplicate still loses here.
        match self.store.insert_submission(contest_id, address, now) {
            Ok(submission) => {
                info!(
                    "submission accepted for contest {} from {}",
                    contest_id,
                    shorten_address(address)
                );
                Ok(submission)
            }
            Err(StoreError::DuplicateKey) => Err(EngineError::DuplicateSubmission),
            Err(err) => Err(err.into()),
        }
    }

    /// Record that `address` satisfied `task_id`. Re-marking an already
    /// completed task succeeds without writing.
    pub fn mark_task_completed(
        &self,
        contest_id: ContestId,
        address: &str,
        task_id: TaskId,
    ) -> Result<(), EngineError> {
        if !is_valid_evm_address(address) {
            return Err(EngineError::InvalidAddress);
        }
        match self
            .store
            .insert_completion(contest_id, address, task_id, Utc::now())
        {
            Ok(written) => {
                if written {
                    debug!(
                        "task {} completed for contest {} by {}",
                        task_id,
                        contest_id,
                        shorten_address(address)
                    );
                }
                Ok(())
            }
            // A concurrent re-mark raced the insert; same outcome.
            Err(StoreError::DuplicateKey) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn select_winners(&self, contest_id: ContestId) -> Result<Vec<Winner>, EngineError> {
        self.select_winners_at(contest_id, Utc::now())
    }

    /// Draw winners for a closed contest.
    ///
    /// Effectively once: the status flip to completed is an atomic claim
    /// in the store, and whoever wins it performs the draw. Everyone else
    /// reads the persisted result. An empty submission pool is returned
    /// as-is with no state change, so an operator can still wait for
    /// entrants.
    pub fn select_winners_at(
        &self,
        contest_id: ContestId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Winner>, EngineError> {
        let contest = self
            .store
            .find_contest(contest_id)?
            .ok_or(EngineError::ContestNotFound)?;
        if contest.status == ContestStatus::Completed {
            return Ok(self.store.list_winners(contest_id)?);
        }
        if contest.is_active() && !contest.submissions_stopped {
            return Err(EngineError::ContestNotEnded);
        }

        let submissions = self.store.list_submissions(contest_id)?;
        if submissions.is_empty() {
            warn!("contest {contest_id} has no submissions, nothing to draw");
            return Ok(Vec::new());
        }

        if !self.store.claim_completion(contest_id)? {
            // Lost the claim. Either another caller completed the contest,
            // or submissions were reopened state-wise; re-read to tell.
            let reloaded = self
                .store
                .find_contest(contest_id)?
                .ok_or(EngineError::ContestNotFound)?;
            if reloaded.status == ContestStatus::Completed {
                return Ok(self.store.list_winners(contest_id)?);
            }
            return Err(EngineError::ContestNotEnded);
        }

        let count = submissions.len().min(contest.winner_count as usize);
        let mut rng = rand::thread_rng();
        let drawn: Vec<&Submission> = submissions.choose_multiple(&mut rng, count).collect();

        let mut winners = Vec::with_capacity(count);
        for submission in drawn {
            winners.push(self.store.insert_winner(
                contest_id,
                &submission.address,
                contest.prize_amount,
                now,
            )?);
        }
        info!(
            "contest {} completed: drew {} winner(s) from {} submission(s)",
            contest_id,
            winners.len(),
            submissions.len()
        );
        Ok(winners)
    }

    pub fn current_contest(&self) -> Result<Option<Contest>, EngineError> {
        Ok(self.store.find_active_contest()?)
    }

    pub fn last_completed_contest(&self) -> Result<Option<Contest>, EngineError> {
        Ok(self.store.last_completed_contest()?)
    }

    pub fn contest_overview(&self) -> Result<Option<ContestOverview>, EngineError> {
        self.contest_overview_at(Utc::now())
    }

    /// Read-side view of the current contest. Whether submissions would be
    /// admitted is decided through the expiry evaluator with the same `now`
    /// snapshot, so every reader presents the contest by the same rules
    /// regardless of clock skew or display timezone. Nothing is written;
    /// flipping the flag is `reconcile_expired`'s job.
    pub fn contest_overview_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Option<ContestOverview>, EngineError> {
        let contest = match self.store.find_active_contest()? {
            Some(contest) => contest,
            None => return Ok(None),
        };
        let submission_count = self.store.count_submissions(contest.id)?;
        let accepting_submissions = contest.is_active()
            && !contest.submissions_stopped
            && !is_naturally_expired(&contest, submission_count, now);
        Ok(Some(ContestOverview {
            contest,
            submission_count,
            accepting_submissions,
        }))
    }

    pub fn submissions(&self, contest_id: ContestId) -> Result<Vec<Submission>, EngineError> {
        Ok(self.store.list_submissions(contest_id)?)
    }

    pub fn tasks(&self, contest_id: ContestId) -> Result<Vec<ContestTask>, EngineError> {
        Ok(self.store.list_tasks(contest_id)?)
    }

    pub fn completions(
        &self,
        contest_id: ContestId,
        address: &str,
    ) -> Result<Vec<TaskCompletion>, EngineError> {
        Ok(self.store.list_completions(contest_id, address)?)
    }

    pub fn winners(&self, contest_id: ContestId) -> Result<Vec<Winner>, EngineError> {
        Ok(self.store.list_winners(contest_id)?)
    }

    /// Full winner history with the owning contest, newest first.
    pub fn winner_history(&self) -> Result<Vec<(Winner, Contest)>, EngineError> {
        Ok(self.store.list_all_winners()?)
    }
}
