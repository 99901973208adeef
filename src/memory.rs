//! In-process store backed by a single mutex.
//!
//! Every port method runs under one lock acquisition, which gives it the
//! single-statement atomicity the port contract requires. Used by the test
//! suite and as a reference implementation of the conditional-write
//! semantics a SQL-backed store would express as `UPDATE ... WHERE`.

use crate::state::{
    Contest, ContestId, ContestStatus, ContestTask, NewContest, Submission, TaskCompletion,
    TaskId, TaskSpec, Winner,
};
use crate::store::{ContestStore, StoreError, StoreResult};
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Tables {
    contests: Vec<Contest>,
    submissions: Vec<Submission>,
    tasks: Vec<ContestTask>,
    completions: Vec<TaskCompletion>,
    winners: Vec<Winner>,
    next_contest_id: ContestId,
    next_submission_id: i64,
    next_task_id: TaskId,
    next_completion_id: i64,
    next_winner_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
    }
}

impl ContestStore for MemoryStore {
    fn insert_contest(&self, contest: NewContest) -> StoreResult<Contest> {
        let mut t = self.lock()?;
        t.next_contest_id += 1;
        let row = Contest {
            id: t.next_contest_id,
            prize_amount: contest.prize_amount,
            contest_type: contest.contest_type,
            duration_minutes: contest.duration_minutes,
            max_participants: contest.max_participants,
            start_time: contest.start_time,
            end_time: contest.end_time,
            status: contest.status,
            manually_stopped: contest.manually_stopped,
            submissions_stopped: contest.submissions_stopped,
            winner_count: contest.winner_count,
        };
        t.contests.push(row.clone());
        Ok(row)
    }

    fn end_active_contests(&self) -> StoreResult<u64> {
        let mut t = self.lock()?;
        let mut changed = 0;
        for contest in t.contests.iter_mut() {
            if contest.status == ContestStatus::Active {
                contest.status = ContestStatus::Ended;
                changed += 1;
            }
        }
        Ok(changed)
    }

    fn find_active_contest(&self) -> StoreResult<Option<Contest>> {
        let t = self.lock()?;
        Ok(t.contests
            .iter()
            .rev()
            .find(|c| c.status == ContestStatus::Active)
            .cloned())
    }

    fn find_contest(&self, id: ContestId) -> StoreResult<Option<Contest>> {
        let t = self.lock()?;
        Ok(t.contests.iter().find(|c| c.id == id).cloned())
    }

    fn last_completed_contest(&self) -> StoreResult<Option<Contest>> {
        let t = self.lock()?;
        Ok(t.contests
            .iter()
            .rev()
            .find(|c| c.status == ContestStatus::Completed)
            .cloned())
    }

    fn stop_submissions(&self, id: ContestId) -> StoreResult<u64> {
        let mut t = self.lock()?;
        match t.contests.iter_mut().find(|c| {
            c.id == id && c.status == ContestStatus::Active && !c.submissions_stopped
        }) {
            Some(contest) => {
                contest.submissions_stopped = true;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn mark_manually_stopped(&self, id: ContestId) -> StoreResult<u64> {
        let mut t = self.lock()?;
        match t
            .contests
            .iter_mut()
            .find(|c| c.id == id && c.status != ContestStatus::Completed)
        {
            Some(contest) => {
                contest.manually_stopped = true;
                contest.submissions_stopped = true;
                contest.status = ContestStatus::Ended;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn claim_completion(&self, id: ContestId) -> StoreResult<bool> {
        let mut t = self.lock()?;
        match t.contests.iter_mut().find(|c| {
            c.id == id
                && c.status != ContestStatus::Completed
                && (c.submissions_stopped || c.status == ContestStatus::Ended)
        }) {
            Some(contest) => {
                contest.status = ContestStatus::Completed;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn insert_submission(
        &self,
        contest_id: ContestId,
        address: &str,
        submitted_at: DateTime<Utc>,
    ) -> StoreResult<Submission> {
        let mut t = self.lock()?;
        let duplicate = t
            .submissions
            .iter()
            .any(|s| s.contest_id == contest_id && s.address == address);
        if duplicate {
            return Err(StoreError::DuplicateKey);
        }
        t.next_submission_id += 1;
        let row = Submission {
            id: t.next_submission_id,
            contest_id,
            address: address.to_string(),
            submitted_at,
        };
        t.submissions.push(row.clone());
        Ok(row)
    }

    fn count_submissions(&self, contest_id: ContestId) -> StoreResult<u64> {
        let t = self.lock()?;
        Ok(t.submissions
            .iter()
            .filter(|s| s.contest_id == contest_id)
            .count() as u64)
    }

    fn list_submissions(&self, contest_id: ContestId) -> StoreResult<Vec<Submission>> {
        let t = self.lock()?;
        Ok(t.submissions
            .iter()
            .filter(|s| s.contest_id == contest_id)
            .cloned()
            .collect())
    }

    fn insert_task(
        &self,
        contest_id: ContestId,
        task: &TaskSpec,
        created_at: DateTime<Utc>,
    ) -> StoreResult<ContestTask> {
        let mut t = self.lock()?;
        t.next_task_id += 1;
        let row = ContestTask {
            id: t.next_task_id,
            contest_id,
            task_type: task.task_type.clone(),
            description: task.description.clone(),
            url: task.url.clone(),
            is_required: task.is_required,
            created_at,
        };
        t.tasks.push(row.clone());
        Ok(row)
    }

    fn list_tasks(&self, contest_id: ContestId) -> StoreResult<Vec<ContestTask>> {
        let t = self.lock()?;
        Ok(t.tasks
            .iter()
            .filter(|task| task.contest_id == contest_id)
            .cloned()
            .collect())
    }

    fn insert_completion(
        &self,
        contest_id: ContestId,
        address: &str,
        task_id: TaskId,
        completed_at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut t = self.lock()?;
        let exists = t.completions.iter().any(|c| {
            c.contest_id == contest_id && c.address == address && c.task_id == task_id
        });
        if exists {
            return Ok(false);
        }
        t.next_completion_id += 1;
        let row = TaskCompletion {
            id: t.next_completion_id,
            contest_id,
            address: address.to_string(),
            task_id,
            completed_at,
        };
        t.completions.push(row);
        Ok(true)
    }

    fn list_completions(
        &self,
        contest_id: ContestId,
        address: &str,
    ) -> StoreResult<Vec<TaskCompletion>> {
        let t = self.lock()?;
        Ok(t.completions
            .iter()
            .filter(|c| c.contest_id == contest_id && c.address == address)
            .cloned()
            .collect())
    }

    fn insert_winner(
        &self,
        contest_id: ContestId,
        address: &str,
        prize_amount: f64,
        won_at: DateTime<Utc>,
    ) -> StoreResult<Winner> {
        let mut t = self.lock()?;
        t.next_winner_id += 1;
        let row = Winner {
            id: t.next_winner_id,
            contest_id,
            address: address.to_string(),
            prize_amount,
            won_at,
        };
        t.winners.push(row.clone());
        Ok(row)
    }

    fn list_winners(&self, contest_id: ContestId) -> StoreResult<Vec<Winner>> {
        let t = self.lock()?;
        Ok(t.winners
            .iter()
            .filter(|w| w.contest_id == contest_id)
            .cloned()
            .collect())
    }

    fn list_all_winners(&self) -> StoreResult<Vec<(Winner, Contest)>> {
        let t = self.lock()?;
        let mut rows: Vec<(Winner, Contest)> = t
            .winners
            .iter()
            .filter_map(|w| {
                t.contests
                    .iter()
                    .find(|c| c.id == w.contest_id)
                    .map(|c| (w.clone(), c.clone()))
            })
            .collect();
        rows.sort_by(|a, b| b.0.won_at.cmp(&a.0.won_at).then(b.0.id.cmp(&a.0.id)));
        Ok(rows)
    }
}
