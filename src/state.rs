use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type ContestId = i64;
pub type SubmissionId = i64;
pub type TaskId = i64;
pub type WinnerId = i64;

/// Status of a contest
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContestStatus {
    /// Contest is open for submissions
    Active,
    /// Submissions are over, winners not yet drawn
    Ended,
    /// Winners have been drawn; terminal
    Completed,
}

impl ContestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContestStatus::Active => "active",
            ContestStatus::Ended => "ended",
            ContestStatus::Completed => "completed",
        }
    }
}

impl FromStr for ContestStatus {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ContestStatus::Active),
            "ended" => Ok(ContestStatus::Ended),
            "completed" => Ok(ContestStatus::Completed),
            _ => Err("invalid contest status"),
        }
    }
}

impl fmt::Display for ContestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a contest naturally ends
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContestType {
    /// Closes once its duration has elapsed
    #[serde(rename = "duration")]
    Duration,
    /// Closes once the participant cap is reached
    #[serde(rename = "participants")]
    ParticipantCap,
}

impl ContestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContestType::Duration => "duration",
            ContestType::ParticipantCap => "participants",
        }
    }
}

impl fmt::Display for ContestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One promotional contest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contest {
    pub id: ContestId,
    /// Prize paid to each winner, fixed when the contest is created
    pub prize_amount: f64,
    pub contest_type: ContestType,
    /// Set iff `contest_type` is `Duration`
    pub duration_minutes: Option<i64>,
    /// Set iff `contest_type` is `ParticipantCap`
    pub max_participants: Option<u32>,
    pub start_time: DateTime<Utc>,
    /// `start_time + duration_minutes` for duration contests, `None` otherwise
    pub end_time: Option<DateTime<Utc>>,
    pub status: ContestStatus,
    /// True if an operator force-ended the contest; natural-expiry timer
    /// checks are not authoritative once this is set
    pub manually_stopped: bool,
    /// True once no further submissions are accepted, regardless of cause
    pub submissions_stopped: bool,
    /// Number of winners to draw
    pub winner_count: u32,
}

impl Contest {
    pub fn is_active(&self) -> bool {
        self.status == ContestStatus::Active
    }
}

/// Insert payload for a contest; the store assigns the id.
#[derive(Clone, Debug)]
pub struct NewContest {
    pub prize_amount: f64,
    pub contest_type: ContestType,
    pub duration_minutes: Option<i64>,
    pub max_participants: Option<u32>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: ContestStatus,
    pub manually_stopped: bool,
    pub submissions_stopped: bool,
    pub winner_count: u32,
}

/// Caller-supplied parameters for creating a contest.
#[derive(Clone, Debug)]
pub struct ContestSpec {
    pub prize_amount: f64,
    pub contest_type: ContestType,
    pub duration_minutes: Option<i64>,
    pub max_participants: Option<u32>,
    pub winner_count: u32,
    /// Tasks to attach; when empty a default required follow task is used
    pub tasks: Vec<TaskSpec>,
}

/// A participant's entry in a contest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub contest_id: ContestId,
    pub address: String,
    pub submitted_at: DateTime<Utc>,
}

/// A requirement attached to a contest, e.g. following an account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContestTask {
    pub id: TaskId,
    pub contest_id: ContestId,
    pub task_type: String,
    pub description: String,
    pub url: Option<String>,
    pub is_required: bool,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied parameters for attaching a task.
#[derive(Clone, Debug)]
pub struct TaskSpec {
    pub task_type: String,
    pub description: String,
    pub url: Option<String>,
    pub is_required: bool,
}

impl TaskSpec {
    /// The default required task attached when a contest is created without
    /// an explicit task list.
    pub fn default_follow_task() -> Self {
        TaskSpec {
            task_type: "follow_x".to_string(),
            description: "Follow the official account on X (Twitter)".to_string(),
            url: None,
            is_required: true,
        }
    }
}

/// Records that one address satisfied one task.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCompletion {
    pub id: i64,
    pub contest_id: ContestId,
    pub address: String,
    pub task_id: TaskId,
    pub completed_at: DateTime<Utc>,
}

/// Result of a drawing. Created only by the winner selector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Winner {
    pub id: WinnerId,
    pub contest_id: ContestId,
    pub address: String,
    /// Copied from the contest at draw time; later contest edits never
    /// change a historical payout
    pub prize_amount: f64,
    pub won_at: DateTime<Utc>,
}

/// Read-side view of the current contest for presentation.
#[derive(Clone, Debug, Serialize)]
pub struct ContestOverview {
    pub contest: Contest,
    pub submission_count: u64,
    /// Whether a submission attempt would currently be admitted, computed
    /// through the expiry evaluator without writing anything
    pub accepting_submissions: bool,
}
