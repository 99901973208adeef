//! Natural-expiry evaluation.
//!
//! Pure and deterministic: the clock is sampled once by the caller and
//! threaded through, never re-read mid-evaluation, so both branches of the
//! check see the same instant.

use crate::state::{Contest, ContestType};
use chrono::{DateTime, Utc};

/// Whether a contest's natural end condition holds at `now`.
///
/// A manually stopped contest is never naturally expired; the operator
/// already ended it through a different path and the timer is not
/// authoritative for it.
pub fn is_naturally_expired(
    contest: &Contest,
    submission_count: u64,
    now: DateTime<Utc>,
) -> bool {
    if contest.manually_stopped {
        return false;
    }
    match contest.contest_type {
        ContestType::Duration => match contest.end_time {
            Some(end) => now >= end,
            None => false,
        },
        ContestType::ParticipantCap => match contest.max_participants {
            Some(max) => submission_count >= u64::from(max),
            None => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ContestStatus;
    use chrono::Duration;

    fn duration_contest(now: DateTime<Utc>, minutes: i64) -> Contest {
        Contest {
            id: 1,
            prize_amount: 5.0,
            contest_type: ContestType::Duration,
            duration_minutes: Some(minutes),
            max_participants: None,
            start_time: now,
            end_time: Some(now + Duration::minutes(minutes)),
            status: ContestStatus::Active,
            manually_stopped: false,
            submissions_stopped: false,
            winner_count: 1,
        }
    }

    fn cap_contest(now: DateTime<Utc>, max: u32) -> Contest {
        Contest {
            contest_type: ContestType::ParticipantCap,
            duration_minutes: None,
            max_participants: Some(max),
            end_time: None,
            ..duration_contest(now, 0)
        }
    }

    #[test]
    fn duration_contest_expires_exactly_at_end_time() {
        let now = Utc::now();
        let contest = duration_contest(now, 30);
        assert!(!is_naturally_expired(&contest, 0, now));
        assert!(!is_naturally_expired(
            &contest,
            0,
            now + Duration::minutes(30) - Duration::seconds(1)
        ));
        assert!(is_naturally_expired(&contest, 0, now + Duration::minutes(30)));
        assert!(is_naturally_expired(&contest, 0, now + Duration::hours(2)));
    }

    #[test]
    fn cap_contest_expires_at_participant_cap() {
        let now = Utc::now();
        let contest = cap_contest(now, 3);
        assert!(!is_naturally_expired(&contest, 0, now));
        assert!(!is_naturally_expired(&contest, 2, now));
        assert!(is_naturally_expired(&contest, 3, now));
        assert!(is_naturally_expired(&contest, 4, now));
    }

    #[test]
    fn manual_stop_disables_the_timer() {
        let now = Utc::now();
        let mut contest = duration_contest(now, 1);
        contest.manually_stopped = true;
        assert!(!is_naturally_expired(&contest, 0, now + Duration::days(1)));
    }

    #[test]
    fn missing_bound_never_expires() {
        let now = Utc::now();
        let mut contest = duration_contest(now, 30);
        contest.end_time = None;
        assert!(!is_naturally_expired(&contest, 100, now));

        let mut contest = cap_contest(now, 3);
        contest.max_participants = None;
        assert!(!is_naturally_expired(&contest, 100, now));
    }
}
