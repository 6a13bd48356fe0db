//! Daily streak and daily-challenge bookkeeping.
//!
//! Streaks are counted in calendar days of the app's home timezone
//! (America/Bogota, UTC-5 year-round).

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use crate::types::Progress;

const BOGOTA_OFFSET_SECONDS: i32 = -5 * 3600;

/// Calendar date in the app's home timezone.
pub fn local_date(now: DateTime<Utc>) -> NaiveDate {
    let offset = FixedOffset::east_opt(BOGOTA_OFFSET_SECONDS).expect("valid fixed offset");
    now.with_timezone(&offset).date_naive()
}

impl Progress {
    /// Advance the streak for a session on `today`. Same-day repeats are
    /// no-ops; a gap of exactly one day extends the streak; any other gap
    /// (or no prior session) resets it to 1.
    pub fn record_session(&mut self, today: NaiveDate) {
        if self.last_session_date == Some(today) {
            return;
        }
        let next = match self.last_session_date {
            Some(last) if (today - last).num_days() == 1 => self.current_streak + 1,
            _ => 1,
        };
        self.current_streak = next;
        self.best_streak = self.best_streak.max(next);
        self.last_session_date = Some(today);
    }

    /// Mark the daily challenge as completed for `today`, advancing the
    /// streak like any session. Idempotent per calendar day: returns false
    /// when already completed on `today`.
    pub fn complete_daily_challenge(&mut self, today: NaiveDate) -> bool {
        if self.daily_challenge_completed_date == Some(today) {
            return false;
        }
        self.record_session(today);
        self.daily_challenge_completed_date = Some(today);
        true
    }

    pub fn daily_challenge_done(&self, today: NaiveDate) -> bool {
        self.daily_challenge_completed_date == Some(today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn consecutive_day_extends_the_streak() {
        let mut p = Progress {
            current_streak: 4,
            best_streak: 4,
            last_session_date: Some(day("2024-03-10")),
            ..Progress::default()
        };
        p.record_session(day("2024-03-11"));
        assert_eq!(p.current_streak, 5);
        assert_eq!(p.best_streak, 5);
        assert_eq!(p.last_session_date, Some(day("2024-03-11")));
    }

    #[test]
    fn a_gap_resets_the_streak() {
        let mut p = Progress {
            current_streak: 4,
            best_streak: 6,
            last_session_date: Some(day("2024-03-10")),
            ..Progress::default()
        };
        p.record_session(day("2024-03-13"));
        assert_eq!(p.current_streak, 1);
        assert_eq!(p.best_streak, 6);
    }

    #[test]
    fn same_day_is_a_noop() {
        let mut p = Progress {
            current_streak: 4,
            best_streak: 4,
            last_session_date: Some(day("2024-03-10")),
            ..Progress::default()
        };
        p.record_session(day("2024-03-10"));
        assert_eq!(p.current_streak, 4);
    }

    #[test]
    fn first_session_starts_at_one() {
        let mut p = Progress::default();
        p.record_session(day("2024-03-10"));
        assert_eq!(p.current_streak, 1);
        assert_eq!(p.best_streak, 1);
    }

    #[test]
    fn daily_challenge_is_idempotent_per_day() {
        let mut p = Progress::default();
        assert!(p.complete_daily_challenge(day("2024-03-10")));
        assert!(!p.complete_daily_challenge(day("2024-03-10")));
        assert_eq!(p.current_streak, 1);
        assert!(p.daily_challenge_done(day("2024-03-10")));
        assert!(!p.daily_challenge_done(day("2024-03-11")));

        assert!(p.complete_daily_challenge(day("2024-03-11")));
        assert_eq!(p.current_streak, 2);
    }

    #[test]
    fn challenge_after_a_session_on_the_same_day_keeps_the_streak() {
        let mut p = Progress {
            current_streak: 3,
            best_streak: 3,
            last_session_date: Some(day("2024-03-09")),
            ..Progress::default()
        };
        p.record_session(day("2024-03-10"));
        assert_eq!(p.current_streak, 4);
        assert!(p.complete_daily_challenge(day("2024-03-10")));
        assert_eq!(p.current_streak, 4);
    }

    #[test]
    fn local_date_uses_the_home_timezone() {
        // 03:00 UTC is still the previous day in Bogota (22:00).
        let utc = DateTime::parse_from_rfc3339("2024-03-11T03:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(local_date(utc), day("2024-03-10"));

        let afternoon = DateTime::parse_from_rfc3339("2024-03-11T18:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(local_date(afternoon), day("2024-03-11"));
    }
}
