//! Time-gated life regeneration.
//!
//! Lives recover one per `life_recovery_minutes`, anchored at `last_life_ts`.
//! Regeneration preserves fractional progress toward the next life; spending
//! restarts the recovery clock at the moment of spending.

use chrono::{DateTime, Utc};

use crate::types::Progress;

impl Progress {
    /// Milliseconds needed to recover one life.
    pub fn recovery_period_ms(&self) -> i64 {
        i64::from(self.life_recovery_minutes) * 60_000
    }

    /// Apply any lives recovered since `last_life_ts`. Returns how many
    /// lives were gained; the anchor keeps the leftover elapsed time so
    /// partial progress toward the next life is never lost.
    pub fn regenerate_lives(&mut self, now: DateTime<Utc>) -> u32 {
        if self.lives >= self.lives_max {
            return 0;
        }
        let period = self.recovery_period_ms();
        if period <= 0 {
            return 0;
        }
        let now_ms = now.timestamp_millis();
        let elapsed = (now_ms - self.last_life_ts).max(0);
        let recovered = elapsed / period;
        if recovered == 0 {
            return 0;
        }
        let before = self.lives;
        let recovered_u32 = u32::try_from(recovered).unwrap_or(u32::MAX);
        self.lives = self.lives.saturating_add(recovered_u32).min(self.lives_max);
        self.last_life_ts = now_ms - elapsed % period;
        self.lives - before
    }

    /// Consume one life. Fails (and changes nothing) at zero. On success the
    /// recovery clock restarts from the moment of spending.
    pub fn spend_life(&mut self, now: DateTime<Utc>) -> bool {
        if self.lives == 0 {
            return false;
        }
        self.lives -= 1;
        self.last_life_ts = now.timestamp_millis();
        true
    }

    /// Add lives up to the cap. The recovery anchor is left untouched.
    pub fn grant_lives(&mut self, n: u32) {
        self.lives = self.lives.saturating_add(n).min(self.lives_max);
    }

    /// Milliseconds until the next life lands; zero when already at the cap.
    pub fn time_to_next_life_ms(&self, now: DateTime<Utc>) -> i64 {
        if self.lives >= self.lives_max {
            return 0;
        }
        let period = self.recovery_period_ms();
        if period <= 0 {
            return 0;
        }
        let elapsed = (now.timestamp_millis() - self.last_life_ts).max(0);
        (period - elapsed % period).max(0)
    }
}
