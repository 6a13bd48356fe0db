//! XP-priced upgrades.
//!
//! Every purchase is check-then-mutate: if the buyer cannot afford it, or the
//! upgrade is already at its bound, nothing changes.

use thiserror::Error;

use crate::types::{
    Progress, DEFAULT_LIVES, MAX_ATTEMPTS_CAP, MAX_LIVES_CAP, MIN_RECOVERY_MINUTES,
};

/// XP price of refilling a single life.
pub const LIFE_REFILL_COST: u64 = 50;
/// Flat XP price of one extra attempt per question.
pub const ATTEMPTS_UPGRADE_COST: u64 = 250;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PurchaseError {
    #[error("not enough XP: need {needed}, have {have}")]
    InsufficientXp { needed: u64, have: u64 },
    #[error("lives are already full")]
    LivesFull,
    #[error("upgrade is already at its maximum")]
    AtMaximum,
    #[error("recovery time is already at its minimum")]
    AtMinimum,
}

/// Price of raising the lives cap from `current`: strictly increasing per tier.
pub fn lives_max_upgrade_cost(current: u32) -> u64 {
    150 + u64::from(current.saturating_sub(DEFAULT_LIVES)) * 50
}

/// (minutes removed, XP cost) of the next recovery-time upgrade.
pub fn recovery_upgrade_step(current_minutes: u32) -> (u32, u64) {
    if current_minutes > 60 {
        (30, 200)
    } else {
        (15, 300)
    }
}

impl Progress {
    /// Deduct `cost` XP, or reject without touching anything.
    pub fn pay_xp(&mut self, cost: u64) -> Result<(), PurchaseError> {
        if self.xp < cost {
            return Err(PurchaseError::InsufficientXp {
                needed: cost,
                have: self.xp,
            });
        }
        self.xp -= cost;
        Ok(())
    }

    /// Buy one life back. Rejected when already at the cap.
    pub fn buy_life(&mut self) -> Result<(), PurchaseError> {
        if self.lives >= self.lives_max {
            return Err(PurchaseError::LivesFull);
        }
        self.pay_xp(LIFE_REFILL_COST)?;
        self.grant_lives(1);
        Ok(())
    }

    /// Raise the lives cap by one, up to the hard ceiling.
    pub fn upgrade_lives_max(&mut self) -> Result<u32, PurchaseError> {
        if self.lives_max >= MAX_LIVES_CAP {
            return Err(PurchaseError::AtMaximum);
        }
        self.pay_xp(lives_max_upgrade_cost(self.lives_max))?;
        self.lives_max = (self.lives_max + 1).min(MAX_LIVES_CAP);
        Ok(self.lives_max)
    }

    /// Shorten the recovery period, down to the hard floor.
    pub fn reduce_recovery_time(&mut self) -> Result<u32, PurchaseError> {
        if self.life_recovery_minutes <= MIN_RECOVERY_MINUTES {
            return Err(PurchaseError::AtMinimum);
        }
        let (step, cost) = recovery_upgrade_step(self.life_recovery_minutes);
        self.pay_xp(cost)?;
        self.life_recovery_minutes = self
            .life_recovery_minutes
            .saturating_sub(step)
            .max(MIN_RECOVERY_MINUTES);
        Ok(self.life_recovery_minutes)
    }

    /// One more attempt per question, up to the hard ceiling.
    pub fn upgrade_attempts(&mut self) -> Result<u32, PurchaseError> {
        if self.max_attempts_per_question >= MAX_ATTEMPTS_CAP {
            return Err(PurchaseError::AtMaximum);
        }
        self.pay_xp(ATTEMPTS_UPGRADE_COST)?;
        self.max_attempts_per_question = (self.max_attempts_per_question + 1).min(MAX_ATTEMPTS_CAP);
        Ok(self.max_attempts_per_question)
    }
}
