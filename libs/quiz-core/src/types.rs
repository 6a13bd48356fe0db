//! Core types for the math practice engine.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Difficulty tier, stored under its lowercase Spanish tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Facil,
    Medio,
    Dificil,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Facil => "facil",
            Self::Medio => "medio",
            Self::Dificil => "dificil",
        }
    }

    /// Lenient parse: case-insensitive, unknown tags yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "facil" => Some(Self::Facil),
            "medio" => Some(Self::Medio),
            "dificil" => Some(Self::Dificil),
            _ => None,
        }
    }

    /// All tiers, in ascending difficulty.
    pub fn all() -> [Self; 3] {
        [Self::Facil, Self::Medio, Self::Dificil]
    }
}

/// Topic tag, stored under its lowercase Spanish tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Fracciones,
    Algebra,
    Igualdades,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fracciones => "fracciones",
            Self::Algebra => "algebra",
            Self::Igualdades => "igualdades",
        }
    }

    /// Lenient parse: case-insensitive, unknown tags yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fracciones" => Some(Self::Fracciones),
            "algebra" => Some(Self::Algebra),
            "igualdades" => Some(Self::Igualdades),
            _ => None,
        }
    }

    pub fn all() -> [Self; 3] {
        [Self::Fracciones, Self::Algebra, Self::Igualdades]
    }
}

/// Question shape, without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Multiple,
    Matching,
}

/// Multiple-choice question: pick one option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultipleQuestion {
    pub level: Level,
    pub category: Category,
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    #[serde(default)]
    pub explanation: String,
}

impl MultipleQuestion {
    /// An option is correct when it equals the stored answer exactly.
    pub fn is_correct(&self, choice: &str) -> bool {
        choice == self.answer
    }

    /// At least two options, and the answer must be one of them.
    pub fn is_well_formed(&self) -> bool {
        self.options.len() >= 2 && self.options.iter().any(|o| o == &self.answer)
    }
}

/// Matching question: connect items on the left with items on the right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingQuestion {
    pub level: Level,
    pub category: Category,
    pub instructions: String,
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub pairs: Vec<[usize; 2]>,
    #[serde(default)]
    pub explanation: String,
}

impl MatchingQuestion {
    /// A proposal is correct when it contains exactly the expected pairs,
    /// in any order.
    pub fn is_correct(&self, proposed: &[[usize; 2]]) -> bool {
        if proposed.len() != self.pairs.len() {
            return false;
        }
        let mut expected = self.pairs.clone();
        let mut given = proposed.to_vec();
        expected.sort_unstable();
        given.sort_unstable();
        expected == given
    }

    /// Every pair must index into `left`/`right`, and a left item may be
    /// matched at most once.
    pub fn is_well_formed(&self) -> bool {
        let in_bounds = self
            .pairs
            .iter()
            .all(|[l, r]| *l < self.left.len() && *r < self.right.len());
        let mut lefts: Vec<usize> = self.pairs.iter().map(|[l, _]| *l).collect();
        lefts.sort_unstable();
        lefts.dedup();
        in_bounds && lefts.len() == self.pairs.len()
    }
}

/// A question in canonical form, tagged by its `type` field on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Question {
    Multiple(MultipleQuestion),
    Matching(MatchingQuestion),
}

impl Question {
    pub fn kind(&self) -> QuestionKind {
        match self {
            Self::Multiple(_) => QuestionKind::Multiple,
            Self::Matching(_) => QuestionKind::Matching,
        }
    }

    pub fn level(&self) -> Level {
        match self {
            Self::Multiple(q) => q.level,
            Self::Matching(q) => q.level,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Self::Multiple(q) => q.category,
            Self::Matching(q) => q.category,
        }
    }

    pub fn explanation(&self) -> &str {
        match self {
            Self::Multiple(q) => &q.explanation,
            Self::Matching(q) => &q.explanation,
        }
    }

    pub fn is_well_formed(&self) -> bool {
        match self {
            Self::Multiple(q) => q.is_well_formed(),
            Self::Matching(q) => q.is_well_formed(),
        }
    }
}

/// Per-user accessibility and behavior toggles, persisted independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub high_contrast: bool,
    #[serde(default)]
    pub reduce_motion: bool,
    #[serde(default)]
    pub preload_next: bool,
}

/// Registration default for lives and the lives cap.
pub const DEFAULT_LIVES: u32 = 5;
/// Hard ceiling for purchasable lives-cap upgrades.
pub const MAX_LIVES_CAP: u32 = 10;
/// Registration default for minutes per recovered life.
pub const DEFAULT_RECOVERY_MINUTES: u32 = 120;
/// Hard floor for purchasable recovery-time upgrades.
pub const MIN_RECOVERY_MINUTES: u32 = 30;
/// Registration default for attempts per question.
pub const DEFAULT_ATTEMPTS: u32 = 2;
/// Hard ceiling for purchasable attempt upgrades.
pub const MAX_ATTEMPTS_CAP: u32 = 3;

/// Per-user progress ledger: XP, streaks, counters, and the lives resource.
///
/// Serialized camelCase to match the stored user record. Gamification fields
/// default to zero on the wire so that records written before those fields
/// existed still load; `restore` maps the zeros back to the real defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    #[serde(default)]
    pub xp: u64,
    #[serde(default)]
    pub chests: u32,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub best_streak: u32,
    #[serde(default)]
    pub last_session_date: Option<NaiveDate>,
    #[serde(default)]
    pub daily_challenge_completed_date: Option<NaiveDate>,
    #[serde(default)]
    pub total_correct: u32,
    #[serde(default)]
    pub total_wrong: u32,
    #[serde(default)]
    pub lives: u32,
    #[serde(default)]
    pub lives_max: u32,
    #[serde(default)]
    pub life_recovery_minutes: u32,
    /// Epoch milliseconds anchor for life regeneration.
    #[serde(default)]
    pub last_life_ts: i64,
    #[serde(default)]
    pub max_attempts_per_question: u32,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            xp: 0,
            chests: 0,
            current_streak: 0,
            best_streak: 0,
            last_session_date: None,
            daily_challenge_completed_date: None,
            total_correct: 0,
            total_wrong: 0,
            lives: 0,
            lives_max: 0,
            life_recovery_minutes: 0,
            last_life_ts: 0,
            max_attempts_per_question: 0,
        }
    }
}

impl Progress {
    /// Fresh ledger for a newly registered account.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            lives: DEFAULT_LIVES,
            lives_max: DEFAULT_LIVES,
            life_recovery_minutes: DEFAULT_RECOVERY_MINUTES,
            last_life_ts: now.timestamp_millis(),
            max_attempts_per_question: DEFAULT_ATTEMPTS,
            ..Self::default()
        }
    }

    /// Fill in gamification defaults for records stored before those fields
    /// existed (they deserialize as zero).
    pub fn restore(&mut self, now: DateTime<Utc>) {
        if self.lives_max == 0 {
            self.lives = DEFAULT_LIVES;
            self.lives_max = DEFAULT_LIVES;
        }
        if self.life_recovery_minutes == 0 {
            self.life_recovery_minutes = DEFAULT_RECOVERY_MINUTES;
        }
        if self.last_life_ts == 0 {
            self.last_life_ts = now.timestamp_millis();
        }
        if self.max_attempts_per_question == 0 {
            self.max_attempts_per_question = DEFAULT_ATTEMPTS;
        }
    }

    /// Earn XP; chests track each full hundred.
    pub fn add_xp(&mut self, delta: u64) {
        self.xp = self.xp.saturating_add(delta);
        self.chests = (self.xp / 100) as u32;
    }

    pub fn record_correct(&mut self) {
        self.total_correct = self.total_correct.saturating_add(1);
    }

    pub fn record_wrong(&mut self) {
        self.total_wrong = self.total_wrong.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    fn multiple() -> MultipleQuestion {
        MultipleQuestion {
            level: Level::Facil,
            category: Category::Fracciones,
            question: "1/2 + 1/4 = ?".into(),
            options: vec!["3/4".into(), "2/6".into(), "1/8".into(), "2/4".into()],
            answer: "3/4".into(),
            explanation: "Común denominador 4.".into(),
        }
    }

    fn matching() -> MatchingQuestion {
        MatchingQuestion {
            level: Level::Medio,
            category: Category::Algebra,
            instructions: "Une cada expresión con su valor para x=2".into(),
            left: vec!["x+1".into(), "2x".into(), "x^2".into()],
            right: vec!["3".into(), "4".into(), "4".into()],
            pairs: vec![[0, 0], [1, 1], [2, 2]],
            explanation: String::new(),
        }
    }

    #[test]
    fn level_and_category_tags_round_trip() {
        for level in Level::all() {
            assert_eq!(Level::parse(level.as_str()), Some(level));
        }
        for category in Category::all() {
            assert_eq!(Category::parse(category.as_str()), Some(category));
        }
        assert_eq!(Level::parse("FACIL"), Some(Level::Facil));
        assert_eq!(Level::parse("expert"), None);
        assert_eq!(Category::parse("geometria"), None);
    }

    #[test]
    fn question_serializes_with_type_tag() {
        let q = Question::Multiple(multiple());
        let value = serde_json::to_value(&q).unwrap();
        assert_eq!(value["type"], "multiple");
        assert_eq!(value["level"], "facil");
        assert_eq!(value["category"], "fracciones");

        let back: Question = serde_json::from_value(value).unwrap();
        assert_eq!(back, q);
    }

    #[test]
    fn multiple_answer_check_is_exact() {
        let q = multiple();
        assert!(q.is_correct("3/4"));
        assert!(!q.is_correct("2/4"));
        assert!(!q.is_correct(""));
    }

    #[test]
    fn matching_answer_check_ignores_pair_order() {
        let q = matching();
        assert!(q.is_correct(&[[2, 2], [0, 0], [1, 1]]));
        assert!(!q.is_correct(&[[0, 0], [1, 1]]));
        assert!(!q.is_correct(&[[0, 1], [1, 0], [2, 2]]));
    }

    #[test]
    fn well_formedness() {
        assert!(multiple().is_well_formed());
        let mut bad = multiple();
        bad.answer = "7/8".into();
        assert!(!bad.is_well_formed());

        assert!(matching().is_well_formed());
        let mut out_of_bounds = matching();
        out_of_bounds.pairs.push([9, 0]);
        assert!(!out_of_bounds.is_well_formed());
        let mut repeated_left = matching();
        repeated_left.pairs = vec![[0, 0], [0, 1]];
        assert!(!repeated_left.is_well_formed());
    }

    #[test]
    fn new_progress_has_registration_defaults() {
        let p = Progress::new(at(1_000_000));
        assert_eq!(p.lives, DEFAULT_LIVES);
        assert_eq!(p.lives_max, DEFAULT_LIVES);
        assert_eq!(p.life_recovery_minutes, DEFAULT_RECOVERY_MINUTES);
        assert_eq!(p.max_attempts_per_question, DEFAULT_ATTEMPTS);
        assert_eq!(p.last_life_ts, 1_000_000);
        assert_eq!(p.xp, 0);
        assert_eq!(p.current_streak, 0);
    }

    #[test]
    fn restore_fills_missing_gamification_fields() {
        let mut p: Progress = serde_json::from_str(r#"{"xp": 340, "currentStreak": 3}"#).unwrap();
        p.restore(at(5_000));
        assert_eq!(p.xp, 340);
        assert_eq!(p.current_streak, 3);
        assert_eq!(p.lives, DEFAULT_LIVES);
        assert_eq!(p.lives_max, DEFAULT_LIVES);
        assert_eq!(p.life_recovery_minutes, DEFAULT_RECOVERY_MINUTES);
        assert_eq!(p.last_life_ts, 5_000);
    }

    #[test]
    fn restore_keeps_existing_values() {
        let mut p = Progress::new(at(9_000));
        p.lives = 1;
        p.lives_max = 7;
        p.life_recovery_minutes = 45;
        p.restore(at(99_000));
        assert_eq!(p.lives, 1);
        assert_eq!(p.lives_max, 7);
        assert_eq!(p.life_recovery_minutes, 45);
        assert_eq!(p.last_life_ts, 9_000);
    }

    #[test]
    fn xp_derives_chests() {
        let mut p = Progress::new(at(0));
        p.add_xp(90);
        assert_eq!(p.chests, 0);
        p.add_xp(15);
        assert_eq!(p.xp, 105);
        assert_eq!(p.chests, 1);
        p.add_xp(300);
        assert_eq!(p.chests, 4);
    }

    #[test]
    fn progress_wire_format_is_camel_case() {
        let p = Progress::new(at(123));
        let value = serde_json::to_value(&p).unwrap();
        assert!(value.get("livesMax").is_some());
        assert!(value.get("lifeRecoveryMinutes").is_some());
        assert!(value.get("lastLifeTs").is_some());
        assert!(value.get("maxAttemptsPerQuestion").is_some());
        assert!(value.get("lives_max").is_none());
    }
}
