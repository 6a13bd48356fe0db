//! Stored records and API types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// Re-export shared types from quiz-core
pub use quiz_core::types::{
    Category, Level, MatchingQuestion, MultipleQuestion, Preferences, Progress, Question,
    QuestionKind,
};

// === Stored Record Types ===

/// User record stored at `users/{uid}`. Field names are camelCase on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub document_id: String,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub progress: Progress,
    /// Local question cache, persisted best-effort under `questionPool`.
    #[serde(default)]
    pub question_pool: Vec<CachedQuestion>,
}

/// Cache entry: a canonical question alongside its content hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedQuestion {
    #[serde(rename = "_idHash")]
    pub hash: String,
    #[serde(flatten)]
    pub question: Question,
}

/// Field-level merge patch for `users/{uid}/progress`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xp: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chests: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_streak: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_streak: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_session_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_challenge_completed_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_correct: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_wrong: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lives: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lives_max: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub life_recovery_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_life_ts: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts_per_question: Option<u32>,
}

impl ProgressPatch {
    /// Patch for a lives change driven by regeneration or spending.
    pub fn lives(progress: &Progress) -> Self {
        Self {
            lives: Some(progress.lives),
            last_life_ts: Some(progress.last_life_ts),
            ..Self::default()
        }
    }

    /// Patch for a streak advance.
    pub fn streak(progress: &Progress) -> Self {
        Self {
            current_streak: Some(progress.current_streak),
            best_streak: Some(progress.best_streak),
            last_session_date: progress.last_session_date,
            ..Self::default()
        }
    }

    /// Patch for an XP change.
    pub fn xp(progress: &Progress) -> Self {
        Self {
            xp: Some(progress.xp),
            chests: Some(progress.chests),
            ..Self::default()
        }
    }
}

/// Field-level merge patch for `users/{uid}/preferences`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_contrast: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduce_motion: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preload_next: Option<bool>,
}

impl PreferencesPatch {
    /// Apply the set toggles on top of existing preferences.
    pub fn apply(&self, preferences: &mut Preferences) {
        if let Some(v) = self.high_contrast {
            preferences.high_contrast = v;
        }
        if let Some(v) = self.reduce_motion {
            preferences.reduce_motion = v;
        }
        if let Some(v) = self.preload_next {
            preferences.preload_next = v;
        }
    }
}

// === Auth API Types ===

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: String,
    pub document_id: String,
    pub course: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserRecord,
}

// === Question API Types ===

#[derive(Debug, Clone, Deserialize)]
pub struct NextQuestionQuery {
    pub level: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NextQuestionResponse {
    /// Absent when no questions are available; that is a normal outcome.
    pub question: Option<Question>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<&'static str>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchQuery {
    pub level: String,
    pub count: Option<usize>,
    /// Comma-separated category tags; all categories when absent.
    pub categories: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorBatchRequest {
    pub category: String,
    pub level: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorBatchResponse {
    pub created: usize,
    pub questions: Vec<Question>,
}

// === Progress API Types ===

#[derive(Debug, Clone, Serialize)]
pub struct ProgressResponse {
    pub progress: Progress,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyChallengeResponse {
    /// False when the challenge was already completed today.
    pub newly_completed: bool,
    pub progress: Progress,
}

#[derive(Debug, Clone, Deserialize)]
pub struct XpRequest {
    pub amount: u64,
}

/// Either a chosen option (multiple) or a set of pairs (matching).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SubmittedAnswer {
    Choice(String),
    Pairs(Vec<[usize; 2]>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnswerRequest {
    pub category: String,
    pub level: String,
    /// Content hash identifying the stored question.
    pub hash: String,
    pub answer: SubmittedAnswer,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerResponse {
    pub correct: bool,
    pub xp_awarded: u64,
    pub explanation: String,
    pub progress: Progress,
}

#[derive(Debug, Clone, Serialize)]
pub struct LivesResponse {
    pub lives: u32,
    pub lives_max: u32,
    pub time_to_next_life_ms: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpendLifeResponse {
    /// False when there was no life to spend; state is left unchanged.
    pub spent: bool,
    pub lives: u32,
    pub time_to_next_life_ms: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseResponse {
    pub progress: Progress,
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::content_hash;
    use serde_json::json;

    #[test]
    fn user_record_wire_format_is_camel_case() {
        let raw = json!({
            "id": "u1",
            "fullName": "Ana María",
            "documentId": "1002003004",
            "course": "7B",
            "email": "ana@example.com",
            "isAdmin": true,
            "preferences": { "highContrast": true },
            "progress": { "xp": 120, "livesMax": 6 },
        });
        let record: UserRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.full_name, "Ana María");
        assert!(record.is_admin);
        assert!(record.preferences.high_contrast);
        assert_eq!(record.progress.xp, 120);
        assert_eq!(record.progress.lives_max, 6);
        assert!(record.question_pool.is_empty());
    }

    #[test]
    fn cached_question_flattens_around_the_hash() {
        let question = Question::Multiple(MultipleQuestion {
            level: Level::Facil,
            category: Category::Fracciones,
            question: "1/2 + 1/4".into(),
            options: vec!["3/4".into(), "1/6".into()],
            answer: "3/4".into(),
            explanation: String::new(),
        });
        let entry = CachedQuestion {
            hash: content_hash(&question),
            question: question.clone(),
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["_idHash"], content_hash(&question));
        assert_eq!(value["type"], "multiple");
        assert_eq!(value["question"], "1/2 + 1/4");

        let back: CachedQuestion = serde_json::from_value(value).unwrap();
        assert_eq!(back.question, question);
    }

    #[test]
    fn progress_patch_serializes_only_set_fields() {
        let patch = ProgressPatch {
            lives: Some(3),
            last_life_ts: Some(1_234),
            ..ProgressPatch::default()
        };
        let value = serde_json::to_value(&patch).unwrap();
        let map = value.as_object().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["lives"], 3);
        assert_eq!(map["lastLifeTs"], 1_234);
    }

    #[test]
    fn submitted_answer_accepts_both_shapes() {
        let choice: SubmittedAnswer = serde_json::from_value(json!("3/4")).unwrap();
        assert!(matches!(choice, SubmittedAnswer::Choice(ref s) if s == "3/4"));

        let pairs: SubmittedAnswer = serde_json::from_value(json!([[0, 1], [1, 0]])).unwrap();
        assert!(matches!(pairs, SubmittedAnswer::Pairs(ref p) if p.len() == 2));
    }
}
