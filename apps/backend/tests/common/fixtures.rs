//! Test data builders.

use chrono::Utc;
use serde_json::{json, Value};

use matemico_backend::models::{CachedQuestion, Preferences, Progress, UserRecord};
use quiz_core::{content_hash, Category, Level, MultipleQuestion, Question};

/// User record with a fresh ledger.
pub fn user_record(uid: &str, is_admin: bool) -> UserRecord {
    UserRecord {
        id: uid.to_string(),
        full_name: "Estudiante Prueba".to_string(),
        document_id: "1000000001".to_string(),
        course: "7A".to_string(),
        email: format!("{uid}@example.com"),
        is_admin,
        preferences: Preferences::default(),
        progress: Progress::new(Utc::now()),
        question_pool: Vec::new(),
    }
}

/// User record with a caller-shaped ledger.
pub fn user_with_progress(uid: &str, progress: Progress) -> UserRecord {
    UserRecord {
        progress,
        ..user_record(uid, false)
    }
}

/// A small multiple-choice question.
pub fn multiple_question(i: usize, level: Level, category: Category) -> Question {
    Question::Multiple(MultipleQuestion {
        level,
        category,
        question: format!("pregunta {i}"),
        options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        answer: "a".into(),
        explanation: String::new(),
    })
}

/// Cache entry for a user's local question pool.
pub fn cached(question: Question) -> CachedQuestion {
    CachedQuestion {
        hash: content_hash(&question),
        question,
    }
}

pub fn register_request(email: &str) -> Value {
    json!({
        "fullName": "Estudiante Prueba",
        "documentId": "1000000001",
        "course": "7A",
        "email": email,
        "password": "secreta123",
    })
}

pub fn login_request(email: &str, password: &str) -> Value {
    json!({ "email": email, "password": password })
}
