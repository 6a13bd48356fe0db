//! Question authoring through a chat-completions service.
//!
//! The service is asked for a JSON array of exercises in the Spanish
//! vocabulary; replies are parsed defensively because models do not always
//! honor the shape. Parse failures degrade to an empty batch — only
//! transport and service-side failures surface as errors.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use quiz_core::{Category, Level};

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("generation transport error: {0}")]
    Transport(String),
    #[error("generation service error (HTTP {status}): {message}")]
    Service { status: u16, message: String },
}

/// Chat-completions client used for authoring question batches.
#[derive(Clone)]
pub struct Generator {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl Generator {
    /// Build the client when OPENAI_API_KEY is present; otherwise authoring
    /// stays disabled.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").ok()?;
        let base_url = std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let model =
            std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .ok()?;

        Some(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask for `count` fresh exercises for one category/level. Returns raw
    /// records in the service's vocabulary; the caller normalizes them.
    pub async fn generate_batch(
        &self,
        level: Level,
        category: Category,
        count: usize,
    ) -> Result<Vec<Value>, GeneratorError> {
        let n = count.clamp(1, 200);
        let system = format!(
            "Eres un generador de ejercicios para 7°.\n\
             Categoría: {}. Nivel: {}.\n\
             - Fracciones: suma/resta/mult/div, simplificación, comparación.\n\
             - Álgebra: expresiones, evaluación, propiedades, simplificación básica.\n\
             - Ecuaciones: lineales de una incógnita.\n\
             - 50% opción múltiple (4 opciones) y 50% emparejamiento.\n\
             - No repitas dentro del lote. Resultados limpios.",
            category.as_str(),
            level.as_str()
        );
        let user = format!(
            "Genera EXACTAMENTE {n} ejercicios NUEVOS y devuelve SOLO un ARRAY JSON:\n\n\
             [\n\
             {{\n\
             \"tipo\": \"opcion_multiple\",\n\
             \"pregunta\": \"string\",\n\
             \"opciones\": [\"string\",\"string\",\"string\",\"string\"],\n\
             \"respuesta\": \"string\",\n\
             \"explicacion\": \"string\"\n\
             }},\n\
             {{\n\
             \"tipo\": \"emparejamiento\",\n\
             \"instrucciones\": \"string\",\n\
             \"izquierda\": [\"string\",\"string\",\"string\",\"string\"],\n\
             \"derecha\": [\"string\",\"string\",\"string\",\"string\"],\n\
             \"respuestas\": [[0,1],[1,2],[2,3],[3,0]],\n\
             \"explicacion\": \"string\"\n\
             }}\n\
             ]"
        );

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: system,
                },
                ChatMessage {
                    role: "user".into(),
                    content: user,
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object".into(),
            },
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| GeneratorError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let message = extract_service_error(&body).unwrap_or(body);
            return Err(GeneratorError::Service { status, message });
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GeneratorError::Transport(e.to_string()))?;
        let content = body
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        let records = extract_question_array(&content);
        tracing::info!(
            "generation returned {} raw records for {}/{}",
            records.len(),
            category.as_str(),
            level.as_str()
        );
        Ok(records)
    }
}

/// Pull an array of records out of whatever the model produced: a direct
/// array, an object wrapping one, or prose with an embedded array. Anything
/// else yields an empty list.
pub(crate) fn extract_question_array(raw: &str) -> Vec<Value> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items,
        Ok(Value::Object(map)) => {
            if let Some(Value::Array(items)) = map.get("array") {
                return items.clone();
            }
            map.into_iter()
                .find_map(|(_, v)| match v {
                    Value::Array(items) => Some(items),
                    _ => None,
                })
                .unwrap_or_default()
        }
        Ok(_) => Vec::new(),
        Err(_) => {
            // Last resort: the widest bracketed substring.
            match (raw.find('['), raw.rfind(']')) {
                (Some(start), Some(end)) if start < end => {
                    serde_json::from_str::<Vec<Value>>(&raw[start..=end]).unwrap_or_default()
                }
                _ => Vec::new(),
            }
        }
    }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Service errors come back as `{"error": {"message": "..."}}`.
fn extract_service_error(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct Wrap {
        error: Inner,
    }
    #[derive(Deserialize)]
    struct Inner {
        message: String,
    }
    serde_json::from_str::<Wrap>(body)
        .ok()
        .map(|w| w.error.message)
}
