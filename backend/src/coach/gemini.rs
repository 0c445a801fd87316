//! Google Gemini coaching collaborator
//!
//! Talks to the Generative Language REST API (`models/{model}:generateContent`).
//! Analysis requests ask for JSON matching a response schema with a required
//! `message` and an optional `estimatedCalories`.

use std::fmt::{Debug, Formatter, Result as FmtResult};

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, instrument};

use super::prompt::{analysis_prompt, cheer_prompt};
use super::{AnalysisRequest, CheerRequest, CoachError, CoachFeedback, CoachingCollaborator};

// ============================================================================
// API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// JSON the model is asked to return for analyses
#[derive(Debug, Default, Deserialize)]
struct AnalysisPayload {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "estimatedCalories")]
    estimated_calories: Option<f64>,
}

// ============================================================================
// Collaborator Implementation
// ============================================================================

pub struct GeminiCoach {
    client: Client,
    api_key: Secret<String>,
    base_url: String,
    model: String,
}

impl GeminiCoach {
    pub fn new(api_key: Secret<String>, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    fn build_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn analysis_schema() -> serde_json::Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "message": { "type": "STRING" },
                "estimatedCalories": { "type": "NUMBER" }
            },
            "required": ["message"]
        })
    }

    /// Send one prompt; `Ok(None)` when the model returned no text
    async fn generate(
        &self,
        prompt: String,
        generation_config: Option<GenerationConfig>,
    ) -> Result<Option<String>, CoachError> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: Some(prompt) }],
            }],
            generation_config,
        };

        debug!(model = %self.model, "Sending request to Gemini API");

        let response = self
            .client
            .post(self.build_url())
            .query(&[("key", self.api_key.expose_secret().as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(status = %status, "Gemini API error");
            let message = serde_json::from_str::<GenerateResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(CoachError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| CoachError::Parse(e.to_string()))?;

        if let Some(err) = parsed.error {
            return Err(CoachError::Api {
                status: status.as_u16(),
                message: err.message,
            });
        }

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .filter(|text| !text.is_empty());

        Ok(text)
    }
}

#[async_trait]
impl CoachingCollaborator for GeminiCoach {
    fn name(&self) -> &'static str {
        "gemini"
    }

    #[instrument(skip(self, request), fields(entry_id = %request.entry.id(), kind = %request.entry.kind()))]
    async fn analyze(&self, request: &AnalysisRequest) -> Result<CoachFeedback, CoachError> {
        let prompt = analysis_prompt(&request.entry, request.context.as_ref());
        let config = GenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: Self::analysis_schema(),
        };

        let payload = match self.generate(prompt, Some(config)).await? {
            Some(text) => serde_json::from_str::<AnalysisPayload>(&text)
                .map_err(|e| CoachError::Parse(e.to_string()))?,
            None => AnalysisPayload::default(),
        };

        Ok(CoachFeedback {
            message: payload.message.unwrap_or_default(),
            estimated_calories: payload.estimated_calories,
        })
    }

    #[instrument(skip(self, request), fields(entry_id = %request.entry.id()))]
    async fn cheer(&self, request: &CheerRequest) -> Result<String, CoachError> {
        let prompt = cheer_prompt(&request.entry, &request.cheerleader_name);
        let text = self.generate(prompt, None).await?;
        Ok(text.map(|t| t.trim().to_string()).unwrap_or_default())
    }
}

impl Debug for GeminiCoach {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GeminiCoach")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}
