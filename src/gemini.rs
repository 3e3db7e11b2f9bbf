//! Minimal Gemini client for our use-case.
//!
//! We only call `generateContent` and request a strict JSON object as text.
//! Calls are instrumented and log model names, latencies, and response sizes
//! (not contents).
//!
//! NOTE: We never log the API key and we keep payload truncations short.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

#[derive(Clone)]
pub struct Gemini {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  /// Model names tried in order until one answers.
  pub models: Vec<String>,
}

impl Gemini {
  /// Construct the client if we find GEMINI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("GEMINI_API_KEY").ok()?;
    let base_url = std::env::var("GEMINI_BASE_URL")
      .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".into());
    let models: Vec<String> = std::env::var("GEMINI_MODELS")
      .map(|s| {
        s.split(',')
          .map(|m| m.trim().to_string())
          .filter(|m| !m.is_empty())
          .collect()
      })
      .unwrap_or_default();
    let models = if models.is_empty() {
      vec!["gemini-1.5-flash".into(), "gemini-1.5-pro".into()]
    } else {
      models
    };

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, models })
  }

  /// One `generateContent` call against a specific model.
  #[instrument(level = "info", skip(self, system, user), fields(model = %model))]
  async fn generate_content(
    &self,
    model: &str,
    system: &str,
    user: &str,
    temperature: f32,
  ) -> Result<String, String> {
    let url = format!("{}/models/{}:generateContent", self.base_url, model);
    let req = GenerateContentRequest {
      system_instruction: Some(Content { role: None, parts: vec![Part { text: system.into() }] }),
      contents: vec![Content {
        role: Some("user".into()),
        parts: vec![Part { text: user.into() }],
      }],
      generation_config: Some(GenerationConfig { temperature }),
    };

    let res = self
      .client
      .post(&url)
      .query(&[("key", self.api_key.as_str())])
      .header(USER_AGENT, "dlpgen-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .json(&req)
      .send()
      .await
      .map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_gemini_error(&body).unwrap_or(body);
      return Err(format!("Gemini HTTP {}: {}", status, msg));
    }

    let body: GenerateContentResponse = res.json().await.map_err(|e| e.to_string())?;
    if let Some(usage) = &body.usage_metadata {
      info!(
        prompt_tokens = ?usage.prompt_token_count,
        candidate_tokens = ?usage.candidates_token_count,
        total_tokens = ?usage.total_token_count,
        "Gemini usage"
      );
    }
    let text = body
      .candidates
      .into_iter()
      .next()
      .and_then(|c| c.content)
      .map(|c| c.parts.into_iter().map(|p| p.text).collect::<String>())
      .unwrap_or_default()
      .trim()
      .to_string();

    if text.is_empty() {
      return Err("Gemini returned an empty candidate".into());
    }
    Ok(text)
  }

  /// Generate the lesson-plan JSON text, trying each configured model name
  /// until one responds. Returns the raw (possibly malformed) text; repair
  /// and parsing belong to the caller.
  #[instrument(level = "info", skip(self, system, user), fields(user_len = user.len()))]
  pub async fn generate_lesson(&self, system: &str, user: &str) -> Result<String, String> {
    let start = std::time::Instant::now();
    let mut last_err = String::from("no models configured");

    for model in &self.models {
      match self.generate_content(model, system, user, 0.7).await {
        Ok(text) => {
          info!(elapsed = ?start.elapsed(), %model, response_len = text.len(), "Model response received");
          return Ok(text);
        }
        Err(e) => {
          warn!(%model, error = %e, "Model attempt failed; trying next");
          last_err = e;
        }
      }
    }

    error!(elapsed = ?start.elapsed(), error = %last_err, "All model attempts failed");
    Err(format!("Model generation failed: {last_err}"))
  }
}

// --- Wire DTOs ---

#[derive(Serialize)]
struct GenerateContentRequest {
  #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
  system_instruction: Option<Content>,
  contents: Vec<Content>,
  #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
  generation_config: Option<GenerationConfig>,
}
#[derive(Serialize, Deserialize)]
struct Content {
  #[serde(skip_serializing_if = "Option::is_none")]
  role: Option<String>,
  #[serde(default)]
  parts: Vec<Part>,
}
#[derive(Serialize, Deserialize)]
struct Part {
  #[serde(default)]
  text: String,
}
#[derive(Serialize)]
struct GenerationConfig {
  temperature: f32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
  #[serde(rename = "usageMetadata", default)]
  usage_metadata: Option<UsageMetadata>,
}
#[derive(Deserialize)]
struct Candidate {
  #[serde(default)]
  content: Option<Content>,
}
#[derive(Deserialize)]
struct UsageMetadata {
  #[serde(rename = "promptTokenCount", default)]
  prompt_token_count: Option<u32>,
  #[serde(rename = "candidatesTokenCount", default)]
  candidates_token_count: Option<u32>,
  #[serde(rename = "totalTokenCount", default)]
  total_token_count: Option<u32>,
}

/// Try to extract a clean error message from a Gemini error body.
fn extract_gemini_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}
