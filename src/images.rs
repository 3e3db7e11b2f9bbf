//! Best-effort image retrieval for the lesson's motivation visual.
//!
//! When the user uploads no picture, we query an image-by-keyword endpoint
//! with a sanitized prompt and a random seed. Every failure mode (network,
//! non-200, empty body) is reported as `Err` and the caller degrades to a
//! textual placeholder; nothing here is allowed to sink the document.

use std::time::Duration;

use rand::Rng;
use reqwest::header::USER_AGENT;
use tracing::{info, instrument};

use crate::util::percent_encode;

#[derive(Clone)]
pub struct ImageSearch {
  pub client: reqwest::Client,
  pub base_url: String,
}

impl ImageSearch {
  /// Build the client. IMAGE_BASE_URL overrides the default endpoint.
  pub fn from_env() -> Self {
    let base_url = std::env::var("IMAGE_BASE_URL")
      .unwrap_or_else(|_| "https://image.pollinations.ai/prompt".into());
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(10))
      .build()
      .unwrap_or_default();
    Self { client, base_url }
  }

  /// Fetch raw image bytes for a keyword phrase. The seed randomizes the
  /// result so repeated generations don't all share one stock photo.
  #[instrument(level = "info", skip(self), fields(prompt_len = prompt.len()))]
  pub async fn fetch_by_keyword(&self, prompt: &str) -> Result<Vec<u8>, String> {
    let keyword = sanitize_keyword(prompt);
    if keyword.is_empty() {
      return Err("empty image keyword".into());
    }

    let seed: u32 = rand::thread_rng().gen_range(1..=100_000);
    let url = format!("{}/{}", self.base_url, percent_encode(&keyword));

    let res = self
      .client
      .get(&url)
      .query(&[("seed", seed.to_string().as_str()), ("width", "640"), ("height", "480")])
      .header(USER_AGENT, "dlpgen-backend/0.1")
      .send()
      .await
      .map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      return Err(format!("image endpoint HTTP {}", res.status()));
    }

    let bytes = res.bytes().await.map_err(|e| e.to_string())?;
    if bytes.is_empty() {
      return Err("image endpoint returned an empty body".into());
    }
    info!(%keyword, seed, size = bytes.len(), "Image fetched");
    Ok(bytes.to_vec())
  }
}

/// Reduce a free-text visual prompt to a short, URL-friendly keyword phrase:
/// alphanumerics and spaces only, at most four words.
pub fn sanitize_keyword(prompt: &str) -> String {
  let cleaned: String = prompt
    .chars()
    .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
    .collect();
  cleaned
    .split_whitespace()
    .take(4)
    .collect::<Vec<_>>()
    .join(" ")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn keyword_keeps_short_phrases() {
    assert_eq!(sanitize_keyword("Red Apple Fruit"), "Red Apple Fruit");
  }

  #[test]
  fn keyword_strips_punctuation_and_truncates() {
    assert_eq!(
      sanitize_keyword("A photo of: plants, growing (indoors)!"),
      "A photo of plants"
    );
  }

  #[test]
  fn keyword_empty_for_symbol_soup() {
    assert_eq!(sanitize_keyword("!!! ???"), "");
  }
}
