//! Application state: prompts, school letterhead, optional Gemini client,
//! and the image-search client.
//!
//! The service is stateless per request; nothing here is mutated after
//! startup. Records are constructed fresh per generation and discarded once
//! the document buffer is handed to the caller.

use tracing::{info, instrument};

use crate::config::{load_app_config_from_env, Prompts, School};
use crate::gemini::Gemini;
use crate::images::ImageSearch;

#[derive(Clone)]
pub struct AppState {
    pub prompts: Prompts,
    pub school: School,
    pub gemini: Option<Gemini>,
    pub images: ImageSearch,
}

impl AppState {
    /// Build state from env: load TOML config, init the optional Gemini
    /// client and the image-search client.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_app_config_from_env().unwrap_or_default();

        let gemini = Gemini::from_env();
        if let Some(g) = &gemini {
            info!(target: "dlpgen_backend", base_url = %g.base_url, models = ?g.models, "Gemini enabled.");
        } else {
            info!(target: "dlpgen_backend", "Gemini disabled (no GEMINI_API_KEY). Serving fallback records.");
        }

        let images = ImageSearch::from_env();
        info!(target: "dlpgen_backend", image_base_url = %images.base_url, school = %cfg.school.name, "State ready");

        Self {
            prompts: cfg.prompts,
            school: cfg.school,
            gemini,
            images,
        }
    }

    /// State with the given prompts, no model client, and default letterhead.
    #[cfg(test)]
    pub fn for_tests(prompts: Prompts) -> Self {
        Self {
            prompts,
            school: School::default(),
            gemini: None,
            images: ImageSearch::from_env(),
        }
    }
}
