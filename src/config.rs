//! Loading service configuration (prompt templates + school letterhead) from TOML.
//!
//! See `AppConfig`, `Prompts`, and `School` for the expected schema.

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub school: School,
}

/// Letterhead and signature metadata rendered into every document.
/// Override in TOML to rebrand for another institution.
#[derive(Clone, Debug, Deserialize)]
pub struct School {
  pub region: String,
  pub division: String,
  pub name: String,
  pub district: String,
  #[serde(default)] pub teacher: String,
  #[serde(default)] pub principal: String,
}

impl Default for School {
  fn default() -> Self {
    Self {
      region: "Department of Education Region XI".into(),
      division: "Division of Davao del Sur".into(),
      name: "Manual National High School".into(),
      district: "Kiblawan North District".into(),
      teacher: String::new(),
      principal: String::new(),
    }
  }
}

/// Prompts sent to the generative model. The default asks for the exact JSON
/// shape `LessonPlanRecord` deserializes; tune wording in TOML if needed.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  pub lesson_system: String,
  pub lesson_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      lesson_system: "You are an expert teacher from {school} in the {division}, {region}, Philippines. \
        Create a JSON object for a Daily Lesson Plan (DLP). Return ONLY raw JSON, no markdown. \
        Do NOT use bullet points in values. All string values must be properly quoted."
        .into(),
      lesson_user_template: r#"Subject: {subject}, Grade: {grade}, Quarter: {quarter}
Content Standard: {content_standard}
Performance Standard: {performance_standard}
Learning Competency: {competency}

CRITICAL INSTRUCTIONS:
1. You MUST generate exactly 5 distinct MULTIPLE CHOICE assessment questions with A, B, C, D choices.
2. Each assessment question MUST follow this format: "question|A. choice1|B. choice2|C. choice3|D. choice4"
3. The correct answer should be included in the choices.
4. Return ONLY valid JSON format. Do NOT include any explanations outside the JSON.

Structure:
{
    "obj_1": "Cognitive objective",
    "obj_2": "Psychomotor objective",
    "obj_3": "Affective objective",
    "topic": "The main topic (include math notation like 3x^2 if needed)",
    "integration_within": "Topic within same subject",
    "integration_across": "Topic across other subject",
    "resources": {
        "guide": "Teacher Guide reference",
        "materials": "Learner Materials reference",
        "textbook": "Textbook reference",
        "portal": "Learning Resource Portal reference",
        "other": "Other Learning Resources"
    },
    "procedure": {
        "review": "Review activity",
        "purpose_situation": "Real-life situation motivation description",
        "visual_prompt": "A simple 3-word visual description. Example: 'Red Apple Fruit'. NO sentences.",
        "vocabulary": "5 terms with definitions",
        "activity_main": "Main activity description",
        "explicitation": "Detailed explanation of the concept with TWO specific worked examples",
        "group_1": "Group 1 task",
        "group_2": "Group 2 task",
        "group_3": "Group 3 task",
        "generalization": "Reflection questions"
    },
    "evaluation": {
        "assess_q1": "Question 1 with choices in format: question|A. choice1|B. choice2|C. choice3|D. choice4",
        "assess_q2": "Question 2 in the same format",
        "assess_q3": "Question 3 in the same format",
        "assess_q4": "Question 4 in the same format",
        "assess_q5": "Question 5 in the same format",
        "assignment": "Assignment task",
        "remarks": "Remarks",
        "reflection": "Reflection"
    }
}"#
      .into(),
    }
  }
}

/// Attempt to load `AppConfig` from DLP_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_app_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("DLP_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "dlpgen_backend", %path, "Loaded app config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "dlpgen_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "dlpgen_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
