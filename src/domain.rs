//! Domain models: the lesson request, the fixed-schema lesson plan record,
//! and the derived assessment question.

use serde::{Deserialize, Serialize};

/// One generation attempt's inputs. Immutable once built.
#[derive(Clone, Debug, Deserialize)]
pub struct LessonRequest {
  pub subject: String,
  pub grade: String,
  pub quarter: String,
  #[serde(default)] pub content_standard: String,
  #[serde(default)] pub performance_standard: String,
  #[serde(default)] pub competency: String,
  #[serde(default)] pub topic: Option<String>,
  #[serde(default)] pub obj_cognitive: Option<String>,
  #[serde(default)] pub obj_psychomotor: Option<String>,
  #[serde(default)] pub obj_affective: Option<String>,
}

/// Fixed-schema lesson plan content. Every field defaults to an empty string
/// so a partially-parsed model response never leaves a hole that rendering
/// would have to special-case.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LessonPlanRecord {
  #[serde(default)] pub obj_1: String,
  #[serde(default)] pub obj_2: String,
  #[serde(default)] pub obj_3: String,
  #[serde(default)] pub topic: String,
  #[serde(default)] pub integration_within: String,
  #[serde(default)] pub integration_across: String,
  #[serde(default)] pub resources: Resources,
  #[serde(default)] pub procedure: Procedure,
  #[serde(default)] pub evaluation: Evaluation,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Resources {
  #[serde(default)] pub guide: String,
  #[serde(default)] pub materials: String,
  #[serde(default)] pub textbook: String,
  #[serde(default)] pub portal: String,
  #[serde(default)] pub other: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Procedure {
  #[serde(default)] pub review: String,
  #[serde(default)] pub purpose_situation: String,
  /// Short keyword phrase that seeds the image search.
  #[serde(default)] pub visual_prompt: String,
  #[serde(default)] pub vocabulary: String,
  #[serde(default)] pub activity_main: String,
  #[serde(default)] pub explicitation: String,
  #[serde(default)] pub group_1: String,
  #[serde(default)] pub group_2: String,
  #[serde(default)] pub group_3: String,
  #[serde(default)] pub generalization: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Evaluation {
  // Pipe-delimited: "question|A. w|B. x|C. y|D. z"
  #[serde(default)] pub assess_q1: String,
  #[serde(default)] pub assess_q2: String,
  #[serde(default)] pub assess_q3: String,
  #[serde(default)] pub assess_q4: String,
  #[serde(default)] pub assess_q5: String,
  #[serde(default)] pub assignment: String,
  #[serde(default)] pub remarks: String,
  #[serde(default)] pub reflection: String,
}

impl Evaluation {
  /// The five assessment strings in document order.
  pub fn questions(&self) -> [&str; 5] {
    [
      &self.assess_q1,
      &self.assess_q2,
      &self.assess_q3,
      &self.assess_q4,
      &self.assess_q5,
    ]
  }
}

/// Parsed on demand from a pipe-delimited evaluation string; never stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssessmentQuestion {
  pub question: String,
  /// Up to four choices, each carrying its "A."–"D." label.
  pub choices: Vec<String>,
}
