//! Canned fallback content.
//!
//! Whenever the model call or the JSON parse fails, the user still gets a
//! complete document; its content comes from here. One canonical English
//! wording, derived from the request's subject.

use crate::domain::{Evaluation, LessonPlanRecord, LessonRequest, Procedure, Resources};

/// Build a placeholder record that fills every field of the fixed schema.
/// Safe for any subject string, including empty.
pub fn sample_record(req: &LessonRequest) -> LessonPlanRecord {
  let subject = req.subject.as_str();
  let topic = match &req.topic {
    Some(t) if !t.trim().is_empty() => t.clone(),
    _ => format!("Sample: Introduction to {}", subject),
  };

  LessonPlanRecord {
    obj_1: format!("Understand basic {} concepts (Sample)", subject),
    obj_2: format!("Apply {} skills in simple exercises (Sample)", subject),
    obj_3: format!("Appreciate the value of learning {} (Sample)", subject),
    topic,
    integration_within: format!("Related {} topics (Sample)", subject),
    integration_across: "Mathematics, Science (Sample Integration)".into(),
    resources: Resources {
      guide: "Teacher's Guide (Sample)".into(),
      materials: "Learner's Materials (Sample)".into(),
      textbook: format!("{} Textbook - Chapter 1 (Sample)", subject),
      portal: "DepEd LR Portal - Sample Resources".into(),
      other: "Online educational websites (Sample)".into(),
    },
    procedure: Procedure {
      review: "Review of previous lesson on basic concepts (Sample)".into(),
      purpose_situation: format!("Real-world application of {} in daily life (Sample)", subject),
      visual_prompt: format!("{} Classroom Learning", subject),
      vocabulary: format!(
        "{}: The study of...\nTerm1: Definition1\nTerm2: Definition2\nTerm3: Definition3\nTerm4: Definition4\nTerm5: Definition5",
        subject
      ),
      activity_main: format!("Group activity exploring {} concepts (Sample)", subject),
      explicitation: format!(
        "Detailed explanation of {} with examples. Example 1: Basic application. Example 2: Advanced application. (Sample)",
        subject
      ),
      group_1: "Research and gather information (Sample)".into(),
      group_2: "Solve practice problems (Sample)".into(),
      group_3: "Create a presentation (Sample)".into(),
      generalization: "What key concepts did you learn today? How can you apply them?".into(),
    },
    evaluation: Evaluation {
      assess_q1: format!(
        "What is the main concept of {}?|A. Concept A (Correct)|B. Concept B|C. Concept C|D. Concept D",
        subject
      ),
      assess_q2: format!(
        "How would you apply {} in real life?|A. Application A|B. Application B (Correct)|C. Application C|D. Application D",
        subject
      ),
      assess_q3: format!(
        "Explain the difference between key terms in {}.|A. Difference A|B. Difference B|C. Difference C (Correct)|D. Difference D",
        subject
      ),
      assess_q4: format!(
        "Solve a simple problem using {} concepts.|A. Solution A|B. Solution B|C. Solution C|D. Solution D (Correct)",
        subject
      ),
      assess_q5: format!(
        "What are the limitations of {} approaches?|A. Limitation A (Correct)|B. Limitation B|C. Limitation C|D. Limitation D",
        subject
      ),
      assignment: "Research more about the topic online (Sample)".into(),
      remarks: "Sample lesson plan - model output unavailable".into(),
      reflection: "Students demonstrated understanding of sample concepts".into(),
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assessment::parse_question;

  fn req(subject: &str) -> LessonRequest {
    LessonRequest {
      subject: subject.into(),
      grade: "7".into(),
      quarter: "1".into(),
      content_standard: String::new(),
      performance_standard: String::new(),
      competency: String::new(),
      topic: None,
      obj_cognitive: None,
      obj_psychomotor: None,
      obj_affective: None,
    }
  }

  #[test]
  fn fills_every_evaluation_question_well_formed() {
    let r = sample_record(&req("Science"));
    for q in r.evaluation.questions() {
      let parsed = parse_question(q);
      assert!(!parsed.question.is_empty());
      assert_eq!(parsed.choices.len(), 4);
    }
  }

  #[test]
  fn request_topic_overrides_default() {
    let mut rq = req("Science");
    rq.topic = Some("Photosynthesis".into());
    assert_eq!(sample_record(&rq).topic, "Photosynthesis");
    rq.topic = Some("   ".into());
    assert!(sample_record(&rq).topic.starts_with("Sample:"));
  }

  #[test]
  fn tolerates_empty_subject() {
    let r = sample_record(&req(""));
    assert!(!r.obj_1.is_empty());
    assert!(r.procedure.visual_prompt.contains("Classroom Learning"));
  }
}
