//! Parsing of pipe-delimited multiple-choice strings.
//!
//! The model is instructed to return each assessment item as
//! `question|A. choice|B. choice|C. choice|D. choice`. It usually complies;
//! when it doesn't, we degrade gracefully rather than error.

use crate::domain::AssessmentQuestion;

const LABELS: [&str; 4] = ["A.", "B.", "C.", "D."];

/// Split one evaluation string into a question and up to four labeled
/// choices. Pure and deterministic.
///
/// Degradation rules:
/// - fewer than 5 segments: the whole string is the question, no choices;
/// - a choice missing its leading label gets the label expected for its
///   position;
/// - blank choice segments are dropped, and missing slots are padded with a
///   labeled placeholder so the document always shows four options.
pub fn parse_question(raw: &str) -> AssessmentQuestion {
  let segments: Vec<&str> = raw.split('|').collect();
  if segments.len() < 5 {
    return AssessmentQuestion { question: raw.to_string(), choices: Vec::new() };
  }

  let question = segments[0].trim().to_string();
  let mut choices: Vec<String> = Vec::with_capacity(4);
  for seg in segments[1..5].iter() {
    let choice = seg.trim();
    if choice.is_empty() {
      continue;
    }
    let idx = choices.len();
    if has_label(choice, idx) {
      choices.push(choice.to_string());
    } else {
      choices.push(format!("{} {}", LABELS[idx], choice));
    }
  }

  while choices.len() < 4 {
    let idx = choices.len();
    choices.push(format!("{} (no choice provided)", LABELS[idx]));
  }

  AssessmentQuestion { question, choices }
}

/// A choice "has" a label if it starts with any of A.–D. — the model
/// sometimes shuffles labels, and we keep whatever it wrote rather than
/// double-prefix. Only an unlabeled choice gets the positional label.
fn has_label(choice: &str, _position: usize) -> bool {
  LABELS.iter().any(|l| choice.starts_with(l))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn well_formed_question_yields_four_labeled_choices() {
    let q = parse_question("Q|A. x|B. y|C. z|D. w");
    assert_eq!(q.question, "Q");
    assert_eq!(q.choices, vec!["A. x", "B. y", "C. z", "D. w"]);
  }

  #[test]
  fn short_input_becomes_question_with_no_choices() {
    let q = parse_question("What is photosynthesis?");
    assert_eq!(q.question, "What is photosynthesis?");
    assert!(q.choices.is_empty());

    let q = parse_question("Q|A. only|B. three|C. parts");
    assert_eq!(q.question, "Q|A. only|B. three|C. parts");
    assert!(q.choices.is_empty());
  }

  #[test]
  fn unlabeled_choices_get_positional_labels() {
    let q = parse_question("Q|first|second|third|fourth");
    assert_eq!(q.choices, vec!["A. first", "B. second", "C. third", "D. fourth"]);
  }

  #[test]
  fn blank_segments_are_padded_with_placeholders() {
    let q = parse_question("Q|A. x|B. y||");
    assert_eq!(q.question, "Q");
    assert_eq!(q.choices.len(), 4);
    assert_eq!(q.choices[0], "A. x");
    assert_eq!(q.choices[1], "B. y");
    assert!(q.choices[2].starts_with("C."));
    assert!(q.choices[3].starts_with("D."));
  }

  #[test]
  fn extra_segments_beyond_four_choices_are_ignored() {
    let q = parse_question("Q|A. x|B. y|C. z|D. w|E. extra");
    assert_eq!(q.choices.len(), 4);
    assert_eq!(q.choices[3], "D. w");
  }

  #[test]
  fn deterministic() {
    let a = parse_question("Q|one|two|three|four");
    let b = parse_question("Q|one|two|three|four");
    assert_eq!(a, b);
  }
}
