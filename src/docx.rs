//! Document assembly: one fixed institutional DLP layout rendered with
//! `docx-rs` into an in-memory byte buffer.
//!
//! The assembler is a pure transformation: record + metadata (+ optional
//! image bytes) in, `.docx` bytes out. It performs no network I/O; fetching
//! the motivation visual happens upstream in `logic`. A missing or
//! undecodable image degrades to a textual placeholder paragraph.

use std::io::Cursor;

use docx_rs::{
  AlignmentType, Docx, PageMargin, Paragraph, Pic, Run, Table, TableCell, TableRow,
  VertAlignType, WidthType,
};
use tracing::instrument;

use crate::assessment::parse_question;
use crate::config::School;
use crate::domain::LessonPlanRecord;

// A4 in twips, narrow margins.
const PAGE_W: u32 = 11906;
const PAGE_H: u32 = 16838;
const MARGIN: i32 = 720;

// Two-column content grid (twips).
const LABEL_W: usize = 2800;
const VALUE_W: usize = 7660;

// Motivation visual, EMU (4 x 3 inches).
const IMAGE_W_EMU: u32 = 3_657_600;
const IMAGE_H_EMU: u32 = 2_743_200;

/// Ancillary metadata rendered around the record: letterhead, people,
/// standards, and the (caller-fixed) date string.
#[derive(Clone, Debug)]
pub struct DocumentMeta {
  pub school: School,
  pub teacher: String,
  pub principal: String,
  pub subject: String,
  pub grade: String,
  pub quarter: String,
  pub date: String,
  pub content_standard: String,
  pub performance_standard: String,
  pub competency: String,
}

/// Script position of one text fragment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Script {
  Plain,
  Superscript,
  Subscript,
}

/// One run-to-be: a slice of text plus how it sits on the baseline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fragment {
  pub text: String,
  pub script: Script,
}

/// Split inline `^token` / `_token` markers into separate fragments.
/// The common case has no markers and short-circuits to a single fragment.
/// A marker not followed by an alphanumeric token is kept literally.
pub fn split_script_markers(text: &str) -> Vec<Fragment> {
  if !text.contains('^') && !text.contains('_') {
    return vec![Fragment { text: text.to_string(), script: Script::Plain }];
  }

  let mut out: Vec<Fragment> = Vec::new();
  let mut plain = String::new();
  let chars: Vec<char> = text.chars().collect();
  let mut i = 0;

  while i < chars.len() {
    let c = chars[i];
    if c == '^' || c == '_' {
      // A digit-led token stops at the first non-digit so "H_2O" subscripts
      // only the 2; a letter-led token runs through alphanumerics.
      let mut j = i + 1;
      let mut token = String::new();
      let digits_only = chars.get(j).map(|c| c.is_ascii_digit()).unwrap_or(false);
      while j < chars.len() {
        let ok = if digits_only { chars[j].is_ascii_digit() } else { chars[j].is_alphanumeric() };
        if !ok {
          break;
        }
        token.push(chars[j]);
        j += 1;
      }
      if token.is_empty() {
        plain.push(c);
        i += 1;
        continue;
      }
      if !plain.is_empty() {
        out.push(Fragment { text: std::mem::take(&mut plain), script: Script::Plain });
      }
      let script = if c == '^' { Script::Superscript } else { Script::Subscript };
      out.push(Fragment { text: token, script });
      i = j;
    } else {
      plain.push(c);
      i += 1;
    }
  }

  if !plain.is_empty() || out.is_empty() {
    out.push(Fragment { text: plain, script: Script::Plain });
  }
  out
}

/// Render fragments into runs on a fresh paragraph. Vertical alignment is a
/// run property, so it goes through the run's property set rather than a
/// builder method on `Run` itself.
fn formatted_paragraph(text: &str) -> Paragraph {
  let mut para = Paragraph::new();
  for frag in split_script_markers(text) {
    let mut run = Run::new().add_text(frag.text);
    match frag.script {
      Script::Plain => {}
      Script::Superscript => {
        run.run_property = run.run_property.vert_align(VertAlignType::SuperScript);
      }
      Script::Subscript => {
        run.run_property = run.run_property.vert_align(VertAlignType::SubScript);
      }
    }
    para = para.add_run(run);
  }
  para
}

fn centered(text: &str, size: usize, bold: bool) -> Paragraph {
  let mut run = Run::new().add_text(text).size(size);
  if bold {
    run = run.bold();
  }
  Paragraph::new().add_run(run).align(AlignmentType::Center)
}

/// A value cell renders each line of the text as its own paragraph so
/// multi-line content (vocabulary lists) keeps its breaks.
fn value_cell(text: &str) -> TableCell {
  let mut cell = TableCell::new().width(VALUE_W, WidthType::Dxa);
  let mut any = false;
  for line in text.lines() {
    cell = cell.add_paragraph(formatted_paragraph(line));
    any = true;
  }
  if !any {
    cell = cell.add_paragraph(Paragraph::new().add_run(Run::new().add_text("")));
  }
  cell
}

fn label_cell(text: &str) -> TableCell {
  TableCell::new()
    .width(LABEL_W, WidthType::Dxa)
    .add_paragraph(Paragraph::new().add_run(Run::new().add_text(text).bold()))
}

fn content_row(label: &str, value: &str) -> TableRow {
  TableRow::new(vec![label_cell(label), value_cell(value)])
}

/// Section header: one bold cell spanning both columns.
fn section_row(title: &str) -> TableRow {
  TableRow::new(vec![TableCell::new()
    .width(LABEL_W + VALUE_W, WidthType::Dxa)
    .grid_span(2)
    .add_paragraph(Paragraph::new().add_run(Run::new().add_text(title).bold()))])
}

/// Row holding either the embedded motivation visual or its placeholder.
fn visual_row(image: Option<&[u8]>) -> TableRow {
  let cell = match image {
    Some(bytes) if looks_like_image(bytes) => {
      // `new_with_dimensions` takes pixels; `.size` takes EMU directly.
      let pic = Pic::new_with_dimensions(bytes.to_vec(), 0, 0).size(IMAGE_W_EMU, IMAGE_H_EMU);
      TableCell::new().width(VALUE_W, WidthType::Dxa).add_paragraph(
        Paragraph::new()
          .add_run(Run::new().add_image(pic))
          .align(AlignmentType::Center),
      )
    }
    _ => value_cell("[Visual aid unavailable - attach a picture related to the topic]"),
  };
  TableRow::new(vec![label_cell("Motivation Visual"), cell])
}

/// Magic-byte check: only PNG/JPEG/GIF buffers are embedded. Anything else
/// (error pages, truncated downloads) falls back to the placeholder.
fn looks_like_image(bytes: &[u8]) -> bool {
  bytes.starts_with(&[0x89, b'P', b'N', b'G'])
    || bytes.starts_with(&[0xFF, 0xD8, 0xFF])
    || bytes.starts_with(b"GIF8")
}

/// Produce the final `.docx` byte buffer. Never touches the network; the
/// only failure mode is the underlying zip writer.
#[instrument(level = "info", skip_all, fields(subject = %meta.subject, has_image = image.is_some()))]
pub fn assemble(
  record: &LessonPlanRecord,
  meta: &DocumentMeta,
  image: Option<&[u8]>,
) -> Result<Vec<u8>, String> {
  let mut docx = Docx::new()
    .page_size(PAGE_W, PAGE_H)
    .page_margin(
      PageMargin::new()
        .top(MARGIN)
        .bottom(MARGIN)
        .left(MARGIN)
        .right(MARGIN),
    );

  // Letterhead.
  docx = docx
    .add_paragraph(centered(&meta.school.region.to_uppercase(), 24, false))
    .add_paragraph(centered(&meta.school.division, 24, false))
    .add_paragraph(centered(&meta.school.name.to_uppercase(), 28, true))
    .add_paragraph(centered(&meta.school.district, 20, false))
    .add_paragraph(centered("DAILY LESSON PLAN", 26, true))
    .add_paragraph(Paragraph::new());

  // Detail block: who/when/what.
  let detail = Table::new(vec![
    content_row("Teacher", &meta.teacher),
    content_row("Date", &meta.date),
    content_row("Subject", &meta.subject),
    content_row("Grade Level", &meta.grade),
    content_row("Quarter", &meta.quarter),
    content_row("Content Standard", &meta.content_standard),
    content_row("Performance Standard", &meta.performance_standard),
    content_row("Learning Competency", &meta.competency),
  ])
  .set_grid(vec![LABEL_W, VALUE_W]);
  docx = docx.add_table(detail).add_paragraph(Paragraph::new());

  // Main two-column content table.
  let content = Table::new(vec![
    section_row("I. OBJECTIVES"),
    content_row("Cognitive", &record.obj_1),
    content_row("Psychomotor", &record.obj_2),
    content_row("Affective", &record.obj_3),
    section_row("II. CONTENT"),
    content_row("Topic", &record.topic),
    content_row("Integration (within)", &record.integration_within),
    content_row("Integration (across)", &record.integration_across),
    section_row("III. LEARNING RESOURCES"),
    content_row("Teacher's Guide", &record.resources.guide),
    content_row("Learner's Materials", &record.resources.materials),
    content_row("Textbook", &record.resources.textbook),
    content_row("LR Portal", &record.resources.portal),
    content_row("Other Resources", &record.resources.other),
    section_row("IV. PROCEDURE"),
    content_row("Review", &record.procedure.review),
    content_row("Purpose / Situation", &record.procedure.purpose_situation),
    visual_row(image),
    content_row("Vocabulary", &record.procedure.vocabulary),
    content_row("Main Activity", &record.procedure.activity_main),
    content_row("Explicitation", &record.procedure.explicitation),
    content_row("Group 1 Task", &record.procedure.group_1),
    content_row("Group 2 Task", &record.procedure.group_2),
    content_row("Group 3 Task", &record.procedure.group_3),
    content_row("Generalization", &record.procedure.generalization),
  ])
  .set_grid(vec![LABEL_W, VALUE_W]);
  docx = docx.add_table(content).add_paragraph(Paragraph::new());

  // Assessment block: five questions with indented lettered choices.
  docx = docx.add_paragraph(
    Paragraph::new().add_run(Run::new().add_text("V. EVALUATION").bold()),
  );
  for (i, raw) in record.evaluation.questions().iter().enumerate() {
    let q = parse_question(raw);
    docx = docx.add_paragraph(formatted_paragraph(&format!("{}. {}", i + 1, q.question)));
    for choice in &q.choices {
      docx = docx.add_paragraph(formatted_paragraph(choice).indent(Some(720), None, None, None));
    }
  }

  docx = docx
    .add_paragraph(Paragraph::new())
    .add_paragraph(
      Paragraph::new()
        .add_run(Run::new().add_text("VI. ASSIGNMENT: ").bold())
        .add_run(Run::new().add_text(record.evaluation.assignment.clone())),
    )
    .add_paragraph(
      Paragraph::new()
        .add_run(Run::new().add_text("VII. REMARKS: ").bold())
        .add_run(Run::new().add_text(record.evaluation.remarks.clone())),
    )
    .add_paragraph(
      Paragraph::new()
        .add_run(Run::new().add_text("VIII. REFLECTION: ").bold())
        .add_run(Run::new().add_text(record.evaluation.reflection.clone())),
    )
    .add_paragraph(Paragraph::new())
    .add_paragraph(Paragraph::new());

  // Signature block: two borderless columns.
  let half = (LABEL_W + VALUE_W) / 2;
  let sig_cell = |role: &str, name: &str| {
    TableCell::new()
      .width(half, WidthType::Dxa)
      .add_paragraph(Paragraph::new().add_run(Run::new().add_text(role)))
      .add_paragraph(Paragraph::new())
      .add_paragraph(
        Paragraph::new()
          .add_run(Run::new().add_text(name.to_uppercase()).bold().underline("single"))
          .align(AlignmentType::Center),
      )
  };
  let signatures = Table::new(vec![TableRow::new(vec![
    sig_cell("Prepared by:", &meta.teacher),
    sig_cell("Approved by:", &meta.principal),
  ])])
  .set_grid(vec![half, half])
  .clear_all_border();
  docx = docx.add_table(signatures);

  let mut cursor = Cursor::new(Vec::new());
  docx
    .build()
    .pack(&mut cursor)
    .map_err(|e| format!("docx pack failed: {e}"))?;
  Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::LessonRequest;
  use crate::fallback::sample_record;

  fn meta() -> DocumentMeta {
    DocumentMeta {
      school: School::default(),
      teacher: "Juan Dela Cruz".into(),
      principal: "Maria Santos".into(),
      subject: "Science".into(),
      grade: "7".into(),
      quarter: "1".into(),
      date: "January 15, 2026".into(),
      content_standard: "The learner demonstrates understanding of...".into(),
      performance_standard: "The learner is able to...".into(),
      competency: "Differentiates between...".into(),
    }
  }

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
  fn marker_free_text_is_one_plain_fragment() {
    let frags = split_script_markers("plain text with no markers");
    assert_eq!(frags.len(), 1);
    assert_eq!(frags[0].text, "plain text with no markers");
    assert_eq!(frags[0].script, Script::Plain);
  }

  #[test]
  fn superscript_marker_splits_runs() {
    let frags = split_script_markers("3x^2 + 1");
    assert_eq!(
      frags,
      vec![
        Fragment { text: "3x".into(), script: Script::Plain },
        Fragment { text: "2".into(), script: Script::Superscript },
        Fragment { text: " + 1".into(), script: Script::Plain },
      ]
    );
  }

  #[test]
  fn subscript_marker_splits_runs() {
    let frags = split_script_markers("H_2O");
    assert_eq!(
      frags,
      vec![
        Fragment { text: "H".into(), script: Script::Plain },
        Fragment { text: "2".into(), script: Script::Subscript },
        Fragment { text: "O".into(), script: Script::Plain },
      ]
    );
  }

  #[test]
  fn dangling_marker_stays_literal() {
    let frags = split_script_markers("ratio 5^ and end_");
    assert_eq!(frags.len(), 1);
    assert_eq!(frags[0].text, "ratio 5^ and end_");
  }

  #[test]
  fn script_fragments_set_run_vertical_alignment() {
    use docx_rs::ParagraphChild;

    let para = formatted_paragraph("H_2O");
    let aligned: Vec<bool> = para
      .children
      .iter()
      .map(|c| match c {
        ParagraphChild::Run(r) => r.run_property.vert_align.is_some(),
        _ => false,
      })
      .collect();
    // "H" plain, "2" subscript, "O" plain.
    assert_eq!(aligned, vec![false, true, false]);
  }

  #[test]
  fn script_markers_in_record_fields_still_assemble() {
    let mut record = sample_record(&req("Chemistry"));
    record.topic = "Balancing H_2O and 3x^2 expressions".into();
    record.procedure.explicitation = "E = mc^2 and CO_2".into();
    let bytes = assemble(&record, &meta(), None).unwrap();
    assert_eq!(&bytes[..2], b"PK");
  }

  #[test]
  fn assembles_fallback_record_to_zip_bytes() {
    let record = sample_record(&req("Science"));
    let bytes = assemble(&record, &meta(), None).unwrap();
    assert!(!bytes.is_empty());
    // OOXML packages are zip archives.
    assert_eq!(&bytes[..2], b"PK");
  }

  #[test]
  fn assembles_record_missing_resources_submap() {
    let record: LessonPlanRecord =
      serde_json::from_str(r#"{"obj_1": "x", "topic": "t"}"#).unwrap();
    assert!(record.resources.guide.is_empty());
    let bytes = assemble(&record, &meta(), None).unwrap();
    assert_eq!(&bytes[..2], b"PK");
  }

  #[test]
  fn fallback_round_trip_for_many_subjects() {
    for subject in ["Science", "", "Mathematics", "Araling Panlipunan", "ESP"] {
      let record = sample_record(&req(subject));
      let bytes = assemble(&record, &meta(), None)
        .unwrap_or_else(|e| panic!("assemble failed for {subject:?}: {e}"));
      assert_eq!(&bytes[..2], b"PK");
    }
  }

  #[test]
  fn embeds_png_magic_and_rejects_junk() {
    let record = sample_record(&req("Science"));
    let mut png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    png.extend_from_slice(&[0u8; 64]);
    let with_image = assemble(&record, &meta(), Some(&png)).unwrap();
    assert_eq!(&with_image[..2], b"PK");

    let junk = b"<html>not an image</html>";
    let with_junk = assemble(&record, &meta(), Some(junk)).unwrap();
    assert_eq!(&with_junk[..2], b"PK");
  }
}
