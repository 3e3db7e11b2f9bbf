//! Best-effort repair of model-returned text into parseable JSON.
//!
//! The generative model is asked for raw JSON but routinely wraps it in
//! Markdown fences, sprinkles bullet glyphs into values, truncates lines
//! mid-string, or leaves trailing commas. This module coerces such text into
//! something `serde_json` will usually accept. It never fails; the caller
//! still has to handle a parse error and fall back to canned content.

/// Run every repair pass over `raw`. Output is best-effort: the result may
/// still be invalid JSON.
pub fn clean_json_text(raw: &str) -> String {
  if raw.is_empty() {
    return String::new();
  }

  let mut text = strip_code_fences(raw);

  // Bullet glyphs inside values break nothing by themselves, but the model
  // tends to emit them instead of the requested plain hyphens.
  text = text.replace('\u{2022}', "-").replace('\u{25cf}', "-");

  let repaired: Vec<String> = text.lines().map(repair_line).collect();
  text = repaired.join("\n");

  text = strip_control_chars(&text);
  strip_trailing_commas(&text)
}

fn strip_code_fences(s: &str) -> String {
  s.replace("```json", "").replace("```", "")
}

/// Per-line quote repairs:
/// - a line ending right after a colon lost its value; synthesize `""`.
/// - a line with an odd number of quotes that contains a colon is assumed to
///   have an unterminated string value; close it heuristically. This can
///   misfire on legitimate embedded quotes (possessives), which is an
///   accepted limitation.
fn repair_line(line: &str) -> String {
  let trimmed_end = line.trim_end();
  if trimmed_end.ends_with(':') {
    return format!("{} \"\"", trimmed_end);
  }

  let quote_count = line.matches('"').count();
  if quote_count % 2 == 1 {
    if let Some(colon) = line.rfind(':') {
      if colon > 0 {
        let after = line[colon + 1..].trim();
        if after.starts_with('"') && !after.ends_with('"') {
          // Unterminated string value: close it, keeping any trailing comma
          // outside the string.
          let body = trimmed_end.strip_suffix(',');
          return match body {
            Some(b) => format!("{}\",", b.trim_end()),
            None => format!("{}\"", trimmed_end),
          };
        }
        if !after.is_empty() && !after.starts_with('"') {
          // Bare value on a line that already lost a quote somewhere:
          // quote the whole value region.
          let mut start = colon + 1;
          let bytes = line.as_bytes();
          while start < line.len() && (bytes[start] == b' ' || bytes[start] == b'\t') {
            start += 1;
          }
          return format!("{}\"{}\"", &line[..start], &line[start..]);
        }
      }
    }
  }

  line.to_string()
}

/// Drop control characters except newline and tab.
fn strip_control_chars(s: &str) -> String {
  s.chars()
    .filter(|&c| c == '\n' || c == '\t' || !c.is_control())
    .collect()
}

/// Remove commas that directly precede (modulo whitespace) a closing brace
/// or bracket.
fn strip_trailing_commas(s: &str) -> String {
  let chars: Vec<char> = s.chars().collect();
  let mut out = String::with_capacity(s.len());
  let mut i = 0;
  while i < chars.len() {
    if chars[i] == ',' {
      let mut j = i + 1;
      while j < chars.len() && chars[j].is_whitespace() {
        j += 1;
      }
      if j < chars.len() && (chars[j] == '}' || chars[j] == ']') {
        // Skip the comma, keep the whitespace and the closer.
        i += 1;
        continue;
      }
    }
    out.push(chars[i]);
    i += 1;
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strips_markdown_fences() {
    let raw = "```json\n{\"a\": \"b\"}\n```";
    let cleaned = clean_json_text(raw);
    assert!(serde_json::from_str::<serde_json::Value>(&cleaned).is_ok());
    assert!(!cleaned.contains("```"));
  }

  #[test]
  fn normalizes_bullet_glyphs() {
    let cleaned = clean_json_text("{\"a\": \"• item ● other\"}");
    assert_eq!(cleaned, "{\"a\": \"- item - other\"}");
  }

  #[test]
  fn synthesizes_value_after_bare_colon() {
    let cleaned = clean_json_text("{\n\"topic\":\n}");
    let v: serde_json::Value = serde_json::from_str(&cleaned).unwrap();
    assert_eq!(v["topic"], "");
  }

  #[test]
  fn closes_unterminated_string_value() {
    let cleaned = clean_json_text("{\n\"a\": \"cut off\n}");
    let v: serde_json::Value = serde_json::from_str(&cleaned).unwrap();
    assert_eq!(v["a"], "cut off");
  }

  #[test]
  fn closes_unterminated_value_before_trailing_comma() {
    let cleaned = clean_json_text("{\n\"a\": \"cut off,\n\"b\": \"ok\"\n}");
    let v: serde_json::Value = serde_json::from_str(&cleaned).unwrap();
    assert_eq!(v["a"], "cut off");
    assert_eq!(v["b"], "ok");
  }

  #[test]
  fn removes_trailing_commas() {
    let cleaned = clean_json_text("{\"a\": [1, 2,], \"b\": {\"c\": 3,},}");
    assert!(serde_json::from_str::<serde_json::Value>(&cleaned).is_ok());
  }

  #[test]
  fn strips_control_characters() {
    let cleaned = clean_json_text("{\"a\": \"x\u{0001}y\"}");
    assert_eq!(cleaned, "{\"a\": \"xy\"}");
    // Newlines and tabs between tokens survive.
    let kept = clean_json_text("{\n\t\"a\": 1\n}");
    assert!(kept.contains('\n') && kept.contains('\t'));
  }

  #[test]
  fn idempotent_on_valid_json() {
    let samples = [
      "{\"a\": \"b\", \"n\": [1, 2, 3]}",
      "{\n  \"nested\": {\n    \"key\": \"value with spaces\"\n  }\n}",
      "{}",
      "[\"x\", \"y\"]",
    ];
    for s in samples {
      let once = clean_json_text(s);
      let twice = clean_json_text(&once);
      assert_eq!(once, twice, "sanitizer not idempotent on {s}");
      assert!(serde_json::from_str::<serde_json::Value>(&once).is_ok());
    }
  }

  #[test]
  fn empty_input_stays_empty() {
    assert_eq!(clean_json_text(""), "");
  }
}
