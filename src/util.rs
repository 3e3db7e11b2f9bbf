//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// This is intentionally simple (no nested/conditional logic).
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Minimal percent-encoding for a URL path segment.
/// Unreserved characters pass through; everything else is %XX-encoded.
pub fn percent_encode(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for b in s.bytes() {
    match b {
      b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
        out.push(b as char);
      }
      _ => out.push_str(&format!("%{:02X}", b)),
    }
  }
  out
}

/// Reduce an arbitrary string to something safe inside a download filename:
/// alphanumerics survive, runs of anything else collapse to one underscore.
pub fn filename_component(s: &str) -> String {
  let mut out = String::new();
  for ch in s.chars() {
    if ch.is_ascii_alphanumeric() {
      out.push(ch);
    } else if !out.ends_with('_') && !out.is_empty() {
      out.push('_');
    }
  }
  let trimmed = out.trim_end_matches('_').to_string();
  if trimmed.is_empty() { "Untitled".into() } else { trimmed }
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    s.to_string()
  } else {
    let mut end = max;
    while !s.is_char_boundary(end) { end -= 1; }
    format!("{}… ({} bytes total)", &s[..end], s.len())
  }
}
