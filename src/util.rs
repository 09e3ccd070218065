//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Upper-case the first character, keep the rest as-is.
/// Used for color labels coming back from the reference API ("green" -> "Green").
pub fn capitalize(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

/// Upper-case the first character and lower-case the rest ("BULBASAUR" -> "Bulbasaur").
pub fn capitalize_name(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => {
      let rest = chars.as_str().to_lowercase();
      first.to_uppercase().chain(rest.chars()).collect()
    }
    None => String::new(),
  }
}

/// Cache key for free-text questions: trimmed and lower-cased.
pub fn normalize_question(q: &str) -> String {
  q.trim().to_lowercase()
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge prompts or generated answers.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    s.to_string()
  } else {
    let head: String = s.chars().take(max).collect();
    format!("{}… ({} bytes total)", head, s.len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fill_template_replaces_every_occurrence() {
    let out = fill_template("{a} vs {b}: what should {a} do?", &[("a", "Pikachu"), ("b", "Onix")]);
    assert_eq!(out, "Pikachu vs Onix: what should Pikachu do?");
  }

  #[test]
  fn fill_template_leaves_unknown_keys() {
    assert_eq!(fill_template("hello {who}", &[("other", "x")]), "hello {who}");
  }

  #[test]
  fn capitalize_keeps_tail() {
    assert_eq!(capitalize("green"), "Green");
    assert_eq!(capitalize("mr-mime"), "Mr-mime");
    assert_eq!(capitalize(""), "");
  }

  #[test]
  fn capitalize_name_lowers_tail() {
    assert_eq!(capitalize_name("bULBASAUR"), "Bulbasaur");
    assert_eq!(capitalize_name("x"), "X");
  }

  #[test]
  fn normalize_question_trims_and_lowers() {
    assert_eq!(normalize_question("  Who IS Mew?\n"), "who is mew?");
  }

  #[test]
  fn trunc_for_log_is_char_safe() {
    assert_eq!(trunc_for_log("皮卡丘", 10), "皮卡丘");
    assert!(trunc_for_log("皮卡丘皮卡丘", 2).starts_with("皮卡…"));
  }
}
