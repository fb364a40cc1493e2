//! Issue record and its line-oriented wire codec
//!
//! Checkers report diagnostics as one JSON-encoded `Issue` per line. Two
//! decoders exist: the JSON decoder used by the engine (falls back to treating
//! the raw line as the issue content), and a legacy parser for the free-text
//! `path:line:col: message` format emitted by older tools.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::sync::LazyLock;

static LINE_RE: LazyLock<regex::Regex> =
  LazyLock::new(|| regex::Regex::new(r"(.+):(\d+):(\d+): (.+)").expect("legacy line pattern is valid"));

/// A single diagnostic reported by a checker
///
/// A fully zero-valued issue is the "no issue" sentinel and is skipped by
/// every consumer. `line` and `col` are 1-based; 0 means unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
  /// Repository-relative file path, empty if the issue is not file-scoped
  #[serde(default)]
  pub path: String,
  /// 1-based line number, 0 = unset
  #[serde(default)]
  pub line: u64,
  /// 1-based column number, 0 = unset
  #[serde(default)]
  pub col: u64,
  /// Free-text message
  #[serde(default)]
  pub content: String,
}

impl Issue {
  /// Create an issue carrying only free-text content
  pub fn from_content(content: impl Into<String>) -> Self {
    Issue {
      content: content.into(),
      ..Issue::default()
    }
  }

  /// Whether this is the all-zero "no issue" sentinel
  pub fn is_empty(&self) -> bool {
    self.path.is_empty() && self.line == 0 && self.col == 0 && self.content.is_empty()
  }

  /// Decode a single output line.
  ///
  /// If the line is the JSON representation of an issue it is decoded as-is;
  /// otherwise the whole line becomes the issue content. Never fails: raw
  /// text is an acceptable issue body.
  pub fn from_json_line(line: &str) -> Issue {
    match serde_json::from_str(line) {
      Ok(issue) => issue,
      Err(_) => Issue::from_content(line),
    }
  }

  /// Parse a legacy `path:line:col: message` line.
  ///
  /// If the path component is absolute it is rewritten relative to
  /// `working_dir`. If the pattern does not match, the path is relative, or
  /// line/col fail to parse, the whole line becomes the issue content.
  pub fn from_text_line(line: &str, working_dir: &Path) -> Issue {
    let fallback = Issue::from_content(line);

    let Some(caps) = LINE_RE.captures(line) else {
      return fallback;
    };

    let mut issue_path = caps[1].to_string();
    if Path::new(&issue_path).is_absolute() {
      match pathdiff::diff_paths(&issue_path, working_dir) {
        Some(rel) => issue_path = rel.to_string_lossy().into_owned(),
        None => return fallback,
      }
    }
    let Ok(line_num) = caps[2].parse::<u64>() else {
      return fallback;
    };
    let Ok(col_num) = caps[3].parse::<u64>() else {
      return fallback;
    };

    Issue {
      path: issue_path,
      line: line_num,
      col: col_num,
      content: caps[4].to_string(),
    }
  }
}

/// Renders `path:line:col: content`, omitting any zero-valued component and
/// its trailing separator.
impl fmt::Display for Issue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut location = String::new();
    if !self.path.is_empty() {
      location.push_str(&self.path);
      if self.line != 0 {
        location.push_str(&format!(":{}", self.line));
        if self.col != 0 {
          location.push_str(&format!(":{}", self.col));
        }
      }
    }
    if location.is_empty() {
      write!(f, "{}", self.content)
    } else {
      write!(f, "{}: {}", location, self.content)
    }
  }
}

/// Wrap an arbitrary error message as an issue and write its JSON line to the
/// writer.
///
/// The Issue shape is always encodable; a JSON-encode failure here is a fatal
/// programming error and aborts the process rather than being swallowed.
pub fn write_error_as_issue(message: &str, writer: &mut dyn Write) {
  let issue = Issue::from_content(message);
  let encoded = serde_json::to_string(&issue)
    .unwrap_or_else(|err| panic!("failed to JSON-serialize issue {:?}: {}", issue, err));
  let _ = writeln!(writer, "{}", encoded);
}
