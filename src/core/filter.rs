//! Issue suppression filters
//!
//! A filter is a predicate over a decoded issue; a match means "suppress this
//! issue before it is rendered or counted". The only built-in kind matches a
//! regex against the issue content, but the trait is the extension point for
//! new kinds.

use crate::core::error::{OmniError, OmniResult};
use crate::core::issue::Issue;
use serde::{Deserialize, Serialize};

/// Suppression predicate applied to issues before reporting
pub trait Filter: Send + Sync {
  /// Returns true if the issue should be suppressed
  fn matches(&self, issue: &Issue) -> bool;
}

/// Filter definition as it appears in configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
  /// Filter kind; empty or "message" selects the message-regex filter
  #[serde(rename = "type", default)]
  pub filter_type: String,

  /// Filter value (a regular expression for message filters)
  #[serde(default)]
  pub value: String,
}

impl FilterConfig {
  /// Build the concrete filter this configuration describes
  pub fn to_filter(&self) -> OmniResult<Box<dyn Filter>> {
    match self.filter_type.as_str() {
      "" | "message" => Ok(Box::new(MessageFilter::new(&self.value)?)),
      other => Err(OmniError::config(format!("unrecognized filter type '{}'", other))),
    }
  }
}

/// Suppresses issues whose content matches a regular expression
pub struct MessageFilter {
  message_re: regex::Regex,
}

impl MessageFilter {
  pub fn new(pattern: &str) -> OmniResult<Self> {
    Ok(MessageFilter {
      message_re: regex::Regex::new(pattern)?,
    })
  }
}

impl Filter for MessageFilter {
  fn matches(&self, issue: &Issue) -> bool {
    self.message_re.is_match(&issue.content)
  }
}
