//! Error types for omnicheck with contextual messages and exit codes
//!
//! This module provides a unified error type that categorizes errors and maps
//! each category to a process exit code. Checker failures discovered during a
//! run are *not* errors: the engine reports them through the issue stream and
//! returns the message-less `ChecksFailed` marker, whose only contract is a
//! non-zero exit.

use std::fmt;
use std::io;

/// Exit codes for omnicheck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, unknown checker types)
  User = 1,
  /// System error (subprocess launch, I/O)
  System = 2,
  /// One or more checks produced output
  ChecksFailed = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for omnicheck
#[derive(Debug)]
pub enum OmniError {
  /// A requested checker type has no configuration and the factory cannot
  /// construct a default instance
  Resolution { checker_type: String, reason: String },

  /// A checker's type/priority query failed during sorting or labeling
  Metadata { reason: String },

  /// Configuration errors (YAML shape, filter definitions, exclude patterns)
  Config { reason: String },

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional help text
  Message { message: String, help: Option<String> },

  /// One or more checks produced output. Carries no message: the per-checker
  /// detail and the summary line were already streamed to stdout.
  ChecksFailed,
}

impl OmniError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    OmniError::Message {
      message: msg.into(),
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    OmniError::Message {
      message: msg.into(),
      help: Some(help.into()),
    }
  }

  /// Create a configuration error
  pub fn config(reason: impl Into<String>) -> Self {
    OmniError::Config { reason: reason.into() }
  }

  /// Create a metadata error
  pub fn metadata(reason: impl Into<String>) -> Self {
    OmniError::Metadata { reason: reason.into() }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      OmniError::Resolution { .. } => ExitCode::User,
      OmniError::Metadata { .. } => ExitCode::System,
      OmniError::Config { .. } => ExitCode::User,
      OmniError::Io(_) => ExitCode::System,
      OmniError::Message { .. } => ExitCode::User,
      OmniError::ChecksFailed => ExitCode::ChecksFailed,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      OmniError::Resolution { checker_type, .. } => Some(format!(
        "Checker '{}' is not provided by any registered asset. List known checkers with `omnicheck checkers`.",
        checker_type
      )),
      OmniError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for OmniError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      OmniError::Resolution { checker_type, reason } => {
        write!(f, "failed to create checker of type '{}': {}", checker_type, reason)
      }
      OmniError::Metadata { reason } => {
        write!(f, "failed to determine checker metadata: {}", reason)
      }
      OmniError::Config { reason } => write!(f, "invalid configuration: {}", reason),
      OmniError::Io(e) => write!(f, "I/O error: {}", e),
      OmniError::Message { message, .. } => write!(f, "{}", message),
      // intentionally empty: all detail was streamed during the run
      OmniError::ChecksFailed => Ok(()),
    }
  }
}

impl std::error::Error for OmniError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      OmniError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for OmniError {
  fn from(err: io::Error) -> Self {
    OmniError::Io(err)
  }
}

impl From<String> for OmniError {
  fn from(msg: String) -> Self {
    OmniError::message(msg)
  }
}

impl From<&str> for OmniError {
  fn from(msg: &str) -> Self {
    OmniError::message(msg)
  }
}

impl From<serde_yaml::Error> for OmniError {
  fn from(err: serde_yaml::Error) -> Self {
    OmniError::config(format!("YAML error: {}", err))
  }
}

impl From<serde_json::Error> for OmniError {
  fn from(err: serde_json::Error) -> Self {
    OmniError::message(format!("JSON error: {}", err))
  }
}

impl From<regex::Error> for OmniError {
  fn from(err: regex::Error) -> Self {
    OmniError::config(format!("invalid regular expression: {}", err))
  }
}

impl From<glob::PatternError> for OmniError {
  fn from(err: glob::PatternError) -> Self {
    OmniError::config(format!("invalid glob pattern: {}", err))
  }
}

/// Convert anyhow::Error to OmniError (test helpers and interop)
impl From<anyhow::Error> for OmniError {
  fn from(err: anyhow::Error) -> Self {
    OmniError::message(err.to_string())
  }
}

/// Result type alias for omnicheck
pub type OmniResult<T> = Result<T, OmniError>;

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &OmniError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
