//! Integration tests for the omnicheck binary
//!
//! Checker assets are small shell scripts implementing the asset protocol,
//! so the whole suite is unix-only.

#[cfg(unix)]
mod helpers;
#[cfg(unix)]
mod test_check;
#[cfg(unix)]
mod test_checkers;
#[cfg(unix)]
mod test_run_check;
