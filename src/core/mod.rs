//! Shared primitives: configuration, errors, the issue codec, filters and
//! path exclusion

pub mod config;
pub mod error;
pub mod exclude;
pub mod filter;
pub mod issue;
