//! # Route Modules
//!
//! Each module exposes a `router()` returning `Router<AppState>`; the
//! application merges them under one middleware stack.

pub mod posture;
pub mod remediation;
