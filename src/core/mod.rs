//! Core data types for stegtriage.
//!
//! The artifact under analysis, the session directory it lives in, and the
//! unified report every analyzer contributes a slot to.

pub mod artifact;
pub mod report;
pub mod session;
