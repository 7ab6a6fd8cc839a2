//! Domain module for bug tracking.
//!
//! This module contains the bug record model, its status vocabulary, and the
//! rules for reading creation and update payloads.

pub mod bug;
pub mod payload;

pub use bug::{Bug, BugId, BugPatch, BugStatus, InvalidStatus, NewBug, Timestamp};
pub use payload::{PayloadError, REQUIRED_FIELDS, new_bug_from_payload, patch_from_payload};
