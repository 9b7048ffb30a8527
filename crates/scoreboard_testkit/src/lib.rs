//! # Scoreboard Testkit
//!
//! Test utilities for Scoreboard.
//!
//! This crate provides:
//! - Scoreboard fixtures over in-memory and temp-dir file stores
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use scoreboard_testkit::prelude::*;
//!
//! #[test]
//! fn ranking() {
//!     let mut t = cup_with_teams(&["Red", "Blue"]);
//!     let red = t.team_id("Red");
//!     t.update_team_score(&red, ScoreUpdate::new().points(3));
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use scoreboard_core::{Outcome, Rejection, ScoreUpdate};
}

pub use fixtures::*;
pub use generators::*;
