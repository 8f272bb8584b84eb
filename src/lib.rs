//! Debugging sandbox backend.
//!
//! Two decision engines behind a small axum service:
//!
//! - **Bug detection** (`detect`): per-challenge substring rules decide which
//!   intentionally introduced bugs are still present in the learner's code and
//!   point at the lines involved. The editor overlay and the test runner share
//!   the same registry call.
//! - **Mode recommendation** (`recommend`): a weighted multi-factor score over
//!   the session context picks guided, practice or explore mode with a 20..=100
//!   confidence, rationale and ranked alternatives.
//!
//! Around them: a key-value `store` for profile fields and the bounded usage
//! `history`, `completion` tracking per bug, TOML `config`, and `routes`.

pub mod completion;
pub mod config;
pub mod detect;
pub mod domain;
pub mod error;
pub mod history;
pub mod logic;
pub mod profile;
pub mod protocol;
pub mod recommend;
pub mod routes;
pub mod seeds;
pub mod state;
pub mod store;
pub mod telemetry;

pub use detect::Registry;
pub use domain::{BugDefinition, BugLocation, BugRule, Challenge, DetectionRule, Severity};
pub use error::{Error, Result};
pub use recommend::{recommend, ModeId, ModeRecommendation, UserContext};
