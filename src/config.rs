//! Loading service configuration (storage, history, extra challenges) from TOML.
//!
//! Example:
//!
//! ```toml
//! [storage]
//! path = "data/sandbox-store.json"
//!
//! [history]
//! capacity = 50
//!
//! [[challenges]]
//! id = "todo-list"
//! title = "Todo List"
//!
//! [[challenges.bugs]]
//! id = 1
//! title = "Missing Key Prop"
//! message = "List items have no key"
//! severity = "warning"
//! search_terms = ["<li"]
//! rule = { kind = "absence", fixes = [["key={"]] }
//! ```

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{BugRule, Challenge, ChallengeSource};
use crate::error::Result;
use crate::history::DEFAULT_CAPACITY;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct SandboxConfig {
  #[serde(default)]
  pub storage: StorageCfg,
  #[serde(default)]
  pub history: HistoryCfg,
  #[serde(default)]
  pub challenges: Vec<ChallengeCfg>,
}

/// Where profile fields and usage history live. No path means in-memory only.
#[derive(Clone, Debug, Deserialize, Default)]
pub struct StorageCfg {
  #[serde(default)] pub path: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct HistoryCfg {
  #[serde(default = "default_capacity")]
  pub capacity: usize,
}

impl Default for HistoryCfg {
  fn default() -> Self { Self { capacity: DEFAULT_CAPACITY } }
}

fn default_capacity() -> usize { DEFAULT_CAPACITY }

/// Challenge entry accepted in TOML configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct ChallengeCfg {
  pub id: String,
  pub title: String,
  #[serde(default)] pub broken_code: String,
  #[serde(default)] pub fixed_code: String,
  #[serde(default)] pub bugs: Vec<BugRule>,
}

impl ChallengeCfg {
  pub fn into_challenge(self) -> Challenge {
    Challenge {
      id: self.id,
      title: self.title,
      source: ChallengeSource::Config,
      rules: self.bugs,
      broken_code: self.broken_code,
      fixed_code: self.fixed_code,
    }
  }
}

pub fn parse_config(raw: &str) -> Result<SandboxConfig> {
  Ok(toml::from_str::<SandboxConfig>(raw)?)
}

/// Attempt to load `SandboxConfig` from SANDBOX_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_config_from_env() -> Option<SandboxConfig> {
  let path = std::env::var("SANDBOX_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_config(&s) {
      Ok(cfg) => {
        info!(target: "sandbox_backend", %path, challenges = cfg.challenges.len(), "Loaded sandbox config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "sandbox_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "sandbox_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{DetectionRule, Severity};

  #[test]
  fn empty_config_uses_defaults() {
    let cfg = parse_config("").unwrap();
    assert_eq!(cfg.history.capacity, DEFAULT_CAPACITY);
    assert!(cfg.storage.path.is_none());
    assert!(cfg.challenges.is_empty());
  }

  #[test]
  fn challenge_rules_parse() {
    let raw = r#"
[history]
capacity = 10

[[challenges]]
id = "todo-list"
title = "Todo List"

[[challenges.bugs]]
id = 1
title = "Missing Key Prop"
message = "List items have no key"
severity = "warning"
search_terms = ["<li"]
rule = { kind = "absence", fixes = [["key={"]] }

[[challenges.bugs]]
id = 2
title = "Mutating Todos"
message = "Pushes into state"
rule = { kind = "presence_without", buggy = ["todos.push("], required = "[...todos" }
"#;
    let cfg = parse_config(raw).unwrap();
    assert_eq!(cfg.history.capacity, 10);
    let ch = cfg.challenges[0].clone().into_challenge();
    assert_eq!(ch.source, ChallengeSource::Config);
    assert_eq!(ch.bug_ids(), vec![1, 2]);
    assert_eq!(ch.rules[0].bug.severity, Severity::Warning);
    assert_eq!(ch.rules[1].bug.severity, Severity::Error);
    assert_eq!(
      ch.rules[1].rule,
      DetectionRule::presence_without(["todos.push("], Some("[...todos"))
    );
  }

  #[test]
  fn bad_rule_kind_is_an_error() {
    let raw = r#"
[[challenges]]
id = "x"
title = "X"
[[challenges.bugs]]
id = 1
title = "t"
message = "m"
rule = { kind = "regex", pattern = "a+" }
"#;
    assert!(parse_config(raw).is_err());
  }
}
