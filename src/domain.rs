//! Domain models: bug definitions, detection rules, challenges and the located
//! diagnostics produced for the editor.

use serde::{Deserialize, Serialize};

/// How loudly the editor should flag a bug.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
  Error,
  Warning,
}
impl Default for Severity {
  fn default() -> Self { Severity::Error }
}

/// One intentionally introduced defect, as authored for a challenge.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BugDefinition {
  pub id: u32,
  pub title: String,
  pub message: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub hint: Option<String>,
  #[serde(default)]
  pub severity: Severity,
}

/// Predicate over raw source text deciding whether a bug is still present.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetectionRule {
  /// Present unless one accepted fix form is found. A fix form is a list of
  /// substrings that must all appear somewhere in the text.
  Absence { fixes: Vec<Vec<String>> },
  /// Present when any buggy marker appears and the required marker does not.
  PresenceWithout {
    buggy: Vec<String>,
    #[serde(default)]
    required: Option<String>,
  },
}

impl DetectionRule {
  pub fn absence<I, F, S>(fixes: I) -> Self
  where
    I: IntoIterator<Item = F>,
    F: IntoIterator<Item = S>,
    S: Into<String>,
  {
    DetectionRule::Absence {
      fixes: fixes
        .into_iter()
        .map(|form| form.into_iter().map(Into::into).collect())
        .collect(),
    }
  }

  pub fn presence_without<I, S>(buggy: I, required: Option<&str>) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    DetectionRule::PresenceWithout {
      buggy: buggy.into_iter().map(Into::into).collect(),
      required: required.map(str::to_string),
    }
  }

  /// True when the bug this rule guards is still present in `source`.
  pub fn fires(&self, source: &str) -> bool {
    match self {
      DetectionRule::Absence { fixes } => !fixes
        .iter()
        .any(|form| form.iter().all(|part| source.contains(part.as_str()))),
      DetectionRule::PresenceWithout { buggy, required } => {
        let has_buggy = buggy.iter().any(|m| source.contains(m.as_str()));
        let has_required = required.as_deref().map(|r| source.contains(r)).unwrap_or(false);
        has_buggy && !has_required
      }
    }
  }
}

/// A bug definition plus how to detect and where to point at it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BugRule {
  #[serde(flatten)]
  pub bug: BugDefinition,
  pub rule: DetectionRule,
  /// Illustrative terms used to locate lines; independent of the firing predicate.
  #[serde(default)]
  pub search_terms: Vec<String>,
}

/// Where did the registry get the challenge from?
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeSource {
  Config,  // from the TOML config
  Builtin, // shipped seed table
}

/// A code challenge with its ordered rule set and reference snippets.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Challenge {
  pub id: String,
  pub title: String,
  pub source: ChallengeSource,
  pub rules: Vec<BugRule>,
  #[serde(default)] pub broken_code: String,
  #[serde(default)] pub fixed_code: String,
}

impl Challenge {
  pub fn bug_ids(&self) -> Vec<u32> {
    self.rules.iter().map(|r| r.bug.id).collect()
  }

  /// Bug ids must be unique within a challenge.
  pub fn has_unique_bug_ids(&self) -> bool {
    let mut ids = self.bug_ids();
    ids.sort_unstable();
    ids.windows(2).all(|w| w[0] != w[1])
  }
}

/// A bug still considered present, with the lines it was located on.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BugLocation {
  pub id: u32,
  pub title: String,
  /// 1-based, ascending, deduplicated.
  pub lines: Vec<usize>,
  pub severity: Severity,
  pub message: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub hint: Option<String>,
}
