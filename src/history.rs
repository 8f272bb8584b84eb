//! Mode usage history: what was recommended vs. what the user actually chose.
//!
//! Best-effort analytics kept as a JSON array under one store key, trimmed to
//! the most recent `capacity` entries. Concurrent writers get last-write-wins.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::recommend::{ModeId, UserContext};
use crate::store::KeyValueStore;

pub const USAGE_KEY: &str = "build-mode-usage";
pub const DEFAULT_CAPACITY: usize = 50;

const OVERRIDE_RATE_THRESHOLD: f64 = 0.3;
const LONG_SESSION_MS: f64 = 30.0 * 60.0 * 1000.0;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Satisfaction {
  Positive,
  Neutral,
  Negative,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UsageEntry {
  pub id: Uuid,
  pub timestamp: DateTime<Utc>,
  pub context: UserContext,
  pub recommended_mode: ModeId,
  pub actual_mode: ModeId,
  /// Milliseconds.
  pub session_duration: u64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user_satisfaction: Option<Satisfaction>,
  pub mode_override: bool,
}

pub struct UsageHistory {
  store: Arc<dyn KeyValueStore>,
  capacity: usize,
  // serializes read-modify-write within this process
  write_lock: Mutex<()>,
}

impl UsageHistory {
  pub fn new(store: Arc<dyn KeyValueStore>, capacity: usize) -> Self {
    Self { store, capacity: capacity.max(1), write_lock: Mutex::new(()) }
  }

  pub fn capacity(&self) -> usize { self.capacity }

  /// Stored entries, oldest first. A malformed stored value reads as empty.
  pub fn entries(&self) -> Result<Vec<UsageEntry>> {
    let raw = match self.store.get(USAGE_KEY)? {
      Some(s) => s,
      None => return Ok(Vec::new()),
    };
    match serde_json::from_str::<Vec<UsageEntry>>(&raw) {
      Ok(v) => Ok(v),
      Err(e) => {
        warn!(target: "history", error = %e, "Stored usage history is malformed; treating as empty");
        Ok(Vec::new())
      }
    }
  }

  /// Append one usage event and trim to capacity.
  pub fn record_mode_usage(
    &self,
    context: &UserContext,
    recommended: ModeId,
    actual: ModeId,
    session_duration_ms: u64,
    satisfaction: Option<Satisfaction>,
  ) -> Result<UsageEntry> {
    let _guard = self
      .write_lock
      .lock()
      .map_err(|_| Error::Storage("usage history lock poisoned".into()))?;

    let entry = UsageEntry {
      id: Uuid::new_v4(),
      timestamp: Utc::now(),
      context: context.clone(),
      recommended_mode: recommended,
      actual_mode: actual,
      session_duration: session_duration_ms,
      user_satisfaction: satisfaction,
      mode_override: recommended != actual,
    };

    let mut history = self.entries()?;
    history.push(entry.clone());
    if history.len() > self.capacity {
      let excess = history.len() - self.capacity;
      history.drain(..excess);
    }
    self.store.set(USAGE_KEY, &serde_json::to_string(&history)?)?;
    debug!(target: "history", len = history.len(), %recommended, %actual, "Recorded mode usage");
    Ok(entry)
  }

  pub fn personalized_insights(&self) -> Result<Vec<String>> {
    Ok(insights_from(&self.entries()?))
  }
}

/// Aggregate insights over a history slice.
pub fn insights_from(history: &[UsageEntry]) -> Vec<String> {
  let mut insights = Vec::new();
  if history.is_empty() {
    return insights;
  }

  // counts in order of first appearance so ties go to the earliest mode
  let mut usage: Vec<(ModeId, usize)> = Vec::new();
  for e in history {
    match usage.iter_mut().find(|(m, _)| *m == e.actual_mode) {
      Some((_, n)) => *n += 1,
      None => usage.push((e.actual_mode, 1)),
    }
  }
  usage.sort_by(|a, b| b.1.cmp(&a.1));
  if let Some((favorite, _)) = usage.first() {
    insights.push(format!("You tend to prefer {} mode", favorite));
  }

  let overrides = history.iter().filter(|e| e.mode_override).count();
  if overrides as f64 > history.len() as f64 * OVERRIDE_RATE_THRESHOLD {
    insights.push("You often choose different modes than recommended".to_string());
  }

  let total: f64 = history.iter().map(|e| e.session_duration as f64).sum();
  if total / history.len() as f64 > LONG_SESSION_MS {
    insights.push("You have long coding sessions - explore mode might suit you well".to_string());
  }

  insights
}
