//! Per-bug completion tracking.
//!
//! The caller owns a `BugCompletionStatus` per bug and feeds it verification
//! signals. Detection contributes only the pattern-match signal; other methods
//! (test execution, code analysis, manual) arrive from outside.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::BugLocation;

/// Confidence attached to a pattern-match verdict either way.
pub const PATTERN_MATCH_CONFIDENCE: u8 = 85;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BugStatus {
  #[default]
  Open,
  InProgress,
  Detected,
  Fixed,
  Verified,
  Completed,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum VerificationMethod {
  PatternMatch,
  TestExecution,
  CodeAnalysis,
  Manual,
  Combined,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DetectionMethods {
  pub pattern_match: bool,
  pub test_execution: bool,
  pub code_analysis: bool,
}

impl DetectionMethods {
  fn set(&mut self, method: VerificationMethod, value: bool) {
    match method {
      VerificationMethod::PatternMatch => self.pattern_match = value,
      VerificationMethod::TestExecution => self.test_execution = value,
      VerificationMethod::CodeAnalysis => self.code_analysis = value,
      // not tied to a single detector
      VerificationMethod::Manual | VerificationMethod::Combined => {}
    }
  }

  pub fn agreeing(&self) -> usize {
    [self.pattern_match, self.test_execution, self.code_analysis]
      .iter()
      .filter(|b| **b)
      .count()
  }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationEntry {
  pub timestamp: DateTime<Utc>,
  pub method: VerificationMethod,
  pub result: bool,
  pub confidence: u8,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub details: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BugCompletionStatus {
  pub bug_id: u32,
  #[serde(default)]
  pub status: BugStatus,
  #[serde(default)]
  pub detection_methods: DetectionMethods,
  #[serde(default)]
  pub confidence: u8,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub last_detected: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub fixed_at: Option<DateTime<Utc>>,
  /// Append-only.
  #[serde(default)]
  pub verification_history: Vec<VerificationEntry>,
}

impl BugCompletionStatus {
  pub fn new(bug_id: u32) -> Self {
    Self {
      bug_id,
      status: BugStatus::Open,
      detection_methods: DetectionMethods::default(),
      confidence: 0,
      last_detected: None,
      fixed_at: None,
      verification_history: Vec::new(),
    }
  }

  /// Apply one verification signal. `result` is true when the bug looks fixed.
  pub fn record(
    &mut self,
    method: VerificationMethod,
    result: bool,
    confidence: u8,
    details: Option<String>,
    at: DateTime<Utc>,
  ) {
    let confidence = confidence.min(100);
    self.detection_methods.set(method, result);
    self.confidence = confidence;

    if result {
      self.status = if self.detection_methods.agreeing() >= 2 {
        BugStatus::Verified
      } else {
        BugStatus::Fixed
      };
      self.fixed_at.get_or_insert(at);
    } else {
      self.status = BugStatus::Detected;
      self.last_detected = Some(at);
      self.fixed_at = None;
    }

    self.verification_history.push(VerificationEntry {
      timestamp: at,
      method,
      result,
      confidence,
      details,
    });
  }

  /// Close out a fixed or verified bug. Returns whether the status changed.
  pub fn mark_completed(&mut self) -> bool {
    match self.status {
      BugStatus::Fixed | BugStatus::Verified => {
        self.status = BugStatus::Completed;
        true
      }
      _ => false,
    }
  }
}

/// One method's verdict on whether a bug is fixed.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
  pub success: bool,
  pub confidence: f64,
  pub method: VerificationMethod,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub details: Option<String>,
}

/// A verdict for one bug reported from outside the detector (test runner, analyzer, reviewer).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BugSignal {
  pub bug_id: u32,
  #[serde(flatten)]
  pub result: DetectionResult,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CombinedVerdict {
  pub is_fixed: bool,
  pub confidence: f64,
  pub details: String,
}

/// At least two agreeing methods make a fix; confidence is nudged around the mean.
pub fn combine_detection_results(results: &[DetectionResult]) -> CombinedVerdict {
  let successes = results.iter().filter(|r| r.success).count();
  let avg = if results.is_empty() {
    0.0
  } else {
    results.iter().map(|r| r.confidence).sum::<f64>() / results.len() as f64
  };
  let is_fixed = successes >= 2;
  let confidence = if is_fixed { (avg + 10.0).min(95.0) } else { (avg - 20.0).max(5.0) };

  CombinedVerdict {
    is_fixed,
    confidence,
    details: format!(
      "Combined {} detection methods: {} successful, {:.1}% average confidence",
      results.len(),
      successes,
      avg
    ),
  }
}

/// Fold every verdict for one bug into its record. With two or more verdicts
/// a combined entry follows, and it decides the final status.
pub fn apply_results(status: &mut BugCompletionStatus, results: &[DetectionResult], at: DateTime<Utc>) {
  for r in results {
    status.record(r.method, r.success, percent(r.confidence), r.details.clone(), at);
  }
  if results.len() >= 2 {
    let verdict = combine_detection_results(results);
    status.record(
      VerificationMethod::Combined,
      verdict.is_fixed,
      percent(verdict.confidence),
      Some(verdict.details),
      at,
    );
  }
}

fn percent(confidence: f64) -> u8 {
  confidence.round().clamp(0.0, 100.0) as u8
}

/// Pattern-match verdict for `bug_id` given the bugs `detect` still reports.
pub fn pattern_match_result(bug_id: u32, present: &[BugLocation]) -> DetectionResult {
  let still_present = present.iter().find(|b| b.id == bug_id);
  DetectionResult {
    success: still_present.is_none(),
    confidence: PATTERN_MATCH_CONFIDENCE as f64,
    method: VerificationMethod::PatternMatch,
    details: Some(match still_present {
      Some(b) => format!("Still present: {}", b.title),
      None => "Fix pattern found".to_string(),
    }),
  }
}
