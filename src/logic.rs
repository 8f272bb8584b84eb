//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Locating bugs for the editor overlay
//!   - Test-run verdicts (same registry call as the overlay, so they never drift)
//!   - Folding pattern-match signals into bug completion records
//!   - Session mode recommendation from the stored profile
//!   - Usage history recording and insights

use chrono::Utc;
use tracing::{debug, error, info, instrument};

use crate::completion::{apply_results, pattern_match_result, BugCompletionStatus};
use crate::domain::BugLocation;
use crate::error::{Error, Result};
use crate::profile::{build_context, load_profile, Profile, SessionRequest};
use crate::protocol::{CheckResult, SessionOut, TestRunReport, UsageIn, VerifyIn};
use crate::recommend::{recommend, ModeRecommendation, UserContext};
use crate::state::AppState;

/// Below this confidence the UI explains its pick.
const EXPLAIN_BELOW_CONFIDENCE: u8 = 90;

#[instrument(level = "debug", skip(state, code), fields(%challenge_id, code_len = code.len()))]
pub fn detect_bugs(state: &AppState, challenge_id: &str, code: &str) -> Vec<BugLocation> {
  let bugs = state.registry.detect(challenge_id, code);
  debug!(target: "detection", %challenge_id, present = bugs.len(), "Detection pass");
  bugs
}

#[instrument(level = "info", skip(state, code), fields(%challenge_id, code_len = code.len()))]
pub fn run_bug_checks(state: &AppState, challenge_id: &str, code: &str) -> TestRunReport {
  let bugs = detect_bugs(state, challenge_id, code);
  let remaining_bugs: Vec<u32> = bugs.iter().map(|b| b.id).collect();

  let bug_detection = if !state.registry.contains(challenge_id) {
    CheckResult {
      success: true,
      message: "No known bugs registered for this challenge".into(),
      details: None,
    }
  } else if bugs.is_empty() {
    CheckResult { success: true, message: "All known bugs fixed".into(), details: None }
  } else {
    let titles: Vec<&str> = bugs.iter().map(|b| b.title.as_str()).collect();
    CheckResult {
      success: false,
      message: format!("{} bug(s) remaining", bugs.len()),
      details: Some(titles.join("; ")),
    }
  };

  let overall = if bug_detection.success {
    CheckResult { success: true, message: "All tests passed".into(), details: None }
  } else {
    CheckResult {
      success: false,
      message: "Some tests failed".into(),
      details: Some("Check individual test results for details".into()),
    }
  };

  info!(target: "detection", %challenge_id, remaining = remaining_bugs.len(), passed = overall.success, "Test run evaluated");
  TestRunReport {
    challenge_id: challenge_id.to_string(),
    bug_detection,
    remaining_bugs,
    overall,
  }
}

/// Fold the current pattern-match verdict, plus any outside signals, into one
/// completion record per bug. Records for unknown bug ids are dropped; missing
/// ones start fresh.
#[instrument(level = "info", skip(state, req), fields(challenge_id = %req.challenge_id, code_len = req.code.len(), incoming = req.statuses.len(), signals = req.signals.len()))]
pub fn verify_progress(state: &AppState, req: &VerifyIn) -> Result<Vec<BugCompletionStatus>> {
  let challenge_id = req.challenge_id.as_str();
  let challenge = state
    .registry
    .get(challenge_id)
    .ok_or_else(|| Error::UnknownChallenge(challenge_id.to_string()))?;

  let present = state.registry.detect(challenge_id, &req.code);
  let now = Utc::now();

  let out = challenge
    .bug_ids()
    .into_iter()
    .map(|bug_id| {
      let mut status = req
        .statuses
        .iter()
        .find(|s| s.bug_id == bug_id)
        .cloned()
        .unwrap_or_else(|| BugCompletionStatus::new(bug_id));

      let mut results = vec![pattern_match_result(bug_id, &present)];
      results.extend(
        req.signals.iter().filter(|s| s.bug_id == bug_id).map(|s| s.result.clone()),
      );
      apply_results(&mut status, &results, now);

      if req.complete && status.mark_completed() {
        debug!(target: "detection", %challenge_id, bug_id, "Bug completed");
      }
      status
    })
    .collect();
  Ok(out)
}

#[instrument(level = "debug", skip_all)]
pub fn recommend_for_context(context: &UserContext) -> ModeRecommendation {
  let rec = recommend(context);
  debug!(target: "recommend", mode = %rec.mode_id, confidence = rec.confidence, "Mode recommended");
  rec
}

/// Build the session context from the stored profile and recommend a mode.
/// Storage trouble degrades to the default profile; this never fails.
#[instrument(level = "info", skip(state, req), fields(challenge = ?req.challenge))]
pub fn recommend_for_session(state: &AppState, req: &SessionRequest) -> SessionOut {
  let profile = match load_profile(state.store.as_ref()) {
    Ok(p) => p,
    Err(e) => {
      error!(target: "recommend", error = %e, "Failed to load profile; using defaults");
      Profile::default()
    }
  };
  let context = build_context(&profile, req);
  let recommendation = recommend_for_context(&context);
  let show_recommendation =
    recommendation.confidence < EXPLAIN_BELOW_CONFIDENCE || context.previous_sessions == 0;

  info!(target: "recommend", mode = %recommendation.mode_id, confidence = recommendation.confidence, show_recommendation, "Session mode selected");
  SessionOut { context, recommendation, show_recommendation }
}

#[instrument(level = "info", skip(state, usage), fields(recommended = %usage.recommended_mode, actual = %usage.actual_mode))]
pub fn record_usage(state: &AppState, usage: &UsageIn) -> bool {
  match state.history.record_mode_usage(
    &usage.context,
    usage.recommended_mode,
    usage.actual_mode,
    usage.session_duration,
    usage.user_satisfaction,
  ) {
    Ok(_) => true,
    Err(e) => {
      error!(target: "history", error = %e, "Failed to record mode usage");
      false
    }
  }
}

#[instrument(level = "info", skip(state))]
pub fn insights(state: &AppState) -> Vec<String> {
  state.history.personalized_insights().unwrap_or_else(|e| {
    error!(target: "history", error = %e, "Failed to read usage history");
    Vec::new()
  })
}
