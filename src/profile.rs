//! Persisted profile fields and assembly of a `UserContext` for a new session.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::recommend::{
  CodeSource, DeviceType, EntryPoint, ErrorFrequency, Experience, RecentActivity, TimeOfDay,
  UserContext,
};
use crate::store::KeyValueStore;

pub const EXPERIENCE_KEY: &str = "build-user-experience";
pub const SESSION_COUNT_KEY: &str = "build-session-count";
pub const COMPLETED_KEY: &str = "build-completed-challenges";

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
  pub experience: Experience,
  pub previous_sessions: u32,
  pub completed_challenges: Vec<String>,
}

/// Read the profile, falling back to defaults for missing or unreadable values.
pub fn load_profile(store: &dyn KeyValueStore) -> Result<Profile> {
  let mut p = Profile::default();

  if let Some(raw) = store.get(EXPERIENCE_KEY)? {
    match raw.parse::<Experience>() {
      Ok(e) => p.experience = e,
      Err(e) => warn!(target: "sandbox_backend", error = %e, "Ignoring stored experience level"),
    }
  }
  if let Some(raw) = store.get(SESSION_COUNT_KEY)? {
    match raw.trim().parse::<u32>() {
      Ok(n) => p.previous_sessions = n,
      Err(e) => warn!(target: "sandbox_backend", error = %e, %raw, "Ignoring stored session count"),
    }
  }
  if let Some(raw) = store.get(COMPLETED_KEY)? {
    match serde_json::from_str::<Vec<String>>(&raw) {
      Ok(ids) => p.completed_challenges = ids,
      Err(e) => warn!(target: "sandbox_backend", error = %e, "Ignoring stored completed challenges"),
    }
  }
  Ok(p)
}

pub fn save_profile(store: &dyn KeyValueStore, p: &Profile) -> Result<()> {
  store.set(EXPERIENCE_KEY, p.experience.as_str())?;
  store.set(SESSION_COUNT_KEY, &p.previous_sessions.to_string())?;
  store.set(COMPLETED_KEY, &serde_json::to_string(&p.completed_challenges)?)?;
  Ok(())
}

/// What the page controller knows when a session starts.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
  #[serde(default)] pub challenge: Option<String>,
  /// Code passed in through a link; marks the session as an import.
  #[serde(default)] pub code: Option<String>,
  /// Local hour 0..=23.
  #[serde(default)] pub hour: Option<u32>,
  #[serde(default)] pub viewport_width: Option<u32>,
  #[serde(default)] pub session_time: Option<u64>,
  #[serde(default)] pub recent_activity: Option<RecentActivity>,
  #[serde(default)] pub error_frequency: Option<ErrorFrequency>,
  #[serde(default)] pub entry_point: Option<EntryPoint>,
}

pub fn time_of_day(hour: u32) -> TimeOfDay {
  match hour {
    0..=5 => TimeOfDay::Night,
    6..=11 => TimeOfDay::Morning,
    12..=17 => TimeOfDay::Afternoon,
    18..=21 => TimeOfDay::Evening,
    _ => TimeOfDay::Night,
  }
}

pub fn device_type(viewport_width: u32) -> DeviceType {
  if viewport_width < 768 {
    DeviceType::Mobile
  } else if viewport_width < 1024 {
    DeviceType::Tablet
  } else {
    DeviceType::Desktop
  }
}

/// Fill every context field from the stored profile plus request hints.
pub fn build_context(profile: &Profile, req: &SessionRequest) -> UserContext {
  let challenge = req.challenge.as_ref().filter(|c| !c.trim().is_empty()).cloned();
  let has_challenge = challenge.is_some();
  let has_code = req.code.as_ref().map(|c| !c.is_empty()).unwrap_or(false);

  let code_source = if has_challenge {
    CodeSource::Challenge
  } else if has_code {
    CodeSource::Import
  } else {
    CodeSource::Scratch
  };

  UserContext {
    experience: profile.experience,
    previous_sessions: profile.previous_sessions,
    completed_challenges: profile.completed_challenges.clone(),
    session_time: req.session_time.unwrap_or(0),
    current_challenge: challenge,
    code_source,
    has_active_challenges: has_challenge,
    recent_activity: req.recent_activity.unwrap_or(if has_challenge {
      RecentActivity::Learning
    } else {
      RecentActivity::Exploring
    }),
    error_frequency: req.error_frequency.unwrap_or(ErrorFrequency::Medium),
    entry_point: req.entry_point.unwrap_or(if has_challenge {
      EntryPoint::ChallengeCard
    } else {
      EntryPoint::DirectLink
    }),
    time_of_day: time_of_day(req.hour.unwrap_or(12)),
    device_type: req.viewport_width.map(device_type).unwrap_or(DeviceType::Desktop),
  }
}
