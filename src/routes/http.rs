//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs ids and sizes, never source text.

use std::sync::Arc;
use axum::{extract::State, Json, response::IntoResponse};
use tracing::{info, instrument};

use crate::error::Result;
use crate::logic::*;
use crate::profile::{load_profile, save_profile, Profile, SessionRequest};
use crate::protocol::*;
use crate::recommend::UserContext;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_challenges(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let out: Vec<ChallengeOut> = state.registry.iter().map(to_out).collect();
  Json(out)
}

#[instrument(level = "debug", skip(state, body), fields(%body.challenge_id, code_len = body.code.len()))]
pub async fn http_post_detect(
  State(state): State<Arc<AppState>>,
  Json(body): Json<CodeIn>,
) -> impl IntoResponse {
  let bugs = detect_bugs(&state, &body.challenge_id, &body.code);
  Json(BugsOut { bugs })
}

#[instrument(level = "info", skip(state, body), fields(%body.challenge_id, code_len = body.code.len()))]
pub async fn http_post_test_run(
  State(state): State<Arc<AppState>>,
  Json(body): Json<CodeIn>,
) -> impl IntoResponse {
  Json(run_bug_checks(&state, &body.challenge_id, &body.code))
}

#[instrument(level = "info", skip(state, body), fields(%body.challenge_id, code_len = body.code.len()))]
pub async fn http_post_verify(
  State(state): State<Arc<AppState>>,
  Json(body): Json<VerifyIn>,
) -> Result<Json<VerifyOut>> {
  let statuses = verify_progress(&state, &body)?;
  info!(target: "detection", id = %body.challenge_id, bugs = statuses.len(), "HTTP verify evaluated");
  Ok(Json(VerifyOut { statuses }))
}

#[instrument(level = "info", skip_all)]
pub async fn http_post_recommend(Json(ctx): Json<UserContext>) -> impl IntoResponse {
  Json(recommend_for_context(&ctx))
}

#[instrument(level = "info", skip(state, req))]
pub async fn http_post_session(
  State(state): State<Arc<AppState>>,
  Json(req): Json<SessionRequest>,
) -> impl IntoResponse {
  Json(recommend_for_session(&state, &req))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_profile(State(state): State<Arc<AppState>>) -> Result<Json<Profile>> {
  Ok(Json(load_profile(state.store.as_ref())?))
}

#[instrument(level = "info", skip(state, profile), fields(experience = %profile.experience.as_str(), sessions = profile.previous_sessions))]
pub async fn http_put_profile(
  State(state): State<Arc<AppState>>,
  Json(profile): Json<Profile>,
) -> Result<Json<Profile>> {
  save_profile(state.store.as_ref(), &profile)?;
  info!(target: "sandbox_backend", "Profile saved");
  Ok(Json(profile))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_usage(
  State(state): State<Arc<AppState>>,
  Json(body): Json<UsageIn>,
) -> impl IntoResponse {
  let ok = record_usage(&state, &body);
  Json(HealthOut { ok })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_insights(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(InsightsOut { insights: insights(&state) })
}
