//! HTTP round trips through the assembled router.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use debug_sandbox_backend::{routes::build_router, state::AppState, store::MemoryStore};

fn app() -> Router {
    build_router(Arc::new(AppState::with_store(Arc::new(MemoryStore::new()))))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let req = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => req
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    // extractor rejections come back as plain text
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, value)
}

fn bug_ids(v: &Value) -> Vec<u64> {
    v.as_array().unwrap().iter().map(|b| b["id"].as_u64().unwrap()).collect()
}

#[tokio::test]
async fn health_is_ok() {
    let (status, body) = call(&app(), Method::GET, "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));
}

#[tokio::test]
async fn challenges_list_hides_rules() {
    let (status, body) = call(&app(), Method::GET, "/api/v1/challenges", None).await;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 5);
    assert_eq!(list[0]["id"], "date-calculator");
    assert!(list[0].get("rules").is_none());
    assert_eq!(list[0]["bugs"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn overlay_and_test_run_agree() {
    let app = app();
    let code = "const diffTime = Math.abs(end - start)\nreturn diffTime";
    let payload = json!({ "challengeId": "date-calculator", "code": code });

    let (_, detect) = call(&app, Method::POST, "/api/v1/detect", Some(payload.clone())).await;
    let (_, report) = call(&app, Method::POST, "/api/v1/test_run", Some(payload)).await;

    assert_eq!(bug_ids(&detect["bugs"]), vec![1, 2]);
    assert_eq!(report["remainingBugs"], json!([1, 2]));
    assert_eq!(report["bugDetection"]["success"], false);
    assert_eq!(report["overall"]["success"], false);
}

#[tokio::test]
async fn fixed_code_passes_test_run() {
    let app = app();
    let code = "if (!startDate || !endDate) return 'Select both dates'; const diffTime = Math.abs(end-start); return Math.ceil(diffTime)";
    let (_, report) = call(
        &app,
        Method::POST,
        "/api/v1/test_run",
        Some(json!({ "challengeId": "date-calculator", "code": code })),
    )
    .await;
    assert_eq!(report["remainingBugs"], json!([]));
    assert_eq!(report["overall"]["message"], "All tests passed");
}

#[tokio::test]
async fn unknown_challenge_detects_nothing() {
    let app = app();
    let payload = json!({ "challengeId": "mystery", "code": "" });
    let (_, detect) = call(&app, Method::POST, "/api/v1/detect", Some(payload.clone())).await;
    assert_eq!(detect["bugs"], json!([]));
    let (_, report) = call(&app, Method::POST, "/api/v1/test_run", Some(payload)).await;
    assert_eq!(report["bugDetection"]["message"], "No known bugs registered for this challenge");
}

#[tokio::test]
async fn verify_tracks_each_bug() {
    let app = app();
    let code = "const updated = [...items]\nconst total = items.reduce((s, i) => s + i.price, 0)";
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/verify",
        Some(json!({ "challengeId": "receipt-builder", "code": code, "statuses": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let statuses = body["statuses"].as_array().unwrap();
    assert_eq!(statuses.len(), 3);
    assert_eq!(statuses[0]["bugId"], 1);
    assert_eq!(statuses[0]["status"], "fixed");
    assert_eq!(statuses[0]["detectionMethods"]["patternMatch"], true);
    assert_eq!(statuses[1]["status"], "detected");
    assert_eq!(statuses[1]["verificationHistory"].as_array().unwrap().len(), 1);
    assert_eq!(statuses[2]["status"], "detected");

    // Feed the records back: history accumulates.
    let (_, again) = call(
        &app,
        Method::POST,
        "/api/v1/verify",
        Some(json!({ "challengeId": "receipt-builder", "code": code, "statuses": body["statuses"] })),
    )
    .await;
    assert_eq!(again["statuses"][1]["verificationHistory"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn outside_signals_combine_and_complete() {
    let app = app();
    let code = "const updated = [...items]\nconst price = parseFloat(item.price)";
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/verify",
        Some(json!({
            "challengeId": "receipt-builder",
            "code": code,
            "complete": true,
            "signals": [
                { "bugId": 1, "success": true, "confidence": 90.0, "method": "test-execution" },
                { "bugId": 2, "success": false, "confidence": 60.0, "method": "code-analysis" }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let statuses = &body["statuses"];

    // pattern match and test run agree on bug 1
    assert_eq!(statuses[0]["status"], "completed");
    assert_eq!(statuses[0]["confidence"], 95);
    let last = statuses[0]["verificationHistory"].as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["method"], "combined");
    assert_eq!(last["result"], true);

    // the analyzer disagrees on bug 2, so it stays open
    assert_eq!(statuses[1]["status"], "detected");
    assert_eq!(statuses[1]["verificationHistory"].as_array().unwrap().len(), 3);

    // no signal for bug 3: pattern match only, still missing its form handler
    assert_eq!(statuses[2]["status"], "detected");
    assert_eq!(statuses[2]["verificationHistory"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn verify_unknown_challenge_is_not_found() {
    let (status, body) = call(
        &app(),
        Method::POST,
        "/api/v1/verify",
        Some(json!({ "challengeId": "mystery", "code": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains("mystery"));
}

#[tokio::test]
async fn new_visitor_from_challenge_card_gets_guided() {
    let (status, body) = call(
        &app(),
        Method::POST,
        "/api/v1/session",
        Some(json!({ "challenge": "date-calculator", "hour": 9, "viewportWidth": 1440 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recommendation"]["modeId"], "guided");
    assert_eq!(body["context"]["timeOfDay"], "morning");
    assert_eq!(body["context"]["codeSource"], "challenge");
    assert_eq!(body["showRecommendation"], true);
}

#[tokio::test]
async fn stored_profile_feeds_the_session() {
    let app = app();
    let profile = json!({
        "experience": "advanced",
        "previousSessions": 15,
        "completedChallenges": ["poll-maker"]
    });
    let (status, _) = call(&app, Method::PUT, "/api/v1/profile", Some(profile.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let (_, loaded) = call(&app, Method::GET, "/api/v1/profile", None).await;
    assert_eq!(loaded, profile);

    let (_, body) = call(
        &app,
        Method::POST,
        "/api/v1/session",
        Some(json!({ "entryPoint": "sandbox-link", "errorFrequency": "low", "sessionTime": 1800000 })),
    )
    .await;
    assert_eq!(body["context"]["previousSessions"], 15);
    assert_eq!(body["recommendation"]["modeId"], "explore");
    assert_eq!(body["recommendation"]["confidence"], 100);
    assert_eq!(body["showRecommendation"], false);
}

#[tokio::test]
async fn recommend_endpoint_rejects_unknown_enum_values() {
    let bad = json!({
        "experience": "guru", "previousSessions": 0, "sessionTime": 0, "codeSource": "scratch",
        "hasActiveChallenges": false, "recentActivity": "building", "errorFrequency": "low",
        "entryPoint": "homepage", "timeOfDay": "night", "deviceType": "desktop"
    });
    let (status, body) = call(&app(), Method::POST, "/api/v1/recommend", Some(bad)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.as_str().unwrap().contains("guru"));
}

#[tokio::test]
async fn usage_then_insights() {
    let app = app();
    let context = json!({
        "experience": "beginner", "previousSessions": 0, "sessionTime": 0, "codeSource": "challenge",
        "currentChallenge": "poll-maker", "hasActiveChallenges": true, "recentActivity": "learning",
        "errorFrequency": "medium", "entryPoint": "challenge-card", "timeOfDay": "morning",
        "deviceType": "desktop"
    });
    let usage = json!({
        "context": context,
        "recommendedMode": "guided",
        "actualMode": "practice",
        "sessionDuration": 600000,
        "userSatisfaction": "neutral"
    });
    let (_, ok) = call(&app, Method::POST, "/api/v1/usage", Some(usage)).await;
    assert_eq!(ok, json!({ "ok": true }));

    let (_, body) = call(&app, Method::GET, "/api/v1/insights", None).await;
    assert_eq!(
        body["insights"],
        json!([
            "You tend to prefer practice mode",
            "You often choose different modes than recommended"
        ])
    );
}
