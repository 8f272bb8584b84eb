//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::completion::{BugCompletionStatus, BugSignal};
use crate::domain::{BugDefinition, BugLocation, Challenge, ChallengeSource};
use crate::history::Satisfaction;
use crate::recommend::{ModeId, ModeRecommendation, UserContext};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    Detect {
        #[serde(rename = "challengeId")]
        challenge_id: String,
        code: String,
    },
    TestRun {
        #[serde(rename = "challengeId")]
        challenge_id: String,
        code: String,
    },
    Recommend {
        context: UserContext,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Bugs {
        #[serde(rename = "challengeId")]
        challenge_id: String,
        bugs: Vec<BugLocation>,
    },
    TestReport {
        report: TestRunReport,
    },
    Recommendation {
        recommendation: ModeRecommendation,
    },
    Error {
        message: String,
    },
}

/// DTO for listing challenges without their detection internals.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeOut {
    pub id: String,
    pub title: String,
    pub source: ChallengeSource,
    pub bugs: Vec<BugDefinition>,
    pub broken_code: String,
}

pub fn to_out(c: &Challenge) -> ChallengeOut {
    ChallengeOut {
        id: c.id.clone(),
        title: c.title.clone(),
        source: c.source,
        bugs: c.rules.iter().map(|r| r.bug.clone()).collect(),
        broken_code: c.broken_code.clone(),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct CodeIn {
    #[serde(rename = "challengeId")]
    pub challenge_id: String,
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BugsOut {
    pub bugs: Vec<BugLocation>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckResult {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TestRunReport {
    pub challenge_id: String,
    pub bug_detection: CheckResult,
    pub remaining_bugs: Vec<u32>,
    pub overall: CheckResult,
}

#[derive(Debug, Deserialize)]
pub struct VerifyIn {
    #[serde(rename = "challengeId")]
    pub challenge_id: String,
    pub code: String,
    #[serde(default)]
    pub statuses: Vec<BugCompletionStatus>,
    /// Verdicts from the test runner or other checkers, keyed by bug id.
    #[serde(default)]
    pub signals: Vec<BugSignal>,
    /// Close out bugs that end up fixed or verified.
    #[serde(default)]
    pub complete: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyOut {
    pub statuses: Vec<BugCompletionStatus>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOut {
    pub context: UserContext,
    pub recommendation: ModeRecommendation,
    pub show_recommendation: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageIn {
    pub context: UserContext,
    pub recommended_mode: ModeId,
    pub actual_mode: ModeId,
    pub session_duration: u64,
    #[serde(default)]
    pub user_satisfaction: Option<Satisfaction>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InsightsOut {
    pub insights: Vec<String>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
