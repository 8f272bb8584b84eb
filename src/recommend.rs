//! Smart mode recommendation.
//!
//! Five weighted factors (experience, active challenge, code source, recent
//! activity, entry point) each contribute a fixed per-value triple of raw
//! points to the guided/practice/explore scores. Flat session bonuses follow,
//! then the scores are normalized onto a 20..=100 confidence scale and the top
//! mode is picked. Deterministic, synchronous, no hidden state.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ModeId {
    Guided,
    Practice,
    Explore,
}

impl ModeId {
    /// Tie-break order.
    pub const ALL: [ModeId; 3] = [ModeId::Guided, ModeId::Practice, ModeId::Explore];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModeId::Guided => "guided",
            ModeId::Practice => "practice",
            ModeId::Explore => "explore",
        }
    }

    /// Static explanation shown next to a non-chosen mode.
    pub fn alternative_reason(&self) -> &'static str {
        match self {
            ModeId::Guided => "Try this if you want step-by-step guidance and immediate feedback",
            ModeId::Practice => "Switch to this for template-based learning with flexible pacing",
            ModeId::Explore => "Choose this for complete creative freedom and experimentation",
        }
    }
}

impl std::fmt::Display for ModeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ModeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "guided" => Ok(ModeId::Guided),
            "practice" => Ok(ModeId::Practice),
            "explore" => Ok(ModeId::Explore),
            _ => Err(format!("Unknown mode: {}. Use guided, practice, or explore.", s)),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Experience {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl std::str::FromStr for Experience {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "beginner" => Ok(Experience::Beginner),
            "intermediate" => Ok(Experience::Intermediate),
            "advanced" => Ok(Experience::Advanced),
            other => Err(format!("Unknown experience level: {}", other)),
        }
    }
}

impl Experience {
    pub fn as_str(&self) -> &'static str {
        match self {
            Experience::Beginner => "beginner",
            Experience::Intermediate => "intermediate",
            Experience::Advanced => "advanced",
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum CodeSource {
    Challenge,
    Template,
    Scratch,
    Import,
    Saved,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RecentActivity {
    Debugging,
    Learning,
    Exploring,
    Building,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorFrequency {
    Low,
    Medium,
    High,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum EntryPoint {
    Homepage,
    DirectLink,
    ChallengeCard,
    SandboxLink,
    Bridge,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceType {
    Mobile,
    Tablet,
    Desktop,
}

/// Everything the scorer knows about the user and the current session.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    pub experience: Experience,
    pub previous_sessions: u32,
    #[serde(default)]
    pub completed_challenges: Vec<String>,
    /// Milliseconds elapsed in the current session.
    pub session_time: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_challenge: Option<String>,
    pub code_source: CodeSource,
    pub has_active_challenges: bool,
    pub recent_activity: RecentActivity,
    pub error_frequency: ErrorFrequency,
    pub entry_point: EntryPoint,
    pub time_of_day: TimeOfDay,
    pub device_type: DeviceType,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Alternative {
    pub mode_id: ModeId,
    pub confidence: u8,
    pub reason: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModeRecommendation {
    pub mode_id: ModeId,
    /// 20..=100
    pub confidence: u8,
    pub reasoning: Vec<String>,
    /// The two other modes, highest confidence first.
    pub alternatives: Vec<Alternative>,
}

/// Raw points per mode, in guided/practice/explore order.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ModeScores {
    pub guided: f64,
    pub practice: f64,
    pub explore: f64,
}

impl ModeScores {
    const fn pts(guided: f64, practice: f64, explore: f64) -> Self {
        Self { guided, practice, explore }
    }

    fn add_weighted(&mut self, points: ModeScores, weight: f64) {
        self.guided += points.guided * weight;
        self.practice += points.practice * weight;
        self.explore += points.explore * weight;
    }

    fn add(&mut self, guided: f64, practice: f64, explore: f64) {
        self.guided += guided;
        self.practice += practice;
        self.explore += explore;
    }

    pub fn get(&self, mode: ModeId) -> f64 {
        match mode {
            ModeId::Guided => self.guided,
            ModeId::Practice => self.practice,
            ModeId::Explore => self.explore,
        }
    }
}

pub const EXPERIENCE_WEIGHT: f64 = 0.25;
pub const CHALLENGE_WEIGHT: f64 = 0.30;
pub const SOURCE_WEIGHT: f64 = 0.20;
pub const ACTIVITY_WEIGHT: f64 = 0.15;
pub const ENTRY_WEIGHT: f64 = 0.10;

/// Primary factor weights; they sum to 1.0.
pub const FACTOR_WEIGHTS: [(&str, f64); 5] = [
    ("experience", EXPERIENCE_WEIGHT),
    ("active_challenge", CHALLENGE_WEIGHT),
    ("code_source", SOURCE_WEIGHT),
    ("recent_activity", ACTIVITY_WEIGHT),
    ("entry_point", ENTRY_WEIGHT),
];

const SHORT_SESSION_MS: u64 = 5 * 60 * 1000;
const CONFIDENCE_FLOOR: f64 = 20.0;
const CONFIDENCE_SPREAD: f64 = 80.0;

fn experience_points(e: Experience) -> ModeScores {
    match e {
        Experience::Beginner => ModeScores::pts(40.0, 30.0, 10.0),
        Experience::Intermediate => ModeScores::pts(25.0, 40.0, 25.0),
        Experience::Advanced => ModeScores::pts(10.0, 20.0, 40.0),
    }
}

fn challenge_points(active: bool) -> ModeScores {
    if active {
        ModeScores::pts(45.0, 15.0, 5.0)
    } else {
        ModeScores::pts(5.0, 35.0, 35.0)
    }
}

fn source_points(s: CodeSource) -> ModeScores {
    match s {
        CodeSource::Challenge => ModeScores::pts(40.0, 10.0, 5.0),
        CodeSource::Template => ModeScores::pts(10.0, 35.0, 25.0),
        CodeSource::Scratch => ModeScores::pts(5.0, 25.0, 40.0),
        CodeSource::Import | CodeSource::Saved => ModeScores::pts(15.0, 25.0, 30.0),
    }
}

fn activity_points(a: RecentActivity) -> ModeScores {
    match a {
        RecentActivity::Debugging => ModeScores::pts(35.0, 25.0, 10.0),
        RecentActivity::Learning => ModeScores::pts(40.0, 30.0, 15.0),
        RecentActivity::Exploring => ModeScores::pts(5.0, 20.0, 40.0),
        RecentActivity::Building => ModeScores::pts(10.0, 30.0, 35.0),
    }
}

fn entry_points(e: EntryPoint) -> ModeScores {
    match e {
        EntryPoint::ChallengeCard => ModeScores::pts(40.0, 10.0, 5.0),
        EntryPoint::SandboxLink => ModeScores::pts(5.0, 20.0, 40.0),
        EntryPoint::Homepage => ModeScores::pts(25.0, 30.0, 20.0),
        // neutral
        EntryPoint::DirectLink | EntryPoint::Bridge => ModeScores::pts(20.0, 25.0, 25.0),
    }
}

/// Weighted factor sum plus session bonuses, before normalization.
pub fn raw_scores(ctx: &UserContext) -> ModeScores {
    let mut scores = ModeScores::default();
    let active = ctx.has_active_challenges && ctx.current_challenge.is_some();

    scores.add_weighted(experience_points(ctx.experience), EXPERIENCE_WEIGHT);
    scores.add_weighted(challenge_points(active), CHALLENGE_WEIGHT);
    scores.add_weighted(source_points(ctx.code_source), SOURCE_WEIGHT);
    scores.add_weighted(activity_points(ctx.recent_activity), ACTIVITY_WEIGHT);
    scores.add_weighted(entry_points(ctx.entry_point), ENTRY_WEIGHT);

    apply_session_bonuses(&mut scores, ctx);
    scores
}

fn apply_session_bonuses(scores: &mut ModeScores, ctx: &UserContext) {
    if ctx.session_time < SHORT_SESSION_MS {
        scores.add(5.0, 2.0, 0.0);
    }

    match ctx.error_frequency {
        ErrorFrequency::High => scores.add(8.0, 3.0, -2.0),
        ErrorFrequency::Low => scores.add(0.0, 3.0, 5.0),
        ErrorFrequency::Medium => {}
    }

    if ctx.device_type == DeviceType::Mobile {
        scores.add(7.0, 3.0, -5.0);
    }

    if ctx.previous_sessions == 0 {
        scores.add(10.0, 0.0, 0.0);
    } else if ctx.previous_sessions > 10 {
        scores.add(0.0, 0.0, 5.0);
    }
}

/// Map raw scores onto 20..=100: min goes to 20, max to 100.
pub fn normalize(scores: &ModeScores) -> [(ModeId, u8); 3] {
    let values = ModeId::ALL.map(|m| scores.get(m));
    let max = values.iter().copied().fold(f64::MIN, f64::max);
    let min = values.iter().copied().fold(f64::MAX, f64::min);
    let range = if max - min == 0.0 { 1.0 } else { max - min };

    ModeId::ALL.map(|m| {
        let scaled = ((scores.get(m) - min) / range) * CONFIDENCE_SPREAD + CONFIDENCE_FLOOR;
        (m, scaled.round().clamp(CONFIDENCE_FLOOR, 100.0) as u8)
    })
}

/// Highest confidence first; equal confidences keep guided/practice/explore order.
fn ranked(normalized: [(ModeId, u8); 3]) -> Vec<(ModeId, u8)> {
    let mut v = normalized.to_vec();
    v.sort_by(|a, b| b.1.cmp(&a.1));
    v
}

fn reasoning_for(ctx: &UserContext, top: ModeId) -> Vec<String> {
    let mut reasoning = Vec::new();

    if ctx.has_active_challenges {
        reasoning.push("You have active challenges that benefit from guided feedback".to_string());
    }
    if ctx.experience == Experience::Beginner {
        reasoning.push("As a beginner, structured learning helps build confidence".to_string());
    }
    if ctx.experience == Experience::Advanced && ctx.code_source == CodeSource::Scratch {
        reasoning.push("Your experience level suggests you'll benefit from creative freedom".to_string());
    }
    if ctx.code_source == CodeSource::Template {
        reasoning.push("Template-based work often benefits from practice mode features".to_string());
    }
    if ctx.recent_activity == RecentActivity::Debugging {
        reasoning.push("Your debugging focus aligns with guided challenge features".to_string());
    }
    if ctx.error_frequency == ErrorFrequency::High {
        reasoning.push("Real-time feedback can help reduce errors and improve learning".to_string());
    }

    if reasoning.is_empty() {
        reasoning.push(format!("Based on your overall context, {} mode offers the best experience", top));
    }
    reasoning
}

/// Recommend a mode for `ctx`.
pub fn recommend(ctx: &UserContext) -> ModeRecommendation {
    let ranked = ranked(normalize(&raw_scores(ctx)));
    let (mode_id, confidence) = ranked[0];

    let alternatives = ranked[1..]
        .iter()
        .map(|&(m, c)| Alternative {
            mode_id: m,
            confidence: c,
            reason: m.alternative_reason().to_string(),
        })
        .collect();

    ModeRecommendation {
        mode_id,
        confidence,
        reasoning: reasoning_for(ctx, mode_id),
        alternatives,
    }
}
