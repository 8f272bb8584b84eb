//! Integration tests for the usage history log and its insights.

use std::sync::Arc;

use debug_sandbox_backend::{
    error::{Error, Result},
    history::{Satisfaction, UsageHistory, DEFAULT_CAPACITY, USAGE_KEY},
    recommend::{
        CodeSource, DeviceType, EntryPoint, ErrorFrequency, Experience, ModeId, RecentActivity,
        TimeOfDay, UserContext,
    },
    store::{JsonFileStore, KeyValueStore, MemoryStore},
};

const MINUTE: u64 = 60 * 1000;

fn ctx() -> UserContext {
    UserContext {
        experience: Experience::Intermediate,
        previous_sessions: 4,
        completed_challenges: vec![],
        session_time: 0,
        current_challenge: None,
        code_source: CodeSource::Template,
        has_active_challenges: false,
        recent_activity: RecentActivity::Building,
        error_frequency: ErrorFrequency::Medium,
        entry_point: EntryPoint::Homepage,
        time_of_day: TimeOfDay::Afternoon,
        device_type: DeviceType::Desktop,
    }
}

fn history() -> UsageHistory {
    UsageHistory::new(Arc::new(MemoryStore::new()), DEFAULT_CAPACITY)
}

/// Store whose writes always fail.
struct ReadOnlyStore;

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }
    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(Error::Storage("read-only".into()))
    }
}

#[test]
fn empty_history_has_no_insights() {
    assert!(history().personalized_insights().unwrap().is_empty());
}

#[test]
fn trims_to_most_recent_entries() {
    let h = history();
    for i in 0..(DEFAULT_CAPACITY as u64 + 7) {
        h.record_mode_usage(&ctx(), ModeId::Practice, ModeId::Practice, i, None).unwrap();
    }
    let entries = h.entries().unwrap();
    assert_eq!(entries.len(), DEFAULT_CAPACITY);
    assert_eq!(entries.first().unwrap().session_duration, 7);
    assert_eq!(entries.last().unwrap().session_duration, DEFAULT_CAPACITY as u64 + 6);
}

#[test]
fn override_flag_tracks_disagreement() {
    let h = history();
    let same = h.record_mode_usage(&ctx(), ModeId::Guided, ModeId::Guided, 1, None).unwrap();
    let diff = h
        .record_mode_usage(&ctx(), ModeId::Guided, ModeId::Explore, 1, Some(Satisfaction::Positive))
        .unwrap();
    assert!(!same.mode_override);
    assert!(diff.mode_override);
    assert_eq!(diff.user_satisfaction, Some(Satisfaction::Positive));
}

#[test]
fn insights_cover_favorite_overrides_and_long_sessions() {
    let h = history();
    h.record_mode_usage(&ctx(), ModeId::Guided, ModeId::Explore, 45 * MINUTE, None).unwrap();
    h.record_mode_usage(&ctx(), ModeId::Guided, ModeId::Explore, 40 * MINUTE, None).unwrap();
    h.record_mode_usage(&ctx(), ModeId::Practice, ModeId::Practice, 20 * MINUTE, None).unwrap();

    assert_eq!(
        h.personalized_insights().unwrap(),
        vec![
            "You tend to prefer explore mode".to_string(),
            "You often choose different modes than recommended".to_string(),
            "You have long coding sessions - explore mode might suit you well".to_string(),
        ]
    );
}

#[test]
fn favorite_ties_go_to_first_seen_mode() {
    let h = history();
    h.record_mode_usage(&ctx(), ModeId::Practice, ModeId::Practice, MINUTE, None).unwrap();
    h.record_mode_usage(&ctx(), ModeId::Guided, ModeId::Guided, MINUTE, None).unwrap();
    assert_eq!(
        h.personalized_insights().unwrap(),
        vec!["You tend to prefer practice mode".to_string()]
    );
}

#[test]
fn malformed_stored_history_reads_as_empty() {
    let store = Arc::new(MemoryStore::new());
    store.set(USAGE_KEY, "[{\"broken\":").unwrap();
    let h = UsageHistory::new(store, 5);
    assert!(h.entries().unwrap().is_empty());
    h.record_mode_usage(&ctx(), ModeId::Guided, ModeId::Guided, 1, None).unwrap();
    assert_eq!(h.entries().unwrap().len(), 1);
}

#[test]
fn write_failure_is_reported_not_panicked() {
    let h = UsageHistory::new(Arc::new(ReadOnlyStore), 5);
    let err = h.record_mode_usage(&ctx(), ModeId::Guided, ModeId::Guided, 1, None);
    assert!(matches!(err, Err(Error::Storage(_))));
}

#[test]
fn history_survives_in_file_store() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("store.json");
    {
        let store = Arc::new(JsonFileStore::open(&path).unwrap());
        let h = UsageHistory::new(store, 3);
        h.record_mode_usage(&ctx(), ModeId::Explore, ModeId::Explore, MINUTE, None).unwrap();
    }
    let store = Arc::new(JsonFileStore::open(&path).unwrap());
    let h = UsageHistory::new(store, 3);
    let entries = h.entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].actual_mode, ModeId::Explore);
    assert_eq!(entries[0].context, ctx());
}
