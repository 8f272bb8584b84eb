//! Pattern-based bug detection.
//!
//! A `Registry` maps challenge ids to their ordered rule sets. `detect` walks
//! the rules of one challenge against the current editor text and returns every
//! bug still considered present, each located on the lines where its search
//! terms appear. Pure string inspection: no parsing, no I/O, total over any
//! input, cheap enough to run on every keystroke.

use std::collections::{BTreeSet, HashMap};

use crate::domain::{BugLocation, BugRule, Challenge};
use crate::seeds::seed_challenges;

/// Challenge id -> challenge with its ordered rules.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    challenges: HashMap<String, Challenge>,
    order: Vec<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding only the shipped seed table.
    pub fn with_builtin() -> Self {
        let mut reg = Self::new();
        for c in seed_challenges() {
            reg.insert_if_absent(c);
        }
        reg
    }

    /// Insert or replace a challenge. Returns the previous entry, if any.
    pub fn insert(&mut self, challenge: Challenge) -> Option<Challenge> {
        let id = challenge.id.clone();
        if !self.challenges.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.challenges.insert(id, challenge)
    }

    /// Insert unless the id is already taken. Returns whether it was inserted.
    pub fn insert_if_absent(&mut self, challenge: Challenge) -> bool {
        if self.challenges.contains_key(&challenge.id) {
            return false;
        }
        self.insert(challenge);
        true
    }

    pub fn get(&self, id: &str) -> Option<&Challenge> {
        self.challenges.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.challenges.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.challenges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty()
    }

    /// Challenges in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Challenge> {
        self.order.iter().filter_map(|id| self.challenges.get(id))
    }

    /// Bugs still present in `source` for `challenge_id`, in rule order.
    /// Unknown challenge ids have no known heuristics and yield nothing.
    pub fn detect(&self, challenge_id: &str, source: &str) -> Vec<BugLocation> {
        match self.challenges.get(challenge_id) {
            Some(ch) => detect_in(&ch.rules, source),
            None => Vec::new(),
        }
    }
}

/// Evaluate an ordered rule list against `source`.
pub fn detect_in(rules: &[BugRule], source: &str) -> Vec<BugLocation> {
    rules
        .iter()
        .filter(|r| r.rule.fires(source))
        .map(|r| BugLocation {
            id: r.bug.id,
            title: r.bug.title.clone(),
            lines: find_lines(source, &r.search_terms),
            severity: r.bug.severity,
            message: r.bug.message.clone(),
            hint: r.bug.hint.clone(),
        })
        .collect()
}

/// 1-based numbers of every line containing any of `terms`, ascending and
/// without duplicates.
pub fn find_lines<S: AsRef<str>>(source: &str, terms: &[S]) -> Vec<usize> {
    let mut found = BTreeSet::new();
    for term in terms {
        let term = term.as_ref();
        if term.is_empty() {
            continue;
        }
        for (idx, line) in source.split('\n').enumerate() {
            if line.contains(term) {
                found.insert(idx + 1);
            }
        }
    }
    found.into_iter().collect()
}
