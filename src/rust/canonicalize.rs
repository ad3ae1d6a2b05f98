// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Atom canonicalizer
//!
//! Maps surface predicates ("is raining", "rains") onto a closed set of
//! canonical keys. A table is created per compile pass and discarded once
//! the lexicon has been exported.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Raw similarity needed to fold a new surface form into an existing key
pub const SIMILARITY_THRESHOLD: f64 = 0.92;

/// Stemmed token overlap needed for the same
pub const TOKEN_OVERLAP_THRESHOLD: f64 = 0.85;

const DROPPED_PREFIXES: &[&str] = &[
    "it is ", "there is ", "there are ", "is ", "are ", "was ", "were ", "the ", "a ", "an ",
];

const STOPWORDS: &[&str] = &[
    "a", "an", "the", "of", "to", "in", "on", "at", "by", "for", "is", "are", "was", "were", "be",
    "been", "it", "its", "that", "this",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalEntry {
    pub key: String,
    pub arity: usize,
    pub examples: Vec<String>,
}

/// Surface-predicate to canonical-key table
#[derive(Debug, Default)]
pub struct AtomTable {
    entries: IndexMap<String, CanonicalEntry>,
    alias: HashMap<(String, usize), String>,
}

impl AtomTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical key for a surface predicate observed with `arity` arguments
    pub fn propose(&mut self, surface: &str, arity: usize) -> String {
        let norm = normalize_surface(surface);

        if let Some(key) = self.alias.get(&(norm.clone(), arity)).cloned() {
            self.record_example(&key, surface);
            return key;
        }

        if let Some(key) = self.closest_key(&norm, arity) {
            debug!(surface, key = %key, "Folded surface predicate into existing key");
            self.alias.insert((norm, arity), key.clone());
            self.record_example(&key, surface);
            return key;
        }

        let key = self.mint_key(&norm, arity);
        self.entries.insert(
            key.clone(),
            CanonicalEntry {
                key: key.clone(),
                arity,
                examples: vec![surface.trim().to_string()],
            },
        );
        self.alias.insert((norm, arity), key.clone());
        key
    }

    /// Register `key` without an example; no-op if it already exists
    pub fn ensure(&mut self, key: &str, arity: usize) {
        if !self.entries.contains_key(key) {
            self.entries.insert(
                key.to_string(),
                CanonicalEntry {
                    key: key.to_string(),
                    arity,
                    examples: vec![],
                },
            );
        }
    }

    pub fn arity_of(&self, key: &str) -> Option<usize> {
        self.entries.get(key).map(|e| e.arity)
    }

    pub fn entries(&self) -> impl Iterator<Item = &CanonicalEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `key -> examples`, or `key -> [key]` for keys registered without one
    pub fn to_lexicon(&self) -> IndexMap<String, Vec<String>> {
        self.entries
            .iter()
            .map(|(k, e)| {
                let examples = if e.examples.is_empty() {
                    vec![k.clone()]
                } else {
                    e.examples.clone()
                };
                (k.clone(), examples)
            })
            .collect()
    }

    fn record_example(&mut self, key: &str, surface: &str) {
        let surface = surface.trim();
        if let Some(entry) = self.entries.get_mut(key) {
            if surface != key && !entry.examples.iter().any(|e| e == surface) {
                entry.examples.push(surface.to_string());
            }
        }
    }

    fn closest_key(&self, norm: &str, arity: usize) -> Option<String> {
        let norm_tokens = stem_tokens(norm);
        let mut best: Option<(&str, f64)> = None;

        for entry in self.entries.values().filter(|e| e.arity == arity) {
            let ratio = similarity_ratio(norm, &entry.key);
            let overlap = token_overlap(&norm_tokens, &stem_tokens(&entry.key));
            if ratio < SIMILARITY_THRESHOLD && overlap < TOKEN_OVERLAP_THRESHOLD {
                continue;
            }
            let score = ratio.max(overlap);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((&entry.key, score));
            }
        }

        best.map(|(k, _)| k.to_string())
    }

    fn mint_key(&self, norm: &str, arity: usize) -> String {
        let clashes = |k: &str| self.entries.get(k).is_some_and(|e| e.arity != arity);
        if !clashes(norm) {
            return norm.to_string();
        }
        let mut key = format!("{}_{}", norm, arity);
        let mut n = 2;
        while clashes(&key) {
            key = format!("{}_{}_{}", norm, arity, n);
            n += 1;
        }
        key
    }
}

/// Lowercase, drop leading determiners/auxiliaries, collapse whitespace to `_`
pub fn normalize_surface(surface: &str) -> String {
    let mut s = surface.trim().to_lowercase().replace('\'', "");
    s = s.split_whitespace().collect::<Vec<_>>().join(" ");

    loop {
        match DROPPED_PREFIXES.iter().find(|p| s.starts_with(*p)) {
            Some(prefix) => s = s[prefix.len()..].trim_start().to_string(),
            None => break,
        }
    }

    let normalized = s.split_whitespace().collect::<Vec<_>>().join("_");
    if normalized.is_empty() {
        "unnamed".to_string()
    } else {
        normalized
    }
}

/// Ratcliff/Obershelp similarity: `2 * matched / (len(a) + len(b))`
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    // Longest common substring, earliest in `a` on ties
    let mut best = (0usize, 0usize, 0usize);
    let mut prev = vec![0usize; b.len() + 1];
    for i in 1..=a.len() {
        let mut cur = vec![0usize; b.len() + 1];
        for j in 1..=b.len() {
            if a[i - 1] == b[j - 1] {
                cur[j] = prev[j - 1] + 1;
                if cur[j] > best.2 {
                    best = (i - cur[j], j - cur[j], cur[j]);
                }
            }
        }
        prev = cur;
    }
    let (ai, bj, len) = best;
    if len == 0 {
        return 0;
    }
    len + matching_chars(&a[..ai], &b[..bj]) + matching_chars(&a[ai + len..], &b[bj + len..])
}

fn stem(token: &str) -> String {
    for (suffix, replacement) in [("ies", "y"), ("ing", ""), ("ed", ""), ("es", ""), ("s", "")] {
        if let Some(base) = token.strip_suffix(suffix) {
            if base.len() >= 3 {
                return format!("{}{}", base, replacement);
            }
        }
    }
    token.to_string()
}

fn stem_tokens(key: &str) -> BTreeSet<String> {
    key.split('_')
        .filter(|t| !t.is_empty() && !STOPWORDS.contains(t))
        .map(stem)
        .collect()
}

fn token_overlap(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let shared = a.intersection(b).count();
    let union = a.union(b).count();
    shared as f64 / union as f64
}
