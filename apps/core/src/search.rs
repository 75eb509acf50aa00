use std::collections::HashMap;

use crate::model::{normalize_for_search, AppEntry};

/// Launch counts keyed by execution argument.
pub type UsageCounts = HashMap<String, u32>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredEntry<'a> {
    pub score: i64,
    pub entry: &'a AppEntry,
}

pub fn search(entries: &[AppEntry], query: &str, limit: usize, usage: &UsageCounts) -> Vec<AppEntry> {
    search_scored(entries, query, limit, usage)
        .into_iter()
        .map(|scored| scored.entry.clone())
        .collect()
}

/// Ranks `entries` against `query`, best first. Ties keep index order.
pub fn search_scored<'a>(
    entries: &'a [AppEntry],
    query: &str,
    limit: usize,
    usage: &UsageCounts,
) -> Vec<ScoredEntry<'a>> {
    if limit == 0 || entries.is_empty() {
        return Vec::new();
    }

    let normalized_query = normalize_for_search(query);
    if normalized_query.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(i64, usize, &AppEntry)> = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            score_entry(entry, &normalized_query, usage).map(|score| (score, index, entry))
        })
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

    scored
        .into_iter()
        .take(limit)
        .map(|(score, _, entry)| ScoredEntry { score, entry })
        .collect()
}

fn score_entry(entry: &AppEntry, normalized_query: &str, usage: &UsageCounts) -> Option<i64> {
    let text_score = score_normalized_name(entry.normalized_name(), normalized_query)?;
    let use_count = usage.get(&entry.path).copied().unwrap_or(0);
    Some(text_score + frequency_bonus(use_count))
}

fn frequency_bonus(use_count: u32) -> i64 {
    (i64::from(use_count) * 12).clamp(0, 400)
}

pub fn score_normalized_name(normalized_name: &str, query: &str) -> Option<i64> {
    if normalized_name.is_empty() || query.is_empty() {
        return None;
    }

    if let Some(position) = normalized_name.find(query) {
        let prefix_bonus = if position == 0 { 400 } else { 0 };
        let compact_bonus = (query.len() as i64) * 40;
        let position_penalty = position as i64;
        let length_penalty = (normalized_name.len() as i64 - query.len() as i64).abs();
        return Some(10_000 + prefix_bonus + compact_bonus - position_penalty - length_penalty);
    }

    let positions = subsequence_positions(normalized_name, query)?;
    let start_penalty = positions[0] as i64;
    let gap_penalty: i64 = positions
        .windows(2)
        .map(|pair| pair[1].saturating_sub(pair[0] + 1) as i64)
        .sum();
    let length_penalty = (normalized_name.len() as i64 - query.len() as i64).max(0);

    Some(5_000 + (query.len() as i64) * 30 - gap_penalty * 6 - start_penalty - length_penalty)
}

fn subsequence_positions(haystack: &str, needle: &str) -> Option<Vec<usize>> {
    let mut positions = Vec::with_capacity(needle.len());
    let mut next_start = 0;

    for needle_char in needle.chars() {
        let (offset, hay_char) = haystack[next_start..]
            .char_indices()
            .find(|(_, hay_char)| *hay_char == needle_char)?;
        let absolute = next_start + offset;
        positions.push(absolute);
        next_start = absolute + hay_char.len_utf8();
    }

    Some(positions)
}
