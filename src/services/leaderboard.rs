//! Response-time leaderboard.
//!
//! Rows are rebuilt from the full signal list on every call. Analysts are
//! grouped by their exact identity string, so "alice" and "Alice" rank
//! separately.

use std::collections::HashMap;

use crate::types::{LeaderboardEntry, Signal, SignalStatus};

struct Tally {
    total_signals: usize,
    total: f64,
    fastest: f64,
    slowest: f64,
}

impl Tally {
    fn new(first: f64) -> Self {
        Self {
            total_signals: 1,
            total: first,
            fastest: first,
            slowest: first,
        }
    }

    fn add(&mut self, response: f64) {
        self.total_signals += 1;
        self.total += response;
        self.fastest = self.fastest.min(response);
        self.slowest = self.slowest.max(response);
    }
}

/// Rank analysts by average response time, fastest first. Equal averages
/// are ordered by analyst identity ascending.
pub fn build_leaderboard(signals: &[Signal]) -> Vec<LeaderboardEntry> {
    let mut tallies: HashMap<&str, Tally> = HashMap::new();

    for signal in signals {
        if signal.status != SignalStatus::Analyzed {
            continue;
        }
        let (Some(analyst), Some(response)) =
            (signal.analyzed_by.as_deref(), signal.response_time_seconds)
        else {
            continue;
        };
        tallies
            .entry(analyst)
            .and_modify(|t| t.add(response))
            .or_insert_with(|| Tally::new(response));
    }

    let mut rows: Vec<LeaderboardEntry> = tallies
        .into_iter()
        .map(|(analyst, t)| LeaderboardEntry {
            analyst: analyst.to_string(),
            total_signals: t.total_signals,
            total_response_time: t.total,
            fastest_response: t.fastest,
            slowest_response: t.slowest,
            average_response_time: t.total / t.total_signals as f64,
        })
        .collect();

    rows.sort_by(|a, b| {
        a.average_response_time
            .total_cmp(&b.average_response_time)
            .then_with(|| a.analyst.cmp(&b.analyst))
    });
    rows
}
