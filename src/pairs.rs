use crate::cartesian::cross;
use crate::error::{ensure_invariant, Result, SchedulerError};
use crate::types::{split_teams, Round};
use std::collections::HashMap;

/// Unordered pair of player ids, stored smallest first
pub type Pair = (usize, usize);

/// Occurrences of each pair across a schedule
pub type PairCounts = HashMap<Pair, usize>;

fn sorted_pair(a: usize, b: usize) -> Pair {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Count occurrences of each pair
pub fn tally(pairs: impl IntoIterator<Item = Pair>) -> PairCounts {
    let mut counts = HashMap::new();
    for pair in pairs {
        *counts.entry(pair).or_insert(0) += 1;
    }
    counts
}

/// Repeats beyond each pair's first occurrence
pub fn dupcount(counts: &PairCounts) -> usize {
    counts.values().map(|&k| k - 1).sum()
}

/// `histogram[k]` is the number of distinct pairs seen exactly `k` times
pub fn occurrence_histogram(counts: &PairCounts) -> Vec<usize> {
    let max = counts.values().copied().max().unwrap_or(0);
    let mut histogram = vec![0; max + 1];
    for &k in counts.values() {
        histogram[k] += 1;
    }
    histogram
}

/// Default weights `w(k) = 1 + 0.1k` for occurrence levels `0..levels`
pub fn default_weights(levels: usize) -> Vec<f64> {
    (0..levels).map(|k| 1.0 + 0.1 * k as f64).collect()
}

/// `Σ w(k) * histogram[k]` over observed occurrence levels
pub fn weighted_score(counts: &PairCounts, weights: Option<&[f64]>) -> Result<f64> {
    let histogram = occurrence_histogram(counts);
    let defaults;
    let weights = match weights {
        Some(w) => w,
        None => {
            defaults = default_weights(histogram.len());
            defaults.as_slice()
        }
    };

    if weights.len() < histogram.len() {
        return Err(SchedulerError::InsufficientWeights {
            needed: histogram.len(),
            provided: weights.len(),
        });
    }

    Ok(histogram
        .iter()
        .zip(weights)
        .map(|(&n, &w)| n as f64 * w)
        .sum())
}

/// Scores one candidate schedule by repeated partners and opponents
#[derive(Clone, Copy, Debug)]
pub struct PairCounter {
    players_per_court: usize,
}

impl PairCounter {
    pub fn new(players_per_court: usize) -> Self {
        Self { players_per_court }
    }

    pub fn players_per_court(&self) -> usize {
        self.players_per_court
    }

    /// Partner pairs: the flattened schedule taken two players at a time
    pub fn partner_pairs(&self, sched: &[Round]) -> Result<Vec<Pair>> {
        let flat: Vec<usize> = sched.iter().flatten().copied().collect();
        ensure_invariant!(
            flat.len() % 2 == 0,
            "schedule holds {} slots, cannot split into partner pairs",
            flat.len()
        );
        Ok(flat.chunks_exact(2).map(|p| sorted_pair(p[0], p[1])).collect())
    }

    /// Opponent pairs: team1 x team2 for every match
    pub fn opponent_pairs(&self, sched: &[Round]) -> Result<Vec<Pair>> {
        let ppc = self.players_per_court;
        ensure_invariant!(
            ppc > 0 && ppc % 2 == 0,
            "{} players per court cannot be split into two teams",
            ppc
        );

        let team_size = ppc / 2;
        let mut pairs = Vec::new();
        for (idx, round) in sched.iter().enumerate() {
            ensure_invariant!(
                round.len() % ppc == 0,
                "round {} has {} players, not a multiple of {}",
                idx,
                round.len(),
                ppc
            );

            for game in round.chunks_exact(ppc) {
                let (team1, team2) = split_teams(game);
                let matchups = cross(&[team1, team2]);
                ensure_invariant!(
                    matchups.len() == team_size * team_size && matchups.iter().all(|m| m.len() == 2),
                    "expected {} opponent pairs of 2, got {}",
                    team_size * team_size,
                    matchups.len()
                );
                pairs.extend(matchups.iter().map(|m| sorted_pair(m[0], m[1])));
            }
        }
        Ok(pairs)
    }

    pub fn partner_counts(&self, sched: &[Round]) -> Result<PairCounts> {
        Ok(tally(self.partner_pairs(sched)?))
    }

    pub fn opponent_counts(&self, sched: &[Round]) -> Result<PairCounts> {
        Ok(tally(self.opponent_pairs(sched)?))
    }

    /// Number of partner pairings beyond each pair's first
    pub fn partner_dupcount(&self, sched: &[Round]) -> Result<usize> {
        Ok(dupcount(&self.partner_counts(sched)?))
    }

    /// Number of opponent pairings beyond each pair's first
    pub fn opponent_dupcount(&self, sched: &[Round]) -> Result<usize> {
        Ok(dupcount(&self.opponent_counts(sched)?))
    }

    pub fn partner_dupcount_weighted(&self, sched: &[Round], weights: Option<&[f64]>) -> Result<f64> {
        weighted_score(&self.partner_counts(sched)?, weights)
    }

    pub fn opponent_dupcount_weighted(&self, sched: &[Round], weights: Option<&[f64]>) -> Result<f64> {
        weighted_score(&self.opponent_counts(sched)?, weights)
    }
}
