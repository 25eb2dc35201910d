use crate::error::{ensure_invariant, Result, SchedulerError};
use crate::pairs::{occurrence_histogram, PairCounter, PairCounts};
use crate::types::{OptimizedSchedule, Round};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One side of a pairing: `player` met `other` this many times
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairingRecord {
    pub player: usize,
    pub other: usize,
    pub times: usize,
}

/// Per-player view of repeated pairings in a schedule
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    /// Player id -> number of distinct partners they were paired with more than once
    pub partner_duplicates: BTreeMap<usize, usize>,
    /// Player id -> number of distinct opponents they faced more than once
    pub opponent_duplicates: BTreeMap<usize, usize>,
    /// Occurrence count -> number of partner pairs seen that many times
    pub partner_histogram: BTreeMap<usize, usize>,
    pub opponent_histogram: BTreeMap<usize, usize>,
    pub partners: Vec<PairingRecord>,
    pub opponents: Vec<PairingRecord>,
}

/// Summary keyed by display name
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NamedSummary {
    pub partner_duplicates: BTreeMap<String, usize>,
    pub opponent_duplicates: BTreeMap<String, usize>,
}

fn histogram_map(counts: &PairCounts) -> BTreeMap<usize, usize> {
    occurrence_histogram(counts)
        .into_iter()
        .enumerate()
        .filter(|&(_, n)| n > 0)
        .collect()
}

/// Both orientations of every pair, so a table can be filtered by either player
pub fn pairing_table(counts: &PairCounts) -> Vec<PairingRecord> {
    let mut records: Vec<PairingRecord> = counts
        .iter()
        .flat_map(|(&(a, b), &times)| {
            [
                PairingRecord { player: a, other: b, times },
                PairingRecord { player: b, other: a, times },
            ]
        })
        .collect();
    records.sort();
    records
}

fn repeated_per_player(counts: &PairCounts, totals: &mut BTreeMap<usize, usize>) {
    for (&(a, b), &times) in counts {
        if times > 1 {
            *totals.entry(a).or_insert(0) += 1;
            *totals.entry(b).or_insert(0) += 1;
        }
    }
}

/// Summarize a `[round][court][slot]` schedule
pub fn summarize(schedule: &[Vec<Vec<usize>>]) -> Result<ScheduleSummary> {
    let ppc = schedule
        .iter()
        .flatten()
        .next()
        .map(Vec::len)
        .unwrap_or(0);
    ensure_invariant!(
        schedule.iter().flatten().all(|game| game.len() == ppc),
        "matches in the schedule do not all have {} players",
        ppc
    );

    let rounds: Vec<Round> = schedule
        .iter()
        .map(|round| round.iter().flatten().copied().collect())
        .collect();
    if ppc == 0 {
        return Ok(ScheduleSummary::default());
    }

    let counter = PairCounter::new(ppc);
    let partner_counts = counter.partner_counts(&rounds)?;
    let opponent_counts = counter.opponent_counts(&rounds)?;

    // Every player on court gets an entry, even with no repeats
    let mut partner_duplicates: BTreeMap<usize, usize> =
        rounds.iter().flatten().map(|&p| (p, 0)).collect();
    let mut opponent_duplicates = partner_duplicates.clone();
    repeated_per_player(&partner_counts, &mut partner_duplicates);
    repeated_per_player(&opponent_counts, &mut opponent_duplicates);

    Ok(ScheduleSummary {
        partner_duplicates,
        opponent_duplicates,
        partner_histogram: histogram_map(&partner_counts),
        opponent_histogram: histogram_map(&opponent_counts),
        partners: pairing_table(&partner_counts),
        opponents: pairing_table(&opponent_counts),
    })
}

impl ScheduleSummary {
    /// Re-key the per-player counts by display name
    pub fn named(&self, names: &[String]) -> Result<NamedSummary> {
        let rename = |counts: &BTreeMap<usize, usize>| -> Result<BTreeMap<String, usize>> {
            counts
                .iter()
                .map(|(&id, &n)| {
                    names.get(id).map(|name| (name.trim().to_string(), n)).ok_or_else(|| {
                        SchedulerError::InvalidPlayerNames(format!(
                            "{} names supplied but schedule references player {}",
                            names.len(),
                            id
                        ))
                    })
                })
                .collect()
        };

        Ok(NamedSummary {
            partner_duplicates: rename(&self.partner_duplicates)?,
            opponent_duplicates: rename(&self.opponent_duplicates)?,
        })
    }
}

impl OptimizedSchedule {
    /// Summary including players who only ever had byes
    pub fn summary(&self) -> Result<ScheduleSummary> {
        let mut summary = summarize(&self.schedule)?;
        for &player in self.byes.iter().flatten() {
            summary.partner_duplicates.entry(player).or_insert(0);
            summary.opponent_duplicates.entry(player).or_insert(0);
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DuplicateScore;

    fn two_round_schedule() -> Vec<Vec<Vec<usize>>> {
        vec![
            vec![vec![1, 2, 3, 4], vec![5, 6, 7, 8]],
            vec![vec![2, 1, 4, 3], vec![6, 7, 5, 8]],
        ]
    }

    #[test]
    fn test_per_player_duplicates() {
        let summary = summarize(&two_round_schedule()).unwrap();

        let expected_opponents: BTreeMap<usize, usize> =
            [(1, 2), (2, 2), (3, 2), (4, 2), (5, 1), (6, 1), (7, 1), (8, 1)].into_iter().collect();
        let expected_partners: BTreeMap<usize, usize> =
            [(1, 1), (2, 1), (3, 1), (4, 1), (5, 0), (6, 0), (7, 0), (8, 0)].into_iter().collect();

        assert_eq!(summary.opponent_duplicates, expected_opponents);
        assert_eq!(summary.partner_duplicates, expected_partners);
    }

    #[test]
    fn test_histograms() {
        let summary = summarize(&two_round_schedule()).unwrap();
        // partners: (1,2) and (3,4) twice, four pairs once
        assert_eq!(summary.partner_histogram, BTreeMap::from([(1, 4), (2, 2)]));
        assert_eq!(summary.opponent_histogram, BTreeMap::from([(1, 4), (2, 6)]));
    }

    #[test]
    fn test_pairing_table_both_sides() {
        let summary = summarize(&two_round_schedule()).unwrap();
        assert_eq!(summary.partners.len(), 12);
        assert!(summary.partners.contains(&PairingRecord { player: 1, other: 2, times: 2 }));
        assert!(summary.partners.contains(&PairingRecord { player: 2, other: 1, times: 2 }));
        assert!(summary.opponents.contains(&PairingRecord { player: 8, other: 6, times: 2 }));
    }

    #[test]
    fn test_named_summary() {
        let names: Vec<String> = ["Joe", "Tom", "Steve", "Bill"].iter().map(|s| s.to_string()).collect();
        let schedule = vec![vec![vec![0, 1, 2, 3]], vec![vec![1, 0, 3, 2]]];
        let named = summarize(&schedule).unwrap().named(&names).unwrap();
        assert_eq!(named.partner_duplicates["Joe"], 1);
        assert_eq!(named.opponent_duplicates["Bill"], 2);

        let short = &names[..2];
        assert!(matches!(
            summarize(&schedule).unwrap().named(short),
            Err(SchedulerError::InvalidPlayerNames(_))
        ));
    }

    #[test]
    fn test_summary_includes_bye_players() {
        let optimal = OptimizedSchedule::from_candidate(
            &[vec![0, 1, 2, 3], vec![4, 1, 2, 3]],
            4,
            DuplicateScore::default(),
            vec![vec![4], vec![0]],
        )
        .unwrap();
        let summary = optimal.summary().unwrap();
        assert_eq!(summary.partner_duplicates.len(), 5);
        assert_eq!(summary.partner_duplicates[&2], 1);
        assert_eq!(summary.partner_duplicates[&0], 0);
    }

    #[test]
    fn test_uneven_matches_rejected() {
        let schedule = vec![vec![vec![0, 1, 2, 3], vec![4, 5]]];
        assert!(matches!(
            summarize(&schedule),
            Err(SchedulerError::InvariantViolation(_))
        ));
    }
}
