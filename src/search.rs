use crate::error::Result;
use crate::scheduler::Scheduler;
use crate::types::*;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;

/// `(n_players, n_rounds, n_courts)`, the key a caching layer stores results under
pub type ScheduleKey = (usize, usize, usize);

/// Parameter sweep configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Player counts to try (half-open)
    pub n_players: Range<usize>,
    pub n_rounds: Range<usize>,
    pub n_courts: Range<usize>,
    pub players_per_court: usize,
    /// Candidates per optimization
    pub iterations: usize,
    /// Master seed; each run draws its own seed from it
    pub seed: Option<u64>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            n_players: 9..26,
            n_rounds: 4..13,
            n_courts: 2..9,
            players_per_court: DEFAULT_PLAYERS_PER_COURT,
            iterations: DEFAULT_ITERATIONS,
            seed: None,
        }
    }
}

fn master_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Optimize every feasible `(n_players, n_rounds, n_courts)` combination.
///
/// Keys already present in `results` are left alone so earlier runs can be reused.
/// Combinations needing more courts than the players can fill are skipped; a
/// combination that fails to optimize is logged and skipped. Returns the number of
/// schedules added.
pub fn generate_optimals(
    sweep: &SweepConfig,
    results: &mut BTreeMap<ScheduleKey, OptimizedSchedule>,
) -> usize {
    let mut rng = master_rng(sweep.seed);
    let mut added = 0;

    for n_players in sweep.n_players.clone() {
        for n_rounds in sweep.n_rounds.clone() {
            for n_courts in sweep.n_courts.clone() {
                let key = (n_players, n_rounds, n_courts);
                if results.contains_key(&key) {
                    continue;
                }
                if n_players / sweep.players_per_court.max(1) < n_courts {
                    continue;
                }

                info!("starting {}-{}-{}", n_players, n_rounds, n_courts);
                let config = SchedulerConfig::new(n_rounds, n_courts)
                    .with_players(n_players)
                    .with_players_per_court(sweep.players_per_court)
                    .with_iterations(sweep.iterations)
                    .with_seed(rng.gen());

                match Scheduler::new(config).and_then(|mut s| s.optimize_schedule()) {
                    Ok(optimal) => {
                        results.insert(key, optimal);
                        added += 1;
                    }
                    Err(e) => warn!("skipping {}-{}-{}: {}", n_players, n_rounds, n_courts, e),
                }
            }
        }
    }

    added
}

/// Outcome of one trial in `optimization_trials`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub trial: usize,
    pub partner_dupcount: usize,
    pub opponent_dupcount: usize,
    /// Occurrence count -> number of partner pairs seen that many times
    pub partner_histogram: BTreeMap<usize, usize>,
    pub opponent_histogram: BTreeMap<usize, usize>,
}

/// One row of the long-format trial table
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialCount {
    pub trial: usize,
    pub count_type: String,
    pub count_value: usize,
    pub count_count: usize,
}

impl TrialResult {
    /// Long-format rows: one per (histogram, occurrence level)
    pub fn rows(&self) -> Vec<TrialCount> {
        let row = |count_type: &str, (&value, &count): (&usize, &usize)| TrialCount {
            trial: self.trial,
            count_type: count_type.to_string(),
            count_value: value,
            count_count: count,
        };
        self.partner_histogram
            .iter()
            .map(|entry| row("partner", entry))
            .chain(self.opponent_histogram.iter().map(|entry| row("opponent", entry)))
            .collect()
    }
}

/// Repeat an optimization `trials` times to see how stable its outcome is
pub fn optimization_trials(base: &SchedulerConfig, trials: usize) -> Result<Vec<TrialResult>> {
    let mut rng = master_rng(base.seed);
    let mut results = Vec::with_capacity(trials);

    for trial in 1..=trials {
        let config = base.clone().with_seed(rng.gen());
        let optimal = Scheduler::new(config)?.optimize_schedule()?;
        let summary = optimal.summary()?;

        results.push(TrialResult {
            trial,
            partner_dupcount: optimal.partner_dupcount,
            opponent_dupcount: optimal.opponent_dupcount,
            partner_histogram: summary.partner_histogram,
            opponent_histogram: summary.opponent_histogram,
        });
    }

    Ok(results)
}
