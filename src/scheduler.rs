use crate::byes::{byes_per_round, compute_byes};
use crate::error::{Result, SchedulerError};
use crate::generator::create_schedules;
use crate::pairs::PairCounter;
use crate::types::*;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Check a configuration and resolve its player count
fn validate(config: &SchedulerConfig) -> Result<usize> {
    let n_players = config.player_count()?;

    if config.iterations == 0 {
        return Err(SchedulerError::Configuration(
            "iterations must be positive".to_string(),
        ));
    }
    if config.n_rounds == 0 || config.n_courts == 0 {
        return Err(SchedulerError::Configuration(format!(
            "need at least one round and one court, got {} rounds and {} courts",
            config.n_rounds, config.n_courts
        )));
    }
    let ppc = config.players_per_court;
    if ppc == 0 || ppc % 2 != 0 {
        return Err(SchedulerError::Configuration(format!(
            "players_per_court must be a positive even number, got {}",
            ppc
        )));
    }

    // Fails when the courts need more players than there are
    let byes = byes_per_round(n_players, config.n_courts, ppc)?;
    let on_court = config.active_per_round()?;
    if n_players - byes != on_court {
        return Err(SchedulerError::InvariantViolation(format!(
            "{} byes per round leaves {} players for {} slots",
            byes,
            n_players - byes,
            on_court
        )));
    }
    if config.iterations.checked_mul(config.n_rounds).is_none() {
        return Err(SchedulerError::Configuration(format!(
            "{} iterations of {} rounds is too many to generate",
            config.iterations, config.n_rounds
        )));
    }

    if let ScoringFunction::Weighted { weights: Some(weights) } = &config.scoring {
        validate_weights(weights, config.n_rounds)?;
    }

    Ok(n_players)
}

/// A pair meets at most once per round, so occurrence levels run `0..=n_rounds`
/// and the table needs a finite, non-decreasing weight for each of them
fn validate_weights(weights: &[f64], n_rounds: usize) -> Result<()> {
    if weights.len() <= n_rounds {
        return Err(SchedulerError::Configuration(format!(
            "{} rounds need {} weights, got {}",
            n_rounds,
            n_rounds + 1,
            weights.len()
        )));
    }
    if let Some(bad) = weights.iter().find(|w| !w.is_finite()) {
        return Err(SchedulerError::Configuration(format!(
            "weights must be finite, got {}",
            bad
        )));
    }
    if weights.windows(2).any(|w| w[1] < w[0]) {
        return Err(SchedulerError::Configuration(format!(
            "weights must not decrease with occurrence count, got {:?}",
            weights
        )));
    }
    Ok(())
}

fn no_candidates() -> SchedulerError {
    SchedulerError::InvariantViolation("no candidate schedules to select from".to_string())
}

/// Randomized search for the schedule with the fewest repeated pairings
pub struct Scheduler {
    config: SchedulerConfig,
    n_players: usize,
    counter: PairCounter,
    rng: StdRng,
}

impl Scheduler {
    /// Validate the configuration and seed the random source
    pub fn new(config: SchedulerConfig) -> Result<Self> {
        let n_players = validate(&config)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            counter: PairCounter::new(config.players_per_court),
            config,
            n_players,
            rng,
        })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn n_players(&self) -> usize {
        self.n_players
    }

    pub fn player_names(&self) -> Option<&[String]> {
        self.config.player_names.as_deref()
    }

    pub fn counter(&self) -> &PairCounter {
        &self.counter
    }

    /// Players sitting out, per round
    pub fn calculate_byes(&self) -> Result<Vec<Vec<usize>>> {
        compute_byes(
            self.n_players,
            self.config.n_courts,
            self.config.n_rounds,
            self.config.players_per_court,
        )
    }

    /// Draw `iterations` candidate schedules from this scheduler's random source
    pub fn create_schedules(&mut self) -> Result<Vec<Candidate>> {
        create_schedules(
            self.n_players,
            self.config.n_rounds,
            self.config.n_courts,
            self.config.iterations,
            self.config.players_per_court,
            &mut self.rng,
        )
    }

    /// Generate candidates and return the best one
    pub fn optimize_schedule(&mut self) -> Result<OptimizedSchedule> {
        let candidates = self.create_schedules()?;
        debug!(
            "generated {} candidates for {} players, {} rounds, {} courts",
            candidates.len(),
            self.n_players,
            self.config.n_rounds,
            self.config.n_courts
        );

        let optimal = self.select_optimal(&candidates)?;
        info!(
            "selected schedule with {} partner and {} opponent duplicates",
            optimal.partner_dupcount, optimal.opponent_dupcount
        );
        Ok(optimal)
    }

    /// Two-stage selection: minimize the partner score, then among the tied
    /// candidates minimize unweighted opponent duplicates, keeping the first on ties.
    pub fn select_optimal(&self, candidates: &[Candidate]) -> Result<OptimizedSchedule> {
        if candidates.is_empty() {
            return Err(no_candidates());
        }

        let (tied, weighted_min) = match &self.config.scoring {
            ScoringFunction::Naive => {
                let dupcounts = candidates
                    .iter()
                    .map(|c| self.counter.partner_dupcount(c))
                    .collect::<Result<Vec<_>>>()?;
                let min = dupcounts.iter().copied().min().unwrap_or(0);
                let tied: Vec<usize> = (0..candidates.len())
                    .filter(|&i| dupcounts[i] == min)
                    .collect();
                (tied, None)
            }
            ScoringFunction::Weighted { weights } => {
                let scores = candidates
                    .iter()
                    .map(|c| self.counter.partner_dupcount_weighted(c, weights.as_deref()))
                    .collect::<Result<Vec<_>>>()?;
                let min = scores.iter().copied().fold(f64::MAX, f64::min);
                let tied: Vec<usize> = (0..candidates.len())
                    .filter(|&i| scores[i] == min)
                    .collect();
                (tied, Some(min))
            }
        };
        debug!("{} of {} candidates share the best partner score", tied.len(), candidates.len());

        // Opponent tie-break is unweighted in both modes
        let mut best: Option<(usize, usize)> = None;
        for &idx in &tied {
            let opp = self.counter.opponent_dupcount(&candidates[idx])?;
            if best.map_or(true, |(_, best_opp)| opp < best_opp) {
                best = Some((idx, opp));
            }
        }
        let (winner, opponent_dupcount) = best.ok_or_else(no_candidates)?;

        let score = DuplicateScore {
            partner_dupcount: self.counter.partner_dupcount(&candidates[winner])?,
            opponent_dupcount,
        };
        let mut optimal = OptimizedSchedule::from_candidate(
            &candidates[winner],
            self.config.players_per_court,
            score,
            self.calculate_byes()?,
        )?;
        optimal.weighted_partner_score = weighted_min;
        Ok(optimal)
    }
}
