use crate::byes::court_capacity;
use crate::error::{Result, SchedulerError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Active players for one round, `n_courts * players_per_court` long.
/// Consecutive `players_per_court` slices are matches.
pub type Round = Vec<usize>;

/// One complete schedule drawn during a single optimization call
pub type Candidate = Vec<Round>;

pub const DEFAULT_PLAYERS_PER_COURT: usize = 4;
pub const DEFAULT_ITERATIONS: usize = 500;

fn default_players_per_court() -> usize {
    DEFAULT_PLAYERS_PER_COURT
}

fn default_iterations() -> usize {
    DEFAULT_ITERATIONS
}

/// How candidates are ranked on the primary (partner) criterion
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum ScoringFunction {
    /// Minimize raw duplicate partner count
    #[default]
    Naive,
    /// Minimize the occurrence histogram weighted by `w(k)`; `None` uses `1 + 0.1k`
    Weighted {
        #[serde(default)]
        weights: Option<Vec<f64>>,
    },
}

/// Scheduler configuration parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Number of players, ignored when `player_names` is present
    #[serde(default)]
    pub n_players: Option<usize>,
    /// Display names, index-aligned with player ids
    #[serde(default)]
    pub player_names: Option<Vec<String>>,
    pub n_rounds: usize,
    pub n_courts: usize,
    #[serde(default = "default_players_per_court")]
    pub players_per_court: usize,
    /// Number of candidate schedules to draw the optimum from
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    #[serde(default)]
    pub scoring: ScoringFunction,
    /// RNG seed; `None` seeds from entropy
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SchedulerConfig {
    pub fn new(n_rounds: usize, n_courts: usize) -> Self {
        Self {
            n_players: None,
            player_names: None,
            n_rounds,
            n_courts,
            players_per_court: DEFAULT_PLAYERS_PER_COURT,
            iterations: DEFAULT_ITERATIONS,
            scoring: ScoringFunction::Naive,
            seed: None,
        }
    }

    pub fn with_players(mut self, n_players: usize) -> Self {
        self.n_players = Some(n_players);
        self
    }

    pub fn with_player_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.player_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_players_per_court(mut self, players_per_court: usize) -> Self {
        self.players_per_court = players_per_court;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_scoring(mut self, scoring: ScoringFunction) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parse a JSON config, rejecting `player_names` values that are not arrays
    /// before typed deserialization gets a chance to produce a vaguer message.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if let Some(names) = value.get("player_names") {
            if !names.is_array() && !names.is_null() {
                return Err(SchedulerError::InvalidPlayerNames(names.to_string()));
            }
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Resolve the player count: names take precedence over an explicit count
    pub fn player_count(&self) -> Result<usize> {
        match (&self.player_names, self.n_players) {
            (Some(names), _) => Ok(names.len()),
            (None, Some(n)) => Ok(n),
            (None, None) => Err(SchedulerError::MissingPlayers),
        }
    }

    /// Players on court in one round
    pub fn active_per_round(&self) -> Result<usize> {
        court_capacity(self.n_courts, self.players_per_court)
    }
}

/// Duplicate partner and opponent counts of one schedule
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DuplicateScore {
    pub partner_dupcount: usize,
    pub opponent_dupcount: usize,
}

/// The selected schedule returned by an optimization call
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizedSchedule {
    /// `[round][court][slot]`; slots split into team1 and team2 by halves
    pub schedule: Vec<Vec<Vec<usize>>>,
    pub partner_dupcount: usize,
    pub opponent_dupcount: usize,
    /// Players sitting out, per round
    pub byes: Vec<Vec<usize>>,
    pub players_per_court: usize,
    /// Primary score of the winner when weighted scoring was used
    #[serde(default)]
    pub weighted_partner_score: Option<f64>,
}

impl OptimizedSchedule {
    /// Reshape a flat candidate into `[round][court][slot]`
    pub fn from_candidate(
        candidate: &[Round],
        players_per_court: usize,
        score: DuplicateScore,
        byes: Vec<Vec<usize>>,
    ) -> Result<Self> {
        let mut schedule = Vec::with_capacity(candidate.len());
        for (idx, round) in candidate.iter().enumerate() {
            if players_per_court == 0 || round.len() % players_per_court != 0 {
                return Err(SchedulerError::InvariantViolation(format!(
                    "round {} has {} players, not a multiple of {}",
                    idx,
                    round.len(),
                    players_per_court
                )));
            }
            schedule.push(round.chunks(players_per_court).map(<[usize]>::to_vec).collect());
        }

        Ok(Self {
            schedule,
            partner_dupcount: score.partner_dupcount,
            opponent_dupcount: score.opponent_dupcount,
            byes,
            players_per_court,
            weighted_partner_score: None,
        })
    }

    pub fn n_rounds(&self) -> usize {
        self.schedule.len()
    }

    pub fn n_courts(&self) -> usize {
        self.schedule.first().map(Vec::len).unwrap_or(0)
    }

    /// Number of distinct players appearing on court
    pub fn player_count(&self) -> usize {
        self.schedule
            .iter()
            .flatten()
            .flatten()
            .copied()
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn score(&self) -> DuplicateScore {
        DuplicateScore {
            partner_dupcount: self.partner_dupcount,
            opponent_dupcount: self.opponent_dupcount,
        }
    }

    /// Flatten back to one active sequence per round
    pub fn rounds(&self) -> Vec<Round> {
        self.schedule
            .iter()
            .map(|round| round.iter().flatten().copied().collect())
            .collect()
    }
}

/// Split a match into (team1, team2) by position
pub fn split_teams(game: &[usize]) -> (&[usize], &[usize]) {
    game.split_at(game.len() / 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_json_defaults() {
        let config = SchedulerConfig::from_json(r#"{"n_players": 13, "n_rounds": 5, "n_courts": 3}"#).unwrap();
        assert_eq!(config.player_count().unwrap(), 13);
        assert_eq!(config.players_per_court, DEFAULT_PLAYERS_PER_COURT);
        assert_eq!(config.iterations, DEFAULT_ITERATIONS);
        assert_eq!(config.scoring, ScoringFunction::Naive);
        assert_eq!(config.seed, None);
        assert_eq!(config.active_per_round().unwrap(), 12);
    }

    #[test]
    fn test_config_from_json_weighted() {
        let config = SchedulerConfig::from_json(
            r#"{"n_players": 9, "n_rounds": 4, "n_courts": 2, "scoring": {"mode": "weighted", "weights": [1.0, 1.0, 3.0]}}"#,
        )
        .unwrap();
        assert_eq!(
            config.scoring,
            ScoringFunction::Weighted { weights: Some(vec![1.0, 1.0, 3.0]) }
        );
    }

    #[test]
    fn test_config_rejects_scalar_player_names() {
        for json in [
            r#"{"player_names": "Joe", "n_players": 13, "n_rounds": 5, "n_courts": 3}"#,
            r#"{"player_names": 1, "n_players": 13, "n_rounds": 5, "n_courts": 3}"#,
        ] {
            assert!(matches!(
                SchedulerConfig::from_json(json),
                Err(SchedulerError::InvalidPlayerNames(_))
            ));
        }
    }

    #[test]
    fn test_player_names_take_precedence() {
        let config = SchedulerConfig::new(5, 3)
            .with_players(13)
            .with_player_names(["Olivia", "Emma", "Charlotte", "Amelia", "Ava"]);
        assert_eq!(config.player_count().unwrap(), 5);

        let config = SchedulerConfig::new(5, 5);
        assert!(matches!(config.player_count(), Err(SchedulerError::MissingPlayers)));
    }

    #[test]
    fn test_from_candidate_reshapes() {
        let candidate = vec![vec![1, 2, 3, 4, 5, 6, 7, 8], vec![2, 1, 4, 3, 6, 7, 5, 8]];
        let score = DuplicateScore { partner_dupcount: 2, opponent_dupcount: 6 };
        let sched = OptimizedSchedule::from_candidate(&candidate, 4, score, vec![vec![], vec![]]).unwrap();

        assert_eq!(sched.n_rounds(), 2);
        assert_eq!(sched.n_courts(), 2);
        assert_eq!(sched.schedule[1][1], vec![6, 7, 5, 8]);
        assert_eq!(sched.player_count(), 8);
        assert_eq!(sched.score(), score);
        assert_eq!(sched.rounds(), candidate);
    }

    #[test]
    fn test_from_candidate_rejects_uneven_round() {
        let candidate = vec![vec![0, 1, 2, 3, 4]];
        let result = OptimizedSchedule::from_candidate(&candidate, 4, DuplicateScore::default(), vec![]);
        assert!(matches!(result, Err(SchedulerError::InvariantViolation(_))));
    }

    #[test]
    fn test_split_teams() {
        let (team1, team2) = split_teams(&[5, 6, 7, 8]);
        assert_eq!(team1, &[5, 6]);
        assert_eq!(team2, &[7, 8]);
    }
}
