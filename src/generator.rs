use crate::byes::{compute_byes, court_capacity};
use crate::error::{ensure_invariant, Result, SchedulerError};
use crate::types::{Candidate, Round};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Players not sitting out, in ascending order
pub fn active_players(n_players: usize, byes: &[usize]) -> Round {
    let sitting: HashSet<usize> = byes.iter().copied().collect();
    (0..n_players).filter(|p| !sitting.contains(p)).collect()
}

/// Unshuffled active roster for each round: the full pool minus that round's byes
pub fn base_rounds(
    n_players: usize,
    n_rounds: usize,
    n_courts: usize,
    players_per_court: usize,
) -> Result<Vec<Round>> {
    let byes = compute_byes(n_players, n_courts, n_rounds, players_per_court)?;
    let on_court = court_capacity(n_courts, players_per_court)?;

    let mut rounds = Vec::with_capacity(n_rounds);
    for (idx, round_byes) in byes.iter().enumerate() {
        let active = active_players(n_players, round_byes);
        ensure_invariant!(
            active.len() == on_court,
            "round {} has {} active players but {} courts of {} need {}",
            idx,
            active.len(),
            n_courts,
            players_per_court,
            on_court
        );
        rounds.push(active);
    }
    Ok(rounds)
}

/// Shuffle every row independently in place; rows keep their position in the batch
pub fn shuffle_along<R: Rng + ?Sized>(rows: &mut [Vec<usize>], rng: &mut R) {
    for row in rows.iter_mut() {
        row.shuffle(rng);
    }
}

/// Create `iterations` candidate schedules, each `[round][slot]`.
///
/// Byes are fixed per round, so every candidate has the same players on court in a
/// given round; only their assignment to match and team slots differs.
pub fn create_schedules<R: Rng + ?Sized>(
    n_players: usize,
    n_rounds: usize,
    n_courts: usize,
    iterations: usize,
    players_per_court: usize,
    rng: &mut R,
) -> Result<Vec<Candidate>> {
    ensure_invariant!(n_rounds > 0, "cannot build schedules with zero rounds");
    let base = base_rounds(n_players, n_rounds, n_courts, players_per_court)?;

    // (iterations * n_rounds) rows, shuffled row by row, then regrouped per iteration
    let total_rows = iterations.checked_mul(n_rounds).ok_or_else(|| {
        SchedulerError::Configuration(format!(
            "{} iterations of {} rounds is too many to generate",
            iterations, n_rounds
        ))
    })?;
    let mut rows: Vec<Round> = Vec::with_capacity(total_rows);
    for _ in 0..iterations {
        rows.extend(base.iter().cloned());
    }
    shuffle_along(&mut rows, rng);

    let mut candidates = Vec::with_capacity(iterations);
    let mut rows = rows.into_iter();
    for _ in 0..iterations {
        let candidate: Candidate = rows.by_ref().take(n_rounds).collect();
        ensure_invariant!(
            candidate.len() == n_rounds,
            "candidate has {} rounds, expected {}",
            candidate.len(),
            n_rounds
        );
        candidates.push(candidate);
    }
    Ok(candidates)
}
