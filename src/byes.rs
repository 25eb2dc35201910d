use crate::error::{Result, SchedulerError};
use log::warn;

/// How many times the player sequence is laid end to end before byes stop being
/// round-robin fair
pub const BYE_TILE_REPEATS: usize = 5;

/// Players needed to fill `n_courts` courts, or a configuration error when the
/// product does not fit in a `usize`
pub fn court_capacity(n_courts: usize, players_per_court: usize) -> Result<usize> {
    n_courts.checked_mul(players_per_court).ok_or_else(|| {
        SchedulerError::Configuration(format!(
            "{} courts of {} players is too many to schedule",
            n_courts, players_per_court
        ))
    })
}

/// Number of players sitting out each round.
///
/// When the field is less than one full court above capacity the count is taken
/// modulo 4 regardless of `players_per_court`; with four players per court both
/// branches agree, with other court sizes they may not and callers must check the
/// resulting active row length.
pub fn byes_per_round(n_players: usize, n_courts: usize, players_per_court: usize) -> Result<usize> {
    let on_court = court_capacity(n_courts, players_per_court)?;
    if on_court > n_players {
        return Err(SchedulerError::Configuration(format!(
            "{} courts of {} need {} players but only {} are available",
            n_courts, players_per_court, on_court, n_players
        )));
    }

    // one court above capacity; past usize::MAX no field reaches it
    let one_court_over = on_court.checked_add(players_per_court);
    if one_court_over.map_or(true, |limit| n_players < limit) {
        Ok(n_players % 4)
    } else {
        Ok(n_players - on_court)
    }
}

/// Calculate the byes for every round: `[round][bye]`.
///
/// Byes walk the player indices in order, so players 0, 1, 2... sit out first and
/// the sequence restarts at 0 once everyone has had one. Deterministic: the same
/// parameters always yield the same byes.
pub fn compute_byes(
    n_players: usize,
    n_courts: usize,
    n_rounds: usize,
    players_per_court: usize,
) -> Result<Vec<Vec<usize>>> {
    let per_round = byes_per_round(n_players, n_courts, players_per_court)?;
    if per_round == 0 {
        return Ok(vec![Vec::new(); n_rounds]);
    }

    let byes_needed = per_round.checked_mul(n_rounds).ok_or_else(|| {
        SchedulerError::Configuration(format!(
            "{} rounds with {} byes each is too many to schedule",
            n_rounds, per_round
        ))
    })?;
    if byes_needed > BYE_TILE_REPEATS.saturating_mul(n_players) {
        warn!(
            "{} byes needed from {} players exceeds {} passes; bye distribution will be uneven",
            byes_needed, n_players, BYE_TILE_REPEATS
        );
    }

    let flat: Vec<usize> = (0..n_players).cycle().take(byes_needed).collect();
    Ok(flat.chunks(per_round).map(<[usize]>::to_vec).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_byes_shape() {
        for n_players in 13..16 {
            let byes = compute_byes(n_players, 3, 10, 4).unwrap();
            assert_eq!(byes.len(), 10);
            for round in &byes {
                assert_eq!(round.len(), n_players - 12);
            }
        }
    }

    #[test]
    fn test_byes_round_robin_order() {
        // 13 players on 3 courts: one bye per round, handed out in index order
        let byes = compute_byes(13, 3, 10, 4).unwrap();
        let flat: Vec<usize> = byes.into_iter().flatten().collect();
        assert_eq!(flat, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_byes_cover_all_players() {
        // 15 players on 3 courts: 3 byes x 10 rounds = 30 byes, two full passes
        let byes = compute_byes(15, 3, 10, 4).unwrap();
        let seen: HashSet<usize> = byes.iter().flatten().copied().collect();
        assert_eq!(seen, (0..15).collect::<HashSet<_>>());

        let mut per_player = vec![0; 15];
        for &p in byes.iter().flatten() {
            per_player[p] += 1;
        }
        assert!(per_player.iter().all(|&c| c == 2));
    }

    #[test]
    fn test_no_byes_when_courts_full() {
        let byes = compute_byes(8, 2, 4, 4).unwrap();
        assert_eq!(byes, vec![Vec::<usize>::new(); 4]);
    }

    #[test]
    fn test_large_field() {
        // 20 players, 2 courts: 20 >= 12 so byes are 20 - 8
        assert_eq!(byes_per_round(20, 2, 4).unwrap(), 12);
        // 11 players, 2 courts: 11 < 12 so byes are 11 % 4
        assert_eq!(byes_per_round(11, 2, 4).unwrap(), 3);
    }

    #[test]
    fn test_modulus_four_with_other_court_sizes() {
        // 16 players on 2 courts of 6: 16 < 18 so the count is 16 % 4 = 0,
        // even though 4 players would be off court
        assert_eq!(byes_per_round(16, 2, 6).unwrap(), 0);
        assert_eq!(byes_per_round(15, 2, 6).unwrap(), 3);
    }

    #[test]
    fn test_too_few_players() {
        assert!(matches!(
            compute_byes(7, 2, 4, 4),
            Err(SchedulerError::Configuration(_))
        ));
    }

    #[test]
    fn test_court_count_overflow() {
        let courts = usize::MAX / 4 + 1;
        assert!(matches!(
            byes_per_round(13, courts, 4),
            Err(SchedulerError::Configuration(_))
        ));
        assert!(matches!(
            compute_byes(13, courts, 2, 4),
            Err(SchedulerError::Configuration(_))
        ));
        assert!(matches!(
            court_capacity(courts, 4),
            Err(SchedulerError::Configuration(_))
        ));
        assert_eq!(court_capacity(3, 4).unwrap(), 12);
    }

    #[test]
    fn test_round_count_overflow() {
        assert!(matches!(
            compute_byes(15, 3, usize::MAX, 4),
            Err(SchedulerError::Configuration(_))
        ));
    }

    #[test]
    fn test_byes_wrap_past_tile_bound() {
        // 9 players on 1 court: 5 byes x 20 rounds = 100 > 45
        let byes = compute_byes(9, 1, 20, 4).unwrap();
        assert_eq!(byes.len(), 20);
        for round in &byes {
            let unique: HashSet<_> = round.iter().collect();
            assert_eq!(unique.len(), round.len());
            assert!(round.iter().all(|&p| p < 9));
        }
    }
}
