use std::collections::HashMap;
use uuid::Uuid;

use crate::game::types::{Player, VoteTarget};

const SURVIVED_SKIP_BONUS: i32 = 100;
const CREW_CATCH_BONUS: i32 = 100;
const SURVIVED_WRONG_VOTE_BONUS: i32 = 150;

/// Computes per-player score deltas for a completed vote. Every roster
/// member gets an entry (zero if unaffected). The caller applies the
/// deltas; this never reads or mutates scores.
///
/// - skip result: each imposter +100
/// - imposter caught: each non-imposter +100
/// - wrong elimination: each imposter +150, the eliminated player +0
pub fn score_deltas(
    roster: &[Player],
    imposters: &[Uuid],
    voted_out: VoteTarget,
    was_skip: bool,
) -> HashMap<Uuid, i32> {
    let mut deltas: HashMap<Uuid, i32> = roster.iter().map(|p| (p.id, 0)).collect();

    if was_skip {
        for id in imposters {
            *deltas.entry(*id).or_insert(0) += SURVIVED_SKIP_BONUS;
        }
        return deltas;
    }

    let caught = voted_out
        .player_id()
        .is_some_and(|id| imposters.contains(&id));

    if caught {
        for player in roster {
            if !imposters.contains(&player.id) {
                *deltas.entry(player.id).or_insert(0) += CREW_CATCH_BONUS;
            }
        }
    } else {
        for id in imposters {
            *deltas.entry(*id).or_insert(0) += SURVIVED_WRONG_VOTE_BONUS;
        }
        // The wrongly eliminated player keeps a zero delta: no penalty.
    }

    deltas
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(n: usize) -> Vec<Player> {
        (0..n)
            .map(|i| Player::new(Uuid::new_v4(), format!("p{i}"), i == 0))
            .collect()
    }

    #[test]
    fn skip_result_rewards_only_imposters() {
        let roster = roster(4);
        let imposter = roster[2].id;
        let deltas = score_deltas(&roster, &[imposter], VoteTarget::Skip, true);

        assert_eq!(deltas[&imposter], 100);
        for p in &roster {
            if p.id != imposter {
                assert_eq!(deltas[&p.id], 0);
            }
        }
    }

    #[test]
    fn caught_imposter_rewards_every_crewmate() {
        let roster = roster(4);
        let imposter = roster[1].id;
        let deltas = score_deltas(&roster, &[imposter], VoteTarget::Player(imposter), false);

        assert_eq!(deltas[&imposter], 0);
        for p in &roster {
            if p.id != imposter {
                assert_eq!(deltas[&p.id], 100);
            }
        }
    }

    #[test]
    fn wrong_elimination_rewards_imposters_and_spares_the_victim() {
        let roster = roster(4);
        let imposter = roster[0].id;
        let victim = roster[3].id;
        let deltas = score_deltas(&roster, &[imposter], VoteTarget::Player(victim), false);

        assert_eq!(deltas[&imposter], 150);
        assert_eq!(deltas[&victim], 0);
        assert_eq!(deltas[&roster[1].id], 0);
        assert_eq!(deltas[&roster[2].id], 0);
    }

    #[test]
    fn multiple_imposters_each_get_the_bonus() {
        let roster = roster(5);
        let imposters = vec![roster[1].id, roster[3].id];
        let deltas = score_deltas(&roster, &imposters, VoteTarget::Skip, true);

        assert_eq!(deltas[&imposters[0]], 100);
        assert_eq!(deltas[&imposters[1]], 100);

        let deltas = score_deltas(&roster, &imposters, VoteTarget::Player(roster[0].id), false);
        assert_eq!(deltas[&imposters[0]], 150);
        assert_eq!(deltas[&imposters[1]], 150);
        assert_eq!(deltas[&roster[0].id], 0);
    }

    #[test]
    fn every_roster_member_has_a_delta_entry() {
        let roster = roster(3);
        let deltas = score_deltas(&roster, &[roster[0].id], VoteTarget::Skip, true);
        assert_eq!(deltas.len(), roster.len());
    }
}
