use rand::seq::SliceRandom;
use rand::thread_rng;
use uuid::Uuid;

use crate::game::types::GameSettings;
use crate::game::words::{imposter_hint, pick_word};

/// Everything a new round needs: the secret word, its category label,
/// a fresh imposter set and the imposters' flavor hint.
#[derive(Debug, Clone)]
pub struct RoundSetup {
    pub word: String,
    pub category: String,
    pub imposters: Vec<Uuid>,
    pub imposter_hint: String,
}

/// Uniformly shuffles the roster and takes the first `num_imposters` ids.
/// Imposters are re-drawn from scratch every round.
pub fn assign_imposters(player_ids: &[Uuid], num_imposters: usize) -> Vec<Uuid> {
    let mut shuffled = player_ids.to_vec();
    shuffled.shuffle(&mut thread_rng());
    shuffled.truncate(num_imposters.min(player_ids.len()));
    shuffled
}

pub fn build_round(settings: &GameSettings, player_ids: &[Uuid]) -> RoundSetup {
    let picked = pick_word(settings.category, settings.difficulty);
    let imposters = assign_imposters(player_ids, settings.num_imposters);
    let hint = imposter_hint(&picked.category);
    RoundSetup {
        word: picked.word,
        category: picked.category,
        imposters,
        imposter_hint: hint,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::words::{Category, Difficulty};
    use std::collections::HashSet;

    fn test_settings(num_imposters: usize) -> GameSettings {
        GameSettings {
            category: Category::Transport,
            difficulty: Difficulty::Easy,
            num_imposters,
            total_rounds: 3,
            timer_mode: true,
            timer_duration: 120,
            min_players: 3,
        }
    }

    #[test]
    fn imposter_set_has_exactly_k_distinct_roster_members() {
        let roster: Vec<Uuid> = (0..6).map(|_| Uuid::new_v4()).collect();
        for k in 1..roster.len() {
            for _ in 0..25 {
                let imposters = assign_imposters(&roster, k);
                assert_eq!(imposters.len(), k);
                let distinct: HashSet<_> = imposters.iter().collect();
                assert_eq!(distinct.len(), k);
                assert!(imposters.iter().all(|id| roster.contains(id)));
            }
        }
    }

    #[test]
    fn oversized_imposter_count_is_capped_at_roster_size() {
        let roster: Vec<Uuid> = (0..2).map(|_| Uuid::new_v4()).collect();
        let imposters = assign_imposters(&roster, 10);
        assert_eq!(imposters.len(), 2);
    }

    #[test]
    fn build_round_produces_word_hint_and_imposters() {
        let roster: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let setup = build_round(&test_settings(2), &roster);
        assert!(!setup.word.is_empty());
        assert_eq!(setup.category, "Transport");
        assert!(!setup.imposter_hint.is_empty());
        assert_eq!(setup.imposters.len(), 2);
        assert!(setup.imposters.iter().all(|id| roster.contains(id)));
    }
}
