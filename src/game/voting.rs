use std::collections::HashMap;
use uuid::Uuid;

use crate::game::types::{Player, VoteTarget};

#[derive(Debug, Clone, PartialEq)]
pub struct TallyResult {
    pub voted_out: VoteTarget,
    pub vote_counts: HashMap<Uuid, usize>,
    pub was_skip: bool,
}

/// Tallies a completed ballot. Only votes actually cast are counted; the
/// roster supplies the canonical candidate order (join order) so the
/// tie-break is deterministic.
///
/// Skip wins iff skip votes strictly exceed half of all votes cast.
/// Otherwise the target with the strictly highest count wins; on a tie the
/// first target in join order with the maximum wins. No non-skip votes at
/// all defaults to skip.
pub fn tally_votes(votes: &HashMap<Uuid, VoteTarget>, roster: &[Player]) -> TallyResult {
    let mut counts: HashMap<Uuid, usize> = HashMap::new();
    let mut skip_count = 0usize;

    for target in votes.values() {
        match target {
            VoteTarget::Skip => skip_count += 1,
            VoteTarget::Player(id) => *counts.entry(*id).or_insert(0) += 1,
        }
    }

    let total_votes = votes.len();
    if skip_count * 2 > total_votes {
        return TallyResult {
            voted_out: VoteTarget::Skip,
            vote_counts: counts,
            was_skip: true,
        };
    }

    let mut max_votes = 0usize;
    let mut voted_out = VoteTarget::Skip;
    for player in roster {
        if let Some(&count) = counts.get(&player.id)
            && count > max_votes
        {
            max_votes = count;
            voted_out = VoteTarget::Player(player.id);
        }
    }

    TallyResult {
        voted_out,
        vote_counts: counts,
        was_skip: voted_out == VoteTarget::Skip,
    }
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
    fn plurality_target_wins_when_skip_is_not_majority() {
        let roster = roster(3);
        let x = roster[2].id;
        let mut votes = HashMap::new();
        votes.insert(roster[0].id, VoteTarget::Player(x));
        votes.insert(roster[1].id, VoteTarget::Player(x));
        votes.insert(roster[2].id, VoteTarget::Skip);

        let result = tally_votes(&votes, &roster);
        assert_eq!(result.voted_out, VoteTarget::Player(x));
        assert_eq!(result.vote_counts[&x], 2);
        assert!(!result.was_skip);
    }

    #[test]
    fn strict_skip_majority_eliminates_nobody() {
        let roster = roster(3);
        let x = roster[0].id;
        let mut votes = HashMap::new();
        votes.insert(roster[0].id, VoteTarget::Skip);
        votes.insert(roster[1].id, VoteTarget::Skip);
        votes.insert(roster[2].id, VoteTarget::Player(x));

        let result = tally_votes(&votes, &roster);
        assert_eq!(result.voted_out, VoteTarget::Skip);
        assert!(result.was_skip);
        assert_eq!(result.vote_counts[&x], 1);
    }

    #[test]
    fn exactly_half_skips_is_not_a_skip_majority() {
        let roster = roster(4);
        let x = roster[1].id;
        let mut votes = HashMap::new();
        votes.insert(roster[0].id, VoteTarget::Skip);
        votes.insert(roster[1].id, VoteTarget::Skip);
        votes.insert(roster[2].id, VoteTarget::Player(x));
        votes.insert(roster[3].id, VoteTarget::Player(x));

        let result = tally_votes(&votes, &roster);
        assert_eq!(result.voted_out, VoteTarget::Player(x));
        assert!(!result.was_skip);
    }

    #[test]
    fn tie_break_picks_earliest_joined_target() {
        let roster = roster(4);
        let (a, b) = (roster[0].id, roster[1].id);
        let mut votes = HashMap::new();
        votes.insert(roster[0].id, VoteTarget::Player(b));
        votes.insert(roster[1].id, VoteTarget::Player(a));
        votes.insert(roster[2].id, VoteTarget::Player(a));
        votes.insert(roster[3].id, VoteTarget::Player(b));

        for _ in 0..10 {
            let result = tally_votes(&votes, &roster);
            assert_eq!(result.voted_out, VoteTarget::Player(a));
        }
    }

    #[test]
    fn all_skip_votes_default_to_skip() {
        let roster = roster(2);
        let mut votes = HashMap::new();
        votes.insert(roster[0].id, VoteTarget::Skip);
        votes.insert(roster[1].id, VoteTarget::Skip);

        let result = tally_votes(&votes, &roster);
        assert_eq!(result.voted_out, VoteTarget::Skip);
        assert!(result.was_skip);
        assert!(result.vote_counts.is_empty());
    }

    #[test]
    fn empty_ballot_defaults_to_skip() {
        let roster = roster(3);
        let result = tally_votes(&HashMap::new(), &roster);
        assert_eq!(result.voted_out, VoteTarget::Skip);
        assert!(result.was_skip);
    }
}
