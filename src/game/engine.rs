use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::game::messages::GameAction;
use crate::game::rounds::build_round;
use crate::game::scoring::score_deltas;
use crate::game::types::{Game, GameSettings, Phase, Player, RoundRecord, VoteTarget};
use crate::game::voting::tally_votes;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("room {0} not found")]
    RoomNotFound(Uuid),
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error("room manager unavailable: {0}")]
    Manager(String),
}

/// Checked once, at game creation. Settings are immutable afterwards.
pub fn validate_settings(settings: &GameSettings) -> Result<(), GameError> {
    if settings.num_imposters < 1 {
        return Err(GameError::InvalidSettings(
            "numImposters must be at least 1".into(),
        ));
    }
    if settings.min_players < 2 {
        return Err(GameError::InvalidSettings(
            "minPlayers must be at least 2".into(),
        ));
    }
    if settings.num_imposters >= settings.min_players {
        return Err(GameError::InvalidSettings(
            "numImposters must be smaller than minPlayers".into(),
        ));
    }
    if settings.total_rounds < 1 {
        return Err(GameError::InvalidSettings(
            "totalRounds must be at least 1".into(),
        ));
    }
    if settings.timer_duration == 0 {
        return Err(GameError::InvalidSettings(
            "timerDuration must be positive".into(),
        ));
    }
    Ok(())
}

/// The authoritative state of one room: the game record plus its roster in
/// join order. All mutation goes through [`GameRoom::apply`]; the room
/// actor serializes calls, which makes each action atomic per room.
#[derive(Debug, Clone)]
pub struct GameRoom {
    pub game: Game,
    pub players: Vec<Player>,
}

impl GameRoom {
    pub fn new(game: Game, host: Player) -> Self {
        GameRoom {
            game,
            players: vec![host],
        }
    }

    /// Applies one action and returns the phase afterwards. Infallible by
    /// design: actions referencing unknown players are silently ignored
    /// and no action is rejected based on the current phase (callers are
    /// expected to stop sending actions after `ended`).
    pub fn apply(&mut self, action: GameAction) -> Phase {
        match action {
            GameAction::Join {
                player_id,
                player_name,
            } => self.join(player_id, player_name),
            GameAction::Start => self.start_round(1),
            GameAction::Ready { player_id } => self.ready(player_id),
            GameAction::StartVoting => self.start_voting(),
            GameAction::Vote {
                player_id,
                target_id,
            } => self.vote(player_id, target_id),
            GameAction::NextRound => self.next_round(),
            GameAction::PlayAgain => self.play_again(),
            GameAction::EndGame => self.game.phase = Phase::Ended,
        }
        self.game.phase
    }

    fn join(&mut self, player_id: Uuid, player_name: String) {
        // Re-delivered joins must not duplicate the roster entry.
        if self.players.iter().any(|p| p.id == player_id) {
            tracing::debug!(player.id = %player_id, "Ignoring duplicate join");
            return;
        }
        self.players.push(Player::new(player_id, player_name, false));
    }

    /// Builds round `round` and moves to `reveal`. Used by both `start`
    /// (round 1) and `nextRound`.
    fn start_round(&mut self, round: u32) {
        let player_ids: Vec<Uuid> = self.players.iter().map(|p| p.id).collect();
        let setup = build_round(&self.game.settings, &player_ids);

        for player in &mut self.players {
            player.is_ready = false;
            player.has_voted = false;
            player.voted_for = None;
        }

        self.game.word = setup.word;
        self.game.category = setup.category;
        self.game.imposters = setup.imposters;
        self.game.imposter_hint = setup.imposter_hint;
        self.game.current_round = round;
        self.game.votes.clear();
        self.game.timer_start = None;
        self.game.phase = Phase::Reveal;
    }

    fn ready(&mut self, player_id: Uuid) {
        if let Some(player) = self.players.iter_mut().find(|p| p.id == player_id) {
            player.is_ready = true;
        }
        // The all-ready guard is re-evaluated from current flags, never a
        // counter, so re-delivered readies cannot double-trigger it.
        if self.players.iter().all(|p| p.is_ready) {
            self.game.phase = Phase::Discuss;
            self.game.timer_start = Some(Utc::now());
        }
    }

    fn start_voting(&mut self) {
        for player in &mut self.players {
            player.has_voted = false;
            player.voted_for = None;
        }
        self.game.votes.clear();
        self.game.phase = Phase::Vote;
    }

    fn vote(&mut self, player_id: Uuid, target_id: VoteTarget) {
        if let Some(player) = self.players.iter_mut().find(|p| p.id == player_id) {
            // Last vote wins; re-votes overwrite both records.
            player.has_voted = true;
            player.voted_for = Some(target_id);
            self.game.votes.insert(player_id, target_id);
        }

        if self.players.iter().all(|p| p.has_voted) {
            self.finish_vote();
        }
    }

    /// All votes are in: tally, apply score deltas, append history, move
    /// to `result`.
    fn finish_vote(&mut self) {
        let tally = tally_votes(&self.game.votes, &self.players);
        let deltas = score_deltas(
            &self.players,
            &self.game.imposters,
            tally.voted_out,
            tally.was_skip,
        );
        for player in &mut self.players {
            player.score += deltas.get(&player.id).copied().unwrap_or(0);
        }

        let was_correct = tally
            .voted_out
            .player_id()
            .is_some_and(|id| self.game.imposters.contains(&id));
        self.game.round_history.push(RoundRecord {
            round: self.game.current_round,
            word: self.game.word.clone(),
            category: self.game.category.clone(),
            imposters: self.game.imposters.clone(),
            voted_out: tally.voted_out,
            was_correct,
        });

        self.game.last_voted_out = Some(tally.voted_out);
        self.game.last_was_skip = tally.was_skip;
        self.game.phase = Phase::Result;
    }

    fn next_round(&mut self) {
        if self.game.current_round >= self.game.settings.total_rounds {
            self.game.phase = Phase::Scores;
        } else {
            self.start_round(self.game.current_round + 1);
        }
    }

    fn play_again(&mut self) {
        for player in &mut self.players {
            player.score = 0;
            player.is_ready = false;
            player.has_voted = false;
            player.voted_for = None;
        }
        self.game.current_round = 1;
        self.game.word.clear();
        self.game.category.clear();
        self.game.imposters.clear();
        self.game.imposter_hint.clear();
        self.game.votes.clear();
        self.game.round_history.clear();
        self.game.last_voted_out = None;
        self.game.last_was_skip = false;
        self.game.timer_start = None;
        self.game.phase = Phase::Lobby;
    }
}
