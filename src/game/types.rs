use chrono::{DateTime, Utc};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use uuid::Uuid;

use crate::game::words::{Category, Difficulty};

/// Game phases, in play order. `Result` loops back to `Reveal` while rounds
/// remain, then advances to `Scores`; `Scores` can loop back to `Lobby`
/// (play again) or advance to the terminal `Ended`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Lobby,
    Reveal,
    Discuss,
    Vote,
    Result,
    Scores,
    Ended,
}

/// A ballot entry: either a concrete player or the skip sentinel.
/// On the wire this is the player's uuid string or the literal `"skip"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteTarget {
    Player(Uuid),
    Skip,
}

impl VoteTarget {
    pub fn player_id(&self) -> Option<Uuid> {
        match self {
            VoteTarget::Player(id) => Some(*id),
            VoteTarget::Skip => None,
        }
    }
}

impl Serialize for VoteTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            VoteTarget::Player(id) => serializer.collect_str(id),
            VoteTarget::Skip => serializer.serialize_str("skip"),
        }
    }
}

impl<'de> Deserialize<'de> for VoteTarget {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == "skip" {
            return Ok(VoteTarget::Skip);
        }
        raw.parse::<Uuid>()
            .map(VoteTarget::Player)
            .map_err(|_| D::Error::custom(format!("expected player uuid or \"skip\", got '{raw}'")))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    pub score: i32,
    pub is_ready: bool,
    pub has_voted: bool,
    pub is_host: bool,
    pub voted_for: Option<VoteTarget>,
    // Reserved by the data model; never set by any action.
    pub is_eliminated: bool,
}

impl Player {
    pub fn new(id: Uuid, name: impl Into<String>, is_host: bool) -> Self {
        Player {
            id,
            name: name.into(),
            score: 0,
            is_ready: false,
            has_voted: false,
            is_host,
            voted_for: None,
            is_eliminated: false,
        }
    }
}

/// Immutable after game creation.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    pub category: Category,
    pub difficulty: Difficulty,
    pub num_imposters: usize,
    pub total_rounds: u32,
    pub timer_mode: bool,
    /// Discussion timer length in seconds.
    pub timer_duration: u64,
    pub min_players: usize,
}

/// One entry per completed vote, append-only.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RoundRecord {
    pub round: u32,
    pub word: String,
    pub category: String,
    pub imposters: Vec<Uuid>,
    pub voted_out: VoteTarget,
    pub was_correct: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: Uuid,
    pub room_code: String,
    pub host_id: Uuid,
    pub phase: Phase,
    pub settings: GameSettings,
    pub current_round: u32,
    pub word: String,
    pub category: String,
    pub imposters: Vec<Uuid>,
    pub imposter_hint: String,
    /// voter id -> target, cleared at the start of each voting round.
    pub votes: HashMap<Uuid, VoteTarget>,
    pub round_history: Vec<RoundRecord>,
    /// Transient display fields from the most recent tally.
    pub last_voted_out: Option<VoteTarget>,
    pub last_was_skip: bool,
    pub timer_start: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Game {
    pub fn new(id: Uuid, room_code: String, host_id: Uuid, settings: GameSettings) -> Self {
        Game {
            id,
            room_code,
            host_id,
            phase: Phase::Lobby,
            settings,
            current_round: 1,
            word: String::new(),
            category: String::new(),
            imposters: Vec::new(),
            imposter_hint: String::new(),
            votes: HashMap::new(),
            round_history: Vec::new(),
            last_voted_out: None,
            last_was_skip: false,
            timer_start: None,
            created_at: Utc::now(),
        }
    }
}

/// The full-state snapshot pushed to every subscriber on each change and
/// immediately on subscription. Players are listed in join order.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GameSnapshot {
    pub game: Game,
    pub players: Vec<Player>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_target_round_trips_as_uuid_or_skip() {
        let id = Uuid::new_v4();
        let json = serde_json::to_string(&VoteTarget::Player(id)).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        assert_eq!(
            serde_json::from_str::<VoteTarget>(&json).unwrap(),
            VoteTarget::Player(id)
        );

        assert_eq!(
            serde_json::to_string(&VoteTarget::Skip).unwrap(),
            "\"skip\""
        );
        assert_eq!(
            serde_json::from_str::<VoteTarget>("\"skip\"").unwrap(),
            VoteTarget::Skip
        );
        assert!(serde_json::from_str::<VoteTarget>("\"not-a-uuid\"").is_err());
    }

    #[test]
    fn phase_uses_lowercase_wire_names() {
        assert_eq!(serde_json::to_string(&Phase::Lobby).unwrap(), "\"lobby\"");
        assert_eq!(
            serde_json::from_str::<Phase>("\"scores\"").unwrap(),
            Phase::Scores
        );
    }

    #[test]
    fn new_player_has_default_round_state() {
        let p = Player::new(Uuid::new_v4(), "Alice", true);
        assert_eq!(p.score, 0);
        assert!(p.is_host);
        assert!(!p.is_ready && !p.has_voted && !p.is_eliminated);
        assert!(p.voted_for.is_none());
    }
}
