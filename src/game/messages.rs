use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::types::{GameSnapshot, VoteTarget};

/// The fixed action set of the room protocol, transport independent.
/// `ready` and `vote` for an unknown player are accepted and ignored.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum GameAction {
    #[serde(rename_all = "camelCase")]
    Join { player_id: Uuid, player_name: String },
    Start,
    #[serde(rename_all = "camelCase")]
    Ready { player_id: Uuid },
    StartVoting,
    #[serde(rename_all = "camelCase")]
    Vote {
        player_id: Uuid,
        target_id: VoteTarget,
    },
    NextRound,
    PlayAgain,
    EndGame,
}

impl GameAction {
    pub fn name(&self) -> &'static str {
        match self {
            GameAction::Join { .. } => "join",
            GameAction::Start => "start",
            GameAction::Ready { .. } => "ready",
            GameAction::StartVoting => "startVoting",
            GameAction::Vote { .. } => "vote",
            GameAction::NextRound => "nextRound",
            GameAction::PlayAgain => "playAgain",
            GameAction::EndGame => "endGame",
        }
    }
}

/// Messages sent from a client over the room WebSocket.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "messageType", content = "payload")]
pub enum ClientToServerMessage {
    /// Sent immediately after the WebSocket connects to subscribe to a room.
    #[serde(rename_all = "camelCase")]
    ConnectToRoom { game_id: Uuid },
    /// Explicitly leave the room and close the connection.
    LeaveRoom,
    /// A game action for the room's state machine.
    Action(GameAction),
}

/// Messages pushed from the server to room subscribers.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "messageType", content = "payload")]
pub enum ServerToClientMessage {
    /// Full-state snapshot: sent on subscribe and after every state change.
    RoomState(GameSnapshot),
    /// Acknowledges that an action was applied.
    ActionAck { action: String },
    /// Structured failure: room not found, unknown action, validation.
    SystemError { message: String },
}

impl ServerToClientMessage {
    pub fn to_ws_text(&self) -> Result<axum::extract::ws::Message, serde_json::Error> {
        serde_json::to_string(self)
            .map(|json_string| axum::extract::ws::Message::Text(json_string.into()))
    }
}

pub fn client_message_from_ws_text(text: &str) -> Result<ClientToServerMessage, serde_json::Error> {
    serde_json::from_str(text)
}
