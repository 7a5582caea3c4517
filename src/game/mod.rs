pub mod engine;
pub mod messages;
pub mod rounds;
pub mod scoring;
pub mod types;
pub mod voting;
pub mod words;

pub use engine::{GameError, GameRoom, validate_settings};
pub use messages::{ClientToServerMessage, GameAction, ServerToClientMessage};
pub use types::{Game, GameSettings, GameSnapshot, Phase, Player, VoteTarget};
