use axum::extract::ws;
use rand::Rng;
use rand::thread_rng;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration as StdDuration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use uuid::Uuid;

use crate::config::GameConfig;
use crate::game::messages::client_message_from_ws_text;
use crate::game::{
    ClientToServerMessage, Game, GameError, GameRoom, GameSettings, GameSnapshot, Phase, Player,
    ServerToClientMessage, validate_settings,
};

const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

fn generate_room_code(length: usize) -> String {
    let mut rng = thread_rng();
    (0..length)
        .map(|_| ROOM_CODE_ALPHABET[rng.gen_range(0..ROOM_CODE_ALPHABET.len())] as char)
        .collect()
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetails {
    pub game_id: Uuid,
    pub room_code: String,
    pub host_id: Uuid,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub game_id: Uuid,
    pub phase: Phase,
}

#[derive(Debug)]
pub enum RoomManagerMessage {
    CreateRoom {
        host_name: String,
        settings: GameSettings,
        respond_to: oneshot::Sender<Result<RoomDetails, GameError>>,
    },
    GetRoomHandle {
        game_id: Uuid,
        respond_to: oneshot::Sender<Option<RoomActorHandle>>,
    },
    FindRoomByCode {
        room_code: String,
        respond_to: oneshot::Sender<Option<RoomActorHandle>>,
    },
    RoomActorShutdown {
        game_id: Uuid,
    },
}

struct RoomEntry {
    handle: RoomActorHandle,
    room_code: String,
}

/// Owns the room registry and the room-code lookup index. The single
/// authoritative keyed store of spec'd room state lives behind this actor;
/// there is no ambient/global registry.
pub struct RoomManagerActor {
    receiver: mpsc::Receiver<RoomManagerMessage>,
    rooms: HashMap<Uuid, RoomEntry>,
    codes: HashMap<String, Uuid>,
    self_sender: mpsc::Sender<RoomManagerMessage>,
    game_config: GameConfig,
}

impl RoomManagerActor {
    fn new(
        receiver: mpsc::Receiver<RoomManagerMessage>,
        self_sender: mpsc::Sender<RoomManagerMessage>,
        game_config: GameConfig,
    ) -> Self {
        RoomManagerActor {
            receiver,
            rooms: HashMap::new(),
            codes: HashMap::new(),
            self_sender,
            game_config,
        }
    }

    fn unique_room_code(&self) -> String {
        loop {
            let code = generate_room_code(self.game_config.room_code_length);
            if !self.codes.contains_key(&code) {
                return code;
            }
        }
    }

    #[tracing::instrument(skip(self, msg), fields(
        msg_type = %std::any::type_name_of_val(&msg)
    ))]
    async fn handle_message(&mut self, msg: RoomManagerMessage) {
        match msg {
            RoomManagerMessage::CreateRoom {
                host_name,
                settings,
                respond_to,
            } => {
                if let Err(e) = validate_settings(&settings) {
                    tracing::warn!(error = %e, "Rejected CreateRoom request");
                    let _ = respond_to.send(Err(e));
                    return;
                }

                let game_id = Uuid::new_v4();
                let host_id = Uuid::new_v4();
                let room_code = self.unique_room_code();

                tracing::info!(
                    room.id = %game_id,
                    room.code = %room_code,
                    host.name = %host_name,
                    "Received CreateRoom request"
                );

                let manager_handle = RoomManagerHandle {
                    sender: self.self_sender.clone(),
                };
                let game = Game::new(game_id, room_code.clone(), host_id, settings);
                let host = Player::new(host_id, host_name, true);
                let handle = RoomActorHandle::spawn(
                    game_id,
                    self.game_config.room_buffer_size,
                    manager_handle,
                    GameRoom::new(game, host),
                    StdDuration::from_secs(self.game_config.room_idle_timeout_secs),
                );

                self.rooms.insert(
                    game_id,
                    RoomEntry {
                        handle,
                        room_code: room_code.clone(),
                    },
                );
                self.codes.insert(room_code.clone(), game_id);

                tracing::info!(
                    room.id = %game_id,
                    room.code = %room_code,
                    rooms.active = self.rooms.len(),
                    "Created room successfully"
                );

                let _ = respond_to.send(Ok(RoomDetails {
                    game_id,
                    room_code,
                    host_id,
                }));
            }
            RoomManagerMessage::GetRoomHandle {
                game_id,
                respond_to,
            } => {
                tracing::debug!(room.id = %game_id, "Received GetRoomHandle request");
                let handle = self.rooms.get(&game_id).map(|e| e.handle.clone());
                let _ = respond_to.send(handle);
            }
            RoomManagerMessage::FindRoomByCode {
                room_code,
                respond_to,
            } => {
                let normalized = room_code.trim().to_uppercase();
                let handle = self
                    .codes
                    .get(&normalized)
                    .and_then(|id| self.rooms.get(id))
                    .map(|e| e.handle.clone());
                tracing::debug!(
                    room.code = %normalized,
                    found = handle.is_some(),
                    "Received FindRoomByCode request"
                );
                let _ = respond_to.send(handle);
            }
            RoomManagerMessage::RoomActorShutdown { game_id } => {
                if let Some(entry) = self.rooms.remove(&game_id) {
                    self.codes.remove(&entry.room_code);
                    tracing::info!(
                        room.id = %game_id,
                        room.code = %entry.room_code,
                        rooms.active = self.rooms.len(),
                        "Cleaning up room after actor shutdown"
                    );
                } else {
                    tracing::warn!(room.id = %game_id, "Received shutdown for unknown room");
                }
            }
        }
    }
}

#[tracing::instrument(skip(actor))]
pub async fn run_room_manager_actor(mut actor: RoomManagerActor) {
    tracing::info!("RoomManager actor started");
    while let Some(msg) = actor.receiver.recv().await {
        actor.handle_message(msg).await;
    }
    tracing::info!("RoomManager actor stopped");
}

#[derive(Clone, Debug)]
pub struct RoomManagerHandle {
    sender: mpsc::Sender<RoomManagerMessage>,
}

impl RoomManagerHandle {
    pub fn spawn(buffer_size: usize, game_config: GameConfig) -> Self {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = RoomManagerActor::new(receiver, sender.clone(), game_config);
        let handle = Self { sender };
        tokio::spawn(run_room_manager_actor(actor));
        handle
    }

    pub async fn create_room(
        &self,
        host_name: String,
        settings: GameSettings,
    ) -> Result<RoomDetails, GameError> {
        let (respond_to, rx) = oneshot::channel();
        self.sender
            .send(RoomManagerMessage::CreateRoom {
                host_name,
                settings,
                respond_to,
            })
            .await
            .map_err(|e| GameError::Manager(format!("failed to send CreateRoom: {e}")))?;
        rx.await
            .map_err(|e| GameError::Manager(format!("RoomManager no response: {e}")))?
    }

    pub async fn get_room_handle(&self, game_id: Uuid) -> Option<RoomActorHandle> {
        let (tx, rx) = oneshot::channel();
        if self
            .sender
            .send(RoomManagerMessage::GetRoomHandle {
                game_id,
                respond_to: tx,
            })
            .await
            .is_err()
        {
            return None;
        }
        rx.await.ok().flatten()
    }

    pub async fn find_room_by_code(&self, room_code: String) -> Option<RoomActorHandle> {
        let (tx, rx) = oneshot::channel();
        if self
            .sender
            .send(RoomManagerMessage::FindRoomByCode {
                room_code,
                respond_to: tx,
            })
            .await
            .is_err()
        {
            return None;
        }
        rx.await.ok().flatten()
    }

    pub async fn notify_room_shutdown(&self, game_id: Uuid) -> Result<(), String> {
        self.sender
            .send(RoomManagerMessage::RoomActorShutdown { game_id })
            .await
            .map_err(|e| format!("failed to send RoomActorShutdown: {e}"))
    }
}

#[derive(Debug)]
pub enum RoomActorMessage {
    ClientEvent {
        client_id: Uuid,
        raw_payload: String,
    },
    SubscriberConnected {
        client_id: Uuid,
        client_tx: mpsc::Sender<ws::Message>,
    },
    SubscriberDisconnected {
        client_id: Uuid,
    },
    GetSummary {
        respond_to: oneshot::Sender<RoomSummary>,
    },
}

/// One actor per room. Every action for the room flows through this
/// actor's mailbox, so each action's read-modify-write (including the
/// conditional tally on the last vote) is atomic per room. Rooms run as
/// independent tasks and never share mutable state.
pub struct RoomActor {
    receiver: mpsc::Receiver<RoomActorMessage>,
    game_id: Uuid,
    room: GameRoom,
    subscribers: HashMap<Uuid, mpsc::Sender<ws::Message>>,
    manager_handle: RoomManagerHandle,
    idle_timeout: StdDuration,
}

impl RoomActor {
    fn new(
        receiver: mpsc::Receiver<RoomActorMessage>,
        game_id: Uuid,
        room: GameRoom,
        manager_handle: RoomManagerHandle,
        idle_timeout: StdDuration,
    ) -> Self {
        RoomActor {
            receiver,
            game_id,
            room,
            subscribers: HashMap::new(),
            manager_handle,
            idle_timeout,
        }
    }

    fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            game: self.room.game.clone(),
            players: self.room.players.clone(),
        }
    }

    async fn send_to_subscriber(&self, client_id: &Uuid, message: ServerToClientMessage) {
        let Some(tx) = self.subscribers.get(client_id) else {
            return;
        };
        match message.to_ws_text() {
            Ok(ws_msg) => {
                if tx.send(ws_msg).await.is_err() {
                    tracing::warn!(client.id = %client_id, "Failed to send to subscriber");
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize message for subscriber");
            }
        }
    }

    /// Fire-and-forget push of the current full state to every subscriber.
    /// Clients that miss one recover by re-fetching on (re)connect.
    async fn broadcast_snapshot(&self) {
        let message = ServerToClientMessage::RoomState(self.snapshot());
        let ws_msg = match message.to_ws_text() {
            Ok(m) => m,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize room snapshot");
                return;
            }
        };
        for (id, tx) in &self.subscribers {
            if tx.send(ws_msg.clone()).await.is_err() {
                tracing::warn!(client.id = %id, "Failed to broadcast snapshot to subscriber");
            }
        }
    }

    #[tracing::instrument(skip(self, msg), fields(
        room.id = %self.game_id,
        room.phase = ?self.room.game.phase,
        msg_type = %std::any::type_name_of_val(&msg)
    ))]
    async fn handle_message(&mut self, msg: RoomActorMessage) -> bool {
        match msg {
            RoomActorMessage::ClientEvent {
                client_id,
                raw_payload,
            } => {
                tracing::trace!(
                    client.id = %client_id,
                    event.raw = %raw_payload,
                    "Raw event from client"
                );

                match client_message_from_ws_text(&raw_payload) {
                    Ok(ClientToServerMessage::Action(action)) => {
                        let action_name = action.name();
                        let phase = self.room.apply(action);
                        tracing::debug!(
                            client.id = %client_id,
                            action = %action_name,
                            phase.after = ?phase,
                            "Applied action"
                        );
                        self.send_to_subscriber(
                            &client_id,
                            ServerToClientMessage::ActionAck {
                                action: action_name.to_string(),
                            },
                        )
                        .await;
                        self.broadcast_snapshot().await;
                    }
                    Ok(ClientToServerMessage::LeaveRoom) => {
                        tracing::info!(client.id = %client_id, "Client requested to leave room");
                        self.subscribers.remove(&client_id);
                        if self.subscribers.is_empty() {
                            return self.notify_shutdown().await;
                        }
                    }
                    Ok(ClientToServerMessage::ConnectToRoom { .. }) => {
                        self.send_to_subscriber(
                            &client_id,
                            ServerToClientMessage::SystemError {
                                message: "Already connected to a room.".to_string(),
                            },
                        )
                        .await;
                    }
                    Err(e) => {
                        tracing::warn!(
                            client.id = %client_id,
                            error = %e,
                            event.raw = %raw_payload,
                            "Failed to deserialize event from client"
                        );
                        self.send_to_subscriber(
                            &client_id,
                            ServerToClientMessage::SystemError {
                                message: format!("Invalid message format: {e}"),
                            },
                        )
                        .await;
                    }
                }
            }
            RoomActorMessage::SubscriberConnected {
                client_id,
                client_tx,
            } => {
                tracing::debug!(
                    client.id = %client_id,
                    subscribers.count = self.subscribers.len() + 1,
                    "Subscriber connected"
                );
                self.subscribers.insert(client_id, client_tx);
                // A full snapshot on subscribe is mandatory, not optional.
                self.send_to_subscriber(
                    &client_id,
                    ServerToClientMessage::RoomState(self.snapshot()),
                )
                .await;
            }
            RoomActorMessage::SubscriberDisconnected { client_id } => {
                tracing::debug!(client.id = %client_id, "Subscriber disconnected");
                self.subscribers.remove(&client_id);
                if self.subscribers.is_empty() {
                    tracing::info!("Room has no subscribers left. Triggering shutdown");
                    return self.notify_shutdown().await;
                }
            }
            RoomActorMessage::GetSummary { respond_to } => {
                let _ = respond_to.send(RoomSummary {
                    game_id: self.game_id,
                    phase: self.room.game.phase,
                });
            }
        }
        false
    }

    async fn notify_shutdown(&self) -> bool {
        if let Err(e) = self.manager_handle.notify_room_shutdown(self.game_id).await {
            tracing::error!(error = %e, "Failed to notify RoomManager of shutdown");
        }
        true
    }
}

#[tracing::instrument(skip(actor), fields(room.id = %actor.game_id))]
pub async fn run_room_actor(mut actor: RoomActor) {
    tracing::info!("Room actor started");

    let mut last_activity = Instant::now();

    loop {
        tokio::select! {
            maybe_msg = actor.receiver.recv() => {
                match maybe_msg {
                    Some(msg) => {
                        last_activity = Instant::now();
                        let should_shutdown = actor.handle_message(msg).await;
                        if should_shutdown {
                            tracing::info!("Room shutdown requested by message handler");
                            break;
                        }
                    }
                    None => {
                        tracing::info!("Room actor channel closed. Shutting down");
                        break;
                    }
                }
            }
            _ = tokio::time::sleep_until(last_activity + actor.idle_timeout) => {
                tracing::info!("Room idle timeout. Notifying manager for shutdown");
                if let Err(e) = actor.manager_handle.notify_room_shutdown(actor.game_id).await {
                    tracing::error!(error = %e, "Failed to notify RoomManager of shutdown");
                }
                break;
            }
        }
    }

    tracing::info!("Room actor stopping");
}

#[derive(Clone, Debug)]
pub struct RoomActorHandle {
    pub sender: mpsc::Sender<RoomActorMessage>,
    pub game_id: Uuid,
}

impl RoomActorHandle {
    pub fn spawn(
        game_id: Uuid,
        buffer_size: usize,
        manager_handle: RoomManagerHandle,
        room: GameRoom,
        idle_timeout: StdDuration,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = RoomActor::new(receiver, game_id, room, manager_handle, idle_timeout);
        tokio::spawn(run_room_actor(actor));
        Self { sender, game_id }
    }

    pub async fn forward_client_event(
        &self,
        client_id: Uuid,
        raw_payload: String,
    ) -> Result<(), String> {
        self.sender
            .send(RoomActorMessage::ClientEvent {
                client_id,
                raw_payload,
            })
            .await
            .map_err(|e| format!("failed to send event: {e}"))
    }

    pub async fn subscriber_connected(&self, client_id: Uuid, client_tx: mpsc::Sender<ws::Message>) {
        if self
            .sender
            .send(RoomActorMessage::SubscriberConnected {
                client_id,
                client_tx,
            })
            .await
            .is_err()
        {
            tracing::error!("Failed to send SubscriberConnected");
        }
    }

    pub async fn subscriber_disconnected(&self, client_id: Uuid) {
        if self
            .sender
            .send(RoomActorMessage::SubscriberDisconnected { client_id })
            .await
            .is_err()
        {
            tracing::error!("Failed to send SubscriberDisconnected");
        }
    }

    pub async fn summary(&self) -> Option<RoomSummary> {
        let (tx, rx) = oneshot::channel();
        if self
            .sender
            .send(RoomActorMessage::GetSummary { respond_to: tx })
            .await
            .is_err()
        {
            return None;
        }
        rx.await.ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameAction;
    use crate::game::words::{Category, Difficulty};

    fn test_config() -> GameConfig {
        GameConfig {
            room_code_length: 6,
            room_buffer_size: 32,
            room_idle_timeout_secs: 3600,
        }
    }

    fn test_settings() -> GameSettings {
        GameSettings {
            category: Category::Mix,
            difficulty: Difficulty::Easy,
            num_imposters: 1,
            total_rounds: 1,
            timer_mode: false,
            timer_duration: 120,
            min_players: 2,
        }
    }

    fn action_json(action: GameAction) -> String {
        serde_json::to_string(&ClientToServerMessage::Action(action)).unwrap()
    }

    fn parse_server_message(msg: ws::Message) -> ServerToClientMessage {
        match msg {
            ws::Message::Text(text) => serde_json::from_str(&text).unwrap(),
            other => panic!("expected text frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_room_registers_code_lookup() {
        let manager = RoomManagerHandle::spawn(32, test_config());
        let details = manager
            .create_room("host".to_string(), test_settings())
            .await
            .unwrap();

        assert_eq!(details.room_code.len(), 6);

        let handle = manager
            .find_room_by_code(details.room_code.to_lowercase())
            .await
            .expect("room should be findable by code, case-insensitively");
        assert_eq!(handle.game_id, details.game_id);

        let summary = handle.summary().await.unwrap();
        assert_eq!(summary.phase, Phase::Lobby);
        assert_eq!(summary.game_id, details.game_id);

        assert!(manager.find_room_by_code("NOPE42".to_string()).await.is_none());
    }

    #[tokio::test]
    async fn invalid_settings_are_rejected_at_creation() {
        let manager = RoomManagerHandle::spawn(32, test_config());
        let mut settings = test_settings();
        settings.num_imposters = 0;
        let err = manager
            .create_room("host".to_string(), settings)
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidSettings(_)));
    }

    #[tokio::test]
    async fn subscriber_receives_snapshot_immediately_and_on_change() {
        let manager = RoomManagerHandle::spawn(32, test_config());
        let details = manager
            .create_room("host".to_string(), test_settings())
            .await
            .unwrap();
        let room = manager.get_room_handle(details.game_id).await.unwrap();

        let client_id = Uuid::new_v4();
        let (tx, mut rx) = mpsc::channel(32);
        room.subscriber_connected(client_id, tx).await;

        // Snapshot arrives without any action having been taken.
        let first = parse_server_message(rx.recv().await.unwrap());
        match first {
            ServerToClientMessage::RoomState(snapshot) => {
                assert_eq!(snapshot.game.phase, Phase::Lobby);
                assert_eq!(snapshot.players.len(), 1);
                assert!(snapshot.players[0].is_host);
            }
            other => panic!("expected RoomState, got {other:?}"),
        }

        // A join is acked to the sender and broadcast to all subscribers.
        let joiner = Uuid::new_v4();
        room.forward_client_event(
            client_id,
            action_json(GameAction::Join {
                player_id: joiner,
                player_name: "guest".to_string(),
            }),
        )
        .await
        .unwrap();

        match parse_server_message(rx.recv().await.unwrap()) {
            ServerToClientMessage::ActionAck { action } => assert_eq!(action, "join"),
            other => panic!("expected ActionAck, got {other:?}"),
        }
        match parse_server_message(rx.recv().await.unwrap()) {
            ServerToClientMessage::RoomState(snapshot) => {
                assert_eq!(snapshot.players.len(), 2);
                assert_eq!(snapshot.players[1].id, joiner);
            }
            other => panic!("expected RoomState, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_event_yields_system_error() {
        let manager = RoomManagerHandle::spawn(32, test_config());
        let details = manager
            .create_room("host".to_string(), test_settings())
            .await
            .unwrap();
        let room = manager.get_room_handle(details.game_id).await.unwrap();

        let client_id = Uuid::new_v4();
        let (tx, mut rx) = mpsc::channel(32);
        room.subscriber_connected(client_id, tx).await;
        let _initial = rx.recv().await.unwrap();

        room.forward_client_event(client_id, "{\"action\":\"teleport\"}".to_string())
            .await
            .unwrap();

        match parse_server_message(rx.recv().await.unwrap()) {
            ServerToClientMessage::SystemError { message } => {
                assert!(message.contains("Invalid message format"));
            }
            other => panic!("expected SystemError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn last_subscriber_leaving_unregisters_the_room() {
        let manager = RoomManagerHandle::spawn(32, test_config());
        let details = manager
            .create_room("host".to_string(), test_settings())
            .await
            .unwrap();
        let room = manager.get_room_handle(details.game_id).await.unwrap();

        let client_id = Uuid::new_v4();
        let (tx, mut rx) = mpsc::channel(32);
        room.subscriber_connected(client_id, tx).await;
        let _initial = rx.recv().await.unwrap();

        room.subscriber_disconnected(client_id).await;

        // The manager processes the shutdown notification before our
        // lookup because both go through its mailbox in order.
        tokio::task::yield_now().await;
        let mut retries = 0;
        while manager.get_room_handle(details.game_id).await.is_some() {
            retries += 1;
            assert!(retries < 100, "room was never unregistered");
            tokio::time::sleep(StdDuration::from_millis(10)).await;
        }
        assert!(
            manager
                .find_room_by_code(details.room_code.clone())
                .await
                .is_none()
        );
    }

    #[test]
    fn room_codes_use_the_expected_alphabet() {
        for _ in 0..50 {
            let code = generate_room_code(6);
            assert_eq!(code.len(), 6);
            assert!(code.bytes().all(|b| ROOM_CODE_ALPHABET.contains(&b)));
        }
    }
}
