use axum::extract::{
    State,
    ws::{self, WebSocket, WebSocketUpgrade},
};
use axum::response::IntoResponse;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::game::messages::{
    ClientToServerMessage, ServerToClientMessage, client_message_from_ws_text,
};
use crate::room::RoomActorHandle;
use crate::state::AppState;

pub async fn ws_handler(
    ws_upgrade: WebSocketUpgrade,
    State(app_state): State<AppState>,
) -> impl IntoResponse {
    tracing::debug!("WebSocket: Connection attempt to /ws endpoint");
    ws_upgrade.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn reject(mut ws_sender: SplitSink<WebSocket, ws::Message>, message: String) {
    let error_response = ServerToClientMessage::SystemError { message };
    if let Ok(ws_msg) = error_response.to_ws_text() {
        let _ = ws_sender.send(ws_msg).await;
    }
    let _ = ws_sender.close().await;
}

/// Drives one subscriber connection. The first frame must be a
/// `ConnectToRoom`; everything after that is forwarded raw to the room
/// actor, which parses, applies and answers through the client channel.
pub async fn handle_socket(socket: WebSocket, app_state: AppState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let room_handle: RoomActorHandle;
    let client_id: Uuid = Uuid::new_v4();

    match ws_receiver.next().await {
        Some(Ok(ws::Message::Text(text_msg))) => {
            match client_message_from_ws_text(&text_msg) {
                Ok(ClientToServerMessage::ConnectToRoom { game_id }) => {
                    tracing::info!(
                        client.id = %client_id,
                        room.id = %game_id,
                        "WebSocket: Client connecting to room"
                    );
                    match app_state.room_manager.get_room_handle(game_id).await {
                        Some(handle) => room_handle = handle,
                        None => {
                            tracing::warn!(
                                client.id = %client_id,
                                room.id = %game_id,
                                "WebSocket: Room not found. Closing"
                            );
                            reject(ws_sender, format!("Room {game_id} not found.")).await;
                            return;
                        }
                    }
                }
                Ok(other_msg) => {
                    tracing::warn!(
                        client.id = %client_id,
                        message = ?other_msg,
                        "WebSocket: Initial message was not ConnectToRoom. Closing"
                    );
                    reject(
                        ws_sender,
                        "Invalid initial message type. Expected ConnectToRoom.".to_string(),
                    )
                    .await;
                    return;
                }
                Err(e) => {
                    tracing::warn!(
                        client.id = %client_id,
                        error = %e,
                        "WebSocket: Failed to deserialize initial message. Closing"
                    );
                    reject(
                        ws_sender,
                        format!("Invalid initial connection message format: {e}"),
                    )
                    .await;
                    return;
                }
            }
        }
        Some(Ok(_)) => {
            tracing::warn!(
                client.id = %client_id,
                "WebSocket: Client sent non-text initial message. Closing"
            );
            reject(
                ws_sender,
                "Initial message must be a text JSON message (ConnectToRoom).".to_string(),
            )
            .await;
            return;
        }
        Some(Err(e)) => {
            tracing::warn!(error = %e, "WebSocket: Error receiving initial message. Closing");
            let _ = ws_sender.close().await;
            return;
        }
        None => {
            tracing::debug!("WebSocket: Client disconnected before sending initial message");
            return;
        }
    }

    let (actor_to_client_tx, mut actor_to_client_rx) = mpsc::channel::<ws::Message>(32);
    room_handle
        .subscriber_connected(client_id, actor_to_client_tx)
        .await;

    let room_id_send = room_handle.game_id;
    let mut send_task = tokio::spawn(async move {
        while let Some(message_to_send) = actor_to_client_rx.recv().await {
            if ws_sender.send(message_to_send).await.is_err() {
                tracing::debug!(
                    client.id = %client_id,
                    room.id = %room_id_send,
                    "WS send error, client likely disconnected"
                );
                break;
            }
        }
        let _ = ws_sender.close().await;
    });

    let room_handle_recv = room_handle.clone();
    let room_id_recv = room_handle.game_id;
    let mut recv_task = tokio::spawn(async move {
        loop {
            match ws_receiver.next().await {
                Some(Ok(ws::Message::Text(text_msg))) => {
                    if let Err(e) = room_handle_recv
                        .forward_client_event(client_id, text_msg.to_string())
                        .await
                    {
                        tracing::error!(
                            client.id = %client_id,
                            room.id = %room_id_recv,
                            error = %e,
                            "Error forwarding event to room actor"
                        );
                        break;
                    }
                }
                Some(Ok(ws::Message::Close(_))) => {
                    tracing::info!(
                        client.id = %client_id,
                        room.id = %room_id_recv,
                        "WebSocket closed by client"
                    );
                    break;
                }
                Some(Ok(_)) => {
                    // Binary frames are ignored; axum answers pings itself.
                }
                Some(Err(e)) => {
                    tracing::warn!(
                        client.id = %client_id,
                        room.id = %room_id_recv,
                        error = %e,
                        "WebSocket error"
                    );
                    break;
                }
                None => break,
            }
        }
    });

    // Whichever pump finishes first tears the other one down.
    tokio::select! {
        _ = (&mut send_task) => { recv_task.abort(); },
        _ = (&mut recv_task) => { send_task.abort(); },
    }

    room_handle.subscriber_disconnected(client_id).await;
    tracing::info!(
        client.id = %client_id,
        room.id = %room_handle.game_id,
        "WebSocket: Client fully disconnected"
    );
}
