use crate::room::RoomManagerHandle;

#[derive(Clone)]
pub struct AppState {
    pub room_manager: RoomManagerHandle,
}
