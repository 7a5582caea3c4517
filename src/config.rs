use crate::error::{ConfigError, Result as AppResult};
use config::{Config, Environment, File, Value, ValueKind};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Length of the human-shareable room code.
    pub room_code_length: usize,
    /// Mailbox size for the manager and each room actor.
    pub room_buffer_size: usize,
    /// A room with no traffic for this long is shut down and unregistered.
    pub room_idle_timeout_secs: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            room_code_length: 6,
            room_buffer_size: 32,
            room_idle_timeout_secs: 60 * 60,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AppSettings {
    pub server: ServerConfig,
    #[serde(default)]
    pub game: GameConfig,
}

pub fn load_settings() -> AppResult<AppSettings> {
    let builder = Config::builder()
        .add_source(
            Environment::with_prefix("WORDSPY")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("server.cors_origins")
                .try_parsing(true),
        )
        .add_source(File::with_name("config").required(false))
        .set_default("server.port", Value::new(None, ValueKind::I64(8080)))
        .map_err(|e| ConfigError::Load(e.to_string()))?
        .set_default(
            "server.cors_origins",
            Value::new(None, ValueKind::Array(Vec::new())),
        )
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let settings = builder
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    settings
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_config_defaults_are_sane() {
        let config = GameConfig::default();
        assert_eq!(config.room_code_length, 6);
        assert!(config.room_buffer_size > 0);
        assert!(config.room_idle_timeout_secs > 0);
    }
}
