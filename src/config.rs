use serde::{Deserialize, Serialize};
use std::fs;

pub const CONFIG_PATH: &str = "game_config.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub tick_ms: u64,  // Update period driving the battle scheduler
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            tick_ms: 50,
        }
    }
}

/// Pacing of the delayed battle steps, all in milliseconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimingConfig {
    pub enemy_turn_delay_ms: u64,
    pub enemy_step_delay_ms: u64,
    pub action_settle_ms: u64,
    pub stage_transition_ms: u64,
    pub level_up_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            enemy_turn_delay_ms: 250,
            enemy_step_delay_ms: 400,
            action_settle_ms: 500,
            stage_transition_ms: 1000,
            level_up_delay_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GridConfig {
    pub cell_size: f64,
    pub viewport_width: f64,   // Replaced by the client's `resize` command
    pub viewport_height: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: 60.0,
            viewport_width: 800.0,
            viewport_height: 600.0,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Offer a skill pick after a character level-up on non-final stages.
    pub level_up_choice: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GameConfig {
    pub server: ServerConfig,
    pub timing: TimingConfig,
    pub grid: GridConfig,
    pub flow: FlowConfig,
}

impl GameConfig {
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let config: GameConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: GameConfig = toml::from_str("[timing]\nenemy_step_delay_ms = 100\n").unwrap();
        assert_eq!(config.timing.enemy_step_delay_ms, 100);
        assert_eq!(config.timing.enemy_turn_delay_ms, 250);
        assert_eq!(config.server.bind_address, "0.0.0.0:3000");
        assert!(!config.flow.level_up_choice);
    }

    #[test]
    fn save_then_load_through_a_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game_config.toml");
        let path = path.to_str().unwrap();

        let mut config = GameConfig::default();
        config.flow.level_up_choice = true;
        config.grid.cell_size = 48.0;
        config.save(path).unwrap();

        let loaded = GameConfig::load(path).unwrap();
        assert!(loaded.flow.level_up_choice);
        assert_eq!(loaded.grid.cell_size, 48.0);
        assert_eq!(loaded.server.tick_ms, 50);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(GameConfig::load(path.to_str().unwrap()).is_err());
    }
}
