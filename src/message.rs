use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum MessageType {
    Combat,
    Item,
    LevelEvent,
    System,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GameMessage {
    pub message_type: MessageType,
    pub text: String,  // Pre-formatted message text
    // Optional structured data for client-side formatting if needed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attacker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_health_after: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_died: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_crit: Option<bool>,
}

impl GameMessage {
    fn plain(message_type: MessageType, text: String) -> Self {
        Self {
            message_type,
            text,
            attacker: None,
            target: None,
            damage: None,
            target_health_after: None,
            target_died: None,
            is_crit: None,
        }
    }

    pub fn combat(attacker: String, target: String, damage: i32, health_after: i32, died: bool, is_crit: bool) -> Self {
        let text = match (died, is_crit) {
            (true, true) => format!("{} CRITICALLY defeated {}!", attacker, target),
            (true, false) => format!("{} defeated {}!", attacker, target),
            (false, true) => format!("{} CRITICALLY dealt {} damage to {}", attacker, damage, target),
            (false, false) => format!("{} dealt {} damage to {}", attacker, damage, target),
        };

        Self {
            attacker: Some(attacker),
            target: Some(target),
            damage: Some(damage),
            target_health_after: Some(health_after),
            target_died: Some(died),
            is_crit: Some(is_crit),
            ..Self::plain(MessageType::Combat, text)
        }
    }

    pub fn healing(source: String, target: String, amount: i32, health_after: i32) -> Self {
        let text = format!("{} healed {} for {} HP", source, target, amount);

        Self {
            attacker: Some(source),
            target: Some(target),
            damage: Some(amount),
            target_health_after: Some(health_after),
            target_died: Some(false),
            ..Self::plain(MessageType::Item, text)
        }
    }

    pub fn item(text: String) -> Self {
        Self::plain(MessageType::Item, text)
    }

    pub fn level_event(text: String) -> Self {
        Self::plain(MessageType::LevelEvent, text)
    }

    pub fn system(text: String) -> Self {
        Self::plain(MessageType::System, text)
    }
}

/// Commands sent by the page, e.g. `{"action":"pointer","x":312.0,"y":240.5}`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlayerCommand {
    Tap,                                // Advance title, dialogue, ending, or dismiss a notice
    Pointer { x: f64, y: f64 },         // Pointer-down in canvas pixels
    Cell { x: i32, y: i32 },            // Direct grid cell, bypassing pixel mapping
    SelectSkill { index: usize },       // Skill button in battle, skill card in level-up
    EndTurn,
    Dismiss,
    Resize { width: f64, height: f64 },
    Pause,
    Resume,
    Exit,
}
