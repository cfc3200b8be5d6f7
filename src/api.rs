use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::{Html, Json, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::battle::BattlePhase;
use crate::config::GameConfig;
use crate::data::{ending, stage_config, EndingType, EnemyKind, ItemKind, MapSize, SkillData, StageConfig, StageId, SKILLS, STAGES};
use crate::entity::{Buff, Status};
use crate::game_state::{GameState, Scene};
use crate::grid::{CellKind, PixelPoint};
use crate::message::{GameMessage, PlayerCommand};

pub type SharedState = Arc<Mutex<GameState>>;
pub type SharedConfig = Arc<GameConfig>;

#[derive(Serialize, Debug, Clone)]
pub struct StageData {
    pub id: StageId,
    pub name: String,
    pub bg_color: u32,
    pub map_size: MapSize,
}

#[derive(Serialize, Debug, Clone)]
pub struct GridData {
    pub origin: PixelPoint,
    pub cell_size: f64,
    pub width: i32,
    pub height: i32,
}

#[derive(Serialize, Debug, Clone)]
pub struct PlayerData {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub pixel: Option<PixelPoint>,  // Only while a grid is on screen
    pub stats: Status,
    pub level: u32,
    pub exp: u32,
    pub exp_to_next: u32,
    pub buff: Option<Buff>,
}

#[derive(Serialize, Debug, Clone)]
pub struct EntityData {
    pub id: u32,
    pub kind: EnemyKind,
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub pixel: PixelPoint,
    pub hp: i32,
    pub max_hp: i32,
    pub atk: i32,
    pub traits: Vec<String>,
}

#[derive(Serialize, Debug, Clone)]
pub struct ConsumableData {
    pub id: String,
    pub kind: ItemKind,
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub pixel: PixelPoint,
}

#[derive(Serialize, Debug, Clone)]
pub struct CellData {
    pub x: i32,
    pub y: i32,
    pub kind: CellKind,
    pub color: u32,
    pub pixel: PixelPoint,
}

#[derive(Serialize, Debug, Clone)]
pub struct SkillButtonData {
    pub index: usize,
    pub name: String,
    pub level: u32,
    pub use_count: u32,
    pub enabled: bool,
    pub selected: bool,
    pub effect: String,
    pub next_effect: Option<String>,  // Shown on level-up cards, "MAX" when absent
}

#[derive(Serialize, Debug, Clone)]
pub struct DialogueData {
    pub speaker: String,
    pub text: String,
    pub line: usize,
    pub total: usize,
}

#[derive(Serialize, Debug, Clone)]
pub struct EndingData {
    pub ending_type: EndingType,
    pub condition: String,
    pub text: String,
    pub bg_color: u32,
}

/// Everything the page needs to draw one frame. Built on demand from the model.
#[derive(Serialize, Debug, Clone)]
pub struct GameUpdate {
    pub scene: String,  // "boot", "story", "battle", "level_up" or "ending"
    pub paused: bool,
    pub status: String,
    pub messages: Vec<GameMessage>,  // Produced since the previous update
    pub stage: Option<StageData>,
    pub grid: Option<GridData>,
    pub phase: Option<BattlePhase>,
    pub player: Option<PlayerData>,
    pub enemies: Vec<EntityData>,
    pub items: Vec<ConsumableData>,
    pub cells: Vec<CellData>,
    pub skills: Vec<SkillButtonData>,
    pub can_end_turn: bool,
    pub notice: Option<String>,
    pub dialogue: Option<DialogueData>,
    pub ending: Option<EndingData>,
}

impl GameUpdate {
    fn empty(scene: &str, paused: bool, status: String, messages: Vec<GameMessage>) -> Self {
        Self {
            scene: scene.to_string(),
            paused,
            status,
            messages,
            stage: None,
            grid: None,
            phase: None,
            player: None,
            enemies: Vec::new(),
            items: Vec::new(),
            cells: Vec::new(),
            skills: Vec::new(),
            can_end_turn: false,
            notice: None,
            dialogue: None,
            ending: None,
        }
    }
}

fn stage_data(id: StageId) -> StageData {
    let config = stage_config(id);
    StageData {
        id,
        name: config.name.to_string(),
        bg_color: config.bg_color,
        map_size: config.map_size,
    }
}

fn player_data(player: &crate::entity::Player, pixel: Option<PixelPoint>) -> PlayerData {
    PlayerData {
        name: player.name.clone(),
        x: player.position.x,
        y: player.position.y,
        pixel,
        stats: player.stats,
        level: player.level,
        exp: player.exp,
        exp_to_next: player.exp_to_next,
        buff: player.buff,
    }
}

fn skill_buttons(player: &crate::entity::Player, selected: Option<usize>) -> Vec<SkillButtonData> {
    player
        .skills
        .iter()
        .enumerate()
        .map(|(index, skill)| SkillButtonData {
            index,
            name: skill.name().to_string(),
            level: skill.level,
            use_count: skill.use_count,
            enabled: skill.can_use(),
            selected: selected == Some(index),
            effect: skill.current_effect().to_string(),
            next_effect: skill.next_effect().map(str::to_string),
        })
        .collect()
}

/// Convert GameState to a GameUpdate for the page
pub fn game_state_to_update(game: &GameState, messages: Vec<GameMessage>) -> GameUpdate {
    let scene = game.scene();
    let mut update = GameUpdate::empty(scene.name(), game.is_paused(), game.status().to_string(), messages);

    match scene {
        Scene::Boot => {}
        Scene::Story(story) => {
            update.stage = Some(stage_data(story.stage));
            update.player = story.player.as_ref().map(|p| player_data(p, None));
            update.dialogue = story.current_line().map(|line| DialogueData {
                speaker: line.speaker.to_string(),
                text: line.text.to_string(),
                line: story.line,
                total: crate::data::dialogue_for(story.stage).len(),
            });
        }
        Scene::Battle(battle) => {
            let grid = battle.grid();
            let map = grid.map_size();
            update.stage = Some(stage_data(battle.stage()));
            update.grid = Some(GridData {
                origin: grid.origin(),
                cell_size: grid.cell_size(),
                width: map.width,
                height: map.height,
            });
            update.phase = Some(battle.phase());

            let player = battle.player();
            update.player = Some(player_data(player, Some(grid.cell_to_pixel(player.position))));
            update.enemies = battle
                .enemies()
                .iter()
                .map(|enemy| EntityData {
                    id: enemy.id.0,
                    kind: enemy.kind,
                    name: enemy.name.clone(),
                    x: enemy.position.x,
                    y: enemy.position.y,
                    pixel: grid.cell_to_pixel(enemy.position),
                    hp: enemy.stats.hp,
                    max_hp: enemy.stats.max_hp,
                    atk: enemy.stats.atk,
                    traits: enemy.traits.clone(),
                })
                .collect();
            update.items = battle
                .items()
                .iter()
                .map(|item| ConsumableData {
                    id: item.id.clone(),
                    kind: item.kind,
                    name: item.name.clone(),
                    x: item.position.x,
                    y: item.position.y,
                    pixel: grid.cell_to_pixel(item.position),
                })
                .collect();
            update.cells = battle
                .cells()
                .cells()
                .iter()
                .map(|cell| CellData {
                    x: cell.position.x,
                    y: cell.position.y,
                    kind: cell.kind,
                    color: cell.kind.color(),
                    pixel: grid.cell_to_pixel(cell.position),
                })
                .collect();

            // Skill buttons only exist while the player is acting
            if battle.phase().is_player_turn() {
                update.skills = skill_buttons(player, battle.selected_skill());
            }
            update.can_end_turn = battle.can_end_turn();
            update.notice = battle.notice().map(str::to_string);
        }
        Scene::LevelUp(level_up) => {
            update.stage = Some(stage_data(level_up.next));
            update.player = Some(player_data(&level_up.player, None));
            update.skills = skill_buttons(&level_up.player, level_up.chosen);
        }
        Scene::Ending(ending_type) => {
            let ending = ending(*ending_type);
            update.ending = Some(EndingData {
                ending_type: ending.kind,
                condition: ending.condition.to_string(),
                text: ending.text.to_string(),
                bg_color: ending.bg_color,
            });
        }
    }

    update
}

fn snapshot_json(game: &mut GameState) -> String {
    let messages = game.drain_messages();
    let update = game_state_to_update(game, messages);
    serde_json::to_string(&update).unwrap_or_else(|e| {
        warn!("Failed to serialize update: {}", e);
        String::from("{}")
    })
}

pub async fn index() -> Html<&'static str> {
    Html(include_str!("../client/index.html"))
}

pub async fn stages_endpoint() -> Json<Vec<StageConfig>> {
    Json(STAGES.to_vec())
}

pub async fn skills_endpoint() -> Json<Vec<SkillData>> {
    Json(SKILLS.to_vec())
}

pub async fn websocket_handler(ws: WebSocketUpgrade, State(config): State<SharedConfig>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, config))
}

/// One socket is one mount: a fresh session that is dropped when the socket closes.
async fn handle_socket(socket: WebSocket, config: SharedConfig) {
    static SESSION_COUNTER: AtomicU64 = AtomicU64::new(0);
    let session_id = SESSION_COUNTER.fetch_add(1, Ordering::Relaxed);
    info!("[WS] Session {} mounted", session_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Message>(64);
    let state: SharedState = Arc::new(Mutex::new(GameState::new(config.as_ref().clone())));

    // Send initial game state
    let initial_state = match state.lock() {
        Ok(mut game) => snapshot_json(&mut game),
        Err(_) => return,
    };
    if sender.send(Message::Text(initial_state)).await.is_err() {
        return;
    }

    // Spawn task to send updates to client
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sender.send(msg).await.is_err() || closing {
                break;
            }
        }
    });

    // Spawn task driving the scheduler clock
    let tick_ms = config.server.tick_ms.max(1);
    let tick_state = state.clone();
    let tick_tx = tx.clone();
    let mut tick_task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(tick_ms));
        let mut last_sent = String::new();
        loop {
            interval.tick().await;
            let update = {
                let Ok(mut game) = tick_state.lock() else {
                    break;
                };
                if game.is_exited() {
                    break;
                }
                game.update(tick_ms);
                snapshot_json(&mut game)
            };
            if update != last_sent {
                if tick_tx.send(Message::Text(update.clone())).await.is_err() {
                    break;
                }
                last_sent = update;
            }
        }
    });

    // Spawn task to receive commands from client
    let recv_state = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            let text = match msg {
                Message::Text(text) => text,
                Message::Close(_) => break,
                _ => continue,
            };
            let cmd = match serde_json::from_str::<PlayerCommand>(&text) {
                Ok(cmd) => cmd,
                Err(e) => {
                    debug!("[WS] Ignoring malformed command {:?}: {}", text, e);
                    continue;
                }
            };

            let (update, exited) = {
                let Ok(mut game) = recv_state.lock() else {
                    break;
                };
                game.handle_command(&cmd);
                (snapshot_json(&mut game), game.is_exited())
            };
            if tx.send(Message::Text(update)).await.is_err() {
                break;
            }
            if exited {
                let _ = tx.send(Message::Close(None)).await;
                break;
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
            tick_task.abort();
        },
        _ = (&mut recv_task) => {
            // Let the close frame drain before stopping the sender
            tick_task.abort();
            let _ = (&mut send_task).await;
        },
        _ = (&mut tick_task) => {
            recv_task.abort();
            send_task.abort();
        },
    };

    info!("[WS] Session {} unmounted", session_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageType;

    #[test]
    fn boot_update_is_bare() {
        let mut game = GameState::new(GameConfig::default());
        let messages = game.drain_messages();
        let update = game_state_to_update(&game, messages);
        assert_eq!(update.scene, "boot");
        assert!(update.grid.is_none());
        assert!(update.cells.is_empty());
        assert!(!update.can_end_turn);
    }

    #[test]
    fn battle_update_describes_the_board() {
        let mut game = GameState::with_seed(GameConfig::default(), 21);
        for _ in 0..4 {
            game.handle_command(&PlayerCommand::Tap);
        }
        let messages = game.drain_messages();
        let update = game_state_to_update(&game, messages);

        assert_eq!(update.scene, "battle");
        let grid = update.grid.as_ref().unwrap();
        assert_eq!((grid.width, grid.height), (6, 6));
        assert_eq!(grid.origin, PixelPoint { x: 220.0, y: 120.0 });
        assert_eq!(update.enemies.len(), 2);
        assert_eq!(update.skills.len(), 3);
        assert!(update.skills.iter().all(|s| s.enabled && !s.selected));
        assert!(update.can_end_turn);
        assert!(update.cells.iter().any(|c| c.kind == CellKind::Move));
        assert!(update.messages.iter().any(|m| m.message_type == MessageType::LevelEvent));

        let player = update.player.unwrap();
        assert_eq!(player.pixel, Some(PixelPoint { x: 310.0, y: 390.0 }));
    }

    #[test]
    fn update_serializes_with_scene_and_phase() {
        let mut game = GameState::with_seed(GameConfig::default(), 21);
        for _ in 0..4 {
            game.handle_command(&PlayerCommand::Tap);
        }
        let json = snapshot_json(&mut game);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["scene"], "battle");
        assert_eq!(value["phase"]["state"], "selecting_action");
        assert_eq!(value["player"]["stats"]["move"], 3);
        // Messages were drained by the first snapshot
        let again: serde_json::Value = serde_json::from_str(&snapshot_json(&mut game)).unwrap();
        assert_eq!(again["messages"].as_array().map(|m| m.len()), Some(0));
    }

    #[test]
    fn ending_update_carries_text() {
        let mut game = GameState::new(GameConfig::default());
        game.start_scene(crate::game_state::SceneRequest::Ending(crate::game_state::EndingPayload {
            ending_type: EndingType::Neutral,
        }));
        let update = game_state_to_update(&game, Vec::new());
        let ending = update.ending.unwrap();
        assert_eq!(ending.ending_type, EndingType::Neutral);
        assert!(!ending.text.is_empty());
    }
}
