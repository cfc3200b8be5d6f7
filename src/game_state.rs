use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use crate::battle::{Battle, BattleEnd, BattleInput, BattleTask};
use crate::config::GameConfig;
use crate::data::{dialogue_for, stage_config, Dialogue, EndingType, StageId};
use crate::entity::{GridPosition, Player};
use crate::grid::GridSystem;
use crate::message::{GameMessage, PlayerCommand};
use crate::scheduler::Scheduler;
use crate::skill::MAX_SKILL_LEVEL;

/// Payload passed Boot -> Story -> Battle and from a cleared battle to the next story.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StagePayload {
    pub stage_id: StageId,
    pub player: Option<Player>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct EndingPayload {
    pub ending_type: EndingType,
}

pub enum SceneRequest {
    Boot,
    Story(StagePayload),
    Battle(StagePayload),
    LevelUp { next: StageId, player: Player },
    Ending(EndingPayload),
}

pub struct StoryScene {
    pub stage: StageId,
    pub player: Option<Player>,
    pub line: usize,
}

impl StoryScene {
    pub fn current_line(&self) -> Option<&'static Dialogue> {
        dialogue_for(self.stage).get(self.line)
    }
}

pub struct LevelUpScene {
    pub next: StageId,
    pub player: Player,
    pub chosen: Option<usize>,
}

impl LevelUpScene {
    pub fn all_maxed(&self) -> bool {
        self.player.skills.iter().all(|s| s.level >= MAX_SKILL_LEVEL)
    }
}

pub enum Scene {
    Boot,
    Story(StoryScene),
    Battle(Box<Battle>),
    LevelUp(LevelUpScene),
    Ending(EndingType),
}

impl Scene {
    pub fn name(&self) -> &'static str {
        match self {
            Scene::Boot => "boot",
            Scene::Story(_) => "story",
            Scene::Battle(_) => "battle",
            Scene::LevelUp(_) => "level_up",
            Scene::Ending(_) => "ending",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneTask {
    Battle(BattleTask),
    LevelUpDone,
}

/// One mounted session of the battle flow. Nothing outlives it.
pub struct GameState {
    scene: Scene,
    scheduler: Scheduler<SceneTask>,
    config: GameConfig,
    viewport: (f64, f64),
    paused: bool,
    exited: bool,
    status: String,  // Status line for scenes other than battle
    messages: Vec<GameMessage>,
    seed: Option<u64>,
    battles_started: u64,
}

impl GameState {
    pub fn new(config: GameConfig) -> Self {
        let viewport = (config.grid.viewport_width, config.grid.viewport_height);
        Self {
            scene: Scene::Boot,
            scheduler: Scheduler::new(),
            config,
            viewport,
            paused: false,
            exited: false,
            status: "Tap to start".to_string(),
            messages: Vec::new(),
            seed: None,
            battles_started: 0,
        }
    }

    /// Deterministic session: every battle draws from a seeded generator.
    #[cfg(test)]
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::new(config)
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_exited(&self) -> bool {
        self.exited
    }

    pub fn status(&self) -> &str {
        match &self.scene {
            Scene::Battle(battle) => battle.status(),
            _ => &self.status,
        }
    }

    #[cfg(test)]
    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn drain_messages(&mut self) -> Vec<GameMessage> {
        std::mem::take(&mut self.messages)
    }

    /// Replaces the current scene. Timers from the outgoing scene never fire.
    pub fn start_scene(&mut self, request: SceneRequest) {
        self.scheduler.invalidate();

        self.scene = match request {
            SceneRequest::Boot => {
                self.status = "Tap to start".to_string();
                Scene::Boot
            }
            SceneRequest::Story(payload) => {
                if dialogue_for(payload.stage_id).is_empty() {
                    return self.start_scene(SceneRequest::Battle(payload));
                }
                self.status = stage_config(payload.stage_id).name.to_string();
                Scene::Story(StoryScene {
                    stage: payload.stage_id,
                    player: payload.player,
                    line: 0,
                })
            }
            SceneRequest::Battle(payload) => {
                let grid = GridSystem::new(
                    self.config.grid.cell_size,
                    self.viewport.0,
                    self.viewport.1,
                    stage_config(payload.stage_id).map_size,
                );
                let rng = match self.seed {
                    Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(self.battles_started)),
                    None => StdRng::from_entropy(),
                };
                self.battles_started += 1;
                let battle = Battle::new(payload.stage_id, payload.player, grid, self.config.timing.clone(), rng);
                Scene::Battle(Box::new(battle))
            }
            SceneRequest::LevelUp { next, player } => {
                self.status = format!("Level up! Lv.{} - choose a skill to improve", player.level);
                Scene::LevelUp(LevelUpScene { next, player, chosen: None })
            }
            SceneRequest::Ending(payload) => {
                self.status = "Tap to return to the title".to_string();
                Scene::Ending(payload.ending_type)
            }
        };

        info!("Scene -> {}", self.scene.name());
        self.pump_battle();
    }

    pub fn handle_command(&mut self, cmd: &PlayerCommand) {
        match cmd {
            PlayerCommand::Exit => {
                info!("Session exit requested");
                self.exited = true;
                self.scheduler.invalidate();
                return;
            }
            PlayerCommand::Pause => {
                if !self.paused {
                    self.paused = true;
                    self.messages.push(GameMessage::system("Paused".to_string()));
                }
                return;
            }
            PlayerCommand::Resume => {
                if self.paused {
                    self.paused = false;
                    self.messages.push(GameMessage::system("Resumed".to_string()));
                }
                return;
            }
            PlayerCommand::Resize { width, height } => {
                self.viewport = (*width, *height);
                if let Scene::Battle(battle) = &mut self.scene {
                    battle.grid_mut().set_viewport(*width, *height);
                }
                return;
            }
            _ => {}
        }

        if self.paused || self.exited {
            debug!("Ignoring {:?} while paused", cmd);
            return;
        }

        match &mut self.scene {
            Scene::Boot => {
                if let PlayerCommand::Tap = cmd {
                    self.start_scene(SceneRequest::Story(StagePayload {
                        stage_id: StageId::Stage1,
                        player: None,
                    }));
                }
            }
            Scene::Story(story) => {
                if let PlayerCommand::Tap = cmd {
                    story.line += 1;
                    if story.current_line().is_none() {
                        let payload = StagePayload {
                            stage_id: story.stage,
                            player: story.player.take(),
                        };
                        self.start_scene(SceneRequest::Battle(payload));
                    }
                }
            }
            Scene::Battle(battle) => {
                let input = match *cmd {
                    PlayerCommand::Pointer { x, y } => match battle.grid().pointer_to_cell(x, y) {
                        Some(pos) => BattleInput::Cell(pos),
                        None => BattleInput::OutsideGrid,
                    },
                    PlayerCommand::Cell { x, y } => {
                        let pos = GridPosition::new(x, y);
                        if battle.grid().contains(pos) {
                            BattleInput::Cell(pos)
                        } else {
                            BattleInput::OutsideGrid
                        }
                    }
                    PlayerCommand::SelectSkill { index } => BattleInput::SelectSkill(index),
                    PlayerCommand::EndTurn => BattleInput::EndTurn,
                    PlayerCommand::Dismiss | PlayerCommand::Tap => BattleInput::DismissNotice,
                    _ => return,
                };
                // Rejections already land in the battle's status line
                let _ = battle.handle(input);
                self.pump_battle();
            }
            Scene::LevelUp(level_up) => {
                if level_up.chosen.is_some() {
                    return;
                }
                match *cmd {
                    PlayerCommand::SelectSkill { index } => {
                        let Some(skill) = level_up.player.skills.get_mut(index) else {
                            self.status = format!("There is no skill in slot {}.", index + 1);
                            return;
                        };
                        if skill.level_up() {
                            self.status = format!("{} is now Lv.{}!", skill.name(), skill.level);
                            self.messages.push(GameMessage::level_event(self.status.clone()));
                            level_up.chosen = Some(index);
                            self.scheduler.schedule(self.config.timing.level_up_delay_ms, SceneTask::LevelUpDone);
                        } else {
                            self.status = format!("{} is already at max level.", skill.name());
                        }
                    }
                    PlayerCommand::Tap if level_up.all_maxed() => self.finish_level_up(),
                    _ => {}
                }
            }
            Scene::Ending(_) => {
                if let PlayerCommand::Tap = cmd {
                    self.start_scene(SceneRequest::Boot);
                }
            }
        }
    }

    /// Advances the virtual clock and runs every task that became due.
    pub fn update(&mut self, delta_ms: u64) {
        if self.paused || self.exited {
            return;
        }
        self.scheduler.tick(delta_ms);

        while let Some(task) = self.scheduler.pop_due() {
            match task {
                SceneTask::Battle(task) => {
                    if let Scene::Battle(battle) = &mut self.scene {
                        battle.run_task(task);
                    }
                    self.pump_battle();
                }
                SceneTask::LevelUpDone => self.finish_level_up(),
            }
        }
    }

    fn finish_level_up(&mut self) {
        if !matches!(self.scene, Scene::LevelUp(_)) {
            return;
        }
        if let Scene::LevelUp(level_up) = std::mem::replace(&mut self.scene, Scene::Boot) {
            self.start_scene(SceneRequest::Story(StagePayload {
                stage_id: level_up.next,
                player: Some(level_up.player),
            }));
        }
    }

    /// Moves the battle's delayed steps and log into the session, and leaves
    /// the battle once its closing delay has run.
    fn pump_battle(&mut self) {
        let Scene::Battle(battle) = &mut self.scene else {
            return;
        };
        for (delay, task) in battle.take_scheduled() {
            self.scheduler.schedule(delay, SceneTask::Battle(task));
        }
        self.messages.extend(battle.drain_messages());

        let Some(end) = battle.finished() else {
            return;
        };
        let Scene::Battle(battle) = std::mem::replace(&mut self.scene, Scene::Boot) else {
            return;
        };

        let request = match end {
            BattleEnd::StageCleared { next, leveled_up } => {
                let player = battle.into_player();
                if leveled_up && self.config.flow.level_up_choice {
                    SceneRequest::LevelUp { next, player }
                } else {
                    SceneRequest::Story(StagePayload {
                        stage_id: next,
                        player: Some(player),
                    })
                }
            }
            BattleEnd::Ending { ending_type } => SceneRequest::Ending(EndingPayload { ending_type }),
        };
        self.start_scene(request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::BattlePhase;
    use crate::config::TimingConfig;
    use crate::data::{enemy_data, EnemyKind, MapSize};
    use crate::entity::{Enemy, EnemyId};

    fn session() -> GameState {
        GameState::with_seed(GameConfig::default(), 7)
    }

    fn tap(state: &mut GameState, times: usize) {
        for _ in 0..times {
            state.handle_command(&PlayerCommand::Tap);
        }
    }

    fn battle(state: &GameState) -> &Battle {
        match state.scene() {
            Scene::Battle(battle) => battle,
            other => panic!("expected battle, got {}", other.name()),
        }
    }

    /// Puts a one-hit stage1 fight in place: player at (1,4), a 1hp shadow at (2,4).
    fn rigged_stage_one(state: &mut GameState, player: Player) {
        let mut shadow = Enemy::from_data(EnemyId(1), &enemy_data(EnemyKind::Shadow), GridPosition::new(2, 4));
        shadow.stats.hp = 1;
        rigged_battle(state, player, shadow);
    }

    fn rigged_battle(state: &mut GameState, player: Player, enemy: Enemy) {
        state.scheduler.invalidate();
        let battle = Battle::from_parts(
            StageId::Stage1,
            player,
            vec![enemy],
            vec![],
            GridSystem::new(60.0, 800.0, 600.0, MapSize { width: 6, height: 6 }),
            TimingConfig::default(),
            StdRng::seed_from_u64(1),
        );
        state.scene = Scene::Battle(Box::new(battle));
    }

    #[test]
    fn boot_story_battle_flow() {
        let mut state = session();
        assert_eq!(state.scene().name(), "boot");

        tap(&mut state, 1);
        assert_eq!(state.scene().name(), "story");
        tap(&mut state, 2);
        assert_eq!(state.scene().name(), "story");
        tap(&mut state, 1);

        let battle = battle(&state);
        assert_eq!(battle.stage(), StageId::Stage1);
        assert_eq!(battle.player().stats.hp, 60);
        assert_eq!(battle.player().position, GridPosition::new(1, 4));
        assert_eq!(battle.enemies().len(), 2);
    }

    #[test]
    fn stage_clear_carries_player_into_next_story() {
        let mut state = session();
        rigged_stage_one(&mut state, Player::new(GridPosition::new(1, 4)));

        state.handle_command(&PlayerCommand::Cell { x: 2, y: 4 });
        state.update(500);
        assert_eq!(state.scene().name(), "battle");
        state.update(1_000);

        match state.scene() {
            Scene::Story(story) => {
                assert_eq!(story.stage, StageId::Stage2);
                let player = story.player.as_ref().unwrap();
                assert_eq!(player.exp, 50);
                assert!(player.skills.iter().all(|s| s.level == 2 && s.use_count == 3));
            }
            other => panic!("expected story, got {}", other.name()),
        }

        tap(&mut state, 3);
        let battle = battle(&state);
        assert_eq!(battle.stage(), StageId::Stage2);
        assert_eq!(battle.player().exp, 50);
        assert!(battle.player().skills.iter().all(|s| s.use_count == 4));
    }

    #[test]
    fn level_up_choice_raises_one_skill() {
        let mut config = GameConfig::default();
        config.flow.level_up_choice = true;
        let mut state = GameState::with_seed(config, 3);
        let mut player = Player::new(GridPosition::new(1, 4));
        player.exp = 60;
        rigged_stage_one(&mut state, player);

        state.handle_command(&PlayerCommand::Cell { x: 2, y: 4 });
        state.update(500);
        state.update(1_000);
        assert_eq!(state.scene().name(), "level_up");

        state.handle_command(&PlayerCommand::SelectSkill { index: 1 });
        state.update(500);
        match state.scene() {
            Scene::Story(story) => {
                let player = story.player.as_ref().unwrap();
                assert_eq!(player.level, 2);
                assert_eq!(player.skills[0].level, 2);
                assert_eq!(player.skills[1].level, 3);
            }
            other => panic!("expected story, got {}", other.name()),
        }
    }

    #[test]
    fn maxed_skill_pick_is_refused() {
        let mut state = session();
        let mut player = Player::new(GridPosition::new(1, 4));
        player.skills[0].level = MAX_SKILL_LEVEL;
        state.start_scene(SceneRequest::LevelUp { next: StageId::Stage3, player });

        state.handle_command(&PlayerCommand::SelectSkill { index: 0 });
        assert_eq!(state.status(), "Quick Strike is already at max level.");
        assert_eq!(state.pending_timers(), 0);
        state.handle_command(&PlayerCommand::SelectSkill { index: 2 });
        assert_eq!(state.pending_timers(), 1);
    }

    #[test]
    fn all_maxed_level_up_continues_on_tap() {
        let mut state = session();
        let mut player = Player::new(GridPosition::new(1, 4));
        for skill in player.skills.iter_mut() {
            skill.level = MAX_SKILL_LEVEL;
        }
        state.start_scene(SceneRequest::LevelUp { next: StageId::Boss, player });
        tap(&mut state, 1);
        assert_eq!(state.scene().name(), "story");
    }

    #[test]
    fn defeat_then_tap_returns_to_boot() {
        let mut state = session();
        let mut player = Player::new(GridPosition::new(1, 4));
        player.stats.hp = 1;
        let guardian = Enemy::from_data(EnemyId(1), &enemy_data(EnemyKind::Guardian), GridPosition::new(1, 3));
        rigged_battle(&mut state, player, guardian);

        state.handle_command(&PlayerCommand::EndTurn);
        state.update(250);
        assert_eq!(battle(&state).phase(), BattlePhase::Defeated);
        state.update(1_000);
        assert!(matches!(state.scene(), Scene::Ending(EndingType::Bad)));

        tap(&mut state, 1);
        assert_eq!(state.scene().name(), "boot");
    }

    #[test]
    fn new_scene_drops_pending_timers() {
        let mut state = session();
        tap(&mut state, 4);
        state.handle_command(&PlayerCommand::EndTurn);
        assert!(state.pending_timers() > 0);

        state.start_scene(SceneRequest::Battle(StagePayload { stage_id: StageId::Stage1, player: None }));
        assert_eq!(state.pending_timers(), 0);
        state.update(10_000);
        assert_eq!(battle(&state).phase(), BattlePhase::SelectingAction { moved: false });
    }

    #[test]
    fn pause_freezes_the_clock() {
        let mut state = session();
        tap(&mut state, 4);
        state.handle_command(&PlayerCommand::EndTurn);
        state.drain_messages();
        state.handle_command(&PlayerCommand::Pause);
        state.handle_command(&PlayerCommand::Pause);
        let paused: Vec<_> = state.drain_messages().into_iter().map(|m| m.message_type).collect();
        assert_eq!(paused, vec![crate::message::MessageType::System]);

        state.update(10_000);
        assert_eq!(battle(&state).phase(), BattlePhase::EnemyTurn);
        state.handle_command(&PlayerCommand::SelectSkill { index: 0 });
        assert_eq!(battle(&state).phase(), BattlePhase::EnemyTurn);

        state.handle_command(&PlayerCommand::Resume);
        for _ in 0..10 {
            state.update(500);
        }
        assert!(battle(&state).phase().is_player_turn());
    }

    #[test]
    fn pointer_outside_grid_is_harmless() {
        let mut state = session();
        tap(&mut state, 4);
        state.handle_command(&PlayerCommand::Pointer { x: 5.0, y: 5.0 });
        assert_eq!(battle(&state).phase(), BattlePhase::SelectingAction { moved: false });
    }

    #[test]
    fn exit_stops_everything() {
        let mut state = session();
        tap(&mut state, 4);
        state.handle_command(&PlayerCommand::EndTurn);
        state.handle_command(&PlayerCommand::Exit);
        assert!(state.is_exited());
        assert_eq!(state.pending_timers(), 0);
        state.update(10_000);
        assert_eq!(battle(&state).phase(), BattlePhase::EnemyTurn);
    }
}
