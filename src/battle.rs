use std::collections::VecDeque;
use std::fmt;
use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};
use crate::ai::{decide_enemy_action, EnemyAction};
use crate::combat::{enemy_strike, player_strike, BASIC_ATTACK_RANGE};
use crate::config::TimingConfig;
use crate::data::{enemy_data, select_ending, stage_config, EndingType, EnemyKind, SkillId, SkillKind, StageId, REGULAR_ENEMIES};
use crate::entity::{Enemy, EnemyId, GridPosition, Player};
use crate::grid::{CellAction, CellKind, CellLayer, GridSystem};
use crate::item::{apply_item, find_free_cell, spawn_items, Item};
use crate::message::GameMessage;
use crate::skill::{effective_range, focus_buff, quick_strike_profile};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BattlePhase {
    SelectingAction { moved: bool },           // `moved` limits the turn to one relocation
    SkillTargeting { skill: usize, moved: bool },
    Resolving,                                 // Waiting for the action to settle
    EnemyTurn,
    StageCleared,
    Defeated,
}

impl BattlePhase {
    pub fn is_player_turn(self) -> bool {
        matches!(self, BattlePhase::SelectingAction { .. } | BattlePhase::SkillTargeting { .. })
    }
}

/// Delayed steps the controller asks its owner to run later.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BattleTask {
    SettleAction,
    BeginEnemyTurn,
    NextEnemy,
    FinishStage,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BattleInput {
    Cell(GridPosition),
    OutsideGrid,
    SelectSkill(usize),
    EndTurn,
    DismissNotice,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BattleEnd {
    StageCleared { next: StageId, leveled_up: bool },
    Ending { ending_type: EndingType },
}

/// Why an input was refused. State is left untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    NoticeOpen,
    NotYourTurn,
    UnknownSkill(usize),
    NotEnoughUses(&'static str),
    OutOfRange(i32),
    TargetTooFar,
    NoTarget,
    BasicAttackTooFar,
    OutOfMoveRange,
    AlreadyMoved,
    SelfTargetOnly,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NoticeOpen => write!(f, "Close the notice first."),
            Rejection::NotYourTurn => write!(f, "Wait for your turn."),
            Rejection::UnknownSkill(index) => write!(f, "There is no skill in slot {}.", index + 1),
            Rejection::NotEnoughUses(name) => write!(f, "Not enough uses left for {}!", name),
            Rejection::OutOfRange(range) => write!(f, "Out of range! (range: {}) Pick another target.", range),
            Rejection::TargetTooFar => write!(f, "The enemy is too far away. Pick another target."),
            Rejection::NoTarget => write!(f, "No target there. Pick another target."),
            Rejection::BasicAttackTooFar => write!(f, "Basic attack only reaches distance 1."),
            Rejection::OutOfMoveRange => write!(f, "Out of movement range."),
            Rejection::AlreadyMoved => write!(f, "You already moved this turn."),
            Rejection::SelfTargetOnly => write!(f, "This skill targets yourself."),
        }
    }
}

impl std::error::Error for Rejection {}

/// Turn controller for one stage.
///
/// All mutation goes through `handle` (player input) and `run_task` (delayed
/// steps). Delays are not waited on here: each one is pushed to an outbox that
/// the owner drains into its scheduler, and fed back through `run_task` once due.
pub struct Battle {
    stage: StageId,
    phase: BattlePhase,
    player: Player,
    enemies: Vec<Enemy>,
    items: Vec<Item>,
    grid: GridSystem,
    cells: CellLayer,
    enemy_queue: VecDeque<EnemyId>,
    timing: TimingConfig,
    rng: StdRng,
    status: String,
    notice: Option<String>,  // Blocking overlay, only DismissNotice gets through
    outcome: Option<BattleEnd>,
    finished: bool,
    scheduled: Vec<(u64, BattleTask)>,
    messages: Vec<GameMessage>,
}

impl Battle {
    /// Sets up a stage. A carried-over player gains one use on every skill and
    /// starts from the bottom-left corner like a fresh one.
    pub fn new(stage: StageId, player: Option<Player>, grid: GridSystem, timing: TimingConfig, mut rng: StdRng) -> Self {
        let config = stage_config(stage);
        let map = config.map_size;
        let start = GridPosition::new(1, map.height - 2);

        let player = match player {
            Some(mut player) => {
                for skill in player.skills.iter_mut() {
                    skill.use_count += 1;
                }
                player.move_to(start);
                player
            }
            None => Player::new(start),
        };

        let mut occupied = vec![start];
        let mut enemies = Vec::new();
        let mut next_id = 1;

        if stage.is_final() {
            let center = GridPosition::new(map.width / 2, map.height / 2);
            enemies.push(Enemy::from_data(EnemyId(next_id), &enemy_data(EnemyKind::Boss), center));
            occupied.push(center);
            next_id += 1;
        }

        let regular_count = if stage.is_final() { config.escort_count } else { config.enemy_count };
        for _ in 0..regular_count {
            let kind = REGULAR_ENEMIES[rng.gen_range(0..REGULAR_ENEMIES.len())];
            let position = find_free_cell(&mut rng, (map.width - 3)..=(map.width - 1), 0..=2, &occupied);
            occupied.push(position);
            enemies.push(Enemy::from_data(EnemyId(next_id), &enemy_data(kind), position));
            next_id += 1;
        }

        let items = spawn_items(&mut rng, stage, map, &occupied);
        info!(
            "Stage {} starts: {} enemies, {} items, player hp {}/{}",
            stage.as_str(),
            enemies.len(),
            items.len(),
            player.stats.hp,
            player.stats.max_hp
        );

        Self::from_parts(stage, player, enemies, items, grid, timing, rng)
    }

    /// Builds a battle from an explicit layout and opens the player's turn.
    pub fn from_parts(
        stage: StageId,
        player: Player,
        enemies: Vec<Enemy>,
        items: Vec<Item>,
        grid: GridSystem,
        timing: TimingConfig,
        rng: StdRng,
    ) -> Self {
        let mut battle = Self {
            stage,
            phase: BattlePhase::SelectingAction { moved: false },
            player,
            enemies,
            items,
            grid,
            cells: CellLayer::new(),
            enemy_queue: VecDeque::new(),
            timing,
            rng,
            status: String::new(),
            notice: None,
            outcome: None,
            finished: false,
            scheduled: Vec::new(),
            messages: Vec::new(),
        };
        battle.messages.push(GameMessage::level_event(format!(
            "{} - defeat every enemy!",
            stage_config(stage).name
        )));
        battle.start_player_turn();
        battle
    }

    pub fn stage(&self) -> StageId {
        self.stage
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn grid(&self) -> &GridSystem {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut GridSystem {
        &mut self.grid
    }

    pub fn cells(&self) -> &CellLayer {
        &self.cells
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Outcome once the closing delay has run; the owner switches scenes then.
    pub fn finished(&self) -> Option<BattleEnd> {
        if self.finished {
            self.outcome
        } else {
            None
        }
    }

    /// End turn is always offered while the player is acting.
    pub fn can_end_turn(&self) -> bool {
        self.phase.is_player_turn() && self.notice.is_none()
    }

    pub fn selected_skill(&self) -> Option<usize> {
        match self.phase {
            BattlePhase::SkillTargeting { skill, .. } => Some(skill),
            _ => None,
        }
    }

    /// Hands the player over to the next stage. Consumes the battle so no two
    /// controllers ever own the same player.
    pub fn into_player(self) -> Player {
        self.player
    }

    pub fn take_scheduled(&mut self) -> Vec<(u64, BattleTask)> {
        std::mem::take(&mut self.scheduled)
    }

    pub fn drain_messages(&mut self) -> Vec<GameMessage> {
        std::mem::take(&mut self.messages)
    }

    fn schedule(&mut self, delay_ms: u64, task: BattleTask) {
        self.scheduled.push((delay_ms, task));
    }

    pub fn handle(&mut self, input: BattleInput) -> Result<(), Rejection> {
        let result = self.dispatch(input);
        if let Err(rejection) = result {
            debug!("Rejected {:?}: {}", input, rejection);
            self.status = rejection.to_string();
        }
        result
    }

    fn dispatch(&mut self, input: BattleInput) -> Result<(), Rejection> {
        if let BattleInput::DismissNotice = input {
            self.notice = None;
            return Ok(());
        }
        if self.notice.is_some() {
            return Err(Rejection::NoticeOpen);
        }

        match (self.phase, input) {
            (BattlePhase::SelectingAction { moved }, BattleInput::Cell(pos)) => self.click_action_cell(pos, moved),
            (BattlePhase::SelectingAction { .. }, BattleInput::OutsideGrid) => Ok(()),
            (BattlePhase::SelectingAction { moved }, BattleInput::SelectSkill(index)) => self.select_skill(index, moved),

            (BattlePhase::SkillTargeting { skill, moved }, BattleInput::Cell(pos)) => self.click_target_cell(skill, pos, moved),
            (BattlePhase::SkillTargeting { moved, .. }, BattleInput::OutsideGrid) => {
                self.cancel_targeting(moved);
                Ok(())
            }
            (BattlePhase::SkillTargeting { skill, moved }, BattleInput::SelectSkill(index)) => {
                if index == skill {
                    self.cancel_targeting(moved);
                    Ok(())
                } else {
                    self.select_skill(index, moved)
                }
            }

            (phase, BattleInput::EndTurn) if phase.is_player_turn() => {
                self.status = "Turn ended.".to_string();
                self.end_player_turn();
                Ok(())
            }

            _ => Err(Rejection::NotYourTurn),
        }
    }

    fn click_action_cell(&mut self, pos: GridPosition, moved: bool) -> Result<(), Rejection> {
        if let Some(action) = self.cells.action_at(pos) {
            return self.perform(action, moved);
        }

        if self.enemy_at(pos).is_some() {
            return Err(Rejection::BasicAttackTooFar);
        }
        if moved {
            return Err(Rejection::AlreadyMoved);
        }
        Err(Rejection::OutOfMoveRange)
    }

    fn click_target_cell(&mut self, skill: usize, pos: GridPosition, moved: bool) -> Result<(), Rejection> {
        if let Some(action) = self.cells.action_at(pos) {
            return self.perform(action, moved);
        }

        let player_pos = self.player.position;
        match self.player.skills[skill].kind() {
            SkillKind::Buffer => Err(Rejection::SelfTargetOnly),
            SkillKind::Melee if !player_pos.within(&pos, 1) => Err(Rejection::TargetTooFar),
            SkillKind::Ranged => {
                let range = effective_range(&self.player.skills[skill]);
                if pos == player_pos || !player_pos.within(&pos, range) {
                    Err(Rejection::OutOfRange(range))
                } else {
                    Err(Rejection::NoTarget)
                }
            }
            _ => Err(Rejection::NoTarget),
        }
    }

    fn select_skill(&mut self, index: usize, moved: bool) -> Result<(), Rejection> {
        let skill = self.player.skills.get(index).ok_or(Rejection::UnknownSkill(index))?;
        if !skill.can_use() {
            return Err(Rejection::NotEnoughUses(skill.name()));
        }

        self.status = format!("{} selected. Choose a target. (Select again to cancel)", skill.name());
        self.phase = BattlePhase::SkillTargeting { skill: index, moved };
        self.refresh_cells();
        Ok(())
    }

    fn cancel_targeting(&mut self, moved: bool) {
        self.status = "Skill cancelled. Choose a skill or move.".to_string();
        self.phase = BattlePhase::SelectingAction { moved };
        self.refresh_cells();
    }

    fn perform(&mut self, action: CellAction, moved: bool) -> Result<(), Rejection> {
        match action {
            CellAction::MoveTo { position } => {
                self.move_player(position);
                Ok(())
            }
            CellAction::BasicAttack { target } => {
                self.basic_attack(target);
                Ok(())
            }
            CellAction::UseSkill { skill, target } => self.use_skill(skill, target, moved),
        }
    }

    fn move_player(&mut self, position: GridPosition) {
        self.player.move_to(position);
        self.phase = BattlePhase::SelectingAction { moved: true };
        self.collect_item();
        self.refresh_cells();

        self.status = if !self.cells.is_empty() {
            "Moved. Choose an enemy to attack.".to_string()
        } else if self.can_reach_with_skill() {
            "Moved. Use a skill or end your turn.".to_string()
        } else {
            "Moved. Nothing in reach, end your turn.".to_string()
        };
    }

    fn collect_item(&mut self) {
        let Some(index) = self.items.iter().position(|i| i.position == self.player.position) else {
            return;
        };
        let item = self.items.remove(index);
        let msg = apply_item(&item, &mut self.player, self.stage);
        debug!("Picked up {} at ({}, {})", item.id, item.position.x, item.position.y);
        self.notice = Some(msg.text.clone());
        self.messages.push(msg);
    }

    fn basic_attack(&mut self, target: EnemyId) {
        let Some(index) = self.enemy_index(target) else {
            return;
        };
        let msg = player_strike(&self.player, &mut self.enemies[index], self.player.stats.atk, &mut self.rng);
        self.status = format!("Basic attack! {} damage to {}!", msg.damage.unwrap_or(0), self.enemies[index].name);
        self.messages.push(msg);
        self.finish_action();
    }

    fn use_skill(&mut self, index: usize, target: Option<EnemyId>, moved: bool) -> Result<(), Rejection> {
        let skill = self.player.skills.get(index).ok_or(Rejection::UnknownSkill(index))?;
        let (id, level, name, usable) = (skill.id, skill.level, skill.name(), skill.can_use());
        if !usable {
            // Aborted before any cost, back to the action menu
            self.phase = BattlePhase::SelectingAction { moved };
            self.refresh_cells();
            return Err(Rejection::NotEnoughUses(name));
        }

        let target_index = target.and_then(|t| self.enemy_index(t));

        match id {
            SkillId::Focus => {
                self.player.skills[index].consume();
                let buff = focus_buff(level);
                self.player.apply_buff(buff);
                self.status = format!(
                    "{} (Lv.{})! {} turns of +{}% damage and -{}% damage taken!",
                    name,
                    level,
                    buff.turns_remaining,
                    (buff.damage_bonus * 100.0).round() as i32,
                    (buff.damage_reduction * 100.0).round() as i32
                );
                self.messages.push(GameMessage::level_event(self.status.clone()));
                self.end_player_turn();
            }
            SkillId::QuickStrike => {
                let target_index = target_index.ok_or(Rejection::NoTarget)?;
                if !self.player.position.within(&self.enemies[target_index].position, 1) {
                    return Err(Rejection::TargetTooFar);
                }
                self.player.skills[index].consume();

                let (multiplier, hits) = quick_strike_profile(level);
                let base = (self.player.stats.atk as f64 * multiplier).floor() as i32;
                let mut dealt = Vec::new();
                for _ in 0..hits {
                    if !self.enemies[target_index].is_alive() {
                        break;
                    }
                    let msg = player_strike(&self.player, &mut self.enemies[target_index], base, &mut self.rng);
                    dealt.push(msg.damage.unwrap_or(0));
                    self.messages.push(msg);
                }

                let damage_text = dealt.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(" + ");
                self.status = format!("{} (Lv.{})! {} damage!", name, level, damage_text);
                self.finish_action();
            }
            SkillId::ThrowingDagger => {
                let target_index = target_index.ok_or(Rejection::NoTarget)?;
                let range = effective_range(&self.player.skills[index]);
                let target_pos = self.enemies[target_index].position;
                if target_pos == self.player.position || !self.player.position.within(&target_pos, range) {
                    return Err(Rejection::OutOfRange(range));
                }
                self.player.skills[index].consume();

                let msg = player_strike(&self.player, &mut self.enemies[target_index], self.player.stats.atk, &mut self.rng);
                self.status = format!("{} (Lv.{})! {} damage!", name, level, msg.damage.unwrap_or(0));
                self.messages.push(msg);
                self.finish_action();
            }
        }
        Ok(())
    }

    /// Post-action housekeeping: drop the dead, then wait before the enemy phase.
    fn finish_action(&mut self) {
        self.remove_dead_enemies();
        self.phase = BattlePhase::Resolving;
        self.cells.clear();
        self.schedule(self.timing.action_settle_ms, BattleTask::SettleAction);
    }

    fn remove_dead_enemies(&mut self) {
        let mut defeated = Vec::new();
        self.enemies.retain(|enemy| {
            if enemy.is_alive() {
                true
            } else {
                defeated.push(enemy.name.clone());
                false
            }
        });
        for name in defeated {
            info!("{} defeated", name);
            self.status = format!("{} defeated!", name);
        }
    }

    fn end_player_turn(&mut self) {
        self.player.tick_buff();
        self.phase = BattlePhase::EnemyTurn;
        self.cells.clear();
        self.schedule(self.timing.enemy_turn_delay_ms, BattleTask::BeginEnemyTurn);
    }

    fn start_player_turn(&mut self) {
        self.phase = BattlePhase::SelectingAction { moved: false };
        self.status = "Choose a skill or move.".to_string();
        self.refresh_cells();
    }

    /// Runs a delayed step. Tasks that no longer match the phase are ignored.
    pub fn run_task(&mut self, task: BattleTask) {
        match (task, self.phase) {
            (BattleTask::SettleAction, BattlePhase::Resolving) => {
                if self.enemies.is_empty() {
                    self.victory();
                } else {
                    self.end_player_turn();
                }
            }
            (BattleTask::BeginEnemyTurn, BattlePhase::EnemyTurn) => {
                if self.enemies.is_empty() {
                    self.victory();
                    return;
                }
                self.status = "Enemy turn.".to_string();
                self.enemy_queue = self.enemies.iter().map(|e| e.id).collect();
                self.next_enemy();
            }
            (BattleTask::NextEnemy, BattlePhase::EnemyTurn) => self.next_enemy(),
            (BattleTask::FinishStage, BattlePhase::StageCleared | BattlePhase::Defeated) => {
                self.finished = true;
            }
            (task, phase) => debug!("Dropping {:?} in {:?}", task, phase),
        }
    }

    fn next_enemy(&mut self) {
        if self.enemies.is_empty() {
            self.victory();
            return;
        }

        let index = loop {
            let Some(id) = self.enemy_queue.pop_front() else {
                self.start_player_turn();
                return;
            };
            if let Some(index) = self.enemy_index(id) {
                break index;
            }
        };

        let map = self.grid.map_size();
        let others: Vec<GridPosition> = self
            .enemies
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, e)| e.position)
            .collect();
        let action = decide_enemy_action(&self.enemies[index], self.player.position, &others, map.width, map.height);
        debug!("{} ({:?}) -> {:?}", self.enemies[index].name, self.enemies[index].id, action);

        match action {
            EnemyAction::Attack => {
                let msg = enemy_strike(&self.enemies[index], &mut self.player);
                self.status = format!("{} attacks! {} damage!", self.enemies[index].name, msg.damage.unwrap_or(0));
                self.messages.push(msg);
                if !self.player.is_alive() {
                    self.defeat();
                    return;
                }
            }
            EnemyAction::MoveTo(position) => self.enemies[index].move_to(position),
            EnemyAction::Hold => {}
        }

        self.schedule(self.timing.enemy_step_delay_ms, BattleTask::NextEnemy);
    }

    fn victory(&mut self) {
        let heal = self.player.stats.max_hp * 3 / 10;
        let healed = self.player.heal(heal);
        let exp = stage_config(self.stage).exp_reward;
        let levels = self.player.add_exp(exp);
        for skill in self.player.skills.iter_mut() {
            skill.level_up();
        }

        self.status = format!(
            "Victory! HP +{} / EXP +{}{} / All skills level up!",
            healed,
            exp,
            if levels > 0 { " (Level up!)" } else { "" }
        );
        self.messages.push(GameMessage::level_event(self.status.clone()));
        info!(
            "Stage {} cleared: hp {}/{}, level {}, exp {}",
            self.stage.as_str(),
            self.player.stats.hp,
            self.player.stats.max_hp,
            self.player.level,
            self.player.exp
        );

        self.outcome = Some(match self.stage.next() {
            Some(next) => BattleEnd::StageCleared { next, leveled_up: levels > 0 },
            None => BattleEnd::Ending { ending_type: select_ending(self.player.stats.hp) },
        });
        self.phase = BattlePhase::StageCleared;
        self.cells.clear();
        self.enemy_queue.clear();
        self.schedule(self.timing.stage_transition_ms, BattleTask::FinishStage);
    }

    fn defeat(&mut self) {
        info!("Player defeated on {}", self.stage.as_str());
        self.status = "Defeat...".to_string();
        self.messages.push(GameMessage::level_event(format!("{} has fallen.", self.player.name)));
        self.outcome = Some(BattleEnd::Ending { ending_type: EndingType::Bad });
        self.phase = BattlePhase::Defeated;
        self.cells.clear();
        self.enemy_queue.clear();
        self.schedule(self.timing.stage_transition_ms, BattleTask::FinishStage);
    }

    /// Repopulates the highlighted cells for the current phase. Always tears
    /// down the previous set first.
    pub fn refresh_cells(&mut self) {
        self.cells.clear();
        let player_pos = self.player.position;

        match self.phase {
            BattlePhase::SelectingAction { moved: false } => {
                let move_range = self.player.stats.move_range;
                for pos in self.grid.cells() {
                    if pos == player_pos {
                        continue;
                    }
                    match self.enemy_at(pos).map(|e| e.id) {
                        Some(target) if player_pos.within(&pos, BASIC_ATTACK_RANGE) => {
                            self.cells.create_cell(pos, CellKind::Attack, CellAction::BasicAttack { target });
                        }
                        Some(_) => {}
                        None if player_pos.within(&pos, move_range) => {
                            self.cells.create_cell(pos, CellKind::Move, CellAction::MoveTo { position: pos });
                        }
                        None => {}
                    }
                }
            }
            BattlePhase::SelectingAction { moved: true } => {
                for enemy in self.enemies.iter() {
                    if player_pos.within(&enemy.position, BASIC_ATTACK_RANGE) {
                        self.cells.create_cell(enemy.position, CellKind::Attack, CellAction::BasicAttack { target: enemy.id });
                    }
                }
            }
            BattlePhase::SkillTargeting { skill, .. } => {
                let owned = &self.player.skills[skill];
                match owned.kind() {
                    SkillKind::Buffer => {
                        self.cells.create_cell(player_pos, CellKind::SelfTarget, CellAction::UseSkill { skill, target: None });
                    }
                    kind => {
                        let (range, cell_kind) = match kind {
                            SkillKind::Ranged => (effective_range(owned), CellKind::RangedTarget),
                            _ => (1, CellKind::Attack),
                        };
                        for enemy in self.enemies.iter() {
                            if enemy.position != player_pos && player_pos.within(&enemy.position, range) {
                                self.cells.create_cell(
                                    enemy.position,
                                    cell_kind,
                                    CellAction::UseSkill { skill, target: Some(enemy.id) },
                                );
                            }
                        }
                    }
                }
            }
            _ => {}
        }
        debug_assert_eq!(self.cells.live_count(), self.cells.cells().len() as u64);
    }

    /// Whether any skill with uses left could act from the current cell.
    fn can_reach_with_skill(&self) -> bool {
        let player_pos = self.player.position;
        self.player.skills.iter().filter(|s| s.can_use()).any(|skill| match skill.kind() {
            SkillKind::Buffer => true,
            _ => {
                let range = effective_range(skill);
                self.enemies
                    .iter()
                    .any(|e| e.position != player_pos && player_pos.within(&e.position, range))
            }
        })
    }

    fn enemy_at(&self, pos: GridPosition) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.position == pos)
    }

    fn enemy_index(&self, id: EnemyId) -> Option<usize> {
        self.enemies.iter().position(|e| e.id == id)
    }
}
