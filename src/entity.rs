use serde::{Deserialize, Serialize};
use crate::data::{EnemyData, EnemyKind, SKILLS};
use crate::skill::Skill;

pub const PLAYER_NAME: &str = "Cheolsu";
pub const PLAYER_BASE_STATS: Status = Status::new(60, 10, 3);
pub const MAX_PLAYER_MOVE: i32 = 4;
pub const MOVE_BONUS_LEVEL: u32 = 3;  // The only level that grants extra movement
pub const BASE_EXP_TO_NEXT: u32 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    fn squared_distance(&self, other: &GridPosition) -> i32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Euclidean range test, exact for integer ranges. The footprint is a disc, not a diamond.
    pub fn within(&self, other: &GridPosition, range: i32) -> bool {
        range >= 0 && self.squared_distance(other) <= range * range
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub hp: i32,
    pub max_hp: i32,
    pub atk: i32,
    #[serde(rename = "move")]
    pub move_range: i32,  // Grid steps per turn
}

impl Status {
    pub const fn new(max_hp: i32, atk: i32, move_range: i32) -> Self {
        Self { hp: max_hp, max_hp, atk, move_range }
    }

    /// Sole hp mutator. Keeps `0 <= hp <= max_hp` for any delta.
    pub fn modify_hp(&mut self, delta: i32) {
        self.hp = self.hp.saturating_add(delta).clamp(0, self.max_hp);
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Buff {
    pub damage_bonus: f64,      // 0.3 = +30% outgoing damage
    pub damage_reduction: f64,  // 0.3 = -30% incoming damage
    pub critical_chance: f64,
    pub turns_remaining: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub position: GridPosition,
    pub stats: Status,
    pub level: u32,
    pub exp: u32,
    pub exp_to_next: u32,
    pub skills: Vec<Skill>,
    pub buff: Option<Buff>,
}

impl Player {
    /// Fresh player owning the full skill roster at level 1.
    pub fn new(position: GridPosition) -> Self {
        Self {
            name: PLAYER_NAME.to_string(),
            position,
            stats: PLAYER_BASE_STATS,
            level: 1,
            exp: 0,
            exp_to_next: BASE_EXP_TO_NEXT,
            skills: SKILLS.iter().map(|data| Skill::new(data.id)).collect(),
            buff: None,
        }
    }

    pub fn modify_hp(&mut self, delta: i32) {
        self.stats.modify_hp(delta);
    }

    /// Heals and returns the amount actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.stats.hp;
        self.modify_hp(amount);
        self.stats.hp - before
    }

    pub fn restore_full_hp(&mut self) -> i32 {
        self.heal(self.stats.max_hp)
    }

    pub fn is_alive(&self) -> bool {
        self.stats.is_alive()
    }

    pub fn move_to(&mut self, position: GridPosition) {
        self.position = position;
    }

    pub fn apply_buff(&mut self, buff: Buff) {
        self.buff = Some(buff);
    }

    /// Called once when the player's turn ends; the buff clears when it hits zero.
    pub fn tick_buff(&mut self) {
        if let Some(buff) = self.buff.as_mut() {
            buff.turns_remaining = buff.turns_remaining.saturating_sub(1);
            if buff.turns_remaining == 0 {
                self.buff = None;
            }
        }
    }

    /// Adds experience and returns how many levels were gained.
    pub fn add_exp(&mut self, amount: u32) -> u32 {
        self.exp += amount;
        let mut gained = 0;
        while self.exp >= self.exp_to_next {
            self.level_up();
            gained += 1;
        }
        gained
    }

    fn level_up(&mut self) {
        self.exp -= self.exp_to_next;
        self.level += 1;
        self.exp_to_next = BASE_EXP_TO_NEXT + (self.level - 1) * 50;
        self.stats.max_hp += 5;
        self.stats.hp = self.stats.max_hp;
        self.stats.atk += 1;
        if self.level == MOVE_BONUS_LEVEL {
            self.stats.move_range = (self.stats.move_range + 1).min(MAX_PLAYER_MOVE);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnemyId(pub u32);

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EnemyId,
    pub kind: EnemyKind,
    pub name: String,
    pub position: GridPosition,
    pub stats: Status,
    pub traits: Vec<String>,  // Carried for display, never consulted by combat
}

impl Enemy {
    pub fn from_data(id: EnemyId, data: &EnemyData, position: GridPosition) -> Self {
        Self {
            id,
            kind: data.kind,
            name: data.name.to_string(),
            position,
            stats: data.stats,
            traits: data.traits.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn modify_hp(&mut self, delta: i32) {
        self.stats.modify_hp(delta);
    }

    pub fn is_alive(&self) -> bool {
        self.stats.is_alive()
    }

    pub fn move_to(&mut self, position: GridPosition) {
        self.position = position;
    }
}
