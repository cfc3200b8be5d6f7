use std::ops::RangeInclusive;
use rand::Rng;
use serde::{Deserialize, Serialize};
use crate::data::{item_data, stage_items, ItemKind, MapSize, StageId};
use crate::entity::{GridPosition, Player};
use crate::message::GameMessage;
use crate::skill::skill_reset_baseline;

pub const PLACEMENT_ATTEMPTS: usize = 50;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Item {
    pub id: String,  // Unique per stage, e.g. "potion_0"
    pub kind: ItemKind,
    pub name: String,
    pub position: GridPosition,
}

/// Samples a cell in the given ranges that is not in `occupied`.
///
/// Gives up after `PLACEMENT_ATTEMPTS` draws and keeps the last one, even if taken.
pub fn find_free_cell<R: Rng + ?Sized>(
    rng: &mut R,
    xs: RangeInclusive<i32>,
    ys: RangeInclusive<i32>,
    occupied: &[GridPosition],
) -> GridPosition {
    let mut pos = GridPosition::new(*xs.start(), *ys.start());
    for _ in 0..PLACEMENT_ATTEMPTS {
        pos = GridPosition::new(rng.gen_range(xs.clone()), rng.gen_range(ys.clone()));
        if !occupied.contains(&pos) {
            break;
        }
    }
    pos
}

/// Lays out the stage's item roster inside the map border.
pub fn spawn_items<R: Rng + ?Sized>(
    rng: &mut R,
    stage: StageId,
    map_size: MapSize,
    occupied: &[GridPosition],
) -> Vec<Item> {
    let mut taken = occupied.to_vec();
    let mut items = Vec::new();

    for &(kind, count) in stage_items(stage) {
        let data = item_data(kind);
        for n in 0..count {
            let position = find_free_cell(
                rng,
                1..=(map_size.width - 2).max(1),
                1..=(map_size.height - 2).max(1),
                &taken,
            );
            taken.push(position);
            items.push(Item {
                id: format!("{}_{}", data.id, n),
                kind,
                name: data.name.to_string(),
                position,
            });
        }
    }

    items
}

/// Applies a picked-up item to the player. Pickup never costs a turn.
pub fn apply_item(item: &Item, player: &mut Player, stage: StageId) -> GameMessage {
    match item.kind {
        ItemKind::Potion => {
            let healed = player.restore_full_hp();
            GameMessage::healing(item.name.clone(), player.name.clone(), healed, player.stats.hp)
        }
        ItemKind::SkillReset => {
            let uses = skill_reset_baseline(stage);
            for skill in player.skills.iter_mut() {
                skill.use_count = uses;
            }
            GameMessage::item(format!("{}! Every skill now has {} uses.", item.name, uses))
        }
    }
}
