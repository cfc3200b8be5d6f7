use serde::{Deserialize, Serialize};
use super::stage::StageId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Potion,
    SkillReset,
}

#[derive(Clone, Debug, Serialize)]
pub struct ItemData {
    pub kind: ItemKind,
    pub id: &'static str,
    pub name: &'static str,
}

pub fn item_data(kind: ItemKind) -> ItemData {
    match kind {
        ItemKind::Potion => ItemData {
            kind,
            id: "potion",
            name: "Healing Potion",
        },
        ItemKind::SkillReset => ItemData {
            kind,
            id: "skill_reset",
            name: "Skill Reset",
        },
    }
}

/// Items laid out at the start of each stage, as (kind, count).
pub fn stage_items(stage: StageId) -> &'static [(ItemKind, usize)] {
    match stage {
        StageId::Stage1 => &[],
        StageId::Stage2 => &[(ItemKind::Potion, 1)],
        StageId::Stage3 => &[(ItemKind::Potion, 1), (ItemKind::SkillReset, 1)],
        StageId::Boss => &[(ItemKind::Potion, 2), (ItemKind::SkillReset, 2)],
    }
}
