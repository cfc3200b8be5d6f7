use serde::{Deserialize, Serialize};
use crate::entity::Status;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    Shadow,
    Hunter,
    Guardian,
    Boss,
}

/// Kinds drawn for ordinary spawns and boss escorts.
pub const REGULAR_ENEMIES: [EnemyKind; 3] = [EnemyKind::Shadow, EnemyKind::Hunter, EnemyKind::Guardian];

#[derive(Clone, Debug, Serialize)]
pub struct EnemyData {
    pub kind: EnemyKind,
    pub name: &'static str,
    pub stats: Status,
    // Data only, combat math never reads these
    pub traits: &'static [&'static str],
}

pub fn enemy_data(kind: EnemyKind) -> EnemyData {
    match kind {
        EnemyKind::Shadow => EnemyData {
            kind,
            name: "Forest Shadow",
            stats: Status::new(20, 5, 3),
            traits: &[],
        },
        EnemyKind::Hunter => EnemyData {
            kind,
            name: "Forest Hunter",
            stats: Status::new(18, 7, 4),
            traits: &["evasion"],
        },
        EnemyKind::Guardian => EnemyData {
            kind,
            name: "Forest Sentinel",
            stats: Status::new(30, 9, 2),
            traits: &["defense"],
        },
        EnemyKind::Boss => EnemyData {
            kind,
            name: "Guardian of the Forest",
            stats: Status::new(120, 12, 3),
            traits: &["heavy strike every 2 turns"],
        },
    }
}
