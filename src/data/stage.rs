use serde::{Deserialize, Serialize};

/// Stages form a fixed linear sequence ending in the boss encounter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageId {
    #[serde(rename = "stage1")]
    Stage1,
    #[serde(rename = "stage2")]
    Stage2,
    #[serde(rename = "stage3")]
    Stage3,
    #[serde(rename = "boss")]
    Boss,
}

impl StageId {
    pub const ALL: [StageId; 4] = [StageId::Stage1, StageId::Stage2, StageId::Stage3, StageId::Boss];

    /// Position in the sequence (stage1 = 0, boss = 3).
    pub fn index(self) -> u32 {
        match self {
            StageId::Stage1 => 0,
            StageId::Stage2 => 1,
            StageId::Stage3 => 2,
            StageId::Boss => 3,
        }
    }

    pub fn next(self) -> Option<StageId> {
        match self {
            StageId::Stage1 => Some(StageId::Stage2),
            StageId::Stage2 => Some(StageId::Stage3),
            StageId::Stage3 => Some(StageId::Boss),
            StageId::Boss => None,
        }
    }

    pub fn is_final(self) -> bool {
        self.next().is_none()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StageId::Stage1 => "stage1",
            StageId::Stage2 => "stage2",
            StageId::Stage3 => "stage3",
            StageId::Boss => "boss",
        }
    }

    /// Lenient lookup: anything unrecognized starts from the first stage.
    pub fn parse_or_default(id: &str) -> StageId {
        StageId::ALL
            .into_iter()
            .find(|stage| stage.as_str() == id)
            .unwrap_or(StageId::Stage1)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSize {
    pub width: i32,
    pub height: i32,
}

#[derive(Clone, Debug, Serialize)]
pub struct StageConfig {
    pub id: StageId,
    pub name: &'static str,
    pub bg_color: u32,
    pub map_size: MapSize,
    pub enemy_count: usize,
    pub escort_count: usize,  // Regular enemies spawned alongside the boss
    pub exp_reward: u32,
}

pub static STAGES: [StageConfig; 4] = [
    StageConfig {
        id: StageId::Stage1,
        name: "Forest Edge",
        bg_color: 0x8BCF9B,  // light green
        map_size: MapSize { width: 6, height: 6 },
        enemy_count: 2,
        escort_count: 0,
        exp_reward: 50,
    },
    StageConfig {
        id: StageId::Stage2,
        name: "Forest Border",
        bg_color: 0x3F6B4E,  // deep green
        map_size: MapSize { width: 7, height: 7 },
        enemy_count: 3,
        escort_count: 0,
        exp_reward: 75,
    },
    StageConfig {
        id: StageId::Stage3,
        name: "Ruins Entrance",
        bg_color: 0x6E7F73,  // grey green
        map_size: MapSize { width: 8, height: 8 },
        enemy_count: 4,
        escort_count: 0,
        exp_reward: 100,
    },
    StageConfig {
        id: StageId::Boss,
        name: "Guardian of the Forest",
        bg_color: 0x2E4F4F,  // dark teal
        map_size: MapSize { width: 9, height: 9 },
        enemy_count: 1,
        escort_count: 3,
        exp_reward: 150,
    },
];

pub fn stage_config(id: StageId) -> &'static StageConfig {
    &STAGES[id.index() as usize]
}

/// Experience awarded for clearing the stage with the given id.
/// Unknown ids pay out the first stage's award.
pub fn experience_award(id: &str) -> u32 {
    stage_config(StageId::parse_or_default(id)).exp_reward
}
