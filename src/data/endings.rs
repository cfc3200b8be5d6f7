use serde::{Deserialize, Serialize};

/// Minimum HP after the boss falls for the happy ending.
pub const HAPPY_ENDING_MIN_HP: i32 = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndingType {
    Happy,
    Neutral,
    Bad,
}

#[derive(Clone, Debug, Serialize)]
pub struct Ending {
    pub kind: EndingType,
    pub condition: &'static str,
    pub text: &'static str,
    pub bg_color: u32,
}

pub fn ending(kind: EndingType) -> Ending {
    match kind {
        EndingType::Happy => Ending {
            kind,
            condition: "Boss defeated with 30 HP or more",
            text: "Younghee came home as if nothing had happened.",
            bg_color: 0x2ECC71,
        },
        EndingType::Neutral => Ending {
            kind,
            condition: "Boss defeated with low HP",
            text: "Younghee came back, but the forest was not easily forgotten.",
            bg_color: 0x95A5A6,
        },
        EndingType::Bad => Ending {
            kind,
            condition: "Player defeated",
            text: "The forest was quiet, and Younghee never came back.",
            bg_color: 0xE74C3C,
        },
    }
}

/// Ending after clearing the final stage. Defeat is always `Bad` and never reaches here.
pub fn select_ending(final_hp: i32) -> EndingType {
    if final_hp >= HAPPY_ENDING_MIN_HP {
        EndingType::Happy
    } else {
        EndingType::Neutral
    }
}
