use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillKind {
    Melee,
    Ranged,
    Buffer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillId {
    QuickStrike,
    ThrowingDagger,
    Focus,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct SkillLevel {
    pub level: u32,
    pub effect: &'static str,
}

#[derive(Clone, Debug, Serialize)]
pub struct SkillData {
    pub id: SkillId,
    pub key: &'static str,  // Stable string id for the page
    pub name: &'static str,
    pub kind: SkillKind,
    pub description: &'static str,
    pub range: Option<i32>,
    pub levels: &'static [SkillLevel],
}

impl SkillData {
    pub fn effect_at(&self, level: u32) -> Option<&'static str> {
        self.levels.iter().find(|l| l.level == level).map(|l| l.effect)
    }
}

/// Fixed roster, in the order the player owns them.
pub static SKILLS: [SkillData; 3] = [
    SkillData {
        id: SkillId::QuickStrike,
        key: "quick_strike",
        name: "Quick Strike",
        kind: SkillKind::Melee,
        description: "Close-range attack",
        range: None,
        levels: &[
            SkillLevel { level: 1, effect: "130% damage" },
            SkillLevel { level: 2, effect: "150% damage" },
            SkillLevel { level: 3, effect: "150% damage, strikes twice" },
        ],
    },
    SkillData {
        id: SkillId::ThrowingDagger,
        key: "throwing_dagger",
        name: "Throwing Dagger",
        kind: SkillKind::Ranged,
        description: "Ranged attack",
        range: Some(3),
        levels: &[
            SkillLevel { level: 1, effect: "Range 3" },
            SkillLevel { level: 2, effect: "Range +1" },
            SkillLevel { level: 3, effect: "Range +1" },
        ],
    },
    SkillData {
        id: SkillId::Focus,
        key: "focus",
        name: "Focus",
        kind: SkillKind::Buffer,
        description: "Self buff",
        range: None,
        levels: &[
            SkillLevel { level: 1, effect: "+30% damage, -30% damage taken for 3 turns" },
            SkillLevel { level: 2, effect: "+40% damage, -40% damage taken for 3 turns" },
            SkillLevel { level: 3, effect: "+50% damage, -50% damage taken, 20% critical for 3 turns" },
        ],
    },
];

pub fn skill_data(id: SkillId) -> &'static SkillData {
    match id {
        SkillId::QuickStrike => &SKILLS[0],
        SkillId::ThrowingDagger => &SKILLS[1],
        SkillId::Focus => &SKILLS[2],
    }
}
