use serde::{Deserialize, Serialize};
use crate::data::{skill_data, SkillData, SkillId, SkillKind, StageId};
use crate::entity::Buff;

pub const MAX_SKILL_LEVEL: u32 = 3;
pub const INITIAL_USE_COUNT: u32 = 3;
pub const FOCUS_TURNS: u32 = 3;

/// Owned skill instance. The static definition lives in `data::skills`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: SkillId,
    pub level: u32,      // 1..=3, never decreases
    pub use_count: u32,  // Remaining uses this stage
}

impl Skill {
    pub fn new(id: SkillId) -> Self {
        Self {
            id,
            level: 1,
            use_count: INITIAL_USE_COUNT,
        }
    }

    pub fn data(&self) -> &'static SkillData {
        skill_data(self.id)
    }

    pub fn kind(&self) -> SkillKind {
        self.data().kind
    }

    pub fn name(&self) -> &'static str {
        self.data().name
    }

    pub fn can_use(&self) -> bool {
        self.use_count > 0
    }

    /// Spends one use. Returns false, spending nothing, when none are left.
    pub fn consume(&mut self) -> bool {
        if self.use_count == 0 {
            return false;
        }
        self.use_count -= 1;
        true
    }

    /// Raises the level by one step; returns false when already at max.
    pub fn level_up(&mut self) -> bool {
        if self.level >= MAX_SKILL_LEVEL {
            return false;
        }
        self.level += 1;
        true
    }

    pub fn current_effect(&self) -> &'static str {
        self.data().effect_at(self.level).unwrap_or("")
    }

    pub fn next_effect(&self) -> Option<&'static str> {
        self.data().effect_at(self.level + 1)
    }
}

/// Maximum target distance after level modifiers.
///
/// Melee is contact range no matter what the definition declares. Ranged gains
/// a single flat +1 from level 2 on. Buffer skills target the caster and have
/// no meaningful range; callers handle them before asking.
pub fn effective_range(skill: &Skill) -> i32 {
    let data = skill.data();
    match data.kind {
        SkillKind::Melee => 1,
        SkillKind::Ranged => data.range.unwrap_or(1) + if skill.level >= 2 { 1 } else { 0 },
        SkillKind::Buffer => 0,
    }
}

/// Uses granted by a skill reset item: 3 on stage1 up to 6 on the boss stage.
pub fn skill_reset_baseline(stage: StageId) -> u32 {
    INITIAL_USE_COUNT + stage.index()
}

/// Quick Strike damage multiplier and hit count for a level.
pub fn quick_strike_profile(level: u32) -> (f64, u32) {
    match level {
        0 | 1 => (1.3, 1),
        2 => (1.5, 1),
        _ => (1.5, 2),
    }
}

/// Buff applied by Focus at a level.
pub fn focus_buff(level: u32) -> Buff {
    let (amount, critical_chance) = match level {
        0 | 1 => (0.3, 0.0),
        2 => (0.4, 0.0),
        _ => (0.5, 0.2),
    };
    Buff {
        damage_bonus: amount,
        damage_reduction: amount,
        critical_chance,
        turns_remaining: FOCUS_TURNS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn melee_range_is_always_one() {
        let mut skill = Skill::new(SkillId::QuickStrike);
        for _ in 0..4 {
            assert_eq!(effective_range(&skill), 1);
            skill.level_up();
        }
    }

    #[test]
    fn ranged_range_steps_once_at_level_two() {
        let mut dagger = Skill::new(SkillId::ThrowingDagger);
        assert_eq!(effective_range(&dagger), 3);
        dagger.level_up();
        assert_eq!(effective_range(&dagger), 4);
        dagger.level_up();
        assert_eq!(effective_range(&dagger), 4);
    }

    #[test]
    fn level_is_capped_at_three() {
        let mut skill = Skill::new(SkillId::Focus);
        assert!(skill.level_up());
        assert!(skill.level_up());
        assert!(!skill.level_up());
        assert_eq!(skill.level, MAX_SKILL_LEVEL);
        assert!(skill.next_effect().is_none());
    }

    #[test]
    fn consume_floors_at_zero() {
        let mut skill = Skill::new(SkillId::ThrowingDagger);
        assert!(skill.consume());
        assert!(skill.consume());
        assert!(skill.consume());
        assert!(!skill.consume());
        assert_eq!(skill.use_count, 0);
        assert!(!skill.can_use());
    }

    #[test]
    fn reset_baseline_scales_with_stage() {
        assert_eq!(skill_reset_baseline(StageId::Stage1), 3);
        assert_eq!(skill_reset_baseline(StageId::Stage2), 4);
        assert_eq!(skill_reset_baseline(StageId::Stage3), 5);
        assert_eq!(skill_reset_baseline(StageId::Boss), 6);
    }

    #[test]
    fn focus_levels() {
        let buff = focus_buff(1);
        assert_eq!((buff.damage_bonus, buff.damage_reduction, buff.critical_chance), (0.3, 0.3, 0.0));
        let buff = focus_buff(2);
        assert_eq!((buff.damage_bonus, buff.damage_reduction, buff.critical_chance), (0.4, 0.4, 0.0));
        let buff = focus_buff(3);
        assert_eq!((buff.damage_bonus, buff.damage_reduction, buff.critical_chance), (0.5, 0.5, 0.2));
        assert_eq!(buff.turns_remaining, 3);
    }
}
