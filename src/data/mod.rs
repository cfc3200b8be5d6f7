// Static game data - stages, enemy templates, skills, items, dialogue and endings
pub mod dialogue;
pub mod endings;
pub mod enemies;
pub mod items;
pub mod skills;
pub mod stage;

// Re-export commonly used types
pub use dialogue::{dialogue_for, Dialogue};
pub use endings::{ending, select_ending, EndingType};
pub use enemies::{enemy_data, EnemyData, EnemyKind, REGULAR_ENEMIES};
pub use items::{item_data, stage_items, ItemKind};
pub use skills::{skill_data, SkillData, SkillId, SkillKind, SKILLS};
pub use stage::{stage_config, MapSize, StageConfig, StageId, STAGES};
