use serde::Serialize;
use super::stage::StageId;

#[derive(Clone, Copy, Debug, Serialize)]
pub struct Dialogue {
    pub speaker: &'static str,
    pub text: &'static str,
}

const STAGE1: &[Dialogue] = &[
    Dialogue { speaker: "Cheolsu", text: "I'm pretty sure she came this way..." },
    Dialogue { speaker: "System", text: "(Tiny paw prints are left on the ground)" },
    Dialogue { speaker: "Cheolsu", text: "Hey... you're doing fine on your own, right? Please." },
];

const STAGE2: &[Dialogue] = &[
    Dialogue { speaker: "Old Man", text: "That cat? She went further in." },
    Dialogue { speaker: "Cheolsu", text: "Of course. Every forest needs one old man." },
    Dialogue { speaker: "Old Man", text: "I can show you the path, but I can't walk it for you." },
];

const STAGE3: &[Dialogue] = &[
    Dialogue { speaker: "Cheolsu", text: "That smell... it's familiar." },
    Dialogue { speaker: "System", text: "(A cat cries somewhere in the distance)" },
    Dialogue { speaker: "Cheolsu", text: "You're there, aren't you? Just wait." },
];

const BOSS: &[Dialogue] = &[
    Dialogue { speaker: "Guardian of the Forest", text: "Entering this forest was your own choice." },
    Dialogue { speaker: "Cheolsu", text: "I only came to pick up a cat, and now look at this." },
];

pub fn dialogue_for(stage: StageId) -> &'static [Dialogue] {
    match stage {
        StageId::Stage1 => STAGE1,
        StageId::Stage2 => STAGE2,
        StageId::Stage3 => STAGE3,
        StageId::Boss => BOSS,
    }
}
