/// Narrative text. Everything here is opaque player-facing data; the
/// simulation only chooses which entry to send.

use super::quest::QuestStage;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Speech {
    pub speaker: &'static str,
    pub lines: &'static [&'static str],
}

pub const ELDER: &str = "Elda Lin";
pub const LORE_STONE: &str = "Ancient Tablet";
pub const FAIRY: &str = "Nova";
pub const GOLEM: &str = "Cobalt Golem";
pub const SYSTEM: &str = "System";

pub const OPENING: Speech = Speech {
    speaker: ELDER,
    lines: &[
        "Arin, the Lumintree's breath grows faint.",
        "Only the seed can bring morning back to the valley. Will you speak with me?",
    ],
};

pub const RESUMED: Speech = Speech {
    speaker: SYSTEM,
    lines: &["Resuming your saved adventure."],
};

/// What the elder says at each stage. Reaching `Intro` and `SeedFound`
/// here also advances the quest; the caller owns that side effect.
pub fn elder(stage: QuestStage) -> Speech {
    let lines: &'static [&'static str] = match stage {
        QuestStage::Intro => &[
            "Follow the traces of light left in the pond. You will find signs of the seed there.",
            "When you are ready, search the pond to the north. I will keep praying by the Lumintree.",
        ],
        QuestStage::Accepted => &["Bring back the echo of light from the pond. Its whisper will open the way."],
        QuestStage::Attuned => &["Follow the path the pond revealed to the altar. Beware the shadow golem."],
        QuestStage::Battle => &["Take the seed back from the golem. Nova will light your way!"],
        QuestStage::SeedFound => &[
            "This radiance... the Lumin Seed! Well done, Arin.",
            "Offer it at the altar and dawn will return to the valley. You are a true guardian.",
        ],
        QuestStage::Completed => &["The valley breathes evenly again. Your adventure is only beginning."],
    };
    Speech { speaker: ELDER, lines }
}

pub const LORE_FIRST_READ: Speech = Speech {
    speaker: LORE_STONE,
    lines: &[
        "\"When the Lumintree weakens, the forest guardian wakes from its sleep.\"",
        "\"Only one who restores the vein of light may lull it back to rest.\"",
    ],
};

pub const LORE_ALREADY_READ: Speech = Speech {
    speaker: LORE_STONE,
    lines: &["Light shines brightest where it meets shadow. You have already read this record."],
};

pub const POND_ATTUNED: Speech = Speech {
    speaker: FAIRY,
    lines: &["The pond is showing us a glowing trail! With this power we can open the altar's seal."],
};

pub const GOLEM_WAKES: Speech = Speech {
    speaker: GOLEM,
    lines: &["Do the chains of light seek to bind me again... This grove is my domain now!"],
};

pub const GOLEM_DEFEATED: Speech = Speech {
    speaker: FAIRY,
    lines: &["The light is breathing again! The seed fell somewhere nearby. Let's find it!"],
};

pub const PLAYER_STAGGERED: Speech = Speech {
    speaker: FAIRY,
    lines: &["Arin! We can't give up yet. Get back up!"],
};

// ── Quest log entries ──

pub const LOG_LORE_READ: &str = "Learned a chant from the ancient tablet that steadies the Lumin Seed.";
pub const LOG_POND_ATTUNED: &str = "Received the echo of light at the still pond.";
pub const LOG_GOLEM_WOKE: &str = "The Cobalt Golem has awakened. Prepare for battle.";
pub const LOG_GOLEM_DEFEATED: &str = "Calmed the Cobalt Golem and uncovered the Lumin Seed.";

// ── System messages ──

pub const MSG_SEED_COLLECTED: &str = "You obtained the Lumin Seed. Return to Elda Lin.";
pub const MSG_SAVED: &str = "Progress saved.";
pub const MSG_SAVE_FAILED: &str = "Saving failed.";
pub const MSG_LOADED: &str = "Save loaded.";
pub const MSG_NO_SAVE: &str = "There is no save to load.";
pub const MSG_SAVE_CLEARED: &str = "Saved progress erased.";
pub const MSG_CLEAR_FAILED: &str = "The save could not be erased.";
