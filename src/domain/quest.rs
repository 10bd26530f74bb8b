/// Quest stages and their description table.
///
/// Stages are totally ordered; live play only ever moves one step forward.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestStage {
    Intro,
    Accepted,
    Attuned,
    Battle,
    SeedFound,
    Completed,
}

pub const STAGE_ORDER: [QuestStage; 6] = [
    QuestStage::Intro,
    QuestStage::Accepted,
    QuestStage::Attuned,
    QuestStage::Battle,
    QuestStage::SeedFound,
    QuestStage::Completed,
];

/// Shown for any stage text the table does not know.
pub const FALLBACK_DESCRIPTION: &str = "Continue your adventure.";

impl QuestStage {
    /// The immediate successor, or None at the end of the quest.
    pub fn next(self) -> Option<QuestStage> {
        let idx = STAGE_ORDER.iter().position(|s| *s == self)?;
        STAGE_ORDER.get(idx + 1).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QuestStage::Intro => "intro",
            QuestStage::Accepted => "accepted",
            QuestStage::Attuned => "attuned",
            QuestStage::Battle => "battle",
            QuestStage::SeedFound => "seedFound",
            QuestStage::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<QuestStage> {
        STAGE_ORDER.iter().copied().find(|stage| stage.as_str() == s)
    }

    pub fn description(self) -> &'static str {
        match self {
            QuestStage::Intro => "Speak with Elder Elda Lin.",
            QuestStage::Accepted => "Investigate the still pond to the north.",
            QuestStage::Attuned => "Follow the pond's whisper to the altar.",
            QuestStage::Battle => "Subdue the Cobalt Golem and recover the Lumin Seed.",
            QuestStage::SeedFound => "Bring the Lumin Seed to Elda Lin.",
            QuestStage::Completed => "The Lumintree shines once more. Congratulations!",
        }
    }
}

impl std::fmt::Display for QuestStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Description for raw stage text, e.g. from a hand-edited save.
pub fn describe_raw(stage: &str) -> &'static str {
    QuestStage::parse(stage)
        .map(QuestStage::description)
        .unwrap_or(FALLBACK_DESCRIPTION)
}

/// One quest-log line. `timestamp_ms` is wall-clock milliseconds since the epoch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestEntry {
    pub text: String,
    pub timestamp_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successor_chain_walks_the_whole_order() {
        let mut stage = QuestStage::Intro;
        let mut seen = vec![stage];
        while let Some(next) = stage.next() {
            assert!(next > stage);
            seen.push(next);
            stage = next;
        }
        assert_eq!(seen, STAGE_ORDER.to_vec());
        assert_eq!(QuestStage::Completed.next(), None);
    }

    #[test]
    fn parse_accepts_wire_names_only() {
        assert_eq!(QuestStage::parse("seedFound"), Some(QuestStage::SeedFound));
        assert_eq!(QuestStage::parse("SeedFound"), None);
        assert_eq!(QuestStage::parse(""), None);
    }

    #[test]
    fn serde_names_match_wire_names() {
        for stage in STAGE_ORDER {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{}\"", stage.as_str()));
        }
    }

    #[test]
    fn unknown_stage_text_gets_fallback_description() {
        assert_eq!(describe_raw("dragonSlain"), FALLBACK_DESCRIPTION);
        assert_eq!(describe_raw("battle"), QuestStage::Battle.description());
    }

    #[test]
    fn every_stage_has_a_distinct_description() {
        let mut texts: Vec<&str> = STAGE_ORDER.iter().map(|s| s.description()).collect();
        texts.sort();
        texts.dedup();
        assert_eq!(texts.len(), STAGE_ORDER.len());
        assert!(!texts.contains(&FALLBACK_DESCRIPTION));
    }
}
