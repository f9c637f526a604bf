use serde::{Deserialize, Serialize};

use crate::combat::FightConfig;

pub const EVENT_SIM_RUN: &str = "sim_run";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
}

/// One completed run as written to the usage log. Field names follow the log's wire format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSummary {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(rename = "classId", skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub w1: Option<PresetRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub w2: Option<PresetRef>,
    #[serde(rename = "specialAttacks")]
    pub special_attacks: bool,
    pub fistweaving: bool,
    /// RFC 3339 timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
}

impl RunSummary {
    /// Describe a local run. Weapon names double as preset names.
    pub fn from_config(config: &FightConfig, uid: Option<String>) -> Self {
        Self {
            event: EVENT_SIM_RUN.to_string(),
            uid,
            class_id: Some(config.attacker.archetype.to_string()),
            w1: Some(PresetRef {
                preset: config.main_hand.name.clone(),
            }),
            w2: config.off_hand.as_ref().map(|w| PresetRef {
                preset: w.name.clone(),
            }),
            special_attacks: config.scenario.special_attacks,
            fistweaving: config.scenario.fistweaving,
            ts: Some(chrono::Utc::now().to_rfc3339()),
        }
    }
}
