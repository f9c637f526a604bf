use std::fmt;

use serde::{Deserialize, Serialize};

/// Character class. Class-specific formula branches match on this instead of comparing strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Archetype {
    #[default]
    Warrior,
    Cleric,
    Paladin,
    Ranger,
    Shadowknight,
    Druid,
    Monk,
    Bard,
    Rogue,
    Shaman,
    Necromancer,
    Wizard,
    Magician,
    Enchanter,
    Beastlord,
}

impl Archetype {
    pub const ALL: [Archetype; 15] = [
        Self::Warrior,
        Self::Cleric,
        Self::Paladin,
        Self::Ranger,
        Self::Shadowknight,
        Self::Druid,
        Self::Monk,
        Self::Bard,
        Self::Rogue,
        Self::Shaman,
        Self::Necromancer,
        Self::Wizard,
        Self::Magician,
        Self::Enchanter,
        Self::Beastlord,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warrior => "warrior",
            Self::Cleric => "cleric",
            Self::Paladin => "paladin",
            Self::Ranger => "ranger",
            Self::Shadowknight => "shadowknight",
            Self::Druid => "druid",
            Self::Monk => "monk",
            Self::Bard => "bard",
            Self::Rogue => "rogue",
            Self::Shaman => "shaman",
            Self::Necromancer => "necromancer",
            Self::Wizard => "wizard",
            Self::Magician => "magician",
            Self::Enchanter => "enchanter",
            Self::Beastlord => "beastlord",
        }
    }

    /// Bards and beastlords never double attack.
    pub const fn can_double_attack(self) -> bool {
        !matches!(self, Self::Bard | Self::Beastlord)
    }

    /// Class gate only; the level gate lives in [`crate::combat::formulas::can_triple_attack`].
    pub const fn can_triple_attack(self) -> bool {
        matches!(self, Self::Warrior | Self::Monk)
    }

    pub const fn can_dual_wield(self) -> bool {
        !matches!(self, Self::Paladin | Self::Shadowknight)
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
