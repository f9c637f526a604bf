use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::archetype::Archetype;

pub const DEFAULT_LEVEL: i32 = 60;
pub const DEFAULT_STAT: i32 = 255;
pub const DEFAULT_SKILL_CAP: i32 = 252;
pub const DEFAULT_BACKSTAB_SKILL: i32 = 225;
pub const DEFAULT_DURATION_SEC: f64 = 600.0;

pub const MAX_LEVEL: i32 = 100;
pub const MAX_DURATION_SEC: f64 = 7_200.0;
pub const MAX_WEAPON_DAMAGE: u32 = 10_000;
pub const MAX_WEAPON_DELAY: u32 = 1_000;
/// Ceiling for stats, skills, and percent mods.
pub const MAX_STAT: i32 = 1_000;
/// Ceiling for attack, to-hit, AC, and avoidance terms.
pub const MAX_RATING: i32 = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub damage: u32,
    /// Deciseconds.
    pub delay: u32,
    #[serde(default)]
    pub two_handed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proc_spell: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proc_spell_damage: Option<i32>,
}

impl Weapon {
    pub fn new(damage: u32, delay: u32) -> Self {
        Self {
            name: None,
            damage,
            delay,
            two_handed: false,
            proc_spell: None,
            proc_spell_damage: None,
        }
    }

    pub fn damage_i32(&self) -> i32 {
        i32::try_from(self.damage).unwrap_or(i32::MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackerConfig {
    pub archetype: Archetype,
    pub level: i32,
    pub strength: i32,
    pub dexterity: i32,
    pub haste_percent: f64,
    pub offense_skill: i32,
    pub weapon_skill: i32,
    pub double_attack_skill: i32,
    pub dual_wield_skill: i32,
    pub backstab_skill: i32,
    pub ambidexterity: i32,
    pub attack_rating: Option<i32>,
    pub worn_attack: Option<i32>,
    pub spell_attack: Option<i32>,
    pub to_hit_bonus: i32,
    pub crit_chance_multiplier: f64,
    pub berserk: bool,
    pub crippling_blow_chance: f64,
}

impl Default for AttackerConfig {
    fn default() -> Self {
        Self {
            archetype: Archetype::Warrior,
            level: DEFAULT_LEVEL,
            strength: DEFAULT_STAT,
            dexterity: DEFAULT_STAT,
            haste_percent: 0.0,
            offense_skill: DEFAULT_SKILL_CAP,
            weapon_skill: DEFAULT_SKILL_CAP,
            double_attack_skill: 0,
            dual_wield_skill: 0,
            backstab_skill: DEFAULT_BACKSTAB_SKILL,
            ambidexterity: 0,
            attack_rating: None,
            worn_attack: None,
            spell_attack: None,
            to_hit_bonus: 0,
            crit_chance_multiplier: 0.0,
            berserk: false,
            crippling_blow_chance: 0.0,
        }
    }
}

/// Where to-hit and offense come from. The two paths never mix within a fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffenseSource {
    /// A character-sheet attack rating, used only when no worn/spell attack is given.
    AttackRating(i32),
    Baseline { worn_attack: i32, spell_attack: i32 },
}

/// Offense contributed by strength: `(2*STR - 150) / 3` from 75 STR up.
pub fn str_bonus(strength: i32) -> i32 {
    if strength >= 75 {
        (2 * strength - 150).div_euclid(3)
    } else {
        0
    }
}

impl AttackerConfig {
    pub fn offense_source(&self) -> OffenseSource {
        match (self.attack_rating, self.worn_attack, self.spell_attack) {
            (Some(rating), None, None) => OffenseSource::AttackRating(rating),
            (_, worn, spell) => OffenseSource::Baseline {
                worn_attack: worn.unwrap_or(0),
                spell_attack: spell.unwrap_or(0),
            },
        }
    }

    /// `(to_hit, offense)` for damage and hit rolls.
    pub fn to_hit_and_offense(&self) -> (i32, i32) {
        let strength = str_bonus(self.strength);
        match self.offense_source() {
            OffenseSource::AttackRating(rating) => (rating + self.to_hit_bonus, rating + strength),
            OffenseSource::Baseline {
                worn_attack,
                spell_attack,
            } => (
                7 + self.offense_skill + self.weapon_skill + self.to_hit_bonus,
                self.weapon_skill + strength + worn_attack + spell_attack,
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefenderConfig {
    pub level: i32,
    pub armor_class: Option<i32>,
    pub item_ac_bonus: i32,
    pub spell_ac_bonus: i32,
    /// Overrides the level-derived avoidance.
    pub avoidance: Option<i32>,
}

impl Default for DefenderConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            armor_class: None,
            item_ac_bonus: 0,
            spell_ac_bonus: 0,
            avoidance: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub from_behind: bool,
    pub special_attacks: bool,
    pub fistweaving: bool,
    pub backstab_mod_percent: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FightConfig {
    pub main_hand: Weapon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub off_hand: Option<Weapon>,
    #[serde(default)]
    pub attacker: AttackerConfig,
    #[serde(default)]
    pub defender: DefenderConfig,
    #[serde(default)]
    pub scenario: ScenarioConfig,
    #[serde(default = "default_duration")]
    pub duration_sec: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_duration() -> f64 {
    DEFAULT_DURATION_SEC
}

impl FightConfig {
    pub fn new(main_hand: Weapon) -> Self {
        Self {
            main_hand,
            off_hand: None,
            attacker: AttackerConfig::default(),
            defender: DefenderConfig::default(),
            scenario: ScenarioConfig::default(),
            duration_sec: DEFAULT_DURATION_SEC,
            seed: None,
        }
    }

    pub fn from_json(body: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(body)?)
    }

    /// Read, parse, and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let body = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&body)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let issues = self.validation_issues();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(issues))
        }
    }

    pub fn validation_issues(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        check_weapon(&mut issues, "main_hand", &self.main_hand);
        if let Some(off_hand) = &self.off_hand {
            check_weapon(&mut issues, "off_hand", off_hand);
        }

        if !self.duration_sec.is_finite()
            || self.duration_sec <= 0.0
            || self.duration_sec > MAX_DURATION_SEC
        {
            issues.push(ValidationIssue::new(
                "duration_sec",
                format!("must be greater than 0 and at most {MAX_DURATION_SEC}"),
            ));
        }

        let attacker = &self.attacker;
        if !(1..=MAX_LEVEL).contains(&attacker.level) {
            issues.push(ValidationIssue::new(
                "attacker.level",
                format!("must be between 1 and {MAX_LEVEL}"),
            ));
        }
        if !attacker.haste_percent.is_finite() || attacker.haste_percent <= -100.0 {
            issues.push(ValidationIssue::new(
                "attacker.haste_percent",
                "must be a number greater than -100",
            ));
        }
        let stats = [
            ("attacker.strength", attacker.strength),
            ("attacker.dexterity", attacker.dexterity),
            ("attacker.offense_skill", attacker.offense_skill),
            ("attacker.weapon_skill", attacker.weapon_skill),
            ("attacker.double_attack_skill", attacker.double_attack_skill),
            ("attacker.dual_wield_skill", attacker.dual_wield_skill),
            ("attacker.backstab_skill", attacker.backstab_skill),
            ("attacker.ambidexterity", attacker.ambidexterity),
            ("scenario.backstab_mod_percent", self.scenario.backstab_mod_percent),
        ];
        for (field, value) in stats {
            check_range(&mut issues, field, Some(value), MAX_STAT);
        }
        let ratings = [
            ("attacker.attack_rating", attacker.attack_rating),
            ("attacker.worn_attack", attacker.worn_attack),
            ("attacker.spell_attack", attacker.spell_attack),
            ("attacker.to_hit_bonus", Some(attacker.to_hit_bonus)),
            ("defender.armor_class", self.defender.armor_class),
            ("defender.item_ac_bonus", Some(self.defender.item_ac_bonus)),
            ("defender.spell_ac_bonus", Some(self.defender.spell_ac_bonus)),
            ("defender.avoidance", self.defender.avoidance),
        ];
        for (field, value) in ratings {
            check_range(&mut issues, field, value, MAX_RATING);
        }
        if !(0.0..=f64::from(MAX_STAT)).contains(&attacker.crit_chance_multiplier) {
            issues.push(ValidationIssue::new(
                "attacker.crit_chance_multiplier",
                format!("must be between 0 and {MAX_STAT}"),
            ));
        }
        if !(0.0..=100.0).contains(&attacker.crippling_blow_chance) {
            issues.push(ValidationIssue::new(
                "attacker.crippling_blow_chance",
                "must be between 0 and 100",
            ));
        }

        if !(1..=MAX_LEVEL).contains(&self.defender.level) {
            issues.push(ValidationIssue::new(
                "defender.level",
                format!("must be between 1 and {MAX_LEVEL}"),
            ));
        }
        issues
    }
}

/// Absent optional values pass.
fn check_range(
    issues: &mut Vec<ValidationIssue>,
    field: &'static str,
    value: Option<i32>,
    max: i32,
) {
    if value.is_some_and(|v| !(0..=max).contains(&v)) {
        issues.push(ValidationIssue::new(
            field,
            format!("must be between 0 and {max}"),
        ));
    }
}

fn check_weapon(issues: &mut Vec<ValidationIssue>, slot: &'static str, weapon: &Weapon) {
    let mut messages = Vec::new();
    if weapon.delay == 0 || weapon.delay > MAX_WEAPON_DELAY {
        messages.push(format!("delay must be between 1 and {MAX_WEAPON_DELAY}"));
    }
    if weapon.damage > MAX_WEAPON_DAMAGE {
        messages.push(format!("damage must be at most {MAX_WEAPON_DAMAGE}"));
    }
    if weapon
        .proc_spell_damage
        .is_some_and(|d| !(0..=MAX_RATING).contains(&d))
    {
        messages.push(format!("proc_spell_damage must be between 0 and {MAX_RATING}"));
    }
    if !messages.is_empty() {
        issues.push(ValidationIssue {
            field: slot,
            messages,
        });
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub messages: Vec<String>,
}

impl ValidationIssue {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            messages: vec![message.into()],
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.messages.join(", "))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid fight config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid fight config: {}", join_issues(.0))]
    Invalid(Vec<ValidationIssue>),
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
