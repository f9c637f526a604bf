//! Class special attacks fired on their own cooldown alongside melee rounds.

use super::archetype::Archetype;

/// Backstab effective skill is capped here when computing damage.
pub const BACKSTAB_SKILL_CAP: i32 = 252;
/// Cap shown on the report's "effective backstab skill" line.
pub const BACKSTAB_DISPLAY_SKILL_CAP: i32 = 255;
/// Double backstab requires a rogue above this level.
pub const DOUBLE_BACKSTAB_MIN_LEVEL: i32 = 54;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialKind {
    FlyingKick,
    Backstab,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecialAttack {
    pub kind: SpecialKind,
    pub name: &'static str,
    /// Deciseconds between uses.
    pub cooldown: u32,
    pub damage_multiplier: f64,
    pub from_behind_only: bool,
}

pub const FLYING_KICK: SpecialAttack = SpecialAttack {
    kind: SpecialKind::FlyingKick,
    name: "Flying Kick",
    cooldown: 80,
    damage_multiplier: 2.0,
    from_behind_only: false,
};

pub const BACKSTAB: SpecialAttack = SpecialAttack {
    kind: SpecialKind::Backstab,
    name: "Backstab",
    cooldown: 120,
    damage_multiplier: 3.0,
    from_behind_only: true,
};

pub fn special_attack_for(archetype: Archetype) -> Option<&'static SpecialAttack> {
    match archetype {
        Archetype::Monk => Some(&FLYING_KICK),
        Archetype::Rogue => Some(&BACKSTAB),
        _ => None,
    }
}

impl SpecialAttack {
    pub fn can_fire(&self, from_behind: bool) -> bool {
        !self.from_behind_only || from_behind
    }

    /// Backstab must pass a hit roll; flying kick always lands.
    pub fn rolls_to_hit(&self) -> bool {
        self.kind == SpecialKind::Backstab
    }
}

fn modded_skill(skill: i32, mod_percent: i32) -> i32 {
    (skill * (100 + mod_percent)).div_euclid(100)
}

/// Skill used for backstab damage.
pub fn effective_backstab_skill(skill: i32, mod_percent: i32) -> i32 {
    modded_skill(skill, mod_percent).min(BACKSTAB_SKILL_CAP)
}

/// Skill shown on the report when a mod percent is active.
pub fn displayed_backstab_skill(skill: i32, mod_percent: i32) -> i32 {
    modded_skill(skill, mod_percent).min(BACKSTAB_DISPLAY_SKILL_CAP)
}

/// `(skill * 0.02 + 2) * weapon damage`, before the damage roll.
pub fn backstab_base_damage(effective_skill: i32, weapon_damage: i32) -> i32 {
    ((f64::from(effective_skill) * 0.02 + 2.0) * f64::from(weapon_damage)).floor() as i32
}

pub fn backstab_min_hit(level: i32) -> i32 {
    if level >= 60 {
        level * 2
    } else if level > 50 {
        level * 3 / 2
    } else {
        level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_covers_monk_and_rogue_only() {
        assert_eq!(special_attack_for(Archetype::Monk), Some(&FLYING_KICK));
        assert_eq!(special_attack_for(Archetype::Rogue), Some(&BACKSTAB));
        let others = Archetype::ALL
            .iter()
            .filter(|a| special_attack_for(**a).is_some())
            .count();
        assert_eq!(others, 2);
    }

    #[test]
    fn backstab_needs_position() {
        assert!(!BACKSTAB.can_fire(false));
        assert!(BACKSTAB.can_fire(true));
        assert!(FLYING_KICK.can_fire(false));
    }

    #[test]
    fn backstab_skill_caps_differ() {
        assert_eq!(effective_backstab_skill(225, 0), 225);
        assert_eq!(effective_backstab_skill(225, 20), 252);
        assert_eq!(displayed_backstab_skill(225, 20), 255);
        assert_eq!(displayed_backstab_skill(200, 10), 220);
    }

    #[test]
    fn backstab_base_and_min_hit() {
        // (252*0.02 + 2) * 10 = 70.4
        assert_eq!(backstab_base_damage(252, 10), 70);
        assert_eq!(backstab_min_hit(60), 120);
        assert_eq!(backstab_min_hit(55), 82);
        assert_eq!(backstab_min_hit(40), 40);
    }
}
