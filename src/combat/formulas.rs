//! Melee resolution formulas from the EQMac server emulator (`zone/attack.cpp`).
//!
//! Every function is pure apart from the draws it takes from the supplied [`RandomSource`].
//! Draw order and draw count are part of each function's contract: a seeded fight only replays
//! identically if every branch consumes exactly the same draws.
//!
//! Hit chance is driven by the defender's *avoidance*; the damage roll by its *mitigation*. The
//! two are different numbers and must not be swapped.

use super::archetype::Archetype;
use super::rng::RandomSource;

/// To-hit past this point no longer raises hit chance.
pub const TO_HIT_CAP_FOR_AVOIDANCE: i32 = 550;
/// Block / parry / dodge / riposte, rolled only when attacking from the front.
pub const AVOID_CHANCE_FROM_FRONT: f64 = 0.08;
pub const NORMAL_CRIT_MOD: i32 = 17;
pub const CRIPPLING_CRIT_MOD: i32 = 29;
/// Share of successful double-attack rounds that go on to triple.
pub const TRIPLE_ATTACK_CHANCE: f64 = 0.135;
/// One second; haste cannot push a swing timer below this.
pub const MIN_SWING_DELAY: f64 = 10.0;
/// `RuleI(Combat, ClientBaseCritChance)`.
pub const CLIENT_BASE_CRIT_CHANCE: f64 = 0.0;

/// Integer division rounding toward negative infinity. `divisor` must be positive.
#[inline]
fn floor_div(value: i32, divisor: i32) -> i32 {
    value.div_euclid(divisor)
}

// ----- Hit / miss -----

/// Config validation keeps both inputs non-negative; other inputs are clamped into `[0, 1]`.
pub fn hit_chance(to_hit: i32, avoidance: i32) -> f64 {
    let attack = f64::from(to_hit.min(TO_HIT_CAP_FOR_AVOIDANCE) + 10);
    let avoid = f64::from(avoidance + 10);
    let scaled = attack * 1.21;
    let chance = if scaled > avoid {
        1.0 - avoid / (scaled * 2.0)
    } else {
        scaled / (avoid * 2.0)
    };
    chance.clamp(0.0, 1.0)
}

/// One draw for the hit roll; a second draw for active avoidance unless attacking from behind.
pub fn roll_hit<R: RandomSource + ?Sized>(
    to_hit: i32,
    avoidance: i32,
    from_behind: bool,
    rng: &mut R,
) -> bool {
    if rng.next_f64() >= hit_chance(to_hit, avoidance) {
        return false;
    }
    if from_behind {
        return true;
    }
    rng.next_f64() >= AVOID_CHANCE_FROM_FRONT
}

// ----- Defender -----

/// NPC `GetAvoidance()`: `level*9+5`, capped at 400 through level 50 and 460 above.
pub fn avoidance_from_level(level: i32) -> i32 {
    let avoidance = level * 9 + 5;
    let cap = if level <= 50 { 400 } else { 460 };
    avoidance.min(cap).max(1)
}

/// NPC `GetMitigation()`. Level-derived and capped at 200; a mob sitting on the cap with a
/// database AC above 200 uses that AC instead. Item and spell AC are added afterwards.
pub fn mitigation_from_level(
    level: i32,
    armor_class: Option<i32>,
    item_ac_bonus: i32,
    spell_ac_bonus: i32,
) -> i32 {
    let mut mitigation = if level < 15 {
        let base = level * 3;
        if level < 3 {
            base + 2
        } else {
            base
        }
    } else {
        floor_div(level * 41, 10) - 15
    };
    mitigation = mitigation.min(200);
    if mitigation == 200 {
        if let Some(ac) = armor_class.filter(|ac| *ac > 200) {
            mitigation = ac;
        }
    }
    mitigation += floor_div(4 * item_ac_bonus, 3) + floor_div(spell_ac_bonus, 4);
    mitigation.max(1)
}

// ----- Damage roll -----

/// `RollD20`: returns a damage index in `1..=20`.
///
/// The degenerate guard runs before any draw, so a zero average consumes nothing.
pub fn roll_damage_index<R: RandomSource + ?Sized>(
    offense: i32,
    mitigation: i32,
    rng: &mut R,
) -> i32 {
    let avg = floor_div(offense + mitigation + 10, 2);
    if avg <= 0 {
        return 1;
    }
    let atk_roll = (rng.next_f64() * f64::from(offense + 5)).floor() as i32;
    let def_roll = (rng.next_f64() * f64::from(mitigation + 5)).floor() as i32;
    let index = ((atk_roll - def_roll) + avg / 2).max(0);
    let index = (index * 20 / avg).clamp(0, 19);
    index + 1
}

/// `CalcMeleeDamage`: `(index * base + 5) / 10`, at least 1, plus the flat bonus.
pub fn melee_damage<R: RandomSource + ?Sized>(
    base_damage: i32,
    offense: i32,
    mitigation: i32,
    flat_bonus: i32,
    rng: &mut R,
) -> i32 {
    let index = roll_damage_index(offense, mitigation, rng);
    floor_div(index * base_damage + 5, 10).max(1) + flat_bonus
}

// ----- Damage multiplier ("crush" roll) -----

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiplierBracket {
    /// Percent chance the multiplier applies at all.
    pub roll_chance: i32,
    /// Ceiling on the multiplier percent.
    pub max_extra: i32,
    pub minus_factor: i32,
}

impl MultiplierBracket {
    const fn new(roll_chance: i32, max_extra: i32, minus_factor: i32) -> Self {
        Self {
            roll_chance,
            max_extra,
            minus_factor,
        }
    }
}

/// Monks reach each bracket a few levels early.
pub fn multiplier_bracket(level: i32, archetype: Archetype) -> MultiplierBracket {
    let monk = archetype == Archetype::Monk;
    if monk && level >= 65 {
        MultiplierBracket::new(83, 300, 50)
    } else if level >= 65 || (monk && level >= 63) {
        MultiplierBracket::new(81, 295, 55)
    } else if level >= 63 || (monk && level >= 60) {
        MultiplierBracket::new(79, 290, 60)
    } else if level >= 60 || (monk && level >= 56) {
        MultiplierBracket::new(77, 285, 65)
    } else if level >= 56 {
        MultiplierBracket::new(72, 265, 70)
    } else if level >= 51 || monk {
        MultiplierBracket::new(65, 245, 80)
    } else {
        MultiplierBracket::new(51, 210, 105)
    }
}

/// Damage after a multiplier or crit roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolledDamage {
    pub damage: i32,
    /// For the multiplier roll: the roll landed above 100%. For crits: the crit landed.
    pub is_crit: bool,
}

impl RolledDamage {
    const fn plain(damage: i32) -> Self {
        Self {
            damage,
            is_crit: false,
        }
    }
}

/// `Client::RollDamageMultiplier`. One draw gates the roll; a second picks the percent.
pub fn damage_multiplier_roll<R: RandomSource + ?Sized>(
    offense: i32,
    damage: i32,
    level: i32,
    archetype: Archetype,
    is_archery: bool,
    rng: &mut R,
) -> RolledDamage {
    let bracket = multiplier_bracket(level, archetype);
    let base_bonus = floor_div(offense - bracket.minus_factor, 2).max(10);

    if rng.next_f64() * 100.0 < f64::from(bracket.roll_chance) {
        let roll = ((rng.next_f64() * f64::from(base_bonus + 1)).floor() as i32 + 100)
            .min(bracket.max_extra);
        let mut damage = floor_div(damage * roll, 100);
        if level >= 55 && damage > 1 && !is_archery && archetype == Archetype::Warrior {
            damage += 1;
        }
        return RolledDamage {
            damage: damage.max(1),
            is_crit: roll > 100,
        };
    }
    RolledDamage::plain(damage.max(1))
}

// ----- Critical hits -----

/// Melee crit chance in percent, clamped to `[0, 100]`.
///
/// DEX above 255 only feeds the smaller over-cap term. Non-warriors without a crit-chance
/// multiplier get no base chance at all.
pub fn crit_chance(
    level: i32,
    archetype: Archetype,
    dex: i32,
    base_crit_chance: f64,
    crit_chance_multiplier: f64,
    is_archery: bool,
) -> f64 {
    let mut chance = base_crit_chance;
    let dex_capped = f64::from(dex.min(255));
    let over_cap = if dex > 255 {
        f64::from(dex - 255) / 400.0
    } else {
        0.0
    };

    if archetype == Archetype::Warrior && level >= 12 {
        chance += 0.5 + dex_capped / 90.0 + over_cap;
    } else if is_archery && archetype == Archetype::Ranger && level > 16 {
        chance += 1.35 + dex_capped / 34.0 + over_cap * 2.0;
    } else if archetype != Archetype::Warrior && crit_chance_multiplier != 0.0 {
        chance += 0.275 + dex_capped / 150.0 + over_cap;
    }

    if crit_chance_multiplier != 0.0 {
        chance += chance * crit_chance_multiplier / 100.0;
    }
    chance.clamp(0.0, 100.0)
}

/// `((damage - bonus) * mod + 5) / 10 + 8 + bonus`, +2 on a crippling blow, at least 1.
pub fn crit_damage(damage: i32, flat_bonus: i32, crit_mod: i32, crippling: bool) -> i32 {
    let mut result = floor_div((damage - flat_bonus) * crit_mod + 5, 10) + 8 + flat_bonus;
    if crippling {
        result += 2;
    }
    result.max(1)
}

/// Attacker-side inputs to [`roll_crit`], fixed for a fight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CritOptions {
    pub level: i32,
    pub archetype: Archetype,
    pub dex: i32,
    /// AA critical hit chance bonus, percent.
    pub crit_chance_multiplier: f64,
    pub is_archery: bool,
    /// Forces the crippling multiplier on every crit.
    pub berserk: bool,
    /// Percent chance a crit becomes a crippling blow.
    pub crippling_blow_chance: f64,
}

impl CritOptions {
    pub fn chance_percent(&self) -> f64 {
        crit_chance(
            self.level,
            self.archetype,
            self.dex,
            CLIENT_BASE_CRIT_CHANCE,
            self.crit_chance_multiplier,
            self.is_archery,
        )
    }
}

/// No draw when the chance is zero. Otherwise one gate draw; on success a crippling draw only
/// when not berserk and the crippling chance is positive.
pub fn roll_crit<R: RandomSource + ?Sized>(
    damage: i32,
    flat_bonus: i32,
    options: &CritOptions,
    rng: &mut R,
) -> RolledDamage {
    let chance = options.chance_percent();
    if chance <= 0.0 {
        return RolledDamage::plain(damage);
    }
    if rng.next_f64() >= chance / 100.0 {
        return RolledDamage::plain(damage);
    }

    let crippling = options.berserk
        || (options.crippling_blow_chance > 0.0
            && rng.next_f64() * 100.0 < options.crippling_blow_chance);
    let crit_mod = if crippling {
        CRIPPLING_CRIT_MOD
    } else {
        NORMAL_CRIT_MOD
    };
    RolledDamage {
        damage: crit_damage(damage, flat_bonus, crit_mod, crippling),
        is_crit: true,
    }
}

// ----- Extra attacks -----

pub fn double_attack_effective(level: i32, double_attack_skill: i32) -> i32 {
    double_attack_skill + level
}

/// `CheckDoubleAttack`: `effective > random(0, 499)`. Excluded classes take no draw.
pub fn double_attack_check<R: RandomSource + ?Sized>(
    effective_skill: i32,
    archetype: Archetype,
    rng: &mut R,
) -> bool {
    if !archetype.can_double_attack() {
        return false;
    }
    effective_skill > (rng.next_f64() * 500.0).floor() as i32
}

pub fn can_triple_attack(level: i32, archetype: Archetype) -> bool {
    archetype.can_triple_attack() && level >= 60
}

/// Only called after a successful double attack. Ineligible attackers take no draw.
pub fn triple_attack_check<R: RandomSource + ?Sized>(
    level: i32,
    archetype: Archetype,
    rng: &mut R,
) -> bool {
    if !can_triple_attack(level, archetype) {
        return false;
    }
    rng.next_f64() < TRIPLE_ATTACK_CHANCE
}

pub fn dual_wield_effective(level: i32, dual_wield_skill: i32, ambidexterity: i32) -> i32 {
    dual_wield_skill + level + ambidexterity
}

/// `CheckDualWield`: `effective > random(0, 374)`.
pub fn dual_wield_check<R: RandomSource + ?Sized>(effective_skill: i32, rng: &mut R) -> bool {
    effective_skill > (rng.next_f64() * 375.0).floor() as i32
}

// ----- Timing and procs -----

/// Swing timer in deciseconds after haste, never below one second.
pub fn haste_adjusted_delay(base_delay: f64, haste_percent: f64) -> f64 {
    let haste_mod = 1.0 + haste_percent / 100.0;
    (base_delay / haste_mod).max(MIN_SWING_DELAY)
}

/// PPM-based proc chance. DEX sets 0.5 to 2 procs per minute (half that off-hand); scaling by the
/// haste-adjusted delay keeps the per-minute rate constant under haste.
pub fn proc_chance_per_swing(effective_delay: f64, is_offhand: bool, dex: i32) -> f64 {
    if effective_delay <= 0.0 {
        return 0.0;
    }
    let mut ppm = (f64::from(dex) / 170.0 + 0.5).clamp(0.5, 2.0);
    if is_offhand {
        ppm *= 0.5;
    }
    let swings_per_minute = 600.0 / effective_delay;
    (ppm / swings_per_minute).clamp(0.0, 1.0)
}

/// Draws from the proc stream only when the chance is positive.
pub fn proc_check<R: RandomSource + ?Sized>(proc_chance: f64, rng: &mut R) -> bool {
    proc_chance > 0.0 && rng.next_f64() < proc_chance
}

// ----- Damage bonus -----

/// `Client::GetDamageBonus`, main hand only. Nothing below level 28. Two-handers climb a
/// level- and delay-driven ladder; fast two-handers (delay ≤ 27) get a single point.
pub fn damage_bonus(level: i32, delay: i32, two_handed: bool) -> i32 {
    if level < 28 {
        return 0;
    }
    let mut bonus = 1 + (level - 28) / 3;
    if !two_handed {
        return bonus;
    }
    if delay <= 27 {
        return bonus + 1;
    }

    if level > 29 {
        let mut level_bonus = (level - 30) / 5 + 1;
        if level > 50 {
            level_bonus += 1;
            let mut level_bonus2 = level - 50;
            if level > 67 {
                level_bonus2 += 5;
            } else if level > 59 {
                level_bonus2 += 4;
            } else if level > 58 {
                level_bonus2 += 3;
            } else if level > 56 {
                level_bonus2 += 2;
            } else if level > 54 {
                level_bonus2 += 1;
            }
            level_bonus += level_bonus2 * delay / 40;
        }
        bonus += level_bonus;
    }

    if delay >= 40 {
        let mut delay_bonus = (delay - 40) / 3 + 1;
        if delay >= 45 {
            delay_bonus += 2;
        } else if delay >= 43 {
            delay_bonus += 1;
        }
        bonus += delay_bonus;
    }
    bonus
}

/// `NPC::GetDamageBonus`: flat bonus implied by a min/max damage spread.
pub fn npc_damage_bonus(min_damage: i32, max_damage: i32) -> i32 {
    if min_damage > max_damage {
        return min_damage;
    }
    let di1k = f64::from(max_damage - min_damage) * 1000.0 / 19.0;
    let di1k = ((di1k + 50.0) / 100.0).floor() * 100.0;
    let db = f64::from(max_damage) * 1000.0 - di1k * 20.0;
    (db / 1000.0).floor() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::rng::ScriptedRng;

    fn approx_eq(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() <= tol, "expected {b}, got {a}");
    }

    #[test]
    fn hit_chance_zero_avoidance_keeps_residual_miss() {
        let chance = hit_chance(511, 0);
        assert!(chance < 1.0);
        approx_eq(chance, 1.0 - 10.0 / (521.0 * 1.21 * 2.0), 1e-12);
    }

    #[test]
    fn hit_chance_caps_to_hit() {
        assert_eq!(hit_chance(550, 460), hit_chance(5000, 460));
        assert!(hit_chance(549, 460) < hit_chance(550, 460));
    }

    #[test]
    fn hit_chance_low_branch() {
        // 100+10 = 110 * 1.21 = 133.1 < 470
        approx_eq(hit_chance(100, 460), 133.1 / 940.0, 1e-12);
        // out-of-range terms run through the same branches and clamp
        approx_eq(hit_chance(-5, -12), 1.0, 1e-12);
        approx_eq(hit_chance(-20, 0), 0.0, 1e-12);
    }

    #[test]
    fn roll_hit_from_behind_takes_one_draw() {
        let mut rng = ScriptedRng::new(vec![0.0, 0.0]);
        assert!(roll_hit(511, 460, true, &mut rng));
        assert_eq!(rng.draws(), 1);
    }

    #[test]
    fn roll_hit_from_front_can_be_avoided() {
        let mut rng = ScriptedRng::new(vec![0.0, 0.05]);
        assert!(!roll_hit(511, 460, false, &mut rng));
        assert_eq!(rng.draws(), 2);

        let mut rng = ScriptedRng::new(vec![0.0, 0.08]);
        assert!(roll_hit(511, 460, false, &mut rng));
    }

    #[test]
    fn roll_hit_miss_skips_avoid_draw() {
        let mut rng = ScriptedRng::new(vec![0.999]);
        assert!(!roll_hit(511, 460, false, &mut rng));
        assert_eq!(rng.draws(), 1);
    }

    #[test]
    fn avoidance_caps_by_level_band() {
        assert_eq!(avoidance_from_level(1), 14);
        assert_eq!(avoidance_from_level(44), 400);
        assert_eq!(avoidance_from_level(50), 400);
        assert_eq!(avoidance_from_level(51), 460);
        assert_eq!(avoidance_from_level(60), 460);
        assert_eq!(avoidance_from_level(-5), 1);
    }

    #[test]
    fn mitigation_level_bands() {
        assert_eq!(mitigation_from_level(1, None, 0, 0), 5);
        assert_eq!(mitigation_from_level(10, None, 0, 0), 30);
        assert_eq!(mitigation_from_level(15, None, 0, 0), 46);
        assert_eq!(mitigation_from_level(50, None, 0, 0), 190);
        assert_eq!(mitigation_from_level(60, None, 0, 0), 200);
    }

    #[test]
    fn mitigation_uses_armor_class_only_at_cap() {
        assert_eq!(mitigation_from_level(60, Some(350), 0, 0), 350);
        assert_eq!(mitigation_from_level(60, Some(150), 0, 0), 200);
        assert_eq!(mitigation_from_level(50, Some(350), 0, 0), 190);
    }

    #[test]
    fn mitigation_adds_item_and_spell_ac() {
        // 200 + floor(4*30/3) + floor(10/4) = 200 + 40 + 2
        assert_eq!(mitigation_from_level(60, None, 30, 10), 242);
        assert_eq!(mitigation_from_level(1, None, -30, 0), 1);
    }

    #[test]
    fn damage_index_extremes() {
        let mut low = ScriptedRng::new(vec![0.0, 0.999_999]);
        assert_eq!(roll_damage_index(300, 200, &mut low), 1);

        let mut high = ScriptedRng::new(vec![0.999_999, 0.0]);
        assert_eq!(roll_damage_index(300, 200, &mut high), 20);
    }

    #[test]
    fn damage_index_degenerate_guard_draws_nothing() {
        let mut rng = ScriptedRng::new(vec![0.5]);
        assert_eq!(roll_damage_index(-10, -10, &mut rng), 1);
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn melee_damage_scales_index_and_adds_bonus() {
        // index 20: (20*10+5)/10 = 20
        let mut rng = ScriptedRng::new(vec![0.999_999, 0.0]);
        assert_eq!(melee_damage(10, 300, 200, 5, &mut rng), 25);
        // zero base damage still yields 1
        let mut rng = ScriptedRng::new(vec![0.0, 0.999_999]);
        assert_eq!(melee_damage(0, 300, 200, 0, &mut rng), 1);
    }

    #[test]
    fn monk_brackets_shift_early() {
        assert_eq!(multiplier_bracket(60, Archetype::Warrior).roll_chance, 77);
        assert_eq!(multiplier_bracket(60, Archetype::Monk).roll_chance, 79);
        assert_eq!(multiplier_bracket(65, Archetype::Monk).roll_chance, 83);
        assert_eq!(multiplier_bracket(40, Archetype::Monk).roll_chance, 65);
        assert_eq!(multiplier_bracket(40, Archetype::Rogue).roll_chance, 51);
    }

    #[test]
    fn multiplier_roll_not_triggered_passes_damage_through() {
        let mut rng = ScriptedRng::new(vec![0.99]);
        let rolled = damage_multiplier_roll(400, 30, 60, Archetype::Rogue, false, &mut rng);
        assert_eq!(rolled, RolledDamage { damage: 30, is_crit: false });
        assert_eq!(rng.draws(), 1);
    }

    #[test]
    fn multiplier_roll_warrior_bonus_point() {
        // offense 400 at level 60: base bonus = (400-65)/2 = 167, top roll 100+167 = 267
        let mut rng = ScriptedRng::new(vec![0.0, 0.999_999]);
        let rolled = damage_multiplier_roll(400, 30, 60, Archetype::Warrior, false, &mut rng);
        assert_eq!(rolled.damage, 30 * 267 / 100 + 1);
        assert!(rolled.is_crit);

        let mut rng = ScriptedRng::new(vec![0.0, 0.999_999]);
        let rogue = damage_multiplier_roll(400, 30, 60, Archetype::Rogue, false, &mut rng);
        assert_eq!(rogue.damage, 30 * 267 / 100);
    }

    #[test]
    fn multiplier_roll_caps_at_bracket_max() {
        let mut rng = ScriptedRng::new(vec![0.0, 0.999_999]);
        let rolled = damage_multiplier_roll(2000, 100, 60, Archetype::Rogue, false, &mut rng);
        assert_eq!(rolled.damage, 285);
    }

    #[test]
    fn multiplier_roll_minimum_is_not_a_crit() {
        let mut rng = ScriptedRng::new(vec![0.0, 0.0]);
        let rolled = damage_multiplier_roll(400, 30, 60, Archetype::Warrior, false, &mut rng);
        assert_eq!(rolled, RolledDamage { damage: 31, is_crit: false });
    }

    #[test]
    fn crit_chance_warrior_dex_terms() {
        approx_eq(
            crit_chance(60, Archetype::Warrior, 255, 0.0, 0.0, false),
            0.5 + 255.0 / 90.0,
            1e-12,
        );
        approx_eq(
            crit_chance(60, Archetype::Warrior, 355, 0.0, 0.0, false),
            0.5 + 255.0 / 90.0 + 100.0 / 400.0,
            1e-12,
        );
    }

    #[test]
    fn crit_chance_non_warrior_needs_multiplier() {
        assert_eq!(crit_chance(60, Archetype::Rogue, 255, 0.0, 0.0, false), 0.0);
        let base = 0.275 + 255.0 / 150.0;
        approx_eq(
            crit_chance(60, Archetype::Rogue, 255, 0.0, 50.0, false),
            base * 1.5,
            1e-12,
        );
    }

    #[test]
    fn crit_chance_ranger_archery() {
        approx_eq(
            crit_chance(60, Archetype::Ranger, 255, 0.0, 0.0, true),
            1.35 + 255.0 / 34.0,
            1e-12,
        );
    }

    #[test]
    fn crit_chance_is_clamped() {
        assert_eq!(crit_chance(60, Archetype::Warrior, 255, 0.0, 100_000.0, false), 100.0);
    }

    #[test]
    fn crit_damage_formula() {
        // ((30-0)*17+5)/10 + 8 = 51 + 8
        assert_eq!(crit_damage(30, 0, NORMAL_CRIT_MOD, false), 59);
        // ((41-11)*29+5)/10 + 8 + 11 + 2 = 87 + 21
        assert_eq!(crit_damage(41, 11, CRIPPLING_CRIT_MOD, true), 108);
    }

    fn warrior_crit(berserk: bool, crippling_blow_chance: f64) -> CritOptions {
        CritOptions {
            level: 60,
            archetype: Archetype::Warrior,
            dex: 255,
            crit_chance_multiplier: 0.0,
            is_archery: false,
            berserk,
            crippling_blow_chance,
        }
    }

    #[test]
    fn roll_crit_no_chance_takes_no_draw() {
        let options = CritOptions {
            archetype: Archetype::Rogue,
            ..warrior_crit(false, 0.0)
        };
        let mut rng = ScriptedRng::new(vec![0.0]);
        assert_eq!(roll_crit(30, 0, &options, &mut rng), RolledDamage { damage: 30, is_crit: false });
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn roll_crit_normal_and_berserk() {
        let mut rng = ScriptedRng::new(vec![0.0]);
        let normal = roll_crit(30, 0, &warrior_crit(false, 0.0), &mut rng);
        assert_eq!(normal, RolledDamage { damage: 59, is_crit: true });
        assert_eq!(rng.draws(), 1);

        let mut rng = ScriptedRng::new(vec![0.0]);
        let berserk = roll_crit(30, 0, &warrior_crit(true, 0.0), &mut rng);
        assert_eq!(berserk.damage, crit_damage(30, 0, CRIPPLING_CRIT_MOD, true));
        assert_eq!(rng.draws(), 1);
    }

    #[test]
    fn roll_crit_crippling_draw() {
        let mut rng = ScriptedRng::new(vec![0.0, 0.1]);
        let rolled = roll_crit(30, 0, &warrior_crit(false, 20.0), &mut rng);
        assert_eq!(rolled.damage, crit_damage(30, 0, CRIPPLING_CRIT_MOD, true));
        assert_eq!(rng.draws(), 2);
    }

    #[test]
    fn roll_crit_miss() {
        let mut rng = ScriptedRng::new(vec![0.9]);
        assert!(!roll_crit(30, 0, &warrior_crit(false, 0.0), &mut rng).is_crit);
    }

    #[test]
    fn double_attack_exclusions_take_no_draw() {
        let mut rng = ScriptedRng::new(vec![0.0]);
        assert!(!double_attack_check(10_000, Archetype::Bard, &mut rng));
        assert!(!double_attack_check(10_000, Archetype::Beastlord, &mut rng));
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn double_attack_threshold() {
        // floor(0.5*500) = 250
        let mut rng = ScriptedRng::new(vec![0.5]);
        assert!(double_attack_check(251, Archetype::Warrior, &mut rng));
        let mut rng = ScriptedRng::new(vec![0.5]);
        assert!(!double_attack_check(250, Archetype::Warrior, &mut rng));
    }

    #[test]
    fn triple_attack_gates() {
        assert!(can_triple_attack(60, Archetype::Warrior));
        assert!(can_triple_attack(60, Archetype::Monk));
        assert!(!can_triple_attack(59, Archetype::Warrior));
        assert!(!can_triple_attack(65, Archetype::Rogue));

        let mut rng = ScriptedRng::new(vec![0.1]);
        assert!(!triple_attack_check(60, Archetype::Rogue, &mut rng));
        assert_eq!(rng.draws(), 0);
        assert!(triple_attack_check(60, Archetype::Warrior, &mut rng));
        let mut rng = ScriptedRng::new(vec![0.135]);
        assert!(!triple_attack_check(60, Archetype::Warrior, &mut rng));
    }

    #[test]
    fn dual_wield_threshold() {
        // floor(0.5*375) = 187
        let mut rng = ScriptedRng::new(vec![0.5]);
        assert!(dual_wield_check(188, &mut rng));
        let mut rng = ScriptedRng::new(vec![0.5]);
        assert!(!dual_wield_check(187, &mut rng));
        assert_eq!(dual_wield_effective(60, 245, 32), 337);
        assert_eq!(double_attack_effective(60, 252), 312);
    }

    #[test]
    fn haste_floor_is_one_second() {
        approx_eq(haste_adjusted_delay(28.0, 0.0), 28.0, 1e-12);
        approx_eq(haste_adjusted_delay(30.0, 50.0), 20.0, 1e-12);
        approx_eq(haste_adjusted_delay(15.0, 200.0), 10.0, 1e-12);
    }

    #[test]
    fn proc_chance_is_haste_invariant_per_minute() {
        let slow = proc_chance_per_swing(40.0, false, 255);
        let fast = proc_chance_per_swing(20.0, false, 255);
        approx_eq(slow * 600.0 / 40.0, fast * 600.0 / 20.0, 1e-12);
        approx_eq(slow, 2.0 * 40.0 / 600.0, 1e-12);
        approx_eq(proc_chance_per_swing(40.0, true, 255), slow / 2.0, 1e-12);
        approx_eq(proc_chance_per_swing(40.0, false, 0), 0.5 * 40.0 / 600.0, 1e-12);
        assert_eq!(proc_chance_per_swing(0.0, false, 255), 0.0);
    }

    #[test]
    fn proc_check_skips_draw_at_zero_chance() {
        let mut rng = ScriptedRng::new(vec![0.0]);
        assert!(!proc_check(0.0, &mut rng));
        assert_eq!(rng.draws(), 0);
        assert!(proc_check(0.1, &mut rng));
    }

    #[test]
    fn damage_bonus_ladder() {
        assert_eq!(damage_bonus(27, 40, true), 0);
        assert_eq!(damage_bonus(28, 30, false), 1);
        assert_eq!(damage_bonus(60, 28, false), 11);
        assert_eq!(damage_bonus(60, 27, true), 12);
        assert_eq!(damage_bonus(60, 40, true), 34);
        assert_eq!(damage_bonus(60, 45, true), 38);
    }

    #[test]
    fn npc_damage_bonus_from_spread() {
        assert_eq!(npc_damage_bonus(10, 29), 9);
        assert_eq!(npc_damage_bonus(20, 20), 20);
        assert_eq!(npc_damage_bonus(30, 20), 30);
    }
}
