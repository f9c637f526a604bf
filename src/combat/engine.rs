//! Tick-driven melee fight simulation.
//!
//! The fight runs on a 100 ms grid. Each tick fires, in order: the class special (when off
//! cooldown), the main-hand round (plus a fistweaving round for two-handed monks), then the
//! off-hand round. Every regular swing goes through [`resolve_swing`].

use tracing::debug;

use super::archetype::Archetype;
use super::config::{str_bonus, FightConfig, Weapon};
use super::formulas::{
    avoidance_from_level, damage_bonus, damage_multiplier_roll, double_attack_check,
    double_attack_effective, dual_wield_check, dual_wield_effective, haste_adjusted_delay,
    melee_damage, mitigation_from_level, proc_chance_per_swing, proc_check, roll_crit, roll_hit,
    triple_attack_check, CritOptions,
};
use super::rng::{random_seed, FightStreams, RandomSource};
use super::special::{
    backstab_base_damage, backstab_min_hit, effective_backstab_skill, special_attack_for,
    SpecialAttack, SpecialKind, BACKSTAB_SKILL_CAP, DOUBLE_BACKSTAB_MIN_LEVEL,
};
use crate::report::{displayed_attack, FightReport, FistweavingReport, SpecialReport};

/// Fistweaving strikes use this base damage regardless of the equipped weapon.
pub const FIST_DAMAGE: i32 = 9;
pub const TICKS_PER_SECOND: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcSetup {
    pub chance: f64,
    pub damage: i32,
}

/// One swing's inputs: what it hits for before rolls, and what rides on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingSpec {
    pub base_damage: i32,
    pub flat_bonus: i32,
    pub proc: Option<ProcSetup>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwingOutcome {
    Miss,
    Hit {
        damage: i32,
        /// Damage added by a landed crit.
        crit_gain: Option<i32>,
        proc_damage: Option<i32>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecialSetup {
    pub attack: &'static SpecialAttack,
    pub backstab_skill: i32,
    pub backstab_mod_percent: i32,
}

/// Fight constants derived once from the config and read-only for the rest of the fight.
#[derive(Debug, Clone, PartialEq)]
pub struct CombatContext {
    pub archetype: Archetype,
    pub level: i32,
    pub from_behind: bool,
    pub avoidance: i32,
    pub mitigation: i32,
    pub to_hit: i32,
    pub offense: i32,
    pub str_bonus: i32,
    pub main_delay: f64,
    /// `Some` only when the attacker can and does dual wield.
    pub off_delay: Option<f64>,
    pub double_attack_effective: i32,
    pub dual_wield_effective: i32,
    pub damage_bonus: i32,
    pub main_hand: SwingSpec,
    pub off_hand: SwingSpec,
    pub crit: CritOptions,
    pub special: Option<SpecialSetup>,
    pub fistweaving: bool,
}

impl CombatContext {
    pub fn derive(config: &FightConfig) -> Self {
        let attacker = &config.attacker;
        let defender = &config.defender;
        let scenario = &config.scenario;
        let level = attacker.level;
        let archetype = attacker.archetype;

        let avoidance = defender
            .avoidance
            .unwrap_or_else(|| avoidance_from_level(defender.level));
        let mitigation = mitigation_from_level(
            defender.level,
            defender.armor_class,
            defender.item_ac_bonus,
            defender.spell_ac_bonus,
        );
        let (to_hit, offense) = attacker.to_hit_and_offense();

        let main = &config.main_hand;
        let main_delay = haste_adjusted_delay(f64::from(main.delay), attacker.haste_percent);
        let dual_wielding = config.off_hand.is_some()
            && attacker.dual_wield_skill > 0
            && archetype.can_dual_wield();
        let off_delay = config
            .off_hand
            .as_ref()
            .filter(|_| dual_wielding)
            .map(|w| haste_adjusted_delay(f64::from(w.delay), attacker.haste_percent));

        let dex = attacker.dexterity;
        let proc_setup = |weapon: &Weapon, delay: f64, is_offhand: bool| {
            weapon.proc_spell.as_ref().map(|_| ProcSetup {
                chance: proc_chance_per_swing(delay, is_offhand, dex),
                damage: weapon.proc_spell_damage.unwrap_or(0),
            })
        };

        let bonus = damage_bonus(
            level,
            i32::try_from(main.delay).unwrap_or(i32::MAX),
            main.two_handed,
        );
        let main_hand = SwingSpec {
            base_damage: main.damage_i32(),
            flat_bonus: bonus,
            proc: proc_setup(main, main_delay, false),
        };
        let off_hand = match (&config.off_hand, off_delay) {
            (Some(weapon), Some(delay)) => SwingSpec {
                base_damage: weapon.damage_i32(),
                flat_bonus: 0,
                proc: proc_setup(weapon, delay, true),
            },
            _ => SwingSpec {
                base_damage: 0,
                flat_bonus: 0,
                proc: None,
            },
        };

        let special = special_attack_for(archetype)
            .filter(|attack| scenario.special_attacks && attack.can_fire(scenario.from_behind))
            .map(|attack| SpecialSetup {
                attack,
                backstab_skill: attacker.backstab_skill,
                backstab_mod_percent: scenario.backstab_mod_percent,
            });

        let ctx = Self {
            archetype,
            level,
            from_behind: scenario.from_behind,
            avoidance,
            mitigation,
            to_hit,
            offense,
            str_bonus: str_bonus(attacker.strength),
            main_delay,
            off_delay,
            double_attack_effective: double_attack_effective(level, attacker.double_attack_skill),
            dual_wield_effective: dual_wield_effective(
                level,
                attacker.dual_wield_skill,
                attacker.ambidexterity,
            ),
            damage_bonus: bonus,
            main_hand,
            off_hand,
            crit: CritOptions {
                level,
                archetype,
                dex,
                crit_chance_multiplier: attacker.crit_chance_multiplier,
                is_archery: false,
                berserk: attacker.berserk,
                crippling_blow_chance: attacker.crippling_blow_chance,
            },
            special,
            fistweaving: archetype == Archetype::Monk
                && main.two_handed
                && scenario.fistweaving,
        };
        debug!(
            archetype = %ctx.archetype,
            level = ctx.level,
            to_hit = ctx.to_hit,
            offense = ctx.offense,
            avoidance = ctx.avoidance,
            mitigation = ctx.mitigation,
            main_delay = ctx.main_delay,
            off_delay = ?ctx.off_delay,
            damage_bonus = ctx.damage_bonus,
            special = ?ctx.special.map(|s| s.attack.name),
            fistweaving = ctx.fistweaving,
            "derived combat context"
        );
        ctx
    }

    fn fist_swing(&self) -> SwingSpec {
        SwingSpec {
            base_damage: FIST_DAMAGE,
            flat_bonus: 0,
            proc: None,
        }
    }
}

/// Resolve one regular swing: hit → damage → multiplier → flat bonus → crit → proc.
///
/// The damage floor after the bonus and after the crit is `1 + flat_bonus`. Procs only roll on a
/// hit and only draw from `procs`.
pub fn resolve_swing<M, P>(
    ctx: &CombatContext,
    swing: &SwingSpec,
    melee: &mut M,
    procs: &mut P,
) -> SwingOutcome
where
    M: RandomSource + ?Sized,
    P: RandomSource + ?Sized,
{
    if !roll_hit(ctx.to_hit, ctx.avoidance, ctx.from_behind, melee) {
        return SwingOutcome::Miss;
    }

    let floor = 1 + swing.flat_bonus;
    let damage = melee_damage(swing.base_damage, ctx.offense, ctx.mitigation, 0, melee);
    let rolled = damage_multiplier_roll(ctx.offense, damage, ctx.level, ctx.archetype, false, melee);
    let before_crit = (rolled.damage + swing.flat_bonus).max(floor);
    let crit = roll_crit(before_crit, swing.flat_bonus, &ctx.crit, melee);
    let damage = crit.damage.max(floor);

    let proc_damage = swing
        .proc
        .filter(|p| proc_check(p.chance, procs))
        .map(|p| p.damage);

    SwingOutcome::Hit {
        damage,
        crit_gain: crit.is_crit.then_some(damage - before_crit),
        proc_damage,
    }
}

/// Resolve one landed special strike. Returns the final damage and the crit gain, if any.
///
/// Distinct from [`resolve_swing`]: the special multiplier applies before the multiplier roll,
/// no flat bonus is added, and backstab enforces a level-derived minimum. Special crits never
/// turn crippling, berserk or not.
pub fn resolve_special_strike<M: RandomSource + ?Sized>(
    ctx: &CombatContext,
    setup: &SpecialSetup,
    melee: &mut M,
) -> (i32, Option<i32>) {
    let weapon_damage = ctx.main_hand.base_damage;
    let rolled = match setup.attack.kind {
        SpecialKind::Backstab => {
            let skill = effective_backstab_skill(setup.backstab_skill, setup.backstab_mod_percent);
            let base = backstab_base_damage(skill, weapon_damage);
            melee_damage(base, ctx.offense, ctx.mitigation, 0, melee)
        }
        SpecialKind::FlyingKick => melee_damage(weapon_damage, ctx.offense, ctx.mitigation, 0, melee),
    };
    let base = ((f64::from(rolled) * setup.attack.damage_multiplier).floor() as i32).max(1);

    let multiplied = damage_multiplier_roll(ctx.offense, base, ctx.level, ctx.archetype, false, melee);
    let before_crit = multiplied.damage;
    let crit_options = CritOptions {
        berserk: false,
        crippling_blow_chance: 0.0,
        ..ctx.crit
    };
    let crit = roll_crit(before_crit, 0, &crit_options, melee);
    let mut damage = crit.damage;
    let crit_gain = crit.is_crit.then_some(damage - before_crit);
    if setup.attack.kind == SpecialKind::Backstab {
        damage = damage.max(backstab_min_hit(ctx.level));
    }
    (damage, crit_gain)
}

/// Number of 100 ms ticks in a fight; zero for non-finite or non-positive durations.
pub fn fight_ticks(duration_sec: f64) -> u64 {
    if !duration_sec.is_finite() || duration_sec <= 0.0 {
        return 0;
    }
    (duration_sec * TICKS_PER_SECOND).floor() as u64
}

/// Run one fight. An absent seed is drawn from the OS; the report records the seed used.
pub fn simulate_fight(config: &FightConfig) -> FightReport {
    let seed = config.seed.unwrap_or_else(random_seed);
    simulate_fight_with_seed(config, seed)
}

pub fn simulate_fight_with_seed(config: &FightConfig, seed: u64) -> FightReport {
    let ctx = CombatContext::derive(config);
    let mut fight = Fight::new(&ctx, config, seed);
    fight.run(fight_ticks(config.duration_sec));
    fight.finish()
}

struct Fight<'a> {
    ctx: &'a CombatContext,
    streams: FightStreams,
    report: FightReport,
}

impl<'a> Fight<'a> {
    fn new(ctx: &'a CombatContext, config: &FightConfig, seed: u64) -> Self {
        let rogue = ctx.archetype == Archetype::Rogue;
        let special = ctx.special.map(|setup| SpecialReport {
            name: setup.attack.name.to_string(),
            double_backstabs: rogue.then_some(0),
            backstab_skill: rogue.then(|| setup.backstab_skill.min(BACKSTAB_SKILL_CAP)),
            backstab_mod_percent: rogue.then_some(setup.backstab_mod_percent),
            ..SpecialReport::default()
        });
        let report = FightReport {
            duration_sec: config.duration_sec,
            damage_bonus: ctx.damage_bonus,
            calculated_to_hit: ctx.to_hit,
            calculated_offense: ctx.offense,
            offense_stat_contribution: ctx.str_bonus,
            displayed_attack: displayed_attack(ctx.offense, ctx.to_hit),
            seed,
            special,
            fistweaving: ctx.fistweaving.then(FistweavingReport::default),
            ..FightReport::default()
        };
        Self {
            ctx,
            streams: FightStreams::from_seed(seed),
            report,
        }
    }

    fn run(&mut self, ticks: u64) {
        let end = ticks as f64;
        let mut next_main = 0.0_f64;
        let mut next_off = match self.ctx.off_delay {
            Some(delay) => (self.streams.melee.next_f64() * delay).floor(),
            None => f64::INFINITY,
        };
        let mut next_special = 0_u64;

        for t in 0..ticks {
            let now = t as f64;

            if let Some(setup) = self.ctx.special {
                if t >= next_special {
                    self.special_attack(&setup);
                    next_special = t + u64::from(setup.attack.cooldown);
                }
            }

            // A round only starts if its whole swing window fits inside the fight.
            if now >= next_main && now + self.ctx.main_delay <= end {
                next_main = now + self.ctx.main_delay;
                self.main_hand_round();
                if self.ctx.fistweaving {
                    self.fistweaving_round();
                }
            }

            if let Some(delay) = self.ctx.off_delay {
                if now >= next_off && now + delay <= end {
                    next_off = now + delay;
                    self.off_hand_round();
                }
            }
        }
    }

    fn finish(mut self) -> FightReport {
        self.report.weapon1.finalize();
        self.report.weapon2.finalize();
        self.report
    }

    fn swing(&mut self, swing: &SwingSpec) -> SwingOutcome {
        let outcome = resolve_swing(
            self.ctx,
            swing,
            &mut self.streams.melee,
            &mut self.streams.proc,
        );
        if let SwingOutcome::Hit {
            damage,
            crit_gain,
            proc_damage,
        } = outcome
        {
            self.record_crit(crit_gain);
            self.report.total_damage += i64::from(damage) + proc_damage.map_or(0, i64::from);
        }
        outcome
    }

    fn record_crit(&mut self, crit_gain: Option<i32>) {
        if let Some(gain) = crit_gain {
            self.report.crit_hits += 1;
            self.report.crit_damage_gain += i64::from(gain);
        }
    }

    fn main_hand_swing(&mut self) {
        let spec = self.ctx.main_hand;
        match self.swing(&spec) {
            SwingOutcome::Miss => self.report.weapon1.record_miss(),
            SwingOutcome::Hit {
                damage,
                proc_damage,
                ..
            } => {
                self.report.weapon1.record_hit(damage);
                self.report.damage_bonus_total += i64::from(spec.flat_bonus);
                if let Some(proc_damage) = proc_damage {
                    self.report.weapon1.record_proc(proc_damage);
                }
            }
        }
    }

    fn off_hand_swing(&mut self) {
        let spec = self.ctx.off_hand;
        match self.swing(&spec) {
            SwingOutcome::Miss => self.report.weapon2.record_miss(),
            SwingOutcome::Hit {
                damage,
                proc_damage,
                ..
            } => {
                self.report.weapon2.record_hit(damage);
                if let Some(proc_damage) = proc_damage {
                    self.report.weapon2.record_proc(proc_damage);
                }
            }
        }
    }

    fn double_attack(&mut self) -> bool {
        double_attack_check(
            self.ctx.double_attack_effective,
            self.ctx.archetype,
            &mut self.streams.melee,
        )
    }

    fn main_hand_round(&mut self) {
        self.report.weapon1.rounds += 1;
        let mut attacks = 1;
        self.main_hand_swing();
        if self.double_attack() {
            attacks = 2;
            self.main_hand_swing();
            if triple_attack_check(self.ctx.level, self.ctx.archetype, &mut self.streams.melee) {
                attacks = 3;
                self.main_hand_swing();
            }
        }
        self.report.weapon1.classify_round(attacks);
    }

    fn fistweaving_swing(&mut self) {
        let spec = self.ctx.fist_swing();
        let outcome = self.swing(&spec);
        let Some(fw) = self.report.fistweaving.as_mut() else {
            return;
        };
        fw.swings += 1;
        if let SwingOutcome::Hit { damage, .. } = outcome {
            fw.hits += 1;
            fw.total_damage += i64::from(damage);
            fw.max_damage = fw.max_damage.max(damage);
        }
    }

    fn fistweaving_round(&mut self) {
        self.fistweaving_swing();
        let doubled = self.double_attack();
        if doubled {
            self.fistweaving_swing();
        }
        if let Some(fw) = self.report.fistweaving.as_mut() {
            fw.rounds += 1;
            if doubled {
                fw.double += 1;
            } else {
                fw.single += 1;
            }
        }
    }

    fn off_hand_round(&mut self) {
        // A failed check still spends the opportunity.
        if !dual_wield_check(self.ctx.dual_wield_effective, &mut self.streams.melee) {
            return;
        }
        self.report.weapon2.rounds += 1;
        let mut attacks = 1;
        self.off_hand_swing();
        if self.double_attack() {
            attacks = 2;
            self.off_hand_swing();
        }
        self.report.weapon2.classify_round(attacks);
    }

    fn special_attack(&mut self, setup: &SpecialSetup) {
        if let Some(special) = self.report.special.as_mut() {
            special.attempts += 1;
        }
        let lands = !setup.attack.rolls_to_hit()
            || roll_hit(
                self.ctx.to_hit,
                self.ctx.avoidance,
                self.ctx.from_behind,
                &mut self.streams.melee,
            );
        if !lands {
            return;
        }
        self.special_strike(setup);

        let can_double = setup.attack.kind == SpecialKind::Backstab
            && self.ctx.archetype == Archetype::Rogue
            && self.ctx.level > DOUBLE_BACKSTAB_MIN_LEVEL;
        if can_double
            && self.double_attack()
            && roll_hit(
                self.ctx.to_hit,
                self.ctx.avoidance,
                self.ctx.from_behind,
                &mut self.streams.melee,
            )
        {
            if let Some(count) = self
                .report
                .special
                .as_mut()
                .and_then(|s| s.double_backstabs.as_mut())
            {
                *count += 1;
            }
            self.special_strike(setup);
        }
    }

    fn special_strike(&mut self, setup: &SpecialSetup) {
        let (damage, crit_gain) = resolve_special_strike(self.ctx, setup, &mut self.streams.melee);
        self.record_crit(crit_gain);
        if let Some(special) = self.report.special.as_mut() {
            special.record_strike(damage);
        }
        // Specials are delivered with the primary weapon.
        self.report.weapon1.total_damage += i64::from(damage);
        self.report.total_damage += i64::from(damage);
    }
}
