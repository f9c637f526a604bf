//! Fight report: the mutable accumulator the simulator fills, frozen once the fight ends.

pub mod format;
pub mod stats;

use serde::{Deserialize, Serialize};

pub use format::format_report;
pub use stats::HitStatistics;

/// Counters for one weapon slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeaponReport {
    pub swings: u32,
    pub hits: u32,
    pub rounds: u32,
    pub single: u32,
    pub double: u32,
    pub triple: u32,
    pub total_damage: i64,
    pub max_damage: i32,
    /// `None` until the slot lands a hit.
    pub min_damage: Option<i32>,
    pub hit_list: Vec<i32>,
    pub procs: u32,
    pub proc_damage_total: i64,
    pub hit_stats: HitStatistics,
}

impl WeaponReport {
    pub fn record_miss(&mut self) {
        self.swings += 1;
    }

    pub fn record_hit(&mut self, damage: i32) {
        self.swings += 1;
        self.hits += 1;
        self.total_damage += i64::from(damage);
        self.max_damage = self.max_damage.max(damage);
        self.min_damage = Some(self.min_damage.map_or(damage, |min| min.min(damage)));
        self.hit_list.push(damage);
    }

    pub fn record_proc(&mut self, damage: i32) {
        self.procs += 1;
        self.proc_damage_total += i64::from(damage);
    }

    /// Tally a finished round by how many attacks it delivered.
    pub fn classify_round(&mut self, attacks: u8) {
        match attacks {
            1 => self.single += 1,
            2 => self.double += 1,
            _ => self.triple += 1,
        }
    }

    /// Rounds where a double attack landed, including those that went on to triple.
    pub fn double_attack_rounds(&self) -> u32 {
        self.double + self.triple
    }

    pub fn accuracy_percent(&self) -> Option<f64> {
        (self.swings > 0).then(|| f64::from(self.hits) / f64::from(self.swings) * 100.0)
    }

    pub(crate) fn finalize(&mut self) {
        self.hit_stats = HitStatistics::from_hits(&self.hit_list);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecialReport {
    pub name: String,
    /// Strikes that landed, double backstabs included.
    pub count: u32,
    pub attempts: u32,
    pub hits: u32,
    pub total_damage: i64,
    pub max_damage: i32,
    pub hit_list: Vec<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub double_backstabs: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backstab_skill: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backstab_mod_percent: Option<i32>,
}

impl SpecialReport {
    pub(crate) fn record_strike(&mut self, damage: i32) {
        self.hits += 1;
        self.count += 1;
        self.total_damage += i64::from(damage);
        self.max_damage = self.max_damage.max(damage);
        self.hit_list.push(damage);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FistweavingReport {
    pub rounds: u32,
    pub swings: u32,
    pub hits: u32,
    pub total_damage: i64,
    pub max_damage: i32,
    pub single: u32,
    pub double: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FightReport {
    pub weapon1: WeaponReport,
    pub weapon2: WeaponReport,
    pub duration_sec: f64,
    pub total_damage: i64,
    /// Flat main-hand damage bonus per hit.
    pub damage_bonus: i32,
    pub damage_bonus_total: i64,
    pub calculated_to_hit: i32,
    pub calculated_offense: i32,
    pub offense_stat_contribution: i32,
    pub displayed_attack: i32,
    pub crit_hits: u32,
    pub crit_damage_gain: i64,
    pub seed: u64,
    pub special: Option<SpecialReport>,
    pub fistweaving: Option<FistweavingReport>,
}

impl FightReport {
    /// Damage per second over the configured duration; zero for a non-positive duration.
    pub fn dps(&self) -> f64 {
        per_second(self.total_damage, self.duration_sec)
    }

    pub fn crit_dps_gain(&self) -> f64 {
        per_second(self.crit_damage_gain, self.duration_sec)
    }
}

pub(crate) fn per_second(total: i64, duration_sec: f64) -> f64 {
    if duration_sec > 0.0 {
        total as f64 / duration_sec
    } else {
        0.0
    }
}

/// Character-sheet attack value.
pub fn displayed_attack(offense: i32, to_hit: i32) -> i32 {
    ((offense + to_hit) * 1000).div_euclid(744)
}
