use std::fmt::Display;

use super::{per_second, FightReport, WeaponReport};
use crate::combat::special::displayed_backstab_skill;

const MISSING: &str = "—";

/// Integral values print bare, anything else with two decimals.
fn hit_stat<T: Into<f64>>(value: Option<T>) -> String {
    match value.map(Into::into) {
        None => MISSING.to_string(),
        Some(v) if v.fract() == 0.0 => format!("{}", v as i64),
        Some(v) => format!("{v:.2}"),
    }
}

fn seconds(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn percent(part: u32, whole: u32) -> String {
    format!("{:.1}", f64::from(part) / f64::from(whole) * 100.0)
}

fn push<T: Display>(lines: &mut Vec<String>, label: &str, value: T) {
    lines.push(format!("{label}{value}"));
}

fn weapon_stats(lines: &mut Vec<String>, slot: &WeaponReport) {
    push(lines, "  Swings: ", slot.swings);
    push(lines, "  Hits: ", slot.hits);
    if let Some(accuracy) = slot.accuracy_percent() {
        lines.push(format!("  Overall accuracy: {accuracy:.1}%"));
    }
    push(lines, "  Total damage: ", slot.total_damage);
    let stats = &slot.hit_stats;
    push(
        lines,
        "  Max hit: ",
        hit_stat(Some(stats.max.unwrap_or(slot.max_damage))),
    );
    push(lines, "  Min hit: ", hit_stat(stats.min));
    push(lines, "  Mean hit: ", hit_stat(stats.mean));
    push(lines, "  Median hit: ", hit_stat(stats.median));
    push(lines, "  Mode hit: ", hit_stat(stats.mode));
    push(lines, "  Procs: ", slot.procs);
    if slot.proc_damage_total > 0 {
        push(lines, "  Proc spell damage: ", slot.proc_damage_total);
    }
}

/// Render a finished fight as the plain-text combat report.
pub fn format_report(
    report: &FightReport,
    weapon1_label: Option<&str>,
    weapon2_label: Option<&str>,
) -> String {
    let mut lines = vec![
        "--- Combat Report ---".to_string(),
        format!("Duration: {} seconds", seconds(report.duration_sec)),
        format!("Calculated To Hit: {}", report.calculated_to_hit),
        format!("Calculated Offense: {}", report.calculated_offense),
        format!(
            "Offense contribution from stats (STR): {}",
            report.offense_stat_contribution
        ),
        format!(
            "Displayed Attack: {}  ( (offense + toHit) * 1000 / 744 )",
            report.displayed_attack
        ),
        format!("Main hand damage bonus: {}", report.damage_bonus),
    ];
    if report.damage_bonus_total > 0 {
        push(&mut lines, "Damage from bonus: ", report.damage_bonus_total);
    }
    push(&mut lines, "Critical hits: ", report.crit_hits);
    if report.crit_damage_gain >= 0 {
        lines.push(format!(
            "Net DPS from criticals (vs normal): {:.2}",
            report.crit_dps_gain()
        ));
    }

    let w1 = &report.weapon1;
    lines.push(weapon1_label.unwrap_or("Weapon 1").to_string());
    push(&mut lines, "  Combat rounds: ", w1.rounds);
    if w1.rounds > 0 {
        lines.push(format!(
            "  Single / Double / Triple (% of rounds): {}% / {}% / {}%",
            percent(w1.single, w1.rounds),
            percent(w1.double, w1.rounds),
            percent(w1.triple, w1.rounds),
        ));
    }
    push(&mut lines, "  Single attacks: ", w1.single);
    push(&mut lines, "  Double attacks: ", w1.double);
    push(&mut lines, "  Triple attacks: ", w1.triple);
    weapon_stats(&mut lines, w1);

    let w2 = &report.weapon2;
    if w2.swings > 0 {
        lines.push(String::new());
        lines.push(weapon2_label.unwrap_or("Weapon 2").to_string());
        push(&mut lines, "  Combat rounds: ", w2.rounds);
        if w2.rounds > 0 {
            lines.push(format!(
                "  Single / Double (% of rounds): {}% / {}%",
                percent(w2.single, w2.rounds),
                percent(w2.double, w2.rounds),
            ));
        }
        push(&mut lines, "  Single attacks: ", w2.single);
        push(&mut lines, "  Double attacks: ", w2.double);
        weapon_stats(&mut lines, w2);
    }

    if let Some(special) = report.special.as_ref().filter(|s| s.count > 0) {
        lines.push(String::new());
        lines.push(special.name.clone());
        push(&mut lines, "  Count: ", special.count);
        push(&mut lines, "  Total damage: ", special.total_damage);
        push(&mut lines, "  Max hit: ", special.max_damage);
        if let Some(double_backstabs) = special.double_backstabs {
            push(&mut lines, "  Total backstab attempts: ", special.attempts);
            push(&mut lines, "  Backstab hits: ", special.hits);
            push(&mut lines, "  Backstab damage: ", special.total_damage);
            let accuracy = if special.attempts > 0 {
                percent(special.hits, special.attempts)
            } else {
                "0".to_string()
            };
            lines.push(format!("  Backstab accuracy: {accuracy}%"));
            push(&mut lines, "  Backstab max hit: ", special.max_damage);
            push(&mut lines, "  Double backstabs: ", double_backstabs);

            let mod_percent = special.backstab_mod_percent.unwrap_or(0);
            if let (true, Some(skill)) = (mod_percent != 0, special.backstab_skill) {
                lines.push(format!(
                    "  Effective backstab skill: {} (skill + {mod_percent}% mod, cap 255)",
                    displayed_backstab_skill(skill, mod_percent)
                ));
            }
        }
    }

    if let Some(fw) = report.fistweaving.as_ref().filter(|fw| fw.rounds > 0) {
        let accuracy = if fw.swings > 0 {
            percent(fw.hits, fw.swings)
        } else {
            "0".to_string()
        };
        lines.push(String::new());
        lines.push("Fistweaving (9 dmg, no proc)".to_string());
        push(&mut lines, "  Rounds: ", fw.rounds);
        lines.push(format!("  Single / Double: {} / {}", fw.single, fw.double));
        push(&mut lines, "  Swings: ", fw.swings);
        push(&mut lines, "  Hits: ", fw.hits);
        lines.push(format!("  Accuracy: {accuracy}%"));
        push(&mut lines, "  Total damage: ", fw.total_damage);
        push(&mut lines, "  Max hit: ", fw.max_damage);
        lines.push(format!(
            "  DPS: {:.2}",
            per_second(fw.total_damage, report.duration_sec)
        ));
    }

    lines.push(String::new());
    push(&mut lines, "Total damage: ", report.total_damage);
    lines.push(format!("DPS: {:.2}", report.dps()));
    lines.join("\n")
}
