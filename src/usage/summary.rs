use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use super::record::EVENT_SIM_RUN;
use super::UsageLogError;

pub const TOP_N: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UsageSummary {
    pub total_runs: u64,
    /// Distinct `uid` values; runs without one count together as a single user.
    pub unique_users: u64,
    pub by_class: BTreeMap<String, u64>,
    pub top_main_hand_presets: Vec<(String, u64)>,
    pub top_combos: Vec<(String, u64)>,
    pub with_special_attacks: u64,
    pub with_fistweaving: u64,
    /// Lines that were not valid records.
    pub skipped_lines: u64,
}

/// Counts keyed by label, remembering the order labels first appeared.
#[derive(Debug, Default)]
struct Tally {
    index: HashMap<String, usize>,
    entries: Vec<(String, u64)>,
}

impl Tally {
    fn add(&mut self, label: &str) {
        match self.index.get(label) {
            Some(&i) => self.entries[i].1 += 1,
            None => {
                self.index.insert(label.to_string(), self.entries.len());
                self.entries.push((label.to_string(), 1));
            }
        }
    }

    /// Highest counts first; ties keep first-seen order.
    fn top(mut self, n: usize) -> Vec<(String, u64)> {
        self.entries.sort_by(|a, b| b.1.cmp(&a.1));
        self.entries.truncate(n);
        self.entries
    }
}

/// Loose truthiness: null, false, 0 and "" are falsy.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text of a truthy value; strings are taken verbatim, anything else as JSON.
fn label(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        other if truthy(other) => Some(other.to_string()),
        _ => None,
    }
}

/// `w1`/`w2` preset name. A slot that is not an object has no preset.
fn preset(record: &Value, slot: &str) -> Option<String> {
    label(record.get(slot)?.as_object()?.get("preset"))
}

/// Distinct-user key. A missing uid is `None`; present values key by their JSON text, so `7`
/// and `"7"` are different users.
fn user_key(record: &Value) -> Option<String> {
    record.get("uid").map(Value::to_string)
}

fn flag(record: &Value, field: &str) -> bool {
    record.get(field).is_some_and(truthy)
}

/// Summarize JSON lines. Only lines that are not JSON count as skipped; records are read
/// field by field, so a stray type in one field never drops a whole run.
pub fn summarize_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> UsageSummary {
    let mut summary = UsageSummary::default();
    let mut users: HashSet<Option<String>> = HashSet::new();
    let mut presets = Tally::default();
    let mut combos = Tally::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: Value = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(_) => {
                summary.skipped_lines += 1;
                continue;
            }
        };
        if record.get("event").and_then(Value::as_str) != Some(EVENT_SIM_RUN) {
            continue;
        }

        summary.total_runs += 1;
        let class = label(record.get("classId")).unwrap_or_else(|| "none".to_string());
        *summary.by_class.entry(class).or_insert(0) += 1;
        let main = preset(&record, "w1").unwrap_or_else(|| "custom".to_string());
        let off = preset(&record, "w2").unwrap_or_else(|| "none".to_string());
        presets.add(&main);
        combos.add(&format!("{main} + {off}"));
        if flag(&record, "specialAttacks") {
            summary.with_special_attacks += 1;
        }
        if flag(&record, "fistweaving") {
            summary.with_fistweaving += 1;
        }
        users.insert(user_key(&record));
    }

    summary.unique_users = users.len() as u64;
    summary.top_main_hand_presets = presets.top(TOP_N);
    summary.top_combos = combos.top(TOP_N);
    summary
}

/// Summarize a log file. A missing file yields `Ok(None)`.
pub fn summarize_file(path: impl AsRef<Path>) -> Result<Option<UsageSummary>, UsageLogError> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(summarize_lines(text.lines()))),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(UsageLogError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_ranking(f: &mut fmt::Formatter<'_>, title: &str, rows: &[(String, u64)]) -> fmt::Result {
    writeln!(f, "{title}")?;
    for (label, count) in rows {
        writeln!(f, "  {count:>6}  {label}")?;
    }
    Ok(())
}

impl fmt::Display for UsageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- DPS-Sim usage summary ---")?;
        writeln!(f, "Total sim runs: {}", self.total_runs)?;
        writeln!(f, "Unique users (by anonymous id): {}", self.unique_users)?;
        writeln!(f)?;
        writeln!(f, "Runs by class:")?;
        for (class, count) in &self.by_class {
            writeln!(f, "  {count:>6}  {class}")?;
        }
        writeln!(f)?;
        write_ranking(f, "Runs by main-hand preset (top 10):", &self.top_main_hand_presets)?;
        writeln!(f)?;
        write_ranking(f, "Top weapon combinations (top 10):", &self.top_combos)?;
        writeln!(f)?;
        writeln!(f, "Runs with special attacks: {}", self.with_special_attacks)?;
        write!(f, "Runs with fistweaving: {}", self.with_fistweaving)?;
        if self.skipped_lines > 0 {
            write!(f, "\nSkipped malformed lines: {}", self.skipped_lines)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_ties_keep_first_seen_order() {
        let mut tally = Tally::default();
        for label in ["b", "a", "c", "a", "b"] {
            tally.add(label);
        }
        assert_eq!(
            tally.top(2),
            vec![("b".to_string(), 2), ("a".to_string(), 2)]
        );
    }

    #[test]
    fn skips_blank_malformed_and_other_events() {
        let summary = summarize_lines([
            "",
            "garbage",
            r#"{"event":"page_view","uid":"x"}"#,
            r#"{"event":"sim_run","uid":"x","classId":"rogue"}"#,
        ]);
        assert_eq!(summary.total_runs, 1);
        assert_eq!(summary.skipped_lines, 1);
        assert_eq!(summary.by_class.get("rogue"), Some(&1));
    }

    #[test]
    fn loose_field_types_follow_truthiness() {
        assert!(!truthy(&Value::Null));
        assert!(!truthy(&serde_json::json!(0)));
        assert!(!truthy(&serde_json::json!("")));
        assert!(truthy(&serde_json::json!(1)));
        assert!(truthy(&serde_json::json!("no")));
        assert_eq!(label(Some(&serde_json::json!(7))), Some("7".to_string()));
        assert_eq!(label(Some(&serde_json::json!(false))), None);
        let record = serde_json::json!({"w1": "Dagger", "w2": {"preset": 3}});
        assert_eq!(preset(&record, "w1"), None);
        assert_eq!(preset(&record, "w2"), Some("3".to_string()));
    }
}
