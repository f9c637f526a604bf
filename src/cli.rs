use std::env;

use crate::combat::{simulate_fight, FightConfig};
use crate::parallel::{export_samples_csv, run_sweep, WorkerPool};
use crate::report::format_report;
use crate::server::{self, ServerState};
use crate::usage::{summarize_file, RunSummary, UsageLog, DEFAULT_USAGE_LOG_PATH};

const USAGE: &str = "usage: dps-sim <simulate|sweep|serve|summarize>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Simulate,
    Sweep,
    Serve,
    Summarize,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("simulate") => Some(Command::Simulate),
        Some("sweep") => Some(Command::Sweep),
        Some("serve") => Some(Command::Serve),
        Some("summarize") => Some(Command::Summarize),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Simulate) => handle_simulate(args),
        Some(Command::Sweep) => handle_sweep(args),
        Some(Command::Serve) => handle_serve(),
        Some(Command::Summarize) => handle_summarize(args),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

/// Value following `flag`, if the flag is present.
fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a String> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|i| args.get(i + 1))
}

/// Arguments after the subcommand that are neither flags nor flag values.
fn positionals<'a>(args: &'a [String], value_flags: &[&str]) -> Vec<&'a String> {
    let mut out = Vec::new();
    let mut rest = args.iter().skip(2);
    while let Some(arg) = rest.next() {
        if value_flags.contains(&arg.as_str()) {
            rest.next();
        } else if !arg.starts_with("--") {
            out.push(arg);
        }
    }
    out
}

fn load_config(path: &str) -> Result<FightConfig, i32> {
    FightConfig::load(path).map_err(|err| {
        eprintln!("{err}");
        1
    })
}

fn handle_simulate(args: &[String]) -> i32 {
    let positional = positionals(args, &["--seed", "--log"]);
    let Some(path) = positional.first() else {
        eprintln!("usage: dps-sim simulate <config.json> [--seed N] [--json] [--log PATH]");
        return 2;
    };
    let mut config = match load_config(path) {
        Ok(config) => config,
        Err(code) => return code,
    };
    if let Some(raw) = flag_value(args, "--seed") {
        match raw.parse::<u64>() {
            Ok(seed) => config.seed = Some(seed),
            Err(_) => {
                eprintln!("invalid seed '{raw}'");
                return 2;
            }
        }
    }

    let report = simulate_fight(&config);

    if args.iter().any(|arg| arg == "--json") {
        match serde_json::to_string_pretty(&report) {
            Ok(payload) => println!("{payload}"),
            Err(err) => {
                eprintln!("failed to serialize fight report: {err}");
                return 1;
            }
        }
    } else {
        println!(
            "{}",
            format_report(
                &report,
                config.main_hand.name.as_deref(),
                config.off_hand.as_ref().and_then(|w| w.name.as_deref()),
            )
        );
        println!("Seed: {}", report.seed);
    }

    if let Some(log_path) = flag_value(args, "--log") {
        let record = RunSummary::from_config(&config, Some(uuid::Uuid::new_v4().to_string()));
        if let Err(err) = UsageLog::new(log_path).append_record(&record) {
            eprintln!("failed to write usage log: {err}");
            return 1;
        }
    }
    0
}

fn handle_sweep(args: &[String]) -> i32 {
    let positional = positionals(args, &["--workers", "--csv"]);
    let Some(path) = positional.first() else {
        eprintln!(
            "usage: dps-sim sweep <config.json> [runs=100] [seed=1] [--workers N] [--csv PATH]"
        );
        return 2;
    };
    let runs = parse_u32_arg(positional.get(1).copied(), "runs", 100);
    let seed = parse_u64_arg(positional.get(2).copied(), "seed", 1);
    let workers = parse_u32_arg(flag_value(args, "--workers"), "workers", 0);

    let config = match load_config(path) {
        Ok(config) => config,
        Err(code) => return code,
    };
    let summary = run_sweep(
        &config,
        runs as usize,
        seed,
        &WorkerPool::with_workers(workers as usize),
    );

    if let Some(csv_path) = flag_value(args, "--csv") {
        if let Err(err) = export_samples_csv(csv_path, &summary.samples) {
            eprintln!("failed to write {csv_path}: {err}");
            return 1;
        }
    }

    println!("runs\tseed\tmean_dps\tstd_dev\tci95_low\tci95_high\tmin_dps\tmax_dps\tmean_crits");
    println!(
        "{}\t{}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{:.2}",
        summary.runs,
        summary.base_seed,
        summary.mean_dps,
        summary.std_dev_dps,
        summary.dps_95_ci[0],
        summary.dps_95_ci[1],
        summary.min_dps,
        summary.max_dps,
        summary.mean_crit_hits,
    );
    0
}

fn handle_serve() -> i32 {
    let bind_addr =
        env::var(server::BIND_ENV).unwrap_or_else(|_| server::DEFAULT_BIND_ADDR.to_string());
    match server::run_server(&bind_addr, ServerState::from_env()) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn handle_summarize(args: &[String]) -> i32 {
    let path = args
        .get(2)
        .map(String::as_str)
        .unwrap_or(DEFAULT_USAGE_LOG_PATH);

    match summarize_file(path) {
        Ok(Some(summary)) => {
            println!("{summary}");
            0
        }
        Ok(None) => {
            println!("No usage log found at {path}. Run `dps-sim serve` and point clients at /log.");
            0
        }
        Err(err) => {
            eprintln!("summarize failed: {err}");
            1
        }
    }
}

fn parse_u32_arg(raw: Option<&String>, name: &str, default: u32) -> u32 {
    raw.and_then(|value| value.parse::<u32>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}

fn parse_u64_arg(raw: Option<&String>, name: &str, default: u64) -> u64 {
    raw.and_then(|value| value.parse::<u64>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn positionals_skip_flag_values() {
        let argv = args(&["dps-sim", "sweep", "fight.json", "--workers", "4", "50", "--csv", "out.csv", "9"]);
        let found: Vec<&str> = positionals(&argv, &["--workers", "--csv"])
            .into_iter()
            .map(String::as_str)
            .collect();
        assert_eq!(found, vec!["fight.json", "50", "9"]);
        assert_eq!(flag_value(&argv, "--csv").map(String::as_str), Some("out.csv"));
    }

    #[test]
    fn unknown_command() {
        assert_eq!(parse_command(&args(&["dps-sim", "optimize"])), None);
        assert_eq!(run_with_args(&args(&["dps-sim"])), 2);
    }
}
