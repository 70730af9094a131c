//! Swiss odds CLI
//!
//! Load a stage file and answer matchup and advancement queries as JSON.

use serde::Serialize;
use std::collections::BTreeMap;
use std::env;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process;
use swiss_core::{load_stage, MatchKey, Record, Status, SwissStage};
use swiss_odds::{MatchupCalculator, OddsConfig, SaveJson, WinProbabilities};
use tracing_subscriber::EnvFilter;

type CliResult = Result<(), Box<dyn Error>>;

fn print_usage() {
    println!("Swiss stage matchup odds");
    println!();
    println!("Usage:");
    println!("  swiss_odds standings <stage>");
    println!("  swiss_odds groups <stage>");
    println!("  swiss_odds matchup <stage> <team-a> <team-b> [--odds FILE] [--config FILE] [--out FILE]");
    println!("  swiss_odds opponents <stage> <team> [--odds FILE] [--config FILE] [--out FILE]");
    println!("  swiss_odds advance <stage> <team> [--trials N] [--seed S] [--config FILE]");
    println!("  swiss_odds draw <stage> [--seed S] [--out FILE]");
    println!();
    println!("Files:");
    println!("  <stage>       - JSON or TOML stage with each team's match history");
    println!("  --odds FILE   - win probabilities for pending matches");
    println!("  --config FILE - TOML query settings (trials, seed, limits)");
    println!();
    println!("Logging goes to stderr; set SWISS_ODDS_LOG=debug for detail.");
}

/// Options shared by every command
#[derive(Default)]
struct Flags {
    positional: Vec<String>,
    odds: Option<PathBuf>,
    config: Option<PathBuf>,
    out: Option<PathBuf>,
    trials: Option<u32>,
    seed: Option<u64>,
}

fn parse_flags(args: &[String]) -> Result<Flags, Box<dyn Error>> {
    let mut flags = Flags::default();

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let value = args.get(i + 1).ok_or_else(|| format!("{} needs a value", flag));
        match flag {
            "--odds" | "-o" => {
                flags.odds = Some(PathBuf::from(value?));
                i += 1;
            }
            "--config" | "-c" => {
                flags.config = Some(PathBuf::from(value?));
                i += 1;
            }
            "--out" => {
                flags.out = Some(PathBuf::from(value?));
                i += 1;
            }
            "--trials" | "-n" => {
                flags.trials = Some(value?.parse().map_err(|e| format!("--trials: {}", e))?);
                i += 1;
            }
            "--seed" | "-s" => {
                flags.seed = Some(value?.parse().map_err(|e| format!("--seed: {}", e))?);
                i += 1;
            }
            other if other.starts_with("--") => return Err(format!("unknown option {}", other).into()),
            _ => flags.positional.push(args[i].clone()),
        }
        i += 1;
    }

    Ok(flags)
}

impl Flags {
    fn require(&self, count: usize, what: &str) -> Result<(), Box<dyn Error>> {
        if self.positional.len() < count {
            return Err(format!("expected {}", what).into());
        }
        Ok(())
    }

    fn stage(&self) -> Result<SwissStage, Box<dyn Error>> {
        Ok(load_stage(Path::new(&self.positional[0]))?)
    }

    /// Config file first, then flags on top
    fn config(&self) -> Result<OddsConfig, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => OddsConfig::load(path)?,
            None => OddsConfig::default(),
        };
        if let Some(trials) = self.trials {
            config.trials = trials;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }

    fn probabilities(&self) -> Result<Option<WinProbabilities>, Box<dyn Error>> {
        Ok(match &self.odds {
            Some(path) => Some(WinProbabilities::load(path)?),
            None => None,
        })
    }

    fn emit<T: Serialize>(&self, value: &T) -> CliResult {
        println!("{}", serde_json::to_string_pretty(value)?);
        if let Some(path) = &self.out {
            value.save(path)?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct StandingRow<'a> {
    name: &'a str,
    record: Record,
    status: Status,
    pending: Option<&'a str>,
}

#[derive(Serialize)]
struct Standings<'a> {
    round: u32,
    teams: Vec<StandingRow<'a>>,
}

#[derive(Serialize)]
struct Groups {
    round: u32,
    groups: BTreeMap<String, Vec<String>>,
    pending: Vec<MatchKey>,
}

fn show_standings(flags: &Flags) -> CliResult {
    flags.require(1, "a stage file")?;
    let stage = flags.stage()?;

    let mut teams: Vec<StandingRow> = stage
        .teams
        .iter()
        .map(|t| StandingRow {
            name: &t.name,
            record: t.record(),
            status: t.status(),
            pending: t.pending_opponent(),
        })
        .collect();
    teams.sort_by_key(|row| (std::cmp::Reverse(row.record.wins), row.record.losses));

    flags.emit(&Standings {
        round: stage.round,
        teams,
    })
}

fn show_groups(flags: &Flags) -> CliResult {
    flags.require(1, "a stage file")?;
    let stage = flags.stage()?;

    let groups = stage
        .record_groups()
        .into_iter()
        .map(|(record, names)| (record.to_string(), names))
        .collect();
    flags.emit(&Groups {
        round: stage.round,
        groups,
        pending: stage.pending_matches(),
    })
}

fn run_matchup(flags: &Flags) -> CliResult {
    flags.require(3, "a stage file and two team names")?;
    let stage = flags.stage()?;
    let probabilities = flags.probabilities()?;
    let calc = MatchupCalculator::new(&stage, flags.config()?)?;

    let odds = calc.matchup(&flags.positional[1], &flags.positional[2], probabilities.as_ref())?;
    flags.emit(&odds)
}

fn run_opponents(flags: &Flags) -> CliResult {
    flags.require(2, "a stage file and a team name")?;
    let stage = flags.stage()?;
    let probabilities = flags.probabilities()?;
    let calc = MatchupCalculator::new(&stage, flags.config()?)?;

    let rows = calc.all_matchups(&flags.positional[1], probabilities.as_ref())?;
    flags.emit(&rows)
}

fn run_advance(flags: &Flags) -> CliResult {
    flags.require(2, "a stage file and a team name")?;
    let stage = flags.stage()?;
    let calc = MatchupCalculator::new(&stage, flags.config()?)?;

    let odds = calc.advancement(&flags.positional[1])?;
    flags.emit(&odds)
}

fn run_draw(flags: &Flags) -> CliResult {
    flags.require(1, "a stage file")?;
    let stage = flags.stage()?;
    stage.validate()?;

    let mut rng = flags.config()?.rng();
    let drawn = stage.draw_round(&mut rng);
    flags.emit(&drawn)
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("SWISS_ODDS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = args[1].as_str();
    let result = parse_flags(&args[2..]).and_then(|flags| match command {
        "standings" => show_standings(&flags),
        "groups" => show_groups(&flags),
        "matchup" => run_matchup(&flags),
        "opponents" => run_opponents(&flags),
        "advance" => run_advance(&flags),
        "draw" => run_draw(&flags),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        _ => Err(format!("unknown command: {}", command).into()),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
