//! fab-runner: provisions the factory database and prints dashboard views.
//!
//! Usage:
//!   fab-runner provision --db-dir ./data --seed 7
//!   fab-runner report --from 2024-03-01 --to 2024-03-31
//!   fab-runner oee
//!   fab-runner machine 12 --question "Why does it stop?"
//!   fab-runner ask which machine is the worst
//!
//! Every command provisions first; the row-count guard makes that a no-op
//! on a populated database.

use anyhow::{bail, Context, Result};
use candyfab_core::{
    assistant::{Answer, Assistant, OllamaClient},
    clock::{SystemClock, WallClock},
    config::{DbConfig, FactoryConfig, RetryPolicy},
    report,
    seeder::{provision, ProvisionOutcome},
    store::FactoryStore,
    table::Table,
    types::DateRange,
};
use chrono::NaiveDate;
use std::env;
use std::time::Duration;

/// Flags that consume the following argument.
const VALUE_FLAGS: [&str; 9] = [
    "--db-dir",
    "--db-name",
    "--seed",
    "--config",
    "--from",
    "--to",
    "--retry-delay",
    "--question",
    "--model",
];

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let words = positionals(&args);
    let command = words.first().map(String::as_str).unwrap_or("provision");
    let json = args.iter().any(|a| a == "--json");
    let seed = parse_arg(&args, "--seed", 42u64);
    let retry_delay = parse_arg(&args, "--retry-delay", 10u64);

    let mut config = match flag_value(&args, "--config") {
        Some(path) => FactoryConfig::load(path)?,
        None => FactoryConfig::standard(),
    };
    if let Some(model) = flag_value(&args, "--model") {
        config.assistant.model = model.to_string();
    }

    let mut db = DbConfig::from_env();
    if let Some(dir) = flag_value(&args, "--db-dir") {
        db.server = dir.to_string();
    }
    if let Some(name) = flag_value(&args, "--db-name") {
        db.database_name = name.to_string();
    }
    let retry = RetryPolicy {
        delay: Duration::from_secs(retry_delay),
        ..RetryPolicy::default()
    };

    if !json {
        println!("Candy factory -- fab-runner");
        println!("  command:   {command}");
        println!("  db:        {}", db.target());
        println!("  seed:      {seed}");
        println!();
    }

    let store = FactoryStore::connect(&db, &retry)?;
    let clock = SystemClock;
    let outcome = provision(&store, &config, &clock, seed)?;
    log::info!("Store ready at {}", store.target());

    let range = DateRange::new(
        parse_date(&args, "--from")?.unwrap_or(config.simulation.start_date),
        parse_date(&args, "--to")?.unwrap_or_else(|| clock.now().date()),
    )?;

    match command {
        "provision" => print_provision(&store, &outcome, json)?,
        "report" => {
            let view = report::alarm_report(&store, &range)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                println!(
                    "=== ALARMS {} .. {} ({} total) ===",
                    range.from,
                    range.to,
                    view.total_alarms()
                );
                println!("{}", Table::from_daily(&view.trend));
                println!();
                println!("=== DOWNTIME BY CAUSE (minutes) ===");
                let downtime =
                    Table::from_totals("Description", "Minutes", &view.downtime_by_cause);
                println!("{downtime}");
            }
        }
        "oee" => {
            let board = report::oee_board(&store, &range)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&board)?);
            } else {
                let mut table =
                    Table::new(["Machine", "Department", "Availability", "Quality", "OEE %"]);
                for m in &board {
                    table.push_row(vec![
                        m.name.clone(),
                        m.department.clone(),
                        format!("{:.3}", m.figures.availability),
                        format!("{:.3}", m.figures.quality),
                        format!("{:.1}", m.figures.oee),
                    ]);
                }
                println!("=== OEE {} .. {} ===", range.from, range.to);
                println!("{table}");
            }
        }
        "machine" => {
            let machine_id: i64 = words
                .get(1)
                .context("machine requires an id")?
                .parse()
                .context("machine id must be an integer")?;
            match flag_value(&args, "--question") {
                Some(question) => {
                    let client = OllamaClient::new(&config.assistant)?;
                    let assistant = Assistant::new(&store, &client);
                    print_answer(&assistant.analyse_machine(machine_id, question, &range)?, json)?;
                }
                None => {
                    let detail = report::machine_detail(&store, machine_id, &range)?;
                    if json {
                        println!("{}", serde_json::to_string_pretty(&detail)?);
                    } else {
                        println!(
                            "=== {} ({} alarm readings) ===",
                            detail.name,
                            detail.readings.len()
                        );
                        println!("{}", Table::from_readings(&detail.readings));
                    }
                }
            }
        }
        "ask" => {
            let question = words[1..].join(" ");
            if question.trim().is_empty() {
                bail!("ask requires a question");
            }
            let client = OllamaClient::new(&config.assistant)?;
            let assistant = Assistant::new(&store, &client);
            print_answer(&assistant.ask(&question, &range)?, json)?;
        }
        other => bail!("Unknown command: {other}"),
    }

    Ok(())
}

fn print_provision(store: &FactoryStore, outcome: &ProvisionOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }
    match outcome {
        ProvisionOutcome::AlreadyPopulated { production_rows } => {
            println!("=== ALREADY POPULATED ===");
            println!("  production rows: {production_rows}");
        }
        ProvisionOutcome::Seeded(s) => {
            println!("=== SEED SUMMARY ===");
            if let (Some(first), Some(last)) = (s.start_date, s.last_day) {
                println!("  days:           {first} .. {last}");
            }
            println!("  past days:      {}", s.past_days);
            println!("  future days:    {}", s.future_days);
            println!("  orders:         {} ({} pending)", s.orders, s.pending_orders);
            println!("  runs:           {}", s.production_runs);
            println!("  alarms:         {}", s.alarms);
            println!("  produced kg:    {}", s.produced_kg);
            println!("  scrapped kg:    {}", s.scrapped_kg);
            println!("  commits:        {}", s.commits);
        }
    }
    println!();
    println!("=== TABLES ===");
    for (table, count) in store.table_counts()? {
        println!("  {table:<14} {count}");
    }
    Ok(())
}

fn print_answer(answer: &Answer, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(answer)?);
        return Ok(());
    }
    match answer {
        Answer::Table { title, table } => {
            println!("=== {} ===", title.to_uppercase());
            println!("{table}");
        }
        Answer::Text { text } => println!("{text}"),
    }
    Ok(())
}

/// Arguments that are neither flags nor flag values, program name excluded.
fn positionals(args: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            iter.next();
        } else if !arg.starts_with("--") {
            out.push(arg.clone());
        }
    }
    out
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_date(args: &[String], flag: &str) -> Result<Option<NaiveDate>> {
    flag_value(args, flag)
        .map(|v| {
            NaiveDate::parse_from_str(v, "%Y-%m-%d")
                .with_context(|| format!("{flag} expects YYYY-MM-DD, got {v}"))
        })
        .transpose()
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
