use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::path::Path;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

use carrier_profile::{open_database, Config, Load, OnboardingFlow, ProfileStore, RawInput};

const USAGE: &str = "Usage:
  carrier-profile onboard <files...> [--name NAME] [--mc MC]
  carrier-profile match <carrier_id> <loads.json> [--limit N]
  carrier-profile status <carrier_id>
  carrier-profile show <carrier_id>";

fn main() -> Result<()> {
    let config = Config::from_env();
    init_tracing(&config.log_level);

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first() else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };

    match command.as_str() {
        "onboard" => run_onboard(&config, &args[1..]),
        "match" => run_match(&config, &args[1..]),
        "status" => run_status(&config, &args[1..]),
        "show" => run_show(&config, &args[1..]),
        other => {
            eprintln!("❌ Unknown command: {}", other);
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }
}

fn init_tracing(level: &str) {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Split `--flag value` pairs from positional arguments
fn split_flags(args: &[String]) -> Result<(Vec<String>, Vec<(String, String)>)> {
    let mut positional = Vec::new();
    let mut flags = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if let Some(flag) = arg.strip_prefix("--") {
            let Some(value) = iter.next() else {
                bail!("Missing value for --{}", flag);
            };
            flags.push((flag.to_string(), value.clone()));
        } else {
            positional.push(arg.clone());
        }
    }
    Ok((positional, flags))
}

fn flag<'a>(flags: &'a [(String, String)], name: &str) -> Option<&'a str> {
    flags
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn run_onboard(config: &Config, args: &[String]) -> Result<()> {
    let (files, flags) = split_flags(args)?;
    if files.is_empty() {
        bail!("No input files given\n{}", USAGE);
    }

    println!("🚚 Carrier Onboarding");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Read inputs (unreadable files are reported and skipped)
    println!("\n📂 Reading {} file(s)...", files.len());
    let mut inputs = Vec::new();
    for file in &files {
        match RawInput::from_path(Path::new(file)) {
            Ok(input) => {
                println!("✓ {} ({})", file, input.format().name());
                inputs.push(input);
            }
            Err(e) => {
                warn!(file = %file, error = %e, "skipping file");
                println!("⚠️  {}: {}", file, e);
            }
        }
    }

    // 2. Run the pipeline
    println!("\n🔧 Parsing, normalizing and enriching...");
    let conn = open_database(&config.database_path)?;
    let flow = OnboardingFlow::from_config(Some(&conn), config);
    let report = flow.process_upload(&inputs, flag(&flags, "name"), flag(&flags, "mc"));

    for error in &report.errors {
        println!("❌ {}", error);
    }
    for warning in &report.warnings {
        println!("⚠️  {}", warning);
    }

    let Some(profile) = &report.profile else {
        bail!("No input could be parsed");
    };

    // 3. Summary
    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✅ Carrier ID: {}", report.carrier_id);
    println!("✓ Brokers: {}", profile.brokers.len());
    println!("✓ Lanes:   {}", profile.lanes.len());
    println!("✓ Loads:   {}", profile.loads.len());
    if let Some(stats) = &report.normalization {
        println!(
            "✓ Deduplicated: {} broker(s), {} load(s), {} lane(s) merged",
            stats.brokers_deduplicated, stats.loads_deduplicated, stats.lanes_merged
        );
    }
    println!(
        "✓ Enrichment: {} lane(s), {} rate(s) filled",
        report.lanes_enriched, report.rates_filled
    );
    if !profile.preferred_lanes.is_empty() {
        println!("\n🛣️  Preferred lanes:");
        for lane in &profile.preferred_lanes {
            println!("   {}", lane);
        }
    }
    println!(
        "\n💾 Saved to {}: {}",
        config.database_path,
        if report.saved { "yes" } else { "no" }
    );

    Ok(())
}

fn run_match(config: &Config, args: &[String]) -> Result<()> {
    let (positional, flags) = split_flags(args)?;
    let [carrier_id, loads_path] = positional.as_slice() else {
        bail!("Expected <carrier_id> <loads.json>\n{}", USAGE);
    };
    let limit = match flag(&flags, "limit") {
        Some(value) => value
            .parse()
            .with_context(|| format!("Invalid --limit value: {}", value))?,
        None => config.match_limit,
    };

    let content = fs::read_to_string(loads_path)
        .with_context(|| format!("Failed to read {}", loads_path))?;
    let candidates: Vec<Load> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse candidate loads in {}", loads_path))?;

    let conn = open_database(&config.database_path)?;
    let flow = OnboardingFlow::from_config(Some(&conn), config);
    let report = flow.generate_matches(carrier_id, candidates, limit)?;

    println!("🎯 Matches for {}", carrier_id);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for (rank, m) in report.matches.iter().enumerate() {
        println!(
            "{:>2}. {:<16} score {:.2}",
            rank + 1,
            m.load.load_id.as_deref().unwrap_or("-"),
            m.score
        );
        for reason in &m.reasons {
            println!("      • {}", reason);
        }
    }
    println!(
        "\n✓ {} match(es), average {:.2}, {} high confidence",
        report.summary.total_matches,
        report.summary.average_score,
        report.summary.high_confidence_matches
    );

    Ok(())
}

fn run_status(config: &Config, args: &[String]) -> Result<()> {
    let Some(carrier_id) = args.first() else {
        bail!("Expected <carrier_id>\n{}", USAGE);
    };

    let conn = open_database(&config.database_path)?;
    let flow = OnboardingFlow::from_config(Some(&conn), config);
    let status = flow.onboarding_status(carrier_id)?;

    println!("📋 {}: {}", carrier_id, status.status.as_str());
    println!("   {}", status.message);
    println!(
        "   brokers: {}  loads: {}  lanes: {}",
        status.has_brokers, status.has_loads, status.has_lanes
    );

    Ok(())
}

fn run_show(config: &Config, args: &[String]) -> Result<()> {
    let Some(carrier_id) = args.first() else {
        bail!("Expected <carrier_id>\n{}", USAGE);
    };

    let conn = open_database(&config.database_path)?;
    match conn.load_profile(carrier_id)? {
        Some(profile) => println!("{}", serde_json::to_string_pretty(&profile)?),
        None => {
            eprintln!("❌ Carrier not found: {}", carrier_id);
            std::process::exit(1);
        }
    }

    Ok(())
}
