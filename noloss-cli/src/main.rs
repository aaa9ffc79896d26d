//! # Noloss CLI
//!
//! Command-line interface for no-loss prediction markets: a scripted
//! lifecycle demo against an in-memory engine, plus small conversion
//! utilities.

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use noloss_core::{
    utils::*, Engine, EventSink, InMemoryTransfer, ManualClock, MarketEvent, Side,
    CHALLENGE_PERIOD, MIN_PROPOSAL_BOND,
};

#[derive(Parser)]
#[command(name = "noloss")]
#[command(about = "No-loss prediction markets with bond-secured optimistic resolution")]
#[command(version)]
struct Cli {
    /// Show the engine's structured log output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk a market through its full lifecycle in memory
    Demo,
    /// Convert between whole tokens and fixed-point units
    Convert {
        /// Amount to convert
        amount: f64,
        /// Unit (tokens or units)
        unit: String,
    },
    /// Format a Unix timestamp as a human-readable date
    Timestamp {
        /// Unix timestamp in seconds
        timestamp: String,
    },
}

/// Prints every engine event as one dim JSON line, the way an off-system
/// indexer would ingest them.
struct StdoutSink;

impl EventSink for StdoutSink {
    fn emit(&mut self, event: &MarketEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            println!("{}", format!("event: {json}").bright_black());
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let max_level = if cli.verbose {
        tracing_subscriber::filter::LevelFilter::INFO
    } else {
        tracing_subscriber::filter::LevelFilter::WARN
    };
    tracing_subscriber::fmt().with_max_level(max_level).init();

    match cli.command {
        Commands::Demo => run_demo()?,

        Commands::Convert { amount, unit } => match unit.to_lowercase().as_str() {
            "tokens" | "token" => {
                println!(
                    "{} tokens = {} units",
                    amount.to_string().cyan(),
                    tokens_to_units(amount).to_string().cyan()
                );
            }
            "units" | "unit" => {
                println!(
                    "{} units = {} tokens",
                    amount.to_string().cyan(),
                    units_to_tokens(amount as u128).to_string().cyan()
                );
            }
            _ => {
                println!("{}", "Unit must be 'tokens' or 'units'".red());
            }
        },

        Commands::Timestamp { timestamp } => {
            let ts = parse_timestamp(&timestamp)?;
            println!("{}: {}", "Timestamp".yellow().bold(), format_timestamp(ts).cyan());
        }
    }

    Ok(())
}

fn run_demo() -> Result<()> {
    println!("{}", "Running no-loss market lifecycle demo...".green().bold());
    println!("{}", "═".repeat(60).bright_black());

    // A hand-driven clock so the demo can jump across the liveness window
    // and the payout buffer.
    let start = 1_700_000_000;
    let clock = ManualClock::new(start);
    let mut engine = Engine::with_collaborators(
        "protocol.owner",
        Box::new(clock.clone()),
        Box::new(InMemoryTransfer::new()),
        Box::new(StdoutSink),
    );

    let end_time = start + 86_400;
    let market_id = engine.create_market(
        "creator",
        "Will BTC close the year above $100k?",
        "crypto",
        end_time,
        end_time,
        tokens(2),
    )?;
    println!(
        "{}: #{} ({})",
        "Market created".yellow().bold(),
        market_id,
        format_timestamp(end_time)
    );

    let alice_index = engine.place_stake("alice", market_id, Side::Yes, tokens(5))?;
    let bob_index = engine.place_stake("bob", market_id, Side::No, tokens(3))?;
    println!(
        "{}: alice 5 tokens YES (stake {}), bob 3 tokens NO (stake {})",
        "Stakes placed".yellow().bold(),
        alice_index,
        bob_index
    );

    clock.set(end_time);
    engine.propose_outcome("alice", market_id, Side::Yes, MIN_PROPOSAL_BOND)?;
    println!(
        "{}: alice proposes YES under a 1-token bond",
        "Market ended".yellow().bold()
    );

    clock.set(end_time + CHALLENGE_PERIOD);
    engine.finalize_proposal(market_id)?;
    println!(
        "{}: unchallenged proposal finalized, rewards distributed",
        "Resolved".yellow().bold()
    );

    for (who, side, index) in [
        ("creator", Side::Yes, 0),
        ("creator", Side::No, 0),
        ("alice", Side::Yes, alice_index),
        ("bob", Side::No, bob_index),
    ] {
        let (principal, reward) = engine.unstake(who, market_id, side, index)?;
        println!(
            "{}: {} recovers {:.4} tokens principal on {}, reward {:.4}",
            "Claim".yellow().bold(),
            who,
            units_to_tokens(principal),
            side,
            units_to_tokens(reward)
        );
    }

    let alice_balance = engine.balance_of("alice");
    engine.withdraw("alice", alice_balance)?;
    println!(
        "{}: alice withdraws {:.4} tokens",
        "Withdrawal".yellow().bold(),
        units_to_tokens(alice_balance)
    );

    println!("{}", "═".repeat(60).bright_black());
    println!("{}", "Final market state:".green().bold());
    println!("{}", serde_json::to_string_pretty(engine.market(market_id)?)?);
    println!();
    println!(
        "{}",
        "Note: the demo engine is in-memory only; nothing persists.".bright_black()
    );
    Ok(())
}
