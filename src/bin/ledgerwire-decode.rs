#![forbid(unsafe_code)]
//! Reads a hex-encoded item from stdin, decodes it, and prints it as JSON.
//!
//! ```text
//! pbpaste | ledgerwire-decode tx
//! pbpaste | ledgerwire-decode block
//! pbpaste | ledgerwire-decode blockheader
//! ```

use clap::{Parser, ValueEnum};
use colored::*;
use ledgerwire::config::{load_config, Config};
use ledgerwire::{Block, BlockHeader, Hash, Tx};
use serde::Serialize;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use tracing::{debug, Level};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// What the input encodes
    #[arg(value_enum, ignore_case = true)]
    entity: Entity,
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print single-line JSON
    #[arg(long)]
    compact: bool,
    /// Log decoding details to stderr (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Entity {
    Tx,
    Block,
    Blockheader,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{} {}", "error:".red().bold(), e);
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(cli.config.as_deref())?;

    let mut input = String::new();
    io::stdin()
        .take(config.limits.max_input_bytes as u64 + 1)
        .read_to_string(&mut input)?;
    if input.len() > config.limits.max_input_bytes {
        return Err(format!(
            "input exceeds limits.max_input_bytes ({} bytes)",
            config.limits.max_input_bytes
        )
        .into());
    }
    debug!(entity = ?cli.entity, len = input.len(), "read input");

    match cli.entity {
        Entity::Blockheader => {
            let header = BlockHeader::decode_text(&input)
                .map_err(|e| format!("error decoding: {}", e))?;
            print_item(cli, &config, "Block Hash", header.hash(), &header)
        }
        Entity::Block => {
            let block = Block::decode_text(&input)
                .map_err(|e| format!("error decoding: {}", e))?;
            print_item(cli, &config, "Block Hash", block.hash(), &block)
        }
        Entity::Tx => {
            let tx = Tx::decode_text(&input)
                .map_err(|e| format!("error decoding: {}", e))?;
            print_item(cli, &config, "Tx ID", tx.id(), &tx)
        }
    }
}

// The hash is derived, not part of the structure, so it is printed on its own
// line ahead of the JSON body.
fn print_item<T: Serialize>(
    cli: &Cli,
    config: &Config,
    label: &str,
    hash: Hash,
    item: &T,
) -> Result<(), Box<dyn std::error::Error>> {
    if config.output.show_hash {
        println!("{}: {}", label, hash);
    }

    let json = if cli.compact || !config.output.pretty {
        serde_json::to_string(item)?
    } else {
        serde_json::to_string_pretty(item)?
    };
    println!("{}", json);
    Ok(())
}
