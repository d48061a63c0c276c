use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use compute::summarize;
use config::Config;
use data::{parse_entry_date, Entry, Error};
use std::path::PathBuf;
use store::Store;
use tracing_subscriber::EnvFilter;
use write::{render_summary, write_entries, write_summary_csv};

mod compute;
mod config;
mod data;
mod read;
mod store;
mod write;

const NO_DATA: &str = "No data.";

#[derive(Parser, Debug)]
#[command(name = "fzcar")]
#[command(about = "Record driver travel allowances and report monthly totals")]
struct Cli {
    /// Config file (default: ~/.config/fzcar/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Entry log CSV, overriding the config file.
    #[arg(long, global = true, env = "FZCAR_DATA_FILE")]
    data_file: Option<PathBuf>,

    /// Log debug details to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record one entry per driver, all with the same date and amount.
    Add {
        /// Defaults to today.
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// One of 100, 300 or 500.
        #[arg(long, value_parser = parse_amount)]
        amount: i64,
        #[arg(required = true)]
        drivers: Vec<String>,
    },
    /// Show per-driver totals for every month.
    Summary {
        /// Print CSV instead of a table.
        #[arg(long)]
        csv: bool,
    },
    /// Write the raw entry log as CSV.
    Export {
        /// Use `-` for stdout.
        #[arg(long, short, default_value = "fz_data.csv")]
        output: PathBuf,
    },
    /// List the configured drivers.
    Roster,
}

fn parse_date(s: &str) -> Result<NaiveDate, Error> {
    parse_entry_date(s).ok_or_else(|| Error::InvalidDate(s.to_string()))
}

fn parse_amount(s: &str) -> Result<i64, Error> {
    match s.trim().parse::<i64>() {
        Ok(amount) if data::ALLOWED_AMOUNTS.contains(&amount) => Ok(amount),
        Ok(amount) => Err(Error::DisallowedAmount(amount)),
        Err(_) => Err(Error::InvalidAmount(s.to_string())),
    }
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("fzcar={level}"))),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(cli.config.as_deref())?;
    let store = Store::new(cli.data_file.unwrap_or(config.data_file));
    tracing::debug!(path = %store.path().display(), "using entry log");

    match cli.command {
        Command::Add {
            date,
            amount,
            drivers,
        } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let entries = Entry::batch(date, amount, &drivers, &config.roster)?;
            store.save(&entries)?;
            println!(
                "Added {} entr{} for {} ({amount}).",
                entries.len(),
                if entries.len() == 1 { "y" } else { "ies" },
                date.format(data::DATE_FORMAT)
            );
        }
        Command::Summary { csv } => {
            let entries = store.load()?;
            match summarize(entries, &config.roster) {
                None => println!("{NO_DATA}"),
                Some(summary) if csv => write_summary_csv(std::io::stdout(), &summary)?,
                Some(summary) => println!("{}", render_summary(&summary)),
            }
        }
        Command::Export { output } => {
            let entries = store.load()?;
            if entries.is_empty() {
                println!("{NO_DATA}");
            } else if output.as_os_str() == "-" {
                write_entries(std::io::stdout(), &entries)?;
            } else {
                let file = std::fs::File::create(&output)
                    .with_context(|| format!("creating {}", output.display()))?;
                write_entries(file, &entries)?;
                println!("Exported {} entries to {}.", entries.len(), output.display());
            }
        }
        Command::Roster => {
            for driver in config.roster.as_slice() {
                println!("{driver}");
            }
        }
    }
    Ok(())
}
