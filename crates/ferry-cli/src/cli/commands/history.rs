use anyhow::Result;

use ferry_store::{HistoryEntry, HistoryLedger};

use crate::cli::args::{HistoryCmd, OutputFormat};
use crate::cli::helpers::{config_dir, confirm, print_json};
use crate::exit_codes::{EXIT_FAILED, EXIT_SUCCESS};

pub fn run(cmd: HistoryCmd) -> Result<i32> {
    match cmd {
        HistoryCmd::List {
            limit,
            format,
            config,
        } => {
            let ledger = HistoryLedger::new(config_dir(&config)?.history_file());
            let entries = ledger.list(limit)?;
            match format {
                OutputFormat::Json => print_json(&entries)?,
                OutputFormat::Text => {
                    if entries.is_empty() {
                        eprintln!("No ingestion history");
                    }
                    for e in &entries {
                        println!(
                            "{}  {}  {:<7}  {} -> {}  ({}, {:.2}s)",
                            e.id,
                            e.timestamp,
                            e.status,
                            e.source_repo,
                            e.target_repo,
                            e.bundle_name,
                            e.duration_seconds
                        );
                    }
                }
            }
            Ok(EXIT_SUCCESS)
        }
        HistoryCmd::Show { id, format, config } => {
            let ledger = HistoryLedger::new(config_dir(&config)?.history_file());
            let Some(entry) = ledger.get(&id)? else {
                eprintln!("No history entry '{}'", id);
                return Ok(EXIT_FAILED);
            };
            match format {
                OutputFormat::Json => print_json(&entry)?,
                OutputFormat::Text => print_entry(&entry),
            }
            Ok(EXIT_SUCCESS)
        }
        HistoryCmd::Clear { yes, config } => {
            let ledger = HistoryLedger::new(config_dir(&config)?.history_file());
            if !confirm("Delete the entire ingestion history?", yes) {
                eprintln!("Aborted.");
                return Ok(EXIT_FAILED);
            }
            ledger.clear()?;
            eprintln!("History cleared");
            Ok(EXIT_SUCCESS)
        }
    }
}

fn print_entry(e: &HistoryEntry) {
    println!("id:         {}", e.id);
    println!("timestamp:  {}", e.timestamp);
    println!("bundle:     {}", e.bundle_name);
    println!("source:     {}", e.source_repo);
    println!("target:     {}", e.target_repo);
    println!("profile:    {}", e.profile);
    println!("status:     {}", e.status);
    if let Some(msg) = &e.error_message {
        println!("error:      {}", msg);
    }
    println!("artifacts:  {}", e.artifacts_count);
    println!("duration:   {:.2}s", e.duration_seconds);
}
