use anyhow::Result;

use crate::cli::args::{MappingCmd, OutputFormat};
use crate::cli::helpers::{confirm, open_store, print_json, select_profile};
use crate::exit_codes::{EXIT_CONFIG_ERROR, EXIT_FAILED, EXIT_SUCCESS};

pub fn run(cmd: MappingCmd) -> Result<i32> {
    match cmd {
        MappingCmd::List {
            profile,
            format,
            config,
        } => {
            let store = open_store(&config)?;
            let profile = select_profile(&store, profile.as_deref())?;
            let mappings = store.get_mappings(&profile.name)?;
            match format {
                OutputFormat::Json => print_json(&mappings)?,
                OutputFormat::Text => {
                    if mappings.is_empty() {
                        eprintln!("No mappings in profile '{}'", profile.name);
                    }
                    for (external, entry) in &mappings {
                        match &entry.notes {
                            Some(notes) => {
                                println!("{} -> {}  # {}", external, entry.internal_name, notes)
                            }
                            None => println!("{} -> {}", external, entry.internal_name),
                        }
                    }
                }
            }
            Ok(EXIT_SUCCESS)
        }
        MappingCmd::Add {
            external,
            internal,
            notes,
            profile,
            config,
        } => {
            let store = open_store(&config)?;
            let profile = select_profile(&store, profile.as_deref())?;
            if let Some(existing) = store.get_mappings(&profile.name)?.get(&external) {
                eprintln!(
                    "warning: overwriting '{}' -> '{}' (backup taken)",
                    external, existing.internal_name
                );
            }
            store.add_mapping(&profile.name, &external, &internal, notes.as_deref())?;
            eprintln!("Mapped {} -> {} in profile '{}'", external, internal, profile.name);
            Ok(EXIT_SUCCESS)
        }
        MappingCmd::Remove {
            external,
            force,
            profile,
            config,
        } => {
            let store = open_store(&config)?;
            let profile = select_profile(&store, profile.as_deref())?;
            let prompt = format!("Remove mapping '{}' from profile '{}'?", external, profile.name);
            if !confirm(&prompt, force) {
                eprintln!("Aborted.");
                return Ok(EXIT_FAILED);
            }
            if store.remove_mapping(&profile.name, &external)? {
                eprintln!("Removed '{}'", external);
                Ok(EXIT_SUCCESS)
            } else {
                eprintln!("No mapping for '{}' in profile '{}'", external, profile.name);
                Ok(EXIT_FAILED)
            }
        }
        MappingCmd::Validate { profile, config } => {
            let store = open_store(&config)?;
            let profile = select_profile(&store, profile.as_deref())?;
            let errors = store.validate(&profile.name);
            if errors.is_empty() {
                eprintln!("Profile '{}': mappings are valid", profile.name);
                return Ok(EXIT_SUCCESS);
            }
            for error in &errors {
                println!("{}", error);
            }
            Ok(EXIT_CONFIG_ERROR)
        }
        MappingCmd::Resolve {
            external,
            profile,
            config,
        } => {
            let store = open_store(&config)?;
            let profile = select_profile(&store, profile.as_deref())?;
            println!("{}", store.resolve(&profile.name, &external));
            Ok(EXIT_SUCCESS)
        }
    }
}
