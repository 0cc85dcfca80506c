use std::fs;

use anyhow::{Context, Result};

use ferry_store::{DocFormat, MappingStore, Profile, ProfileUpdate};

use crate::cli::args::{OutputFormat, ProfileCmd, ProfileFields};
use crate::cli::helpers::{confirm, open_store, print_json, select_profile};
use crate::exit_codes::{EXIT_FAILED, EXIT_SUCCESS};

pub fn run(cmd: ProfileCmd) -> Result<i32> {
    match cmd {
        ProfileCmd::List { format, config } => {
            let store = open_store(&config)?;
            let profiles = store.list_profiles()?;
            let active = store.active_profile()?;
            match format {
                OutputFormat::Json => print_json(&profiles)?,
                OutputFormat::Text => {
                    for p in &profiles {
                        let marker = if p.name == active { "*" } else { " " };
                        println!("{} {:<20} {}", marker, p.name, p.description);
                    }
                }
            }
            Ok(EXIT_SUCCESS)
        }
        ProfileCmd::Create {
            name,
            description,
            fields,
            config,
        } => {
            let store = open_store(&config)?;
            store.create_profile(&name, &description)?;
            let update = update_from(None, fields);
            if !update.is_empty() {
                store.update_profile(&name, update)?;
            }
            eprintln!("Created profile '{}'", name);
            Ok(EXIT_SUCCESS)
        }
        ProfileCmd::Update {
            name,
            description,
            fields,
            config,
        } => {
            let store = open_store(&config)?;
            let update = update_from(description, fields);
            if update.is_empty() {
                eprintln!("Nothing to update");
                return Ok(EXIT_SUCCESS);
            }
            let profile = store.update_profile(&name, update)?;
            show(&profile, OutputFormat::Text, &store)?;
            Ok(EXIT_SUCCESS)
        }
        ProfileCmd::Delete {
            name,
            force,
            config,
        } => {
            let store = open_store(&config)?;
            let prompt = format!("Delete profile '{}' and all of its mappings?", name);
            if !confirm(&prompt, force) {
                eprintln!("Aborted.");
                return Ok(EXIT_FAILED);
            }
            if store.delete_profile(&name)? {
                eprintln!("Deleted profile '{}'", name);
                Ok(EXIT_SUCCESS)
            } else {
                eprintln!("Profile '{}' does not exist", name);
                Ok(EXIT_FAILED)
            }
        }
        ProfileCmd::Show {
            name,
            format,
            config,
        } => {
            let store = open_store(&config)?;
            let profile = select_profile(&store, name.as_deref())?;
            show(&profile, format, &store)?;
            Ok(EXIT_SUCCESS)
        }
        ProfileCmd::Export {
            name,
            output,
            config,
        } => {
            let store = open_store(&config)?;
            let export = store.export_profile(&name)?;
            match output {
                Some(path) => {
                    let text = DocFormat::from_path(&path).render(&export)?;
                    fs::write(&path, text)
                        .with_context(|| format!("writing {}", path.display()))?;
                    eprintln!("Exported profile '{}' to {}", name, path.display());
                }
                None => print_json(&export)?,
            }
            Ok(EXIT_SUCCESS)
        }
        ProfileCmd::Import { file, config } => {
            let store = open_store(&config)?;
            let text = fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let data: serde_json::Value = DocFormat::from_path(&file).parse(&text, &file)?;
            let profile = store.import_profile(&data)?;
            eprintln!(
                "Imported profile '{}' ({} mappings)",
                profile.name,
                store.get_mappings(&profile.name)?.len()
            );
            Ok(EXIT_SUCCESS)
        }
    }
}

fn update_from(description: Option<String>, fields: ProfileFields) -> ProfileUpdate {
    ProfileUpdate {
        description,
        gitlab_url: fields.gitlab_url,
        remote_template: fields.remote_template,
        output_dir: fields.output_dir,
    }
}

fn show(profile: &Profile, format: OutputFormat, store: &MappingStore) -> Result<()> {
    let mappings = store.get_mappings(&profile.name)?;
    match format {
        OutputFormat::Json => print_json(profile),
        OutputFormat::Text => {
            let unset = "-";
            println!("name:            {}", profile.name);
            println!("description:     {}", profile.description);
            println!("gitlab_url:      {}", profile.gitlab_url.as_deref().unwrap_or(unset));
            println!(
                "remote_template: {}",
                profile.remote_template.as_deref().unwrap_or(unset)
            );
            println!("output_dir:      {}", profile.output_dir.as_deref().unwrap_or(unset));
            println!("mappings:        {}", mappings.len());
            println!("created_at:      {}", profile.created_at);
            println!("updated_at:      {}", profile.updated_at);
            Ok(())
        }
    }
}
