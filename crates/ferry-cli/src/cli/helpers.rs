use anyhow::{Context, Result};
use dialoguer::{theme::ColorfulTheme, Confirm};
use serde::Serialize;

use ferry_store::{ConfigDir, MappingStore, Profile, StoreError};

use super::args::ConfigArgs;

pub fn config_dir(config: &ConfigArgs) -> Result<ConfigDir> {
    Ok(ConfigDir::resolve(config.config_dir.as_deref())?)
}

pub fn open_store(config: &ConfigArgs) -> Result<MappingStore> {
    let dir = config_dir(config)?;
    let root = dir.root().display().to_string();
    MappingStore::open(dir).with_context(|| format!("opening configuration directory {}", root))
}

/// `name` if given (must exist), else the active profile.
pub fn select_profile(store: &MappingStore, name: Option<&str>) -> Result<Profile> {
    let name = match name {
        Some(n) => n.to_string(),
        None => store.active_profile()?,
    };
    store
        .get_profile(&name)?
        .ok_or_else(|| StoreError::ProfileNotFound { name }.into())
}

/// Ask before a destructive action; `assume_yes` skips the prompt.
/// A non-interactive terminal counts as "no".
pub fn confirm(prompt: &str, assume_yes: bool) -> bool {
    if assume_yes {
        return true;
    }
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .unwrap_or(false)
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
