use clap::{Args, Subcommand};
use std::path::PathBuf;

use super::{ConfigArgs, OutputFormat};

#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub cmd: ProfileCmd,
}

/// Optional profile settings used as command defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct ProfileFields {
    /// Source GitLab base URL for `pack`
    #[arg(long)]
    pub gitlab_url: Option<String>,
    /// Push URL template for `ingest`
    #[arg(long)]
    pub remote_template: Option<String>,
    /// Archive output directory for `pack`
    #[arg(long)]
    pub output_dir: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ProfileCmd {
    List {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        #[command(flatten)]
        config: ConfigArgs,
    },
    Create {
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[command(flatten)]
        fields: ProfileFields,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Change description or defaults; an empty value clears a field
    Update {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
        #[command(flatten)]
        fields: ProfileFields,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Delete a profile and its mappings (the default profile is protected)
    Delete {
        name: String,
        #[arg(short, long)]
        force: bool,
        #[command(flatten)]
        config: ConfigArgs,
    },
    Show {
        /// [default: active profile]
        name: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Export a profile with its mappings (credential-like keys stripped)
    Export {
        name: String,
        /// Write to file (.json, .yaml or .yml) instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Create a profile from an export file
    Import {
        file: PathBuf,
        #[command(flatten)]
        config: ConfigArgs,
    },
}
