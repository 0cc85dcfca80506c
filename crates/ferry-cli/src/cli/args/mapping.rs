use clap::{Args, Subcommand};

use super::{ConfigArgs, OutputFormat};

#[derive(Args, Debug, Clone)]
pub struct MappingArgs {
    #[command(subcommand)]
    pub cmd: MappingCmd,
}

#[derive(Subcommand, Debug, Clone)]
pub enum MappingCmd {
    /// List the mappings of a profile
    List {
        #[arg(short, long)]
        profile: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Map an external repository name to an internal one (overwrites)
    Add {
        external: String,
        internal: String,
        #[arg(long)]
        notes: Option<String>,
        #[arg(short, long)]
        profile: Option<String>,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Remove a mapping
    Remove {
        external: String,
        /// Do not ask for confirmation
        #[arg(short, long)]
        force: bool,
        #[arg(short, long)]
        profile: Option<String>,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Check a profile's mapping file
    Validate {
        #[arg(short, long)]
        profile: Option<String>,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Print the internal name an external name resolves to
    Resolve {
        external: String,
        #[arg(short, long)]
        profile: Option<String>,
        #[command(flatten)]
        config: ConfigArgs,
    },
}
