use clap::{Args, Subcommand};

use super::{ConfigArgs, OutputFormat};

#[derive(Args, Debug, Clone)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub cmd: HistoryCmd,
}

#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCmd {
    /// Most recent attempts first
    List {
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        #[command(flatten)]
        config: ConfigArgs,
    },
    Show {
        id: String,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Delete every entry
    Clear {
        #[arg(short, long)]
        yes: bool,
        #[command(flatten)]
        config: ConfigArgs,
    },
}
