use clap::{Args, ValueEnum};
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Configuration directory [default: $FERRY_CONFIG_DIR or ~/.ferry]
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Directory holding *.tar.gz bundles
    #[arg(required_unless_present = "auto", conflicts_with = "auto")]
    pub dir: Option<PathBuf>,

    /// Scan every mounted removable volume instead of one directory
    #[arg(long)]
    pub auto: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}
