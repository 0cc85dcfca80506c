use clap::{Args, Subcommand};

use super::{ConfigArgs, OutputFormat};

#[derive(Args, Debug, Clone)]
pub struct DictArgs {
    #[command(subcommand)]
    pub cmd: DictCmd,
}

#[derive(Subcommand, Debug, Clone)]
pub enum DictCmd {
    /// Store S3 connection settings (or remove them with --clear)
    Configure {
        #[arg(long, required_unless_present = "clear")]
        endpoint_url: Option<String>,
        #[arg(long, required_unless_present = "clear")]
        bucket: Option<String>,
        #[arg(long, default_value = "us-east-1")]
        region: String,
        #[arg(long, env = "FERRY_S3_ACCESS_KEY")]
        access_key: Option<String>,
        #[arg(long, env = "FERRY_S3_SECRET_KEY", hide_env_values = true)]
        secret_key: Option<String>,
        /// Accept invalid TLS certificates from the endpoint
        #[arg(long)]
        no_verify_ssl: bool,
        #[arg(long, conflicts_with_all = ["endpoint_url", "bucket"])]
        clear: bool,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Show settings and the cached dictionary
    Show {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Download the dictionary and refresh the local cache
    Pull {
        /// Object key inside the bucket
        #[arg(long, default_value = ferry_store::DEFAULT_DICTIONARY_KEY)]
        key: String,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Check that the configured bucket is reachable
    Test {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Look up one external name in the cached dictionary
    Lookup {
        external: String,
        #[command(flatten)]
        config: ConfigArgs,
    },
}
