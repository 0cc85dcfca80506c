use clap::{Parser, Subcommand};

pub mod common;
pub mod dict;
pub mod history;
pub mod ingest;
pub mod mapping;
pub mod pack;
pub mod profile;
pub use common::*;
pub use dict::*;
pub use history::*;
pub use ingest::*;
pub use mapping::*;
pub use pack::*;
pub use profile::*;

#[derive(Parser)]
#[command(
    name = "ferry",
    version,
    about = "Move Git repositories across an air gap as self-describing bundles"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Mirror a repository (and optionally submodules and CI artifacts) into a bundle
    Pack(PackArgs),
    /// Push one bundle into the internal Git server
    Ingest(IngestArgs),
    /// Ingest every bundle in a drop folder; failures do not stop the batch
    IngestDir(IngestDirArgs),
    /// Manage profile-scoped repository name mappings
    Mapping(MappingArgs),
    /// Manage profiles
    Profile(ProfileArgs),
    /// Summarize the bundles in a directory without extracting them
    Scan(ScanArgs),
    /// Inspect the ingestion history ledger
    History(HistoryArgs),
    /// Shared mapping dictionary stored in S3
    Dict(DictArgs),
    Version,
}
