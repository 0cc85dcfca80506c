use super::args::*;

pub mod dict;
pub mod history;
pub mod ingest;
pub mod mapping;
pub mod pack;
pub mod profile;
pub mod scan;

use crate::exit_codes::EXIT_SUCCESS;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Pack(args) => pack::run(args).await,
        Command::Ingest(args) => ingest::run(args).await,
        Command::IngestDir(args) => ingest::run_dir(args).await,
        Command::Mapping(args) => mapping::run(args.cmd),
        Command::Profile(args) => profile::run(args.cmd),
        Command::Scan(args) => scan::run(args),
        Command::History(args) => history::run(args.cmd),
        Command::Dict(args) => dict::run(args.cmd).await,
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(EXIT_SUCCESS)
        }
    }
}
