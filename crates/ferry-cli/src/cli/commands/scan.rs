use anyhow::Result;

use ferry_bundle::{scan_bundles, scan_removable_media};

use crate::cli::args::{OutputFormat, ScanArgs};
use crate::cli::helpers::print_json;
use crate::exit_codes::EXIT_SUCCESS;

pub fn run(args: ScanArgs) -> Result<i32> {
    let (bundles, origin) = match &args.dir {
        Some(dir) => (scan_bundles(dir)?, dir.display().to_string()),
        None => (scan_removable_media(), "any removable volume".to_string()),
    };
    match args.format {
        OutputFormat::Json => print_json(&bundles)?,
        OutputFormat::Text => {
            if bundles.is_empty() {
                eprintln!("No bundles in {}", origin);
            }
            for b in &bundles {
                let mut extras = Vec::new();
                if b.has_submodules {
                    extras.push("submodules");
                }
                if b.has_artifacts {
                    extras.push("artifacts");
                }
                println!(
                    "{:<24} {:<18} {:>12}  {}  {}",
                    b.repo_name,
                    b.created_at.as_deref().unwrap_or("-"),
                    b.size,
                    extras.join(","),
                    b.path.display()
                );
            }
        }
    }
    Ok(EXIT_SUCCESS)
}
