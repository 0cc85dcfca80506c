use anyhow::Result;

use ferry_store::{fetcher_from_settings, pull_dictionary, MappingDictionary, S3Settings, StoreError};

use crate::cli::args::{DictCmd, OutputFormat};
use crate::cli::helpers::{config_dir, print_json};
use crate::exit_codes::{EXIT_FAILED, EXIT_SUCCESS};

pub async fn run(cmd: DictCmd) -> Result<i32> {
    match cmd {
        DictCmd::Configure {
            endpoint_url,
            bucket,
            region,
            access_key,
            secret_key,
            no_verify_ssl,
            clear,
            config,
        } => {
            let path = config_dir(&config)?.s3_settings_file();
            if clear {
                S3Settings::clear(&path)?;
                eprintln!("S3 settings removed");
                return Ok(EXIT_SUCCESS);
            }
            let mut settings =
                S3Settings::new(endpoint_url.unwrap_or_default(), bucket.unwrap_or_default());
            settings.region = region;
            settings.access_key = access_key.filter(|k| !k.is_empty());
            settings.secret_key = secret_key.filter(|k| !k.is_empty());
            settings.verify_ssl = !no_verify_ssl;
            if !settings.is_configured() {
                return Err(StoreError::NotConfigured {
                    capability: "mapping dictionary",
                    message: "endpoint URL and bucket must not be empty".into(),
                }
                .into());
            }
            settings.save(&path)?;
            eprintln!("S3 settings saved to {}", path.display());
            Ok(EXIT_SUCCESS)
        }
        DictCmd::Show { format, config } => {
            let dir = config_dir(&config)?;
            let settings = S3Settings::load(&dir.s3_settings_file())?;
            let dict = MappingDictionary::load_cached(&dir.mapping_dict_file())?;
            match format {
                OutputFormat::Json => print_json(&dict)?,
                OutputFormat::Text => {
                    match &settings {
                        Some(s) => eprintln!(
                            "endpoint: {}  bucket: {}  region: {}  verify_ssl: {}",
                            s.endpoint_url, s.bucket_name, s.region, s.verify_ssl
                        ),
                        None => eprintln!("S3 not configured"),
                    }
                    eprintln!("{} cached mapping(s)", dict.len());
                    for (external, entry) in &dict.mappings {
                        println!(
                            "{} -> {}  [{}]",
                            external,
                            entry.internal_repo,
                            entry.team.as_deref().unwrap_or("-")
                        );
                    }
                }
            }
            Ok(EXIT_SUCCESS)
        }
        DictCmd::Pull { key, config } => {
            let dir = config_dir(&config)?;
            let settings = S3Settings::load(&dir.s3_settings_file())?;
            let fetcher = fetcher_from_settings(settings.as_ref());
            let bucket = settings.map(|s| s.bucket_name).unwrap_or_default();
            let dict =
                pull_dictionary(fetcher.as_ref(), &bucket, &key, &dir.mapping_dict_file()).await?;
            eprintln!("Pulled {} mapping(s) from {}/{}", dict.len(), bucket, key);
            Ok(EXIT_SUCCESS)
        }
        DictCmd::Test { config } => {
            let dir = config_dir(&config)?;
            let settings = S3Settings::load(&dir.s3_settings_file())?;
            let fetcher = fetcher_from_settings(settings.as_ref());
            let bucket = settings.map(|s| s.bucket_name).unwrap_or_default();
            fetcher.check_connection(&bucket).await?;
            eprintln!("Bucket '{}' is reachable", bucket);
            Ok(EXIT_SUCCESS)
        }
        DictCmd::Lookup { external, config } => {
            let dir = config_dir(&config)?;
            let dict = MappingDictionary::load_cached(&dir.mapping_dict_file())?;
            match dict.lookup(&external) {
                Some(entry) => {
                    print_json(entry)?;
                    Ok(EXIT_SUCCESS)
                }
                None => {
                    eprintln!("'{}' is not in the cached dictionary", external);
                    Ok(EXIT_FAILED)
                }
            }
        }
    }
}
