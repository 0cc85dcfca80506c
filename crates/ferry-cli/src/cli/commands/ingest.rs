use std::collections::BTreeMap;

use anyhow::{Context, Result};
use tracing::warn;

use ferry_core::{
    Credentials, GitOptions, IngestError, IngestOutcome, IngestRequest, Ingestor, MappingSource,
    RemoteTemplate, SystemGit,
};
use ferry_store::{load_mapping_file, HistoryLedger, MappingDictionary, MappingStore};

use crate::cli::args::{IngestArgs, IngestDirArgs, RemoteArgs};
use crate::cli::helpers::{config_dir, open_store, select_profile};
use crate::exit_codes::{EXIT_FAILED, EXIT_SUCCESS};

/// Which resolver the operator asked for.
enum Resolver {
    Profile,
    Legacy(BTreeMap<String, String>),
    Dictionary(MappingDictionary),
}

/// Everything `ingest` and `ingest-dir` share, resolved from flags and profile.
struct Session {
    store: MappingStore,
    profile: String,
    template: RemoteTemplate,
    credentials: Credentials,
    ledger: Option<HistoryLedger>,
    git: SystemGit,
}

impl Session {
    fn prepare(args: &RemoteArgs) -> Result<(Self, Resolver)> {
        let dir = config_dir(&args.config)?;
        let store = open_store(&args.config)?;
        let profile = select_profile(&store, args.profile.as_deref())?;

        let raw_template = args
            .remote_template
            .clone()
            .or_else(|| profile.remote_template.clone())
            .ok_or_else(|| IngestError::Template {
                template: String::new(),
                reason: "no remote template: pass --remote-template or set remote_template \
                         on the profile"
                    .into(),
            })?;
        let template = RemoteTemplate::parse(&raw_template)?;

        let resolver = if let Some(path) = &args.mapping {
            let map = load_mapping_file(path)
                .with_context(|| format!("loading mapping file {}", path.display()))?;
            Resolver::Legacy(map)
        } else if args.mapping_dict {
            let dict = MappingDictionary::load_cached(&dir.mapping_dict_file())?;
            if dict.is_empty() {
                warn!("mapping dictionary cache is empty; run `ferry dict pull`");
            }
            Resolver::Dictionary(dict)
        } else {
            Resolver::Profile
        };

        if args.insecure {
            warn!("TLS certificate verification disabled");
        }

        let session = Self {
            profile: profile.name,
            template,
            credentials: Credentials::new(args.username.clone(), args.password.clone()),
            ledger: (!args.no_record_history).then(|| HistoryLedger::new(dir.history_file())),
            git: SystemGit::new(GitOptions {
                insecure_tls: args.insecure,
            }),
            store,
        };
        Ok((session, resolver))
    }

    fn mapping(&self, resolver: Resolver) -> MappingSource<'_> {
        match resolver {
            Resolver::Profile => MappingSource::Profile {
                store: &self.store,
                profile: self.profile.clone(),
            },
            Resolver::Legacy(map) => MappingSource::LegacyFile(map),
            Resolver::Dictionary(dict) => MappingSource::Dictionary(dict),
        }
    }
}

pub async fn run(args: IngestArgs) -> Result<i32> {
    let (session, resolver) = Session::prepare(&args.remote)?;
    let request = IngestRequest {
        archive: args.tar.clone(),
        template: session.template.clone(),
        credentials: session.credentials.clone(),
        profile: session.profile.clone(),
        artifacts_output_dir: args.artifacts_output_dir.clone(),
    };
    let mapping = session.mapping(resolver);

    let mut ingestor = Ingestor::new(&session.git, &mapping);
    if let Some(ledger) = &session.ledger {
        ingestor = ingestor.with_history(ledger);
    }

    match ingestor.ingest(&request).await {
        Ok(outcome) => {
            report(&outcome);
            Ok(EXIT_SUCCESS)
        }
        Err(e) => {
            if let Some(help) = e.remediation() {
                eprintln!("{}", help);
            }
            Err(e).with_context(|| format!("ingesting {}", args.tar.display()))
        }
    }
}

pub async fn run_dir(args: IngestDirArgs) -> Result<i32> {
    let (session, resolver) = Session::prepare(&args.remote)?;
    let mapping = session.mapping(resolver);

    let mut ingestor = Ingestor::new(&session.git, &mapping);
    if let Some(ledger) = &session.ledger {
        ingestor = ingestor.with_history(ledger);
    }

    let batch = ingestor
        .ingest_dir(
            &args.drop_dir,
            &session.template,
            &session.credentials,
            &session.profile,
        )
        .await?;

    for item in &batch.items {
        let name = item.archive.display();
        match &item.result {
            Ok(outcome) => eprintln!("ok      {} -> {}", name, outcome.target_repo),
            Err(e) => {
                eprintln!("failed  {}: {}", name, e);
                if let Some(help) = e.remediation() {
                    eprintln!("        {}", help);
                }
            }
        }
    }
    eprintln!(
        "{} bundle(s): {} ingested, {} failed",
        batch.items.len(),
        batch.succeeded(),
        batch.failed()
    );

    Ok(if batch.failed() > 0 {
        EXIT_FAILED
    } else {
        EXIT_SUCCESS
    })
}

fn report(outcome: &IngestOutcome) {
    eprintln!("Ingested {} -> {}", outcome.source_repo, outcome.target_repo);
    for sub in &outcome.submodules {
        eprintln!("  submodule {} ({} -> {})", sub.path, sub.source_repo, sub.target_repo);
    }
    if let Some(copy) = outcome.artifacts {
        eprintln!("  artifacts: {} file(s), {} bytes", copy.files, copy.bytes);
    }
}
