use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use pedigree_trust::{
    save_verification, Config, HttpFetcher, LookupOutcome, LookupQuery,
    PersistenceSink, RestSink, SearchCandidate, SqliteSink, StaticFetcher, VerificationPayload,
    VerificationService, VerifiedProfile,
};

#[derive(Parser)]
#[command(name = "pedigree-trust", version, about = "Verify dogs against the pedigree registry")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Look a dog up by registry id or by name, print the verified profile as JSON
    Lookup {
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },
    /// List registry search matches for a name
    Search {
        name: String,
        /// Write CSV to stdout instead of a table
        #[arg(long)]
        csv: bool,
    },
    /// Extract and score a profile page saved to disk
    Parse {
        file: PathBuf,
        /// Registry id of the dog on that page
        #[arg(long)]
        id: String,
    },
    /// Persist a verified profile (JSON from `lookup`) for a subject
    Save {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        input: PathBuf,
    },
    /// Show what the local store holds for a subject, with its audit trail
    History {
        #[arg(long)]
        subject: String,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pedigree_trust=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Command::Lookup { id, name } => run_lookup(&config, id.as_deref(), name.as_deref()),
        Command::Search { name, csv } => run_search(&config, &name, csv),
        Command::Parse { file, id } => run_parse(&config, &file, &id),
        Command::Save { subject, input } => run_save(&config, &subject, &input),
        Command::History { subject } => run_history(&config, &subject),
    }
}

fn http_service(config: &Config) -> Result<VerificationService<HttpFetcher>> {
    Ok(VerificationService::new(
        config.registry.clone(),
        HttpFetcher::new(&config.registry)?,
    ))
}

fn run_lookup(config: &Config, id: Option<&str>, name: Option<&str>) -> Result<()> {
    let query = LookupQuery::from_parts(id, name)?;
    let service = http_service(config)?;

    match service.lookup(&query)? {
        LookupOutcome::Profile(profile) => print_profile(&profile)?,
        LookupOutcome::Candidates(candidates) => {
            eprintln!("🔍 {} dogs matched; rerun with --id", candidates.len());
            print_table(&candidates);
        }
        LookupOutcome::NoMatch => eprintln!("❌ No dogs found"),
    }
    Ok(())
}

fn run_search(config: &Config, name: &str, csv: bool) -> Result<()> {
    let candidates = http_service(config)?.search(name)?;

    if csv {
        let mut writer = csv::Writer::from_writer(std::io::stdout());
        for candidate in &candidates {
            writer.serialize(candidate)?;
        }
        writer.flush()?;
    } else {
        println!("🔍 Found {} dogs matching \"{}\"", candidates.len(), name);
        print_table(&candidates);
    }
    Ok(())
}

fn run_parse(config: &Config, file: &Path, id: &str) -> Result<()> {
    let markup = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    // Serve the saved page where the registry would
    let fetcher = StaticFetcher::new().with_page(config.registry.profile_url(id), markup);
    let service = VerificationService::new(config.registry.clone(), fetcher);

    print_profile(&service.profile(id)?)
}

fn run_save(config: &Config, subject: &str, input: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let payload: VerificationPayload =
        serde_json::from_str(&raw).context("Input is not a verified profile")?;

    let sink: Box<dyn PersistenceSink> = match RestSink::from_config(&config.sink)? {
        Some(rest) => Box::new(rest),
        None => {
            eprintln!("💾 No REST store configured, using {}", config.sink.db_path.display());
            Box::new(SqliteSink::open(&config.sink.db_path)?)
        }
    };

    let outcome = save_verification(sink.as_ref(), subject, &payload.record, payload.score)?;
    eprintln!("✅ {}", outcome.message);
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn run_history(config: &Config, subject: &str) -> Result<()> {
    let sink = SqliteSink::open(&config.sink.db_path)?;
    let history = sink.history(subject)?;

    eprintln!(
        "🗄️  {}: {} health records, {} pedigrees, {} events",
        subject,
        history.health_records.len(),
        history.pedigrees.len(),
        history.events.len()
    );
    for event in &history.events {
        eprintln!("   {} {} {}", event.timestamp.to_rfc3339(), event.event_type, event.entity_id);
    }
    println!("{}", serde_json::to_string_pretty(&history)?);
    Ok(())
}

fn print_profile(profile: &VerifiedProfile) -> Result<()> {
    eprintln!(
        "✅ {} - {}",
        profile.record.registered_name.as_deref().unwrap_or(&profile.record.source_id),
        profile.score.summary()
    );
    println!("{}", serde_json::to_string_pretty(profile)?);
    Ok(())
}

fn print_table(candidates: &[SearchCandidate]) {
    for (i, c) in candidates.iter().enumerate() {
        println!(
            "  {}. {} (ID: {}) - {} - HD: {} ED: {}",
            i + 1,
            c.name,
            c.external_id.as_deref().unwrap_or("?"),
            c.date_of_birth,
            c.hip_score,
            c.elbow_score
        );
    }
}
