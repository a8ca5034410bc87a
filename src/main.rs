use std::path::PathBuf;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use biblioscrub::clean::{self, CleanMode, ErrorPolicy};
use biblioscrub::config::Config;
use biblioscrub::domain::PipelineError;
use biblioscrub::enrich;
use biblioscrub::google_books::GoogleBooksClient;
use biblioscrub::table::Table;
use biblioscrub::xml_import;

const USAGE: &str = "Usage: biblioscrub <clean|enrich|convert> [files...]\n\
    \n\
    clean    validate and normalize a catalogue CSV\n\
    enrich   fill Title/Author/publisher/publication_date from Google Books\n\
    convert  turn XML catalogue exports into a CSV table\n\
    \n\
    Options:\n\
      --input <file> --output <file> --errors <file> --every <n>\n\
      --isbn-only --keep-invalid --drop-invalid";

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "biblioscrub=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();

    // Map value-taking flags onto env vars so Config::from_env sees them
    for (flag, var) in [
        ("--input", "INPUT_FILE"),
        ("--output", "OUTPUT_FILE"),
        ("--errors", "ERROR_LOG"),
        ("--every", "CHECKPOINT_EVERY"),
    ] {
        if let Some(pos) = args.iter().position(|arg| arg == flag) {
            if let Some(val) = args.get(pos + 1) {
                unsafe { std::env::set_var(var, val) };
            }
        }
    }
    if args.iter().any(|arg| arg == "--keep-invalid") {
        unsafe { std::env::set_var("KEEP_INVALID", "true") };
    }
    if args.iter().any(|arg| arg == "--drop-invalid") {
        unsafe { std::env::set_var("KEEP_INVALID", "false") };
    }

    let config = Config::from_env();

    let result = match args.first().map(|s| s.as_str()) {
        Some("clean") => {
            let mode = if args.iter().any(|arg| arg == "--isbn-only") {
                CleanMode::IsbnOnly
            } else {
                CleanMode::Full
            };
            run_clean(&config, mode)
        }
        Some("enrich") => run_enrich(&config).await,
        Some("convert") => run_convert(&config, &args),
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run_clean(config: &Config, mode: CleanMode) -> Result<(), PipelineError> {
    let input = Table::from_csv_path(&config.input_file)?;

    let policy = match config.keep_invalid {
        Some(true) => ErrorPolicy::Keep,
        Some(false) => ErrorPolicy::Drop,
        None => mode.default_policy(),
    };

    let outcome = clean::clean_table(&input, mode, policy)?;
    outcome.table.write_csv_path(&config.output_file)?;
    clean::write_error_log(&config.error_log, &outcome.errors)?;

    tracing::info!("Output file : {}", config.output_file);
    tracing::info!("Error log   : {}", config.error_log);
    tracing::info!("Valid rows  : {}", outcome.kept);
    tracing::info!("Invalid     : {}", outcome.errors.len());
    Ok(())
}

async fn run_enrich(config: &Config) -> Result<(), PipelineError> {
    let mut table = Table::from_csv_path(&config.input_file)?;

    let lookup = match &config.lookup_base_url {
        Some(url) => GoogleBooksClient::with_base_url(url.clone()),
        None => GoogleBooksClient::new(),
    };

    let output_file = config.output_file.clone();
    enrich::enrich_table(&mut table, &lookup, config.checkpoint_every, |snapshot| {
        snapshot.write_csv_path(&output_file)
    })
    .await?;

    tracing::info!("Enriched table saved to {}", config.output_file);
    Ok(())
}

fn run_convert(config: &Config, args: &[String]) -> Result<(), PipelineError> {
    // every free argument after the command is an XML file
    let files: Vec<PathBuf> = args
        .iter()
        .filter(|a| a.ends_with(".xml"))
        .map(PathBuf::from)
        .collect();

    let table = if files.is_empty() {
        xml_import::table_from_xml_path(&config.input_file)?
    } else {
        xml_import::table_from_xml_paths(&files)?
    };

    table.write_csv_path(&config.output_file)?;
    tracing::info!("CSV created: {} rows -> {}", table.len(), config.output_file);
    Ok(())
}
