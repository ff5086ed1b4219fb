use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use biobrain_ai::{analyze_pdf, read_pdf, AiError, GeminiExtractor, LopdfTextSource};
use biobrain_core::error::ExitCode;
use biobrain_core::storage::sqlite::SCHEMA_VERSION;
use biobrain_core::{
    distinct_tags, filter_by_tag, format_date, open_store, reconcile, AppConfig, BioBrainError,
    CsvSheetConnection, DraftRecord, ExtractedMetadata, ListOrder, PaperRecord, PaperStore,
    SqliteStore, StoreBackend, StoreError,
};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "biobrain",
    about = "Log biomedical papers into a growing research library",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format (for scripts).
    /// Also enabled by setting BIOBRAIN_JSON=1.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the papers table or worksheet if it does not exist.
    Init,

    /// Extract suggested fields from a PDF without saving anything.
    Analyze { pdf: String },

    /// Append one paper to the library.
    Log(LogArgs),

    /// Show the library, newest first.
    Library {
        /// Keep only papers whose tags contain this text (case-insensitive).
        #[arg(long)]
        tag: Option<String>,
        /// `newest` or `insertion`.
        #[arg(long, default_value = "newest")]
        order: ListOrder,
        #[arg(long)]
        limit: Option<usize>,
    },

    /// List every tag used in the library.
    Tags,

    /// List the preset tags offered by the form.
    Presets,

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run diagnostics.
    Doctor,

    /// Show version information.
    Version,
}

#[derive(Args, Default)]
struct LogArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    author: Option<String>,
    #[arg(long)]
    year: Option<i64>,
    /// Preset tag to select. Repeat for several.
    #[arg(long, action = clap::ArgAction::Append)]
    tag: Vec<String>,
    /// Extra comma-separated tags.
    #[arg(long)]
    custom_tags: Option<String>,
    #[arg(long)]
    problem: Option<String>,
    #[arg(long)]
    finding: Option<String>,
    #[arg(long)]
    method: Option<String>,
    #[arg(long)]
    limitation: Option<String>,
    /// 1 to 5.
    #[arg(long)]
    rating: Option<i64>,
    /// Prefill the fields from this PDF before applying the flags above.
    #[arg(long)]
    pdf: Option<String>,
}

// ─── Config Actions ──────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum ConfigAction {
    /// Show all config values.
    List,
    /// Get a specific config key.
    Get { key: String },
}

// ─── Main ────────────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    let json_output = cli.json || std::env::var("BIOBRAIN_JSON").as_deref() == Ok("1");
    init_logging();

    if let Err(err) = run(cli.command, json_output) {
        let code = exit_code(&err);
        if json_output {
            let envelope = serde_json::json!({
                "status": "error",
                "error": error_kind(&code),
                "message": format!("{err:#}"),
            });
            println!("{envelope}");
        } else {
            eprintln!("Error: {err:#}");
        }
        std::process::exit(code as i32);
    }
}

fn run(command: Commands, json_output: bool) -> Result<()> {
    let start = Instant::now();

    // Load config (honors BIOBRAIN_DATA_DIR if set)
    let mut config = AppConfig::load()?;
    if let Ok(data_dir) = std::env::var("BIOBRAIN_DATA_DIR") {
        config.set_data_dir(data_dir.into());
    }

    match command {
        Commands::Init => {
            let store = open_store(&config)?;
            store.ensure_initialized()?;
            let location = store_location(&config)?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "backend": store.backend(), "location": location },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                println!("Initialized {} store at {location}", store.backend());
            }
        }

        // ── Analyze ────────────────────────────────────────────────────────

        Commands::Analyze { pdf } => {
            let extracted = extract_from_pdf(&config, Path::new(&pdf))?;
            let draft = reconcile(&empty_draft(&config), &extracted, &config.tags.presets);
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "extracted": extracted, "draft": draft },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                print_draft(&draft);
            }
        }

        // ── Log ────────────────────────────────────────────────────────────

        Commands::Log(args) => {
            let mut draft = empty_draft(&config);
            if let Some(pdf) = &args.pdf {
                match prefill(&config, &draft, Path::new(pdf)) {
                    Ok(filled) => draft = filled,
                    // The form keeps whatever it had; the flags below still apply.
                    Err(err) => {
                        tracing::warn!(%err, "PDF prefill failed");
                        eprintln!("Warning: {err}");
                    }
                }
            }
            apply_flags(&mut draft, args);

            let paper = draft.into_paper()?;
            let store = open_store(&config)?;
            store.ensure_initialized()?;
            let id = store.append(&paper)?;
            tracing::info!(%id, backend = store.backend(), "paper logged");
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "id": id, "paper": paper },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                println!("Saved #{id}: {}", paper.title);
            }
        }

        // ── Library ────────────────────────────────────────────────────────

        Commands::Library { tag, order, limit } => {
            let store = open_store(&config)?;
            let mut records = store.list_all(order)?;
            if let Some(tag) = &tag {
                records = filter_by_tag(&records, tag);
            }
            let total = records.len();
            if let Some(limit) = limit {
                records.truncate(limit);
            }
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "items": records, "total": total, "order": order.to_string() },
                    "meta": { "duration_ms": dur }
                }))?;
            } else if records.is_empty() {
                println!("No papers logged yet. Use `biobrain log` to add one.");
            } else {
                for record in &records {
                    print_record(record);
                }
            }
        }

        // ── Tags ───────────────────────────────────────────────────────────

        Commands::Tags => {
            let store = open_store(&config)?;
            let tags = distinct_tags(&store.read_all()?);
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "items": tags, "total": tags.len() },
                    "meta": { "duration_ms": dur }
                }))?;
            } else if tags.is_empty() {
                println!("No tags in library.");
            } else {
                for tag in &tags {
                    println!("  {tag}");
                }
            }
        }

        Commands::Presets => {
            let presets = &config.tags.presets;
            let dur = start.elapsed().as_millis();
            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":{"items":presets},"meta":{"duration_ms":dur}}))?;
            } else {
                for tag in presets {
                    println!("  {tag}");
                }
            }
        }

        // ── Config ─────────────────────────────────────────────────────────

        Commands::Config { action } => {
            let dur = start.elapsed().as_millis();
            let kv = config_key_values(&config);
            match action {
                ConfigAction::List => {
                    if json_output {
                        print_json(&serde_json::json!({"status":"ok","data":kv,"meta":{"duration_ms":dur}}))?;
                    } else {
                        for (k, v) in &kv {
                            println!("{k} = {v}");
                        }
                    }
                }
                ConfigAction::Get { key } => match kv.get(key.as_str()) {
                    Some(val) => {
                        if json_output {
                            print_json(&serde_json::json!({"status":"ok","data":{"key":key,"value":val},"meta":{"duration_ms":dur}}))?;
                        } else {
                            println!("{val}");
                        }
                    }
                    None => {
                        return Err(BioBrainError::ConfigError(format!("unknown config key: {key}")).into());
                    }
                },
            }
        }

        // ── Doctor ─────────────────────────────────────────────────────────

        Commands::Doctor => {
            let config_path = AppConfig::config_path();
            if config_path.exists() {
                println!("✓ Config: {}", config_path.display());
            } else {
                println!("○ Config: not found (using defaults)");
            }

            let mut issues = 0;
            match config.store.backend {
                StoreBackend::Sqlite => {
                    let db_path = config.database_path();
                    if !db_path.exists() {
                        println!("○ Database: not created yet (run `biobrain init`)");
                    } else {
                        match SqliteStore::open(&db_path).and_then(|db| {
                            Ok((db.applied_versions()?, db.count()?))
                        }) {
                            Ok((versions, count)) => {
                                let current = versions.last().copied().unwrap_or(0);
                                println!(
                                    "✓ Database: {} ({count} papers, schema v{current}/{SCHEMA_VERSION})",
                                    db_path.display()
                                );
                            }
                            Err(e) => {
                                issues += 1;
                                println!("✗ Database: {e}");
                            }
                        }
                    }
                }
                StoreBackend::Sheet => {
                    match CsvSheetConnection::new(config.sheet_dir())
                        .worksheet_path(&config.store.worksheet)
                    {
                        Err(e) => {
                            issues += 1;
                            println!("✗ Worksheet: {e}");
                        }
                        Ok(sheet) if !sheet.exists() => {
                            println!("○ Worksheet: not created yet (run `biobrain init`)");
                        }
                        Ok(sheet) => match open_store(&config).and_then(|s| s.read_all()) {
                            Ok(records) => {
                                println!("✓ Worksheet: {} ({} papers)", sheet.display(), records.len());
                            }
                            Err(e) => {
                                issues += 1;
                                println!("✗ Worksheet: {e}");
                            }
                        },
                    }
                }
            }

            let key_env = &config.ai.api_key_env;
            if std::env::var(key_env).is_ok_and(|k| !k.trim().is_empty()) {
                println!("✓ AI: {} via {key_env}", config.ai.model);
            } else {
                println!("○ AI: {key_env} not set (PDF prefill unavailable)");
            }

            if issues == 0 {
                println!("\nAll checks passed ✓");
            } else {
                println!("\n{issues} issues found");
                std::process::exit(ExitCode::GeneralError as i32);
            }
        }

        // ── Version ────────────────────────────────────────────────────────

        Commands::Version => {
            let version = env!("CARGO_PKG_VERSION");
            let dur = start.elapsed().as_millis();
            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":{"version":version},"meta":{"duration_ms":dur}}))?;
            } else {
                println!("biobrain v{version}");
            }
        }
    }

    Ok(())
}

// ─── Form ───────────────────────────────────────────────────────────────────

fn empty_draft(config: &AppConfig) -> DraftRecord {
    DraftRecord::new(config.form.default_year, config.form.default_rating, &config.tags.presets)
}

fn extract_from_pdf(config: &AppConfig, path: &Path) -> biobrain_ai::Result<ExtractedMetadata> {
    let bytes = read_pdf(path)?;
    let extractor = GeminiExtractor::from_config(&config.ai)?;
    analyze_pdf(&bytes, &LopdfTextSource, &extractor, config.ai.pdf_max_pages)
}

fn prefill(config: &AppConfig, draft: &DraftRecord, path: &Path) -> biobrain_core::Result<DraftRecord> {
    let extracted = extract_from_pdf(config, path)?;
    Ok(reconcile(draft, &extracted, &config.tags.presets))
}

/// Explicit flags win over both defaults and PDF suggestions.
fn apply_flags(draft: &mut DraftRecord, args: LogArgs) {
    let LogArgs {
        title,
        author,
        year,
        tag,
        custom_tags,
        problem,
        finding,
        method,
        limitation,
        rating,
        pdf: _,
    } = args;

    if let Some(v) = title {
        draft.title = v;
    }
    if let Some(v) = author {
        draft.author = v;
    }
    if let Some(v) = year {
        draft.year = v;
    }
    if !tag.is_empty() {
        draft.selected_tags = tag;
    }
    if let Some(v) = custom_tags {
        draft.custom_tags = v;
    }
    if let Some(v) = problem {
        draft.problem = v;
    }
    if let Some(v) = finding {
        draft.finding = v;
    }
    if let Some(v) = method {
        draft.method = v;
    }
    if let Some(v) = limitation {
        draft.limitation = v;
    }
    if let Some(v) = rating {
        draft.rating = v;
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("BIOBRAIN_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

fn print_record(record: &PaperRecord) {
    println!(
        "{id:>4}  {date}  {title:<40}  {author:<20}  {year}  ★{rating}  [{tags}]",
        id = record.id,
        date = format_date(&record.date_added),
        title = record.title,
        author = record.author,
        year = record.year,
        rating = record.rating,
        tags = record.tag_string(),
    );
}

fn print_draft(draft: &DraftRecord) {
    println!("Title:       {}", draft.title);
    println!("Author:      {}", draft.author);
    println!("Year:        {}", draft.year);
    println!("Tags:        {}", draft.selected_tags.join(", "));
    println!("Custom tags: {}", draft.custom_tags);
    println!("Problem:     {}", draft.problem);
    println!("Finding:     {}", draft.finding);
    println!("Method:      {}", draft.method);
    println!("Limitation:  {}", draft.limitation);
}

fn store_location(config: &AppConfig) -> Result<String> {
    let path = match config.store.backend {
        StoreBackend::Sqlite => config.database_path(),
        StoreBackend::Sheet => {
            CsvSheetConnection::new(config.sheet_dir()).worksheet_path(&config.store.worksheet)?
        }
    };
    Ok(path.display().to_string())
}

fn config_key_values(config: &AppConfig) -> BTreeMap<&'static str, String> {
    let mut map = BTreeMap::new();
    map.insert("data_dir", config.data_dir().to_string_lossy().to_string());
    map.insert("store.backend", config.store.backend.to_string());
    map.insert("store.database_path", config.database_path().to_string_lossy().to_string());
    map.insert("store.sheet_dir", config.sheet_dir().to_string_lossy().to_string());
    map.insert("store.worksheet", config.store.worksheet.clone());
    map.insert("ai.provider", config.ai.provider.clone());
    map.insert("ai.model", config.ai.model.clone());
    map.insert("ai.endpoint", config.ai.endpoint.clone());
    map.insert("ai.api_key_env", config.ai.api_key_env.clone());
    map.insert("ai.pdf_max_pages", config.ai.pdf_max_pages.to_string());
    map.insert("tags.presets", config.tags.presets.join(", "));
    map.insert("form.default_year", config.form.default_year.to_string());
    map.insert("form.default_rating", config.form.default_rating.to_string());
    map
}

fn exit_code(err: &anyhow::Error) -> ExitCode {
    if let Some(e) = err.downcast_ref::<BioBrainError>() {
        return match e {
            BioBrainError::ValidationError(_) | BioBrainError::ConfigError(_) => ExitCode::InvalidArgs,
            BioBrainError::Store(_) => ExitCode::StoreError,
            BioBrainError::Extraction(_) | BioBrainError::AiResponse(_) => ExitCode::AiError,
            _ => ExitCode::GeneralError,
        };
    }
    if err.downcast_ref::<StoreError>().is_some() {
        return ExitCode::StoreError;
    }
    match err.downcast_ref::<AiError>() {
        Some(AiError::Http(_)) => ExitCode::NetworkError,
        Some(_) => ExitCode::AiError,
        None => ExitCode::GeneralError,
    }
}

fn error_kind(code: &ExitCode) -> &'static str {
    match code {
        ExitCode::Success => "none",
        ExitCode::GeneralError => "general",
        ExitCode::InvalidArgs => "invalid_args",
        ExitCode::StoreError => "store",
        ExitCode::AiError => "ai",
        ExitCode::NetworkError => "network",
    }
}
