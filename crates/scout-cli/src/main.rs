use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use scout_contracts::candidates::Candidate;
use scout_contracts::commands::{help_lines, parse_command, Command};
use scout_contracts::events::EventWriter;
use scout_contracts::filters::{Category, FilterState, FilterValue, SelectionType};
use scout_contracts::jobs::JobPosting;
use scout_contracts::storage::{JsonFileStorage, Storage, JOB_DESCRIPTION_KEY, PROMPT_KEY};
use scout_engine::{
    default_search_registry, default_text_model_registry, CandidateSearch, CandidateSession,
    EngineConfig, JobGenerator,
};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "scout",
    version,
    about = "Recruiting assistant: job generation and candidate search"
)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Args)]
struct CommonArgs {
    /// JSON file shared by the generator and search stages.
    #[arg(long, global = true, default_value = "scout-store.json")]
    store: PathBuf,
    /// Session event log; defaults to `events.jsonl` next to the store.
    #[arg(long, global = true)]
    events: Option<PathBuf>,
    #[arg(long, global = true)]
    text_model: Option<String>,
    #[arg(long, global = true, default_value = "rapidapi")]
    search_provider: String,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Turn the stored (or given) hiring prompt into a job posting.
    Generate(GenerateArgs),
    /// Show the filter state imported from the published filters.
    Filters,
    /// Search candidates with the published filters as-is.
    Search,
    /// Interactive filter editing and search.
    Session(SessionArgs),
}

#[derive(Debug, Args)]
struct GenerateArgs {
    #[arg(long)]
    prompt: Option<String>,
    #[arg(long)]
    edit: Option<String>,
}

#[derive(Debug, Args)]
struct SessionArgs {
    #[arg(long)]
    skip_initial_search: bool,
}

fn main() {
    init_tracing();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("scout error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let mut config = EngineConfig::from_env();
    if let Some(model) = cli.common.text_model.clone() {
        config = config.with_text_model(model);
    }
    let events = EventWriter::for_new_session(events_path(&cli.common));
    tracing::debug!(session_id = events.session_id(), "session started");

    match cli.command {
        CliCommand::Generate(args) => run_generate(&cli.common, &config, events, args),
        CliCommand::Filters => run_filters(&cli.common, &config, events),
        CliCommand::Search => run_search(&cli.common, &config, events),
        CliCommand::Session(args) => run_session(&cli.common, &config, events, args),
    }
}

fn events_path(common: &CommonArgs) -> PathBuf {
    common.events.clone().unwrap_or_else(|| {
        common
            .store
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
            .join("events.jsonl")
    })
}

fn job_generator(
    common: &CommonArgs,
    config: &EngineConfig,
    events: EventWriter,
) -> Result<JobGenerator<JsonFileStorage>> {
    let models = default_text_model_registry(config);
    let model = models.for_model(&config.text_model)?;
    Ok(JobGenerator::new(
        JsonFileStorage::new(&common.store),
        model,
        config.text_model.clone(),
        config.max_output_tokens,
        events,
    ))
}

fn search_provider(
    common: &CommonArgs,
    config: &EngineConfig,
) -> Result<Arc<dyn CandidateSearch>> {
    let providers = default_search_registry(config);
    providers.get(&common.search_provider).with_context(|| {
        format!(
            "unknown search provider '{}' (available: {})",
            common.search_provider,
            providers.names().join(", ")
        )
    })
}

fn open_session(
    common: &CommonArgs,
    config: &EngineConfig,
    events: EventWriter,
) -> Result<CandidateSession<JsonFileStorage>> {
    CandidateSession::open(
        JsonFileStorage::new(&common.store),
        events,
        config.account_number,
    )
    .with_context(|| format!("failed to open session on {}", common.store.display()))
}

fn run_generate(
    common: &CommonArgs,
    config: &EngineConfig,
    events: EventWriter,
    args: GenerateArgs,
) -> Result<i32> {
    let mut generator = job_generator(common, config, events)?;
    if let Some(prompt) = args.prompt.as_deref() {
        generator.storage_mut().set(PROMPT_KEY, prompt)?;
    }
    let posting = generator.generate(args.edit.as_deref())?;
    print_job(&posting);
    Ok(0)
}

fn run_filters(common: &CommonArgs, config: &EngineConfig, events: EventWriter) -> Result<i32> {
    let session = open_session(common, config, events)?;
    let report = session.import_report();
    let payload = json!({
        "applied": session.state().applied().iter().map(|(category, values)| {
            json!({ "type": category.as_str(), "values": values })
        }).collect::<Vec<Value>>(),
        "available": session.state().available(),
        "ignored": report.ignored,
        "export": session.export(),
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(0)
}

fn run_search(common: &CommonArgs, config: &EngineConfig, events: EventWriter) -> Result<i32> {
    let provider = search_provider(common, config)?;
    let mut session = open_session(common, config, events)?;
    let candidates = session.apply(provider.as_ref())?;
    print_candidates(candidates);
    Ok(0)
}

fn run_session(
    common: &CommonArgs,
    config: &EngineConfig,
    events: EventWriter,
    args: SessionArgs,
) -> Result<i32> {
    let provider = search_provider(common, config)?;
    let mut generator = job_generator(common, config, events.clone())?;
    let mut session = open_session(common, config, events)?;

    println!("Scout session started. Type /help for commands.");
    print_state(session.state());
    if !args.skip_initial_search {
        report_search(session.apply(provider.as_ref()));
    }

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        let read = match stdin.read_line(&mut line) {
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        if read == 0 {
            break;
        }

        match parse_command(line.trim_end_matches(['\n', '\r'])) {
            Command::Noop => {}
            Command::Help => {
                println!("Commands: {}", help_lines().join(" "));
            }
            Command::Show => print_state(session.state()),
            Command::Options => print_options(session.state()),
            Command::Picker => {
                if session.toggle_picker() {
                    print_options(session.state());
                } else {
                    println!("Picker closed.");
                }
            }
            Command::Add { category } => {
                let added = Category::resolve(&category)
                    .and_then(|category| session.add_category(category));
                match added {
                    Ok(()) => print_state(session.state()),
                    Err(err) => println!("{err}"),
                }
            }
            Command::Set { category, values } => {
                set_values(&mut session, &category, values);
            }
            Command::Clear { category } => {
                set_values(&mut session, &category, Vec::new());
            }
            Command::Reset => {
                session.reset();
                print_state(session.state());
            }
            Command::Apply => report_search(session.apply(provider.as_ref())),
            Command::Candidates => print_candidates(session.candidates()),
            Command::Job => match session.storage_mut().get(JOB_DESCRIPTION_KEY)? {
                Some(description) => println!("{description}"),
                None => println!("No job description yet. Type a request to generate one."),
            },
            Command::Edit { instruction } => {
                let edit = Some(instruction.as_str()).filter(|text| !text.trim().is_empty());
                match generator.generate(edit) {
                    Ok(posting) => {
                        print_job(&posting);
                        session.reload()?;
                        print_state(session.state());
                    }
                    Err(err) => println!("{err}"),
                }
            }
            Command::Unknown { command, .. } => {
                println!("Unknown command: /{command}");
            }
            Command::Quit => break,
        }
    }
    Ok(0)
}

fn set_values(
    session: &mut CandidateSession<JsonFileStorage>,
    category: &str,
    values: Vec<FilterValue>,
) {
    let updated = Category::resolve(category)
        .and_then(|category| session.update_values(category, values));
    match updated {
        Ok(()) => print_state(session.state()),
        Err(err) => println!("{err}"),
    }
}

fn report_search(result: Result<&[Candidate]>) {
    match result {
        Ok(candidates) => print_candidates(candidates),
        Err(err) => println!("Search failed: {err:#}"),
    }
}

fn print_state(state: &FilterState) {
    if state.applied().is_empty() {
        println!("No filters applied.");
    }
    for (category, values) in state.applied() {
        if values.is_empty() {
            println!("{category}: (no values, not sent)");
            continue;
        }
        let rendered: Vec<String> = values.iter().map(render_value).collect();
        println!("{category}: {}", rendered.join(", "));
    }
}

/// Same `!` notation `/set` accepts.
fn render_value(value: &FilterValue) -> String {
    match value.selection_type {
        SelectionType::Included => value.label.clone(),
        SelectionType::Excluded => format!("!{}", value.label),
    }
}

fn print_options(state: &FilterState) {
    let available: Vec<&str> = state.available().iter().map(Category::as_str).collect();
    if available.is_empty() {
        println!("[{}] every category is applied", state.picker_label());
    } else {
        println!("[{}] add: {}", state.picker_label(), available.join(", "));
    }
}

fn print_candidates(candidates: &[Candidate]) {
    if candidates.is_empty() {
        println!("No candidates.");
        return;
    }
    for (idx, candidate) in candidates.iter().enumerate() {
        let headline = candidate.headline().unwrap_or_default();
        println!(
            "{}. {} | {} | {}",
            idx + 1,
            candidate.full_name,
            headline,
            candidate.geo_region
        );
        if !candidate.navigation_url.is_empty() {
            println!("   {}", candidate.navigation_url);
        }
    }
}

fn print_job(posting: &JobPosting) {
    println!("{}", posting.job_description);
    if !posting.filters.is_empty() {
        if let Ok(filters) = serde_json::to_string_pretty(&posting.filters) {
            println!("Filters: {filters}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;
    use scout_contracts::commands::parse_values;
    use scout_contracts::filters::FilterValue;

    use super::{events_path, render_value, Cli, CliCommand};

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::parse_from([
            "scout",
            "session",
            "--skip-initial-search",
            "--store",
            "runs/store.json",
            "--search-provider",
            "dryrun",
        ]);
        assert_eq!(cli.common.store, PathBuf::from("runs/store.json"));
        assert_eq!(cli.common.search_provider, "dryrun");
        assert!(matches!(
            cli.command,
            CliCommand::Session(args) if args.skip_initial_search
        ));
    }

    #[test]
    fn events_default_next_to_store() {
        let cli = Cli::parse_from(["scout", "--store", "runs/store.json", "filters"]);
        assert_eq!(events_path(&cli.common), PathBuf::from("runs/events.jsonl"));

        let cli = Cli::parse_from(["scout", "search"]);
        assert_eq!(events_path(&cli.common), PathBuf::from("events.jsonl"));
        assert_eq!(cli.common.search_provider, "rapidapi");
    }

    #[test]
    fn rendered_values_parse_back() {
        let values = vec![FilterValue::included("Acme"), FilterValue::excluded("Initech")];
        let rendered: Vec<String> = values.iter().map(render_value).collect();
        assert_eq!(rendered, vec!["Acme", "!Initech"]);
        assert_eq!(parse_values(&rendered), values);
    }
}
