mod command;
mod helper;
mod render;
mod tracing_layer;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use insight_application::{KeywordQueryResolver, QueryPipeline};
use insight_core::catalog::{DatasetCatalog, InMemoryCatalog};
use insight_core::config::{PipelineConfig, SubmitPolicy};
use insight_core::intent::IntentClassifier;
use insight_core::query::{SessionSnapshot, SessionState};
use insight_infrastructure::{ConfigService, TomlCatalogRepository};

use crate::command::{COMMANDS, ShellCommand};
use crate::helper::CliHelper;
use crate::tracing_layer::{PipelineEvent, PipelineEventLayer};

/// Ask business questions, get chart-ready series.
#[derive(Parser, Debug)]
#[command(name = "insight", version, about, long_about = None)]
struct Args {
    /// Config file (defaults to ~/.config/insight/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dataset catalog TOML replacing the builtin datasets
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Simulated resolver latency in milliseconds
    #[arg(long)]
    latency_ms: Option<u64>,

    /// What to do when a query is submitted while another is processing (reject, supersede)
    #[arg(long)]
    policy: Option<SubmitPolicy>,

    /// Print pipeline events as they happen
    #[arg(long)]
    trace: bool,

    /// Write the builtin datasets to the catalog file and exit
    #[arg(long)]
    export_catalog: bool,
}

impl Args {
    fn load_config(&self) -> Result<PipelineConfig> {
        let service = match &self.config {
            Some(path) => ConfigService::with_path(path),
            None => ConfigService::new()?,
        };
        let mut config = service.get_config()?;

        if let Some(path) = &self.catalog {
            config.catalog_path = Some(path.clone());
        }
        if let Some(latency_ms) = self.latency_ms {
            config.latency_ms = latency_ms;
        }
        if let Some(policy) = self.policy {
            config.submit_policy = policy;
        }
        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(feed: Option<mpsc::UnboundedSender<PipelineEvent>>) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(env_filter);
    let feed_layer = feed.map(|tx| PipelineEventLayer::new(tx).with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(feed_layer)
        .init();
}

/// Prints each settled submission once.
fn print_settled(snapshot: &SessionSnapshot) {
    match snapshot.state {
        SessionState::Resolved => {
            if let Some(chart) = &snapshot.chart {
                let text = render::render_chart(chart);
                let mut lines = text.lines();
                if let Some(title) = lines.next() {
                    println!("{}", title.bright_magenta().bold());
                }
                if let Some(meta) = lines.next() {
                    println!("{}", meta.bright_black());
                }
                for line in lines {
                    println!("{}", line.bright_blue());
                }
            }
        }
        SessionState::Failed => {
            let message = snapshot.error.as_deref().unwrap_or_default();
            println!("{}", message.red());
        }
        SessionState::Idle | SessionState::Processing => {}
    }
}

fn print_help() {
    println!("{}", "Type a question to ask it, or one of:".bright_black());
    for (name, help) in COMMANDS {
        println!("  {:<10} {}", name.bright_cyan(), help);
    }
    println!("  {:<10} {}", "quit".bright_cyan(), "Exit");
}

fn print_topics(catalog: &InMemoryCatalog, classifier: &IntentClassifier) {
    for topic in classifier.reachable_topics() {
        match catalog.lookup(topic) {
            Some(dataset) => println!("  {:<10} {}", topic.green(), dataset.title),
            None => println!("  {:<10} {}", topic.yellow(), "(no dataset, queries will fail)".yellow()),
        }
    }
    let reachable = classifier.reachable_topics();
    for topic in catalog.topic_keys() {
        if !reachable.contains(&topic.as_str()) {
            println!("  {:<10} {}", topic.bright_black(), "(no query routes here)".bright_black());
        }
    }
}

/// The main entry point for the insight REPL.
///
/// Loads configuration and the dataset catalog, then reads queries and
/// commands while resolutions run in the background and print when they settle.
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (feed_tx, mut feed_rx) = mpsc::unbounded_channel::<PipelineEvent>();
    init_tracing(args.trace.then_some(feed_tx));

    let config = args.load_config()?;
    let catalog_repository = TomlCatalogRepository::for_config(&config)?;

    if args.export_catalog {
        let path = catalog_repository.path().display();
        if catalog_repository.export_builtin()? {
            println!("{}", format!("Wrote builtin datasets to {path}").bright_green());
        } else {
            println!("{}", format!("{path} already exists, left untouched").yellow());
        }
        return Ok(());
    }

    // ===== Backend Initialization =====
    let catalog = Arc::new(catalog_repository.load()?);
    let classifier = IntentClassifier::default();

    let missing = classifier.missing_topics(catalog.as_ref());
    if !missing.is_empty() {
        tracing::warn!(target: "insight::catalog", ?missing, "Catalog lacks datasets for classified topics");
        println!(
            "{}",
            format!("Note: no dataset for {}; those queries will fail.", missing.join(", ")).yellow()
        );
    }

    let dataset_catalog: Arc<dyn DatasetCatalog> = catalog.clone();
    let resolver = KeywordQueryResolver::from_config(dataset_catalog, &config)
        .with_classifier(classifier.clone());
    let pipeline = QueryPipeline::new(Arc::new(resolver), &config);

    // Prints results as submissions settle
    let mut updates = pipeline.subscribe();
    let printer = tokio::spawn(async move {
        let mut last_settled = 0u64;
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            if snapshot.processing || snapshot.sequence == last_settled {
                continue;
            }
            if matches!(snapshot.state, SessionState::Resolved | SessionState::Failed) {
                print_settled(&snapshot);
                last_settled = snapshot.sequence;
            }
        }
    });

    // Activity feed for --trace
    let feed = tokio::spawn(async move {
        while let Some(event) = feed_rx.recv().await {
            println!("{}", format!("· {}", event.summary()).bright_black());
        }
    });

    // ===== REPL Setup =====
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new(pipeline.suggestion_book().clone())));

    println!("{}", "=== Insight ===".bright_magenta().bold());
    println!(
        "{}",
        format!(
            "Ask a business question, '/help' for commands, or 'quit' to exit. (policy: {})",
            config.submit_policy
        )
        .bright_black()
    );
    for example in pipeline.suggestion_book().examples() {
        println!("  {}", example.bright_black());
    }
    println!();

    // Last list shown by /suggest, addressed by /use
    let mut listed: Vec<String> = Vec::new();

    // ===== Main REPL Loop =====
    loop {
        let line = match rl.readline(">> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        };

        let Some(command) = ShellCommand::parse(&line) else {
            continue;
        };
        let _ = rl.add_history_entry(line.trim());

        match command {
            ShellCommand::Quit => {
                println!("{}", "Goodbye!".bright_green());
                break;
            }
            ShellCommand::Ask(text) => {
                pipeline.set_input(text).await;
                submit_draft(&pipeline).await;
            }
            ShellCommand::Run => submit_draft(&pipeline).await,
            ShellCommand::History => {
                let history = pipeline.snapshot().await.history;
                if history.is_empty() {
                    println!("{}", "No queries yet.".bright_black());
                } else {
                    print!("{}", render::render_numbered(&history));
                }
            }
            ShellCommand::Pick(position) => {
                match pipeline.select_history_item(position - 1).await {
                    Ok(()) => print_draft(&pipeline).await,
                    Err(e) => println!("{}", e.to_string().yellow()),
                }
            }
            ShellCommand::Suggest(text) => {
                if let Some(text) = text {
                    pipeline.set_input(text).await;
                }
                listed = pipeline.suggestions_for_input().await;
                if listed.is_empty() {
                    listed = pipeline.suggestion_book().examples().to_vec();
                    println!("{}", "No matching suggestions. Try one of:".bright_black());
                }
                print!("{}", render::render_numbered(&listed));
            }
            ShellCommand::Use(position) => match listed.get(position - 1) {
                Some(suggestion) => {
                    pipeline.select_suggestion(suggestion.clone()).await;
                    print_draft(&pipeline).await;
                }
                None => println!(
                    "{}",
                    format!("No suggestion {position}. Run /suggest first.").yellow()
                ),
            },
            ShellCommand::Clear => {
                pipeline.clear_result().await;
                println!("{}", "Result cleared.".bright_black());
            }
            ShellCommand::Status => print!("{}", render::render_status(&pipeline.snapshot().await)),
            ShellCommand::Topics => print_topics(&catalog, &classifier),
            ShellCommand::Help => print_help(),
            ShellCommand::Invalid(message) => println!("{}", message.yellow()),
        }
    }

    pipeline.cancel_in_flight().await;
    printer.abort();
    feed.abort();

    Ok(())
}

async fn submit_draft(pipeline: &QueryPipeline) {
    match pipeline.submit_input().await {
        Ok(handle) => {
            if let Some(previous) = handle.superseded {
                println!("{}", format!("Replaced query #{previous}.").bright_black());
            }
            println!("{}", format!("Processing #{}: {}", handle.sequence, handle.query).green());
        }
        Err(e) => println!("{}", e.to_string().yellow()),
    }
}

async fn print_draft(pipeline: &QueryPipeline) {
    let draft = pipeline.snapshot().await.input_text;
    println!("{}", format!("Draft: {draft} (/run to submit)").bright_black());
}
