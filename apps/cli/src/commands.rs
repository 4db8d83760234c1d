//! CLI command definitions, routing, and tracing setup.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use chatblocks_categorizer::{AnyCategorizer, Categorizer, KeywordCategorizer, keywords_for};
use chatblocks_core::{
    OrganizeResult, ProgressReporter, SavedRun, filter_blocks, handle_organize_raw,
    load_last_run, organize, save_run,
};
use chatblocks_shared::{
    AppConfig, BlockCategory, SemanticBlock, ai_enabled, config_dir, init_config, load_config,
    resolve_api_key,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// ChatBlocks: turn a pasted AI conversation into topic blocks.
#[derive(Parser)]
#[command(
    name = "chatblocks",
    version,
    about = "Organize a user/assistant conversation into semantic topic blocks.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Block output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Parse and categorize a conversation into blocks.
    Organize {
        /// Transcript file. Reads stdin when omitted or `-`.
        file: Option<PathBuf>,

        /// Use keyword scoring even when an API key is configured.
        #[arg(long)]
        no_ai: bool,

        /// Only show blocks matching this text.
        #[arg(short, long)]
        search: Option<String>,

        /// Output format.
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Do not save this run as the last run.
        #[arg(long)]
        no_save: bool,
    },

    /// Parse a conversation into message pairs and print them as JSON.
    Parse {
        /// Transcript file. Reads stdin when omitted or `-`.
        file: Option<PathBuf>,
    },

    /// Handle a JSON `{"text": ...}` request body and print the JSON response.
    Request {
        /// Request body file. Reads stdin when omitted or `-`.
        file: Option<PathBuf>,

        /// Use keyword scoring even when an API key is configured.
        #[arg(long)]
        no_ai: bool,
    },

    /// Show the last saved run.
    Show {
        /// Only show blocks matching this text.
        #[arg(short, long)]
        search: Option<String>,

        /// Output format.
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List the topic categories and their keywords.
    Categories,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so stdout stays
/// clean for block output.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "chatblocks=info",
        1 => "chatblocks=debug",
        _ => "chatblocks=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Organize {
            file,
            no_ai,
            search,
            format,
            no_save,
        } => cmd_organize(file.as_deref(), no_ai, search.as_deref(), format, no_save).await,
        Command::Parse { file } => cmd_parse(file.as_deref()),
        Command::Request { file, no_ai } => cmd_request(file.as_deref(), no_ai).await,
        Command::Show { search, format } => cmd_show(search.as_deref(), format),
        Command::Categories => cmd_categories(),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_organize(
    file: Option<&Path>,
    no_ai: bool,
    search: Option<&str>,
    format: OutputFormat,
    no_save: bool,
) -> Result<()> {
    let config = load_config()?;
    let text = read_input(file)?;
    let categorizer = select_categorizer(&config, no_ai)?;

    info!(
        input_len = text.len(),
        categorizer = categorizer.name(),
        "organizing conversation"
    );

    let result = {
        let reporter = CliProgress::new();
        organize(&text, &categorizer, &reporter).await?
    };

    if config.storage.save_last_run && !no_save {
        let run = SavedRun::new(&text, result.categorizer, result.blocks.clone());
        if let Err(e) = config_dir().and_then(|dir| save_run(&dir, &run)) {
            warn!(error = %e, "could not save last run");
        }
    }

    let shown = filter_blocks(&result.blocks, search.unwrap_or_default());
    match format {
        OutputFormat::Json => print_blocks_json(&shown)?,
        OutputFormat::Text => {
            print_blocks_text(&shown, search);
            print_summary(&result);
        }
    }

    Ok(())
}

fn cmd_parse(file: Option<&Path>) -> Result<()> {
    let text = read_input(file)?;
    let pairs = chatblocks_parser::parse_conversation(&text)?;
    info!(pairs = pairs.len(), "parsed conversation");
    println!("{}", serde_json::to_string_pretty(&pairs)?);
    Ok(())
}

async fn cmd_request(file: Option<&Path>, no_ai: bool) -> Result<()> {
    let config = load_config()?;
    let raw = read_input(file)?;
    let categorizer = select_categorizer(&config, no_ai)?;

    let (status, response) = handle_organize_raw(raw.as_bytes(), &categorizer).await;
    info!(status, "request handled");
    println!("{}", serde_json::to_string_pretty(&response)?);

    if response.is_error() {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_show(search: Option<&str>, format: OutputFormat) -> Result<()> {
    let dir = config_dir()?;
    let Some(run) = load_last_run(&dir)? else {
        println!("No saved run yet. Run `chatblocks organize` first.");
        return Ok(());
    };

    let shown = filter_blocks(&run.blocks, search.unwrap_or_default());
    match format {
        OutputFormat::Json => print_blocks_json(&shown)?,
        OutputFormat::Text => {
            println!(
                "  Run {} ({}, {})",
                run.id,
                run.categorizer,
                run.created_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!();
            print_blocks_text(&shown, search);
        }
    }
    Ok(())
}

fn cmd_categories() -> Result<()> {
    for category in BlockCategory::ALL {
        let meta = category.meta();
        println!(
            "  {:<22} {:<22} {:<14} {}",
            category.as_str(),
            meta.title,
            meta.icon,
            meta.color
        );

        let keywords = keywords_for(category);
        if keywords.is_empty() {
            println!("      (fallback for unmatched pairs)");
        } else {
            println!("      {}", keywords.join(", "));
        }
    }
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");

    let key_state = if resolve_api_key(&config).is_some() {
        "set"
    } else {
        "not set"
    };
    println!("# ai enabled: {}", ai_enabled(&config));
    println!("# {}: {key_state}", config.openai.api_key_env);
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Read the whole input from `file`, or stdin when absent or `-`.
fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .map_err(|e| eyre!("failed to read '{}': {e}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| eyre!("failed to read stdin: {e}"))?;
            Ok(text)
        }
    }
}

fn select_categorizer(config: &AppConfig, no_ai: bool) -> Result<AnyCategorizer> {
    if no_ai {
        return Ok(AnyCategorizer::Keyword(KeywordCategorizer));
    }
    Ok(AnyCategorizer::from_config(config)?)
}

fn print_blocks_json(blocks: &[&SemanticBlock]) -> Result<()> {
    let body = serde_json::json!({ "blocks": blocks });
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

fn print_blocks_text(blocks: &[&SemanticBlock], search: Option<&str>) {
    if blocks.is_empty() {
        match search {
            Some(q) if !q.trim().is_empty() => println!("  No results found for \"{q}\""),
            _ => println!("  No blocks."),
        }
        return;
    }

    for block in blocks {
        let count = block.messages.len();
        let noun = if count == 1 { "exchange" } else { "exchanges" };
        println!("  ■ {} ({count} {noun})", block.title);
        for pair in &block.messages {
            println!("    User:      {}", indent_continuation(&pair.user.content));
            if !pair.assistant.content.is_empty() {
                println!(
                    "    Assistant: {}",
                    indent_continuation(&pair.assistant.content)
                );
            }
            println!();
        }
    }
}

/// Indent wrapped lines so multi-line messages stay under their label.
fn indent_continuation(text: &str) -> String {
    text.replace('\n', "\n               ")
}

fn print_summary(result: &OrganizeResult) {
    println!(
        "  {} pairs → {} blocks via {} in {:.1}s",
        result.pair_count,
        result.blocks.len(),
        result.categorizer,
        result.elapsed.as_secs_f64()
    );
    if result.dropped_pairs > 0 {
        println!(
            "  {} pairs fell outside the five-block limit and are not shown.",
            result.dropped_pairs
        );
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner on stderr.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _result: &OrganizeResult) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        // Clears the spinner when the pipeline bails out before `done`.
        self.spinner.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn organize_flags_parse() {
        let cli = Cli::parse_from([
            "chatblocks",
            "organize",
            "chat.txt",
            "--no-ai",
            "--search",
            "trial",
            "--format",
            "json",
            "--no-save",
        ]);
        match cli.command {
            Command::Organize {
                file,
                no_ai,
                search,
                format,
                no_save,
            } => {
                assert_eq!(file, Some(PathBuf::from("chat.txt")));
                assert!(no_ai);
                assert_eq!(search.as_deref(), Some("trial"));
                assert_eq!(format, OutputFormat::Json);
                assert!(no_save);
            }
            _ => panic!("expected organize"),
        }
    }

    #[test]
    fn organize_defaults_to_stdin_and_text() {
        let cli = Cli::parse_from(["chatblocks", "-vv", "organize"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Organize { file, format, .. } => {
                assert!(file.is_none());
                assert_eq!(format, OutputFormat::Text);
            }
            _ => panic!("expected organize"),
        }
    }

    #[test]
    fn no_ai_forces_keyword_categorizer() {
        let categorizer = select_categorizer(&AppConfig::default(), true).unwrap();
        assert_eq!(categorizer.name(), "keyword");
    }

    #[test]
    fn continuation_lines_are_indented() {
        assert_eq!(indent_continuation("a\nb"), "a\n               b");
    }
}
