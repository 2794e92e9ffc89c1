//! PageLens - page context extraction and selection replacement
//!
//! Command-line host: loads an HTML snapshot, runs one request (or a stdin
//! session of requests) through the engine and prints JSON on stdout.

use std::error::Error;
use std::path::PathBuf;
use std::sync::OnceLock;

use clap::Parser;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use pagelens_config::{Config, ConfigLoader, ConfigValidator, LoggingConfig};
use pagelens_dom::MemoryClipboard;
use pagelens_engine::MessageRouter;
use pagelens_protocols::{ExtractionOptions, PageInspector, Request, Response};

mod cli;
mod session;
mod snapshot;

use cli::{Cli, Commands, PageArgs};
use snapshot::load_page;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// `~/.config/pagelens/config.toml`, when it exists.
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("pagelens").join("config.toml"))
        .filter(|path| path.exists())
}

/// Initialize tracing on stderr, plus a daily rolling file when a log
/// directory is configured. `RUST_LOG` overrides the configured level.
fn init_tracing(logging: &LoggingConfig, json: bool) -> Result<(), Box<dyn Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let file_layer = match &logging.directory {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("pagelens")
                .filename_suffix("log")
                .max_log_files(logging.max_log_files)
                .build(dir)?;
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let _ = LOG_GUARD.set(guard);
            Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
        }
        None => None,
    };

    let registry = tracing_subscriber::registry().with(env_filter).with(file_layer);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}

pub(crate) fn render(response: &Response, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(response)
    } else {
        serde_json::to_string(response)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(default_config_path);
    let config = ConfigLoader::load_or_default(config_path.as_deref())?;
    let warnings = ConfigValidator::validate(&config).into_result()?;

    init_tracing(&config.logging, cli.log_json)?;
    for warning in &warnings {
        warn!(path = %warning.path, "{}", warning.message);
    }

    match cli.command {
        Commands::Extract {
            page,
            selected_text_only,
            no_masking,
        } => {
            let options = ExtractionOptions {
                selected_text_only,
                apply_privacy_masking: !no_masking,
                ..ExtractionOptions::default()
            };
            respond(&page, &config, cli.pretty, Request::ExtractContext { options }).await
        }
        Commands::Platform { page } => respond(&page, &config, cli.pretty, Request::GetPlatform).await,
        Commands::Errors { page } => respond(&page, &config, cli.pretty, Request::GetErrors).await,
        Commands::Selection { page } => {
            respond(&page, &config, cli.pretty, Request::GetSelection).await
        }
        Commands::Replace {
            page,
            text,
            print_html,
        } => replace(&page, &config, cli.pretty, text, print_html).await,
        Commands::Session { page } => {
            let doc = load_page(&page).await?;
            let input = tokio::io::BufReader::new(tokio::io::stdin());
            let mut output = tokio::io::stdout();
            session::run(doc, &config, input, &mut output, cli.pretty).await?;
            Ok(())
        }
        Commands::Validate => {
            match &config_path {
                Some(path) => println!("{}: valid", path.display()),
                None => println!("defaults: valid"),
            }
            for warning in &warnings {
                println!("warning: {}: {}", warning.path, warning.message);
            }
            Ok(())
        }
    }
}

/// Run a single request against a freshly loaded page.
async fn respond(
    page: &PageArgs,
    config: &Config,
    pretty: bool,
    request: Request,
) -> Result<(), Box<dyn Error>> {
    let mut doc = load_page(page).await?;
    let mut router = MessageRouter::new(config);
    let mut clipboard = MemoryClipboard::new();
    let response = router.handle(&mut doc, &mut clipboard, None, request);
    println!("{}", render(&response, pretty)?);
    Ok(())
}

/// Capture the prepared selection, then replace it with `text`.
async fn replace(
    page: &PageArgs,
    config: &Config,
    pretty: bool,
    text: String,
    print_html: bool,
) -> Result<(), Box<dyn Error>> {
    let mut doc = load_page(page).await?;
    let mut router = MessageRouter::new(config);
    let mut clipboard = MemoryClipboard::new();

    router.handle(&mut doc, &mut clipboard, None, Request::GetSelection);
    let response = router.handle(
        &mut doc,
        &mut clipboard,
        None,
        Request::ReplaceSelection { new_text: text },
    );
    router.cleanup(&mut doc);

    if let Some(copied) = clipboard.last() {
        info!(chars = copied.chars().count(), "Replacement text left on the clipboard");
    }
    if print_html {
        let body = doc.body().ok_or("document has no body")?;
        println!("{}", doc.outer_html(body));
    } else {
        println!("{}", render(&response, pretty)?);
    }
    Ok(())
}
