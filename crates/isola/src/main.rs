//! `isola` decodes textual actor isolation and evaluates call-site crossings.

mod config;

use std::fmt::Write as _;
use std::io::{self, Write as _};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use isola_ast::{DeclArena, DeclContext, FileId, MAIN_ACTOR_NAME, NominalDecl, NominalKind};
use isola_core::report::{CrossingReport, IsolationReport};
use isola_core::{
    ActorIsolation, IsolationConfig, IsolationCrossing, IsolationQueries, IsolationTable,
    parse_isolation_at,
};
use isola_diag::{Category, Diagnostic, SourceLocation};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::{CliConfig, OutputFormat};

const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Parser, Debug)]
#[command(name = "isola")]
#[command(about = "Decode actor isolation keywords and evaluate call-site crossings")]
struct Cli {
    /// Output format; overrides the config file
    #[arg(long, value_enum, global = true)]
    format: Option<OutputFormat>,

    /// Path to an `isola.toml` config file
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Decode isolation keywords
    Decode {
        #[arg(required = true, value_name = "TEXT")]
        keywords: Vec<String>,
    },
    /// Decide whether a call leaves the caller's isolation
    Cross { caller: String, callee: String },
    /// Show the isolation of top-level script code
    TopLevel {
        /// Resolve as if the session declared no main actor
        #[arg(long)]
        without_main_actor: bool,
    },
    /// Describe a diagnostic code
    Explain { code: String },
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    init_tracing(config.log_filter.as_deref());
    let format = cli.format.or(config.format).unwrap_or_default();
    debug!(?format, config = ?cli.config, "starting isola");

    let (output, ok) = match &cli.command {
        Command::Decode { keywords } => decode(keywords, format)?,
        Command::Cross { caller, callee } => cross(caller, callee, format)?,
        Command::TopLevel { without_main_actor } => {
            (top_level(&config.isolation, !without_main_actor, format)?, true)
        }
        Command::Explain { code } => (explain(code)?, true),
    };

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(output.as_bytes())
        .context("failed to write to stdout")?;
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn init_tracing(configured: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(configured.unwrap_or(DEFAULT_LOG_FILTER)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Decodes every keyword, reporting unknown ones. Returns the rendered
/// output and whether all keywords were recognized.
fn decode(keywords: &[String], format: OutputFormat) -> Result<(String, bool)> {
    let mut reports = Vec::new();
    let mut ok = true;
    for (index, text) in keywords.iter().enumerate() {
        match decode_argument(index, text, format) {
            Some(isolation) => reports.push(IsolationReport::from(&isolation)),
            None => ok = false,
        }
    }

    let output = match format {
        OutputFormat::Text => {
            let mut out = String::new();
            for report in &reports {
                let _ = writeln!(out, "{}", describe(report));
            }
            out
        }
        OutputFormat::Json => render_json(&reports)?,
    };
    Ok((output, ok))
}

fn cross(caller: &str, callee: &str, format: OutputFormat) -> Result<(String, bool)> {
    let (Some(caller), Some(callee)) = (
        decode_argument(0, caller, format),
        decode_argument(1, callee, format),
    ) else {
        return Ok((String::new(), false));
    };
    let crossing = IsolationCrossing::new(caller, callee);
    debug!(exits = crossing.exits_isolation(), "evaluated crossing");
    let report = CrossingReport::from(&crossing);

    let output = match format {
        OutputFormat::Text => format!(
            "caller: {}\ncallee: {}\nexits_isolation: {}\ndiagnose: {}\n",
            describe(&report.caller),
            describe(&report.callee),
            report.exits_isolation,
            describe(&report.diagnose),
        ),
        OutputFormat::Json => render_json(&report)?,
    };
    Ok((output, true))
}

fn top_level(
    config: &IsolationConfig,
    main_actor_declared: bool,
    format: OutputFormat,
) -> Result<String> {
    let mut decls = DeclArena::new();
    if main_actor_declared {
        decls.add_nominal(NominalDecl::new(MAIN_ACTOR_NAME, NominalKind::GlobalActor));
    }
    let table = IsolationTable::with_config(&decls, config.clone());
    let isolation =
        table.isolation_of_context(DeclContext::TopLevelCode(FileId(0)), table.committed_closures());
    let report = IsolationReport::from(&isolation);

    Ok(match format {
        OutputFormat::Text => format!("{}\n", describe(&report)),
        OutputFormat::Json => render_json(&report)?,
    })
}

fn explain(code: &str) -> Result<String> {
    let Some(category) = Category::from_code(code) else {
        bail!("no diagnostic has code `{code}`");
    };
    Ok(format!(
        "{} ({})\n\n{}\n\nfix: {}\n",
        category.code(),
        category.as_str(),
        category.description(),
        category.example_fix(),
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Decodes one command-line argument, printing its diagnostics to stderr.
fn decode_argument(index: usize, text: &str, format: OutputFormat) -> Option<ActorIsolation> {
    match parse_isolation_at(text, argument_location(index, text)) {
        Ok((isolation, warnings)) => {
            emit_diagnostics(&warnings, format);
            Some(isolation)
        }
        Err(errors) => {
            emit_diagnostics(&errors, format);
            None
        }
    }
}

/// Arguments are addressed as files numbered by position.
fn argument_location(index: usize, text: &str) -> SourceLocation {
    SourceLocation {
        file_id: u32::try_from(index).unwrap_or(u32::MAX),
        start: 0,
        end: u32::try_from(text.len()).unwrap_or(u32::MAX),
    }
}

/// Text diagnostics are rendered for people; JSON ones one per line.
fn emit_diagnostics(diags: &[Diagnostic], format: OutputFormat) {
    for diag in diags {
        match format {
            OutputFormat::Text => eprintln!("{diag}"),
            OutputFormat::Json => match serde_json::to_string(diag) {
                Ok(json) => eprintln!("{json}"),
                Err(err) => eprintln!("{diag} (JSON rendering failed: {err})"),
            },
        }
    }
}

fn describe(report: &IsolationReport) -> String {
    let mut out = report.isolation.to_string();
    if let Some(actor) = &report.global_actor {
        let _ = write!(out, " {actor}");
    }
    if report.preconcurrency {
        out.push_str(" (preconcurrency)");
    }
    if report.degraded {
        out.push_str(" (degraded)");
    }
    out
}

fn render_json<T: serde::Serialize>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value).context("failed to render JSON")?;
    json.push('\n');
    Ok(json)
}
