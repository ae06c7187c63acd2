//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::ollama_adapter::{OllamaAdapter, OllamaConfig};
use crate::domain::assistant::{Assistant, AssistantOptions, SETUP_INSTRUCTIONS};
use crate::domain::call_parser;
use crate::domain::error::FundchatError;
use crate::domain::function_call::{self, FUNCTIONS};
use crate::domain::fund_data::FundData;
use crate::domain::session::{Session, QUICK_TIPS};
use crate::logging;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::model_port::ModelPort;

/// Read when `--config` is not given and the file exists.
pub const DEFAULT_CONFIG_PATH: &str = "fundchat.ini";
pub const DEFAULT_TRADES_PATH: &str = "data/trades.csv";
pub const DEFAULT_HOLDINGS_PATH: &str = "data/holdings.csv";
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8501";

#[derive(Parser, Debug)]
#[command(name = "fundchat", about = "Ask questions about fund trades and holdings")]
pub struct Cli {
    /// INI configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Trades CSV, overriding [data] trades_path
    #[arg(long, global = true)]
    pub trades: Option<PathBuf>,
    /// Holdings CSV, overriding [data] holdings_path
    #[arg(long, global = true)]
    pub holdings: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Answer a single question
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Interactive chat session
    Chat,
    /// Run a function-call line against the data without a model
    Call { line: String },
    /// List the functions the model can call
    Functions,
    /// Check that the model service is reachable
    Health,
    /// Start the web server
    Serve {
        #[arg(long)]
        listen: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub trades_path: PathBuf,
    pub holdings_path: PathBuf,
    pub model: OllamaConfig,
    pub assistant: AssistantOptions,
    pub log_level: String,
    pub listen: SocketAddr,
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> FundchatError {
    FundchatError::ConfigInvalid {
        section: section.into(),
        key: key.into(),
        reason: reason.into(),
    }
}

fn timeout_secs(config: &dyn ConfigPort, key: &str, default: u64) -> Result<u64, FundchatError> {
    match config.get_string("model", key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(secs),
            _ => Err(invalid(
                "model",
                key,
                format!("expected a positive number of seconds, found '{}'", raw),
            )),
        },
    }
}

pub fn parse_listen(raw: &str) -> Result<SocketAddr, FundchatError> {
    raw.trim()
        .parse()
        .map_err(|_| invalid("web", "listen", format!("'{}' is not a socket address", raw)))
}

pub fn build_app_config(config: &dyn ConfigPort) -> Result<AppConfig, FundchatError> {
    let defaults = OllamaConfig::default();

    let base_url = config
        .get_string("model", "base_url")
        .unwrap_or(defaults.base_url);
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(invalid(
            "model",
            "base_url",
            "must start with http:// or https://",
        ));
    }

    let name = config.get_string("model", "name").unwrap_or(defaults.model);
    if name.trim().is_empty() {
        return Err(invalid("model", "name", "must not be empty"));
    }

    let model = OllamaConfig {
        base_url,
        model: name.trim().to_string(),
        generate_timeout_secs: timeout_secs(
            config,
            "generate_timeout_secs",
            defaults.generate_timeout_secs,
        )?,
        health_timeout_secs: timeout_secs(
            config,
            "health_timeout_secs",
            defaults.health_timeout_secs,
        )?,
    };

    let retry_invalid_call = config
        .get_bool("model", "retry_invalid_call")
        .map_err(|raw| {
            invalid(
                "model",
                "retry_invalid_call",
                format!("expected true or false, found '{}'", raw),
            )
        })?
        .unwrap_or(true);

    let listen = parse_listen(
        &config
            .get_string("web", "listen")
            .unwrap_or_else(|| DEFAULT_LISTEN.to_string()),
    )?;

    Ok(AppConfig {
        trades_path: config
            .get_string("data", "trades_path")
            .unwrap_or_else(|| DEFAULT_TRADES_PATH.to_string())
            .into(),
        holdings_path: config
            .get_string("data", "holdings_path")
            .unwrap_or_else(|| DEFAULT_HOLDINGS_PATH.to_string())
            .into(),
        model,
        assistant: AssistantOptions {
            retry_invalid_call,
        },
        log_level: config
            .get_string("logging", "level")
            .unwrap_or_else(|| logging::DEFAULT_LEVEL.to_string()),
        listen,
    })
}

pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, FundchatError> {
    match path {
        Some(path) => FileConfigAdapter::from_file(path),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            FileConfigAdapter::from_file(DEFAULT_CONFIG_PATH)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

/// Config file plus command-line data path overrides.
pub fn resolve_app_config(cli: &Cli) -> Result<AppConfig, FundchatError> {
    let adapter = load_config(cli.config.as_deref())?;
    let mut app = build_app_config(&adapter)?;
    if let Some(trades) = &cli.trades {
        app.trades_path = trades.clone();
    }
    if let Some(holdings) = &cli.holdings {
        app.holdings_path = holdings.clone();
    }
    Ok(app)
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            (&err).into()
        }
    }
}

fn execute(cli: Cli) -> Result<ExitCode, FundchatError> {
    let app = resolve_app_config(&cli)?;
    logging::init(&app.log_level)?;

    match cli.command {
        Command::Ask { question } => run_ask(&app, &question.join(" ")),
        Command::Chat => run_chat(&app),
        Command::Call { line } => run_call(&app, &line),
        Command::Functions => {
            print!("{}", function_listing());
            Ok(ExitCode::SUCCESS)
        }
        Command::Health => run_health(&app),
        Command::Serve { listen } => run_serve(&app, listen.as_deref()),
    }
}

pub fn load_data(app: &AppConfig) -> Result<FundData, FundchatError> {
    let adapter = CsvAdapter::new(app.trades_path.clone(), app.holdings_path.clone());
    let data = adapter.load()?;
    info!(
        trades = data.trades().len(),
        holdings = data.holdings().len(),
        "data loaded"
    );
    Ok(data)
}

pub fn function_listing() -> String {
    FUNCTIONS
        .iter()
        .map(|f| format!("{:<40} {}\n", f.signature, f.description))
        .collect()
}

fn run_ask(app: &AppConfig, question: &str) -> Result<ExitCode, FundchatError> {
    let data = load_data(app)?;
    let model = OllamaAdapter::new(app.model.clone())?;
    let reply = Assistant::new(&data, &model, app.assistant).respond(question);

    println!("{}", reply.text);
    Ok(match &reply.error {
        Some(err) => err.into(),
        None => ExitCode::SUCCESS,
    })
}

fn run_call(app: &AppConfig, line: &str) -> Result<ExitCode, FundchatError> {
    let data = load_data(app)?;

    match function_call::run_line(&data, line) {
        Ok((_, result)) => {
            let json = serde_json::to_string_pretty(&result.to_json()).map_err(|e| {
                FundchatError::Io(io::Error::other(e))
            })?;
            println!("{}", json);
            Ok(ExitCode::SUCCESS)
        }
        Err(FundchatError::CallParse(e)) => {
            let shown = e.display_with_context(&call_parser::with_marker(line));
            eprintln!("error: failed to parse call:\n{}", shown);
            Ok((&FundchatError::CallParse(e)).into())
        }
        Err(err) => Err(err),
    }
}

fn run_health(app: &AppConfig) -> Result<ExitCode, FundchatError> {
    let model = OllamaAdapter::new(app.model.clone())?;
    match model.check_available() {
        Ok(()) => {
            let config = model.config();
            println!(
                "Model service at {} is running (model {}).",
                config.base_url, config.model
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("{}", SETUP_INSTRUCTIONS);
            Err(err)
        }
    }
}

/// The side panel: totals, tips and cached call data.
pub fn session_info(session: &Session) -> String {
    let mut out = format!(
        "Total Messages: {}\nConversation Turns: {}\n\nQuick Tips:\n",
        session.total_messages(),
        session.turns()
    );
    for tip in QUICK_TIPS {
        out.push_str(&format!("  - \"{}\"\n", tip));
    }
    let mut cached = session.cached().peekable();
    if cached.peek().is_some() {
        out.push_str("\nCached Data:\n");
        for (name, value) in cached {
            let json = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
            out.push_str(&format!("  {}:\n", name));
            for line in json.lines() {
                out.push_str(&format!("    {}\n", line));
            }
        }
    }
    out
}

/// Read questions until `/quit` or end of input.
pub fn chat_loop<R: BufRead, W: Write>(
    assistant: &Assistant<'_>,
    input: R,
    out: &mut W,
) -> Result<Session, FundchatError> {
    let mut session = Session::new();
    write!(out, "> ")?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        match line.trim() {
            "" => {}
            "/quit" | "/exit" => break,
            "/clear" => {
                session.clear();
                writeln!(out, "Chat cleared.")?;
            }
            "/info" => write!(out, "{}", session_info(&session))?,
            question => {
                session.push_user(question);
                let reply = assistant.respond(question);
                session.record(&reply);
                writeln!(out, "{}\n", reply.text)?;
            }
        }
        write!(out, "> ")?;
        out.flush()?;
    }
    writeln!(out)?;
    Ok(session)
}

fn run_chat(app: &AppConfig) -> Result<ExitCode, FundchatError> {
    let data = load_data(app)?;
    let model = OllamaAdapter::new(app.model.clone())?;

    println!("Fund Analytics Chatbot");
    println!("Commands: /info, /clear, /quit");
    match model.check_available() {
        Ok(()) => println!("Model service is running and ready.\n"),
        Err(_) => println!("{}\n", SETUP_INSTRUCTIONS),
    }

    let assistant = Assistant::new(&data, &model, app.assistant);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    chat_loop(&assistant, stdin.lock(), &mut stdout)?;
    Ok(ExitCode::SUCCESS)
}

fn run_serve(app: &AppConfig, listen: Option<&str>) -> Result<ExitCode, FundchatError> {
    #[cfg(feature = "web")]
    {
        use crate::adapters::web::{build_router, AppState};
        use std::sync::Arc;

        let addr = match listen {
            Some(raw) => parse_listen(raw)?,
            None => app.listen,
        };
        let data = Arc::new(load_data(app)?);
        // Kept here so the blocking HTTP client is dropped after the runtime.
        let model: Arc<dyn ModelPort> = Arc::new(OllamaAdapter::new(app.model.clone())?);
        let router = build_router(AppState::new(data, model.clone(), app.assistant));

        eprintln!("Starting web server on http://{}", addr);
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(async {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, router).await
        })?;
        drop(runtime);
        drop(model);
        Ok(ExitCode::SUCCESS)
    }

    #[cfg(not(feature = "web"))]
    {
        let _ = (app, listen);
        eprintln!("error: web feature is required for serve");
        Ok(ExitCode::from(1))
    }
}
