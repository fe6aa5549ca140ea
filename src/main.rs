use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use translate_relay::client::{FormView, RelayClient, TranslationForm};
use translate_relay::models::{DEFAULT_SOURCE_LANGUAGE, DEFAULT_TARGET_LANGUAGE};
use translate_relay::{backend, build_router, AppState, DiagnosticLog, RelayConfig};

#[derive(Parser)]
#[command(
    name = "translate-relay",
    about = "HTTP relay that sends translation prompts to an LLM backend",
    version,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(Subcommand)]
enum Command {
    /// Run the relay server (default)
    Serve(ServeArgs),
    /// Translate text through a running relay
    Translate(TranslateArgs),
}

#[derive(Args, Clone)]
struct ServeArgs {
    /// Path to config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config and PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Backend name (overrides config)
    #[arg(long)]
    backend: Option<String>,

    /// Log file path
    #[arg(long, default_value = "translate-relay.log")]
    log_file: PathBuf,

    /// Print config search paths and exit
    #[arg(long)]
    show_config_paths: bool,
}

#[derive(Args)]
struct TranslateArgs {
    /// Relay base URL
    #[arg(long, default_value = "http://localhost:3000")]
    relay: String,

    /// Source language
    #[arg(long, default_value = DEFAULT_SOURCE_LANGUAGE)]
    from: String,

    /// Target language
    #[arg(long, default_value = DEFAULT_TARGET_LANGUAGE)]
    to: String,

    /// Text to translate
    text: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "translate_relay=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Some(Command::Translate(args)) => translate(args).await,
        Some(Command::Serve(args)) => serve(args).await,
        None => serve(cli.serve).await,
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    if args.show_config_paths {
        println!("Config search paths:");
        for (i, path) in translate_relay::config::config_search_paths().iter().enumerate() {
            println!("  {}. {}", i + 1, path.display());
        }
        return Ok(());
    }

    let mut config = RelayConfig::find_and_load(args.config.as_deref())?;
    config.apply_port_override(std::env::var("PORT").ok().as_deref())?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(ref name) = args.backend {
        config.backend.kind = name.clone();
    }

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
        .build()?;

    // Missing or placeholder credentials stop the process here.
    let model_backend = match backend::from_config(&config, client) {
        Ok(b) => b,
        Err(e) => {
            error!("Error initializing model backend: {}", e);
            std::process::exit(1);
        }
    };

    let log = DiagnosticLog::to_file(&args.log_file)?;

    info!("translate-relay v{}", env!("CARGO_PKG_VERSION"));
    info!("  Backend:   {}", model_backend.name());
    info!("  Base URL:  {}", config.effective_base_url()?);
    info!("  Model:     {}", config.effective_model()?);
    info!(
        "  Source language required: {}",
        model_backend.requires_source_language()
    );
    info!("  Log file:  {}", args.log_file.display());

    let state = Arc::new(AppState {
        backend: model_backend,
        log,
    });

    let app = build_router(state);
    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!("Server running on port {}", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn translate(args: TranslateArgs) -> anyhow::Result<()> {
    let client = RelayClient::new(reqwest::Client::new(), &args.relay);
    let mut form = TranslationForm::new();
    form.text = args.text;
    form.source_language = args.from;
    form.target_language = args.to;

    if !form.can_submit() {
        anyhow::bail!("Nothing to translate");
    }

    client.submit(&mut form).await;

    match form.view() {
        FormView::Translation(text) => {
            println!("{text}");
            Ok(())
        }
        FormView::Error(message) => {
            eprintln!("{message}");
            std::process::exit(1);
        }
        FormView::Empty | FormView::Loading => anyhow::bail!("Translation did not complete"),
    }
}
