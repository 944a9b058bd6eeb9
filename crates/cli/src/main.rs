use std::{path::PathBuf, sync::Arc};

use {
    clap::{Parser, Subcommand},
    tracing::warn,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    gymflow_channels::MessageLog,
    gymflow_config::GymflowConfig,
    gymflow_gateway::{AppState, SqliteMessageLog, serve},
    gymflow_whatsapp::SmartDispatcher,
};

#[derive(Parser)]
#[command(name = "gymflow", about = "gymflow — member notification gateway")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Address to bind to (overrides config value).
    #[arg(long, global = true)]
    bind: Option<String>,

    /// Port to listen on (overrides config value).
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Custom data directory (overrides the platform default).
    #[arg(long, global = true, env = "GYMFLOW_DATA_DIR")]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway server (default when no subcommand is provided).
    Serve,
    /// Send one notification and print the delivery result.
    Send {
        /// Recipient phone number.
        #[arg(long)]
        to: String,
        #[arg(short, long)]
        message: String,
        /// Template to use when the session window is closed.
        #[arg(long)]
        template: Option<String>,
        /// Template language tag.
        #[arg(long)]
        language: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(&cli);

    let mut config = gymflow_config::discover_and_load();
    if let Some(bind) = cli.bind.clone() {
        config.gateway.bind = bind;
    }
    if let Some(port) = cli.port {
        config.gateway.port = port;
    }
    if let Some(dir) = cli.data_dir.clone() {
        config.gateway.data_dir = Some(dir);
    }

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve_gateway(config).await,
        Commands::Send {
            to,
            message,
            template,
            language,
        } => send_once(config, &to, &message, template.as_deref(), language.as_deref()).await,
    }
}

async fn serve_gateway(config: GymflowConfig) -> anyhow::Result<()> {
    let data_dir = gymflow_config::data_dir(&config);

    let message_log = match SqliteMessageLog::open(&data_dir).await {
        Ok(log) => Some(Arc::new(log) as Arc<dyn MessageLog>),
        Err(e) => {
            warn!(error = %e, "message log unavailable, continuing without it");
            None
        },
    };

    let state = AppState::from_config(&config, &data_dir, message_log).await?;
    serve(state, &config.gateway.bind, config.gateway.port).await
}

async fn send_once(
    config: GymflowConfig,
    to: &str,
    message: &str,
    template: Option<&str>,
    language: Option<&str>,
) -> anyhow::Result<()> {
    let wa = config
        .whatsapp
        .ok_or_else(|| anyhow::anyhow!("whatsapp channel is not configured"))?;
    let dispatcher = SmartDispatcher::new(wa)?;

    let result = dispatcher.dispatch(to, message, template, language).await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn init_tracing(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }
}
