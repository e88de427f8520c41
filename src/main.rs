use chrono::Utc;
use clap::Parser;
use drone_slack_notify::config::{
    ConfigSource, EnvSource, FileSource, Layered, ParamsSource, PluginConfig,
};
use drone_slack_notify::dispatch::Dispatcher;
use drone_slack_notify::error::{self, ConfigError};
use drone_slack_notify::logging::setup_logging;
use drone_slack_notify::message::build_message;
use drone_slack_notify::notify;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

const DEFAULT_CONFIG_PATH: &str = "slack_notify.toml";

/// Post a build notification to a Slack incoming webhook.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Plugin parameters as a JSON blob; `-` reads them from stdin.
    /// Without this flag the DRONE_* / PLUGIN_* environment is used.
    #[arg(long, value_name = "JSON")]
    params: Option<String>,

    /// TOML file with defaults for plugin arguments
    #[arg(long, env = "SLACK_NOTIFY_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the message payload instead of sending it
    #[arg(long, env = "PLUGIN_DRY_RUN")]
    dry_run: bool,
}

fn primary_source(params: Option<&str>) -> Result<Box<dyn ConfigSource>, ConfigError> {
    match params {
        Some("-") => {
            let mut blob = String::new();
            std::io::stdin()
                .read_to_string(&mut blob)
                .map_err(|e| ConfigError::Params(format!("failed to read stdin: {}", e)))?;
            Ok(Box::new(ParamsSource::parse(&blob)?))
        }
        Some(blob) => Ok(Box::new(ParamsSource::parse(blob)?)),
        None => Ok(Box::new(EnvSource::from_env())),
    }
}

/// An explicit defaults file must exist; the default path is optional.
fn defaults_file(path: Option<&Path>) -> Result<Option<FileSource>, ConfigError> {
    match path {
        Some(path) => FileSource::load(path).map(Some),
        None => {
            let path = Path::new(DEFAULT_CONFIG_PATH);
            if path.exists() {
                FileSource::load(path).map(Some)
            } else {
                Ok(None)
            }
        }
    }
}

fn load_config(cli: &Cli) -> Result<PluginConfig, ConfigError> {
    let primary = primary_source(cli.params.as_deref())?;
    info!("Reading build metadata from {}", primary.name());

    let mut source = Layered::new().with(primary);
    if let Some(file) = defaults_file(cli.config.as_deref())? {
        source = source.with(file);
    }
    PluginConfig::load(&source)
}

async fn run(cli: Cli) -> error::Result<()> {
    let config = load_config(&cli)?;
    let now = Utc::now().timestamp();

    if cli.dry_run {
        let message = build_message(&config.context, now);
        println!("{}", Dispatcher::encode(&message)?);
        info!("Dry run; not posting to {}", message.channel);
        return Ok(());
    }

    notify(&config, now).await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv::dotenv().ok();
    setup_logging();

    // --help and --version exit 0; any other argument error is a load failure
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            eprint!("{}", e);
            std::process::exit(1);
        }
        Err(e) => e.exit(),
    };

    if let Err(e) = run(cli).await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
