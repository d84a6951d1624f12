use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber;
use tracing_subscriber::{fmt, EnvFilter};
use tracing_subscriber::prelude::*;
use tracing_appender::rolling::RollingFileAppender;
use tracing_log::LogTracer;
use tracing::subscriber as tracing_subscriber_global;
use anyhow::{anyhow, Result, Context};
use yoto_oauth_pkce as lib;
use lib::config::Config;
use lib::pkce::PkcePair;
use lib::util::is_valid_absolute_url;

#[derive(Parser)]
#[command(name = "yoto-oauth-pkce", version)]
struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// With no subcommand, a PKCE pair is generated and printed as JSON.
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a PKCE verifier/challenge pair and print it as JSON
    Pair {
        /// Number of raw random bytes for the verifier (before encoding)
        #[arg(long, value_name = "BYTES")]
        length: Option<usize>,
    },
    /// Build the Yoto authorization URL; prints url, verifier and state as JSON
    AuthorizeUrl {
        /// Redirect URI to use; overrides the configured one
        #[arg(long)]
        redirect_uri: Option<String>,
    },
    /// Authorize with Yoto and print the resulting tokens (interactive)
    Auth,
    /// Validate config file and exit
    ConfigValidate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    // Resolve config path: explicit --config overrides; otherwise prefer
    // system-wide /etc/yoto-oauth-pkce/config.toml, then the repository
    // example config. With none present, built-in defaults apply so the
    // bare PKCE invocation works without any setup.
    let resolved_config_path: Option<PathBuf> = match &cli.config {
        Some(p) => Some(p.clone()),
        None => {
            let etc_path = Path::new("/etc/yoto-oauth-pkce/config.toml");
            let local_path = Path::new("config/example-config.toml");
            if etc_path.exists() {
                Some(etc_path.to_path_buf())
            } else if local_path.exists() {
                Some(local_path.to_path_buf())
            } else {
                None
            }
        }
    };

    let cfg = match &resolved_config_path {
        Some(p) => Config::from_path(p)
            .with_context(|| format!("loading config from {}", p.display()))?,
        None => Config::default(),
    };

    // Initialize log->tracing bridge and structured logging. The console
    // layer writes to stderr so stdout stays reserved for the JSON records;
    // the daily-rotated file layer is skipped when the log dir cannot be
    // created (e.g. sandboxed runs without /var/log access).
    let _ = LogTracer::init();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    let mut _guard = None;
    let file_layer = match std::fs::create_dir_all(&cfg.log_dir) {
        Ok(()) => {
            let file_appender: RollingFileAppender =
                tracing_appender::rolling::daily(&cfg.log_dir, "yoto-oauth-pkce.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            _guard = Some(guard);
            Some(fmt::layer().with_writer(non_blocking))
        }
        Err(_) => None,
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer);

    tracing_subscriber_global::set_global_default(subscriber)
        .expect("failed to set global tracing subscriber");

    match cli.command {
        // Bare invocation: emit a fresh pair with the default verifier length.
        None => {
            let pair = PkcePair::generate()?;
            println!("{}", serde_json::to_string_pretty(&pair)?);
        }
        Some(Commands::Pair { length }) => {
            let pair = match length {
                Some(n) => PkcePair::with_length(n)?,
                None => PkcePair::generate()?,
            };
            println!("{}", serde_json::to_string_pretty(&pair)?);
        }
        Some(Commands::AuthorizeUrl { redirect_uri }) => {
            if cfg.yoto_client_id.is_empty() {
                return Err(anyhow!("yoto_client_id is not configured"));
            }
            let redirect = redirect_uri
                .or_else(|| cfg.yoto_redirect_uri.clone())
                .filter(|u| is_valid_absolute_url(u))
                .ok_or_else(|| anyhow!("no valid redirect URI configured; pass --redirect-uri"))?;
            let pair = PkcePair::generate()?;
            let state = lib::pkce::generate_state()?;
            let url = lib::api::yoto::build_authorize_url(
                &cfg,
                &cfg.yoto_client_id,
                &redirect,
                &state,
                &pair.challenge,
            )?;
            let out = serde_json::json!({
                "url": url,
                "verifier": pair.verifier,
                "state": state,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Some(Commands::Auth) => {
            lib::api::yoto_auth::run_yoto_auth(&cfg).await
                .with_context(|| "running Yoto auth flow".to_string())?;
        }
        Some(Commands::ConfigValidate) => {
            match resolved_config_path {
                Some(p) => match Config::from_path(&p) {
                    Ok(_) => println!("OK"),
                    Err(e) => {
                        eprintln!("Config validation failed: {}", e);
                        std::process::exit(2);
                    }
                },
                None => {
                    eprintln!("No config file found (looked for --config, /etc/yoto-oauth-pkce/config.toml, config/example-config.toml)");
                    std::process::exit(2);
                }
            }
        }
    }

    Ok(())
}
