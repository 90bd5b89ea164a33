//! Shared startup plumbing for backend-facing commands.

use crate::api::ApiClient;
use crate::cli::ConnectArgs;
use crate::config::{LogFormat, ServerEyeConfig};
use crate::session::{SessionError, SessionStore};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(
    args: &ConnectArgs,
) -> Result<ServerEyeConfig, Box<dyn std::error::Error>> {
    // Load from file if it exists, otherwise use defaults
    let mut config = if args.config.exists() {
        ServerEyeConfig::load(Some(&args.config))?
    } else {
        tracing::debug!("Config file not found, using defaults");
        ServerEyeConfig::default()
    };

    config = config.with_env_overrides();

    // CLI overrides (highest priority)
    if let Some(ref url) = args.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(ref token) = args.token {
        if !token.is_empty() {
            config.api.token = Some(token.clone());
        }
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }

    config.validate()?;
    Ok(config)
}

/// Initialize tracing based on configuration.
///
/// Logs go to stderr so they never interleave with table output.
pub fn init_tracing(
    config: &crate::config::LoggingConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter_str = crate::logging::build_filter_directives(config);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    match config.format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .try_init()?;
        }
    }

    Ok(())
}

/// Open the session store described by `config`.
///
/// With persistence off, or no resolvable location, the session lives in memory.
pub fn open_session(config: &ServerEyeConfig) -> Result<Arc<SessionStore>, SessionError> {
    if !config.session.persist {
        return Ok(Arc::new(SessionStore::in_memory()));
    }
    match config.session.path.clone().or_else(SessionStore::default_path) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Opening session file");
            Ok(Arc::new(SessionStore::open(path)?))
        }
        None => {
            tracing::debug!("No session location available, using in-memory session");
            Ok(Arc::new(SessionStore::in_memory()))
        }
    }
}

/// REST client wired to the session store.
pub fn build_client(
    config: &ServerEyeConfig,
    session: Arc<SessionStore>,
) -> Result<Arc<ApiClient>, Box<dyn std::error::Error>> {
    Ok(Arc::new(ApiClient::new(&config.api)?.with_session(session)))
}

/// Wait for shutdown signal (SIGINT or SIGTERM), then cancel `cancel_token`.
pub async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for CTRL+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
        _ = cancel_token.cancelled() => {}
    }

    cancel_token.cancel();
}
