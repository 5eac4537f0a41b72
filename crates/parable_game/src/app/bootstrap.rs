use std::env;
use std::path::{Path, PathBuf};

use parable_engine::{ConfigError, LevelRuntime, TuningConfig};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::gameplay;
use super::script::SessionScript;

pub(crate) const SCRIPT_PATH_ENV_VAR: &str = "PARABLE_SCRIPT_PATH";

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to read session script {path}: {source}")]
    ScriptRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse session script at {location}: {source}")]
    ScriptParse {
        location: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid session script: {0}")]
    InvalidScript(String),
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
}

pub(crate) struct AppWiring {
    pub(crate) level: LevelRuntime,
    pub(crate) script: SessionScript,
}

pub(crate) fn build_app() -> Result<AppWiring, AppError> {
    init_tracing();
    info!("=== Parable Startup ===");

    let config = TuningConfig::resolve_from_env()?;
    let script = resolve_script_from_env()?;
    let level = gameplay::build_demo_level(config);
    info!(
        frames = script.total_frames(),
        frame_rate_hz = script.frame_rate_hz,
        "session_script_ready"
    );

    Ok(AppWiring { level, script })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn resolve_script_from_env() -> Result<SessionScript, AppError> {
    match env::var(SCRIPT_PATH_ENV_VAR) {
        Ok(value) if !value.trim().is_empty() => {
            let path = Path::new(value.trim());
            let script = SessionScript::load(path)?;
            info!(path = %path.display(), "session_script_loaded");
            Ok(script)
        }
        Ok(_) | Err(env::VarError::NotPresent) => Ok(SessionScript::demo()),
        Err(source) => Err(AppError::EnvVar {
            var: SCRIPT_PATH_ENV_VAR,
            source,
        }),
    }
}
