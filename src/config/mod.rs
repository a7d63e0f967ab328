use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub(crate) const DATA_DIR_ENV: &str = "BUDGETLEDGER_DATA_DIR";
pub(crate) const DB_ENV: &str = "BUDGETLEDGER_DB";
pub(crate) const LOG_ENV: &str = "BUDGETLEDGER_LOG";

const DB_FILE: &str = "budgetledger.db";
const LOG_FILE: &str = "budgetledger.log";

/// Where the ledger lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Config {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub log_path: PathBuf,
    pub backup_dir: PathBuf,
}

impl Config {
    /// Resolve paths from the environment, falling back to the platform data directory.
    pub(crate) fn load() -> Result<Self> {
        let data_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => default_data_dir()?,
        };
        let db_override = std::env::var_os(DB_ENV)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        let cfg = Self::resolve(data_dir, db_override);

        std::fs::create_dir_all(&cfg.data_dir).with_context(|| {
            format!("Failed to create data directory: {}", cfg.data_dir.display())
        })?;
        Ok(cfg)
    }

    pub(crate) fn resolve(data_dir: PathBuf, db_override: Option<PathBuf>) -> Self {
        let db_path = db_override.unwrap_or_else(|| data_dir.join(DB_FILE));
        // Backups sit next to the database they were taken from
        let backup_dir = db_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            log_path: data_dir.join(LOG_FILE),
            db_path,
            backup_dir,
            data_dir,
        }
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "budgetledger", "BudgetLedger")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(proj_dirs.data_dir().to_path_buf())
}

/// Send `tracing` output to the log file. The filter comes from
/// `BUDGETLEDGER_LOG` and defaults to `budgetledger=info`.
pub(crate) fn init_tracing(cfg: &Config) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cfg.log_path)
        .with_context(|| format!("Failed to open log file: {}", cfg.log_path.display()))?;

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new("budgetledger=info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise logging: {e}"))?;
    Ok(())
}
